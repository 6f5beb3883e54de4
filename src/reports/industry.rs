use serde::Serialize;

use crate::chart::{Axis, ChartKind, ChartSpec, Panel, Series};
use crate::error::Result;
use crate::query::{self, Query, Table};
use crate::storage::Database;

pub const INDUSTRY_COLUMN: &str = "Industry";
pub const AVERAGE_COLUMN: &str = "AverageMonthlyRevenue (USD)";

// Months are bucketed by MONTH() alone, so the same month of different years
// shares a bucket.
const INDUSTRY_REVENUE_SQL: &str = r#"
    WITH monthly_revenues AS (
        SELECT
            u.Industry,
            MONTH(o.PurchaseDate) AS Month,
            SUM(o.Invoice) AS Revenue
        FROM OrderData o
        JOIN UserLevelData u ON o.Userid = u.Userid
        GROUP BY u.Industry, Month
    )
    SELECT
        Industry,
        ROUND(AVG(Revenue), 2) AS "AverageMonthlyRevenue (USD)"
    FROM monthly_revenues
    GROUP BY Industry
    ORDER BY Industry"#;

/// Average monthly revenue of one industry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryRevenue {
    pub industry: String,
    pub average_monthly_revenue: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndustryRevenueReport {
    pub table: Table,
    pub rows: Vec<IndustryRevenue>,
}

impl IndustryRevenueReport {
    pub fn from_table(table: Table) -> Result<Self> {
        let industry_idx = table.column_index(INDUSTRY_COLUMN)?;
        let avg_idx = table.column_index(AVERAGE_COLUMN)?;
        let rows = table
            .rows
            .iter()
            .map(|row| IndustryRevenue {
                industry: row[industry_idx].to_display_string(),
                average_monthly_revenue: row[avg_idx].as_f64().unwrap_or(0.0),
            })
            .collect();
        Ok(Self { table, rows })
    }

    /// Bar chart of the average keyed by industry.
    pub fn chart(&self) -> ChartSpec {
        let mut series = Series::new(AVERAGE_COLUMN);
        for row in &self.rows {
            series.push(row.industry.clone(), row.average_monthly_revenue);
        }
        let mut panel = Panel::new(
            ChartKind::Bar,
            Axis::titled(INDUSTRY_COLUMN),
            Axis::titled(AVERAGE_COLUMN),
        );
        panel.series.push(series);
        ChartSpec::single(panel).titled("Industry-wise Average Monthly Revenue")
    }
}

/// Average of the monthly revenue totals of each industry.
pub async fn industry_revenue(db: &Database) -> Result<IndustryRevenueReport> {
    let table = query::execute(db, &Query::new(INDUSTRY_REVENUE_SQL)).await?;
    IndustryRevenueReport::from_table(table)
}
