pub mod chart;
pub mod error;
pub mod query;
pub mod render;
pub mod reports;
pub mod reshape;
pub mod storage;

pub use chart::ChartSpec;
pub use error::{Error, Result};
pub use query::{Query, Table, Value};
pub use reports::{
    IndustryRevenueReport, MonthlyTrendReport, Page, PageOutput, PageSelection, TopN,
    TopPerformersReport, UserTrend,
};
pub use storage::Database;

use serde::Serialize;

const STATUS_SQL: &str = "
    SELECT
        (SELECT COUNT(*) FROM OrderData) AS orders,
        (SELECT COUNT(*) FROM UserLevelData) AS users,
        (SELECT COUNT(DISTINCT Industry) FROM UserLevelData) AS industries,
        (SELECT MIN(PurchaseDate) FROM OrderData) AS first_purchase,
        (SELECT MAX(PurchaseDate) FROM OrderData) AS last_purchase";

/// Row counts and date coverage of the source tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataStatus {
    pub orders: u64,
    pub users: u64,
    pub industries: u64,
    pub first_purchase: Option<String>,
    pub last_purchase: Option<String>,
}

/// Main entry point for the sales dashboard.
///
/// Every call re-executes its query; nothing is memoized between pages or
/// between calls.
pub struct SalesDashboard {
    db: Database,
}

impl SalesDashboard {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Access the database (for direct queries in the CLI).
    pub fn db(&self) -> &Database {
        &self.db
    }

    // ── Pages ──────────────────────────────────────────────────────

    pub async fn industry_earnings(&self) -> Result<IndustryRevenueReport> {
        reports::industry_revenue(&self.db).await
    }

    pub async fn top_performers(&self, top_n: TopN) -> Result<TopPerformersReport> {
        reports::top_performers(&self.db, top_n).await
    }

    pub async fn sales_trends(&self) -> Result<MonthlyTrendReport> {
        reports::monthly_trends(&self.db).await
    }

    /// Render one page with its inputs.
    ///
    /// For Sales Trends without an explicit user, the first user in the
    /// result is selected. An empty result selects nobody and is not an
    /// error; an explicit user missing from the result is.
    pub async fn render(&self, selection: &PageSelection) -> Result<PageOutput> {
        log::info!("Rendering page: {}", selection.page());
        let output = match selection {
            PageSelection::IndustryEarnings => {
                PageOutput::IndustryEarnings(self.industry_earnings().await?)
            }
            PageSelection::TopPerformers(top_n) => {
                PageOutput::TopPerformers(self.top_performers(*top_n).await?)
            }
            PageSelection::SalesTrends(user) => {
                let report = self.sales_trends().await?;
                let chosen = match user {
                    Some(id) => Some(id.as_str()),
                    None => report.default_user(),
                };
                let selected = match chosen {
                    Some(id) => Some(report.for_user(id)?),
                    None => {
                        log::warn!("No users with orders; nothing to select");
                        None
                    }
                };
                PageOutput::SalesTrends { report, selected }
            }
        };
        Ok(output)
    }

    // ── Status ─────────────────────────────────────────────────────

    pub async fn status(&self) -> Result<DataStatus> {
        let table = query::execute(&self.db, &Query::new(STATUS_SQL)).await?;
        let row = table
            .rows
            .first()
            .ok_or_else(|| Error::Other("status query returned no rows".into()))?;
        let count = |name: &str| -> Result<u64> {
            match &row[table.column_index(name)?] {
                Value::Integer(n) => u64::try_from(*n)
                    .map_err(|_| Error::Other(format!("negative {name} count: {n}"))),
                other => Err(Error::Other(format!(
                    "expected an integer {name} count, got {other:?}"
                ))),
            }
        };
        let text = |name: &str| -> Result<Option<String>> {
            let idx = table.column_index(name)?;
            Ok((!row[idx].is_null()).then(|| row[idx].to_display_string()))
        };
        Ok(DataStatus {
            orders: count("orders")?,
            users: count("users")?,
            industries: count("industries")?,
            first_purchase: text("first_purchase")?,
            last_purchase: text("last_purchase")?,
        })
    }
}
