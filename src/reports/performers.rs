use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::chart::{Axis, ChartKind, ChartSpec, Panel, Series};
use crate::error::{Error, Result};
use crate::query::{self, Query, Table, Value};
use crate::storage::Database;

pub const INDUSTRY_COLUMN: &str = "Industry";
pub const USER_COLUMN: &str = "Userid";
pub const TOTAL_COLUMN: &str = "TotalRevenue (USD)";

// Ties on revenue are ranked by Userid so the cutoff is reproducible. The
// final ordering follows the rank, which is TotalRevenue descending.
const TOP_PERFORMERS_SQL: &str = r#"
    WITH total_revenue AS (
        SELECT
            u.Industry,
            o.Userid,
            ROUND(SUM(o.Invoice), 2) AS TotalRevenue,
            ROW_NUMBER() OVER (
                PARTITION BY u.Industry
                ORDER BY SUM(o.Invoice) DESC, o.Userid ASC
            ) AS rn
        FROM OrderData o
        INNER JOIN UserLevelData u ON o.Userid = u.Userid
        GROUP BY u.Industry, o.Userid
    )
    SELECT
        Industry,
        Userid,
        TotalRevenue AS "TotalRevenue (USD)"
    FROM total_revenue
    WHERE rn <= ?1
    ORDER BY Industry ASC, rn ASC"#;

/// How many top users per industry to keep. Only 1 through 5 are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct TopN(u8);

impl TopN {
    pub const CHOICES: [u8; 5] = [1, 2, 3, 4, 5];

    pub fn new(n: u8) -> Result<Self> {
        if Self::CHOICES.contains(&n) {
            Ok(Self(n))
        } else {
            Err(Error::InvalidParameter(format!(
                "top performer count must be one of 1-5, got {n}"
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for TopN {
    fn default() -> Self {
        Self(Self::CHOICES[0])
    }
}

impl TryFrom<u8> for TopN {
    type Error = Error;

    fn try_from(n: u8) -> Result<Self> {
        Self::new(n)
    }
}

impl FromStr for TopN {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let n: u8 = s
            .trim()
            .parse()
            .map_err(|_| Error::InvalidParameter(format!("not a top performer count: {s}")))?;
        Self::new(n)
    }
}

impl fmt::Display for TopN {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One ranked user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Performer {
    pub industry: String,
    pub user_id: String,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopPerformersReport {
    pub top_n: TopN,
    pub table: Table,
    pub rows: Vec<Performer>,
}

impl TopPerformersReport {
    /// Build the report from the query result. User ids are rewritten as
    /// text in the table so that numeric ids display as identifiers.
    pub fn from_table(top_n: TopN, mut table: Table) -> Result<Self> {
        let industry_idx = table.column_index(INDUSTRY_COLUMN)?;
        let user_idx = table.column_index(USER_COLUMN)?;
        let total_idx = table.column_index(TOTAL_COLUMN)?;

        for row in &mut table.rows {
            let id = row[user_idx].to_display_string();
            row[user_idx] = Value::Text(id);
        }

        let rows = table
            .rows
            .iter()
            .map(|row| Performer {
                industry: row[industry_idx].to_display_string(),
                user_id: row[user_idx].to_display_string(),
                total_revenue: row[total_idx].as_f64().unwrap_or(0.0),
            })
            .collect();
        Ok(Self { top_n, table, rows })
    }

    pub fn for_industry(&self, industry: &str) -> Vec<&Performer> {
        self.rows.iter().filter(|p| p.industry == industry).collect()
    }

    /// Grouped bars per industry, one series per user.
    pub fn chart(&self) -> ChartSpec {
        let mut series: Vec<Series> = Vec::new();
        for p in &self.rows {
            let idx = match series.iter().position(|s| s.name == p.user_id) {
                Some(idx) => idx,
                None => {
                    series.push(Series::new(p.user_id.clone()));
                    series.len() - 1
                }
            };
            series[idx].push(p.industry.clone(), p.total_revenue);
        }

        let mut panel = Panel::new(
            ChartKind::Bar,
            Axis::titled(INDUSTRY_COLUMN).rotated(-45),
            Axis::titled("Total Revenue (USD)"),
        );
        panel.legend = Some("User ID".to_string());
        panel.grouped = true;
        panel.series = series;

        ChartSpec::single(panel).titled(format!(
            "Top {} Users by Industry Based on Overall Revenue",
            self.top_n
        ))
    }
}

/// The `top_n` highest-revenue users of every industry.
pub async fn top_performers(db: &Database, top_n: TopN) -> Result<TopPerformersReport> {
    let query = Query::new(TOP_PERFORMERS_SQL).bind(top_n.get() as i64);
    let table = query::execute(db, &query).await?;
    TopPerformersReport::from_table(top_n, table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing;

    const FIXTURE: &str = "
        INSERT INTO UserLevelData VALUES
            ('A1', 'Apparel'), ('A2', 'Apparel'),
            ('R1', 'Retail'), ('R2', 'Retail'), ('R3', 'Retail'), ('R4', 'Retail');
        INSERT INTO OrderData (Userid, PurchaseDate, Invoice) VALUES
            ('A1', '2020-09-01', 40.0),
            ('A2', '2020-09-02', 90.0),
            ('R1', '2020-10-01', 10.0),
            ('R1', '2020-11-01', 15.0),
            ('R2', '2020-10-05', 300.0),
            ('R3', '2020-10-06', 25.0),
            ('R4', '2020-11-07', 5.0);";

    fn ids(rows: &[&Performer]) -> Vec<String> {
        rows.iter().map(|p| p.user_id.clone()).collect()
    }

    #[test]
    fn test_top_n_domain() {
        for n in TopN::CHOICES {
            assert_eq!(TopN::new(n).unwrap().get(), n);
        }
        assert!(matches!(TopN::new(0), Err(Error::InvalidParameter(_))));
        assert!(matches!(TopN::new(6), Err(Error::InvalidParameter(_))));
        assert_eq!("3".parse::<TopN>().unwrap().get(), 3);
        assert!("three".parse::<TopN>().is_err());
        assert_eq!(TopN::default().get(), 1);
    }

    #[tokio::test]
    async fn test_rank_cutoff_per_industry() {
        let db = testing::seeded(FIXTURE).await;

        let report = top_performers(&db, TopN::new(2).unwrap()).await.unwrap();

        assert_eq!(
            report.table.columns,
            vec![INDUSTRY_COLUMN, USER_COLUMN, TOTAL_COLUMN]
        );
        assert_eq!(ids(&report.for_industry("Apparel")), vec!["A2", "A1"]);
        // R1 and R3 tie at 25.00; the lower Userid wins the second slot.
        assert_eq!(ids(&report.for_industry("Retail")), vec!["R2", "R1"]);
        assert_eq!(report.rows.len(), 4);
        assert_eq!(report.rows[0].industry, "Apparel");
    }

    #[tokio::test]
    async fn test_row_count_is_min_of_n_and_users() {
        let db = testing::seeded(FIXTURE).await;

        for n in TopN::CHOICES {
            let report = top_performers(&db, TopN::new(n).unwrap()).await.unwrap();
            let apparel = report.for_industry("Apparel");
            let retail = report.for_industry("Retail");
            assert_eq!(apparel.len(), (n as usize).min(2));
            assert_eq!(retail.len(), (n as usize).min(4));

            for group in [&apparel, &retail] {
                assert!(group
                    .windows(2)
                    .all(|w| w[0].total_revenue >= w[1].total_revenue));
            }
        }
    }

    #[tokio::test]
    async fn test_included_users_outrank_excluded() {
        let db = testing::seeded(FIXTURE).await;

        let all = top_performers(&db, TopN::new(5).unwrap()).await.unwrap();
        let top = top_performers(&db, TopN::new(1).unwrap()).await.unwrap();

        for kept in &top.rows {
            for other in all.for_industry(&kept.industry) {
                assert!(kept.total_revenue >= other.total_revenue);
            }
        }
    }

    #[tokio::test]
    async fn test_rerun_is_identical() {
        let db = testing::seeded(FIXTURE).await;
        let n = TopN::new(3).unwrap();

        let first = top_performers(&db, n).await.unwrap();
        let second = top_performers(&db, n).await.unwrap();
        assert_eq!(first.table, second.table);
    }

    #[tokio::test]
    async fn test_numeric_user_ids_render_as_text() {
        let db = Database::open_memory().await.unwrap();
        db.connect()
            .await
            .unwrap()
            .call(|conn| {
                conn.execute_batch(
                    "CREATE TABLE UserLevelData (Userid INTEGER, Industry TEXT);
                     CREATE TABLE OrderData (Userid INTEGER, PurchaseDate TEXT, Invoice REAL);
                     INSERT INTO UserLevelData VALUES (9007199254740993, 'Retail');
                     INSERT INTO OrderData VALUES (9007199254740993, '2020-10-01', 12.5);",
                )
            })
            .await
            .unwrap();

        let report = top_performers(&db, TopN::default()).await.unwrap();
        assert_eq!(report.rows[0].user_id, "9007199254740993");
        assert_eq!(report.table.rows[0][1], Value::from("9007199254740993"));
    }

    #[test]
    fn test_chart_groups_users_by_industry() {
        let table = Table {
            columns: vec![INDUSTRY_COLUMN.into(), USER_COLUMN.into(), TOTAL_COLUMN.into()],
            rows: vec![
                vec!["Apparel".into(), "A2".into(), 90.0.into()],
                vec!["Retail".into(), "R2".into(), 300.0.into()],
                vec!["Retail".into(), "A2".into(), 1.0.into()],
            ],
        };
        let report = TopPerformersReport::from_table(TopN::new(2).unwrap(), table).unwrap();
        let chart = report.chart();

        assert_eq!(
            chart.title.as_deref(),
            Some("Top 2 Users by Industry Based on Overall Revenue")
        );
        let panel = &chart.panels[0];
        assert!(panel.grouped);
        assert_eq!(panel.x_axis.tick_angle, Some(-45));
        let names: Vec<&str> = panel.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["A2", "R2"]);
        assert_eq!(panel.series[0].points.len(), 2);
    }
}
