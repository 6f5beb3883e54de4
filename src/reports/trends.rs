//! Month-over-month revenue and order counts per user.
//!
//! The window is fixed to September, October and November 2020 and is not
//! configurable at runtime. Moving it means editing [`TREND_WINDOW`].

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::chart::{Axis, ChartKind, ChartSpec, Panel, Series, CHART_HEIGHT};
use crate::error::{Error, Result};
use crate::query::{self, Query, Table};
use crate::reshape::{self, LongRow};
use crate::storage::Database;

pub const USER_ID_COLUMN: &str = "User ID";
pub const TREND_CHART_WIDTH: u32 = 1200;

static RE_TREND_COLUMN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(Revenue USD|Order Count) \((.+)\)$").unwrap());

/// One calendar month of the trend window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendMonth {
    /// Relative label used in the wide column names.
    pub label: &'static str,
    pub year: i32,
    pub month: u32,
    /// Month name shown on charts.
    pub display: &'static str,
}

/// Oldest first.
pub static TREND_WINDOW: [TrendMonth; 3] = [
    TrendMonth {
        label: "Previous -1 Month",
        year: 2020,
        month: 9,
        display: "September 2020",
    },
    TrendMonth {
        label: "Previous Month",
        year: 2020,
        month: 10,
        display: "October 2020",
    },
    TrendMonth {
        label: "Current Month",
        year: 2020,
        month: 11,
        display: "November 2020",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Revenue,
    OrderCount,
}

impl Metric {
    fn column_prefix(self) -> &'static str {
        match self {
            Metric::Revenue => "Revenue USD",
            Metric::OrderCount => "Order Count",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Metric::Revenue => "Revenue",
            Metric::OrderCount => "Order Count",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Metric::Revenue => "blue",
            Metric::OrderCount => "red",
        }
    }

    /// Wide column name for this metric in `month`.
    pub fn column(self, month: &TrendMonth) -> String {
        format!("{} ({})", self.column_prefix(), month.label)
    }
}

/// Split a wide column name into its metric and window month.
fn classify(column: &str) -> Option<(Metric, &'static TrendMonth)> {
    let caps = RE_TREND_COLUMN.captures(column)?;
    let metric = match &caps[1] {
        "Revenue USD" => Metric::Revenue,
        _ => Metric::OrderCount,
    };
    let month = TREND_WINDOW.iter().find(|m| m.label == &caps[2])?;
    Some((metric, month))
}

fn trend_sql() -> String {
    let mut columns = Vec::with_capacity(TREND_WINDOW.len() * 2);
    for month in &TREND_WINDOW {
        let cond = format!(
            "MONTH(PurchaseDate) = {} AND YEAR(PurchaseDate) = {}",
            month.month, month.year
        );
        columns.push(format!(
            "SUM(CASE WHEN {cond} THEN ROUND(Invoice, 2) ELSE 0 END) AS \"{}\"",
            Metric::Revenue.column(month)
        ));
        columns.push(format!(
            "COUNT(CASE WHEN {cond} THEN 1 END) AS \"{}\"",
            Metric::OrderCount.column(month)
        ));
    }
    format!(
        "SELECT Userid AS \"{USER_ID_COLUMN}\",\n    {}\nFROM OrderData\nGROUP BY Userid\nORDER BY Userid",
        columns.join(",\n    ")
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub month: String,
    pub value: f64,
}

/// Both series for one user, oldest month first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserTrend {
    pub user_id: String,
    pub revenue: Vec<TrendPoint>,
    pub order_count: Vec<TrendPoint>,
}

impl UserTrend {
    /// Two-panel line chart: revenue on the left, order count on the right.
    pub fn chart(&self) -> ChartSpec {
        let panels = [
            (Metric::Revenue, &self.revenue),
            (Metric::OrderCount, &self.order_count),
        ]
        .into_iter()
        .map(|(metric, points)| {
            let mut series = Series::new(metric.title())
                .color(metric.color())
                .with_markers();
            for p in points {
                series.push(p.month.clone(), p.value);
            }
            let mut panel = Panel::new(
                ChartKind::Line,
                Axis::titled("Month"),
                Axis::titled(metric.title()),
            )
            .titled(metric.title());
            panel.series.push(series);
            panel
        })
        .collect();

        ChartSpec {
            title: Some(format!("User ID: {}", self.user_id)),
            height: CHART_HEIGHT,
            width: Some(TREND_CHART_WIDTH),
            panels,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyTrendReport {
    /// One row per user with six value columns.
    pub table: Table,
    /// Long revenue rows; `variable` holds the month name.
    pub revenue: Vec<LongRow>,
    /// Long order-count rows; `variable` holds the month name.
    pub order_count: Vec<LongRow>,
    /// Users available for selection, in table order.
    pub user_ids: Vec<String>,
}

impl MonthlyTrendReport {
    pub fn from_table(table: Table) -> Result<Self> {
        let long = reshape::melt(&table, USER_ID_COLUMN)?;
        let user_ids = reshape::unique_ids(&long);

        let mut revenue = Vec::new();
        let mut order_count = Vec::new();
        for mut row in long {
            let Some((metric, month)) = classify(&row.variable) else {
                log::debug!("Ignoring unexpected trend column {}", row.variable);
                continue;
            };
            row.variable = month.display.to_string();
            match metric {
                Metric::Revenue => revenue.push(row),
                Metric::OrderCount => order_count.push(row),
            }
        }

        Ok(Self {
            table,
            revenue,
            order_count,
            user_ids,
        })
    }

    /// The user preselected when none is chosen: the first one listed.
    pub fn default_user(&self) -> Option<&str> {
        self.user_ids.first().map(String::as_str)
    }

    /// Filter both series down to one user.
    pub fn for_user(&self, user_id: &str) -> Result<UserTrend> {
        if !self.user_ids.iter().any(|id| id == user_id) {
            return Err(Error::NotFound(format!("user {user_id} has no orders")));
        }
        let points = |rows: &[LongRow]| {
            reshape::select_id(rows, user_id)
                .into_iter()
                .map(|r| TrendPoint {
                    month: r.variable.clone(),
                    value: r.value.as_f64().unwrap_or(0.0),
                })
                .collect::<Vec<_>>()
        };
        Ok(UserTrend {
            user_id: user_id.to_string(),
            revenue: points(&self.revenue),
            order_count: points(&self.order_count),
        })
    }
}

/// Revenue and order counts of every user over the trend window.
pub async fn monthly_trends(db: &Database) -> Result<MonthlyTrendReport> {
    let table = query::execute(db, &Query::new(trend_sql())).await?;
    MonthlyTrendReport::from_table(table)
}
