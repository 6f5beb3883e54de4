pub mod industry;
pub mod performers;
pub mod trends;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

pub use industry::{industry_revenue, IndustryRevenue, IndustryRevenueReport};
pub use performers::{top_performers, Performer, TopN, TopPerformersReport};
pub use trends::{monthly_trends, MonthlyTrendReport, TrendPoint, UserTrend};

use crate::chart::ChartSpec;
use crate::error::{Error, Result};
use crate::query::Table;

/// A dashboard page. Each maps to exactly one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Page {
    #[default]
    IndustryEarnings,
    TopPerformers,
    SalesTrends,
}

impl Page {
    /// Menu order.
    pub const ALL: [Page; 3] = [Page::IndustryEarnings, Page::TopPerformers, Page::SalesTrends];

    pub fn label(self) -> &'static str {
        match self {
            Page::IndustryEarnings => "Industry Earnings",
            Page::TopPerformers => "Top Performers",
            Page::SalesTrends => "Sales Trends",
        }
    }

    /// Look a page up by its menu label, ignoring case and surrounding space.
    pub fn from_label(label: &str) -> Result<Self> {
        let wanted = label.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let labels: Vec<&str> = Self::ALL.iter().map(|p| p.label()).collect();
                Error::InvalidParameter(format!(
                    "unknown page '{wanted}', expected one of: {}",
                    labels.join(", ")
                ))
            })
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Page {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s)
    }
}

/// A page together with the inputs it solicits from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSelection {
    IndustryEarnings,
    TopPerformers(TopN),
    /// `None` picks the first user in the result.
    SalesTrends(Option<String>),
}

impl PageSelection {
    pub fn page(&self) -> Page {
        match self {
            PageSelection::IndustryEarnings => Page::IndustryEarnings,
            PageSelection::TopPerformers(_) => Page::TopPerformers,
            PageSelection::SalesTrends(_) => Page::SalesTrends,
        }
    }
}

impl From<Page> for PageSelection {
    fn from(page: Page) -> Self {
        match page {
            Page::IndustryEarnings => PageSelection::IndustryEarnings,
            Page::TopPerformers => PageSelection::TopPerformers(TopN::default()),
            Page::SalesTrends => PageSelection::SalesTrends(None),
        }
    }
}

/// What a rendered page hands to the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum PageOutput {
    IndustryEarnings(IndustryRevenueReport),
    TopPerformers(TopPerformersReport),
    SalesTrends {
        report: MonthlyTrendReport,
        /// `None` when the result holds no users.
        selected: Option<UserTrend>,
    },
}

impl PageOutput {
    pub fn page(&self) -> Page {
        match self {
            PageOutput::IndustryEarnings(_) => Page::IndustryEarnings,
            PageOutput::TopPerformers(_) => Page::TopPerformers,
            PageOutput::SalesTrends { .. } => Page::SalesTrends,
        }
    }

    /// The output table behind the page.
    pub fn table(&self) -> &Table {
        match self {
            PageOutput::IndustryEarnings(r) => &r.table,
            PageOutput::TopPerformers(r) => &r.table,
            PageOutput::SalesTrends { report, .. } => &report.table,
        }
    }

    /// The page chart. Sales Trends has none until a user is selected.
    pub fn chart(&self) -> Option<ChartSpec> {
        match self {
            PageOutput::IndustryEarnings(r) => Some(r.chart()),
            PageOutput::TopPerformers(r) => Some(r.chart()),
            PageOutput::SalesTrends { selected, .. } => selected.as_ref().map(UserTrend::chart),
        }
    }
}
