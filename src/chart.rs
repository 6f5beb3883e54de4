//! Renderer-neutral chart specifications.
//!
//! Reports describe their charts with these types and the CLI prints them as
//! JSON; drawing is left to whatever consumes the JSON.

use serde::Serialize;

/// Default chart height in pixels.
pub const CHART_HEIGHT: u32 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
    /// Tick label rotation in degrees, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_angle: Option<i32>,
}

impl Axis {
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            tick_angle: None,
        }
    }

    pub fn rotated(mut self, degrees: i32) -> Self {
        self.tick_angle = Some(degrees);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub x: String,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub markers: bool,
    pub points: Vec<Point>,
}

impl Series {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
            markers: false,
            points: Vec::new(),
        }
    }

    pub fn color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn with_markers(mut self) -> Self {
        self.markers = true;
        self
    }

    pub fn push(&mut self, x: impl Into<String>, y: f64) {
        self.points.push(Point { x: x.into(), y });
    }
}

/// One subplot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub kind: ChartKind,
    pub x_axis: Axis,
    pub y_axis: Axis,
    /// Name of the dimension that separates the series (the legend title).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<String>,
    /// Bars of different series sit side by side instead of stacking.
    pub grouped: bool,
    pub series: Vec<Series>,
}

impl Panel {
    pub fn new(kind: ChartKind, x_axis: Axis, y_axis: Axis) -> Self {
        Self {
            title: None,
            kind,
            x_axis,
            y_axis,
            legend: None,
            grouped: false,
            series: Vec::new(),
        }
    }

    pub fn titled(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }
}

/// A full chart: a row of panels sharing a title and size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub height: u32,
    /// `None` lets the renderer use the available width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    pub panels: Vec<Panel>,
}

impl ChartSpec {
    pub fn single(panel: Panel) -> Self {
        Self {
            title: None,
            height: CHART_HEIGHT,
            width: None,
            panels: vec![panel],
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Number of points across every series of every panel.
    pub fn point_count(&self) -> usize {
        self.panels
            .iter()
            .flat_map(|p| &p.series)
            .map(|s| s.points.len())
            .sum()
    }
}
