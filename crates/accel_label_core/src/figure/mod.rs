//! Chart description for a rebased recording and its interval overlays.
//!
//! # Responsibility
//! - Build a renderable, Plotly-compatible figure from a recording and the
//!   project's intervals.
//! - Keep plotting decisions (decimation, overlay filtering, styling) pure.
//!
//! # Invariants
//! - Each axis trace holds samples `0, N, 2N, …` only; no aggregation.
//! - Overlays never occlude traces (`layer = below`).
//! - The builder performs no I/O.

use crate::model::interval::{Interval, IntervalKind, IntervalSet};
use crate::model::recording::{Recording, Sample};
use crate::model::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

pub mod html;

pub use html::render_html;

/// Default stride between plotted samples.
pub const DEFAULT_DECIMATION: usize = 25;

/// Vertical extent of interval bands, in acceleration units.
pub const OVERLAY_Y_RANGE: (f64, f64) = (-40.0, 40.0);
pub const OVERLAY_OPACITY: f64 = 0.3;

/// Line/fill color pair of one interval kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayStyle {
    pub line: &'static str,
    pub fill: &'static str,
}

pub const REGION_STYLE: OverlayStyle = OverlayStyle {
    line: "RoyalBlue",
    fill: "LightSkyBlue",
};

pub const LABEL_STYLE: OverlayStyle = OverlayStyle {
    line: "Red",
    fill: "pink",
};

impl IntervalKind {
    pub fn overlay_style(self) -> OverlayStyle {
        match self {
            IntervalKind::Region => REGION_STYLE,
            IntervalKind::Label => LABEL_STYLE,
        }
    }
}

/// Plotting options carried by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FigureOptions {
    /// Plot every Nth sample. Values below 1 are treated as 1.
    pub decimation: usize,
    /// Hide intervals that do not overlap the recording's span.
    pub restrict_to_recording: bool,
}

impl Default for FigureOptions {
    fn default() -> Self {
        Self {
            decimation: DEFAULT_DECIMATION,
            restrict_to_recording: true,
        }
    }
}

/// Plotly figure: `{"data": [...], "layout": {"shapes": [...]}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: FigureLayout,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FigureLayout {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub title: Option<String>,
    pub shapes: Vec<Shape>,
}

/// One line series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: String,
    pub mode: String,
    pub name: String,
    pub x: Vec<Timestamp>,
    pub y: Vec<f64>,
}

/// Translucent rectangle marking one interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: String,
    pub x0: Timestamp,
    pub x1: Timestamp,
    pub y0: f64,
    pub y1: f64,
    pub line: ShapeLine,
    pub fillcolor: String,
    pub opacity: f64,
    pub layer: String,
    /// Index of the interval within its sequence.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeLine {
    pub color: String,
}

impl Figure {
    /// Chart with no traces and no overlays.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.layout.shapes.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Shape {
    fn band(interval: &Interval, index: usize, style: OverlayStyle) -> Self {
        Self {
            kind: "rect".to_string(),
            x0: interval.start,
            x1: interval.end,
            y0: OVERLAY_Y_RANGE.0,
            y1: OVERLAY_Y_RANGE.1,
            line: ShapeLine {
                color: style.line.to_string(),
            },
            fillcolor: style.fill.to_string(),
            opacity: OVERLAY_OPACITY,
            layer: "below".to_string(),
            name: index.to_string(),
        }
    }
}

/// Builds the chart for `recording` with the project's interval overlays.
///
/// # Contract
/// - Three traces named `X-axis`, `Y-axis`, `Z-axis`, each with
///   `ceil(len / decimation)` points.
/// - Regions are drawn before labels, each in sequence order.
/// - With `restrict_to_recording`, intervals ending before the first sample
///   or starting after the last one are skipped; a recording without samples
///   then shows no overlays.
pub fn build_figure(recording: &Recording, intervals: &IntervalSet, options: &FigureOptions) -> Figure {
    let stride = options.decimation.max(1);
    let plotted: Vec<&Sample> = recording.samples.iter().step_by(stride).collect();
    let x: Vec<Timestamp> = plotted.iter().map(|sample| sample.timestamp).collect();

    let axis = |name: &str, value: fn(&Sample) -> f64| Trace {
        kind: "scatter".to_string(),
        mode: "lines".to_string(),
        name: name.to_string(),
        x: x.clone(),
        y: plotted.iter().map(|sample| value(sample)).collect(),
    };
    let data = vec![
        axis("X-axis", |sample| sample.x),
        axis("Y-axis", |sample| sample.y),
        axis("Z-axis", |sample| sample.z),
    ];

    let span = recording.span();
    let mut shapes = Vec::new();
    for kind in IntervalKind::ALL {
        let style = kind.overlay_style();
        for (index, interval) in intervals.get(kind).iter().enumerate() {
            if options.restrict_to_recording {
                let visible = span.is_some_and(|(first, last)| interval.overlaps(first, last));
                if !visible {
                    continue;
                }
            }
            shapes.push(Shape::band(interval, index, style));
        }
    }

    Figure {
        data,
        layout: FigureLayout {
            title: Some(recording.name.clone()),
            shapes,
        },
    }
}
