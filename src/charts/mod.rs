//! Chart rendering and report chart assembly.
//!
//! Charts are drawn with plotters into an in-memory RGB buffer and encoded as
//! PNG; nothing touches the filesystem or system fonts. Every renderer is a
//! pure function of its input.
//!
//! ```text
//! ReportData ──▶ attribute_series ──▶ bar   ──▶ PNG  (tensile, density)
//!            └─▶ score_matches    ──▶ radar ──▶ PNG  (radar)
//! ```

pub mod bar;
pub mod encode;
pub mod fonts;
pub mod radar;

pub use bar::{render_bar_chart, BarChartSpec};
pub use radar::{render_radar_chart, LineStyle, RadarSeries};

use crate::analysis::{attribute_series, score_matches, Attribute};
use crate::error::{AdvisorError, ChartError};
use crate::model::ReportData;
use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// The charts a report can carry, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Tensile,
    Density,
    Radar,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Tensile, ChartKind::Density, ChartKind::Radar];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Tensile => "tensile",
            ChartKind::Density => "density",
            ChartKind::Radar => "radar",
        }
    }

    /// Caption used above the chart in the PDF report.
    pub fn caption(self) -> &'static str {
        match self {
            ChartKind::Tensile => "Tensile Strength Comparison",
            ChartKind::Density => "Density Comparison",
            ChartKind::Radar => "Performance Radar Chart",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tensile" => Ok(ChartKind::Tensile),
            "density" => Ok(ChartKind::Density),
            "radar" => Ok(ChartKind::Radar),
            other => Err(AdvisorError::UnknownChartKind(other.to_string())),
        }
    }
}

/// PNG buffers keyed by chart kind. A suppressed chart is simply absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSet(BTreeMap<ChartKind, Vec<u8>>);

impl ChartSet {
    pub fn get(&self, kind: ChartKind) -> Option<&[u8]> {
        self.0.get(&kind).map(Vec::as_slice)
    }

    pub fn contains(&self, kind: ChartKind) -> bool {
        self.0.contains_key(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn kinds(&self) -> impl Iterator<Item = ChartKind> + '_ {
        self.0.keys().copied()
    }

    /// Charts in report order.
    pub fn iter(&self) -> impl Iterator<Item = (ChartKind, &[u8])> {
        self.0.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    pub fn remove(&mut self, kind: ChartKind) -> Option<Vec<u8>> {
        self.0.remove(&kind)
    }

    fn insert(&mut self, kind: ChartKind, png: Vec<u8>) {
        self.0.insert(kind, png);
    }
}

/// Pixel sizes of the rendered charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartStyle {
    /// Bar chart size in pixels. Default: 1000 × 600.
    pub bar_size: (u32, u32),
    /// Radar chart size in pixels. Default: 800 × 800.
    pub radar_size: (u32, u32),
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            bar_size: (1000, 600),
            radar_size: (800, 800),
        }
    }
}

const TENSILE_COLOR: RGBColor = RGBColor(0x34, 0x49, 0x5e);
const DENSITY_COLOR: RGBColor = RGBColor(0xe6, 0x7e, 0x22);

/// Build the chart set for a report.
///
/// - no matches → empty set;
/// - `tensile` / `density` bar charts only when at least one material has a
///   strictly positive value, never an all-zero chart;
/// - `radar` whenever there is at least one match, even if degenerate.
pub fn generate_charts(report: &ReportData, style: &ChartStyle) -> Result<ChartSet, ChartError> {
    let mut charts = ChartSet::default();
    let matches = &report.matches;
    if matches.is_empty() {
        debug!("No material matches; no charts generated");
        return Ok(charts);
    }

    let bars = [
        (
            ChartKind::Tensile,
            Attribute::Strength,
            BarChartSpec::new("Tensile Strength Comparison", "Strength (MPa)", TENSILE_COLOR),
        ),
        (
            ChartKind::Density,
            Attribute::Density,
            BarChartSpec::new("Density Comparison", "Density (g/cm³)", DENSITY_COLOR),
        ),
    ];

    for (kind, attribute, spec) in bars {
        let series = attribute_series(matches, attribute);
        if series.iter().any(|(_, v)| *v > 0.0) {
            charts.insert(kind, render_bar_chart(&series, &spec, style)?);
        } else {
            debug!("Suppressing {} chart: no positive values", kind);
        }
    }

    let radar: Vec<RadarSeries> = score_matches(matches)
        .into_iter()
        .map(|m| RadarSeries::new(m.name, m.scores.to_vec()))
        .collect();
    charts.insert(
        ChartKind::Radar,
        render_radar_chart(&radar, &Attribute::labels(), style)?,
    );

    info!(
        "Generated {} chart(s) for {} material(s)",
        charts.len(),
        matches.len()
    );
    Ok(charts)
}
