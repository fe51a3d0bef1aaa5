//! The fixed attribute schema used for comparison.
//!
//! Upstream extraction produces free-text labels; this enum is the schema they
//! are mapped onto. Each attribute owns its keyword set and scoring rule, so
//! adding an attribute is a one-place change.

use crate::analysis::extract::extract_numeric;
use crate::analysis::normalize::Direction;
use crate::analysis::qualitative::map_qualitative;
use crate::model::Properties;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A semantic material attribute, in radar-axis order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Attribute {
    Strength,
    Density,
    Cost,
    Corrosion,
    Temperature,
}

/// How an attribute's raw value becomes a 0–100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scoring {
    /// Parsed number, normalized across the compared materials.
    Numeric(Direction),
    /// Rating tier, already on the 0–100 scale; not rescaled.
    Qualitative,
}

impl Attribute {
    pub const ALL: [Attribute; 5] = [
        Attribute::Strength,
        Attribute::Density,
        Attribute::Cost,
        Attribute::Corrosion,
        Attribute::Temperature,
    ];

    /// Lowercase substrings that identify this attribute's property label.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Attribute::Strength => &["tensile", "strength"],
            Attribute::Density => &["density"],
            Attribute::Cost => &["cost"],
            Attribute::Corrosion => &["corrosion"],
            Attribute::Temperature => &["temp", "melting"],
        }
    }

    pub fn scoring(self) -> Scoring {
        match self {
            Attribute::Strength | Attribute::Temperature => {
                Scoring::Numeric(Direction::HigherIsBetter)
            }
            Attribute::Density | Attribute::Cost => Scoring::Numeric(Direction::LowerIsBetter),
            Attribute::Corrosion => Scoring::Qualitative,
        }
    }

    /// Short axis label for charts.
    pub fn label(self) -> &'static str {
        match self {
            Attribute::Strength => "Strength",
            Attribute::Density => "Density",
            Attribute::Cost => "Cost",
            Attribute::Corrosion => "Corrosion",
            Attribute::Temperature => "Temp",
        }
    }

    /// Axis labels for all attributes, in order.
    pub fn labels() -> [&'static str; 5] {
        Self::ALL.map(Attribute::label)
    }

    /// Raw (un-normalized) value of this attribute for one material.
    pub fn raw_value(self, properties: &Properties) -> f64 {
        match self.scoring() {
            Scoring::Numeric(_) => extract_numeric(properties, self.keywords()),
            Scoring::Qualitative => map_qualitative(properties, self.keywords()),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
