//! Categorical rating → numeric score.

use crate::analysis::extract::find_property;
use crate::model::Properties;
use serde::{Deserialize, Serialize};

/// Rating tiers recognised in free text, checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualitativeTier {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl QualitativeTier {
    pub const ALL: [QualitativeTier; 4] = [
        QualitativeTier::Excellent,
        QualitativeTier::Good,
        QualitativeTier::Fair,
        QualitativeTier::Poor,
    ];

    /// Score used when nothing matches.
    pub const NEUTRAL: f64 = 50.0;

    pub fn keyword(self) -> &'static str {
        match self {
            QualitativeTier::Excellent => "excellent",
            QualitativeTier::Good => "good",
            QualitativeTier::Fair => "fair",
            QualitativeTier::Poor => "poor",
        }
    }

    pub fn score(self) -> f64 {
        match self {
            QualitativeTier::Excellent => 95.0,
            QualitativeTier::Good => 75.0,
            QualitativeTier::Fair => 50.0,
            QualitativeTier::Poor => 25.0,
        }
    }

    /// Classify a rating by substring presence. "Very good to excellent"
    /// resolves to `Excellent` because tiers are tried best-first.
    pub fn classify(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        Self::ALL.into_iter().find(|t| lower.contains(t.keyword()))
    }
}

/// Score the first property matching `keywords` by its rating tier.
///
/// Returns [`QualitativeTier::NEUTRAL`] when no label matches or the value
/// names no tier.
pub fn map_qualitative(properties: &Properties, keywords: &[&str]) -> f64 {
    find_property(properties, keywords)
        .and_then(|(_, value)| QualitativeTier::classify(value))
        .map(QualitativeTier::score)
        .unwrap_or(QualitativeTier::NEUTRAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORROSION: &[&str] = &["corrosion"];

    fn single(label: &str, value: &str) -> Properties {
        let mut p = Properties::new();
        p.insert(label.to_string(), value.to_string());
        p
    }

    #[test]
    fn tiers_map_to_fixed_scores() {
        let cases = [
            ("Excellent corrosion resistance", 95.0),
            ("Good", 75.0),
            ("fair in chloride environments", 50.0),
            ("Poor", 25.0),
        ];
        for (text, expected) in cases {
            let p = single("Corrosion Resistance", text);
            assert_eq!(map_qualitative(&p, CORROSION), expected, "{text}");
        }
    }

    #[test]
    fn absent_label_is_neutral() {
        let p = single("Density", "2.7 g/cm3");
        assert_eq!(map_qualitative(&p, CORROSION), 50.0);
    }

    #[test]
    fn unrecognised_rating_is_neutral() {
        let p = single("Corrosion", "Moderate");
        assert_eq!(map_qualitative(&p, CORROSION), 50.0);
    }

    #[test]
    fn best_tier_wins_when_several_appear() {
        assert_eq!(
            QualitativeTier::classify("good to excellent"),
            Some(QualitativeTier::Excellent)
        );
        assert_eq!(
            QualitativeTier::classify("poor to fair"),
            Some(QualitativeTier::Fair)
        );
    }
}
