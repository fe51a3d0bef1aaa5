//! Per-material attribute vectors, raw and normalized.

use crate::analysis::attribute::{Attribute, Scoring};
use crate::analysis::normalize::normalize;
use crate::model::MaterialMatch;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// One value per [`Attribute`], in [`Attribute::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AttributeVector([f64; 5]);

impl AttributeVector {
    pub fn new(values: [f64; 5]) -> Self {
        Self(values)
    }

    pub fn get(&self, attribute: Attribute) -> f64 {
        self.0[attribute as usize]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }
}

impl Index<Attribute> for AttributeVector {
    type Output = f64;

    fn index(&self, attribute: Attribute) -> &f64 {
        &self.0[attribute as usize]
    }
}

/// A material with its raw attribute values and their normalized scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMaterial {
    pub name: String,
    pub raw: AttributeVector,
    pub scores: AttributeVector,
}

/// Score every material against the others.
///
/// Numeric attributes are normalized per column across `matches`; the
/// corrosion rating is passed through. Recomputed on every call; the result
/// depends on the whole comparison set, so nothing is cached.
pub fn score_matches(matches: &[MaterialMatch]) -> Vec<ScoredMaterial> {
    let raw: Vec<AttributeVector> = matches
        .iter()
        .map(|m| AttributeVector(Attribute::ALL.map(|a| a.raw_value(&m.properties))))
        .collect();

    let columns: Vec<Vec<f64>> = Attribute::ALL
        .iter()
        .map(|&attribute| {
            let column: Vec<f64> = raw.iter().map(|v| v[attribute]).collect();
            match attribute.scoring() {
                Scoring::Numeric(direction) => normalize(&column, direction),
                Scoring::Qualitative => column,
            }
        })
        .collect();

    matches
        .iter()
        .zip(raw)
        .enumerate()
        .map(|(i, (m, raw))| ScoredMaterial {
            name: m.name.clone(),
            raw,
            scores: AttributeVector(std::array::from_fn(|a| columns[a][i])),
        })
        .collect()
}

/// `(material name, raw value)` pairs for one attribute, in match order.
pub fn attribute_series(matches: &[MaterialMatch], attribute: Attribute) -> Vec<(String, f64)> {
    matches
        .iter()
        .map(|m| (m.name.clone(), attribute.raw_value(&m.properties)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steel_and_aluminium() -> Vec<MaterialMatch> {
        vec![
            MaterialMatch::new("AISI 304")
                .with_property("Tensile Strength", "505 MPa")
                .with_property("Density", "8.0 g/cm3")
                .with_property("Corrosion Resistance", "Excellent"),
            MaterialMatch::new("Al 6061")
                .with_property("Tensile Strength", "310 MPa")
                .with_property("Density", "2.7 g/cm3"),
        ]
    }

    #[test]
    fn lighter_material_scores_higher_on_density() {
        let scored = score_matches(&steel_and_aluminium());
        assert_eq!(scored.len(), 2);
        let steel = &scored[0];
        let alu = &scored[1];
        assert!(alu.scores[Attribute::Density] > steel.scores[Attribute::Density]);
        assert_eq!(steel.scores[Attribute::Density], 0.0);
    }

    #[test]
    fn strength_is_relative_to_strongest() {
        let scored = score_matches(&steel_and_aluminium());
        assert_eq!(scored[0].scores[Attribute::Strength], 100.0);
        let expected = 310.0 / 505.0 * 100.0;
        assert!((scored[1].scores[Attribute::Strength] - expected).abs() < 1e-9);
    }

    #[test]
    fn corrosion_is_passed_through() {
        let scored = score_matches(&steel_and_aluminium());
        assert_eq!(scored[0].scores[Attribute::Corrosion], 95.0);
        assert_eq!(scored[1].scores[Attribute::Corrosion], 50.0);
        assert_eq!(scored[0].raw.get(Attribute::Corrosion), 95.0);
    }

    #[test]
    fn empty_properties_are_degenerate_not_nan() {
        let matches = vec![MaterialMatch::new("A"), MaterialMatch::new("B")];
        for m in score_matches(&matches) {
            assert_eq!(m.scores.as_slice(), &[0.0, 100.0, 100.0, 50.0, 0.0]);
        }
    }

    #[test]
    fn scores_stay_in_range() {
        let scored = score_matches(&steel_and_aluminium());
        for m in &scored {
            assert!(m.scores.as_slice().iter().all(|v| (0.0..=100.0).contains(v)));
        }
    }

    #[test]
    fn no_matches_no_scores() {
        assert!(score_matches(&[]).is_empty());
    }

    #[test]
    fn series_keeps_match_order() {
        let series = attribute_series(&steel_and_aluminium(), Attribute::Strength);
        assert_eq!(
            series,
            vec![("AISI 304".to_string(), 505.0), ("Al 6061".to_string(), 310.0)]
        );
    }
}
