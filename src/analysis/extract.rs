//! Keyword lookup over free-text property labels.
//!
//! The extraction step does not produce a fixed schema, so a semantic
//! attribute is located by case-insensitive substring search over the labels.
//! Labels are scanned in insertion order and the first hit wins, even when a
//! later label would be a closer match ("Yield Strength" shadows "Tensile
//! Strength" for the `["tensile", "strength"]` set if it comes first).

use crate::analysis::value::parse_value;
use crate::model::Properties;

/// Return the first `(label, value)` whose label contains any of `keywords`.
///
/// Keywords are expected in lowercase.
pub fn find_property<'a>(
    properties: &'a Properties,
    keywords: &[&str],
) -> Option<(&'a str, &'a str)> {
    properties.iter().find_map(|(label, value)| {
        let label_lower = label.to_lowercase();
        keywords
            .iter()
            .any(|k| label_lower.contains(k))
            .then_some((label.as_str(), value.as_str()))
    })
}

/// Numeric value of the first property matching `keywords`, or 0.0.
pub fn extract_numeric(properties: &Properties, keywords: &[&str]) -> f64 {
    find_property(properties, keywords)
        .map(|(_, value)| parse_value(Some(value)))
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn finds_tensile_strength() {
        let p = props(&[("Tensile Strength", "500 MPa"), ("Density", "7.8 g/cm3")]);
        assert_eq!(extract_numeric(&p, &["tensile", "strength"]), 500.0);
        assert_eq!(extract_numeric(&p, &["density"]), 7.8);
    }

    #[test]
    fn first_label_in_insertion_order_wins() {
        let p = props(&[("Yield Strength", "215 MPa"), ("Tensile Strength", "505 MPa")]);
        assert_eq!(extract_numeric(&p, &["tensile", "strength"]), 215.0);
        assert_eq!(
            find_property(&p, &["tensile", "strength"]),
            Some(("Yield Strength", "215 MPa"))
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        let p = props(&[("MELTING POINT", "1400 °C")]);
        assert_eq!(extract_numeric(&p, &["temp", "melting"]), 1400.0);
    }

    #[test]
    fn unmatched_label_is_zero() {
        let p = props(&[("Hardness", "70 HRB")]);
        assert_eq!(extract_numeric(&p, &["density"]), 0.0);
        assert_eq!(extract_numeric(&Properties::new(), &["density"]), 0.0);
    }

    #[test]
    fn matched_label_with_unparseable_value_is_zero() {
        // The first match is used even when its value carries no number.
        let p = props(&[("Density", "light"), ("Density (approx)", "2.7")]);
        assert_eq!(extract_numeric(&p, &["density"]), 0.0);
    }

    #[test]
    fn lookup_is_repeatable() {
        let p = props(&[("Tensile Strength", "500 MPa")]);
        let first = extract_numeric(&p, &["tensile", "strength"]);
        let second = extract_numeric(&p, &["tensile", "strength"]);
        assert_eq!(first, second);
    }
}
