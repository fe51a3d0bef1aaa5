//! Numeric token extraction from free-text property values.

/// Extract the first number from a free-text value such as `"450 MPa"`.
///
/// Takes the first maximal run of ASCII digits and `.` characters and parses
/// it as `f64`. Returns 0.0 when the text is absent, has no such run, or the
/// run does not parse (`"."`, `"1.2.3"`) or overflows to infinity. Signs are not part of the token, so
/// `"-40 °C"` reads as 40.0.
pub fn parse_value(text: Option<&str>) -> f64 {
    let Some(text) = text else {
        return 0.0;
    };

    let is_token = |c: char| c.is_ascii_digit() || c == '.';
    let Some(start) = text.find(is_token) else {
        return 0.0;
    };
    let rest = &text[start..];
    let end = rest.find(|c: char| !is_token(c)).unwrap_or(rest.len());

    match rest[..end].parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}
