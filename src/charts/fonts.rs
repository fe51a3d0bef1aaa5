//! Embedded chart fonts.
//!
//! plotters' ab_glyph backend only knows the fonts registered with it, so the
//! DejaVu Sans faces are compiled into the binary and registered once under
//! the `sans-serif` family. Chart rendering therefore works on headless hosts
//! with no fontconfig.

use crate::error::ChartError;
use once_cell::sync::Lazy;
use plotters::style::{register_font, FontStyle};

static REGULAR: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
static BOLD: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

/// Family name every chart text style uses.
pub const FAMILY: &str = "sans-serif";

static REGISTERED: Lazy<Result<(), String>> = Lazy::new(|| {
    register_font(FAMILY, FontStyle::Normal, REGULAR)
        .map_err(|_| "regular face: invalid font data".to_string())?;
    register_font(FAMILY, FontStyle::Bold, BOLD)
        .map_err(|_| "bold face: invalid font data".to_string())?;
    Ok(())
});

/// Register the embedded fonts (idempotent).
pub fn ensure_registered() -> Result<(), ChartError> {
    REGISTERED.clone().map_err(ChartError::Font)
}
