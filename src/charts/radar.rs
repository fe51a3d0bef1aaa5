//! Multi-axis radar chart of normalized scores.
//!
//! Drawn directly in pixel space: axis `k` of `n` sits at angle `k / n · 2π`
//! (counter-clockwise from 3 o'clock), every ring is on the same 0–100 scale,
//! and each material is a closed polygon with its own colour and dash pattern.

use crate::charts::encode::encode_png;
use crate::charts::fonts::{self, FAMILY};
use crate::charts::ChartStyle;
use crate::error::ChartError;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::f64::consts::PI;
use tracing::debug;

/// Trace colours, cycled per material.
pub const PALETTE: [RGBColor; 5] = [
    RGBColor(0xe7, 0x4c, 0x3c),
    RGBColor(0x34, 0x98, 0xdb),
    RGBColor(0x2e, 0xcc, 0x71),
    RGBColor(0x9b, 0x59, 0xb6),
    RGBColor(0xf1, 0xc4, 0x0f),
];

/// Ring values drawn and labelled on the radial axis.
pub const RINGS: [f64; 5] = [20.0, 40.0, 60.0, 80.0, 100.0];

const TITLE: &str = "Material Performance Comparison";
const SCALE_MAX: f64 = 100.0;
const RING_COLOR: RGBColor = RGBColor(0xbb, 0xbb, 0xbb);
const LABEL_COLOR: RGBColor = RGBColor(0x80, 0x80, 0x80);

/// Trace line style, cycled per material alongside [`PALETTE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    DashDot,
    Dotted,
}

impl LineStyle {
    pub const CYCLE: [LineStyle; 5] = [
        LineStyle::Solid,
        LineStyle::Dashed,
        LineStyle::DashDot,
        LineStyle::Dotted,
        LineStyle::Solid,
    ];

    /// Alternating on/off run lengths in pixels; empty for a solid line.
    pub fn dash_pattern(self) -> &'static [f64] {
        match self {
            LineStyle::Solid => &[],
            LineStyle::Dashed => &[14.0, 7.0],
            LineStyle::DashDot => &[14.0, 5.0, 3.0, 5.0],
            LineStyle::Dotted => &[3.0, 5.0],
        }
    }

    pub fn for_index(i: usize) -> Self {
        Self::CYCLE[i % Self::CYCLE.len()]
    }
}

/// One material's trace: a score per axis.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarSeries {
    pub name: String,
    pub values: Vec<f64>,
}

impl RadarSeries {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Values with the first point repeated at the end, closing the polygon.
    pub fn closed_values(&self) -> Vec<f64> {
        close_loop(&self.values)
    }
}

/// Repeat the first element at the end.
pub fn close_loop(values: &[f64]) -> Vec<f64> {
    let mut closed = values.to_vec();
    if let Some(&first) = values.first() {
        closed.push(first);
    }
    closed
}

/// Axis angles `k / n · 2π` for `k = 0..n`, closed by repeating the first.
pub fn axis_angles(n: usize) -> Vec<f64> {
    let angles: Vec<f64> = (0..n).map(|k| k as f64 / n as f64 * 2.0 * PI).collect();
    close_loop(&angles)
}

/// Pixel position of `value` (0–100) on the axis at `angle`.
fn polar_point(center: (f64, f64), radius: f64, angle: f64, value: f64) -> (f64, f64) {
    let r = radius * value.clamp(0.0, SCALE_MAX) / SCALE_MAX;
    (center.0 + r * angle.cos(), center.1 - r * angle.sin())
}

fn to_pixel((x, y): (f64, f64)) -> (i32, i32) {
    (x.round() as i32, y.round() as i32)
}

/// Split a polyline into its visible runs for an on/off dash `pattern`.
///
/// The pattern must have even length; an empty pattern returns the polyline
/// unchanged as a single run.
pub fn dash_polyline(points: &[(f64, f64)], pattern: &[f64]) -> Vec<Vec<(f64, f64)>> {
    if points.len() < 2 || pattern.is_empty() || pattern.iter().all(|p| *p <= 0.0) {
        return vec![points.to_vec()];
    }

    let mut runs = Vec::new();
    let mut current = vec![points[0]];
    let mut phase = 0usize;
    let mut remaining = pattern[0];

    for segment in points.windows(2) {
        let (mut x0, mut y0) = segment[0];
        let (x1, y1) = segment[1];
        let mut length = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();

        while length > remaining {
            let t = remaining / length;
            let split = (x0 + (x1 - x0) * t, y0 + (y1 - y0) * t);
            if phase % 2 == 0 {
                current.push(split);
                runs.push(std::mem::take(&mut current));
            } else {
                current = vec![split];
            }
            length -= remaining;
            (x0, y0) = split;
            phase = (phase + 1) % pattern.len();
            remaining = pattern[phase];
        }

        remaining -= length;
        if phase % 2 == 0 {
            current.push((x1, y1));
        }
    }

    if phase % 2 == 0 && current.len() > 1 {
        runs.push(current);
    }
    runs
}

/// Render a radar chart with one closed trace per series.
///
/// Every series must have exactly one value per entry of `axes`.
pub fn render_radar_chart(
    series: &[RadarSeries],
    axes: &[&str],
    style: &ChartStyle,
) -> Result<Vec<u8>, ChartError> {
    if let Some(bad) = series.iter().find(|s| s.values.len() != axes.len()) {
        return Err(ChartError::ShapeMismatch {
            series: bad.name.clone(),
            expected: axes.len(),
            got: bad.values.len(),
        });
    }
    fonts::ensure_registered()?;

    let (width, height) = style.radar_size;
    let (w, h) = (width as f64, height as f64);
    let mut buf = vec![0u8; width as usize * height as usize * 3];

    let center = (w * 0.45, h * 0.55);
    let radius = w.min(h) * 0.32;
    let angles = axis_angles(axes.len());

    let font = |size: f64, style: FontStyle| FontDesc::new(FontFamily::Name(FAMILY), size, style);

    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        root.draw(&Text::new(
            TITLE,
            to_pixel((w / 2.0, h * 0.03)),
            TextStyle::from(font(30.0, FontStyle::Bold))
                .color(&RGBColor(0x33, 0x33, 0x33))
                .pos(Pos::new(HPos::Center, VPos::Top)),
        ))?;

        // Rings and their labels along the first axis.
        let ring_label = TextStyle::from(font(14.0, FontStyle::Normal))
            .color(&LABEL_COLOR)
            .pos(Pos::new(HPos::Left, VPos::Bottom));
        for ring in RINGS {
            let outline: Vec<(i32, i32)> = (0..=72)
                .map(|i| {
                    let a = i as f64 / 72.0 * 2.0 * PI;
                    to_pixel(polar_point(center, radius, a, ring))
                })
                .collect();
            root.draw(&PathElement::new(outline, RING_COLOR.stroke_width(1)))?;
            let anchor = to_pixel(polar_point(center, radius, 0.0, ring));
            root.draw(&Text::new(
                format!("{ring:.0}"),
                (anchor.0 + 3, anchor.1 - 2),
                ring_label.clone(),
            ))?;
        }

        // Spokes and axis labels.
        for (axis, &angle) in axes.iter().zip(&angles) {
            let tip = to_pixel(polar_point(center, radius, angle, SCALE_MAX));
            root.draw(&PathElement::new(
                vec![to_pixel(center), tip],
                RING_COLOR.stroke_width(1),
            ))?;

            let (lx, ly) = polar_point(center, radius * 1.12, angle, SCALE_MAX);
            let hpos = match angle.cos() {
                c if c > 0.2 => HPos::Left,
                c if c < -0.2 => HPos::Right,
                _ => HPos::Center,
            };
            root.draw(&Text::new(
                axis.to_string(),
                to_pixel((lx, ly)),
                TextStyle::from(font(18.0, FontStyle::Bold)).pos(Pos::new(hpos, VPos::Center)),
            ))?;
        }

        // Traces.
        for (i, s) in series.iter().enumerate() {
            let color = PALETTE[i % PALETTE.len()];
            let line = LineStyle::for_index(i);
            let points: Vec<(f64, f64)> = s
                .closed_values()
                .iter()
                .zip(&angles)
                .map(|(&v, &a)| polar_point(center, radius, a, v))
                .collect();

            root.draw(&Polygon::new(
                points.iter().copied().map(to_pixel).collect::<Vec<_>>(),
                color.mix(0.1).filled(),
            ))?;
            for run in dash_polyline(&points, line.dash_pattern()) {
                root.draw(&PathElement::new(
                    run.into_iter().map(to_pixel).collect::<Vec<_>>(),
                    color.stroke_width(3),
                ))?;
            }
        }

        // Legend, top right.
        let legend_x = (w * 0.74) as i32;
        let legend_top = (h * 0.1) as i32;
        let legend_font = TextStyle::from(font(16.0, FontStyle::Normal))
            .pos(Pos::new(HPos::Left, VPos::Center));
        for (i, s) in series.iter().enumerate() {
            let color = PALETTE[i % PALETTE.len()];
            let y = legend_top + i as i32 * 26;
            let sample = [(legend_x as f64, y as f64), (legend_x as f64 + 36.0, y as f64)];
            for run in dash_polyline(&sample, LineStyle::for_index(i).dash_pattern()) {
                root.draw(&PathElement::new(
                    run.into_iter().map(to_pixel).collect::<Vec<_>>(),
                    color.stroke_width(3),
                ))?;
            }
            root.draw(&Text::new(
                s.name.clone(),
                (legend_x + 44, y),
                legend_font.clone(),
            ))?;
        }

        root.present()?;
    }

    debug!(
        "Rendered radar chart: {} trace(s) over {} axes",
        series.len(),
        axes.len()
    );
    encode_png(width, height, buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    const AXES: [&str; 5] = ["Strength", "Density", "Cost", "Corrosion", "Temp"];

    #[test]
    fn angles_are_evenly_spaced_and_closed() {
        let angles = axis_angles(5);
        assert_eq!(angles.len(), 6);
        assert_eq!(angles[0], 0.0);
        assert_eq!(angles[5], angles[0]);
        assert!((angles[1] - 2.0 * PI / 5.0).abs() < 1e-12);
        assert!((angles[4] - 8.0 * PI / 5.0).abs() < 1e-12);
    }

    #[test]
    fn values_are_closed_before_plotting() {
        let s = RadarSeries::new("A", vec![10.0, 20.0, 30.0]);
        assert_eq!(s.closed_values(), vec![10.0, 20.0, 30.0, 10.0]);
        assert!(close_loop(&[]).is_empty());
    }

    #[test]
    fn polar_point_orientation() {
        let c = (100.0, 100.0);
        let (x, y) = polar_point(c, 50.0, 0.0, 100.0);
        assert!((x - 150.0).abs() < 1e-9 && (y - 100.0).abs() < 1e-9);
        // A quarter turn points up on screen.
        let (x, y) = polar_point(c, 50.0, PI / 2.0, 50.0);
        assert!((x - 100.0).abs() < 1e-9 && (y - 75.0).abs() < 1e-9);
    }

    #[test]
    fn dash_splits_straight_line() {
        let runs = dash_polyline(&[(0.0, 0.0), (10.0, 0.0)], &[3.0, 2.0]);
        assert_eq!(
            runs,
            vec![vec![(0.0, 0.0), (3.0, 0.0)], vec![(5.0, 0.0), (8.0, 0.0)]]
        );
    }

    #[test]
    fn dash_carries_across_vertices() {
        let runs = dash_polyline(&[(0.0, 0.0), (2.0, 0.0), (2.0, 4.0)], &[3.0, 2.0]);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0], vec![(0.0, 0.0), (2.0, 0.0), (2.0, 1.0)]);
        assert_eq!(runs[1], vec![(2.0, 3.0), (2.0, 4.0)]);
    }

    #[test]
    fn solid_line_is_one_run() {
        let pts = [(0.0, 0.0), (5.0, 5.0), (9.0, 1.0)];
        assert_eq!(dash_polyline(&pts, LineStyle::Solid.dash_pattern()), vec![pts.to_vec()]);
    }

    #[test]
    fn styles_and_colours_cycle() {
        assert_eq!(LineStyle::for_index(0), LineStyle::Solid);
        assert_eq!(LineStyle::for_index(1), LineStyle::Dashed);
        assert_eq!(LineStyle::for_index(5), LineStyle::Solid);
        assert_eq!(LineStyle::for_index(6), LineStyle::Dashed);
    }

    #[test]
    fn rejects_wrong_vector_length() {
        let series = [RadarSeries::new("Short", vec![1.0, 2.0])];
        let err = render_radar_chart(&series, &AXES, &ChartStyle::default()).unwrap_err();
        assert!(matches!(err, ChartError::ShapeMismatch { expected: 5, got: 2, .. }));
    }

    #[test]
    fn renders_two_traces() {
        let series = [
            RadarSeries::new("AISI 304", vec![100.0, 0.0, 100.0, 95.0, 0.0]),
            RadarSeries::new("Al 6061", vec![61.4, 66.3, 100.0, 50.0, 0.0]),
        ];
        let style = ChartStyle {
            radar_size: (400, 400),
            ..ChartStyle::default()
        };
        let png = render_radar_chart(&series, &AXES, &style).expect("render");
        let img = image::load_from_memory(&png).expect("png").to_rgb8();
        assert_eq!(img.dimensions(), (400, 400));

        for color in &PALETTE[..2] {
            let present = img.pixels().any(|p| p.0 == [color.0, color.1, color.2]);
            assert!(present, "trace colour {color:?} missing");
        }
        let third = PALETTE[2];
        assert!(!img.pixels().any(|p| p.0 == [third.0, third.1, third.2]));
    }
}
