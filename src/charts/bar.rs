//! Labeled bar chart: one bar per material, value annotated on top.

use crate::charts::encode::encode_png;
use crate::charts::fonts::{self, FAMILY};
use crate::charts::ChartStyle;
use crate::error::ChartError;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::debug;

const TITLE_COLOR: RGBColor = RGBColor(0x33, 0x33, 0x33);
const GRID_COLOR: RGBColor = RGBColor(0xcc, 0xcc, 0xcc);

/// What a bar chart shows; the data is passed separately.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChartSpec {
    pub title: String,
    pub y_label: String,
    pub color: RGBColor,
}

impl BarChartSpec {
    pub fn new(title: impl Into<String>, y_label: impl Into<String>, color: RGBColor) -> Self {
        Self {
            title: title.into(),
            y_label: y_label.into(),
            color,
        }
    }
}

/// Upper bound of the value axis: 10 % headroom above the tallest bar so the
/// annotations fit, or 1.0 when nothing is positive.
fn y_axis_top(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0_f64, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

/// Render `data` as a PNG bar chart, bars left to right in input order.
pub fn render_bar_chart(
    data: &[(String, f64)],
    spec: &BarChartSpec,
    style: &ChartStyle,
) -> Result<Vec<u8>, ChartError> {
    fonts::ensure_registered()?;

    let (width, height) = style.bar_size;
    let mut buf = vec![0u8; width as usize * height as usize * 3];
    let slots = data.len().max(1);
    let y_top = y_axis_top(data.iter().map(|(_, v)| *v));

    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                &spec.title,
                FontDesc::new(FontFamily::Name(FAMILY), 28.0, FontStyle::Bold).color(&TITLE_COLOR),
            )
            .margin(24)
            .x_label_area_size(56)
            .y_label_area_size(80)
            .build_cartesian_2d((0..slots).into_segmented(), 0.0..y_top)?;

        let names: Vec<&str> = data.iter().map(|(name, _)| name.as_str()).collect();
        chart
            .configure_mesh()
            .disable_x_mesh()
            .light_line_style(&WHITE)
            .bold_line_style(&GRID_COLOR.mix(0.6))
            .x_labels(slots)
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => names.get(*i).map(|s| s.to_string()).unwrap_or_default(),
                _ => String::new(),
            })
            .y_label_formatter(&|v| format!("{v:.0}"))
            .label_style(FontDesc::new(FontFamily::Name(FAMILY), 16.0, FontStyle::Normal))
            .x_desc("Materials")
            .y_desc(spec.y_label.as_str())
            .axis_desc_style(FontDesc::new(FontFamily::Name(FAMILY), 18.0, FontStyle::Bold))
            .draw()?;

        // Bars take 60 % of their slot.
        let plot_width = chart.plotting_area().dim_in_pixel().0;
        let gap = plot_width / slots as u32 / 5;

        let bar = |i: usize, v: f64, shape: ShapeStyle| {
            let mut rect = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), v)],
                shape,
            );
            rect.set_margin(0, 0, gap, gap);
            rect
        };

        chart.draw_series(
            data.iter()
                .enumerate()
                .map(|(i, (_, v))| bar(i, *v, spec.color.mix(0.8).filled())),
        )?;
        chart.draw_series(
            data.iter()
                .enumerate()
                .map(|(i, (_, v))| bar(i, *v, BLACK.stroke_width(1))),
        )?;

        let annotation = TextStyle::from(FontDesc::new(
            FontFamily::Name(FAMILY),
            16.0,
            FontStyle::Bold,
        ))
        .pos(Pos::new(HPos::Center, VPos::Bottom));
        chart.draw_series(data.iter().enumerate().map(|(i, (_, v))| {
            Text::new(
                format!("{v:.1}"),
                (SegmentValue::CenterOf(i), v + y_top * 0.01),
                annotation.clone(),
            )
        }))?;

        root.present()?;
    }

    debug!("Rendered bar chart '{}' with {} bars", spec.title, data.len());
    encode_png(width, height, buf)
}
