//! Report content and page layout, independent of the PDF engine.
//!
//! [`ReportLayout::build`] turns a session and its report data into an ordered
//! list of [`Block`]s; [`paginate`] places them on US-Letter pages as absolute
//! [`DrawOp`]s in PDF points (origin bottom-left). Only [`render_pdf`] touches
//! pdfium, so everything here is testable without the native library.
//!
//! ```text
//!   ChatSession ─┐
//!   ReportData  ─┼─▶ ReportLayout::build ─▶ [Block] ─▶ paginate ─▶ [PagePlan] ─▶ render_pdf
//!   ChartSet    ─┘
//! ```
//!
//! [`render_pdf`]: crate::report::render_pdf

use crate::charts::{ChartKind, ChartSet};
use crate::model::{ChatSession, ReportData};
use chrono::{DateTime, Utc};

pub const REPORT_TITLE: &str = "Material Intelligence Agent - Engineering Report";

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const MARGIN: f32 = 72.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const TITLE_SIZE: f32 = 18.0;
const HEADING_SIZE: f32 = 14.0;
const SUBHEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;
const LEADING: f32 = 1.2;
const CELL_PADDING: f32 = 4.0;

/// Table column widths in points: material name, properties.
pub const TABLE_COLUMNS: [f32; 2] = [150.0, 300.0];

pub type Rgb = (u8, u8, u8);

pub const HEADER_FILL: Rgb = (128, 128, 128);
pub const BODY_FILL: Rgb = (245, 245, 220);

/// One element of the report, top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    /// Bold label followed by a regular value on the same line.
    Field { label: String, value: String },
    Heading(String),
    Subheading(String),
    Paragraph(String),
    Bullet(String),
    Table {
        header: [String; 2],
        rows: Vec<[String; 2]>,
    },
    Image {
        kind: ChartKind,
        png: Vec<u8>,
        width: f32,
        height: f32,
    },
    Spacer(f32),
}

/// The full report as an ordered list of blocks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportLayout {
    pub blocks: Vec<Block>,
}

/// Displayed size of a chart in points.
pub fn chart_size(kind: ChartKind) -> (f32, f32) {
    match kind {
        ChartKind::Radar => (400.0, 400.0),
        ChartKind::Tensile | ChartKind::Density => (400.0, 250.0),
    }
}

fn or_placeholder(text: &str, placeholder: &str) -> String {
    if text.trim().is_empty() {
        placeholder.to_string()
    } else {
        text.to_string()
    }
}

impl ReportLayout {
    /// Lay out the five report sections for `session`.
    pub fn build(
        session: &ChatSession,
        report: &ReportData,
        charts: &ChartSet,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let mut b = Vec::new();

        b.push(Block::Title(REPORT_TITLE.to_string()));
        b.push(Block::Spacer(12.0));
        b.push(Block::Field {
            label: "Date:".into(),
            value: generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        });
        b.push(Block::Field {
            label: "Session ID:".into(),
            value: session.id.clone(),
        });
        b.push(Block::Spacer(12.0));
        b.push(Block::Field {
            label: "Project:".into(),
            value: or_placeholder(&session.title, "Untitled Project"),
        });
        b.push(Block::Spacer(24.0));

        b.push(Block::Heading("1. Design Constraints".into()));
        if report.constraints.is_empty() {
            b.push(Block::Paragraph("No specific constraints identified.".into()));
        } else {
            b.extend(report.constraints.iter().cloned().map(Block::Bullet));
        }
        b.push(Block::Spacer(12.0));

        b.push(Block::Heading("2. Material Matches & Comparison".into()));
        if report.matches.is_empty() {
            b.push(Block::Paragraph("No specific material matches found yet.".into()));
        } else {
            let rows = report
                .matches
                .iter()
                .map(|m| {
                    let props = m
                        .properties
                        .iter()
                        .map(|(k, v)| format!("{k}: {v}"))
                        .collect::<Vec<_>>()
                        .join(", ");
                    [m.name.clone(), props]
                })
                .collect();
            b.push(Block::Table {
                header: ["Material".into(), "Properties".into()],
                rows,
            });
        }
        b.push(Block::Spacer(12.0));

        b.push(Block::Heading("3. Material Property Visualizations".into()));
        if charts.is_empty() {
            b.push(Block::Paragraph("Not enough data to generate charts.".into()));
        } else {
            for (kind, png) in charts.iter() {
                let (width, height) = chart_size(kind);
                b.push(Block::Subheading(kind.caption().to_string()));
                b.push(Block::Image {
                    kind,
                    png: png.to_vec(),
                    width,
                    height,
                });
                b.push(Block::Spacer(12.0));
            }
        }
        b.push(Block::Spacer(12.0));

        b.push(Block::Heading("4. AI Analysis".into()));
        b.push(Block::Paragraph(or_placeholder(
            &report.explanation,
            "No explanation available.",
        )));
        b.push(Block::Spacer(12.0));

        b.push(Block::Heading("5. Final Recommendation".into()));
        b.push(Block::Subheading(or_placeholder(&report.recommendation, "Pending")));
        b.push(Block::Spacer(12.0));

        Self { blocks: b }
    }

    /// Plain-text rendering of the text blocks, used for previews and tests.
    pub fn text_lines(&self) -> Vec<String> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Title(t) | Block::Heading(t) | Block::Subheading(t) | Block::Paragraph(t) => {
                    Some(t.clone())
                }
                Block::Field { label, value } => Some(format!("{label} {value}")),
                Block::Bullet(t) => Some(format!("• {t}")),
                Block::Table { header, rows } => Some(
                    std::iter::once(header)
                        .chain(rows)
                        .map(|[a, b]| format!("{a} | {b}"))
                        .collect::<Vec<_>>()
                        .join("\n"),
                ),
                Block::Image { kind, .. } => Some(format!("[{kind} chart]")),
                Block::Spacer(_) => None,
            })
            .collect()
    }
}

// ── Text metrics ─────────────────────────────────────────────────────────

/// Approximate Helvetica advance width of `text` at `size` points.
pub fn text_width(text: &str, size: f32, bold: bool) -> f32 {
    let em = if bold { 0.55 } else { 0.5 };
    text.chars().count() as f32 * size * em
}

/// Greedy word wrap to `max_width` points. Explicit newlines start new lines;
/// a word wider than a line is split by characters.
pub fn wrap_text(text: &str, size: f32, bold: bool, max_width: f32) -> Vec<String> {
    let max_chars = ((max_width / (size * if bold { 0.55 } else { 0.5 })).floor() as usize).max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                lines.push(word.drain(..max_chars).collect());
            }
            let word: String = word.into_iter().collect();
            if word.is_empty() {
                continue;
            }
            let needed = line.chars().count() + usize::from(!line.is_empty()) + word.chars().count();
            if needed > max_chars && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&word);
        }
        lines.push(line);
    }

    // Drop blank lines produced by trailing newlines, keep at least one line.
    while lines.len() > 1 && lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

// ── Pagination ───────────────────────────────────────────────────────────

/// A positioned drawing instruction in PDF points.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Text with its baseline at `y`.
    Text {
        x: f32,
        y: f32,
        text: String,
        size: f32,
        bold: bool,
        color: Rgb,
    },
    /// Rectangle with its lower-left corner at (`x`, `y`).
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Rgb>,
        stroke: bool,
    },
    /// The image of `layout.blocks[block]`, lower-left corner at (`x`, `y`).
    Image {
        block: usize,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

/// Everything drawn on one page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PagePlan {
    pub ops: Vec<DrawOp>,
}

struct Cursor {
    pages: Vec<PagePlan>,
    y: f32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: vec![PagePlan::default()],
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn remaining(&self) -> f32 {
        self.y - MARGIN
    }

    fn at_page_top(&self) -> bool {
        self.y >= PAGE_HEIGHT - MARGIN
    }

    fn new_page(&mut self) {
        self.pages.push(PagePlan::default());
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Start a new page unless `height` fits or the page is still empty.
    fn reserve(&mut self, height: f32) {
        if height > self.remaining() && !self.at_page_top() {
            self.new_page();
        }
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn text_lines(&mut self, lines: &[String], x: f32, size: f32, bold: bool, centered: bool) {
        let line_height = size * LEADING;
        for line in lines {
            self.reserve(line_height);
            let x = if centered {
                (PAGE_WIDTH - text_width(line, size, bold)) / 2.0
            } else {
                x
            };
            self.y -= line_height;
            self.push(DrawOp::Text {
                x,
                y: self.y + (line_height - size),
                text: line.clone(),
                size,
                bold,
                color: (0, 0, 0),
            });
        }
    }
}

/// Lay out one table row. A row taller than a page is split between lines
/// into segments, each filling the rest of its page.
fn table_row(
    cursor: &mut Cursor,
    cells: &[String; 2],
    header: bool,
) {
    let wrapped: Vec<Vec<String>> = cells
        .iter()
        .zip(TABLE_COLUMNS)
        .map(|(text, width)| wrap_text(text, BODY_SIZE, header, width - 2.0 * CELL_PADDING))
        .collect();
    let total = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);
    let line_height = BODY_SIZE * LEADING;
    let bottom_pad = if header { 12.0 } else { CELL_PADDING };
    let padding = CELL_PADDING + bottom_pad;

    let lines_per_page = ((PAGE_HEIGHT - 2.0 * MARGIN - padding) / line_height).floor() as usize;
    if total <= lines_per_page {
        cursor.reserve(total as f32 * line_height + padding);
    }

    let mut start = 0;
    while start < total {
        let mut fit = ((cursor.remaining() - padding) / line_height).floor().max(0.0) as usize;
        if fit == 0 {
            if !cursor.at_page_top() {
                cursor.new_page();
                continue;
            }
            fit = 1;
        }
        let end = (start + fit).min(total);
        row_segment(cursor, &wrapped, start..end, header, bottom_pad);
        start = end;
        if start < total {
            cursor.new_page();
        }
    }
}

fn row_segment(
    cursor: &mut Cursor,
    wrapped: &[Vec<String>],
    lines: std::ops::Range<usize>,
    header: bool,
    bottom_pad: f32,
) {
    let line_height = BODY_SIZE * LEADING;
    let height = lines.len() as f32 * line_height + CELL_PADDING + bottom_pad;
    let top = cursor.y;
    let mut x = MARGIN;
    for (cell_lines, width) in wrapped.iter().zip(TABLE_COLUMNS) {
        cursor.push(DrawOp::Rect {
            x,
            y: top - height,
            width,
            height,
            fill: Some(if header { HEADER_FILL } else { BODY_FILL }),
            stroke: true,
        });
        let visible = cell_lines.iter().skip(lines.start).take(lines.len());
        for (i, line) in visible.enumerate() {
            cursor.push(DrawOp::Text {
                x: x + CELL_PADDING,
                y: top - CELL_PADDING - (i as f32 + 1.0) * line_height + (line_height - BODY_SIZE),
                text: line.clone(),
                size: BODY_SIZE,
                bold: header,
                color: if header { (245, 245, 245) } else { (0, 0, 0) },
            });
        }
        x += width;
    }
    cursor.y = top - height;
}

/// Place `layout` onto US-Letter pages.
pub fn paginate(layout: &ReportLayout) -> Vec<PagePlan> {
    let mut cursor = Cursor::new();

    for (index, block) in layout.blocks.iter().enumerate() {
        match block {
            Block::Title(text) => {
                let lines = wrap_text(text, TITLE_SIZE, true, CONTENT_WIDTH);
                cursor.text_lines(&lines, MARGIN, TITLE_SIZE, true, true);
            }
            Block::Heading(text) | Block::Subheading(text) => {
                let size = if matches!(block, Block::Heading(_)) {
                    HEADING_SIZE
                } else {
                    SUBHEADING_SIZE
                };
                let lines = wrap_text(text, size, true, CONTENT_WIDTH);
                // Keep a heading with at least one following body line.
                cursor.reserve(size * LEADING * (lines.len() as f32 + 0.5) + BODY_SIZE * LEADING);
                cursor.y -= size * 0.5;
                cursor.text_lines(&lines, MARGIN, size, true, false);
            }
            Block::Paragraph(text) => {
                let lines = wrap_text(text, BODY_SIZE, false, CONTENT_WIDTH);
                cursor.text_lines(&lines, MARGIN, BODY_SIZE, false, false);
            }
            Block::Bullet(text) => {
                let indent = 12.0;
                let lines = wrap_text(text, BODY_SIZE, false, CONTENT_WIDTH - indent);
                cursor.reserve(BODY_SIZE * LEADING);
                cursor.push(DrawOp::Text {
                    x: MARGIN,
                    y: cursor.y - BODY_SIZE,
                    text: "•".into(),
                    size: BODY_SIZE,
                    bold: false,
                    color: (0, 0, 0),
                });
                cursor.text_lines(&lines, MARGIN + indent, BODY_SIZE, false, false);
            }
            Block::Field { label, value } => {
                let line_height = BODY_SIZE * LEADING;
                cursor.reserve(line_height);
                cursor.y -= line_height;
                let baseline = cursor.y + (line_height - BODY_SIZE);
                cursor.push(DrawOp::Text {
                    x: MARGIN,
                    y: baseline,
                    text: label.clone(),
                    size: BODY_SIZE,
                    bold: true,
                    color: (0, 0, 0),
                });
                cursor.push(DrawOp::Text {
                    x: MARGIN + text_width(label, BODY_SIZE, true) + BODY_SIZE * 0.5,
                    y: baseline,
                    text: value.clone(),
                    size: BODY_SIZE,
                    bold: false,
                    color: (0, 0, 0),
                });
            }
            Block::Table { header, rows } => {
                table_row(&mut cursor, header, true);
                for row in rows {
                    table_row(&mut cursor, row, false);
                }
            }
            Block::Image { width, height, .. } => {
                cursor.reserve(*height);
                cursor.y -= height;
                cursor.push(DrawOp::Image {
                    block: index,
                    x: (PAGE_WIDTH - width) / 2.0,
                    y: cursor.y,
                    width: *width,
                    height: *height,
                });
            }
            Block::Spacer(height) => {
                if *height >= cursor.remaining() {
                    cursor.new_page();
                } else {
                    cursor.y -= height;
                }
            }
        }
    }

    cursor.pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MaterialMatch;
    use chrono::TimeZone;

    fn session() -> ChatSession {
        let mut s = ChatSession::new("0b5a4c1e-1d2f-4e6a-9b1c-3d2e1f0a9b8c");
        s.title = "Marine bracket".into();
        s
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn empty_report_uses_placeholders() {
        let layout = ReportLayout::build(&session(), &ReportData::default(), &ChartSet::default(), at());
        let text = layout.text_lines();
        for expected in [
            REPORT_TITLE,
            "Date: 2024-05-01 09:30:00 UTC",
            "Session ID: 0b5a4c1e-1d2f-4e6a-9b1c-3d2e1f0a9b8c",
            "Project: Marine bracket",
            "No specific constraints identified.",
            "No specific material matches found yet.",
            "Not enough data to generate charts.",
            "No explanation available.",
            "Pending",
        ] {
            assert!(text.iter().any(|l| l == expected), "missing {expected:?} in {text:#?}");
        }
    }

    #[test]
    fn sections_are_ordered() {
        let layout = ReportLayout::build(&session(), &ReportData::default(), &ChartSet::default(), at());
        let headings: Vec<&str> = layout
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading(h) => Some(h.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            headings,
            [
                "1. Design Constraints",
                "2. Material Matches & Comparison",
                "3. Material Property Visualizations",
                "4. AI Analysis",
                "5. Final Recommendation",
            ]
        );
    }

    #[test]
    fn untitled_project() {
        let mut s = session();
        s.title.clear();
        let layout = ReportLayout::build(&s, &ReportData::default(), &ChartSet::default(), at());
        assert!(layout.text_lines().iter().any(|l| l == "Project: Untitled Project"));
    }

    #[test]
    fn matches_become_table_rows() {
        let report = ReportData {
            constraints: vec!["Outdoor".into(), "Budget < $5/kg".into()],
            matches: vec![
                MaterialMatch::new("AISI 304")
                    .with_property("Tensile Strength", "505 MPa")
                    .with_property("Density", "8.0 g/cm3"),
                MaterialMatch::new("Al 6061"),
            ],
            explanation: "Aluminium is lighter.".into(),
            recommendation: "Al 6061".into(),
        };
        let layout = ReportLayout::build(&session(), &report, &ChartSet::default(), at());

        let table = layout
            .blocks
            .iter()
            .find_map(|b| match b {
                Block::Table { header, rows } => Some((header, rows)),
                _ => None,
            })
            .expect("table");
        assert_eq!(table.0, &["Material".to_string(), "Properties".to_string()]);
        assert_eq!(table.1[0][1], "Tensile Strength: 505 MPa, Density: 8.0 g/cm3");
        assert_eq!(table.1[1], ["Al 6061".to_string(), String::new()]);

        let bullets = layout.blocks.iter().filter(|b| matches!(b, Block::Bullet(_))).count();
        assert_eq!(bullets, 2);
        assert!(layout.blocks.contains(&Block::Subheading("Al 6061".into())));
    }

    #[test]
    fn wrap_respects_width() {
        let text = "Molybdenum improves resistance to chloride pitting in marine atmospheres";
        let lines = wrap_text(text, 10.0, false, 100.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, 10.0, false) <= 100.0, "{line:?} too wide");
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn wrap_splits_long_words_and_keeps_newlines() {
        let lines = wrap_text(&"x".repeat(45), 10.0, false, 100.0);
        assert_eq!(lines, vec!["x".repeat(20), "x".repeat(20), "x".repeat(5)]);
        assert_eq!(wrap_text("a\nb", 10.0, false, 100.0), vec!["a", "b"]);
        assert_eq!(wrap_text("", 10.0, false, 100.0), vec![""]);
    }

    #[test]
    fn long_reports_flow_onto_more_pages() {
        let report = ReportData {
            constraints: (0..120).map(|i| format!("Constraint number {i}")).collect(),
            ..ReportData::default()
        };
        let layout = ReportLayout::build(&session(), &report, &ChartSet::default(), at());
        let pages = paginate(&layout);
        assert!(pages.len() >= 3, "got {} pages", pages.len());

        for page in &pages {
            for op in &page.ops {
                if let DrawOp::Text { y, .. } = op {
                    assert!(*y >= MARGIN - 1.0 && *y <= PAGE_HEIGHT - MARGIN, "y = {y}");
                }
            }
        }
    }

    #[test]
    fn oversized_table_row_splits_within_margins() {
        let mut big = MaterialMatch::new("Inconel 718");
        for i in 0..400 {
            big = big.with_property(format!("Property {i}"), format!("{i} units"));
        }
        let report = ReportData {
            matches: vec![big],
            ..ReportData::default()
        };
        let layout = ReportLayout::build(&session(), &report, &ChartSet::default(), at());
        let row_lines = wrap_text(
            &layout
                .blocks
                .iter()
                .find_map(|b| match b {
                    Block::Table { rows, .. } => Some(rows[0][1].clone()),
                    _ => None,
                })
                .expect("table"),
            BODY_SIZE,
            false,
            TABLE_COLUMNS[1] - 2.0 * CELL_PADDING,
        );

        let pages = paginate(&layout);
        assert!(pages.len() >= 3, "got {} pages", pages.len());

        let mut drawn = Vec::new();
        for page in &pages {
            for op in &page.ops {
                match op {
                    DrawOp::Rect { y, height, .. } => {
                        assert!(*y >= MARGIN - 0.01, "rect bottom {y} below margin");
                        assert!(y + height <= PAGE_HEIGHT - MARGIN + 0.01);
                    }
                    DrawOp::Text { y, text, .. } => {
                        assert!(*y >= MARGIN - 1.0, "text at {y} below margin");
                        drawn.push(text.clone());
                    }
                    DrawOp::Image { .. } => {}
                }
            }
        }
        for line in &row_lines {
            assert!(drawn.contains(line), "line {line:?} was dropped");
        }
    }

    #[test]
    fn images_are_centered_and_not_split() {
        let layout = ReportLayout {
            blocks: vec![
                Block::Spacer(400.0),
                Block::Image {
                    kind: ChartKind::Radar,
                    png: Vec::new(),
                    width: 400.0,
                    height: 400.0,
                },
            ],
        };
        let pages = paginate(&layout);
        assert_eq!(pages.len(), 2);
        match &pages[1].ops[0] {
            DrawOp::Image { block, x, y, .. } => {
                assert_eq!(*block, 1);
                assert_eq!(*x, 106.0);
                assert_eq!(*y, PAGE_HEIGHT - MARGIN - 400.0);
            }
            other => panic!("unexpected op {other:?}"),
        }
    }
}
