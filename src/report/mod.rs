//! Engineering report: block layout and PDF composition.

pub mod layout;
pub mod pdf;

pub use layout::{paginate, Block, DrawOp, PagePlan, ReportLayout, REPORT_TITLE};
pub use pdf::{bind_pdfium, render_pdf, PdfOptions};
