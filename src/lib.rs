//! # material-intel
//!
//! Interview-driven material selection: an LLM agent asks clarifying
//! questions, a structured summary is extracted from the transcript, and the
//! candidate materials are compared on normalized charts and in a PDF report.
//!
//! ## Why this crate?
//!
//! Language models describe materials in free text ("505 MPa", "Excellent
//! corrosion resistance", "~8 g/cm³"). This crate turns that text into a fixed
//! attribute schema, rescales every attribute to 0–100 so unlike quantities can
//! share one radar chart, and never fails on sloppy input: unparseable text
//! degrades to sentinel values instead of errors.
//!
//! ## Pipeline Overview
//!
//! ```text
//! user ⇄ Advisor::send_message ⇄ AdvisorClient (prioritised backends, retry policy)
//!                │
//!                ├─ 1. Extract    transcript → ReportData (JSON, fallback on failure)
//!                ├─ 2. Analyse    properties → raw values → normalized scores
//!                ├─ 3. Chart      tensile / density bars, performance radar (PNG)
//!                └─ 4. Report     blocks → pages → PDF via pdfium
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use material_intel::{Advisor, AdvisorConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Backends default to Gemini; the key is read from GEMINI_API_KEY.
//!     let config = AdvisorConfig::default();
//!     let advisor = Advisor::from_config(&config).await?;
//!
//!     let session = advisor.create_session().await?;
//!     let reply = advisor
//!         .send_message(&session.id, "I need a metal for an outdoor bracket")
//!         .await?;
//!     println!("{reply}");
//!
//!     let pdf = advisor.report_pdf(&session.id).await?;
//!     std::fs::write("report.pdf", pdf)?;
//!     Ok(())
//! }
//! ```
//!
//! The analysis and chart layers need no model at all:
//!
//! ```rust
//! use material_intel::{generate_charts, ChartKind, ChartStyle, MaterialMatch, ReportData};
//!
//! let report = ReportData {
//!     matches: vec![
//!         MaterialMatch::new("AISI 304").with_property("Tensile Strength", "505 MPa"),
//!         MaterialMatch::new("Al 6061").with_property("Tensile Strength", "310 MPa"),
//!     ],
//!     ..ReportData::default()
//! };
//! let charts = generate_charts(&report, &ChartStyle::default()).unwrap();
//! assert!(charts.contains(ChartKind::Tensile));
//! assert!(!charts.contains(ChartKind::Density));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `matintel` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod agent;
pub mod analysis;
pub mod charts;
pub mod config;
pub mod error;
pub mod model;
pub mod report;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use agent::{AdvisorClient, BackendSpec, ChatBackend, LlmBackend, RetryPolicy};
pub use analysis::{normalize, parse_value, Attribute, Direction};
pub use charts::{generate_charts, ChartKind, ChartSet, ChartStyle};
pub use config::{AdvisorConfig, AdvisorConfigBuilder};
pub use error::{AdvisorError, ChartError};
pub use model::{ChatSession, ChatTurn, MaterialMatch, Properties, ReportData, Role};
pub use report::{render_pdf, PdfOptions, ReportLayout};
pub use session::{Advisor, JsonFileStore, MemoryStore, SessionStore};
