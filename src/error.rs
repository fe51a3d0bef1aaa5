//! Error types for the material-intel library.
//!
//! Two error types reflect two different layers:
//!
//! * [`AdvisorError`]: **fatal to one operation**; a session cannot be found,
//!   every LLM backend refused the request, the PDF engine could not be bound.
//!   Returned as `Err(AdvisorError)` from the client, store and service APIs.
//!
//! * [`ChartError`]: the drawing or PNG-encoding backend failed. The analysis
//!   core itself never errors (bad text degrades to sentinel values), so this
//!   only surfaces when plotters or the image encoder do.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the advisor, its session store and its client.
#[derive(Debug, Error)]
pub enum AdvisorError {
    // ── Session errors ────────────────────────────────────────────────────
    /// No session is stored under the given id.
    #[error("Session '{id}' not found")]
    SessionNotFound { id: String },

    /// The id is not a well-formed session id.
    #[error("Invalid session id '{id}'\nSession ids are UUIDs, see `matintel sessions`.")]
    InvalidSessionId { id: String },

    // ── Chart errors ──────────────────────────────────────────────────────
    /// The requested chart was suppressed because no material had data for it.
    #[error("Chart '{kind}' is not available for this session (no material reports that property)")]
    ChartUnavailable { kind: String },

    /// The chart name is not one of `tensile`, `density`, `radar`.
    #[error("Unknown chart kind '{0}'\nExpected one of: tensile, density, radar.")]
    UnknownChartKind(String),

    /// Rendering or encoding a chart failed.
    #[error(transparent)]
    Chart(#[from] ChartError),

    // ── LLM errors ────────────────────────────────────────────────────────
    /// No backend could be constructed (missing API key, unknown provider).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// A backend returned an error the retry policy does not recover from.
    #[error("LLM API error from '{backend}': {message}")]
    LlmApiError { backend: String, message: String },

    /// Every backend was rate limited or unavailable for all attempts.
    #[error("All LLM backends are unavailable or rate limited after {attempts} attempts.\nLast error: {last_error}")]
    BackendsExhausted { attempts: u32, last_error: String },

    // ── Storage errors ────────────────────────────────────────────────────
    /// Reading or writing a session document failed.
    #[error("Session storage failed at '{path}': {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A session document could not be (de)serialised.
    #[error("Session document is malformed: {0}")]
    Serialization(#[from] serde_json::Error),

    // ── Report errors ─────────────────────────────────────────────────────
    /// pdfium could not be bound or failed while composing the report.
    #[error(
        "PDF report generation failed: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium if the library is not on the system search path."
    )]
    Pdf(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure inside the chart backends.
#[derive(Debug, Error)]
pub enum ChartError {
    /// plotters reported a drawing failure.
    #[error("Chart drawing failed: {0}")]
    Drawing(String),

    /// PNG encoding failed.
    #[error("Chart encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    /// The embedded chart fonts could not be registered.
    #[error("Chart font unavailable: {0}")]
    Font(String),

    /// The pixel buffer does not match the requested dimensions.
    #[error("Pixel buffer of {len} bytes does not fit a {width}x{height} RGB image")]
    BufferSize { width: u32, height: u32, len: usize },

    /// A radar series does not have one value per axis.
    #[error("Series '{series}' has {got} values but the chart has {expected} axes")]
    ShapeMismatch {
        series: String,
        expected: usize,
        got: usize,
    },
}

impl<E> From<plotters::drawing::DrawingAreaErrorKind<E>> for ChartError
where
    E: std::error::Error + Send + Sync,
{
    fn from(e: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        ChartError::Drawing(e.to_string())
    }
}
