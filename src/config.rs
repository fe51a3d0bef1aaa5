//! Configuration for the advisor service.
//!
//! Everything the service, its client and its chart renderer need lives in
//! [`AdvisorConfig`], built via [`AdvisorConfigBuilder`]. The config is
//! immutable once built; the client derives its backend list from it once and
//! each request walks that list on its own.

use crate::agent::{BackendSpec, ChatBackend};
use crate::charts::ChartStyle;
use crate::error::AdvisorError;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for an [`Advisor`](crate::session::Advisor).
///
/// # Example
/// ```rust
/// use material_intel::{AdvisorConfig, BackendSpec};
///
/// let config = AdvisorConfig::builder()
///     .backends(vec![BackendSpec::new("openai", "gpt-4.1-mini")])
///     .max_attempts(3)
///     .session_dir("/tmp/matintel")
///     .build()
///     .unwrap();
/// assert_eq!(config.max_attempts, 3);
/// ```
#[derive(Clone)]
pub struct AdvisorConfig {
    /// Priority-ordered `provider:model` backends.
    /// Default: `gemini:gemini-1.5-flash`, `gemini:gemini-1.5-pro`, `gemini:gemini-1.0-pro`.
    pub backends: Vec<BackendSpec>,

    /// Pre-constructed backends. Take precedence over `backends` when non-empty.
    pub providers: Vec<Arc<dyn ChatBackend>>,

    /// Sampling temperature. Range 0–2. Default: 0.7.
    pub temperature: f32,

    /// Maximum tokens per reply. Default: 8192.
    ///
    /// A final recommendation with a comparison table routinely runs past
    /// 2 000 tokens.
    pub max_tokens: usize,

    /// Attempts per request across all backends. Default: 5.
    pub max_attempts: u32,

    /// Backoff base in milliseconds when the only backend is rate limited.
    /// Doubles after each attempt: 2 s → 4 s → 8 s → 16 s. Default: 2000.
    pub retry_backoff_ms: u64,

    /// Directory holding one JSON document per session. Default: `.sessions`.
    pub session_dir: PathBuf,

    /// Pixel sizes of the rendered charts.
    pub chart_style: ChartStyle,

    /// Explicit libpdfium location. If None, `PDFIUM_LIB_PATH` and then the
    /// system library search path are used.
    pub pdfium_lib_path: Option<PathBuf>,
}

/// Default backend priority.
pub const DEFAULT_BACKENDS: [(&str, &str); 3] = [
    ("gemini", "gemini-1.5-flash"),
    ("gemini", "gemini-1.5-pro"),
    ("gemini", "gemini-1.0-pro"),
];

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            backends: DEFAULT_BACKENDS
                .iter()
                .map(|(p, m)| BackendSpec::new(*p, *m))
                .collect(),
            providers: Vec::new(),
            temperature: 0.7,
            max_tokens: 8192,
            max_attempts: 5,
            retry_backoff_ms: 2000,
            session_dir: PathBuf::from(".sessions"),
            chart_style: ChartStyle::default(),
            pdfium_lib_path: None,
        }
    }
}

impl fmt::Debug for AdvisorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdvisorConfig")
            .field("backends", &self.backends)
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_attempts", &self.max_attempts)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("session_dir", &self.session_dir)
            .field("chart_style", &self.chart_style)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .finish()
    }
}

impl AdvisorConfig {
    pub fn builder() -> AdvisorConfigBuilder {
        AdvisorConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AdvisorConfig`].
#[derive(Debug)]
pub struct AdvisorConfigBuilder {
    config: AdvisorConfig,
}

impl AdvisorConfigBuilder {
    pub fn backends(mut self, backends: Vec<BackendSpec>) -> Self {
        self.config.backends = backends;
        self
    }

    /// Add a pre-built backend after any already added.
    pub fn provider(mut self, backend: Arc<dyn ChatBackend>) -> Self {
        self.config.providers.push(backend);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n.max(1);
        self
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.max_attempts = n.max(1);
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn session_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.session_dir = dir.into();
        self
    }

    pub fn chart_style(mut self, style: ChartStyle) -> Self {
        self.config.chart_style = style;
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AdvisorConfig, AdvisorError> {
        let c = &self.config;
        if c.backends.is_empty() && c.providers.is_empty() {
            return Err(AdvisorError::InvalidConfig(
                "At least one backend (provider:model) is required".into(),
            ));
        }
        let (bw, bh) = c.chart_style.bar_size;
        let (rw, rh) = c.chart_style.radar_size;
        if [bw, bh, rw, rh].iter().any(|d| *d < 100) {
            return Err(AdvisorError::InvalidConfig(format!(
                "Chart sizes must be at least 100 px per side, got bar {bw}x{bh}, radar {rw}x{rh}"
            )));
        }
        Ok(self.config)
    }
}
