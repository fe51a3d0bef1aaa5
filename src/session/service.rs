//! The advisor service: sessions, interview turns, report data, charts and PDF.
//!
//! ```text
//!  send_message ──▶ store (user turn) ──▶ AdvisorClient::chat ──▶ store (reply, cache cleared)
//!  report_data  ──▶ cached? ──no──▶ extract_report_data ──▶ store (cache)
//!  chart / pdf  ──▶ report_data ──▶ spawn_blocking(generate_charts / render_pdf)
//! ```

use crate::agent::{extract_report_data, AdvisorClient};
use crate::charts::{generate_charts, ChartKind, ChartSet, ChartStyle};
use crate::config::AdvisorConfig;
use crate::error::AdvisorError;
use crate::model::{ChatSession, ChatTurn, ReportData};
use crate::report::{render_pdf, PdfOptions, ReportLayout};
use crate::session::store::{JsonFileStore, SessionStore};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Material advisor over a session store and a chat client.
#[derive(Clone)]
pub struct Advisor {
    store: Arc<dyn SessionStore>,
    client: AdvisorClient,
    chart_style: ChartStyle,
    pdf: PdfOptions,
}

impl std::fmt::Debug for Advisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Advisor")
            .field("store", &"<dyn SessionStore>")
            .field("client", &self.client)
            .field("chart_style", &self.chart_style)
            .field("pdf", &self.pdf)
            .finish()
    }
}

impl Advisor {
    pub fn new(store: Arc<dyn SessionStore>, client: AdvisorClient) -> Self {
        Self {
            store,
            client,
            chart_style: ChartStyle::default(),
            pdf: PdfOptions::default(),
        }
    }

    pub fn with_chart_style(mut self, style: ChartStyle) -> Self {
        self.chart_style = style;
        self
    }

    pub fn with_pdf_options(mut self, options: PdfOptions) -> Self {
        self.pdf = options;
        self
    }

    /// File-backed advisor as described by `config`.
    pub async fn from_config(config: &AdvisorConfig) -> Result<Self, AdvisorError> {
        let store = JsonFileStore::open(&config.session_dir).await?;
        let client = AdvisorClient::from_config(config)?;
        Ok(Self::new(Arc::new(store), client)
            .with_chart_style(config.chart_style)
            .with_pdf_options(PdfOptions::new(config.pdfium_lib_path.clone())))
    }

    pub fn client(&self) -> &AdvisorClient {
        &self.client
    }

    // ── Sessions ─────────────────────────────────────────────────────────

    pub async fn create_session(&self) -> Result<ChatSession, AdvisorError> {
        let session = self.store.create().await?;
        info!("Created session {}", session.id);
        Ok(session)
    }

    pub async fn list_sessions(&self) -> Result<Vec<ChatSession>, AdvisorError> {
        self.store.list().await
    }

    pub async fn get_session(&self, id: &str) -> Result<ChatSession, AdvisorError> {
        self.store.get(id).await
    }

    /// Run one interview turn and return the assistant's reply.
    ///
    /// The user turn is persisted before the model is called, so it survives a
    /// backend failure; the error is then returned unchanged. Both writes go
    /// through [`SessionStore::update`], so overlapping calls on one session
    /// append rather than overwrite each other.
    pub async fn send_message(&self, id: &str, text: &str) -> Result<String, AdvisorError> {
        let user_text = text.to_string();
        let session = self
            .store
            .update(
                id,
                Box::new(move |s: &mut ChatSession| {
                    if s.history.is_empty() {
                        s.title = ChatSession::title_from_message(&user_text);
                    }
                    s.history.push(ChatTurn::user(user_text));
                    s.report_data = None;
                }),
            )
            .await?;

        let prior = &session.history[..session.history.len() - 1];
        let reply = self.client.chat(text, prior).await?;

        let assistant = reply.clone();
        let session = self
            .store
            .update(
                id,
                Box::new(move |s: &mut ChatSession| {
                    s.history.push(ChatTurn::assistant(assistant));
                    s.report_data = None;
                }),
            )
            .await?;
        debug!(
            "Session {}: {} turns after reply of {} chars",
            session.id,
            session.history.len(),
            reply.len()
        );
        Ok(reply)
    }

    // ── Report ───────────────────────────────────────────────────────────

    /// Report data for the session, extracted once and cached until the
    /// transcript changes.
    ///
    /// The result is cached only if no turn was added while the extraction
    /// ran; otherwise it is returned for the transcript it was built from and
    /// the next call extracts again.
    pub async fn report_data(&self, id: &str) -> Result<ReportData, AdvisorError> {
        let session = self.store.get(id).await?;
        if let Some(cached) = &session.report_data {
            debug!("Session {}: using cached report data", session.id);
            return Ok(cached.clone());
        }

        let data = extract_report_data(&self.client, &session.history).await;

        let turns = session.history.len();
        let cached = data.clone();
        let stored = self
            .store
            .update(
                id,
                Box::new(move |s: &mut ChatSession| {
                    if s.history.len() == turns && s.report_data.is_none() {
                        s.report_data = Some(cached);
                    }
                }),
            )
            .await?;
        if stored.history.len() != turns {
            debug!(
                "Session {}: transcript grew from {} to {} turns during extraction, not caching",
                stored.id,
                turns,
                stored.history.len()
            );
        }
        Ok(data)
    }

    /// Every chart available for the session.
    pub async fn charts(&self, id: &str) -> Result<ChartSet, AdvisorError> {
        let data = self.report_data(id).await?;
        self.render_charts(data).await
    }

    /// One chart as PNG bytes; `ChartUnavailable` when it was suppressed.
    pub async fn chart(&self, id: &str, kind: ChartKind) -> Result<Vec<u8>, AdvisorError> {
        let mut charts = self.charts(id).await?;
        charts.remove(kind).ok_or_else(|| {
            warn!("Session {id}: {kind} chart not available");
            AdvisorError::ChartUnavailable {
                kind: kind.to_string(),
            }
        })
    }

    /// The engineering report as PDF bytes.
    pub async fn report_pdf(&self, id: &str) -> Result<Vec<u8>, AdvisorError> {
        let session = self.store.get(id).await?;
        let data = self.report_data(id).await?;
        let charts = self.render_charts(data.clone()).await?;
        let layout = ReportLayout::build(&session, &data, &charts, Utc::now());

        let options = self.pdf.clone();
        tokio::task::spawn_blocking(move || render_pdf(&layout, &options))
            .await
            .map_err(|e| AdvisorError::Internal(format!("PDF task panicked: {e}")))?
    }

    async fn render_charts(&self, data: ReportData) -> Result<ChartSet, AdvisorError> {
        let style = self.chart_style;
        let charts = tokio::task::spawn_blocking(move || generate_charts(&data, &style))
            .await
            .map_err(|e| AdvisorError::Internal(format!("Chart task panicked: {e}")))??;
        Ok(charts)
    }
}
