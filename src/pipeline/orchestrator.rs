use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use opentelemetry::trace::TraceContextExt;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::keys::ApiKeys;
use crate::llm::{self, LlmClient};
use crate::news::{NewsApiClient, NewsSource};
use crate::nlp::{self, EntityRecognizer};
use crate::store::ArtifactStore;
use crate::telemetry::metrics::PIPELINE_DURATION;

use super::design::{self, DesignSummary};
use super::generate::{self, GenerateSettings};
use super::{analyze, collect};

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub competitors: usize,
    pub keywords: usize,
    pub profiles: usize,
    pub battlecards: Vec<String>,
    pub skipped: Vec<String>,
    pub cleared_files: usize,
    pub duration_ms: u64,
    pub completed_at: DateTime<Utc>,
    pub trace_id: String,
}

/// The four stages wired to their backends. Runs are serialized: a second
/// request waits until the first one has finished every stage.
pub struct Pipeline {
    news: Arc<dyn NewsSource>,
    recognizer: Arc<dyn EntityRecognizer>,
    llm_client: Arc<LlmClient>,
    store: ArtifactStore,
    settings: GenerateSettings,
    run_lock: Mutex<()>,
}

impl Pipeline {
    pub fn new(
        news: Arc<dyn NewsSource>,
        recognizer: Arc<dyn EntityRecognizer>,
        llm_client: Arc<LlmClient>,
        store: ArtifactStore,
        settings: GenerateSettings,
    ) -> Self {
        Self {
            news,
            recognizer,
            llm_client,
            store,
            settings,
            run_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        let keys = ApiKeys::load(&config.resolved_api_keys_path())?;

        let news = NewsApiClient::new(&config.newsapi_base_url, keys.newsapi()?)
            .map_err(|e| AppError::Internal(format!("{e:#}")))?;
        let llm_client = Arc::new(llm::build_client(config, &keys)?);
        let recognizer =
            nlp::build_recognizer(&config.ner_backend, llm_client.clone(), &config.llm_model)?;

        tracing::info!(
            data_dir = %config.data_dir.display(),
            ner_backend = recognizer.name(),
            news_source = news.name(),
            "Pipeline initialized"
        );

        Ok(Self::new(
            Arc::new(news),
            recognizer,
            llm_client,
            ArtifactStore::new(&config.data_dir),
            GenerateSettings::from_config(config),
        ))
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Clears old battlecards, then collects, analyzes and generates.
    #[tracing::instrument(
        name = "pipeline run",
        skip(self),
        fields(
            pipeline.battlecards,
            pipeline.skipped,
            pipeline.duration_ms,
        )
    )]
    pub async fn run_pipeline(
        &self,
        competitors: &[String],
        keywords: &[String],
    ) -> AppResult<RunSummary> {
        if competitors.is_empty() {
            return Err(AppError::Validation(
                "at least one competitor is required".into(),
            ));
        }

        let _guard = self.run_lock.lock().await;
        let start = Instant::now();

        let span = tracing::Span::current();
        let trace_id = span.context().span().span_context().trace_id().to_string();

        let cleared_files = self.store.clear_battlecards()?;

        // Stage 1: search news and organize results per competitor
        collect::collect(
            self.news.as_ref(),
            self.recognizer.as_ref(),
            &self.store,
            competitors,
            keywords,
        )
        .await?;

        // Stage 2: entity extraction into profiles
        let profiles = analyze::analyze(self.recognizer.as_ref(), &self.store).await?;

        // Stage 3: one battlecard per profile
        let outcome = generate::generate(&self.llm_client, &self.settings, &self.store).await?;

        let duration = start.elapsed();
        PIPELINE_DURATION.record(duration.as_secs_f64(), &[]);

        span.record("pipeline.battlecards", outcome.battlecards.len());
        span.record("pipeline.skipped", outcome.skipped.len());
        span.record("pipeline.duration_ms", duration.as_millis() as u64);

        tracing::info!(
            battlecards = outcome.battlecards.len(),
            skipped = outcome.skipped.len(),
            "Data collected, analyzed, and battlecards generated"
        );

        Ok(RunSummary {
            competitors: competitors.len(),
            keywords: keywords.len(),
            profiles: profiles.len(),
            battlecards: outcome.battlecards.keys().cloned().collect(),
            skipped: outcome.skipped,
            cleared_files,
            duration_ms: duration.as_millis() as u64,
            completed_at: Utc::now(),
            trace_id,
        })
    }

    /// Renders the saved battlecards with `template`. Rendering runs on the
    /// blocking pool.
    pub async fn design_battlecards(&self, template: &str) -> AppResult<DesignSummary> {
        let _guard = self.run_lock.lock().await;

        let store = self.store.clone();
        let template = template.to_string();
        let span = tracing::Span::current();
        tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            design::design_battlecards(&store, &template)
        })
        .await
        .map_err(|e| AppError::Internal(format!("design task failed: {e}")))?
    }
}
