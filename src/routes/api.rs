use axum::{Json, extract::State};
use serde::Deserialize;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::pipeline::{DesignSummary, RunSummary};
use crate::render::{DEFAULT_TEMPLATE, TEMPLATES, Template};
use crate::store::ArtifactFile;

#[derive(Debug, Deserialize)]
pub struct RunPipelineBody {
    pub competitors: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DesignBody {
    pub template: Option<String>,
}

fn clean(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

pub async fn run_pipeline(
    State(state): State<AppState>,
    Json(body): Json<RunPipelineBody>,
) -> AppResult<Json<RunSummary>> {
    let competitors = clean(body.competitors);
    let keywords = clean(body.keywords);
    if competitors.is_empty() {
        return Err(AppError::Validation("competitors must not be empty".into()));
    }

    let summary = state.pipeline.run_pipeline(&competitors, &keywords).await?;
    Ok(Json(summary))
}

pub async fn design(
    State(state): State<AppState>,
    Json(body): Json<DesignBody>,
) -> AppResult<Json<DesignSummary>> {
    let template = body.template.as_deref().unwrap_or(DEFAULT_TEMPLATE);
    let summary = state.pipeline.design_battlecards(template).await?;
    Ok(Json(summary))
}

pub async fn list_templates() -> Json<Vec<Template>> {
    Json(TEMPLATES.to_vec())
}

pub async fn list_battlecards(State(state): State<AppState>) -> AppResult<Json<Vec<ArtifactFile>>> {
    Ok(Json(state.pipeline.store().list_artifacts()?))
}
