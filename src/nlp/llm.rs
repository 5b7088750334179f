use std::sync::Arc;

use serde::Deserialize;

use super::{Entity, EntityLabel, EntityRecognizer};
use crate::error::{AppError, AppResult};
use crate::llm::{GenerateRequest, LlmClient, extract_json};

const SYSTEM_PROMPT: &str = "You are a precise named-entity recognizer. \
    You ONLY return JSON. Use exact substrings of the given text.";

/// Recognizer that asks the configured language model to label entities.
pub struct LlmRecognizer {
    llm_client: Arc<LlmClient>,
    model: String,
}

#[derive(Deserialize)]
struct RawEntity {
    text: String,
    label: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntities {
    List(Vec<RawEntity>),
    Wrapped { entities: Vec<RawEntity> },
}

impl LlmRecognizer {
    pub fn new(llm_client: Arc<LlmClient>, model: &str) -> Self {
        Self {
            llm_client,
            model: model.to_string(),
        }
    }
}

fn build_prompt(text: &str) -> String {
    format!(
        "Extract every named entity from the text below.\n\
        Label each one as PRODUCT, ORG, PERSON, GPE or MISC.\n\
        Return a JSON array of objects: [{{\"text\": \"...\", \"label\": \"...\"}}].\n\
        Report repeated mentions once per occurrence, in order of appearance.\n\n\
        TEXT:\n{text}"
    )
}

/// Unparseable replies yield no entities rather than an error.
fn parse_entities(content: &str) -> Vec<Entity> {
    let json = extract_json(content);
    let raw = match serde_json::from_str::<RawEntities>(&json) {
        Ok(RawEntities::List(list)) | Ok(RawEntities::Wrapped { entities: list }) => list,
        Err(e) => {
            tracing::warn!(error = %e, "Entity reply is not valid JSON, ignoring");
            return Vec::new();
        }
    };

    raw.into_iter()
        .filter(|e| !e.text.trim().is_empty())
        .map(|e| Entity::new(e.text.trim(), EntityLabel::parse(&e.label)))
        .collect()
}

#[async_trait::async_trait]
impl EntityRecognizer for LlmRecognizer {
    async fn recognize(&self, text: &str) -> AppResult<Vec<Entity>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let resp = self
            .llm_client
            .generate(&GenerateRequest {
                model: self.model.clone(),
                system: SYSTEM_PROMPT.to_string(),
                prompt: build_prompt(text),
                temperature: 0.0,
                max_tokens: 1024,
                stage: "analyze".to_string(),
            })
            .await
            .map_err(|e| AppError::Llm(e.to_string()))?;

        Ok(parse_entities(&resp.content))
    }

    fn name(&self) -> &str {
        "llm"
    }
}
