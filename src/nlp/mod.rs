//! Named-entity recognition over article text.
//!
//! The analyzer only cares about two labels: `PRODUCT` spans feed a
//! competitor's product list and `ORG` spans feed its market trends. Other
//! labels are recognized so recognizers can report them, but are ignored
//! downstream.

pub mod heuristic;
pub mod llm;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use heuristic::HeuristicRecognizer;
pub use llm::LlmRecognizer;

use crate::error::{AppError, AppResult};
use crate::llm::LlmClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityLabel {
    Product,
    Org,
    Person,
    Gpe,
    Misc,
}

impl EntityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityLabel::Product => "PRODUCT",
            EntityLabel::Org => "ORG",
            EntityLabel::Person => "PERSON",
            EntityLabel::Gpe => "GPE",
            EntityLabel::Misc => "MISC",
        }
    }

    /// Parses a label as written by recognizers; unknown labels are `Misc`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PRODUCT" => EntityLabel::Product,
            "ORG" | "ORGANIZATION" | "ORGANISATION" | "COMPANY" => EntityLabel::Org,
            "PERSON" | "PER" => EntityLabel::Person,
            "GPE" | "LOC" | "LOCATION" => EntityLabel::Gpe,
            _ => EntityLabel::Misc,
        }
    }
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
}

impl Entity {
    pub fn new(text: impl Into<String>, label: EntityLabel) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

#[async_trait::async_trait]
pub trait EntityRecognizer: Send + Sync {
    /// Every entity mention in `text`, in order of appearance. Repeated
    /// mentions are reported each time.
    async fn recognize(&self, text: &str) -> AppResult<Vec<Entity>>;
    fn name(&self) -> &str;
}

/// Surface strings of the mentions carrying one of `labels`.
pub fn texts_with_labels(entities: &[Entity], labels: &[EntityLabel]) -> Vec<String> {
    entities
        .iter()
        .filter(|e| labels.contains(&e.label))
        .map(|e| e.text.clone())
        .collect()
}

/// Builds the recognizer named by the `NER_BACKEND` setting.
pub fn build_recognizer(
    backend: &str,
    llm_client: Arc<LlmClient>,
    model: &str,
) -> AppResult<Arc<dyn EntityRecognizer>> {
    match backend {
        "heuristic" => Ok(Arc::new(HeuristicRecognizer::new())),
        "llm" => Ok(Arc::new(LlmRecognizer::new(llm_client, model))),
        other => Err(AppError::Config(format!("unknown NER backend: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parse_aliases() {
        assert_eq!(EntityLabel::parse("product"), EntityLabel::Product);
        assert_eq!(EntityLabel::parse("ORGANIZATION"), EntityLabel::Org);
        assert_eq!(EntityLabel::parse(" gpe "), EntityLabel::Gpe);
        assert_eq!(EntityLabel::parse("DATE"), EntityLabel::Misc);
    }

    #[test]
    fn test_texts_with_labels_keeps_order_and_repeats() {
        let entities = vec![
            Entity::new("Samsung", EntityLabel::Org),
            Entity::new("Galaxy S24", EntityLabel::Product),
            Entity::new("Samsung", EntityLabel::Org),
            Entity::new("Seoul", EntityLabel::Gpe),
        ];
        assert_eq!(
            texts_with_labels(&entities, &[EntityLabel::Org]),
            vec!["Samsung", "Samsung"]
        );
        assert_eq!(
            texts_with_labels(&entities, &[EntityLabel::Org, EntityLabel::Product]),
            vec!["Samsung", "Galaxy S24", "Samsung"]
        );
    }

    #[test]
    fn test_label_serializes_uppercase() {
        let json = serde_json::to_string(&Entity::new("Pixel 8", EntityLabel::Product)).unwrap();
        assert_eq!(json, r#"{"text":"Pixel 8","label":"PRODUCT"}"#);
    }
}
