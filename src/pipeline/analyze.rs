use opentelemetry::KeyValue;

use crate::error::AppResult;
use crate::models::{CompetitorProfile, CompetitorProfiles, OrganizedDetails};
use crate::nlp::{EntityLabel, EntityRecognizer};
use crate::store::ArtifactStore;
use crate::telemetry::metrics::ENTITIES_EXTRACTED;

#[tracing::instrument(
    name = "pipeline_stage analyze",
    skip(recognizer, store),
    fields(
        pipeline.stage = "analyze",
        analyze.competitors,
    )
)]
pub async fn analyze(
    recognizer: &dyn EntityRecognizer,
    store: &ArtifactStore,
) -> AppResult<CompetitorProfiles> {
    let organized: OrganizedDetails = store.load_json(&store.organized_details_path())?;
    let profiles = build_profiles(recognizer, &organized).await?;

    tracing::Span::current().record("analyze.competitors", profiles.len());
    store.save_json(&store.competitor_profiles_path(), &profiles)?;
    Ok(profiles)
}

/// Runs entity recognition over every article and keeps the distinct
/// PRODUCT and ORG strings per competitor. An article whose recognition
/// fails contributes no entities.
pub async fn build_profiles(
    recognizer: &dyn EntityRecognizer,
    organized: &OrganizedDetails,
) -> AppResult<CompetitorProfiles> {
    let mut profiles = CompetitorProfiles::new();

    for (competitor, details) in organized {
        let mut profile = CompetitorProfile::default();

        for article in details.articles() {
            let entities = match recognizer.recognize(&article.analysis_text()).await {
                Ok(entities) => entities,
                Err(e) => {
                    tracing::warn!(
                        competitor = %competitor,
                        ner.backend = recognizer.name(),
                        error = %e,
                        "Entity recognition failed, skipping article"
                    );
                    continue;
                }
            };
            for entity in entities {
                ENTITIES_EXTRACTED.add(
                    1,
                    &[
                        KeyValue::new("entity.label", entity.label.as_str()),
                        KeyValue::new("ner.backend", recognizer.name().to_string()),
                    ],
                );
                match entity.label {
                    EntityLabel::Product => {
                        profile.products.insert(entity.text);
                    }
                    EntityLabel::Org => {
                        profile.market_trends.insert(entity.text);
                    }
                    _ => {}
                }
            }
        }

        tracing::debug!(
            competitor = %competitor,
            products = profile.products.len(),
            market_trends = profile.market_trends.len(),
            "Built competitor profile"
        );
        profiles.insert(competitor.clone(), profile);
    }

    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::AppError;
    use crate::models::CompetitorDetails;
    use crate::nlp::Entity;
    use crate::nlp::heuristic::HeuristicRecognizer;

    /// Fails on texts mentioning "outage", otherwise defers to the heuristic
    /// recognizer.
    struct PatchyRecognizer(HeuristicRecognizer);

    #[async_trait::async_trait]
    impl EntityRecognizer for PatchyRecognizer {
        async fn recognize(&self, text: &str) -> AppResult<Vec<Entity>> {
            if text.contains("outage") {
                return Err(AppError::Llm("503 Service Unavailable".to_string()));
            }
            self.0.recognize(text).await
        }

        fn name(&self) -> &str {
            "patchy"
        }
    }

    fn details(articles: serde_json::Value) -> CompetitorDetails {
        CompetitorDetails {
            details: json!({"status": "ok", "articles": articles}),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_profiles_dedupe_entities() {
        let mut organized = OrganizedDetails::new();
        organized.insert(
            "Google".to_string(),
            details(json!([
                {"title": "Pixel 8 sales climb", "description": "Pixel 8 beats Galaxy S24.", "content": null},
                {"title": "Pixel 8 review", "description": "Nvidia Corp and Nvidia Corp again."},
            ])),
        );

        let profiles = build_profiles(&HeuristicRecognizer::new(), &organized)
            .await
            .unwrap();
        let google = &profiles["Google"];

        assert_eq!(
            google.products.iter().cloned().collect::<Vec<_>>(),
            vec!["Galaxy S24", "Pixel 8"]
        );
        assert_eq!(
            google.market_trends.iter().cloned().collect::<Vec<_>>(),
            vec!["Nvidia Corp"]
        );
    }

    #[tokio::test]
    async fn test_failed_recognition_skips_only_that_article() {
        let mut organized = OrganizedDetails::new();
        organized.insert(
            "Google".to_string(),
            details(json!([
                {"title": "Pixel 8 sales climb", "description": "steady demand."},
                {"title": "Galaxy S24 during outage", "description": "no comment."},
            ])),
        );

        let profiles = build_profiles(&PatchyRecognizer(HeuristicRecognizer::new()), &organized)
            .await
            .unwrap();
        assert_eq!(
            profiles["Google"].products.iter().cloned().collect::<Vec<_>>(),
            vec!["Pixel 8"]
        );
    }

    #[tokio::test]
    async fn test_competitor_without_articles_gets_empty_profile() {
        let mut organized = OrganizedDetails::new();
        organized.insert(
            "Vivo".to_string(),
            CompetitorDetails {
                details: json!({"status": "error"}),
                ..Default::default()
            },
        );

        let profiles = build_profiles(&HeuristicRecognizer::new(), &organized)
            .await
            .unwrap();
        assert_eq!(profiles["Vivo"], CompetitorProfile::default());
    }

    #[tokio::test]
    async fn test_analyze_round_trips_through_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let mut organized = OrganizedDetails::new();
        organized.insert(
            "Samsung".to_string(),
            details(json!([{"title": "Samsung Electronics ships Galaxy Z Fold 6"}])),
        );
        store
            .save_json(&store.organized_details_path(), &organized)
            .unwrap();

        let profiles = analyze(&HeuristicRecognizer::new(), &store).await.unwrap();
        assert!(store.competitor_profiles_path().exists());
        assert!(profiles["Samsung"].products.contains("Galaxy Z Fold 6"));
        assert!(profiles["Samsung"].market_trends.contains("Samsung Electronics"));
    }
}
