use serde::Serialize;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::llm::{GenerateRequest, LlmClient};
use crate::models::{Battlecards, CompetitorProfile, CompetitorProfiles};
use crate::store::ArtifactStore;
use crate::telemetry::metrics::{BATTLECARDS_GENERATED, BATTLECARDS_SKIPPED};

/// Model parameters for battlecard requests.
#[derive(Debug, Clone)]
pub struct GenerateSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerateSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.llm_model.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateOutcome {
    pub battlecards: Battlecards,
    /// Competitors whose request failed or came back empty.
    pub skipped: Vec<String>,
}

pub fn build_prompt(competitor: &str, profile: &CompetitorProfile) -> AppResult<String> {
    let profile_json = serde_json::to_string_pretty(profile)?;
    let products_json = serde_json::to_string_pretty(&profile.products)?;

    Ok(format!(
        "Generate a detailed battlecard for {competitor} using the following competitor profile and product information:\n\n\
        Competitor Profile:\n{profile_json}\n\n\
        Products:\n{products_json}\n\n\
        The battlecard should include the following sections in this order:\n\n\
        1. **Competitor Overview**: Provide a summary of the competitor's background and key information.\n\
        2. **Products**: List and describe the competitor's products.\n\
        3. **Market Trends**: Discuss relevant market trends affecting the competitor.\n\
        4. **Pricing**: Outline the competitor's pricing strategy.\n\
        5. **Strengths**: Highlight the competitor's strengths.\n\
        6. **Weaknesses**: Identify the competitor's weaknesses.\n\
        7. **Market Positioning**: Explain how the competitor is positioned in the market.\n\
        8. **Additional Insights**: Offer any other pertinent information.\n\
        9. **Conclusion**: Summarize the key takeaways from the battlecard.\n\n\
        Ensure each section is clear and well-structured."
    ))
}

#[tracing::instrument(
    name = "pipeline_stage generate",
    skip(llm_client, settings, store),
    fields(
        pipeline.stage = "generate",
        generate.battlecards,
        generate.skipped,
    )
)]
pub async fn generate(
    llm_client: &LlmClient,
    settings: &GenerateSettings,
    store: &ArtifactStore,
) -> AppResult<GenerateOutcome> {
    let profiles: CompetitorProfiles = store.load_json(&store.competitor_profiles_path())?;
    let outcome = generate_battlecards(llm_client, settings, &profiles).await?;

    let span = tracing::Span::current();
    span.record("generate.battlecards", outcome.battlecards.len());
    span.record("generate.skipped", outcome.skipped.len());

    store.save_json(&store.battlecards_path(), &outcome.battlecards)?;
    Ok(outcome)
}

/// Requests one battlecard per competitor, in order. A failed or empty
/// reply skips that competitor without stopping the rest.
pub async fn generate_battlecards(
    llm_client: &LlmClient,
    settings: &GenerateSettings,
    profiles: &CompetitorProfiles,
) -> AppResult<GenerateOutcome> {
    let mut outcome = GenerateOutcome::default();

    for (competitor, profile) in profiles {
        tracing::info!(competitor = %competitor, "Generating battlecard");
        if profile.products.is_empty() {
            tracing::warn!(competitor = %competitor, "No products found for competitor");
        }

        let request = GenerateRequest {
            model: settings.model.clone(),
            system: String::new(),
            prompt: build_prompt(competitor, profile)?,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            stage: "generate".to_string(),
        };

        match llm_client.generate(&request).await {
            Ok(resp) if !resp.content.trim().is_empty() => {
                BATTLECARDS_GENERATED.add(1, &[]);
                outcome.battlecards.insert(competitor.clone(), resp.content);
            }
            Ok(_) => skip(&mut outcome, competitor, &AppError::Llm("empty response".into())),
            Err(e) => skip(&mut outcome, competitor, &AppError::Llm(format!("{e:#}"))),
        }
    }

    Ok(outcome)
}

fn skip(outcome: &mut GenerateOutcome, competitor: &str, error: &AppError) {
    tracing::error!(
        competitor = %competitor,
        error = %error,
        "Skipping competitor due to error in battlecard generation"
    );
    BATTLECARDS_SKIPPED.add(1, &[]);
    outcome.skipped.push(competitor.to_string());
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::llm::{GenerateResponse, Provider};

    /// Replies with a battlecard naming the competitor, or fails for the
    /// competitors listed in `fail_for`.
    struct CompetitorEcho {
        fail_for: Vec<&'static str>,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Provider for CompetitorEcho {
        async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let name = req
                .prompt
                .strip_prefix("Generate a detailed battlecard for ")
                .and_then(|rest| rest.split(" using").next())
                .unwrap_or_default()
                .to_string();
            if self.fail_for.contains(&name.as_str()) {
                anyhow::bail!("503 Service Unavailable");
            }
            Ok(GenerateResponse {
                content: format!("**Competitor Overview**\n{name} overview."),
                model: req.model.clone(),
                input_tokens: 100,
                output_tokens: 50,
                finish_reason: "stop".to_string(),
                provider: "echo".to_string(),
            })
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    fn settings() -> GenerateSettings {
        GenerateSettings {
            model: "llama-3.1-8b-instant".to_string(),
            temperature: 0.7,
            max_tokens: 256,
        }
    }

    fn profiles(names: &[&str]) -> CompetitorProfiles {
        names
            .iter()
            .map(|n| (n.to_string(), CompetitorProfile::default()))
            .collect()
    }

    #[test]
    fn test_prompt_embeds_profile_and_section_order() {
        let mut profile = CompetitorProfile::default();
        profile.products.insert("Pixel 8".to_string());
        profile.market_trends.insert("Alphabet Inc".to_string());

        let prompt = build_prompt("Google", &profile).unwrap();
        assert!(prompt.starts_with("Generate a detailed battlecard for Google using"));
        assert!(prompt.contains("Competitor Profile:\n{\n  \"products\": [\n    \"Pixel 8\"\n  ],"));
        assert!(prompt.contains("Products:\n[\n  \"Pixel 8\"\n]"));

        let overview = prompt.find("1. **Competitor Overview**").unwrap();
        let pricing = prompt.find("4. **Pricing**").unwrap();
        let conclusion = prompt.find("9. **Conclusion**").unwrap();
        assert!(overview < pricing && pricing < conclusion);
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let profile = CompetitorProfile::default();
        assert_eq!(
            build_prompt("Vivo", &profile).unwrap(),
            build_prompt("Vivo", &profile).unwrap()
        );
    }

    #[tokio::test]
    async fn test_failure_for_one_competitor_keeps_others() {
        let provider = Arc::new(CompetitorEcho {
            fail_for: vec!["Samsung"],
            calls: AtomicUsize::new(0),
        });
        let client = LlmClient::single(provider.clone());

        let outcome = generate_battlecards(
            &client,
            &settings(),
            &profiles(&["Apple", "Samsung", "Vivo"]),
        )
        .await
        .unwrap();

        assert_eq!(
            outcome.battlecards.keys().collect::<Vec<_>>(),
            vec!["Apple", "Vivo"]
        );
        assert_eq!(outcome.skipped, vec!["Samsung"]);
        assert_eq!(outcome.battlecards["Vivo"], "**Competitor Overview**\nVivo overview.");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_generate_saves_partial_results() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store
            .save_json(&store.competitor_profiles_path(), &profiles(&["Apple", "Oppo"]))
            .unwrap();

        let client = LlmClient::single(Arc::new(CompetitorEcho {
            fail_for: vec!["Apple"],
            calls: AtomicUsize::new(0),
        }));
        generate(&client, &settings(), &store).await.unwrap();

        let saved: Battlecards = store.load_json(&store.battlecards_path()).unwrap();
        assert_eq!(saved.len(), 1);
        assert!(saved.contains_key("Oppo"));
    }
}
