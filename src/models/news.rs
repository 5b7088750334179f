use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw search responses for one query, keyed by the source that produced
/// them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceResults {
    #[serde(default)]
    pub newsapi: Value,
}

/// Everything the collector fetched, as written to `collected_data.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectedData {
    pub competitor_data: IndexMap<String, SourceResults>,
    pub keyword_data: IndexMap<String, SourceResults>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordTrends {
    pub keyword: String,
    pub trends: Vec<String>,
}

/// A competitor paired with its articles and the entities spotted in
/// headlines during collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompetitorDetails {
    #[serde(default)]
    pub details: Value,
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default)]
    pub market_trends: Vec<KeywordTrends>,
}

impl CompetitorDetails {
    pub fn articles(&self) -> Vec<Article> {
        Article::from_response(&self.details)
    }
}

pub type OrganizedDetails = IndexMap<String, CompetitorDetails>;

/// The text fields of a news article. Search responses are arbitrary JSON,
/// so absent or non-string fields read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub content: String,
}

impl Article {
    pub fn from_response(response: &Value) -> Vec<Article> {
        let Some(articles) = response.get("articles").and_then(Value::as_array) else {
            return Vec::new();
        };

        articles
            .iter()
            .map(|article| {
                let field = |name: &str| {
                    article
                        .get(name)
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                };
                Article {
                    title: field("title"),
                    description: field("description"),
                    content: field("content"),
                }
            })
            .collect()
    }

    /// Title, description and content joined for entity extraction.
    pub fn analysis_text(&self) -> String {
        format!("{} {} {}", self.title, self.description, self.content)
    }
}
