use anyhow::Context;
use opentelemetry::KeyValue;
use serde_json::Value;

use super::NewsSource;
use crate::models::Article;
use crate::telemetry::metrics::{NEWS_ARTICLES, NEWS_REQUESTS};

/// Client for the NewsAPI `everything` endpoint.
pub struct NewsApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(base_url: &str, api_key: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("battlecard-generator/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("HTTP client build failed")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl NewsSource for NewsApiClient {
    #[tracing::instrument(
        name = "news.search",
        skip(self),
        fields(news.source = "newsapi", http.status_code, news.articles)
    )]
    async fn search(&self, query: &str) -> anyhow::Result<Value> {
        let response = self
            .client
            .get(format!("{}/v2/everything", self.base_url))
            .query(&[("q", query)])
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("news search for {query:?} failed"))?;

        let status = response.status();
        let span = tracing::Span::current();
        span.record("http.status_code", status.as_u16());

        let body: Value = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("news search for {query:?} returned a non-JSON body"))?;

        // Error responses are stored like any other body; they simply carry
        // no articles.
        if !status.is_success() {
            tracing::warn!(
                %status,
                code = body.get("code").and_then(serde_json::Value::as_str).unwrap_or(""),
                message = body.get("message").and_then(serde_json::Value::as_str).unwrap_or(""),
                "News API returned an error status"
            );
        }

        let articles = Article::from_response(&body).len();
        span.record("news.articles", articles);

        NEWS_REQUESTS.add(
            1,
            &[
                KeyValue::new("news.source", "newsapi"),
                KeyValue::new("http.status_code", status.as_u16().to_string()),
            ],
        );
        NEWS_ARTICLES.record(articles as f64, &[KeyValue::new("news.source", "newsapi")]);

        Ok(body)
    }

    fn name(&self) -> &str {
        "newsapi"
    }
}
