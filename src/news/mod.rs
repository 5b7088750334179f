pub mod newsapi;

pub use newsapi::NewsApiClient;

use serde_json::Value;

/// A keyed news search backend. Responses are kept as raw JSON so they can
/// be persisted unchanged.
#[async_trait::async_trait]
pub trait NewsSource: Send + Sync {
    async fn search(&self, query: &str) -> anyhow::Result<Value>;
    fn name(&self) -> &str;
}
