pub mod config;
pub mod error;
pub mod keys;
pub mod llm;
pub mod models;
pub mod news;
pub mod nlp;
pub mod pipeline;
pub mod render;
pub mod routes;
pub mod store;
pub mod telemetry;

use std::sync::Arc;

use config::Config;
use pipeline::Pipeline;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: Arc<Pipeline>,
}
