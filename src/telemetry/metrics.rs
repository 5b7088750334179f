use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
};
use std::sync::LazyLock;

pub static METER: LazyLock<Meter> = LazyLock::new(|| global::meter("battlecard-generator"));

// --- LLM client metrics ---

pub static GEN_AI_TOKEN_USAGE: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("gen_ai.client.token.usage")
        .with_description("Number of tokens used per LLM call")
        .with_unit("{token}")
        .build()
});

pub static GEN_AI_OPERATION_DURATION: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("gen_ai.client.operation.duration")
        .with_description("Duration of LLM operations in seconds")
        .with_unit("s")
        .build()
});

pub static GEN_AI_RETRY_COUNT: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("gen_ai.client.retry.count")
        .with_description("Number of LLM call retries")
        .with_unit("{retry}")
        .build()
});

pub static GEN_AI_FALLBACK_COUNT: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("gen_ai.client.fallback.count")
        .with_description("Number of LLM fallback activations")
        .with_unit("{fallback}")
        .build()
});

pub static GEN_AI_ERROR_COUNT: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("gen_ai.client.error.count")
        .with_description("Number of LLM call errors")
        .with_unit("{error}")
        .build()
});

// --- Domain metrics ---

pub static NEWS_REQUESTS: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("news.search.requests")
        .with_description("News search requests issued")
        .with_unit("{request}")
        .build()
});

pub static NEWS_ARTICLES: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("news.search.articles")
        .with_description("Articles returned per news search")
        .with_unit("{article}")
        .build()
});

pub static ENTITIES_EXTRACTED: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("analysis.entities.extracted")
        .with_description("Named entities extracted from article text")
        .with_unit("{entity}")
        .build()
});

pub static BATTLECARDS_GENERATED: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("battlecards.generated")
        .with_description("Battlecards produced by the language model")
        .with_unit("{battlecard}")
        .build()
});

pub static BATTLECARDS_SKIPPED: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("battlecards.skipped")
        .with_description("Competitors skipped because generation failed")
        .with_unit("{battlecard}")
        .build()
});

pub static PDFS_RENDERED: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("battlecards.pdf.rendered")
        .with_description("PDF documents rendered")
        .with_unit("{document}")
        .build()
});

pub static PIPELINE_DURATION: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("pipeline.run.duration")
        .with_description("Collect, analyze and generate duration in seconds")
        .with_unit("s")
        .build()
});

// --- HTTP metrics ---

pub static HTTP_REQUESTS_TOTAL: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("http.requests.total")
        .with_description("Total number of HTTP requests")
        .with_unit("{request}")
        .build()
});

pub static HTTP_REQUEST_DURATION: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("http.request.duration")
        .with_description("HTTP request duration in milliseconds")
        .with_unit("ms")
        .with_boundaries(vec![
            1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0,
            60000.0,
        ])
        .build()
});
