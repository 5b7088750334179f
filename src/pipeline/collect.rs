use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::models::{
    Article, CollectedData, CompetitorDetails, KeywordTrends, OrganizedDetails, SourceResults,
};
use crate::news::NewsSource;
use crate::nlp::{EntityLabel, EntityRecognizer, texts_with_labels};
use crate::store::ArtifactStore;

#[tracing::instrument(
    name = "pipeline_stage collect",
    skip(news, recognizer, store),
    fields(
        pipeline.stage = "collect",
        collect.articles,
    )
)]
pub async fn collect(
    news: &dyn NewsSource,
    recognizer: &dyn EntityRecognizer,
    store: &ArtifactStore,
    competitors: &[String],
    keywords: &[String],
) -> AppResult<OrganizedDetails> {
    let mut collected = CollectedData::default();

    for name in competitors {
        let response = search(news, name).await?;
        collected
            .competitor_data
            .insert(name.clone(), SourceResults { newsapi: response });
    }
    for keyword in keywords {
        let response = search(news, keyword).await?;
        collected
            .keyword_data
            .insert(keyword.clone(), SourceResults { newsapi: response });
    }

    let articles: usize = collected
        .competitor_data
        .values()
        .chain(collected.keyword_data.values())
        .map(|r| Article::from_response(&r.newsapi).len())
        .sum();
    tracing::Span::current().record("collect.articles", articles);

    store.save_json(&store.collected_data_path(), &collected)?;

    let organized = organize(recognizer, &collected).await?;
    store.save_json(&store.organized_details_path(), &organized)?;

    Ok(organized)
}

async fn search(news: &dyn NewsSource, query: &str) -> AppResult<Value> {
    news.search(query)
        .await
        .map_err(|e| AppError::NewsApi(format!("{e:#}")))
}

/// Pairs each competitor with its raw results, the products named in its
/// article titles and the organizations and products named in each
/// keyword's article titles.
pub async fn organize(
    recognizer: &dyn EntityRecognizer,
    collected: &CollectedData,
) -> AppResult<OrganizedDetails> {
    // Keyword trends do not depend on the competitor.
    let mut market_trends = Vec::new();
    for (keyword, results) in &collected.keyword_data {
        let trends = title_entities(
            recognizer,
            &results.newsapi,
            &[EntityLabel::Org, EntityLabel::Product],
        )
        .await?;
        if !trends.is_empty() {
            market_trends.push(KeywordTrends {
                keyword: keyword.clone(),
                trends,
            });
        }
    }

    let mut organized = OrganizedDetails::new();
    for (competitor, results) in &collected.competitor_data {
        let products = title_entities(recognizer, &results.newsapi, &[EntityLabel::Product]).await?;
        organized.insert(
            competitor.clone(),
            CompetitorDetails {
                details: results.newsapi.clone(),
                products,
                market_trends: market_trends.clone(),
            },
        );
    }

    Ok(organized)
}

async fn title_entities(
    recognizer: &dyn EntityRecognizer,
    response: &Value,
    labels: &[EntityLabel],
) -> AppResult<Vec<String>> {
    let mut found = Vec::new();
    for article in Article::from_response(response) {
        let entities = recognizer.recognize(&article.title).await?;
        found.extend(texts_with_labels(&entities, labels));
    }
    Ok(found)
}
