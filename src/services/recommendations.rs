use crate::{
    error::AppResult,
    models::{RankedRecommendation, SelectionModel},
    services::{
        candidates::{fetch_candidates, MAX_CANDIDATES},
        providers::{CatalogProvider, TextGenerator},
        query::CatalogQuery,
        ranker,
    },
};

/// Tunables for one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationSettings {
    /// Maximum recommendations returned
    pub recommendation_count: usize,
    /// Maximum catalog candidates considered
    pub max_candidates: usize,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            recommendation_count: 6,
            max_candidates: MAX_CANDIDATES,
        }
    }
}

/// Generates personalized movie recommendations
///
/// Translates the questionnaire answers into a catalog query, fetches
/// candidates, and has the language model pick and justify a subset. Only a
/// catalog failure is an error; an empty catalog answer gives an empty list
/// and language model trouble is absorbed by the fallback ranking.
pub async fn get_recommendations(
    catalog: &dyn CatalogProvider,
    generator: &dyn TextGenerator,
    selection: &SelectionModel,
    settings: RecommendationSettings,
) -> AppResult<Vec<RankedRecommendation>> {
    let query = CatalogQuery::from_selection(selection);
    let candidates = fetch_candidates(catalog, &query, settings.max_candidates).await?;

    if candidates.is_empty() {
        tracing::info!("No candidate movies found in catalog");
        return Ok(Vec::new());
    }

    let recommendations = ranker::rank(
        generator,
        &candidates,
        selection,
        settings.recommendation_count,
    )
    .await;

    Ok(recommendations)
}
