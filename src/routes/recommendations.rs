use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{RankedRecommendation, SelectionModel},
    services::recommendations,
};

use super::AppState;

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(selection): Json<SelectionModel>,
) -> AppResult<Json<Vec<RankedRecommendation>>> {
    tracing::info!(
        request_id = %request_id,
        genres = selection.genres.len(),
        era = ?selection.era,
        rating = ?selection.rating,
        "Generating recommendations"
    );

    let recs = recommendations::get_recommendations(
        state.catalog.as_ref(),
        state.generator.as_ref(),
        &selection,
        state.settings,
    )
    .await?;

    tracing::info!(request_id = %request_id, count = recs.len(), "Recommendations ready");
    Ok(Json(recs))
}
