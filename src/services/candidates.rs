use crate::{
    error::AppResult,
    models::CandidateMovie,
    services::{providers::CatalogProvider, query::CatalogQuery},
};

/// Upper bound on candidates handed to the ranker; keeps the prompt small
pub const MAX_CANDIDATES: usize = 30;

/// Fetches and normalizes catalog candidates for a query.
///
/// One catalog round trip, no retry. An empty list is a valid answer and is
/// returned as-is; catalog failures propagate as `UpstreamUnavailable`.
pub async fn fetch_candidates(
    provider: &dyn CatalogProvider,
    query: &CatalogQuery,
    limit: usize,
) -> AppResult<Vec<CandidateMovie>> {
    let results = provider.discover(query).await?;
    let total = results.len();

    let candidates: Vec<CandidateMovie> = results
        .into_iter()
        .take(limit)
        .map(CandidateMovie::from)
        .collect();

    tracing::info!(
        provider = provider.name(),
        returned = total,
        kept = candidates.len(),
        "Catalog candidates fetched"
    );

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::TmdbMovie,
        services::providers::MockCatalogProvider,
    };

    fn tmdb_movies(count: u64) -> Vec<TmdbMovie> {
        (1..=count)
            .map(|id| TmdbMovie {
                id,
                title: format!("Movie {}", id),
                poster_path: None,
                overview: Some(format!("Overview {}", id)),
                release_date: Some("2020-01-01".to_string()),
                vote_average: 7.0,
                genre_ids: vec![18],
            })
            .collect()
    }

    #[tokio::test]
    async fn test_truncates_to_limit() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_discover()
            .times(1)
            .returning(|_| Ok(tmdb_movies(45)));
        provider.expect_name().return_const("mock");

        let candidates = fetch_candidates(&provider, &CatalogQuery::default(), MAX_CANDIDATES)
            .await
            .unwrap();

        assert_eq!(candidates.len(), 30);
        assert_eq!(candidates[0].id, 1);
        assert_eq!(candidates[29].id, 30);
    }

    #[tokio::test]
    async fn test_empty_result_is_not_an_error() {
        let mut provider = MockCatalogProvider::new();
        provider.expect_discover().returning(|_| Ok(vec![]));
        provider.expect_name().return_const("mock");

        let candidates = fetch_candidates(&provider, &CatalogQuery::default(), MAX_CANDIDATES)
            .await
            .unwrap();

        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_catalog_failure_propagates() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_discover()
            .returning(|_| Err(AppError::upstream("timeout")));

        let result = fetch_candidates(&provider, &CatalogQuery::default(), MAX_CANDIDATES).await;

        assert!(matches!(result, Err(AppError::UpstreamUnavailable(_))));
    }

    #[tokio::test]
    async fn test_query_passed_through() {
        let query = CatalogQuery {
            genre_ids: vec![27],
            ..Default::default()
        };

        let mut provider = MockCatalogProvider::new();
        provider
            .expect_discover()
            .withf(|q| q.genre_ids == vec![27])
            .returning(|_| Ok(tmdb_movies(2)));
        provider.expect_name().return_const("mock");

        let candidates = fetch_candidates(&provider, &query, MAX_CANDIDATES)
            .await
            .unwrap();
        assert_eq!(candidates.len(), 2);
    }
}
