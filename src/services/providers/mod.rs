/// Upstream service abstractions
///
/// The recommendation pipeline talks to two live services: a movie catalog
/// that answers filtered searches, and a chat-style text generation service
/// that ranks candidates. Each sits behind a trait so the pipeline can be
/// exercised with stubs and so either vendor can be swapped.
use crate::{
    error::{AppResult, GenerationError},
    models::TmdbMovie,
    services::query::CatalogQuery,
};

pub mod openai;
pub mod tmdb;

/// Trait for movie catalog providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Run one "discover by filter" search and return the first page of results
    ///
    /// Any transport failure, timeout, non-2xx status or undecodable body is an
    /// `AppError::UpstreamUnavailable`.
    async fn discover(&self, query: &CatalogQuery) -> AppResult<Vec<TmdbMovie>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// A single chat-completion exchange
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Persona and global constraints
    pub system: String,
    /// The task itself
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Trait for text generation providers
///
/// The returned text is untrusted: callers must validate it before use.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &CompletionRequest) -> Result<String, GenerationError>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
