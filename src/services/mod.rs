pub mod candidates;
pub mod fallback;
pub mod providers;
pub mod query;
pub mod ranker;
pub mod recommendations;

pub use providers::{CatalogProvider, CompletionRequest, TextGenerator};
pub use recommendations::{get_recommendations, RecommendationSettings};
