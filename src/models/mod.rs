pub mod genre;
pub mod movie;
pub mod selection;

pub use movie::{CandidateMovie, RankedRecommendation, TmdbDiscoverResponse, TmdbMovie};
pub use selection::{Era, RatingTier, Runtime, SelectionModel};
