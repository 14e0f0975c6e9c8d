use chrono::{NaiveDate, Utc};

use crate::models::{genre::genre_id, Era, RatingTier, Runtime, SelectionModel};

/// Items with fewer votes than this have statistically meaningless averages
pub const MIN_VOTE_COUNT: u32 = 100;

/// Runtime boundary in minutes between "short" and "long"
const RUNTIME_SPLIT_MINUTES: u32 = 120;

const HIGHLY_RATED_MIN_SCORE: f64 = 7.5;
const GOOD_MIN_SCORE: f64 = 6.0;

/// Filters for the catalog "discover" search
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    /// Genre codes; empty means no genre filter
    pub genre_ids: Vec<u32>,
    pub release_date_gte: Option<NaiveDate>,
    pub release_date_lte: Option<NaiveDate>,
    pub runtime_gte: Option<u32>,
    pub runtime_lte: Option<u32>,
    pub min_vote_average: Option<f64>,
    pub min_vote_count: u32,
    pub sort_by: &'static str,
    pub page: u32,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            genre_ids: Vec::new(),
            release_date_gte: None,
            release_date_lte: None,
            runtime_gte: None,
            runtime_lte: None,
            min_vote_average: None,
            min_vote_count: MIN_VOTE_COUNT,
            sort_by: "popularity.desc",
            page: 1,
        }
    }
}

impl CatalogQuery {
    /// Translates a selection using today's UTC date for the "recent" era
    pub fn from_selection(selection: &SelectionModel) -> Self {
        translate(selection, Utc::now().date_naive())
    }

    /// Query string parameters for TMDB `/discover/movie`, credentials excluded
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("sort_by", self.sort_by.to_string()),
            ("page", self.page.to_string()),
            ("vote_count.gte", self.min_vote_count.to_string()),
            ("include_adult", "false".to_string()),
            ("include_video", "false".to_string()),
        ];

        if !self.genre_ids.is_empty() {
            let ids: Vec<String> = self.genre_ids.iter().map(u32::to_string).collect();
            params.push(("with_genres", ids.join(",")));
        }
        if let Some(date) = self.release_date_gte {
            params.push(("primary_release_date.gte", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(date) = self.release_date_lte {
            params.push(("primary_release_date.lte", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(minutes) = self.runtime_gte {
            params.push(("with_runtime.gte", minutes.to_string()));
        }
        if let Some(minutes) = self.runtime_lte {
            params.push(("with_runtime.lte", minutes.to_string()));
        }
        if let Some(score) = self.min_vote_average {
            params.push(("vote_average.gte", score.to_string()));
        }

        params
    }
}

/// Maps questionnaire answers onto catalog filters.
///
/// Never fails. Anything absent, `any`, or unrecognized leaves the matching
/// filter off, so the worst case is an unfiltered popularity query.
pub fn translate(selection: &SelectionModel, today: NaiveDate) -> CatalogQuery {
    let mut query = CatalogQuery::default();

    for id in selection.genres.iter().filter_map(|name| genre_id(name)) {
        if !query.genre_ids.contains(&id) {
            query.genre_ids.push(id);
        }
    }

    if let Some((from, to)) = selection.era.and_then(|era| era_range(era, today)) {
        query.release_date_gte = Some(from);
        query.release_date_lte = Some(to);
    }

    match selection.runtime {
        Some(Runtime::Short) => query.runtime_lte = Some(RUNTIME_SPLIT_MINUTES),
        Some(Runtime::Long) => query.runtime_gte = Some(RUNTIME_SPLIT_MINUTES),
        Some(Runtime::Any) | None => {}
    }

    query.min_vote_average = match selection.rating {
        Some(RatingTier::HighlyRated) => Some(HIGHLY_RATED_MIN_SCORE),
        Some(RatingTier::Good) => Some(GOOD_MIN_SCORE),
        Some(RatingTier::Any) | None => None,
    };

    query
}

/// Inclusive release date range for an era
fn era_range(era: Era, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let (from, to) = match era {
        Era::Classic => (ymd(1970, 1, 1)?, ymd(1999, 12, 31)?),
        Era::Modern => (ymd(2000, 1, 1)?, ymd(2014, 12, 31)?),
        Era::Recent => (ymd(2015, 1, 1)?, today),
        Era::Any => return None,
    };
    Some((from, to))
}

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}
