use crate::models::{CandidateMovie, RankedRecommendation, SelectionModel};

const DEFAULT_MOOD: &str = "entertaining";
const DEFAULT_CONTEXT: &str = "viewing";

/// Number of reasoning templates; adjacent picks never share one
pub const TEMPLATE_COUNT: usize = 5;

/// Deterministic ranking used when the language model cannot be trusted.
///
/// Sorts by vote average (best first, ties keep catalog order), keeps the
/// first `count`, and writes reasoning from a template chosen by output
/// position. Identical input always yields identical output.
pub fn fallback_recommendations(
    candidates: &[CandidateMovie],
    selection: &SelectionModel,
    count: usize,
) -> Vec<RankedRecommendation> {
    let mut ranked: Vec<&CandidateMovie> = candidates.iter().collect();
    ranked.sort_by(|a, b| b.vote_average.total_cmp(&a.vote_average));

    let mood = selection.mood().unwrap_or(DEFAULT_MOOD);
    let context = selection.context().unwrap_or(DEFAULT_CONTEXT);

    ranked
        .into_iter()
        .take(count)
        .enumerate()
        .map(|(position, movie)| {
            let reasoning = templated_reason(position, movie, mood, context);
            RankedRecommendation::new(movie.clone(), reasoning)
        })
        .collect()
}

/// Reasoning for the movie at `position` in the output list
pub fn templated_reason(
    position: usize,
    movie: &CandidateMovie,
    mood: &str,
    context: &str,
) -> String {
    let title = &movie.title;
    let rating = movie.vote_average;
    let film = match movie.release_year {
        Some(year) => format!("This {} film", year),
        None => "This film".to_string(),
    };

    match position % TEMPLATE_COUNT {
        0 => format!(
            "{film}'s compelling narrative and {rating:.1}/10 rating make it an ideal choice for the {mood} atmosphere you want during your {context}."
        ),
        1 => format!(
            "With its captivating storyline and strong performances, \"{title}\" delivers exactly the {mood} experience that will make your {context} memorable."
        ),
        2 => format!(
            "\"{title}\" blends careful storytelling with real cinematic craft, capturing the {mood} mood you asked for and standing out as a pick for your {context}."
        ),
        3 => format!(
            "For an immersive night in, \"{title}\" sets up the {mood} ambiance an unforgettable {context} calls for."
        ),
        _ => format!(
            "Rated {rating:.1}/10 by viewers, \"{title}\" pairs confident filmmaking with an engaging plot to bring the {mood} entertainment your {context} is missing."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: u64, vote_average: f64) -> CandidateMovie {
        CandidateMovie {
            id,
            title: format!("Movie {}", id),
            poster_url: String::new(),
            overview: String::new(),
            release_date: None,
            release_year: Some(2000 + id as i32),
            vote_average,
            genre_ids: vec![],
        }
    }

    fn template_index(reason: &str, movie: &CandidateMovie) -> usize {
        (0..TEMPLATE_COUNT)
            .find(|i| templated_reason(*i, movie, "cozy", "date night") == reason)
            .unwrap()
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(fallback_recommendations(&[], &SelectionModel::default(), 6).is_empty());
    }

    #[test]
    fn test_sorted_by_vote_average_and_truncated() {
        let candidates: Vec<CandidateMovie> = [6.1, 8.7, 7.2, 9.0, 5.5, 7.9, 8.0, 6.6]
            .iter()
            .enumerate()
            .map(|(i, v)| movie(i as u64 + 1, *v))
            .collect();

        let recs = fallback_recommendations(&candidates, &SelectionModel::default(), 6);
        let scores: Vec<f64> = recs.iter().map(|r| r.movie.vote_average).collect();

        assert_eq!(scores, vec![9.0, 8.7, 8.0, 7.9, 7.2, 6.6]);
        assert!(recs.iter().all(|r| r.imdb_rating == r.movie.vote_average));
    }

    #[test]
    fn test_fewer_candidates_than_count() {
        let candidates = vec![movie(1, 7.0), movie(2, 8.0)];
        let recs = fallback_recommendations(&candidates, &SelectionModel::default(), 6);
        assert_eq!(recs.len(), 2);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let candidates = vec![movie(3, 7.0), movie(1, 7.0), movie(2, 7.0)];
        let recs = fallback_recommendations(&candidates, &SelectionModel::default(), 6);
        let ids: Vec<u64> = recs.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_deterministic() {
        let candidates: Vec<CandidateMovie> = (1..=10).map(|i| movie(i, (i % 4) as f64)).collect();
        let selection = SelectionModel {
            mood: Some("cozy".to_string()),
            ..Default::default()
        };

        let first = fallback_recommendations(&candidates, &selection, 6);
        let second = fallback_recommendations(&candidates, &selection, 6);
        assert_eq!(first, second);
    }

    #[test]
    fn test_adjacent_positions_use_different_templates() {
        let candidates: Vec<CandidateMovie> = (1..=5).map(|i| movie(i, 10.0 - i as f64)).collect();
        let selection = SelectionModel {
            mood: Some("cozy".to_string()),
            context: Some("date night".to_string()),
            ..Default::default()
        };

        let recs = fallback_recommendations(&candidates, &selection, TEMPLATE_COUNT);
        let templates: Vec<usize> = recs
            .iter()
            .map(|r| template_index(&r.reasoning, &r.movie))
            .collect();

        assert_eq!(templates, vec![0, 1, 2, 3, 4]);
        for pair in templates.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_reasoning_interpolates_selection_and_defaults() {
        let m = movie(1, 8.25);

        let with_selection = templated_reason(0, &m, "cozy", "date night");
        assert!(with_selection.contains("2001"));
        assert!(with_selection.contains("8.2/10") || with_selection.contains("8.3/10"));
        assert!(with_selection.contains("cozy"));
        assert!(with_selection.contains("date night"));

        let recs = fallback_recommendations(&[m], &SelectionModel::default(), 1);
        assert!(recs[0].reasoning.contains("entertaining"));
        assert!(recs[0].reasoning.contains("viewing"));
    }

    #[test]
    fn test_reasoning_never_empty_without_year() {
        let mut m = movie(1, 7.0);
        m.release_year = None;

        for position in 0..TEMPLATE_COUNT {
            let reason = templated_reason(position, &m, DEFAULT_MOOD, DEFAULT_CONTEXT);
            assert!(!reason.is_empty());
            assert!(!reason.contains("None"));
        }
    }
}
