//! Fixed mapping between questionnaire genre names and TMDB genre codes.

/// Genres the catalog can filter on, as (name, TMDB code)
pub const GENRES: &[(&str, u32)] = &[
    ("action", 28),
    ("adventure", 12),
    ("comedy", 35),
    ("drama", 18),
    ("horror", 27),
    ("romance", 10749),
    ("sci-fi", 878),
    ("thriller", 53),
    ("mystery", 9648),
    ("fantasy", 14),
    ("crime", 80),
    ("family", 10751),
    ("animation", 16),
    ("documentary", 99),
    ("history", 36),
    ("music", 10402),
    ("war", 10752),
    ("western", 37),
];

/// TMDB tags some results with this code; it is never offered as a filter.
const TV_MOVIE: (&str, u32) = ("tv-movie", 10770);

/// Looks up the TMDB code for a genre name, ignoring case and surrounding whitespace
pub fn genre_id(name: &str) -> Option<u32> {
    let name = name.trim();
    GENRES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|(_, id)| *id)
}

/// Resolves a TMDB code back to its display name
pub fn genre_name(id: u32) -> Option<&'static str> {
    GENRES
        .iter()
        .chain(std::iter::once(&TV_MOVIE))
        .find(|(_, known)| *known == id)
        .map(|(name, _)| *name)
}

/// Resolves a list of codes to names, dropping codes we do not know
pub fn genre_names(ids: &[u32]) -> Vec<String> {
    ids.iter()
        .filter_map(|id| genre_name(*id))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_id_case_insensitive() {
        assert_eq!(genre_id("Action"), Some(28));
        assert_eq!(genre_id(" SCI-FI "), Some(878));
        assert_eq!(genre_id("western"), Some(37));
    }

    #[test]
    fn test_genre_id_unknown() {
        assert_eq!(genre_id("telenovela"), None);
        assert_eq!(genre_id(""), None);
        // Only resolvable in reverse
        assert_eq!(genre_id("tv-movie"), None);
    }

    #[test]
    fn test_genre_names_drops_unknown_codes() {
        assert_eq!(
            genre_names(&[28, 99999, 10770, 18]),
            vec!["action".to_string(), "tv-movie".to_string(), "drama".to_string()]
        );
    }
}
