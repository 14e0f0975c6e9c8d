use serde::{Deserialize, Deserializer, Serialize};

/// Release era chosen in the questionnaire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", from = "String")]
pub enum Era {
    Any,
    Classic,
    Modern,
    Recent,
}

impl From<String> for Era {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "classic" => Era::Classic,
            "modern" => Era::Modern,
            "recent" => Era::Recent,
            _ => Era::Any,
        }
    }
}

/// Runtime bucket chosen in the questionnaire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", from = "String")]
pub enum Runtime {
    Any,
    Short,
    Long,
}

impl From<String> for Runtime {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "short" => Runtime::Short,
            "long" => Runtime::Long,
            // "any", "any-length" and anything unrecognized
            _ => Runtime::Any,
        }
    }
}

/// Minimum rating tier chosen in the questionnaire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", from = "String")]
pub enum RatingTier {
    Any,
    Good,
    HighlyRated,
}

impl From<String> for RatingTier {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "highly-rated" => RatingTier::HighlyRated,
            "good" | "good-rated" => RatingTier::Good,
            _ => RatingTier::Any,
        }
    }
}

/// The user's answers to the seven questionnaire steps.
///
/// Every field is optional. A missing or unrecognized answer means "no
/// preference" and never narrows the catalog query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionModel {
    #[serde(default, deserialize_with = "nullable_list")]
    pub genres: Vec<String>,
    #[serde(default)]
    pub era: Option<Era>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub runtime: Option<Runtime>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub rating: Option<RatingTier>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub themes: Vec<String>,
}

impl SelectionModel {
    /// Mood tag, if one was given and is not blank
    pub fn mood(&self) -> Option<&str> {
        non_blank(self.mood.as_deref())
    }

    /// Viewing-occasion tag, if one was given and is not blank
    pub fn context(&self) -> Option<&str> {
        non_blank(self.context.as_deref())
    }

    /// Theme tags with blanks removed
    pub fn themes(&self) -> Vec<&str> {
        self.themes
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn nullable_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_object_is_all_defaults() {
        let selection: SelectionModel = serde_json::from_value(json!({})).unwrap();
        assert_eq!(selection, SelectionModel::default());
    }

    #[test]
    fn test_nulls_accepted_everywhere() {
        let selection: SelectionModel = serde_json::from_value(json!({
            "genres": null,
            "era": null,
            "mood": null,
            "runtime": null,
            "context": null,
            "rating": null,
            "themes": null
        }))
        .unwrap();
        assert_eq!(selection, SelectionModel::default());
    }

    #[test]
    fn test_questionnaire_payload() {
        let selection: SelectionModel = serde_json::from_value(json!({
            "genres": ["action", "sci-fi"],
            "era": "recent",
            "mood": "thrilling",
            "runtime": "any-length",
            "context": "solo-evening",
            "rating": "good-rated",
            "themes": ["space", "time travel"]
        }))
        .unwrap();

        assert_eq!(selection.genres, vec!["action", "sci-fi"]);
        assert_eq!(selection.era, Some(Era::Recent));
        assert_eq!(selection.runtime, Some(Runtime::Any));
        assert_eq!(selection.rating, Some(RatingTier::Good));
        assert_eq!(selection.mood(), Some("thrilling"));
        assert_eq!(selection.context(), Some("solo-evening"));
        assert_eq!(selection.themes(), vec!["space", "time travel"]);
    }

    #[test]
    fn test_unknown_enum_values_degrade_to_any() {
        let selection: SelectionModel = serde_json::from_value(json!({
            "era": "silent-film",
            "runtime": "epic",
            "rating": "five-stars"
        }))
        .unwrap();

        assert_eq!(selection.era, Some(Era::Any));
        assert_eq!(selection.runtime, Some(Runtime::Any));
        assert_eq!(selection.rating, Some(RatingTier::Any));
    }

    #[test]
    fn test_blank_strings_are_absent() {
        let selection = SelectionModel {
            mood: Some("   ".to_string()),
            context: Some(String::new()),
            themes: vec![" ".to_string(), "heist".to_string()],
            ..Default::default()
        };

        assert_eq!(selection.mood(), None);
        assert_eq!(selection.context(), None);
        assert_eq!(selection.themes(), vec!["heist"]);
    }

    #[test]
    fn test_rating_tier_serializes_kebab_case() {
        let json = serde_json::to_string(&RatingTier::HighlyRated).unwrap();
        assert_eq!(json, "\"highly-rated\"");
    }
}
