//! Language-model ranking of catalog candidates.
//!
//! The model sees the candidate list and a description of what the user asked
//! for, and is told to answer with a JSON array of `{id, reasoning}` objects.
//! Its answer is treated as untrusted input: it is parsed by a total function,
//! malformed entries are dropped, ids that were never offered are ignored, and
//! any failure along the way switches to the deterministic fallback.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::Value;

use crate::{
    models::{CandidateMovie, RankedRecommendation, SelectionModel},
    services::{
        fallback::fallback_recommendations,
        providers::{CompletionRequest, TextGenerator},
    },
};

/// Close to the service maximum so reasoning does not read templated
pub const RANKING_TEMPERATURE: f32 = 0.95;
pub const RANKING_MAX_TOKENS: u32 = 2000;

const SYSTEM_PROMPT: &str = "You are a sharp, highly specific film analyst. Every movie you recommend gets its own reasoning that points to concrete plot elements, characters or tone from that particular film. You never reuse a reasoning pattern and never fall back on generic praise. You always answer with nothing but a valid JSON array.";

const MISSING_OVERVIEW: &str = "No description available";

/// One `{id, reasoning}` pick returned by the model
#[derive(Debug, Clone, PartialEq)]
pub struct RankingEntry {
    pub id: u64,
    pub reasoning: String,
}

/// Why a model answer could not be used at all
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("response is JSON but not an array")]
    NotArray,
}

/// Ranks candidates with the text generation service.
///
/// Never fails: generation errors, unparseable answers and answers that
/// reference no known candidate all produce the fallback ranking instead.
pub async fn rank(
    generator: &dyn TextGenerator,
    candidates: &[CandidateMovie],
    selection: &SelectionModel,
    count: usize,
) -> Vec<RankedRecommendation> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let request = build_request(candidates, selection, count);

    let raw = match generator.generate(&request).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(
                provider = generator.name(),
                error = %e,
                "Generation failed, using fallback ranking"
            );
            return fallback_recommendations(candidates, selection, count);
        }
    };

    tracing::debug!(response = %raw, "Raw ranking response");

    let entries = match parse_ranking(&raw) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(error = %e, "Unusable ranking response, using fallback ranking");
            return fallback_recommendations(candidates, selection, count);
        }
    };

    let recommendations = select_recommendations(candidates, entries, count);
    if recommendations.is_empty() {
        tracing::warn!("Ranking response matched no candidates, using fallback ranking");
        return fallback_recommendations(candidates, selection, count);
    }

    tracing::info!(
        recommendations = recommendations.len(),
        "Ranked with generated reasoning"
    );

    recommendations
}

// =============================================================================
// PROMPT
// =============================================================================

#[derive(Serialize)]
struct PromptCandidate<'a> {
    id: u64,
    title: &'a str,
    overview: &'a str,
}

/// Builds the chat request for ranking `candidates` against `selection`
pub fn build_request(
    candidates: &[CandidateMovie],
    selection: &SelectionModel,
    count: usize,
) -> CompletionRequest {
    let listed: Vec<PromptCandidate> = candidates
        .iter()
        .map(|m| PromptCandidate {
            id: m.id,
            title: &m.title,
            overview: if m.overview.trim().is_empty() {
                MISSING_OVERVIEW
            } else {
                m.overview.as_str()
            },
        })
        .collect();
    // Serializing plain structs of strings and integers cannot fail
    let listed = serde_json::to_string_pretty(&listed).unwrap_or_default();

    let request_summary = describe_selection(selection);
    let mood = selection.mood().unwrap_or("any");
    let context = selection.context().unwrap_or("any occasion");

    let user = format!(
        r#"Pick the {count} best movies for this viewer from the candidates below and justify each pick.

**What the viewer asked for:** {request_summary}

**Candidates (JSON):**
{listed}

**How to work:**
1. Look at every candidate on its own. Ask how THIS movie's plot, characters or tone fits a viewer who wants a '{mood}' mood for '{context}'.
2. Choose the {count} strongest matches. For each one write a single sentence of reasoning that belongs to that movie alone.
3. Return the picks as one JSON array.

**Rules against repetition:**
- Never use the same sentence, or the same sentence structure, for two movies.
- Every reasoning must name a concrete detail from that movie's overview: a character, a relationship, a setting or an event. "An engaging storyline" is not a detail.
- Do not just repeat the viewer's criteria back; explain why the movie fits them.
- Only use ids from the candidate list.

**Output:** ONLY a JSON array of exactly {count} objects shaped like {{"id": <candidate id>, "reasoning": "<one sentence>"}}. No markdown, no commentary.

Example of the expected shape and variety:
[
  {{"id": 101, "reasoning": "The rivalry between two stage magicians escalating into obsession gives the tense, twisty evening you're after."}},
  {{"id": 202, "reasoning": "A lonely girl adopting a chaotic alien she mistakes for a dog makes for warm, goofy company on a family night."}}
]"#
    );

    CompletionRequest {
        system: SYSTEM_PROMPT.to_string(),
        user,
        temperature: RANKING_TEMPERATURE,
        max_tokens: RANKING_MAX_TOKENS,
    }
}

/// Natural-language summary of the answered questionnaire fields
pub fn describe_selection(selection: &SelectionModel) -> String {
    let mut parts = Vec::new();

    if let Some(context) = selection.context() {
        parts.push(format!("viewing context: '{}'", context));
    }
    if let Some(mood) = selection.mood() {
        parts.push(format!("desired mood: '{}'", mood));
    }
    if !selection.genres.is_empty() {
        parts.push(format!("favorite genres: {}", selection.genres.join(", ")));
    }
    if let Some(era) = selection.era {
        parts.push(format!("preferred era: '{}'", enum_label(&era)));
    }
    if let Some(runtime) = selection.runtime {
        parts.push(format!("preferred length: '{}'", enum_label(&runtime)));
    }
    if let Some(rating) = selection.rating {
        parts.push(format!("rating preference: '{}'", enum_label(&rating)));
    }
    let themes = selection.themes();
    if !themes.is_empty() {
        parts.push(format!("themes they enjoy: {}", themes.join(", ")));
    }

    if parts.is_empty() {
        "no specific preferences; choose broadly appealing, well-made films".to_string()
    } else {
        parts.join(", ")
    }
}

fn enum_label<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(Value::String(label)) => label,
        _ => "any".to_string(),
    }
}

// =============================================================================
// RESPONSE VALIDATION
// =============================================================================

/// Parses a raw model answer into `{id, reasoning}` entries.
///
/// Code fences are stripped first. If the remaining text is not JSON, the
/// slice from the first `[` to the last `]` is tried, since models sometimes
/// wrap the array in prose. Entries without a usable id or a non-blank
/// reasoning are dropped rather than failing the whole answer.
pub fn parse_ranking(raw: &str) -> Result<Vec<RankingEntry>, ParseError> {
    let text = strip_code_fences(raw);

    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => match bracketed_array(text) {
            Some(inner) => serde_json::from_str(inner).map_err(|_| ParseError::InvalidJson(e))?,
            None => return Err(ParseError::InvalidJson(e)),
        },
    };

    let items = match value {
        Value::Array(items) => items,
        _ => return Err(ParseError::NotArray),
    };

    let total = items.len();
    let entries: Vec<RankingEntry> = items.iter().filter_map(entry_from_value).collect();

    if entries.len() < total {
        tracing::debug!(
            dropped = total - entries.len(),
            kept = entries.len(),
            "Dropped malformed ranking entries"
        );
    }

    Ok(entries)
}

/// Keeps the candidates the model gave a reasoning for, in catalog order,
/// at most `count` of them.
///
/// Ids that were never offered are ignored. When the model repeats an id, its
/// last reasoning wins.
pub fn select_recommendations(
    candidates: &[CandidateMovie],
    entries: Vec<RankingEntry>,
    count: usize,
) -> Vec<RankedRecommendation> {
    let offered: HashSet<u64> = candidates.iter().map(|m| m.id).collect();

    let mut reasoning_by_id: HashMap<u64, String> = HashMap::new();
    for entry in entries {
        if !offered.contains(&entry.id) {
            tracing::debug!(id = entry.id, "Ignoring ranking entry for unknown id");
            continue;
        }
        reasoning_by_id.insert(entry.id, entry.reasoning);
    }

    candidates
        .iter()
        .filter_map(|movie| {
            reasoning_by_id
                .remove(&movie.id)
                .map(|reasoning| RankedRecommendation::new(movie.clone(), reasoning))
        })
        .take(count)
        .collect()
}

fn entry_from_value(value: &Value) -> Option<RankingEntry> {
    let object = value.as_object()?;

    let id = match object.get("id")? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
    .filter(|id| *id != 0)?;

    let reasoning = object.get("reasoning")?.as_str()?.trim();
    if reasoning.is_empty() {
        return None;
    }

    Some(RankingEntry {
        id,
        reasoning: reasoning.to_string(),
    })
}

/// Removes a surrounding Markdown code fence such as ```` ```json ... ``` ````
fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Drop the language tag, if any, up to the end of the opening line
        text = match rest.find('\n') {
            Some(newline) if rest[..newline].chars().all(|c| c.is_ascii_alphanumeric()) => {
                &rest[newline + 1..]
            }
            _ => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

fn bracketed_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (start < end).then(|| &text[start..=end])
}
