// Outfit composition — turn free-text context and a pool of recent thrift
// posts into up to two outfit suggestions.
//
// Each post scores:
//
//   +3 per context keyword found in its caption or tags (presence, not count)
//   +0..3 recency bonus, decaying linearly to zero over 30 days
//   +0.5 if it has any tag
//
// Score ties are broken by a rolling hash of the post id salted with a hash
// of the context, so the same context always yields the same ordering while
// different contexts shuffle equal-scoring posts differently. This is
// reproducible pseudo-randomness, not a quality hash.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::models::CandidatePost;

/// Recent thrift posts considered per request.
pub const CANDIDATE_POOL_SIZE: usize = 150;

/// Items per outfit suggestion.
pub const MAX_OUTFIT_ITEMS: usize = 4;

/// Where the second suggestion starts scanning, past the first one's top picks.
pub const SECOND_SUGGESTION_OFFSET: usize = MAX_OUTFIT_ITEMS;

const KEYWORD_HIT: f64 = 3.0;
const TAGGED_BONUS: f64 = 0.5;
const RECENCY_MAX: f64 = 3.0;
const RECENCY_WINDOW_DAYS: f64 = 30.0;
const MS_PER_DAY: f64 = 86_400_000.0;

const STOPWORDS: [&str; 17] = [
    "a", "an", "the", "for", "with", "and", "or", "of", "on", "to", "in", "at", "by", "day",
    "outfit", "look", "style",
];

const FALLBACK_SELECTION: &str = "a curated selection from recent thrift posts";

/// 32-bit rolling hash: `h = h * 31 + c` with wraparound, over Unicode scalars.
pub fn rolling_hash(s: &str) -> u32 {
    s.chars()
        .fold(0u32, |h, c| h.wrapping_mul(31).wrapping_add(c as u32))
}

/// Lower-case, split on anything outside `[a-z0-9#+]`, drop stopwords.
pub fn context_keywords(context: &str) -> Vec<String> {
    context
        .to_lowercase()
        .split(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '#' || c == '+'))
        .filter(|w| !w.is_empty() && !STOPWORDS.contains(w))
        .map(String::from)
        .collect()
}

/// Bonus for freshness: 3 for a post made now, 0 at 30 days and beyond.
pub fn recency_bonus(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age_days = (now - created_at).num_milliseconds() as f64 / MS_PER_DAY;
    let age_days = age_days.clamp(0.0, RECENCY_WINDOW_DAYS);
    (RECENCY_MAX - age_days / 10.0).max(0.0)
}

/// Score one post against the context keywords.
pub fn score_post(post: &CandidatePost, keywords: &[String], now: DateTime<Utc>) -> f64 {
    let text = format!("{} {}", post.caption, post.tags.join(" ")).to_lowercase();

    let hits = keywords
        .iter()
        .filter(|k| !k.is_empty() && text.contains(k.as_str()))
        .count();

    let mut score = hits as f64 * KEYWORD_HIT;
    score += recency_bonus(post.created_at, now);
    if !post.tags.is_empty() {
        score += TAGGED_BONUS;
    }
    score
}

/// A post with its score for one ranking pass.
#[derive(Debug, Clone)]
pub struct ScoredCandidate<'a> {
    pub post: &'a CandidatePost,
    pub score: f64,
    pub tie_break: u32,
}

/// Score and order the pool: score descending, then tie-break hash descending.
pub fn rank_pool<'a>(
    pool: &'a [CandidatePost],
    context: &str,
    now: DateTime<Utc>,
) -> Vec<ScoredCandidate<'a>> {
    let raw = context.to_lowercase();
    let keywords = context_keywords(&raw);
    let context_hash = rolling_hash(&raw);

    let mut ranked: Vec<ScoredCandidate<'a>> = pool
        .iter()
        .map(|post| ScoredCandidate {
            post,
            score: score_post(post, &keywords, now),
            tie_break: rolling_hash(&format!("{}{}", post.id, context_hash)),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.tie_break.cmp(&a.tie_break))
    });
    ranked
}

/// The kind of garment a post represents: its first tag, else its category,
/// else "item". Lower-cased.
pub fn primary_type(post: &CandidatePost) -> String {
    post.tags
        .first()
        .filter(|t| !t.is_empty())
        .or(post.category.as_ref().filter(|c| !c.is_empty()))
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| "item".to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutfitItem {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub image: Option<String>,
    pub post_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutfitSuggestion {
    pub items: Vec<OutfitItem>,
    pub description: String,
}

/// The outfit response; `items`/`description` repeat the first suggestion
/// for older clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutfitResponse {
    pub context: Option<String>,
    pub items: Vec<OutfitItem>,
    pub description: String,
    pub suggestions: Vec<OutfitSuggestion>,
    pub image_url: Option<String>,
}

/// Greedily pick up to four items of distinct primary type, scanning the
/// ranked pool from `start`.
pub fn assemble_suggestion(
    ranked: &[ScoredCandidate<'_>],
    start: usize,
    context: Option<&str>,
) -> OutfitSuggestion {
    let mut used_types = HashSet::new();
    let mut items = Vec::new();

    for candidate in ranked.iter().skip(start) {
        let item_type = primary_type(candidate.post);
        if !used_types.insert(item_type.clone()) {
            continue;
        }
        let post = candidate.post;
        items.push(OutfitItem {
            name: if post.caption.is_empty() {
                "Untitled".to_string()
            } else {
                post.caption.clone()
            },
            item_type,
            image: post.image.clone(),
            post_id: post.id.clone(),
        });
        if items.len() >= MAX_OUTFIT_ITEMS {
            break;
        }
    }

    let description = describe(&items, context);
    OutfitSuggestion { items, description }
}

fn describe(items: &[OutfitItem], context: Option<&str>) -> String {
    let occasion = match context {
        Some(c) if !c.is_empty() => format!(" for {c}"),
        _ => String::new(),
    };
    let selection = if items.is_empty() {
        FALLBACK_SELECTION.to_string()
    } else {
        items
            .iter()
            .map(|i| format!("{} ({})", i.item_type, i.name))
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "Outfit idea{occasion}: Combine {selection}. Balanced silhouettes and colors drawn from community posts."
    )
}

/// Compose the full outfit response for a context over a candidate pool.
pub fn compose(context: Option<&str>, pool: &[CandidatePost], now: DateTime<Utc>) -> OutfitResponse {
    let context = context.filter(|c| !c.is_empty());
    let ranked = rank_pool(pool, context.unwrap_or(""), now);

    let mut suggestions = Vec::new();
    if !ranked.is_empty() {
        suggestions.push(assemble_suggestion(&ranked, 0, context));
    }
    if ranked.len() > SECOND_SUGGESTION_OFFSET {
        suggestions.push(assemble_suggestion(&ranked, SECOND_SUGGESTION_OFFSET, context));
    }

    let first = suggestions.first().cloned().unwrap_or_default();
    OutfitResponse {
        context: context.map(String::from),
        items: first.items,
        description: first.description,
        suggestions,
        image_url: None,
    }
}
