// Tiered feed recommendation — query planning and merge.
//
// A profile turns into up to three candidate queries, strongest signal first:
//
//   tag membership       weight 10
//   category membership  weight 8
//   caption keywords     weight 5
//
// Results are merged in tier order, deduplicated, sorted by tier weight and
// truncated. The weight of each pick lives in a side table keyed by post id;
// posts themselves are never annotated.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use regex_lite::Regex;

use super::profile::PreferenceProfile;
use crate::db::models::CandidatePost;
use crate::db::traits::PostMatch;

/// Posts returned by the feed and by the suggestions list.
pub const FEED_SIZE: usize = 10;

/// Candidates fetched per tier.
pub const TIER_FETCH_LIMIT: usize = 15;

pub const TAG_TIER_WEIGHT: u32 = 10;
pub const CATEGORY_TIER_WEIGHT: u32 = 8;
pub const CAPTION_TIER_WEIGHT: u32 = 5;

/// One candidate query and the weight its results carry.
#[derive(Debug, Clone)]
pub struct Tier {
    pub weight: u32,
    pub matcher: PostMatch,
}

/// Case-insensitive pattern matching any of `keywords` literally.
///
/// Keywords are escaped, so regex metacharacters in captions or tags
/// ("c++", "50/50 (mix)") match themselves.
pub fn keyword_pattern(keywords: &[String]) -> Result<Regex> {
    let alternation = keywords
        .iter()
        .map(|k| regex_lite::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i){alternation}"))
        .with_context(|| format!("Failed to build keyword pattern from {keywords:?}"))
}

/// Plan the tier queries for a profile. Tiers with no keys are skipped.
pub fn plan_tiers(profile: &PreferenceProfile) -> Result<Vec<Tier>> {
    let mut tiers = Vec::new();

    if !profile.top_tags.is_empty() {
        tiers.push(Tier {
            weight: TAG_TIER_WEIGHT,
            matcher: PostMatch::Tags(profile.top_tags.clone()),
        });
    }

    if !profile.top_categories.is_empty() {
        tiers.push(Tier {
            weight: CATEGORY_TIER_WEIGHT,
            matcher: PostMatch::Categories(profile.top_categories.clone()),
        });
    }

    if !profile.top_caption_words.is_empty() {
        tiers.push(Tier {
            weight: CAPTION_TIER_WEIGHT,
            matcher: PostMatch::Caption(keyword_pattern(&profile.top_caption_words)?),
        });
    }

    Ok(tiers)
}

/// Accumulates tier results in order, skipping posts an earlier tier picked.
#[derive(Debug, Default)]
pub struct TierMerge {
    picked: Vec<CandidatePost>,
    weights: HashMap<String, u32>,
}

impl TierMerge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids picked so far; later tier queries exclude these.
    pub fn picked_ids(&self) -> HashSet<String> {
        self.weights.keys().cloned().collect()
    }

    pub fn picked_count(&self) -> usize {
        self.picked.len()
    }

    /// Add one tier's results. Returns how many posts were new.
    pub fn push_tier(&mut self, weight: u32, posts: Vec<CandidatePost>) -> usize {
        let before = self.picked.len();
        for post in posts {
            if self.weights.contains_key(&post.id) {
                continue;
            }
            self.weights.insert(post.id.clone(), weight);
            self.picked.push(post);
        }
        self.picked.len() - before
    }

    /// Heaviest first (tier order kept within a weight), at most `limit`.
    pub fn finish(self, limit: usize) -> Vec<CandidatePost> {
        let TierMerge { mut picked, weights } = self;
        let weight = |p: &CandidatePost| weights.get(&p.id).copied().unwrap_or(0);
        picked.sort_by(|a, b| weight(b).cmp(&weight(a)));
        picked.truncate(limit);
        picked
    }
}
