// Preference profiling — what a user engages with, as ranked signal lists.
//
// Tags, categories and caption words from the posts a user liked (plus the
// types of their wardrobe items) are accumulated into weighted frequency
// tables, then the heaviest keys of each table make up the profile.
//
// Frequency ties keep first-seen order, so two requests over the same data
// always produce the same profile.

use std::collections::HashMap;

use serde::Serialize;

use crate::db::models::{EngagementRecord, WardrobeSignal};

/// Caption words this short or shorter are ignored.
const MIN_CAPTION_WORD_CHARS: usize = 2;

/// Normalize a tag: trim, strip leading `#`, lower-case.
///
/// Returns `None` for tags that are empty after normalization.
/// `normalize_tag(normalize_tag(x)) == normalize_tag(x)` for every input.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let tag = raw.trim().trim_start_matches('#').trim().to_lowercase();
    if tag.is_empty() {
        None
    } else {
        Some(tag)
    }
}

/// Lower-cased whitespace-separated caption words longer than two characters.
pub fn caption_words(caption: &str) -> impl Iterator<Item = String> + '_ {
    caption
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() > MIN_CAPTION_WORD_CHARS)
}

/// Weighted frequency table that remembers the order keys were first seen.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    index: HashMap<String, usize>,
    entries: Vec<(String, u32)>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `weight` to `key`, registering it if this is its first occurrence.
    pub fn add(&mut self, key: &str, weight: u32) {
        match self.index.get(key) {
            Some(&i) => self.entries[i].1 += weight,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), weight));
            }
        }
    }

    /// The `n` heaviest keys, heaviest first; equal weights keep first-seen order.
    pub fn top(&self, n: usize) -> Vec<String> {
        let mut ranked: Vec<&(String, u32)> = self.entries.iter().collect();
        // sort_by is stable, so ties stay in insertion order
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.into_iter().take(n).map(|(k, _)| k.clone()).collect()
    }
}

/// Per-source weights. `None` means the source is not collected at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileWeights {
    pub tag: u32,
    pub category: Option<u32>,
    pub caption_word: Option<u32>,
    /// Wardrobe item types count as tags
    pub wardrobe_type: Option<u32>,
}

impl ProfileWeights {
    /// Plain occurrence counts over tags and wardrobe types (post suggestions).
    pub fn unweighted() -> Self {
        Self {
            tag: 1,
            category: None,
            caption_word: None,
            wardrobe_type: Some(1),
        }
    }

    /// Tags count most, then categories, then caption words (AI feed).
    pub fn feed() -> Self {
        Self {
            tag: 3,
            category: Some(2),
            caption_word: Some(1),
            wardrobe_type: None,
        }
    }
}

/// How many entries of each list a caller keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileLimits {
    pub tags: usize,
    pub categories: usize,
    pub caption_words: usize,
}

impl ProfileLimits {
    pub fn suggestions() -> Self {
        Self {
            tags: 5,
            categories: 0,
            caption_words: 0,
        }
    }

    pub fn feed() -> Self {
        Self {
            tags: 8,
            categories: 3,
            caption_words: 5,
        }
    }
}

/// Ranked preference signals for one request. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceProfile {
    pub top_tags: Vec<String>,
    pub top_categories: Vec<String>,
    pub top_caption_words: Vec<String>,
}

impl PreferenceProfile {
    pub fn is_empty(&self) -> bool {
        self.top_tags.is_empty() && self.top_categories.is_empty() && self.top_caption_words.is_empty()
    }
}

/// Build a profile from engagement records and wardrobe signals.
///
/// Empty input gives an empty profile; callers fall back to recency.
pub fn build_profile(
    records: &[EngagementRecord],
    wardrobe: &[WardrobeSignal],
    weights: ProfileWeights,
    limits: ProfileLimits,
) -> PreferenceProfile {
    let mut tags = FrequencyTable::new();
    let mut categories = FrequencyTable::new();
    let mut words = FrequencyTable::new();

    for record in records {
        for tag in record.tags.iter().filter_map(|t| normalize_tag(t)) {
            tags.add(&tag, weights.tag);
        }

        if let Some(weight) = weights.category {
            if let Some(category) = record.category.as_deref().filter(|c| !c.is_empty()) {
                categories.add(category, weight);
            }
        }

        if let Some(weight) = weights.caption_word {
            for word in caption_words(&record.caption) {
                words.add(&word, weight);
            }
        }
    }

    if let Some(weight) = weights.wardrobe_type {
        for item_type in wardrobe.iter().filter_map(|w| normalize_tag(&w.item_type)) {
            tags.add(&item_type, weight);
        }
    }

    PreferenceProfile {
        top_tags: tags.top(limits.tags),
        top_categories: categories.top(limits.categories),
        top_caption_words: words.top(limits.caption_words),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tags: &[&str], category: Option<&str>, caption: &str) -> EngagementRecord {
        EngagementRecord {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            category: category.map(String::from),
            caption: caption.to_string(),
        }
    }

    #[test]
    fn test_normalize_tag_examples() {
        assert_eq!(normalize_tag("#Red").as_deref(), Some("red"));
        assert_eq!(normalize_tag("red").as_deref(), Some("red"));
        assert_eq!(normalize_tag(" red ").as_deref(), Some("red"));
        assert_eq!(normalize_tag("#"), None);
        assert_eq!(normalize_tag("   "), None);
    }

    #[test]
    fn test_frequency_table_ties_keep_first_seen_order() {
        let mut table = FrequencyTable::new();
        for key in ["b", "a", "c", "a", "c"] {
            table.add(key, 1);
        }
        // a and c tie at 2; a was seen first
        assert_eq!(table.top(10), vec!["a", "c", "b"]);
        assert_eq!(table.top(1), vec!["a"]);
    }

    #[test]
    fn test_feed_weights() {
        let records = vec![
            record(&["#Denim"], Some("tops"), "vintage denim jacket"),
            record(&["boho"], Some("dresses"), "a boho maxi dress"),
            record(&["denim"], Some("dresses"), "denim on denim"),
        ];
        let profile = build_profile(&records, &[], ProfileWeights::feed(), ProfileLimits::feed());

        assert_eq!(profile.top_tags, vec!["denim", "boho"]);
        assert_eq!(profile.top_categories, vec!["dresses", "tops"]);
        // "denim" x3; then ties at 1 in first-seen order; "a" and "on" are too short
        assert_eq!(
            profile.top_caption_words,
            vec!["denim", "vintage", "jacket", "boho", "maxi"]
        );
    }

    #[test]
    fn test_unweighted_counts_wardrobe_types_as_tags() {
        let records = vec![record(&["jacket"], Some("tops"), "warm jacket for winter")];
        let wardrobe = vec![
            WardrobeSignal {
                item_type: "Boots".to_string(),
            },
            WardrobeSignal {
                item_type: "boots".to_string(),
            },
            WardrobeSignal {
                item_type: "  ".to_string(),
            },
        ];
        let profile = build_profile(
            &records,
            &wardrobe,
            ProfileWeights::unweighted(),
            ProfileLimits::suggestions(),
        );

        assert_eq!(profile.top_tags, vec!["boots", "jacket"]);
        assert!(profile.top_categories.is_empty());
        assert!(profile.top_caption_words.is_empty());
    }

    #[test]
    fn test_feed_ignores_wardrobe() {
        let wardrobe = vec![WardrobeSignal {
            item_type: "scarf".to_string(),
        }];
        let profile = build_profile(&[], &wardrobe, ProfileWeights::feed(), ProfileLimits::feed());
        assert!(profile.is_empty());
    }

    #[test]
    fn test_empty_input_gives_empty_profile() {
        let profile = build_profile(
            &[],
            &[],
            ProfileWeights::unweighted(),
            ProfileLimits::suggestions(),
        );
        assert!(profile.is_empty());
        assert_eq!(profile, PreferenceProfile::default());
    }
}
