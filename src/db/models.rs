// Data models — the read projections the ranking core works with, plus the
// seed types used to populate a backend.
//
// These are separate from the storage code so the scoring modules can use
// them without depending on rusqlite.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post categories the marketplace accepts. Anything else is filed under "others".
pub const CATEGORIES: [&str; 4] = ["tops", "jeans_skirts", "dresses", "others"];

/// A post as seen by the ranking core. Immutable snapshot; scores are kept
/// alongside it, never on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePost {
    pub id: String,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub caption: String,
    pub created_at: DateTime<Utc>,
    pub author: String,
    pub is_public: bool,
    pub is_thrift: bool,
    pub image: Option<String>,
}

/// A post the user liked, or that one of their wardrobe items links to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngagementRecord {
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub caption: String,
}

impl From<&CandidatePost> for EngagementRecord {
    fn from(post: &CandidatePost) -> Self {
        Self {
            tags: post.tags.clone(),
            category: post.category.clone(),
            caption: post.caption.clone(),
        }
    }
}

/// The type of one of the user's wardrobe items ("jacket", "jeans", ...).
#[derive(Debug, Clone, PartialEq)]
pub struct WardrobeSignal {
    pub item_type: String,
}

/// A wardrobe item as stored by a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardrobeItem {
    pub id: String,
    pub owner: String,
    pub name: String,
    #[serde(rename = "type", default = "default_item_type")]
    pub item_type: String,
    #[serde(default)]
    pub image: Option<String>,
    /// Optional link back to the post the item came from
    #[serde(default)]
    pub post_id: Option<String>,
}

fn default_item_type() -> String {
    "other".to_string()
}

/// Row counts for `thriftfeed status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub posts: u64,
    pub public_posts: u64,
    pub thrift_posts: u64,
    pub likes: u64,
    pub wardrobe_items: u64,
}

/// Clamp a category to the accepted set. Missing categories become "others".
pub fn normalize_category(category: Option<&str>) -> String {
    match category.map(str::trim) {
        Some(c) if CATEGORIES.contains(&c) => c.to_string(),
        _ => "others".to_string(),
    }
}
