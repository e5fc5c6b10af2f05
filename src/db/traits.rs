// Repository traits — the narrow read interfaces the ranking core depends on,
// plus the backend trait that adds seeding and admin operations.
//
// Implementors: SqliteDatabase (wraps rusqlite), MemoryDatabase (tests).
// All methods are async so a sync backend (rusqlite behind a Mutex) and a
// native async one fit behind the same interface.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use regex_lite::Regex;

use super::models::{CandidatePost, EngagementRecord, StoreCounts, WardrobeItem, WardrobeSignal};

/// Which posts a public-post query should return, beyond `is_public`.
#[derive(Debug, Clone)]
pub enum PostMatch {
    /// Every public post
    Any,
    /// Posts carrying at least one of these tags (exact match)
    Tags(Vec<String>),
    /// Posts in one of these categories
    Categories(Vec<String>),
    /// Posts whose caption matches the pattern
    Caption(Regex),
    /// Posts carrying one of the tags, or whose caption matches the pattern
    TagsOrCaption { tags: Vec<String>, caption: Regex },
}

impl PostMatch {
    pub fn matches(&self, post: &CandidatePost) -> bool {
        match self {
            PostMatch::Any => true,
            PostMatch::Tags(tags) => has_any_tag(post, tags),
            PostMatch::Categories(categories) => post
                .category
                .as_ref()
                .is_some_and(|c| categories.contains(c)),
            PostMatch::Caption(pattern) => caption_matches(pattern, post),
            PostMatch::TagsOrCaption { tags, caption } => {
                has_any_tag(post, tags) || caption_matches(caption, post)
            }
        }
    }
}

/// Keyword patterns are built from lower-cased words and regex-lite's `(?i)`
/// only folds ASCII, so the caption is lower-cased first ("ÉTÉ" matches "été").
fn caption_matches(pattern: &Regex, post: &CandidatePost) -> bool {
    pattern.is_match(&post.caption.to_lowercase())
}

fn has_any_tag(post: &CandidatePost, tags: &[String]) -> bool {
    post.tags.iter().any(|t| tags.contains(t))
}

/// Filter for `PostRepository::query_public_posts`.
///
/// Non-public posts are never returned, whatever the filter says.
#[derive(Debug, Clone)]
pub struct PostFilter {
    /// Skip posts by this author (the requester)
    pub exclude_author: Option<String>,
    /// Skip posts with these ids (already picked by an earlier query)
    pub exclude_ids: HashSet<String>,
    pub matcher: PostMatch,
}

impl PostFilter {
    /// Every public post not written by `user_id`.
    pub fn public_not_by(user_id: &str) -> Self {
        Self {
            exclude_author: Some(user_id.to_string()),
            exclude_ids: HashSet::new(),
            matcher: PostMatch::Any,
        }
    }

    pub fn with_match(mut self, matcher: PostMatch) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn excluding<'a, I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        self.exclude_ids.extend(ids.into_iter().cloned());
        self
    }

    pub fn matches(&self, post: &CandidatePost) -> bool {
        post.is_public
            && self.exclude_author.as_deref() != Some(post.author.as_str())
            && !self.exclude_ids.contains(&post.id)
            && self.matcher.matches(post)
    }
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Posts the user liked plus posts their wardrobe items link to, in
    /// storage order, each at most once.
    async fn fetch_liked_and_owned_posts(&self, user_id: &str) -> Result<Vec<EngagementRecord>>;

    /// Public posts passing `filter`, newest first, at most `limit`.
    async fn query_public_posts(&self, filter: &PostFilter, limit: usize)
        -> Result<Vec<CandidatePost>>;

    /// Public thrift posts, newest first, at most `limit`.
    async fn fetch_thrift_eligible_posts(&self, limit: usize) -> Result<Vec<CandidatePost>>;
}

#[async_trait]
pub trait WardrobeRepository: Send + Sync {
    /// The types of the user's wardrobe items, in storage order.
    async fn fetch_wardrobe_signals(&self, user_id: &str) -> Result<Vec<WardrobeSignal>>;
}

/// Full backend interface: the read repositories plus seeding and admin.
#[async_trait]
pub trait Database: PostRepository + WardrobeRepository {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    /// Row counts per collection.
    async fn counts(&self) -> Result<StoreCounts>;

    // --- Seeding ---

    /// Insert or replace a post.
    async fn insert_post(&self, post: &CandidatePost) -> Result<()>;

    /// Record that `user_id` liked `post_id` (idempotent).
    async fn record_like(&self, user_id: &str, post_id: &str) -> Result<()>;

    /// Insert or replace a wardrobe item.
    async fn insert_wardrobe_item(&self, item: &WardrobeItem) -> Result<()>;
}
