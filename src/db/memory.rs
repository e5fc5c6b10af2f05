// MemoryDatabase — in-process backend with the same query semantics as the
// SQLite backend. Used by the test suites and the web test harness.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::models::{CandidatePost, EngagementRecord, StoreCounts, WardrobeItem, WardrobeSignal};
use super::traits::{Database, PostFilter, PostRepository, WardrobeRepository};

#[derive(Default)]
struct Inner {
    /// Storage order is insertion order; updates replace in place
    posts: Vec<CandidatePost>,
    likes: Vec<(String, String)>,
    wardrobe: Vec<WardrobeItem>,
}

impl Inner {
    /// Public posts newest first; later insertions come first on equal timestamps.
    fn newest_first<'a>(&'a self, pred: impl Fn(&CandidatePost) -> bool) -> Vec<&'a CandidatePost> {
        let mut posts: Vec<&CandidatePost> = self.posts.iter().rev().filter(|p| pred(*p)).collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }
}

#[derive(Default)]
pub struct MemoryDatabase {
    inner: RwLock<Inner>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for MemoryDatabase {
    async fn fetch_liked_and_owned_posts(&self, user_id: &str) -> Result<Vec<EngagementRecord>> {
        let inner = self.inner.read().await;
        let mut ids: HashSet<&str> = inner
            .likes
            .iter()
            .filter(|(user, _)| user == user_id)
            .map(|(_, post)| post.as_str())
            .collect();
        ids.extend(
            inner
                .wardrobe
                .iter()
                .filter(|item| item.owner == user_id)
                .filter_map(|item| item.post_id.as_deref()),
        );

        Ok(inner
            .posts
            .iter()
            .filter(|p| ids.contains(p.id.as_str()))
            .map(EngagementRecord::from)
            .collect())
    }

    async fn query_public_posts(
        &self,
        filter: &PostFilter,
        limit: usize,
    ) -> Result<Vec<CandidatePost>> {
        let inner = self.inner.read().await;
        Ok(inner
            .newest_first(|p| filter.matches(p))
            .into_iter()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn fetch_thrift_eligible_posts(&self, limit: usize) -> Result<Vec<CandidatePost>> {
        let inner = self.inner.read().await;
        Ok(inner
            .newest_first(|p| p.is_public && p.is_thrift)
            .into_iter()
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl WardrobeRepository for MemoryDatabase {
    async fn fetch_wardrobe_signals(&self, user_id: &str) -> Result<Vec<WardrobeSignal>> {
        let inner = self.inner.read().await;
        Ok(inner
            .wardrobe
            .iter()
            .filter(|item| item.owner == user_id)
            .map(|item| WardrobeSignal {
                item_type: item.item_type.clone(),
            })
            .collect())
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn table_count(&self) -> Result<i64> {
        Ok(3)
    }

    async fn counts(&self) -> Result<StoreCounts> {
        let inner = self.inner.read().await;
        Ok(StoreCounts {
            posts: inner.posts.len() as u64,
            public_posts: inner.posts.iter().filter(|p| p.is_public).count() as u64,
            thrift_posts: inner
                .posts
                .iter()
                .filter(|p| p.is_public && p.is_thrift)
                .count() as u64,
            likes: inner.likes.len() as u64,
            wardrobe_items: inner.wardrobe.len() as u64,
        })
    }

    async fn insert_post(&self, post: &CandidatePost) -> Result<()> {
        let mut inner = self.inner.write().await;
        match inner.posts.iter().position(|p| p.id == post.id) {
            Some(i) => inner.posts[i] = post.clone(),
            None => inner.posts.push(post.clone()),
        }
        Ok(())
    }

    async fn record_like(&self, user_id: &str, post_id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        let like = (user_id.to_string(), post_id.to_string());
        if !inner.likes.contains(&like) {
            inner.likes.push(like);
        }
        Ok(())
    }

    async fn insert_wardrobe_item(&self, item: &WardrobeItem) -> Result<()> {
        let mut inner = self.inner.write().await;
        match inner.wardrobe.iter().position(|w| w.id == item.id) {
            Some(i) => inner.wardrobe[i] = item.clone(),
            None => inner.wardrobe.push(item.clone()),
        }
        Ok(())
    }
}
