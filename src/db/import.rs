// Seed import — load posts, likes and wardrobe items from a JSON file.
//
// Post fields follow the marketplace's creation rules: unknown categories
// become "others", tags may arrive as an array or a comma-separated string,
// posts are public and not for thrift unless stated otherwise.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use super::models::{normalize_category, CandidatePost, WardrobeItem};
use super::traits::Database;

#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub posts: Vec<SeedPost>,
    #[serde(default)]
    pub likes: Vec<SeedLike>,
    #[serde(default)]
    pub wardrobe: Vec<WardrobeItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedPost {
    pub id: String,
    pub author: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub tags: SeedTags,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub is_thrift: bool,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SeedTags {
    List(Vec<String>),
    Csv(String),
}

impl Default for SeedTags {
    fn default() -> Self {
        SeedTags::List(Vec::new())
    }
}

impl SeedTags {
    fn into_vec(self) -> Vec<String> {
        let trimmed = |raw: &str| Some(raw.trim()).filter(|t| !t.is_empty()).map(String::from);
        match self {
            SeedTags::List(tags) => tags.iter().filter_map(|t| trimmed(t.as_str())).collect(),
            SeedTags::Csv(raw) => raw.split(',').filter_map(trimmed).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SeedLike {
    pub user: String,
    pub post: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub posts: usize,
    pub likes: usize,
    pub wardrobe_items: usize,
}

fn default_true() -> bool {
    true
}

impl SeedPost {
    /// Build the stored post; `now` stands in for a missing timestamp.
    pub fn into_post(self, now: DateTime<Utc>) -> CandidatePost {
        CandidatePost {
            category: Some(normalize_category(self.category.as_deref())),
            tags: self.tags.into_vec(),
            created_at: self.created_at.unwrap_or(now),
            id: self.id,
            author: self.author,
            caption: self.caption,
            is_public: self.is_public,
            is_thrift: self.is_thrift,
            image: self.image,
        }
    }
}

pub fn parse_seed(json: &str) -> Result<SeedFile> {
    serde_json::from_str(json).context("Seed file is not valid JSON in the expected shape")
}

/// Write every record of the seed file through the backend.
pub async fn import_seed(
    db: &dyn Database,
    seed: SeedFile,
    now: DateTime<Utc>,
) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();

    for post in seed.posts {
        let post = post.into_post(now);
        db.insert_post(&post)
            .await
            .with_context(|| format!("Failed to import post {}", post.id))?;
        summary.posts += 1;
    }

    for like in &seed.likes {
        db.record_like(&like.user, &like.post).await?;
        summary.likes += 1;
    }

    for item in &seed.wardrobe {
        db.insert_wardrobe_item(item)
            .await
            .with_context(|| format!("Failed to import wardrobe item {}", item.id))?;
        summary.wardrobe_items += 1;
    }

    info!(
        posts = summary.posts,
        likes = summary.likes,
        wardrobe_items = summary.wardrobe_items,
        "Imported seed data"
    );

    Ok(summary)
}
