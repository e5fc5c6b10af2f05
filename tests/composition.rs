// Composition tests — the three pipelines running end to end over the
// in-memory backend: profile -> tiered queries -> merge -> backfill, and
// pool -> score -> assemble. No filesystem or network access.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use thriftfeed::db::memory::MemoryDatabase;
use thriftfeed::db::models::{
    CandidatePost, EngagementRecord, WardrobeItem, WardrobeSignal,
};
use thriftfeed::db::{Database, PostFilter, PostRepository, WardrobeRepository};
use thriftfeed::pipeline::feed::feed_with_recommendations;
use thriftfeed::pipeline::outfit::build_outfit;
use thriftfeed::pipeline::suggestions::suggestions;

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()
}

struct Listing<'a> {
    id: &'a str,
    author: &'a str,
    tags: &'a [&'a str],
    category: &'a str,
    caption: &'a str,
    hours_old: i64,
}

fn post(listing: Listing<'_>) -> CandidatePost {
    CandidatePost {
        id: listing.id.to_string(),
        tags: listing.tags.iter().map(|t| t.to_string()).collect(),
        category: Some(listing.category.to_string()),
        caption: listing.caption.to_string(),
        created_at: base() - Duration::hours(listing.hours_old),
        author: listing.author.to_string(),
        is_public: true,
        is_thrift: false,
        image: None,
    }
}

fn simple(id: &str, author: &str, hours_old: i64) -> CandidatePost {
    post(Listing {
        id,
        author,
        tags: &[],
        category: "others",
        caption: "misc",
        hours_old,
    })
}

fn ids(posts: &[CandidatePost]) -> Vec<&str> {
    posts.iter().map(|p| p.id.as_str()).collect()
}

/// A marketplace where alice likes one denim jacket.
async fn seeded_store() -> MemoryDatabase {
    let db = MemoryDatabase::new();
    let mut posts = vec![
        post(Listing { id: "L1", author: "bob", tags: &["denim"], category: "tops", caption: "denim jacket", hours_old: 240 }),
        post(Listing { id: "D1", author: "carol", tags: &["denim"], category: "dresses", caption: "denim dress", hours_old: 24 }),
        post(Listing { id: "D2", author: "carol", tags: &["denim"], category: "others", caption: "patched", hours_old: 48 }),
        post(Listing { id: "T1", author: "dave", tags: &[], category: "tops", caption: "silk blouse", hours_old: 12 }),
        post(Listing { id: "C1", author: "dave", tags: &[], category: "others", caption: "vintage jacket", hours_old: 72 }),
        post(Listing { id: "A1", author: "alice", tags: &["denim"], category: "tops", caption: "my denim", hours_old: 1 }),
    ];
    for i in 0..6 {
        posts.push(simple(&format!("X{}", i + 1), "erin", 96 + 24 * i));
    }
    let mut private = post(Listing { id: "P1", author: "bob", tags: &["denim"], category: "tops", caption: "denim hidden", hours_old: 2 });
    private.is_public = false;
    posts.push(private);

    for p in &posts {
        db.insert_post(p).await.unwrap();
    }
    db.record_like("alice", "L1").await.unwrap();
    db
}

// ============================================================
// Feed: tiered recommendation
// ============================================================

#[tokio::test]
async fn feed_merges_tiers_then_backfills_with_recent_posts() {
    let db = seeded_store().await;
    let feed = feed_with_recommendations(&db, "alice").await;

    assert_eq!(feed.top_tags, vec!["denim"]);
    assert_eq!(
        ids(&feed.suggested_posts),
        // tag tier, category tier, caption tier, then backfill by recency
        vec!["D1", "D2", "L1", "T1", "C1", "X1", "X2", "X3", "X4", "X5"]
    );
}

#[tokio::test]
async fn feed_never_returns_own_private_or_duplicate_posts() {
    let db = seeded_store().await;
    // Another like that matches every tier at once
    db.insert_post(&post(Listing { id: "M1", author: "carol", tags: &["denim"], category: "tops", caption: "denim jacket", hours_old: 5 }))
        .await
        .unwrap();
    db.record_like("alice", "M1").await.unwrap();

    let feed = feed_with_recommendations(&db, "alice").await;
    let returned = ids(&feed.suggested_posts);

    assert!(!returned.contains(&"A1"), "own post leaked: {returned:?}");
    assert!(!returned.contains(&"P1"), "private post leaked: {returned:?}");
    let unique: HashSet<&str> = returned.iter().copied().collect();
    assert_eq!(unique.len(), returned.len(), "duplicates in {returned:?}");
    assert!(returned.len() <= 10);
    assert_eq!(returned[0], "M1");
}

#[tokio::test]
async fn feed_without_engagement_returns_most_recent_public_posts() {
    let db = MemoryDatabase::new();
    for i in 0..12 {
        db.insert_post(&simple(&format!("p{i}"), "seller", i * 3)).await.unwrap();
    }
    db.insert_post(&simple("mine", "newbie", 0)).await.unwrap();
    let mut hidden = simple("hidden", "seller", 0);
    hidden.is_public = false;
    db.insert_post(&hidden).await.unwrap();

    let feed = feed_with_recommendations(&db, "newbie").await;

    assert!(feed.top_tags.is_empty());
    let expected: Vec<String> = (0..10).map(|i| format!("p{i}")).collect();
    assert_eq!(ids(&feed.suggested_posts), expected);
    assert!(feed
        .suggested_posts
        .windows(2)
        .all(|w| w[0].created_at >= w[1].created_at));
}

// ============================================================
// Suggestions
// ============================================================

#[tokio::test]
async fn suggestions_match_tags_or_captions_from_likes_and_wardrobe() {
    let db = seeded_store().await;
    db.insert_post(&post(Listing { id: "B1", author: "erin", tags: &[], category: "others", caption: "chunky Boots", hours_old: 30 }))
        .await
        .unwrap();
    db.insert_wardrobe_item(&WardrobeItem {
        id: "w1".to_string(),
        owner: "alice".to_string(),
        name: "Old boots".to_string(),
        item_type: "Boots".to_string(),
        image: None,
        post_id: None,
    })
    .await
    .unwrap();

    let posts = suggestions(&db, "alice").await;

    // denim by tag or caption, boots by caption; newest first
    assert_eq!(ids(&posts), vec!["D1", "B1", "D2", "L1"]);
}

#[tokio::test]
async fn suggestions_without_signals_fall_back_to_recency() {
    let db = seeded_store().await;
    let posts = suggestions(&db, "zed").await;
    assert_eq!(posts.len(), 10);
    // A1 is newest overall and only excluded for its own author
    assert_eq!(posts[0].id, "A1");
    assert!(posts.iter().all(|p| p.is_public));
}

// ============================================================
// Non-ASCII captions
// ============================================================

/// Alice liked one lower-case "été" post; "Robe ÉTÉ" only matches by caption.
async fn summer_store() -> MemoryDatabase {
    let db = MemoryDatabase::new();
    db.insert_post(&post(Listing { id: "L", author: "bob", tags: &[], category: "others", caption: "été", hours_old: 300 }))
        .await
        .unwrap();
    db.insert_post(&post(Listing { id: "C", author: "carol", tags: &[], category: "dresses", caption: "Robe ÉTÉ", hours_old: 200 }))
        .await
        .unwrap();
    for i in 0..9 {
        db.insert_post(&post(Listing { id: &format!("N{i}"), author: "dave", tags: &[], category: "tops", caption: "chemise", hours_old: i }))
            .await
            .unwrap();
    }
    db.record_like("alice", "L").await.unwrap();
    db
}

#[tokio::test]
async fn caption_tier_matches_upper_case_non_ascii_captions() {
    let db = summer_store().await;
    let feed = feed_with_recommendations(&db, "alice").await;

    // category tier picks L, caption tier picks C, backfill follows
    let returned = ids(&feed.suggested_posts);
    assert_eq!(&returned[..2], &["L", "C"]);
    assert_eq!(returned.len(), 10);
}

#[tokio::test]
async fn suggestions_match_upper_case_non_ascii_captions() {
    let db = summer_store().await;
    db.insert_wardrobe_item(&WardrobeItem {
        id: "w1".to_string(),
        owner: "erin".to_string(),
        name: "Sundress".to_string(),
        item_type: "Été".to_string(),
        image: None,
        post_id: None,
    })
    .await
    .unwrap();

    let posts = suggestions(&db, "erin").await;
    assert_eq!(ids(&posts), vec!["C", "L"]);
}

// ============================================================
// Outfit
// ============================================================

#[tokio::test]
async fn outfit_only_draws_from_public_thrift_posts() {
    let db = MemoryDatabase::new();
    for (i, kind) in ["jacket", "jeans", "boots"].into_iter().enumerate() {
        let mut p = post(Listing { id: kind, author: "seller", tags: &[kind], category: "others", caption: kind, hours_old: i as i64 });
        p.is_thrift = true;
        db.insert_post(&p).await.unwrap();
    }
    db.insert_post(&simple("not-thrift", "seller", 0)).await.unwrap();
    let mut private = simple("private-thrift", "seller", 0);
    private.is_thrift = true;
    private.is_public = false;
    db.insert_post(&private).await.unwrap();

    let outfit = build_outfit(&db, Some("city walk"), "alice", base()).await.unwrap();

    let picked: Vec<&str> = outfit.items.iter().map(|i| i.post_id.as_str()).collect();
    assert_eq!(picked.len(), 3);
    assert!(picked.iter().all(|id| ["jacket", "jeans", "boots"].contains(id)));
    assert_eq!(outfit.suggestions.len(), 1);
}

// ============================================================
// Repository failures
// ============================================================

struct UnavailableStore;

#[async_trait]
impl PostRepository for UnavailableStore {
    async fn fetch_liked_and_owned_posts(&self, _user_id: &str) -> Result<Vec<EngagementRecord>> {
        anyhow::bail!("connection refused")
    }

    async fn query_public_posts(&self, _filter: &PostFilter, _limit: usize) -> Result<Vec<CandidatePost>> {
        anyhow::bail!("connection refused")
    }

    async fn fetch_thrift_eligible_posts(&self, _limit: usize) -> Result<Vec<CandidatePost>> {
        anyhow::bail!("connection refused")
    }
}

#[async_trait]
impl WardrobeRepository for UnavailableStore {
    async fn fetch_wardrobe_signals(&self, _user_id: &str) -> Result<Vec<WardrobeSignal>> {
        anyhow::bail!("connection refused")
    }
}

#[tokio::test]
async fn recommendation_paths_degrade_to_empty_results() {
    let feed = feed_with_recommendations(&UnavailableStore, "alice").await;
    assert!(feed.suggested_posts.is_empty());
    assert!(feed.top_tags.is_empty());

    assert!(suggestions(&UnavailableStore, "alice").await.is_empty());
}

#[tokio::test]
async fn outfit_reports_repository_failure() {
    let result = build_outfit(&UnavailableStore, Some("brunch"), "alice", base()).await;
    assert!(result.is_err());
}
