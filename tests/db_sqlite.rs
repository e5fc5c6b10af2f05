// SQLite backend — the repository contract on a real rusqlite connection,
// checked against the in-memory backend on the same seed data.

#![cfg(feature = "sqlite")]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rusqlite::Connection;

use thriftfeed::db::import::{import_seed, parse_seed};
use thriftfeed::db::memory::MemoryDatabase;
use thriftfeed::db::models::CandidatePost;
use thriftfeed::db::sqlite::SqliteDatabase;
use thriftfeed::db::{schema, Database, PostFilter, PostMatch, PostRepository, WardrobeRepository};
use thriftfeed::pipeline::feed::feed_with_recommendations;
use thriftfeed::pipeline::outfit::build_outfit;
use thriftfeed::pipeline::suggestions::suggestions;

const SEED: &str = r#"{
    "posts": [
        {"id": "p1", "author": "bob",   "caption": "Denim jacket, barely worn", "tags": ["denim", "jacket"], "category": "tops",     "isThrift": true, "createdAt": "2026-04-01T10:00:00Z"},
        {"id": "p2", "author": "carol", "caption": "Floral summer dress",       "tags": "floral, summer",    "category": "dresses",  "isThrift": true, "createdAt": "2026-04-02T10:00:00Z"},
        {"id": "p3", "author": "carol", "caption": "High waisted denim skirt",  "tags": ["denim"],           "category": "jeans_skirts",               "createdAt": "2026-04-03T10:00:00Z"},
        {"id": "p4", "author": "dave",  "caption": "Wool scarf for rainy days", "tags": ["scarf"],           "category": "others",   "isThrift": true, "createdAt": "2026-04-04T10:00:00Z"},
        {"id": "p5", "author": "alice", "caption": "My own denim",              "tags": ["denim"],           "category": "tops",                       "createdAt": "2026-04-05T10:00:00Z"},
        {"id": "p6", "author": "dave",  "caption": "Hidden denim",              "tags": ["denim"],           "category": "tops",     "isPublic": false, "createdAt": "2026-04-06T10:00:00Z"},
        {"id": "p7", "author": "erin",  "caption": "Picnic basket bag",         "tags": ["bag"],             "category": "others",   "isThrift": true, "createdAt": "2026-04-07T10:00:00Z"}
    ],
    "likes": [
        {"user": "alice", "post": "p1"},
        {"user": "alice", "post": "p1"}
    ],
    "wardrobe": [
        {"id": "w1", "owner": "alice", "name": "Blue scarf", "type": "scarf", "postId": "p4"}
    ]
}"#;

fn sqlite_db() -> SqliteDatabase {
    let conn = Connection::open_in_memory().unwrap();
    schema::create_tables(&conn).unwrap();
    SqliteDatabase::new(conn)
}

fn import_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 10, 0, 0, 0).unwrap()
}

async fn seeded<D: Database>(db: D) -> D {
    import_seed(&db, parse_seed(SEED).unwrap(), import_time())
        .await
        .unwrap();
    db
}

fn ids(posts: &[CandidatePost]) -> Vec<&str> {
    posts.iter().map(|p| p.id.as_str()).collect()
}

#[tokio::test]
async fn import_counts_records_and_ignores_duplicate_likes() {
    let db = seeded(sqlite_db()).await;
    let counts = db.counts().await.unwrap();
    assert_eq!(counts.posts, 7);
    assert_eq!(counts.public_posts, 6);
    assert_eq!(counts.thrift_posts, 4);
    assert_eq!(counts.likes, 1);
    assert_eq!(counts.wardrobe_items, 1);
}

#[tokio::test]
async fn engagement_includes_likes_and_wardrobe_links() {
    let db = seeded(sqlite_db()).await;

    let records = db.fetch_liked_and_owned_posts("alice").await.unwrap();
    let captions: Vec<&str> = records.iter().map(|r| r.caption.as_str()).collect();
    assert_eq!(captions, vec!["Denim jacket, barely worn", "Wool scarf for rainy days"]);

    let wardrobe = db.fetch_wardrobe_signals("alice").await.unwrap();
    assert_eq!(wardrobe.len(), 1);
    assert_eq!(wardrobe[0].item_type, "scarf");

    assert!(db.fetch_liked_and_owned_posts("nobody").await.unwrap().is_empty());
}

#[tokio::test]
async fn public_queries_filter_then_limit() {
    let db = seeded(sqlite_db()).await;

    let filter = PostFilter::public_not_by("alice").with_match(PostMatch::Tags(vec!["denim".into()]));
    let denim = db.query_public_posts(&filter, 10).await.unwrap();
    assert_eq!(ids(&denim), vec!["p3", "p1"]);

    let one = db.query_public_posts(&filter, 1).await.unwrap();
    assert_eq!(ids(&one), vec!["p3"]);

    let thrift = db.fetch_thrift_eligible_posts(150).await.unwrap();
    assert_eq!(ids(&thrift), vec!["p7", "p4", "p2", "p1"]);
}

#[tokio::test]
async fn sqlite_and_memory_backends_rank_identically() {
    let sqlite = seeded(sqlite_db()).await;
    let memory = seeded(MemoryDatabase::new()).await;

    for user in ["alice", "bob", "nobody"] {
        assert_eq!(
            feed_with_recommendations(&sqlite, user).await,
            feed_with_recommendations(&memory, user).await,
            "feed differs for {user}"
        );
        assert_eq!(
            suggestions(&sqlite, user).await,
            suggestions(&memory, user).await,
            "suggestions differ for {user}"
        );
    }

    let now = import_time();
    assert_eq!(
        build_outfit(&sqlite, Some("rainy picnic"), "alice", now).await.unwrap(),
        build_outfit(&memory, Some("rainy picnic"), "alice", now).await.unwrap(),
    );
}

#[tokio::test]
async fn feed_over_sqlite_prefers_liked_tags() {
    let db = seeded(sqlite_db()).await;
    let feed = feed_with_recommendations(&db, "alice").await;

    assert_eq!(feed.top_tags[0], "denim");
    assert!(!ids(&feed.suggested_posts).contains(&"p5"));
    assert!(!ids(&feed.suggested_posts).contains(&"p6"));
    // Posts carrying a liked tag (denim, jacket, scarf) lead, newest first
    assert_eq!(&ids(&feed.suggested_posts)[..3], &["p4", "p3", "p1"]);
}

#[tokio::test]
async fn initialize_then_open_file_database() {
    let dir = std::env::temp_dir().join(format!("thriftfeed-test-{}", std::process::id()));
    let path = dir.join("feed.db");
    let path_str = path.to_string_lossy().to_string();

    assert!(thriftfeed::db::open_sqlite(&path_str).is_err());

    let db: Arc<dyn Database> = thriftfeed::db::initialize_sqlite(&path_str).unwrap();
    assert_eq!(db.table_count().await.unwrap(), 4);
    drop(db);

    let reopened = thriftfeed::db::open_sqlite(&path_str).unwrap();
    assert_eq!(reopened.counts().await.unwrap().posts, 0);

    let _ = std::fs::remove_dir_all(&dir);
}
