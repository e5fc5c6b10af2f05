// Database queries — every SQL statement the SQLite backend runs.
//
// Keeping SQL in one place gives the rest of the app clean Rust interfaces.
// Public-post queries push the cheap predicates (visibility, author) into SQL
// and apply the full `PostFilter` in Rust while walking rows newest first,
// so both backends share one definition of what a filter matches.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};

use super::models::{CandidatePost, EngagementRecord, StoreCounts, WardrobeItem, WardrobeSignal};
use super::traits::PostFilter;

const POST_COLUMNS: &str =
    "id, author, caption, tags, category, is_public, is_thrift, image, created_at";

/// Raw column values; converted to a `CandidatePost` outside the row closure
/// so JSON and timestamp errors surface as anyhow errors with context.
struct PostRow {
    id: String,
    author: String,
    caption: String,
    tags: String,
    category: Option<String>,
    is_public: bool,
    is_thrift: bool,
    image: Option<String>,
    created_at: String,
}

fn read_post_row(row: &Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        author: row.get(1)?,
        caption: row.get(2)?,
        tags: row.get(3)?,
        category: row.get(4)?,
        is_public: row.get(5)?,
        is_thrift: row.get(6)?,
        image: row.get(7)?,
        created_at: row.get(8)?,
    })
}

impl PostRow {
    fn into_post(self) -> Result<CandidatePost> {
        let tags: Vec<String> = serde_json::from_str(&self.tags)
            .with_context(|| format!("Malformed tags for post {}", self.id))?;
        let created_at = parse_timestamp(&self.created_at)
            .with_context(|| format!("Malformed created_at for post {}", self.id))?;
        Ok(CandidatePost {
            id: self.id,
            tags,
            category: self.category,
            caption: self.caption,
            created_at,
            author: self.author,
            is_public: self.is_public,
            is_thrift: self.is_thrift,
            image: self.image,
        })
    }
}

/// Timestamps are stored as fixed-width RFC 3339 UTC strings so that text
/// ordering in SQL is chronological ordering.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

// --- Reads used by the ranking core ---

/// Posts liked by the user or linked from their wardrobe, in storage order.
pub fn fetch_liked_and_owned_posts(conn: &Connection, user_id: &str) -> Result<Vec<EngagementRecord>> {
    let sql = format!(
        "SELECT {POST_COLUMNS} FROM posts
         WHERE id IN (SELECT post_id FROM post_likes WHERE user_id = ?1)
            OR id IN (SELECT post_id FROM wardrobe_items WHERE owner = ?1 AND post_id IS NOT NULL)
         ORDER BY rowid"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id], read_post_row)?;

    let mut records = Vec::new();
    for row in rows {
        let post = row?.into_post()?;
        records.push(EngagementRecord::from(&post));
    }
    Ok(records)
}

/// Public posts passing `filter`, newest first (later insertion wins ties).
pub fn query_public_posts(
    conn: &Connection,
    filter: &PostFilter,
    limit: usize,
) -> Result<Vec<CandidatePost>> {
    let sql = format!(
        "SELECT {POST_COLUMNS} FROM posts
         WHERE is_public = 1 AND (?1 IS NULL OR author != ?1)
         ORDER BY created_at DESC, rowid DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![filter.exclude_author], read_post_row)?;

    let mut posts = Vec::new();
    for row in rows {
        if posts.len() >= limit {
            break;
        }
        let post = row?.into_post()?;
        if filter.matches(&post) {
            posts.push(post);
        }
    }
    Ok(posts)
}

/// Public thrift posts, newest first.
pub fn fetch_thrift_eligible_posts(conn: &Connection, limit: usize) -> Result<Vec<CandidatePost>> {
    let sql = format!(
        "SELECT {POST_COLUMNS} FROM posts
         WHERE is_public = 1 AND is_thrift = 1
         ORDER BY created_at DESC, rowid DESC
         LIMIT ?1"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![limit as i64], read_post_row)?;

    let mut posts = Vec::new();
    for row in rows {
        posts.push(row?.into_post()?);
    }
    Ok(posts)
}

/// Wardrobe item types for a user, in storage order.
pub fn fetch_wardrobe_signals(conn: &Connection, user_id: &str) -> Result<Vec<WardrobeSignal>> {
    let mut stmt = conn.prepare("SELECT type FROM wardrobe_items WHERE owner = ?1 ORDER BY rowid")?;
    let signals = stmt
        .query_map(params![user_id], |row| {
            Ok(WardrobeSignal {
                item_type: row.get(0)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(signals)
}

// --- Seeding ---

/// Insert a post, or update it in place (keeping its storage position).
pub fn upsert_post(conn: &Connection, post: &CandidatePost) -> Result<()> {
    let tags_json = serde_json::to_string(&post.tags)?;
    conn.execute(
        "INSERT INTO posts (id, author, caption, tags, category, is_public, is_thrift, image, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(id) DO UPDATE SET
            author = ?2,
            caption = ?3,
            tags = ?4,
            category = ?5,
            is_public = ?6,
            is_thrift = ?7,
            image = ?8,
            created_at = ?9",
        params![
            post.id,
            post.author,
            post.caption,
            tags_json,
            post.category,
            post.is_public,
            post.is_thrift,
            post.image,
            format_timestamp(&post.created_at),
        ],
    )?;
    Ok(())
}

/// Record a like. Liking twice is a no-op.
pub fn insert_like(conn: &Connection, user_id: &str, post_id: &str) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO post_likes (user_id, post_id) VALUES (?1, ?2)",
        params![user_id, post_id],
    )?;
    Ok(())
}

/// Insert a wardrobe item, or update it in place.
pub fn upsert_wardrobe_item(conn: &Connection, item: &WardrobeItem) -> Result<()> {
    conn.execute(
        "INSERT INTO wardrobe_items (id, owner, name, type, image, post_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
            owner = ?2,
            name = ?3,
            type = ?4,
            image = ?5,
            post_id = ?6",
        params![
            item.id,
            item.owner,
            item.name,
            item.item_type,
            item.image,
            item.post_id,
        ],
    )?;
    Ok(())
}

// --- Admin ---

pub fn counts(conn: &Connection) -> Result<StoreCounts> {
    let count = |sql: &str| -> Result<u64> {
        let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
        Ok(n.max(0) as u64)
    };
    Ok(StoreCounts {
        posts: count("SELECT COUNT(*) FROM posts")?,
        public_posts: count("SELECT COUNT(*) FROM posts WHERE is_public = 1")?,
        thrift_posts: count("SELECT COUNT(*) FROM posts WHERE is_public = 1 AND is_thrift = 1")?,
        likes: count("SELECT COUNT(*) FROM post_likes")?,
        wardrobe_items: count("SELECT COUNT(*) FROM wardrobe_items")?,
    })
}
