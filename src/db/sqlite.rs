// SqliteDatabase — rusqlite backend implementing the repository traits.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Sync.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.
// The lock is never held across .await points.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{CandidatePost, EngagementRecord, StoreCounts, WardrobeItem, WardrobeSignal};
use super::traits::{Database, PostFilter, PostRepository, WardrobeRepository};

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl PostRepository for SqliteDatabase {
    async fn fetch_liked_and_owned_posts(&self, user_id: &str) -> Result<Vec<EngagementRecord>> {
        let conn = self.conn.lock().await;
        super::queries::fetch_liked_and_owned_posts(&conn, user_id)
    }

    async fn query_public_posts(
        &self,
        filter: &PostFilter,
        limit: usize,
    ) -> Result<Vec<CandidatePost>> {
        let conn = self.conn.lock().await;
        super::queries::query_public_posts(&conn, filter, limit)
    }

    async fn fetch_thrift_eligible_posts(&self, limit: usize) -> Result<Vec<CandidatePost>> {
        let conn = self.conn.lock().await;
        super::queries::fetch_thrift_eligible_posts(&conn, limit)
    }
}

#[async_trait]
impl WardrobeRepository for SqliteDatabase {
    async fn fetch_wardrobe_signals(&self, user_id: &str) -> Result<Vec<WardrobeSignal>> {
        let conn = self.conn.lock().await;
        super::queries::fetch_wardrobe_signals(&conn, user_id)
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn counts(&self) -> Result<StoreCounts> {
        let conn = self.conn.lock().await;
        super::queries::counts(&conn)
    }

    async fn insert_post(&self, post: &CandidatePost) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::upsert_post(&conn, post)
    }

    async fn record_like(&self, user_id: &str, post_id: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::insert_like(&conn, user_id, post_id)
    }

    async fn insert_wardrobe_item(&self, item: &WardrobeItem) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::upsert_wardrobe_item(&conn, item)
    }
}
