// Outfit pipeline: fetch the recent thrift pool once, then compose.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::db::traits::PostRepository;
use crate::scoring::outfit::{compose, OutfitResponse, CANDIDATE_POOL_SIZE};

/// Build outfit suggestions for an optional free-text context.
///
/// Unlike the feed paths, a repository failure is returned to the caller.
pub async fn build_outfit<R>(
    store: &R,
    context: Option<&str>,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<OutfitResponse>
where
    R: PostRepository + ?Sized,
{
    let pool = store
        .fetch_thrift_eligible_posts(CANDIDATE_POOL_SIZE)
        .await
        .context("Failed to fetch thrift candidates")?;

    let response = compose(context, &pool, now);

    info!(
        user = user_id,
        pool = pool.len(),
        suggestions = response.suggestions.len(),
        items = response.items.len(),
        "Built outfit suggestions"
    );

    Ok(response)
}
