// AI feed pipeline: weighted preference profile → tiered candidate queries
// → merge by tier weight → backfill with recent posts.
//
// A user with no engagement signals gets the most recent public posts.
// Any repository failure degrades to an empty feed rather than failing the
// page load.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::db::models::CandidatePost;
use crate::db::traits::{PostFilter, PostRepository};
use crate::scoring::feed::{plan_tiers, TierMerge, FEED_SIZE, TIER_FETCH_LIMIT};
use crate::scoring::profile::{build_profile, ProfileLimits, ProfileWeights};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub suggested_posts: Vec<CandidatePost>,
    pub top_tags: Vec<String>,
}

/// Build the recommended feed for `user_id`, or an empty one on failure.
pub async fn feed_with_recommendations<R>(store: &R, user_id: &str) -> FeedResponse
where
    R: PostRepository + ?Sized,
{
    match run(store, user_id).await {
        Ok(feed) => feed,
        Err(e) => {
            warn!(error = %e, user = user_id, "Feed recommendation failed, returning empty feed");
            FeedResponse::default()
        }
    }
}

/// The fallible pipeline behind `feed_with_recommendations`.
pub async fn run<R>(store: &R, user_id: &str) -> Result<FeedResponse>
where
    R: PostRepository + ?Sized,
{
    let records = store
        .fetch_liked_and_owned_posts(user_id)
        .await
        .context("Failed to fetch liked posts")?;
    debug!(user = user_id, records = records.len(), "Fetched engagement records");

    let profile = build_profile(&records, &[], ProfileWeights::feed(), ProfileLimits::feed());

    if profile.is_empty() {
        let recent = store
            .query_public_posts(&PostFilter::public_not_by(user_id), FEED_SIZE)
            .await
            .context("Failed to fetch recent posts")?;
        info!(
            user = user_id,
            count = recent.len(),
            "No engagement signals, returning recent posts"
        );
        return Ok(FeedResponse {
            suggested_posts: recent,
            top_tags: Vec::new(),
        });
    }

    info!(
        user = user_id,
        top_tags = ?profile.top_tags,
        top_categories = ?profile.top_categories,
        top_caption_words = ?profile.top_caption_words,
        "Built preference profile"
    );

    let mut merge = TierMerge::new();
    for tier in plan_tiers(&profile)? {
        let filter = PostFilter {
            exclude_ids: merge.picked_ids(),
            ..PostFilter::public_not_by(user_id)
        }
        .with_match(tier.matcher);

        let posts = store
            .query_public_posts(&filter, TIER_FETCH_LIMIT)
            .await
            .with_context(|| format!("Failed to fetch tier {} candidates", tier.weight))?;
        let added = merge.push_tier(tier.weight, posts);
        debug!(
            weight = tier.weight,
            added,
            picked = merge.picked_count(),
            "Merged recommendation tier"
        );
    }

    let mut suggested = merge.finish(FEED_SIZE);

    if suggested.len() < FEED_SIZE {
        let filter = PostFilter::public_not_by(user_id).excluding(suggested.iter().map(|p| &p.id));
        let backfill = store
            .query_public_posts(&filter, FEED_SIZE - suggested.len())
            .await
            .context("Failed to fetch backfill posts")?;
        debug!(count = backfill.len(), "Backfilled feed with recent posts");
        suggested.extend(backfill);
    }

    info!(user = user_id, count = suggested.len(), "Built recommended feed");

    Ok(FeedResponse {
        suggested_posts: suggested,
        top_tags: profile.top_tags,
    })
}
