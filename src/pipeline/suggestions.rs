// Suggested posts: unweighted tag profile (liked posts + wardrobe types),
// then public posts carrying one of the top tags or mentioning one in the
// caption. Failures degrade to an empty list.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::db::models::CandidatePost;
use crate::db::traits::{PostFilter, PostMatch, PostRepository, WardrobeRepository};
use crate::scoring::feed::{keyword_pattern, FEED_SIZE};
use crate::scoring::profile::{build_profile, ProfileLimits, ProfileWeights};

/// Suggested posts for `user_id`, or an empty list on failure.
pub async fn suggestions<R>(store: &R, user_id: &str) -> Vec<CandidatePost>
where
    R: PostRepository + WardrobeRepository + ?Sized,
{
    match run(store, user_id).await {
        Ok(posts) => posts,
        Err(e) => {
            warn!(error = %e, user = user_id, "Suggestions failed, returning none");
            Vec::new()
        }
    }
}

/// The fallible pipeline behind `suggestions`.
pub async fn run<R>(store: &R, user_id: &str) -> Result<Vec<CandidatePost>>
where
    R: PostRepository + WardrobeRepository + ?Sized,
{
    let (records, wardrobe) = tokio::try_join!(
        store.fetch_liked_and_owned_posts(user_id),
        store.fetch_wardrobe_signals(user_id),
    )
    .context("Failed to fetch engagement signals")?;

    let profile = build_profile(
        &records,
        &wardrobe,
        ProfileWeights::unweighted(),
        ProfileLimits::suggestions(),
    );

    // No signals: plain recency
    let filter = if profile.top_tags.is_empty() {
        PostFilter::public_not_by(user_id)
    } else {
        PostFilter::public_not_by(user_id).with_match(PostMatch::TagsOrCaption {
            caption: keyword_pattern(&profile.top_tags)?,
            tags: profile.top_tags.clone(),
        })
    };

    let posts = store
        .query_public_posts(&filter, FEED_SIZE)
        .await
        .context("Failed to query suggested posts")?;

    info!(
        user = user_id,
        top_tags = ?profile.top_tags,
        count = posts.len(),
        "Built post suggestions"
    );

    Ok(posts)
}
