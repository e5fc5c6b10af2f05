// GET /api/posts/feed-ai — recommended feed for the requester.
//
// Always 200: the pipeline degrades to an empty feed on repository failure.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Extension, Json};

use crate::pipeline::feed::feed_with_recommendations;
use crate::web::identity::RequestUser;
use crate::web::AppState;

pub async fn get_feed(
    State(state): State<AppState>,
    Extension(RequestUser(user)): Extension<RequestUser>,
) -> impl IntoResponse {
    let feed = feed_with_recommendations(state.db.as_ref(), &user).await;
    Json(feed)
}
