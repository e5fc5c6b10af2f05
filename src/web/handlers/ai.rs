// AI endpoints: suggested posts and outfit composition.
//
//   GET  /api/ai/suggestions  array of posts, always 200
//   POST /api/ai/outfit       outfit response, 500 if the pool can't be read

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::Utc;
use tracing::error;

use crate::pipeline;
use crate::web::identity::RequestUser;
use crate::web::{api_error, AppState};

pub async fn get_suggestions(
    State(state): State<AppState>,
    Extension(RequestUser(user)): Extension<RequestUser>,
) -> impl IntoResponse {
    let posts = pipeline::suggestions::suggestions(state.db.as_ref(), &user).await;
    Json(posts)
}

/// POST /api/ai/outfit — body `{"context": "..."}`.
///
/// A missing, malformed, or non-string context is treated as no context
/// rather than rejected.
pub async fn build_outfit(
    State(state): State<AppState>,
    Extension(RequestUser(user)): Extension<RequestUser>,
    body: Bytes,
) -> impl IntoResponse {
    let context = context_from_body(&body);

    match pipeline::outfit::build_outfit(state.db.as_ref(), context.as_deref(), &user, Utc::now())
        .await
    {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            error!(error = %e, user = %user, "Outfit composition failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to build outfit")
        }
    }
}

fn context_from_body(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get("context")?
        .as_str()
        .filter(|c| !c.is_empty())
        .map(String::from)
}
