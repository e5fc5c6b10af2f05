// Requester identity middleware.
//
// The gateway in front of this service authenticates the caller and forwards
// their user id in the `x-user-id` header. Requests without it are rejected
// with 401; otherwise a `RequestUser` is inserted into the request
// extensions for handlers to extract.

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;

/// Header carrying the authenticated user id (lower-case, as axum stores it).
pub const USER_HEADER: &str = "x-user-id";

/// The user a request is made on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUser(pub String);

/// Axum middleware: reject requests without a user id with 401.
pub async fn require_user(mut request: Request, next: Next) -> Response {
    let Some(user) = user_from_request(&request) else {
        return super::api_error(StatusCode::UNAUTHORIZED, "Missing user identity");
    };

    request.extensions_mut().insert(RequestUser(user));
    next.run(request).await
}

fn user_from_request(request: &Request) -> Option<String> {
    let value = request.headers().get(USER_HEADER)?.to_str().ok()?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
