use axum::{Extension, Json, http::StatusCode, response::IntoResponse};

use crate::context::CurrentSession;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Who the request is authenticated as, if anyone.
pub async fn session(Extension(current): Extension<CurrentSession>) -> impl IntoResponse {
    match current.session() {
        Some(s) => Json(serde_json::json!({
            "authenticated": true,
            "user_id": s.user_id.to_string(),
            "username": s.username,
            "role": s.role.as_str(),
        })),
        None => Json(serde_json::json!({ "authenticated": false })),
    }
}
