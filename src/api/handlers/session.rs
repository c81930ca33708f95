use crate::{
    api::handlers::{session_bearer, ErrorBody},
    session::{SessionStore, SessionView},
};
use axum::{extract::Extension, http::HeaderMap, http::StatusCode, response::Json};
use std::sync::Arc;
use tracing::{debug, instrument};

type SessionResponse = Result<Json<SessionView>, (StatusCode, Json<ErrorBody>)>;

#[utoipa::path(
    get,
    path = "/auth/session",
    responses(
        (status = 200, description = "Current session view", body = SessionView, content_type = "application/json"),
        (status = 401, description = "Missing, invalid or expired session token", body = ErrorBody),
    ),
    security(("session_token" = [])),
    tag = "auth"
)]
// axum handler for session introspection
#[instrument(skip(sessions, headers))]
pub async fn session(
    sessions: Extension<Arc<SessionStore>>,
    headers: HeaderMap,
) -> SessionResponse {
    let Some(token) = session_bearer(&headers) else {
        return Err(invalid_session());
    };

    match sessions.verify(token) {
        Ok(claims) => Ok(Json(sessions.project(&claims))),
        Err(err) => {
            debug!("Session verification failed: {err}");
            Err(invalid_session())
        }
    }
}

fn invalid_session() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorBody::new("Invalid session")),
    )
}
