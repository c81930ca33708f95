use crate::{
    api::handlers::session_bearer,
    backend::BackendClient,
    session::SessionStore,
};
use axum::{extract::Extension, http::HeaderMap, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SignedOut {
    pub message: String,
}

#[utoipa::path(
    delete,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Session discarded; backend token invalidation is best-effort", body = SignedOut, content_type = "application/json"),
    ),
    security(("session_token" = [])),
    tag = "auth"
)]
// axum handler for sign-out
#[instrument(skip(backend, sessions, headers))]
pub async fn logout(
    backend: Extension<Arc<BackendClient>>,
    sessions: Extension<Arc<SessionStore>>,
    headers: HeaderMap,
) -> Json<SignedOut> {
    // Sign-out always succeeds locally. The backend invalidation is
    // fire-and-forget; a session token that no longer verifies simply has
    // nothing left to invalidate.
    if let Some(token) = session_bearer(&headers) {
        match sessions.verify(token) {
            Ok(claims) => backend.logout(&claims.access_token).await,
            Err(err) => debug!("Discarding unverifiable session: {err}"),
        }
    }

    Json(SignedOut {
        message: "Signed out".to_string(),
    })
}
