use crate::{
    api::handlers::{valid_email, ErrorBody},
    backend::{credentials::LoginOutcome, BackendClient},
    session::{SessionStore, SessionView},
};
use axum::{extract::Extension, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Session artifact returned on a successful credential exchange.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionIssued {
    pub token: String,
    #[serde(flatten)]
    pub session: SessionView,
}

type LoginResponse = Result<Json<SessionIssued>, (StatusCode, Json<ErrorBody>)>;

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = SessionIssued, content_type = "application/json"),
        (status = 400, description = "Malformed credentials", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
    ),
    tag = "auth"
)]
// axum handler for login
#[instrument(skip(backend, sessions, payload))]
pub async fn login(
    backend: Extension<Arc<BackendClient>>,
    sessions: Extension<Arc<SessionStore>>,
    payload: Option<Json<LoginRequest>>,
) -> LoginResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return Err(bad_request("Missing payload")),
    };

    if request.password.is_empty() {
        return Err(bad_request("Missing password"));
    }

    if !valid_email(&request.email) {
        return Err(bad_request("Invalid email"));
    }

    debug!("login attempt for {}", request.email);

    let identity = match backend.login(&request.email, &request.password).await {
        LoginOutcome::Session(identity) => identity,
        other => {
            // Distinct failure causes deliberately collapse to one answer.
            debug!("No session issued: {other:?}");
            return Err(unauthorized());
        }
    };

    match sessions.issue(&identity) {
        Ok(issued) => Ok(Json(SessionIssued {
            token: issued.token,
            session: sessions.project(&issued.claims),
        })),
        Err(err) => {
            warn!("Refused to issue session: {err}");
            Err(unauthorized())
        }
    }
}

fn bad_request(message: &str) -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::BAD_REQUEST, Json(ErrorBody::new(message)))
}

fn unauthorized() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorBody::new("Invalid credentials")),
    )
}
