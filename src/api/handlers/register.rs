use crate::{
    api::handlers::{valid_email, ErrorBody},
    backend::{registration::SignupOutcome, BackendClient},
};
use axum::{extract::Extension, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

const MIN_USERNAME_CHARS: usize = 2;
const MIN_PASSWORD_CHARS: usize = 6;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegistrationRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirmation_password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisteredBody {
    pub message: String,
    pub user: serde_json::Value,
}

type RegisterResponse =
    Result<(StatusCode, Json<RegisteredBody>), (StatusCode, Json<ErrorBody>)>;

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegistrationRequest,
    responses(
        (status = 201, description = "Registration successful", body = RegisteredBody, content_type = "application/json"),
        (status = 400, description = "Validation failed or backend rejected the signup", body = ErrorBody),
        (status = 500, description = "Identity backend unreachable", body = ErrorBody),
    ),
    tag = "auth"
)]
// axum handler for register
#[instrument(skip(backend, payload))]
pub async fn register(
    backend: Extension<Arc<BackendClient>>,
    payload: Option<Json<RegistrationRequest>>,
) -> RegisterResponse {
    let request: RegistrationRequest = match payload {
        Some(Json(payload)) => payload,
        None => return Err(validation_error("Missing payload")),
    };

    debug!("registration attempt for {}", request.email);

    // Local validation happens before any backend call.
    if let Err(message) = validate(&request) {
        return Err(validation_error(message));
    }

    match backend
        .signup(&request.email, &request.username, &request.password)
        .await
    {
        SignupOutcome::Created(user) => Ok((
            StatusCode::CREATED,
            Json(RegisteredBody {
                message: "User registered successfully".to_string(),
                user,
            }),
        )),
        SignupOutcome::Rejected { message } => {
            Err((StatusCode::BAD_REQUEST, Json(ErrorBody::new(message))))
        }
        SignupOutcome::Transport(err) => {
            error!("Registration exchange failed: {err}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Registration failed")),
            ))
        }
    }
}

fn validate(request: &RegistrationRequest) -> Result<(), &'static str> {
    if !valid_email(&request.email) {
        return Err("Invalid email");
    }

    if request.username.chars().count() < MIN_USERNAME_CHARS {
        return Err("Username must be at least 2 characters");
    }

    if request.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err("Password must be at least 6 characters");
    }

    if request.password != request.confirmation_password {
        return Err("Passwords do not match");
    }

    Ok(())
}

fn validation_error(message: &str) -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::BAD_REQUEST, Json(ErrorBody::new(message)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(password: &str, confirmation: &str) -> RegistrationRequest {
        RegistrationRequest {
            email: "a@b.com".to_string(),
            username: "bob".to_string(),
            password: password.to_string(),
            confirmation_password: confirmation.to_string(),
        }
    }

    #[test]
    fn validate_accepts_well_formed_request() {
        assert!(validate(&request("secret1", "secret1")).is_ok());
    }

    #[test]
    fn validate_rejects_password_mismatch() {
        assert_eq!(
            validate(&request("secret1", "secret2")),
            Err("Passwords do not match")
        );
    }

    #[test]
    fn validate_rejects_short_fields() {
        let mut short_username = request("secret1", "secret1");
        short_username.username = "b".to_string();
        assert_eq!(
            validate(&short_username),
            Err("Username must be at least 2 characters")
        );

        assert_eq!(
            validate(&request("abc", "abc")),
            Err("Password must be at least 6 characters")
        );
    }

    #[test]
    fn validate_rejects_bad_email() {
        let mut bad_email = request("secret1", "secret1");
        bad_email.email = "not-an-email".to_string();
        assert_eq!(validate(&bad_email), Err("Invalid email"));
    }

    #[tokio::test]
    async fn password_mismatch_makes_no_backend_call() {
        let server = MockServer::start().await;

        // Zero expected requests: the exchange must never be invoked.
        Mock::given(method("POST"))
            .and(path("/signup"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let base = Url::parse(&server.uri()).unwrap();
        let backend = Arc::new(BackendClient::new(&base).unwrap());

        let result = register(
            Extension(backend),
            Some(Json(request("secret1", "secret2"))),
        )
        .await;

        let (status, body) = result.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Passwords do not match");
    }

    #[tokio::test]
    async fn successful_registration_wraps_backend_profile() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/signup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": {"code": 200, "message": "ok"},
                "data": {"id": 7, "email": "a@b.com"}
            })))
            .mount(&server)
            .await;

        let base = Url::parse(&server.uri()).unwrap();
        let backend = Arc::new(BackendClient::new(&base).unwrap());

        let result = register(
            Extension(backend),
            Some(Json(request("secret1", "secret1"))),
        )
        .await;

        let (status, body) = result.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.message, "User registered successfully");
        assert_eq!(body.user["id"], 7);
    }

    #[tokio::test]
    async fn missing_payload_is_bad_request() {
        let server = MockServer::start().await;
        let base = Url::parse(&server.uri()).unwrap();
        let backend = Arc::new(BackendClient::new(&base).unwrap());

        let result = register(Extension(backend), None).await;

        let (status, body) = result.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Missing payload");
    }
}
