//! Credential exchange: login against the identity backend and best-effort
//! bearer-token invalidation on sign-out.

use super::BackendClient;
use reqwest::{
    header::{HeaderMap, AUTHORIZATION},
    StatusCode,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, instrument, warn};

/// Minimal identity extracted from a successful login exchange.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    pub access_token: String,
}

/// Outcome of one login exchange. Callers only distinguish session vs no
/// session; the tagged variants keep the failure causes testable.
#[derive(Debug)]
pub enum LoginOutcome {
    Session(Identity),
    MissingProfile,
    MissingToken,
    Rejected(StatusCode),
    Transport(String),
}

impl LoginOutcome {
    /// Collapse the outcome to the external contract: a session or nothing.
    #[must_use]
    pub fn into_identity(self) -> Option<Identity> {
        match self {
            Self::Session(identity) => Some(identity),
            _ => None,
        }
    }
}

#[derive(Deserialize, Debug)]
struct LoginBody {
    #[serde(default)]
    status: Option<LoginStatus>,
}

#[derive(Deserialize, Debug)]
struct LoginStatus {
    #[serde(default)]
    data: Option<LoginData>,
}

#[derive(Deserialize, Debug)]
struct LoginData {
    #[serde(default)]
    user: Option<Profile>,
}

/// User profile as the backend reports it. The backend assigns ids; numeric
/// and string ids are both accepted and normalized to strings.
#[derive(Deserialize, Debug)]
struct Profile {
    #[serde(default)]
    id: Option<ProfileId>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum ProfileId {
    Number(i64),
    Text(String),
}

impl ProfileId {
    fn into_string(self) -> String {
        match self {
            Self::Number(id) => id.to_string(),
            Self::Text(id) => id,
        }
    }
}

impl BackendClient {
    /// Exchange credentials for an identity via `POST /login`.
    ///
    /// A session-worthy identity requires BOTH a user profile in the body
    /// (`status.data.user` with an id) and a bearer token in the
    /// `Authorization` response header. Partial success is total failure.
    /// Transport and parse faults are caught and mapped, never propagated.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> LoginOutcome {
        let body = json!({"user": {"email": email, "password": password}});

        let response = match self
            .http()
            .post(self.endpoint("login"))
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                error!("Login request failed: {err}");
                return LoginOutcome::Transport(err.to_string());
            }
        };

        let status = response.status();

        if !status.is_success() {
            debug!("Backend rejected login: {status}");
            return LoginOutcome::Rejected(status);
        }

        // The body consumes the response; take the header first.
        let token = bearer_token(response.headers());

        let body: LoginBody = match response.json().await {
            Ok(body) => body,
            Err(err) => {
                error!("Failed to parse login response: {err}");
                return LoginOutcome::Transport(err.to_string());
            }
        };

        let profile = body
            .status
            .and_then(|status| status.data)
            .and_then(|data| data.user);

        let Some(profile) = profile else {
            warn!("Login response ok but user profile missing");
            return LoginOutcome::MissingProfile;
        };

        let Some(id) = profile.id else {
            warn!("Login response ok but user profile has no id");
            return LoginOutcome::MissingProfile;
        };

        let Some(token) = token else {
            warn!("Login response ok but Authorization header missing or malformed");
            return LoginOutcome::MissingToken;
        };

        let display_name = profile
            .username
            .or(profile.first_name)
            .or_else(|| profile.email.clone());

        LoginOutcome::Session(Identity {
            id: id.into_string(),
            display_name,
            email: profile.email,
            photo_url: profile.photo_url,
            access_token: token,
        })
    }

    /// Best-effort bearer-token invalidation via `DELETE /logout`.
    ///
    /// Failures are logged and swallowed: sign-out must always succeed
    /// locally regardless of backend reachability.
    #[instrument(skip(self, access_token))]
    pub async fn logout(&self, access_token: &str) {
        let result = self
            .http()
            .delete(self.endpoint("logout"))
            .header(AUTHORIZATION, format!("Bearer {access_token}"))
            .send()
            .await;

        match result {
            Ok(response) if !response.status().is_success() => {
                warn!("Backend logout returned {}", response.status());
            }
            Ok(_) => debug!("Backend token invalidated"),
            Err(err) => {
                warn!("Backend logout failed: {err}");
            }
        }
    }
}

/// Strict `Bearer <token>` parse of the login response header. A malformed
/// header (wrong scheme, missing token, embedded whitespace) yields `None`
/// rather than a silently empty token.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;

    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }

    Some(token.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use url::Url;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> BackendClient {
        let base = Url::parse(&server.uri()).unwrap();
        BackendClient::new(&base).unwrap()
    }

    fn login_body() -> serde_json::Value {
        serde_json::json!({
            "status": {
                "data": {
                    "user": {"id": 7, "email": "a@b.com", "username": "bob"}
                }
            }
        })
    }

    #[test]
    fn bearer_token_requires_scheme_and_single_token() {
        let mut headers = HeaderMap::new();

        headers.insert(AUTHORIZATION, "Bearer abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc123".to_string()));

        headers.insert(AUTHORIZATION, "Bearer".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, "Bearer ".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, "Token abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, "Bearer abc 123".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.remove(AUTHORIZATION);
        assert_eq!(bearer_token(&headers), None);
    }

    #[tokio::test]
    async fn login_returns_identity_when_profile_and_token_present() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_json(serde_json::json!({
                "user": {"email": "a@b.com", "password": "secret1"}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Authorization", "Bearer abc123")
                    .set_body_json(login_body()),
            )
            .mount(&server)
            .await;

        let outcome = client_for(&server).login("a@b.com", "secret1").await;

        let identity = outcome.into_identity().unwrap();
        assert_eq!(identity.id, "7");
        assert_eq!(identity.display_name.as_deref(), Some("bob"));
        assert_eq!(identity.email.as_deref(), Some("a@b.com"));
        assert_eq!(identity.access_token, "abc123");
    }

    #[tokio::test]
    async fn login_falls_back_to_first_name_then_email_for_display_name() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Authorization", "Bearer abc123")
                    .set_body_json(serde_json::json!({
                        "status": {"data": {"user": {
                            "id": "u-9", "email": "a@b.com", "first_name": "Alice"
                        }}}
                    })),
            )
            .mount(&server)
            .await;

        let outcome = client_for(&server).login("a@b.com", "secret1").await;

        let identity = outcome.into_identity().unwrap();
        assert_eq!(identity.id, "u-9");
        assert_eq!(identity.display_name.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn login_without_token_header_is_missing_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_body()))
            .mount(&server)
            .await;

        let outcome = client_for(&server).login("a@b.com", "secret1").await;

        assert!(matches!(outcome, LoginOutcome::MissingToken));
    }

    #[tokio::test]
    async fn login_with_malformed_token_header_is_missing_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Authorization", "Token abc123")
                    .set_body_json(login_body()),
            )
            .mount(&server)
            .await;

        let outcome = client_for(&server).login("a@b.com", "secret1").await;

        assert!(matches!(outcome, LoginOutcome::MissingToken));
    }

    #[tokio::test]
    async fn login_without_profile_is_missing_profile() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Authorization", "Bearer abc123")
                    .set_body_json(serde_json::json!({"status": {"data": {}}})),
            )
            .mount(&server)
            .await;

        let outcome = client_for(&server).login("a@b.com", "secret1").await;

        assert!(matches!(outcome, LoginOutcome::MissingProfile));
    }

    #[tokio::test]
    async fn login_with_profile_lacking_id_is_missing_profile() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Authorization", "Bearer abc123")
                    .set_body_json(serde_json::json!({
                        "status": {"data": {"user": {"email": "a@b.com"}}}
                    })),
            )
            .mount(&server)
            .await;

        let outcome = client_for(&server).login("a@b.com", "secret1").await;

        assert!(matches!(outcome, LoginOutcome::MissingProfile));
    }

    #[tokio::test]
    async fn login_rejected_on_non_success_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let outcome = client_for(&server).login("a@b.com", "wrong").await;

        assert!(matches!(
            outcome,
            LoginOutcome::Rejected(StatusCode::UNAUTHORIZED)
        ));
    }

    #[tokio::test]
    async fn login_maps_unparseable_body_to_transport_fault() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Authorization", "Bearer abc123")
                    .set_body_string("not json"),
            )
            .mount(&server)
            .await;

        let outcome = client_for(&server).login("a@b.com", "secret1").await;

        assert!(matches!(outcome, LoginOutcome::Transport(_)));
    }

    #[tokio::test]
    async fn login_maps_connection_failure_to_transport_fault() {
        // A pooled `MockServer::start()` keeps listening after drop; an
        // unpooled server is required so dropping it actually closes the port.
        let server = MockServer::builder().start().await;
        let client = client_for(&server);
        drop(server);

        let outcome = client.login("a@b.com", "secret1").await;

        assert!(matches!(outcome, LoginOutcome::Transport(_)));
    }

    #[tokio::test]
    async fn logout_sends_bearer_header_and_swallows_failures() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/logout"))
            .and(wiremock::matchers::header("Authorization", "Bearer abc123"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        // Must not panic or surface the 500.
        client_for(&server).logout("abc123").await;
    }

    #[tokio::test]
    async fn logout_survives_unreachable_backend() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        drop(server);

        client.logout("abc123").await;
    }
}
