//! Registration exchange: forward a locally validated signup to the identity
//! backend and normalize its response.

use super::BackendClient;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, instrument};

/// Generic failure message used when the backend supplies none.
pub const GENERIC_FAILURE: &str = "Registration failed";

/// Outcome of one signup exchange.
#[derive(Debug)]
pub enum SignupOutcome {
    /// Backend created the account; carries the backend-reported profile.
    Created(serde_json::Value),
    /// Backend rejected the signup; `message` is backend-supplied when
    /// available, generic otherwise.
    Rejected { message: String },
    /// Network or parse fault; never propagated as a raw error.
    Transport(String),
}

#[derive(Deserialize, Debug)]
struct SignupBody {
    #[serde(default)]
    status: Option<SignupStatus>,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

#[derive(Deserialize, Debug)]
struct SignupStatus {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

impl BackendClient {
    /// Forward a signup via `POST /signup`.
    ///
    /// Success requires an ok HTTP status AND body `status.code == 200` AND a
    /// present `data` field; any other combination is a rejection. The
    /// caller is responsible for local field validation before this call.
    #[instrument(skip(self, password))]
    pub async fn signup(&self, email: &str, username: &str, password: &str) -> SignupOutcome {
        let body = json!({
            "user": {
                "email": email,
                "username": username,
                "password": password,
                "first_name": "",
                "last_name": "",
            }
        });

        let response = match self
            .http()
            .post(self.endpoint("signup"))
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                error!("Signup request failed: {err}");
                return SignupOutcome::Transport(err.to_string());
            }
        };

        let http_status = response.status();

        let body: SignupBody = match response.json().await {
            Ok(body) => body,
            Err(err) => {
                error!("Failed to parse signup response: {err}");
                return SignupOutcome::Transport(err.to_string());
            }
        };

        let code = body.status.as_ref().and_then(|status| status.code);

        if http_status.is_success() && code == Some(200) {
            if let Some(data) = body.data {
                if !data.is_null() {
                    return SignupOutcome::Created(data);
                }
            }
        }

        // Log the original status; the caller only sees the message text.
        debug!("Backend refused signup: http={http_status} code={code:?}");

        let message = body
            .status
            .and_then(|status| status.message)
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());

        SignupOutcome::Rejected { message }
    }
}
