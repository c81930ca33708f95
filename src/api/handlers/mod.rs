pub mod health;
pub use self::health::health;

pub mod register;
pub use self::register::register;

pub mod login;
pub use self::login::login;

pub mod session;
pub use self::session::session;

pub mod logout;
pub use self::logout::logout;

// common functions and shapes for the handlers
use axum::http::{header::AUTHORIZATION, HeaderMap};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Uniform error body for caller-facing failures.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub(crate) fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

/// Strict `Bearer <token>` parse of the caller-supplied Authorization header.
pub(crate) fn session_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;

    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }

    Some(token)
}
