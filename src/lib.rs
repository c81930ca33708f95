//! # Pordisto (Authentication front-door proxy)
//!
//! `pordisto` sits between a browser-facing frontend and an external identity
//! backend. It renders no UI of its own: it validates signup/login payloads,
//! delegates credential verification to the backend over HTTP, and mints a
//! signed, stateless session token (PASETO v4.local) that binds a minimal
//! user identity to the backend-issued bearer token.
//!
//! ## Contract
//!
//! - **Registration**: forwarded to `POST {BACKEND_URL}/signup`; success
//!   requires an ok response with `status.code == 200` and a `data` field.
//! - **Login**: forwarded to `POST {BACKEND_URL}/login`; a session is issued
//!   only when the response carries both a user profile (`status.data.user`)
//!   and a bearer token in the `Authorization` header. Partial success is
//!   treated as total failure.
//! - **Sign-out**: best-effort `DELETE {BACKEND_URL}/logout`; the local
//!   session is always discarded even if the backend is unreachable.
//!
//! The backend owns the user store. This service persists nothing; the signed
//! session token is the sole source of truth and is verified on every use.

pub mod api;
pub mod backend;
pub mod cli;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
