//! Stateless session store backed by PASETO v4.local tokens.
//!
//! There is no server-side session table: the encrypted token is the sole
//! source of truth and is verified on every use. Invalidation relies on the
//! backend's bearer-token invalidation plus the token's own expiry.

use crate::backend::credentials::Identity;
use base64ct::{Base64, Encoding};
use pasetors::claims::{Claims, ClaimsValidationRules};
use pasetors::keys::SymmetricKey;
use pasetors::token::UntrustedToken;
use pasetors::version4::V4;
use pasetors::{local, Local};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use utoipa::ToSchema;

/// Required length of the decoded session secret.
pub const KEY_LENGTH: usize = 32;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session secret is not valid base64")]
    SecretEncoding,
    #[error("session secret must decode to {KEY_LENGTH} bytes, got {0}")]
    SecretLength(usize),
    #[error("session key rejected")]
    Key,
    #[error("refusing to issue a session without an access token")]
    MissingAccessToken,
    #[error("refusing to issue a session without a user id")]
    MissingUserId,
    #[error("failed to encode session claims")]
    Encode,
    #[error("invalid session")]
    InvalidSession,
}

/// Decoded claims of a verified session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    pub access_token: String,
    pub expires: String,
}

/// Externally visible session shape. The bearer token is exposed only to the
/// authenticated caller's own session view.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct SessionView {
    pub user: SessionUser,
    pub expires: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct SessionUser {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// A freshly minted session: the opaque token plus its decoded claims.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub claims: SessionClaims,
}

/// Signing/verification facility over a shared 32-byte secret.
pub struct SessionStore {
    key: SymmetricKey<V4>,
    ttl: Duration,
}

impl SessionStore {
    /// Build the store from a base64-encoded secret.
    ///
    /// # Errors
    /// Returns an error if the secret is not base64 or does not decode to
    /// exactly [`KEY_LENGTH`] bytes.
    pub fn new(secret: &SecretString, ttl: Duration) -> Result<Self, SessionError> {
        let raw = Base64::decode_vec(secret.expose_secret())
            .map_err(|_| SessionError::SecretEncoding)?;

        if raw.len() != KEY_LENGTH {
            return Err(SessionError::SecretLength(raw.len()));
        }

        let key = SymmetricKey::<V4>::from(&raw).map_err(|_| SessionError::Key)?;

        Ok(Self { key, ttl })
    }

    /// Mint a session token for a verified identity.
    ///
    /// # Errors
    /// Refuses to issue when the identity carries no bearer token or no user
    /// id, or when claim encoding fails.
    pub fn issue(&self, identity: &Identity) -> Result<IssuedSession, SessionError> {
        if identity.access_token.is_empty() {
            return Err(SessionError::MissingAccessToken);
        }

        if identity.id.is_empty() {
            return Err(SessionError::MissingUserId);
        }

        let mut claims = Claims::new_expires_in(&self.ttl).map_err(|_| SessionError::Encode)?;

        claims
            .add_additional("uid", identity.id.clone())
            .map_err(|_| SessionError::Encode)?;
        claims
            .add_additional("access_token", identity.access_token.clone())
            .map_err(|_| SessionError::Encode)?;

        if let Some(name) = &identity.display_name {
            claims
                .add_additional("name", name.clone())
                .map_err(|_| SessionError::Encode)?;
        }

        if let Some(email) = &identity.email {
            claims
                .add_additional("email", email.clone())
                .map_err(|_| SessionError::Encode)?;
        }

        if let Some(photo_url) = &identity.photo_url {
            claims
                .add_additional("picture", photo_url.clone())
                .map_err(|_| SessionError::Encode)?;
        }

        let expires = string_claim(&claims, "exp").ok_or(SessionError::Encode)?;

        let token =
            local::encrypt(&self.key, &claims, None, None).map_err(|_| SessionError::Encode)?;

        Ok(IssuedSession {
            token,
            claims: SessionClaims {
                user_id: identity.id.clone(),
                display_name: identity.display_name.clone(),
                email: identity.email.clone(),
                photo_url: identity.photo_url.clone(),
                access_token: identity.access_token.clone(),
                expires,
            },
        })
    }

    /// Verify an opaque token and return its decoded claims.
    ///
    /// All failure causes (malformed token, wrong key, expiry, missing
    /// required claims) collapse to [`SessionError::InvalidSession`].
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidSession`] when the token cannot be
    /// trusted.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let untrusted = UntrustedToken::<Local, V4>::try_from(token).map_err(|err| {
            debug!("Malformed session token: {err}");
            SessionError::InvalidSession
        })?;

        let rules = ClaimsValidationRules::new();

        let trusted = local::decrypt(&self.key, &untrusted, &rules, None, None).map_err(|err| {
            debug!("Session token rejected: {err}");
            SessionError::InvalidSession
        })?;

        let claims = trusted
            .payload_claims()
            .ok_or(SessionError::InvalidSession)?;

        let user_id = string_claim(claims, "uid")
            .filter(|uid| !uid.is_empty())
            .ok_or(SessionError::InvalidSession)?;
        let access_token = string_claim(claims, "access_token")
            .filter(|token| !token.is_empty())
            .ok_or(SessionError::InvalidSession)?;
        let expires = string_claim(claims, "exp").ok_or(SessionError::InvalidSession)?;

        Ok(SessionClaims {
            user_id,
            display_name: string_claim(claims, "name"),
            email: string_claim(claims, "email"),
            photo_url: string_claim(claims, "picture"),
            access_token,
            expires,
        })
    }

    /// Map internal claims to the externally visible session shape.
    #[must_use]
    pub fn project(&self, claims: &SessionClaims) -> SessionView {
        SessionView {
            user: SessionUser {
                id: claims.user_id.clone(),
                name: claims.display_name.clone(),
                email: claims.email.clone(),
                image: claims.photo_url.clone(),
                access_token: if claims.access_token.is_empty() {
                    None
                } else {
                    Some(claims.access_token.clone())
                },
            },
            expires: claims.expires.clone(),
        }
    }
}

fn string_claim(claims: &Claims, name: &str) -> Option<String> {
    claims
        .get_claim(name)
        .and_then(|value| value.as_str())
        .map(str::to_string)
}
