//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to an [`Action`], parsing and validating the
//! backend URL at startup so a misconfigured proxy never starts serving.

use crate::cli::actions::Action;
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use url::Url;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or the backend URL is
/// not a valid http(s) URL.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    let backend_url = matches
        .get_one::<String>("backend-url")
        .context("missing required argument: --backend-url")?;

    let backend_url = Url::parse(backend_url)
        .with_context(|| format!("invalid backend URL: {backend_url}"))?;

    if !matches!(backend_url.scheme(), "http" | "https") {
        return Err(anyhow!(
            "backend URL must be http(s), got: {}",
            backend_url.scheme()
        ));
    }

    let session_secret = matches
        .get_one::<String>("session-secret")
        .map(|secret| SecretString::from(secret.clone()))
        .context("missing required argument: --session-secret")?;

    let session_ttl_seconds = matches
        .get_one::<u64>("session-ttl")
        .copied()
        .unwrap_or(crate::cli::commands::DEFAULT_SESSION_TTL_SECONDS);

    Ok(Action::Server {
        port,
        backend_url,
        session_secret,
        session_ttl_seconds,
    })
}
