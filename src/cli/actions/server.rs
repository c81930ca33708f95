use crate::api;
use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::Result;
use tracing::debug;

/// Handle the server action
///
/// # Errors
/// Returns an error if the configuration is invalid or the server fails to
/// start.
pub async fn handle(action: Action) -> Result<()> {
    let Action::Server {
        port,
        backend_url,
        session_secret,
        session_ttl_seconds,
    } = action;

    let globals = GlobalArgs::new(backend_url, session_secret, session_ttl_seconds);

    debug!("starting with {globals:?}");

    api::new(port, &globals).await
}
