use secrecy::SecretString;
use url::Url;

/// Process-wide configuration, immutable and read-only at request time.
#[derive(Clone)]
pub struct GlobalArgs {
    pub backend_url: Url,
    pub session_secret: SecretString,
    pub session_ttl_seconds: u64,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(backend_url: Url, session_secret: SecretString, session_ttl_seconds: u64) -> Self {
        Self {
            backend_url,
            session_secret,
            session_ttl_seconds,
        }
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("backend_url", &self.backend_url.as_str())
            .field("session_secret", &"***")
            .field("session_ttl_seconds", &self.session_ttl_seconds)
            .finish()
    }
}
