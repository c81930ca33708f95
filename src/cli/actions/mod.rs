pub mod server;

use secrecy::SecretString;
use url::Url;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        backend_url: Url,
        session_secret: SecretString,
        session_ttl_seconds: u64,
    },
}
