//! Shared HTTP client for registry requests.
//!
//! One client is built per server and shared by every registry client, so
//! connections and TLS sessions are reused across completion requests.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

/// Identifies this tool to the registry (crates.io rejects anonymous clients)
pub const USER_AGENT: &str = concat!(
    "crate-features-lsp/",
    env!("CARGO_PKG_VERSION"),
    " (Cargo.toml feature completion)"
);

/// Upper bound for a whole registry request, including the body
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

pub fn create_shared_client(timeout: Duration) -> anyhow::Result<Arc<Client>> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(4)
        .build()?;

    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registries::crates_io::CratesIoRegistry;

    #[test]
    fn test_create_shared_client() {
        let client = create_shared_client(DEFAULT_TIMEOUT).expect("Failed to create client");
        assert!(Arc::strong_count(&client) == 1);
    }

    #[test]
    fn test_user_agent_names_the_tool() {
        assert!(USER_AGENT.starts_with("crate-features-lsp/"));
    }

    #[test]
    fn test_registry_shares_client_instance() {
        let shared_client = create_shared_client(DEFAULT_TIMEOUT).expect("Failed to create client");
        let client_ptr = Arc::as_ptr(&shared_client);

        let crates_io = CratesIoRegistry::with_client(Arc::clone(&shared_client));
        assert_eq!(Arc::as_ptr(&crates_io.http_client()), client_ptr);
        assert_eq!(Arc::strong_count(&shared_client), 2);
    }
}
