use reqwest::Client;
use std::time::{SystemTime, UNIX_EPOCH};

/// Server under test. Override with CHESSSTATS_TEST_URL when the server
/// runs elsewhere.
pub fn base_url() -> String {
    std::env::var("CHESSSTATS_TEST_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// Build a reqwest client for tests.
pub fn client() -> Client {
    Client::new()
}

/// Generate a unique suffix based on timestamp to avoid collisions.
pub fn unique_suffix() -> String {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}", ts % 1_000_000_000)
}

/// Build a URL for an API endpoint.
pub fn url(path: &str) -> String {
    format!("{}{}", base_url(), path)
}
