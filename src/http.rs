//! Shared HTTP client construction for adapters and page fetches.

use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::Client;

use crate::{Result, SearchError};

/// Realistic browser User-Agent strings, one picked per client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Picks a random User-Agent from the rotation list.
pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Builds a client with a timeout, gzip/brotli decoding and a browser
/// User-Agent (`user_agent`, or a random one when `None`).
pub fn build_client(timeout: Duration, user_agent: Option<&str>) -> Result<Client> {
    let ua = user_agent.unwrap_or_else(|| random_user_agent());
    Client::builder()
        .user_agent(ua)
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| SearchError::Other(format!("Failed to create HTTP client: {}", e)))
}

/// Like [`build_client`], falling back to reqwest's default client when the
/// configured one cannot be built.
pub fn client_or_default(timeout: Duration) -> Client {
    build_client(timeout, None).unwrap_or_else(|e| {
        tracing::warn!("{}; using default client", e);
        Client::new()
    })
}
