//! Common test utilities and helpers

#![allow(dead_code)]

pub mod mock_transport;

use std::path::Path;
use std::sync::Arc;

use buckybox::clock::ManualClock;
use buckybox::{Client, Environment};
use mock_transport::MockTransport;

/// Load a response fixture
pub fn load_response_fixture(name: &str) -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let path = Path::new(manifest_dir)
        .join("tests")
        .join("fixtures")
        .join("responses")
        .join(format!("{}.json", name));

    std::fs::read_to_string(&path).unwrap_or_else(|e| {
        panic!(
            "Failed to load response fixture '{}' from {:?}: {}",
            name, path, e
        )
    })
}

/// Create a test API key
pub fn test_api_key() -> String {
    "bb-test-key-0123456789".to_string()
}

/// Create a test API secret
pub fn test_api_secret() -> String {
    "bb-test-secret-9876543210".to_string()
}

/// Client talking to a wiremock server at `uri`.
pub fn client_for(uri: &str) -> Client {
    Client::builder()
        .environment(Environment::Test)
        .api_key(test_api_key())
        .api_secret(test_api_secret())
        .base_url(format!("{uri}/v1"))
        .build()
        .expect("Failed to build client")
}

/// Client backed by `transport`, with cache time driven by the returned clock.
pub fn mock_client(transport: &MockTransport) -> (Client, ManualClock) {
    let clock = ManualClock::new(1_700_000_000);
    let client = Client::builder()
        .environment(Environment::Test)
        .api_key(test_api_key())
        .api_secret(test_api_secret())
        .transport(Arc::new(transport.clone()))
        .clock(Arc::new(clock.clone()))
        .build()
        .expect("Failed to build client");
    (client, clock)
}
