//! Integration tests for the Chouxlab storefront.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the Firebase emulators (Auth on 9099, Firestore on 8080)
//! firebase emulators:start --only auth,firestore --project demo-chouxlab
//!
//! # Run the emulator-backed tests
//! cargo test -p chouxlab-integration-tests -- --ignored
//! ```
//!
//! The emulator hosts default to localhost and can be overridden with
//! `FIREBASE_AUTH_EMULATOR_HOST` and `FIRESTORE_EMULATOR_HOST`.
//!
//! Every test creates its own identities (anonymous sign-ups, unique
//! emails), so tests are independent and can run against a shared emulator.

use secrecy::SecretString;
use uuid::Uuid;

use chouxlab_store::{Store, StoreConfig};

/// Configuration pointing at the local emulators.
#[must_use]
pub fn emulator_config() -> StoreConfig {
    StoreConfig {
        project_id: std::env::var("FIREBASE_PROJECT_ID")
            .unwrap_or_else(|_| "demo-chouxlab".to_string()),
        api_key: SecretString::from("emulator-api-key"),
        auth_emulator_host: Some(
            std::env::var("FIREBASE_AUTH_EMULATOR_HOST")
                .unwrap_or_else(|_| "127.0.0.1:9099".to_string()),
        ),
        firestore_emulator_host: Some(
            std::env::var("FIRESTORE_EMULATOR_HOST")
                .unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
        ),
        session_file: None,
    }
}

/// A store with an in-memory session against the emulators.
#[must_use]
pub fn emulator_store() -> Store {
    Store::new(emulator_config())
}

/// An email address no other test run has used.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", Uuid::new_v4().simple())
}
