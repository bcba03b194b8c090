//! Store configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FIREBASE_PROJECT_ID` - Firebase project identifier
//! - `FIREBASE_API_KEY` - Web API key for the Firebase project
//!
//! ## Optional
//! - `FIREBASE_AUTH_EMULATOR_HOST` - Auth emulator host:port; switches the
//!   identity client to the emulator and relaxes API-key validation
//! - `FIRESTORE_EMULATOR_HOST` - Firestore emulator host:port
//! - `CHOUXLAB_SESSION_FILE` - Path for file-backed session persistence

use std::collections::HashMap;
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

const MIN_API_KEY_LENGTH: usize = 30;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Store configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct StoreConfig {
    /// Firebase project identifier
    pub project_id: String,
    /// Web API key for the Firebase project
    pub api_key: SecretString,
    /// Auth emulator host:port, when set
    pub auth_emulator_host: Option<String>,
    /// Firestore emulator host:port, when set
    pub firestore_emulator_host: Option<String>,
    /// Path for file-backed session persistence, when set
    pub session_file: Option<PathBuf>,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("project_id", &self.project_id)
            .field("api_key", &"[REDACTED]")
            .field("auth_emulator_host", &self.auth_emulator_host)
            .field("firestore_emulator_host", &self.firestore_emulator_host)
            .field("session_file", &self.session_file)
            .finish()
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or if the API
    /// key fails validation (placeholder detection, entropy check). API-key
    /// validation is skipped when the auth emulator is configured, since the
    /// emulator accepts any key.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let project_id = get_required_env("FIREBASE_PROJECT_ID")?;
        let auth_emulator_host = get_optional_env("FIREBASE_AUTH_EMULATOR_HOST");
        let firestore_emulator_host = get_optional_env("FIRESTORE_EMULATOR_HOST");

        let api_key = if auth_emulator_host.is_some() {
            SecretString::from(get_env_or_default("FIREBASE_API_KEY", "emulator-api-key"))
        } else {
            get_validated_api_key("FIREBASE_API_KEY")?
        };

        let session_file = get_optional_env("CHOUXLAB_SESSION_FILE").map(PathBuf::from);

        Ok(Self {
            project_id,
            api_key,
            auth_emulator_host,
            firestore_emulator_host,
            session_file,
        })
    }

    /// Base URL for the Identity Toolkit API (account operations).
    #[must_use]
    pub fn identity_base_url(&self) -> String {
        self.auth_emulator_host.as_ref().map_or_else(
            || "https://identitytoolkit.googleapis.com/v1".to_string(),
            |host| format!("http://{host}/identitytoolkit.googleapis.com/v1"),
        )
    }

    /// Base URL for the Secure Token API (token refresh).
    #[must_use]
    pub fn secure_token_base_url(&self) -> String {
        self.auth_emulator_host.as_ref().map_or_else(
            || "https://securetoken.googleapis.com/v1".to_string(),
            |host| format!("http://{host}/securetoken.googleapis.com/v1"),
        )
    }

    /// Base URL for the Firestore REST API.
    #[must_use]
    pub fn firestore_base_url(&self) -> String {
        self.firestore_emulator_host.as_ref().map_or_else(
            || "https://firestore.googleapis.com/v1".to_string(),
            |host| format!("http://{host}/v1"),
        )
    }

    /// Resource prefix for documents in the default database.
    #[must_use]
    pub fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/(default)/documents",
            self.project_id
        )
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that an API key is not a placeholder and has sufficient entropy.
fn validate_api_key(key: &str, var_name: &str) -> Result<(), ConfigError> {
    if key.len() < MIN_API_KEY_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_API_KEY_LENGTH,
                key.len()
            ),
        ));
    }

    let lower = key.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Real Firebase web API keys have high entropy
    let entropy = shannon_entropy(key);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

/// Load and validate the API key from environment.
fn get_validated_api_key(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_api_key(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> StoreConfig {
        StoreConfig {
            project_id: "chouxlab-ops".to_string(),
            api_key: SecretString::from("AIzaSyBt4C0X3oO9XvweyNqQtvR3QcmSZ7cAb1"),
            auth_emulator_host: None,
            firestore_emulator_host: None,
            session_file: None,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_high() {
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.0);
    }

    #[test]
    fn test_validate_api_key_placeholder() {
        let result = validate_api_key("your-firebase-api-key-goes-here-now", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_api_key_too_short() {
        let result = validate_api_key("AIzaShort", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_api_key_low_entropy() {
        let result = validate_api_key(&"a".repeat(40), "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_api_key_valid() {
        let result = validate_api_key("AIzaSyBt4C0X3oO9XvweyNqQtvR3QcmSZ7cAb1", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_production_base_urls() {
        let config = test_config();
        assert_eq!(
            config.identity_base_url(),
            "https://identitytoolkit.googleapis.com/v1"
        );
        assert_eq!(
            config.secure_token_base_url(),
            "https://securetoken.googleapis.com/v1"
        );
        assert_eq!(
            config.firestore_base_url(),
            "https://firestore.googleapis.com/v1"
        );
    }

    #[test]
    fn test_emulator_base_urls() {
        let mut config = test_config();
        config.auth_emulator_host = Some("localhost:9099".to_string());
        config.firestore_emulator_host = Some("localhost:8080".to_string());

        assert_eq!(
            config.identity_base_url(),
            "http://localhost:9099/identitytoolkit.googleapis.com/v1"
        );
        assert_eq!(
            config.secure_token_base_url(),
            "http://localhost:9099/securetoken.googleapis.com/v1"
        );
        assert_eq!(config.firestore_base_url(), "http://localhost:8080/v1");
    }

    #[test]
    fn test_documents_root() {
        let config = test_config();
        assert_eq!(
            config.documents_root(),
            "projects/chouxlab-ops/databases/(default)/documents"
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = test_config();
        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("chouxlab-ops"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("AIzaSyBt4C0X3oO9XvweyNqQtvR3QcmSZ7cAb1"));
    }
}
