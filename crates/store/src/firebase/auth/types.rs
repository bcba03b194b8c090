//! Identity provider wire and domain types.

use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;
use serde::Deserialize;

use chouxlab_core::Uid;

use super::AuthError;

/// An ID-token/refresh-token pair with its absolute expiry.
///
/// The ID token authenticates document-store calls; the refresh token is
/// exchanged for a fresh pair when the ID token nears expiry.
#[derive(Clone)]
pub struct TokenPair {
    /// Short-lived bearer credential for Firestore calls.
    pub id_token: SecretString,
    /// Long-lived token exchanged at the secure-token endpoint.
    pub refresh_token: SecretString,
    /// Absolute expiry of the ID token.
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("id_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl TokenPair {
    /// Whether the ID token expires within the given skew.
    #[must_use]
    pub fn expires_within(&self, skew: Duration) -> bool {
        Utc::now() + skew >= self.expires_at
    }
}

/// A signed-in identity as reported by the provider.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: Uid,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub is_anonymous: bool,
}

/// The result of a sign-up or sign-in call.
#[derive(Debug, Clone)]
pub struct SignIn {
    pub user: AuthUser,
    pub tokens: TokenPair,
}

/// A refreshed token pair tied to its owning identity.
#[derive(Debug, Clone)]
pub struct Refreshed {
    pub uid: Uid,
    pub tokens: TokenPair,
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

/// Response shape shared by `accounts:signUp`, `accounts:signInWithPassword`,
/// and `accounts:signInWithIdp`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SignInResponse {
    pub local_id: String,
    pub id_token: String,
    pub refresh_token: String,
    /// Seconds until the ID token expires, string-encoded on the wire.
    pub expires_in: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    /// Present on `signInWithIdp` responses.
    pub full_name: Option<String>,
}

impl SignInResponse {
    pub(super) fn into_sign_in(self, is_anonymous: bool) -> Result<SignIn, AuthError> {
        let expires_at = expires_at_from_wire(&self.expires_in)?;
        Ok(SignIn {
            user: AuthUser {
                uid: Uid::new(self.local_id),
                email: self.email.filter(|e| !e.is_empty()),
                display_name: self.display_name.or(self.full_name),
                photo_url: self.photo_url,
                is_anonymous,
            },
            tokens: TokenPair {
                id_token: SecretString::from(self.id_token),
                refresh_token: SecretString::from(self.refresh_token),
                expires_at,
            },
        })
    }
}

/// Response from the secure-token endpoint. Snake_case on the wire, unlike
/// the Identity Toolkit responses.
#[derive(Debug, Deserialize)]
pub(super) struct RefreshResponse {
    pub user_id: String,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: String,
}

impl RefreshResponse {
    pub(super) fn into_refreshed(self) -> Result<Refreshed, AuthError> {
        let expires_at = expires_at_from_wire(&self.expires_in)?;
        Ok(Refreshed {
            uid: Uid::new(self.user_id),
            tokens: TokenPair {
                id_token: SecretString::from(self.id_token),
                refresh_token: SecretString::from(self.refresh_token),
                expires_at,
            },
        })
    }
}

/// Response from `accounts:update`. Only deserialized to confirm shape.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub(super) struct UpdateProfileResponse {
    pub local_id: String,
    pub display_name: Option<String>,
}

/// Error envelope: `{"error": {"code": 400, "message": "EMAIL_EXISTS"}}`.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorEnvelope {
    pub error: ApiError,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiError {
    pub code: u16,
    pub message: String,
}

fn expires_at_from_wire(expires_in: &str) -> Result<DateTime<Utc>, AuthError> {
    let seconds: i64 = expires_in
        .parse()
        .map_err(|_| AuthError::Parse(format!("invalid expiresIn value: {expires_in:?}")))?;
    Ok(Utc::now() + Duration::seconds(seconds))
}
