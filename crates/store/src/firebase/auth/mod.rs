//! Firebase Authentication REST client.
//!
//! Account operations go to the Identity Toolkit API
//! (`accounts:signUp`, `accounts:signInWithPassword`, `accounts:signInWithIdp`,
//! `accounts:update`); token refresh goes to the Secure Token API. Both are
//! keyed by the project's web API key, passed as a query parameter.
//!
//! # Example
//!
//! ```rust,ignore
//! use chouxlab_store::firebase::AuthClient;
//!
//! let client = AuthClient::new(&config);
//!
//! // Bootstrap a provisional identity
//! let anon = client.sign_up_anonymous().await?;
//!
//! // Upgrade to a real account later
//! let signed_in = client
//!     .sign_in_password(&email, "password")
//!     .await?;
//! ```

mod types;

pub use types::{AuthUser, Refreshed, SignIn, TokenPair};

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, instrument};

use chouxlab_core::Email;

use crate::config::StoreConfig;
use types::{ErrorEnvelope, RefreshResponse, SignInResponse, UpdateProfileResponse};

/// Errors returned by the identity provider.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Transport-level failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider error not covered by a typed variant.
    #[error("identity provider error {code}: {message}")]
    Api { code: u16, message: String },

    /// An account with this email already exists.
    #[error("an account with this email already exists")]
    EmailExists,

    /// Wrong email/password, or the account does not exist.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password rejected by the provider.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// The account has been disabled by an administrator.
    #[error("user account is disabled")]
    UserDisabled,

    /// The refresh token is expired or revoked.
    #[error("session expired")]
    TokenExpired,

    /// The sign-in method is disabled for this project.
    #[error("operation not allowed")]
    OperationNotAllowed,

    /// The response did not match the expected shape.
    #[error("unexpected response: {0}")]
    Parse(String),
}

/// Client for the Firebase Authentication REST surface.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<AuthClientInner>,
}

struct AuthClientInner {
    client: reqwest::Client,
    identity_base_url: String,
    secure_token_base_url: String,
    api_key: SecretString,
}

impl AuthClient {
    /// Create a new identity provider client.
    #[must_use]
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            inner: Arc::new(AuthClientInner {
                client: reqwest::Client::new(),
                identity_base_url: config.identity_base_url(),
                secure_token_base_url: config.secure_token_base_url(),
                api_key: config.api_key.clone(),
            }),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sign-up / sign-in
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a provisional anonymous identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::OperationNotAllowed` when anonymous sign-in is
    /// disabled for the project.
    #[instrument(skip(self))]
    pub async fn sign_up_anonymous(&self) -> Result<SignIn, AuthError> {
        let response: SignInResponse = self
            .post_identity("signUp", &json!({ "returnSecureToken": true }))
            .await?;
        let sign_in = response.into_sign_in(true)?;
        debug!(uid = %sign_in.user.uid, "anonymous sign-up");
        Ok(sign_in)
    }

    /// Create an email/password account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmailExists` when the address is taken and
    /// `AuthError::WeakPassword` when the provider rejects the password.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_up_email(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<SignIn, AuthError> {
        let response: SignInResponse = self
            .post_identity(
                "signUp",
                &json!({
                    "email": email.as_str(),
                    "password": password,
                    "returnSecureToken": true,
                }),
            )
            .await?;
        response.into_sign_in(false)
    }

    /// Sign in with an email/password pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` when the email is unknown or
    /// the password is wrong.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<SignIn, AuthError> {
        let response: SignInResponse = self
            .post_identity(
                "signInWithPassword",
                &json!({
                    "email": email.as_str(),
                    "password": password,
                    "returnSecureToken": true,
                }),
            )
            .await?;
        response.into_sign_in(false)
    }

    /// Sign in with a Google ID token obtained by the caller.
    ///
    /// Returns provider-enriched user info (email, display name, photo URL).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` when the token is rejected.
    #[instrument(skip(self, google_id_token))]
    pub async fn sign_in_with_google(&self, google_id_token: &str) -> Result<SignIn, AuthError> {
        let post_body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("id_token", google_id_token)
            .append_pair("providerId", "google.com")
            .finish();

        let response: SignInResponse = self
            .post_identity(
                "signInWithIdp",
                &json!({
                    "postBody": post_body,
                    "requestUri": "http://localhost",
                    "returnSecureToken": true,
                    "returnIdpCredential": true,
                }),
            )
            .await?;
        response.into_sign_in(false)
    }

    /// Set the display name on the account owning `id_token`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` when the ID token is no longer valid.
    #[instrument(skip(self, id_token))]
    pub async fn update_profile(
        &self,
        id_token: &str,
        display_name: &str,
    ) -> Result<(), AuthError> {
        let _: UpdateProfileResponse = self
            .post_identity(
                "update",
                &json!({
                    "idToken": id_token,
                    "displayName": display_name,
                    "returnSecureToken": false,
                }),
            )
            .await?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Token refresh
    // ─────────────────────────────────────────────────────────────────────────

    /// Exchange a refresh token for a fresh token pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` when the refresh token is expired,
    /// revoked, or belongs to a deleted account.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<Refreshed, AuthError> {
        let url = format!(
            "{}/token?key={}",
            self.inner.secure_token_base_url,
            self.inner.api_key.expose_secret()
        );

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];

        let response = self.inner.client.post(&url).form(&params).send().await?;
        let refresh: RefreshResponse = Self::decode(response).await?;
        refresh.into_refreshed()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Request plumbing
    // ─────────────────────────────────────────────────────────────────────────

    /// POST to an Identity Toolkit `accounts:` endpoint.
    async fn post_identity<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> Result<T, AuthError> {
        let url = format!(
            "{}/accounts:{endpoint}?key={}",
            self.inner.identity_base_url,
            self.inner.api_key.expose_secret()
        );

        let response = self.inner.client.post(&url).json(body).send().await?;
        Self::decode(response).await
    }

    /// Decode a success body, or map the provider's error envelope.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AuthError> {
        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(AuthError::Http);
        }

        let text = response.text().await.unwrap_or_default();
        Err(serde_json::from_str::<ErrorEnvelope>(&text).map_or_else(
            |_| AuthError::Api {
                code: status.as_u16(),
                message: text.clone(),
            },
            |envelope| map_api_error(envelope.error.code, &envelope.error.message),
        ))
    }
}

/// Map the provider's machine code (the message prefix before `" : "`) to a
/// typed error.
fn map_api_error(code: u16, message: &str) -> AuthError {
    let (machine_code, detail) = message
        .split_once(" : ")
        .map_or((message.trim(), None), |(head, tail)| {
            (head.trim(), Some(tail.trim()))
        });

    match machine_code {
        "EMAIL_EXISTS" => AuthError::EmailExists,
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS"
        | "INVALID_IDP_RESPONSE" => AuthError::InvalidCredentials,
        "WEAK_PASSWORD" => AuthError::WeakPassword(
            detail
                .unwrap_or("password should be at least 6 characters")
                .to_string(),
        ),
        "USER_DISABLED" => AuthError::UserDisabled,
        "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND"
        | "INVALID_ID_TOKEN" => AuthError::TokenExpired,
        "OPERATION_NOT_ALLOWED" | "ADMIN_ONLY_OPERATION" => AuthError::OperationNotAllowed,
        _ => AuthError::Api {
            code,
            message: message.to_string(),
        },
    }
}
