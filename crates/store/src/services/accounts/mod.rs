//! Account registration and login.
//!
//! These flows compose the identity provider with the profile repository:
//! sign in, migrate any anonymous data left behind by the previous session,
//! and merge-write the profile document. The caller (normally the [`Store`]
//! facade) swaps its session to the returned one.
//!
//! [`Store`]: crate::Store

mod error;

pub use error::AccountError;

use secrecy::ExposeSecret;
use tracing::{info, instrument};

use chouxlab_core::{Email, Uid};

use crate::db::ProfileRepository;
use crate::firebase::auth::SignIn;
use crate::firebase::{AuthClient, FirestoreClient};
use crate::models::ProfileExtra;
use crate::services::migration::migrate_anonymous_data;
use crate::session::Session;

/// Shortest password the provider accepts; checked locally so an obviously
/// bad password never leaves the process.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Details collected by a registration form.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

/// Registration and login flows over the provider clients.
pub struct AccountService<'a> {
    auth: &'a AuthClient,
    firestore: &'a FirestoreClient,
}

impl<'a> AccountService<'a> {
    /// Create a new account service.
    #[must_use]
    pub const fn new(auth: &'a AuthClient, firestore: &'a FirestoreClient) -> Self {
        Self { auth, firestore }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Create an email/password account and return its session.
    ///
    /// When `anonymous_uid` is given, the cart and shipping draft saved
    /// under that identity are migrated to the new account.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidEmail` or `PasswordTooShort` before any
    /// remote call, `Auth` for provider rejections (`EmailExists` among
    /// them), and `Repository` if the profile write fails.
    #[instrument(skip(self, registration, anonymous_uid))]
    pub async fn register_with_email(
        &self,
        registration: &Registration,
        anonymous_uid: Option<&Uid>,
    ) -> Result<Session, AccountError> {
        let email = Email::parse(&registration.email)?;
        validate_password(&registration.password)?;

        let mut sign_in = self.auth.sign_up_email(&email, &registration.password).await?;

        if let Some(name) = normalized(registration.name.as_deref()) {
            self.auth
                .update_profile(sign_in.tokens.id_token.expose_secret(), name)
                .await?;
            sign_in.user.display_name = Some(name.to_string());
        }

        info!(uid = %sign_in.user.uid, "registered new account");
        let extra = ProfileExtra {
            phone: normalized(registration.phone.as_deref()).map(str::to_owned),
        };
        self.finalize_sign_in(sign_in, &extra, anonymous_uid).await
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Sign in with an email/password pair.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidEmail` before any remote call and
    /// `Auth(InvalidCredentials)` for a wrong email or password.
    #[instrument(skip(self, password, anonymous_uid))]
    pub async fn login_with_email(
        &self,
        email: &str,
        password: &str,
        anonymous_uid: Option<&Uid>,
    ) -> Result<Session, AccountError> {
        let email = Email::parse(email)?;
        let sign_in = self.auth.sign_in_password(&email, password).await?;
        self.finalize_sign_in(sign_in, &ProfileExtra::default(), anonymous_uid)
            .await
    }

    /// Sign in with a Google ID token obtained by the caller.
    ///
    /// # Errors
    ///
    /// Returns `Auth(InvalidCredentials)` when the token is rejected.
    #[instrument(skip(self, google_id_token, anonymous_uid))]
    pub async fn login_with_google(
        &self,
        google_id_token: &str,
        anonymous_uid: Option<&Uid>,
    ) -> Result<Session, AccountError> {
        let sign_in = self.auth.sign_in_with_google(google_id_token).await?;
        self.finalize_sign_in(sign_in, &ProfileExtra::default(), anonymous_uid)
            .await
    }

    /// Shared tail of every sign-in: migrate anonymous data, then
    /// merge-write the profile document.
    async fn finalize_sign_in(
        &self,
        sign_in: SignIn,
        extra: &ProfileExtra,
        anonymous_uid: Option<&Uid>,
    ) -> Result<Session, AccountError> {
        let token = sign_in.tokens.id_token.expose_secret().to_owned();

        if let Some(anonymous_uid) = anonymous_uid {
            migrate_anonymous_data(self.firestore, &token, anonymous_uid, &sign_in.user.uid).await;
        }

        let user = crate::session::CurrentUser::from(sign_in.user);
        ProfileRepository::new(self.firestore)
            .ensure(&token, &user, extra)
            .await?;

        Ok(Session {
            user,
            tokens: sign_in.tokens,
        })
    }
}

fn validate_password(password: &str) -> Result<(), AccountError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AccountError::PasswordTooShort {
            minimum: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

fn normalized(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
