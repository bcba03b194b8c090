//! The [`Store`] facade.
//!
//! One handle owning the provider clients and the session. Every data
//! operation bootstraps an anonymous session on first use and refreshes the
//! ID token when it nears expiry, so callers never juggle tokens themselves.

use std::sync::Arc;

use chrono::Duration;
use secrecy::ExposeSecret;
use tokio::sync::{Mutex, watch};
use tracing::{info, instrument, warn};

use chouxlab_core::{OrderId, Uid};

use crate::config::StoreConfig;
use crate::db::{CartRepository, DraftRepository, OrderRepository, ProfileRepository};
use crate::error::Result;
use crate::firebase::{AuthClient, FirestoreClient};
use crate::models::{CartItems, NewOrder, Order, ProfileExtra, ShippingDraft, UserProfile};
use crate::services::accounts::{AccountService, Registration};
use crate::session::{
    CurrentUser, FileSessionStore, MemorySessionStore, PersistedSession, Session, SessionStore,
};

/// Refresh the ID token when it expires within this window.
const REFRESH_SKEW_SECONDS: i64 = 60;

/// Default page size for order listings.
const DEFAULT_ORDER_LIMIT: u32 = 20;

/// Storefront data-access facade. Cheap to clone; all clones share the
/// session.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    auth: AuthClient,
    firestore: FirestoreClient,
    session: Mutex<Option<Session>>,
    session_store: Box<dyn SessionStore>,
    user_tx: watch::Sender<Option<CurrentUser>>,
}

/// A snapshot of the authenticated session, valid for one operation.
struct Authed {
    user: CurrentUser,
    token: String,
}

impl Store {
    /// Create a store. Sessions persist to `config.session_file` when set,
    /// otherwise they live in memory.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        let session_store: Box<dyn SessionStore> = match &config.session_file {
            Some(path) => Box::new(FileSessionStore::new(path.clone())),
            None => Box::new(MemorySessionStore::new()),
        };
        Self::with_session_store(config, session_store)
    }

    /// Create a store with an explicit session store.
    #[must_use]
    pub fn with_session_store(config: StoreConfig, session_store: Box<dyn SessionStore>) -> Self {
        let (user_tx, _) = watch::channel(None);
        Self {
            inner: Arc::new(StoreInner {
                auth: AuthClient::new(&config),
                firestore: FirestoreClient::new(&config),
                session: Mutex::new(None),
                session_store,
                user_tx,
            }),
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Make sure a session exists and return its identity. Restores a
    /// persisted session when one is on disk, otherwise signs up a fresh
    /// anonymous identity. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Auth` when the provider rejects both the
    /// restore and the anonymous sign-up.
    #[instrument(skip(self))]
    pub async fn init_session(&self) -> Result<Uid> {
        Ok(self.authed().await?.user.uid)
    }

    /// The identity the session currently acts as, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<CurrentUser> {
        self.inner.user_tx.borrow().clone()
    }

    /// Subscribe to identity changes: anonymous bootstrap, login, logout.
    /// The receiver starts with the current value.
    #[must_use]
    pub fn watch_user(&self) -> watch::Receiver<Option<CurrentUser>> {
        self.inner.user_tx.subscribe()
    }

    /// Drop the session and forget the persisted one. The next operation
    /// starts a fresh anonymous session.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Session` when the persisted session cannot be
    /// removed.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<()> {
        let mut guard = self.inner.session.lock().await;
        *guard = None;
        self.inner.session_store.clear()?;
        drop(guard);

        self.inner.user_tx.send_replace(None);
        info!("signed out");
        Ok(())
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Register an email/password account. Cart and shipping draft from the
    /// current anonymous session follow the user to the new account.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Account` for validation and provider failures,
    /// `EmailExists` among them.
    #[instrument(skip(self, registration))]
    pub async fn register_with_email(&self, registration: &Registration) -> Result<CurrentUser> {
        let mut guard = self.inner.session.lock().await;
        let anonymous_uid = Self::anonymous_uid(&guard);

        let session = AccountService::new(&self.inner.auth, &self.inner.firestore)
            .register_with_email(registration, anonymous_uid.as_ref())
            .await?;
        Ok(self.install_session(&mut guard, session))
    }

    /// Log in with an email/password pair, migrating anonymous data.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Account` wrapping `InvalidCredentials` for a
    /// wrong email or password.
    #[instrument(skip(self, email, password))]
    pub async fn login_with_email(&self, email: &str, password: &str) -> Result<CurrentUser> {
        let mut guard = self.inner.session.lock().await;
        let anonymous_uid = Self::anonymous_uid(&guard);

        let session = AccountService::new(&self.inner.auth, &self.inner.firestore)
            .login_with_email(email, password, anonymous_uid.as_ref())
            .await?;
        Ok(self.install_session(&mut guard, session))
    }

    /// Log in with a Google ID token obtained by the caller, migrating
    /// anonymous data.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Account` wrapping `InvalidCredentials` when the
    /// token is rejected.
    #[instrument(skip(self, google_id_token))]
    pub async fn login_with_google(&self, google_id_token: &str) -> Result<CurrentUser> {
        let mut guard = self.inner.session.lock().await;
        let anonymous_uid = Self::anonymous_uid(&guard);

        let session = AccountService::new(&self.inner.auth, &self.inner.firestore)
            .login_with_google(google_id_token, anonymous_uid.as_ref())
            .await?;
        Ok(self.install_session(&mut guard, session))
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Merge-write the profile document for the current identity and return
    /// the result.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Repository` if the profile write fails.
    #[instrument(skip(self, extra))]
    pub async fn ensure_profile(&self, extra: &ProfileExtra) -> Result<UserProfile> {
        let authed = self.authed().await?;
        let profile = ProfileRepository::new(&self.inner.firestore)
            .ensure(&authed.token, &authed.user, extra)
            .await?;
        Ok(profile)
    }

    /// Read the current identity's profile. `None` until the first
    /// [`ensure_profile`](Self::ensure_profile) or sign-in.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Repository` if the read fails.
    #[instrument(skip(self))]
    pub async fn my_profile(&self) -> Result<Option<UserProfile>> {
        let authed = self.authed().await?;
        let profile = ProfileRepository::new(&self.inner.firestore)
            .get(&authed.token, &authed.user.uid)
            .await?;
        Ok(profile)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Read the cart. Empty when nothing has been saved.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Repository` if the read fails.
    #[instrument(skip(self))]
    pub async fn cart(&self) -> Result<CartItems> {
        let authed = self.authed().await?;
        let items = CartRepository::new(&self.inner.firestore)
            .get(&authed.token, &authed.user.uid)
            .await?;
        Ok(items)
    }

    /// Save the cart, replacing the previous contents. Saving an empty cart
    /// deletes the document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Repository` if the write fails.
    #[instrument(skip(self, items))]
    pub async fn set_cart(&self, items: CartItems) -> Result<()> {
        let authed = self.authed().await?;
        CartRepository::new(&self.inner.firestore)
            .set(&authed.token, &authed.user.uid, items)
            .await?;
        Ok(())
    }

    /// Delete the cart.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Repository` if the delete fails.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<()> {
        let authed = self.authed().await?;
        CartRepository::new(&self.inner.firestore)
            .clear(&authed.token, &authed.user.uid)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Shipping draft
    // =========================================================================

    /// Merge-write the shipping draft. Only present fields are written, so
    /// a partial form never wipes earlier answers.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Repository` if the write fails.
    #[instrument(skip(self, draft))]
    pub async fn save_shipping_draft(&self, draft: &ShippingDraft) -> Result<()> {
        let authed = self.authed().await?;
        DraftRepository::new(&self.inner.firestore)
            .save(&authed.token, &authed.user.uid, draft)
            .await?;
        Ok(())
    }

    /// Read the shipping draft, if one was saved.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Repository` if the read fails.
    #[instrument(skip(self))]
    pub async fn load_shipping_draft(&self) -> Result<Option<ShippingDraft>> {
        let authed = self.authed().await?;
        let draft = DraftRepository::new(&self.inner.firestore)
            .load(&authed.token, &authed.user.uid)
            .await?;
        Ok(draft)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place an order and return its ID.
    ///
    /// The order write is the source of truth. The follow-ups (bumping the
    /// profile's order counter and clearing the cart) are best-effort: their
    /// failure is logged, never surfaced, since the order already exists.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Repository` if the order write itself fails.
    #[instrument(skip(self, order))]
    pub async fn place_order(&self, order: &NewOrder) -> Result<OrderId> {
        let authed = self.authed().await?;
        let firestore = &self.inner.firestore;

        let id = OrderRepository::new(firestore)
            .create(&authed.token, &authed.user.uid, order)
            .await?;
        info!(%id, "order placed");

        if let Err(error) = ProfileRepository::new(firestore)
            .record_order_placed(&authed.token, &authed.user.uid)
            .await
        {
            warn!(%id, %error, "order counter bump failed");
        }
        if let Err(error) = CartRepository::new(firestore)
            .clear(&authed.token, &authed.user.uid)
            .await
        {
            warn!(%id, %error, "cart clear after order failed");
        }

        Ok(id)
    }

    /// List the current identity's orders, newest first. `limit` defaults
    /// to 20.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Repository` if the query fails.
    #[instrument(skip(self))]
    pub async fn my_orders(&self, limit: Option<u32>) -> Result<Vec<Order>> {
        let authed = self.authed().await?;
        let orders = OrderRepository::new(&self.inner.firestore)
            .list_for_user(
                &authed.token,
                &authed.user.uid,
                limit.unwrap_or(DEFAULT_ORDER_LIMIT),
            )
            .await?;
        Ok(orders)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// The current identity, but only while it is still provisional.
    fn anonymous_uid(guard: &Option<Session>) -> Option<Uid> {
        guard
            .as_ref()
            .filter(|session| session.user.is_anonymous)
            .map(|session| session.user.uid.clone())
    }

    /// Swap the session to a freshly signed-in one and tell the watchers.
    fn install_session(&self, guard: &mut Option<Session>, session: Session) -> CurrentUser {
        let user = session.user.clone();
        self.persist(&session);
        *guard = Some(session);
        self.inner.user_tx.send_replace(Some(user.clone()));
        user
    }

    /// Get a usable session, bootstrapping or refreshing as needed.
    async fn authed(&self) -> Result<Authed> {
        let mut guard = self.inner.session.lock().await;

        let session = match guard.as_mut() {
            Some(session) => session,
            None => {
                let session = self.bootstrap().await?;
                self.persist(&session);
                self.inner.user_tx.send_replace(Some(session.user.clone()));
                guard.insert(session)
            }
        };

        if session
            .tokens
            .expires_within(Duration::seconds(REFRESH_SKEW_SECONDS))
        {
            let refreshed = self
                .inner
                .auth
                .refresh(session.tokens.refresh_token.expose_secret())
                .await?;
            session.tokens = refreshed.tokens;
            self.persist(session);
        }

        Ok(Authed {
            user: session.user.clone(),
            token: session.tokens.id_token.expose_secret().to_owned(),
        })
    }

    /// Restore the persisted session, or start an anonymous one.
    async fn bootstrap(&self) -> Result<Session> {
        match self.inner.session_store.load() {
            Ok(Some(persisted)) => match self.inner.auth.refresh(&persisted.refresh_token).await {
                Ok(refreshed) => {
                    info!(uid = %refreshed.uid, "restored persisted session");
                    let mut user = persisted.user;
                    user.uid = refreshed.uid;
                    return Ok(Session {
                        user,
                        tokens: refreshed.tokens,
                    });
                }
                Err(crate::firebase::AuthError::TokenExpired) => {
                    warn!("persisted session expired, starting a fresh one");
                    self.forget_persisted();
                }
                Err(error) => return Err(error.into()),
            },
            Ok(None) => {}
            Err(error) => {
                warn!(%error, "could not load persisted session, starting a fresh one");
                self.forget_persisted();
            }
        }

        let sign_in = self.inner.auth.sign_up_anonymous().await?;
        info!(uid = %sign_in.user.uid, "started anonymous session");
        Ok(Session {
            user: sign_in.user.into(),
            tokens: sign_in.tokens,
        })
    }

    /// Persist the session. Best-effort: shopping continues even when the
    /// session file is unwritable.
    fn persist(&self, session: &Session) {
        let persisted = PersistedSession {
            refresh_token: session.tokens.refresh_token.expose_secret().to_owned(),
            user: session.user.clone(),
        };
        if let Err(error) = self.inner.session_store.save(&persisted) {
            warn!(%error, "could not persist session");
        }
    }

    fn forget_persisted(&self) {
        if let Err(error) = self.inner.session_store.clear() {
            warn!(%error, "could not clear persisted session");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn test_config() -> StoreConfig {
        StoreConfig {
            project_id: "demo-chouxlab".to_string(),
            api_key: SecretString::from("emulator-api-key"),
            auth_emulator_host: Some("127.0.0.1:9099".to_string()),
            firestore_emulator_host: Some("127.0.0.1:8080".to_string()),
            session_file: None,
        }
    }

    #[test]
    fn test_store_starts_signed_out() {
        let store = Store::new(test_config());
        assert!(store.current_user().is_none());
    }

    #[tokio::test]
    async fn test_watch_user_sees_sign_out() {
        let store = Store::new(test_config());
        let mut rx = store.watch_user();
        assert!(rx.borrow_and_update().is_none());

        store.sign_out().await.unwrap();
        assert!(store.current_user().is_none());
    }
}
