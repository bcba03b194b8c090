//! Chouxlab Store - client-side data-access layer.
//!
//! This crate wraps two hosted Firebase services behind a single [`Store`]
//! facade:
//!
//! - **Firebase Authentication** (identity provider) - anonymous sign-in,
//!   email/password and Google accounts, token refresh
//! - **Cloud Firestore** (document store) - user profiles, carts, shipping
//!   drafts, and orders as path-addressed documents
//!
//! Sessions start anonymous and are upgraded in place on registration or
//! login; the cart and shipping draft saved under the anonymous identity are
//! migrated to the new account.
//!
//! # Example
//!
//! ```rust,ignore
//! use chouxlab_store::{Store, StoreConfig};
//!
//! let store = Store::new(StoreConfig::from_env()?);
//!
//! // Bootstraps an anonymous session on first use
//! let uid = store.init_session().await?;
//!
//! // Cart is keyed by the session identity
//! let mut items = store.cart().await?;
//! items.add("vanilla-choux".into(), 2);
//! store.set_cart(items).await?;
//!
//! // Upgrade to a real account; the cart follows
//! let user = store
//!     .login_with_email("user@example.com", "password")
//!     .await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod firebase;
pub mod models;
pub mod services;
pub mod session;
pub mod store;

pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use store::Store;
