//! Firebase REST clients.
//!
//! # Architecture
//!
//! - Firebase is accessed through its public REST surfaces - no SDK, no
//!   local sync, direct API calls
//! - One shared `reqwest::Client` per API client, cloneable via `Arc`
//!
//! # APIs
//!
//! ## Identity Toolkit (`identitytoolkit.googleapis.com`)
//! - Anonymous, email/password, and Google sign-in
//! - Profile updates
//!
//! ## Secure Token (`securetoken.googleapis.com`)
//! - Refresh-token exchange
//!
//! ## Firestore (`firestore.googleapis.com`)
//! - Path-addressed document reads/writes/deletes and structured queries
//! - Requests authenticated with the session's ID token as a bearer
//!   credential

pub mod auth;
pub mod firestore;

pub use auth::{AuthClient, AuthError};
pub use firestore::{Document, FirestoreClient, FirestoreError, Value};
