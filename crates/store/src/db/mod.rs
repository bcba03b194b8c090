//! Document repositories over the Firestore client.
//!
//! One repository per document family, mirroring the remote layout:
//!
//! | Repository          | Document path                 |
//! |---------------------|-------------------------------|
//! | `ProfileRepository` | `users/{uid}`                 |
//! | `CartRepository`    | `carts/{uid}`                 |
//! | `DraftRepository`   | `users/{uid}/drafts/shipping` |
//! | `OrderRepository`   | `orders/{generated id}`       |
//!
//! Repositories borrow the client and take the caller's ID token per call;
//! session handling stays in the facade.

pub mod carts;
pub mod drafts;
pub mod orders;
pub mod profiles;

pub use carts::CartRepository;
pub use drafts::DraftRepository;
pub use orders::OrderRepository;
pub use profiles::ProfileRepository;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use chouxlab_core::Uid;

use crate::firebase::firestore::{Fields, Value};
use crate::firebase::FirestoreError;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Document store error.
    #[error("document store error: {0}")]
    Firestore(#[from] FirestoreError),

    /// A stored document does not match its expected shape.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Path of the profile document.
pub(crate) fn profile_path(uid: &Uid) -> String {
    format!("users/{uid}")
}

/// Path of the cart document.
pub(crate) fn cart_path(uid: &Uid) -> String {
    format!("carts/{uid}")
}

/// Path of the shipping-draft document.
pub(crate) fn draft_path(uid: &Uid) -> String {
    format!("users/{uid}/drafts/shipping")
}

/// Encode a serializable model into a document's `fields` map.
pub(crate) fn to_fields<T: Serialize>(model: &T) -> Result<Fields, RepositoryError> {
    let json = serde_json::to_value(model)
        .map_err(|e| RepositoryError::DataCorruption(format!("encode failed: {e}")))?;
    match Value::from_json(&json) {
        Value::Map(fields) => Ok(fields),
        other => Err(RepositoryError::DataCorruption(format!(
            "expected an object, got {other:?}"
        ))),
    }
}

/// Decode a document's `fields` map into a deserializable model.
pub(crate) fn from_fields<T: DeserializeOwned>(fields: &Fields) -> Result<T, RepositoryError> {
    let json = Value::Map(fields.clone()).to_json();
    serde_json::from_value(json)
        .map_err(|e| RepositoryError::DataCorruption(format!("decode failed: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::ShippingDraft;

    #[test]
    fn test_paths() {
        let uid = Uid::new("abc123");
        assert_eq!(profile_path(&uid), "users/abc123");
        assert_eq!(cart_path(&uid), "carts/abc123");
        assert_eq!(draft_path(&uid), "users/abc123/drafts/shipping");
    }

    #[test]
    fn test_fields_roundtrip() {
        let draft = ShippingDraft {
            full_name: Some("Som Chai".to_string()),
            postal_code: Some("10110".to_string()),
            ..ShippingDraft::default()
        };

        let fields = to_fields(&draft).unwrap();
        assert_eq!(
            fields.get("fullName"),
            Some(&Value::string("Som Chai"))
        );

        let back: ShippingDraft = from_fields(&fields).unwrap();
        assert_eq!(back, draft);
    }
}
