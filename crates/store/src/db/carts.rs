//! Cart repository.
//!
//! The cart document is `{ items: { productId: qty, ... }, updatedAt }`.
//! Saves overwrite the whole document (no merge) so removed keys disappear;
//! an empty cart deletes the document outright.

use chrono::Utc;
use tracing::{debug, instrument};

use chouxlab_core::{ProductId, Uid};

use super::{RepositoryError, cart_path};
use crate::firebase::FirestoreClient;
use crate::firebase::firestore::{Fields, Value};
use crate::models::CartItems;

/// Repository for `carts/{uid}`.
pub struct CartRepository<'a> {
    firestore: &'a FirestoreClient,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(firestore: &'a FirestoreClient) -> Self {
        Self { firestore }
    }

    /// Read the cart. A missing document or missing `items` field is an
    /// empty cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Firestore` if the read fails.
    #[instrument(skip(self, token))]
    pub async fn get(&self, token: &str, uid: &Uid) -> Result<CartItems, RepositoryError> {
        let Some(document) = self
            .firestore
            .get_document(token, &cart_path(uid))
            .await?
        else {
            return Ok(CartItems::new());
        };

        Ok(document
            .fields
            .get("items")
            .and_then(Value::as_map)
            .map(decode_items)
            .unwrap_or_default())
    }

    /// Save the cart. Zero quantities are dropped first; when nothing
    /// remains the document is deleted, otherwise it is overwritten whole.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Firestore` if the write fails.
    #[instrument(skip(self, token, items))]
    pub async fn set(&self, token: &str, uid: &Uid, items: CartItems) -> Result<(), RepositoryError> {
        let cleaned = items.sanitized();

        if cleaned.is_empty() {
            debug!(%uid, "cart emptied, deleting document");
            return self.clear(token, uid).await;
        }

        let mut fields = Fields::new();
        fields.insert("items".to_string(), encode_items(&cleaned));
        fields.insert("updatedAt".to_string(), Value::Timestamp(Utc::now()));

        self.firestore
            .set_document(token, &cart_path(uid), fields)
            .await?;
        Ok(())
    }

    /// Delete the cart document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Firestore` if the delete fails.
    #[instrument(skip(self, token))]
    pub async fn clear(&self, token: &str, uid: &Uid) -> Result<(), RepositoryError> {
        self.firestore
            .delete_document(token, &cart_path(uid))
            .await?;
        Ok(())
    }
}

/// Encode cart items as a Firestore map value.
pub(crate) fn encode_items(items: &CartItems) -> Value {
    Value::Map(
        items
            .iter()
            .map(|(product, quantity)| {
                (product.as_str().to_owned(), Value::Integer(i64::from(quantity)))
            })
            .collect(),
    )
}

/// Decode cart items, coercing quantities leniently.
pub(crate) fn decode_items(fields: &Fields) -> CartItems {
    fields
        .iter()
        .filter_map(|(product, value)| {
            quantity_from_value(value).map(|qty| (ProductId::new(product.clone()), qty))
        })
        .collect()
}

/// Coerce a stored quantity.
///
/// Carts written by earlier clients may hold quantities as integers,
/// doubles, or numeric strings; fractional values are floored. Non-finite,
/// non-positive, and unparseable values are dropped.
fn quantity_from_value(value: &Value) -> Option<u32> {
    match value {
        Value::Integer(i) => u32::try_from(*i).ok().filter(|qty| *qty > 0),
        Value::Double(d) => quantity_from_f64(*d),
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(quantity_from_f64),
        _ => None,
    }
}

fn quantity_from_f64(qty: f64) -> Option<u32> {
    if !qty.is_finite() || qty < 1.0 || qty.floor() > f64::from(u32::MAX) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(qty.floor() as u32)
}
