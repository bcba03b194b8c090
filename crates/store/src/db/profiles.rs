//! Profile repository.
//!
//! The profile document at `users/{uid}` is merged-into on every sign-in:
//! the identity fields are refreshed, and the first write also stitches
//! `createdAt` and zeroed counters.

use chrono::Utc;
use tracing::instrument;

use chouxlab_core::Uid;

use super::{RepositoryError, from_fields, profile_path};
use crate::firebase::FirestoreClient;
use crate::firebase::firestore::{Fields, Value};
use crate::models::{ProfileExtra, UserProfile};
use crate::session::CurrentUser;

/// Repository for `users/{uid}`.
pub struct ProfileRepository<'a> {
    firestore: &'a FirestoreClient,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(firestore: &'a FirestoreClient) -> Self {
        Self { firestore }
    }

    /// Read the profile. Returns `None` when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Firestore` if the read fails and
    /// `RepositoryError::DataCorruption` if the stored document does not
    /// decode.
    #[instrument(skip(self, token))]
    pub async fn get(&self, token: &str, uid: &Uid) -> Result<Option<UserProfile>, RepositoryError> {
        let document = self
            .firestore
            .get_document(token, &profile_path(uid))
            .await?;
        document.map(|doc| from_fields(&doc.fields)).transpose()
    }

    /// Merge-write the base identity fields, stitching `createdAt` and
    /// zeroed counters when the document does not exist yet. Returns the
    /// resulting profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Firestore` if a remote call fails.
    #[instrument(skip(self, token, user, extra), fields(uid = %user.uid))]
    pub async fn ensure(
        &self,
        token: &str,
        user: &CurrentUser,
        extra: &ProfileExtra,
    ) -> Result<UserProfile, RepositoryError> {
        let path = profile_path(&user.uid);
        let exists = self.firestore.get_document(token, &path).await?.is_some();

        let now = Value::Timestamp(Utc::now());
        let mut fields = Fields::new();
        fields.insert("uid".to_string(), Value::string(user.uid.as_str()));
        fields.insert("email".to_string(), opt_string(user.email.as_deref()));
        fields.insert(
            "displayName".to_string(),
            opt_string(user.display_name.as_deref()),
        );
        fields.insert("photoURL".to_string(), opt_string(user.photo_url.as_deref()));
        fields.insert("phone".to_string(), opt_string(extra.phone.as_deref()));
        fields.insert("updatedAt".to_string(), now.clone());

        if !exists {
            fields.insert("createdAt".to_string(), now);
            fields.insert("points".to_string(), Value::Integer(0));
            fields.insert("totalOrders".to_string(), Value::Integer(0));
        }

        let document = self.firestore.merge_document(token, &path, fields).await?;
        from_fields(&document.fields)
    }

    /// Bump `totalOrders` after an order is placed (read-increment-merge).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Firestore` if a remote call fails.
    #[instrument(skip(self, token))]
    pub async fn record_order_placed(&self, token: &str, uid: &Uid) -> Result<(), RepositoryError> {
        let path = profile_path(uid);

        let previous = self
            .firestore
            .get_document(token, &path)
            .await?
            .and_then(|doc| doc.fields.get("totalOrders").and_then(counter_from_value))
            .unwrap_or(0);

        let mut fields = Fields::new();
        fields.insert("totalOrders".to_string(), Value::Integer(previous + 1));
        fields.insert("updatedAt".to_string(), Value::Timestamp(Utc::now()));

        self.firestore.merge_document(token, &path, fields).await?;
        Ok(())
    }
}

fn opt_string(value: Option<&str>) -> Value {
    value.map_or(Value::Null, Value::string)
}

/// Coerce a stored counter.
///
/// Profiles written by earlier clients may hold `totalOrders` as an integer,
/// a double, or a numeric string; anything else counts as absent.
fn counter_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(i) => Some(*i),
        Value::Double(d) => counter_from_f64(*d),
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(counter_from_f64),
        _ => None,
    }
}

fn counter_from_f64(count: f64) -> Option<i64> {
    if !count.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    Some(count.floor() as i64)
}
