//! Shipping-draft repository.
//!
//! The draft lives at `users/{uid}/drafts/shipping` and is merge-written so
//! a partially filled form never wipes fields saved earlier.

use chrono::Utc;
use tracing::instrument;

use chouxlab_core::Uid;

use super::{RepositoryError, draft_path, from_fields, to_fields};
use crate::firebase::FirestoreClient;
use crate::firebase::firestore::Value;
use crate::models::ShippingDraft;

/// Repository for `users/{uid}/drafts/shipping`.
pub struct DraftRepository<'a> {
    firestore: &'a FirestoreClient,
}

impl<'a> DraftRepository<'a> {
    /// Create a new draft repository.
    #[must_use]
    pub const fn new(firestore: &'a FirestoreClient) -> Self {
        Self { firestore }
    }

    /// Merge-write the draft with a fresh `updatedAt`. Only present fields
    /// are written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Firestore` if the write fails.
    #[instrument(skip(self, token, draft))]
    pub async fn save(
        &self,
        token: &str,
        uid: &Uid,
        draft: &ShippingDraft,
    ) -> Result<(), RepositoryError> {
        let mut fields = to_fields(draft)?;
        fields.insert("updatedAt".to_string(), Value::Timestamp(Utc::now()));

        self.firestore
            .merge_document(token, &draft_path(uid), fields)
            .await?;
        Ok(())
    }

    /// Read the draft. Returns `None` when it was never saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Firestore` if the read fails and
    /// `RepositoryError::DataCorruption` if the stored document does not
    /// decode.
    #[instrument(skip(self, token))]
    pub async fn load(
        &self,
        token: &str,
        uid: &Uid,
    ) -> Result<Option<ShippingDraft>, RepositoryError> {
        let document = self
            .firestore
            .get_document(token, &draft_path(uid))
            .await?;
        document.map(|doc| from_fields(&doc.fields)).transpose()
    }
}
