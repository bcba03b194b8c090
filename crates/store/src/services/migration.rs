//! Migration of anonymous-session data into a freshly signed-in account.
//!
//! When a browsing session that started anonymously registers or logs in,
//! the cart and shipping draft saved under the anonymous identity follow the
//! user to the new one. Existing data on the target account wins; migrated
//! documents are stitched with `migratedFrom` for traceability.
//!
//! Migration is best-effort by design of the sign-in flow: a failed copy
//! must never block a login, so each half logs and moves on.

use chrono::Utc;
use tracing::{info, instrument, warn};

use chouxlab_core::Uid;

use crate::db::{cart_path, draft_path};
use crate::firebase::firestore::Value;
use crate::firebase::{FirestoreClient, FirestoreError};

/// Copy the anonymous cart and shipping draft to the new identity, then
/// delete the originals. No-op when the identities match.
#[instrument(skip(firestore, token))]
pub(crate) async fn migrate_anonymous_data(
    firestore: &FirestoreClient,
    token: &str,
    from: &Uid,
    to: &Uid,
) {
    if from == to {
        return;
    }

    if let Err(error) = migrate_cart(firestore, token, from, to).await {
        warn!(%from, %to, %error, "cart migration failed, continuing sign-in");
    }
    if let Err(error) = migrate_draft(firestore, token, from, to).await {
        warn!(%from, %to, %error, "draft migration failed, continuing sign-in");
    }
}

/// Move `carts/{from}` to `carts/{to}` unless the target already has one.
async fn migrate_cart(
    firestore: &FirestoreClient,
    token: &str,
    from: &Uid,
    to: &Uid,
) -> Result<(), FirestoreError> {
    let source_path = cart_path(from);
    let Some(source) = firestore.get_document(token, &source_path).await? else {
        return Ok(());
    };

    if firestore.get_document(token, &cart_path(to)).await?.is_none() {
        let mut fields = source.fields;
        fields.insert("migratedFrom".to_string(), Value::string(from.as_str()));
        fields.insert("updatedAt".to_string(), Value::Timestamp(Utc::now()));
        firestore.set_document(token, &cart_path(to), fields).await?;
        info!(%from, %to, "migrated anonymous cart");
    }

    firestore.delete_document(token, &source_path).await
}

/// Move the shipping draft, merge-writing so saved target fields survive.
async fn migrate_draft(
    firestore: &FirestoreClient,
    token: &str,
    from: &Uid,
    to: &Uid,
) -> Result<(), FirestoreError> {
    let source_path = draft_path(from);
    let Some(source) = firestore.get_document(token, &source_path).await? else {
        return Ok(());
    };

    if firestore.get_document(token, &draft_path(to)).await?.is_none() {
        let mut fields = source.fields;
        fields.insert("migratedFrom".to_string(), Value::string(from.as_str()));
        fields.insert("updatedAt".to_string(), Value::Timestamp(Utc::now()));
        firestore
            .merge_document(token, &draft_path(to), fields)
            .await?;
        info!(%from, %to, "migrated anonymous shipping draft");
    }

    firestore.delete_document(token, &source_path).await
}
