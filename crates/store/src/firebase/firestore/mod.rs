//! Cloud Firestore REST client.
//!
//! Documents are addressed by path under the project's default database
//! (`projects/{project}/databases/(default)/documents/{path}`). Every call
//! carries the session's ID token as a bearer credential; access control is
//! the backend's security rules, not this client.
//!
//! Write semantics follow the hosted SDK:
//!
//! - `set_document` PATCHes without an update mask - a whole-document
//!   overwrite, removed keys disappear
//! - `merge_document` PATCHes with `updateMask.fieldPaths` for each
//!   top-level field - untouched fields survive
//! - `create_document` POSTs with an explicit `documentId` and surfaces
//!   `ALREADY_EXISTS` as [`FirestoreError::Conflict`]

mod query;
mod value;

pub use query::StructuredQuery;
pub use value::{Fields, Value};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::StoreConfig;

/// Length of client-generated document IDs (the hosted SDK's `addDoc`
/// behavior).
const AUTO_ID_LENGTH: usize = 20;

/// Errors returned by the document store.
#[derive(Debug, Error)]
pub enum FirestoreError {
    /// Transport-level failure.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend error not covered by a typed variant.
    #[error("firestore error {code} ({status}): {message}")]
    Api {
        code: u16,
        status: String,
        message: String,
    },

    /// A create targeted an existing document.
    #[error("document already exists: {0}")]
    Conflict(String),

    /// A response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

/// A Firestore document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name
    /// (`projects/{p}/databases/(default)/documents/{path}`).
    pub name: String,
    #[serde(default)]
    pub fields: Fields,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
}

impl Document {
    /// The last path segment of the resource name.
    #[must_use]
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// One entry of a streamed `runQuery` result. Entries without a `document`
/// key (read-time progress markers) are skipped.
#[derive(Debug, Deserialize)]
struct RunQueryEntry {
    document: Option<Document>,
}

/// Firestore error envelope.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: u16,
    message: String,
    #[serde(default)]
    status: String,
}

/// Client for the Cloud Firestore REST surface.
#[derive(Clone)]
pub struct FirestoreClient {
    inner: Arc<FirestoreClientInner>,
}

struct FirestoreClientInner {
    client: reqwest::Client,
    base_url: String,
    documents_root: String,
}

impl FirestoreClient {
    /// Create a new document store client.
    #[must_use]
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            inner: Arc::new(FirestoreClientInner {
                client: reqwest::Client::new(),
                base_url: config.firestore_base_url(),
                documents_root: config.documents_root(),
            }),
        }
    }

    /// Read a document. Returns `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `FirestoreError` on transport or backend failures.
    #[instrument(skip(self, token))]
    pub async fn get_document(
        &self,
        token: &str,
        path: &str,
    ) -> Result<Option<Document>, FirestoreError> {
        let response = self
            .inner
            .client
            .get(self.document_url(path))
            .bearer_auth(token)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let document = Self::decode_document(response).await?;
        Ok(Some(document))
    }

    /// Overwrite a document (PATCH without an update mask). Removed keys
    /// disappear. Creates the document when absent.
    ///
    /// # Errors
    ///
    /// Returns `FirestoreError` on transport or backend failures.
    #[instrument(skip(self, token, fields))]
    pub async fn set_document(
        &self,
        token: &str,
        path: &str,
        fields: Fields,
    ) -> Result<Document, FirestoreError> {
        let response = self
            .inner
            .client
            .patch(self.document_url(path))
            .bearer_auth(token)
            .json(&serde_json::json!({ "fields": fields }))
            .send()
            .await?;
        Self::decode_document(response).await
    }

    /// Merge fields into a document (PATCH with `updateMask.fieldPaths` for
    /// each top-level field). Untouched fields survive. Creates the document
    /// when absent.
    ///
    /// # Errors
    ///
    /// Returns `FirestoreError` on transport or backend failures.
    #[instrument(skip(self, token, fields))]
    pub async fn merge_document(
        &self,
        token: &str,
        path: &str,
        fields: Fields,
    ) -> Result<Document, FirestoreError> {
        let mask: Vec<(&str, &str)> = fields
            .keys()
            .map(|key| ("updateMask.fieldPaths", key.as_str()))
            .collect();

        let response = self
            .inner
            .client
            .patch(self.document_url(path))
            .query(&mask)
            .bearer_auth(token)
            .json(&serde_json::json!({ "fields": fields }))
            .send()
            .await?;
        Self::decode_document(response).await
    }

    /// Delete a document. Idempotent: deleting a missing document succeeds.
    ///
    /// # Errors
    ///
    /// Returns `FirestoreError` on transport or backend failures.
    #[instrument(skip(self, token))]
    pub async fn delete_document(&self, token: &str, path: &str) -> Result<(), FirestoreError> {
        let response = self
            .inner
            .client
            .delete(self.document_url(path))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
            debug!(path, "document deleted");
            return Ok(());
        }
        Err(Self::decode_error(response).await)
    }

    /// Create a document with an explicit ID.
    ///
    /// # Errors
    ///
    /// Returns `FirestoreError::Conflict` when the document already exists.
    #[instrument(skip(self, token, fields))]
    pub async fn create_document(
        &self,
        token: &str,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Document, FirestoreError> {
        let url = format!(
            "{}/{}/{collection}",
            self.inner.base_url, self.inner.documents_root
        );

        let response = self
            .inner
            .client
            .post(&url)
            .query(&[("documentId", id)])
            .bearer_auth(token)
            .json(&serde_json::json!({ "fields": fields }))
            .send()
            .await?;
        Self::decode_document(response).await
    }

    /// Run a structured query under the documents root. Returns the matched
    /// documents in result order.
    ///
    /// # Errors
    ///
    /// Returns `FirestoreError` on transport or backend failures.
    #[instrument(skip(self, token, query))]
    pub async fn run_query(
        &self,
        token: &str,
        query: &StructuredQuery,
    ) -> Result<Vec<Document>, FirestoreError> {
        let url = format!(
            "{}/{}:runQuery",
            self.inner.base_url, self.inner.documents_root
        );

        let response = self
            .inner
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&serde_json::json!({ "structuredQuery": query }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }

        let entries: Vec<RunQueryEntry> = response.json().await?;
        Ok(entries.into_iter().filter_map(|e| e.document).collect())
    }

    fn document_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{path}",
            self.inner.base_url, self.inner.documents_root
        )
    }

    async fn decode_document(response: reqwest::Response) -> Result<Document, FirestoreError> {
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        response.json().await.map_err(FirestoreError::Http)
    }

    async fn decode_error(response: reqwest::Response) -> FirestoreError {
        let code = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();

        serde_json::from_str::<ErrorEnvelope>(&text).map_or_else(
            |_| FirestoreError::Api {
                code,
                status: String::new(),
                message: text.clone(),
            },
            |envelope| {
                if envelope.error.status == "ALREADY_EXISTS" {
                    FirestoreError::Conflict(envelope.error.message)
                } else {
                    FirestoreError::Api {
                        code: envelope.error.code,
                        status: envelope.error.status,
                        message: envelope.error.message,
                    }
                }
            },
        )
    }
}

/// Generate a 20-character document ID from the 62-character alphanumeric
/// alphabet, client-side.
#[must_use]
pub fn auto_id() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(AUTO_ID_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_id_shape() {
        let id = auto_id();
        assert_eq!(id.len(), AUTO_ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_auto_ids_are_unique_enough() {
        let a = auto_id();
        let b = auto_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_document_id_from_name() {
        let doc = Document {
            name: "projects/p/databases/(default)/documents/orders/x7pT2rLqWnYsUvEhGjKm"
                .to_string(),
            fields: Fields::new(),
            create_time: None,
            update_time: None,
        };
        assert_eq!(doc.id(), "x7pT2rLqWnYsUvEhGjKm");
    }

    #[test]
    fn test_run_query_entries_skip_non_documents() {
        let json = r#"[
            {"readTime": "2024-11-05T09:30:00Z"},
            {"document": {"name": "projects/p/databases/(default)/documents/orders/abc",
                          "fields": {}},
             "readTime": "2024-11-05T09:30:00Z"}
        ]"#;
        let entries: Vec<RunQueryEntry> = serde_json::from_str(json).unwrap();
        let documents: Vec<_> = entries.into_iter().filter_map(|e| e.document).collect();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].id(), "abc");
    }

    #[test]
    fn test_error_envelope_conflict() {
        let json = r#"{"error": {"code": 409, "message": "Document already exists", "status": "ALREADY_EXISTS"}}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.error.status, "ALREADY_EXISTS");
        assert_eq!(envelope.error.code, 409);
    }
}
