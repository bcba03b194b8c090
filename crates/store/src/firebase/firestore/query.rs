//! Structured query types for `documents:runQuery`.
//!
//! Only the slice of the query surface this layer uses is modeled: a single
//! collection selector, an `EQUAL` field filter, ordering, and a limit.

use serde::Serialize;

use super::Value;

/// A Firestore structured query, serialized exactly as the REST API expects.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    pub from: Vec<CollectionSelector>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<Order>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
}

impl StructuredQuery {
    /// Query a single collection.
    #[must_use]
    pub fn collection(collection_id: impl Into<String>) -> Self {
        Self {
            from: vec![CollectionSelector {
                collection_id: collection_id.into(),
            }],
            ..Self::default()
        }
    }

    /// Filter on `field == value`.
    #[must_use]
    pub fn where_eq(mut self, field_path: impl Into<String>, value: Value) -> Self {
        self.filter = Some(Filter::FieldFilter(FieldFilter {
            field: FieldReference {
                field_path: field_path.into(),
            },
            op: FilterOp::Equal,
            value,
        }));
        self
    }

    /// Order ascending on a field.
    #[must_use]
    pub fn order_by_asc(self, field_path: impl Into<String>) -> Self {
        self.order_by(field_path, Direction::Ascending)
    }

    /// Order descending on a field.
    #[must_use]
    pub fn order_by_desc(self, field_path: impl Into<String>) -> Self {
        self.order_by(field_path, Direction::Descending)
    }

    /// Cap the number of returned documents.
    #[must_use]
    pub const fn limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }

    fn order_by(mut self, field_path: impl Into<String>, direction: Direction) -> Self {
        self.order_by.push(Order {
            field: FieldReference {
                field_path: field_path.into(),
            },
            direction,
        });
        self
    }
}

/// Selects documents from a single collection under the query parent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelector {
    pub collection_id: String,
}

/// A query filter. Only field filters are modeled.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Filter {
    FieldFilter(FieldFilter),
}

/// `field op value`.
#[derive(Debug, Clone, Serialize)]
pub struct FieldFilter {
    pub field: FieldReference,
    pub op: FilterOp,
    pub value: Value,
}

/// A dotted field path.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    pub field_path: String,
}

/// Filter operators in use.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOp {
    Equal,
}

/// An ordering clause.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub field: FieldReference,
    pub direction: Direction,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Ascending,
    Descending,
}
