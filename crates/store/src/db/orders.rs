//! Order repository.
//!
//! Orders are append-only documents under `orders/{generated id}`. The order
//! payload is spread into the document alongside the stitched owner, status,
//! and creation timestamp. Amounts are written as doubles, matching what
//! earlier clients produced, and decoded leniently.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use tracing::{instrument, warn};

use chouxlab_core::{CurrencyCode, Money, OrderId, OrderStatus, Uid};

use super::{RepositoryError, carts, from_fields, to_fields};
use crate::firebase::FirestoreClient;
use crate::firebase::firestore::{self, Document, Fields, StructuredQuery, Value};
use crate::models::{CartItems, NewOrder, Order};

/// Repository for the `orders` collection.
pub struct OrderRepository<'a> {
    firestore: &'a FirestoreClient,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(firestore: &'a FirestoreClient) -> Self {
        Self { firestore }
    }

    /// Create an order document with a client-generated ID, stitched with
    /// the owner, `pending` status, and `createdAt`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Firestore` if the write fails (including
    /// the vanishingly unlikely generated-ID collision).
    #[instrument(skip(self, token, order))]
    pub async fn create(
        &self,
        token: &str,
        uid: &Uid,
        order: &NewOrder,
    ) -> Result<OrderId, RepositoryError> {
        let id = firestore::auto_id();

        let mut fields = encode_new_order(order)?;
        fields.insert("uid".to_string(), Value::string(uid.as_str()));
        fields.insert(
            "status".to_string(),
            Value::string(OrderStatus::Pending.to_string()),
        );
        fields.insert("createdAt".to_string(), Value::Timestamp(Utc::now()));

        self.firestore
            .create_document(token, "orders", &id, fields)
            .await?;
        Ok(OrderId::new(id))
    }

    /// List the caller's orders, newest first. Documents that fail to
    /// decode are skipped with a warning rather than failing the listing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Firestore` if the query fails.
    #[instrument(skip(self, token))]
    pub async fn list_for_user(
        &self,
        token: &str,
        uid: &Uid,
        limit: u32,
    ) -> Result<Vec<Order>, RepositoryError> {
        let query = StructuredQuery::collection("orders")
            .where_eq("uid", Value::string(uid.as_str()))
            .order_by_desc("createdAt")
            .limit(i32::try_from(limit).unwrap_or(i32::MAX));

        let documents = self.firestore.run_query(token, &query).await?;

        Ok(documents
            .iter()
            .filter_map(|document| match decode_order(document) {
                Ok(order) => Some(order),
                Err(error) => {
                    warn!(id = document.id(), %error, "skipping undecodable order");
                    None
                }
            })
            .collect())
    }
}

fn encode_new_order(order: &NewOrder) -> Result<Fields, RepositoryError> {
    let mut fields = Fields::new();
    fields.insert("items".to_string(), carts::encode_items(&order.items));
    fields.insert("subtotal".to_string(), money_value(order.subtotal));
    fields.insert("shippingFee".to_string(), money_value(order.shipping_fee));
    fields.insert("total".to_string(), money_value(order.total));
    fields.insert(
        "currency".to_string(),
        Value::string(order.total.currency_code.to_string()),
    );
    if let Some(shipping) = &order.shipping {
        fields.insert("shipping".to_string(), Value::Map(to_fields(shipping)?));
    }
    if let Some(note) = &order.note {
        fields.insert("note".to_string(), Value::string(note));
    }
    Ok(fields)
}

fn money_value(money: Money) -> Value {
    Value::Double(money.amount.to_f64().unwrap_or(0.0))
}

fn decode_order(document: &Document) -> Result<Order, RepositoryError> {
    let fields = &document.fields;

    let uid = fields
        .get("uid")
        .and_then(Value::as_str)
        .ok_or_else(|| RepositoryError::DataCorruption("order is missing uid".to_string()))?;

    let status = match fields.get("status").and_then(Value::as_str) {
        Some(raw) => raw
            .parse::<OrderStatus>()
            .map_err(RepositoryError::DataCorruption)?,
        None => OrderStatus::default(),
    };

    let currency = fields
        .get("currency")
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse::<CurrencyCode>().ok())
        .unwrap_or_default();

    let items = fields
        .get("items")
        .and_then(Value::as_map)
        .map(carts::decode_items)
        .unwrap_or_else(CartItems::new);

    let shipping = fields
        .get("shipping")
        .and_then(Value::as_map)
        .map(from_fields)
        .transpose()?;

    Ok(Order {
        id: OrderId::new(document.id()),
        uid: Uid::new(uid),
        status,
        items,
        subtotal: money_field(fields, "subtotal", currency)?,
        shipping_fee: money_field(fields, "shippingFee", currency)?,
        total: money_field(fields, "total", currency)?,
        shipping,
        note: fields
            .get("note")
            .and_then(Value::as_str)
            .map(str::to_owned),
        created_at: fields.get("createdAt").and_then(Value::as_timestamp),
    })
}

/// Decode an amount leniently: integer, double, or numeric string. A missing
/// field is zero, matching how earlier readers treated absent amounts.
fn money_field(
    fields: &Fields,
    key: &str,
    currency: CurrencyCode,
) -> Result<Money, RepositoryError> {
    let amount = match fields.get(key) {
        None | Some(Value::Null) => Decimal::ZERO,
        Some(Value::Integer(i)) => Decimal::from(*i),
        Some(Value::Double(d)) => Decimal::from_f64(*d).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("{key} is not a finite amount: {d}"))
        })?,
        Some(Value::String(s)) => s.trim().parse::<Decimal>().map_err(|e| {
            RepositoryError::DataCorruption(format!("{key} does not parse as an amount: {e}"))
        })?,
        Some(other) => {
            return Err(RepositoryError::DataCorruption(format!(
                "{key} has a non-numeric value: {other:?}"
            )));
        }
    };
    Ok(Money::new(amount, currency))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chouxlab_core::ProductId;
    use rust_decimal::dec;

    fn order_document(fields: Fields) -> Document {
        Document {
            name: "projects/p/databases/(default)/documents/orders/x7pT2rLqWnYsUvEhGjKm"
                .to_string(),
            fields,
            create_time: None,
            update_time: None,
        }
    }

    fn sample_new_order() -> NewOrder {
        NewOrder {
            items: [(ProductId::new("vanilla"), 2)].into_iter().collect(),
            subtotal: Money::new(dec!(120), CurrencyCode::THB),
            shipping_fee: Money::new(dec!(35.50), CurrencyCode::THB),
            total: Money::new(dec!(155.50), CurrencyCode::THB),
            shipping: None,
            note: Some("no candles".to_string()),
        }
    }

    #[test]
    fn test_encode_new_order() {
        let fields = encode_new_order(&sample_new_order()).unwrap();

        assert_eq!(fields.get("total"), Some(&Value::Double(155.5)));
        assert_eq!(fields.get("currency"), Some(&Value::string("THB")));
        assert_eq!(fields.get("note"), Some(&Value::string("no candles")));
        assert!(!fields.contains_key("shipping"));
        // owner/status/createdAt are stitched by create(), not the payload
        assert!(!fields.contains_key("uid"));
        assert!(!fields.contains_key("status"));
    }

    #[test]
    fn test_decode_order_roundtrip() {
        let mut fields = encode_new_order(&sample_new_order()).unwrap();
        fields.insert("uid".to_string(), Value::string("abc123"));
        fields.insert("status".to_string(), Value::string("pending"));
        fields.insert("createdAt".to_string(), Value::Timestamp(Utc::now()));

        let order = decode_order(&order_document(fields)).unwrap();
        assert_eq!(order.id.as_str(), "x7pT2rLqWnYsUvEhGjKm");
        assert_eq!(order.uid.as_str(), "abc123");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total.amount, dec!(155.5));
        assert_eq!(order.items.quantity(&ProductId::new("vanilla")), 2);
        assert!(order.created_at.is_some());
    }

    #[test]
    fn test_decode_order_missing_uid_is_corruption() {
        let fields = encode_new_order(&sample_new_order()).unwrap();
        let result = decode_order(&order_document(fields));
        assert!(matches!(result, Err(RepositoryError::DataCorruption(_))));
    }

    #[test]
    fn test_money_field_lenient_decode() {
        let mut fields = Fields::new();
        fields.insert("subtotal".to_string(), Value::Integer(120));
        fields.insert("shippingFee".to_string(), Value::string("35.50"));

        let subtotal = money_field(&fields, "subtotal", CurrencyCode::THB).unwrap();
        assert_eq!(subtotal.amount, dec!(120));

        let fee = money_field(&fields, "shippingFee", CurrencyCode::THB).unwrap();
        assert_eq!(fee.amount, dec!(35.50));

        let missing = money_field(&fields, "total", CurrencyCode::THB).unwrap();
        assert_eq!(missing.amount, Decimal::ZERO);
    }

    #[test]
    fn test_money_field_rejects_non_numeric() {
        let mut fields = Fields::new();
        fields.insert("total".to_string(), Value::Boolean(true));
        assert!(money_field(&fields, "total", CurrencyCode::THB).is_err());
    }
}
