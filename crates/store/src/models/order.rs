//! Order domain types.

use chrono::{DateTime, Utc};

use chouxlab_core::{Money, OrderId, OrderStatus, Uid};

use super::{CartItems, ShippingDraft};

/// The caller-assembled payload for a new order.
///
/// The data layer stitches on the owner, the `pending` status, and the
/// creation timestamp; everything here is spread into the same document.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub items: CartItems,
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub total: Money,
    pub shipping: Option<ShippingDraft>,
    pub note: Option<String>,
}

/// An order document read back from the store.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub uid: Uid,
    pub status: OrderStatus,
    pub items: CartItems,
    pub subtotal: Money,
    pub shipping_fee: Money,
    pub total: Money,
    pub shipping: Option<ShippingDraft>,
    pub note: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
