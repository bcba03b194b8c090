//! Order commands.

use rust_decimal::Decimal;

use chouxlab_core::{CurrencyCode, Money};
use chouxlab_store::Store;
use chouxlab_store::models::NewOrder;

/// List orders, newest first.
pub async fn list(store: &Store, limit: u32) -> Result<(), Box<dyn std::error::Error>> {
    let orders = store.my_orders(Some(limit)).await?;
    if orders.is_empty() {
        println!("no orders yet");
        return Ok(());
    }

    for order in orders {
        let placed = order
            .created_at
            .map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d %H:%M").to_string());
        println!("{}  {}  {}  {placed}", order.id, order.status, order.total);
    }
    Ok(())
}

/// Place an order from the current cart.
pub async fn place(
    store: &Store,
    subtotal: Decimal,
    shipping_fee: Decimal,
    total: Option<Decimal>,
    currency: CurrencyCode,
    note: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let items = store.cart().await?;
    if items.is_empty() {
        return Err("the cart is empty; add items before placing an order".into());
    }

    let subtotal = Money::new(subtotal, currency);
    let shipping_fee = Money::new(shipping_fee, currency);
    let total = match total {
        Some(amount) => Money::new(amount, currency),
        None => subtotal
            .checked_add(shipping_fee)
            .ok_or("order total overflows")?,
    };

    let order = NewOrder {
        items,
        subtotal,
        shipping_fee,
        total,
        shipping: store.load_shipping_draft().await?,
        note,
    };

    let id = store.place_order(&order).await?;
    println!("order placed: {id}");
    Ok(())
}
