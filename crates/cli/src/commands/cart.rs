//! Cart commands.

use chouxlab_core::ProductId;
use chouxlab_store::Store;
use chouxlab_store::models::CartItems;

/// Print the cart.
pub async fn show(store: &Store) -> Result<(), Box<dyn std::error::Error>> {
    let items = store.cart().await?;
    print_items(&items);
    Ok(())
}

/// Add quantity for a product and save.
pub async fn add(
    store: &Store,
    product: String,
    quantity: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut items = store.cart().await?;
    items.add(ProductId::new(product), quantity);
    store.set_cart(items.clone()).await?;
    print_items(&items);
    Ok(())
}

/// Remove a product and save.
pub async fn remove(store: &Store, product: String) -> Result<(), Box<dyn std::error::Error>> {
    let mut items = store.cart().await?;
    items.remove(&ProductId::new(product));
    store.set_cart(items.clone()).await?;
    print_items(&items);
    Ok(())
}

/// Empty the cart.
pub async fn clear(store: &Store) -> Result<(), Box<dyn std::error::Error>> {
    store.clear_cart().await?;
    println!("cart cleared");
    Ok(())
}

fn print_items(items: &CartItems) {
    if items.is_empty() {
        println!("cart is empty");
        return;
    }
    for (product, quantity) in items.iter() {
        println!("{quantity:>4} x {product}");
    }
}
