//! Integration tests for cart reads and writes.
//!
//! These tests require the Firebase emulators (Auth + Firestore).
//! Run with: `cargo test -p chouxlab-integration-tests -- --ignored`

use chouxlab_core::ProductId;
use chouxlab_integration_tests::emulator_store;
use chouxlab_store::models::CartItems;

#[tokio::test]
#[ignore = "Requires the Firebase emulator"]
async fn test_cart_roundtrip() {
    let store = emulator_store();
    store.init_session().await.expect("bootstrap failed");

    assert!(store.cart().await.expect("read failed").is_empty());

    let items: CartItems = [
        (ProductId::new("vanilla-choux"), 2),
        (ProductId::new("matcha-choux"), 1),
    ]
    .into_iter()
    .collect();
    store.set_cart(items.clone()).await.expect("save failed");

    let read = store.cart().await.expect("read failed");
    assert_eq!(read, items);
}

#[tokio::test]
#[ignore = "Requires the Firebase emulator"]
async fn test_cart_save_replaces_whole_document() {
    let store = emulator_store();
    store.init_session().await.expect("bootstrap failed");

    let first: CartItems = [
        (ProductId::new("vanilla-choux"), 2),
        (ProductId::new("matcha-choux"), 1),
    ]
    .into_iter()
    .collect();
    store.set_cart(first).await.expect("save failed");

    // Saving a cart without matcha must drop it remotely
    let second: CartItems = [(ProductId::new("vanilla-choux"), 3)].into_iter().collect();
    store.set_cart(second.clone()).await.expect("save failed");

    let read = store.cart().await.expect("read failed");
    assert_eq!(read, second);
    assert_eq!(read.quantity(&ProductId::new("matcha-choux")), 0);
}

#[tokio::test]
#[ignore = "Requires the Firebase emulator"]
async fn test_saving_an_empty_cart_deletes_it() {
    let store = emulator_store();
    store.init_session().await.expect("bootstrap failed");

    let items: CartItems = [(ProductId::new("vanilla-choux"), 1)].into_iter().collect();
    store.set_cart(items).await.expect("save failed");

    store.set_cart(CartItems::new()).await.expect("save failed");
    assert!(store.cart().await.expect("read failed").is_empty());

    // Clearing an already-empty cart is a no-op, not an error
    store.clear_cart().await.expect("clear failed");
}

#[tokio::test]
#[ignore = "Requires the Firebase emulator"]
async fn test_zero_quantities_are_dropped_on_save() {
    let store = emulator_store();
    store.init_session().await.expect("bootstrap failed");

    let mut items = CartItems::new();
    items.set(ProductId::new("vanilla-choux"), 2);
    items.set(ProductId::new("matcha-choux"), 0);
    store.set_cart(items).await.expect("save failed");

    let read = store.cart().await.expect("read failed");
    assert_eq!(read.len(), 1);
    assert_eq!(read.quantity(&ProductId::new("vanilla-choux")), 2);
}
