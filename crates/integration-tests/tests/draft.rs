//! Integration tests for the shipping-address draft.
//!
//! These tests require the Firebase emulators (Auth + Firestore).
//! Run with: `cargo test -p chouxlab-integration-tests -- --ignored`

use chouxlab_integration_tests::emulator_store;
use chouxlab_store::models::ShippingDraft;

#[tokio::test]
#[ignore = "Requires the Firebase emulator"]
async fn test_draft_is_merged_across_saves() {
    let store = emulator_store();
    store.init_session().await.expect("bootstrap failed");

    assert!(store.load_shipping_draft().await.expect("load failed").is_none());

    store
        .save_shipping_draft(&ShippingDraft {
            full_name: Some("Som Chai".to_string()),
            ..ShippingDraft::default()
        })
        .await
        .expect("save failed");

    // A later partial save must not wipe the name
    store
        .save_shipping_draft(&ShippingDraft {
            city: Some("Bangkok".to_string()),
            postal_code: Some("10110".to_string()),
            ..ShippingDraft::default()
        })
        .await
        .expect("save failed");

    let draft = store
        .load_shipping_draft()
        .await
        .expect("load failed")
        .expect("draft missing");
    assert_eq!(draft.full_name.as_deref(), Some("Som Chai"));
    assert_eq!(draft.city.as_deref(), Some("Bangkok"));
    assert_eq!(draft.postal_code.as_deref(), Some("10110"));
}

#[tokio::test]
#[ignore = "Requires the Firebase emulator"]
async fn test_draft_overwrites_changed_fields() {
    let store = emulator_store();
    store.init_session().await.expect("bootstrap failed");

    store
        .save_shipping_draft(&ShippingDraft {
            city: Some("Bangkok".to_string()),
            ..ShippingDraft::default()
        })
        .await
        .expect("save failed");

    store
        .save_shipping_draft(&ShippingDraft {
            city: Some("Chiang Mai".to_string()),
            ..ShippingDraft::default()
        })
        .await
        .expect("save failed");

    let draft = store
        .load_shipping_draft()
        .await
        .expect("load failed")
        .expect("draft missing");
    assert_eq!(draft.city.as_deref(), Some("Chiang Mai"));
}
