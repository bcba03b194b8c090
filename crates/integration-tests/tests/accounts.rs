//! Integration tests for registration, login, and anonymous-data migration.
//!
//! These tests require the Firebase emulators (Auth + Firestore).
//! Run with: `cargo test -p chouxlab-integration-tests -- --ignored`

use chouxlab_core::ProductId;
use chouxlab_integration_tests::{emulator_store, unique_email};
use chouxlab_store::StoreError;
use chouxlab_store::models::{CartItems, ShippingDraft};
use chouxlab_store::services::accounts::{AccountError, Registration};

#[tokio::test]
#[ignore = "Requires the Firebase emulator"]
async fn test_register_upgrades_the_session() {
    let store = emulator_store();
    let anonymous_uid = store.init_session().await.expect("bootstrap failed");

    let email = unique_email("register");
    let user = store
        .register_with_email(&Registration {
            name: Some("Som Chai".to_string()),
            email: email.clone(),
            password: "secret123".to_string(),
            phone: Some("+66912345678".to_string()),
        })
        .await
        .expect("registration failed");

    assert!(!user.is_anonymous);
    assert_ne!(user.uid, anonymous_uid);
    assert_eq!(user.email.as_deref(), Some(email.as_str()));
    assert_eq!(user.display_name.as_deref(), Some("Som Chai"));

    // Registration writes the profile document
    let profile = store
        .my_profile()
        .await
        .expect("profile read failed")
        .expect("profile missing after registration");
    assert_eq!(profile.email.as_deref(), Some(email.as_str()));
    assert_eq!(profile.phone.as_deref(), Some("+66912345678"));
    assert_eq!(profile.total_orders, 0);
}

#[tokio::test]
#[ignore = "Requires the Firebase emulator"]
async fn test_anonymous_cart_and_draft_follow_the_user() {
    let store = emulator_store();
    store.init_session().await.expect("bootstrap failed");

    let items: CartItems = [(ProductId::new("vanilla-choux"), 2)].into_iter().collect();
    store.set_cart(items.clone()).await.expect("save failed");
    store
        .save_shipping_draft(&ShippingDraft {
            city: Some("Bangkok".to_string()),
            ..ShippingDraft::default()
        })
        .await
        .expect("save failed");

    store
        .register_with_email(&Registration {
            name: None,
            email: unique_email("migrate"),
            password: "secret123".to_string(),
            phone: None,
        })
        .await
        .expect("registration failed");

    // Same cart and draft, now under the new identity
    assert_eq!(store.cart().await.expect("read failed"), items);
    let draft = store
        .load_shipping_draft()
        .await
        .expect("load failed")
        .expect("draft missing after migration");
    assert_eq!(draft.city.as_deref(), Some("Bangkok"));
}

#[tokio::test]
#[ignore = "Requires the Firebase emulator"]
async fn test_login_returns_to_an_existing_account() {
    let store = emulator_store();
    store.init_session().await.expect("bootstrap failed");

    let email = unique_email("login");
    let registered = store
        .register_with_email(&Registration {
            name: None,
            email: email.clone(),
            password: "secret123".to_string(),
            phone: None,
        })
        .await
        .expect("registration failed");

    store.sign_out().await.expect("sign out failed");

    let logged_in = store
        .login_with_email(&email, "secret123")
        .await
        .expect("login failed");
    assert_eq!(logged_in.uid, registered.uid);
    assert!(!logged_in.is_anonymous);
}

#[tokio::test]
#[ignore = "Requires the Firebase emulator"]
async fn test_wrong_password_is_rejected() {
    let store = emulator_store();

    let email = unique_email("badpass");
    store
        .register_with_email(&Registration {
            name: None,
            email: email.clone(),
            password: "secret123".to_string(),
            phone: None,
        })
        .await
        .expect("registration failed");
    store.sign_out().await.expect("sign out failed");

    let result = store.login_with_email(&email, "wrong-password").await;
    assert!(matches!(
        result,
        Err(StoreError::Account(AccountError::Auth(_)))
    ));
}

#[tokio::test]
#[ignore = "Requires the Firebase emulator"]
async fn test_duplicate_email_is_rejected() {
    let store = emulator_store();

    let email = unique_email("dup");
    let registration = Registration {
        name: None,
        email,
        password: "secret123".to_string(),
        phone: None,
    };
    store
        .register_with_email(&registration)
        .await
        .expect("registration failed");
    store.sign_out().await.expect("sign out failed");

    let result = store.register_with_email(&registration).await;
    assert!(matches!(
        result,
        Err(StoreError::Account(AccountError::Auth(
            chouxlab_store::firebase::AuthError::EmailExists
        )))
    ));
}

#[tokio::test]
#[ignore = "Requires the Firebase emulator"]
async fn test_short_password_never_leaves_the_process() {
    let store = emulator_store();

    let result = store
        .register_with_email(&Registration {
            name: None,
            email: unique_email("short"),
            password: "12345".to_string(),
            phone: None,
        })
        .await;
    assert!(matches!(
        result,
        Err(StoreError::Account(AccountError::PasswordTooShort { .. }))
    ));
}
