//! Integration tests for session bootstrap, restore, and sign-out.
//!
//! These tests require the Firebase emulators (Auth + Firestore).
//! Run with: `cargo test -p chouxlab-integration-tests -- --ignored`

use chouxlab_core::Uid;
use chouxlab_integration_tests::{emulator_config, emulator_store};
use chouxlab_store::Store;
use chouxlab_store::session::{CurrentUser, FileSessionStore, PersistedSession, SessionStore};

#[tokio::test]
#[ignore = "Requires the Firebase emulator"]
async fn test_anonymous_bootstrap_is_idempotent() {
    let store = emulator_store();

    let first = store.init_session().await.expect("bootstrap failed");
    let second = store.init_session().await.expect("second init failed");
    assert_eq!(first, second, "init_session must not mint a new identity");

    let user = store.current_user().expect("no current user after init");
    assert!(user.is_anonymous);
    assert_eq!(user.uid, first);
}

#[tokio::test]
#[ignore = "Requires the Firebase emulator"]
async fn test_sign_out_starts_a_fresh_identity() {
    let store = emulator_store();

    let before = store.init_session().await.expect("bootstrap failed");
    store.sign_out().await.expect("sign out failed");
    assert!(store.current_user().is_none());

    let after = store.init_session().await.expect("re-bootstrap failed");
    assert_ne!(before, after, "sign-out must not resurrect the old identity");
}

#[tokio::test]
#[ignore = "Requires the Firebase emulator"]
async fn test_persisted_session_restores_across_stores() {
    let dir = std::env::temp_dir().join(format!("chouxlab-it-{}", uuid::Uuid::new_v4().simple()));
    let path = dir.join("session.json");

    let first = Store::with_session_store(
        emulator_config(),
        Box::new(FileSessionStore::new(path.clone())),
    );
    let uid = first.init_session().await.expect("bootstrap failed");

    // A second store over the same file restores the same identity
    let second = Store::with_session_store(
        emulator_config(),
        Box::new(FileSessionStore::new(path.clone())),
    );
    let restored = second.init_session().await.expect("restore failed");
    assert_eq!(uid, restored);

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
#[ignore = "Requires the Firebase emulator"]
async fn test_rejected_refresh_falls_back_to_anonymous() {
    let dir = std::env::temp_dir().join(format!("chouxlab-it-{}", uuid::Uuid::new_v4().simple()));
    let path = dir.join("session.json");

    // Seed a persisted session whose refresh token the provider will reject
    let seed = FileSessionStore::new(path.clone());
    seed.save(&PersistedSession {
        refresh_token: "stale-refresh-token".to_string(),
        user: CurrentUser {
            uid: Uid::new("departed-user"),
            email: None,
            display_name: None,
            photo_url: None,
            is_anonymous: true,
        },
    })
    .expect("seeding the session file failed");

    let store = Store::with_session_store(
        emulator_config(),
        Box::new(FileSessionStore::new(path.clone())),
    );
    let uid = store.init_session().await.expect("fallback bootstrap failed");
    assert_ne!(
        uid.as_str(),
        "departed-user",
        "a rejected refresh must mint a fresh identity"
    );

    let user = store.current_user().expect("no current user after init");
    assert!(user.is_anonymous);

    // The stale session on disk was replaced by the fresh anonymous one
    let persisted = seed
        .load()
        .expect("reading the session file failed")
        .expect("fresh session was not persisted");
    assert_eq!(persisted.user.uid, uid);
    assert_ne!(persisted.refresh_token, "stale-refresh-token");

    std::fs::remove_dir_all(&dir).ok();
}
