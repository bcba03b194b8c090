//! Session commands.

use chouxlab_store::Store;

/// Show the current identity, bootstrapping a session if none exists.
pub async fn show(store: &Store) -> Result<(), Box<dyn std::error::Error>> {
    let uid = store.init_session().await?;

    println!("uid: {uid}");
    if let Some(user) = store.current_user() {
        println!(
            "kind: {}",
            if user.is_anonymous { "anonymous" } else { "account" }
        );
        if let Some(email) = &user.email {
            println!("email: {email}");
        }
        if let Some(name) = &user.display_name {
            println!("name: {name}");
        }
    }
    Ok(())
}

/// Sign out and forget the persisted session.
pub async fn logout(store: &Store) -> Result<(), Box<dyn std::error::Error>> {
    store.sign_out().await?;
    println!("signed out");
    Ok(())
}
