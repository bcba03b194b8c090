//! Account commands: registration, login, profile.

use chouxlab_store::Store;
use chouxlab_store::models::ProfileExtra;
use chouxlab_store::services::accounts::Registration;
use chouxlab_store::session::CurrentUser;

/// Register an email/password account. The anonymous cart and draft, if
/// any, follow the user to the new account.
pub async fn register(
    store: &Store,
    email: String,
    password: String,
    name: Option<String>,
    phone: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = store
        .register_with_email(&Registration {
            name,
            email,
            password,
            phone,
        })
        .await?;
    print_signed_in(&user);
    Ok(())
}

/// Log in with email/password or a Google ID token.
pub async fn login(
    store: &Store,
    email: Option<String>,
    password: Option<String>,
    google_token: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = if let Some(token) = google_token {
        store.login_with_google(&token).await?
    } else {
        let (Some(email), Some(password)) = (email, password) else {
            return Err("login needs --email and --password, or --google-token".into());
        };
        store.login_with_email(&email, &password).await?
    };
    print_signed_in(&user);
    Ok(())
}

/// Show the profile, writing the phone number first when given.
pub async fn profile(
    store: &Store,
    phone: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let profile = if phone.is_some() {
        Some(store.ensure_profile(&ProfileExtra { phone }).await?)
    } else {
        store.my_profile().await?
    };

    let Some(profile) = profile else {
        println!("no profile yet; it is created on registration or login");
        return Ok(());
    };

    println!("uid: {}", profile.uid);
    println!("email: {}", profile.email.as_deref().unwrap_or("-"));
    println!("name: {}", profile.display_name.as_deref().unwrap_or("-"));
    println!("phone: {}", profile.phone.as_deref().unwrap_or("-"));
    println!("points: {}", profile.points);
    println!("orders: {}", profile.total_orders);
    Ok(())
}

fn print_signed_in(user: &CurrentUser) {
    println!("signed in as {}", user.uid);
    if let Some(email) = &user.email {
        println!("email: {email}");
    }
    if let Some(name) = &user.display_name {
        println!("name: {name}");
    }
}
