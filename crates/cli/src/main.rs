//! Chouxlab CLI - storefront sessions, carts, drafts, and orders.
//!
//! # Usage
//!
//! ```bash
//! # Start (or show) the session; first use creates an anonymous identity
//! chouxlab session
//!
//! # Upgrade the session to a real account; cart and draft follow
//! chouxlab register -e user@example.com -p secret123 -n "Som Chai"
//!
//! # Shopping
//! chouxlab cart add vanilla-choux 2
//! chouxlab draft save --full-name "Som Chai" --city Bangkok
//! chouxlab orders place --subtotal 240 --shipping-fee 40
//! chouxlab orders list
//! ```
//!
//! # Environment Variables
//!
//! See `chouxlab-store`: `FIREBASE_PROJECT_ID`, `FIREBASE_API_KEY`, the
//! emulator hosts, and `CHOUXLAB_SESSION_FILE` for a persistent session.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use chouxlab_core::CurrencyCode;
use chouxlab_store::{Store, StoreConfig};

mod commands;

#[derive(Parser)]
#[command(name = "chouxlab")]
#[command(author, version, about = "Chouxlab storefront tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current session, starting one if needed
    Session,
    /// Register an email/password account
    Register {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 6 characters)
        #[arg(short, long)]
        password: String,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,

        /// Phone number for the profile
        #[arg(long)]
        phone: Option<String>,
    },
    /// Log in with email/password or a Google ID token
    Login {
        /// Email address
        #[arg(short, long, requires = "password")]
        email: Option<String>,

        /// Password
        #[arg(short, long, requires = "email")]
        password: Option<String>,

        /// Google ID token obtained out of band
        #[arg(long, conflicts_with_all = ["email", "password"])]
        google_token: Option<String>,
    },
    /// Sign out and forget the persisted session
    Logout,
    /// Show the profile of the current identity
    Profile {
        /// Phone number to write into the profile
        #[arg(long)]
        phone: Option<String>,
    },
    /// Inspect and edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Inspect and edit the shipping-address draft
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },
    /// Place and list orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add quantity for a product
    Add {
        /// Product identifier
        product: String,
        /// Quantity to add
        quantity: u32,
    },
    /// Remove a product
    Remove {
        /// Product identifier
        product: String,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum DraftAction {
    /// Show the saved draft
    Show,
    /// Merge the given fields into the draft
    Save {
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        address1: Option<String>,
        #[arg(long)]
        address2: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        postal_code: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
}

#[derive(Subcommand)]
enum OrderAction {
    /// List orders, newest first
    List {
        /// Maximum number of orders
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Place an order from the current cart
    Place {
        /// Items subtotal
        #[arg(long)]
        subtotal: Decimal,

        /// Shipping fee
        #[arg(long)]
        shipping_fee: Decimal,

        /// Order total; defaults to subtotal + shipping fee
        #[arg(long)]
        total: Option<Decimal>,

        /// ISO 4217 currency code
        #[arg(long, default_value = "THB")]
        currency: CurrencyCode,

        /// Free-form note for the kitchen
        #[arg(long)]
        note: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::new(StoreConfig::from_env()?);

    match cli.command {
        Commands::Session => commands::session::show(&store).await?,
        Commands::Register {
            email,
            password,
            name,
            phone,
        } => commands::account::register(&store, email, password, name, phone).await?,
        Commands::Login {
            email,
            password,
            google_token,
        } => commands::account::login(&store, email, password, google_token).await?,
        Commands::Logout => commands::session::logout(&store).await?,
        Commands::Profile { phone } => commands::account::profile(&store, phone).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&store).await?,
            CartAction::Add { product, quantity } => {
                commands::cart::add(&store, product, quantity).await?;
            }
            CartAction::Remove { product } => commands::cart::remove(&store, product).await?,
            CartAction::Clear => commands::cart::clear(&store).await?,
        },
        Commands::Draft { action } => match action {
            DraftAction::Show => commands::draft::show(&store).await?,
            DraftAction::Save {
                full_name,
                phone,
                email,
                address1,
                address2,
                city,
                postal_code,
                note,
            } => {
                let draft = chouxlab_store::models::ShippingDraft {
                    full_name,
                    phone,
                    email,
                    address1,
                    address2,
                    city,
                    postal_code,
                    note,
                };
                commands::draft::save(&store, draft).await?;
            }
        },
        Commands::Orders { action } => match action {
            OrderAction::List { limit } => commands::orders::list(&store, limit).await?,
            OrderAction::Place {
                subtotal,
                shipping_fee,
                total,
                currency,
                note,
            } => {
                commands::orders::place(&store, subtotal, shipping_fee, total, currency, note)
                    .await?;
            }
        },
    }
    Ok(())
}
