//! Shipping-draft commands.

use chouxlab_store::Store;
use chouxlab_store::models::ShippingDraft;

/// Print the saved draft.
pub async fn show(store: &Store) -> Result<(), Box<dyn std::error::Error>> {
    match store.load_shipping_draft().await? {
        Some(draft) => print_draft(&draft),
        None => println!("no shipping draft saved"),
    }
    Ok(())
}

/// Merge the given fields into the draft.
pub async fn save(store: &Store, draft: ShippingDraft) -> Result<(), Box<dyn std::error::Error>> {
    if draft.is_empty() {
        return Err("nothing to save; pass at least one field".into());
    }
    store.save_shipping_draft(&draft).await?;
    println!("draft saved");
    Ok(())
}

fn print_draft(draft: &ShippingDraft) {
    let fields = [
        ("name", &draft.full_name),
        ("phone", &draft.phone),
        ("email", &draft.email),
        ("address1", &draft.address1),
        ("address2", &draft.address2),
        ("city", &draft.city),
        ("postal code", &draft.postal_code),
        ("note", &draft.note),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("{label}: {value}");
        }
    }
}
