//! Shopping cart domain type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use chouxlab_core::ProductId;

/// The items of a cart: an ordered map of product ID to quantity.
///
/// The cart document is ephemeral - it is overwritten whole on every save
/// and deleted outright when it becomes empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartItems(BTreeMap<ProductId, u32>);

impl CartItems {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Quantity for a product, zero when absent.
    #[must_use]
    pub fn quantity(&self, product: &ProductId) -> u32 {
        self.0.get(product).copied().unwrap_or(0)
    }

    /// Add to a product's quantity, saturating.
    pub fn add(&mut self, product: ProductId, quantity: u32) {
        let entry = self.0.entry(product).or_insert(0);
        *entry = entry.saturating_add(quantity);
    }

    /// Set a product's quantity outright. A zero quantity removes the entry
    /// on the next [`sanitized`](Self::sanitized) pass.
    pub fn set(&mut self, product: ProductId, quantity: u32) {
        self.0.insert(product, quantity);
    }

    /// Remove a product entirely.
    pub fn remove(&mut self, product: &ProductId) {
        self.0.remove(product);
    }

    /// Drop zero quantities.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.0.retain(|_, quantity| *quantity > 0);
        self
    }

    /// Iterate over `(product, quantity)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ProductId, u32)> {
        self.0.iter().map(|(product, quantity)| (product, *quantity))
    }
}

impl FromIterator<(ProductId, u32)> for CartItems {
    fn from_iter<I: IntoIterator<Item = (ProductId, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_accumulates() {
        let mut items = CartItems::new();
        items.add(ProductId::new("vanilla"), 1);
        items.add(ProductId::new("vanilla"), 2);
        assert_eq!(items.quantity(&ProductId::new("vanilla")), 3);
    }

    #[test]
    fn test_sanitized_drops_zero_quantities() {
        let mut items = CartItems::new();
        items.set(ProductId::new("vanilla"), 2);
        items.set(ProductId::new("matcha"), 0);

        let cleaned = items.sanitized();
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned.quantity(&ProductId::new("matcha")), 0);
    }

    #[test]
    fn test_add_saturates() {
        let mut items = CartItems::new();
        items.set(ProductId::new("vanilla"), u32::MAX);
        items.add(ProductId::new("vanilla"), 1);
        assert_eq!(items.quantity(&ProductId::new("vanilla")), u32::MAX);
    }

    #[test]
    fn test_iteration_is_key_ordered() {
        let items: CartItems = [
            (ProductId::new("vanilla"), 1),
            (ProductId::new("chocolate"), 2),
        ]
        .into_iter()
        .collect();

        let keys: Vec<_> = items.iter().map(|(p, _)| p.as_str().to_owned()).collect();
        assert_eq!(keys, ["chocolate", "vanilla"]);
    }
}
