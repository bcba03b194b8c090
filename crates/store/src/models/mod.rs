//! Domain types for the documents this layer reads and writes.
//!
//! These are validated domain objects separate from the Firestore wire
//! representation; the `db` repositories do the mapping.

pub mod cart;
pub mod draft;
pub mod order;
pub mod profile;

pub use cart::CartItems;
pub use draft::ShippingDraft;
pub use order::{NewOrder, Order};
pub use profile::{ProfileExtra, UserProfile};
