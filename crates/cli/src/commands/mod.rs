//! Command implementations, one module per noun.

pub mod account;
pub mod cart;
pub mod draft;
pub mod orders;
pub mod session;
