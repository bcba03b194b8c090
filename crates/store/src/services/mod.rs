//! Higher-level flows composed from the provider clients and repositories.

pub mod accounts;
pub(crate) mod migration;

pub use accounts::{AccountError, AccountService};
