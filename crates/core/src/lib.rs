//! Chouxlab Core - Shared types library.
//!
//! This crate provides common types used across the Chouxlab storefront
//! components:
//! - `store` - Client-side data-access layer over Firebase
//! - `cli` - Command-line smoke tool
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
