//! Avira Vastra Core - Shared types library.
//!
//! This crate provides common types used across all Avira Vastra components:
//! - `storefront` - Cart, session, checkout and the REST gateway
//! - `cli` - Command-line access to the storefront and back-office
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no persistence,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
