//! Avira Vastra storefront client library.
//!
//! Cart, sessions, the REST gateway and the checkout flow of the Avira
//! Vastra store, as a library that front ends drive and tests exercise.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod checkout;
pub mod config;
pub mod error;
pub mod models;
pub mod navigation;
pub mod services;
pub mod state;
pub mod store;

pub use error::{AppError, Result};
pub use state::AppState;
