//! Client-side state and flows.
//!
//! # Services
//!
//! - `cart` - Persisted shopping cart and its totals
//! - `session` - Persisted customer and back-office sessions
//! - `account` - Sign-in flows that populate the sessions
//! - `catalog` - Product page helpers (load, add to bag)
//! - `health` - Background backend health monitor
//! - `admin` - Back-office list filters

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod health;
pub mod session;

pub use cart::{Cart, CartHandle, CartLineItem};
pub use health::{ConnectionStatus, HealthMonitor};
pub use session::{AdminSessionHandle, SessionHandle};
