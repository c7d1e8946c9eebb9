//! Wire and domain records exchanged with the storefront API.
//!
//! Field names follow the backend's camelCase JSON; document identifiers are
//! serialized as `_id`. Prices are decimals serialized as JSON numbers.

pub mod content;
pub mod order;
pub mod product;
pub mod user;

pub use content::{Dashboard, DashboardStats, HealthResponse, SiteContent, UploadedImage};
pub use order::{
    NewOrder, NewOrderItem, Order, OrderItem, PaymentMethod, PaymentVerification,
    ShippingAddress, StatusUpdate, TrackOrderQuery, VerificationResult,
};
pub use product::{Product, ProductFilters, ProductInput, Taxonomy, TaxonomyInput, TaxonomyItem};
pub use user::{
    Address, AdminAuthResponse, AdminUser, AuthResponse, Credentials, CustomerSummary,
    GoogleSignIn, ProfileUpdate, Registration, User,
};
