//! Products domain module.
//!
//! This crate contains business rules for catalog items, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod price;
pub mod product;

pub use price::Price;
pub use product::{Product, ProductId};
