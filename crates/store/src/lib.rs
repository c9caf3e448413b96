//! Store domain module.
//!
//! This crate contains the catalog aggregate and its order-processing rules,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no
//! storage). Orders are transactional: a failing line anywhere in a shopping
//! list leaves every product's stock unchanged.

pub mod order;
pub mod store;

pub use order::OrderLine;
pub use store::{DuplicateNamePolicy, Store};
