//! Entity type definitions
//!
//! - [`Product`] - a product's cost lines, dimensions, logistics costs, and duty overrides

pub mod product;

pub use product::{Product, ProductCosting, ProductError};
