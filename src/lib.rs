//! Usuppli: landed-cost estimation for supply-chain products
//!
//! Sums a product's FOB cost lines, resolves the destination duty rate against
//! a persisted global tariff table, and composes freight, duty, insurance, and
//! other costs into a total landed cost with profit and margin.

pub mod cli;
pub mod core;
pub mod entities;
