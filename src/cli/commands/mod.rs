//! CLI command implementations

pub mod completions;
pub mod cost;
pub mod duty;
pub mod init;
pub mod tariff;
