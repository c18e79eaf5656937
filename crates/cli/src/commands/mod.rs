//! CLI subcommand implementations

pub mod catalog;
pub mod export;
pub mod plan;
