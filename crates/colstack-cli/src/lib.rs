//! CLI library components for colstack.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;
