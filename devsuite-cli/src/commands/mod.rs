//! CLI subcommands.

mod common;
pub mod config;
pub mod install;
pub mod milestone;
pub mod plan;
mod progress;
