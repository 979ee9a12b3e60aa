//! CLI module - argument parsing and subcommands

mod args;
pub mod commands;

pub use args::{Cli, Commands};
pub use commands::{parse_record, run_generate, run_score, run_status, run_train};
