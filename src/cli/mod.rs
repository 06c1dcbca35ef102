//! CLI command handling module
//!
//! Handles all CLI subcommands. Rendering lives in [`output`] so it can be
//! tested without a terminal or a server.

mod commands;
mod config;
mod logging;
pub mod output;
mod version;

pub use commands::{parse_events, run_events, run_sequences, run_status};
pub use config::{ConfigSubcommand, handle_config_command};
pub use logging::init_logging;
pub use version::display_version;
