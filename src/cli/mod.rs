//! CLI module - argument parsing

mod args;

pub use args::{Cli, DEFAULT_GDP_FILE};
