//! CLI module for olive - command-line interface and subcommands.
//!
//! Provides document inspection and conversion, and access to the stored
//! preferences.

pub mod commands;

pub use commands::Cli;
