//! Olive - a typewriter simulator core
//!
//! Typed channels between a host process and its UI pages, the `.oli`
//! document format in both its verbose and compact versions, and the host
//! and page behavior built on top of them.

pub mod config;
pub mod document;
pub mod environment;
pub mod error;
pub mod host;
pub mod id;
pub mod ipc;
pub mod paper_color;
pub mod preferences;
pub mod ui;

pub use error::{OliveError, Result};
