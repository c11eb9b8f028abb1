//! The `.oli` document format.
//!
//! This module provides:
//! - The in-memory (verbose) document model
//! - The compact version 2 encoding with `compress` / `uncompress`
//! - Version dispatch on load and async file read/write

pub mod compact;
pub mod file;
pub mod model;

pub use compact::{CompactCharacter, CompactDocument, CompactPoint, compress, round2, uncompress};
pub use file::{Encoding, OliFile, read_document, with_file_extension, write_document};
pub use model::{Character, PenMark, Point, VerboseDocument};

/// File extension for saved documents, including the dot.
pub const FILE_EXTENSION: &str = ".oli";

/// Version tag of the verbose encoding.
pub const VERBOSE_VERSION: f64 = 1.0;

/// Version tag of the compact encoding.
pub const COMPACT_VERSION: f64 = 2.0;
