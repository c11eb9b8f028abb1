//! `.oli` files: version dispatch, encoding and async read/write.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::compact::{CompactDocument, compress, uncompress};
use super::model::VerboseDocument;
use super::{COMPACT_VERSION, FILE_EXTENSION, VERBOSE_VERSION};
use crate::error::{OliveError, Result};

/// On-disk encoding to use when writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Version 1, human-legible
    Verbose,
    /// Version 2, size-optimized
    #[default]
    Compact,
}

impl Encoding {
    pub fn version(self) -> f64 {
        match self {
            Self::Verbose => VERBOSE_VERSION,
            Self::Compact => COMPACT_VERSION,
        }
    }
}

/// A decoded file, tagged by the version it was written with.
#[derive(Debug, Clone, PartialEq)]
pub enum OliFile {
    V1(VerboseDocument),
    V2(CompactDocument),
}

impl OliFile {
    /// Wrap an in-memory document in the requested encoding.
    pub fn encode_as(doc: &VerboseDocument, encoding: Encoding) -> Self {
        match encoding {
            Encoding::Verbose => Self::V1(doc.clone()),
            Encoding::Compact => Self::V2(compress(doc)),
        }
    }

    /// Decode raw bytes, dispatching on the `version` field.
    ///
    /// An unknown version is an error; there is no fallback interpretation.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let raw: Value = serde_json::from_slice(bytes)?;
        let version = match raw.get("version") {
            Some(v) => v
                .as_f64()
                .ok_or_else(|| OliveError::UnsupportedVersion(v.to_string()))?,
            None => return Err(OliveError::Decode("missing version field".to_string())),
        };

        if version == VERBOSE_VERSION {
            let doc: VerboseDocument =
                serde_json::from_value(raw).map_err(|e| OliveError::Decode(e.to_string()))?;
            Ok(Self::V1(doc))
        } else if version == COMPACT_VERSION {
            let doc: CompactDocument =
                serde_json::from_value(raw).map_err(|e| OliveError::Decode(e.to_string()))?;
            Ok(Self::V2(doc))
        } else {
            Err(OliveError::UnsupportedVersion(version.to_string()))
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_bytes(&self, pretty: bool) -> Result<Vec<u8>> {
        let bytes = match (self, pretty) {
            (Self::V1(doc), false) => serde_json::to_vec(doc)?,
            (Self::V1(doc), true) => serde_json::to_vec_pretty(doc)?,
            (Self::V2(doc), false) => serde_json::to_vec(doc)?,
            (Self::V2(doc), true) => serde_json::to_vec_pretty(doc)?,
        };
        Ok(bytes)
    }

    /// The version this file was written with.
    pub fn version(&self) -> f64 {
        match self {
            Self::V1(_) => VERBOSE_VERSION,
            Self::V2(_) => COMPACT_VERSION,
        }
    }

    /// Upgrade or downgrade to the in-memory (verbose) shape.
    pub fn into_verbose(self) -> VerboseDocument {
        match self {
            Self::V1(doc) => doc,
            Self::V2(doc) => uncompress(&doc),
        }
    }
}

/// Append the `.oli` extension unless the path already has it.
pub fn with_file_extension(path: &Path) -> PathBuf {
    if has_file_extension(path) {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(FILE_EXTENSION);
        PathBuf::from(name)
    }
}

/// Whether the path ends in `.oli`.
pub fn has_file_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| format!(".{}", ext.to_string_lossy()) == FILE_EXTENSION)
}

/// Read and decode a document.
pub async fn read_document(path: &Path) -> Result<VerboseDocument> {
    let bytes = tokio::fs::read(path).await?;
    let file = OliFile::decode(&bytes)?;
    log::info!("Read {} (version {})", path.display(), file.version());
    Ok(file.into_verbose())
}

/// Encode and write a document, returning the path written.
///
/// The `.oli` extension is appended when missing.
pub async fn write_document(
    path: &Path,
    doc: &VerboseDocument,
    encoding: Encoding,
    pretty: bool,
) -> Result<PathBuf> {
    let path = with_file_extension(path);
    let bytes = OliFile::encode_as(doc, encoding).to_bytes(pretty)?;
    tokio::fs::write(&path, bytes).await?;
    log::info!("Wrote {} (version {})", path.display(), encoding.version());
    Ok(path)
}
