//! Error types for archive conversion.
//!
//! [`ConvertError`] is what a conversion call returns. Only
//! [`ConvertError::ImageDecode`] is ever recovered below the archive boundary
//! (the Page-Draw converter logs it and skips the entry); every other variant
//! aborts the current archive.

use std::path::PathBuf;
use thiserror::Error;
use zip::result::ZipError;

/// Errors returned by a single archive conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input is missing, unreadable, or not a ZIP container.
    #[error("cannot open archive '{}': {source}", path.display())]
    ArchiveOpen {
        path: PathBuf,
        #[source]
        source: ZipError,
    },

    /// A member of an opened archive could not be read or inflated.
    #[error("cannot read entry '{entry}' of archive '{}': {source}", path.display())]
    EntryRead {
        path: PathBuf,
        entry: String,
        #[source]
        source: ZipError,
    },

    /// An entry's bytes are not a decodable image.
    #[error("entry '{entry}' is not a decodable image: {source}")]
    ImageDecode {
        entry: String,
        #[source]
        source: image::ImageError,
    },

    /// An entry cannot be embedded by the lossless routine.
    #[error("entry '{entry}' cannot be embedded: {source}")]
    Embed {
        entry: String,
        #[source]
        source: EmbedError,
    },

    /// Decoded pixels of an entry could not be compressed for the page.
    #[error("cannot compress pixels of entry '{entry}': {source}")]
    PixelCompress {
        entry: String,
        #[source]
        source: std::io::Error,
    },

    /// Bulk-Embed was given an archive without any entries.
    #[error("archive '{}' has no images to embed", path.display())]
    EmptyArchive { path: PathBuf },

    /// The destination PDF could not be created or written.
    #[error("cannot write '{}': {reason}", path.display())]
    OutputWrite { path: PathBuf, reason: String },
}

/// Why a buffer was refused by the lossless embedding routine.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// Recognised encoding, but a mode that cannot be embedded as-is.
    #[error("unsupported image: {0}")]
    Unsupported(String),

    /// The buffer claims a known encoding but its structure is broken.
    #[error("malformed {format} data: {reason}")]
    Malformed { format: &'static str, reason: String },

    /// Decoded pixels could not be compressed.
    #[error("cannot compress pixel data: {0}")]
    Compress(#[from] std::io::Error),

    /// Fallback decoding failed (also covers unrecognised data).
    #[error(transparent)]
    Decode(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
