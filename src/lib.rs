//! ZIP to PDF converter library
//!
//! Core logic for turning archives of images into PDF documents, one image per
//! A4 page. Two converters share the same archive reader and page assembly:
//!
//! * [`PageDrawConverter`] decodes every entry and redraws it. Entries that
//!   are not images are logged and skipped.
//! * [`BulkEmbedConverter`] embeds each entry's encoded bytes without
//!   re-encoding. Faster and lossless, but one unsupported entry fails the
//!   whole archive.
//!
//! [`selector`] discovers archives and runs a batch through either converter.

pub mod archive;
pub mod draw;
pub mod embed;
pub mod error;
pub mod pdf;
pub mod selector;

pub use archive::Archive;
pub use draw::PageDrawConverter;
pub use embed::BulkEmbedConverter;
pub use error::{ConvertError, EmbedError, Result};
pub use selector::{run_batch, ArchiveSelection, BatchReport, FailurePolicy};

use std::fs;
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Options shared by both converters
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Compress page content streams
    pub compress_streams: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            compress_streams: true,
        }
    }
}

/// Result of converting one archive
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub archive: PathBuf,
    pub output: PathBuf,
    /// Number of file entries in the archive
    pub total_entries: usize,
    /// Number of pages in the written PDF
    pub pages: usize,
    /// Entries left out of the PDF, in archive order
    pub skipped_entries: Vec<String>,
}

/// A strategy for turning an archive into a PDF.
pub trait Converter {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Convert every entry of `archive` and write the PDF to `target`.
    /// `destination` names the target in diagnostics and errors.
    fn convert_to_writer<R: Read + Seek, W: Write>(
        &self,
        archive: &mut Archive<R>,
        target: &mut W,
        destination: &Path,
    ) -> Result<ConversionReport>;

    /// Convert the archive at `archive_path` into `<stem>.pdf` inside
    /// `output_dir`, replacing any existing file.
    ///
    /// The document is assembled in memory and only written once complete, so
    /// a failed conversion never leaves a truncated PDF behind.
    fn convert(&self, archive_path: &Path, output_dir: &Path) -> Result<ConversionReport> {
        let output_path = output_pdf_path(archive_path, output_dir)?;
        let mut archive = Archive::open(archive_path)?;

        let mut buffer = Vec::new();
        let report = self.convert_to_writer(&mut archive, &mut buffer, &output_path)?;
        drop(archive);

        fs::write(&output_path, &buffer).map_err(|e| ConvertError::OutputWrite {
            path: output_path.clone(),
            reason: e.to_string(),
        })?;
        info!("Saved as '{}'", output_path.display());

        Ok(report)
    }
}

/// Which converter a batch uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Algorithm {
    /// Decode and redraw each image; skip entries that fail to decode
    #[default]
    Draw,
    /// Embed encoded image data losslessly; fail on any unsupported entry
    Embed,
}

impl Algorithm {
    pub fn converter(self, options: ConvertOptions) -> ArchiveConverter {
        match self {
            Algorithm::Draw => ArchiveConverter::Draw(PageDrawConverter::new(options)),
            Algorithm::Embed => ArchiveConverter::Embed(BulkEmbedConverter::new(options)),
        }
    }
}

/// The converter chosen at the batch boundary.
#[derive(Debug, Clone)]
pub enum ArchiveConverter {
    Draw(PageDrawConverter),
    Embed(BulkEmbedConverter),
}

impl Converter for ArchiveConverter {
    fn name(&self) -> &'static str {
        match self {
            ArchiveConverter::Draw(c) => c.name(),
            ArchiveConverter::Embed(c) => c.name(),
        }
    }

    fn convert_to_writer<R: Read + Seek, W: Write>(
        &self,
        archive: &mut Archive<R>,
        target: &mut W,
        destination: &Path,
    ) -> Result<ConversionReport> {
        match self {
            ArchiveConverter::Draw(c) => c.convert_to_writer(archive, target, destination),
            ArchiveConverter::Embed(c) => c.convert_to_writer(archive, target, destination),
        }
    }
}

/// Output location for an archive: its file name with the final extension
/// replaced by `.pdf`, inside `output_dir`, as an absolute path.
pub fn output_pdf_path(archive_path: &Path, output_dir: &Path) -> Result<PathBuf> {
    let stem = archive_path
        .file_stem()
        .ok_or_else(|| ConvertError::OutputWrite {
            path: archive_path.to_path_buf(),
            reason: "archive path has no file name".to_string(),
        })?;

    let mut file_name = stem.to_os_string();
    file_name.push(".pdf");

    let joined = output_dir.join(file_name);
    std::path::absolute(&joined).map_err(|e| ConvertError::OutputWrite {
        path: joined,
        reason: e.to_string(),
    })
}
