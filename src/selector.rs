//! Archive discovery and batch dispatch.

use crate::{ConversionReport, ConvertError, Converter};
use glob::{glob, Pattern};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Which archives a batch should process.
#[derive(Debug, Clone, Default)]
pub struct ArchiveSelection {
    /// Archives named explicitly
    pub files: Vec<PathBuf>,
    /// Directories scanned for `*.zip` files
    pub directories: Vec<PathBuf>,
    /// Scan directories recursively
    pub recursive: bool,
}

impl ArchiveSelection {
    /// Resolve the selection into an ordered list of archive paths.
    ///
    /// Directory matches come first (directories in the given order, matches
    /// within a directory sorted by path), followed by the explicit files in
    /// the given order. Explicit files are not checked for existence here;
    /// a missing one fails when it is opened.
    pub fn collect(&self) -> Vec<PathBuf> {
        let mut archives = Vec::new();
        for directory in &self.directories {
            archives.extend(scan_directory(directory, self.recursive));
        }
        archives.extend(self.files.iter().cloned());
        archives
    }
}

/// Find `*.zip` files directly inside `directory`, or anywhere below it when
/// `recursive` is set. Matches are sorted by path; entries that cannot be
/// read are reported and skipped.
pub fn scan_directory(directory: &Path, recursive: bool) -> Vec<PathBuf> {
    let Some(root) = directory.to_str() else {
        warn!("Cannot scan non UTF-8 directory '{}'", directory.display());
        return Vec::new();
    };
    let root = PathBuf::from(Pattern::escape(root));
    let pattern = if recursive {
        root.join("**").join("*.zip")
    } else {
        root.join("*.zip")
    };

    let entries = match glob(&pattern.to_string_lossy()) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot scan directory '{}': {}", directory.display(), e);
            return Vec::new();
        }
    };

    let mut found = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => found.push(path),
            Ok(_) => {}
            Err(e) => warn!("Cannot read '{}': {}", e.path().display(), e.error()),
        }
    }
    found.sort();
    found
}

/// What to do when an archive fails to convert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the batch at the first failed archive
    #[default]
    FailFast,
    /// Log the failure and carry on with the next archive
    ContinueOnError,
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub converted: Vec<ConversionReport>,
    pub failures: Vec<(PathBuf, ConvertError)>,
    /// Archives never attempted because the batch stopped early
    pub not_attempted: Vec<PathBuf>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Convert `archives` in order with `converter`, writing into `output_dir`.
pub fn run_batch<C: Converter>(
    converter: &C,
    archives: &[PathBuf],
    output_dir: &Path,
    policy: FailurePolicy,
) -> BatchReport {
    let mut report = BatchReport::default();

    for (index, archive) in archives.iter().enumerate() {
        match converter.convert(archive, output_dir) {
            Ok(conversion) => {
                info!(
                    "Converted '{}' with {} ({} pages)",
                    archive.display(),
                    converter.name(),
                    conversion.pages
                );
                report.converted.push(conversion);
            }
            Err(err) => {
                error!("Error! Unable to process zip '{}': {}", archive.display(), err);
                report.failures.push((archive.clone(), err));
                if policy == FailurePolicy::FailFast {
                    report.not_attempted = archives[index + 1..].to_vec();
                    break;
                }
            }
        }
    }

    report
}
