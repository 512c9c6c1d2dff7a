//! Read-only access to ZIP archives.

use crate::error::{ConvertError, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::ZipArchive;

/// An opened ZIP archive.
///
/// Member names are captured once at open time in the order they are stored
/// in the central directory. Directory entries are not files and are left out.
/// The underlying reader (and file handle) is released when the value drops.
pub struct Archive<R = BufReader<File>> {
    path: PathBuf,
    zip: ZipArchive<R>,
    names: Vec<String>,
}

impl Archive {
    /// Open the archive at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| ConvertError::ArchiveOpen {
            path: path.to_path_buf(),
            source: ZipError::Io(e),
        })?;
        Self::from_reader(BufReader::new(file), path)
    }
}

impl<R: Read + Seek> Archive<R> {
    /// Open an archive from any seekable reader. `label` names the archive in
    /// errors and diagnostics.
    pub fn from_reader(reader: R, label: impl Into<PathBuf>) -> Result<Self> {
        let path = label.into();
        let mut zip = match ZipArchive::new(reader) {
            Ok(zip) => zip,
            Err(source) => return Err(ConvertError::ArchiveOpen { path, source }),
        };

        let mut names = Vec::with_capacity(zip.len());
        for index in 0..zip.len() {
            let entry = match zip.by_index_raw(index) {
                Ok(entry) => entry,
                Err(source) => return Err(ConvertError::ArchiveOpen { path, source }),
            };
            if !entry.is_dir() {
                names.push(entry.name().to_string());
            }
        }

        Ok(Archive { path, zip, names })
    }

    /// Path (or label) the archive was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Member names in stored order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Read the full content of the member called `name`.
    pub fn read(&mut self, name: &str) -> Result<Vec<u8>> {
        let path = &self.path;
        let entry_err = |source: ZipError| ConvertError::EntryRead {
            path: path.clone(),
            entry: name.to_string(),
            source,
        };

        let mut entry = self.zip.by_name(name).map_err(entry_err)?;
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut data)
            .map_err(|e| entry_err(ZipError::Io(e)))?;
        Ok(data)
    }
}
