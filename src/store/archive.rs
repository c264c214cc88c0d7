//! Zip archive extraction for model uploads.
//!
//! Extraction is best-effort: every entry is attempted, failures are collected
//! into an [`ExtractReport`] next to the successfully written entries, and
//! the caller decides what to tell the client.
//!
//! # Entry name normalization
//!
//! Zip headers only distinguish "UTF-8" from "CP437". Archivers on Korean
//! Windows write EUC-KR bytes while claiming CP437, so the raw name bytes are
//! used directly: valid UTF-8 is taken as-is, anything else is decoded as
//! EUC-KR. A name that is neither becomes a failed entry.

use std::fs;
use std::io::{self, Cursor, Read};
use std::path::Path;

use bytes::Bytes;
use encoding_rs::EUC_KR;
use serde::Serialize;
use tracing::{debug, warn};
use zip::ZipArchive;

use super::paths::{is_current_dir, safe_relative_path};
use crate::error::ArchiveError;

/// One archive entry that could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedEntry {
    /// Decoded entry name, or `#<index>` when the name itself was unreadable
    pub name: String,

    /// Why the entry was skipped
    pub reason: String,
}

/// Outcome of extracting an archive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractReport {
    /// Relative paths written under the destination directory
    pub extracted: Vec<String>,

    /// Entries that were skipped
    pub failed: Vec<FailedEntry>,
}

impl ExtractReport {
    /// True when no entry failed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    fn fail(&mut self, name: impl Into<String>, err: ArchiveError) {
        let name = name.into();
        warn!(entry = %name, error = %err, "Skipping archive entry");
        self.failed.push(FailedEntry {
            name,
            reason: err.to_string(),
        });
    }
}

/// An uploaded zip archive that has been opened and indexed.
pub struct ModelArchive {
    inner: ZipArchive<Cursor<Bytes>>,
}

impl std::fmt::Debug for ModelArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArchive")
            .field("entries", &self.inner.len())
            .finish()
    }
}

impl ModelArchive {
    /// Open an archive from its raw bytes.
    ///
    /// Reads the central directory only; fails with
    /// [`ArchiveError::Malformed`] if the bytes are not a zip archive.
    pub fn open(data: Bytes) -> Result<Self, ArchiveError> {
        let inner = ZipArchive::new(Cursor::new(data))
            .map_err(|e| ArchiveError::Malformed(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Number of entries in the central directory.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True if the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }

    /// Extract every entry into `destination`, preserving relative paths.
    ///
    /// `destination` must already exist. This call does blocking file I/O.
    pub fn extract_into(mut self, destination: &Path) -> ExtractReport {
        let mut report = ExtractReport::default();

        for index in 0..self.inner.len() {
            let mut entry = match self.inner.by_index(index) {
                Ok(entry) => entry,
                Err(e) => {
                    report.fail(format!("#{}", index), ArchiveError::Entry(e.to_string()));
                    continue;
                }
            };

            let name = match decode_entry_name(entry.name_raw()) {
                Ok(name) => name,
                Err(e) => {
                    report.fail(format!("#{}", index), e);
                    continue;
                }
            };

            if entry.is_dir() && is_current_dir(&name) {
                debug!(entry = %name, "Skipping current-directory entry");
                continue;
            }

            let Some(relative) = safe_relative_path(&name) else {
                report.fail(name.clone(), ArchiveError::UnsafePath(name));
                continue;
            };

            let target = destination.join(&relative);
            let is_dir = entry.is_dir();
            match write_entry(&mut entry, is_dir, &target) {
                Ok(()) => {
                    debug!(entry = %name, "Extracted archive entry");
                    report.extracted.push(relative.to_string_lossy().into_owned());
                }
                Err(e) => report.fail(name, ArchiveError::Entry(e.to_string())),
            }
        }

        report
    }
}

/// Decode a raw zip entry name: UTF-8 first, EUC-KR as the fallback.
pub fn decode_entry_name(raw: &[u8]) -> Result<String, ArchiveError> {
    if let Ok(name) = std::str::from_utf8(raw) {
        return Ok(name.to_string());
    }

    EUC_KR
        .decode_without_bom_handling_and_without_replacement(raw)
        .map(|name| name.into_owned())
        .ok_or(ArchiveError::UndecodableName)
}

fn write_entry<R: Read>(entry: &mut R, is_dir: bool, target: &Path) -> io::Result<()> {
    if is_dir {
        return fs::create_dir_all(target);
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(target)?;
    io::copy(entry, &mut file)?;
    Ok(())
}
