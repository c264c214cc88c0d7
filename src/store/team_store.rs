//! Team-scoped file store over a local directory tree.
//!
//! Layout on disk (kept byte-compatible with existing deployments):
//!
//! ```text
//! {root}/{team}/{filename}              plain uploaded files
//! {root}/{team}/{modelname}/...         extracted model archives
//! ```
//!
//! Creation is exclusive: plain files are published with a no-clobber rename
//! from a temp file in the team directory, and model directories are created
//! with a non-recursive `create_dir`. Two concurrent uploads of the same name
//! therefore resolve to one success and one [`StoreError::Conflict`].
//!
//! Deletion is a plain recursive removal and is not crash-safe; an
//! interrupted delete can leave a partial directory behind.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tempfile::NamedTempFile;
use tokio::task;
use tracing::{debug, info};

use super::archive::{ExtractReport, ModelArchive};
use super::media::media_type_for;
use super::paths::{file_stem, safe_relative_path, validate_component};
use crate::error::StoreError;

/// A file read back from the store.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// File contents
    pub data: Bytes,

    /// Content type derived from the file extension
    pub media_type: String,
}

/// Result of a model upload.
#[derive(Debug, Clone)]
pub struct ModelUpload {
    /// Model directory name actually used
    pub modelname: String,

    /// Store-relative path of the model directory (`{root}/{team}/{modelname}`)
    pub path: String,

    /// Per-entry extraction outcome
    pub report: ExtractReport,
}

/// File store rooted at a single directory.
#[derive(Debug, Clone)]
pub struct TeamFileStore {
    root: PathBuf,
}

impl TeamFileStore {
    /// Create a store rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store `content` as `{root}/{team}/{filename}`.
    ///
    /// Fails with [`StoreError::Conflict`] if anything already exists at that
    /// path; existing bytes are never touched. Returns the stored filename.
    pub async fn upload_file(
        &self,
        team: &str,
        filename: &str,
        content: Bytes,
    ) -> Result<String, StoreError> {
        let team_dir = self.team_dir(team)?;
        validate_component("file", filename).map_err(StoreError::invalid_input)?;
        let target = team_dir.join(filename);
        let shown = display_path(&target);

        if tokio::fs::symlink_metadata(&target).await.is_ok() {
            return Err(StoreError::Conflict { path: shown });
        }

        tokio::fs::create_dir_all(&team_dir).await?;

        let published = task::spawn_blocking(move || write_exclusive(&team_dir, &target, &content))
            .await
            .map_err(join_error)?;

        match published {
            Ok(()) => {
                info!(team = %team, filename = %filename, "Stored file");
                Ok(filename.to_string())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(StoreError::Conflict { path: shown })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Extract a zip archive into `{root}/{team}/{modelname}`.
    ///
    /// When `modelname` is `None` it is derived from `archive_filename` with
    /// the extension stripped. The archive is opened before anything is
    /// created, so malformed data leaves no trace on disk. Per-entry failures
    /// do not fail the upload; they are returned in the report.
    pub async fn upload_model(
        &self,
        team: &str,
        modelname: Option<&str>,
        archive_filename: &str,
        archive: Bytes,
    ) -> Result<ModelUpload, StoreError> {
        let team_dir = self.team_dir(team)?;
        let modelname = match modelname {
            Some(name) => name.to_string(),
            None => file_stem(archive_filename).to_string(),
        };
        validate_component("model", &modelname).map_err(StoreError::invalid_input)?;
        let model_dir = team_dir.join(&modelname);
        let shown = display_path(&model_dir);

        if tokio::fs::metadata(&model_dir).await.is_ok_and(|m| m.is_dir()) {
            return Err(StoreError::Conflict { path: shown });
        }

        let archive = ModelArchive::open(archive)?;

        tokio::fs::create_dir_all(&team_dir).await?;
        match tokio::fs::create_dir(&model_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(StoreError::Conflict { path: shown });
            }
            Err(e) => return Err(e.into()),
        }

        let destination = model_dir.clone();
        let report = task::spawn_blocking(move || archive.extract_into(&destination))
            .await
            .map_err(join_error)?;

        info!(
            team = %team,
            model = %modelname,
            extracted = report.extracted.len(),
            failed = report.failed.len(),
            "Stored model"
        );

        Ok(ModelUpload {
            modelname,
            path: shown,
            report,
        })
    }

    /// Read `{root}/{team}/{filename}`.
    pub async fn get_file(&self, team: &str, filename: &str) -> Result<StoredFile, StoreError> {
        let team_dir = self.team_dir(team)?;
        validate_component("file", filename).map_err(StoreError::invalid_input)?;
        read_regular_file(&team_dir.join(filename), filename).await
    }

    /// Read `{root}/{team}/{modelname}/{filename}`; `filename` may be nested.
    pub async fn get_model_file(
        &self,
        team: &str,
        modelname: &str,
        filename: &str,
    ) -> Result<StoredFile, StoreError> {
        let team_dir = self.team_dir(team)?;
        validate_component("model", modelname).map_err(StoreError::invalid_input)?;
        let relative = safe_relative_path(filename).ok_or_else(|| {
            StoreError::invalid_input(format!("file path '{}' is not a safe relative path", filename))
        })?;
        read_regular_file(&team_dir.join(modelname).join(relative), filename).await
    }

    /// Recursively remove `{root}/{team}/{modelname}`.
    ///
    /// Returns the removed path on success.
    pub async fn delete_model(&self, team: &str, modelname: &str) -> Result<String, StoreError> {
        let team_dir = self.team_dir(team)?;
        validate_component("model", modelname).map_err(StoreError::invalid_input)?;
        remove_tree(&team_dir.join(modelname)).await
    }

    /// Recursively remove `{root}/{team}` and everything under it.
    pub async fn delete_team(&self, team: &str) -> Result<String, StoreError> {
        let team_dir = self.team_dir(team)?;
        remove_tree(&team_dir).await
    }

    fn team_dir(&self, team: &str) -> Result<PathBuf, StoreError> {
        validate_component("team", team).map_err(StoreError::invalid_input)?;
        Ok(self.root.join(team))
    }
}

/// Write `content` to a temp file in `dir`, then publish it at `target`
/// only if nothing exists there yet.
fn write_exclusive(dir: &Path, target: &Path, content: &[u8]) -> io::Result<()> {
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist_noclobber(target).map_err(|e| e.error)?;
    Ok(())
}

async fn read_regular_file(path: &Path, filename: &str) -> Result<StoredFile, StoreError> {
    let not_found = || StoreError::NotFound {
        path: display_path(path),
    };

    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => return Err(not_found()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
        Err(e) => return Err(e.into()),
    }

    let data = tokio::fs::read(path).await?;
    debug!(path = %path.display(), bytes = data.len(), "Read stored file");

    Ok(StoredFile {
        data: Bytes::from(data),
        media_type: media_type_for(filename),
    })
}

async fn remove_tree(path: &Path) -> Result<String, StoreError> {
    let shown = display_path(path);

    match tokio::fs::symlink_metadata(path).await {
        Ok(meta) if meta.is_dir() => tokio::fs::remove_dir_all(path).await?,
        Ok(_) => tokio::fs::remove_file(path).await?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(StoreError::NotFound { path: shown });
        }
        Err(e) => return Err(e.into()),
    }

    info!(path = %shown, "Removed directory tree");
    Ok(shown)
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn join_error(err: task::JoinError) -> StoreError {
    StoreError::Io(io::Error::other(err))
}
