//! Team-scoped storage layer.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └────────────────────┬────────────────────┘
//!                      │ (token checked)
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │             TeamFileStore               │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │  path checks │  │  ModelArchive   │  │
//! │  │  media types │  │  (zip extract)  │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      ▼
//!            {root}/{team}/{...}
//! ```
//!
//! # Components
//!
//! - [`TeamFileStore`]: upload, read and delete under `{root}/{team}`
//! - [`ModelArchive`]: opens a zip upload and extracts it with a per-entry report
//! - [`media_type_for`]: extension to content-type mapping used on retrieval

mod archive;
mod media;
mod paths;
mod team_store;

pub use archive::{decode_entry_name, ExtractReport, FailedEntry, ModelArchive};
pub use media::{media_type_for, IMAGE_EXTENSIONS, OCTET_STREAM};
pub use paths::{file_stem, is_current_dir, safe_relative_path, validate_component};
pub use team_store::{ModelUpload, StoredFile, TeamFileStore};
