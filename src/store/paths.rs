//! Path-safety checks for names that arrive from clients or archives.
//!
//! Every path the store touches is built as `root/{team}/...` from pieces
//! that have passed through these functions, so a joined path can never
//! resolve outside the team directory.

use std::path::{Component, Path, PathBuf};

/// Validate a single path component such as a team, model or file name.
///
/// Rejects empty names, `.` and `..`, names containing `/`, `\` or NUL.
pub fn validate_component<'a>(kind: &str, name: &'a str) -> Result<&'a str, String> {
    if name.is_empty() {
        return Err(format!("{} name is empty", kind));
    }
    if name == "." || name == ".." {
        return Err(format!("{} name '{}' is not allowed", kind, name));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(format!(
            "{} name '{}' must not contain path separators",
            kind, name
        ));
    }
    Ok(name)
}

/// Convert a relative, possibly nested path into a `PathBuf` that stays
/// inside whatever directory it is later joined onto.
///
/// Only normal components are accepted; `..`, roots, drive prefixes and
/// backslashes are rejected. Empty segments (`a//b`) and a trailing `/` are
/// tolerated, since zip directory entries end with one.
pub fn safe_relative_path(path: &str) -> Option<PathBuf> {
    if path.contains(['\\', '\0']) {
        return None;
    }

    let mut out = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if out.as_os_str().is_empty() {
        None
    } else {
        Some(out)
    }
}

/// True for a path that names the directory it is joined onto, such as
/// `.`, `./` or `././`.
pub fn is_current_dir(path: &str) -> bool {
    !path.is_empty()
        && !path.contains(['\\', '\0'])
        && Path::new(path)
            .components()
            .all(|component| component == Component::CurDir)
}

/// Strip the last extension from an uploaded file name.
///
/// `bundle.zip` becomes `bundle`, `bundle.v2.zip` becomes `bundle.v2`, and a
/// dotfile such as `.zip` is returned unchanged.
pub fn file_stem(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(0) | None => filename,
        Some(idx) => &filename[..idx],
    }
}
