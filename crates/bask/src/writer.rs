//! Artifact emission.
//!
//! Byte artifacts are written in two phases (temp file, then rename) with
//! rollback of the staged files on failure, so readers never observe partial
//! contents. Every target path is normalized and checked to stay under the
//! output root before anything is written.

use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;

use crate::context::{ArtifactPayload, ArtifactSet};
use crate::{Error, Result};

/// Write every staged artifact under the output root.
pub fn write_artifacts(root: &Path, artifacts: &ArtifactSet) -> Result<()> {
    let root = normalize_root(root)?;
    fs::create_dir_all(&root).map_err(|e| not_writable(&root, e))?;

    let mut byte_ops: Vec<(PathBuf, &[u8])> = Vec::new();
    let mut copy_ops: Vec<(PathBuf, &Path)> = Vec::new();
    for artifact in artifacts.iter() {
        let target = contained_path(&root, &artifact.rel_path)?;
        match &artifact.payload {
            ArtifactPayload::Bytes(bytes) => byte_ops.push((target, bytes)),
            ArtifactPayload::CopyDir(from) => copy_ops.push((target, from)),
        }
    }

    write_files_atomic(&byte_ops)?;
    for (target, from) in copy_ops {
        copy_dir_recursive(from, &target)?;
    }
    Ok(())
}

/// Write a single file with the same staging scheme, for writers outside the
/// artifact set (manifest emission).
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| not_writable(parent, e))?;
    }
    let tmp = staging_path(path);
    fs::write(&tmp, bytes).map_err(|e| not_writable(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        not_writable(path, e)
    })
}

fn normalize_root(root: &Path) -> Result<PathBuf> {
    let cleaned = root.clean();
    if cleaned.is_absolute() {
        return Ok(cleaned);
    }
    let cwd = std::env::current_dir().map_err(|e| not_writable(root, e))?;
    Ok(cwd.join(cleaned).clean())
}

/// Join a relative artifact path to the root, rejecting anything that
/// escapes it.
fn contained_path(root: &Path, rel: &Path) -> Result<PathBuf> {
    if rel.as_os_str().to_string_lossy().contains('\0') {
        return Err(Error::InvalidOutputPath("path contains a null byte".into()));
    }
    let full = root.join(rel.clean()).clean();
    if !full.starts_with(root) {
        return Err(Error::InvalidOutputPath(format!(
            "'{}' escapes the output root '{}'",
            rel.display(),
            root.display()
        )));
    }
    Ok(full)
}

fn staging_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!("{name}.tmp"))
}

/// Two-phase write: stage everything, then rename. A failure removes every
/// staged file before returning.
fn write_files_atomic(operations: &[(PathBuf, &[u8])]) -> Result<()> {
    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::new();

    for (target, content) in operations {
        if let Some(parent) = target.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                cleanup_staged(&staged);
                return Err(not_writable(parent, e));
            }
        }
        let tmp = staging_path(target);
        if let Err(e) = fs::write(&tmp, content) {
            cleanup_staged(&staged);
            return Err(not_writable(&tmp, e));
        }
        staged.push((tmp, target.clone()));
    }

    for (tmp, target) in &staged {
        if let Err(e) = fs::rename(tmp, target) {
            cleanup_staged(&staged);
            return Err(not_writable(target, e));
        }
    }
    Ok(())
}

fn cleanup_staged(staged: &[(PathBuf, PathBuf)]) {
    for (tmp, _) in staged {
        if tmp.exists() {
            if let Err(e) = fs::remove_file(tmp) {
                tracing::warn!(path = %tmp.display(), error = %e, "failed to remove staged file");
            }
        }
    }
}

fn copy_dir_recursive(from: &Path, to: &Path) -> Result<()> {
    for entry in walkdir::WalkDir::new(from) {
        let entry = entry.map_err(|e| {
            Error::InvalidConfig(format!("cannot read vendor source '{}': {e}", from.display()))
        })?;
        let rel = entry
            .path()
            .strip_prefix(from)
            .expect("walkdir yields children of its root");
        let target = to.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| not_writable(&target, e))?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| not_writable(parent, e))?;
            }
            fs::copy(entry.path(), &target).map_err(|e| not_writable(&target, e))?;
        }
    }
    Ok(())
}

fn not_writable(path: &Path, source: std::io::Error) -> Error {
    Error::OutputNotWritable { path: path.to_path_buf(), source }
}
