//! Revision-derived version tagging.
//!
//! Script bundle filenames embed a short identifier derived from the most
//! recent commit touching the source tree, so every deploy gets fresh URLs
//! without per-build content hashing. The lookup is read-only and independent
//! of the build mode.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Length of a version tag in hex characters.
pub const TAG_LEN: usize = 7;

/// A short, revision-derived build identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionTag(String);

impl VersionTag {
    /// Validate and wrap a tag. Tags are exactly [`TAG_LEN`] lowercase hex
    /// characters.
    pub fn new(tag: impl Into<String>) -> Result<Self> {
        let tag = tag.into();
        let valid = tag.len() == TAG_LEN
            && tag.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase());
        if !valid {
            return Err(Error::VersionUnavailable {
                reason: format!("malformed version tag '{tag}'"),
            });
        }
        Ok(Self(tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for VersionTag {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        VersionTag::new(value).map_err(|e| e.to_string())
    }
}

impl From<VersionTag> for String {
    fn from(tag: VersionTag) -> String {
        tag.0
    }
}

/// Derives the [`VersionTag`] for one build invocation.
pub trait VersionTagger {
    /// Compute the tag for the current source tree state.
    ///
    /// Must be pure for a fixed tree state and must fail with
    /// [`Error::VersionUnavailable`] instead of falling back to a random or
    /// empty tag.
    fn tag(&self) -> Result<VersionTag>;
}

/// Which part of the repository history feeds the tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagScope {
    /// Last commit touching the given directory. This mirrors
    /// `git rev-list -1 HEAD -- <dir>` and is the default.
    WorkDir(PathBuf),
    /// The repository `HEAD` itself, so changes anywhere bump the tag.
    Repository,
}

/// [`VersionTagger`] backed by the surrounding git repository.
pub struct GitTagger {
    start_dir: PathBuf,
    scope: TagScope,
}

impl GitTagger {
    /// Tag from the repository containing `dir`, scoped to `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self { scope: TagScope::WorkDir(dir.clone()), start_dir: dir }
    }

    pub fn with_scope(mut self, scope: TagScope) -> Self {
        self.scope = scope;
        self
    }
}

impl VersionTagger for GitTagger {
    fn tag(&self) -> Result<VersionTag> {
        let repo = gix::discover(&self.start_dir).map_err(|e| Error::VersionUnavailable {
            reason: format!("no repository found from '{}': {e}", self.start_dir.display()),
        })?;
        let head = repo.head_commit().map_err(|e| Error::VersionUnavailable {
            reason: format!("cannot resolve HEAD: {e}"),
        })?;

        let id = match &self.scope {
            TagScope::Repository => head.id,
            TagScope::WorkDir(dir) => {
                match scope_relative_to_root(&repo, dir)? {
                    None => head.id,
                    Some(rel) => last_commit_touching(&repo, &head, &rel)?,
                }
            }
        };
        short_tag(id)
    }
}

/// Fixed-tag implementation for tests and offline builds driven by a
/// pre-computed identifier.
pub struct FixedTagger(VersionTag);

impl FixedTagger {
    pub fn new(tag: VersionTag) -> Self {
        Self(tag)
    }
}

impl VersionTagger for FixedTagger {
    fn tag(&self) -> Result<VersionTag> {
        Ok(self.0.clone())
    }
}

fn short_tag(id: gix::ObjectId) -> Result<VersionTag> {
    VersionTag::new(id.to_hex_with_len(TAG_LEN).to_string())
}

/// Resolve the scope directory relative to the repository root. `None` means
/// the scope covers the whole repository.
fn scope_relative_to_root(repo: &gix::Repository, dir: &Path) -> Result<Option<PathBuf>> {
    let root = repo
        .path()
        .parent()
        .ok_or_else(|| Error::VersionUnavailable {
            reason: "repository has no working tree".into(),
        })?;
    let root = std::fs::canonicalize(root).map_err(|e| Error::VersionUnavailable {
        reason: format!("cannot resolve repository root: {e}"),
    })?;
    let dir = std::fs::canonicalize(dir).map_err(|e| Error::VersionUnavailable {
        reason: format!("cannot resolve tag scope '{}': {e}", dir.display()),
    })?;
    let rel = dir.strip_prefix(&root).map_err(|_| Error::VersionUnavailable {
        reason: format!("tag scope '{}' lies outside the repository", dir.display()),
    })?;
    if rel.as_os_str().is_empty() {
        Ok(None)
    } else {
        Ok(Some(rel.to_path_buf()))
    }
}

/// Newest commit on the first-parent chain whose tree entry for `scope`
/// differs from its parent's, i.e. the last commit touching that path.
fn last_commit_touching(
    repo: &gix::Repository,
    head: &gix::Commit<'_>,
    scope: &Path,
) -> Result<gix::ObjectId> {
    let mut prev_id = head.id;
    let mut prev_entry = entry_id(repo, prev_id, scope)?;
    let mut seen_any = prev_entry.is_some();

    let walk = head
        .ancestors()
        .first_parent_only()
        .all()
        .map_err(|e| version_err(format!("revision walk failed: {e}")))?;
    for info in walk {
        let info = info.map_err(|e| version_err(format!("revision walk failed: {e}")))?;
        let id: gix::ObjectId = info.id.into();
        if id == head.id {
            continue;
        }
        let entry = entry_id(repo, id, scope)?;
        seen_any |= entry.is_some();
        if entry != prev_entry {
            return Ok(prev_id);
        }
        prev_id = id;
        prev_entry = entry;
    }

    if seen_any {
        // The path has existed unchanged since the root commit.
        Ok(prev_id)
    } else {
        Err(version_err(format!(
            "no commit touches '{}'",
            scope.display()
        )))
    }
}

/// Tree entry object id for `scope` in the given commit, if present.
fn entry_id(
    repo: &gix::Repository,
    commit: gix::ObjectId,
    scope: &Path,
) -> Result<Option<gix::ObjectId>> {
    let commit = repo
        .find_commit(commit)
        .map_err(|e| version_err(format!("cannot load commit: {e}")))?;
    let tree = commit
        .tree()
        .map_err(|e| version_err(format!("cannot load commit tree: {e}")))?;
    let entry = tree
        .lookup_entry_by_path(scope)
        .map_err(|e| version_err(format!("cannot inspect tree: {e}")))?;
    Ok(entry.map(|e| e.oid().to_owned()))
}

fn version_err(reason: String) -> Error {
    Error::VersionUnavailable { reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_seven_hex_chars() {
        let tag = VersionTag::new("abc1234").unwrap();
        assert_eq!(tag.as_str(), "abc1234");
        assert_eq!(tag.to_string(), "abc1234");
    }

    #[test]
    fn rejects_malformed_tags() {
        assert!(VersionTag::new("abc123").is_err());
        assert!(VersionTag::new("abc12345").is_err());
        assert!(VersionTag::new("ABC1234").is_err());
        assert!(VersionTag::new("zzz1234").is_err());
        assert!(VersionTag::new("").is_err());
    }

    #[test]
    fn fixed_tagger_returns_its_tag() {
        let tagger = FixedTagger::new(VersionTag::new("deadbee").unwrap());
        assert_eq!(tagger.tag().unwrap().as_str(), "deadbee");
    }

    #[test]
    fn missing_repository_is_version_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = GitTagger::new(dir.path()).tag().unwrap_err();
        assert!(matches!(err, Error::VersionUnavailable { .. }));
    }
}
