//! Shared fixtures for unit and integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use gix::objs::{Tree, tree};

use crate::bindings::ExternalBindings;
use crate::bundler::BundleJob;
use crate::context::BuildContext;
use crate::manifest::Manifest;
use crate::mode::BuildMode;
use crate::output::{OutputLayout, OutputPlanner};
use crate::version::{TAG_LEN, VersionTag};

/// A development-mode context rooted at `root`, with an empty job and
/// manifest. Enough to exercise plugins in isolation.
pub fn test_context_at(root: &Path) -> BuildContext {
    test_context_with_mode(BuildMode::Development, root)
}

pub fn test_context_with_mode(mode: BuildMode, root: &Path) -> BuildContext {
    let tag = VersionTag::new("abc1234").expect("fixture tag");
    let planner = OutputPlanner::new(mode, tag.clone(), OutputLayout::new(root, "/static"));
    let job = BundleJob {
        mode,
        context_dir: root.join("src"),
        entries: Vec::new(),
        externals: ExternalBindings::new(),
    };
    BuildContext::new(planner, job, Manifest::new(mode, tag))
}

/// A throwaway git repository for exercising revision-derived tagging.
///
/// Commits go through gix directly, so fixtures do not depend on a git
/// binary being installed.
pub struct FixtureRepo {
    root: PathBuf,
}

impl FixtureRepo {
    /// Initialize an empty repository at `root` with a fixed committer.
    pub fn init(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        fs::create_dir_all(&root).expect("create fixture root");
        let repo = gix::init(&root).expect("init fixture repository");
        let config = repo.path().join("config");
        let mut text = fs::read_to_string(&config).unwrap_or_default();
        text.push_str("[user]\n\tname = bask-fixture\n\temail = fixture@bask.invalid\n");
        fs::write(&config, text).expect("write fixture committer");
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write one file and commit the whole working tree.
    pub fn commit_file(&self, rel: &str, content: &str, message: &str) -> String {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture directories");
        }
        fs::write(&path, content).expect("write fixture file");
        self.commit_all(message)
    }

    /// Commit the current working tree, returning the abbreviated commit id.
    pub fn commit_all(&self, message: &str) -> String {
        let repo = gix::open(&self.root).expect("open fixture repository");
        let tree = write_tree(&repo, &self.root);
        let tree_id = repo.write_object(&tree).expect("write fixture tree").detach();
        let parents: Vec<gix::ObjectId> =
            repo.head_id().map(|id| vec![id.detach()]).unwrap_or_default();
        let commit = repo.commit("HEAD", message, tree_id, parents).expect("commit fixture tree");
        commit.detach().to_hex_with_len(TAG_LEN).to_string()
    }
}

/// Recursively write `dir` as a tree object, skipping `.git`.
fn write_tree(repo: &gix::Repository, dir: &Path) -> Tree {
    let mut entries = Vec::new();
    for item in fs::read_dir(dir).expect("read fixture directory") {
        let item = item.expect("read fixture entry");
        let name = item.file_name().into_string().expect("utf-8 fixture filename");
        if name == ".git" {
            continue;
        }
        let path = item.path();
        if path.is_dir() {
            let sub = write_tree(repo, &path);
            let oid = repo.write_object(&sub).expect("write fixture subtree").detach();
            entries.push(tree::Entry {
                mode: tree::EntryKind::Tree.into(),
                oid,
                filename: name.into(),
            });
        } else {
            let bytes = fs::read(&path).expect("read fixture file");
            let oid = repo.write_blob(bytes).expect("write fixture blob").detach();
            entries.push(tree::Entry {
                mode: tree::EntryKind::Blob.into(),
                oid,
                filename: name.into(),
            });
        }
    }
    // git orders tree entries with directory names compared as `name/`.
    let tree_mode: tree::EntryMode = tree::EntryKind::Tree.into();
    entries.sort_by_key(|entry| {
        let mut key = entry.filename.to_vec();
        if entry.mode == tree_mode {
            key.push(b'/');
        }
        key
    });
    Tree { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::{GitTagger, VersionTagger};

    #[test]
    fn fixture_commits_are_visible_to_the_tagger() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = FixtureRepo::init(dir.path());
        let id = fixture.commit_file("src/app.js", "run();", "initial");

        let tag = GitTagger::new(fixture.root().join("src")).tag().unwrap();
        assert_eq!(tag.as_str(), id);
    }
}
