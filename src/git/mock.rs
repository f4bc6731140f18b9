use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::{ReconcileError, Result};
use crate::git::{Identity, VersionControl};
use crate::manifest::{InMemoryManifest, ManifestStore};

/// Operations a [MockRepository] can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    Fetch,
    ListTags,
    TagExists,
    CreateTag,
    PushTag,
    Status,
    CommitAndPush,
}

/// A commit recorded by [MockRepository::commit_and_push]
#[derive(Debug, Clone, PartialEq)]
pub struct MockCommit {
    pub message: String,
    pub paths: Vec<PathBuf>,
    pub author: Identity,
    pub remote: String,
    pub branch: String,
}

#[derive(Default)]
struct MockState {
    /// tag name -> annotation message (empty for pre-existing tags)
    tags: BTreeMap<String, String>,
    pushed_tags: Vec<String>,
    commits: Vec<MockCommit>,
    fetches: usize,
    dirty: BTreeSet<PathBuf>,
    /// manifest whose content counts as working tree state, with its committed version
    tracked: Option<(InMemoryManifest, Option<String>)>,
    failures: HashSet<MockOperation>,
}

/// Mock repository for testing without actual git operations
///
/// Interior state sits behind a mutex so the trait's `&self` methods can
/// record side effects.
#[derive(Default)]
pub struct MockRepository {
    state: Mutex<MockState>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an already-published tag
    pub fn add_tag(&self, name: impl Into<String>) {
        self.state().tags.insert(name.into(), String::new());
    }

    /// Mark a path as modified in the working tree
    pub fn mark_dirty(&self, path: impl Into<PathBuf>) {
        self.state().dirty.insert(path.into());
    }

    /// Treat `manifest` as a tracked file: it has pending changes whenever its
    /// version differs from the one last committed. The current content
    /// counts as committed.
    pub fn track_manifest(&self, manifest: &InMemoryManifest) {
        let committed = manifest.current();
        self.state().tracked = Some((manifest.clone(), committed));
    }

    /// Make every later call of `operation` fail
    pub fn fail_on(&self, operation: MockOperation) {
        self.state().failures.insert(operation);
    }

    /// Stop failing `operation`
    pub fn recover(&self, operation: MockOperation) {
        self.state().failures.remove(&operation);
    }

    pub fn tags(&self) -> Vec<String> {
        self.state().tags.keys().cloned().collect()
    }

    /// Annotation message of a tag created through the trait
    pub fn tag_message(&self, name: &str) -> Option<String> {
        self.state().tags.get(name).cloned()
    }

    pub fn pushed_tags(&self) -> Vec<String> {
        self.state().pushed_tags.clone()
    }

    pub fn commits(&self) -> Vec<MockCommit> {
        self.state().commits.clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.state().fetches
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A panicking test must not hide the state from later assertions
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self, operation: MockOperation) -> Result<()> {
        if self.state().failures.contains(&operation) {
            return Err(ReconcileError::remote(format!(
                "injected failure: {:?}",
                operation
            )));
        }
        Ok(())
    }
}

fn in_scope(paths: &[PathBuf], path: &Path) -> bool {
    paths.is_empty() || paths.iter().any(|p| p == path)
}

impl VersionControl for MockRepository {
    fn fetch_tags(&self, _remote: &str) -> Result<()> {
        self.check(MockOperation::Fetch)?;
        self.state().fetches += 1;
        Ok(())
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        self.check(MockOperation::ListTags)?;
        Ok(self.tags())
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        self.check(MockOperation::TagExists)?;
        Ok(self.state().tags.contains_key(name))
    }

    fn create_annotated_tag(&self, name: &str, message: &str, _identity: &Identity) -> Result<()> {
        self.check(MockOperation::CreateTag)?;
        let mut state = self.state();
        if state.tags.contains_key(name) {
            return Err(ReconcileError::tag(format!("tag '{}' already exists", name)));
        }
        state.tags.insert(name.to_string(), message.to_string());
        Ok(())
    }

    fn push_tag(&self, _remote: &str, name: &str) -> Result<()> {
        self.check(MockOperation::PushTag)?;
        let mut state = self.state();
        if !state.tags.contains_key(name) {
            return Err(ReconcileError::remote(format!("no local tag '{}'", name)));
        }
        state.pushed_tags.push(name.to_string());
        Ok(())
    }

    fn has_pending_changes(&self, paths: &[PathBuf]) -> Result<bool> {
        self.check(MockOperation::Status)?;
        let state = self.state();

        if state.dirty.iter().any(|p| in_scope(paths, p)) {
            return Ok(true);
        }

        Ok(match &state.tracked {
            Some((manifest, committed)) => {
                in_scope(paths, manifest.path()) && manifest.current() != *committed
            }
            None => false,
        })
    }

    fn commit_and_push(
        &self,
        paths: &[PathBuf],
        message: &str,
        identity: &Identity,
        remote: &str,
        branch: &str,
    ) -> Result<()> {
        self.check(MockOperation::CommitAndPush)?;
        let mut state = self.state();

        state.dirty.retain(|p| !paths.contains(p));
        if let Some((manifest, committed)) = state.tracked.as_mut() {
            if paths.iter().any(|p| p == manifest.path()) {
                *committed = manifest.current();
            }
        }

        state.commits.push(MockCommit {
            message: message.to_string(),
            paths: paths.to_vec(),
            author: identity.clone(),
            remote: remote.to_string(),
            branch: branch.to_string(),
        });
        Ok(())
    }
}
