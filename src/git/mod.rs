//! Git operations abstraction layer
//!
//! The reconciliation core never shells out or touches `git2` directly; it
//! talks to the [VersionControl] trait. Two implementations exist:
//!
//! - [repository::Git2Repository]: a real repository driven through the `git2` crate
//! - [mock::MockRepository]: an in-memory stand-in that records side effects
//!
//! ```rust
//! # use version_reconcile::git::VersionControl;
//! # fn example<R: VersionControl>(repo: &R) -> Result<(), Box<dyn std::error::Error>> {
//! repo.fetch_tags("origin")?;
//! let tags = repo.list_tags()?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use std::path::PathBuf;

use crate::error::Result;

/// Author/tagger signature used for release commits and annotated tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Identity {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Version-control capability needed to resolve and publish release tags
///
/// ## Thread Safety
///
/// All implementors must be `Send + Sync`.
///
/// ## Error Handling
///
/// Every method returns [crate::error::Result<T>]; implementations map
/// underlying errors (like `git2::Error`) to [crate::error::ReconcileError]
/// variants. Whether a failure is fatal is decided by the caller.
pub trait VersionControl: Send + Sync {
    /// Fetch all tags from a remote so that [VersionControl::list_tags] sees
    /// markers published by other runs.
    ///
    /// # Arguments
    /// * `remote` - Name of the remote (e.g., "origin")
    fn fetch_tags(&self, remote: &str) -> Result<()>;

    /// List every tag name known locally, in no particular order.
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Whether a tag with exactly this name exists.
    ///
    /// # Returns
    /// * `Ok(true)` - The tag exists (lightweight or annotated)
    /// * `Ok(false)` - No such tag
    /// * `Err` - If the lookup itself failed
    fn tag_exists(&self, name: &str) -> Result<bool>;

    /// Create an annotated tag on the current HEAD commit.
    ///
    /// # Returns
    /// * `Err` - If the tag already exists or HEAD cannot be resolved
    fn create_annotated_tag(&self, name: &str, message: &str, identity: &Identity) -> Result<()>;

    /// Push a single tag to a remote.
    fn push_tag(&self, remote: &str, name: &str) -> Result<()>;

    /// Whether any of `paths` has uncommitted changes.
    ///
    /// Paths are relative to the working tree root. An empty slice asks about
    /// the whole working tree.
    fn has_pending_changes(&self, paths: &[PathBuf]) -> Result<bool>;

    /// Stage exactly `paths`, commit them on HEAD and push to `branch`.
    ///
    /// # Arguments
    /// * `paths` - Files to stage, relative to the working tree root
    /// * `message` - Commit message
    /// * `identity` - Author and committer signature
    /// * `remote` - Remote to push to
    /// * `branch` - Remote branch that receives the commit
    fn commit_and_push(
        &self,
        paths: &[PathBuf],
        message: &str,
        identity: &Identity,
        remote: &str,
        branch: &str,
    ) -> Result<()>;
}
