use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use git2::{Repository as Git2Repo, Signature};
use tracing::{debug, info};

use crate::error::{ReconcileError, Result};
use crate::git::{Identity, VersionControl};

/// Username GitHub expects alongside an access token over HTTPS
const TOKEN_USERNAME: &str = "x-access-token";

/// libgit2 keeps asking for credentials while the remote rejects them
const MAX_CREDENTIAL_ATTEMPTS: u32 = 3;

/// [VersionControl] backed by a real repository through `git2`
pub struct Git2Repository {
    repo: Mutex<Git2Repo>,
    token: Option<String>,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Self::from_git2(repo))
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository {
            repo: Mutex::new(repo),
            token: None,
        }
    }

    /// Use `token` for HTTPS authentication on fetch and push
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    /// Root of the working tree
    pub fn workdir(&self) -> Result<PathBuf> {
        let repo = self.repo()?;
        repo.workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| ReconcileError::config("Repository has no working tree (bare repository)"))
    }

    fn repo(&self) -> Result<MutexGuard<'_, Git2Repo>> {
        self.repo
            .lock()
            .map_err(|_| ReconcileError::Git(git2::Error::from_str("repository lock poisoned")))
    }

    fn push_refspec(&self, repo: &Git2Repo, remote_name: &str, refspec: &str) -> Result<()> {
        let mut remote = repo.find_remote(remote_name).map_err(|e| {
            ReconcileError::remote(format!("Cannot find remote '{}': {}", remote_name, e))
        })?;

        let mut callbacks = remote_callbacks(self.token.as_deref());

        // Rejected refs are reported here rather than as a push error
        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => Err(git2::Error::from_str(&format!(
                "remote rejected {}: {}",
                refname, status
            ))),
            None => Ok(()),
        });

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(callbacks);

        debug!(remote = remote_name, refspec, "pushing");
        remote
            .push(&[refspec], Some(&mut push_options))
            .map_err(|e| match e.class() {
                git2::ErrorClass::Net => {
                    ReconcileError::remote(format!("Network error during push: {}", e))
                }
                git2::ErrorClass::Http if e.code() == git2::ErrorCode::Auth => {
                    ReconcileError::credential(format!("Push rejected credentials: {}", e))
                }
                _ => ReconcileError::remote(format!("Failed to push '{}': {}", refspec, e)),
            })
    }
}

/// Credentials for fetch and push.
///
/// Tries, in order: the access token over HTTPS, SSH keys from ~/.ssh/,
/// the SSH agent, then libgit2's default credentials.
fn remote_callbacks(token: Option<&str>) -> git2::RemoteCallbacks<'_> {
    let mut callbacks = git2::RemoteCallbacks::new();
    let mut attempts = 0;

    callbacks.credentials(move |_url, username_from_url, allowed_types| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str("authentication failed"));
        }

        if allowed_types.contains(git2::CredentialType::USER_PASS_PLAINTEXT) {
            if let Some(token) = token {
                return git2::Cred::userpass_plaintext(TOKEN_USERNAME, token);
            }
        }

        if allowed_types.contains(git2::CredentialType::SSH_KEY) {
            let username = username_from_url.unwrap_or("git");
            if let Some(home) = dirs::home_dir() {
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = home.join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }

            if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }
        }

        git2::Cred::default()
    });

    callbacks
}

impl VersionControl for Git2Repository {
    fn fetch_tags(&self, remote_name: &str) -> Result<()> {
        let repo = self.repo()?;
        let mut remote = repo.find_remote(remote_name).map_err(|e| {
            ReconcileError::remote(format!("Cannot find remote '{}': {}", remote_name, e))
        })?;

        let mut fetch_options = git2::FetchOptions::new();
        fetch_options.remote_callbacks(remote_callbacks(self.token.as_deref()));
        fetch_options.download_tags(git2::AutotagOption::All);

        remote
            .fetch(&["+refs/tags/*:refs/tags/*"], Some(&mut fetch_options), None)
            .map_err(|e| {
                ReconcileError::remote(format!("Fetch from '{}' failed: {}", remote_name, e))
            })?;

        debug!(remote = remote_name, "fetched tags");
        Ok(())
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let repo = self.repo()?;
        let tags = repo.tag_names(None)?;

        Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        let repo = self.repo()?;
        let reference_name = format!("refs/tags/{}", name);

        let found = match repo.find_reference(&reference_name) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(false),
            Err(e) => Err(ReconcileError::tag(format!(
                "Cannot look up tag '{}': {}",
                name, e
            ))),
        };
        found
    }

    fn create_annotated_tag(&self, name: &str, message: &str, identity: &Identity) -> Result<()> {
        let repo = self.repo()?;
        let head = repo.head()?.peel_to_commit()?;
        let tagger = Signature::now(&identity.name, &identity.email)?;

        repo.tag(name, head.as_object(), &tagger, message, false)
            .map_err(|e| ReconcileError::tag(format!("Cannot create tag '{}': {}", name, e)))?;

        info!(tag = name, commit = %head.id(), "created annotated tag");
        Ok(())
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<()> {
        let repo = self.repo()?;
        let refspec = format!("refs/tags/{}:refs/tags/{}", name, name);
        self.push_refspec(&repo, remote, &refspec)?;

        info!(tag = name, remote, "pushed tag");
        Ok(())
    }

    fn has_pending_changes(&self, paths: &[PathBuf]) -> Result<bool> {
        let repo = self.repo()?;

        let mut options = git2::StatusOptions::new();
        options
            .show(git2::StatusShow::IndexAndWorkdir)
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);
        if !paths.is_empty() {
            options.disable_pathspec_match(true);
            for path in paths {
                options.pathspec(path.as_path());
            }
        }

        let statuses = repo.statuses(Some(&mut options))?;
        Ok(statuses
            .iter()
            .any(|entry| entry.status() != git2::Status::CURRENT))
    }

    fn commit_and_push(
        &self,
        paths: &[PathBuf],
        message: &str,
        identity: &Identity,
        remote: &str,
        branch: &str,
    ) -> Result<()> {
        let repo = self.repo()?;

        let mut index = repo.index()?;
        for path in paths {
            index.add_path(path)?;
        }
        index.write()?;

        let tree = repo.find_tree(index.write_tree()?)?;
        let parent = repo.head()?.peel_to_commit()?;
        let signature = Signature::now(&identity.name, &identity.email)?;
        let commit_oid = repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&parent],
        )?;
        info!(commit = %commit_oid, "committed manifest");

        // A detached HEAD (common on CI checkouts) has no branch to push from
        let head = repo.head()?;
        let source = match head.name() {
            Some(name) if head.is_branch() => name.to_string(),
            _ => {
                let local = format!("refs/heads/{}", branch);
                repo.reference(&local, commit_oid, true, "version bump")?;
                local
            }
        };

        let refspec = format!("{}:refs/heads/{}", source, branch);
        self.push_refspec(&repo, remote, &refspec)?;

        info!(branch, remote, "pushed release commit");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_fresh_repository() {
        let dir = tempfile::tempdir().unwrap();
        Git2Repo::init(dir.path()).unwrap();

        let repo = Git2Repository::open(dir.path()).unwrap();
        assert!(repo.list_tags().unwrap().is_empty());
        assert!(!repo.tag_exists("v1.0.0").unwrap());
    }

    #[test]
    fn test_with_token_ignores_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Git2Repository::from_git2(Git2Repo::init(dir.path()).unwrap())
            .with_token(Some(String::new()));
        assert!(repo.token.is_none());
    }
}
