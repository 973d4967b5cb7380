//! Git repository operations for the release workflow.
//!
//! This module wraps `git2` with the handful of operations a release needs:
//!
//! - Fetching the upstream remote
//! - Checking out and fast-forwarding the release branch
//! - Finding the latest annotated tag (`git describe --abbrev=0`)
//! - Creating an annotated tag and pushing it upstream
//!
//! # Authentication
//!
//! Network operations try, in order: an explicit access token sent as the
//! password, the SSH agent when the remote asks for a key, the user's git
//! credential helper, and libgit2's default credentials.
//!
//! # Usage
//!
//! ```rust,ignore
//! let repo = Repository::open(Path::new("."), None)?;
//! repo.fetch("upstream")?;
//! repo.checkout("master")?;
//! repo.merge("upstream", "master")?;
//! let tag = repo.latest_tag()?;
//! ```
use git2::{
    BranchType, CredentialType, DescribeFormatOptions, DescribeOptions,
    ErrorClass, ErrorCode, RemoteCallbacks, build::CheckoutBuilder,
};
use log::*;
use secrecy::{ExposeSecret, SecretString};
use std::{cell::RefCell, path::Path};

use crate::{error::ToolError, result::Result};

pub mod traits;

pub use traits::VersionControl;

/// Username sent with a token when the remote URL does not carry one.
const DEFAULT_TOKEN_USER: &str = "git";

/// libgit2 re-invokes the credential callback after every rejected attempt.
const MAX_CREDENTIAL_ATTEMPTS: usize = 4;

/// Local git repository the release is cut from.
pub struct Repository {
    /// Access token for HTTPS remotes, if one was supplied.
    token: Option<SecretString>,
    /// The underlying git2 repository instance.
    repo: git2::Repository,
}

/// Create git authentication callbacks.
///
/// The token takes precedence when the remote accepts username/password.
/// Otherwise the SSH agent, then the configured credential helper, are
/// tried before libgit2's defaults.
fn get_auth_callbacks(token: Option<&SecretString>) -> RemoteCallbacks<'_> {
    let mut attempts = 0;
    let mut callbacks = RemoteCallbacks::new();

    callbacks.credentials(move |url, username_from_url, allowed| {
        attempts += 1;

        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str(&format!(
                "authentication failed for {url}"
            )));
        }

        let username = username_from_url.unwrap_or(DEFAULT_TOKEN_USER);

        if let Some(token) = token
            && allowed.contains(CredentialType::USER_PASS_PLAINTEXT)
        {
            return git2::Cred::userpass_plaintext(
                username,
                token.expose_secret(),
            );
        }

        if allowed.contains(CredentialType::SSH_KEY) {
            return git2::Cred::ssh_key_from_agent(username);
        }

        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            let config = git2::Config::open_default()?;
            return git2::Cred::credential_helper(
                &config,
                url,
                username_from_url,
            );
        }

        if allowed.contains(CredentialType::USERNAME) {
            return git2::Cred::username(username);
        }

        git2::Cred::default()
    });

    callbacks
}

impl Repository {
    /// Open the repository containing `path`, searching parent directories
    /// like the git CLI does.
    pub fn open(path: &Path, token: Option<SecretString>) -> Result<Self> {
        let repo = git2::Repository::discover(path)?;
        debug!("opened repository at {}", repo.path().display());
        Ok(Self { token, repo })
    }

    /// Get the repository's working directory path.
    pub fn workdir(&self) -> Result<&Path> {
        self.repo.workdir().ok_or_else(|| {
            color_eyre::eyre::eyre!("Repository has no working directory")
        })
    }

    /// Find the single remote-tracking branch named `*/branch`.
    fn find_remote_branch(&self, branch: &str) -> Result<git2::Branch<'_>> {
        let suffix = format!("/{branch}");
        let mut matches = vec![];

        for entry in self.repo.branches(Some(BranchType::Remote))? {
            let (remote_branch, _) = entry?;
            let is_match = remote_branch
                .name()?
                .is_some_and(|name| name.ends_with(&suffix));
            if is_match {
                matches.push(remote_branch);
            }
        }

        if matches.len() != 1 {
            return Err(color_eyre::eyre::eyre!(
                "pathspec '{branch}' did not match a unique remote branch ({} found)",
                matches.len()
            ));
        }

        Ok(matches.remove(0))
    }
}

impl VersionControl for Repository {
    fn fetch(&self, remote: &str) -> Result<()> {
        info!("fetching {remote}");
        let mut remote = self.repo.find_remote(remote)?;

        let mut fetch_options = git2::FetchOptions::new();
        fetch_options.remote_callbacks(get_auth_callbacks(self.token.as_ref()));
        fetch_options.download_tags(git2::AutotagOption::All);

        // empty refspec list uses the remote's configured refspecs
        remote.fetch::<&str>(&[], Some(&mut fetch_options), None)?;

        Ok(())
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        info!("checking out {branch}");

        if self.repo.find_branch(branch, BranchType::Local).is_err() {
            let remote_branch = self.find_remote_branch(branch)?;
            let commit = remote_branch.get().peel_to_commit()?;
            let upstream = remote_branch
                .name()?
                .map(String::from)
                .unwrap_or_default();

            debug!("creating {branch} to track {upstream}");
            let mut local = self.repo.branch(branch, &commit, false)?;
            local.set_upstream(Some(upstream.as_str()))?;
        }

        let ref_name = format!("refs/heads/{branch}");
        let target = self.repo.revparse_single(&ref_name)?;
        self.repo
            .checkout_tree(&target, Some(CheckoutBuilder::new().safe()))?;
        self.repo.set_head(&ref_name)?;

        Ok(())
    }

    fn merge(&self, remote: &str, branch: &str) -> Result<()> {
        let upstream = format!("{remote}/{branch}");
        info!("merging {upstream} into {branch}");

        let reference = self
            .repo
            .find_reference(&format!("refs/remotes/{upstream}"))?;
        let incoming = self.repo.reference_to_annotated_commit(&reference)?;
        let (analysis, _) = self.repo.merge_analysis(&[&incoming])?;

        if analysis.is_up_to_date() {
            info!("{branch} is already up to date");
            return Ok(());
        }

        if !analysis.is_fast_forward() {
            return Err(ToolError::NonFastForward {
                branch: branch.into(),
                upstream,
            }
            .into());
        }

        // update the working tree first so a dirty checkout fails before
        // the branch moves
        let target = self.repo.find_commit(incoming.id())?;
        self.repo.checkout_tree(
            target.as_object(),
            Some(CheckoutBuilder::new().safe()),
        )?;

        let mut local =
            self.repo.find_reference(&format!("refs/heads/{branch}"))?;
        local.set_target(
            target.id(),
            &format!("merge {upstream}: Fast-forward"),
        )?;

        debug!("fast-forwarded {branch} to {}", target.id());

        Ok(())
    }

    fn latest_tag(&self) -> Result<String> {
        let describe = match self.repo.describe(&DescribeOptions::new()) {
            Ok(describe) => describe,
            // libgit2 reports "no reference found" as a generic describe
            // error; an empty tag set may also surface as NotFound
            Err(err)
                if err.class() == ErrorClass::Describe
                    || err.code() == ErrorCode::NotFound =>
            {
                debug!("describe failed: {}", err.message());
                return Err(ToolError::NoTagFound.into());
            }
            Err(err) => return Err(err.into()),
        };

        let mut format = DescribeFormatOptions::new();
        format.abbreviated_size(0);

        Ok(describe.format(Some(&format))?)
    }

    fn create_annotated_tag(&self, tag: &str, message: &str) -> Result<()> {
        info!("creating tag {tag}");
        let head = self.repo.head()?.peel_to_commit()?;
        let tagger = self.repo.signature()?;

        self.repo
            .tag(tag, head.as_object(), &tagger, message, false)?;

        Ok(())
    }

    fn push_tag(&self, remote: &str, tag: &str) -> Result<()> {
        info!("pushing tag {tag} to {remote}");

        let rejection = RefCell::new(None);
        let ref_spec = format!("refs/tags/{tag}:refs/tags/{tag}");

        {
            let mut callbacks = get_auth_callbacks(self.token.as_ref());
            callbacks.push_update_reference(|reference, status| {
                if let Some(message) = status {
                    *rejection.borrow_mut() =
                        Some((reference.to_string(), message.to_string()));
                }
                Ok(())
            });

            let mut push_opts = git2::PushOptions::new();
            push_opts.remote_callbacks(callbacks);

            let mut remote = self.repo.find_remote(remote)?;
            remote.push(&[ref_spec.as_str()], Some(&mut push_opts))?;
        }

        if let Some((reference, message)) = rejection.into_inner() {
            return Err(ToolError::PushRejected { reference, message }.into());
        }

        Ok(())
    }
}
