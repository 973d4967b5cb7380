//! Version-control seam used by the release command.
use crate::result::Result;

/// The git operations a release needs, in the order it performs them.
#[cfg_attr(test, mockall::automock)]
pub trait VersionControl {
    /// Fetch all configured refspecs from `remote`.
    fn fetch(&self, remote: &str) -> Result<()>;
    /// Check out local `branch`, creating it from the remote-tracking branch
    /// when it does not exist yet.
    fn checkout(&self, branch: &str) -> Result<()>;
    /// Fast-forward the checked out `branch` to `remote/branch`.
    fn merge(&self, remote: &str, branch: &str) -> Result<()>;
    /// Nearest annotated tag reachable from HEAD.
    fn latest_tag(&self) -> Result<String>;
    /// Create an annotated tag on HEAD.
    fn create_annotated_tag(&self, tag: &str, message: &str) -> Result<()>;
    /// Push `refs/tags/<tag>` to `remote`.
    fn push_tag(&self, remote: &str, tag: &str) -> Result<()>;
}
