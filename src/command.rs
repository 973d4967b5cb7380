//! Command execution for the CLI.
//!
//! Each command is a flat sequence of steps that stops at the first failure:
//!
//! ## Release (`release`)
//!
//! 1. **Sync**: fetch the upstream remote and fast-forward the release branch
//! 2. **Version**: read the latest tag and compute the next minor version
//! 3. **Confirm**: ask the operator whether to publish
//! 4. **Publish**: create an annotated tag and push it upstream
//!
//! ## Deploy example (`deploy-example`)
//!
//! 1. **Archive**: zip the fixture project
//! 2. **Login**: authenticate against the Azkaban server
//! 3. **Project**: create the project unless it already exists
//! 4. **Upload**: upload the archive
//! 5. **Execute**: start the flow with runtime property overrides and print
//!    a link to the execution

/// Smoke-test deployment of the example project.
pub mod deploy_example;

/// Minor-version release tagging.
pub mod release;
