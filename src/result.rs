//! Error handling and result types.
//!
//! Every fallible function in the crate returns the `Result<T>` defined here,
//! backed by `color-eyre` so a failure surfaces as a colorized report with
//! its context chain and a non-zero exit status.
//!
//! Domain failures are raised as [`crate::error::ToolError`] values and
//! converted into the report with `?`; callers that need to react to a
//! particular failure can `downcast_ref::<ToolError>()`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use color_eyre::eyre::WrapErr;
//! use crate::result::Result;
//!
//! fn update_tags(vcs: &dyn VersionControl) -> Result<()> {
//!     vcs.fetch("upstream")
//!         .wrap_err("failed to fetch upstream")?;
//!     Ok(())
//! }
//! ```

use color_eyre::eyre::Result as EyreResult;

/// Standard result type used throughout the crate.
pub type Result<T> = EyreResult<T>;
