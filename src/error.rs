//! Domain error types for the release and deploy tools.

use thiserror::Error;

/// Failures either tool can raise. Everything is fatal: callers propagate
/// these through [`crate::result::Result`] and never retry.
#[derive(Error, Debug)]
pub enum ToolError {
    // Release errors
    #[error("Invalid release tag '{0}': expected major.minor.patch")]
    InvalidTag(String),

    #[error("Invalid minor version in tag '{tag}': {source}")]
    InvalidMinor {
        tag: String,
        source: std::num::ParseIntError,
    },

    #[error("Minor version in tag '{0}' cannot be incremented")]
    MinorOverflow(String),

    #[error("No annotated tag reachable from HEAD")]
    NoTagFound,

    #[error(
        "Cannot fast-forward branch '{branch}' to '{upstream}': histories have diverged"
    )]
    NonFastForward { branch: String, upstream: String },

    #[error("Remote rejected push of '{reference}': {message}")]
    PushRejected { reference: String, message: String },

    // Deploy errors
    #[error("Fixture directory not found: {0}")]
    FixtureNotFound(String),

    #[error("Login failed: {0}")]
    LoginFailed(String),

    #[error("Azkaban request '{action}' failed: {message}")]
    RequestFailed { action: String, message: String },

    #[error("Azkaban response for '{action}' is missing '{field}'")]
    MissingField {
        action: &'static str,
        field: &'static str,
    },

    // Wrapped library errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Zip archive error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),
}

impl ToolError {
    /// Create a request failure for an Azkaban action.
    pub fn request_failed(
        action: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::RequestFailed {
            action: action.into(),
            message: message.into(),
        }
    }

    /// Create a missing-field failure for an Azkaban action.
    pub fn missing_field(action: &'static str, field: &'static str) -> Self {
        Self::MissingField { action, field }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_formats() {
        let err = ToolError::InvalidTag("1.2".into());
        assert_eq!(
            err.to_string(),
            "Invalid release tag '1.2': expected major.minor.patch"
        );

        let err = ToolError::request_failed("create", "project exists");
        assert_eq!(
            err.to_string(),
            "Azkaban request 'create' failed: project exists"
        );

        let err = ToolError::missing_field("executeFlow", "execid");
        assert_eq!(
            err.to_string(),
            "Azkaban response for 'executeFlow' is missing 'execid'"
        );
    }

    #[test]
    fn test_from_conversions() {
        let toml_err = toml::from_str::<toml::Table>("[broken");
        let err: ToolError = toml_err.unwrap_err().into();
        assert!(matches!(err, ToolError::TomlParseError(_)));

        let url_err = url::Url::parse("not a url");
        let err: ToolError = url_err.unwrap_err().into();
        assert!(matches!(err, ToolError::UrlError(_)));
    }
}
