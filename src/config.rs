//! Configuration loading and parsing for `azkaban-tools.toml` files.
//!
//! Every field has a default, so the file is optional and may set only the
//! values an operator wants to change.
use color_eyre::eyre::{WrapErr, eyre};
use serde::Deserialize;
use std::{fs, path::Path};

use crate::{
    azkaban::request::{ROOT_SCOPE, RuntimeProperty},
    error::ToolError,
    result::Result,
};

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "azkaban-tools.toml";

/// Settings for the `release` command.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)] // Use default for missing fields
pub struct ReleaseConfig {
    /// Remote that is fetched from and receives the new tag.
    pub remote: String,
    /// Local branch fast-forwarded to `<remote>/<branch>` before tagging.
    pub branch: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            remote: "upstream".into(),
            branch: "master".into(),
        }
    }
}

/// Settings for the `deploy-example` command.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)] // Use default for missing fields
pub struct DeployConfig {
    /// Base URL of the Azkaban web server.
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Project created (if absent) and uploaded to.
    pub project: String,
    /// Description used when the project has to be created.
    pub description: String,
    /// Flow executed after the upload.
    pub flow: String,
    /// Directory zipped into the project archive. Relative paths from a
    /// config file are resolved against the file's directory; the built-in
    /// default is resolved against the working directory.
    pub fixture_dir: String,
    /// Archive location, defaults to `<temp dir>/<project>.zip`.
    pub zip_path: Option<String>,
    /// Overrides sent with the execution request.
    pub runtime_properties: Vec<RuntimeProperty>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".into(),
            username: "azkaban".into(),
            password: "azkaban".into(),
            project: "execpropstest".into(),
            description: "Test project for runtime property overrides".into(),
            flow: "job3".into(),
            fixture_dir: "fixtures/execpropstest".into(),
            zip_path: None,
            runtime_properties: default_runtime_properties(),
        }
    }
}

/// The overrides exercised by the example project: one per scope level.
pub fn default_runtime_properties() -> Vec<RuntimeProperty> {
    vec![
        RuntimeProperty::new(ROOT_SCOPE, "my_prop", "my_ROOT_val"),
        RuntimeProperty::new("innerflow", "my_prop", "my_subflow_val"),
        RuntimeProperty::new("innerflow:job1", "my_prop", "my_inner_job_val"),
    ]
}

/// Root configuration structure for `azkaban-tools.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub release: ReleaseConfig,
    pub deploy: DeployConfig,
}

impl Config {
    /// Load configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] when
    /// no path is given. Only an explicitly requested file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p, true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };

        if !path.exists() {
            if required {
                return Err(eyre!(
                    "config file does not exist: {}",
                    path.display()
                ));
            }
            log::debug!("configuration not found: using defaults");
            return Ok(Self::default());
        }

        log::debug!("loading configuration from {}", path.display());

        let content = fs::read_to_string(path).wrap_err_with(|| {
            format!("failed to read config file {}", path.display())
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(ToolError::from)?;

        if let Some(base) = path.parent() {
            config.deploy.resolve_paths(base);
        }

        Ok(config)
    }
}

impl DeployConfig {
    /// Anchor relative `fixture_dir` and `zip_path` at `base`, the
    /// directory of the config file they were read from.
    fn resolve_paths(&mut self, base: &Path) {
        if base.as_os_str().is_empty() {
            return;
        }

        let anchor = |value: &str| -> String {
            let path = Path::new(value);
            if path.is_absolute() {
                value.to_string()
            } else {
                base.join(path).display().to_string()
            }
        };

        self.fixture_dir = anchor(&self.fixture_dir);
        self.zip_path = self.zip_path.as_deref().map(anchor);
    }
}
