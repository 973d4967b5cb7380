//! CLI argument parsing and resolution against the config file.
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use std::{env, path::PathBuf};

use crate::config::{DeployConfig, ReleaseConfig};

/// Environment variable holding the token used to push release tags.
pub const GIT_TOKEN_ENV_VAR: &str = "GIT_TOKEN";

/// Environment variable holding the Azkaban password.
pub const AZKABAN_PASSWORD_ENV_VAR: &str = "AZKABAN_PASSWORD";

/// Operator utilities for the Azkaban project.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, global = true)]
    /// Path to a TOML config file. Defaults to ./azkaban-tools.toml when
    /// present.
    pub config: Option<PathBuf>,

    #[arg(long, default_value_t = false, global = true)]
    /// Enable debug logging.
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available tools.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Tag and push the next minor release of a local repository.
    Release(ReleaseArgs),

    /// Upload the example project to an Azkaban server and execute its flow.
    DeployExample(DeployArgs),
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct ReleaseArgs {
    #[arg(long, default_value = ".")]
    /// Path inside the repository to release.
    pub repo_path: PathBuf,

    #[arg(long)]
    /// Remote to fetch from and push the tag to.
    pub remote: Option<String>,

    #[arg(long)]
    /// Branch to fast-forward and tag.
    pub branch: Option<String>,

    #[arg(long)]
    /// Access token for HTTPS remotes. Falls back to GIT_TOKEN env var.
    pub git_token: Option<String>,
}

impl ReleaseArgs {
    /// Apply command line overrides on top of the configured values.
    pub fn resolve(&self, base: ReleaseConfig) -> ReleaseConfig {
        ReleaseConfig {
            remote: self.remote.clone().unwrap_or(base.remote),
            branch: self.branch.clone().unwrap_or(base.branch),
        }
    }

    /// Token from the flag or the environment, if any.
    pub fn token(&self) -> Option<SecretString> {
        pick_secret(
            self.git_token.clone(),
            env::var(GIT_TOKEN_ENV_VAR).ok(),
            None,
        )
    }
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct DeployArgs {
    #[arg(long)]
    /// Base URL of the Azkaban web server.
    pub url: Option<String>,

    #[arg(long)]
    /// Azkaban username.
    pub username: Option<String>,

    #[arg(long)]
    /// Azkaban password. Falls back to AZKABAN_PASSWORD env var.
    pub password: Option<String>,

    #[arg(long)]
    /// Project to create and upload to.
    pub project: Option<String>,

    #[arg(long)]
    /// Flow to execute after uploading.
    pub flow: Option<String>,

    #[arg(long)]
    /// Directory zipped into the uploaded project. Relative to the working
    /// directory; the default only exists when run from the repository root.
    pub fixture_dir: Option<String>,

    #[arg(long)]
    /// Where to write the project archive.
    pub zip_path: Option<String>,
}

impl DeployArgs {
    /// Apply command line overrides on top of the configured values. The
    /// password is resolved separately by [`DeployArgs::password`].
    pub fn resolve(&self, base: DeployConfig) -> DeployConfig {
        DeployConfig {
            base_url: self.url.clone().unwrap_or(base.base_url),
            username: self.username.clone().unwrap_or(base.username),
            project: self.project.clone().unwrap_or(base.project),
            flow: self.flow.clone().unwrap_or(base.flow),
            fixture_dir: self.fixture_dir.clone().unwrap_or(base.fixture_dir),
            zip_path: self.zip_path.clone().or(base.zip_path),
            ..base
        }
    }

    /// Password from the flag, the environment, or the config file.
    pub fn password(&self, config: &DeployConfig) -> SecretString {
        pick_secret(
            self.password.clone(),
            env::var(AZKABAN_PASSWORD_ENV_VAR).ok(),
            Some(config.password.clone()),
        )
        .unwrap_or_else(|| SecretString::from(String::new()))
    }
}

/// First non-empty value of flag, environment and fallback.
fn pick_secret(
    flag: Option<String>,
    env_value: Option<String>,
    fallback: Option<String>,
) -> Option<SecretString> {
    [flag, env_value, fallback]
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
        .map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn parses_release_subcommand() {
        let args = Args::parse_from([
            "azkaban-tools",
            "--debug",
            "release",
            "--remote",
            "origin",
        ]);

        assert!(args.debug);
        let Command::Release(release) = args.command else {
            panic!("expected release command");
        };
        let resolved = release.resolve(ReleaseConfig::default());
        assert_eq!(resolved.remote, "origin");
        assert_eq!(resolved.branch, "master");
    }

    #[test]
    fn parses_deploy_subcommand() {
        let args = Args::parse_from([
            "azkaban-tools",
            "deploy-example",
            "--url",
            "http://azkaban:8081",
            "--flow",
            "other",
            "--config",
            "custom.toml",
        ]);

        assert_eq!(args.config, Some(PathBuf::from("custom.toml")));
        let Command::DeployExample(deploy) = args.command else {
            panic!("expected deploy-example command");
        };
        let resolved = deploy.resolve(DeployConfig::default());
        assert_eq!(resolved.base_url, "http://azkaban:8081");
        assert_eq!(resolved.flow, "other");
        assert_eq!(resolved.project, "execpropstest");
        assert_eq!(resolved.runtime_properties.len(), 3);
    }

    #[test]
    fn secret_prefers_flag_then_env_then_fallback() {
        let pick = |flag: Option<&str>,
                    env: Option<&str>,
                    fallback: Option<&str>| {
            pick_secret(
                flag.map(String::from),
                env.map(String::from),
                fallback.map(String::from),
            )
            .map(|s| s.expose_secret().to_string())
        };

        assert_eq!(pick(Some("a"), Some("b"), Some("c")), Some("a".into()));
        assert_eq!(pick(None, Some("b"), Some("c")), Some("b".into()));
        assert_eq!(pick(Some(""), Some(""), Some("c")), Some("c".into()));
        assert_eq!(pick(None, None, None), None);
    }
}
