//! Minor-version release tagging command implementation.
use color_eyre::eyre::WrapErr;
use log::*;
use std::io::{self, BufRead, Write};

use crate::{
    cli::ReleaseArgs,
    config::{Config, ReleaseConfig},
    repo::{Repository, VersionControl},
    result::Result,
    version,
};

/// Question shown before anything is pushed.
pub const PUBLISH_PROMPT: &str = "Publish the new version? (y/N) ";

/// Execute the release command against the repository at the given path,
/// prompting on the terminal.
pub fn execute(args: &ReleaseArgs, config: &Config) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    execute_with_io(args, config, &mut input, &mut output)?;

    Ok(())
}

/// Resolve command line flags over the config file, open the repository
/// and run the release, reading the answer from `input`.
pub fn execute_with_io<R: BufRead, W: Write>(
    args: &ReleaseArgs,
    config: &Config,
    input: &mut R,
    output: &mut W,
) -> Result<Option<String>> {
    let release_config = args.resolve(config.release.clone());
    debug!(
        "releasing {} from {}",
        release_config.branch, release_config.remote
    );

    let repo = Repository::open(&args.repo_path, args.token())?;

    create_release(&repo, &release_config, input, output)
}

/// Run the full release sequence. Returns the published version, or `None`
/// when the operator declined.
pub fn create_release<R: BufRead, W: Write>(
    vcs: &dyn VersionControl,
    config: &ReleaseConfig,
    input: &mut R,
    output: &mut W,
) -> Result<Option<String>> {
    update_tags(vcs, config).wrap_err("failed to update local tags")?;

    let latest = get_latest_tag(vcs)?;
    info!("latest version: {latest}");

    let new_version = version::calculate_new_version(&latest)?;
    info!("new version: {new_version}");

    if !should_publish(input, output)? {
        writeln!(output, "Abort.")?;
        return Ok(None);
    }

    publish_new_version(vcs, &config.remote, &new_version)
        .wrap_err_with(|| format!("failed to publish {new_version}"))?;

    Ok(Some(new_version))
}

/// Sync the release branch with its upstream counterpart.
pub fn update_tags(
    vcs: &dyn VersionControl,
    config: &ReleaseConfig,
) -> Result<()> {
    vcs.fetch(&config.remote)?;
    vcs.checkout(&config.branch)?;
    vcs.merge(&config.remote, &config.branch)?;
    Ok(())
}

/// Latest release tag: the nearest annotated tag reachable from `HEAD`,
/// without the `-<n>-g<hash>` suffix.
pub fn get_latest_tag(vcs: &dyn VersionControl) -> Result<String> {
    vcs.latest_tag()
}

/// Ask the operator for confirmation. Only an exact `y` publishes.
pub fn should_publish<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<bool> {
    write!(output, "{PUBLISH_PROMPT}")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        debug!("no answer on input: not publishing");
        return Ok(false);
    }

    Ok(line.trim_end_matches(['\r', '\n']) == "y")
}

/// Create the annotated release tag and push it upstream.
pub fn publish_new_version(
    vcs: &dyn VersionControl,
    remote: &str,
    version: &str,
) -> Result<()> {
    vcs.create_annotated_tag(version, &format!("Release {version}"))?;
    vcs.push_tag(remote, version)?;
    Ok(())
}
