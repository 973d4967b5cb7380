//! Example project deployment command implementation.
use color_eyre::eyre::WrapErr;
use log::*;
use secrecy::SecretString;
use std::{
    env,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tokio::fs;

use crate::{
    archive,
    azkaban::{
        client::AzkabanClient,
        request::{
            CreateProjectRequest, ExecuteFlowRequest, UploadProjectRequest,
        },
    },
    cli::DeployArgs,
    config::{Config, DeployConfig},
    result::Result,
};

/// Execute the deploy-example command.
pub async fn execute(args: &DeployArgs, config: &Config) -> Result<()> {
    let deploy_config = args.resolve(config.deploy.clone());
    let password = args.password(&deploy_config);
    let mut output = io::stdout();

    deploy_example(&deploy_config, &password, &mut output).await?;

    Ok(())
}

/// Archive location: configured path or `<temp dir>/<project>.zip`.
pub fn zip_path(config: &DeployConfig) -> PathBuf {
    config.zip_path.as_ref().map(PathBuf::from).unwrap_or_else(|| {
        env::temp_dir().join(format!("{}.zip", config.project))
    })
}

/// Zip, upload and execute the example project, then print a link to the
/// execution. Returns the link.
pub async fn deploy_example<W: Write>(
    config: &DeployConfig,
    password: &SecretString,
    output: &mut W,
) -> Result<String> {
    let archive_path = archive::create_zip(
        Path::new(&config.fixture_dir),
        &zip_path(config),
    )
    .wrap_err("failed to archive example project")?;

    let session = AzkabanClient::new(&config.base_url)?
        .login(&config.username, password)
        .await?;

    session
        .create_project_if_not_exists(&CreateProjectRequest {
            name: config.project.clone(),
            description: config.description.clone(),
        })
        .await?;

    let file_name = archive_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| format!("{}.zip", config.project));

    let content = fs::read(&archive_path).await?;

    let uploaded = session
        .upload_zip(UploadProjectRequest {
            project: config.project.clone(),
            file_name,
            content,
        })
        .await?;

    info!(
        "uploaded project {} (id {})",
        config.project, uploaded.project_id
    );

    let exec_id = session
        .execute_flow(&ExecuteFlowRequest {
            project: config.project.clone(),
            flow: config.flow.clone(),
            runtime_properties: config.runtime_properties.clone(),
        })
        .await?;

    let url = session.execution_url(&exec_id)?.to_string();

    writeln!(output, "{url}")?;

    Ok(url)
}
