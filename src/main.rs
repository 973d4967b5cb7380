use clap::Parser;

use azkaban_tools::{
    cli, command, config::Config, error::ToolError, result::Result,
};

fn initialize_logger(debug: bool) -> Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("azkaban_tools")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )
    .map_err(ToolError::from)?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli_args = cli::Args::parse();

    initialize_logger(cli_args.debug)?;

    let config = Config::load(cli_args.config.as_deref())?;

    match &cli_args.command {
        cli::Command::Release(args) => command::release::execute(args, &config),
        cli::Command::DeployExample(args) => {
            command::deploy_example::execute(args, &config).await
        }
    }
}
