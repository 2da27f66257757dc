use clap::Parser;
use marketplace_scripts::{
    cli::Cli, constants::DEFAULT_LOG_FILTER, errors::ScriptError, utils::setup_client,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    let Cli {
        priv_key,
        rpc_url,
        deployments_path,
        command,
    } = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().pretty().with_env_filter(filter).init();

    let client = setup_client(&priv_key, &rpc_url).await?;

    command.run(client, &deployments_path).await
}
