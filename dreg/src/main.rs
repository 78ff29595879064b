use anyhow::{Context, Result};
use clap::Parser;
use ociclient::Client;
use tracing::debug;

use dreg::auth;
use dreg::commands::{self, Cli};
use dreg::config::AppConfig;
use dreg::docker_config::DockerConfig;
use dreg::error::is_auth_failure;
use dreg::logging;

const LOGIN_HINT: &str = "Unauthenticated. Login with 'docker login'";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init(cli.global.verbose);

    if let Err(e) = run(cli).await {
        if is_auth_failure(&e) {
            eprintln!("{}", LOGIN_HINT);
        } else {
            eprintln!("{:#}", e);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(&cli.global).context("Failed to load configuration")?;
    debug!("Loaded configuration: {:?}", config);

    let store = DockerConfig::load(&config.docker_config);
    let options = auth::select_auth_option(&store, &config.url)
        .into_iter()
        .collect();

    let client = Client::new(&config.url, options)
        .with_context(|| format!("Failed to create client for {}", config.url))?;

    commands::dispatch(&cli.command, &client, cli.global.verbose).await?;
    Ok(())
}
