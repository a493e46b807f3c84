use std::path::PathBuf;

use clap::Parser;
use device_auth::{http, AzureAdProvider, Config, ResourceCaller, TokenAcquirer, TokenCache};

mod logging;

use logging::init_logging;

#[derive(Parser, Debug, Clone)]
#[command(name = "device_profile")]
#[command(about = "Sign in with a device code and read the signed-in user's profile")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Path to the TOML config file
    #[arg(long, env = "DEVICE_PROFILE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory tenant to sign in against (overrides config)
    #[arg(long)]
    tenant: Option<String>,

    /// Number of profile reads; every read after the first renews the token with the refresh token
    #[arg(long, default_value = "2", value_parser = clap::value_parser!(u32).range(1..))]
    rounds: u32,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(e) = run(cli).await {
        log::error!("{e:#}");
        println!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(tenant) = cli.tenant {
        config.tenant = tenant;
    }

    log::info!("Tenant: {}", config.tenant);
    log::info!("Resource: {}", config.resource);
    log::debug!("Resource URL: {}", config.resource_url);

    let client = http::shared_client(&config)?;
    let provider = AzureAdProvider::new(client.clone());
    let mut acquirer = TokenAcquirer::new(provider, TokenCache::new())
        .with_refresh_fallback(config.fallback_to_device_code);
    let caller = ResourceCaller::new(client);

    for round in 1..=cli.rounds {
        log::debug!("Round {round} of {}", cli.rounds);
        let token = acquirer
            .acquire_token(&config.tenant, &config.resource, &config.client_id)
            .await?;
        let user_info = caller
            .call_resource(&config.resource_url, &token.access_token)
            .await?;
        println!("{user_info}");
    }

    Ok(())
}
