use anyhow::Result;
use clap::{Parser, Subcommand};

use jackbot_core::config::{self, Config};

#[derive(Parser)]
#[command(
    name = "jackbot",
    about = "jackbot - Amazon price-watch bot for Facebook Messenger",
    version = jackbot_core::VERSION,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize jackbot configuration
    Onboard,
    /// Start the jackbot gateway
    Gateway {
        /// Gateway port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show jackbot status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("jackbot=info".parse().unwrap())
                .add_directive("jackbot_core=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Onboard => cmd_onboard()?,
        Commands::Gateway { port } => cmd_gateway(port).await?,
        Commands::Status => cmd_status()?,
    }

    Ok(())
}

// ====== Commands ======

fn cmd_onboard() -> Result<()> {
    let config_path = config::get_config_path();

    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        println!("Delete it first to re-onboard.");
        return Ok(());
    }

    let cfg = Config::default();
    config::save_config(&cfg, None)?;
    println!("Created config at {}", config_path.display());

    println!("\njackbot is ready!");
    println!("\nNext steps:");
    println!("  1. Add your Messenger credentials to ~/.jackbot/config.json");
    println!("     (appSecret, validationToken, pageAccessToken)");
    println!("  2. Add your catalog associate tag and cloudimage token");
    println!("  3. Start the gateway: jackbot gateway");
    Ok(())
}

async fn cmd_gateway(port: Option<u16>) -> Result<()> {
    let mut cfg = config::load_config_from_env();
    if let Some(port) = port {
        cfg.gateway.port = port;
    }

    println!("Starting jackbot gateway on port {}...", cfg.gateway.port);

    jackbot_core::service::gateway::run_gateway(cfg).await
}

fn cmd_status() -> Result<()> {
    let config_path = config::get_config_path();
    let cfg = config::load_config(None);

    println!("jackbot Status\n");

    let config_exists = config_path.exists();
    println!(
        "Config: {} {}",
        config_path.display(),
        if config_exists { "✓" } else { "✗" }
    );

    if config_exists {
        println!(
            "Messenger app secret: {}",
            if cfg.messenger.app_secret.is_empty() {
                "not set"
            } else {
                "✓"
            }
        );
        println!(
            "Messenger page token: {}",
            if cfg.messenger.page_access_token.is_empty() {
                "not set"
            } else {
                "✓"
            }
        );
        println!(
            "Catalog associate tag: {}",
            if cfg.catalog.associate_tag.is_empty() {
                "not set"
            } else {
                "✓"
            }
        );
        println!(
            "Image proxy token: {}",
            if cfg.image_proxy.token.is_empty() {
                "not set"
            } else {
                "✓"
            }
        );
        println!("Regions: {}", cfg.catalog.regions.len());
    } else {
        println!("\nRun: jackbot onboard");
    }

    Ok(())
}
