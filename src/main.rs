//! DEX connection command line tool
//!
//! Inspects and changes the persisted connection settings, holds keep-alive
//! subscriptions open, and submits a SOL transfer through the regular
//! transaction submission workflow.

#![deny(unused_imports)]
#![deny(unused_mut)]
#![deny(unused_variables)]
#![warn(unused_must_use)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dex_connection::config::{Config, CONFIG_ENV};
use dex_connection::connection::ConnectionProvider;
use dex_connection::endpoints::ENDPOINTS;
use dex_connection::metrics::metrics;
use dex_connection::notify::TracingNotifier;
use dex_connection::rpc::SolanaTransportFactory;
use dex_connection::storage::SledStore;
use dex_connection::tx_submit::send_transaction_with_options;
use dex_connection::wallet::KeypairWallet;
use solana_sdk::{pubkey::Pubkey, system_instruction};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = CONFIG_ENV, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the supported networks
    Endpoints,

    /// Print the active endpoint, network and slippage
    Show,

    /// Persist a new endpoint, given as URL or network name
    SetEndpoint { endpoint: String },

    /// Persist a new slippage tolerance
    SetSlippage { value: f64 },

    /// Hold the connection handles and their keep-alive subscriptions until Ctrl-C
    KeepAlive,

    /// Transfer lamports from a local keypair
    Transfer {
        /// Keypair file of the fee payer and sender
        #[arg(long)]
        keypair: String,

        /// Recipient address
        #[arg(long)]
        to: Pubkey,

        #[arg(long)]
        lamports: u64,

        /// Return right after submission
        #[arg(long)]
        no_confirm: bool,

        /// Print the metrics registry afterwards
        #[arg(long)]
        metrics: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let config = load_config(&args.config)?;

    if let Command::Endpoints = args.command {
        for descriptor in ENDPOINTS.iter() {
            println!(
                "{:<14} {:<40} chain {}",
                descriptor.name, descriptor.url, descriptor.chain_id
            );
        }
        return Ok(());
    }

    let store = SledStore::open(&config.storage.path)
        .with_context(|| format!("Failed to open settings store at {}", config.storage.path))?;
    let provider = ConnectionProvider::start(
        Arc::new(SolanaTransportFactory),
        Arc::new(store),
        config.provider_settings()?,
    )
    .context("Failed to start connection provider")?;

    let outcome = run_command(&provider, &config, args.command).await;
    provider.shutdown().await;
    outcome
}

async fn run_command(provider: &ConnectionProvider, config: &Config, command: Command) -> Result<()> {
    match command {
        Command::Endpoints => {}
        Command::Show => {
            let context = provider.context();
            println!("endpoint: {}", context.endpoint);
            println!("network:  {}", context.network);
            println!("slippage: {}", context.slippage);
        }
        Command::SetEndpoint { endpoint } => {
            provider.set_endpoint(&endpoint).await?;
            println!(
                "endpoint set to {} ({})",
                provider.endpoint(),
                provider.network()
            );
        }
        Command::SetSlippage { value } => {
            provider.set_slippage(value)?;
            println!("slippage set to {}", provider.slippage());
        }
        Command::KeepAlive => {
            info!(
                endpoint = %provider.endpoint(),
                handles = provider.keep_alive_count().await,
                "Holding keep-alive subscriptions, press Ctrl-C to stop"
            );
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for Ctrl-C")?;
            info!("Received shutdown signal");
        }
        Command::Transfer {
            keypair,
            to,
            lamports,
            no_confirm,
            metrics: print_metrics,
        } => {
            let wallet = KeypairWallet::from_file(&keypair).context("Failed to load wallet")?;
            let instruction = system_instruction::transfer(&wallet.pubkey(), &to, lamports);
            let options = config.submit_options()?;

            let connection = provider.send_connection();
            let signature = send_transaction_with_options(
                connection.as_ref(),
                &wallet,
                &[instruction],
                &[],
                !no_confirm,
                &TracingNotifier,
                &options,
            )
            .await?;
            println!("{}", signature);

            if print_metrics {
                print!("{}", metrics().render()?);
            }
        }
    }
    Ok(())
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        "dex_connection=debug,info"
    } else {
        "dex_connection=info,warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    Ok(())
}

/// Load configuration from file with fallback to defaults
fn load_config(path: &str) -> Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file_with_env(path)
            .with_context(|| format!("Failed to load config from {}", path))
    } else {
        dotenvy::dotenv().ok();
        warn!("Config file '{}' not found, using defaults", path);
        Ok(Config::default())
    }
}
