//! fabkv: key-value store on a permissioned ledger, from the command line.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use fabkv_client::{ClientConfig, KvClient};
use fabkv_gateway::HttpConnector;
use fabkv_types::PeerAddress;
use fabkv_utils::{init_logging, LogFormat};
use fabkv_wallet::{ensure_app_user, FileSystemWallet};

#[derive(Parser)]
#[command(name = "fabkv", about = "Key-value store on a permissioned ledger")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// flags and env vars override them.
    #[arg(long, env = "FABKV_CONFIG")]
    config: Option<PathBuf>,

    /// Wallet directory.
    #[arg(long, env = "FABKV_WALLET")]
    wallet: Option<PathBuf>,

    /// Network topology descriptor (JSON or TOML).
    #[arg(long, env = "FABKV_CONNECTION_PROFILE")]
    connection_profile: Option<PathBuf>,

    /// Peers that must endorse every write
    /// (comma-separated: "peer0.org1.example.com:7051,peer0.org2.example.com:9051").
    #[arg(long, env = "FABKV_ENDORSING_PEERS", value_delimiter = ',')]
    endorsing_peers: Vec<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "FABKV_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "FABKV_LOG_FORMAT")]
    log_format: Option<String>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Add the configured application user to the wallet if it is missing.
    Provision,
    #[command(flatten)]
    Ledger(LedgerCommand),
}

#[derive(clap::Subcommand)]
enum LedgerCommand {
    /// Submit the contract's InitLedger transaction.
    Init,
    /// Store a JSON value under KEY.
    Set { key: String, value: String },
    /// Print the JSON value stored under KEY.
    Get { key: String },
    /// Remove KEY.
    Delete { key: String },
}

fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ClientConfig::default(),
    };

    if let Some(wallet) = &cli.wallet {
        config.wallet_path = wallet.clone();
    }
    if let Some(profile) = &cli.connection_profile {
        config.connection_profile = profile.clone();
    }
    if !cli.endorsing_peers.is_empty() {
        config.endorsing_peers = cli
            .endorsing_peers
            .iter()
            .map(|p| PeerAddress::new(p.as_str()))
            .collect::<Result<Vec<_>, _>>()
            .context("invalid --endorsing-peers")?;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    Ok(config)
}

fn provision(config: &ClientConfig) -> anyhow::Result<()> {
    let wallet = FileSystemWallet::open(&config.wallet_path)?;
    let identity = ensure_app_user(&wallet, &config.msp_id, &config.app_user)?;
    println!(
        "{} ({}) is in wallet {}",
        identity.label(),
        identity.msp_id(),
        config.wallet_path.display()
    );
    Ok(())
}

async fn run(client: &KvClient, command: LedgerCommand) -> anyhow::Result<()> {
    match command {
        LedgerCommand::Init => {
            client.init_ledger().await?;
            tracing::info!("ledger initialised");
        }
        LedgerCommand::Set { key, value } => {
            let value: serde_json::Value = serde_json::from_str(&value)
                .with_context(|| format!("value for {key} is not JSON"))?;
            client.set(&key, &value).await?;
        }
        LedgerCommand::Get { key } => match client.get::<serde_json::Value>(&key).await? {
            Some(value) => println!("{value}"),
            None => anyhow::bail!("{key}: not found"),
        },
        LedgerCommand::Delete { key } => client.delete(&key).await?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let format: LogFormat = config.log_format.parse()?;
    init_logging(format, &config.log_level)?;

    match cli.command {
        Command::Provision => provision(&config),
        Command::Ledger(command) => {
            let client = KvClient::connect(&config, &HttpConnector::new())
                .await
                .context("failed to connect to the ledger")?;
            let result = run(&client, command).await;
            client.close().await;
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "fabkv",
            "--wallet",
            "/tmp/wallet",
            "--endorsing-peers",
            "peer0.org1.example.com:7051,peer0.org2.example.com:9051",
            "--log-format",
            "json",
            "get",
            "asset1",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.wallet_path, PathBuf::from("/tmp/wallet"));
        assert_eq!(config.endorsing_peers.len(), 2);
        assert_eq!(config.log_format, "json");
        assert_eq!(config.channel_name, "mychannel");
        assert!(matches!(cli.command, Command::Ledger(LedgerCommand::Get { ref key }) if key == "asset1"));
    }

    #[test]
    fn provision_is_its_own_command() {
        let cli = Cli::try_parse_from(["fabkv", "provision"]).unwrap();
        assert!(matches!(cli.command, Command::Provision));
    }
}
