//! bridge-admin CLI
//!
//! Admin commands for an ERC20 bridge deployed on two EVM chains:
//! - `setup-tokens`            -> mirror native tokens across both chains
//! - `register-resource`, `register-generic-resource`, `set-burn`,
//!   `cancel-proposal`         -> one admin call on a bridge
//! - `safe-*`                  -> the same calls routed through a Gnosis Safe
//! - `query-proposal`, `query-resource` -> read-only lookups

use alloy::primitives::{Address, FixedBytes, B256};
use clap::{Args, Parser, Subcommand};
use eyre::{eyre, Result, WrapErr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use bridge_admin::admin::{self, AdminCall, CallOutcome};
use bridge_admin::config::{SetupConfig, DEFAULT_GAS_LIMIT, PRIVATE_KEY_ENV};
use bridge_admin::evm::{connect, connect_endpoint, ConnectParams, TxSettings};
use bridge_admin::{function_selector, ContractArtifact, Provisioner, ResourceId, SafeRoute};

#[derive(Parser)]
#[command(name = "bridge-admin")]
#[command(about = "Administration CLI for the ERC20 bridge", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    connection: ConnectionArgs,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Chain and signer used by single-call commands
#[derive(Args, Debug)]
struct ConnectionArgs {
    /// JSON-RPC endpoint
    #[arg(
        long,
        global = true,
        env = "BRIDGE_ADMIN_RPC_URL",
        default_value = "http://localhost:8545"
    )]
    url: String,

    /// Admin signing key (hex); also used by setup-tokens
    #[arg(long, global = true, env = PRIVATE_KEY_ENV, hide_env_values = true)]
    private_key: Option<String>,

    /// Gas price in wei (setup-tokens uses the per-chain value from its config)
    #[arg(long, global = true, env = "BRIDGE_ADMIN_GAS_PRICE", default_value_t = 20_000_000)]
    gas_price: u128,

    /// Gas limit per transaction
    #[arg(long, global = true, env = "BRIDGE_ADMIN_GAS_LIMIT", default_value_t = DEFAULT_GAS_LIMIT)]
    gas_limit: u64,

    /// Expected EVM chain ID; the command fails if the node reports another
    #[arg(long, global = true, env = "BRIDGE_ADMIN_NETWORK_ID")]
    network_id: Option<u64>,

    /// Seconds to wait for each transaction receipt
    #[arg(long, global = true, env = "BRIDGE_ADMIN_TX_TIMEOUT_SECS", default_value_t = 300)]
    tx_timeout_secs: u64,
}

impl ConnectionArgs {
    fn timeout(&self) -> Duration {
        Duration::from_secs(self.tx_timeout_secs)
    }

    fn settings(&self) -> TxSettings {
        TxSettings {
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            timeout: self.timeout(),
        }
    }

    fn private_key(&self) -> Result<&str> {
        self.private_key
            .as_deref()
            .ok_or_else(|| eyre!("--private-key or {} required", PRIVATE_KEY_ENV))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy, register and enable every native token on the other chain
    SetupTokens {
        /// Setup file describing both chains and their tokens
        #[arg(long, env = "BRIDGE_ADMIN_SETUP_CONFIG")]
        config: PathBuf,

        /// Re-provision tokens already registered on both bridges
        #[arg(long = "override")]
        override_registered: bool,
    },

    /// Register a resource ID with a contract address for a handler
    RegisterResource(ResourceArgs),

    /// Register a resource ID through a Gnosis Safe
    SafeRegisterResource {
        #[command(flatten)]
        call: ResourceArgs,
        #[command(flatten)]
        safe: SafeArgs,
    },

    /// Register a resource ID with a contract address for a generic handler
    RegisterGenericResource(GenericResourceArgs),

    /// Register a generic resource ID through a Gnosis Safe
    SafeRegisterGenericResource {
        #[command(flatten)]
        call: GenericResourceArgs,
        #[command(flatten)]
        safe: SafeArgs,
    },

    /// Mark a token contract as burnable in a handler
    SetBurn(BurnArgs),

    /// Mark a token burnable through a Gnosis Safe
    SafeSetBurn {
        #[command(flatten)]
        call: BurnArgs,
        #[command(flatten)]
        safe: SafeArgs,
    },

    /// Cancel a proposal that has passed the expiry threshold
    CancelProposal(ProposalArgs),

    /// Cancel a proposal through a Gnosis Safe
    SafeCancelProposal {
        #[command(flatten)]
        call: ProposalArgs,
        #[command(flatten)]
        safe: SafeArgs,
    },

    /// Print a proposal stored on the bridge
    QueryProposal {
        #[command(flatten)]
        proposal: ProposalArgs,

        /// Hash of the proposal data
        #[arg(long)]
        data_hash: B256,
    },

    /// Print the token contract a handler maps a resource ID to
    QueryResource {
        /// Handler contract address
        #[arg(long, env = "BRIDGE_ADMIN_HANDLER")]
        handler: Address,

        /// Resource ID to query
        #[arg(long)]
        resource_id: ResourceId,
    },
}

#[derive(Args, Debug)]
struct ResourceArgs {
    /// Bridge contract address
    #[arg(long, env = "BRIDGE_ADMIN_BRIDGE")]
    bridge: Address,

    /// Handler contract address
    #[arg(long, env = "BRIDGE_ADMIN_HANDLER")]
    handler: Address,

    /// Contract address to be registered
    #[arg(long)]
    target_contract: Address,

    /// Resource ID to be registered
    #[arg(long)]
    resource_id: ResourceId,
}

#[derive(Args, Debug)]
struct GenericResourceArgs {
    #[command(flatten)]
    resource: ResourceArgs,

    /// Deposit function selector, or prototype with --hash [default: 0x00000000]
    #[arg(long)]
    deposit_sig: Option<String>,

    /// Execute function selector, or prototype with --hash [default: 0x00000000]
    #[arg(long)]
    execute_sig: Option<String>,

    /// Treat signatures as function prototypes and use the first 4 bytes of their keccak256
    #[arg(long)]
    hash: bool,
}

#[derive(Args, Debug)]
struct BurnArgs {
    /// Bridge contract address
    #[arg(long, env = "BRIDGE_ADMIN_BRIDGE")]
    bridge: Address,

    /// Handler contract address
    #[arg(long, env = "BRIDGE_ADMIN_HANDLER")]
    handler: Address,

    /// Token contract to be marked burnable
    #[arg(long)]
    token_contract: Address,
}

#[derive(Args, Debug)]
struct ProposalArgs {
    /// Bridge contract address
    #[arg(long, env = "BRIDGE_ADMIN_BRIDGE")]
    bridge: Address,

    /// Origin chain ID of the proposal
    #[arg(long)]
    chain_id: u8,

    /// Deposit nonce of the proposal
    #[arg(long)]
    deposit_nonce: u64,
}

#[derive(Args, Debug)]
struct SafeArgs {
    /// Gnosis Safe acting as bridge admin
    #[arg(long, env = "BRIDGE_ADMIN_MULTISIG")]
    multi_sig: Address,

    /// Approve the Safe transaction hash from the signer
    #[arg(long)]
    approve: bool,

    /// Execute the Safe transaction
    #[arg(long)]
    execute: bool,

    /// Owners that already approved, comma separated
    #[arg(long, value_delimiter = ',')]
    approvers: Vec<Address>,
}

impl From<SafeArgs> for SafeRoute {
    fn from(args: SafeArgs) -> Self {
        SafeRoute {
            multi_sig: args.multi_sig,
            approve: args.approve,
            execute: args.execute,
            approvers: args.approvers,
        }
    }
}

impl From<ResourceArgs> for AdminCall {
    fn from(args: ResourceArgs) -> Self {
        AdminCall::RegisterResource {
            bridge: args.bridge,
            handler: args.handler,
            resource_id: args.resource_id,
            target: args.target_contract,
        }
    }
}

impl From<BurnArgs> for AdminCall {
    fn from(args: BurnArgs) -> Self {
        AdminCall::SetBurnable {
            bridge: args.bridge,
            handler: args.handler,
            token: args.token_contract,
        }
    }
}

impl From<ProposalArgs> for AdminCall {
    fn from(args: ProposalArgs) -> Self {
        AdminCall::CancelProposal {
            bridge: args.bridge,
            chain_id: args.chain_id,
            deposit_nonce: args.deposit_nonce,
        }
    }
}

impl TryFrom<GenericResourceArgs> for AdminCall {
    type Error = eyre::Report;

    fn try_from(args: GenericResourceArgs) -> Result<Self> {
        Ok(AdminCall::RegisterGenericResource {
            bridge: args.resource.bridge,
            handler: args.resource.handler,
            resource_id: args.resource.resource_id,
            target: args.resource.target_contract,
            deposit_sig: selector(args.deposit_sig.as_deref(), args.hash)?,
            execute_sig: selector(args.execute_sig.as_deref(), args.hash)?,
        })
    }
}

/// Unset signatures stay zero, with or without `--hash`
fn selector(value: Option<&str>, hash: bool) -> Result<FixedBytes<4>> {
    let Some(value) = value else {
        return Ok(FixedBytes::ZERO);
    };
    if hash {
        return Ok(function_selector(value));
    }
    value
        .parse::<FixedBytes<4>>()
        .map_err(|e| eyre!("invalid function selector {}: {}", value, e))
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,bridge_admin=debug"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads env fallbacks
    dotenvy::dotenv().ok();
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let connection = cli.connection;
    match cli.command {
        Commands::SetupTokens {
            config,
            override_registered,
        } => setup_tokens(&connection, &config, override_registered).await,

        Commands::RegisterResource(args) => send(&connection, args.into(), None).await,
        Commands::SafeRegisterResource { call, safe } => {
            send(&connection, call.into(), Some(safe.into())).await
        }
        Commands::RegisterGenericResource(args) => {
            send(&connection, args.try_into()?, None).await
        }
        Commands::SafeRegisterGenericResource { call, safe } => {
            send(&connection, call.try_into()?, Some(safe.into())).await
        }
        Commands::SetBurn(args) => send(&connection, args.into(), None).await,
        Commands::SafeSetBurn { call, safe } => {
            send(&connection, call.into(), Some(safe.into())).await
        }
        Commands::CancelProposal(args) => send(&connection, args.into(), None).await,
        Commands::SafeCancelProposal { call, safe } => {
            send(&connection, call.into(), Some(safe.into())).await
        }

        Commands::QueryProposal {
            proposal,
            data_hash,
        } => {
            let conn = connect(connect_params(&connection)?, connection.settings()).await?;
            let view = admin::query_proposal(
                &conn,
                proposal.bridge,
                proposal.chain_id,
                proposal.deposit_nonce,
                data_hash,
            )
            .await?;
            println!("{}", view);
            Ok(())
        }

        Commands::QueryResource {
            handler,
            resource_id,
        } => {
            let conn = connect(connect_params(&connection)?, connection.settings()).await?;
            let token = admin::query_resource(&conn, handler, resource_id).await?;
            println!("Resource ID {} is mapped to contract {}", resource_id, token);
            Ok(())
        }
    }
}

fn connect_params(connection: &ConnectionArgs) -> Result<ConnectParams<'_>> {
    Ok(ConnectParams {
        name: &connection.url,
        rpc_url: &connection.url,
        private_key: connection.private_key()?,
        network_id: connection.network_id,
    })
}

async fn send(connection: &ConnectionArgs, call: AdminCall, route: Option<SafeRoute>) -> Result<()> {
    let conn = connect(connect_params(connection)?, connection.settings()).await?;

    match admin::execute(&conn, &call, route.as_ref()).await? {
        CallOutcome::Direct { tx_hash } => {
            println!("{} confirmed in {}", call.action(), tx_hash);
        }
        CallOutcome::Safe(submission) => {
            println!("Safe transaction hash: {}", submission.safe_tx_hash);
            if let Some(tx_hash) = submission.approve_tx {
                println!("Approved in {}", tx_hash);
            }
            if let Some(tx_hash) = submission.execute_tx {
                println!("Executed in {}", tx_hash);
            }
        }
    }
    Ok(())
}

async fn setup_tokens(
    connection: &ConnectionArgs,
    path: &Path,
    override_registered: bool,
) -> Result<()> {
    let config = SetupConfig::load(path, connection.private_key.as_deref())
        .wrap_err("Failed to load setup configuration")?;
    info!(
        chain_a = %config.chain_a.name,
        chain_b = %config.chain_b.name,
        tokens_a = config.tokens_a.len(),
        tokens_b = config.tokens_b.len(),
        "Configuration loaded"
    );

    let artifact = ContractArtifact::from_file(&config.token_artifact)?;

    let timeout = connection.timeout();
    let chain_a = connect_endpoint(&config.chain_a, timeout, artifact.clone()).await?;
    let chain_b = connect_endpoint(&config.chain_b, timeout, artifact).await?;

    let report = Provisioner::new(&chain_a, &chain_b, override_registered)
        .run(&config.tokens_a)
        .await
        .wrap_err_with(|| {
            format!(
                "Provisioning {} tokens on {} failed",
                config.chain_a.name, config.chain_b.name
            )
        })?;
    println!("{}", report);

    let report = Provisioner::new(&chain_b, &chain_a, override_registered)
        .run(&config.tokens_b)
        .await
        .wrap_err_with(|| {
            format!(
                "Provisioning {} tokens on {} failed",
                config.chain_b.name, config.chain_a.name
            )
        })?;
    println!("{}", report);

    info!("Token setup complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!(selector(None, true).unwrap(), FixedBytes::ZERO);
        assert_eq!(
            selector(Some("0xa9059cbb"), false).unwrap(),
            FixedBytes([0xa9, 0x05, 0x9c, 0xbb])
        );
        assert_eq!(
            selector(Some("transfer(address,uint256)"), true).unwrap(),
            FixedBytes([0xa9, 0x05, 0x9c, 0xbb])
        );
        assert!(selector(Some("transfer(address,uint256)"), false).is_err());
    }

    #[test]
    fn test_safe_command_parsing() {
        let cli = Cli::try_parse_from([
            "bridge-admin",
            "safe-set-burn",
            "--bridge",
            "0x0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b",
            "--handler",
            "0x0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c",
            "--token-contract",
            "0x3333333333333333333333333333333333333333",
            "--multi-sig",
            "0x5555555555555555555555555555555555555555",
            "--approvers",
            "0x1111111111111111111111111111111111111111,0x2222222222222222222222222222222222222222",
            "--execute",
        ])
        .unwrap();

        match cli.command {
            Commands::SafeSetBurn { call, safe } => {
                assert_eq!(call.token_contract, Address::repeat_byte(0x33));
                let route = SafeRoute::from(safe);
                assert!(route.execute);
                assert!(!route.approve);
                assert_eq!(route.approvers.len(), 2);
            }
            _ => panic!("expected safe-set-burn"),
        }
    }

    #[test]
    fn test_generic_resource_with_hash() {
        let cli = Cli::try_parse_from([
            "bridge-admin",
            "register-generic-resource",
            "--bridge",
            "0x0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b",
            "--handler",
            "0x0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c",
            "--target-contract",
            "0x3333333333333333333333333333333333333333",
            "--resource-id",
            "0x00000000000000000000006b175474e89094c44da98b954eedeac495271d0f01",
            "--deposit-sig",
            "transfer(address,uint256)",
            "--hash",
        ])
        .unwrap();

        let Commands::RegisterGenericResource(args) = cli.command else {
            panic!("expected register-generic-resource");
        };
        match AdminCall::try_from(args).unwrap() {
            AdminCall::RegisterGenericResource {
                deposit_sig,
                execute_sig,
                ..
            } => {
                assert_eq!(deposit_sig, FixedBytes([0xa9, 0x05, 0x9c, 0xbb]));
                assert_eq!(execute_sig, FixedBytes::ZERO);
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_setup_tokens_override_flag() {
        let cli = Cli::try_parse_from([
            "bridge-admin",
            "setup-tokens",
            "--config",
            "setup.json",
            "--override",
        ])
        .unwrap();

        match cli.command {
            Commands::SetupTokens {
                config,
                override_registered,
            } => {
                assert_eq!(config, PathBuf::from("setup.json"));
                assert!(override_registered);
            }
            _ => panic!("expected setup-tokens"),
        }
    }
}
