//! EVM connection with signing
//!
//! Builds an alloy provider with a wallet and the recommended fillers, checks
//! that the node answers and serves the expected chain, and submits admin
//! transactions one at a time.
//!
//! Every submission uses the configured gas price and gas limit, logs the
//! transaction hash as soon as it is sent, and waits (bounded by the
//! configured timeout) for a successful receipt.

use alloy::{
    network::{Ethereum, EthereumWallet, TransactionBuilder},
    primitives::{Address, B256},
    providers::{Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
    sol_types::SolCall,
    transports::{
        http::{Client, Http},
        Transport,
    },
};
use std::future::Future;
use std::marker::PhantomData;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{AdminError, TxError};

/// Longest wait for the node to answer `eth_chainId`
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Gas and confirmation settings applied to every transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxSettings {
    pub gas_price: u128,
    pub gas_limit: u64,
    /// Upper bound on waiting for a receipt
    pub timeout: Duration,
}

/// Where and as whom to connect
#[derive(Debug, Clone, Copy)]
pub struct ConnectParams<'a> {
    /// Human-readable chain name used in logs and errors
    pub name: &'a str,
    pub rpc_url: &'a str,
    pub private_key: &'a str,
    /// Expected EVM chain ID, verified against `eth_chainId` when set
    pub network_id: Option<u64>,
}

/// Provider with wallet for one chain
pub struct ChainConnection<P, T> {
    name: String,
    provider: P,
    signer: Address,
    chain_id: u64,
    settings: TxSettings,
    _transport: PhantomData<T>,
}

fn connect_timeout(settings: &TxSettings) -> Duration {
    settings.timeout.min(CONNECT_TIMEOUT)
}

/// Connect to a chain over HTTP.
///
/// Fails with [`AdminError::Connection`] when the URL or key is malformed,
/// the node is unreachable, or it serves a different chain than expected.
pub async fn connect(
    params: ConnectParams<'_>,
    settings: TxSettings,
) -> Result<ChainConnection<impl Provider<Http<Client>, Ethereum> + Clone, Http<Client>>, AdminError>
{
    let connection_error = |reason: String| AdminError::Connection {
        chain: params.name.to_string(),
        reason,
    };

    let signer: PrivateKeySigner = params
        .private_key
        .trim()
        .parse()
        .map_err(|e| connection_error(format!("invalid private key: {}", e)))?;
    let address = signer.address();
    let wallet = EthereumWallet::from(signer);

    let provider = ProviderBuilder::new()
        .with_recommended_fillers()
        .wallet(wallet)
        .on_http(
            params
                .rpc_url
                .parse()
                .map_err(|e| connection_error(format!("invalid RPC URL {}: {}", params.rpc_url, e)))?,
        );

    let chain_id = tokio::time::timeout(connect_timeout(&settings), provider.get_chain_id())
        .await
        .map_err(|_| connection_error(format!("{} did not answer eth_chainId", params.rpc_url)))?
        .map_err(|e| connection_error(format!("{} unreachable: {}", params.rpc_url, e)))?;

    if let Some(expected) = params.network_id {
        if expected != chain_id {
            return Err(connection_error(format!(
                "node reports chain ID {}, expected {}",
                chain_id, expected
            )));
        }
    }

    info!(
        chain = %params.name,
        rpc_url = %params.rpc_url,
        chain_id = chain_id,
        signer = %address,
        "Connected"
    );

    Ok(ChainConnection {
        name: params.name.to_string(),
        provider,
        signer: address,
        chain_id,
        settings,
        _transport: PhantomData,
    })
}

impl<P, T> ChainConnection<P, T>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Address transactions are signed with
    pub fn signer(&self) -> Address {
        self.signer
    }

    /// EVM chain ID reported by the node
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Sign, send and wait for a successful receipt
    pub async fn submit(
        &self,
        action: &str,
        tx: TransactionRequest,
    ) -> Result<TransactionReceipt, TxError> {
        let tx = tx
            .with_gas_price(self.settings.gas_price)
            .with_gas_limit(self.settings.gas_limit);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| TxError::Send {
                reason: e.to_string(),
            })?;

        let tx_hash = *pending.tx_hash();
        info!(chain = %self.name, action, tx_hash = %tx_hash, "Transaction sent");

        let receipt = with_timeout(tx_hash, self.settings.timeout, pending.get_receipt())
            .await?
            .map_err(|e| TxError::Receipt {
                tx_hash,
                reason: e.to_string(),
            })?;

        if !receipt.status() {
            return Err(TxError::Reverted { tx_hash });
        }

        debug!(
            chain = %self.name,
            tx_hash = %tx_hash,
            block = ?receipt.block_number,
            "Transaction confirmed"
        );

        Ok(receipt)
    }

    /// Submit an ABI-encoded call to `to`
    pub async fn call_contract<C: SolCall>(
        &self,
        action: &str,
        to: Address,
        call: &C,
    ) -> Result<TransactionReceipt, TxError> {
        let tx = TransactionRequest::default()
            .with_to(to)
            .with_input(call.abi_encode());
        self.submit(action, tx).await
    }
}

/// Bound a confirmation wait, mapping expiry to [`TxError::Timeout`]
pub(crate) async fn with_timeout<F>(
    tx_hash: B256,
    timeout: Duration,
    fut: F,
) -> Result<F::Output, TxError>
where
    F: Future,
{
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| TxError::Timeout { tx_hash, timeout })
}
