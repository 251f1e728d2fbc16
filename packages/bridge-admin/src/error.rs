//! Error types for bridge administration
//!
//! [`TxError`] describes what went wrong with a single transaction;
//! [`AdminError`] says which step of which command it broke.

use alloy::primitives::{Address, B256};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::resource::ResourceId;

/// Failure of a single submitted transaction
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TxError {
    #[error("failed to send transaction: {reason}")]
    Send { reason: String },

    #[error("failed to fetch receipt for {tx_hash}: {reason}")]
    Receipt { tx_hash: B256, reason: String },

    #[error("transaction {tx_hash} not confirmed after {timeout:?}")]
    Timeout { tx_hash: B256, timeout: Duration },

    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: B256 },

    #[error("deployment transaction {tx_hash} reported no contract address")]
    MissingContractAddress { tx_hash: B256 },
}

/// Errors surfaced by admin commands and the provisioning workflow
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("cannot connect to chain {chain}: {reason}")]
    Connection { chain: String, reason: String },

    #[error("query {what} on chain {chain} failed: {reason}")]
    Query {
        chain: String,
        what: &'static str,
        reason: String,
    },

    #[error("deploying {symbol} on chain {chain} failed")]
    Deployment {
        chain: String,
        symbol: String,
        #[source]
        source: TxError,
    },

    #[error("registering resource {resource_id} on chain {chain} failed")]
    Registration {
        chain: String,
        resource_id: ResourceId,
        #[source]
        source: TxError,
    },

    #[error("granting minter role on token {token} (chain {chain}) failed")]
    Grant {
        chain: String,
        token: Address,
        #[source]
        source: TxError,
    },

    #[error("marking token {token} burnable on chain {chain} failed")]
    Burnable {
        chain: String,
        token: Address,
        #[source]
        source: TxError,
    },

    #[error("{action} on chain {chain} failed")]
    Transaction {
        chain: String,
        action: String,
        #[source]
        source: TxError,
    },

    #[error("invalid contract artifact {path}: {reason}")]
    Artifact { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Failure to parse a resource ID from hex
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid resource ID {input:?}: {reason}")]
pub struct ParseResourceIdError {
    pub input: String,
    pub reason: String,
}
