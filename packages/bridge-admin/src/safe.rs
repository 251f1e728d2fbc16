//! Gnosis Safe routing for admin calls
//!
//! When the bridge admin is a Safe, an admin call is wrapped in a Safe
//! transaction. Owners approve its hash on-chain (`approveHash`) and the last
//! one executes it with pre-validated signatures for every approver.

use alloy::{
    network::Ethereum,
    primitives::{Address, Bytes, B256, U256},
    providers::Provider,
    transports::Transport,
};
use tracing::{info, warn};

use crate::error::{AdminError, TxError};
use crate::evm::client::ChainConnection;
use crate::evm::contracts::GnosisSafe;

/// `Enum.Operation.Call`
pub const CALL_OPERATION: u8 = 0;

/// Signature type byte marking an owner that approved the hash on-chain
const PRE_VALIDATED_V: u8 = 1;

const SIGNATURE_LEN: usize = 65;

/// How an admin call is routed through a Safe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SafeRoute {
    pub multi_sig: Address,
    /// Submit `approveHash` from the signer
    pub approve: bool,
    /// Submit `execTransaction`
    pub execute: bool,
    /// Owners that already approved the hash
    pub approvers: Vec<Address>,
}

/// Hashes of what was submitted through the Safe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeSubmission {
    pub safe_tx_hash: B256,
    pub approve_tx: Option<B256>,
    pub execute_tx: Option<B256>,
}

/// Concatenated pre-validated signatures, ordered by owner address.
///
/// Each entry is the owner left-padded to 32 bytes, 32 zero bytes and `v = 1`.
/// Duplicate owners are dropped; the Safe rejects unsorted or repeated owners.
pub fn pre_validated_signatures(owners: &[Address]) -> Bytes {
    let mut owners = owners.to_vec();
    owners.sort_unstable();
    owners.dedup();

    let mut signatures = Vec::with_capacity(owners.len() * SIGNATURE_LEN);
    for owner in owners {
        let mut signature = [0u8; SIGNATURE_LEN];
        signature[12..32].copy_from_slice(owner.as_slice());
        signature[64] = PRE_VALIDATED_V;
        signatures.extend_from_slice(&signature);
    }
    Bytes::from(signatures)
}

/// Owners whose pre-validated signatures accompany `execTransaction`.
///
/// The executing signer counts only when it is itself an owner; the Safe
/// rejects a pre-validated signature from any other address.
pub fn execution_signers(
    approvers: &[Address],
    signer: Address,
    signer_is_owner: bool,
) -> Vec<Address> {
    let mut owners = approvers.to_vec();
    if signer_is_owner {
        owners.push(signer);
    }
    owners.sort_unstable();
    owners.dedup();
    owners
}

/// Route `data` (a call to `to`) through the Safe in `route`
pub async fn submit_via_safe<P, T>(
    conn: &ChainConnection<P, T>,
    route: &SafeRoute,
    action: &str,
    to: Address,
    data: Bytes,
) -> Result<SafeSubmission, AdminError>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    let safe = GnosisSafe::new(route.multi_sig, conn.provider());
    let query_error = |what: &'static str, e: alloy::contract::Error| AdminError::Query {
        chain: conn.name().to_string(),
        what,
        reason: e.to_string(),
    };
    let tx_error = |step: &str, source: TxError| AdminError::Transaction {
        chain: conn.name().to_string(),
        action: format!("{} ({})", action, step),
        source,
    };

    let nonce = safe
        .nonce()
        .call()
        .await
        .map_err(|e| query_error("nonce", e))?
        ._0;

    let safe_tx_hash = safe
        .getTransactionHash(
            to,
            U256::ZERO,
            data.clone(),
            CALL_OPERATION,
            U256::ZERO,
            U256::ZERO,
            U256::ZERO,
            Address::ZERO,
            Address::ZERO,
            nonce,
        )
        .call()
        .await
        .map_err(|e| query_error("getTransactionHash", e))?
        ._0;

    info!(
        chain = %conn.name(),
        safe = %route.multi_sig,
        nonce = %nonce,
        safe_tx_hash = %safe_tx_hash,
        action,
        "Safe transaction hash"
    );

    let mut submission = SafeSubmission {
        safe_tx_hash,
        approve_tx: None,
        execute_tx: None,
    };

    if !route.approve && !route.execute {
        warn!(
            safe_tx_hash = %safe_tx_hash,
            "Neither --approve nor --execute given, nothing submitted"
        );
        return Ok(submission);
    }

    if route.approve {
        let call = GnosisSafe::approveHashCall {
            hashToApprove: safe_tx_hash,
        };
        let receipt = conn
            .call_contract("approveHash", route.multi_sig, &call)
            .await
            .map_err(|e| tx_error("approveHash", e))?;
        info!(
            chain = %conn.name(),
            safe_tx_hash = %safe_tx_hash,
            tx_hash = %receipt.transaction_hash,
            "Safe transaction approved"
        );
        submission.approve_tx = Some(receipt.transaction_hash);
    }

    if route.execute {
        let signer_is_owner = safe
            .isOwner(conn.signer())
            .call()
            .await
            .map_err(|e| query_error("isOwner", e))?
            ._0;
        if !signer_is_owner {
            warn!(
                signer = %conn.signer(),
                safe = %route.multi_sig,
                "Signer is not a Safe owner, executing with approver signatures only"
            );
        }
        let owners = execution_signers(&route.approvers, conn.signer(), signer_is_owner);

        let call = GnosisSafe::execTransactionCall {
            to,
            value: U256::ZERO,
            data,
            operation: CALL_OPERATION,
            safeTxGas: U256::ZERO,
            baseGas: U256::ZERO,
            gasPrice: U256::ZERO,
            gasToken: Address::ZERO,
            refundReceiver: Address::ZERO,
            signatures: pre_validated_signatures(&owners),
        };
        let receipt = conn
            .call_contract("execTransaction", route.multi_sig, &call)
            .await
            .map_err(|e| tx_error("execTransaction", e))?;
        info!(
            chain = %conn.name(),
            safe_tx_hash = %safe_tx_hash,
            tx_hash = %receipt.transaction_hash,
            "Safe transaction executed"
        );
        submission.execute_tx = Some(receipt.transaction_hash);
    }

    Ok(submission)
}
