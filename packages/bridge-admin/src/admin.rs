//! Single admin calls against a bridge or handler
//!
//! Each mutating command is an [`AdminCall`], sent either directly from the
//! signer or routed through a Gnosis Safe.

use alloy::{
    network::{Ethereum, TransactionBuilder},
    primitives::{Address, Bytes, FixedBytes, B256},
    providers::Provider,
    rpc::types::TransactionRequest,
    sol_types::SolCall,
    transports::Transport,
};
use std::fmt;
use tracing::info;

use crate::error::AdminError;
use crate::evm::client::ChainConnection;
use crate::evm::contracts::{Bridge, HandlerHelpers};
use crate::resource::ResourceId;
use crate::safe::{submit_via_safe, SafeRoute, SafeSubmission};

/// A mutating bridge admin call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCall {
    RegisterResource {
        bridge: Address,
        handler: Address,
        resource_id: ResourceId,
        target: Address,
    },
    RegisterGenericResource {
        bridge: Address,
        handler: Address,
        resource_id: ResourceId,
        target: Address,
        deposit_sig: FixedBytes<4>,
        execute_sig: FixedBytes<4>,
    },
    SetBurnable {
        bridge: Address,
        handler: Address,
        token: Address,
    },
    CancelProposal {
        bridge: Address,
        chain_id: u8,
        deposit_nonce: u64,
    },
}

impl AdminCall {
    /// Contract the call is sent to
    pub fn target(&self) -> Address {
        match self {
            Self::RegisterResource { bridge, .. }
            | Self::RegisterGenericResource { bridge, .. }
            | Self::SetBurnable { bridge, .. }
            | Self::CancelProposal { bridge, .. } => *bridge,
        }
    }

    /// Bridge function invoked
    pub fn action(&self) -> &'static str {
        match self {
            Self::RegisterResource { .. } => "adminSetResource",
            Self::RegisterGenericResource { .. } => "adminSetGenericResource",
            Self::SetBurnable { .. } => "adminSetBurnable",
            Self::CancelProposal { .. } => "adminCancelProposal",
        }
    }

    pub fn calldata(&self) -> Bytes {
        let encoded = match self {
            Self::RegisterResource {
                handler,
                resource_id,
                target,
                ..
            } => Bridge::adminSetResourceCall {
                handlerAddress: *handler,
                resourceID: (*resource_id).into(),
                tokenAddress: *target,
            }
            .abi_encode(),
            Self::RegisterGenericResource {
                handler,
                resource_id,
                target,
                deposit_sig,
                execute_sig,
                ..
            } => Bridge::adminSetGenericResourceCall {
                handlerAddress: *handler,
                resourceID: (*resource_id).into(),
                contractAddress: *target,
                depositFunctionSig: *deposit_sig,
                executeFunctionSig: *execute_sig,
            }
            .abi_encode(),
            Self::SetBurnable { handler, token, .. } => Bridge::adminSetBurnableCall {
                handlerAddress: *handler,
                tokenAddress: *token,
            }
            .abi_encode(),
            Self::CancelProposal {
                chain_id,
                deposit_nonce,
                ..
            } => Bridge::adminCancelProposalCall {
                chainID: *chain_id,
                depositNonce: *deposit_nonce,
            }
            .abi_encode(),
        };
        Bytes::from(encoded)
    }

    /// One-line description for logs
    pub fn describe(&self) -> String {
        match self {
            Self::RegisterResource {
                handler,
                resource_id,
                target,
                ..
            } => format!(
                "register resource {} -> {} (handler {})",
                resource_id, target, handler
            ),
            Self::RegisterGenericResource {
                handler,
                resource_id,
                target,
                deposit_sig,
                execute_sig,
                ..
            } => format!(
                "register generic resource {} -> {} (handler {}, deposit {}, execute {})",
                resource_id, target, handler, deposit_sig, execute_sig
            ),
            Self::SetBurnable { handler, token, .. } => {
                format!("set {} burnable (handler {})", token, handler)
            }
            Self::CancelProposal {
                chain_id,
                deposit_nonce,
                ..
            } => format!(
                "cancel proposal chain {} nonce {}",
                chain_id, deposit_nonce
            ),
        }
    }
}

/// What an executed admin call produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    Direct { tx_hash: B256 },
    Safe(SafeSubmission),
}

/// Send `call` from the signer, or through the Safe when `route` is given
pub async fn execute<P, T>(
    conn: &ChainConnection<P, T>,
    call: &AdminCall,
    route: Option<&SafeRoute>,
) -> Result<CallOutcome, AdminError>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    info!(
        chain = %conn.name(),
        bridge = %call.target(),
        "{}",
        call.describe()
    );

    if let Some(route) = route {
        let submission =
            submit_via_safe(conn, route, call.action(), call.target(), call.calldata()).await?;
        return Ok(CallOutcome::Safe(submission));
    }

    let tx = TransactionRequest::default()
        .with_to(call.target())
        .with_input(call.calldata());
    let receipt = conn
        .submit(call.action(), tx)
        .await
        .map_err(|source| AdminError::Transaction {
            chain: conn.name().to_string(),
            action: call.action().to_string(),
            source,
        })?;

    info!(
        chain = %conn.name(),
        tx_hash = %receipt.transaction_hash,
        "{} confirmed",
        call.action()
    );
    Ok(CallOutcome::Direct {
        tx_hash: receipt.transaction_hash,
    })
}

/// Bridge `ProposalStatus`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalStatus {
    Inactive,
    Active,
    Passed,
    Executed,
    Cancelled,
    Unknown(u8),
}

impl From<u8> for ProposalStatus {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Inactive,
            1 => Self::Active,
            2 => Self::Passed,
            3 => Self::Executed,
            4 => Self::Cancelled,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inactive => write!(f, "Inactive"),
            Self::Active => write!(f, "Active"),
            Self::Passed => write!(f, "Passed"),
            Self::Executed => write!(f, "Executed"),
            Self::Cancelled => write!(f, "Cancelled"),
            Self::Unknown(v) => write!(f, "Unknown({})", v),
        }
    }
}

/// A proposal as stored on the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalView {
    pub resource_id: ResourceId,
    pub data_hash: B256,
    pub yes_votes: Vec<Address>,
    pub no_votes: Vec<Address>,
    pub status: ProposalStatus,
    pub proposed_block: u64,
}

impl From<Bridge::Proposal> for ProposalView {
    fn from(p: Bridge::Proposal) -> Self {
        Self {
            resource_id: p._resourceID.into(),
            data_hash: p._dataHash,
            yes_votes: p._yesVotes,
            no_votes: p._noVotes,
            status: ProposalStatus::from(p._status),
            proposed_block: p._proposedBlock.saturating_to(),
        }
    }
}

impl fmt::Display for ProposalView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |votes: &[Address]| {
            votes
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        writeln!(f, "Resource ID:    {}", self.resource_id)?;
        writeln!(f, "Data hash:      {}", self.data_hash)?;
        writeln!(f, "Yes votes:      [{}]", join(&self.yes_votes))?;
        writeln!(f, "No votes:       [{}]", join(&self.no_votes))?;
        writeln!(f, "Status:         {}", self.status)?;
        write!(f, "Proposed block: {}", self.proposed_block)
    }
}

/// `getProposal(origin, nonce, dataHash)` on the bridge
pub async fn query_proposal<P, T>(
    conn: &ChainConnection<P, T>,
    bridge: Address,
    origin_chain_id: u8,
    deposit_nonce: u64,
    data_hash: B256,
) -> Result<ProposalView, AdminError>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    let contract = Bridge::new(bridge, conn.provider());
    let result = contract
        .getProposal(origin_chain_id, deposit_nonce, data_hash)
        .call()
        .await
        .map_err(|e| AdminError::Query {
            chain: conn.name().to_string(),
            what: "getProposal",
            reason: e.to_string(),
        })?;
    Ok(result._0.into())
}

/// Token contract the handler maps `resource_id` to (zero if none)
pub async fn query_resource<P, T>(
    conn: &ChainConnection<P, T>,
    handler: Address,
    resource_id: ResourceId,
) -> Result<Address, AdminError>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    let contract = HandlerHelpers::new(handler, conn.provider());
    let result = contract
        ._resourceIDToTokenContractAddress(resource_id.into())
        .call()
        .await
        .map_err(|e| AdminError::Query {
            chain: conn.name().to_string(),
            what: "_resourceIDToTokenContractAddress",
            reason: e.to_string(),
        })?;
    Ok(result._0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;

    const BRIDGE: Address = Address::repeat_byte(0x0b);
    const HANDLER: Address = Address::repeat_byte(0x0c);

    #[test]
    fn test_register_resource_calldata() {
        let rid = ResourceId::for_token(Address::repeat_byte(0xda), 1);
        let call = AdminCall::RegisterResource {
            bridge: BRIDGE,
            handler: HANDLER,
            resource_id: rid,
            target: Address::repeat_byte(0xda),
        };

        let decoded = Bridge::adminSetResourceCall::abi_decode(&call.calldata(), true).unwrap();
        assert_eq!(decoded.handlerAddress, HANDLER);
        assert_eq!(decoded.resourceID, B256::from(rid));
        assert_eq!(decoded.tokenAddress, Address::repeat_byte(0xda));
        assert_eq!(call.target(), BRIDGE);
        assert_eq!(call.action(), "adminSetResource");
    }

    #[test]
    fn test_generic_resource_calldata_keeps_selectors() {
        let call = AdminCall::RegisterGenericResource {
            bridge: BRIDGE,
            handler: HANDLER,
            resource_id: ResourceId::from_bytes([7u8; 32]),
            target: Address::repeat_byte(0x01),
            deposit_sig: FixedBytes([0xa9, 0x05, 0x9c, 0xbb]),
            execute_sig: FixedBytes::ZERO,
        };

        let decoded =
            Bridge::adminSetGenericResourceCall::abi_decode(&call.calldata(), true).unwrap();
        assert_eq!(decoded.depositFunctionSig, FixedBytes([0xa9, 0x05, 0x9c, 0xbb]));
        assert_eq!(decoded.executeFunctionSig, FixedBytes::ZERO);
    }

    #[test]
    fn test_cancel_proposal_calldata() {
        let call = AdminCall::CancelProposal {
            bridge: BRIDGE,
            chain_id: 2,
            deposit_nonce: 42,
        };

        let decoded = Bridge::adminCancelProposalCall::abi_decode(&call.calldata(), true).unwrap();
        assert_eq!(decoded.chainID, 2);
        assert_eq!(decoded.depositNonce, 42);
        assert!(call.describe().contains("nonce 42"));
    }

    #[test]
    fn test_set_burnable_calldata() {
        let call = AdminCall::SetBurnable {
            bridge: BRIDGE,
            handler: HANDLER,
            token: Address::repeat_byte(0x33),
        };

        let decoded = Bridge::adminSetBurnableCall::abi_decode(&call.calldata(), true).unwrap();
        assert_eq!(decoded.handlerAddress, HANDLER);
        assert_eq!(decoded.tokenAddress, Address::repeat_byte(0x33));
    }

    #[test]
    fn test_proposal_view() {
        let view = ProposalView::from(Bridge::Proposal {
            _resourceID: B256::repeat_byte(1),
            _dataHash: B256::repeat_byte(2),
            _yesVotes: vec![Address::repeat_byte(3)],
            _noVotes: vec![],
            _status: 2,
            _proposedBlock: U256::from(1234),
        });

        assert_eq!(view.status, ProposalStatus::Passed);
        assert_eq!(view.proposed_block, 1234);
        let text = view.to_string();
        assert!(text.contains("Status:         Passed"));
        assert!(text.contains("No votes:       []"));
    }

    #[test]
    fn test_unknown_status() {
        assert_eq!(ProposalStatus::from(9).to_string(), "Unknown(9)");
        assert_eq!(ProposalStatus::from(4), ProposalStatus::Cancelled);
    }
}
