//! Bridge-side operations the provisioning workflow depends on
//!
//! [`BridgeChain`] is what the provisioner sees of one chain: its bridge, its
//! ERC20 handler and the signer acting on them. The EVM implementation lives
//! in [`crate::evm::EvmBridgeChain`].

use alloy::primitives::{Address, B256};
use async_trait::async_trait;

use crate::error::{AdminError, TxError};
use crate::resource::ResourceId;

/// One chain's bridge, ERC20 handler and admin signer.
///
/// Mutating methods return once the transaction is confirmed and yield its
/// hash.
#[async_trait]
pub trait BridgeChain: Send + Sync {
    /// Human-readable chain name
    fn name(&self) -> &str;

    /// Single-byte chain ID used by the bridge in resource IDs
    fn bridge_chain_id(&self) -> u8;

    /// ERC20 handler registered on this chain's bridge
    fn handler(&self) -> Address;

    /// Handler stored for `resource_id` on the bridge (zero if unregistered)
    async fn resource_handler(&self, resource_id: ResourceId) -> Result<Address, AdminError>;

    /// Deploy a mintable ERC20 and return its address
    async fn deploy_mintable_token(&self, name: &str, symbol: &str) -> Result<Address, TxError>;

    /// `adminSetResource(handler, resource_id, token)` on this bridge
    async fn set_resource(&self, resource_id: ResourceId, token: Address) -> Result<B256, TxError>;

    /// Role identifier that allows minting on `token`
    async fn minter_role(&self, token: Address) -> Result<B256, AdminError>;

    /// `grantRole(role, grantee)` on `token`
    async fn grant_role(&self, token: Address, role: B256, grantee: Address)
        -> Result<B256, TxError>;

    /// `adminSetBurnable(handler, token)` on this bridge
    async fn set_burnable(&self, token: Address) -> Result<B256, TxError>;
}

/// True iff the bridge already maps `resource_id` to a handler
pub async fn is_registered(
    chain: &dyn BridgeChain,
    resource_id: ResourceId,
) -> Result<bool, AdminError> {
    let handler = chain.resource_handler(resource_id).await?;
    Ok(handler != Address::ZERO)
}
