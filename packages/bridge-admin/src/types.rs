//! Shared types for token provisioning

use alloy::primitives::Address;
use serde::Deserialize;

use crate::resource::ResourceId;

/// A token native to one chain that should be mirrored on the other
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenDescriptor {
    /// Token contract on its origin chain
    pub address: Address,
    /// Display name reused for the mirrored token
    pub name: String,
    pub symbol: String,
}

/// Outcome of a fully provisioned token pairing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningRecord {
    pub symbol: String,
    pub source_token: Address,
    pub destination_token: Address,
    pub resource_id: ResourceId,
}
