//! bridge-admin: administration of an ERC20 bridge deployed on two EVM chains
//!
//! - **Provisioning** - mirror every token native to one chain onto the other
//!   (deploy, register on both bridges, grant minting, mark burnable)
//! - **Admin calls** - register resources, set burnable, cancel proposals,
//!   directly or through a Gnosis Safe
//! - **Queries** - proposals and handler resource mappings
//!
//! The provisioning workflow only sees chains through [`BridgeChain`]; the
//! EVM implementation lives in [`evm`].

pub mod admin;
pub mod artifact;
pub mod bridge;
pub mod config;
pub mod error;
pub mod evm;
pub mod provision;
pub mod redact;
pub mod report;
pub mod resource;
pub mod safe;
pub mod types;

pub use admin::{AdminCall, CallOutcome, ProposalStatus, ProposalView};
pub use artifact::ContractArtifact;
pub use bridge::{is_registered, BridgeChain};
pub use config::{ChainEndpoint, SetupConfig};
pub use error::{AdminError, TxError};
pub use provision::{Provisioner, TokenOutcome};
pub use report::ProvisioningReport;
pub use resource::{function_selector, ResourceId};
pub use safe::{execution_signers, pre_validated_signatures, SafeRoute, SafeSubmission};
pub use types::{ProvisioningRecord, TokenDescriptor};
