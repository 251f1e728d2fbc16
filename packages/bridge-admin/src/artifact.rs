//! Compiled contract artifacts
//!
//! Deployments need the creation bytecode of the mintable token. It is read
//! from the JSON artifact produced by the contract build, in either layout:
//!
//! - Foundry: `{"bytecode": {"object": "0x..."}}`
//! - Truffle / Hardhat: `{"contractName": "...", "bytecode": "0x..."}`

use alloy::primitives::Bytes;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::AdminError;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum BytecodeField {
    Foundry { object: Bytes },
    Plain(Bytes),
}

/// Creation bytecode of a compiled contract
#[derive(Debug, Clone, Deserialize)]
pub struct ContractArtifact {
    #[serde(rename = "contractName", default)]
    pub contract_name: Option<String>,
    bytecode: BytecodeField,
}

impl ContractArtifact {
    /// Load from file path
    pub fn from_file(path: &Path) -> Result<Self, AdminError> {
        let content = std::fs::read_to_string(path).map_err(|e| AdminError::Artifact {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_json(&content, path)
    }

    /// Parse artifact JSON; `origin` is only used in error messages
    pub fn from_json(content: &str, origin: &Path) -> Result<Self, AdminError> {
        let artifact: ContractArtifact =
            serde_json::from_str(content).map_err(|e| AdminError::Artifact {
                path: origin.to_path_buf(),
                reason: e.to_string(),
            })?;

        // Interfaces and abstract contracts compile to empty bytecode
        if artifact.creation_code().is_empty() {
            return Err(AdminError::Artifact {
                path: PathBuf::from(origin),
                reason: "artifact has no creation bytecode".to_string(),
            });
        }

        Ok(artifact)
    }

    pub fn creation_code(&self) -> &Bytes {
        match &self.bytecode {
            BytecodeField::Foundry { object } => object,
            BytecodeField::Plain(code) => code,
        }
    }

    /// Creation bytecode followed by the ABI-encoded constructor arguments
    pub fn deploy_code(&self, constructor_args: &[u8]) -> Bytes {
        let code = self.creation_code();
        let mut out = Vec::with_capacity(code.len() + constructor_args.len());
        out.extend_from_slice(code);
        out.extend_from_slice(constructor_args);
        out.into()
    }
}
