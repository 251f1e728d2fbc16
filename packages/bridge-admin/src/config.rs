//! Setup configuration
//!
//! `setup-tokens` reads a JSON file describing both chains and the tokens
//! native to each of them. The signing key is shared by both chains and is
//! normally taken from the environment (`BRIDGE_ADMIN_PRIVATE_KEY`, `.env`
//! supported) rather than stored in the file.

use alloy::primitives::Address;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::AdminError;
use crate::redact::Redacted;
use crate::types::TokenDescriptor;

/// Environment variable holding the admin signing key
pub const PRIVATE_KEY_ENV: &str = "BRIDGE_ADMIN_PRIVATE_KEY";

/// Gas limit applied to every admin transaction unless configured otherwise
pub const DEFAULT_GAS_LIMIT: u64 = 8_000_000;

fn default_gas_limit() -> u64 {
    DEFAULT_GAS_LIMIT
}

/// One chain as written in the setup file
#[derive(Debug, Clone, Deserialize)]
pub struct ChainSection {
    pub name: String,
    pub rpc_url: String,
    /// Expected EVM chain ID; checked against the node when set
    #[serde(default)]
    pub network_id: Option<u64>,
    /// Single-byte chain ID the bridge contracts use in resource IDs
    pub bridge_chain_id: u8,
    pub bridge: Address,
    pub erc20_handler: Address,
    pub gas_price: u64,
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    /// Tokens native to this chain, mirrored onto the other one
    #[serde(default)]
    pub tokens: Vec<TokenDescriptor>,
}

#[derive(Debug, Deserialize)]
struct SetupFile {
    token_artifact: PathBuf,
    chain_a: ChainSection,
    chain_b: ChainSection,
    #[serde(default)]
    private_key: Option<String>,
}

/// Connection and contract details for one chain
#[derive(Clone)]
pub struct ChainEndpoint {
    pub name: String,
    pub rpc_url: String,
    pub network_id: Option<u64>,
    pub bridge_chain_id: u8,
    pub private_key: String,
    pub bridge: Address,
    pub erc20_handler: Address,
    pub gas_price: u128,
    pub gas_limit: u64,
}

/// Custom Debug that redacts private_key to prevent accidental log leakage.
impl fmt::Debug for ChainEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainEndpoint")
            .field("name", &self.name)
            .field("rpc_url", &self.rpc_url)
            .field("network_id", &self.network_id)
            .field("bridge_chain_id", &self.bridge_chain_id)
            .field("private_key", &Redacted(&self.private_key))
            .field("bridge", &self.bridge)
            .field("erc20_handler", &self.erc20_handler)
            .field("gas_price", &self.gas_price)
            .field("gas_limit", &self.gas_limit)
            .finish()
    }
}

/// Everything `setup-tokens` needs, loaded once at startup
#[derive(Debug, Clone)]
pub struct SetupConfig {
    pub chain_a: ChainEndpoint,
    pub chain_b: ChainEndpoint,
    /// Tokens native to chain A
    pub tokens_a: Vec<TokenDescriptor>,
    /// Tokens native to chain B
    pub tokens_b: Vec<TokenDescriptor>,
    /// Artifact of the mintable ERC20 deployed as the mirrored token
    pub token_artifact: PathBuf,
}

impl SetupConfig {
    /// Load from a setup file.
    ///
    /// The key passed in (from `--private-key` or the environment) wins over
    /// a `private_key` entry in the file.
    pub fn load(path: &Path, private_key: Option<&str>) -> Result<Self, AdminError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AdminError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_json(&content, base_dir, private_key)
    }

    /// Parse setup JSON. Relative artifact paths resolve against `base_dir`.
    pub fn from_json(
        content: &str,
        base_dir: &Path,
        private_key: Option<&str>,
    ) -> Result<Self, AdminError> {
        let file: SetupFile = serde_json::from_str(content)
            .map_err(|e| AdminError::Config(format!("malformed setup file: {}", e)))?;

        let non_blank = |k: &String| !k.trim().is_empty();
        let private_key = private_key
            .map(str::to_string)
            .filter(non_blank)
            .or(file.private_key.filter(non_blank))
            .or_else(|| env::var(PRIVATE_KEY_ENV).ok().filter(non_blank))
            .ok_or_else(|| {
                AdminError::Config(format!(
                    "no signing key: pass --private-key or set {}",
                    PRIVATE_KEY_ENV
                ))
            })?;

        if file.chain_a.bridge_chain_id == file.chain_b.bridge_chain_id {
            return Err(AdminError::Config(format!(
                "both chains use bridge chain ID {}; resource IDs would collide",
                file.chain_a.bridge_chain_id
            )));
        }

        let token_artifact = if file.token_artifact.is_absolute() {
            file.token_artifact
        } else {
            base_dir.join(file.token_artifact)
        };

        let (chain_a, tokens_a) = endpoint(file.chain_a, &private_key)?;
        let (chain_b, tokens_b) = endpoint(file.chain_b, &private_key)?;

        Ok(Self {
            chain_a,
            chain_b,
            tokens_a,
            tokens_b,
            token_artifact,
        })
    }
}

fn endpoint(
    section: ChainSection,
    private_key: &str,
) -> Result<(ChainEndpoint, Vec<TokenDescriptor>), AdminError> {
    for (what, addr) in [
        ("bridge", section.bridge),
        ("erc20_handler", section.erc20_handler),
    ] {
        if addr == Address::ZERO {
            return Err(AdminError::Config(format!(
                "{} address for chain {} is zero",
                what, section.name
            )));
        }
    }

    let endpoint = ChainEndpoint {
        name: section.name,
        rpc_url: section.rpc_url,
        network_id: section.network_id,
        bridge_chain_id: section.bridge_chain_id,
        private_key: private_key.to_string(),
        bridge: section.bridge,
        erc20_handler: section.erc20_handler,
        gas_price: u128::from(section.gas_price),
        gas_limit: section.gas_limit,
    };
    Ok((endpoint, section.tokens))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::str::FromStr;

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn sample(chain_b_id: u8) -> String {
        format!(
            r#"{{
                "token_artifact": "artifacts/ERC20PresetMinterPauser.json",
                "chain_a": {{
                    "name": "ethereum",
                    "rpc_url": "http://localhost:8545",
                    "bridge_chain_id": 1,
                    "bridge": "0x62877dDCd49aD22f5eDfc6ac108e9a4b5D2bD88B",
                    "erc20_handler": "0x3167776db165D8eA0f51790CA2bbf44Db5105ADF",
                    "gas_price": 20000000000,
                    "tokens": [
                        {{"address": "0x6b175474e89094c44da98b954eedeac495271d0f", "name": "Dai Stablecoin", "symbol": "DAI"}}
                    ]
                }},
                "chain_b": {{
                    "name": "avalanche",
                    "rpc_url": "http://localhost:9650/ext/bc/C/rpc",
                    "network_id": 43113,
                    "bridge_chain_id": {},
                    "bridge": "0x62877dDCd49aD22f5eDfc6ac108e9a4b5D2bD88B",
                    "erc20_handler": "0x3167776db165D8eA0f51790CA2bbf44Db5105ADF",
                    "gas_price": 470000000000,
                    "gas_limit": 6000000
                }}
            }}"#,
            chain_b_id
        )
    }

    #[test]
    fn test_parse_setup_file() {
        let config = SetupConfig::from_json(&sample(2), Path::new("/etc/bridge"), Some(KEY)).unwrap();

        assert_eq!(config.chain_a.name, "ethereum");
        assert_eq!(config.chain_a.network_id, None);
        assert_eq!(config.chain_a.gas_limit, DEFAULT_GAS_LIMIT);
        assert_eq!(config.chain_b.network_id, Some(43113));
        assert_eq!(config.chain_b.gas_price, 470_000_000_000);
        assert_eq!(config.chain_b.gas_limit, 6_000_000);
        assert_eq!(config.chain_b.private_key, KEY);

        assert_eq!(config.tokens_a.len(), 1);
        assert_eq!(config.tokens_a[0].symbol, "DAI");
        assert_eq!(
            config.tokens_a[0].address,
            Address::from_str("0x6b175474e89094c44da98b954eedeac495271d0f").unwrap()
        );
        assert!(config.tokens_b.is_empty());

        assert_eq!(
            config.token_artifact,
            PathBuf::from("/etc/bridge/artifacts/ERC20PresetMinterPauser.json")
        );
    }

    #[test]
    fn test_same_bridge_chain_id_rejected() {
        let err = SetupConfig::from_json(&sample(1), Path::new("."), Some(KEY)).unwrap_err();
        assert!(err.to_string().contains("collide"));
    }

    #[test]
    fn test_malformed_file() {
        let err = SetupConfig::from_json("{", Path::new("."), Some(KEY)).unwrap_err();
        assert!(matches!(err, AdminError::Config(_)));
    }

    #[test]
    #[serial]
    fn test_key_from_environment() {
        env::set_var(PRIVATE_KEY_ENV, KEY);
        let config = SetupConfig::from_json(&sample(2), Path::new("."), None);
        env::remove_var(PRIVATE_KEY_ENV);

        assert_eq!(config.unwrap().chain_a.private_key, KEY);
    }

    #[test]
    #[serial]
    fn test_missing_key() {
        env::remove_var(PRIVATE_KEY_ENV);
        let err = SetupConfig::from_json(&sample(2), Path::new("."), None).unwrap_err();
        assert!(err.to_string().contains(PRIVATE_KEY_ENV));
    }

    #[test]
    #[serial]
    fn test_blank_key_falls_through_to_file() {
        env::remove_var(PRIVATE_KEY_ENV);
        let with_file_key = sample(2).replacen(
            r#""token_artifact""#,
            &format!(r#""private_key": "{}", "token_artifact""#, KEY),
            1,
        );

        let config = SetupConfig::from_json(&with_file_key, Path::new("."), Some("  ")).unwrap();
        assert_eq!(config.chain_b.private_key, KEY);
    }

    #[test]
    #[serial]
    fn test_blank_file_key_falls_through_to_environment() {
        let blank_file_key = sample(2).replacen(
            r#""token_artifact""#,
            r#""private_key": "", "token_artifact""#,
            1,
        );

        env::set_var(PRIVATE_KEY_ENV, KEY);
        let config = SetupConfig::from_json(&blank_file_key, Path::new("."), None);
        env::remove_var(PRIVATE_KEY_ENV);

        assert_eq!(config.unwrap().chain_a.private_key, KEY);
    }

    #[test]
    fn test_example_file_parses() {
        let config = SetupConfig::from_json(
            include_str!("../setup-tokens.example.json"),
            Path::new("."),
            Some(KEY),
        )
        .unwrap();

        let symbols: Vec<_> = config.tokens_a.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, ["DAI", "USDC"]);
        assert_eq!(config.tokens_b[0].symbol, "WAVAX");
        assert_eq!(config.chain_b.bridge_chain_id, 2);
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let config = SetupConfig::from_json(&sample(2), Path::new("."), Some(KEY)).unwrap();
        let debug = format!("{:?}", config.chain_a);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("ac0974bec39a17e36ba4a6b4d238ff94"));
    }
}
