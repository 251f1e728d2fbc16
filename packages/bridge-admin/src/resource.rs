//! Resource IDs and function selectors
//!
//! A resource ID ties a token on one chain to its mirror on the other. Both
//! bridges must store the same 32 bytes for a pairing:
//!
//! ```text
//! | 11 zero bytes | 20-byte token address | 1-byte origin chain ID |
//! ```

use alloy::primitives::{keccak256, Address, FixedBytes, B256};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseResourceIdError;

const ADDRESS_OFFSET: usize = 11;
const CHAIN_ID_OFFSET: usize = 31;

/// 32-byte identifier registered on both bridges for one token pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId([u8; 32]);

impl ResourceId {
    /// Derive the resource ID of `token` originating on bridge chain `chain_id`
    pub fn for_token(token: Address, chain_id: u8) -> Self {
        let mut bytes = [0u8; 32];
        bytes[ADDRESS_OFFSET..CHAIN_ID_OFFSET].copy_from_slice(token.as_slice());
        bytes[CHAIN_ID_OFFSET] = chain_id;
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Token address embedded in the ID
    pub fn token(&self) -> Address {
        Address::from_slice(&self.0[ADDRESS_OFFSET..CHAIN_ID_OFFSET])
    }

    /// Origin chain embedded in the ID
    pub fn chain_id(&self) -> u8 {
        self.0[CHAIN_ID_OFFSET]
    }
}

impl From<ResourceId> for B256 {
    fn from(id: ResourceId) -> Self {
        B256::from(id.0)
    }
}

impl From<B256> for ResourceId {
    fn from(value: B256) -> Self {
        Self(value.0)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for ResourceId {
    type Err = ParseResourceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let decoded = hex::decode(digits).map_err(|e| ParseResourceIdError {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        let bytes: [u8; 32] = decoded.try_into().map_err(|v: Vec<u8>| ParseResourceIdError {
            input: s.to_string(),
            reason: format!("expected 32 bytes, got {}", v.len()),
        })?;
        Ok(Self(bytes))
    }
}

/// First four bytes of the keccak256 of a function prototype,
/// e.g. `"transfer(address,uint256)"` -> `0xa9059cbb`
pub fn function_selector(prototype: &str) -> FixedBytes<4> {
    let hash = keccak256(prototype.as_bytes());
    FixedBytes::from_slice(&hash[..4])
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAI: &str = "0x6b175474e89094c44da98b954eedeac495271d0f";

    #[test]
    fn test_layout() {
        let token = Address::from_str(DAI).unwrap();
        let id = ResourceId::for_token(token, 1);

        assert_eq!(&id.as_bytes()[..11], &[0u8; 11]);
        assert_eq!(&id.as_bytes()[11..31], token.as_slice());
        assert_eq!(id.as_bytes()[31], 1);
        assert_eq!(id.token(), token);
        assert_eq!(id.chain_id(), 1);
    }

    #[test]
    fn test_display_matches_padded_hex() {
        let token = Address::from_str(DAI).unwrap();
        let id = ResourceId::for_token(token, 1);

        assert_eq!(
            id.to_string(),
            "0x00000000000000000000006b175474e89094c44da98b954eedeac495271d0f01"
        );
    }

    #[test]
    fn test_same_id_regardless_of_caller() {
        // Both bridges derive the ID from the origin token and origin chain only
        let token = Address::from_str(DAI).unwrap();
        let on_source = ResourceId::for_token(token, 2);
        let on_destination = ResourceId::for_token(token, 2);
        assert_eq!(on_source, on_destination);
        assert_ne!(on_source, ResourceId::for_token(token, 1));
    }

    #[test]
    fn test_parse() {
        let parsed: ResourceId =
            "0x00000000000000000000006b175474e89094c44da98b954eedeac495271d0f01"
                .parse()
                .unwrap();
        assert_eq!(parsed.token(), Address::from_str(DAI).unwrap());
        assert_eq!(parsed.chain_id(), 1);

        let bare: ResourceId = "00000000000000000000006b175474e89094c44da98b954eedeac495271d0f01"
            .parse()
            .unwrap();
        assert_eq!(bare, parsed);
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        let err = "0x1234".parse::<ResourceId>().unwrap_err();
        assert!(err.reason.contains("expected 32 bytes"));

        assert!("0xzz".parse::<ResourceId>().is_err());
    }

    #[test]
    fn test_b256_conversion() {
        let id = ResourceId::for_token(Address::repeat_byte(0xab), 7);
        let raw: B256 = id.into();
        assert_eq!(ResourceId::from(raw), id);
    }

    #[test]
    fn test_function_selector() {
        assert_eq!(
            function_selector("transfer(address,uint256)"),
            FixedBytes::from([0xa9, 0x05, 0x9c, 0xbb])
        );
    }
}
