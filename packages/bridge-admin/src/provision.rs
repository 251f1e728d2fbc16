//! Token provisioning workflow
//!
//! Mirrors every token native to a source chain onto a destination chain:
//!
//! 1. Probe both bridges for the token's resource ID
//! 2. Deploy a mintable ERC20 with the same name and symbol on the destination
//! 3. Register the resource ID on the source bridge (original token) and on
//!    the destination bridge (new token)
//! 4. Grant the destination handler the minter role on the new token
//! 5. Mark the new token burnable on the destination bridge
//!
//! Each step consumes the state produced by the previous one, so steps cannot
//! run out of order. Tokens are processed one at a time and every transaction
//! is confirmed before the next is sent. Any failure aborts the run: earlier
//! tokens stay provisioned, later ones are left untouched, and a re-run skips
//! whatever is already registered on both bridges.

use alloy::primitives::Address;
use tracing::{info, warn};

use crate::bridge::{is_registered, BridgeChain};
use crate::error::AdminError;
use crate::report::ProvisioningReport;
use crate::resource::ResourceId;
use crate::types::{ProvisioningRecord, TokenDescriptor};

/// Registration state of a token on both bridges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probed<'t> {
    pub token: &'t TokenDescriptor,
    pub resource_id: ResourceId,
    pub registered_on_source: bool,
    pub registered_on_destination: bool,
}

/// Mirror token deployed on the destination chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployed<'t> {
    pub token: &'t TokenDescriptor,
    pub resource_id: ResourceId,
    pub destination_token: Address,
}

/// Resource ID registered on both bridges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered<'t> {
    pub token: &'t TokenDescriptor,
    pub resource_id: ResourceId,
    pub destination_token: Address,
}

/// Destination handler may mint the mirror token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinterGranted<'t> {
    pub token: &'t TokenDescriptor,
    pub resource_id: ResourceId,
    pub destination_token: Address,
}

/// Terminal state of one token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenOutcome {
    SkippedAlreadyRegistered { resource_id: ResourceId },
    Provisioned(ProvisioningRecord),
}

/// Provisions tokens from `source` onto `destination`
pub struct Provisioner<'a> {
    source: &'a dyn BridgeChain,
    destination: &'a dyn BridgeChain,
    override_registered: bool,
}

impl<'a> Provisioner<'a> {
    /// `override_registered` re-provisions tokens already registered on both bridges
    pub fn new(
        source: &'a dyn BridgeChain,
        destination: &'a dyn BridgeChain,
        override_registered: bool,
    ) -> Self {
        Self {
            source,
            destination,
            override_registered,
        }
    }

    /// Provision every token in order and collect the results.
    ///
    /// Stops at the first failing token.
    pub async fn run(&self, tokens: &[TokenDescriptor]) -> Result<ProvisioningReport, AdminError> {
        info!(
            source = %self.source.name(),
            destination = %self.destination.name(),
            tokens = tokens.len(),
            "Setting up bridged tokens"
        );

        let mut report = ProvisioningReport::new(self.source.name(), self.destination.name());
        for token in tokens {
            if let TokenOutcome::Provisioned(record) = self.provision_token(token).await? {
                report.push(record);
            }
        }
        Ok(report)
    }

    /// Run the full pipeline for one token
    pub async fn provision_token(
        &self,
        token: &TokenDescriptor,
    ) -> Result<TokenOutcome, AdminError> {
        info!(
            symbol = %token.symbol,
            chain = %self.source.name(),
            address = %token.address,
            "Setting up token"
        );

        let probed = self.probe(token).await?;
        if !self.needs_provisioning(&probed) {
            info!(
                symbol = %token.symbol,
                resource_id = %probed.resource_id,
                "Skipping token, already registered on both bridges"
            );
            return Ok(TokenOutcome::SkippedAlreadyRegistered {
                resource_id: probed.resource_id,
            });
        }

        let deployed = self.deploy(probed).await?;
        let registered = self.register(deployed).await?;
        let granted = self.grant_minter(registered).await?;
        let record = self.set_burnable(granted).await?;

        Ok(TokenOutcome::Provisioned(record))
    }

    /// Derive the resource ID and check both bridges for it
    pub async fn probe<'t>(&self, token: &'t TokenDescriptor) -> Result<Probed<'t>, AdminError> {
        let resource_id = ResourceId::for_token(token.address, self.source.bridge_chain_id());
        info!(symbol = %token.symbol, resource_id = %resource_id, "Resource ID");

        let registered_on_source = is_registered(self.source, resource_id).await?;
        let registered_on_destination = is_registered(self.destination, resource_id).await?;

        Ok(Probed {
            token,
            resource_id,
            registered_on_source,
            registered_on_destination,
        })
    }

    /// Unregistered on either bridge, or override requested
    pub fn needs_provisioning(&self, probed: &Probed<'_>) -> bool {
        if self.override_registered
            && probed.registered_on_source
            && probed.registered_on_destination
        {
            warn!(
                symbol = %probed.token.symbol,
                "Token already registered, re-provisioning because of override"
            );
        }
        self.override_registered
            || !probed.registered_on_source
            || !probed.registered_on_destination
    }

    pub async fn deploy<'t>(&self, probed: Probed<'t>) -> Result<Deployed<'t>, AdminError> {
        let token = probed.token;
        info!(
            symbol = %token.symbol,
            chain = %self.destination.name(),
            "Deploying mirror token"
        );

        let destination_token = self
            .destination
            .deploy_mintable_token(&token.name, &token.symbol)
            .await
            .map_err(|source| AdminError::Deployment {
                chain: self.destination.name().to_string(),
                symbol: token.symbol.clone(),
                source,
            })?;

        info!(
            symbol = %token.symbol,
            chain = %self.destination.name(),
            address = %destination_token,
            "Mirror token deployed"
        );

        Ok(Deployed {
            token,
            resource_id: probed.resource_id,
            destination_token,
        })
    }

    /// Register on the source bridge first, then on the destination bridge
    pub async fn register<'t>(&self, deployed: Deployed<'t>) -> Result<Registered<'t>, AdminError> {
        let Deployed {
            token,
            resource_id,
            destination_token,
        } = deployed;

        for (chain, address) in [
            (self.source, token.address),
            (self.destination, destination_token),
        ] {
            let tx_hash = chain
                .set_resource(resource_id, address)
                .await
                .map_err(|source| AdminError::Registration {
                    chain: chain.name().to_string(),
                    resource_id,
                    source,
                })?;
            info!(
                symbol = %token.symbol,
                chain = %chain.name(),
                handler = %chain.handler(),
                tx_hash = %tx_hash,
                "Resource registered"
            );
        }

        Ok(Registered {
            token,
            resource_id,
            destination_token,
        })
    }

    pub async fn grant_minter<'t>(
        &self,
        registered: Registered<'t>,
    ) -> Result<MinterGranted<'t>, AdminError> {
        let Registered {
            token,
            resource_id,
            destination_token,
        } = registered;
        let chain = self.destination;

        let minter_role = chain.minter_role(destination_token).await?;
        let tx_hash = chain
            .grant_role(destination_token, minter_role, chain.handler())
            .await
            .map_err(|source| AdminError::Grant {
                chain: chain.name().to_string(),
                token: destination_token,
                source,
            })?;

        info!(
            symbol = %token.symbol,
            chain = %chain.name(),
            handler = %chain.handler(),
            tx_hash = %tx_hash,
            "Handler granted minter role"
        );

        Ok(MinterGranted {
            token,
            resource_id,
            destination_token,
        })
    }

    pub async fn set_burnable(
        &self,
        granted: MinterGranted<'_>,
    ) -> Result<ProvisioningRecord, AdminError> {
        let chain = self.destination;
        let tx_hash = chain
            .set_burnable(granted.destination_token)
            .await
            .map_err(|source| AdminError::Burnable {
                chain: chain.name().to_string(),
                token: granted.destination_token,
                source,
            })?;

        info!(
            symbol = %granted.token.symbol,
            chain = %chain.name(),
            tx_hash = %tx_hash,
            "Mint/burn enabled"
        );

        Ok(ProvisioningRecord {
            symbol: granted.token.symbol.clone(),
            source_token: granted.token.address,
            destination_token: granted.destination_token,
            resource_id: granted.resource_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TxError;
    use alloy::primitives::B256;
    use async_trait::async_trait;

    /// Chain whose bridge answers a fixed registration state and rejects writes
    struct ReadOnlyChain {
        id: u8,
        handler: Address,
    }

    #[async_trait]
    impl BridgeChain for ReadOnlyChain {
        fn name(&self) -> &str {
            "readonly"
        }
        fn bridge_chain_id(&self) -> u8 {
            self.id
        }
        fn handler(&self) -> Address {
            self.handler
        }
        async fn resource_handler(&self, _: ResourceId) -> Result<Address, AdminError> {
            Ok(self.handler)
        }
        async fn deploy_mintable_token(&self, _: &str, _: &str) -> Result<Address, TxError> {
            unreachable!("no writes expected")
        }
        async fn set_resource(&self, _: ResourceId, _: Address) -> Result<B256, TxError> {
            unreachable!("no writes expected")
        }
        async fn minter_role(&self, _: Address) -> Result<B256, AdminError> {
            unreachable!("no writes expected")
        }
        async fn grant_role(&self, _: Address, _: B256, _: Address) -> Result<B256, TxError> {
            unreachable!("no writes expected")
        }
        async fn set_burnable(&self, _: Address) -> Result<B256, TxError> {
            unreachable!("no writes expected")
        }
    }

    fn dai() -> TokenDescriptor {
        TokenDescriptor {
            address: Address::repeat_byte(0xda),
            name: "Dai Stablecoin".to_string(),
            symbol: "DAI".to_string(),
        }
    }

    #[tokio::test]
    async fn test_probe_uses_source_chain_id() {
        let a = ReadOnlyChain {
            id: 1,
            handler: Address::ZERO,
        };
        let b = ReadOnlyChain {
            id: 2,
            handler: Address::repeat_byte(0xbb),
        };
        let token = dai();

        let probed = Provisioner::new(&a, &b, false).probe(&token).await.unwrap();
        assert_eq!(probed.resource_id, ResourceId::for_token(token.address, 1));
        assert!(!probed.registered_on_source);
        assert!(probed.registered_on_destination);

        let reverse = Provisioner::new(&b, &a, false).probe(&token).await.unwrap();
        assert_eq!(reverse.resource_id.chain_id(), 2);
    }

    #[test]
    fn test_needs_provisioning() {
        let chain = ReadOnlyChain {
            id: 1,
            handler: Address::ZERO,
        };
        let token = dai();
        let probed = |src, dst| Probed {
            token: &token,
            resource_id: ResourceId::for_token(token.address, 1),
            registered_on_source: src,
            registered_on_destination: dst,
        };

        let normal = Provisioner::new(&chain, &chain, false);
        assert!(normal.needs_provisioning(&probed(false, false)));
        assert!(normal.needs_provisioning(&probed(true, false)));
        assert!(normal.needs_provisioning(&probed(false, true)));
        assert!(!normal.needs_provisioning(&probed(true, true)));

        let forced = Provisioner::new(&chain, &chain, true);
        assert!(forced.needs_provisioning(&probed(true, true)));
    }
}
