//! EVM implementation of [`BridgeChain`]

use alloy::{
    network::{Ethereum, TransactionBuilder},
    primitives::{Address, B256},
    providers::Provider,
    rpc::types::TransactionRequest,
    sol_types::SolValue,
    transports::{
        http::{Client, Http},
        Transport,
    },
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::artifact::ContractArtifact;
use crate::bridge::BridgeChain;
use crate::config::ChainEndpoint;
use crate::error::{AdminError, TxError};
use crate::evm::client::{connect, ChainConnection, ConnectParams, TxSettings};
use crate::evm::contracts::{Bridge, ERC20Mintable};
use crate::resource::ResourceId;

/// Bridge, handler and token factory on one EVM chain
pub struct EvmBridgeChain<P, T> {
    conn: ChainConnection<P, T>,
    bridge: Address,
    handler: Address,
    bridge_chain_id: u8,
    token_artifact: ContractArtifact,
}

/// Connect to the chain described by `endpoint`
pub async fn connect_endpoint(
    endpoint: &ChainEndpoint,
    timeout: Duration,
    token_artifact: ContractArtifact,
) -> Result<EvmBridgeChain<impl Provider<Http<Client>, Ethereum> + Clone, Http<Client>>, AdminError>
{
    let params = ConnectParams {
        name: &endpoint.name,
        rpc_url: &endpoint.rpc_url,
        private_key: &endpoint.private_key,
        network_id: endpoint.network_id,
    };
    let settings = TxSettings {
        gas_price: endpoint.gas_price,
        gas_limit: endpoint.gas_limit,
        timeout,
    };
    let conn = connect(params, settings).await?;

    Ok(EvmBridgeChain::new(conn, endpoint, token_artifact))
}

impl<P, T> EvmBridgeChain<P, T>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    pub fn new(
        conn: ChainConnection<P, T>,
        endpoint: &ChainEndpoint,
        token_artifact: ContractArtifact,
    ) -> Self {
        Self {
            conn,
            bridge: endpoint.bridge,
            handler: endpoint.erc20_handler,
            bridge_chain_id: endpoint.bridge_chain_id,
            token_artifact,
        }
    }

    fn query_error(&self, what: &'static str, e: impl std::fmt::Display) -> AdminError {
        AdminError::Query {
            chain: self.conn.name().to_string(),
            what,
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl<P, T> BridgeChain for EvmBridgeChain<P, T>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    fn name(&self) -> &str {
        self.conn.name()
    }

    fn bridge_chain_id(&self) -> u8 {
        self.bridge_chain_id
    }

    fn handler(&self) -> Address {
        self.handler
    }

    async fn resource_handler(&self, resource_id: ResourceId) -> Result<Address, AdminError> {
        let bridge = Bridge::new(self.bridge, self.conn.provider());
        let result = bridge
            ._resourceIDToHandlerAddress(resource_id.into())
            .call()
            .await
            .map_err(|e| self.query_error("_resourceIDToHandlerAddress", e))?;
        Ok(result._0)
    }

    async fn deploy_mintable_token(&self, name: &str, symbol: &str) -> Result<Address, TxError> {
        let constructor_args = (name.to_string(), symbol.to_string()).abi_encode_params();
        let tx = TransactionRequest::default()
            .with_deploy_code(self.token_artifact.deploy_code(&constructor_args));

        let receipt = self.conn.submit("deploy token", tx).await?;
        let address = receipt
            .contract_address
            .ok_or(TxError::MissingContractAddress {
                tx_hash: receipt.transaction_hash,
            })?;

        debug!(chain = %self.name(), symbol, token = %address, "Token deployed");
        Ok(address)
    }

    async fn set_resource(&self, resource_id: ResourceId, token: Address) -> Result<B256, TxError> {
        let call = Bridge::adminSetResourceCall {
            handlerAddress: self.handler,
            resourceID: resource_id.into(),
            tokenAddress: token,
        };
        let receipt = self
            .conn
            .call_contract("adminSetResource", self.bridge, &call)
            .await?;
        Ok(receipt.transaction_hash)
    }

    async fn minter_role(&self, token: Address) -> Result<B256, AdminError> {
        let contract = ERC20Mintable::new(token, self.conn.provider());
        let result = contract
            .MINTER_ROLE()
            .call()
            .await
            .map_err(|e| self.query_error("MINTER_ROLE", e))?;
        Ok(result._0)
    }

    async fn grant_role(
        &self,
        token: Address,
        role: B256,
        grantee: Address,
    ) -> Result<B256, TxError> {
        let call = ERC20Mintable::grantRoleCall {
            role,
            account: grantee,
        };
        let receipt = self.conn.call_contract("grantRole", token, &call).await?;
        Ok(receipt.transaction_hash)
    }

    async fn set_burnable(&self, token: Address) -> Result<B256, TxError> {
        let call = Bridge::adminSetBurnableCall {
            handlerAddress: self.handler,
            tokenAddress: token,
        };
        let receipt = self
            .conn
            .call_contract("adminSetBurnable", self.bridge, &call)
            .await?;
        Ok(receipt.transaction_hash)
    }
}
