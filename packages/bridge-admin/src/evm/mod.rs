//! EVM Chain Support Module
//!
//! ## Submodules
//!
//! - `client` - provider with wallet, transaction submission and confirmation
//! - `contracts` - bridge, handler, token and Safe bindings using alloy sol! macro
//! - `bridge` - [`BridgeChain`](crate::bridge::BridgeChain) over an EVM bridge

pub mod bridge;
pub mod client;
pub mod contracts;

pub use bridge::{connect_endpoint, EvmBridgeChain};
pub use client::{connect, ChainConnection, ConnectParams, TxSettings};
