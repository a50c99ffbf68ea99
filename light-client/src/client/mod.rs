// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Client module
//!
//! This module contains the client for the light client. It is the entrypoint for any needed remote call.
//!
//! ## Sub-modules
//!
//! - `chainweb`: The Chainweb Client is responsible for fetching consensus
//!     headers from a Chainweb node.
//! - `rpc`: The RPC Client is responsible for fetching execution headers and
//!     account proofs from the EVM JSON-RPC endpoint of a chain.

use crate::client::chainweb::ChainwebClient;
use crate::client::error::ClientError;
use crate::client::rpc::RpcClient;
use crate::config::ClientConfig;
use crate::provider::{BlockTag, ChainProvider};
use async_trait::async_trait;
use ethers_core::types::Address;
use futures::future::try_join_all;
use std::collections::BTreeMap;
use xchan_lc_core::channel::account::AccountProof;
use xchan_lc_core::types::header::{ChainwebHeader, ExecutionHeader};
use xchan_lc_core::types::{ChainId, HashCheck};

pub(crate) mod chainweb;
pub mod error;
pub(crate) mod rpc;
mod utils;

/// The client for the light client. It is the entrypoint for any needed remote call.
#[derive(Debug, Clone)]
pub struct Client {
    chainweb_client: ChainwebClient,
    rpc_clients: BTreeMap<ChainId, RpcClient>,
    hash_check: HashCheck,
}

impl Client {
    /// Create a new client from a configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - The addresses of the Chainweb node and of the RPC endpoints.
    ///
    /// # Returns
    ///
    /// A new `Client`.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            chainweb_client: ChainwebClient::new(
                config.chainweb_node_address(),
                config.chainweb_version(),
            ),
            rpc_clients: config
                .rpc_endpoints()
                .iter()
                .map(|(chain, address)| (*chain, RpcClient::new(address)))
                .collect(),
            hash_check: config.hash_check(),
        }
    }

    /// Test the connection to all the endpoints.
    ///
    /// # Returns
    ///
    /// A result indicating whether the connections were successful.
    pub async fn test_endpoints(&self) -> Result<(), ClientError> {
        tokio::try_join!(
            self.chainweb_client.test_endpoint(),
            try_join_all(self.rpc_clients.values().map(RpcClient::test_endpoint))
        )?;

        Ok(())
    }

    fn rpc_client(&self, chain: ChainId) -> Result<&RpcClient, ClientError> {
        self.rpc_clients
            .get(&chain)
            .ok_or(ClientError::MissingEndpoint { chain })
    }
}

#[async_trait]
impl ChainProvider for Client {
    async fn get_chainweb_header(
        &self,
        chain: ChainId,
        tag: BlockTag,
    ) -> Result<ChainwebHeader, ClientError> {
        let header = self.chainweb_client.get_header(chain, tag).await?;
        header
            .check_hash(self.hash_check)
            .map_err(|err| ClientError::Response {
                endpoint: format!("chain/{chain}/header"),
                source: Box::new(err),
            })?;

        Ok(header)
    }

    async fn get_execution_header(
        &self,
        chain: ChainId,
        tag: BlockTag,
    ) -> Result<ExecutionHeader, ClientError> {
        let raw = self.rpc_client(chain)?.get_block(tag).await?;

        ExecutionHeader::new(raw, self.hash_check).map_err(|err| ClientError::Response {
            endpoint: "eth_getBlockByNumber".into(),
            source: Box::new(err),
        })
    }

    async fn get_account_proof(
        &self,
        chain: ChainId,
        address: Address,
        tag: BlockTag,
    ) -> Result<AccountProof, ClientError> {
        let response = self.rpc_client(chain)?.get_proof(address, tag).await?;

        AccountProof::try_from(response).map_err(|err| ClientError::Response {
            endpoint: "eth_getProof".into(),
            source: Box::new(err),
        })
    }
}
