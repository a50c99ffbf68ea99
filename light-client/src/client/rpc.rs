// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # RPC client module
//!
//! This module contains the client for the EVM JSON-RPC API of a chain. It is responsible for
//! fetching execution headers and account proofs.
//!
//! It maintains an internal HTTP client to handle communication with the RPC endpoint.

use crate::client::error::ClientError;
use crate::client::utils::test_connection;
use crate::provider::BlockTag;
use crate::types::rpc::{JsonRpcRequest, JsonRpcResponse};
use ethers_core::types::{Address, EIP1186ProofResponse};
use getset::Getters;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::de::DeserializeOwned;
use xchan_lc_core::types::header::ExecutionHeaderRaw;

/// An internal client to handle communication with an EVM JSON-RPC endpoint.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub(crate)")]
pub(crate) struct RpcClient {
    /// The address of the RPC endpoint.
    rpc_address: String,
    /// The inner HTTP client.
    inner: Client,
}

impl RpcClient {
    /// Create a new client with the given address.
    ///
    /// # Arguments
    ///
    /// * `rpc_address` - The address of the RPC endpoint.
    ///
    /// # Returns
    ///
    /// A new `RpcClient`.
    pub(crate) fn new(rpc_address: &str) -> Self {
        Self {
            rpc_address: rpc_address.to_string(),
            inner: Client::new(),
        }
    }

    pub(crate) async fn test_endpoint(&self) -> Result<(), ClientError> {
        test_connection(&self.inner, &self.rpc_address).await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, ClientError> {
        let response = self
            .inner
            .post(&self.rpc_address)
            .header(CONTENT_TYPE, "application/json")
            .json(&JsonRpcRequest::new(method, params))
            .send()
            .await
            .map_err(|err| ClientError::Request {
                endpoint: method.into(),
                source: Box::new(err),
            })?;

        if !response.status().is_success() {
            return Err(ClientError::Request {
                endpoint: method.into(),
                source: format!(
                    "Request not successful, got HTTP code {}",
                    response.status().as_str()
                )
                .into(),
            });
        }

        let deserialized: JsonRpcResponse<T> =
            response.json().await.map_err(|err| ClientError::Response {
                endpoint: method.into(),
                source: Box::new(err),
            })?;

        deserialized
            .into_result()
            .map_err(|err| ClientError::Response {
                endpoint: method.into(),
                source: err.into(),
            })
    }

    /// `get_block` fetches the header of a block, without its transactions.
    pub(crate) async fn get_block(&self, tag: BlockTag) -> Result<ExecutionHeaderRaw, ClientError> {
        self.call(
            "eth_getBlockByNumber",
            serde_json::json!([tag.to_rpc_param(), false]),
        )
        .await
    }

    /// `get_proof` makes a call to the RPC endpoint to get the proof of an
    /// account, without storage slots.
    ///
    /// # Arguments
    ///
    /// * `address` - The address to get the proof for.
    /// * `tag` - The block to get the proof at.
    ///
    /// # Returns
    ///
    /// The proof of the account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not successful or properly formatted.
    pub(crate) async fn get_proof(
        &self,
        address: Address,
        tag: BlockTag,
    ) -> Result<EIP1186ProofResponse, ClientError> {
        self.call(
            "eth_getProof",
            serde_json::json!([address, [], tag.to_rpc_param()]),
        )
        .await
    }
}
