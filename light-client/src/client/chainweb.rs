// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Chainweb client module
//!
//! This module contains the client for the Chainweb Node API. It is responsible for fetching the
//! consensus headers along the path between the source and the target chain of a channel.
//!
//! It maintains an internal HTTP client to handle communication with the Chainweb Node.

use crate::client::error::ClientError;
use crate::client::utils::test_connection;
use crate::provider::BlockTag;
use crate::types::chainweb::{BlockHeaderResponse, CutResponse};
use getset::Getters;
use log::debug;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use xchan_lc_core::types::header::ChainwebHeader;
use xchan_lc_core::types::ChainId;

const CHAINWEB_API_VERSION: &str = "0.0";

/// An internal client to handle communication with a Chainweb Node.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub(crate)")]
pub(crate) struct ChainwebClient {
    /// The address of the Chainweb Node API.
    chainweb_node_address: Arc<String>,
    /// Name of the Chainweb network.
    chainweb_version: Arc<String>,
    /// The inner HTTP client.
    inner: Client,
}

impl ChainwebClient {
    /// Create a new client with the given address.
    ///
    /// # Arguments
    ///
    /// * `chainweb_node_address` - The address of the Chainweb Node API.
    /// * `chainweb_version` - The name of the Chainweb network.
    ///
    /// # Returns
    ///
    /// A new `ChainwebClient`.
    pub(crate) fn new(chainweb_node_address: &str, chainweb_version: &str) -> Self {
        Self {
            chainweb_node_address: Arc::new(chainweb_node_address.to_string()),
            chainweb_version: Arc::new(chainweb_version.to_string()),
            inner: Client::new(),
        }
    }

    /// Test the connection to the chainweb node.
    ///
    /// # Returns
    ///
    /// A result indicating whether the connection was successful.
    pub(crate) async fn test_endpoint(&self) -> Result<(), ClientError> {
        test_connection(&self.inner, &self.chainweb_node_address).await
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{CHAINWEB_API_VERSION}/{}/{path}",
            self.chainweb_node_address, self.chainweb_version
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, u64)],
    ) -> Result<T, ClientError> {
        let response = self
            .inner
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(|err| ClientError::Request {
                endpoint: url.clone(),
                source: Box::new(err),
            })?;

        if !response.status().is_success() {
            return Err(ClientError::Request {
                endpoint: url,
                source: format!(
                    "Request not successful, got HTTP code {}",
                    response.status().as_str()
                )
                .into(),
            });
        }

        response.json().await.map_err(|err| ClientError::Response {
            endpoint: url,
            source: Box::new(err),
        })
    }

    /// `get_cut` fetches the latest cut of the network.
    ///
    /// # Returns
    ///
    /// The height of the latest block of each chain.
    pub(crate) async fn get_cut(&self) -> Result<CutResponse, ClientError> {
        self.get_json(self.endpoint("cut"), &[]).await
    }

    /// `get_header` fetches the consensus header of a chain at a given height,
    /// resolving [`BlockTag::Latest`] through the current cut.
    ///
    /// # Arguments
    ///
    /// * `chain` - The chain to get the header for.
    /// * `tag` - The height of the header.
    ///
    /// # Returns
    ///
    /// The header.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not successful or properly formatted.
    pub(crate) async fn get_header(
        &self,
        chain: ChainId,
        tag: BlockTag,
    ) -> Result<ChainwebHeader, ClientError> {
        let height = match tag {
            BlockTag::Height(height) => height,
            BlockTag::Latest => {
                let cut = self.get_cut().await?;
                cut.height(chain).ok_or_else(|| ClientError::Response {
                    endpoint: self.endpoint("cut"),
                    source: format!("Chain {chain} is not part of the cut").into(),
                })?
            }
        };
        debug!("Fetching header of chain {chain} at height {height}");

        let url = self.endpoint(&format!("chain/{chain}/header"));
        let response: BlockHeaderResponse = self
            .get_json(url.clone(), &[("minheight", height), ("maxheight", height)])
            .await?;

        let headers: Vec<ChainwebHeader> =
            response.try_into().map_err(|err| ClientError::Response {
                endpoint: url.clone(),
                source: Box::new(err),
            })?;

        match <[ChainwebHeader; 1]>::try_from(headers) {
            Ok([header]) => Ok(header),
            Err(headers) => Err(ClientError::Response {
                endpoint: url,
                source: format!("Expected 1 header, got {}", headers.len()).into(),
            }),
        }
    }
}
