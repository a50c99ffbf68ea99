// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Configuration
//!
//! Addresses of the remote services and the network topology used by the
//! [`crate::client::Client`].
//!
//! ```json
//! {
//!   "chainweb_node_address": "https://evm-testnet.chainweb.com/chainweb",
//!   "chainweb_version": "evm-testnet",
//!   "chains": 20,
//!   "rpc_endpoints": { "20": "https://evm-testnet.chainweb.com/chainweb/0.0/evm-testnet/chain/20/evm/rpc" },
//!   "strict": true
//! }
//! ```

use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use xchan_lc_core::types::error::GraphError;
use xchan_lc_core::types::graph::ChainGraph;
use xchan_lc_core::types::{ChainId, HashCheck};

/// Errors possible while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration: {source}")]
    Json {
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid chain graph: {source}")]
    Graph {
        #[source]
        source: GraphError,
    },
    #[error("Configured graph has {graph} chains, expected {chains}")]
    GraphOrder { graph: usize, chains: usize },
}

/// Configuration of the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, CopyGetters)]
pub struct ClientConfig {
    /// Base address of the Chainweb node API, up to and including `/chainweb`.
    #[getset(get = "pub")]
    chainweb_node_address: String,
    /// Name of the Chainweb network, e.g. `mainnet01`.
    #[getset(get = "pub")]
    chainweb_version: String,
    /// Number of chains of the network.
    #[getset(get_copy = "pub")]
    chains: usize,
    /// EVM JSON-RPC endpoint of each chain.
    #[serde(default)]
    #[getset(get = "pub")]
    rpc_endpoints: BTreeMap<ChainId, String>,
    /// Chain graph, for networks without a built-in one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    graph: Option<ChainGraph>,
    /// Reject headers whose hash does not match the recomputed one.
    #[serde(default)]
    #[getset(get_copy = "pub")]
    strict: bool,
}

impl ClientConfig {
    pub fn new(
        chainweb_node_address: impl Into<String>,
        chainweb_version: impl Into<String>,
        chains: usize,
    ) -> Self {
        Self {
            chainweb_node_address: chainweb_node_address.into(),
            chainweb_version: chainweb_version.into(),
            chains,
            rpc_endpoints: BTreeMap::new(),
            graph: None,
            strict: false,
        }
    }

    pub fn with_rpc_endpoint(mut self, chain: ChainId, endpoint: impl Into<String>) -> Self {
        self.rpc_endpoints.insert(chain, endpoint.into());
        self
    }

    pub fn with_graph(mut self, graph: ChainGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Parses a configuration from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|source| ConfigError::Json { source })?;
        config.graph()?;

        Ok(config)
    }

    /// Reads a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_json(&json)
    }

    /// Chain graph of the network, the configured one if any, the built-in
    /// one for the number of chains otherwise.
    pub fn graph(&self) -> Result<ChainGraph, ConfigError> {
        match &self.graph {
            Some(graph) if graph.order() != self.chains => Err(ConfigError::GraphOrder {
                graph: graph.order(),
                chains: self.chains,
            }),
            Some(graph) => Ok(graph.clone()),
            None => ChainGraph::builtin(self.chains)
                .cloned()
                .map_err(|source| ConfigError::Graph { source }),
        }
    }

    pub const fn hash_check(&self) -> HashCheck {
        HashCheck::from_strict(self.strict)
    }
}
