// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Provider
//!
//! Proof construction only needs three kinds of data: consensus headers,
//! execution headers and account proofs. [`ChainProvider`] abstracts where they
//! come from so that proofs can be built against a live node as well as
//! against in-memory fixtures.

use crate::client::error::ClientError;
use async_trait::async_trait;
use ethers_core::types::Address;
use std::fmt;
use xchan_lc_core::channel::account::AccountProof;
use xchan_lc_core::types::header::{ChainwebHeader, ExecutionHeader};
use xchan_lc_core::types::ChainId;

/// Block selector for provider requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BlockTag {
    /// The most recent block known to the provider.
    #[default]
    Latest,
    Height(u64),
}

impl BlockTag {
    /// Block parameter of an EVM JSON-RPC call.
    pub fn to_rpc_param(self) -> String {
        match self {
            Self::Latest => "latest".into(),
            Self::Height(height) => format!("{height:#x}"),
        }
    }
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => write!(f, "latest"),
            Self::Height(height) => write!(f, "{height}"),
        }
    }
}

impl From<Option<u64>> for BlockTag {
    fn from(height: Option<u64>) -> Self {
        height.map_or(Self::Latest, Self::Height)
    }
}

/// Source of the chain data needed to build redemption proofs.
///
/// Implementations are expected to be stateless from the point of view of the
/// caller: calls for different chains or heights can be issued concurrently.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// Fetches the consensus header of a chain.
    ///
    /// # Arguments
    ///
    /// * `chain` - The chain of the header.
    /// * `tag` - The height of the header.
    ///
    /// # Returns
    ///
    /// The decoded header.
    async fn get_chainweb_header(
        &self,
        chain: ChainId,
        tag: BlockTag,
    ) -> Result<ChainwebHeader, ClientError>;

    /// Fetches the execution header of a chain.
    async fn get_execution_header(
        &self,
        chain: ChainId,
        tag: BlockTag,
    ) -> Result<ExecutionHeader, ClientError>;

    /// Fetches the proof of an account against the state root of a block.
    async fn get_account_proof(
        &self,
        chain: ChainId,
        address: Address,
        tag: BlockTag,
    ) -> Result<AccountProof, ClientError>;
}
