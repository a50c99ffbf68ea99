// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Proofs module
//!
//! Construction of the proofs backing a channel redemption.
//!
//! ## Sub-modules
//!
//! - `chainweb`: Proof linking a block of a source chain to a block of a
//!     target chain through the adjacent parents of the headers in between.
//! - `redeem`: Full redemption proof of a channel.

use crate::client::error::ClientError;
use thiserror::Error;
use xchan_lc_core::channel::error::ChannelError;
use xchan_lc_core::merkle::error::MerkleError;
use xchan_lc_core::types::error::{GraphError, ValidationError};
use xchan_lc_core::types::ChainId;

pub mod chainweb;
pub mod redeem;

/// The error type for errors thrown while building proofs.
#[derive(Debug, Error)]
pub enum ProofError {
    #[error("Error while fetching data from the provider: {source}")]
    Provider {
        #[source]
        source: ClientError,
    },
    #[error("Error while routing between chains: {source}")]
    Routing {
        #[source]
        source: GraphError,
    },
    #[error("Invalid header: {source}")]
    Validation {
        #[source]
        source: ValidationError,
    },
    #[error("Error while linking proofs: {source}")]
    Merkle {
        #[source]
        source: MerkleError,
    },
    #[error("Error while handling the channel: {source}")]
    Channel {
        #[source]
        source: ChannelError,
    },
    #[error("Expected header of chain {expected_chain} at height {expected_height}, got chain {chain} at height {height}")]
    UnexpectedHeader {
        expected_chain: ChainId,
        expected_height: u64,
        chain: ChainId,
        height: u64,
    },
    #[error("Target height {height} is too low for a path of {hops} hops")]
    HeightTooLow { height: u64, hops: usize },
    #[error("Header of chain {chain} does not commit to the header of chain {adjacent}")]
    BrokenLink { chain: ChainId, adjacent: ChainId },
}

impl From<ClientError> for ProofError {
    fn from(source: ClientError) -> Self {
        Self::Provider { source }
    }
}

impl From<GraphError> for ProofError {
    fn from(source: GraphError) -> Self {
        Self::Routing { source }
    }
}

impl From<ValidationError> for ProofError {
    fn from(source: ValidationError) -> Self {
        Self::Validation { source }
    }
}

impl From<MerkleError> for ProofError {
    fn from(source: MerkleError) -> Self {
        Self::Merkle { source }
    }
}

impl From<ChannelError> for ProofError {
    fn from(source: ChannelError) -> Self {
        Self::Channel { source }
    }
}
