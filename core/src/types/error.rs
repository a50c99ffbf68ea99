// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

use crate::merkle::error::MerkleError;
use crate::types::ChainId;
use thiserror::Error;

/// Errors possible during type manipulation.
#[derive(Debug, Error)]
pub enum TypesError {
    #[error("Failed to deserialize {structure}: {source}")]
    DeserializationError {
        structure: String,
        #[source]
        source: Box<dyn std::error::Error + Sync + Send>,
    },
    #[error("Failed to convert {from} to {to}: {source}")]
    ConversionError {
        from: String,
        to: String,
        #[source]
        source: Box<dyn std::error::Error + Sync + Send>,
    },
    #[error("Received data of invalid length for {structure}. Expected {expected}, got {actual}.")]
    InvalidLength {
        structure: String,
        expected: usize,
        actual: usize,
    },
    #[error("Received data of insufficient length for {structure}. Minimum {minimum}, got {actual}.")]
    UnderLength {
        structure: String,
        minimum: usize,
        actual: usize,
    },
}

/// Errors possible while validating headers.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Hash mismatch for {structure}: computed {computed}, received {received}")]
    HashMismatch {
        structure: String,
        computed: String,
        received: String,
    },
    #[error("Chain {chain} is not adjacent to the chain {header_chain} of the header")]
    NotAdjacent { chain: ChainId, header_chain: ChainId },
    #[error("Invalid field for {structure}: {source}")]
    Types {
        structure: String,
        #[source]
        source: TypesError,
    },
    #[error("Error while building Merkle Log for {structure}: {source}")]
    Merkle {
        structure: String,
        #[source]
        source: MerkleError,
    },
}

/// Errors possible while routing through the chain graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("No built-in chain graph for {order} chains")]
    UnsupportedTopology { order: usize },
    #[error("Chain {chain} is not part of a graph of {order} chains")]
    UnknownChain { chain: ChainId, order: usize },
    #[error("Chain {to} is unreachable from chain {from}")]
    ChainUnreachable { from: ChainId, to: ChainId },
}

/// Macro to create a `TypesError::DeserializationError` with the given structure and source.
#[macro_export]
macro_rules! deserialization_error {
    ($structure:expr, $source:expr) => {
        TypesError::DeserializationError {
            structure: String::from($structure),
            source: $source.into(),
        }
    };
}
