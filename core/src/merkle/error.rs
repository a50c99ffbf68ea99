// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

use crate::crypto::hash::HashValue;
use thiserror::Error;

/// Errors possible while building or running Merkle proofs.
#[derive(Debug, Error)]
pub enum MerkleError {
    #[error("Malformed tree: {reason}")]
    MalformedTree { reason: String },
    #[error("Proof mismatch: expected root {expected}, got {actual}")]
    ProofMismatch {
        expected: HashValue,
        actual: HashValue,
    },
    #[error("Not enough roots in the proof to complete the tree")]
    InsufficientRoots,
    #[error("Proof carries {count} unused roots")]
    LeftoverRoots { count: usize },
    #[error("Tag mismatch while appending proofs: expected {expected:#06x}, got {actual:#06x}")]
    TagMismatch { expected: u16, actual: u16 },
    #[error("Unsupported Merkle Log tag {tag:#06x}")]
    UnsupportedTag { tag: u16 },
    #[error("Invalid value for tag {tag:#06x}: expected {expected} bytes, got {actual}")]
    InvalidLeafValue {
        tag: u16,
        expected: usize,
        actual: usize,
    },
    #[error("Proof trace overflows with {nodes} nodes, maximum is {maximum}")]
    TraceOverflow { nodes: usize, maximum: usize },
    #[error("Position {position} is out of bounds for a tree of {size} leaves")]
    PositionOutOfBounds { position: u64, size: u64 },
}
