// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

use crate::merkle::error::MerkleError;
use crate::types::ChainId;
use thiserror::Error;

/// Errors possible while handling channel commitments and redemption proofs.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Account {account} is not authorized by the channel")]
    UnknownAccount { account: String },
    #[error("A channel needs at least one authorized account")]
    NoAccounts,
    #[error("Error while building Merkle proof for {structure}: {source}")]
    Merkle {
        structure: String,
        #[source]
        source: MerkleError,
    },
    #[error("Invalid account proof: {reason}")]
    AccountProof { reason: String },
    #[error("Channel address mismatch: channel is {channel}, account proof is for {account}")]
    ChannelAddressMismatch { channel: String, account: String },
    #[error("Channel targets chain {expected}, redemption requested on chain {actual}")]
    TargetChainMismatch { expected: ChainId, actual: ChainId },
    #[error("Proof mismatch for {structure}: expected {expected}, got {actual}")]
    ProofMismatch {
        structure: String,
        expected: String,
        actual: String,
    },
    #[error("Failed to encode or decode {structure}: {source}")]
    Encoding {
        structure: String,
        #[source]
        source: Box<dyn std::error::Error + Sync + Send>,
    },
}

impl ChannelError {
    pub(crate) fn merkle(structure: &str) -> impl FnOnce(MerkleError) -> Self + '_ {
        move |source| Self::Merkle {
            structure: structure.into(),
            source,
        }
    }
}
