// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Redemption proofs
//!
//! A redemption proof links a deposit on a channel address of the source
//! chain to a block hash trusted on the target chain:
//!
//! 1. The account proof shows the balance of the channel address in the state
//!    trie of a source block.
//! 2. The header proof goes from that state root to the payload hash, then to
//!    the source block hash, then through the adjacent parents of the headers
//!    along the path to the target block hash.
//! 3. The channel proof shows the redeemer is authorized by the channel and
//!    re-derives the channel address.
//!
//! Verification is stateless. Preventing a proof from being redeemed twice is
//! up to the ledger of the target chain.

use crate::channel::account::AccountProof;
use crate::channel::error::ChannelError;
use crate::channel::xchan::XChanProof;
use crate::crypto::hash::HashValue;
use crate::merkle::log::MerkleLogProof;
use crate::merkle::MerkleTag;
use crate::types::ChainId;
use ethers_core::types::{Address, U256 as EvmU256};
use getset::{CopyGetters, Getters};
use log::debug;
use serde::{Deserialize, Serialize};

/// Everything needed to redeem the balance of a channel on its target chain.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters, Serialize, Deserialize)]
pub struct RedeemProof {
    #[getset(get = "pub")]
    xchan_proof: XChanProof,
    #[getset(get = "pub")]
    account_proof: AccountProof,
    /// From the state root of the source block to the target block hash.
    #[getset(get = "pub")]
    header_proof: MerkleLogProof,
    /// Height of the target block the header proof is rooted at.
    #[getset(get_copy = "pub")]
    target_height: u64,
}

impl RedeemProof {
    pub const fn new(
        xchan_proof: XChanProof,
        account_proof: AccountProof,
        header_proof: MerkleLogProof,
        target_height: u64,
    ) -> Self {
        Self {
            xchan_proof,
            account_proof,
            header_proof,
            target_height,
        }
    }

    pub fn target_chain(&self) -> ChainId {
        self.xchan_proof.target_chain()
    }

    /// State root proven by the header proof.
    pub fn state_root(&self) -> Result<HashValue, ChannelError> {
        if self.header_proof.tag() != MerkleTag::EthStateRoot {
            return Err(ChannelError::ProofMismatch {
                structure: "RedeemProof::header_proof".into(),
                expected: format!("{:?}", MerkleTag::EthStateRoot),
                actual: format!("{:?}", self.header_proof.tag()),
            });
        }

        HashValue::from_slice(self.header_proof.value()).map_err(|err| {
            ChannelError::ProofMismatch {
                structure: "RedeemProof::header_proof".into(),
                expected: "a 32 bytes state root".into(),
                actual: err.to_string(),
            }
        })
    }

    /// Verifies the proof against a block hash trusted on the target chain.
    ///
    /// # Arguments
    ///
    /// * `target_chain` - The chain the redemption happens on.
    /// * `trusted_root` - Hash of the target block at [`Self::target_height`].
    ///
    /// # Returns
    ///
    /// The claim backed by the proof.
    pub fn verify(
        &self,
        target_chain: ChainId,
        trusted_root: &HashValue,
    ) -> Result<RedeemClaim, ChannelError> {
        if self.target_chain() != target_chain {
            return Err(ChannelError::TargetChainMismatch {
                expected: self.target_chain(),
                actual: target_chain,
            });
        }

        if self.header_proof.root_tag() != MerkleTag::BlockHash {
            return Err(ChannelError::ProofMismatch {
                structure: "RedeemProof::header_proof".into(),
                expected: format!("{:?}", MerkleTag::BlockHash),
                actual: format!("{:?}", self.header_proof.root_tag()),
            });
        }
        let root = self
            .header_proof
            .run()
            .map_err(ChannelError::merkle("RedeemProof::header_proof"))?;
        if root != *trusted_root {
            return Err(ChannelError::ProofMismatch {
                structure: "RedeemProof::header_proof".into(),
                expected: trusted_root.to_string(),
                actual: root.to_string(),
            });
        }

        let state_root = self.state_root()?;
        self.account_proof.verify(&state_root)?;
        debug!("Account proof verified against state root {state_root}");

        let channel = self.xchan_proof.channel_address()?;
        if channel != self.account_proof.address() {
            return Err(ChannelError::ChannelAddressMismatch {
                channel: format!("{channel:#x}"),
                account: format!("{:#x}", self.account_proof.address()),
            });
        }

        RedeemClaim::create(self)
    }

    /// Serializes the proof to CBOR.
    pub fn to_cbor(&self) -> Result<Vec<u8>, ChannelError> {
        let mut bytes = Vec::new();
        ciborium::into_writer(self, &mut bytes).map_err(|err| ChannelError::Encoding {
            structure: "RedeemProof".into(),
            source: err.into(),
        })?;

        Ok(bytes)
    }

    /// Deserializes a proof from CBOR.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, ChannelError> {
        ciborium::from_reader(bytes).map_err(|err| ChannelError::Encoding {
            structure: "RedeemProof".into(),
            source: err.into(),
        })
    }
}

/// What a redemption proof entitles its redeemer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters, Serialize, Deserialize)]
#[getset(get_copy = "pub")]
pub struct RedeemClaim {
    redeemer: Address,
    channel: Address,
    target_chain: ChainId,
    balance: EvmU256,
}

impl RedeemClaim {
    /// Extracts the claim carried by a redemption proof.
    ///
    /// # Notes
    ///
    /// The proof is not verified. The balance is read from the leaf of the
    /// account proof and the channel address is re-derived from the channel
    /// proof.
    pub fn create(proof: &RedeemProof) -> Result<Self, ChannelError> {
        Ok(Self {
            redeemer: proof.xchan_proof.account(),
            channel: proof.xchan_proof.channel_address()?,
            target_chain: proof.target_chain(),
            balance: proof.account_proof.terminal_balance()?,
        })
    }
}
