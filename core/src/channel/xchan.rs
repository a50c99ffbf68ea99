// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Channel commitments
//!
//! The identifier of a channel is the root of a binary Merkle tree over the
//! following tagged leaves, in order:
//!
//! | Tag | Data                                   |
//! |-----|----------------------------------------|
//! | 1   | version, one byte                      |
//! | 2   | target chain, `u32` big-endian         |
//! | 3   | source chain, `u32` big-endian, nonce, `u256` big-endian |
//! | 4   | one authorized account, 20 bytes, per account |
//!
//! Tag 0 is reserved for inner nodes.

use crate::channel::error::ChannelError;
use crate::crypto::hash::keccak::hash_tagged;
use crate::crypto::hash::HashValue;
use crate::merkle::error::MerkleError;
use crate::merkle::tree::{build_proof, root, CompactProof, ProofLeaf};
use crate::merkle::ADDRESS_BYTES_LENGTH;
use crate::types::{ChainId, U32_BYTES_LENGTH};
use ethers_core::types::{Address, U256 as EvmU256};
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};

/// Current version of the channel commitment layout.
pub const XCHAN_VERSION: u8 = 1;

pub const VERSION_TAG: u8 = 1;
pub const TARGET_CHAIN_TAG: u8 = 2;
pub const SOURCE_TAG: u8 = 3;
pub const POLICY_TAG: u8 = 4;

/// Position of the first account policy leaf.
pub const FIRST_POLICY_POSITION: u64 = 3;

fn version_leaf(version: u8) -> HashValue {
    hash_tagged(VERSION_TAG, &[version])
}

fn target_chain_leaf(target_chain: ChainId) -> HashValue {
    hash_tagged(TARGET_CHAIN_TAG, &target_chain.to_be_bytes())
}

fn source_leaf(source_chain: ChainId, nonce: EvmU256) -> HashValue {
    let mut data = [0u8; U32_BYTES_LENGTH + 32];
    data[..U32_BYTES_LENGTH].copy_from_slice(&source_chain.to_be_bytes());
    nonce.to_big_endian(&mut data[U32_BYTES_LENGTH..]);

    hash_tagged(SOURCE_TAG, &data)
}

fn policy_leaf(account: &Address) -> HashValue {
    hash_tagged(POLICY_TAG, account.as_bytes())
}

/// Converts a channel identifier into the address of the channel.
pub fn identifier_to_address(identifier: &HashValue) -> Address {
    Address::from_slice(&identifier.as_ref()[DIGEST_OFFSET..])
}

const DIGEST_OFFSET: usize = 32 - ADDRESS_BYTES_LENGTH;

/// A cross-chain channel commitment.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters, Serialize, Deserialize)]
pub struct XChan {
    #[getset(get_copy = "pub")]
    target_chain: ChainId,
    /// Accounts allowed to redeem on the target chain.
    #[getset(get = "pub")]
    accounts: Vec<Address>,
    #[getset(get_copy = "pub")]
    source_chain: ChainId,
    #[getset(get_copy = "pub")]
    nonce: EvmU256,
}

impl XChan {
    /// Creates a channel commitment.
    ///
    /// # Arguments
    ///
    /// * `target_chain` - Chain on which the channel can be redeemed.
    /// * `accounts` - The authorized redeemers, in commitment order.
    /// * `source_chain` - Chain on which the channel is funded.
    /// * `nonce` - Distinguishes channels sharing all other parameters.
    ///
    /// # Returns
    ///
    /// The commitment, or [`ChannelError::NoAccounts`] if no account is given.
    pub fn new(
        target_chain: ChainId,
        accounts: Vec<Address>,
        source_chain: ChainId,
        nonce: EvmU256,
    ) -> Result<Self, ChannelError> {
        if accounts.is_empty() {
            return Err(ChannelError::NoAccounts);
        }

        Ok(Self {
            target_chain,
            accounts,
            source_chain,
            nonce,
        })
    }

    /// Leaf hashes of the commitment tree.
    pub fn leaves(&self) -> Vec<HashValue> {
        let mut leaves = Vec::with_capacity(FIRST_POLICY_POSITION as usize + self.accounts.len());
        leaves.push(version_leaf(XCHAN_VERSION));
        leaves.push(target_chain_leaf(self.target_chain));
        leaves.push(source_leaf(self.source_chain, self.nonce));
        leaves.extend(self.accounts.iter().map(policy_leaf));

        leaves
    }

    pub fn identifier(&self) -> Result<HashValue, ChannelError> {
        root(&self.leaves()).map_err(ChannelError::merkle("XChan"))
    }

    /// Address receiving the deposits on the source chain.
    pub fn address(&self) -> Result<Address, ChannelError> {
        Ok(identifier_to_address(&self.identifier()?))
    }

    /// Creates a proof that `account` is authorized by the channel.
    ///
    /// # Arguments
    ///
    /// * `account` - The redeemer.
    ///
    /// # Returns
    ///
    /// A proof revealing the version, the target chain and the policy of
    /// `account`. Everything else is hidden behind subtree roots.
    pub fn create_proof(&self, account: &Address) -> Result<XChanProof, ChannelError> {
        let index = self
            .accounts
            .iter()
            .position(|candidate| candidate == account)
            .ok_or_else(|| ChannelError::UnknownAccount {
                account: format!("{account:#x}"),
            })?;
        let position = FIRST_POLICY_POSITION + index as u64;

        let leaves = self
            .leaves()
            .into_iter()
            .enumerate()
            .map(|(i, leaf)| {
                let i = i as u64;
                (leaf, i == 0 || i == 1 || i == position)
            })
            .collect::<Vec<_>>();
        let (_, proof) = build_proof(&leaves).map_err(ChannelError::merkle("XChan"))?;

        Ok(XChanProof {
            version: XCHAN_VERSION,
            target_chain: self.target_chain,
            account: *account,
            position,
            size: proof.size(),
            roots: proof.roots().clone(),
        })
    }
}

/// Proof that an account is an authorized redeemer of a channel.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters, Serialize, Deserialize)]
pub struct XChanProof {
    #[getset(get_copy = "pub")]
    version: u8,
    #[getset(get_copy = "pub")]
    target_chain: ChainId,
    #[getset(get_copy = "pub")]
    account: Address,
    /// Position of the policy leaf of `account`.
    #[getset(get_copy = "pub")]
    position: u64,
    /// Number of leaves of the commitment tree.
    #[getset(get_copy = "pub")]
    size: u64,
    #[getset(get = "pub")]
    roots: Vec<HashValue>,
}

impl XChanProof {
    /// Re-derives the identifier of the channel.
    ///
    /// # Returns
    ///
    /// The channel identifier, or an error if the proof is structurally
    /// inconsistent.
    pub fn run(&self) -> Result<HashValue, ChannelError> {
        if self.position < FIRST_POLICY_POSITION {
            return Err(ChannelError::Merkle {
                structure: "XChanProof".into(),
                source: MerkleError::MalformedTree {
                    reason: format!("policy leaf at reserved position {}", self.position),
                },
            });
        }

        let proof = CompactProof::new(
            self.size,
            vec![
                ProofLeaf::new(0, version_leaf(self.version)),
                ProofLeaf::new(1, target_chain_leaf(self.target_chain)),
                ProofLeaf::new(self.position, policy_leaf(&self.account)),
            ],
            self.roots.clone(),
        );

        proof.run().map_err(ChannelError::merkle("XChanProof"))
    }

    /// Address of the channel the proof is for.
    pub fn channel_address(&self) -> Result<Address, ChannelError> {
        Ok(identifier_to_address(&self.run()?))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_strategy::proptest;

    const IDENTIFIER_HEX: &str = "33a4c5936e62bcc512702be602be31b58f3c734bfdcc19649dbe1050c899f346";
    const ADDRESS_HEX: &str = "02be31b58f3c734bfdcc19649dbe1050c899f346";
    const SINGLE_IDENTIFIER_HEX: &str =
        "e6f962633351851bf3c4dd5e15321f31b84d01fa5d0fd02c8a655066d611afec";

    fn account_a() -> Address {
        Address::repeat_byte(0x11)
    }

    fn account_b() -> Address {
        Address::repeat_byte(0x22)
    }

    fn channel() -> XChan {
        XChan::new(0, vec![account_a(), account_b()], 1, EvmU256::from(7u64)).unwrap()
    }

    #[test]
    fn test_leaves() {
        let leaves = channel().leaves();
        let expected = [
            "4535a04e923af75e64a9f6cdfb922004b40beec0649d36cf6ea095b7c4975cae",
            "c2f078478c7210a5d23bc1451243c2c032bde0e76f82f341c18a20c96c216eee",
            "a3b52630c37604edcd9d8327c7a5be58676bb5bacda337ede672e424f6dd1ae7",
            "7f275b2a477fb1afc31a3115b4872d5bf58c68efb8a7e3ae4cf2c13a1be4795c",
            "1eddb86726beb2500ce3a5e6239ab12e885fbdf457cf500a01faf608167a8e63",
        ];

        assert_eq!(leaves.len(), expected.len());
        for (leaf, expected) in leaves.iter().zip(expected) {
            assert_eq!(leaf.to_string(), expected);
        }
    }

    #[test]
    fn test_identifier_and_address() {
        let channel = channel();
        assert_eq!(channel.identifier().unwrap().to_string(), IDENTIFIER_HEX);
        assert_eq!(
            hex::encode(channel.address().unwrap().as_bytes()),
            ADDRESS_HEX
        );

        let single = XChan::new(0, vec![account_a()], 1, EvmU256::from(7u64)).unwrap();
        assert_eq!(
            single.identifier().unwrap().to_string(),
            SINGLE_IDENTIFIER_HEX
        );
    }

    #[test]
    fn test_proof_for_each_account() {
        let channel = channel();
        let identifier = channel.identifier().unwrap();

        for (i, account) in [account_a(), account_b()].iter().enumerate() {
            let proof = channel.create_proof(account).unwrap();
            assert_eq!(proof.position(), FIRST_POLICY_POSITION + i as u64);
            assert_eq!(proof.size(), 5);
            assert_eq!(proof.account(), *account);
            assert_eq!(proof.run().unwrap(), identifier);
            assert_eq!(proof.channel_address().unwrap(), channel.address().unwrap());
        }
    }

    #[test]
    fn test_unknown_account() {
        assert!(matches!(
            channel().create_proof(&Address::repeat_byte(0x33)),
            Err(ChannelError::UnknownAccount { .. })
        ));
    }

    #[test]
    fn test_no_accounts() {
        assert!(matches!(
            XChan::new(0, vec![], 1, EvmU256::zero()),
            Err(ChannelError::NoAccounts)
        ));
    }

    #[test]
    fn test_tampered_proof() {
        let channel = channel();
        let identifier = channel.identifier().unwrap();
        let proof = channel.create_proof(&account_a()).unwrap();

        let mut other_account = proof.clone();
        other_account.account = Address::repeat_byte(0x33);
        assert_ne!(other_account.run().unwrap(), identifier);

        let mut other_chain = proof.clone();
        other_chain.target_chain = 2;
        assert_ne!(other_chain.run().unwrap(), identifier);

        let mut reserved = proof.clone();
        reserved.position = 2;
        assert!(reserved.run().is_err());

        let mut missing_root = proof;
        missing_root.roots.pop();
        assert!(missing_root.run().is_err());
    }

    #[proptest]
    fn test_single_bit_flips_change_identifier(
        #[strategy(0usize..20)] byte: usize,
        #[strategy(0u32..8)] bit: u32,
        #[strategy(0usize..32)] nonce_bit: usize,
        #[strategy(0u32..32)] chain_bit: u32,
    ) {
        let base = channel();
        let identifier = base.identifier().unwrap();

        let mut account = account_a().to_fixed_bytes();
        account[byte] ^= 1 << bit;
        let flipped_account = XChan::new(
            0,
            vec![Address::from(account), account_b()],
            1,
            EvmU256::from(7u64),
        )
        .unwrap();
        assert_ne!(flipped_account.identifier().unwrap(), identifier);

        let flipped_nonce = XChan::new(
            0,
            base.accounts().clone(),
            1,
            base.nonce() ^ (EvmU256::one() << (nonce_bit * 8)),
        )
        .unwrap();
        assert_ne!(flipped_nonce.identifier().unwrap(), identifier);

        let flipped_target =
            XChan::new(1 << chain_bit, base.accounts().clone(), 1, base.nonce()).unwrap();
        assert_ne!(flipped_target.identifier().unwrap(), identifier);

        let flipped_source =
            XChan::new(0, base.accounts().clone(), 1 ^ (1 << chain_bit), base.nonce()).unwrap();
        assert_ne!(flipped_source.identifier().unwrap(), identifier);
    }
}
