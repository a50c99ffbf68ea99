// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Merkle module
//!
//! Two Merkle engines live here:
//!
//! - `tree`: A generic, keccak256 based, binary Merkle tree with compact
//!     multi-leaf proofs. It backs channel commitments.
//! - `log`: The Chainweb Merkle Log tree, SHA-512/256 based, with single leaf
//!     proofs that can be chained together across trees.
//!
//! This module also holds the closed table of Merkle Log tags along with the
//! way each tagged value is encoded before being hashed.

use crate::crypto::hash::sha512::hash_tagged_data;
use crate::crypto::hash::{HashValue, DIGEST_BYTES_LENGTH};
use crate::merkle::error::MerkleError;
use ethers_core::types::U256 as EvmU256;
use ethers_core::utils::rlp;
use serde::{Deserialize, Serialize};

pub mod error;
pub mod log;
pub mod tree;

/// Size in bytes of the value of a Merkle Log leaf holding a logs bloom.
pub const BLOOM_BYTES_LENGTH: usize = 256;

/// Size in bytes of the value of a Merkle Log leaf holding an EVM address.
pub const ADDRESS_BYTES_LENGTH: usize = 20;

/// Tags associated to the values hashed in Merkle Log trees.
///
/// Chainweb tag values can be found on [the `chainweb-node` wiki](https://github.com/kadena-io/chainweb-node/wiki/Chainweb-Merkle-Tree#chainweb-merkle-hash-function).
/// EVM header fields use the `0x0070` range, in header field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
#[repr(u16)]
pub enum MerkleTag {
    ChainId = 0x0002,
    BlockHeight = 0x0003,
    BlockWeight = 0x0004,
    BlockPayloadHash = 0x0005,
    FeatureFlags = 0x0006,
    BlockCreationTime = 0x0007,
    ChainwebVersion = 0x0008,
    BlockHash = 0x0010,
    HashTarget = 0x0011,
    EpochStartTime = 0x0019,
    BlockNonce = 0x0020,
    EthParentHash = 0x0070,
    EthOmmersHash = 0x0071,
    EthBeneficiary = 0x0072,
    EthStateRoot = 0x0073,
    EthTransactionsRoot = 0x0074,
    EthReceiptsRoot = 0x0075,
    EthBloom = 0x0076,
    EthDifficulty = 0x0077,
    EthBlockNumber = 0x0078,
    EthGasLimit = 0x0079,
    EthGasUsed = 0x007a,
    EthTimestamp = 0x007b,
    EthExtraData = 0x007c,
    EthMixHash = 0x007d,
    EthNonce = 0x007e,
    EthBaseFeePerGas = 0x007f,
    EthWithdrawalsRoot = 0x0080,
    EthBlobGasUsed = 0x0081,
    EthExcessBlobGas = 0x0082,
    EthParentBeaconBlockRoot = 0x0083,
    EthRequestsHash = 0x0084,
}

/// How the value attached to a tag is turned into the bytes fed to the leaf hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafEncoding {
    /// The value is the root of a nested Merkle tree and is used as the leaf
    /// hash as is.
    Tree,
    /// The value is hashed as is and must be exactly this many bytes long.
    /// Chainweb integers are little-endian, EVM hashes are raw bytes.
    Fixed(usize),
    /// The value is a big-endian integer of at most 32 bytes, RLP encoded
    /// before hashing.
    RlpInteger,
    /// The value is an arbitrary byte string, RLP encoded before hashing.
    RlpBytes,
}

impl MerkleTag {
    /// Numeric value of the tag.
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Encoding rule for values tagged with `self`.
    pub const fn encoding(self) -> LeafEncoding {
        use MerkleTag::*;

        match self {
            BlockHash | BlockPayloadHash => LeafEncoding::Tree,
            ChainId | ChainwebVersion => LeafEncoding::Fixed(4),
            BlockHeight | FeatureFlags | BlockCreationTime | EpochStartTime | BlockNonce
            | EthNonce => LeafEncoding::Fixed(8),
            BlockWeight | HashTarget => LeafEncoding::Fixed(32),
            EthParentHash
            | EthOmmersHash
            | EthStateRoot
            | EthTransactionsRoot
            | EthReceiptsRoot
            | EthMixHash
            | EthWithdrawalsRoot
            | EthParentBeaconBlockRoot
            | EthRequestsHash => LeafEncoding::Fixed(DIGEST_BYTES_LENGTH),
            EthBeneficiary => LeafEncoding::Fixed(ADDRESS_BYTES_LENGTH),
            EthBloom => LeafEncoding::Fixed(BLOOM_BYTES_LENGTH),
            EthDifficulty | EthBlockNumber | EthGasLimit | EthGasUsed | EthTimestamp
            | EthBaseFeePerGas | EthBlobGasUsed | EthExcessBlobGas => LeafEncoding::RlpInteger,
            EthExtraData => LeafEncoding::RlpBytes,
        }
    }

    /// Whether leaves with this tag are roots of nested trees.
    pub const fn is_tree(self) -> bool {
        matches!(self.encoding(), LeafEncoding::Tree)
    }
}

impl TryFrom<u16> for MerkleTag {
    type Error = MerkleError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        use MerkleTag::*;

        Ok(match value {
            0x0002 => ChainId,
            0x0003 => BlockHeight,
            0x0004 => BlockWeight,
            0x0005 => BlockPayloadHash,
            0x0006 => FeatureFlags,
            0x0007 => BlockCreationTime,
            0x0008 => ChainwebVersion,
            0x0010 => BlockHash,
            0x0011 => HashTarget,
            0x0019 => EpochStartTime,
            0x0020 => BlockNonce,
            0x0070 => EthParentHash,
            0x0071 => EthOmmersHash,
            0x0072 => EthBeneficiary,
            0x0073 => EthStateRoot,
            0x0074 => EthTransactionsRoot,
            0x0075 => EthReceiptsRoot,
            0x0076 => EthBloom,
            0x0077 => EthDifficulty,
            0x0078 => EthBlockNumber,
            0x0079 => EthGasLimit,
            0x007a => EthGasUsed,
            0x007b => EthTimestamp,
            0x007c => EthExtraData,
            0x007d => EthMixHash,
            0x007e => EthNonce,
            0x007f => EthBaseFeePerGas,
            0x0080 => EthWithdrawalsRoot,
            0x0081 => EthBlobGasUsed,
            0x0082 => EthExcessBlobGas,
            0x0083 => EthParentBeaconBlockRoot,
            0x0084 => EthRequestsHash,
            tag => return Err(MerkleError::UnsupportedTag { tag }),
        })
    }
}

impl From<MerkleTag> for u16 {
    fn from(tag: MerkleTag) -> Self {
        tag.code()
    }
}

/// Encodes a tagged value into the bytes hashed in its Merkle Log leaf.
///
/// # Arguments
///
/// * `tag` - The tag of the value.
/// * `value` - The value, see [`LeafEncoding`] for the expected representation.
///
/// # Returns
///
/// The encoded bytes.
///
/// # Notes
///
/// Tree tags have no encoding, their value is the leaf hash itself. Encoding
/// one results in [`MerkleError::UnsupportedTag`].
pub fn encode(tag: MerkleTag, value: &[u8]) -> Result<Vec<u8>, MerkleError> {
    match tag.encoding() {
        LeafEncoding::Tree => Err(MerkleError::UnsupportedTag { tag: tag.code() }),
        LeafEncoding::Fixed(length) => {
            if value.len() != length {
                return Err(MerkleError::InvalidLeafValue {
                    tag: tag.code(),
                    expected: length,
                    actual: value.len(),
                });
            }
            Ok(value.to_vec())
        }
        LeafEncoding::RlpInteger => {
            if value.len() > 32 {
                return Err(MerkleError::InvalidLeafValue {
                    tag: tag.code(),
                    expected: 32,
                    actual: value.len(),
                });
            }
            Ok(rlp::encode(&EvmU256::from_big_endian(value)).to_vec())
        }
        LeafEncoding::RlpBytes => Ok(rlp::encode(&value).to_vec()),
    }
}

/// Computes the Merkle Log leaf hash of a tagged value.
pub fn leaf_hash(tag: MerkleTag, value: &[u8]) -> Result<HashValue, MerkleError> {
    if tag.is_tree() {
        return HashValue::from_slice(value).map_err(|_| MerkleError::InvalidLeafValue {
            tag: tag.code(),
            expected: DIGEST_BYTES_LENGTH,
            actual: value.len(),
        });
    }

    Ok(hash_tagged_data(tag.code(), &encode(tag, value)?))
}

/// A tagged value stored as a Merkle Log leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleLogEntry {
    pub tag: MerkleTag,
    pub value: Vec<u8>,
}

impl MerkleLogEntry {
    pub fn new(tag: MerkleTag, value: impl Into<Vec<u8>>) -> Self {
        Self {
            tag,
            value: value.into(),
        }
    }

    pub fn leaf_hash(&self) -> Result<HashValue, MerkleError> {
        leaf_hash(self.tag, &self.value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const ALL_CODES: [u16; 32] = [
        0x0002, 0x0003, 0x0004, 0x0005, 0x0006, 0x0007, 0x0008, 0x0010, 0x0011, 0x0019, 0x0020,
        0x0070, 0x0071, 0x0072, 0x0073, 0x0074, 0x0075, 0x0076, 0x0077, 0x0078, 0x0079, 0x007a,
        0x007b, 0x007c, 0x007d, 0x007e, 0x007f, 0x0080, 0x0081, 0x0082, 0x0083, 0x0084,
    ];

    #[test]
    fn test_tag_codes_round_trip() {
        for code in ALL_CODES {
            let tag = MerkleTag::try_from(code).unwrap();
            assert_eq!(u16::from(tag), code);
        }
        assert!(matches!(
            MerkleTag::try_from(0x0013),
            Err(MerkleError::UnsupportedTag { tag: 0x0013 })
        ));
    }

    #[test]
    fn test_encode_tree_tag_is_unsupported() {
        assert!(matches!(
            encode(MerkleTag::BlockHash, &[0; 32]),
            Err(MerkleError::UnsupportedTag { tag: 0x0010 })
        ));
        assert!(matches!(
            encode(MerkleTag::BlockPayloadHash, &[0; 32]),
            Err(MerkleError::UnsupportedTag { tag: 0x0005 })
        ));
    }

    #[test]
    fn test_encode_fixed_checks_length() {
        assert_eq!(
            encode(MerkleTag::ChainId, &[1, 0, 0, 0]).unwrap(),
            vec![1, 0, 0, 0]
        );
        assert!(matches!(
            encode(MerkleTag::BlockHeight, &[1, 0, 0, 0]),
            Err(MerkleError::InvalidLeafValue {
                expected: 8,
                actual: 4,
                ..
            })
        ));
    }

    #[test]
    fn test_encode_rlp_values() {
        // 0 is the empty string, small values are single bytes.
        assert_eq!(encode(MerkleTag::EthGasUsed, &[0; 32]).unwrap(), vec![0x80]);
        assert_eq!(encode(MerkleTag::EthBlockNumber, &[0x05]).unwrap(), vec![0x05]);
        assert_eq!(
            encode(MerkleTag::EthTimestamp, &[0x00, 0x04, 0x00]).unwrap(),
            vec![0x82, 0x04, 0x00]
        );
        assert_eq!(encode(MerkleTag::EthExtraData, &[]).unwrap(), vec![0x80]);
        assert_eq!(
            encode(MerkleTag::EthExtraData, &[0xaa, 0xbb]).unwrap(),
            vec![0x82, 0xaa, 0xbb]
        );
    }

    #[test]
    fn test_tree_leaf_hash_is_value() {
        let value = [9u8; 32];
        assert_eq!(
            leaf_hash(MerkleTag::BlockHash, &value).unwrap(),
            HashValue::new(value)
        );
        assert!(leaf_hash(MerkleTag::BlockHash, &value[..31]).is_err());
    }
}
