// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! SHA-512/256 hashing following the model of the Chainweb Merkle Log trees.
//!
//! See [the `chainweb-node` wiki](https://github.com/kadena-io/chainweb-node/wiki/Chainweb-Merkle-Tree).

use crate::crypto::hash::HashValue;
use sha2::{Digest, Sha512_256};

// Hash functions for Merkle Log tree nodes
// cf. https://github.com/kadena-io/chainweb-node/wiki/Chainweb-Merkle-Tree#merke-log-trees
pub type ChainwebHash = Sha512_256;

/// Size in bytes of a tag in the context of the Kadena chain.
pub const TAG_BYTES_LENGTH: usize = 2;

/// Domain separator prepended to leaf inputs.
pub const LEAF_PREFIX: u8 = 0x00;

/// Domain separator prepended to inner node inputs.
pub const INNER_PREFIX: u8 = 0x01;

/// Big-endian bytes of a Merkle Log tag.
pub const fn tag_bytes(tag: u16) -> [u8; TAG_BYTES_LENGTH] {
    tag.to_be_bytes()
}

/// Hash the given data along with a tag, as a Merkle Log leaf. The digest
/// input is `0x00 ‖ tag_be16 ‖ bytes`.
///
/// # Arguments
///
/// * `tag` - The tag to prepend to the data.
/// * `bytes` - The encoded value to hash.
///
/// # Returns
///
/// The leaf hash.
pub fn hash_tagged_data(tag: u16, bytes: &[u8]) -> HashValue {
    let input = [&tag_bytes(tag)[..], bytes].concat();
    hash_leaf(&input)
}

/// Hash the given data as a Merkle Log leaf by prepending the byte `0x00`.
pub fn hash_leaf(bytes: &[u8]) -> HashValue {
    hash_data(&[&[LEAF_PREFIX], bytes].concat())
}

/// Hash the given data using the SHA-512/256 hash function.
pub fn hash_data(bytes: &[u8]) -> HashValue {
    let output: [u8; 32] = ChainwebHash::digest(bytes).into();

    HashValue::new(output)
}

/// Hash two child nodes as a Merkle Log inner node. The digest input is
/// `0x01 ‖ left ‖ right`.
///
/// # Arguments
///
/// * `left` - The left child hash.
/// * `right` - The right child hash.
///
/// # Returns
///
/// The hash of the inner node.
pub fn hash_inner(left: &[u8], right: &[u8]) -> HashValue {
    hash_data(&[&[INNER_PREFIX], left, right].concat())
}
