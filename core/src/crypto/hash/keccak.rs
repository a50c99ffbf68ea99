// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! keccak256 hashing, used by the EVM execution layer and by the binary
//! Merkle engine backing channel commitments.

use crate::crypto::hash::HashValue;
use tiny_keccak::{Hasher, Keccak};

/// keccak256 of the empty byte string. Used as the padding leaf of the binary
/// Merkle engine.
pub const EMPTY_LEAF_HASH: HashValue = HashValue::new([
    0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c, 0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03, 0xc0,
    0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b, 0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85, 0xa4, 0x70,
]);

/// Tag byte reserved for inner nodes of the binary Merkle engine.
pub const INNER_TAG: u8 = 0x00;

/// Hash the given data using keccak256.
pub fn keccak256(bytes: &[u8]) -> HashValue {
    let mut hasher = Keccak::v256();
    hasher.update(bytes);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);

    HashValue::new(output)
}

/// Hash a leaf value with its one byte tag, `keccak256(tag ‖ bytes)`.
///
/// # Arguments
///
/// * `tag` - The leaf tag. `INNER_TAG` is reserved for inner nodes.
/// * `bytes` - The leaf data.
///
/// # Returns
///
/// The leaf hash.
pub fn hash_tagged(tag: u8, bytes: &[u8]) -> HashValue {
    let mut hasher = Keccak::v256();
    hasher.update(&[tag]);
    hasher.update(bytes);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);

    HashValue::new(output)
}

/// Hash two child nodes, `keccak256(0x00 ‖ left ‖ right)`.
pub fn hash_node(left: &HashValue, right: &HashValue) -> HashValue {
    let mut hasher = Keccak::v256();
    hasher.update(&[INNER_TAG]);
    hasher.update(left.as_ref());
    hasher.update(right.as_ref());
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);

    HashValue::new(output)
}
