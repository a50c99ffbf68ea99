// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

use crate::crypto::hash::{HashValue, DIGEST_BYTES_LENGTH};
use crate::deserialization_error;
use crate::types::error::TypesError;
use crate::types::utils::extract_fixed_bytes;
use crate::types::{ChainId, U16_BYTES_LENGTH, U32_BYTES_LENGTH};
use getset::{CopyGetters, Getters};

/// Size in bytes of a single adjacent parent in the binary header format.
pub const ADJACENT_PARENT_RAW_BYTES_LENGTH: usize = U32_BYTES_LENGTH + DIGEST_BYTES_LENGTH;

/// Hash of the header of an adjacent chain at the previous height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, CopyGetters)]
pub struct AdjacentParent {
    #[getset(get_copy = "pub")]
    chain: ChainId,
    #[getset(get = "pub")]
    hash: HashValue,
}

impl AdjacentParent {
    pub const fn new(chain: ChainId, hash: HashValue) -> Self {
        Self { chain, hash }
    }

    fn from_bytes(bytes: &[u8], cursor: usize) -> Result<(usize, Self), TypesError> {
        let (cursor, chain) =
            extract_fixed_bytes::<U32_BYTES_LENGTH>("AdjacentParent", bytes, cursor)?;
        let (cursor, hash) =
            extract_fixed_bytes::<DIGEST_BYTES_LENGTH>("AdjacentParent", bytes, cursor)?;

        Ok((
            cursor,
            Self {
                chain: ChainId::from_le_bytes(chain),
                hash: HashValue::new(hash),
            },
        ))
    }
}

/// The adjacent parents of a header, sorted by chain id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacentParentRecord {
    adjacents: Vec<AdjacentParent>,
}

impl AdjacentParentRecord {
    /// Creates a record from adjacent parents given in any order.
    ///
    /// # Arguments
    ///
    /// * `adjacents` - The adjacent parents.
    ///
    /// # Returns
    ///
    /// The sorted record, or an error if a chain appears twice.
    pub fn new(mut adjacents: Vec<AdjacentParent>) -> Result<Self, TypesError> {
        adjacents.sort_unstable_by_key(|adjacent| adjacent.chain);

        if adjacents.windows(2).any(|pair| pair[0].chain == pair[1].chain) {
            return Err(deserialization_error!(
                "AdjacentParentRecord",
                "Duplicated adjacent chain"
            ));
        }

        Ok(Self { adjacents })
    }

    /// Reads a record from the binary header format, a little-endian `u16`
    /// count followed by the adjacent parents.
    ///
    /// # Arguments
    ///
    /// * `bytes` - The header bytes.
    /// * `cursor` - The position of the record in `bytes`.
    ///
    /// # Returns
    ///
    /// The cursor after the record and the record.
    pub fn from_bytes(bytes: &[u8], cursor: usize) -> Result<(usize, Self), TypesError> {
        let (mut cursor, length) =
            extract_fixed_bytes::<U16_BYTES_LENGTH>("AdjacentParentRecord", bytes, cursor)?;
        let length = u16::from_le_bytes(length) as usize;

        let mut adjacents = Vec::with_capacity(length);
        for _ in 0..length {
            let (next, adjacent) = AdjacentParent::from_bytes(bytes, cursor)?;
            adjacents.push(adjacent);
            cursor = next;
        }

        Ok((cursor, Self::new(adjacents)?))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.raw_bytes_length());
        bytes.extend_from_slice(&(self.adjacents.len() as u16).to_le_bytes());
        for adjacent in &self.adjacents {
            bytes.extend_from_slice(&adjacent.chain.to_le_bytes());
            bytes.extend_from_slice(adjacent.hash.as_ref());
        }

        bytes
    }

    /// Size of the record in the binary header format.
    pub fn raw_bytes_length(&self) -> usize {
        U16_BYTES_LENGTH + self.adjacents.len() * ADJACENT_PARENT_RAW_BYTES_LENGTH
    }

    pub fn adjacents(&self) -> &[AdjacentParent] {
        &self.adjacents
    }

    pub fn len(&self) -> usize {
        self.adjacents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacents.is_empty()
    }

    /// Index of the given chain among the sorted adjacent parents.
    pub fn position(&self, chain: ChainId) -> Option<usize> {
        self.adjacents
            .binary_search_by_key(&chain, |adjacent| adjacent.chain)
            .ok()
    }

    pub fn hashes(&self) -> Vec<HashValue> {
        self.adjacents.iter().map(|a| a.hash).collect()
    }
}
