// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

use crate::crypto::error::CryptoError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod keccak;
pub mod sha512;

/// Length of hash digests in bytes.
pub const DIGEST_BYTES_LENGTH: usize = 32;

/// A structure representing a 32 bytes hash value, either produced by SHA-512/256
/// on the Chainweb side or by keccak256 on the EVM side.
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Serialize, Deserialize)]
pub struct HashValue {
    hash: [u8; DIGEST_BYTES_LENGTH],
}

impl HashValue {
    /// Creates a new `HashValue` from a given hash.
    ///
    /// # Arguments
    ///
    /// * `hash` - A byte array of length `DIGEST_BYTES_LENGTH` representing the hash value.
    ///
    /// # Returns
    ///
    /// A new `HashValue` instance.
    pub const fn new(hash: [u8; DIGEST_BYTES_LENGTH]) -> Self {
        Self { hash }
    }

    /// Creates a `HashValue` from a slice.
    ///
    /// # Arguments
    ///
    /// * `bytes` - A byte slice from which to create the `HashValue`.
    ///
    /// # Returns
    ///
    /// The `HashValue`, or an error if the slice is not `DIGEST_BYTES_LENGTH` long.
    pub fn from_slice<T: AsRef<[u8]>>(bytes: T) -> Result<Self, CryptoError> {
        let bytes = bytes.as_ref();
        <[u8; DIGEST_BYTES_LENGTH]>::try_from(bytes)
            .map(Self::new)
            .map_err(|_| CryptoError::DigestLength {
                expected: DIGEST_BYTES_LENGTH,
                actual: bytes.len(),
            })
    }

    /// Returns the inner bytes of the hash.
    pub const fn hash(&self) -> &[u8; DIGEST_BYTES_LENGTH] {
        &self.hash
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.hash.to_vec()
    }
}

impl AsRef<[u8]> for HashValue {
    fn as_ref(&self) -> &[u8] {
        &self.hash
    }
}

impl From<[u8; DIGEST_BYTES_LENGTH]> for HashValue {
    fn from(hash: [u8; DIGEST_BYTES_LENGTH]) -> Self {
        Self::new(hash)
    }
}

impl fmt::LowerHex for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "0x")?;
        }
        for byte in &self.hash {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self)
    }
}
