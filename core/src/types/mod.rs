// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

pub mod adjacent;
pub mod error;
pub mod graph;
pub mod header;
pub mod utils;

/// Identifier of a chain in a Chainweb network.
pub type ChainId = u32;

pub const U16_BYTES_LENGTH: usize = 2;
pub const U32_BYTES_LENGTH: usize = 4;
pub const U64_BYTES_LENGTH: usize = 8;

/// Behavior when a header hash recomputed locally does not match the hash
/// received along with the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HashCheck {
    /// Log a warning and keep going.
    #[default]
    Warn,
    /// Fail with a validation error.
    Strict,
}

impl HashCheck {
    pub const fn from_strict(strict: bool) -> Self {
        if strict {
            Self::Strict
        } else {
            Self::Warn
        }
    }
}
