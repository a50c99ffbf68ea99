// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

use uint::construct_uint;

pub mod error;
pub mod hash;

/// Size in bytes of a U256 integer.
pub const U256_BYTES_LENGTH: usize = 32;

construct_uint! {
    /// 256-bit unsigned integer, used for Chainweb targets and weights as well as
    /// Merkle Log proof traces.
    pub struct U256(4);
}
