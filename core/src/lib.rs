// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Cross-chain channel light client core
//!
//! Core types and verification logic needed to prove, on a target
//! Chainweb chain, that a deposit was made on a cross-chain channel
//! living on a source chain.
//!
//! ## Sub-modules
//!
//! - `crypto`: Hash primitives (SHA-512/256 for Chainweb Merkle Logs, keccak256 for the EVM layer).
//! - `merkle`: The generic binary Merkle engine and the Chainweb Merkle Log engine.
//! - `types`: Consensus and execution header codecs, and the chain graph router.
//! - `channel`: Channel commitments, account proofs and redemption proofs.

pub mod channel;
pub mod crypto;
pub mod merkle;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod types;
