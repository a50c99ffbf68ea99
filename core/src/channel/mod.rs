// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Channels
//!
//! A channel is a commitment to a target chain, a set of authorized
//! redeemers, a source chain and a nonce. Its identifier is the root of a
//! binary Merkle tree over those values, and its address, the last 20 bytes
//! of the identifier, receives the deposits on the source chain.
//!
//! ## Sub-modules
//!
//! - `xchan`: Channel commitments and inclusion proofs of a redeemer.
//! - `account`: Account state proofs against an execution state root.
//! - `redeem`: Redemption proofs bundling all of the above with a Merkle Log
//!     proof from the source block to a header trusted on the target chain.

pub mod account;
pub mod error;
pub mod redeem;
pub mod xchan;
