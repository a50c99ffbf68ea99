// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Cross-chain channel light client
//!
//! This crate builds redemption proofs for Chainweb cross-chain channels. It
//! fetches the consensus headers along the path between the source and the
//! target chain, the execution header and the account proof of the channel at
//! the source block, and links them together with Merkle Log proofs.
//!
//! ## Binaries
//!
//! - `client`: Builds a redemption proof for a channel and prints its CBOR
//!   encoding.
//!
//! ## Library
//!
//! - [`provider`]: The capability proof construction needs from a data source.
//! - [`client`]: A provider backed by a Chainweb node and EVM JSON-RPC endpoints.
//! - [`proofs`]: Header chain and redemption proof construction.
//! - [`config`]: Client configuration.
//! - [`types`]: Responses received from the remote services.

pub mod client;
pub mod config;
pub mod proofs;
pub mod provider;
pub mod types;
