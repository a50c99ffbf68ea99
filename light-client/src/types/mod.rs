// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Types
//!
//! Responses received from the remote services.
//!
//! - `chainweb`: Chainweb node REST API responses.
//! - `rpc`: EVM JSON-RPC envelopes.

pub mod chainweb;
pub mod rpc;
