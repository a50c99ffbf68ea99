// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Header codecs
//!
//! Both header formats are mapped onto Merkle Log trees:
//!
//! - `chain`: Chainweb consensus headers, whose Merkle Log root is the block hash.
//! - `execution`: EVM execution headers, whose Merkle Log root is the payload
//!     hash committed to by the consensus header.

pub mod chain;
pub mod execution;

pub use chain::{ChainwebHeader, ChainwebHeaderFields};
pub use execution::{ExecutionHeader, ExecutionHeaderRaw};
