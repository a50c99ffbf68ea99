// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

use getset::{CopyGetters, Getters};
use serde::Deserialize;
use std::collections::BTreeMap;
use xchan_lc_core::types::error::TypesError;
use xchan_lc_core::types::header::ChainwebHeader;
use xchan_lc_core::types::ChainId;

/// Response received while querying block headers from a Chainweb
/// node. Headers are base64 encoded binary headers.
#[derive(Clone, Debug, Deserialize, Getters)]
#[getset(get = "pub")]
pub struct BlockHeaderResponse {
    #[serde(default)]
    next: Option<String>,
    items: Vec<String>,
    limit: usize,
}

impl TryFrom<BlockHeaderResponse> for Vec<ChainwebHeader> {
    type Error = TypesError;

    fn try_from(response: BlockHeaderResponse) -> Result<Self, Self::Error> {
        response
            .items
            .into_iter()
            .map(|item| ChainwebHeader::from_base64(item.as_bytes()))
            .collect()
    }
}

/// Latest block of a chain in a cut.
#[derive(Clone, Copy, Debug, Deserialize, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct CutEntry {
    height: u64,
}

/// Response received while querying the current cut of a Chainweb node,
/// the set of latest blocks of all chains.
#[derive(Clone, Debug, Deserialize, Getters)]
#[getset(get = "pub")]
pub struct CutResponse {
    hashes: BTreeMap<ChainId, CutEntry>,
}

impl CutResponse {
    /// Height of the latest block of a chain in the cut.
    pub fn height(&self, chain: ChainId) -> Option<u64> {
        self.hashes.get(&chain).map(CutEntry::height)
    }
}
