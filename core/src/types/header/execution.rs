// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Execution header
//!
//! EVM block headers as served by `eth_getBlockByNumber`. Two hashes are
//! derived from the same fields: the native block hash, keccak256 of the RLP
//! encoded header, and the payload hash, the Merkle Log root over the fields
//! which the Chainweb consensus header commits to.

use crate::crypto::hash::keccak::keccak256;
use crate::crypto::hash::HashValue;
use crate::merkle::log::{merkle_log_root, MerkleLogProof};
use crate::merkle::{MerkleLogEntry, MerkleTag};
use crate::types::error::ValidationError;
use crate::types::HashCheck;
use ethers_core::types::{Address, Bloom, Bytes, H256, H64, U256, U64};
use ethers_core::utils::rlp::RlpStream;
use getset::{CopyGetters, Getters};
use log::warn;
use serde::{Deserialize, Serialize};

/// Number of fields of a Prague execution header.
pub const EXECUTION_HEADER_FIELDS: usize = 21;

/// Number of fields of a header before the London fork.
const LEGACY_HEADER_FIELDS: usize = 15;

/// Merkle Log position of the state root.
pub const STATE_ROOT_POSITION: usize = 3;

/// Execution header fields, in header order, as returned by the JSON-RPC API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionHeaderRaw {
    pub parent_hash: H256,
    #[serde(rename = "sha3Uncles")]
    pub ommers_hash: H256,
    #[serde(rename = "miner")]
    pub beneficiary: Address,
    pub state_root: H256,
    pub transactions_root: H256,
    pub receipts_root: H256,
    pub logs_bloom: Bloom,
    pub difficulty: U256,
    pub number: U64,
    pub gas_limit: U64,
    pub gas_used: U64,
    pub timestamp: U64,
    pub extra_data: Bytes,
    pub mix_hash: H256,
    pub nonce: H64,
    pub base_fee_per_gas: U256,
    pub withdrawals_root: H256,
    pub blob_gas_used: U64,
    pub excess_blob_gas: U64,
    pub parent_beacon_block_root: H256,
    pub requests_hash: H256,
    /// Block hash as claimed by the remote node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<H256>,
}

fn quantity(value: U256) -> Vec<u8> {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    bytes.to_vec()
}

impl ExecutionHeaderRaw {
    /// RLP encoding of the header, whose keccak256 is the block hash.
    pub fn rlp_bytes(&self) -> Vec<u8> {
        let mut stream = RlpStream::new_list(EXECUTION_HEADER_FIELDS);
        self.append_legacy_fields(&mut stream);
        stream.append(&self.base_fee_per_gas);
        stream.append(&self.withdrawals_root);
        stream.append(&self.blob_gas_used);
        stream.append(&self.excess_blob_gas);
        stream.append(&self.parent_beacon_block_root);
        stream.append(&self.requests_hash);

        stream.out().to_vec()
    }

    /// Appends the fields shared with pre-London headers, up to the nonce.
    fn append_legacy_fields(&self, stream: &mut RlpStream) {
        stream.append(&self.parent_hash);
        stream.append(&self.ommers_hash);
        stream.append(&self.beneficiary);
        stream.append(&self.state_root);
        stream.append(&self.transactions_root);
        stream.append(&self.receipts_root);
        stream.append(&self.logs_bloom.as_bytes());
        stream.append(&self.difficulty);
        stream.append(&self.number);
        stream.append(&self.gas_limit);
        stream.append(&self.gas_used);
        stream.append(&self.timestamp);
        stream.append(&self.extra_data.as_ref());
        stream.append(&self.mix_hash);
        stream.append(&self.nonce.as_bytes());
    }

    /// Merkle Log entries of the header, in header order.
    pub fn entries(&self) -> Vec<MerkleLogEntry> {
        vec![
            MerkleLogEntry::new(MerkleTag::EthParentHash, self.parent_hash.as_bytes()),
            MerkleLogEntry::new(MerkleTag::EthOmmersHash, self.ommers_hash.as_bytes()),
            MerkleLogEntry::new(MerkleTag::EthBeneficiary, self.beneficiary.as_bytes()),
            MerkleLogEntry::new(MerkleTag::EthStateRoot, self.state_root.as_bytes()),
            MerkleLogEntry::new(
                MerkleTag::EthTransactionsRoot,
                self.transactions_root.as_bytes(),
            ),
            MerkleLogEntry::new(MerkleTag::EthReceiptsRoot, self.receipts_root.as_bytes()),
            MerkleLogEntry::new(MerkleTag::EthBloom, self.logs_bloom.as_bytes()),
            MerkleLogEntry::new(MerkleTag::EthDifficulty, quantity(self.difficulty)),
            MerkleLogEntry::new(MerkleTag::EthBlockNumber, quantity(self.number.as_u64().into())),
            MerkleLogEntry::new(MerkleTag::EthGasLimit, quantity(self.gas_limit.as_u64().into())),
            MerkleLogEntry::new(MerkleTag::EthGasUsed, quantity(self.gas_used.as_u64().into())),
            MerkleLogEntry::new(MerkleTag::EthTimestamp, quantity(self.timestamp.as_u64().into())),
            MerkleLogEntry::new(MerkleTag::EthExtraData, self.extra_data.to_vec()),
            MerkleLogEntry::new(MerkleTag::EthMixHash, self.mix_hash.as_bytes()),
            MerkleLogEntry::new(MerkleTag::EthNonce, self.nonce.as_bytes()),
            MerkleLogEntry::new(MerkleTag::EthBaseFeePerGas, quantity(self.base_fee_per_gas)),
            MerkleLogEntry::new(
                MerkleTag::EthWithdrawalsRoot,
                self.withdrawals_root.as_bytes(),
            ),
            MerkleLogEntry::new(
                MerkleTag::EthBlobGasUsed,
                quantity(self.blob_gas_used.as_u64().into()),
            ),
            MerkleLogEntry::new(
                MerkleTag::EthExcessBlobGas,
                quantity(self.excess_blob_gas.as_u64().into()),
            ),
            MerkleLogEntry::new(
                MerkleTag::EthParentBeaconBlockRoot,
                self.parent_beacon_block_root.as_bytes(),
            ),
            MerkleLogEntry::new(MerkleTag::EthRequestsHash, self.requests_hash.as_bytes()),
        ]
    }
}

/// An execution header along with its derived hashes.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct ExecutionHeader {
    #[getset(get = "pub")]
    raw: ExecutionHeaderRaw,
    /// keccak256 of the RLP encoded header.
    #[getset(get_copy = "pub")]
    block_hash: HashValue,
    /// Merkle Log root over the header fields.
    #[getset(get_copy = "pub")]
    payload_hash: HashValue,
}

impl ExecutionHeader {
    /// Builds an execution header, computing its block hash and payload hash.
    ///
    /// # Arguments
    ///
    /// * `raw` - The header fields.
    /// * `check` - What to do when the block hash carried by `raw` differs
    ///     from the computed one.
    ///
    /// # Returns
    ///
    /// The header.
    pub fn new(raw: ExecutionHeaderRaw, check: HashCheck) -> Result<Self, ValidationError> {
        let block_hash = keccak256(&raw.rlp_bytes());
        let payload_hash =
            merkle_log_root(&raw.entries()).map_err(|source| ValidationError::Merkle {
                structure: "ExecutionHeader".into(),
                source,
            })?;

        if let Some(received) = raw.hash {
            let received = HashValue::new(received.0);
            verify_hash("ExecutionHeader::hash", block_hash, received, check)?;
        }

        Ok(Self {
            raw,
            block_hash,
            payload_hash,
        })
    }

    /// Compares the payload hash with the one committed to by a consensus header.
    pub fn check_payload_hash(
        &self,
        expected: HashValue,
        check: HashCheck,
    ) -> Result<(), ValidationError> {
        verify_hash(
            "ExecutionHeader::payload_hash",
            self.payload_hash,
            expected,
            check,
        )
    }

    /// Proof of the state root against the payload hash.
    pub fn state_root_proof(&self) -> Result<MerkleLogProof, ValidationError> {
        MerkleLogProof::create(
            &self.raw.entries(),
            STATE_ROOT_POSITION,
            MerkleTag::BlockPayloadHash,
        )
        .map_err(|source| ValidationError::Merkle {
            structure: "ExecutionHeader".into(),
            source,
        })
    }

    pub fn state_root(&self) -> HashValue {
        HashValue::new(self.raw.state_root.0)
    }

    pub fn number(&self) -> u64 {
        self.raw.number.as_u64()
    }
}

fn verify_hash(
    structure: &str,
    computed: HashValue,
    received: HashValue,
    check: HashCheck,
) -> Result<(), ValidationError> {
    if computed == received {
        return Ok(());
    }

    match check {
        HashCheck::Warn => {
            warn!("{structure} mismatch: computed {computed}, received {received}");
            Ok(())
        }
        HashCheck::Strict => Err(ValidationError::HashMismatch {
            structure: structure.into(),
            computed: computed.to_string(),
            received: received.to_string(),
        }),
    }
}
