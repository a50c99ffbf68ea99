// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

use crate::crypto::hash::{HashValue, DIGEST_BYTES_LENGTH};
use crate::crypto::{U256, U256_BYTES_LENGTH};
use crate::merkle::log::{merkle_log_root, MerkleLogProof};
use crate::merkle::{MerkleLogEntry, MerkleTag};
use crate::types::adjacent::{AdjacentParent, AdjacentParentRecord};
use crate::types::error::{TypesError, ValidationError};
use crate::types::utils::extract_fixed_bytes;
use crate::types::{ChainId, HashCheck, U32_BYTES_LENGTH, U64_BYTES_LENGTH};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use getset::Getters;
use log::warn;

/// Size in bytes of the flags property of a Chainweb header
pub const FLAGS_BYTES_LENGTH: usize = U64_BYTES_LENGTH;

/// Size in bytes of the time property of a Chainweb header
pub const TIME_BYTES_LENGTH: usize = U64_BYTES_LENGTH;

/// Size in bytes of the parent property of a Chainweb header
pub const PARENT_BYTES_LENGTH: usize = DIGEST_BYTES_LENGTH;

/// Size in bytes of the target property of a Chainweb header
pub const TARGET_BYTES_LENGTH: usize = U256_BYTES_LENGTH;

/// Size in bytes of the payload property of a Chainweb header
pub const PAYLOAD_BYTES_LENGTH: usize = DIGEST_BYTES_LENGTH;

/// Size in bytes of the chain property of a Chainweb header
pub const CHAIN_BYTES_LENGTH: usize = U32_BYTES_LENGTH;

/// Size in bytes of the weight property of a Chainweb header
pub const WEIGHT_BYTES_LENGTH: usize = U256_BYTES_LENGTH;

/// Size in bytes of the height property of a Chainweb header
pub const HEIGHT_BYTES_LENGTH: usize = U64_BYTES_LENGTH;

/// Size in bytes of the version property of a Chainweb header
pub const VERSION_BYTES_LENGTH: usize = U32_BYTES_LENGTH;

/// Size in bytes of the epoch_start property of a Chainweb header
pub const EPOCH_START_BYTES_LENGTH: usize = U64_BYTES_LENGTH;

/// Size in bytes of the nonce property of a Chainweb header
pub const NONCE_BYTES_LENGTH: usize = U64_BYTES_LENGTH;

/// Size in bytes of the hash property of a Chainweb header
pub const HASH_BYTES_LENGTH: usize = DIGEST_BYTES_LENGTH;

/// Size in bytes of a Chainweb header without any adjacent parent.
pub const MIN_HEADER_BYTES_LENGTH: usize = FLAGS_BYTES_LENGTH
    + TIME_BYTES_LENGTH
    + PARENT_BYTES_LENGTH
    + 2
    + TARGET_BYTES_LENGTH
    + PAYLOAD_BYTES_LENGTH
    + CHAIN_BYTES_LENGTH
    + WEIGHT_BYTES_LENGTH
    + HEIGHT_BYTES_LENGTH
    + VERSION_BYTES_LENGTH
    + EPOCH_START_BYTES_LENGTH
    + NONCE_BYTES_LENGTH
    + HASH_BYTES_LENGTH;

/// Merkle Log position of the parent hash.
pub const PARENT_POSITION: usize = 2;

/// Merkle Log position of the payload hash.
pub const PAYLOAD_POSITION: usize = 4;

/// Merkle Log position of the first adjacent parent hash. Adjacent parents
/// follow the fixed fields, sorted by chain id.
pub const ADJACENTS_POSITION: usize = 11;

/// Typed values used to build a [`ChainwebHeader`] from scratch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainwebHeaderFields {
    pub flags: u64,
    /// Microseconds since the Unix epoch.
    pub creation_time: u64,
    pub parent: HashValue,
    pub adjacents: Vec<AdjacentParent>,
    pub target: U256,
    pub payload: HashValue,
    pub chain: ChainId,
    pub weight: U256,
    pub height: u64,
    pub version: u32,
    /// Microseconds since the Unix epoch.
    pub epoch_start: u64,
    pub nonce: u64,
}

/// Representation of a Chainweb consensus header with its properties as
/// byte arrays, as found in the binary header format.
///
/// From [the`chainweb-node` wiki](https://github.com/kadena-io/chainweb-node/wiki/Block-Header-Binary-Encoding).
#[derive(Debug, Clone, Eq, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct ChainwebHeader {
    flags: [u8; FLAGS_BYTES_LENGTH],
    time: [u8; TIME_BYTES_LENGTH],
    parent: [u8; PARENT_BYTES_LENGTH],
    adjacents: AdjacentParentRecord,
    target: [u8; TARGET_BYTES_LENGTH],
    payload: [u8; PAYLOAD_BYTES_LENGTH],
    chain: [u8; CHAIN_BYTES_LENGTH],
    weight: [u8; WEIGHT_BYTES_LENGTH],
    height: [u8; HEIGHT_BYTES_LENGTH],
    version: [u8; VERSION_BYTES_LENGTH],
    epoch_start: [u8; EPOCH_START_BYTES_LENGTH],
    nonce: [u8; NONCE_BYTES_LENGTH],
    hash: [u8; HASH_BYTES_LENGTH],
}

impl ChainwebHeader {
    /// Builds a header from its typed fields, computing its hash.
    ///
    /// # Arguments
    ///
    /// * `fields` - The values of the header.
    ///
    /// # Returns
    ///
    /// The header.
    pub fn new(fields: ChainwebHeaderFields) -> Result<Self, ValidationError> {
        let mut target = [0u8; TARGET_BYTES_LENGTH];
        fields.target.to_little_endian(&mut target);
        let mut weight = [0u8; WEIGHT_BYTES_LENGTH];
        fields.weight.to_little_endian(&mut weight);

        let adjacents = AdjacentParentRecord::new(fields.adjacents).map_err(|source| {
            ValidationError::Types {
                structure: "ChainwebHeader".into(),
                source,
            }
        })?;

        let mut header = Self {
            flags: fields.flags.to_le_bytes(),
            time: fields.creation_time.to_le_bytes(),
            parent: *fields.parent.hash(),
            adjacents,
            target,
            payload: *fields.payload.hash(),
            chain: fields.chain.to_le_bytes(),
            weight,
            height: fields.height.to_le_bytes(),
            version: fields.version.to_le_bytes(),
            epoch_start: fields.epoch_start.to_le_bytes(),
            nonce: fields.nonce.to_le_bytes(),
            hash: [0; HASH_BYTES_LENGTH],
        };
        header.hash = *header.compute_hash()?.hash();

        Ok(header)
    }

    /// Creates a new `ChainwebHeader` from a base64 encoded string bytes.
    ///
    /// # Arguments
    ///
    /// * `input` - A slice of bytes representing the base64 encoded string.
    ///
    /// # Returns
    ///
    /// A new `ChainwebHeader` instance.
    pub fn from_base64(input: &[u8]) -> Result<Self, TypesError> {
        let decoded =
            URL_SAFE_NO_PAD
                .decode(input)
                .map_err(|err| TypesError::DeserializationError {
                    structure: "ChainwebHeader".to_string(),
                    source: err.into(),
                })?;

        Self::from_bytes(&decoded)
    }

    /// Creates a new `ChainwebHeader` from a slice of bytes.
    ///
    /// # Arguments
    ///
    /// * `input` - A slice of bytes representing the header.
    ///
    /// # Returns
    ///
    /// A new `ChainwebHeader` instance.
    pub fn from_bytes(input: &[u8]) -> Result<Self, TypesError> {
        if input.len() < MIN_HEADER_BYTES_LENGTH {
            return Err(TypesError::UnderLength {
                structure: "ChainwebHeader".to_string(),
                minimum: MIN_HEADER_BYTES_LENGTH,
                actual: input.len(),
            });
        }

        let cursor = 0;

        let (cursor, flags) =
            extract_fixed_bytes::<FLAGS_BYTES_LENGTH>("ChainwebHeader", input, cursor)?;
        let (cursor, time) =
            extract_fixed_bytes::<TIME_BYTES_LENGTH>("ChainwebHeader", input, cursor)?;
        let (cursor, parent) =
            extract_fixed_bytes::<PARENT_BYTES_LENGTH>("ChainwebHeader", input, cursor)?;
        let (cursor, adjacents) = AdjacentParentRecord::from_bytes(input, cursor)?;
        let (cursor, target) =
            extract_fixed_bytes::<TARGET_BYTES_LENGTH>("ChainwebHeader", input, cursor)?;
        let (cursor, payload) =
            extract_fixed_bytes::<PAYLOAD_BYTES_LENGTH>("ChainwebHeader", input, cursor)?;
        let (cursor, chain) =
            extract_fixed_bytes::<CHAIN_BYTES_LENGTH>("ChainwebHeader", input, cursor)?;
        let (cursor, weight) =
            extract_fixed_bytes::<WEIGHT_BYTES_LENGTH>("ChainwebHeader", input, cursor)?;
        let (cursor, height) =
            extract_fixed_bytes::<HEIGHT_BYTES_LENGTH>("ChainwebHeader", input, cursor)?;
        let (cursor, version) =
            extract_fixed_bytes::<VERSION_BYTES_LENGTH>("ChainwebHeader", input, cursor)?;
        let (cursor, epoch_start) =
            extract_fixed_bytes::<EPOCH_START_BYTES_LENGTH>("ChainwebHeader", input, cursor)?;
        let (cursor, nonce) =
            extract_fixed_bytes::<NONCE_BYTES_LENGTH>("ChainwebHeader", input, cursor)?;
        let (cursor, hash) =
            extract_fixed_bytes::<HASH_BYTES_LENGTH>("ChainwebHeader", input, cursor)?;

        if cursor != input.len() {
            return Err(TypesError::InvalidLength {
                structure: "ChainwebHeader".to_string(),
                expected: cursor,
                actual: input.len(),
            });
        }

        Ok(Self {
            flags,
            time,
            parent,
            adjacents,
            target,
            payload,
            chain,
            weight,
            height,
            version,
            epoch_start,
            nonce,
            hash,
        })
    }

    /// Encodes the `ChainwebHeader` instance as a base64 string bytes.
    pub fn to_base64(&self) -> Vec<u8> {
        URL_SAFE_NO_PAD.encode(self.to_bytes()).into_bytes()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut serialized = Vec::with_capacity(
            MIN_HEADER_BYTES_LENGTH - 2 + self.adjacents.raw_bytes_length(),
        );
        serialized.extend_from_slice(&self.flags);
        serialized.extend_from_slice(&self.time);
        serialized.extend_from_slice(&self.parent);
        serialized.extend_from_slice(&self.adjacents.to_bytes());
        serialized.extend_from_slice(&self.target);
        serialized.extend_from_slice(&self.payload);
        serialized.extend_from_slice(&self.chain);
        serialized.extend_from_slice(&self.weight);
        serialized.extend_from_slice(&self.height);
        serialized.extend_from_slice(&self.version);
        serialized.extend_from_slice(&self.epoch_start);
        serialized.extend_from_slice(&self.nonce);
        serialized.extend_from_slice(&self.hash);

        serialized
    }

    /// Merkle Log entries of the header, in leaf order.
    pub fn entries(&self) -> Vec<MerkleLogEntry> {
        let mut entries = vec![
            MerkleLogEntry::new(MerkleTag::FeatureFlags, self.flags),
            MerkleLogEntry::new(MerkleTag::BlockCreationTime, self.time),
            MerkleLogEntry::new(MerkleTag::BlockHash, self.parent),
            MerkleLogEntry::new(MerkleTag::HashTarget, self.target),
            MerkleLogEntry::new(MerkleTag::BlockPayloadHash, self.payload),
            MerkleLogEntry::new(MerkleTag::ChainId, self.chain),
            MerkleLogEntry::new(MerkleTag::BlockWeight, self.weight),
            MerkleLogEntry::new(MerkleTag::BlockHeight, self.height),
            MerkleLogEntry::new(MerkleTag::ChainwebVersion, self.version),
            MerkleLogEntry::new(MerkleTag::EpochStartTime, self.epoch_start),
            MerkleLogEntry::new(MerkleTag::BlockNonce, self.nonce),
        ];
        entries.extend(
            self.adjacents
                .adjacents()
                .iter()
                .map(|adjacent| MerkleLogEntry::new(MerkleTag::BlockHash, adjacent.hash().to_vec())),
        );

        entries
    }

    /// Computes the root hash of the header, the Merkle Log root of its entries.
    ///
    /// # Returns
    ///
    /// The root hash of the header.
    pub fn compute_hash(&self) -> Result<HashValue, ValidationError> {
        merkle_log_root(&self.entries()).map_err(|source| ValidationError::Merkle {
            structure: "ChainwebHeader".into(),
            source,
        })
    }

    /// Checks the hash carried by the header against the computed one.
    ///
    /// # Arguments
    ///
    /// * `check` - Whether a mismatch is logged or rejected.
    pub fn check_hash(&self, check: HashCheck) -> Result<(), ValidationError> {
        let computed = self.compute_hash()?;
        if computed == self.block_hash() {
            return Ok(());
        }

        match check {
            HashCheck::Warn => {
                warn!(
                    "Chainweb header hash mismatch on chain {} at height {}: computed {}, received {}",
                    self.decoded_chain(),
                    self.decoded_height(),
                    computed,
                    self.block_hash()
                );
                Ok(())
            }
            HashCheck::Strict => Err(ValidationError::HashMismatch {
                structure: "ChainwebHeader".into(),
                computed: computed.to_string(),
                received: self.block_hash().to_string(),
            }),
        }
    }

    fn proof(&self, position: usize) -> Result<MerkleLogProof, ValidationError> {
        MerkleLogProof::create(&self.entries(), position, MerkleTag::BlockHash).map_err(|source| {
            ValidationError::Merkle {
                structure: "ChainwebHeader".into(),
                source,
            }
        })
    }

    /// Proof of the payload hash against the block hash.
    pub fn payload_hash_proof(&self) -> Result<MerkleLogProof, ValidationError> {
        self.proof(PAYLOAD_POSITION)
    }

    /// Proof of the parent hash against the block hash.
    pub fn parent_proof(&self) -> Result<MerkleLogProof, ValidationError> {
        self.proof(PARENT_POSITION)
    }

    /// Proof of the hash of the adjacent parent on a given chain against the
    /// block hash.
    ///
    /// # Arguments
    ///
    /// * `chain` - The adjacent chain.
    ///
    /// # Returns
    ///
    /// The proof, or [`ValidationError::NotAdjacent`] if the header has no
    /// adjacent parent on that chain.
    pub fn adjacent_parents_proof(&self, chain: ChainId) -> Result<MerkleLogProof, ValidationError> {
        let index = self
            .adjacents
            .position(chain)
            .ok_or(ValidationError::NotAdjacent {
                chain,
                header_chain: self.decoded_chain(),
            })?;

        self.proof(ADJACENTS_POSITION + index)
    }

    pub fn block_hash(&self) -> HashValue {
        HashValue::new(self.hash)
    }

    pub fn payload_hash(&self) -> HashValue {
        HashValue::new(self.payload)
    }

    pub fn parent_hash(&self) -> HashValue {
        HashValue::new(self.parent)
    }

    pub const fn decoded_height(&self) -> u64 {
        u64::from_le_bytes(self.height)
    }

    pub const fn decoded_chain(&self) -> ChainId {
        ChainId::from_le_bytes(self.chain)
    }

    pub const fn decoded_version(&self) -> u32 {
        u32::from_le_bytes(self.version)
    }

    pub fn decoded_target(&self) -> U256 {
        U256::from_little_endian(&self.target)
    }

    pub fn decoded_weight(&self) -> U256 {
        U256::from_little_endian(&self.weight)
    }

    /// Creation time of the block.
    pub fn decoded_time(&self) -> Result<DateTime<Utc>, TypesError> {
        micros_to_datetime("ChainwebHeader::time", self.time)
    }

    /// Start time of the difficulty adjustment epoch of the block.
    pub fn decoded_epoch_start(&self) -> Result<DateTime<Utc>, TypesError> {
        micros_to_datetime("ChainwebHeader::epoch_start", self.epoch_start)
    }
}

fn micros_to_datetime(structure: &str, bytes: [u8; 8]) -> Result<DateTime<Utc>, TypesError> {
    let micros = i64::from_le_bytes(bytes);
    DateTime::from_timestamp_micros(micros).ok_or_else(|| TypesError::ConversionError {
        from: structure.to_string(),
        to: "DateTime<Utc>".to_string(),
        source: format!("timestamp {micros} out of range").into(),
    })
}
