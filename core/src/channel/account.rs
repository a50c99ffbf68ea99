// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Account proofs
//!
//! Account proofs as returned by an RPC endpoint supporting [EIP-1186](https://eips.ethereum.org/EIPS/eip-1186).
//! The proof nodes form a path in the Merkle-Patricia state trie, from the
//! state root down to the leaf holding the RLP encoded account, keyed by the
//! keccak256 hash of the address.
//!
//! Only inclusion proofs are supported: an absent account cannot back a
//! redemption.

use crate::channel::error::ChannelError;
use crate::crypto::hash::keccak::keccak256;
use crate::crypto::hash::{HashValue, DIGEST_BYTES_LENGTH};
use ethers_core::types::{Address, Bytes, EIP1186ProofResponse, H256, U256 as EvmU256, U64};
use ethers_core::utils::rlp::{Rlp, RlpStream};
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};

/// Number of items of a branch node.
const BRANCH_NODE_ITEMS: usize = 17;
/// Number of items of leaf and extension nodes.
const SHORT_NODE_ITEMS: usize = 2;
/// Number of nibbles in a state trie key.
const KEY_NIBBLES: usize = DIGEST_BYTES_LENGTH * 2;

fn invalid(reason: impl Into<String>) -> ChannelError {
    ChannelError::AccountProof {
        reason: reason.into(),
    }
}

fn rlp_error(error: ethers_core::utils::rlp::DecoderError) -> ChannelError {
    invalid(format!("malformed trie node: {error}"))
}

/// Proof of the state of an account against a state root.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters, Serialize, Deserialize)]
pub struct AccountProof {
    #[getset(get_copy = "pub")]
    address: Address,
    #[getset(get_copy = "pub")]
    nonce: U64,
    #[getset(get_copy = "pub")]
    balance: EvmU256,
    #[getset(get_copy = "pub")]
    storage_hash: H256,
    #[getset(get_copy = "pub")]
    code_hash: H256,
    /// Trie nodes from the state root to the account leaf.
    #[getset(get = "pub")]
    proof: Vec<Bytes>,
}

impl TryFrom<EIP1186ProofResponse> for AccountProof {
    type Error = ChannelError;

    fn try_from(response: EIP1186ProofResponse) -> Result<Self, Self::Error> {
        if response.account_proof.is_empty() {
            return Err(invalid("no trie node in eth_getProof response"));
        }

        Ok(Self {
            address: response.address,
            nonce: response.nonce,
            balance: response.balance,
            storage_hash: response.storage_hash,
            code_hash: response.code_hash,
            proof: response.account_proof,
        })
    }
}

/// Trie node reference found in a parent node.
enum NodeRef {
    Hash(HashValue),
    Inline(Vec<u8>),
}

impl NodeRef {
    fn from_item(item: &Rlp) -> Result<Self, ChannelError> {
        if item.is_list() {
            return Ok(Self::Inline(item.as_raw().to_vec()));
        }

        let data = item.data().map_err(rlp_error)?;
        match data.len() {
            0 => Err(invalid("account is absent from the state trie")),
            DIGEST_BYTES_LENGTH => Ok(Self::Hash(HashValue::from_slice(data).map_err(
                |_| invalid("malformed node reference"),
            )?)),
            length => Err(invalid(format!("node reference of {length} bytes"))),
        }
    }

    fn matches(&self, node: &[u8]) -> bool {
        match self {
            Self::Hash(hash) => keccak256(node) == *hash,
            Self::Inline(raw) => raw.as_slice() == node,
        }
    }
}

fn to_nibbles(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().flat_map(|byte| [byte >> 4, byte & 0x0f]).collect()
}

/// Decodes a hex-prefix encoded path, returning whether it belongs to a leaf
/// along with its nibbles.
fn decode_path(encoded: &[u8]) -> Result<(bool, Vec<u8>), ChannelError> {
    let (flags, rest) = encoded
        .split_first()
        .ok_or_else(|| invalid("empty node path"))?;
    let is_leaf = flags & 0x20 != 0;
    let is_odd = flags & 0x10 != 0;

    let mut nibbles = Vec::with_capacity(rest.len() * 2 + 1);
    if is_odd {
        nibbles.push(flags & 0x0f);
    }
    nibbles.extend(to_nibbles(rest));

    Ok((is_leaf, nibbles))
}

/// Follows `key` in a Merkle-Patricia trie, returning the value of the leaf
/// it leads to.
///
/// # Arguments
///
/// * `proof` - Nodes from the root to the leaf.
/// * `root` - Root hash of the trie.
/// * `key` - Key of the leaf, already hashed.
///
/// # Returns
///
/// The leaf value.
fn verify_trie_path(
    proof: &[Bytes],
    root: &HashValue,
    key: &[u8; DIGEST_BYTES_LENGTH],
) -> Result<Vec<u8>, ChannelError> {
    let path = to_nibbles(key);
    let mut expected = NodeRef::Hash(*root);
    let mut offset = 0;

    for (i, node) in proof.iter().enumerate() {
        if !expected.matches(node) {
            return Err(invalid(format!("node {i} does not match its reference")));
        }

        let rlp = Rlp::new(node);
        match rlp.item_count().map_err(rlp_error)? {
            BRANCH_NODE_ITEMS => {
                let nibble = *path
                    .get(offset)
                    .ok_or_else(|| invalid("key exhausted at a branch node"))?;
                expected = NodeRef::from_item(&rlp.at(nibble as usize).map_err(rlp_error)?)?;
                offset += 1;
            }
            SHORT_NODE_ITEMS => {
                let encoded_path = rlp.at(0).map_err(rlp_error)?;
                let (is_leaf, nibbles) = decode_path(encoded_path.data().map_err(rlp_error)?)?;
                if !path[offset..].starts_with(&nibbles) {
                    return Err(invalid("account is absent from the state trie"));
                }
                offset += nibbles.len();

                if is_leaf {
                    if offset != KEY_NIBBLES || i + 1 != proof.len() {
                        return Err(invalid("leaf node before the end of the proof"));
                    }
                    return Ok(rlp
                        .at(1)
                        .map_err(rlp_error)?
                        .data()
                        .map_err(rlp_error)?
                        .to_vec());
                }

                expected = NodeRef::from_item(&rlp.at(1).map_err(rlp_error)?)?;
            }
            count => return Err(invalid(format!("trie node with {count} items"))),
        }
    }

    Err(invalid("proof ended before reaching a leaf"))
}

impl AccountProof {
    /// RLP encoding of the account, as stored in the state trie.
    pub fn encoded_account(&self) -> Vec<u8> {
        let mut stream = RlpStream::new_list(4);
        stream.append(&self.nonce);
        stream.append(&self.balance);
        stream.append(&self.storage_hash);
        stream.append(&self.code_hash);

        stream.out().to_vec()
    }

    /// Value stored at the leaf the proof leads to, without checking the
    /// path to that leaf.
    pub fn terminal_value(&self) -> Result<Vec<u8>, ChannelError> {
        let node = self
            .proof
            .last()
            .ok_or_else(|| invalid("empty account proof"))?;
        let rlp = Rlp::new(node);
        if rlp.item_count().map_err(rlp_error)? != SHORT_NODE_ITEMS {
            return Err(invalid("last node of the proof is not a leaf"));
        }

        let encoded_path = rlp.at(0).map_err(rlp_error)?;
        let (is_leaf, _) = decode_path(encoded_path.data().map_err(rlp_error)?)?;
        if !is_leaf {
            return Err(invalid("last node of the proof is not a leaf"));
        }

        Ok(rlp.at(1).map_err(rlp_error)?.data().map_err(rlp_error)?.to_vec())
    }

    /// Balance decoded from the terminal value of the proof.
    pub fn terminal_balance(&self) -> Result<EvmU256, ChannelError> {
        let value = self.terminal_value()?;
        Rlp::new(&value).val_at::<EvmU256>(1).map_err(rlp_error)
    }

    /// Verifies the proof against a state root.
    ///
    /// # Arguments
    ///
    /// * `state_root` - State root of the block the proof was taken at.
    ///
    /// # Returns
    ///
    /// An error unless the proof leads to a leaf holding exactly the account
    /// carried by the proof.
    pub fn verify(&self, state_root: &HashValue) -> Result<(), ChannelError> {
        let key = keccak256(self.address.as_bytes());
        let value = verify_trie_path(&self.proof, state_root, key.hash())?;

        if value != self.encoded_account() {
            return Err(invalid("account leaf does not match the proven account"));
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    pub(crate) fn account_proof(address: Address, balance: u64) -> AccountProof {
        AccountProof {
            address,
            nonce: U64::from(1),
            balance: EvmU256::from(balance),
            storage_hash: H256::repeat_byte(0x56),
            code_hash: H256::repeat_byte(0xc5),
            proof: vec![],
        }
    }

    fn leaf_node(path: Vec<u8>, value: Vec<u8>) -> Bytes {
        let mut stream = RlpStream::new_list(2);
        stream.append(&path);
        stream.append(&value);
        Bytes::from(stream.out().to_vec())
    }

    /// Builds a trie holding only the account and returns its root.
    pub(crate) fn single_leaf_trie(account: &mut AccountProof) -> HashValue {
        let key = keccak256(account.address.as_bytes());
        let mut path = vec![0x20];
        path.extend_from_slice(key.as_ref());

        let leaf = leaf_node(path, account.encoded_account());
        let root = keccak256(&leaf);
        account.proof = vec![leaf];

        root
    }

    /// Builds a trie with a branch at the root and the account one level down.
    fn branch_trie(account: &mut AccountProof) -> HashValue {
        let key = to_nibbles(keccak256(account.address.as_bytes()).as_ref());

        let mut path = vec![0x30 | key[1]];
        path.extend(key[2..].chunks(2).map(|pair| (pair[0] << 4) | pair[1]));
        let leaf = leaf_node(path, account.encoded_account());
        let leaf_hash = keccak256(&leaf);

        let mut stream = RlpStream::new_list(BRANCH_NODE_ITEMS);
        for nibble in 0..16u8 {
            if nibble == key[0] {
                stream.append(&H256(*leaf_hash.hash()));
            } else if nibble == (key[0] + 1) % 16 {
                stream.append(&H256::repeat_byte(0xab));
            } else {
                stream.append_empty_data();
            }
        }
        stream.append_empty_data();
        let branch = Bytes::from(stream.out().to_vec());
        let root = keccak256(&branch);
        account.proof = vec![branch, leaf];

        root
    }

    #[test]
    fn test_single_leaf_trie() {
        let mut account = account_proof(Address::repeat_byte(0x42), 1_000);
        let root = single_leaf_trie(&mut account);

        assert!(account.verify(&root).is_ok());
        assert_eq!(account.terminal_balance().unwrap(), EvmU256::from(1_000u64));
        assert!(account.verify(&HashValue::default()).is_err());
    }

    #[test]
    fn test_branch_trie() {
        let mut account = account_proof(Address::repeat_byte(0x42), 5);
        let root = branch_trie(&mut account);

        assert!(account.verify(&root).is_ok());
        assert_eq!(account.terminal_balance().unwrap(), EvmU256::from(5u64));
    }

    #[test]
    fn test_tampered_account() {
        let mut account = account_proof(Address::repeat_byte(0x42), 5);
        let root = branch_trie(&mut account);

        let mut richer = account.clone();
        richer.balance = EvmU256::from(6u64);
        assert!(richer.verify(&root).is_err());

        let mut other = account.clone();
        other.address = Address::repeat_byte(0x43);
        assert!(other.verify(&root).is_err());

        let mut truncated = account;
        truncated.proof.pop();
        assert!(truncated.verify(&root).is_err());
        assert!(truncated.terminal_value().is_err());
    }

    #[test]
    fn test_from_eip1186_response() {
        let json = serde_json::json!({
            "address": "0x4242424242424242424242424242424242424242",
            "balance": "0x3e8",
            "codeHash": format!("0x{}", "c5".repeat(32)),
            "nonce": "0x1",
            "storageHash": format!("0x{}", "56".repeat(32)),
            "accountProof": ["0xc0"],
            "storageProof": []
        });
        let response: EIP1186ProofResponse = serde_json::from_value(json).unwrap();
        let account = AccountProof::try_from(response).unwrap();

        let mut expected = account_proof(Address::repeat_byte(0x42), 1_000);
        expected.proof = vec![Bytes::from(vec![0xc0])];
        assert_eq!(account, expected);
    }
}
