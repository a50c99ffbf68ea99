// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Merkle Log
//!
//! Chainweb Merkle Log trees are built by folding tagged leaves from left to
//! right: every time a complete power-of-two subtree is available it is merged,
//! and once all leaves have been pushed the remaining subtrees are merged from
//! the right. The resulting shape for `n` leaves is the one described on
//! [the `chainweb-node` wiki](https://github.com/kadena-io/chainweb-node/wiki/Chainweb-Merkle-Tree#merke-log-trees).
//!
//! A [`MerkleLogProof`] proves that a single tagged value is part of a tree.
//! Proofs can be appended to each other when the root of the first one is a
//! leaf of the second one, which is how a field of an EVM header is proven
//! against a Chainweb block hash.

use crate::crypto::hash::sha512::hash_inner;
use crate::crypto::hash::HashValue;
use crate::crypto::{U256, U256_BYTES_LENGTH};
use crate::merkle::error::MerkleError;
use crate::merkle::{leaf_hash, MerkleLogEntry, MerkleTag};
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};

/// Maximum number of nodes a proof can carry, bounded by the width of its trace.
pub const MAX_PROOF_NODES: usize = U256_BYTES_LENGTH * 8;

/// Computes the root of the Merkle Log tree over the given entries.
///
/// # Arguments
///
/// * `entries` - The tagged values, in leaf order.
///
/// # Returns
///
/// The root of the tree.
pub fn merkle_log_root(entries: &[MerkleLogEntry]) -> Result<HashValue, MerkleError> {
    let leaves = entries
        .iter()
        .map(MerkleLogEntry::leaf_hash)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(fold(&leaves, None)?.root)
}

/// Result of folding a list of leaves.
struct Fold {
    root: HashValue,
    trace: U256,
    nodes: Vec<HashValue>,
}

/// Folds leaf hashes into a Merkle Log root. When `target` is set, the sibling
/// nodes on the path of that leaf are collected along with the trace, bit `i`
/// of the trace being set when the `i`-th node is a left sibling.
fn fold(leaves: &[HashValue], target: Option<usize>) -> Result<Fold, MerkleError> {
    if leaves.is_empty() {
        return Err(MerkleError::MalformedTree {
            reason: "a Merkle Log tree needs at least one leaf".into(),
        });
    }

    let mut stack: Vec<(HashValue, bool)> = Vec::with_capacity(64);
    let mut trace = U256::zero();
    let mut nodes = Vec::new();

    let mut merge = |stack: &mut Vec<(HashValue, bool)>| -> Result<(), MerkleError> {
        let (right, right_marked) = stack.pop().ok_or(MerkleError::InsufficientRoots)?;
        let (left, left_marked) = stack.pop().ok_or(MerkleError::InsufficientRoots)?;

        if left_marked {
            nodes.push(right);
        } else if right_marked {
            trace = trace | (U256::one() << nodes.len());
            nodes.push(left);
        }

        stack.push((
            hash_inner(left.as_ref(), right.as_ref()),
            left_marked || right_marked,
        ));
        Ok(())
    };

    for (i, leaf) in leaves.iter().enumerate() {
        stack.push((*leaf, target == Some(i)));

        if i + 1 == leaves.len() {
            close_unbalanced(&mut stack, &mut merge)?;
        } else {
            let mut count = i + 1;
            while count & 1 == 0 {
                merge(&mut stack)?;
                count >>= 1;
            }
        }
    }

    let (root, _) = stack.pop().ok_or(MerkleError::InsufficientRoots)?;

    Ok(Fold { root, trace, nodes })
}

/// Completes an unbalanced tree once its last leaf has been pushed, merging
/// the pending subtrees from the right until a single root is left.
fn close_unbalanced<F>(stack: &mut Vec<(HashValue, bool)>, merge: &mut F) -> Result<(), MerkleError>
where
    F: FnMut(&mut Vec<(HashValue, bool)>) -> Result<(), MerkleError>,
{
    while stack.len() > 1 {
        merge(stack)?;
    }

    Ok(())
}

mod trace_bytes {
    use crate::crypto::{U256, U256_BYTES_LENGTH};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(trace: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        let mut bytes = [0u8; U256_BYTES_LENGTH];
        trace.to_big_endian(&mut bytes);
        bytes.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let bytes = <[u8; U256_BYTES_LENGTH]>::deserialize(deserializer)?;
        Ok(U256::from_big_endian(&bytes))
    }
}

/// Proof that a tagged value is a leaf of a Merkle Log tree.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters, Serialize, Deserialize)]
pub struct MerkleLogProof {
    /// Tag of the proven value.
    #[getset(get_copy = "pub")]
    tag: MerkleTag,
    /// The proven value, as passed to [`crate::merkle::encode`].
    #[getset(get = "pub")]
    value: Vec<u8>,
    /// Position of the proven leaf in the first tree of the proof.
    #[getset(get_copy = "pub")]
    position: u64,
    /// Bit `i` is set when `nodes[i]` is the left sibling at step `i`.
    #[getset(get_copy = "pub")]
    #[serde(with = "trace_bytes")]
    trace: U256,
    /// Sibling hashes, from the leaf up to the root.
    #[getset(get = "pub")]
    nodes: Vec<HashValue>,
    /// Tag of the value committed to by the root of the proof.
    #[getset(get_copy = "pub")]
    root_tag: MerkleTag,
}

impl MerkleLogProof {
    /// Creates a proof for the entry at the given position.
    ///
    /// # Arguments
    ///
    /// * `entries` - All entries of the tree, in leaf order.
    /// * `position` - Position of the entry to prove.
    /// * `root_tag` - Tag under which the root of the tree is committed in an
    ///     enclosing tree.
    ///
    /// # Returns
    ///
    /// The proof for the entry.
    pub fn create(
        entries: &[MerkleLogEntry],
        position: usize,
        root_tag: MerkleTag,
    ) -> Result<Self, MerkleError> {
        let entry = entries
            .get(position)
            .ok_or(MerkleError::PositionOutOfBounds {
                position: position as u64,
                size: entries.len() as u64,
            })?;
        let leaves = entries
            .iter()
            .map(MerkleLogEntry::leaf_hash)
            .collect::<Result<Vec<_>, _>>()?;

        let Fold { trace, nodes, .. } = fold(&leaves, Some(position))?;

        Ok(Self {
            tag: entry.tag,
            value: entry.value.clone(),
            position: position as u64,
            trace,
            nodes,
            root_tag,
        })
    }

    /// Runs the proof, recomputing the root of the tree from the proven value.
    ///
    /// # Returns
    ///
    /// The root of the tree.
    pub fn run(&self) -> Result<HashValue, MerkleError> {
        if self.nodes.len() > MAX_PROOF_NODES {
            return Err(MerkleError::TraceOverflow {
                nodes: self.nodes.len(),
                maximum: MAX_PROOF_NODES,
            });
        }

        let mut current = leaf_hash(self.tag, &self.value)?;

        for (i, node) in self.nodes.iter().enumerate() {
            current = if self.trace.bit(i) {
                hash_inner(node.as_ref(), current.as_ref())
            } else {
                hash_inner(current.as_ref(), node.as_ref())
            };
        }

        Ok(current)
    }

    /// Appends `other` to this proof without checking the combined proof
    /// reaches the same root as `other`.
    ///
    /// The combined proof keeps the tag, value and position of `self` and
    /// the root tag of `other`. Its nodes are the nodes of `self` followed by
    /// the nodes of `other`.
    pub fn append_unchecked(&self, other: &Self) -> Result<Self, MerkleError> {
        if self.root_tag != other.tag {
            return Err(MerkleError::TagMismatch {
                expected: other.tag.code(),
                actual: self.root_tag.code(),
            });
        }

        let shift = self.nodes.len();
        let total = shift + other.nodes.len();
        if total > MAX_PROOF_NODES {
            return Err(MerkleError::TraceOverflow {
                nodes: total,
                maximum: MAX_PROOF_NODES,
            });
        }

        let trace = if other.trace.is_zero() {
            self.trace
        } else {
            self.trace | (other.trace << shift)
        };
        let nodes = self
            .nodes
            .iter()
            .chain(other.nodes.iter())
            .copied()
            .collect();

        Ok(Self {
            tag: self.tag,
            value: self.value.clone(),
            position: self.position,
            trace,
            nodes,
            root_tag: other.root_tag,
        })
    }

    /// Appends `other` to this proof, where the root of `self` is the value
    /// proven by `other`.
    ///
    /// # Arguments
    ///
    /// * `other` - The proof for the tree committing to the root of `self`.
    ///
    /// # Returns
    ///
    /// A proof of the value of `self` against the root of `other`.
    ///
    /// # Notes
    ///
    /// The tag check happens before any hashing. The combined proof must then
    /// run to the same root as `other`, which fails when the root of `self` is
    /// not the value proven by `other`.
    pub fn append(&self, other: &Self) -> Result<Self, MerkleError> {
        let combined = self.append_unchecked(other)?;

        let expected = other.run()?;
        let actual = combined.run()?;
        if expected != actual {
            return Err(MerkleError::ProofMismatch { expected, actual });
        }

        Ok(combined)
    }

    /// Concatenates a list of proofs, from the innermost tree to the outermost.
    /// Intermediate appends are unchecked, the last one is checked.
    pub fn concat(proofs: &[Self]) -> Result<Self, MerkleError> {
        let (last, init) = proofs.split_last().ok_or(MerkleError::MalformedTree {
            reason: "cannot concatenate an empty list of proofs".into(),
        })?;

        let Some((first, middle)) = init.split_first() else {
            return Ok(last.clone());
        };

        middle
            .iter()
            .try_fold(first.clone(), |acc, proof| acc.append_unchecked(proof))?
            .append(last)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::hash::sha512::hash_tagged_data;
    use test_strategy::proptest;

    fn entries(count: usize) -> Vec<MerkleLogEntry> {
        (0..count)
            .map(|i| MerkleLogEntry::new(MerkleTag::BlockHeight, (i as u64).to_le_bytes()))
            .collect()
    }

    fn leaves(entries: &[MerkleLogEntry]) -> Vec<HashValue> {
        entries.iter().map(|e| e.leaf_hash().unwrap()).collect()
    }

    fn inner(left: &HashValue, right: &HashValue) -> HashValue {
        hash_inner(left.as_ref(), right.as_ref())
    }

    #[test]
    fn test_unbalanced_shapes() {
        let e = entries(9);
        let l = leaves(&e);

        assert_eq!(merkle_log_root(&e[..1]).unwrap(), l[0]);
        assert_eq!(merkle_log_root(&e[..2]).unwrap(), inner(&l[0], &l[1]));
        assert_eq!(
            merkle_log_root(&e[..3]).unwrap(),
            inner(&inner(&l[0], &l[1]), &l[2])
        );

        let four = inner(&inner(&l[0], &l[1]), &inner(&l[2], &l[3]));
        assert_eq!(merkle_log_root(&e[..5]).unwrap(), inner(&four, &l[4]));

        let eight = inner(
            &four,
            &inner(&inner(&l[4], &l[5]), &inner(&l[6], &l[7])),
        );
        assert_eq!(merkle_log_root(&e[..9]).unwrap(), inner(&eight, &l[8]));
    }

    #[test]
    fn test_empty_tree_is_malformed() {
        assert!(matches!(
            merkle_log_root(&[]),
            Err(MerkleError::MalformedTree { .. })
        ));
        assert!(matches!(
            MerkleLogProof::create(&[], 0, MerkleTag::BlockHash),
            Err(MerkleError::PositionOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_all_positions_run_to_root() {
        for count in 1..=33 {
            let e = entries(count);
            let root = merkle_log_root(&e).unwrap();
            for position in 0..count {
                let proof = MerkleLogProof::create(&e, position, MerkleTag::BlockHash).unwrap();
                assert_eq!(proof.run().unwrap(), root, "{count} leaves, position {position}");
            }
        }
    }

    #[test]
    fn test_single_leaf_proof_is_empty() {
        let e = entries(1);
        let proof = MerkleLogProof::create(&e, 0, MerkleTag::BlockHash).unwrap();
        assert!(proof.nodes().is_empty());
        assert!(proof.trace().is_zero());
        assert_eq!(
            proof.run().unwrap(),
            hash_tagged_data(MerkleTag::BlockHeight.code(), &0u64.to_le_bytes())
        );
    }

    #[test]
    fn test_tampered_value_changes_root() {
        let e = entries(7);
        let root = merkle_log_root(&e).unwrap();
        let mut proof = MerkleLogProof::create(&e, 3, MerkleTag::BlockHash).unwrap();
        proof.value = 42u64.to_le_bytes().to_vec();
        assert_ne!(proof.run().unwrap(), root);
    }

    fn tree_of_roots(inner_root: HashValue, others: usize) -> Vec<MerkleLogEntry> {
        let mut outer = entries(others);
        outer.insert(others / 2, MerkleLogEntry::new(MerkleTag::BlockPayloadHash, inner_root.to_vec()));
        outer
    }

    #[test]
    fn test_append_proofs() {
        let inner_entries = entries(5);
        let inner_root = merkle_log_root(&inner_entries).unwrap();
        let inner_proof =
            MerkleLogProof::create(&inner_entries, 4, MerkleTag::BlockPayloadHash).unwrap();

        let outer_entries = tree_of_roots(inner_root, 6);
        let outer_root = merkle_log_root(&outer_entries).unwrap();
        let outer_proof = MerkleLogProof::create(&outer_entries, 3, MerkleTag::BlockHash).unwrap();

        let combined = inner_proof.append(&outer_proof).unwrap();
        assert_eq!(combined.run().unwrap(), outer_root);
        assert_eq!(combined.tag(), MerkleTag::BlockHeight);
        assert_eq!(combined.position(), 4);
        assert_eq!(combined.root_tag(), MerkleTag::BlockHash);
        assert_eq!(
            combined.nodes().len(),
            inner_proof.nodes().len() + outer_proof.nodes().len()
        );

        let concatenated = MerkleLogProof::concat(&[inner_proof, outer_proof]).unwrap();
        assert_eq!(concatenated, combined);
    }

    #[test]
    fn test_append_tag_mismatch() {
        let e = entries(4);
        let proof = MerkleLogProof::create(&e, 1, MerkleTag::BlockHash).unwrap();
        let other = MerkleLogProof::create(&e, 2, MerkleTag::BlockHash).unwrap();

        assert!(matches!(
            proof.append(&other),
            Err(MerkleError::TagMismatch {
                expected: 0x0003,
                actual: 0x0010
            })
        ));
    }

    #[test]
    fn test_append_unrelated_proofs_mismatch() {
        let inner_entries = entries(3);
        let inner_proof =
            MerkleLogProof::create(&inner_entries, 0, MerkleTag::BlockPayloadHash).unwrap();

        let outer_entries = tree_of_roots(HashValue::new([1; 32]), 4);
        let outer_proof = MerkleLogProof::create(&outer_entries, 2, MerkleTag::BlockHash).unwrap();

        assert!(matches!(
            inner_proof.append(&outer_proof),
            Err(MerkleError::ProofMismatch { .. })
        ));
        // Unchecked appends do not hash anything.
        assert!(inner_proof.append_unchecked(&outer_proof).is_ok());
    }

    #[test]
    fn test_concat_three_levels() {
        let first_entries = entries(3);
        let first_root = merkle_log_root(&first_entries).unwrap();
        let first = MerkleLogProof::create(&first_entries, 2, MerkleTag::BlockPayloadHash).unwrap();

        let second_entries = tree_of_roots(first_root, 10);
        let second_root = merkle_log_root(&second_entries).unwrap();
        let second = MerkleLogProof::create(&second_entries, 5, MerkleTag::BlockHash).unwrap();

        let mut third_entries = entries(2);
        third_entries.push(MerkleLogEntry::new(MerkleTag::BlockHash, second_root.to_vec()));
        let third_root = merkle_log_root(&third_entries).unwrap();
        let third = MerkleLogProof::concat(&[MerkleLogProof::create(
            &third_entries,
            2,
            MerkleTag::BlockHash,
        )
        .unwrap()])
        .unwrap();

        let proof = MerkleLogProof::concat(&[first, second, third]).unwrap();
        assert_eq!(proof.run().unwrap(), third_root);
        assert!(matches!(
            MerkleLogProof::concat(&[]),
            Err(MerkleError::MalformedTree { .. })
        ));
    }

    #[test]
    fn test_trace_overflow() {
        let e = entries(2);
        let mut proof = MerkleLogProof::create(&e, 0, MerkleTag::BlockHeight).unwrap();
        proof.nodes = vec![HashValue::default(); MAX_PROOF_NODES];
        let other = MerkleLogProof::create(&e, 1, MerkleTag::BlockHash).unwrap();

        assert!(matches!(
            proof.append_unchecked(&other),
            Err(MerkleError::TraceOverflow { .. })
        ));
    }

    #[test]
    fn test_decoded_oversized_proof_rejected() {
        let e = entries(1);
        let mut proof = MerkleLogProof::create(&e, 0, MerkleTag::BlockHash).unwrap();
        proof.nodes = vec![HashValue::default(); MAX_PROOF_NODES + 1];

        let mut bytes = Vec::new();
        ciborium::into_writer(&proof, &mut bytes).unwrap();
        let decoded: MerkleLogProof = ciborium::from_reader(bytes.as_slice()).unwrap();

        assert!(matches!(
            decoded.run(),
            Err(MerkleError::TraceOverflow {
                nodes: 257,
                maximum: 256
            })
        ));
    }

    #[test]
    fn test_cbor_round_trip() {
        let e = entries(13);
        let proof = MerkleLogProof::create(&e, 12, MerkleTag::BlockHash).unwrap();

        let mut bytes = Vec::new();
        ciborium::into_writer(&proof, &mut bytes).unwrap();
        let decoded: MerkleLogProof = ciborium::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(decoded, proof);
    }

    #[proptest]
    fn test_proofs_run_to_root(#[strategy(1usize..64)] count: usize, #[strategy(0usize..64)] position: usize) {
        let position = position % count;
        let e = entries(count);
        let proof = MerkleLogProof::create(&e, position, MerkleTag::BlockHash).unwrap();
        proptest::prop_assert_eq!(proof.run().unwrap(), merkle_log_root(&e).unwrap());
    }
}
