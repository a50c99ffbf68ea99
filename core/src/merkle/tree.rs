// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Binary Merkle tree
//!
//! A keccak256 binary Merkle tree over pre-hashed leaves. Leaf sequences are
//! padded with [`EMPTY_LEAF_HASH`] up to the next power of two.
//!
//! A [`CompactProof`] proves any subset of the leaves at once. It carries the
//! included leaves along with the roots of the maximal subtrees containing no
//! included leaf, in the order a left to right fold of the tree consumes them.

use crate::crypto::hash::keccak::{hash_node, EMPTY_LEAF_HASH};
use crate::crypto::hash::HashValue;
use crate::merkle::error::MerkleError;
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};

/// A leaf revealed by a [`CompactProof`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, CopyGetters, Serialize, Deserialize)]
pub struct ProofLeaf {
    #[getset(get_copy = "pub")]
    position: u64,
    #[getset(get = "pub")]
    hash: HashValue,
}

impl ProofLeaf {
    pub const fn new(position: u64, hash: HashValue) -> Self {
        Self { position, hash }
    }
}

/// Multi-leaf inclusion proof for the binary Merkle tree.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters, Serialize, Deserialize)]
pub struct CompactProof {
    /// Number of leaves of the tree, before padding.
    #[getset(get_copy = "pub")]
    size: u64,
    /// Included leaves, sorted by position.
    #[getset(get = "pub")]
    leaves: Vec<ProofLeaf>,
    /// Roots of the subtrees without included leaves.
    #[getset(get = "pub")]
    roots: Vec<HashValue>,
}

/// Subtree on the folding stack.
#[derive(Debug, Clone, Copy)]
struct Subtree {
    height: u32,
    hash: HashValue,
    included: bool,
}

impl Subtree {
    const fn leaf(hash: HashValue, included: bool) -> Self {
        Self {
            height: 0,
            hash,
            included,
        }
    }
}

/// Merges the two topmost subtrees while they have the same height, recording
/// the root of the excluded side whenever an included subtree meets an excluded one.
fn merge_stack(stack: &mut Vec<Subtree>, roots: &mut Vec<HashValue>) {
    while stack.len() >= 2 && stack[stack.len() - 1].height == stack[stack.len() - 2].height {
        let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
            return;
        };

        if left.included != right.included {
            roots.push(if left.included { right.hash } else { left.hash });
        }

        stack.push(Subtree {
            height: left.height + 1,
            hash: hash_node(&left.hash, &right.hash),
            included: left.included || right.included,
        });
    }
}

fn fold(leaves: impl Iterator<Item = Subtree>) -> Result<(HashValue, Vec<HashValue>), MerkleError> {
    let mut stack = Vec::with_capacity(64);
    let mut roots = Vec::new();

    for leaf in leaves {
        stack.push(leaf);
        merge_stack(&mut stack, &mut roots);
    }

    match stack.as_slice() {
        [root] => Ok((root.hash, roots)),
        _ => Err(MerkleError::MalformedTree {
            reason: format!("fold ended with {} subtrees", stack.len()),
        }),
    }
}

fn padded_width(size: usize) -> Result<usize, MerkleError> {
    if size == 0 {
        return Err(MerkleError::MalformedTree {
            reason: "a tree needs at least one leaf".into(),
        });
    }

    size.checked_next_power_of_two()
        .ok_or(MerkleError::MalformedTree {
            reason: format!("{size} leaves cannot be padded"),
        })
}

/// Computes the root of the tree over the given leaf hashes.
///
/// # Arguments
///
/// * `leaves` - The leaf hashes, in order.
///
/// # Returns
///
/// The root of the padded tree.
pub fn root(leaves: &[HashValue]) -> Result<HashValue, MerkleError> {
    let width = padded_width(leaves.len())?;
    let padded = leaves
        .iter()
        .copied()
        .chain(std::iter::repeat(EMPTY_LEAF_HASH))
        .take(width)
        .map(|hash| Subtree::leaf(hash, false));

    Ok(fold(padded)?.0)
}

/// Builds a compact proof for the leaves flagged as included.
///
/// # Arguments
///
/// * `leaves` - The leaf hashes along with whether they are revealed by the proof.
///
/// # Returns
///
/// The root of the tree and the proof.
pub fn build_proof(leaves: &[(HashValue, bool)]) -> Result<(HashValue, CompactProof), MerkleError> {
    let width = padded_width(leaves.len())?;
    if !leaves.iter().any(|(_, included)| *included) {
        return Err(MerkleError::MalformedTree {
            reason: "a proof needs at least one included leaf".into(),
        });
    }

    let padded = leaves
        .iter()
        .copied()
        .chain(std::iter::repeat((EMPTY_LEAF_HASH, false)))
        .take(width)
        .map(|(hash, included)| Subtree::leaf(hash, included));
    let (root, roots) = fold(padded)?;

    let proof_leaves = leaves
        .iter()
        .enumerate()
        .filter(|(_, (_, included))| *included)
        .map(|(position, (hash, _))| ProofLeaf::new(position as u64, *hash))
        .collect();

    Ok((
        root,
        CompactProof {
            size: leaves.len() as u64,
            leaves: proof_leaves,
            roots,
        },
    ))
}

/// Runs a compact proof, see [`CompactProof::run`].
pub fn run_proof(proof: &CompactProof) -> Result<HashValue, MerkleError> {
    proof.run()
}

impl CompactProof {
    /// Creates a proof from its parts, as received from a remote party.
    pub fn new(size: u64, leaves: Vec<ProofLeaf>, roots: Vec<HashValue>) -> Self {
        Self {
            size,
            leaves,
            roots,
        }
    }

    /// Recomputes the root of the tree from the included leaves and the roots
    /// of the excluded subtrees.
    ///
    /// # Returns
    ///
    /// The root of the tree.
    ///
    /// # Notes
    ///
    /// Fails with [`MerkleError::InsufficientRoots`] if the proof runs out of
    /// roots and with [`MerkleError::LeftoverRoots`] if some are not consumed.
    pub fn run(&self) -> Result<HashValue, MerkleError> {
        let size = usize::try_from(self.size).map_err(|_| MerkleError::MalformedTree {
            reason: format!("tree size {} does not fit in memory", self.size),
        })?;
        let width = padded_width(size)? as u64;
        if self.leaves.is_empty() {
            return Err(MerkleError::MalformedTree {
                reason: "a proof needs at least one included leaf".into(),
            });
        }

        let mut roots = self.roots.iter().copied();
        let mut stack: Vec<(u32, Option<HashValue>)> = Vec::with_capacity(64);
        let mut next = 0u64;

        for leaf in &self.leaves {
            if leaf.position < next || leaf.position >= self.size {
                return Err(MerkleError::PositionOutOfBounds {
                    position: leaf.position,
                    size: self.size,
                });
            }

            push_gap(&mut stack, &mut roots, next, leaf.position)?;
            stack.push((0, Some(leaf.hash)));
            merge_known(&mut stack, &mut roots)?;
            next = leaf.position + 1;
        }
        push_gap(&mut stack, &mut roots, next, width)?;

        let leftover = roots.count();
        if leftover > 0 {
            return Err(MerkleError::LeftoverRoots { count: leftover });
        }

        match stack.as_slice() {
            [(_, Some(root))] => Ok(*root),
            _ => Err(MerkleError::MalformedTree {
                reason: "proof did not fold into a single root".into(),
            }),
        }
    }
}

/// Pushes the maximal aligned excluded subtrees covering leaves `from..to`.
fn push_gap(
    stack: &mut Vec<(u32, Option<HashValue>)>,
    roots: &mut impl Iterator<Item = HashValue>,
    mut from: u64,
    to: u64,
) -> Result<(), MerkleError> {
    while from < to {
        let span = 63 - (to - from).leading_zeros();
        let height = from.trailing_zeros().min(span);
        stack.push((height, None));
        merge_known(stack, roots)?;
        from += 1u64 << height;
    }

    Ok(())
}

/// Merges equal-height subtrees, pulling the hash of an excluded subtree from
/// the roots when it meets an included one.
fn merge_known(
    stack: &mut Vec<(u32, Option<HashValue>)>,
    roots: &mut impl Iterator<Item = HashValue>,
) -> Result<(), MerkleError> {
    while stack.len() >= 2 && stack[stack.len() - 1].0 == stack[stack.len() - 2].0 {
        let (Some((height, right)), Some((_, left))) = (stack.pop(), stack.pop()) else {
            break;
        };

        let hash = match (left, right) {
            (None, None) => None,
            (Some(left), Some(right)) => Some(hash_node(&left, &right)),
            (Some(left), None) => {
                let right = roots.next().ok_or(MerkleError::InsufficientRoots)?;
                Some(hash_node(&left, &right))
            }
            (None, Some(right)) => {
                let left = roots.next().ok_or(MerkleError::InsufficientRoots)?;
                Some(hash_node(&left, &right))
            }
        };

        stack.push((height + 1, hash));
    }

    Ok(())
}
