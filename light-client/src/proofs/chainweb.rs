// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Chainweb proofs
//!
//! A header of chain `c` at height `h` commits to the headers of the chains
//! adjacent to `c` at height `h - 1`. Following the shortest path from a
//! source chain to a target chain, the block hash of the source header at
//! height `h - n`, where `n` is the number of hops, is thus committed to by
//! the target header at height `h`.

use crate::proofs::ProofError;
use crate::provider::{BlockTag, ChainProvider};
use futures::future::try_join_all;
use getset::Getters;
use log::debug;
use xchan_lc_core::merkle::log::MerkleLogProof;
use xchan_lc_core::types::graph::ChainGraph;
use xchan_lc_core::types::header::ChainwebHeader;
use xchan_lc_core::types::{ChainId, HashCheck};

/// Proof that a source header is committed to by a target header.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct ChainwebProof {
    /// Chains from the source to the target, both included.
    path: Vec<ChainId>,
    /// Proof of the source block hash against the target block hash. `None`
    /// when source and target are the same chain.
    proof: Option<MerkleLogProof>,
    source_header: ChainwebHeader,
    target_header: ChainwebHeader,
}

fn check_header(
    header: &ChainwebHeader,
    chain: ChainId,
    height: u64,
    check: HashCheck,
) -> Result<(), ProofError> {
    if header.decoded_chain() != chain || header.decoded_height() != height {
        return Err(ProofError::UnexpectedHeader {
            expected_chain: chain,
            expected_height: height,
            chain: header.decoded_chain(),
            height: header.decoded_height(),
        });
    }

    header.check_hash(check)?;
    Ok(())
}

/// Builds the proof that the header of `source` at the height reachable
/// from `target` is committed to by the header of `target`.
///
/// # Arguments
///
/// * `provider` - The source of the headers.
/// * `graph` - The chain graph of the network.
/// * `source` - The chain to prove a header of.
/// * `target` - The chain holding the trusted header.
/// * `tag` - The height of the target header.
/// * `check` - What to do with headers whose hash does not match.
///
/// # Returns
///
/// The proof along with the source and target headers.
///
/// # Notes
///
/// All headers besides the target one are fetched concurrently. Any failure
/// aborts the construction.
pub async fn create_chainweb_proof<P: ChainProvider + ?Sized>(
    provider: &P,
    graph: &ChainGraph,
    source: ChainId,
    target: ChainId,
    tag: BlockTag,
    check: HashCheck,
) -> Result<ChainwebProof, ProofError> {
    let path = graph.shortest_path(source, target)?;
    let hops = path.len() - 1;
    debug!("Path from chain {source} to chain {target}: {path:?}");

    let target_header = provider.get_chainweb_header(target, tag).await?;
    let target_height = match tag {
        BlockTag::Height(height) => height,
        BlockTag::Latest => target_header.decoded_height(),
    };
    check_header(&target_header, target, target_height, check)?;

    if hops == 0 {
        return Ok(ChainwebProof {
            path,
            proof: None,
            source_header: target_header.clone(),
            target_header,
        });
    }

    let source_height = target_height
        .checked_sub(hops as u64)
        .ok_or(ProofError::HeightTooLow {
            height: target_height,
            hops,
        })?;

    // Headers of the path, target excluded, at increasing heights.
    let hop_heights = (source_height..target_height).collect::<Vec<_>>();
    let mut headers = try_join_all(
        path[..hops]
            .iter()
            .zip(&hop_heights)
            .map(|(chain, height)| provider.get_chainweb_header(*chain, BlockTag::Height(*height))),
    )
    .await?;
    for ((header, chain), height) in headers.iter().zip(&path).zip(&hop_heights) {
        check_header(header, *chain, *height, check)?;
    }

    let linked = headers
        .iter()
        .chain(std::iter::once(&target_header))
        .collect::<Vec<_>>();
    let mut proofs = Vec::with_capacity(hops);
    for (i, pair) in linked.windows(2).enumerate() {
        let (inner, outer) = (pair[0], pair[1]);
        debug!(
            "Linking chain {} at height {} to chain {} at height {}",
            path[i],
            inner.decoded_height(),
            path[i + 1],
            outer.decoded_height()
        );

        let proof = outer.adjacent_parents_proof(path[i])?;
        if proof.value().as_slice() != inner.block_hash().as_ref() {
            return Err(ProofError::BrokenLink {
                chain: path[i + 1],
                adjacent: path[i],
            });
        }
        proofs.push(proof);
    }
    let proof = MerkleLogProof::concat(&proofs)?;

    // `hops` is at least one, so is the number of fetched headers.
    let source_header = headers.swap_remove(0);

    Ok(ChainwebProof {
        path,
        proof: Some(proof),
        source_header,
        target_header,
    })
}
