// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Redemption proofs
//!
//! Builds the [`RedeemProof`] of a channel from the data of a provider. The
//! execution block of the source chain shares its height with the consensus
//! header committing to its payload.

use crate::proofs::chainweb::create_chainweb_proof;
use crate::proofs::ProofError;
use crate::provider::{BlockTag, ChainProvider};
use ethers_core::types::Address;
use getset::{CopyGetters, Getters};
use log::{debug, info};
use xchan_lc_core::channel::redeem::{RedeemClaim, RedeemProof};
use xchan_lc_core::channel::xchan::XChan;
use xchan_lc_core::crypto::hash::HashValue;
use xchan_lc_core::merkle::log::MerkleLogProof;
use xchan_lc_core::types::graph::ChainGraph;
use xchan_lc_core::types::HashCheck;

/// A redemption proof along with the target block it is rooted at.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct RedeemOutput {
    #[getset(get = "pub")]
    proof: RedeemProof,
    /// Hash of the target block, to be trusted by the verifier.
    #[getset(get_copy = "pub")]
    trusted_root: HashValue,
    /// The claim the proof verified to.
    #[getset(get_copy = "pub")]
    claim: RedeemClaim,
}

impl RedeemOutput {
    pub fn into_proof(self) -> RedeemProof {
        self.proof
    }
}

/// Builds the proof that `redeemer` can claim the balance of a channel.
///
/// # Arguments
///
/// * `provider` - The source of the chain data.
/// * `graph` - The chain graph of the network.
/// * `xchan` - The channel to redeem.
/// * `redeemer` - An account authorized by the channel.
/// * `tag` - The height of the target header the proof is rooted at.
/// * `check` - What to do with headers whose hash does not match.
///
/// # Returns
///
/// The proof, verified against the fetched target header.
pub async fn create_redeem_proof<P: ChainProvider + ?Sized>(
    provider: &P,
    graph: &ChainGraph,
    xchan: &XChan,
    redeemer: &Address,
    tag: BlockTag,
    check: HashCheck,
) -> Result<RedeemOutput, ProofError> {
    let xchan_proof = xchan.create_proof(redeemer)?;
    let address = xchan.address()?;
    info!(
        "Redeeming channel {address:#x} from chain {} on chain {}",
        xchan.source_chain(),
        xchan.target_chain()
    );

    let chainweb_proof = create_chainweb_proof(
        provider,
        graph,
        xchan.source_chain(),
        xchan.target_chain(),
        tag,
        check,
    )
    .await?;
    let source_header = chainweb_proof.source_header();
    let source_height = source_header.decoded_height();
    let target_height = chainweb_proof.target_header().decoded_height();
    debug!("Source block at height {source_height}, target block at height {target_height}");

    let source_tag = BlockTag::Height(source_height);
    let (execution_header, account_proof) = tokio::try_join!(
        provider.get_execution_header(xchan.source_chain(), source_tag),
        provider.get_account_proof(xchan.source_chain(), address, source_tag),
    )?;
    execution_header.check_payload_hash(source_header.payload_hash(), check)?;
    account_proof.verify(&execution_header.state_root())?;

    let mut proofs = vec![
        execution_header.state_root_proof()?,
        source_header.payload_hash_proof()?,
    ];
    proofs.extend(chainweb_proof.proof().clone());
    let header_proof = MerkleLogProof::concat(&proofs)?;

    let proof = RedeemProof::new(xchan_proof, account_proof, header_proof, target_height);
    let trusted_root = chainweb_proof.target_header().block_hash();
    let claim = proof.verify(xchan.target_chain(), &trusted_root)?;
    info!(
        "Built redemption proof of {} for {:#x}",
        claim.balance(),
        claim.redeemer()
    );

    Ok(RedeemOutput {
        proof,
        trusted_root,
        claim,
    })
}
