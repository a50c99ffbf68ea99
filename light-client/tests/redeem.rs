// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use ethers_core::types::{
    Address, Bloom, Bytes, EIP1186ProofResponse, H256, H64, U256 as EvmU256, U64,
};
use ethers_core::utils::rlp::RlpStream;
use std::collections::HashMap;
use xchan_lc::client::error::ClientError;
use xchan_lc::proofs::redeem::create_redeem_proof;
use xchan_lc::proofs::ProofError;
use xchan_lc::provider::{BlockTag, ChainProvider};
use xchan_lc_core::channel::account::AccountProof;
use xchan_lc_core::channel::error::ChannelError;
use xchan_lc_core::channel::redeem::RedeemProof;
use xchan_lc_core::channel::xchan::XChan;
use xchan_lc_core::crypto::hash::keccak::keccak256;
use xchan_lc_core::crypto::hash::HashValue;
use xchan_lc_core::crypto::U256;
use xchan_lc_core::types::adjacent::AdjacentParent;
use xchan_lc_core::types::error::ValidationError;
use xchan_lc_core::types::graph::ChainGraph;
use xchan_lc_core::types::header::{
    ChainwebHeader, ChainwebHeaderFields, ExecutionHeader, ExecutionHeaderRaw,
};
use xchan_lc_core::types::{ChainId, HashCheck};

const CHAINS: usize = 10;
const LATEST_HEIGHT: u64 = 12;
const FUNDED_CHAIN: ChainId = 1;
const BALANCE: u64 = 5_000_000;

/// In-memory network of ten chains where only [`FUNDED_CHAIN`] runs an EVM.
struct MockProvider {
    headers: HashMap<(ChainId, u64), ChainwebHeader>,
    executions: HashMap<u64, ExecutionHeader>,
    account: AccountProof,
}

fn not_found(what: String) -> ClientError {
    ClientError::Response {
        endpoint: what,
        source: "not found".into(),
    }
}

impl MockProvider {
    /// Builds every header up to [`LATEST_HEIGHT`], the state of the funded
    /// chain holding a single account.
    fn new(funded: Address) -> Self {
        let graph = ChainGraph::builtin(CHAINS).unwrap();
        let (account, state_root) = funded_account(funded);

        let mut headers: HashMap<(ChainId, u64), ChainwebHeader> = HashMap::new();
        let mut executions = HashMap::new();
        for height in 0..=LATEST_HEIGHT {
            let execution =
                ExecutionHeader::new(execution_header(height, state_root), HashCheck::Strict)
                    .unwrap();

            for chain in 0..CHAINS as ChainId {
                let previous = |chain: ChainId| {
                    height
                        .checked_sub(1)
                        .map(|parent| headers[&(chain, parent)].block_hash())
                        .unwrap_or_default()
                };
                let adjacents = graph
                    .neighbors(chain)
                    .unwrap()
                    .iter()
                    .map(|adjacent| AdjacentParent::new(*adjacent, previous(*adjacent)))
                    .collect();
                let payload = if chain == FUNDED_CHAIN {
                    execution.payload_hash()
                } else {
                    HashValue::new([chain as u8 + 0x80; 32])
                };

                let header = ChainwebHeader::new(ChainwebHeaderFields {
                    creation_time: 1_700_000_000_000_000 + height * 30_000_000,
                    parent: previous(chain),
                    adjacents,
                    target: U256::MAX,
                    payload,
                    chain,
                    weight: U256::from(height),
                    height,
                    version: 0x10,
                    ..Default::default()
                })
                .unwrap();
                headers.insert((chain, height), header);
            }
            executions.insert(height, execution);
        }

        Self {
            headers,
            executions,
            account,
        }
    }

    const fn height(tag: BlockTag) -> u64 {
        match tag {
            BlockTag::Latest => LATEST_HEIGHT,
            BlockTag::Height(height) => height,
        }
    }

    fn header(&self, chain: ChainId, height: u64) -> &ChainwebHeader {
        &self.headers[&(chain, height)]
    }
}

#[async_trait]
impl ChainProvider for MockProvider {
    async fn get_chainweb_header(
        &self,
        chain: ChainId,
        tag: BlockTag,
    ) -> Result<ChainwebHeader, ClientError> {
        let height = Self::height(tag);
        self.headers
            .get(&(chain, height))
            .cloned()
            .ok_or_else(|| not_found(format!("chain/{chain}/header/{height}")))
    }

    async fn get_execution_header(
        &self,
        chain: ChainId,
        tag: BlockTag,
    ) -> Result<ExecutionHeader, ClientError> {
        let height = Self::height(tag);
        if chain != FUNDED_CHAIN {
            return Err(ClientError::MissingEndpoint { chain });
        }

        self.executions
            .get(&height)
            .cloned()
            .ok_or_else(|| not_found(format!("chain/{chain}/evm/block/{height}")))
    }

    async fn get_account_proof(
        &self,
        chain: ChainId,
        address: Address,
        _tag: BlockTag,
    ) -> Result<AccountProof, ClientError> {
        if chain != FUNDED_CHAIN {
            return Err(ClientError::MissingEndpoint { chain });
        }
        if address != self.account.address() {
            return Err(not_found(format!("chain/{chain}/evm/proof/{address:#x}")));
        }

        Ok(self.account.clone())
    }
}

/// Account holding [`BALANCE`], alone in a state trie. Returns its proof and
/// the state root.
fn funded_account(address: Address) -> (AccountProof, H256) {
    let nonce = U64::from(1);
    let balance = EvmU256::from(BALANCE);
    let storage_hash = H256::repeat_byte(0x56);
    let code_hash = H256::repeat_byte(0xc5);

    let mut account = RlpStream::new_list(4);
    account.append(&nonce);
    account.append(&balance);
    account.append(&storage_hash);
    account.append(&code_hash);
    let account = account.out().to_vec();

    let mut path = vec![0x20];
    path.extend_from_slice(keccak256(address.as_bytes()).as_ref());
    let mut leaf = RlpStream::new_list(2);
    leaf.append(&path);
    leaf.append(&account);
    let leaf = leaf.out().to_vec();
    let state_root = H256(*keccak256(&leaf).hash());

    let proof = AccountProof::try_from(EIP1186ProofResponse {
        address,
        balance,
        code_hash,
        nonce,
        storage_hash,
        account_proof: vec![Bytes::from(leaf)],
        storage_proof: vec![],
    })
    .unwrap();

    (proof, state_root)
}

fn execution_header(height: u64, state_root: H256) -> ExecutionHeaderRaw {
    ExecutionHeaderRaw {
        parent_hash: H256::from_low_u64_be(height),
        ommers_hash: H256::repeat_byte(0x1d),
        beneficiary: Address::zero(),
        state_root,
        transactions_root: H256::repeat_byte(0x56),
        receipts_root: H256::repeat_byte(0x56),
        logs_bloom: Bloom::zero(),
        difficulty: EvmU256::zero(),
        number: U64::from(height),
        gas_limit: U64::from(30_000_000),
        gas_used: U64::zero(),
        timestamp: U64::from(1_700_000_000 + height * 30),
        extra_data: Bytes::default(),
        mix_hash: H256::zero(),
        nonce: H64::zero(),
        base_fee_per_gas: EvmU256::from(7u64),
        withdrawals_root: H256::repeat_byte(0x56),
        blob_gas_used: U64::zero(),
        excess_blob_gas: U64::zero(),
        parent_beacon_block_root: H256::zero(),
        requests_hash: H256::repeat_byte(0xe3),
        hash: None,
    }
}

fn redeemer() -> Address {
    Address::repeat_byte(0x11)
}

fn channel(target_chain: ChainId) -> XChan {
    XChan::new(
        target_chain,
        vec![redeemer(), Address::repeat_byte(0x22)],
        FUNDED_CHAIN,
        EvmU256::from(42u64),
    )
    .unwrap()
}

fn graph() -> ChainGraph {
    ChainGraph::builtin(CHAINS).unwrap().clone()
}

#[tokio::test]
async fn test_redeem_across_chains() {
    let xchan = channel(0);
    let provider = MockProvider::new(xchan.address().unwrap());

    let output = create_redeem_proof(
        &provider,
        &graph(),
        &xchan,
        &redeemer(),
        BlockTag::Height(10),
        HashCheck::Strict,
    )
    .await
    .unwrap();

    // Two hops from chain 1 to chain 0, through chain 3.
    assert_eq!(output.trusted_root(), provider.header(0, 10).block_hash());
    assert_eq!(output.proof().target_height(), 10);
    assert_eq!(output.proof().target_chain(), 0);

    let claim = output.claim();
    assert_eq!(claim.redeemer(), redeemer());
    assert_eq!(claim.channel(), xchan.address().unwrap());
    assert_eq!(claim.target_chain(), 0);
    assert_eq!(claim.balance(), EvmU256::from(BALANCE));

    let bytes = output.proof().to_cbor().unwrap();
    let decoded = RedeemProof::from_cbor(&bytes).unwrap();
    assert_eq!(
        decoded.verify(0, &output.trusted_root()).unwrap(),
        output.claim()
    );

    // Another block of the target chain does not back the proof.
    assert!(matches!(
        decoded.verify(0, &provider.header(0, 11).block_hash()),
        Err(ChannelError::ProofMismatch { .. })
    ));
}

#[tokio::test]
async fn test_redeem_on_source_chain() {
    let xchan = channel(FUNDED_CHAIN);
    let provider = MockProvider::new(xchan.address().unwrap());

    let output = create_redeem_proof(
        &provider,
        &graph(),
        &xchan,
        &redeemer(),
        BlockTag::Height(5),
        HashCheck::Strict,
    )
    .await
    .unwrap();

    assert_eq!(
        output.trusted_root(),
        provider.header(FUNDED_CHAIN, 5).block_hash()
    );
    assert_eq!(output.claim().balance(), EvmU256::from(BALANCE));
}

#[tokio::test]
async fn test_redeem_at_latest_height() {
    let xchan = channel(0);
    let provider = MockProvider::new(xchan.address().unwrap());

    let output = create_redeem_proof(
        &provider,
        &graph(),
        &xchan,
        &Address::repeat_byte(0x22),
        BlockTag::Latest,
        HashCheck::Warn,
    )
    .await
    .unwrap();

    assert_eq!(output.proof().target_height(), LATEST_HEIGHT);
    assert_eq!(
        output.trusted_root(),
        provider.header(0, LATEST_HEIGHT).block_hash()
    );
    assert_eq!(output.claim().redeemer(), Address::repeat_byte(0x22));
}

#[tokio::test]
async fn test_unauthorized_redeemer() {
    let xchan = channel(0);
    let provider = MockProvider::new(xchan.address().unwrap());

    let result = create_redeem_proof(
        &provider,
        &graph(),
        &xchan,
        &Address::repeat_byte(0x33),
        BlockTag::Height(10),
        HashCheck::Strict,
    )
    .await;

    assert!(matches!(
        result,
        Err(ProofError::Channel {
            source: ChannelError::UnknownAccount { .. }
        })
    ));
}

#[tokio::test]
async fn test_unfunded_channel() {
    let xchan = channel(0);
    let provider = MockProvider::new(Address::repeat_byte(0x44));

    let result = create_redeem_proof(
        &provider,
        &graph(),
        &xchan,
        &redeemer(),
        BlockTag::Height(10),
        HashCheck::Strict,
    )
    .await;

    assert!(matches!(result, Err(ProofError::Provider { .. })));
}

#[tokio::test]
async fn test_missing_or_too_low_headers() {
    let xchan = channel(0);
    let provider = MockProvider::new(xchan.address().unwrap());

    let result = create_redeem_proof(
        &provider,
        &graph(),
        &xchan,
        &redeemer(),
        BlockTag::Height(LATEST_HEIGHT + 1),
        HashCheck::Strict,
    )
    .await;
    assert!(matches!(
        result,
        Err(ProofError::Provider {
            source: ClientError::Response { .. }
        })
    ));

    let result = create_redeem_proof(
        &provider,
        &graph(),
        &xchan,
        &redeemer(),
        BlockTag::Height(1),
        HashCheck::Strict,
    )
    .await;
    assert!(matches!(
        result,
        Err(ProofError::HeightTooLow { height: 1, hops: 2 })
    ));
}

#[tokio::test]
async fn test_strict_hash_check() {
    let xchan = channel(0);
    let mut provider = MockProvider::new(xchan.address().unwrap());

    // Same header, claiming another hash.
    let mut bytes = provider.header(0, 10).to_bytes();
    let len = bytes.len();
    bytes[len - 1] ^= 0xff;
    provider
        .headers
        .insert((0, 10), ChainwebHeader::from_bytes(&bytes).unwrap());

    let result = create_redeem_proof(
        &provider,
        &graph(),
        &xchan,
        &redeemer(),
        BlockTag::Height(10),
        HashCheck::Strict,
    )
    .await;

    assert!(matches!(
        result,
        Err(ProofError::Validation {
            source: ValidationError::HashMismatch { .. }
        })
    ));
}
