// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use ethers_core::types::{Address, U256};
use log::info;
use std::path::PathBuf;
use std::str::FromStr;
use xchan_lc::client::Client;
use xchan_lc::config::ClientConfig;
use xchan_lc::proofs::redeem::create_redeem_proof;
use xchan_lc::provider::BlockTag;
use xchan_lc_core::channel::xchan::XChan;
use xchan_lc_core::types::ChainId;

/// The CLI for the light client. Builds the redemption proof of a channel and
/// prints its hex encoded CBOR representation.
#[derive(Parser)]
struct Cli {
    /// Path to a JSON configuration file. Takes precedence over the network
    /// flags below.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// The address of the Chainweb node API, up to and including `/chainweb`.
    #[arg(short = 'n', long, required_unless_present = "config")]
    chainweb_node_address: Option<String>,

    /// The name of the Chainweb network.
    #[arg(long, default_value = "evm-testnet")]
    chainweb_version: String,

    /// The number of chains of the network.
    #[arg(long, default_value_t = 20)]
    chains: usize,

    /// EVM JSON-RPC endpoint of a chain, as `<chain>=<address>`.
    #[arg(short, long = "rpc", value_parser = parse_endpoint)]
    rpc_endpoints: Vec<(ChainId, String)>,

    /// Reject headers whose hash does not match the recomputed one.
    #[arg(long)]
    strict: bool,

    /// The chain the channel is funded on.
    #[arg(short, long)]
    source_chain: ChainId,

    /// The chain the channel is redeemed on.
    #[arg(short, long)]
    target_chain: ChainId,

    /// The accounts authorized by the channel, in commitment order.
    #[arg(short, long = "account", value_parser = parse_address, required = true)]
    accounts: Vec<Address>,

    /// The nonce of the channel, in decimal.
    #[arg(long, default_value = "0", value_parser = parse_nonce)]
    nonce: U256,

    /// The account redeeming the channel. Defaults to the first authorized account.
    #[arg(long, value_parser = parse_address)]
    redeemer: Option<Address>,

    /// Height of the target block. Defaults to the latest one.
    #[arg(long)]
    height: Option<u64>,
}

fn parse_endpoint(input: &str) -> Result<(ChainId, String)> {
    let (chain, address) = input
        .split_once('=')
        .ok_or_else(|| anyhow!("expected <chain>=<address>, got {input}"))?;

    Ok((chain.parse()?, address.to_string()))
}

fn parse_address(input: &str) -> Result<Address> {
    Address::from_str(input).map_err(|err| anyhow!("invalid address {input}: {err}"))
}

fn parse_nonce(input: &str) -> Result<U256> {
    U256::from_dec_str(input).map_err(|err| anyhow!("invalid nonce {input}: {err}"))
}

impl Cli {
    fn client_config(&self) -> Result<ClientConfig> {
        if let Some(path) = &self.config {
            return Ok(ClientConfig::from_file(path)?);
        }

        let address = self
            .chainweb_node_address
            .as_deref()
            .context("missing Chainweb node address")?;
        let config = self.rpc_endpoints.iter().fold(
            ClientConfig::new(address, &self.chainweb_version, self.chains),
            |config, (chain, endpoint)| config.with_rpc_endpoint(*chain, endpoint),
        );

        Ok(config.with_strict(self.strict))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger.
    env_logger::init();

    let config = cli.client_config()?;
    let graph = config.graph()?;
    let client = Client::new(&config);
    client.test_endpoints().await?;

    let xchan = XChan::new(cli.target_chain, cli.accounts.clone(), cli.source_chain, cli.nonce)?;
    info!("Channel identifier: {}", xchan.identifier()?);
    info!("Channel address: {:#x}", xchan.address()?);

    let redeemer = cli.redeemer.unwrap_or(cli.accounts[0]);
    let output = create_redeem_proof(
        &client,
        &graph,
        &xchan,
        &redeemer,
        BlockTag::from(cli.height),
        config.hash_check(),
    )
    .await?;

    info!(
        "Proof rooted at block {} of chain {}",
        output.trusted_root(),
        cli.target_chain
    );
    println!("{}", hex::encode(output.proof().to_cbor()?));

    Ok(())
}
