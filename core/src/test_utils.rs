// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! Fixed vectors shared by unit tests.

// Testnet header, chain 0, height 3938653.
//
// export NODE=us1.testnet.chainweb.com
// export CHAINWEB_VERSION=testnet04
// export CHAIN_ID=0
// export BLOCKHEADER_HASH=PjTIbGWK6GnJosMRvBeN2Yoyue9zU2twuWCSYQ1IRRg=
// curl -sk "https://${NODE}/chainweb/0.0/${CHAINWEB_VERSION}/chain/${CHAIN_ID}/header/${BLOCKHEADER_HASH}"
pub const RAW_HEADER: &[u8] = b"AAAAAAAAAAB97UtijQ4GABZadGj_lZHt2_fPGA0latJzV5-A68ZxHHj5vuSqaitWAwAFAAAAuIdT1f1Ljy2RW4pfv_qQZT701v9NiUO78l_ISWa5WE8KAAAAtgbgjwjxNIlyNxzVJFCZj3MSd-cC4tHEwPP4AMkndQYPAAAAQqZj-Xbeb0flE-pPUzZHnKIff0omUW3EHWk1pETh17Dt0Z6VjZnWIy6fsZz20SslSPE0ar6qTbHKG97AigIAAK-C-MGqrNxklX1UaYDYY7Ghvz3XNrv1XdHUyWktBmIpAAAAAFMcLVUmJQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAXRk8AAAAAAAHAAAAC6UQSI0OBgDOgg0AAAAAAD40yGxliuhpyaLDEbwXjdmKMrnvc1NrcLlgkmENSEUY";

pub const RAW_HEADER_HASH_HEX: &str =
    "3e34c86c658ae869c9a2c311bc178dd98a32b9ef73536b70b96092610d484518";

pub const RAW_HEADER_PAYLOAD_HEX: &str =
    "af82f8c1aaacdc64957d546980d863b1a1bf3dd736bbf55dd1d4c9692d066229";

pub const RAW_HEADER_PARENT_HEX: &str =
    "165a7468ff9591eddbf7cf180d256ad273579f80ebc6711c78f9bee4aa6a2b56";

pub const RAW_HEADER_ADJACENT_15_HEX: &str =
    "42a663f976de6f47e513ea4f5336479ca21f7f4a26516dc41d6935a444e1d7b0";

// Ethereum mainnet block 436, as returned by `eth_getBlockByNumber`. It
// predates London, so only the first fifteen header fields are set.
pub const MAINNET_BLOCK_436: &str = r#"{
    "number": "0x1b4",
    "hash": "0xdc0818cf78f21a8e70579cb46a43643f78291264dda342ae31049421c82d21ae",
    "parentHash": "0xe99e022112df268087ea7eafaf4790497fd21dbeeb6bd7a1721df161a6657a54",
    "sha3Uncles": "0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347",
    "logsBloom": "0x00000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000",
    "transactionsRoot": "0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421",
    "stateRoot": "0xddc8b0234c2e0cad087c8b389aa7ef01f7d79b2570bccb77ce48648aa61c904d",
    "receiptsRoot": "0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421",
    "miner": "0xbb7b8287f3f0a933474a79eae42cbca977791171",
    "difficulty": "0x4ea3f27bc",
    "totalDifficulty": "0x78ed983323d",
    "nonce": "0x689056015818adbe",
    "mixHash": "0x4fffe9ae21f1c9e15207b1f472d5bbdd68c9595d461666602f2be20daf5e7843",
    "extraData": "0x476574682f4c5649562f76312e302e302f6c696e75782f676f312e342e32",
    "size": "0x0",
    "gasLimit": "0x1388",
    "gasUsed": "0x0",
    "timestamp": "0x55ba467c",
    "transactions": [],
    "uncles": []
}"#;

pub const MAINNET_BLOCK_436_HASH_HEX: &str =
    "dc0818cf78f21a8e70579cb46a43643f78291264dda342ae31049421c82d21ae";

// keccak256 of the RLP encoding of `raw_header(0x04..04)` in the execution
// header tests, computed with an independent RLP and keccak implementation.
pub const PRAGUE_HEADER_HASH_HEX: &str =
    "6e48d0f6a057c7b13352db887b68bde511b68c97038b541844de51d9250bc886";
