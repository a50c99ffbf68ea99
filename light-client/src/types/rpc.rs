// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

use getset::Getters;
use serde::{Deserialize, Serialize};

pub const JSONRPC_VERSION: &str = "2.0";

/// A JSON-RPC request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonRpcRequest<'a> {
    jsonrpc: &'a str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

impl<'a> JsonRpcRequest<'a> {
    pub const fn new(method: &'a str, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: 1,
            method,
            params,
        }
    }
}

/// Error object of a failed JSON-RPC call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Getters)]
#[getset(get = "pub")]
pub struct JsonRpcError {
    code: i64,
    message: String,
}

/// A JSON-RPC response, holding either a result or an error.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Getters)]
#[getset(get = "pub")]
pub struct JsonRpcResponse<T> {
    id: u64,
    jsonrpc: String,
    result: Option<T>,
    error: Option<JsonRpcError>,
}

impl<T> JsonRpcResponse<T> {
    /// Extracts the result of the call.
    ///
    /// # Returns
    ///
    /// The result, or a description of the error. A `null` result, as
    /// returned for unknown blocks, is an error.
    pub fn into_result(self) -> Result<T, String> {
        match (self.result, self.error) {
            (_, Some(error)) => Err(format!("error {}: {}", error.code, error.message)),
            (Some(result), None) => Ok(result),
            (None, None) => Err("empty result".into()),
        }
    }
}
