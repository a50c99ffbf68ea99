// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

use crate::client::error::ClientError;
use reqwest::Client;

/// Checks that an HTTP server answers at the given address.
///
/// # Arguments
///
/// * `client` - The HTTP client to use.
/// * `address` - The address to connect to.
///
/// # Returns
///
/// A result indicating whether the connection was successful.
pub(crate) async fn test_connection(client: &Client, address: &str) -> Result<(), ClientError> {
    client
        .head(address)
        .send()
        .await
        .map(|_| ())
        .map_err(|_| ClientError::Connection {
            address: address.to_string(),
        })
}
