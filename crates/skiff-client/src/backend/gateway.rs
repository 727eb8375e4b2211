// Copyright (c) Walrus Foundation
// SPDX-License-Identifier: Apache-2.0

//! HTTP backend speaking the publisher/aggregator gateway protocol.

use std::{
    sync::RwLock,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use async_trait::async_trait;
use jsonwebtoken::{EncodingKey, Header};
use serde::{Deserialize, Serialize};
use skiff_core::{BlobId, EpochCount};

use crate::{
    backend::{BackendError, DurabilityParams, StorageBackend},
    config::ClientConfig,
    crypto::SignerKey,
    error::ConfigError,
};

/// The maximum number of body characters echoed into error messages.
const ERROR_BODY_LIMIT: usize = 256;

/// Storage backend talking to a publisher/aggregator gateway pair over HTTP.
///
/// Writes go to `PUT {publisher_url}/v1/blobs`, reads to
/// `GET {aggregator_url}/v1/blobs/{blob_id}`. When a signer key is configured, writes carry a
/// bearer token minted from it.
#[derive(Debug)]
pub struct HttpGateway {
    publisher_url: String,
    aggregator_url: String,
    request_timeout: Duration,
    auth: Option<TokenMinter>,
    http: RwLock<reqwest::Client>,
}

impl HttpGateway {
    /// Creates a new gateway backend from the client configuration and the optional signer key.
    pub fn new(config: &ClientConfig, signer: Option<SignerKey>) -> Result<Self, ConfigError> {
        Ok(Self {
            publisher_url: config.publisher_url.trim_end_matches('/').to_owned(),
            aggregator_url: config.aggregator_url.trim_end_matches('/').to_owned(),
            request_timeout: config.request_timeout,
            auth: signer.map(|key| TokenMinter {
                encoding_key: key.encoding_key(),
                token_lifetime: config.token_lifetime,
            }),
            http: RwLock::new(Self::build_http_client(config.request_timeout)?),
        })
    }

    fn build_http_client(request_timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder().timeout(request_timeout).build()
    }

    fn http_client(&self) -> reqwest::Client {
        self.http
            .read()
            .expect("no code panics while holding the client lock")
            .clone()
    }

    /// Converts a non-success response into a [`BackendError`], consuming the body for context.
    async fn error_for_status(response: reqwest::Response) -> BackendError {
        let code = response.status().as_u16();
        let message: String = response
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(ERROR_BODY_LIMIT)
            .collect();
        BackendError::status(code, message)
    }
}

#[async_trait]
impl StorageBackend for HttpGateway {
    async fn write_blob(
        &self,
        blob: &[u8],
        durability: &DurabilityParams,
    ) -> Result<BlobId, BackendError> {
        let mut request = self
            .http_client()
            .put(format!("{}/v1/blobs", self.publisher_url))
            .query(&StoreQuery::from(durability))
            .body(blob.to_vec());
        if let Some(auth) = &self.auth {
            request = request.bearer_auth(auth.mint(durability)?);
        }

        let response = request.send().await.map_err(BackendError::reqwest)?;
        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        let result: StoreResponse = response
            .json()
            .await
            .map_err(|error| BackendError::unexpected_response(error.to_string()))?;
        Ok(result.into_blob_id())
    }

    async fn read_blob(&self, blob_id: &BlobId) -> Result<Vec<u8>, BackendError> {
        let response = self
            .http_client()
            .get(format!("{}/v1/blobs/{blob_id}", self.aggregator_url))
            .send()
            .await
            .map_err(BackendError::reqwest)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::not_found());
        }
        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        let bytes = response.bytes().await.map_err(BackendError::reqwest)?;
        Ok(bytes.to_vec())
    }

    async fn reset(&self) {
        tracing::debug!("resetting gateway connection state");
        match Self::build_http_client(self.request_timeout) {
            Ok(client) => {
                *self
                    .http
                    .write()
                    .expect("no code panics while holding the client lock") = client;
            }
            Err(error) => {
                // Keep the previous client; the next attempt may still get through.
                tracing::warn!(%error, "failed to rebuild the gateway HTTP client");
            }
        }
    }
}

/// The query string attached to store requests.
#[derive(Debug, Serialize)]
struct StoreQuery {
    epochs: EpochCount,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    deletable: bool,
}

impl From<&DurabilityParams> for StoreQuery {
    fn from(durability: &DurabilityParams) -> Self {
        Self {
            epochs: durability.epochs,
            deletable: durability.deletable,
        }
    }
}

/// The gateway's response to a store request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
enum StoreResponse {
    /// The blob was stored anew.
    NewlyCreated { blob_object: StoredBlobObject },
    /// The blob was already available and certified for a sufficient number of epochs.
    AlreadyCertified { blob_id: BlobId },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredBlobObject {
    blob_id: BlobId,
}

impl StoreResponse {
    fn into_blob_id(self) -> BlobId {
        match self {
            Self::NewlyCreated { blob_object } => blob_object.blob_id,
            Self::AlreadyCertified { blob_id } => blob_id,
        }
    }
}

/// Mints short-lived bearer tokens for the publisher.
struct TokenMinter {
    encoding_key: EncodingKey,
    token_lifetime: Duration,
}

impl std::fmt::Debug for TokenMinter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenMinter")
            .field("token_lifetime", &self.token_lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenMinter {
    fn mint(&self, durability: &DurabilityParams) -> Result<String, BackendError> {
        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let claim = Claim {
            iat,
            exp: iat + self.token_lifetime.as_secs(),
            epochs: durability.epochs,
        };
        jsonwebtoken::encode(&Header::default(), &claim, &self.encoding_key)
            .map_err(BackendError::auth)
    }
}

/// Claim follows RFC 7519 with the store parameters the publisher verifies.
#[derive(Debug, Serialize)]
struct Claim {
    /// Token is issued at (timestamp).
    iat: u64,
    /// Token expires at (timestamp).
    exp: u64,
    /// The number of epochs the blob should be stored for.
    epochs: EpochCount,
}
