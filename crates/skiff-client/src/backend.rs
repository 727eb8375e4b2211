// Copyright (c) Walrus Foundation
// SPDX-License-Identifier: Apache-2.0

//! The storage-backend seam: the black-box interface to the storage network.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skiff_core::{BlobId, EpochCount};

mod gateway;

pub use gateway::HttpGateway;

/// The durability knobs passed to the storage network on upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurabilityParams {
    /// The number of epochs, ahead of the current one, for which to store the blob.
    pub epochs: EpochCount,
    /// Whether the blob may later be deleted by its owner.
    pub deletable: bool,
}

impl Default for DurabilityParams {
    fn default() -> Self {
        Self {
            epochs: 1,
            deletable: false,
        }
    }
}

/// A blob store consumed as a black box.
///
/// Implementations classify every failure through [`BackendError`]; the transfer client decides
/// whether to reset and retry based on that classification alone.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Writes `blob` to the network and returns the network-assigned blob ID.
    async fn write_blob(
        &self,
        blob: &[u8],
        durability: &DurabilityParams,
    ) -> Result<BlobId, BackendError>;

    /// Reads back the exact bytes stored under `blob_id`.
    async fn read_blob(&self, blob_id: &BlobId) -> Result<Vec<u8>, BackendError>;

    /// Clears the backend's connection state after a retryable failure.
    async fn reset(&self);
}

/// Error raised during communication with the storage network.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct BackendError {
    #[from]
    kind: Kind,
}

impl BackendError {
    /// Returns true for transient conditions after which a fresh attempt may succeed once the
    /// backend's connection state is reset.
    ///
    /// Connection and timeout failures are retryable, as are HTTP 408, 429, and all 5xx
    /// responses. Everything else, including a missing blob, is terminal.
    pub fn is_retryable(&self) -> bool {
        match &self.kind {
            Kind::Reqwest(error) => error.is_connect() || error.is_timeout(),
            Kind::Status { code, .. } => {
                *code == 408 || *code == 429 || (500..=599).contains(code)
            }
            Kind::NotFound | Kind::UnexpectedResponse(_) | Kind::Auth(_) => false,
        }
    }

    /// Returns true if the network holds no blob under the requested ID.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, Kind::NotFound)
    }

    /// Constructs the error for a missing blob.
    pub fn not_found() -> Self {
        Kind::NotFound.into()
    }

    /// Constructs the error for a non-success gateway status.
    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Kind::Status {
            code,
            message: message.into(),
        }
        .into()
    }

    /// Constructs the error for a response the client could not interpret.
    pub fn unexpected_response(message: impl Into<String>) -> Self {
        Kind::UnexpectedResponse(message.into()).into()
    }

    pub(crate) fn reqwest(error: reqwest::Error) -> Self {
        Kind::Reqwest(error).into()
    }

    pub(crate) fn auth(error: jsonwebtoken::errors::Error) -> Self {
        Kind::Auth(error).into()
    }
}

/// Errors returned during the communication with the storage gateway.
#[derive(Debug, thiserror::Error)]
enum Kind {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error("the gateway returned status {code}: {message}")]
    Status { code: u16, message: String },
    #[error("no blob is stored under the requested ID")]
    NotFound,
    #[error("unexpected gateway response: {0}")]
    UnexpectedResponse(String),
    #[error("failed to mint the upload authorization token")]
    Auth(#[source] jsonwebtoken::errors::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_side_statuses_are_retryable() {
        for code in [408, 429, 500, 502, 503, 599] {
            assert!(
                BackendError::status(code, "transient").is_retryable(),
                "status {code} should be retryable"
            );
        }
    }

    #[test]
    fn client_side_statuses_are_terminal() {
        for code in [400, 401, 403, 413, 451] {
            assert!(
                !BackendError::status(code, "rejected").is_retryable(),
                "status {code} should be terminal"
            );
        }
    }

    #[test]
    fn missing_blobs_are_terminal_and_distinct() {
        let error = BackendError::not_found();
        assert!(!error.is_retryable());
        assert!(error.is_not_found());
        assert!(!BackendError::status(500, "boom").is_not_found());
    }

    #[test]
    fn malformed_responses_are_terminal() {
        assert!(!BackendError::unexpected_response("not JSON").is_retryable());
    }
}
