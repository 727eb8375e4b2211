// Copyright (c) Walrus Foundation
// SPDX-License-Identifier: Apache-2.0

//! Errors raised by the transfer client and its configuration.

use skiff_core::BlobId;

use crate::backend::BackendError;

/// Errors raised while transferring a blob to or from the storage network.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The requested ID is a locally synthesized placeholder; no content was ever stored for it.
    ///
    /// Raised before any network call is made.
    #[error("blob ID {0} is a local placeholder; its content was never stored")]
    ContentUnavailable(BlobId),

    /// The storage network did not accept the blob within the permitted attempts.
    #[error("the storage network did not accept the blob after {attempts} attempts")]
    UploadRetriesExhausted {
        /// The number of attempts performed.
        attempts: u32,
        /// The error returned by the final attempt.
        #[source]
        last_error: BackendError,
    },

    /// The blob could not be retrieved within the permitted attempts.
    ///
    /// Carries the blob ID so the caller can retry out-of-band.
    #[error("failed to retrieve blob {blob_id} after {attempts} attempts")]
    DownloadRetriesExhausted {
        /// The ID of the blob that could not be retrieved.
        blob_id: BlobId,
        /// The number of attempts performed.
        attempts: u32,
        /// The error returned by the final attempt.
        #[source]
        last_error: BackendError,
    },

    /// A terminal backend error that short-circuited the retry loop.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl TransferError {
    /// Returns true if the error marks a placeholder ID whose content was never stored.
    pub fn is_content_unavailable(&self) -> bool {
        matches!(self, Self::ContentUnavailable(_))
    }
}

/// Errors raised while loading the client configuration; fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The signer key matches none of the supported encodings.
    #[error(
        "the signer key is not valid in any supported encoding \
        (flag-prefixed keystore base64, hex, raw base64)"
    )]
    InvalidSignerKey,

    /// The signer key decoded, but not to the expected number of bytes.
    #[error("the decoded signer key has {actual} bytes, expected exactly {expected}")]
    InvalidSignerKeyLength {
        /// The decoded length.
        actual: usize,
        /// The required length.
        expected: usize,
    },

    /// The HTTP client for the gateway could not be constructed.
    #[error("failed to construct the gateway HTTP client")]
    HttpClient(#[from] reqwest::Error),
}
