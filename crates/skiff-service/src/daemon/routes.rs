// Copyright (c) Walrus Foundation
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use skiff_client::{StorageBackend, TransferClient, TransferError, UploadOutcome};
use skiff_core::BlobId;
use tracing::Level;

/// The path to get the blob with the given blob ID.
pub const DOWNLOAD_ENDPOINT: &str = "/download/{blob_id}";
/// The bare download path, kept only to answer with an explicit 400.
pub(super) const DOWNLOAD_ROOT_ENDPOINT: &str = "/download";
/// The path to store a blob.
pub const UPLOAD_ENDPOINT: &str = "/upload";
/// The status endpoint, which always returns a 200 status when the daemon is available.
pub const STATUS_ENDPOINT: &str = "/status";

/// Retrieve a stored blob.
///
/// Serves the blob's exact bytes as an attachment named after the blob ID.
#[tracing::instrument(level = Level::ERROR, skip_all, fields(%blob_id))]
pub(super) async fn download_blob<B: StorageBackend>(
    State(client): State<Arc<TransferClient<B>>>,
    Path(blob_id): Path<BlobId>,
) -> Response {
    tracing::debug!("starting to read blob");
    match client.download(&blob_id).await {
        Ok(blob) => {
            tracing::debug!("successfully retrieved blob");
            let mut response = (StatusCode::OK, blob).into_response();
            let headers = response.headers_mut();
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            );
            headers.insert(
                header::CONTENT_DISPOSITION,
                HeaderValue::from_str(&format!("attachment; filename=\"{blob_id}\""))
                    .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
            );
            response
        }
        Err(error) => {
            let error = DownloadBlobError::from(error);
            match &error {
                DownloadBlobError::ContentUnavailable(blob_id) => {
                    tracing::debug!(%blob_id, "placeholder blob ID requested")
                }
                DownloadBlobError::Internal(error) => {
                    tracing::error!(?error, "error retrieving blob")
                }
                DownloadBlobError::MissingBlobId => (),
            }
            error.into_response()
        }
    }
}

/// Answers requests to the bare download path.
#[tracing::instrument(level = Level::ERROR, skip_all)]
pub(super) async fn missing_blob_id() -> Response {
    DownloadBlobError::MissingBlobId.into_response()
}

#[derive(Debug, thiserror::Error)]
pub(super) enum DownloadBlobError {
    /// The requested ID is a local placeholder; no content was ever stored for it.
    #[error("blob ID {0} is a placeholder for content that was never stored")]
    ContentUnavailable(BlobId),

    /// The request carried no blob ID.
    #[error("a blob ID must be provided: GET /download/{{blob_id}}")]
    MissingBlobId,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DownloadBlobError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ContentUnavailable(_) => StatusCode::NOT_FOUND,
            Self::MissingBlobId => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DownloadBlobError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

impl From<TransferError> for DownloadBlobError {
    fn from(error: TransferError) -> Self {
        match error {
            TransferError::ContentUnavailable(blob_id) => Self::ContentUnavailable(blob_id),
            _ => anyhow::anyhow!(error).into(),
        }
    }
}

/// Store a blob.
///
/// Stores the request body and replies with the blob ID to record. A failed upload degrades to a
/// placeholder ID with `available: false` instead of an error, so listing creation never blocks
/// on the storage network.
#[tracing::instrument(level = Level::ERROR, skip_all, fields(blob_len = blob.len()))]
pub(super) async fn upload_blob<B: StorageBackend>(
    State(client): State<Arc<TransferClient<B>>>,
    blob: Bytes,
) -> Response {
    tracing::debug!("starting to store received blob");
    let outcome = client.upload_with_fallback(&blob).await;
    (StatusCode::OK, Json(UploadReply::from(&outcome))).into_response()
}

/// The daemon's reply to an upload request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReply {
    /// The ID to record for the content.
    pub blob_id: BlobId,
    /// Whether stored content backs the ID; false marks a placeholder.
    pub available: bool,
}

impl From<&UploadOutcome> for UploadReply {
    fn from(outcome: &UploadOutcome) -> Self {
        Self {
            blob_id: outcome.blob_id().clone(),
            available: outcome.is_available(),
        }
    }
}

#[tracing::instrument(level = Level::ERROR, skip_all)]
pub(super) async fn status() -> Response {
    "OK".into_response()
}
