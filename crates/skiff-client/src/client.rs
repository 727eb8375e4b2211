// Copyright (c) Walrus Foundation
// SPDX-License-Identifier: Apache-2.0

//! The transfer client: bounded retries with connection resets over a storage backend.

use std::future::Future;

use skiff_core::{
    BlobId,
    integrity::{self, IntegrityReport},
};

use crate::{
    backend::{BackendError, DurabilityParams, HttpGateway, StorageBackend},
    backoff::{BackoffStrategy, LinearBackoffConfig},
    config::ClientConfig,
    error::{ConfigError, TransferError},
};

/// Client uploading and downloading blobs through a [`StorageBackend`].
///
/// Constructed explicitly from configuration; holds no global state. Every call is independent
/// of every other call; nothing is cached or queued between them.
#[derive(Debug)]
pub struct TransferClient<B> {
    backend: B,
    backoff_config: LinearBackoffConfig,
    durability: DurabilityParams,
}

impl TransferClient<HttpGateway> {
    /// Creates a client over the HTTP gateway backend described by `config`.
    ///
    /// Decodes the signer key, so an invalid credential fails here, at startup.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        let signer = config.signer()?;
        Ok(Self::new(
            HttpGateway::new(config, signer)?,
            config.backoff.clone(),
            config.durability(),
        ))
    }
}

impl<B: StorageBackend> TransferClient<B> {
    /// Creates a client over the given backend.
    pub fn new(
        backend: B,
        backoff_config: LinearBackoffConfig,
        durability: DurabilityParams,
    ) -> Self {
        Self {
            backend,
            backoff_config,
            durability,
        }
    }

    /// Uploads `blob` and returns the network-assigned blob ID.
    ///
    /// Retries retryable backend failures up to the configured attempt bound, resetting the
    /// backend's connection state before each re-attempt. Terminal failures abort immediately
    /// without consuming the remaining attempts.
    #[tracing::instrument(skip_all, fields(blob_len = blob.len()))]
    pub async fn upload(&self, blob: &[u8]) -> Result<BlobId, TransferError> {
        self.with_retries("upload", || self.backend.write_blob(blob, &self.durability))
            .await
            .map_err(|failure| match failure {
                RetryFailure::Exhausted {
                    attempts,
                    last_error,
                } => TransferError::UploadRetriesExhausted {
                    attempts,
                    last_error,
                },
                RetryFailure::Terminal(error) => error.into(),
            })
    }

    /// Uploads `blob`, substituting a placeholder blob ID if the upload fails.
    ///
    /// This is the availability-over-consistency path for callers whose workflow must not block
    /// on a failed upload: a marketplace listing can be created with unretrievable content, and
    /// detects that state through the placeholder prefix.
    pub async fn upload_with_fallback(&self, blob: &[u8]) -> UploadOutcome {
        match self.upload(blob).await {
            Ok(blob_id) => UploadOutcome::Stored(blob_id),
            Err(error) => {
                let placeholder = BlobId::placeholder();
                tracing::warn!(
                    %placeholder,
                    %error,
                    "upload failed; substituting a placeholder blob ID"
                );
                UploadOutcome::Degraded { placeholder, error }
            }
        }
    }

    /// Downloads the exact bytes stored under `blob_id`.
    ///
    /// Placeholder IDs fail immediately with [`TransferError::ContentUnavailable`], without any
    /// network call. Exhausted retries surface the blob ID so the caller can retry out-of-band;
    /// there is no fallback on downloads.
    #[tracing::instrument(skip_all, fields(%blob_id))]
    pub async fn download(&self, blob_id: &BlobId) -> Result<Vec<u8>, TransferError> {
        if blob_id.is_placeholder() {
            return Err(TransferError::ContentUnavailable(blob_id.clone()));
        }
        self.with_retries("download", || self.backend.read_blob(blob_id))
            .await
            .map_err(|failure| match failure {
                RetryFailure::Exhausted {
                    attempts,
                    last_error,
                } => TransferError::DownloadRetriesExhausted {
                    blob_id: blob_id.clone(),
                    attempts,
                    last_error,
                },
                RetryFailure::Terminal(error) => error.into(),
            })
    }

    /// Uploads `blob`, reads it back, and compares the two.
    ///
    /// A mismatch is a diagnostic, reported through the returned [`IntegrityReport`] and a
    /// warning; only transfer failures are errors.
    pub async fn upload_and_verify(
        &self,
        blob: &[u8],
    ) -> Result<(BlobId, IntegrityReport), TransferError> {
        let blob_id = self.upload(blob).await?;
        let retrieved = self.download(&blob_id).await?;
        Ok((blob_id, integrity::verify(blob, &retrieved)))
    }

    /// Returns a reference to the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Runs `attempt` under the configured backoff policy.
    async fn with_retries<T, F, Fut>(
        &self,
        operation: &'static str,
        mut attempt: F,
    ) -> Result<T, RetryFailure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        let mut strategy = self.backoff_config.get_strategy();
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match attempt().await {
                Ok(value) => {
                    if attempts > 1 {
                        tracing::info!(operation, attempts, "operation succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(error) if error.is_retryable() => {
                    let Some(delay) = strategy.next_delay() else {
                        return Err(RetryFailure::Exhausted {
                            attempts,
                            last_error: error,
                        });
                    };
                    tracing::warn!(
                        operation,
                        attempt = attempts,
                        ?delay,
                        %error,
                        "retryable backend error; resetting connection state and backing off"
                    );
                    self.backend.reset().await;
                    tokio::time::sleep(delay).await;
                }
                Err(error) => {
                    tracing::warn!(
                        operation,
                        attempt = attempts,
                        %error,
                        "terminal backend error; aborting without further attempts"
                    );
                    return Err(RetryFailure::Terminal(error));
                }
            }
        }
    }
}

/// Why a retried operation gave up; mapped to operation-specific errors by the caller.
enum RetryFailure {
    Exhausted { attempts: u32, last_error: BackendError },
    Terminal(BackendError),
}

/// The result of an upload with placeholder fallback.
#[derive(Debug)]
pub enum UploadOutcome {
    /// The network stored the blob under the returned ID.
    Stored(BlobId),
    /// The upload failed; the returned placeholder does not resolve to content.
    Degraded {
        /// The locally synthesized placeholder ID.
        placeholder: BlobId,
        /// The upload failure the placeholder papers over.
        error: TransferError,
    },
}

impl UploadOutcome {
    /// The ID to record for the content, stored or not.
    pub fn blob_id(&self) -> &BlobId {
        match self {
            Self::Stored(blob_id) => blob_id,
            Self::Degraded { placeholder, .. } => placeholder,
        }
    }

    /// Returns true if real content backs the ID.
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Stored(_))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::*;
    use crate::test_utils::StubBackend;

    fn client(backend: StubBackend) -> TransferClient<StubBackend> {
        TransferClient::new(
            backend,
            LinearBackoffConfig::default(),
            DurabilityParams::default(),
        )
    }

    #[tokio::test]
    async fn round_trip_returns_the_uploaded_bytes() {
        let client = client(StubBackend::new());
        let payload = b"round-trip payload".to_vec();

        let blob_id = client.upload(&payload).await.expect("upload succeeds");
        assert!(!blob_id.is_placeholder());
        let retrieved = client.download(&blob_id).await.expect("download succeeds");
        assert_eq!(retrieved, payload);
    }

    #[tokio::test(start_paused = true)]
    async fn first_attempt_success_incurs_no_delay() {
        let client = client(StubBackend::new());
        let started = Instant::now();

        let blob_id = client.upload(&[1, 2, 3, 4, 5]).await.expect("upload succeeds");

        assert!(!blob_id.is_placeholder());
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(client.backend().write_calls(), 1);
        assert_eq!(client.backend().resets(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn two_retryable_failures_back_off_then_succeed() {
        let backend = StubBackend::new();
        backend.push_write(Err(BackendError::status(503, "unavailable")));
        backend.push_write(Err(BackendError::status(503, "unavailable")));
        let client = client(backend);
        let started = Instant::now();

        client.upload(b"payload").await.expect("third attempt succeeds");

        // One 3s and one 6s wait.
        assert_eq!(started.elapsed(), Duration::from_secs(9));
        assert_eq!(client.backend().write_calls(), 3);
        assert_eq!(client.backend().resets(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn upload_never_issues_a_fourth_attempt() {
        let backend = StubBackend::new();
        for _ in 0..4 {
            backend.push_write(Err(BackendError::status(500, "boom")));
        }
        let client = client(backend);

        let error = client.upload(b"payload").await.expect_err("upload fails");

        assert_eq!(client.backend().write_calls(), 3);
        let TransferError::UploadRetriesExhausted { attempts, .. } = error else {
            panic!("expected exhausted retries, got {error}");
        };
        assert_eq!(attempts, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_errors_abort_without_retrying() {
        let backend = StubBackend::new();
        backend.push_write(Err(BackendError::status(413, "too large")));
        let client = client(backend);
        let started = Instant::now();

        let error = client.upload(b"payload").await.expect_err("upload fails");

        assert!(matches!(error, TransferError::Backend(_)));
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(client.backend().write_calls(), 1);
        assert_eq!(client.backend().resets(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_uploads_fall_back_to_a_placeholder() {
        let backend = StubBackend::new();
        for _ in 0..3 {
            backend.push_write(Err(BackendError::status(503, "unavailable")));
        }
        let client = client(backend);

        let outcome = client.upload_with_fallback(b"payload").await;

        assert!(!outcome.is_available());
        assert!(outcome.blob_id().is_placeholder());
        assert_eq!(client.backend().write_calls(), 3);
    }

    #[tokio::test]
    async fn successful_uploads_do_not_fall_back() {
        let client = client(StubBackend::new());
        let outcome = client.upload_with_fallback(b"payload").await;
        assert!(outcome.is_available());
        assert!(!outcome.blob_id().is_placeholder());
    }

    #[tokio::test]
    async fn placeholder_downloads_fail_without_a_network_call() {
        let client = client(StubBackend::new());
        let placeholder = BlobId::placeholder();

        let error = client
            .download(&placeholder)
            .await
            .expect_err("placeholders are unavailable");

        assert!(error.is_content_unavailable());
        assert_eq!(client.backend().read_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_downloads_carry_the_blob_id() {
        let backend = StubBackend::new();
        for _ in 0..3 {
            backend.push_read(Err(BackendError::status(502, "bad gateway")));
        }
        let client = client(backend);
        let blob_id: BlobId = "some-real-blob".parse().expect("non-empty");

        let error = client
            .download(&blob_id)
            .await
            .expect_err("download fails");

        let TransferError::DownloadRetriesExhausted {
            blob_id: reported, ..
        } = error
        else {
            panic!("expected exhausted retries, got {error}");
        };
        assert_eq!(reported, blob_id);
        assert_eq!(client.backend().read_calls(), 3);
    }

    #[tokio::test]
    async fn missing_blobs_are_terminal_on_download() {
        let backend = StubBackend::new();
        backend.push_read(Err(BackendError::not_found()));
        let client = client(backend);
        let blob_id: BlobId = "unknown-blob".parse().expect("non-empty");

        let error = client.download(&blob_id).await.expect_err("download fails");

        assert!(matches!(
            &error,
            TransferError::Backend(backend_error) if backend_error.is_not_found()
        ));
        assert_eq!(client.backend().read_calls(), 1);
    }

    #[tokio::test]
    async fn verification_reports_mismatches_without_failing() {
        let backend = StubBackend::new();
        backend.push_read(Ok(b"corrupted".to_vec()));
        let client = client(backend);

        let (blob_id, report) = client
            .upload_and_verify(b"original content")
            .await
            .expect("transfer succeeds");

        assert!(!blob_id.is_placeholder());
        assert!(!report.is_match());
    }

    #[tokio::test]
    async fn verification_passes_on_a_healthy_round_trip() {
        let client = client(StubBackend::new());
        let (_, report) = client
            .upload_and_verify(b"original content")
            .await
            .expect("transfer succeeds");
        assert!(report.is_match());
    }
}
