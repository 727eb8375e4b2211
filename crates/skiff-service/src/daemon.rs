// Copyright (c) Walrus Foundation
// SPDX-License-Identifier: Apache-2.0

//! A daemon serving a set of simple HTTP endpoints to store and read blobs.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, put},
};
use skiff_client::{StorageBackend, TransferClient};
use tower_http::trace::TraceLayer;

mod routes;

pub use routes::{
    DOWNLOAD_ENDPOINT, STATUS_ENDPOINT, UPLOAD_ENDPOINT, UploadReply,
};

/// The default bound on upload request bodies (10 MiB).
pub const DEFAULT_MAX_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// The HTTP daemon.
///
/// Exposes the endpoints selected through the `with_*` functions applied after constructing it
/// with [`ServiceDaemon::new`]; started through [`Self::run()`].
#[derive(Debug)]
pub struct ServiceDaemon<B> {
    client: Arc<TransferClient<B>>,
    network_address: SocketAddr,
    router: Router<Arc<TransferClient<B>>>,
}

impl<B: StorageBackend + 'static> ServiceDaemon<B> {
    /// Creates a new daemon serving requests at `network_address` through `client`.
    pub fn new(client: TransferClient<B>, network_address: SocketAddr) -> Self {
        Self {
            client: Arc::new(client),
            network_address,
            router: Router::new(),
        }
    }

    /// Exposes `GET /download/{blob_id}`, serving stored blobs as attachments.
    pub fn with_download(mut self) -> Self {
        self.router = self
            .router
            .route(routes::DOWNLOAD_ENDPOINT, get(routes::download_blob))
            .route(routes::DOWNLOAD_ROOT_ENDPOINT, get(routes::missing_blob_id));
        self
    }

    /// Exposes `PUT /upload`, storing request bodies with placeholder fallback.
    pub fn with_upload(mut self, max_body_limit: usize) -> Self {
        self.router = self.router.route(
            routes::UPLOAD_ENDPOINT,
            put(routes::upload_blob).route_layer(DefaultBodyLimit::max(max_body_limit)),
        );
        self
    }

    /// Exposes the `GET /status` liveness endpoint.
    pub fn with_status(mut self) -> Self {
        self.router = self.router.route(routes::STATUS_ENDPOINT, get(routes::status));
        self
    }

    /// Runs the daemon until ctrl-c.
    pub async fn run(self) -> Result<(), std::io::Error> {
        let listener = tokio::net::TcpListener::bind(self.network_address).await?;
        tracing::info!(address = %self.network_address, "the skiff daemon is starting");
        self.serve(listener).await
    }

    async fn serve(self, listener: tokio::net::TcpListener) -> Result<(), std::io::Error> {
        axum::serve(
            listener,
            self.router
                .with_state(self.client)
                .layer(TraceLayer::new_for_http()),
        )
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use skiff_client::{
        BackendError,
        DurabilityParams,
        backoff::LinearBackoffConfig,
        test_utils::StubBackend,
    };
    use skiff_core::PLACEHOLDER_PREFIX;

    use super::*;

    /// Serves a daemon over `backend` on an ephemeral port and returns its base URL.
    async fn spawn_daemon(backend: StubBackend) -> String {
        // A tiny backoff factor keeps the retry paths fast under test.
        let backoff = LinearBackoffConfig {
            backoff_factor: Duration::from_millis(1),
            ..Default::default()
        };
        let client = TransferClient::new(backend, backoff, DurabilityParams::default());
        let daemon = ServiceDaemon::new(client, "127.0.0.1:0".parse().expect("valid address"))
            .with_download()
            .with_upload(DEFAULT_MAX_BODY_LIMIT)
            .with_status();

        let listener = tokio::net::TcpListener::bind(daemon.network_address)
            .await
            .expect("binding an ephemeral port succeeds");
        let address = listener.local_addr().expect("bound listener has an address");
        tokio::spawn(daemon.serve(listener));
        format!("http://{address}")
    }

    #[tokio::test]
    async fn status_endpoint_reports_ok() {
        let url = spawn_daemon(StubBackend::new()).await;
        let response = reqwest::get(format!("{url}/status")).await.expect("request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert_eq!(response.text().await.expect("body"), "OK");
    }

    #[tokio::test]
    async fn uploaded_blobs_can_be_downloaded() {
        let url = spawn_daemon(StubBackend::new()).await;
        let payload = b"listing content".to_vec();

        let reply: UploadReply = reqwest::Client::new()
            .put(format!("{url}/upload"))
            .body(payload.clone())
            .send()
            .await
            .expect("request")
            .json()
            .await
            .expect("JSON reply");
        assert!(reply.available);

        let response = reqwest::get(format!("{url}/download/{}", reply.blob_id))
            .await
            .expect("request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .expect("content type set"),
            "application/octet-stream"
        );
        let disposition = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .expect("disposition set")
            .to_str()
            .expect("visible ASCII");
        assert!(disposition.contains("attachment"));
        assert!(disposition.contains(reply.blob_id.as_str()));
        assert_eq!(response.bytes().await.expect("body").to_vec(), payload);
    }

    #[tokio::test]
    async fn failed_uploads_degrade_to_a_placeholder() {
        let backend = StubBackend::new();
        for _ in 0..3 {
            backend.push_write(Err(BackendError::status(503, "unavailable")));
        }
        let url = spawn_daemon(backend).await;

        let reply: UploadReply = reqwest::Client::new()
            .put(format!("{url}/upload"))
            .body(b"listing content".to_vec())
            .send()
            .await
            .expect("request")
            .json()
            .await
            .expect("JSON reply");

        assert!(!reply.available);
        assert!(reply.blob_id.is_placeholder());
    }

    #[tokio::test]
    async fn placeholder_downloads_return_404_without_a_backend_call() {
        let url = spawn_daemon(StubBackend::new()).await;

        let response = reqwest::get(format!("{url}/download/{PLACEHOLDER_PREFIX}123"))
            .await
            .expect("request");

        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
        let body = response.text().await.expect("body");
        assert!(body.contains("never stored"), "unexpected body: {body}");
    }

    #[tokio::test]
    async fn bare_download_path_returns_400() {
        let url = spawn_daemon(StubBackend::new()).await;
        let response = reqwest::get(format!("{url}/download")).await.expect("request");
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn other_retrieval_failures_return_500() {
        let backend = StubBackend::new();
        backend.push_read(Err(BackendError::status(451, "blocked")));
        let url = spawn_daemon(backend).await;

        let response = reqwest::get(format!("{url}/download/some-real-blob"))
            .await
            .expect("request");

        assert_eq!(
            response.status(),
            reqwest::StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
