// Copyright (c) Walrus Foundation
// SPDX-License-Identifier: Apache-2.0

//! Helper struct to run the skiff client binary commands.

use std::{net::SocketAddr, path::PathBuf};

use anyhow::{Context, Result};
use skiff_client::{ClientConfig, TransferClient, load_configuration};
use skiff_core::{BlobId, EpochCount};
use skiff_service::{
    ServiceDaemon,
    cli::CliOutput,
    responses::{ReadOutput, UploadOutput},
};

pub(crate) struct CommandRunner {
    /// The config for the client.
    config: Result<ClientConfig>,
    /// Whether to output JSON.
    json: bool,
}

impl CommandRunner {
    /// Creates a new command runner, loading the configuration.
    pub(crate) fn new(config: &Option<PathBuf>, json: bool) -> Self {
        Self {
            config: load_configuration(config),
            json,
        }
    }

    pub(crate) async fn upload(
        self,
        file: PathBuf,
        epochs: Option<EpochCount>,
        verify: bool,
    ) -> Result<()> {
        let mut config = self.config?;
        if let Some(epochs) = epochs {
            config.epochs = epochs;
        }
        let client = TransferClient::from_config(&config)?;

        let blob = std::fs::read(&file)
            .context(format!("unable to read the blob from {}", file.display()))?;
        let unencoded_size = blob.len() as u64;

        let (blob_id, integrity) = if verify {
            let (blob_id, report) = client.upload_and_verify(&blob).await?;
            (blob_id, Some(report))
        } else {
            (client.upload(&blob).await?, None)
        };

        UploadOutput {
            file,
            blob_id,
            unencoded_size,
            integrity,
        }
        .print_output(self.json)
    }

    pub(crate) async fn download(self, blob_id: BlobId, out: Option<PathBuf>) -> Result<()> {
        let client = TransferClient::from_config(&self.config?)?;
        let blob = client.download(&blob_id).await?;

        let out = out.unwrap_or_else(|| PathBuf::from(blob_id.as_str()));
        std::fs::write(&out, &blob)
            .context(format!("unable to write the blob to {}", out.display()))?;

        ReadOutput::new(Some(out), blob_id, blob).print_output(self.json)
    }

    pub(crate) async fn daemon(
        self,
        bind_address: SocketAddr,
        max_body_limit: usize,
    ) -> Result<()> {
        let client = TransferClient::from_config(&self.config?)?;
        ServiceDaemon::new(client, bind_address)
            .with_download()
            .with_upload(max_body_limit)
            .with_status()
            .run()
            .await?;
        Ok(())
    }
}
