// Copyright (c) Walrus Foundation
// SPDX-License-Identifier: Apache-2.0

//! The arguments to the skiff client binary.

use std::{net::SocketAddr, path::PathBuf};

use clap::{Parser, Subcommand};
use skiff_core::{BlobId, EpochCount};
use skiff_service::daemon::DEFAULT_MAX_BODY_LIMIT;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Skiff content-bridge client", long_about = None)]
#[clap(rename_all = "kebab-case")]
pub(crate) struct App {
    /// The path to the skiff configuration file.
    ///
    /// If a path is specified through this option, the CLI attempts to read the specified file
    /// and returns an error if the path is invalid.
    ///
    /// If no path is specified explicitly, the CLI looks for `skiff_config.yaml` or
    /// `skiff_config.yml` in the following locations (in order):
    ///
    /// 1. The current working directory (`./`).
    /// 2. If the environment variable `XDG_CONFIG_HOME` is set, in `$XDG_CONFIG_HOME/skiff/`.
    /// 3. In `~/.config/skiff/`.
    /// 4. In `~/.skiff/`.
    #[clap(short, long, verbatim_doc_comment)]
    pub(crate) config: Option<PathBuf>,
    /// Write output as JSON.
    #[clap(long, action)]
    pub(crate) json: bool,
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
#[clap(rename_all = "kebab-case")]
pub(crate) enum Commands {
    /// Store a new blob with the storage network.
    #[clap(alias("store"))]
    Upload {
        /// The file containing the blob to be uploaded.
        file: PathBuf,
        /// The number of epochs ahead for which to store the blob.
        ///
        /// Overrides the value from the configuration file.
        #[clap(short, long)]
        epochs: Option<EpochCount>,
        /// Read the blob back after the upload and report an integrity check.
        #[clap(long, action)]
        verify: bool,
    },
    /// Retrieve a blob, given its blob ID.
    #[clap(alias("read"))]
    Download {
        /// The blob ID to be retrieved.
        blob_id: BlobId,
        /// The file path where to write the blob.
        ///
        /// Defaults to a file named after the blob ID in the working directory.
        #[clap(short, long)]
        out: Option<PathBuf>,
    },
    /// Run the HTTP daemon exposing the download and upload endpoints.
    Daemon {
        /// The address to which to bind the daemon.
        #[clap(long, default_value = "127.0.0.1:31415")]
        bind_address: SocketAddr,
        /// The maximum number of body bytes accepted by the upload endpoint.
        #[clap(long, default_value_t = DEFAULT_MAX_BODY_LIMIT)]
        max_body_limit: usize,
    },
}
