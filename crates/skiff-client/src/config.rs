// Copyright (c) Walrus Foundation
// SPDX-License-Identifier: Apache-2.0

//! Client configuration and its discovery on disk.

use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_with::{DurationSeconds, serde_as};
use skiff_core::EpochCount;

use crate::{
    backend::DurabilityParams,
    backoff::LinearBackoffConfig,
    crypto::SignerKey,
    error::ConfigError,
};

/// The environment variable overriding the configured signer key.
pub const SIGNER_KEY_ENV: &str = "SKIFF_SIGNER_KEY";

/// The configuration file names looked up in the default locations.
const CONFIG_FILE_NAMES: [&str; 2] = ["skiff_config.yaml", "skiff_config.yml"];

/// Config for the transfer client.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// The URL of the publisher accepting blob writes.
    pub publisher_url: String,
    /// The URL of the aggregator serving blob reads.
    pub aggregator_url: String,
    /// The number of epochs, ahead of the current one, for which to store blobs.
    #[serde(default = "defaults::epochs")]
    pub epochs: EpochCount,
    /// Whether stored blobs may later be deleted by their owner.
    #[serde(default)]
    pub deletable: bool,
    /// The retry backoff applied to uploads and downloads.
    #[serde(default)]
    pub backoff: LinearBackoffConfig,
    /// The per-attempt request timeout, in seconds.
    #[serde_as(as = "DurationSeconds")]
    #[serde(rename = "request_timeout_secs", default = "defaults::request_timeout")]
    pub request_timeout: Duration,
    /// The lifetime of minted upload-authorization tokens, in seconds.
    #[serde_as(as = "DurationSeconds")]
    #[serde(rename = "token_lifetime_secs", default = "defaults::token_lifetime")]
    pub token_lifetime: Duration,
    /// The encoded signer key authorizing uploads; optional for gateways without auth.
    ///
    /// Overridden by the `SKIFF_SIGNER_KEY` environment variable when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer_key: Option<String>,
}

mod defaults {
    use std::time::Duration;

    use skiff_core::EpochCount;

    pub(super) fn epochs() -> EpochCount {
        1
    }

    pub(super) fn request_timeout() -> Duration {
        Duration::from_secs(90)
    }

    pub(super) fn token_lifetime() -> Duration {
        Duration::from_secs(300)
    }
}

impl ClientConfig {
    /// Returns the durability parameters passed to the backend on upload.
    pub fn durability(&self) -> DurabilityParams {
        DurabilityParams {
            epochs: self.epochs,
            deletable: self.deletable,
        }
    }

    /// Resolves and decodes the signer key, preferring the environment over the config file.
    pub fn signer(&self) -> Result<Option<SignerKey>, ConfigError> {
        env::var(SIGNER_KEY_ENV)
            .ok()
            .or_else(|| self.signer_key.clone())
            .map(|encoded| SignerKey::decode(&encoded))
            .transpose()
    }
}

/// Returns the default paths for the skiff configuration file.
pub fn default_configuration_paths() -> Vec<PathBuf> {
    let mut directories = vec![PathBuf::from(".")];
    if let Ok(xdg_config_dir) = env::var("XDG_CONFIG_HOME") {
        directories.push(PathBuf::from(xdg_config_dir).join("skiff"));
    }
    if let Some(home_dir) = home::home_dir() {
        directories.push(home_dir.join(".config").join("skiff"));
        directories.push(home_dir.join(".skiff"));
    }

    let mut paths = Vec::new();
    for directory in directories {
        for file_name in CONFIG_FILE_NAMES {
            paths.push(directory.join(file_name));
        }
    }
    paths
}

/// Returns the path if it is `Some` or the first of the default paths that exists.
pub fn path_or_defaults_if_exist(path: &Option<PathBuf>, defaults: &[PathBuf]) -> Option<PathBuf> {
    let mut path = path.clone();
    for default in defaults {
        if path.is_some() {
            break;
        }
        path = default.exists().then(|| default.clone());
    }
    path
}

/// Loads the skiff configuration from the given path.
///
/// If no path is provided, tries to load the configuration first from the local folder, and then
/// from the standard skiff configuration directories.
pub fn load_configuration(path: &Option<PathBuf>) -> Result<ClientConfig> {
    let path = path_or_defaults_if_exist(path, &default_configuration_paths())
        .ok_or(anyhow!("could not find a valid skiff configuration file"))?;
    tracing::info!("using skiff configuration from {}", path.display());
    read_configuration(&path)
}

fn read_configuration(path: &Path) -> Result<ClientConfig> {
    serde_yaml::from_str(&std::fs::read_to_string(path).context(format!(
        "unable to read skiff configuration from {}",
        path.display()
    ))?)
    .context(format!(
        "parsing skiff configuration from {} failed",
        path.display()
    ))
}
