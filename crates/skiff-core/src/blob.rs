// Copyright (c) Walrus Foundation
// SPDX-License-Identifier: Apache-2.0

//! Blob identifiers, including locally synthesized placeholder identifiers.

use std::{fmt, str::FromStr};

use rand::{Rng, distributions::Alphanumeric};
use serde::{Deserialize, Serialize};

/// The fixed prefix marking a placeholder blob ID.
///
/// Placeholder IDs are synthesized locally when an upload has failed and the caller chooses to
/// proceed anyway; they never resolve to stored content. Callers detect them by this prefix.
pub const PLACEHOLDER_PREFIX: &str = "mock-blob-";

/// The length of the random suffix appended to [`PLACEHOLDER_PREFIX`].
const PLACEHOLDER_SUFFIX_LEN: usize = 16;

/// The ID of a blob, as assigned by the storage network.
///
/// The network treats blob IDs as opaque strings; so does this crate. The only structure the
/// bridge imposes is the reserved [`PLACEHOLDER_PREFIX`] for IDs it synthesizes itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobId(String);

impl BlobId {
    /// Synthesizes a fresh placeholder ID with the fixed [`PLACEHOLDER_PREFIX`].
    pub fn placeholder() -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(PLACEHOLDER_SUFFIX_LEN)
            .map(char::from)
            .collect();
        Self(format!("{PLACEHOLDER_PREFIX}{suffix}"))
    }

    /// Returns true if this ID was synthesized locally and does not resolve to stored content.
    pub fn is_placeholder(&self) -> bool {
        self.0.starts_with(PLACEHOLDER_PREFIX)
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for BlobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Error returned when parsing an empty blob ID.
#[derive(Debug, thiserror::Error)]
#[error("blob IDs cannot be empty")]
pub struct InvalidBlobId;

impl FromStr for BlobId {
    type Err = InvalidBlobId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(InvalidBlobId);
        }
        Ok(Self(s.to_owned()))
    }
}
