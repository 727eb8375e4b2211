// Copyright (c) Walrus Foundation
// SPDX-License-Identifier: Apache-2.0

//! Core types for the skiff content bridge.

pub mod blob;
pub mod integrity;

pub use blob::{BlobId, InvalidBlobId, PLACEHOLDER_PREFIX};

/// The number of epochs, ahead of the current one, for which a blob is stored.
pub type EpochCount = u32;
