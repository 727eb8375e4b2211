// Copyright (c) Walrus Foundation
// SPDX-License-Identifier: Apache-2.0

//! HTTP daemon and CLI support for the skiff content bridge.

pub mod cli;
pub mod daemon;
pub mod responses;

pub use daemon::ServiceDaemon;
