// Copyright (c) Walrus Foundation
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a scripted in-memory storage backend.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Mutex,
        atomic::{AtomicU32, Ordering},
    },
};

use async_trait::async_trait;
use skiff_core::BlobId;

use crate::backend::{BackendError, DurabilityParams, StorageBackend};

/// An in-memory [`StorageBackend`] with scriptable failures and call counters.
///
/// Unscripted calls behave like a healthy network: writes store the bytes under a fresh
/// deterministic ID, reads return exactly what was stored. Scripted outcomes, queued with
/// [`push_write`][Self::push_write] and [`push_read`][Self::push_read], are consumed
/// first-in-first-out before the default behavior applies.
#[derive(Debug, Default)]
pub struct StubBackend {
    scripted_writes: Mutex<VecDeque<Result<BlobId, BackendError>>>,
    scripted_reads: Mutex<VecDeque<Result<Vec<u8>, BackendError>>>,
    store: Mutex<HashMap<BlobId, Vec<u8>>>,
    write_calls: AtomicU32,
    read_calls: AtomicU32,
    resets: AtomicU32,
    next_id: AtomicU32,
}

impl StubBackend {
    /// Creates a healthy backend with no scripted outcomes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the outcome of the next unconsumed write call.
    pub fn push_write(&self, outcome: Result<BlobId, BackendError>) {
        self.scripted_writes
            .lock()
            .expect("stub lock is never poisoned")
            .push_back(outcome);
    }

    /// Queues the outcome of the next unconsumed read call.
    pub fn push_read(&self, outcome: Result<Vec<u8>, BackendError>) {
        self.scripted_reads
            .lock()
            .expect("stub lock is never poisoned")
            .push_back(outcome);
    }

    /// The number of write calls performed.
    pub fn write_calls(&self) -> u32 {
        self.write_calls.load(Ordering::SeqCst)
    }

    /// The number of read calls performed.
    pub fn read_calls(&self) -> u32 {
        self.read_calls.load(Ordering::SeqCst)
    }

    /// The number of connection resets performed.
    pub fn resets(&self) -> u32 {
        self.resets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageBackend for StubBackend {
    async fn write_blob(
        &self,
        blob: &[u8],
        _durability: &DurabilityParams,
    ) -> Result<BlobId, BackendError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(outcome) = self
            .scripted_writes
            .lock()
            .expect("stub lock is never poisoned")
            .pop_front()
        {
            return outcome;
        }

        let blob_id: BlobId =
            format!("stub-blob-{}", self.next_id.fetch_add(1, Ordering::SeqCst)).into();
        self.store
            .lock()
            .expect("stub lock is never poisoned")
            .insert(blob_id.clone(), blob.to_vec());
        Ok(blob_id)
    }

    async fn read_blob(&self, blob_id: &BlobId) -> Result<Vec<u8>, BackendError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(outcome) = self
            .scripted_reads
            .lock()
            .expect("stub lock is never poisoned")
            .pop_front()
        {
            return outcome;
        }

        self.store
            .lock()
            .expect("stub lock is never poisoned")
            .get(blob_id)
            .cloned()
            .ok_or_else(BackendError::not_found)
    }

    async fn reset(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}
