// Copyright (c) Walrus Foundation
// SPDX-License-Identifier: Apache-2.0

//! Diagnostic integrity checks comparing uploaded and retrieved blob contents.
//!
//! These checks back the read-after-write verification path and the test suite. They are
//! diagnostics: a mismatch is reported, never raised as an error.

use serde::Serialize;

/// The number of leading bytes compared verbatim between the uploaded and retrieved blobs.
pub const PREFIX_CHECK_LEN: usize = 64;

/// The result of comparing an uploaded blob with the bytes retrieved for its ID.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    /// The byte length of the uploaded blob.
    pub expected_len: u64,
    /// The byte length of the retrieved blob.
    pub actual_len: u64,
    /// Whether the first [`PREFIX_CHECK_LEN`] bytes match.
    pub prefix_matches: bool,
    /// Whether the additive checksums match.
    pub checksum_matches: bool,
}

impl IntegrityReport {
    /// Returns true if all checks passed.
    pub fn is_match(&self) -> bool {
        self.expected_len == self.actual_len && self.prefix_matches && self.checksum_matches
    }
}

/// Compares `uploaded` and `retrieved`, returning a report of the individual checks.
pub fn verify(uploaded: &[u8], retrieved: &[u8]) -> IntegrityReport {
    let prefix = uploaded.len().min(retrieved.len()).min(PREFIX_CHECK_LEN);
    let report = IntegrityReport {
        expected_len: uploaded.len() as u64,
        actual_len: retrieved.len() as u64,
        prefix_matches: uploaded[..prefix] == retrieved[..prefix],
        checksum_matches: additive_checksum(uploaded) == additive_checksum(retrieved),
    };
    if !report.is_match() {
        tracing::warn!(
            expected_len = report.expected_len,
            actual_len = report.actual_len,
            prefix_matches = report.prefix_matches,
            checksum_matches = report.checksum_matches,
            "retrieved blob does not match the uploaded content"
        );
    }
    report
}

/// Computes a simple additive checksum: the wrapping sum of all byte values.
pub fn additive_checksum(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0u64, |sum, byte| sum.wrapping_add(u64::from(*byte)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_blobs_match() {
        let blob = vec![1, 2, 3, 4, 5];
        let report = verify(&blob, &blob);
        assert!(report.is_match());
        assert_eq!(report.expected_len, 5);
        assert_eq!(report.actual_len, 5);
    }

    #[test]
    fn length_mismatch_is_detected() {
        let report = verify(&[1, 2, 3], &[1, 2, 3, 0]);
        assert!(!report.is_match());
        assert!(report.prefix_matches);
    }

    #[test]
    fn corruption_within_the_prefix_is_detected() {
        let uploaded = vec![0u8; 128];
        let mut retrieved = uploaded.clone();
        retrieved[10] = 7;
        let report = verify(&uploaded, &retrieved);
        assert!(!report.prefix_matches);
        assert!(!report.checksum_matches);
    }

    #[test]
    fn corruption_past_the_prefix_is_caught_by_the_checksum() {
        let uploaded = vec![0u8; 128];
        let mut retrieved = uploaded.clone();
        retrieved[100] = 7;
        let report = verify(&uploaded, &retrieved);
        assert!(report.prefix_matches);
        assert!(!report.checksum_matches);
        assert!(!report.is_match());
    }

    #[test]
    fn empty_blobs_match() {
        assert!(verify(&[], &[]).is_match());
    }

    #[test]
    fn checksum_wraps_instead_of_overflowing() {
        // Large enough that a non-wrapping u8/u32 sum would be wrong, small enough for a test.
        let blob = vec![0xFFu8; 1 << 20];
        assert_eq!(additive_checksum(&blob), 255 * (1u64 << 20));
    }
}
