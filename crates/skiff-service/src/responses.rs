// Copyright (c) Walrus Foundation
// SPDX-License-Identifier: Apache-2.0

//! Output types for the CLI commands.

use std::path::PathBuf;

use serde::Serialize;
use serde_with::{DisplayFromStr, base64::Base64, serde_as};
use skiff_core::{BlobId, integrity::IntegrityReport};

use crate::cli::{CliOutput, success, warning};

/// The output of the `upload` command.
#[serde_as]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutput {
    /// The file that was uploaded.
    pub file: PathBuf,
    /// The blob ID assigned by the network.
    #[serde_as(as = "DisplayFromStr")]
    pub blob_id: BlobId,
    /// The size of the uploaded blob (in bytes).
    pub unencoded_size: u64,
    /// The read-back integrity check, when requested with `--verify`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrity: Option<IntegrityReport>,
}

impl CliOutput for UploadOutput {
    fn print_cli_output(&self) {
        println!(
            "{} blob stored successfully.\
            \nPath: {}\
            \nBlob ID: {}\
            \nUnencoded size: {} B",
            success(),
            self.file.display(),
            self.blob_id,
            self.unencoded_size,
        );
        match &self.integrity {
            Some(report) if report.is_match() => {
                println!("Verification: retrieved content matches the upload.");
            }
            Some(_) => {
                println!(
                    "{} retrieved content does not match the upload; \
                    see the logs for details.",
                    warning()
                );
            }
            None => (),
        }
    }
}

/// The output of the `download` command.
#[serde_as]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) out: Option<PathBuf>,
    #[serde_as(as = "DisplayFromStr")]
    pub(crate) blob_id: BlobId,
    // When serializing to JSON, the blob is encoded as a Base64 string.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde_as(as = "Base64")]
    pub(crate) blob: Vec<u8>,
}

impl ReadOutput {
    /// Creates a new [`ReadOutput`] object.
    pub fn new(out: Option<PathBuf>, blob_id: BlobId, orig_blob: Vec<u8>) -> Self {
        // Avoid serializing the blob if there is an output file.
        let blob = if out.is_some() { vec![] } else { orig_blob };
        Self { out, blob_id, blob }
    }
}

impl CliOutput for ReadOutput {
    fn print_cli_output(&self) {
        match &self.out {
            Some(out) => println!(
                "{} blob retrieved.\
                \nBlob ID: {}\
                \nFile saved to: {}",
                success(),
                self.blob_id,
                out.display(),
            ),
            None => println!(
                "{} blob {} retrieved ({} B).",
                success(),
                self.blob_id,
                self.blob.len(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_output_serializes_camel_case() {
        let output = UploadOutput {
            file: PathBuf::from("art.png"),
            blob_id: "efqm3QcVX0k8tUMwh9HnRTCkI3HLO_IvYgeDOMqgRWo"
                .parse()
                .expect("non-empty"),
            unencoded_size: 17,
            integrity: None,
        };
        let json = serde_json::to_value(&output).expect("serializable");
        assert_eq!(json["file"], "art.png");
        assert_eq!(
            json["blobId"],
            "efqm3QcVX0k8tUMwh9HnRTCkI3HLO_IvYgeDOMqgRWo"
        );
        assert_eq!(json["unencodedSize"], 17);
        assert!(json.get("integrity").is_none());
    }

    #[test]
    fn read_output_skips_the_blob_when_written_to_a_file() {
        let blob_id: BlobId = "some-blob".parse().expect("non-empty");
        let to_file = ReadOutput::new(
            Some(PathBuf::from("out.bin")),
            blob_id.clone(),
            b"content".to_vec(),
        );
        let json = serde_json::to_value(&to_file).expect("serializable");
        assert!(json.get("blob").is_none());
        assert_eq!(json["out"], "out.bin");

        let inline = ReadOutput::new(None, blob_id, b"content".to_vec());
        let json = serde_json::to_value(&inline).expect("serializable");
        // "content" in Base64.
        assert_eq!(json["blob"], "Y29udGVudA==");
        assert!(json.get("out").is_none());
    }
}
