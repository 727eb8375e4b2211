// Copyright (c) Walrus Foundation
// SPDX-License-Identifier: Apache-2.0

//! Output conventions shared by the CLI commands.

use anyhow::Result;
use colored::{ColoredString, Colorize};
use serde::Serialize;

/// The string used to mark successful operations in human-readable output.
pub fn success() -> ColoredString {
    "Success:".bold().green()
}

/// The string used to mark warnings in human-readable output.
pub fn warning() -> ColoredString {
    "Warning:".bold().yellow()
}

/// A command output printable either for humans or as a single JSON line.
pub trait CliOutput: Serialize {
    /// Prints the output in human-readable form.
    fn print_cli_output(&self);

    /// Prints the output, as JSON if `json` is set.
    fn print_output(&self, json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string(self)?);
        } else {
            self.print_cli_output();
        }
        Ok(())
    }
}
