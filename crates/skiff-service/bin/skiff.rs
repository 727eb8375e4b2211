// Copyright (c) Walrus Foundation
// SPDX-License-Identifier: Apache-2.0

//! The skiff content-bridge client binary.

use anyhow::Result;
use clap::Parser;

use crate::{
    args::{App, Commands},
    runner::CommandRunner,
    utils::init_tracing_subscriber,
};

#[path = "skiff/args.rs"]
mod args;
#[path = "skiff/runner.rs"]
mod runner;
#[path = "skiff/utils.rs"]
mod utils;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing_subscriber()?;
    let app = App::parse();
    let runner = CommandRunner::new(&app.config, app.json);

    match app.command {
        Commands::Upload {
            file,
            epochs,
            verify,
        } => runner.upload(file, epochs, verify).await,

        Commands::Download { blob_id, out } => runner.download(blob_id, out).await,

        Commands::Daemon {
            bind_address,
            max_body_limit,
        } => runner.daemon(bind_address, max_body_limit).await,
    }
}
