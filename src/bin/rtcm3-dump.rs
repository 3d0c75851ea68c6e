//! Demo CLI: scans a file (or stdin) for RTCM v3 frames, decodes what
//! it can, and dumps the most recent messages once the input is
//! exhausted.

use clap::Parser;
use log::info;
use rtcm3::cli::Cli;
use rtcm3::render::render_text;
use rtcm3::ring::DEFAULT_CAPACITY;
use rtcm3::runtime::{logging, Pipeline};
use std::fs::File;
use tokio::io::{stdin, BufReader};
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    logging::init(cli.log_level());

    let start = cli.start_date();
    info!("{start} - rtcm3-dump starting");

    let pipeline = Pipeline::new(DEFAULT_CAPACITY);
    let (_shutdown_tx, shutdown_rx) = watch::channel(true);

    match cli.input() {
        Some(path) => {
            let file = File::open(path).unwrap_or_else(|e| panic!("failed to open {path:?}: {e}"));
            pipeline
                .run(tokio::fs::File::from_std(file), start, shutdown_rx)
                .await;
        }
        None => {
            pipeline.run(BufReader::new(stdin()), start, shutdown_rx).await;
        }
    }

    for message in pipeline.ring.snapshot() {
        println!("{}", render_text(&message));
    }

    info!("rtcm3-dump done, {} message(s) retained", pipeline.ring.len());
}
