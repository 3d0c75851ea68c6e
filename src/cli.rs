//! Command line interface for the `rtcm3-dump` demo binary.
//!
//! Grounded on the `Cli` accessor-method style `nav-solutions-ubx2rinex`
//! builds around `clap` (`cli.serial_port()`, `cli.rinex_settings()`).

use clap::Parser;
use hifitime::Epoch;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Parser)]
#[command(author, version, about = "RTCM v3 frame scanner and decoder")]
pub struct Cli {
    /// Approximate current UTC time, used to seed the epoch
    /// reconstructor's per-constellation week anchors. Accepts
    /// `YYYY-MM-DD` or full RFC3339. Defaults to the system clock.
    start_date: Option<String>,

    /// Input file to read RTCM bytes from. Defaults to stdin.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file to render decoded messages to. Defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    pub fn start_date(&self) -> Epoch {
        match &self.start_date {
            Some(s) => parse_start_date(s).unwrap_or_else(|e| panic!("invalid start-date {s:?}: {e}")),
            None => Epoch::now().unwrap_or_else(|e| panic!("failed to read system clock: {e}")),
        }
    }

    pub fn input(&self) -> Option<&Path> {
        self.input.as_deref()
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

fn parse_start_date(s: &str) -> std::result::Result<Epoch, String> {
    Epoch::from_str(s)
        .or_else(|_| Epoch::from_str(&format!("{s}T00:00:00Z")))
        .map_err(|e| e.to_string())
}
