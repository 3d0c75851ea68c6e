//! `env_logger` setup for the `rtcm3-dump` binary.
//!
//! Grounded on `nav-solutions-ubx2rinex/src/main.rs`'s logging setup:
//! `Builder::from_default_env()`, stdout target, second-precision
//! timestamps, module paths stripped from the output.

use env_logger::{Builder, Target};
use log::LevelFilter;

/// Initializes the global logger at `level`, honoring `RUST_LOG` if
/// set (`from_default_env` lets an explicit environment variable
/// override the CLI's `-v` count).
pub fn init(level: LevelFilter) {
    Builder::from_default_env()
        .target(Target::Stdout)
        .filter_level(level)
        .format_timestamp_secs()
        .format_module_path(false)
        .init();
}
