#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

/*
 * RTCM3 is part of the rtk-rs framework.
 * Authors: Guillaume W. Bres <guillaume.bressaix@gmail.com> et al,
 * This framework is shipped under Mozilla Public V2 license.
 */

extern crate gnss_rs as gnss;

pub mod bitreader;
pub mod crc24q;
pub mod epoch;
pub mod error;
pub mod message;
pub mod pushback;
pub mod render;
pub mod ring;
pub mod scanner;

#[cfg(feature = "runtime")]
pub mod cli;

#[cfg(feature = "runtime")]
pub mod runtime;

#[cfg(test)]
mod tests;

/// Re-exports of the types most callers need.
pub mod prelude {
    pub use crate::epoch::EpochReconstructor;
    pub use crate::error::{Error, Result};
    pub use crate::message::{classify, timestamp, Message, MessageBody, NON_RTCM};
    pub use crate::pushback::{ByteSource, Pushback};
    pub use crate::render::render_text;
    pub use crate::ring::RecentMessageRing;
    pub use crate::scanner::{ScanEvent, Scanner};

    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch};
}
