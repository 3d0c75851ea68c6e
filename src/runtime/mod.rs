//! Tokio task wiring: a [ByteProducer] reads chunks onto a bounded
//! channel, a blocking scan task turns them into [Message]s over a
//! second bounded channel, and the async consumer rings them (spec
//! §5, §4.10).
//!
//! Grounded on the producer/collector task split UBX2RINEX builds
//! around its `obs_tx`/`nav_tx` channels and a `shutdown` watch
//! channel (`nav-solutions-ubx2rinex/src/main.rs`); [Scanner] itself
//! is a synchronous [Iterator], so it runs on a blocking task fed by a
//! [PushbackSource] adapter rather than an async one. Both channels
//! are bounded, so a full downstream queue makes `send().await` (or
//! `blocking_send`) suspend the sender, giving the producer real
//! backpressure per spec §5.

pub mod logging;

use crate::epoch::EpochReconstructor;
use crate::message::{self, Message};
use crate::ring::RecentMessageRing;
use crate::scanner::{ByteSource, ScanEvent, Scanner};
use hifitime::Epoch;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::{mpsc, watch};

/// Capacity of the producer -> scan task chunk channel.
const CHUNK_CHANNEL_CAPACITY: usize = 16;
/// Capacity of the scan task -> consumer message channel.
const MESSAGE_CHANNEL_CAPACITY: usize = 64;
/// Bytes read per [ByteProducer::next_chunk] call.
const READ_CHUNK_SIZE: usize = 4096;

/// Anything that can hand back chunks of input bytes, one `Vec<u8>` at
/// a time, signalling end of stream with `None`. Boxed as a trait
/// object so [Pipeline::run] isn't tied to one concrete reader type.
pub trait ByteProducer: Send {
    fn next_chunk(&mut self) -> Pin<Box<dyn Future<Output = Option<Vec<u8>>> + Send + '_>>;
}

/// [ByteProducer] over any [AsyncRead], e.g. a file or stdin.
struct AsyncReaderProducer<R> {
    reader: R,
}

impl<R: AsyncRead + Unpin + Send> ByteProducer for AsyncReaderProducer<R> {
    fn next_chunk(&mut self) -> Pin<Box<dyn Future<Output = Option<Vec<u8>>> + Send + '_>> {
        Box::pin(async move {
            let mut buffer = vec![0u8; READ_CHUNK_SIZE];
            match self.reader.read(&mut buffer).await {
                Ok(0) | Err(_) => None,
                Ok(n) => {
                    buffer.truncate(n);
                    Some(buffer)
                }
            }
        })
    }
}

/// Adapts a chunk channel's receiver into a byte-at-a-time
/// [ByteSource] for [Scanner], draining each chunk before blocking on
/// the next one.
struct PushbackSource {
    rx: mpsc::Receiver<Vec<u8>>,
    current: VecDeque<u8>,
}

impl PushbackSource {
    fn new(rx: mpsc::Receiver<Vec<u8>>) -> Self {
        Self {
            rx,
            current: VecDeque::new(),
        }
    }
}

impl ByteSource for PushbackSource {
    fn next_byte(&mut self) -> Option<u8> {
        loop {
            if let Some(byte) = self.current.pop_front() {
                return Some(byte);
            }
            match self.rx.blocking_recv() {
                Some(chunk) => self.current.extend(chunk),
                None => return None,
            }
        }
    }
}

/// Drives a byte stream through the scanner and classifier, filling a
/// shared [RecentMessageRing].
pub struct Pipeline {
    pub ring: RecentMessageRing,
}

impl Pipeline {
    pub fn new(ring_capacity: usize) -> Self {
        Self {
            ring: RecentMessageRing::new(ring_capacity),
        }
    }

    /// Runs until `reader` hits EOF or `shutdown` is set to `false`.
    pub async fn run<R>(&self, reader: R, reference: Epoch, mut shutdown: watch::Receiver<bool>)
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (chunk_tx, chunk_rx) = mpsc::channel::<Vec<u8>>(CHUNK_CHANNEL_CAPACITY);
        let (message_tx, mut message_rx) = mpsc::channel::<Message>(MESSAGE_CHANNEL_CAPACITY);

        let mut producer: Box<dyn ByteProducer> = Box::new(AsyncReaderProducer { reader });
        let producer_task = tokio::spawn(async move {
            while let Some(chunk) = producer.next_chunk().await {
                if chunk_tx.send(chunk).await.is_err() {
                    break;
                }
            }
        });

        let scan_task = tokio::task::spawn_blocking(move || {
            let mut reconstructor = EpochReconstructor::new(reference);
            let source = PushbackSource::new(chunk_rx);
            for event in Scanner::new(source) {
                let mut msg = match event {
                    ScanEvent::Frame(bytes) => message::classify(&bytes),
                    ScanEvent::NonRtcm(bytes) => Message::non_rtcm(bytes),
                };
                message::timestamp(&mut reconstructor, &mut msg);
                if message_tx.blocking_send(msg).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                maybe_msg = message_rx.recv() => {
                    match maybe_msg {
                        Some(msg) => self.ring.insert(msg),
                        None => break,
                    }
                }
                _ = shutdown.changed() => {
                    if !*shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        let _ = producer_task.await;
        let _ = scan_task.await;
    }
}
