//! # Transport Module
//!
//! Delivery seam for raw input report buffers.
//!
//! Device discovery, connection lifecycle and notification subscription
//! live outside this crate; whatever owns the wireless link forwards each
//! received report buffer into a [`ChannelSource`], and the bridge loop
//! consumes them one at a time. Draining a single channel receiver also
//! serializes decode+update, which the key mapper requires.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

/// Source of raw input report buffers.
///
/// `next_report` resolves once per delivered report; `None` means the
/// transport has closed and no further reports will arrive. Callers must
/// release all held keys when that happens.
#[async_trait]
pub trait ReportSource: Send {
    /// Wait for the next report buffer.
    async fn next_report(&mut self) -> Option<Bytes>;
}

/// Channel-backed report source.
///
/// The sending half is handed to the transport glue (e.g. a BLE
/// notification callback); the receiving half feeds the bridge loop.
///
/// # Examples
///
/// ```
/// use switch2_bridge::transport::{ChannelSource, ReportSource};
/// use bytes::Bytes;
///
/// # tokio_test::block_on(async {
/// let (tx, mut source) = ChannelSource::channel(16);
/// tx.send(Bytes::from_static(&[0u8; 11])).await.unwrap();
///
/// let report = source.next_report().await.unwrap();
/// assert_eq!(report.len(), 11);
/// # });
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<Bytes>,
}

impl ChannelSource {
    /// Creates a bounded report channel and its source.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of reports buffered before the sender
    ///   waits; input reports are small and frequent, so a modest bound
    ///   keeps latency low without dropping frames.
    #[must_use]
    pub fn channel(capacity: usize) -> (mpsc::Sender<Bytes>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self { rx })
    }
}

#[async_trait]
impl ReportSource for ChannelSource {
    async fn next_report(&mut self) -> Option<Bytes> {
        self.rx.recv().await
    }
}
