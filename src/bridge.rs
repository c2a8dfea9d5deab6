//! # Bridge Module
//!
//! Per-report pipeline tying the decoder, tracker, mapper and output sink
//! together: one incoming buffer is decoded, the tracked state replaced,
//! the key diff computed and forwarded to the sink, all synchronously and
//! run-to-completion. Reports that decode to unchanged produce no events.

use tracing::{debug, info, trace};

use crate::controller::decoder::describe_report;
use crate::controller::state::ControllerState;
use crate::controller::tracker::{ReportTracker, StateObserver};
use crate::error::Result;
use crate::keymap::bindings::KeyBindings;
use crate::keymap::mapper::{KeyEvent, KeyMapper};
use crate::sink::OutputSink;

/// Controller-to-keyboard bridge.
///
/// # Examples
///
/// Driving the bridge with a test sink:
///
/// ```
/// use switch2_bridge::bridge::Bridge;
/// use switch2_bridge::keymap::bindings::KeyBindings;
/// use switch2_bridge::keymap::keys::VirtualKey;
/// use std::io;
///
/// struct NullSink;
///
/// impl switch2_bridge::sink::OutputSink for NullSink {
///     fn press(&mut self, _key: VirtualKey) -> io::Result<()> { Ok(()) }
///     fn release(&mut self, _key: VirtualKey) -> io::Result<()> { Ok(()) }
/// }
///
/// let mut bridge = Bridge::new(KeyBindings::default(), 0.5, NullSink).unwrap();
///
/// // A pressed, sticks centered
/// let report = [0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x08, 0x80, 0x00, 0x08, 0x80];
/// bridge.handle_report(&report).unwrap();
/// assert!(bridge.state().a);
///
/// bridge.shutdown().unwrap();
/// ```
pub struct Bridge<S: OutputSink> {
    tracker: ReportTracker,
    mapper: KeyMapper,
    sink: S,
}

impl<S: OutputSink> std::fmt::Debug for Bridge<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("tracker", &self.tracker)
            .field("mapper", &self.mapper)
            .finish_non_exhaustive()
    }
}

impl<S: OutputSink> Bridge<S> {
    /// Creates a bridge from a binding table, stick threshold and sink.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the bindings or threshold are
    /// invalid (see [`KeyMapper::new`]).
    pub fn new(bindings: KeyBindings, threshold: f32, sink: S) -> Result<Self> {
        Ok(Self {
            tracker: ReportTracker::new(),
            mapper: KeyMapper::new(bindings, threshold)?,
            sink,
        })
    }

    /// Creates a bridge that additionally notifies `observer` once per
    /// successfully decoded report, before key events are emitted.
    pub fn with_observer(
        bindings: KeyBindings,
        threshold: f32,
        sink: S,
        observer: StateObserver,
    ) -> Result<Self> {
        Ok(Self {
            tracker: ReportTracker::with_observer(observer),
            mapper: KeyMapper::new(bindings, threshold)?,
            sink,
        })
    }

    /// Processes one incoming report buffer.
    ///
    /// Short buffers are ignored without emitting anything (the previous
    /// state stays in effect). For decoded reports, the key diff against
    /// the held set is forwarded to the sink: releases first, then
    /// presses.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the sink rejects an injection. The held-key
    /// bookkeeping has already advanced at that point; callers that keep
    /// running should treat sink failures as a reason to reconnect the
    /// sink rather than to retry single events.
    pub fn handle_report(&mut self, data: &[u8]) -> Result<()> {
        if tracing::enabled!(tracing::Level::TRACE) {
            if let Some(summary) = describe_report(data) {
                trace!("{}", summary);
            }
        }

        if !self.tracker.process_report(data) {
            return Ok(());
        }

        let events = self.mapper.update(self.tracker.state());
        if !events.is_empty() {
            debug!(
                "{} key transitions, held: [{}]",
                events.len(),
                self.tracker.state().pressed_labels().join(",")
            );
        }

        self.dispatch(&events)
    }

    /// Releases every held key through the sink and clears the held set.
    ///
    /// Must be called when the transport disconnects or before the bridge
    /// is discarded; skipping it leaves virtual keys stuck in the held
    /// state indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the sink rejects a release.
    pub fn shutdown(&mut self) -> Result<()> {
        let events = self.mapper.release_all();
        if !events.is_empty() {
            info!("Releasing {} held keys", events.len());
        }
        self.dispatch(&events)
    }

    fn dispatch(&mut self, events: &[KeyEvent]) -> Result<()> {
        for event in events {
            match event {
                KeyEvent::Press(key) => self.sink.press(*key)?,
                KeyEvent::Release(key) => self.sink.release(*key)?,
            }
        }
        Ok(())
    }

    /// The last-known-good controller state.
    #[must_use]
    pub fn state(&self) -> &ControllerState {
        self.tracker.state()
    }

    /// Number of successfully decoded reports so far.
    #[must_use]
    pub fn packet_count(&self) -> u64 {
        self.tracker.packet_count()
    }
}
