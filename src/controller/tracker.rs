//! # Report Tracker
//!
//! Maintains the last-known-good [`ControllerState`] across incoming
//! reports and notifies an observer once per successfully decoded report.
//!
//! Malformed (too short) reports leave the tracked state untouched: there
//! is no "invalid" sentinel state distinct from the last-known-good one.
//!
//! ## Usage
//!
//! ```
//! use switch2_bridge::controller::tracker::ReportTracker;
//!
//! let mut tracker = ReportTracker::new();
//! let report = [0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x08, 0x80, 0x00, 0x08, 0x80];
//!
//! assert!(tracker.process_report(&report));
//! assert!(tracker.state().a);
//! assert_eq!(tracker.packet_count(), 1);
//! ```

use tracing::trace;

use super::decoder::decode_report;
use super::state::ControllerState;

/// State-change observer invoked synchronously from within
/// [`ReportTracker::process_report`], once per decoded report.
pub type StateObserver = Box<dyn FnMut(&ControllerState) + Send>;

/// Tracks the latest decoded controller state.
///
/// The tracker owns its state exclusively; callers read it through
/// [`state()`](ReportTracker::state) or take an owned copy via
/// [`state_snapshot()`](ReportTracker::state_snapshot).
///
/// # Thread Safety
///
/// `ReportTracker` is not thread-safe. Process reports from a single
/// task/thread only.
pub struct ReportTracker {
    state: ControllerState,
    packet_count: u64,
    observer: Option<StateObserver>,
}

impl std::fmt::Debug for ReportTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportTracker")
            .field("state", &self.state)
            .field("packet_count", &self.packet_count)
            .finish_non_exhaustive()
    }
}

impl Default for ReportTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportTracker {
    /// Creates a tracker with default (centered/released) state and no
    /// observer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ControllerState::default(),
            packet_count: 0,
            observer: None,
        }
    }

    /// Creates a tracker that invokes `observer` once per successfully
    /// decoded report.
    ///
    /// The observer is registered at construction and called synchronously
    /// from [`process_report`](ReportTracker::process_report); it is never
    /// called for reports that decode to unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use switch2_bridge::controller::tracker::ReportTracker;
    ///
    /// let mut tracker = ReportTracker::with_observer(Box::new(|state| {
    ///     if state.a {
    ///         println!("A pressed!");
    ///     }
    /// }));
    /// # let _ = &mut tracker;
    /// ```
    #[must_use]
    pub fn with_observer(observer: StateObserver) -> Self {
        Self {
            state: ControllerState::default(),
            packet_count: 0,
            observer: Some(observer),
        }
    }

    /// Decodes a report and, on success, replaces the tracked state.
    ///
    /// Returns `true` when the report decoded and the state was replaced
    /// (the observer, if any, has already run). Returns `false` for short
    /// buffers: the previous state is retained unchanged and the observer
    /// is not invoked. Short buffers are a normal, expected condition and
    /// are never surfaced as errors.
    pub fn process_report(&mut self, data: &[u8]) -> bool {
        let Some(state) = decode_report(data) else {
            trace!("Ignoring short report ({} bytes)", data.len());
            return false;
        };

        self.state = state;
        self.packet_count += 1;

        if let Some(observer) = self.observer.as_mut() {
            observer(&self.state);
        }

        true
    }

    /// Returns a reference to the last-known-good controller state.
    #[must_use]
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Returns an owned copy of the last-known-good controller state.
    #[must_use]
    pub fn state_snapshot(&self) -> ControllerState {
        self.state.clone()
    }

    /// Number of successfully decoded reports so far.
    #[must_use]
    pub fn packet_count(&self) -> u64 {
        self.packet_count
    }

    /// Resets the tracked state to default and zeroes the packet counter.
    ///
    /// Useful when reconnecting a controller.
    pub fn reset(&mut self) {
        self.state = ControllerState::default();
        self.packet_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::decoder::btn1;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn report_with_btn1(b1: u8) -> [u8; 11] {
        [0x00, 0x00, b1, 0x00, 0x00, 0x00, 0x08, 0x80, 0x00, 0x08, 0x80]
    }

    // ==================== Tracking Tests ====================

    #[test]
    fn test_new_tracker_is_default_state() {
        let tracker = ReportTracker::new();
        assert_eq!(*tracker.state(), ControllerState::default());
        assert_eq!(tracker.packet_count(), 0);
    }

    #[test]
    fn test_process_report_replaces_state() {
        let mut tracker = ReportTracker::new();

        assert!(tracker.process_report(&report_with_btn1(btn1::A)));
        assert!(tracker.state().a);

        assert!(tracker.process_report(&report_with_btn1(0)));
        assert!(!tracker.state().a);
        assert_eq!(tracker.packet_count(), 2);
    }

    #[test]
    fn test_short_report_retains_previous_state() {
        let mut tracker = ReportTracker::new();
        tracker.process_report(&report_with_btn1(btn1::A));

        assert!(!tracker.process_report(&[0u8; 4]));
        assert!(tracker.state().a, "Short report must not disturb state");
        assert_eq!(tracker.packet_count(), 1);
    }

    #[test]
    fn test_state_snapshot_is_owned_copy() {
        let mut tracker = ReportTracker::new();
        tracker.process_report(&report_with_btn1(btn1::B));

        let snapshot = tracker.state_snapshot();
        tracker.process_report(&report_with_btn1(0));

        assert!(snapshot.b, "Snapshot must not change with later reports");
        assert!(!tracker.state().b);
    }

    #[test]
    fn test_reset() {
        let mut tracker = ReportTracker::new();
        tracker.process_report(&report_with_btn1(btn1::A));

        tracker.reset();
        assert_eq!(*tracker.state(), ControllerState::default());
        assert_eq!(tracker.packet_count(), 0);
    }

    // ==================== Observer Tests ====================

    #[test]
    fn test_observer_fires_once_per_decoded_report() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_observer = Arc::clone(&calls);

        let mut tracker = ReportTracker::with_observer(Box::new(move |_| {
            calls_in_observer.fetch_add(1, Ordering::SeqCst);
        }));

        tracker.process_report(&report_with_btn1(btn1::A));
        tracker.process_report(&report_with_btn1(0));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_observer_not_fired_on_short_report() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_observer = Arc::clone(&calls);

        let mut tracker = ReportTracker::with_observer(Box::new(move |_| {
            calls_in_observer.fetch_add(1, Ordering::SeqCst);
        }));

        tracker.process_report(&[0u8; 10]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_observer_sees_decoded_state() {
        let saw_a = Arc::new(AtomicUsize::new(0));
        let saw_a_in_observer = Arc::clone(&saw_a);

        let mut tracker = ReportTracker::with_observer(Box::new(move |state| {
            if state.a {
                saw_a_in_observer.fetch_add(1, Ordering::SeqCst);
            }
        }));

        tracker.process_report(&report_with_btn1(btn1::A));
        assert_eq!(saw_a.load(Ordering::SeqCst), 1);
    }
}
