//! # Key Mapper
//!
//! Edge-triggered translation of controller state into discrete key events.
//!
//! On every update the mapper computes the full set of keys that *should*
//! be held for the new state and diffs it against the keys currently held:
//! each key leaving the set gets exactly one release, each key entering it
//! exactly one press. Feeding the same state twice emits nothing the second
//! time ("idempotent convergence").
//!
//! ## Usage
//!
//! ```
//! use switch2_bridge::controller::state::ControllerState;
//! use switch2_bridge::keymap::bindings::KeyBindings;
//! use switch2_bridge::keymap::mapper::{KeyEvent, KeyMapper};
//! use switch2_bridge::keymap::keys::VirtualKey;
//!
//! let mut mapper = KeyMapper::new(KeyBindings::default(), 0.5).unwrap();
//!
//! let mut state = ControllerState::default();
//! state.a = true;
//! assert_eq!(
//!     mapper.update(&state),
//!     vec![KeyEvent::Press(VirtualKey::Char('z'))]
//! );
//!
//! // Same state again: nothing to do
//! assert!(mapper.update(&state).is_empty());
//! ```

use std::collections::BTreeSet;

use serde::de::Error;

use super::bindings::KeyBindings;
use super::keys::VirtualKey;
use crate::controller::state::ControllerState;
use crate::error::{Result, Switch2BridgeError};

/// Default hysteresis threshold for deriving stick directions.
pub const DEFAULT_STICK_THRESHOLD: f32 = 0.5;

/// A single key transition to forward to an output sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyEvent {
    /// The key went down.
    Press(VirtualKey),
    /// The key went up.
    Release(VirtualKey),
}

impl KeyEvent {
    /// The key this event refers to.
    #[must_use]
    pub fn key(&self) -> VirtualKey {
        match self {
            Self::Press(key) | Self::Release(key) => *key,
        }
    }
}

/// Stateful controller-state → key-event translator.
///
/// Owns the set of currently held virtual keys and the last applied state.
/// Both are mutated only by [`update`](KeyMapper::update) and
/// [`release_all`](KeyMapper::release_all).
///
/// # Thread Safety
///
/// `KeyMapper` is not thread-safe; callers must serialize updates (one
/// in-flight decode+update at a time).
#[derive(Debug)]
pub struct KeyMapper {
    bindings: KeyBindings,
    threshold: f32,
    held: BTreeSet<VirtualKey>,
    last_state: Option<ControllerState>,
}

impl KeyMapper {
    /// Creates a mapper from a binding table and stick threshold.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the bindings are incomplete or
    /// non-injective, or if the threshold is outside `(0.0, 1.0)`. Both are
    /// fatal setup errors caught here so they can never surface per-frame.
    pub fn new(bindings: KeyBindings, threshold: f32) -> Result<Self> {
        bindings.validate()?;

        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(Switch2BridgeError::Config(toml::de::Error::custom(
                format!("stick threshold must be within (0.0, 1.0), got {}", threshold),
            )));
        }

        Ok(Self {
            bindings,
            threshold,
            held: BTreeSet::new(),
            last_state: None,
        })
    }

    /// Converges the held-key set to match `state`.
    ///
    /// Returns the exact transitions needed: one `Release` per key no
    /// longer wanted, then one `Press` per newly wanted key, each group in
    /// key order. A key already in its desired state produces no event.
    pub fn update(&mut self, state: &ControllerState) -> Vec<KeyEvent> {
        let desired: BTreeSet<VirtualKey> = self
            .bindings
            .iter()
            .filter(|(control, _)| control.is_held(state, self.threshold))
            .map(|(_, key)| key)
            .collect();

        let mut events: Vec<KeyEvent> = self
            .held
            .difference(&desired)
            .map(|&key| KeyEvent::Release(key))
            .collect();
        events.extend(desired.difference(&self.held).map(|&key| KeyEvent::Press(key)));

        self.held = desired;
        self.last_state = Some(state.clone());

        events
    }

    /// Releases every currently held key and clears the held set.
    ///
    /// Callable at any time; a no-op when nothing is held. Callers must
    /// invoke this when the transport disconnects or the mapper is torn
    /// down, otherwise virtual keys stay stuck in the held state.
    pub fn release_all(&mut self) -> Vec<KeyEvent> {
        let events = self.held.iter().map(|&key| KeyEvent::Release(key)).collect();
        self.held.clear();
        events
    }

    /// The currently held virtual keys, in key order.
    #[must_use]
    pub fn held_keys(&self) -> Vec<VirtualKey> {
        self.held.iter().copied().collect()
    }

    /// The last state applied via [`update`](KeyMapper::update), if any.
    #[must_use]
    pub fn last_state(&self) -> Option<&ControllerState> {
        self.last_state.as_ref()
    }
}
