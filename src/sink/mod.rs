//! # Output Sink Module
//!
//! The key-injection seam between the mapper and the host system.
//!
//! The bridge decides *which* key events to emit; an [`OutputSink`]
//! performs the actual injection. The production implementation is
//! [`UinputSink`], a Linux uinput virtual keyboard; tests substitute a
//! recording double, so no real injection is needed to verify event
//! sequences.

use std::collections::BTreeMap;
use std::io;

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, EventType, InputEvent, Key};
use serde::de::Error;
use tracing::info;

use crate::error::{Result, Switch2BridgeError};
use crate::keymap::keys::VirtualKey;

/// Name under which the virtual keyboard registers with the kernel.
pub const VIRTUAL_DEVICE_NAME: &str = "switch2-bridge virtual keyboard";

/// Consumer of key press/release events.
///
/// Implementations need no deduplication of their own: the mapper already
/// guarantees at most one transition per key per update, so a sink only
/// ever sees well-formed press/release pairs.
#[cfg_attr(test, mockall::automock)]
pub trait OutputSink: Send {
    /// Inject a key press.
    fn press(&mut self, key: VirtualKey) -> io::Result<()>;

    /// Inject a key release.
    fn release(&mut self, key: VirtualKey) -> io::Result<()>;
}

/// Maps a virtual key to its Linux input event code.
///
/// Returns `None` for keys that have no uinput equivalent; such keys are
/// rejected when the sink is constructed, never per-frame.
#[must_use]
pub fn uinput_key(key: VirtualKey) -> Option<Key> {
    let mapped = match key {
        VirtualKey::Up => Key::KEY_UP,
        VirtualKey::Down => Key::KEY_DOWN,
        VirtualKey::Left => Key::KEY_LEFT,
        VirtualKey::Right => Key::KEY_RIGHT,
        VirtualKey::Space => Key::KEY_SPACE,
        VirtualKey::Enter => Key::KEY_ENTER,
        VirtualKey::Escape => Key::KEY_ESC,
        VirtualKey::Tab => Key::KEY_TAB,
        VirtualKey::Backspace => Key::KEY_BACKSPACE,
        VirtualKey::Char(c) => match c {
            'a' => Key::KEY_A,
            'b' => Key::KEY_B,
            'c' => Key::KEY_C,
            'd' => Key::KEY_D,
            'e' => Key::KEY_E,
            'f' => Key::KEY_F,
            'g' => Key::KEY_G,
            'h' => Key::KEY_H,
            'i' => Key::KEY_I,
            'j' => Key::KEY_J,
            'k' => Key::KEY_K,
            'l' => Key::KEY_L,
            'm' => Key::KEY_M,
            'n' => Key::KEY_N,
            'o' => Key::KEY_O,
            'p' => Key::KEY_P,
            'q' => Key::KEY_Q,
            'r' => Key::KEY_R,
            's' => Key::KEY_S,
            't' => Key::KEY_T,
            'u' => Key::KEY_U,
            'v' => Key::KEY_V,
            'w' => Key::KEY_W,
            'x' => Key::KEY_X,
            'y' => Key::KEY_Y,
            'z' => Key::KEY_Z,
            '0' => Key::KEY_0,
            '1' => Key::KEY_1,
            '2' => Key::KEY_2,
            '3' => Key::KEY_3,
            '4' => Key::KEY_4,
            '5' => Key::KEY_5,
            '6' => Key::KEY_6,
            '7' => Key::KEY_7,
            '8' => Key::KEY_8,
            '9' => Key::KEY_9,
            '-' => Key::KEY_MINUS,
            '=' => Key::KEY_EQUAL,
            ',' => Key::KEY_COMMA,
            '.' => Key::KEY_DOT,
            '/' => Key::KEY_SLASH,
            ';' => Key::KEY_SEMICOLON,
            '\'' => Key::KEY_APOSTROPHE,
            '[' => Key::KEY_LEFTBRACE,
            ']' => Key::KEY_RIGHTBRACE,
            '`' => Key::KEY_GRAVE,
            '\\' => Key::KEY_BACKSLASH,
            _ => return None,
        },
    };
    Some(mapped)
}

/// Linux uinput virtual keyboard sink.
///
/// Every key the bridge may ever emit is registered with the kernel at
/// construction time; a binding whose key cannot be represented is a fatal
/// configuration error.
pub struct UinputSink {
    device: VirtualDevice,
    codes: BTreeMap<VirtualKey, Key>,
}

impl std::fmt::Debug for UinputSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UinputSink")
            .field("codes", &self.codes.len())
            .finish_non_exhaustive()
    }
}

impl UinputSink {
    /// Creates a virtual keyboard registering exactly `keys`.
    ///
    /// # Arguments
    ///
    /// * `keys` - The virtual keys the bridge may emit, typically
    ///   [`KeyBindings::bound_keys`](crate::keymap::bindings::KeyBindings::bound_keys)
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any key has no uinput equivalent,
    /// or an I/O error if the uinput device cannot be created (typically
    /// missing permissions on `/dev/uinput`).
    pub fn new(keys: &[VirtualKey]) -> Result<Self> {
        let mut codes = BTreeMap::new();
        let mut key_set = AttributeSet::<Key>::new();

        for &key in keys {
            let code = uinput_key(key).ok_or_else(|| {
                Switch2BridgeError::Config(toml::de::Error::custom(format!(
                    "key '{}' cannot be injected via uinput",
                    key
                )))
            })?;
            codes.insert(key, code);
            key_set.insert(code);
        }

        let device = VirtualDeviceBuilder::new()?
            .name(VIRTUAL_DEVICE_NAME)
            .with_keys(&key_set)?
            .build()?;

        info!(
            "Created uinput virtual keyboard with {} registered keys",
            codes.len()
        );

        Ok(Self { device, codes })
    }

    fn emit(&mut self, key: VirtualKey, value: i32) -> io::Result<()> {
        let code = self.codes.get(&key).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("key '{}' was not registered with the sink", key),
            )
        })?;

        self.device
            .emit(&[InputEvent::new(EventType::KEY, code.code(), value)])
    }
}

impl OutputSink for UinputSink {
    fn press(&mut self, key: VirtualKey) -> io::Result<()> {
        self.emit(key, 1)
    }

    fn release(&mut self, key: VirtualKey) -> io::Result<()> {
        self.emit(key, 0)
    }
}
