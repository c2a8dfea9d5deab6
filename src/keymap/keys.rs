//! # Virtual Key Identifiers
//!
//! Abstract key identifiers consumed by an output sink. A virtual key is a
//! discrete press/release signal that downstream software (e.g. an emulator
//! configured for keyboard input) interprets as a keyboard key.
//!
//! Keys are written in configuration as plain strings: a single character
//! (`"z"`, `"3"`) or a name for non-printables (`"up"`, `"space"`).

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// A virtual key identifier.
///
/// # Examples
///
/// ```
/// use switch2_bridge::keymap::keys::VirtualKey;
///
/// let key: VirtualKey = "z".parse().unwrap();
/// assert_eq!(key, VirtualKey::Char('z'));
///
/// let key: VirtualKey = "up".parse().unwrap();
/// assert_eq!(key, VirtualKey::Up);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VirtualKey {
    /// A printable character key (letters are lowercase).
    Char(char),
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Space bar.
    Space,
    /// Enter/Return.
    Enter,
    /// Escape.
    Escape,
    /// Tab.
    Tab,
    /// Backspace.
    Backspace,
}

impl FromStr for VirtualKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();

        match name.to_ascii_lowercase().as_str() {
            "up" => return Ok(Self::Up),
            "down" => return Ok(Self::Down),
            "left" => return Ok(Self::Left),
            "right" => return Ok(Self::Right),
            "space" => return Ok(Self::Space),
            "enter" | "return" => return Ok(Self::Enter),
            "escape" | "esc" => return Ok(Self::Escape),
            "tab" => return Ok(Self::Tab),
            "backspace" => return Ok(Self::Backspace),
            _ => {}
        }

        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_graphic() => {
                Ok(Self::Char(c.to_ascii_lowercase()))
            }
            _ => Err(format!("unknown virtual key: {:?}", s)),
        }
    }
}

impl fmt::Display for VirtualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "{}", c),
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
            Self::Space => write!(f, "space"),
            Self::Enter => write!(f, "enter"),
            Self::Escape => write!(f, "escape"),
            Self::Tab => write!(f, "tab"),
            Self::Backspace => write!(f, "backspace"),
        }
    }
}

impl<'de> Deserialize<'de> for VirtualKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
