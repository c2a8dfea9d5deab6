//! # Key Binding Table
//!
//! Static configuration mapping each controller signal to a virtual key.
//!
//! ## Controls
//!
//! A *control* is anything that can hold a key: one of the 20 discrete
//! buttons, or one of 8 stick directions derived from the analog axes via a
//! hysteresis threshold (left/right stick, each split into
//! up/down/left/right).
//!
//! ## Default Table
//!
//! | Control | Key | Control | Key |
//! |---------|-----|---------|-----|
//! | A | z | B | x |
//! | X | c | Y | v |
//! | L | q | R | e |
//! | ZL | 1 | ZR | 3 |
//! | + | p | - | m |
//! | Home | h | Capture | o |
//! | LS | f | RS | g |
//! | GL | 9 | GR | 0 |
//! | D-pad | arrow keys | | |
//! | Left stick | WASD | Right stick | IJKL |
//!
//! The table is supplied externally (TOML `[bindings]` section); the
//! mapping algorithm never hardcodes it.

use serde::Deserialize;
use serde::de::Error;
use std::collections::BTreeMap;

use super::keys::VirtualKey;
use crate::controller::state::ControllerState;
use crate::error::{Result, Switch2BridgeError};

/// A mappable controller signal: a discrete button or a stick direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Control {
    /// A button.
    A,
    /// B button.
    B,
    /// X button.
    X,
    /// Y button.
    Y,
    /// L shoulder button.
    L,
    /// R shoulder button.
    R,
    /// ZL trigger.
    Zl,
    /// ZR trigger.
    Zr,
    /// Plus (+) button.
    Plus,
    /// Minus (-) button.
    Minus,
    /// Home button.
    Home,
    /// Capture button.
    Capture,
    /// Left stick click.
    Ls,
    /// Right stick click.
    Rs,
    /// Left grip button.
    Gl,
    /// Right grip button.
    Gr,
    /// D-pad up.
    DpadUp,
    /// D-pad down.
    DpadDown,
    /// D-pad left.
    DpadLeft,
    /// D-pad right.
    DpadRight,
    /// Left stick pushed up past the threshold.
    LeftStickUp,
    /// Left stick pushed down past the threshold.
    LeftStickDown,
    /// Left stick pushed left past the threshold.
    LeftStickLeft,
    /// Left stick pushed right past the threshold.
    LeftStickRight,
    /// Right stick pushed up past the threshold.
    RightStickUp,
    /// Right stick pushed down past the threshold.
    RightStickDown,
    /// Right stick pushed left past the threshold.
    RightStickLeft,
    /// Right stick pushed right past the threshold.
    RightStickRight,
}

impl Control {
    /// All mappable controls: 20 discrete buttons plus 8 stick directions.
    pub const ALL: [Control; 28] = [
        Control::A,
        Control::B,
        Control::X,
        Control::Y,
        Control::L,
        Control::R,
        Control::Zl,
        Control::Zr,
        Control::Plus,
        Control::Minus,
        Control::Home,
        Control::Capture,
        Control::Ls,
        Control::Rs,
        Control::Gl,
        Control::Gr,
        Control::DpadUp,
        Control::DpadDown,
        Control::DpadLeft,
        Control::DpadRight,
        Control::LeftStickUp,
        Control::LeftStickDown,
        Control::LeftStickLeft,
        Control::LeftStickRight,
        Control::RightStickUp,
        Control::RightStickDown,
        Control::RightStickLeft,
        Control::RightStickRight,
    ];

    /// Whether this control should hold its key for the given state.
    ///
    /// Digital buttons map directly. Stick directions compare the
    /// normalized axis against `threshold` with strict inequality, so a
    /// value exactly at the threshold does not hold. At most one of each
    /// up/down and left/right pair can hold at a time.
    ///
    /// # Examples
    ///
    /// ```
    /// use switch2_bridge::controller::state::ControllerState;
    /// use switch2_bridge::keymap::bindings::Control;
    ///
    /// let mut state = ControllerState::default();
    /// state.set_sticks(2048, 4095, 2048, 2048); // Left stick full up
    ///
    /// assert!(Control::LeftStickUp.is_held(&state, 0.5));
    /// assert!(!Control::LeftStickDown.is_held(&state, 0.5));
    /// ```
    #[must_use]
    pub fn is_held(&self, state: &ControllerState, threshold: f32) -> bool {
        match self {
            Control::A => state.a,
            Control::B => state.b,
            Control::X => state.x,
            Control::Y => state.y,
            Control::L => state.l,
            Control::R => state.r,
            Control::Zl => state.zl,
            Control::Zr => state.zr,
            Control::Plus => state.plus,
            Control::Minus => state.minus,
            Control::Home => state.home,
            Control::Capture => state.capture,
            Control::Ls => state.ls,
            Control::Rs => state.rs,
            Control::Gl => state.gl,
            Control::Gr => state.gr,
            Control::DpadUp => state.dpad_up,
            Control::DpadDown => state.dpad_down,
            Control::DpadLeft => state.dpad_left,
            Control::DpadRight => state.dpad_right,
            Control::LeftStickUp => state.left_stick_y > threshold,
            Control::LeftStickDown => state.left_stick_y < -threshold,
            Control::LeftStickLeft => state.left_stick_x < -threshold,
            Control::LeftStickRight => state.left_stick_x > threshold,
            Control::RightStickUp => state.right_stick_y > threshold,
            Control::RightStickDown => state.right_stick_y < -threshold,
            Control::RightStickLeft => state.right_stick_x < -threshold,
            Control::RightStickRight => state.right_stick_x > threshold,
        }
    }
}

/// The control → virtual key binding table.
///
/// Bindings are validated at construction: every control must be bound and
/// no virtual key may be bound twice. A missing or duplicated entry is a
/// fatal setup error, never discovered per-frame.
///
/// # Examples
///
/// ```
/// use switch2_bridge::keymap::bindings::{Control, KeyBindings};
/// use switch2_bridge::keymap::keys::VirtualKey;
///
/// let bindings = KeyBindings::default();
/// assert!(bindings.validate().is_ok());
/// assert_eq!(bindings.key_for(Control::A), Some(VirtualKey::Char('z')));
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct KeyBindings {
    map: BTreeMap<Control, VirtualKey>,
}

impl Default for KeyBindings {
    /// Standard table: A→z B→x X→c Y→v, L→q R→e ZL→1 ZR→3, +→p -→m
    /// Home→h Capture→o, LS→f RS→g, GL→9 GR→0, d-pad→arrows, left
    /// stick→WASD, right stick→IJKL.
    fn default() -> Self {
        let entries = [
            (Control::A, VirtualKey::Char('z')),
            (Control::B, VirtualKey::Char('x')),
            (Control::X, VirtualKey::Char('c')),
            (Control::Y, VirtualKey::Char('v')),
            (Control::L, VirtualKey::Char('q')),
            (Control::R, VirtualKey::Char('e')),
            (Control::Zl, VirtualKey::Char('1')),
            (Control::Zr, VirtualKey::Char('3')),
            (Control::Plus, VirtualKey::Char('p')),
            (Control::Minus, VirtualKey::Char('m')),
            (Control::Home, VirtualKey::Char('h')),
            (Control::Capture, VirtualKey::Char('o')),
            (Control::Ls, VirtualKey::Char('f')),
            (Control::Rs, VirtualKey::Char('g')),
            (Control::Gl, VirtualKey::Char('9')),
            (Control::Gr, VirtualKey::Char('0')),
            (Control::DpadUp, VirtualKey::Up),
            (Control::DpadDown, VirtualKey::Down),
            (Control::DpadLeft, VirtualKey::Left),
            (Control::DpadRight, VirtualKey::Right),
            (Control::LeftStickUp, VirtualKey::Char('w')),
            (Control::LeftStickDown, VirtualKey::Char('s')),
            (Control::LeftStickLeft, VirtualKey::Char('a')),
            (Control::LeftStickRight, VirtualKey::Char('d')),
            (Control::RightStickUp, VirtualKey::Char('i')),
            (Control::RightStickDown, VirtualKey::Char('k')),
            (Control::RightStickLeft, VirtualKey::Char('j')),
            (Control::RightStickRight, VirtualKey::Char('l')),
        ];

        Self {
            map: entries.into_iter().collect(),
        }
    }
}

impl KeyBindings {
    /// Creates a binding table from explicit entries.
    #[must_use]
    pub fn new(map: BTreeMap<Control, VirtualKey>) -> Self {
        Self { map }
    }

    /// Checks that the table is complete and injective.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first unbound control, or
    /// the first virtual key bound to more than one control.
    pub fn validate(&self) -> Result<()> {
        for control in Control::ALL {
            if !self.map.contains_key(&control) {
                return Err(Switch2BridgeError::Config(toml::de::Error::custom(
                    format!("bindings missing an entry for {:?}", control),
                )));
            }
        }

        let mut seen: BTreeMap<VirtualKey, Control> = BTreeMap::new();
        for (&control, &key) in &self.map {
            if let Some(&previous) = seen.get(&key) {
                return Err(Switch2BridgeError::Config(toml::de::Error::custom(
                    format!(
                        "key '{}' bound to both {:?} and {:?}",
                        key, previous, control
                    ),
                )));
            }
            seen.insert(key, control);
        }

        Ok(())
    }

    /// The key bound to `control`, if any.
    #[must_use]
    pub fn key_for(&self, control: Control) -> Option<VirtualKey> {
        self.map.get(&control).copied()
    }

    /// All distinct bound virtual keys, in key order.
    ///
    /// Used to register the full key set with an output sink up front.
    #[must_use]
    pub fn bound_keys(&self) -> Vec<VirtualKey> {
        let mut keys: Vec<VirtualKey> = self.map.values().copied().collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    /// Iterates over `(control, key)` entries in control order.
    pub fn iter(&self) -> impl Iterator<Item = (Control, VirtualKey)> + '_ {
        self.map.iter().map(|(&c, &k)| (c, k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Control Tests ====================

    #[test]
    fn test_all_lists_every_control_once() {
        let mut sorted = Control::ALL.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 28);
    }

    #[test]
    fn test_button_controls_map_directly() {
        let mut state = ControllerState::default();
        state.zl = true;
        assert!(Control::Zl.is_held(&state, 0.5));
        assert!(!Control::Zr.is_held(&state, 0.5));
    }

    #[test]
    fn test_stick_directions_mutually_exclusive() {
        let mut state = ControllerState::default();
        state.set_sticks(4095, 2048, 2048, 2048); // Full right

        assert!(Control::LeftStickRight.is_held(&state, 0.5));
        assert!(!Control::LeftStickLeft.is_held(&state, 0.5));
        assert!(!Control::LeftStickUp.is_held(&state, 0.5));
        assert!(!Control::LeftStickDown.is_held(&state, 0.5));
    }

    #[test]
    fn test_stick_threshold_is_strict() {
        let mut state = ControllerState::default();
        // Exactly 0.5: 2048 + 1024 = 3072
        state.set_sticks(2048, 3072, 2048, 2048);
        assert_eq!(state.left_stick_y, 0.5);
        assert!(!Control::LeftStickUp.is_held(&state, 0.5));

        // Just past 0.5
        state.set_sticks(2048, 3094, 2048, 2048);
        assert!(state.left_stick_y > 0.5);
        assert!(Control::LeftStickUp.is_held(&state, 0.5));
    }

    #[test]
    fn test_stick_negative_directions() {
        let mut state = ControllerState::default();
        state.set_sticks(0, 0, 2048, 2048);
        assert!(Control::LeftStickLeft.is_held(&state, 0.5));
        assert!(Control::LeftStickDown.is_held(&state, 0.5));
        assert!(!Control::LeftStickRight.is_held(&state, 0.5));
        assert!(!Control::LeftStickUp.is_held(&state, 0.5));
    }

    #[test]
    fn test_right_stick_independent_of_left() {
        let mut state = ControllerState::default();
        state.set_sticks(2048, 2048, 4095, 4095);
        assert!(Control::RightStickRight.is_held(&state, 0.5));
        assert!(Control::RightStickUp.is_held(&state, 0.5));
        assert!(!Control::LeftStickRight.is_held(&state, 0.5));
    }

    // ==================== KeyBindings Tests ====================

    #[test]
    fn test_default_bindings_validate() {
        assert!(KeyBindings::default().validate().is_ok());
    }

    #[test]
    fn test_default_bindings_match_standard_table() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.key_for(Control::A), Some(VirtualKey::Char('z')));
        assert_eq!(bindings.key_for(Control::Gr), Some(VirtualKey::Char('0')));
        assert_eq!(bindings.key_for(Control::DpadUp), Some(VirtualKey::Up));
        assert_eq!(
            bindings.key_for(Control::LeftStickUp),
            Some(VirtualKey::Char('w'))
        );
        assert_eq!(
            bindings.key_for(Control::RightStickRight),
            Some(VirtualKey::Char('l'))
        );
    }

    #[test]
    fn test_validate_rejects_missing_control() {
        let mut map: BTreeMap<Control, VirtualKey> =
            KeyBindings::default().iter().collect();
        map.remove(&Control::Home);

        let result = KeyBindings::new(map).validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Home"));
    }

    #[test]
    fn test_validate_rejects_duplicate_key() {
        let mut map: BTreeMap<Control, VirtualKey> =
            KeyBindings::default().iter().collect();
        // Bind B to the same key as A
        map.insert(Control::B, VirtualKey::Char('z'));

        let result = KeyBindings::new(map).validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("'z'"));
    }

    #[test]
    fn test_bound_keys_distinct_and_sorted() {
        let bindings = KeyBindings::default();
        let keys = bindings.bound_keys();
        assert_eq!(keys.len(), 28);

        let mut resorted = keys.clone();
        resorted.sort_unstable();
        assert_eq!(keys, resorted);
    }

    // ==================== Deserialization Tests ====================

    #[test]
    fn test_deserialize_bindings_from_toml() {
        #[derive(Deserialize)]
        struct Holder {
            bindings: KeyBindings,
        }

        let holder: Holder = toml::from_str(
            r#"
            [bindings]
            a = "z"
            dpad-up = "up"
            left-stick-up = "w"
            "#,
        )
        .unwrap();

        assert_eq!(
            holder.bindings.key_for(Control::A),
            Some(VirtualKey::Char('z'))
        );
        assert_eq!(holder.bindings.key_for(Control::DpadUp), Some(VirtualKey::Up));
        assert_eq!(
            holder.bindings.key_for(Control::LeftStickUp),
            Some(VirtualKey::Char('w'))
        );
        // Partial tables deserialize fine but fail validation
        assert!(holder.bindings.validate().is_err());
    }

    #[test]
    fn test_deserialize_rejects_unknown_control() {
        #[derive(Deserialize)]
        struct Holder {
            #[allow(dead_code)]
            bindings: KeyBindings,
        }

        let result = toml::from_str::<Holder>(
            r#"
            [bindings]
            turbo = "t"
            "#,
        );
        assert!(result.is_err());
    }
}
