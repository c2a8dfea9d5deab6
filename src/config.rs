//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! ```toml
//! [bridge]
//! stick_threshold = 0.5
//! log_interval_packets = 1000
//!
//! [bindings]
//! a = "z"
//! b = "x"
//! dpad-up = "up"
//! left-stick-up = "w"
//! # ... one entry per control
//! ```
//!
//! Every field has a default; an absent `[bindings]` section yields the
//! standard table. Validation runs at load time so a broken mapping is a
//! fatal setup error, never discovered per-frame.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::keymap::bindings::KeyBindings;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub bridge: BridgeConfig,

    #[serde(default)]
    pub bindings: KeyBindings,
}

/// Bridge behavior configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BridgeConfig {
    /// Normalized stick magnitude above which a direction counts as held.
    #[serde(default = "default_stick_threshold")]
    pub stick_threshold: f32,

    /// Number of decoded reports between status log messages.
    #[serde(default = "default_log_interval_packets")]
    pub log_interval_packets: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            stick_threshold: default_stick_threshold(),
            log_interval_packets: default_log_interval_packets(),
        }
    }
}

// Default value functions
fn default_stick_threshold() -> f32 {
    crate::keymap::mapper::DEFAULT_STICK_THRESHOLD
}
fn default_log_interval_packets() -> u64 {
    1000
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use switch2_bridge::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if the stick threshold is out of range, the log
    /// interval is zero, or the binding table is incomplete or binds one
    /// key twice
    pub fn validate(&self) -> Result<()> {
        if !(self.bridge.stick_threshold > 0.0 && self.bridge.stick_threshold < 1.0) {
            return Err(crate::error::Switch2BridgeError::Config(
                toml::de::Error::custom("stick_threshold must be within (0.0, 1.0)"),
            ));
        }

        if self.bridge.log_interval_packets == 0 {
            return Err(crate::error::Switch2BridgeError::Config(
                toml::de::Error::custom("log_interval_packets must be at least 1"),
            ));
        }

        self.bindings.validate()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::bindings::Control;
    use crate::keymap::keys::VirtualKey;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    /// Full `[bindings]` table matching the default mapping, with one
    /// entry per line so tests can override individual keys.
    fn full_bindings_toml() -> Vec<(&'static str, &'static str)> {
        vec![
            ("a", "z"),
            ("b", "x"),
            ("x", "c"),
            ("y", "v"),
            ("l", "q"),
            ("r", "e"),
            ("zl", "1"),
            ("zr", "3"),
            ("plus", "p"),
            ("minus", "m"),
            ("home", "h"),
            ("capture", "o"),
            ("ls", "f"),
            ("rs", "g"),
            ("gl", "9"),
            ("gr", "0"),
            ("dpad-up", "up"),
            ("dpad-down", "down"),
            ("dpad-left", "left"),
            ("dpad-right", "right"),
            ("left-stick-up", "w"),
            ("left-stick-down", "s"),
            ("left-stick-left", "a"),
            ("left-stick-right", "d"),
            ("right-stick-up", "i"),
            ("right-stick-down", "k"),
            ("right-stick-left", "j"),
            ("right-stick-right", "l"),
        ]
    }

    fn bindings_section(overrides: &[(&str, &str)]) -> String {
        let mut section = String::from("[bindings]\n");
        for (control, key) in full_bindings_toml() {
            let key = overrides
                .iter()
                .find(|(c, _)| *c == control)
                .map(|(_, k)| *k)
                .unwrap_or(key);
            section.push_str(&format!("{} = \"{}\"\n", control, key));
        }
        section
    }

    // ==================== Default Tests ====================

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bridge.stick_threshold, 0.5);
        assert_eq!(config.bridge.log_interval_packets, 1000);
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let file = write_config("");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.bridge.stick_threshold, 0.5);
        assert_eq!(
            config.bindings.key_for(Control::A),
            Some(VirtualKey::Char('z'))
        );
    }

    // ==================== Load Tests ====================

    #[test]
    fn test_load_overrides_threshold() {
        let file = write_config(
            r#"
            [bridge]
            stick_threshold = 0.7
            "#,
        );
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.bridge.stick_threshold, 0.7);
        // Bindings still default
        assert!(config.bindings.validate().is_ok());
    }

    #[test]
    fn test_load_full_bindings_table() {
        let file = write_config(&bindings_section(&[]));
        let config = Config::load(file.path()).unwrap();
        assert_eq!(
            config.bindings.key_for(Control::RightStickLeft),
            Some(VirtualKey::Char('j'))
        );
    }

    #[test]
    fn test_load_remapped_binding() {
        let file = write_config(&bindings_section(&[("a", "space")]));
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.bindings.key_for(Control::A), Some(VirtualKey::Space));
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(Config::load("/nonexistent/config.toml").is_err());
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let file = write_config("not valid [ toml");
        assert!(Config::load(file.path()).is_err());
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_threshold_out_of_range_rejected() {
        for value in ["0.0", "1.0", "-0.3", "1.5"] {
            let file = write_config(&format!("[bridge]\nstick_threshold = {}\n", value));
            assert!(
                Config::load(file.path()).is_err(),
                "Threshold {} should be rejected",
                value
            );
        }
    }

    #[test]
    fn test_zero_log_interval_rejected() {
        let file = write_config("[bridge]\nlog_interval_packets = 0\n");
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_partial_bindings_table_rejected() {
        // An explicit table replaces the default entirely, so it must be
        // complete
        let file = write_config("[bindings]\na = \"z\"\n");
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        // Complete table, but B reuses A's key
        let file = write_config(&bindings_section(&[("b", "z")]));
        assert!(Config::load(file.path()).is_err());
    }
}
