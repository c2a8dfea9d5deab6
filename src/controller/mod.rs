//! # Controller Module
//!
//! Switch 2 Pro Controller input report handling.
//!
//! This module handles:
//! - Decoding raw BLE input report buffers into [`state::ControllerState`]
//! - Unpacking 12-bit stick values and normalizing them to -1.0..1.0
//! - Tracking the last-known-good state across reports
//! - Notifying an observer once per successfully decoded report

pub mod decoder;
pub mod state;
pub mod tracker;
