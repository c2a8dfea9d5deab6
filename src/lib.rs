//! # Switch2 Bridge Library
//!
//! Bridge a Nintendo Switch 2 Pro Controller to virtual keyboard input.
//!
//! This library provides the core functionality for decoding the controller's
//! BLE input reports into a typed [`controller::state::ControllerState`] and
//! translating that state into virtual key press/release events for software
//! expecting keyboard input (e.g. an emulator with keyboard bindings).

pub mod config;
pub mod error;
pub mod controller;
pub mod keymap;
pub mod sink;
pub mod transport;
pub mod bridge;
