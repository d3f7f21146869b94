//! # joydev-pad Library
//!
//! Emulated steering wheels and pads built from Linux joysticks.
//!
//! This library discovers `/dev/input/js*` devices, translates their raw
//! axes and buttons into the state of one emulated peripheral, serializes
//! that state into the peripheral's report and forwards force feedback
//! commands to the matching `/dev/input/event*` device.

pub mod config;
pub mod error;
pub mod ffb;
pub mod joystick;
pub mod pad;
