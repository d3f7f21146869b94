//! # Pad Module
//!
//! The emulated peripheral built from physical joysticks.
//!
//! This module handles:
//! - Peripheral profiles (control budgets, steering range, report layout)
//! - Per-device translation tables and event folding
//! - Hat-switch resolution
//! - The polling engine that feeds one logical state from many devices
//! - Serializing the state into the peripheral's report

pub mod joydev;
pub mod mapping;
pub mod profile;
pub mod report;
pub mod session;
pub mod state;

pub use joydev::{ChannelOpener, JoydevPad, PollStatus};
pub use mapping::{AxisControl, ForceFeedbackSettings, MappingProvider, Setting, Slot};
pub use profile::{PeripheralProfile, PeripheralType, ReportLayout};
pub use session::DeviceSession;
pub use state::{resolve_hat, HatDirection, LogicalWheelState};
