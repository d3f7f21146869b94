//! # Error Types
//!
//! Custom error types for joydev-pad using `thiserror`.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for joydev-pad
#[derive(Debug, Error)]
pub enum JoydevError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Joystick ioctl failures
    #[error("ioctl failed: {0}")]
    Ioctl(#[from] nix::Error),

    /// Joystick driver older than the supported protocol
    #[error("{}: driver version 0x{version:X} is too old", .path.display())]
    UnsupportedVersion { path: PathBuf, version: u32 },

    /// A physical device could not be opened
    #[error("unable to open {}: {source}", .path.display())]
    DeviceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for joydev-pad
pub type Result<T> = std::result::Result<T, JoydevError>;
