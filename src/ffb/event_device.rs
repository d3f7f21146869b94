//! Force-feedback channel backed by a `/dev/input/eventN` device.

use evdev::{Device, InputEvent};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

use super::FeedbackChannel;
use crate::error::{JoydevError, Result};

/// An opened event device used for force feedback.
pub struct EventDeviceChannel {
    device: Device,
    path: PathBuf,
}

impl std::fmt::Debug for EventDeviceChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDeviceChannel")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl EventDeviceChannel {
    /// Opens the event device read/write.
    ///
    /// # Errors
    ///
    /// Returns `DeviceUnavailable` if the device cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let device = Device::open(path).map_err(|source| JoydevError::DeviceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            "Opened force feedback device {} ({})",
            path.display(),
            device.name().unwrap_or("unnamed")
        );

        Ok(Self {
            device,
            path: path.to_path_buf(),
        })
    }
}

impl FeedbackChannel for EventDeviceChannel {
    fn write_events(&mut self, events: &[InputEvent]) -> io::Result<()> {
        self.device.send_events(events)
    }
}
