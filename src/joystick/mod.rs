//! # Joystick Module
//!
//! Access to the Linux kernel joystick interface (`/dev/input/jsN`).
//!
//! This module handles:
//! - Opening joystick devices in non-blocking mode
//! - Querying name, driver version, axis and button counts
//! - Querying the axis-code map so hat axes can be recognised
//! - Reading fixed-size `js_event` records
//!
//! ## Event Record
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | timestamp (ms) |
//! | 4 | 2 | value (signed) |
//! | 6 | 1 | type (`JS_EVENT_*`) |
//! | 7 | 1 | axis/button number |

pub mod enumerate;

use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use crate::error::{JoydevError, Result};

pub use enumerate::{enumerate, enumerate_in, DiscoveredDevice, JOYSTICK_DIR};

/// Button pressed/released event.
pub const JS_EVENT_BUTTON: u8 = 0x01;
/// Axis moved event.
pub const JS_EVENT_AXIS: u8 = 0x02;
/// Modifier bit marking the synthetic events sent on open.
pub const JS_EVENT_INIT: u8 = 0x80;

/// Oldest joystick driver protocol we talk to (1.0.0).
pub const MIN_DRIVER_VERSION: u32 = 0x01_0000;

/// Number of entries in the kernel axis-code map (`ABS_CNT`).
pub const ABS_CNT: usize = 0x40;

/// Maximum length of a device name returned by `JSIOCGNAME`.
const NAME_LEN: usize = 128;

/// Events pulled per `read(2)`.
const EVENT_BATCH: usize = 32;

mod ioctl {
    use nix::{ioctl_read, ioctl_read_buf};

    ioctl_read!(js_get_version, b'j', 0x01, u32);
    ioctl_read!(js_get_axes, b'j', 0x11, u8);
    ioctl_read!(js_get_buttons, b'j', 0x12, u8);
    ioctl_read_buf!(js_get_name, b'j', 0x13, u8);
    ioctl_read_buf!(js_get_axis_map, b'j', 0x32, u8);
}

/// Kind of a joystick event with the init modifier stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsEventKind {
    Axis,
    Button,
}

/// A single `struct js_event` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsEvent {
    /// Event timestamp in milliseconds.
    pub time: u32,
    /// Axis position or button state.
    pub value: i16,
    /// Raw `JS_EVENT_*` type byte, possibly with `JS_EVENT_INIT` set.
    pub kind: u8,
    /// Raw axis or button index.
    pub number: u8,
}

impl JsEvent {
    /// Size of one record on the wire.
    pub const SIZE: usize = 8;

    /// Creates an axis event.
    #[must_use]
    pub fn axis(number: u8, value: i16) -> Self {
        Self { time: 0, value, kind: JS_EVENT_AXIS, number }
    }

    /// Creates a button event.
    #[must_use]
    pub fn button(number: u8, pressed: bool) -> Self {
        Self { time: 0, value: i16::from(pressed), kind: JS_EVENT_BUTTON, number }
    }

    /// Decodes a record in native byte order.
    #[must_use]
    pub fn from_bytes(raw: &[u8; Self::SIZE]) -> Self {
        Self {
            time: u32::from_ne_bytes([raw[0], raw[1], raw[2], raw[3]]),
            value: i16::from_ne_bytes([raw[4], raw[5]]),
            kind: raw[6],
            number: raw[7],
        }
    }

    /// Encodes the record in native byte order.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut raw = [0u8; Self::SIZE];
        raw[0..4].copy_from_slice(&self.time.to_ne_bytes());
        raw[4..6].copy_from_slice(&self.value.to_ne_bytes());
        raw[6] = self.kind;
        raw[7] = self.number;
        raw
    }

    /// Returns the event kind, ignoring the init modifier.
    #[must_use]
    pub fn event_kind(&self) -> Option<JsEventKind> {
        match self.kind & !JS_EVENT_INIT {
            JS_EVENT_AXIS => Some(JsEventKind::Axis),
            JS_EVENT_BUTTON => Some(JsEventKind::Button),
            _ => None,
        }
    }
}

/// Open handle to a `/dev/input/jsN` device.
///
/// The descriptor is closed when the handle is dropped.
#[derive(Debug)]
pub struct Joystick {
    file: File,
    path: PathBuf,
}

impl Joystick {
    /// Opens a joystick device in non-blocking mode.
    ///
    /// # Arguments
    ///
    /// * `path` - Device path (e.g. `/dev/input/js0`)
    /// * `writable` - Open read/write instead of read-only
    ///
    /// # Errors
    ///
    /// Returns `DeviceUnavailable` if the device cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P, writable: bool) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(writable)
            .custom_flags(nix::libc::O_NONBLOCK)
            .open(path)
            .map_err(|source| JoydevError::DeviceUnavailable {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self::from_file(file, path))
    }

    /// Wraps an already open, non-blocking descriptor.
    pub fn from_file<P: AsRef<Path>>(file: File, path: P) -> Self {
        Self {
            file,
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path the device was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Human-readable device name (`JSIOCGNAME`).
    pub fn name(&self) -> Result<String> {
        let mut buf = [0u8; NAME_LEN];
        // SAFETY: the buffer outlives the call and its length is encoded in the request.
        unsafe { ioctl::js_get_name(self.file.as_raw_fd(), &mut buf) }?;
        let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
    }

    /// Joystick driver protocol version (`JSIOCGVERSION`).
    pub fn driver_version(&self) -> Result<u32> {
        let mut version = 0u32;
        // SAFETY: `version` is a valid u32 out-pointer for the duration of the call.
        unsafe { ioctl::js_get_version(self.file.as_raw_fd(), &mut version) }?;
        Ok(version)
    }

    /// Number of axes reported by the driver (`JSIOCGAXES`).
    pub fn axis_count(&self) -> Result<u8> {
        let mut count = 0u8;
        // SAFETY: `count` is a valid u8 out-pointer for the duration of the call.
        unsafe { ioctl::js_get_axes(self.file.as_raw_fd(), &mut count) }?;
        Ok(count)
    }

    /// Number of buttons reported by the driver (`JSIOCGBUTTONS`).
    pub fn button_count(&self) -> Result<u8> {
        let mut count = 0u8;
        // SAFETY: `count` is a valid u8 out-pointer for the duration of the call.
        unsafe { ioctl::js_get_buttons(self.file.as_raw_fd(), &mut count) }?;
        Ok(count)
    }

    /// Input `ABS_*` code behind each raw axis index (`JSIOCGAXMAP`).
    pub fn axis_codes(&self) -> Result<[u8; ABS_CNT]> {
        let mut codes = [0u8; ABS_CNT];
        // SAFETY: the buffer is exactly the `__u8[ABS_CNT]` the request expects.
        unsafe { ioctl::js_get_axis_map(self.file.as_raw_fd(), &mut codes) }?;
        Ok(codes)
    }

    /// Performs one non-blocking read and appends the decoded events.
    ///
    /// Returns the number of events appended; `0` means end of file.
    ///
    /// # Errors
    ///
    /// `WouldBlock` when no data is queued, or any other read failure.
    pub fn read_events(&mut self, events: &mut Vec<JsEvent>) -> io::Result<usize> {
        let mut buf = [0u8; JsEvent::SIZE * EVENT_BATCH];
        let len = self.file.read(&mut buf)?;

        let mut count = 0;
        for chunk in buf[..len].chunks_exact(JsEvent::SIZE) {
            let mut raw = [0u8; JsEvent::SIZE];
            raw.copy_from_slice(chunk);
            events.push(JsEvent::from_bytes(&raw));
            count += 1;
        }

        Ok(count)
    }
}

impl AsFd for Joystick {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}
