//! # Device Session
//!
//! One open physical joystick plus the tables that translate its raw axis
//! and button indices into logical controls.
//!
//! ## Normalization
//!
//! Joystick axes report signed values centred on 0. They are scaled into
//! `0..=n` with `(32768 + value) * n / 0xFFFF`:
//!
//! | Control | Not inverted | Inverted |
//! |---------|--------------|----------|
//! | Steering | `norm(v, range_max)` | `range_max - norm(v, range_max)` |
//! | Throttle / Brake | `norm(v, 255)` | `255 - norm(v, 255)` |
//!
//! Pedals treat a higher raw value as more released (255 = released): a
//! non-inverted pedal at the maximum raw value reads 255, an inverted one
//! reads 0. Devices whose pedals rest at the minimum raw value need the
//! invert flag.

use std::io;
use std::os::fd::{AsFd, BorrowedFd};
use tracing::{debug, info, warn};

use super::mapping::{AxisControl, MappingProvider, Slot};
use super::profile::PeripheralProfile;
use super::state::{HatDirection, LogicalWheelState};
use crate::error::{JoydevError, Result};
use crate::joystick::{DiscoveredDevice, JsEvent, JsEventKind, Joystick, ABS_CNT, MIN_DRIVER_VERSION};

/// First and last hat axis codes (`ABS_HAT0X..=ABS_HAT3Y`).
const ABS_HAT0X: u8 = 0x10;
const ABS_HAT3Y: u8 = 0x17;

/// Inversion flag positions.
const INVERT_STEERING: usize = 0;
const INVERT_THROTTLE: usize = 1;
const INVERT_BRAKE: usize = 2;

/// Scales a signed joystick value into `0..=range`.
///
/// # Examples
///
/// ```
/// use joydev_pad::pad::session::normalize;
///
/// assert_eq!(normalize(-32768, 1023), 0);
/// assert_eq!(normalize(0, 1023), 511);
/// assert_eq!(normalize(32767, 1023), 1023);
/// ```
#[must_use]
pub fn normalize(value: i16, range: u32) -> u32 {
    let offset = (32768 + i32::from(value)) as u32;
    offset * range / 0xFFFF
}

/// What the driver reports about a joystick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub axes: u8,
    pub buttons: u8,
    /// `ABS_*` code per raw axis, when the driver exposes it.
    pub axis_codes: Option<[u8; ABS_CNT]>,
}

impl Capabilities {
    /// Queries the driver.
    ///
    /// Failing axis or button count queries are treated as zero.
    pub fn query(joystick: &Joystick) -> Self {
        Self {
            axes: joystick.axis_count().unwrap_or(0),
            buttons: joystick.button_count().unwrap_or(0),
            axis_codes: joystick.axis_codes().ok(),
        }
    }
}

/// An open joystick and its translation tables.
#[derive(Debug)]
pub struct DeviceSession {
    name: String,
    joystick: Joystick,
    axis_map: Vec<Slot>,
    button_map: Vec<Slot>,
    inverted: [bool; 3],
    has_steering: bool,
}

impl DeviceSession {
    /// Opens a discovered joystick and builds its tables from the provider.
    ///
    /// # Errors
    ///
    /// - `DeviceUnavailable` if the device cannot be opened read/write
    /// - `Ioctl` if the driver version cannot be queried
    /// - `UnsupportedVersion` if the driver is older than 1.0.0
    pub fn open(
        device: &DiscoveredDevice,
        profile: &PeripheralProfile,
        port: u32,
        provider: &dyn MappingProvider,
    ) -> Result<Self> {
        let joystick = Joystick::open(&device.path, true)?;

        let version = joystick.driver_version()?;
        if version < MIN_DRIVER_VERSION {
            return Err(JoydevError::UnsupportedVersion {
                path: device.path.clone(),
                version,
            });
        }

        let capabilities = Capabilities::query(&joystick);
        let controls = provider.axis_button_mapping(
            profile.peripheral,
            port,
            &device.identifier,
            profile.max_buttons,
            profile.max_axes,
        );
        let inverted = provider.inverted(profile.peripheral, port, &device.identifier);

        info!(
            "Opened {} at {} ({} axes, {} buttons, driver 0x{:X})",
            device.name,
            device.path.display(),
            capabilities.axes,
            capabilities.buttons,
            version
        );

        Ok(Self::build(&device.name, joystick, &capabilities, profile, &controls, inverted))
    }

    /// Builds the translation tables for an open joystick.
    ///
    /// `controls` holds the raw index of each logical control, buttons first
    /// then axes. Assignments outside the reported counts are dropped.
    pub fn build(
        name: &str,
        joystick: Joystick,
        capabilities: &Capabilities,
        profile: &PeripheralProfile,
        controls: &[Option<usize>],
        inverted: [bool; 3],
    ) -> Self {
        let mut axis_map = vec![Slot::Unmapped; usize::from(capabilities.axes)];
        let mut button_map = vec![Slot::Unmapped; usize::from(capabilities.buttons)];
        let mut has_steering = false;

        let (button_controls, axis_controls) = controls.split_at(profile.max_buttons.min(controls.len()));

        for (logical, raw) in axis_controls.iter().take(profile.max_axes).enumerate() {
            let (Some(raw), Some(control)) = (*raw, AxisControl::from_logical(logical)) else {
                continue;
            };
            match axis_map.get_mut(raw) {
                Some(slot) => {
                    *slot = Slot::Axis(control);
                    if control == AxisControl::Steering {
                        has_steering = true;
                    }
                }
                None => warn!("{}: {:?} assigned to missing axis {}", name, control, raw),
            }
        }

        for (logical, raw) in button_controls.iter().enumerate() {
            let Some(raw) = *raw else {
                continue;
            };
            match button_map.get_mut(raw) {
                Some(slot) => *slot = Slot::Button(logical),
                None => warn!("{}: button {} assigned to missing button {}", name, logical, raw),
            }
        }

        if let Some(codes) = &capabilities.axis_codes {
            for (slot, &code) in axis_map.iter_mut().zip(codes.iter()) {
                if *slot == Slot::Unmapped && (ABS_HAT0X..=ABS_HAT3Y).contains(&code) {
                    *slot = if (code - ABS_HAT0X) % 2 == 0 {
                        Slot::Axis(AxisControl::HatHorizontal)
                    } else {
                        Slot::Axis(AxisControl::HatVertical)
                    };
                }
            }
        }

        Self {
            name: name.to_string(),
            joystick,
            axis_map,
            button_map,
            inverted,
            has_steering,
        }
    }

    /// Device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the joystick node.
    pub fn path(&self) -> &std::path::Path {
        self.joystick.path()
    }

    /// True when steering is assigned to one of this device's axes.
    pub fn has_steering(&self) -> bool {
        self.has_steering
    }

    /// What a raw axis index drives.
    pub fn axis_slot(&self, index: u8) -> Slot {
        self.axis_map.get(usize::from(index)).copied().unwrap_or_default()
    }

    /// What a raw button index drives.
    pub fn button_slot(&self, index: u8) -> Slot {
        self.button_map.get(usize::from(index)).copied().unwrap_or_default()
    }

    /// Folds one raw event into the shared state.
    pub fn apply(&self, event: &JsEvent, profile: &PeripheralProfile, state: &mut LogicalWheelState) {
        match event.event_kind() {
            Some(JsEventKind::Axis) => self.apply_axis(event.number, event.value, profile, state),
            Some(JsEventKind::Button) => {
                if let Slot::Button(logical) = self.button_slot(event.number) {
                    state.set_button(profile.button_bit(logical), event.value != 0);
                }
            }
            None => {
                // Unknown event types carry nothing we translate
            }
        }
    }

    fn apply_axis(&self, number: u8, value: i16, profile: &PeripheralProfile, state: &mut LogicalWheelState) {
        let Slot::Axis(control) = self.axis_slot(number) else {
            return;
        };

        let pedal = |inverted: bool| {
            let released = normalize(value, 0xFF) as u8;
            if inverted {
                0xFF - released
            } else {
                released
            }
        };

        match control {
            AxisControl::Steering => {
                let range = profile.range_max;
                let position = normalize(value, range);
                state.steering = if self.inverted[INVERT_STEERING] { range - position } else { position };
            }
            AxisControl::Throttle => state.throttle = pedal(self.inverted[INVERT_THROTTLE]),
            AxisControl::Brake => state.brake = pedal(self.inverted[INVERT_BRAKE]),
            AxisControl::HatHorizontal => state.hat_horizontal = HatDirection::from_horizontal(value),
            AxisControl::HatVertical => state.hat_vertical = HatDirection::from_vertical(value),
        }
    }

    /// Reads and applies every queued event.
    ///
    /// Stops at the first read that returns no data, hits end of file or
    /// fails; a read error is not distinguished from an empty queue.
    /// Returns the number of events applied.
    pub fn drain(&mut self, profile: &PeripheralProfile, state: &mut LogicalWheelState) -> usize {
        let mut events = Vec::new();
        let mut applied = 0;

        loop {
            events.clear();
            match self.joystick.read_events(&mut events) {
                Ok(0) => break,
                Ok(_) => {
                    for event in &events {
                        self.apply(event, profile, state);
                    }
                    applied += events.len();
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    debug!("{}: read ended: {}", self.name, e);
                    break;
                }
            }
        }

        applied
    }
}

impl AsFd for DeviceSession {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.joystick.as_fd()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::joystick::testing::socket_joystick;
    use std::os::unix::net::UnixStream;

    /// Wheel controls: steering on axis 0, throttle on 1, brake on 2,
    /// logical button i on raw button i for the first four buttons.
    pub fn wheel_controls(profile: &PeripheralProfile) -> Vec<Option<usize>> {
        let mut controls = vec![None; profile.max_buttons + profile.max_axes];
        for (logical, control) in controls.iter_mut().take(4).enumerate() {
            *control = Some(logical);
        }
        for axis in 0..profile.max_axes {
            controls[profile.max_buttons + axis] = Some(axis);
        }
        controls
    }

    /// Six axes (the last two report hat codes) and eight buttons.
    pub fn wheel_capabilities() -> Capabilities {
        let mut codes = [0u8; ABS_CNT];
        for (raw, code) in codes.iter_mut().enumerate() {
            *code = raw as u8;
        }
        codes[4] = ABS_HAT0X;
        codes[5] = ABS_HAT0X + 1;
        Capabilities {
            axes: 6,
            buttons: 8,
            axis_codes: Some(codes),
        }
    }

    /// A socket-backed session using the wheel fixtures.
    pub fn wheel_session(profile: &PeripheralProfile, inverted: [bool; 3]) -> (DeviceSession, UnixStream) {
        let (joystick, feeder) = socket_joystick("js0");
        let session = DeviceSession::build(
            "Test Wheel",
            joystick,
            &wheel_capabilities(),
            profile,
            &wheel_controls(profile),
            inverted,
        );
        (session, feeder)
    }
}
