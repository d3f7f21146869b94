//! # Logical Wheel State
//!
//! The single state record shared by every physical device feeding one
//! emulated peripheral, and the hat-switch resolver.
//!
//! ## Hat Switch
//!
//! Joysticks report the hat as two independent axes. The horizontal axis
//! yields W/E/centred, the vertical one N/S/centred; [`resolve_hat`] folds
//! them into one of nine directions:
//!
//! | Vertical | Horizontal W | Horizontal E | Horizontal centred |
//! |----------|--------------|--------------|--------------------|
//! | N | NW | NE | N |
//! | S | SW | SE | S |
//! | centred | W | E | centred |

use super::profile::PeripheralProfile;

/// Released pedal value.
pub const PEDAL_RELEASED: u8 = 0xFF;

/// Hat directions in report order; `Centered` is the "no direction" value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum HatDirection {
    North = 0,
    NorthEast = 1,
    East = 2,
    SouthEast = 3,
    South = 4,
    SouthWest = 5,
    West = 6,
    NorthWest = 7,
    #[default]
    Centered = 8,
}

impl HatDirection {
    /// Value written into the report's hat nibble.
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Direction of a horizontal hat axis reading.
    #[must_use]
    pub fn from_horizontal(value: i16) -> Self {
        match value {
            v if v < 0 => HatDirection::West,
            v if v > 0 => HatDirection::East,
            _ => HatDirection::Centered,
        }
    }

    /// Direction of a vertical hat axis reading.
    #[must_use]
    pub fn from_vertical(value: i16) -> Self {
        match value {
            v if v < 0 => HatDirection::North,
            v if v > 0 => HatDirection::South,
            _ => HatDirection::Centered,
        }
    }
}

/// Combines the horizontal and vertical hat readings into one direction.
///
/// # Examples
///
/// ```
/// use joydev_pad::pad::state::{resolve_hat, HatDirection};
///
/// assert_eq!(resolve_hat(HatDirection::West, HatDirection::North), HatDirection::NorthWest);
/// assert_eq!(resolve_hat(HatDirection::West, HatDirection::Centered), HatDirection::West);
/// ```
#[must_use]
pub fn resolve_hat(horizontal: HatDirection, vertical: HatDirection) -> HatDirection {
    match (vertical, horizontal) {
        (HatDirection::North, HatDirection::West) => HatDirection::NorthWest,
        (HatDirection::North, HatDirection::East) => HatDirection::NorthEast,
        (HatDirection::North, _) => HatDirection::North,
        (HatDirection::South, HatDirection::West) => HatDirection::SouthWest,
        (HatDirection::South, HatDirection::East) => HatDirection::SouthEast,
        (HatDirection::South, _) => HatDirection::South,
        (_, horizontal) => horizontal,
    }
}

/// State of the emulated peripheral.
///
/// Pedals use 255 for released and 0 for fully pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalWheelState {
    /// Steering position, `0..=range_max`.
    pub steering: u32,
    pub throttle: u8,
    pub brake: u8,
    pub clutch: u8,
    /// Button bitmap indexed by output bit.
    pub buttons: u32,
    pub hat_horizontal: HatDirection,
    pub hat_vertical: HatDirection,
    /// Resolved hat direction.
    pub hat_switch: HatDirection,
}

impl LogicalWheelState {
    /// Creates a state with steering centred, pedals released and hat centred.
    #[must_use]
    pub fn new(profile: &PeripheralProfile) -> Self {
        Self {
            steering: profile.steering_center(),
            throttle: PEDAL_RELEASED,
            brake: PEDAL_RELEASED,
            clutch: PEDAL_RELEASED,
            buttons: 0,
            hat_horizontal: HatDirection::Centered,
            hat_vertical: HatDirection::Centered,
            hat_switch: HatDirection::Centered,
        }
    }

    /// Sets or clears one output button bit.
    pub fn set_button(&mut self, bit: u32, pressed: bool) {
        if bit >= u32::BITS {
            return;
        }
        if pressed {
            self.buttons |= 1 << bit;
        } else {
            self.buttons &= !(1 << bit);
        }
    }

    /// Checks one output button bit.
    #[must_use]
    pub fn button(&self, bit: u32) -> bool {
        bit < u32::BITS && self.buttons & (1 << bit) != 0
    }

    /// Recomputes `hat_switch` from the two hat axes.
    pub fn resolve_hat(&mut self) {
        self.hat_switch = resolve_hat(self.hat_horizontal, self.hat_vertical);
    }
}
