//! # State Report Encoder
//!
//! Serializes [`LogicalWheelState`] into the byte layout of the emulated
//! peripheral. All multi-byte fields are little-endian.
//!
//! ## Layouts
//!
//! ```text
//! Wheel10 (7 bytes):  u32 [steering:10 | buttons:12 | hat:4 | pad:6], throttle, brake, clutch
//! Wheel14 (6 bytes):  u32 [steering:14 | buttons:14 | hat:4], throttle, brake
//! Seamic  (5 bytes):  steering, throttle, brake, u16 [hat:4 | buttons:12]
//! Buzz    (5 bytes):  0x7F, 0x7F, buttons[0:7], buttons[8:15], 0xF0 | buttons[16:19]
//! KeyboardMania (4):  u32 [buttons:31]
//! ```

use bytes::{BufMut, BytesMut};

use super::profile::{PeripheralProfile, ReportLayout};
use super::state::LogicalWheelState;

/// Encodes the state into the profile's report layout.
///
/// # Examples
///
/// ```
/// use joydev_pad::pad::profile::{PeripheralProfile, PeripheralType};
/// use joydev_pad::pad::report::encode_report;
/// use joydev_pad::pad::state::LogicalWheelState;
///
/// let profile = PeripheralProfile::for_type(PeripheralType::Buzz);
/// let state = LogicalWheelState::new(&profile);
/// assert_eq!(&encode_report(&profile, &state)[..], &[0x7F, 0x7F, 0x00, 0x00, 0xF0]);
/// ```
pub fn encode_report(profile: &PeripheralProfile, state: &LogicalWheelState) -> BytesMut {
    let mut report = BytesMut::with_capacity(8);
    let hat = u32::from(state.hat_switch.code() & 0x0F);

    match profile.layout {
        ReportLayout::Wheel10 => {
            report.put_u32_le((state.steering & 0x3FF) | ((state.buttons & 0xFFF) << 10) | (hat << 22));
            report.put_u8(state.throttle);
            report.put_u8(state.brake);
            report.put_u8(state.clutch);
        }
        ReportLayout::Wheel14 => {
            report.put_u32_le((state.steering & 0x3FFF) | ((state.buttons & 0x3FFF) << 14) | (hat << 28));
            report.put_u8(state.throttle);
            report.put_u8(state.brake);
        }
        ReportLayout::Seamic => {
            report.put_u8((state.steering & 0xFF) as u8);
            report.put_u8(state.throttle);
            report.put_u8(state.brake);
            report.put_u16_le((hat | ((state.buttons & 0xFFF) << 4)) as u16);
        }
        ReportLayout::Buzz => {
            let [b0, b1, b2, _] = state.buttons.to_le_bytes();
            report.put_slice(&[0x7F, 0x7F, b0, b1, 0xF0 | (b2 & 0x0F)]);
        }
        ReportLayout::KeyboardMania => {
            report.put_u32_le(state.buttons & 0x7FFF_FFFF);
        }
    }

    report
}

/// Writes the report into `out`, truncating or zero-padding to its length.
///
/// Returns `out.len()`.
pub fn write_report(profile: &PeripheralProfile, state: &LogicalWheelState, out: &mut [u8]) -> usize {
    let report = encode_report(profile, state);
    let len = report.len().min(out.len());

    out[..len].copy_from_slice(&report[..len]);
    out[len..].fill(0);
    out.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pad::profile::PeripheralType;
    use crate::pad::state::HatDirection;

    fn state_for(peripheral: PeripheralType) -> (PeripheralProfile, LogicalWheelState) {
        let profile = PeripheralProfile::for_type(peripheral);
        let state = LogicalWheelState::new(&profile);
        (profile, state)
    }

    #[test]
    fn test_wheel10_layout() {
        let (profile, mut state) = state_for(PeripheralType::Generic);
        state.steering = 0x3FF;
        state.buttons = 0b1010;
        state.hat_switch = HatDirection::West;
        state.throttle = 0x10;
        state.brake = 0x20;

        let report = encode_report(&profile, &state);
        assert_eq!(report.len(), 7);

        let word = u32::from_le_bytes([report[0], report[1], report[2], report[3]]);
        assert_eq!(word & 0x3FF, 0x3FF);
        assert_eq!((word >> 10) & 0xFFF, 0b1010);
        assert_eq!((word >> 22) & 0xF, 6);
        assert_eq!(&report[4..], &[0x10, 0x20, 0xFF]);
    }

    #[test]
    fn test_wheel14_layout() {
        let (profile, mut state) = state_for(PeripheralType::DrivingForcePro);
        state.buttons = 1 << 13;

        let report = encode_report(&profile, &state);
        assert_eq!(report.len(), 6);

        let word = u32::from_le_bytes([report[0], report[1], report[2], report[3]]);
        assert_eq!(word & 0x3FFF, 0x3FFF / 2);
        assert_eq!((word >> 14) & 0x3FFF, 1 << 13);
        assert_eq!(word >> 28, u32::from(HatDirection::Centered.code()));
        assert_eq!(&report[4..], &[0xFF, 0xFF]);
    }

    #[test]
    fn test_seamic_layout() {
        let (profile, mut state) = state_for(PeripheralType::SegaSeamic);
        state.buttons = 0b11;
        state.hat_switch = HatDirection::North;

        let report = encode_report(&profile, &state);
        assert_eq!(&report[..], &[127, 0xFF, 0xFF, 0x30, 0x00]);
    }

    #[test]
    fn test_buzz_layout() {
        let (profile, mut state) = state_for(PeripheralType::Buzz);
        state.buttons = (1 << 19) | (1 << 8) | 1;

        let report = encode_report(&profile, &state);
        assert_eq!(&report[..], &[0x7F, 0x7F, 0x01, 0x01, 0xF8]);
    }

    #[test]
    fn test_keyboard_mania_layout() {
        let (profile, mut state) = state_for(PeripheralType::KeyboardMania);
        state.buttons = u32::MAX;

        let report = encode_report(&profile, &state);
        assert_eq!(&report[..], &[0xFF, 0xFF, 0xFF, 0x7F]);
    }

    #[test]
    fn test_write_report_pads_and_truncates() {
        let (profile, state) = state_for(PeripheralType::KeyboardMania);

        let mut long = [0xAAu8; 8];
        assert_eq!(write_report(&profile, &state, &mut long), 8);
        assert_eq!(long, [0u8; 8]);

        let (profile, state) = state_for(PeripheralType::Generic);
        let mut short = [0u8; 2];
        assert_eq!(write_report(&profile, &state, &mut short), 2);
        let full = encode_report(&profile, &state);
        assert_eq!(&short[..], &full[..2]);
    }
}
