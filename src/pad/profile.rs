//! # Peripheral Profiles
//!
//! Per-variant configuration of the emulated peripheral: control budget,
//! steering resolution, report layout and force-feedback resolution.
//! A profile is chosen once when the pad is created.
//!
//! | Peripheral | Buttons | Axes | Steering range | Report |
//! |------------|---------|------|----------------|--------|
//! | Generic wheel | 16 | 3 | 0-1023 | 10-bit wheel |
//! | Driving Force Pro | 16 | 3 | 0-16383 | 14-bit wheel |
//! | Driving Force Pro (rev 1102) | 16 | 3 | 0-16383 | 14-bit wheel |
//! | GT Force | 16 | 3 | 0-1023 | 10-bit wheel |
//! | Sega Seamic | 16 | 3 | 0-255 | Seamic |
//! | Buzz | 20 | 0 | - | Buzz |
//! | KeyboardMania | 31 | 0 | - | KeyboardMania |

use serde::Deserialize;

/// Number of logical wheel buttons (the slots before STEERING).
pub const WHEEL_BUTTONS: usize = 16;

/// Number of logical wheel axes (steering, throttle, brake).
pub const WHEEL_AXES: usize = 3;

/// Number of Buzz buttons (4 buzzers x 5 buttons).
pub const BUZZ_BUTTONS: usize = 20;

/// Number of KeyboardMania keys.
pub const KEYBOARDMANIA_BUTTONS: usize = 31;

/// Logical wheel button indices.
pub mod buttons {
    pub const CROSS: usize = 0;
    pub const SQUARE: usize = 1;
    pub const CIRCLE: usize = 2;
    pub const TRIANGLE: usize = 3;
    pub const R1: usize = 4;
    pub const L1: usize = 5;
    pub const R2: usize = 6;
    pub const L2: usize = 7;
    pub const SELECT: usize = 8;
    pub const START: usize = 9;
    pub const R3: usize = 10;
    pub const L3: usize = 11;
    pub const DOWN: usize = 12;
    pub const LEFT: usize = 13;
    pub const UP: usize = 14;
    pub const RIGHT: usize = 15;
}

/// Emulated peripheral variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeripheralType {
    Generic,
    DrivingForcePro,
    #[serde(rename = "driving_force_pro_1102")]
    DrivingForcePro1102,
    GtForce,
    SegaSeamic,
    Buzz,
    KeyboardMania,
}

impl PeripheralType {
    /// Name used as the settings key prefix.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PeripheralType::Generic => "generic",
            PeripheralType::DrivingForcePro => "driving_force_pro",
            PeripheralType::DrivingForcePro1102 => "driving_force_pro_1102",
            PeripheralType::GtForce => "gt_force",
            PeripheralType::SegaSeamic => "sega_seamic",
            PeripheralType::Buzz => "buzz",
            PeripheralType::KeyboardMania => "keyboard_mania",
        }
    }
}

/// Byte layout of the state report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLayout {
    /// 10-bit steering, 12 buttons, hat, throttle, brake, clutch.
    Wheel10,
    /// 14-bit steering, 14 buttons, hat, throttle, brake.
    Wheel14,
    /// 8-bit steering, throttle, brake, hat and buttons.
    Seamic,
    /// Four buzzers of five buttons.
    Buzz,
    /// 31 key bitmap.
    KeyboardMania,
}

/// Everything that depends on the peripheral variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeripheralProfile {
    pub peripheral: PeripheralType,
    /// Logical buttons requested from the mapping provider.
    pub max_buttons: usize,
    /// Logical axes requested from the mapping provider.
    pub max_axes: usize,
    /// Largest steering value; centre is half of it.
    pub range_max: u32,
    pub layout: ReportLayout,
    /// Feedback commands use the high-resolution encoding.
    pub high_resolution: bool,
}

impl PeripheralProfile {
    /// Builds the profile for a peripheral variant.
    #[must_use]
    pub fn for_type(peripheral: PeripheralType) -> Self {
        let wheel = |range_max, layout| Self {
            peripheral,
            max_buttons: WHEEL_BUTTONS,
            max_axes: WHEEL_AXES,
            range_max,
            layout,
            high_resolution: false,
        };

        match peripheral {
            PeripheralType::Generic | PeripheralType::GtForce => wheel(0x3FF, ReportLayout::Wheel10),
            PeripheralType::DrivingForcePro => Self {
                high_resolution: true,
                ..wheel(0x3FFF, ReportLayout::Wheel14)
            },
            PeripheralType::DrivingForcePro1102 => wheel(0x3FFF, ReportLayout::Wheel14),
            PeripheralType::SegaSeamic => wheel(0xFF, ReportLayout::Seamic),
            PeripheralType::Buzz => Self {
                peripheral,
                max_buttons: BUZZ_BUTTONS,
                max_axes: 0,
                range_max: 0x3FF,
                layout: ReportLayout::Buzz,
                high_resolution: false,
            },
            PeripheralType::KeyboardMania => Self {
                peripheral,
                max_buttons: KEYBOARDMANIA_BUTTONS,
                max_axes: 0,
                range_max: 0x3FF,
                layout: ReportLayout::KeyboardMania,
                high_resolution: false,
            },
        }
    }

    /// True for variants with steering/pedal axes and force feedback.
    #[must_use]
    pub fn is_wheel(&self) -> bool {
        self.max_axes > 0
    }

    /// Steering centre value.
    #[must_use]
    pub fn steering_center(&self) -> u32 {
        self.range_max / 2
    }

    /// Output bit for a logical button index.
    ///
    /// The GT Force wires its face and shoulder buttons differently from the
    /// other wheels; every other variant uses the logical index directly.
    #[must_use]
    pub fn button_bit(&self, logical: usize) -> u32 {
        let bit = match self.peripheral {
            PeripheralType::GtForce => match logical {
                buttons::L1 => buttons::SQUARE,
                buttons::R1 => buttons::CROSS,
                buttons::SQUARE => buttons::CIRCLE,
                buttons::CROSS => buttons::TRIANGLE,
                buttons::CIRCLE => buttons::L1,
                buttons::TRIANGLE => buttons::R1,
                other => other,
            },
            _ => logical,
        };
        bit as u32
    }
}
