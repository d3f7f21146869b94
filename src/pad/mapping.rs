//! # Control Mapping
//!
//! Logical control tags, the per-index slot type used by device sessions,
//! and the mapping provider seam that supplies user assignments.
//!
//! The provider returns one entry per logical control: the first
//! `max_buttons` entries are buttons, the following `max_axes` entries are
//! steering, throttle and brake. Each entry is the raw device index the
//! control is assigned to, or `None`.

use super::profile::PeripheralType;

/// Axis controls a raw axis can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisControl {
    Steering,
    Throttle,
    Brake,
    HatHorizontal,
    HatVertical,
}

impl AxisControl {
    /// Logical axis slot order used by the mapping provider.
    pub const LOGICAL: [AxisControl; 3] = [AxisControl::Steering, AxisControl::Throttle, AxisControl::Brake];

    /// Control for a logical axis slot.
    #[must_use]
    pub fn from_logical(index: usize) -> Option<Self> {
        Self::LOGICAL.get(index).copied()
    }
}

/// What a raw axis or button index drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Slot {
    #[default]
    Unmapped,
    Axis(AxisControl),
    /// Logical button index.
    Button(usize),
}

/// Scalar settings read from the mapping provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setting {
    GainEnabled,
    Gain,
    AutocenterManaged,
    Autocenter,
}

/// Source of user control assignments and force-feedback settings.
#[cfg_attr(test, mockall::automock)]
pub trait MappingProvider {
    /// Raw index assigned to each logical control, buttons first.
    fn axis_button_mapping(
        &self,
        peripheral: PeripheralType,
        port: u32,
        device_id: &str,
        max_buttons: usize,
        max_axes: usize,
    ) -> Vec<Option<usize>>;

    /// A scalar setting, `None` when not configured.
    fn scalar_setting(&self, peripheral: PeripheralType, port: u32, setting: Setting) -> Option<i32>;

    /// Inversion flags for steering, throttle and brake.
    fn inverted(&self, peripheral: PeripheralType, port: u32, device_id: &str) -> [bool; 3];
}

/// Force-feedback settings resolved from a provider.
///
/// Gain and autocenter are percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForceFeedbackSettings {
    pub gain_enabled: bool,
    pub gain: i32,
    pub autocenter_managed: bool,
    pub autocenter: i32,
}

impl Default for ForceFeedbackSettings {
    fn default() -> Self {
        Self {
            gain_enabled: true,
            gain: 100,
            autocenter_managed: true,
            autocenter: 100,
        }
    }
}

impl ForceFeedbackSettings {
    /// Reads the settings, falling back to the defaults for missing keys.
    pub fn load(provider: &dyn MappingProvider, peripheral: PeripheralType, port: u32) -> Self {
        let defaults = Self::default();
        let get = |setting| provider.scalar_setting(peripheral, port, setting);

        Self {
            gain_enabled: get(Setting::GainEnabled).map_or(defaults.gain_enabled, |v| v != 0),
            gain: get(Setting::Gain).unwrap_or(defaults.gain).clamp(0, 100),
            autocenter_managed: get(Setting::AutocenterManaged)
                .map_or(defaults.autocenter_managed, |v| v != 0),
            autocenter: get(Setting::Autocenter).unwrap_or(defaults.autocenter).clamp(0, 100),
        }
    }
}
