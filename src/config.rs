//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! The loaded [`Config`] doubles as the read-only [`MappingProvider`] for
//! the pad: `[devices."<name>"]` tables assign raw joystick indices to
//! logical controls and `[force_feedback]` supplies gain and autocenter.

use serde::de::Error;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{JoydevError, Result};
use crate::ffb::SYSFS_INPUT_CLASS;
use crate::joystick::JOYSTICK_DIR;
use crate::pad::mapping::{MappingProvider, Setting};
use crate::pad::profile::PeripheralType;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub pad: PadConfig,

    #[serde(default)]
    pub force_feedback: ForceFeedbackConfig,

    /// Control assignments keyed by joystick name
    #[serde(default)]
    pub devices: HashMap<String, DeviceMapping>,
}

/// Emulated peripheral configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PadConfig {
    #[serde(default = "default_peripheral")]
    pub peripheral: PeripheralType,

    #[serde(default)]
    pub port: u32,

    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: PathBuf,

    #[serde(default = "default_poll_interval_us")]
    pub poll_interval_us: u64,
}

/// Force feedback configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ForceFeedbackConfig {
    #[serde(default = "default_true")]
    pub gain_enabled: bool,

    #[serde(default = "default_percent")]
    pub gain: i32,

    #[serde(default = "default_true")]
    pub autocenter_managed: bool,

    #[serde(default = "default_percent")]
    pub autocenter: i32,
}

impl Default for ForceFeedbackConfig {
    fn default() -> Self {
        Self {
            gain_enabled: default_true(),
            gain: default_percent(),
            autocenter_managed: default_true(),
            autocenter: default_percent(),
        }
    }
}

/// Assignments for one physical joystick
///
/// Each entry is the raw index driving that logical control; `-1` leaves
/// it unassigned.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct DeviceMapping {
    /// Raw button per logical button, in pad order (CROSS, SQUARE, ...)
    #[serde(default)]
    pub buttons: Vec<i32>,

    /// Raw axis for steering, throttle and brake
    #[serde(default)]
    pub axes: Vec<i32>,

    #[serde(default)]
    pub invert_steering: bool,

    #[serde(default)]
    pub invert_throttle: bool,

    #[serde(default)]
    pub invert_brake: bool,
}

// Default value functions
fn default_peripheral() -> PeripheralType { PeripheralType::Generic }
fn default_input_dir() -> PathBuf { PathBuf::from(JOYSTICK_DIR) }
fn default_sysfs_root() -> PathBuf { PathBuf::from(SYSFS_INPUT_CLASS) }
fn default_poll_interval_us() -> u64 { 1000 }

fn default_true() -> bool { true }
fn default_percent() -> i32 { 100 }

fn raw_index(value: Option<&i32>) -> Option<usize> {
    value.and_then(|&v| usize::try_from(v).ok())
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use joydev_pad::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.pad.input_dir.as_os_str().is_empty() {
            return Err(JoydevError::Config(toml::de::Error::custom("input_dir cannot be empty")));
        }

        if self.pad.sysfs_root.as_os_str().is_empty() {
            return Err(JoydevError::Config(toml::de::Error::custom("sysfs_root cannot be empty")));
        }

        if self.pad.poll_interval_us < 100 || self.pad.poll_interval_us > 1_000_000 {
            return Err(JoydevError::Config(toml::de::Error::custom(
                "poll_interval_us must be between 100 and 1000000",
            )));
        }

        for (name, value) in [("gain", self.force_feedback.gain), ("autocenter", self.force_feedback.autocenter)] {
            if !(0..=100).contains(&value) {
                return Err(JoydevError::Config(toml::de::Error::custom(format!(
                    "{} must be between 0 and 100",
                    name
                ))));
            }
        }

        for (device, mapping) in &self.devices {
            if mapping.axes.len() > 3 {
                return Err(JoydevError::Config(toml::de::Error::custom(format!(
                    "device '{}': axes takes at most 3 entries (steering, throttle, brake)",
                    device
                ))));
            }

            if let Some(bad) = mapping.buttons.iter().chain(&mapping.axes).find(|&&v| v < -1) {
                return Err(JoydevError::Config(toml::de::Error::custom(format!(
                    "device '{}': index {} is invalid (use -1 for unassigned)",
                    device, bad
                ))));
            }
        }

        Ok(())
    }

    fn applies_to(&self, peripheral: PeripheralType, port: u32) -> bool {
        self.pad.peripheral == peripheral && self.pad.port == port
    }

    fn device(&self, peripheral: PeripheralType, port: u32, device_id: &str) -> Option<&DeviceMapping> {
        if !self.applies_to(peripheral, port) {
            return None;
        }
        self.devices.get(device_id)
    }
}

impl MappingProvider for Config {
    fn axis_button_mapping(
        &self,
        peripheral: PeripheralType,
        port: u32,
        device_id: &str,
        max_buttons: usize,
        max_axes: usize,
    ) -> Vec<Option<usize>> {
        let Some(mapping) = self.device(peripheral, port, device_id) else {
            return vec![None; max_buttons + max_axes];
        };

        (0..max_buttons)
            .map(|i| raw_index(mapping.buttons.get(i)))
            .chain((0..max_axes).map(|i| raw_index(mapping.axes.get(i))))
            .collect()
    }

    fn scalar_setting(&self, peripheral: PeripheralType, port: u32, setting: Setting) -> Option<i32> {
        if !self.applies_to(peripheral, port) {
            return None;
        }

        let ffb = &self.force_feedback;
        Some(match setting {
            Setting::GainEnabled => i32::from(ffb.gain_enabled),
            Setting::Gain => ffb.gain,
            Setting::AutocenterManaged => i32::from(ffb.autocenter_managed),
            Setting::Autocenter => ffb.autocenter,
        })
    }

    fn inverted(&self, peripheral: PeripheralType, port: u32, device_id: &str) -> [bool; 3] {
        self.device(peripheral, port, device_id)
            .map_or([false; 3], |m| [m.invert_steering, m.invert_throttle, m.invert_brake])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pad::mapping::ForceFeedbackSettings;

    const WHEEL_TOML: &str = r#"
        [pad]
        peripheral = "driving_force_pro"
        port = 1

        [force_feedback]
        gain = 60
        autocenter_managed = false

        [devices."Logitech G29 Driving Force Racing Wheel"]
        buttons = [1, 0, 2, 3, -1, 5]
        axes = [0, 2, 3]
        invert_throttle = true
    "#;

    const G29: &str = "Logitech G29 Driving Force Racing Wheel";

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_toml("[pad]\n").unwrap();
        assert_eq!(config.pad.peripheral, PeripheralType::Generic);
        assert_eq!(config.pad.port, 0);
        assert_eq!(config.pad.input_dir, PathBuf::from("/dev/input"));
        assert_eq!(config.pad.sysfs_root, PathBuf::from("/sys/class/input"));
        assert_eq!(config.pad.poll_interval_us, 1000);
        assert_eq!(config.force_feedback, ForceFeedbackConfig::default());
        assert!(config.devices.is_empty());
    }

    #[test]
    fn test_missing_pad_section() {
        let result = Config::from_toml("[force_feedback]\ngain = 10\n");
        assert!(matches!(result, Err(JoydevError::Config(_))));
    }

    #[test]
    fn test_unknown_peripheral() {
        let result = Config::from_toml("[pad]\nperipheral = \"flight_stick\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_peripheral_names() {
        for (name, expected) in [
            ("generic", PeripheralType::Generic),
            ("driving_force_pro", PeripheralType::DrivingForcePro),
            ("driving_force_pro_1102", PeripheralType::DrivingForcePro1102),
            ("gt_force", PeripheralType::GtForce),
            ("sega_seamic", PeripheralType::SegaSeamic),
            ("buzz", PeripheralType::Buzz),
            ("keyboard_mania", PeripheralType::KeyboardMania),
        ] {
            let config = Config::from_toml(&format!("[pad]\nperipheral = \"{}\"\n", name)).unwrap();
            assert_eq!(config.pad.peripheral, expected);
            assert_eq!(expected.as_str(), name);
        }
    }

    #[test]
    fn test_gain_out_of_range() {
        let result = Config::from_toml("[pad]\n[force_feedback]\ngain = 101\n");
        assert!(result.is_err());

        let result = Config::from_toml("[pad]\n[force_feedback]\nautocenter = -1\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_poll_interval_bounds() {
        assert!(Config::from_toml("[pad]\npoll_interval_us = 99\n").is_err());
        assert!(Config::from_toml("[pad]\npoll_interval_us = 100\n").is_ok());
        assert!(Config::from_toml("[pad]\npoll_interval_us = 1000001\n").is_err());
    }

    #[test]
    fn test_empty_input_dir() {
        assert!(Config::from_toml("[pad]\ninput_dir = \"\"\n").is_err());
    }

    #[test]
    fn test_too_many_axes() {
        let result = Config::from_toml("[pad]\n[devices.wheel]\naxes = [0, 1, 2, 3]\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_index_below_unassigned() {
        let result = Config::from_toml("[pad]\n[devices.wheel]\nbuttons = [0, -2]\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_mapping_for_known_device() {
        let config = Config::from_toml(WHEEL_TOML).unwrap();
        let controls = config.axis_button_mapping(PeripheralType::DrivingForcePro, 1, G29, 16, 3);

        assert_eq!(controls.len(), 19);
        assert_eq!(&controls[..6], &[Some(1), Some(0), Some(2), Some(3), None, Some(5)]);
        assert!(controls[6..16].iter().all(Option::is_none));
        assert_eq!(&controls[16..], &[Some(0), Some(2), Some(3)]);
        assert_eq!(config.inverted(PeripheralType::DrivingForcePro, 1, G29), [false, true, false]);
    }

    #[test]
    fn test_mapping_for_unknown_device() {
        let config = Config::from_toml(WHEEL_TOML).unwrap();
        let controls = config.axis_button_mapping(PeripheralType::DrivingForcePro, 1, "Gamepad", 16, 3);
        assert_eq!(controls, vec![None; 19]);
        assert_eq!(config.inverted(PeripheralType::DrivingForcePro, 1, "Gamepad"), [false; 3]);
    }

    #[test]
    fn test_mapping_ignored_for_other_pads() {
        let config = Config::from_toml(WHEEL_TOML).unwrap();

        let other_port = config.axis_button_mapping(PeripheralType::DrivingForcePro, 0, G29, 16, 3);
        assert_eq!(other_port, vec![None; 19]);

        let other_type = config.axis_button_mapping(PeripheralType::Buzz, 1, G29, 20, 0);
        assert_eq!(other_type, vec![None; 20]);
        assert_eq!(config.scalar_setting(PeripheralType::Buzz, 1, Setting::Gain), None);
    }

    #[test]
    fn test_force_feedback_settings_from_config() {
        let config = Config::from_toml(WHEEL_TOML).unwrap();
        let settings = ForceFeedbackSettings::load(&config, PeripheralType::DrivingForcePro, 1);

        assert!(settings.gain_enabled);
        assert_eq!(settings.gain, 60);
        assert!(!settings.autocenter_managed);
        assert_eq!(settings.autocenter, 100);
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(WHEEL_TOML.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.pad.peripheral, PeripheralType::DrivingForcePro);
        assert_eq!(config.devices.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/joydev-pad.toml");
        assert!(matches!(result, Err(JoydevError::Io(_))));
    }

    #[test]
    fn test_shipped_default_config() {
        let config = Config::load(concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml")).unwrap();
        assert_eq!(config.pad.poll_interval_us, 1000);
    }
}
