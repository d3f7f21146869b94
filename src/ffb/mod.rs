//! # Force Feedback Module
//!
//! The feedback side of the emulated wheel.
//!
//! This module handles:
//! - Finding the event device that belongs to a joystick
//! - Opening it and applying gain and autocenter settings
//! - Forwarding outgoing command buffers to a command parser
//!
//! Decoding the command payloads into effects is the parser's job; this
//! module only owns the channel and hands both to the parser.

pub mod discovery;
pub mod event_device;

use evdev::{EventType, InputEvent};
use std::io;
use tracing::{debug, warn};

use crate::pad::mapping::ForceFeedbackSettings;

pub use discovery::{find_event_device, joystick_index, SYSFS_INPUT_CLASS};
pub use event_device::EventDeviceChannel;

/// `FF_GAIN` force-feedback code.
pub const FF_GAIN: u16 = 0x60;
/// `FF_AUTOCENTER` force-feedback code.
pub const FF_AUTOCENTER: u16 = 0x61;

/// Converts a percentage into the kernel's 16-bit level.
#[must_use]
pub fn percent_to_level(percent: i32) -> i32 {
    0xFFFF * percent.clamp(0, 100) / 100
}

/// A device that accepts force-feedback input events.
pub trait FeedbackChannel {
    /// Writes raw input events to the device.
    fn write_events(&mut self, events: &[InputEvent]) -> io::Result<()>;

    /// Sets the overall force gain, in percent.
    fn set_gain(&mut self, percent: i32) -> io::Result<()> {
        let event = InputEvent::new(EventType::FORCEFEEDBACK, FF_GAIN, percent_to_level(percent));
        self.write_events(&[event])
    }

    /// Sets the autocenter spring strength, in percent.
    fn set_autocenter(&mut self, percent: i32) -> io::Result<()> {
        let event = InputEvent::new(EventType::FORCEFEEDBACK, FF_AUTOCENTER, percent_to_level(percent));
        self.write_events(&[event])
    }
}

/// Turns outgoing command buffers into effects on a channel.
pub trait FeedbackCommandParser {
    /// Parses one command buffer and drives the channel accordingly.
    fn parse(&mut self, channel: &mut dyn FeedbackChannel, command: &[u8], high_resolution: bool);
}

/// Applies gain and autocenter settings to a freshly opened channel.
///
/// Failures are logged; the channel stays usable.
pub fn apply_settings(channel: &mut dyn FeedbackChannel, settings: &ForceFeedbackSettings) {
    if settings.gain_enabled {
        if let Err(e) = channel.set_gain(settings.gain) {
            warn!("Failed to set force feedback gain: {}", e);
        }
    }

    if settings.autocenter_managed {
        if let Err(e) = channel.set_autocenter(settings.autocenter) {
            warn!("Failed to set autocenter: {}", e);
        }
    }
}

/// The feedback channel of one emulated peripheral and its command parser.
pub struct ForceFeedbackBridge {
    channel: Option<Box<dyn FeedbackChannel>>,
    parser: Option<Box<dyn FeedbackCommandParser>>,
    high_resolution: bool,
}

impl std::fmt::Debug for ForceFeedbackBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForceFeedbackBridge")
            .field("open", &self.channel.is_some())
            .field("has_parser", &self.parser.is_some())
            .field("high_resolution", &self.high_resolution)
            .finish()
    }
}

impl ForceFeedbackBridge {
    /// Creates a bridge with no channel and no parser.
    #[must_use]
    pub fn new(high_resolution: bool) -> Self {
        Self {
            channel: None,
            parser: None,
            high_resolution,
        }
    }

    /// Installs the command parser.
    pub fn set_parser(&mut self, parser: Box<dyn FeedbackCommandParser>) {
        self.parser = Some(parser);
    }

    /// Takes ownership of an opened channel.
    pub fn attach(&mut self, channel: Box<dyn FeedbackChannel>) {
        self.channel = Some(channel);
    }

    /// True once a channel is attached.
    pub fn is_open(&self) -> bool {
        self.channel.is_some()
    }

    /// Forwards a command buffer to the parser.
    ///
    /// The whole buffer is always reported as consumed.
    pub fn send(&mut self, command: &[u8]) -> usize {
        match (self.parser.as_mut(), self.channel.as_mut()) {
            (Some(parser), Some(channel)) => parser.parse(&mut **channel, command, self.high_resolution),
            _ => debug!("Dropping {} byte feedback command (no channel)", command.len()),
        }
        command.len()
    }

    /// Releases the channel. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.channel = None;
    }
}

#[cfg(test)]
pub(crate) mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every event written as `(type, code, value)`.
    #[derive(Clone, Default)]
    pub struct RecordingChannel {
        pub written: Arc<Mutex<Vec<(u16, u16, i32)>>>,
        pub fail: bool,
    }

    impl RecordingChannel {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn get_written(&self) -> Vec<(u16, u16, i32)> {
            self.written.lock().unwrap().clone()
        }
    }

    impl FeedbackChannel for RecordingChannel {
        fn write_events(&mut self, events: &[InputEvent]) -> io::Result<()> {
            if self.fail {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "Mock write error"));
            }
            let mut written = self.written.lock().unwrap();
            for event in events {
                written.push((event.event_type().0, event.code(), event.value()));
            }
            Ok(())
        }
    }

    /// Records every command handed to it and echoes its first byte as gain.
    #[derive(Clone, Default)]
    pub struct RecordingParser {
        pub commands: Arc<Mutex<Vec<(Vec<u8>, bool)>>>,
    }

    impl RecordingParser {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn get_commands(&self) -> Vec<(Vec<u8>, bool)> {
            self.commands.lock().unwrap().clone()
        }
    }

    impl FeedbackCommandParser for RecordingParser {
        fn parse(&mut self, channel: &mut dyn FeedbackChannel, command: &[u8], high_resolution: bool) {
            self.commands.lock().unwrap().push((command.to_vec(), high_resolution));
            if let Some(&first) = command.first() {
                let _ = channel.set_gain(i32::from(first));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::*;
    use super::*;

    const EV_FF: u16 = 0x15;

    #[test]
    fn test_percent_to_level() {
        assert_eq!(percent_to_level(0), 0);
        assert_eq!(percent_to_level(100), 0xFFFF);
        assert_eq!(percent_to_level(50), 0x7FFF);
        assert_eq!(percent_to_level(150), 0xFFFF);
        assert_eq!(percent_to_level(-5), 0);
    }

    #[test]
    fn test_apply_settings_writes_gain_and_autocenter() {
        let mut channel = RecordingChannel::new();
        let settings = ForceFeedbackSettings {
            gain_enabled: true,
            gain: 100,
            autocenter_managed: true,
            autocenter: 0,
        };

        apply_settings(&mut channel, &settings);
        assert_eq!(
            channel.get_written(),
            vec![(EV_FF, FF_GAIN, 0xFFFF), (EV_FF, FF_AUTOCENTER, 0)]
        );
    }

    #[test]
    fn test_apply_settings_respects_disabled_flags() {
        let mut channel = RecordingChannel::new();
        let settings = ForceFeedbackSettings {
            gain_enabled: false,
            gain: 30,
            autocenter_managed: false,
            autocenter: 30,
        };

        apply_settings(&mut channel, &settings);
        assert!(channel.get_written().is_empty());
    }

    #[test]
    fn test_apply_settings_tolerates_write_errors() {
        let mut channel = RecordingChannel::failing();
        apply_settings(&mut channel, &ForceFeedbackSettings::default());
        assert!(channel.get_written().is_empty());
    }

    #[test]
    fn test_send_without_channel_consumes_buffer() {
        let parser = RecordingParser::new();
        let mut bridge = ForceFeedbackBridge::new(false);
        bridge.set_parser(Box::new(parser.clone()));

        assert_eq!(bridge.send(&[1, 2, 3]), 3);
        assert!(parser.get_commands().is_empty());
    }

    #[test]
    fn test_send_forwards_to_parser() {
        let parser = RecordingParser::new();
        let channel = RecordingChannel::new();
        let mut bridge = ForceFeedbackBridge::new(true);
        bridge.set_parser(Box::new(parser.clone()));
        bridge.attach(Box::new(channel.clone()));

        assert_eq!(bridge.send(&[50, 0, 0, 0, 0, 0, 0]), 7);
        assert_eq!(parser.get_commands(), vec![(vec![50, 0, 0, 0, 0, 0, 0], true)]);
        assert_eq!(channel.get_written(), vec![(EV_FF, FF_GAIN, 0x7FFF)]);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut bridge = ForceFeedbackBridge::new(false);
        bridge.attach(Box::new(RecordingChannel::new()));
        assert!(bridge.is_open());

        bridge.close();
        bridge.close();
        assert!(!bridge.is_open());
        assert_eq!(bridge.send(&[0; 4]), 4);
    }
}
