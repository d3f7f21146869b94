//! # Joystick-Backed Pad
//!
//! Aggregates every physical joystick into one emulated peripheral.
//!
//! `open` discovers devices and builds a session for each, `token_in`
//! drains whatever input is ready into the shared state and serializes it,
//! `token_out` forwards feedback commands and `close` releases everything.
//! All operations are non-blocking.

use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use std::os::fd::AsFd;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::mapping::{ForceFeedbackSettings, MappingProvider};
use super::profile::{PeripheralProfile, PeripheralType};
use super::report::write_report;
use super::session::DeviceSession;
use super::state::LogicalWheelState;
use crate::error::Result;
use crate::ffb::{
    self, EventDeviceChannel, FeedbackChannel, FeedbackCommandParser, ForceFeedbackBridge, SYSFS_INPUT_CLASS,
};
use crate::joystick::{enumerate_in, JOYSTICK_DIR};

/// Outcome of an input poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    /// No device had new input; the state was not touched.
    Nak,
    /// A fresh report of this many bytes was written.
    Written(usize),
}

/// Opens the force feedback device found for a joystick.
pub type ChannelOpener = Box<dyn Fn(&Path) -> Result<Box<dyn FeedbackChannel>>>;

fn open_event_device(path: &Path) -> Result<Box<dyn FeedbackChannel>> {
    Ok(Box::new(EventDeviceChannel::open(path)?))
}

/// One emulated peripheral fed by any number of joysticks.
pub struct JoydevPad {
    profile: PeripheralProfile,
    port: u32,
    input_dir: PathBuf,
    sysfs_root: PathBuf,
    provider: Box<dyn MappingProvider>,
    state: LogicalWheelState,
    sessions: Vec<DeviceSession>,
    ffb: ForceFeedbackBridge,
    open_channel: ChannelOpener,
}

impl std::fmt::Debug for JoydevPad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoydevPad")
            .field("profile", &self.profile)
            .field("port", &self.port)
            .field("state", &self.state)
            .field("sessions", &self.sessions)
            .field("ffb", &self.ffb)
            .finish_non_exhaustive()
    }
}

impl JoydevPad {
    /// Creates a closed pad for a peripheral variant on a port.
    pub fn new(peripheral: PeripheralType, port: u32, provider: Box<dyn MappingProvider>) -> Self {
        let profile = PeripheralProfile::for_type(peripheral);
        Self {
            profile,
            port,
            input_dir: PathBuf::from(JOYSTICK_DIR),
            sysfs_root: PathBuf::from(SYSFS_INPUT_CLASS),
            provider,
            state: LogicalWheelState::new(&profile),
            sessions: Vec::new(),
            ffb: ForceFeedbackBridge::new(profile.high_resolution),
            open_channel: Box::new(open_event_device),
        }
    }

    /// Overrides where joysticks and their sysfs entries are looked up.
    #[must_use]
    pub fn with_paths<P: Into<PathBuf>, Q: Into<PathBuf>>(mut self, input_dir: P, sysfs_root: Q) -> Self {
        self.input_dir = input_dir.into();
        self.sysfs_root = sysfs_root.into();
        self
    }

    /// Installs the parser that turns outgoing commands into effects.
    #[must_use]
    pub fn with_parser(mut self, parser: Box<dyn FeedbackCommandParser>) -> Self {
        self.ffb.set_parser(parser);
        self
    }

    /// Replaces how force feedback devices are opened.
    #[must_use]
    pub fn with_channel_opener(mut self, opener: ChannelOpener) -> Self {
        self.open_channel = opener;
        self
    }

    /// Discovers joysticks and prepares a session for each.
    ///
    /// Devices that cannot be opened are skipped with a warning, as is a
    /// missing force feedback device. Reopening first closes everything.
    ///
    /// # Errors
    ///
    /// Device problems never fail the call; the result is reserved for
    /// setup errors that leave the pad unusable.
    pub fn open(&mut self) -> Result<()> {
        self.close();
        self.state = LogicalWheelState::new(&self.profile);

        for device in enumerate_in(&self.input_dir) {
            let opened = DeviceSession::open(&device, &self.profile, self.port, self.provider.as_ref());
            let session = match opened {
                Ok(session) => session,
                Err(e) => {
                    warn!("Skipping {}: {}", device.path.display(), e);
                    continue;
                }
            };

            self.attach_feedback(&session);
            self.sessions.push(session);
        }

        info!(
            "{} on port {} ready with {} device(s)",
            self.profile.peripheral.as_str(),
            self.port,
            self.sessions.len()
        );
        Ok(())
    }

    /// Opens force feedback through `session` when it is the first
    /// steering device of a wheel.
    ///
    /// A missing or unopenable event device only logs a warning.
    fn attach_feedback(&mut self, session: &DeviceSession) {
        if !self.profile.is_wheel() || !session.has_steering() || self.ffb.is_open() {
            return;
        }

        let joystick = session.path();
        let Some(event_path) = ffb::find_event_device(&self.sysfs_root, &self.input_dir, joystick) else {
            warn!("No force feedback device found for {}", joystick.display());
            return;
        };

        match (self.open_channel)(&event_path) {
            Ok(mut channel) => {
                let settings = ForceFeedbackSettings::load(self.provider.as_ref(), self.profile.peripheral, self.port);
                ffb::apply_settings(&mut *channel, &settings);
                self.ffb.attach(channel);
                info!("Force feedback for {} through {}", joystick.display(), event_path.display());
            }
            Err(e) => warn!("Force feedback unavailable: {}", e),
        }
    }

    /// Drains ready input and writes the current report into `buf`.
    ///
    /// Returns `Nak` without touching the state when no device is ready.
    pub fn token_in(&mut self, buf: &mut [u8]) -> PollStatus {
        let ready = self.ready_sessions();
        if ready.is_empty() {
            return PollStatus::Nak;
        }

        for index in ready {
            let applied = self.sessions[index].drain(&self.profile, &mut self.state);
            debug!("{}: applied {} event(s)", self.sessions[index].name(), applied);
        }

        self.state.resolve_hat();
        PollStatus::Written(write_report(&self.profile, &self.state, buf))
    }

    fn ready_sessions(&self) -> Vec<usize> {
        if self.sessions.is_empty() {
            return Vec::new();
        }

        let mut fds: Vec<PollFd> = self
            .sessions
            .iter()
            .map(|session| PollFd::new(session.as_fd(), PollFlags::POLLIN))
            .collect();

        match poll(&mut fds, PollTimeout::ZERO) {
            Ok(0) => Vec::new(),
            Ok(_) => fds
                .iter()
                .enumerate()
                .filter(|(_, fd)| fd.revents().is_some_and(|r| r.contains(PollFlags::POLLIN)))
                .map(|(index, _)| index)
                .collect(),
            Err(e) => {
                debug!("poll failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Forwards a feedback command. The whole buffer is always consumed.
    pub fn token_out(&mut self, buf: &[u8]) -> usize {
        self.ffb.send(buf)
    }

    /// Releases every device handle. Safe to call repeatedly.
    pub fn close(&mut self) {
        if !self.sessions.is_empty() {
            debug!("Closing {} device(s)", self.sessions.len());
        }
        self.sessions.clear();
        self.ffb.close();
    }

    /// The aggregated state.
    pub fn state(&self) -> &LogicalWheelState {
        &self.state
    }

    /// The active peripheral profile.
    pub fn profile(&self) -> &PeripheralProfile {
        &self.profile
    }

    /// Number of open devices.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// True while a force feedback device is open.
    pub fn has_feedback(&self) -> bool {
        self.ffb.is_open()
    }

    #[cfg(test)]
    pub(crate) fn add_session(&mut self, session: DeviceSession) {
        self.sessions.push(session);
    }
}

impl Drop for JoydevPad {
    fn drop(&mut self) {
        self.close();
    }
}
