//! Joystick discovery.
//!
//! Scans the joystick device directory for `js*` nodes and reports the ones
//! that answer a name query. Enumeration never fails; unusable nodes are
//! skipped with a warning.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::Joystick;

/// Directory holding the kernel joystick nodes.
pub const JOYSTICK_DIR: &str = "/dev/input";

/// File name prefix of joystick nodes.
const JOYSTICK_PREFIX: &str = "js";

/// A joystick found during enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredDevice {
    /// Name reported by the driver.
    pub name: String,
    /// Stable identifier used to look up mappings (the name).
    pub identifier: String,
    /// Device node path.
    pub path: PathBuf,
}

/// Enumerates joysticks under `/dev/input`.
pub fn enumerate() -> Vec<DiscoveredDevice> {
    enumerate_in(Path::new(JOYSTICK_DIR))
}

/// Enumerates joysticks under `dir`, sorted by path.
pub fn enumerate_in(dir: &Path) -> Vec<DiscoveredDevice> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Error opening {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().starts_with(JOYSTICK_PREFIX))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();

    let mut devices = Vec::with_capacity(paths.len());
    for path in paths {
        // The handle is dropped at the end of each iteration.
        let joystick = match Joystick::open(&path, false) {
            Ok(joystick) => joystick,
            Err(e) => {
                warn!("Joydev: {}", e);
                continue;
            }
        };

        match joystick.name() {
            Ok(name) => {
                debug!("Found joystick {} at {}", name, path.display());
                devices.push(DiscoveredDevice {
                    identifier: name.clone(),
                    name,
                    path,
                });
            }
            Err(e) => warn!("Joydev: name query failed for {}: {}", path.display(), e),
        }
    }

    devices
}
