//! Locating the event device behind a joystick node.
//!
//! The kernel exposes every input handler of a device under the same parent
//! in sysfs, so `/sys/class/input/js<N>/device/event<M>` exists when
//! `/dev/input/event<M>` belongs to the same device as `/dev/input/js<N>`.

use std::path::{Path, PathBuf};
use tracing::debug;

/// sysfs class directory of input handlers.
pub const SYSFS_INPUT_CLASS: &str = "/sys/class/input";

/// Highest event handler index probed.
pub const MAX_EVENT_INDEX: u32 = 99;

/// Numeric suffix of a joystick node (`js3` -> 3).
#[must_use]
pub fn joystick_index(path: &Path) -> Option<u32> {
    let name = path.file_name()?.to_str()?;
    let digits: String = name
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Finds the event device sharing a parent with `joystick`.
///
/// Probes event indices `0..=MAX_EVENT_INDEX` and returns the matching node
/// under `input_dir`, or `None` when no handler matches.
pub fn find_event_device(sysfs_root: &Path, input_dir: &Path, joystick: &Path) -> Option<PathBuf> {
    let index = joystick_index(joystick)?;
    let parent = sysfs_root.join(format!("js{}", index)).join("device");

    let found = (0..=MAX_EVENT_INDEX).find(|j| parent.join(format!("event{}", j)).is_dir())?;
    let path = input_dir.join(format!("event{}", found));
    debug!("{} pairs with {}", joystick.display(), path.display());
    Some(path)
}
