//! # joydev-pad
//!
//! Feeds an emulated wheel or pad from the joysticks attached to this
//! machine.
//!
//! ```text
//! joydev-pad [--list] [CONFIG]
//! ```
//!
//! `--list` prints every discovered joystick as a JSON line and exits.
//! Otherwise the pad described by `CONFIG` (default `config/default.toml`)
//! is opened and polled until Ctrl+C.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use joydev_pad::config::Config;
use joydev_pad::joystick::{enumerate_in, JOYSTICK_DIR};
use joydev_pad::pad::report::encode_report;
use joydev_pad::pad::{JoydevPad, PollStatus};

/// Configuration used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Number of reports between status log messages
const LOG_INTERVAL_REPORTS: u64 = 10_000;

#[derive(Debug, PartialEq, Eq)]
struct Args {
    list: bool,
    config_path: PathBuf,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut list = false;
    let mut config_path = None;

    for arg in args {
        match arg.as_str() {
            "--list" | "-l" => list = true,
            flag if flag.starts_with('-') => bail!("unknown option '{}'", flag),
            path => {
                if config_path.replace(PathBuf::from(path)).is_some() {
                    bail!("only one configuration file may be given");
                }
            }
        }
    }

    Ok(Args {
        list,
        config_path: config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
    })
}

fn list_devices(args: &Args) -> Result<()> {
    let input_dir = match Config::load(&args.config_path) {
        Ok(config) => config.pad.input_dir,
        Err(e) => {
            debug!("No usable configuration ({}), scanning {}", e, JOYSTICK_DIR);
            PathBuf::from(JOYSTICK_DIR)
        }
    };

    for device in enumerate_in(&input_dir) {
        println!("{}", serde_json::to_string(&device)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    if args.list {
        return list_devices(&args);
    }

    info!("joydev-pad v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::load(&args.config_path)
        .with_context(|| format!("loading {}", args.config_path.display()))?;

    let mut pad = JoydevPad::new(config.pad.peripheral, config.pad.port, Box::new(config.clone()))
        .with_paths(&config.pad.input_dir, &config.pad.sysfs_root);
    pad.open()?;

    if pad.session_count() == 0 {
        warn!("No joysticks found in {}", config.pad.input_dir.display());
    }

    let mut report = encode_report(pad.profile(), pad.state()).to_vec();
    let mut last_report = report.clone();
    let mut poll_interval = interval(Duration::from_micros(config.pad.poll_interval_us));

    info!("Polling every {}us", config.pad.poll_interval_us);
    info!("Press Ctrl+C to exit");

    let mut report_count: u64 = 0;

    loop {
        tokio::select! {
            _ = poll_interval.tick() => {
                if let PollStatus::Written(_) = pad.token_in(&mut report) {
                    report_count += 1;

                    if report != last_report {
                        debug!("Report: {:02X?}", report);
                        last_report.copy_from_slice(&report);
                    }

                    if report_count % LOG_INTERVAL_REPORTS == 0 {
                        info!("Produced {} reports", report_count);
                    }
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total reports produced: {}", report_count);
                break;
            }
        }
    }

    pad.close();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_default_args() {
        let parsed = args(&[]).unwrap();
        assert!(!parsed.list);
        assert_eq!(parsed.config_path, PathBuf::from("config/default.toml"));
    }

    #[test]
    fn test_list_with_config() {
        let parsed = args(&["--list", "/etc/joydev-pad.toml"]).unwrap();
        assert!(parsed.list);
        assert_eq!(parsed.config_path, PathBuf::from("/etc/joydev-pad.toml"));
    }

    #[test]
    fn test_unknown_option() {
        assert!(args(&["--verbose"]).is_err());
    }

    #[test]
    fn test_two_config_paths() {
        assert!(args(&["a.toml", "b.toml"]).is_err());
    }
}
