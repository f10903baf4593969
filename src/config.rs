//! Logger configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::level::Level;
use crate::logging::rotation::Policy;

/// Shortest accepted rotation interval
pub const MIN_ROTATE_INTERVAL_SECS: u64 = 60;

/// Longest accepted rotation interval (366 days)
pub const MAX_ROTATE_INTERVAL_SECS: u64 = 366 * 24 * 60 * 60;

/// Configuration for one log target
///
/// Hosts may embed this in their own configuration; every field except `path`
/// and `level` has a default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Logical path records are written to; rotated files are derived from it
    pub path: PathBuf,

    /// Minimum severity written
    pub level: Level,

    /// Size in bytes that triggers an overflow rotation (None or 0 disables)
    #[serde(default)]
    pub max_size_bytes: Option<u64>,

    /// Scheduled rotation period in seconds (None disables, minimum 60)
    #[serde(default)]
    pub rotate_interval_secs: Option<u64>,

    /// Echo every record to stdout
    #[serde(default)]
    pub console: bool,
}

impl Config {
    /// Create a configuration with both rotation triggers disabled
    pub fn new(path: impl Into<PathBuf>, level: Level) -> Self {
        Self {
            path: path.into(),
            level,
            max_size_bytes: None,
            rotate_interval_secs: None,
            console: false,
        }
    }

    /// Specifies the size ceiling in bytes
    pub fn with_max_size_bytes(mut self, bytes: u64) -> Self {
        self.max_size_bytes = Some(bytes);
        self
    }

    /// Specifies the scheduled rotation period
    pub fn with_rotate_interval(mut self, interval: Duration) -> Self {
        self.rotate_interval_secs = Some(interval.as_secs());
        self
    }

    /// Specifies whether records are mirrored to stdout
    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    /// Scheduled rotation period, if enabled
    pub fn rotate_interval(&self) -> Option<Duration> {
        self.rotate_interval_secs.map(Duration::from_secs)
    }

    pub(crate) fn logical_path(&self) -> Result<&Path> {
        if self.path.as_os_str().is_empty() {
            return Err(Error::Config("path empty".to_string()));
        }
        if self.path.file_name().is_none() {
            return Err(Error::Config(format!(
                "path has no file name: {}",
                self.path.display()
            )));
        }
        Ok(&self.path)
    }

    /// Validate the rotation settings and build the policy they describe
    pub(crate) fn policy(&self) -> Result<Policy> {
        let size_ceiling = self.max_size_bytes.filter(|&bytes| bytes > 0);

        let interval = match self.rotate_interval_secs {
            None => None,
            Some(secs) if secs < MIN_ROTATE_INTERVAL_SECS => {
                return Err(Error::Config(format!(
                    "rotation interval must be at least {}s, got {}s",
                    MIN_ROTATE_INTERVAL_SECS, secs
                )));
            }
            Some(secs) if secs > MAX_ROTATE_INTERVAL_SECS => {
                return Err(Error::Config(format!(
                    "rotation interval out of range: {}s",
                    secs
                )));
            }
            Some(secs) => Some(TimeDelta::seconds(secs as i64)),
        };

        Ok(Policy::new(size_ceiling, interval))
    }
}
