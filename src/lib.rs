//! rollog - leveled file logging with time and size based rotation
//!
//! A [`Logger`] appends timestamped, leveled lines to one file and rolls that
//! file over when a rotation interval elapses or a size ceiling is reached.
//! The rolled-over file is renamed with a date suffix
//! (`app.log20240115_10`, or `app.log20240115_10_42.1` for size rotations) and
//! a fresh file is opened at the original path.
//!
//! ## Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use rollog::{Config, Level, Logger};
//!
//! # fn main() -> rollog::Result<()> {
//! let config = Config::new("/var/log/myapp/app.log", Level::Info)
//!     .with_max_size_bytes(64 * 1024 * 1024)
//!     .with_rotate_interval(Duration::from_secs(3600));
//!
//! let logger = Logger::open(config)?;
//! logger.info(format_args!("listening on port {}", 8080));
//! rollog::warn!(logger, "cache miss ratio {:.2}", 0.37);
//! logger.close();
//! # Ok(())
//! # }
//! ```
//!
//! Rotation is checked lazily when a record is written; an idle logger does
//! not rotate until its next record.

mod config;
mod error;
pub mod global;
mod level;
mod logging;
mod macros;

pub use config::{Config, MAX_ROTATE_INTERVAL_SECS, MIN_ROTATE_INTERVAL_SECS};
pub use error::{Error, Result};
pub use level::Level;
pub use logging::rotation;
pub use logging::{format_header, CallSite, Clock, Logger, Rotation, Stats, SystemClock};
