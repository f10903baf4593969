//! tracing-subscriber integration
//!
//! A fmt layer can write straight into a [`Logger`]:
//!
//! ```no_run
//! use std::sync::Arc;
//! use rollog::{Config, Level, Logger};
//!
//! # fn main() -> rollog::Result<()> {
//! let logger = Arc::new(Logger::open(Config::new("/var/log/app/trace.log", Level::Debug))?);
//! tracing_subscriber::fmt()
//!     .with_writer(Arc::clone(&logger))
//!     .with_ansi(false)
//!     .init();
//! # Ok(())
//! # }
//! ```
//!
//! Each formatted event goes through the same lock and rotation checks as the
//! logger's own records.

use std::io;

use tracing_subscriber::fmt::MakeWriter;

use super::writer::Logger;

impl io::Write for &Logger {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_raw(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Logger::flush(self)
    }
}

impl<'a> MakeWriter<'a> for Logger {
    type Writer = &'a Logger;

    fn make_writer(&'a self) -> Self::Writer {
        self
    }
}
