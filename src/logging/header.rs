//! Record header rendering
//!
//! Writes `YYYY/MM/DD HH:MM:SS.mmmmmm <tag> <file>:<line>: ` straight into the
//! caller's buffer, digit by digit, so the hot path never goes through
//! `format!`.

use std::panic::Location;

use chrono::{DateTime, Datelike, TimeZone, Timelike};

use crate::level::Level;

/// Source location a record is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    file: &'static str,
    line: u32,
}

impl CallSite {
    pub const fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }

    /// Location of the caller, propagated through `#[track_caller]` frames
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(location.file(), location.line())
    }

    pub fn file(&self) -> &'static str {
        self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    /// Final component of the source path
    pub fn short_file(&self) -> &'static str {
        match self.file.rfind(['/', '\\']) {
            Some(pos) => &self.file[pos + 1..],
            None => self.file,
        }
    }
}

/// Append the header for one record to `buf`
pub fn format_header<Tz: TimeZone>(
    buf: &mut Vec<u8>,
    now: &DateTime<Tz>,
    level: Level,
    site: &CallSite,
) {
    push_padded(buf, now.year().max(0) as u32, 4);
    buf.push(b'/');
    push_padded(buf, now.month(), 2);
    buf.push(b'/');
    push_padded(buf, now.day(), 2);
    buf.push(b' ');
    push_padded(buf, now.hour(), 2);
    buf.push(b':');
    push_padded(buf, now.minute(), 2);
    buf.push(b':');
    push_padded(buf, now.second(), 2);
    buf.push(b'.');
    // leap seconds report nanos >= 1e9
    push_padded(buf, (now.nanosecond() / 1_000).min(999_999), 6);
    buf.push(b' ');
    buf.extend_from_slice(level.tag().as_bytes());
    buf.push(b' ');
    buf.extend_from_slice(site.short_file().as_bytes());
    buf.push(b':');
    push_padded(buf, site.line(), 1);
    buf.extend_from_slice(b": ");
}

/// Decimal `value`, left-padded with zeros to at least `width` digits
fn push_padded(buf: &mut Vec<u8>, mut value: u32, width: usize) {
    let mut digits = [0u8; 10];
    let mut pos = digits.len();
    while value >= 10 || width > digits.len() - pos + 1 {
        pos -= 1;
        digits[pos] = b'0' + (value % 10) as u8;
        value /= 10;
    }
    pos -= 1;
    digits[pos] = b'0' + value as u8;
    buf.extend_from_slice(&digits[pos..]);
}
