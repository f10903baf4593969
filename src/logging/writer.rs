//! The synchronized write path
//!
//! Every record, whatever entry point it came through, is formatted, checked
//! against the rotation policy, written, and optionally mirrored to stdout
//! while holding the logger's one mutex. Faults found under the lock are
//! collected into a [`Report`] and surfaced only after the lock is released.

use std::cell::Cell;
use std::fmt;
use std::io::{self, Write};
use std::mem;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::level::Level;

use super::clock::{Clock, SystemClock};
use super::header::{format_header, CallSite};
use super::registry::PathClaim;
use super::rotation::{overflow_name, scheduled_name, Policy, Rotation};
use super::session::{absolute_path, FileSession};

/// Exit status used after a fatal record
const FATAL_EXIT_CODE: i32 = 1;

/// Counters describing a logger's history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Bytes in the file currently open at the logical path
    pub current_size: u64,
    /// Scheduled rotations whose rename succeeded
    pub scheduled_rotations: u64,
    /// Overflow rotations whose rename succeeded
    pub overflow_rotations: u64,
    /// Failed writes, renames, reopens, syncs and console echoes
    pub write_faults: u64,
    /// Records dropped because the logger was closed
    pub writes_after_close: u64,
}

/// A leveled file logger with time and size based rotation
///
/// A `Logger` is `Send + Sync`; share it between threads with an `Arc`.
pub struct Logger {
    level: Level,
    path: PathBuf,
    console: AtomicBool,
    clock: Arc<dyn Clock>,
    state: Mutex<State>,
    writes_after_close: AtomicU64,
}

/// Everything the lock protects
struct State {
    /// `None` while open means the last reopen failed; the next write retries
    session: Option<FileSession>,
    /// Dropped on close, which is also what marks the logger closed
    claim: Option<PathClaim>,
    policy: Policy,
    next_rotation: Option<DateTime<Local>>,
    ordinal: u32,
    scratch: Vec<u8>,
    scheduled_rotations: u64,
    overflow_rotations: u64,
    write_faults: u64,
}

#[derive(thiserror::Error, Debug)]
enum Fault {
    #[error("write failed: {0}")]
    Write(#[source] io::Error),

    #[error("rename to {} failed: {source}", dest.display())]
    Rename {
        dest: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("reopen failed: {0}")]
    Reopen(#[source] Error),

    #[error("console write failed: {0}")]
    Console(#[source] io::Error),

    #[error("sync failed: {0}")]
    Sync(#[source] io::Error),
}

/// What happened during one locked write, reported after unlocking
#[derive(Default)]
struct Report {
    rotated: Option<(Rotation, PathBuf)>,
    faults: Vec<Fault>,
}

thread_local! {
    static REPORTING: Cell<bool> = const { Cell::new(false) };
}

impl Report {
    /// Print faults to stderr and emit tracing events.
    ///
    /// A tracing subscriber may itself write into a logger; events raised
    /// while this thread is already reporting go to stderr only.
    fn emit(self, path: &Path) {
        if self.rotated.is_none() && self.faults.is_empty() {
            return;
        }

        let nested = REPORTING.with(|flag| flag.replace(true));

        if let (Some((rotation, dest)), false) = (&self.rotated, nested) {
            tracing::debug!(
                target: "rollog",
                path = %path.display(),
                rotated_to = %dest.display(),
                kind = ?rotation,
                "rotated log file"
            );
        }

        for fault in &self.faults {
            let _ = writeln!(io::stderr(), "rollog: {}: {}", path.display(), fault);
            if !nested {
                tracing::warn!(target: "rollog", path = %path.display(), "{}", fault);
            }
        }

        if !nested {
            REPORTING.with(|flag| flag.set(false));
        }
    }
}

impl State {
    fn is_open(&self) -> bool {
        self.claim.is_some()
    }

    /// Rotate if the policy says so, then append `record`
    fn commit(
        &mut self,
        path: &Path,
        now: &DateTime<Local>,
        record: &[u8],
        console: bool,
    ) -> Report {
        let mut report = Report::default();

        if self.session.is_none() {
            match FileSession::open(path) {
                Ok(session) => self.session = Some(session),
                Err(e) => report.faults.push(Fault::Reopen(e)),
            }
        }

        if let Some(size) = self.session.as_ref().map(FileSession::size) {
            let decision = self.policy.decide(now, self.next_rotation.as_ref(), size);
            if decision.reschedule {
                self.next_rotation = self
                    .next_rotation
                    .as_ref()
                    .map(|next| self.policy.advance(next, now));
            }
            match decision.rotation {
                Rotation::None => {}
                Rotation::Scheduled => {
                    self.ordinal = 0;
                    self.rotate(path, now, Rotation::Scheduled, &mut report);
                }
                Rotation::Overflow => {
                    self.ordinal += 1;
                    self.rotate(path, now, Rotation::Overflow, &mut report);
                }
            }
        }

        if let Some(session) = self.session.as_mut() {
            if let Err(e) = session.write(record) {
                report.faults.push(Fault::Write(e));
            }
        }

        if console {
            let mut stdout = io::stdout().lock();
            if let Err(e) = stdout.write_all(record).and_then(|()| stdout.flush()) {
                report.faults.push(Fault::Console(e));
            }
        }

        self.write_faults += report.faults.len() as u64;
        report
    }

    fn rotate(&mut self, path: &Path, now: &DateTime<Local>, kind: Rotation, report: &mut Report) {
        let Some(session) = self.session.take() else {
            return;
        };

        let dest = self.destination(path, now, kind);
        let rotated = session.rotate(&dest);

        match rotated.renamed {
            Ok(()) => {
                match kind {
                    Rotation::Scheduled => self.scheduled_rotations += 1,
                    Rotation::Overflow => self.overflow_rotations += 1,
                    Rotation::None => {}
                }
                report.rotated = Some((kind, dest));
            }
            Err(source) => report.faults.push(Fault::Rename { dest, source }),
        }
        match rotated.reopened {
            Ok(session) => self.session = Some(session),
            Err(e) => report.faults.push(Fault::Reopen(e)),
        }
    }

    /// Name for the file being rotated out; never an existing file
    fn destination(&mut self, path: &Path, now: &DateTime<Local>, kind: Rotation) -> PathBuf {
        if kind == Rotation::Scheduled {
            let name = scheduled_name(path, now, self.policy.is_sub_hour());
            if !name.exists() {
                return name;
            }
            self.ordinal += 1;
        }

        loop {
            let name = overflow_name(path, now, self.ordinal);
            if !name.exists() {
                return name;
            }
            self.ordinal += 1;
        }
    }
}

impl Logger {
    /// Validate `config`, claim its path and open the log file
    pub fn open(config: Config) -> Result<Self> {
        Self::open_with_clock(config, Arc::new(SystemClock))
    }

    /// Like [`Logger::open`], reading time from `clock`
    pub fn open_with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let policy = config.policy()?;
        let path = absolute_path(config.logical_path()?)?;
        let claim = PathClaim::acquire(path.clone())?;
        let session = FileSession::open(&path)?;

        let next_rotation = policy.first_rotation(&clock.now());

        tracing::debug!(
            target: "rollog",
            path = %path.display(),
            size = session.size(),
            next_rotation = ?next_rotation,
            "opened log file"
        );

        Ok(Self {
            level: config.level,
            path,
            console: AtomicBool::new(config.console),
            clock,
            state: Mutex::new(State {
                session: Some(session),
                claim: Some(claim),
                policy,
                next_rotation,
                ordinal: 0,
                scratch: Vec::with_capacity(256),
                scheduled_rotations: 0,
                overflow_rotations: 0,
                write_faults: 0,
            }),
            writes_after_close: AtomicU64::new(0),
        })
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Absolute logical path
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_open()
    }

    /// Next instant a write will trigger a scheduled rotation
    pub fn next_rotation(&self) -> Option<DateTime<Local>> {
        self.lock().next_rotation
    }

    pub fn set_console_mirror(&self, enabled: bool) {
        self.console.store(enabled, Ordering::Relaxed);
    }

    pub fn console_mirror(&self) -> bool {
        self.console.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> Stats {
        let state = self.lock();
        Stats {
            current_size: state.session.as_ref().map_or(0, FileSession::size),
            scheduled_rotations: state.scheduled_rotations,
            overflow_rotations: state.overflow_rotations,
            write_faults: state.write_faults,
            writes_after_close: self.writes_after_close.load(Ordering::Relaxed),
        }
    }

    /// Write one record; a fatal record terminates the process afterwards
    pub fn log(&self, level: Level, site: CallSite, args: fmt::Arguments<'_>) {
        self.record(level, site, args);
        if level == Level::Fatal {
            process::exit(FATAL_EXIT_CODE);
        }
    }

    /// Write a fatal record attributed to `site`, then exit with status 1
    pub fn fatal_at(&self, site: CallSite, args: fmt::Arguments<'_>) -> ! {
        self.record(Level::Fatal, site, args);
        process::exit(FATAL_EXIT_CODE)
    }

    #[track_caller]
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.record(Level::Debug, CallSite::caller(), args);
    }

    #[track_caller]
    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.record(Level::Info, CallSite::caller(), args);
    }

    #[track_caller]
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.record(Level::Warn, CallSite::caller(), args);
    }

    #[track_caller]
    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.record(Level::Error, CallSite::caller(), args);
    }

    #[track_caller]
    pub fn fatal(&self, args: fmt::Arguments<'_>) -> ! {
        self.fatal_at(CallSite::caller(), args)
    }

    fn record(&self, level: Level, site: CallSite, args: fmt::Arguments<'_>) {
        if level < self.level {
            return;
        }

        let report = {
            let mut state = self.lock();
            if !state.is_open() {
                self.writes_after_close.fetch_add(1, Ordering::Relaxed);
                return;
            }

            let now = self.clock.now();
            let mut scratch = mem::take(&mut state.scratch);
            scratch.clear();
            format_header(&mut scratch, &now, level, &site);
            let _ = scratch.write_fmt(args);
            if scratch.last() != Some(&b'\n') {
                scratch.push(b'\n');
            }

            let mut report = state.commit(&self.path, &now, &scratch, self.console_mirror());
            if level == Level::Fatal {
                let synced = state.session.as_mut().map_or(Ok(()), FileSession::sync);
                if let Err(e) = synced {
                    report.faults.push(Fault::Sync(e));
                    state.write_faults += 1;
                }
            }
            state.scratch = scratch;
            report
        };

        report.emit(&self.path);
    }

    /// Append already formatted bytes through the rotation path.
    ///
    /// Skips the level filter and the header; used by the tracing sink.
    pub fn write_raw(&self, record: &[u8]) {
        let report = {
            let mut state = self.lock();
            if !state.is_open() {
                self.writes_after_close.fetch_add(1, Ordering::Relaxed);
                return;
            }
            let now = self.clock.now();
            state.commit(&self.path, &now, record, self.console_mirror())
        };

        report.emit(&self.path);
    }

    pub fn flush(&self) -> io::Result<()> {
        match self.lock().session.as_mut() {
            Some(session) => session.flush(),
            None => Ok(()),
        }
    }

    /// Flush and release the file and the path claim.
    ///
    /// Later writes are dropped and counted in [`Stats::writes_after_close`].
    /// Closing twice is harmless.
    pub fn close(&self) {
        let (session, claim) = {
            let mut state = self.lock();
            (state.session.take(), state.claim.take())
        };

        if let Some(mut session) = session {
            let _ = session.flush();
        }
        // A subscriber may write through this logger, so the lock is released
        // before the event and the event sees a closed logger
        if claim.is_some() {
            drop(claim);
            tracing::debug!(target: "rollog", path = %self.path.display(), "closed log file");
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("path", &self.path)
            .field("level", &self.level)
            .field("console", &self.console_mirror())
            .finish_non_exhaustive()
    }
}
