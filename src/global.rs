//! Optional process-wide default logger
//!
//! Nothing here is required: a [`Logger`] works on its own and can be passed
//! around as an `Arc<Logger>`. The slot exists for programs that want free
//! functions instead of threading a handle through every call.

use std::fmt;
use std::process;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{Error, Result};
use crate::level::Level;
use crate::logging::{CallSite, Logger};

static DEFAULT: RwLock<Option<Arc<Logger>>> = RwLock::new(None);

/// Make `logger` the default; fails if one is already installed
pub fn install(logger: impl Into<Arc<Logger>>) -> Result<Arc<Logger>> {
    let mut slot = DEFAULT.write().unwrap_or_else(PoisonError::into_inner);
    if slot.is_some() {
        return Err(Error::DefaultInstalled);
    }
    let logger = logger.into();
    *slot = Some(Arc::clone(&logger));
    Ok(logger)
}

/// The installed default, if any
pub fn get() -> Option<Arc<Logger>> {
    DEFAULT
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Remove and close the default logger
pub fn shutdown() -> Option<Arc<Logger>> {
    let logger = DEFAULT
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    if let Some(logger) = &logger {
        logger.close();
    }
    logger
}

fn record(level: Level, site: CallSite, args: fmt::Arguments<'_>) {
    if let Some(logger) = get() {
        logger.log(level, site, args);
    }
}

#[track_caller]
pub fn debug(args: fmt::Arguments<'_>) {
    record(Level::Debug, CallSite::caller(), args);
}

#[track_caller]
pub fn info(args: fmt::Arguments<'_>) {
    record(Level::Info, CallSite::caller(), args);
}

#[track_caller]
pub fn warn(args: fmt::Arguments<'_>) {
    record(Level::Warn, CallSite::caller(), args);
}

#[track_caller]
pub fn error(args: fmt::Arguments<'_>) {
    record(Level::Error, CallSite::caller(), args);
}

/// Write a fatal record to the default logger, if any, then exit with status 1
#[track_caller]
pub fn fatal(args: fmt::Arguments<'_>) -> ! {
    let site = CallSite::caller();
    match get() {
        Some(logger) => logger.fatal_at(site, args),
        None => process::exit(1),
    }
}
