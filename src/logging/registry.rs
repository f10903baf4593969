//! Process-wide set of paths that currently have a logger

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{Error, Result};

static OPEN_PATHS: Mutex<Vec<PathBuf>> = Mutex::new(Vec::new());

fn open_paths() -> MutexGuard<'static, Vec<PathBuf>> {
    OPEN_PATHS.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Exclusive claim on a logical path, released on drop
#[derive(Debug)]
pub(crate) struct PathClaim {
    path: PathBuf,
}

impl PathClaim {
    pub fn acquire(path: PathBuf) -> Result<Self> {
        let mut open = open_paths();
        if open.contains(&path) {
            return Err(Error::AlreadyOpen(path));
        }
        open.push(path.clone());
        Ok(Self { path })
    }
}

impl Drop for PathClaim {
    fn drop(&mut self) {
        open_paths().retain(|path| path != &self.path);
    }
}
