//! The single open file behind a logger

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Resolve `path` to an absolute path, creating its parent directory
///
/// Two spellings of the same file resolve to the same path, which is what the
/// open-path registry keys on.
pub(crate) fn absolute_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::Config(format!("path has no file name: {}", path.display())))?;

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().map_err(|e| Error::io(path, e))?,
    };
    fs::create_dir_all(&parent).map_err(|e| Error::io(&parent, e))?;
    let parent = parent.canonicalize().map_err(|e| Error::io(&parent, e))?;

    Ok(parent.join(file_name))
}

/// Result of closing, renaming and reopening a session
pub(crate) struct Rotated {
    pub renamed: io::Result<()>,
    pub reopened: Result<FileSession>,
}

/// An append-mode handle plus the number of bytes in the file
#[derive(Debug)]
pub(crate) struct FileSession {
    path: PathBuf,
    file: File,
    size: u64,
}

impl FileSession {
    /// Open or create `path` for appending, creating missing parent directories
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| Error::io(path, e))?;
        let size = file.metadata().map_err(|e| Error::io(path, e))?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            size,
        })
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Append all of `buf`.
    ///
    /// The size counter includes whatever part of `buf` reached the file, even
    /// when the write fails halfway.
    pub fn write(&mut self, mut buf: &[u8]) -> io::Result<usize> {
        let mut written = 0;
        while !buf.is_empty() {
            match self.file.write(buf) {
                Ok(0) => return Err(io::Error::from(io::ErrorKind::WriteZero)),
                Ok(n) => {
                    written += n;
                    self.size += n as u64;
                    buf = &buf[n..];
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(written)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    /// Flush and push file data to the device
    pub fn sync(&mut self) -> io::Result<()> {
        self.file.flush()?;
        self.file.sync_data()
    }

    /// Close the handle, move the file to `dest` and open a fresh file at
    /// the original path.
    ///
    /// The reopen is attempted whether or not the rename worked.
    pub fn rotate(self, dest: &Path) -> Rotated {
        let FileSession { path, file, .. } = self;
        drop(file);

        let renamed = fs::rename(&path, dest);
        let reopened = FileSession::open(&path);

        Rotated { renamed, reopened }
    }
}
