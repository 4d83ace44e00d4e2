use std::fs::{File, OpenOptions};
use std::io::{Read as _, Seek as _, SeekFrom, Write as _};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use crate::constants::{LOCK_FILE_NAME, LOCK_POLL_MS};
use crate::types::errors::{Error, ErrorKind, Result};
use fs2::FileExt;

use super::{LockGuard, LockManager};

/// Workspace lock backed by an advisory `flock` on `<dir>/mendyard.lock`.
///
/// The holder writes its pid into the file so a rival run can name who is blocking it.
#[derive(Debug)]
pub struct FileLockManager {
    path: PathBuf,
}

impl FileLockManager {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Lock file placed directly under `dir` (normally the backup root).
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(LOCK_FILE_NAME))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<File> {
        let io_err = |e: std::io::Error| Error::new(ErrorKind::Io, format!("{}: {e}", self.path.display()));
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        // Not truncated here: the current holder's pid must survive a rival's open.
        OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .map_err(io_err)
    }
}

fn holder_pid(file: &mut File) -> Option<u32> {
    let mut buf = String::new();
    file.seek(SeekFrom::Start(0)).ok()?;
    file.read_to_string(&mut buf).ok()?;
    buf.trim().parse().ok()
}

fn stamp_pid(file: &mut File) -> std::io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    writeln!(file, "{}", std::process::id())?;
    file.flush()
}

struct WorkspaceGuard {
    file: File,
}

impl Drop for WorkspaceGuard {
    fn drop(&mut self) {
        let _ = self.file.set_len(0);
        let _ = self.file.unlock();
    }
}

impl LockGuard for WorkspaceGuard {}

impl LockManager for FileLockManager {
    fn acquire_process_lock(&self, timeout_ms: u64) -> Result<Box<dyn LockGuard>> {
        let mut file = self.open()?;
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        while file.try_lock_exclusive().is_err() {
            if Instant::now() >= deadline {
                let who = holder_pid(&mut file).map_or_else(String::new, |pid| format!(" (held by pid {pid})"));
                return Err(Error::new(
                    ErrorKind::Locking,
                    format!("timeout acquiring {} after {timeout_ms}ms{who}", self.path.display()),
                ));
            }
            thread::sleep(Duration::from_millis(LOCK_POLL_MS));
        }
        // Advisory content only; a failed stamp does not invalidate the lock.
        if let Err(e) = stamp_pid(&mut file) {
            log::debug!("could not record pid in {}: {e}", self.path.display());
        }
        Ok(Box::new(WorkspaceGuard { file }))
    }
}
