//! Atomic content replacement primitives and helpers.
//!
//! Writes follow a TOCTOU-safe sequence using directory handles:
//! `open_dir_nofollow(parent) -> openat(tmp, O_CREAT|O_TRUNC) -> write+fsync -> renameat(tmp, final) -> fsync(dirfd)`.
//!
//! Temporary names are deterministic (`.{fname}{suffix}`). Only one batch ever
//! writes a given resource at a time, so two writers never race on the same
//! temporary name.
use std::fs;
use std::io::Write as _;
use std::os::unix::fs::PermissionsExt as _;
use std::path::Path;
use std::time::Instant;

use rustix::fd::OwnedFd;
use rustix::fs::{fchmod, openat, renameat, unlinkat, AtFlags, Mode, OFlags, CWD};
use rustix::io::Errno;

fn errno_to_io(e: Errno) -> std::io::Error {
    std::io::Error::from_raw_os_error(e.raw_os_error())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Open a directory with `O_DIRECTORY` | `O_NOFOLLOW` for atomic operations.
///
/// # Errors
///
/// Returns an IO error if the directory cannot be opened.
pub fn open_dir_nofollow(dir: &Path) -> std::io::Result<OwnedFd> {
    openat(
        CWD,
        dir,
        OFlags::RDONLY | OFlags::DIRECTORY | OFlags::CLOEXEC | OFlags::NOFOLLOW,
        Mode::empty(),
    )
    .map_err(errno_to_io)
}

/// Fsync the parent directory of `path` for durability.
///
/// # Errors
///
/// Returns an IO error if the parent directory cannot be opened or fsynced.
pub fn fsync_parent_dir(path: &Path) -> std::io::Result<()> {
    let dir = fs::File::open(parent_dir(path))?;
    dir.sync_all()
}

/// Atomically replace the content of `target` with `bytes`.
///
/// The existing permission bits of `target` are preserved; when the target does not
/// exist `fallback_mode` is used (or `0o644`). Returns the elapsed milliseconds of
/// the rename + directory fsync step.
///
/// # Errors
///
/// Returns an IO error if any step fails. On failure the temporary file is removed
/// best-effort and `target` is left untouched.
pub fn atomic_write(
    target: &Path,
    bytes: &[u8],
    tmp_suffix: &str,
    fallback_mode: Option<u32>,
) -> std::io::Result<u64> {
    let parent = parent_dir(target);
    let Some(fname) = target.file_name() else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "target has no file name",
        ));
    };
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(fname);
    tmp_name.push(tmp_suffix);

    let mode = fs::metadata(target)
        .map(|m| m.permissions().mode() & 0o7777)
        .ok()
        .or(fallback_mode)
        .unwrap_or(0o644);

    let dirfd = open_dir_nofollow(parent)?;

    // Stale temporary from an interrupted run; ignore ENOENT only
    match unlinkat(&dirfd, tmp_name.as_os_str(), AtFlags::empty()) {
        Ok(()) => {}
        Err(e) if e == Errno::NOENT => {}
        Err(e) => return Err(errno_to_io(e)),
    }

    let tmpfd = openat(
        &dirfd,
        tmp_name.as_os_str(),
        OFlags::WRONLY | OFlags::CREATE | OFlags::EXCL | OFlags::CLOEXEC,
        Mode::from_bits_truncate(0o600),
    )
    .map_err(errno_to_io)?;
    let mut tmp = fs::File::from(tmpfd);
    let staged = tmp
        .write_all(bytes)
        .and_then(|()| tmp.sync_all())
        .and_then(|()| fchmod(&tmp, Mode::from_bits_truncate(mode)).map_err(errno_to_io));
    if let Err(e) = staged {
        let _ = unlinkat(&dirfd, tmp_name.as_os_str(), AtFlags::empty());
        return Err(e);
    }
    drop(tmp);

    let t0 = Instant::now();
    if let Err(e) = renameat(&dirfd, tmp_name.as_os_str(), &dirfd, fname) {
        let _ = unlinkat(&dirfd, tmp_name.as_os_str(), AtFlags::empty());
        return Err(errno_to_io(e));
    }
    let _ = rustix::fs::fsync(&dirfd);
    Ok(u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX))
}
