use std::fs;
use std::io::Write as _;
use std::os::unix::fs::PermissionsExt as _;
use std::path::{Path, PathBuf};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::constants::SIDECAR_SCHEMA;
use crate::fs::meta::{sha256_hex, sha256_hex_of};
use crate::logging::TS_ZERO;
use crate::types::{BackupError, BackupRecord, ResourceId};

use super::sidecar::{write_sidecar, BackupSidecar};
use super::FsBackupStore;

/// Timestamp directory name: `YYYYMMDDTHHMMSS_ffffff` (UTC), fixed width so names sort by time.
#[must_use]
pub fn timestamp_dir_name(now: OffsetDateTime) -> String {
    format!(
        "{:04}{:02}{:02}T{:02}{:02}{:02}_{:06}",
        now.year(),
        u8::from(now.month()),
        now.day(),
        now.hour(),
        now.minute(),
        now.second(),
        now.microsecond()
    )
}

/// Compute the payload path for a snapshot, bumping a numeric suffix on the timestamp
/// directory until the path is unused.
fn unique_payload_path(run_dir: &Path, ts: &str, rel: &Path) -> PathBuf {
    let mut candidate = run_dir.join(ts).join(rel);
    let mut bump: u32 = 0;
    while candidate.exists() {
        bump = bump.saturating_add(1);
        candidate = run_dir.join(format!("{ts}_{bump}")).join(rel);
    }
    candidate
}

impl FsBackupStore {
    /// Copy the resource's current bytes to
    /// `<backup_root>/<run_id>/<timestamp>/<resource_relative_path>` and write its sidecar.
    ///
    /// # Errors
    ///
    /// - `Unreadable` if the resource cannot be read.
    /// - `Write` if the payload or sidecar cannot be written.
    /// - `Integrity` / `HashMismatch` if the written payload differs from the source bytes.
    pub(crate) fn create_snapshot(
        &self,
        run_id: &str,
        resource: &ResourceId,
    ) -> Result<BackupRecord, BackupError> {
        let src = resource.resolve(&self.workspace);
        let bytes = fs::read(&src).map_err(|source| BackupError::Unreadable {
            path: src.clone(),
            source,
        })?;
        let mode = fs::metadata(&src)
            .ok()
            .map(|m| format!("{:o}", m.permissions().mode() & 0o7777));
        let expected_hash = sha256_hex(&bytes);

        let now = OffsetDateTime::now_utc();
        let created_at = now.format(&Rfc3339).unwrap_or_else(|_| TS_ZERO.to_string());
        let run_dir = self.backup_root.join(run_id);
        let payload = unique_payload_path(&run_dir, &timestamp_dir_name(now), resource.rel());

        let write_err = |source: std::io::Error| BackupError::Write {
            path: payload.clone(),
            source,
        };
        if let Some(parent) = payload.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let mut f = fs::File::create(&payload).map_err(write_err)?;
        f.write_all(&bytes).map_err(write_err)?;
        f.sync_all().map_err(write_err)?;
        drop(f);

        // Integrity: size first, then content hash
        let actual = fs::metadata(&payload).map_err(write_err)?.len();
        let expected = bytes.len() as u64;
        if actual != expected {
            return Err(BackupError::Integrity {
                path: payload.clone(),
                expected,
                actual,
            });
        }
        if sha256_hex_of(&payload).as_deref() != Some(expected_hash.as_str()) {
            return Err(BackupError::HashMismatch {
                path: payload.clone(),
            });
        }

        let sc = BackupSidecar {
            schema: SIDECAR_SCHEMA.to_string(),
            tag: self.tag.clone(),
            run_id: run_id.to_string(),
            resource_id: resource.clone(),
            size: expected,
            sha256: expected_hash,
            created_at,
            mode,
        };
        write_sidecar(&payload, &sc).map_err(write_err)?;
        let _ = crate::fs::atomic::fsync_parent_dir(&payload);
        Ok(sc.into_record(payload))
    }
}
