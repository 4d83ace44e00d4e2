use std::fs;

use crate::constants::RESTORE_TMP_SUFFIX;
use crate::fs::atomic::atomic_write;
use crate::fs::meta::sha256_hex;
use crate::types::{BackupRecord, RestoreError};

use super::sidecar::{read_sidecar, sidecar_path_for_backup};
use super::FsBackupStore;

impl FsBackupStore {
    /// Overwrite the resource with the snapshot payload, then verify the result.
    ///
    /// The payload is hashed before anything is written; a corrupted snapshot never
    /// touches the resource. Permission bits recorded in the sidecar are used when
    /// the resource no longer exists.
    pub(crate) fn restore_snapshot(&self, record: &BackupRecord) -> Result<(), RestoreError> {
        let payload = &record.snapshot_path;
        let bytes = fs::read(payload).map_err(|source| RestoreError::PayloadUnreadable {
            path: payload.clone(),
            source,
        })?;
        if bytes.len() as u64 != record.size || sha256_hex(&bytes) != record.sha256 {
            return Err(RestoreError::PayloadCorrupted {
                path: payload.clone(),
            });
        }
        let mode = read_sidecar(&sidecar_path_for_backup(payload))
            .ok()
            .and_then(|sc| sc.mode_bits());

        let target = record.resource_id.resolve(&self.workspace);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| RestoreError::Write {
                path: target.clone(),
                source,
            })?;
        }
        atomic_write(&target, &bytes, RESTORE_TMP_SUFFIX, mode).map_err(|source| {
            RestoreError::Write {
                path: target.clone(),
                source,
            }
        })?;

        match fs::read(&target) {
            Ok(now) if sha256_hex(&now) == record.sha256 => Ok(()),
            _ => Err(RestoreError::Verify { path: target }),
        }
    }
}
