use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::SIDECAR_SUFFIX;
use crate::types::{BackupRecord, ResourceId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct BackupSidecar {
    pub(crate) schema: String, // "mendyard.backup.v1"
    pub(crate) tag: String,
    pub(crate) run_id: String,
    pub(crate) resource_id: ResourceId,
    pub(crate) size: u64,
    pub(crate) sha256: String,
    pub(crate) created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) mode: Option<String>, // octal string, e.g. "644"
}

impl BackupSidecar {
    pub(crate) fn into_record(self, payload: PathBuf) -> BackupRecord {
        BackupRecord {
            resource_id: self.resource_id,
            snapshot_path: payload,
            size: self.size,
            sha256: self.sha256,
            created_at: self.created_at,
        }
    }

    pub(crate) fn mode_bits(&self) -> Option<u32> {
        self.mode
            .as_deref()
            .and_then(|m| u32::from_str_radix(m, 8).ok())
    }
}

pub(crate) fn sidecar_path_for_backup(backup: &Path) -> PathBuf {
    let mut s = backup.as_os_str().to_owned();
    s.push(SIDECAR_SUFFIX);
    PathBuf::from(s)
}

/// Inverse of `sidecar_path_for_backup`; `None` when `sidecar` is not a sidecar name.
pub(crate) fn payload_path_for_sidecar(sidecar: &Path) -> Option<PathBuf> {
    let s = sidecar.to_str()?;
    s.strip_suffix(SIDECAR_SUFFIX).map(PathBuf::from)
}

pub(crate) fn write_sidecar(backup: &Path, sc: &BackupSidecar) -> std::io::Result<()> {
    let sc_path = sidecar_path_for_backup(backup);
    if let Some(parent) = sc_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let f = std::fs::File::create(&sc_path)?;
    serde_json::to_writer_pretty(&f, sc).map_err(std::io::Error::other)?;
    let _ = f.sync_all();
    let _ = crate::fs::atomic::fsync_parent_dir(&sc_path);
    Ok(())
}

pub(crate) fn read_sidecar(sc_path: &Path) -> std::io::Result<BackupSidecar> {
    let f = std::fs::File::open(sc_path)?;
    serde_json::from_reader(f).map_err(std::io::Error::other)
}
