use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::constants::SIDECAR_SCHEMA;
use crate::types::{BackupRecord, ResourceId};

use super::sidecar::{payload_path_for_sidecar, read_sidecar};
use super::FsBackupStore;

fn walk_sidecars(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let ft = entry.file_type()?;
        let path = entry.path();
        if ft.is_dir() {
            walk_sidecars(&path, out)?;
        } else if ft.is_file() && payload_path_for_sidecar(&path).is_some() {
            out.push(path);
        }
    }
    Ok(())
}

impl FsBackupStore {
    /// All snapshots taken during `run_id`, oldest first.
    ///
    /// Files whose name merely ends in the sidecar suffix (a backed-up resource can
    /// be called `x.meta.json`) are skipped unless they parse as a sidecar for this run.
    pub(crate) fn list_records(&self, run_id: &str) -> std::io::Result<Vec<BackupRecord>> {
        let run_dir = self.backup_root.join(run_id);
        if !run_dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut sidecars = Vec::new();
        walk_sidecars(&run_dir, &mut sidecars)?;

        let mut records: Vec<(PathBuf, BackupRecord)> = Vec::new();
        for sc_path in sidecars {
            let Some(payload) = payload_path_for_sidecar(&sc_path) else {
                continue;
            };
            let Ok(sc) = read_sidecar(&sc_path) else {
                continue;
            };
            if sc.schema != SIDECAR_SCHEMA || sc.run_id != run_id || !payload.is_file() {
                continue;
            }
            let rel = payload
                .strip_prefix(&run_dir)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| payload.clone());
            records.push((rel, sc.into_record(payload)));
        }
        // Timestamp directory is the first component and sorts chronologically
        records.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(records.into_iter().map(|(_, r)| r).collect())
    }
}

/// Earliest snapshot per resource, ordered by resource id.
#[must_use]
pub fn earliest_per_resource(records: Vec<BackupRecord>) -> Vec<BackupRecord> {
    let mut first: HashMap<ResourceId, BackupRecord> = HashMap::new();
    for r in records {
        first.entry(r.resource_id.clone()).or_insert(r);
    }
    let mut out: Vec<BackupRecord> = first.into_values().collect();
    out.sort_by(|a, b| a.resource_id.cmp(&b.resource_id));
    out
}
