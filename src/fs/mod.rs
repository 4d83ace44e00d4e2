pub mod atomic;
pub mod backup;
pub mod meta;

pub use atomic::{atomic_write, fsync_parent_dir, open_dir_nofollow};
pub use backup::{BackupStore, FsBackupStore};
pub use meta::{content_key, sha256_hex, sha256_hex_of};
