use thiserror::Error;

use crate::types::{BatchError, RunReport};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("policy violation: {0}")]
    PolicyViolation(String),
    #[error("locking timeout: {0}")]
    LockingTimeout(String),
    #[error("filesystem error: {0}")]
    FilesystemError(String),
    #[error("violation source: {0}")]
    Source(String),
    #[error("worker pool: {0}")]
    WorkerPool(String),
    /// A rollback could not be completed. The partial report is attached.
    #[error("restore failed: {message}")]
    RestoreFailed {
        message: String,
        report: Box<RunReport>,
    },
}

impl ApiError {
    #[must_use]
    pub fn id(&self) -> ErrorId {
        match self {
            ApiError::PolicyViolation(_) => ErrorId::E_POLICY,
            ApiError::LockingTimeout(_) => ErrorId::E_LOCKING,
            ApiError::FilesystemError(_) | ApiError::WorkerPool(_) => ErrorId::E_GENERIC,
            ApiError::Source(_) => ErrorId::E_SOURCE,
            ApiError::RestoreFailed { .. } => ErrorId::E_RESTORE_FAILED,
        }
    }

    #[must_use]
    pub fn exit_code(&self) -> i32 {
        exit_code_for(self.id())
    }
}

impl From<crate::types::errors::Error> for ApiError {
    fn from(e: crate::types::errors::Error) -> Self {
        use crate::types::errors::ErrorKind::{Config, Input, InvalidPath, Io, Locking, Policy};
        match e.kind {
            InvalidPath | Io => ApiError::FilesystemError(e.msg),
            Policy | Config => ApiError::PolicyViolation(e.msg),
            Locking => ApiError::LockingTimeout(e.msg),
            Input => ApiError::Source(e.msg),
        }
    }
}

// Stable identifiers emitted in facts and reports.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorId {
    E_POLICY,
    E_LOCKING,
    E_WRITE,
    E_BACKUP,
    E_RESTORE_FAILED,
    E_RULE,
    E_PERSIST,
    E_SOURCE,
    E_GENERIC,
}

#[must_use]
pub const fn id_str(id: ErrorId) -> &'static str {
    match id {
        ErrorId::E_POLICY => "E_POLICY",
        ErrorId::E_LOCKING => "E_LOCKING",
        ErrorId::E_WRITE => "E_WRITE",
        ErrorId::E_BACKUP => "E_BACKUP",
        ErrorId::E_RESTORE_FAILED => "E_RESTORE_FAILED",
        ErrorId::E_RULE => "E_RULE",
        ErrorId::E_PERSIST => "E_PERSIST",
        ErrorId::E_SOURCE => "E_SOURCE",
        ErrorId::E_GENERIC => "E_GENERIC",
    }
}

#[must_use]
pub const fn exit_code_for(id: ErrorId) -> i32 {
    match id {
        ErrorId::E_POLICY => 10,
        ErrorId::E_LOCKING => 30,
        ErrorId::E_WRITE => 40,
        ErrorId::E_BACKUP => 60,
        ErrorId::E_RESTORE_FAILED => 70,
        ErrorId::E_SOURCE => 2,
        ErrorId::E_RULE | ErrorId::E_PERSIST | ErrorId::E_GENERIC => 1,
    }
}

/// Map a batch-level failure to its stable id for telemetry.
#[must_use]
pub fn map_batch_error(e: &BatchError) -> ErrorId {
    match e {
        BatchError::Backup(_) | BatchError::Read(_) => ErrorId::E_BACKUP,
        BatchError::Write(_) | BatchError::Engine => ErrorId::E_WRITE,
    }
}
