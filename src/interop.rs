//! Conversion of errors across the storage and transport boundaries.

use crate::error::{StoreError, StoreErrorKind};
use std::sync::Arc;
use tonic::{Code, Status};

/// The status code a storage failure of the given kind is reported with.
#[inline]
pub const fn status_code(kind: StoreErrorKind) -> Code {
    match kind {
        StoreErrorKind::NotFound => Code::NotFound,
        StoreErrorKind::Conflict => Code::AlreadyExists,
        StoreErrorKind::Internal => Code::Internal,
    }
}

/// The storage failure kind a status code was produced from, if any.
///
/// This is the inverse of [`status_code`]. Codes that no storage failure maps to, such as those
/// produced by the transport itself, return `None`.
#[inline]
pub const fn store_error_kind(code: Code) -> Option<StoreErrorKind> {
    match code {
        Code::NotFound => Some(StoreErrorKind::NotFound),
        Code::AlreadyExists => Some(StoreErrorKind::Conflict),
        Code::Internal => Some(StoreErrorKind::Internal),
        _ => None,
    }
}

impl From<StoreError> for Status {
    fn from(err: StoreError) -> Self {
        let mut status = Self::new(status_code(err.kind()), err.to_string());
        let _status = status.set_source(Arc::new(err));
        status
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(rusqlite::ErrorCode::ConstraintViolation) => Self::Conflict(err.to_string()),
            _ => Self::Internal(err.to_string()),
        }
    }
}
