//! Storage errors.
//!
//! Errors raised by a [backend](crate::backend) are tagged with their kind so that handlers can
//! report them with a matching status code. Client-side errors live in
//! [`client::Error`](crate::client::Error).

use crate::EntityId;
use std::fmt;

/// The kind of a [`StoreError`].
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    /// The requested entity does not exist.
    NotFound,
    /// The operation conflicts with the stored state, such as a violated constraint.
    Conflict,
    /// The backend failed to complete the operation.
    Internal,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotFound => "not found",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
        })
    }
}

/// An error returned by a storage backend.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No entity of the given kind has the given id.
    #[error("{kind} with id {id} not found")]
    NotFound {
        /// The entity family, such as `item`.
        kind: &'static str,
        /// The id that was looked up.
        id: EntityId,
    },
    /// The operation conflicts with the stored state.
    #[error("{0}")]
    Conflict(String),
    /// Any other failure of the backend.
    #[error("{0}")]
    Internal(String),
}

impl StoreError {
    /// The error for a missing entity of type `E`.
    #[inline]
    pub const fn not_found<E>(id: EntityId) -> Self
    where
        E: crate::Entity,
    {
        Self::NotFound { kind: E::KIND, id }
    }

    /// The kind of this error.
    #[inline]
    pub const fn kind(&self) -> StoreErrorKind {
        match self {
            Self::NotFound { .. } => StoreErrorKind::NotFound,
            Self::Conflict(_) => StoreErrorKind::Conflict,
            Self::Internal(_) => StoreErrorKind::Internal,
        }
    }
}
