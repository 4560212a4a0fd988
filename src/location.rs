use std::fmt;
use std::path::{Path, PathBuf};

/// Where a storage backend keeps its entities.
#[non_exhaustive]
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Location {
    /// Entities live only as long as the backend value.
    #[default]
    InMemory,
    /// Entities are written to a database file and survive a restart.
    OnDisk {
        /// The database file. It is created on first open.
        path: PathBuf,
    },
}

impl Location {
    /// The database file, if entities are kept on disk.
    #[inline]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::InMemory => None,
            Self::OnDisk { path } => Some(path),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InMemory => f.write_str(":memory:"),
            Self::OnDisk { path } => write!(f, "{}", path.display()),
        }
    }
}

impl<T> From<T> for Location
where
    T: Into<PathBuf>,
{
    fn from(path: T) -> Self {
        Self::OnDisk { path: path.into() }
    }
}
