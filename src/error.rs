//! Error taxonomy shared by every layer of the simulator.

use thiserror::Error;

/// Everything a [`crate::engine::Engine`] operation can fail with.
///
/// Each variant corresponds to a single diagnostic a front end can show
/// the user without inspecting anything but the error itself.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("attempt to access invalid cluster ({0})")]
    BadIndex(u16),

    #[error("file system not mounted")]
    NotMounted,

    #[error("cannot access '{0}': No such file or directory")]
    PathNotFound(String),

    #[error("'{0}': Not a directory")]
    NotADirectory(String),

    #[error("'{0}': Not a file")]
    NotAFile(String),

    #[error("'{0}': Directory not empty")]
    NotEmpty(String),

    #[error("directory is full")]
    DirFull,

    #[error("no space left on device")]
    NoSpace,

    #[error("name truncated to 17 bytes")]
    NameTooLong,

    #[error("invalid path '{0}'")]
    InvalidPath(String),

    #[error("'{0}': File exists")]
    AlreadyExists(String),

    #[error("file system corrupt: {0}")]
    Corrupt(String),
}

pub type FsResult<T> = Result<T, FsError>;
