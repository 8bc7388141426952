//! Disk errors carrying the path they happened on.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Broad classification used by callers to decide how to recover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileErrorKind {
    NotFound,
    PermissionDenied,
    /// The path has no file name or is otherwise unusable.
    InvalidPath,
    /// The file exists but its content could not be decoded.
    InvalidData,
    Other,
}

impl From<io::ErrorKind> for FileErrorKind {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem => {
                Self::PermissionDenied
            }
            io::ErrorKind::InvalidInput | io::ErrorKind::InvalidFilename => Self::InvalidPath,
            io::ErrorKind::InvalidData => Self::InvalidData,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for FileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotFound => "not found",
            Self::PermissionDenied => "permission denied",
            Self::InvalidPath => "invalid path",
            Self::InvalidData => "malformed content",
            Self::Other => "I/O failure",
        })
    }
}

/// A failed file operation.
#[derive(Debug)]
pub struct FileError {
    kind: FileErrorKind,
    path: Option<PathBuf>,
    source: Option<io::Error>,
}

/// Result alias for the file helpers.
pub type FileResult<T> = Result<T, FileError>;

impl FileError {
    pub fn new(kind: FileErrorKind, path: Option<PathBuf>, source: Option<io::Error>) -> Self {
        Self { kind, path, source }
    }

    /// Wraps `err`, recording the `path` it concerns.
    pub fn from_io(err: io::Error, path: impl Into<PathBuf>) -> Self {
        Self::new(err.kind().into(), Some(path.into()), Some(err))
    }

    /// Content at `path` could not be decoded; `cause` is the decoder error.
    pub fn invalid_data(
        path: impl AsRef<Path>,
        cause: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::new(
            FileErrorKind::InvalidData,
            Some(path.as_ref().to_path_buf()),
            Some(io::Error::new(io::ErrorKind::InvalidData, cause)),
        )
    }

    pub fn kind(&self) -> FileErrorKind {
        self.kind
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == FileErrorKind::NotFound
    }
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "{}: ", path.display())?;
        }
        write!(f, "{}", self.kind)?;
        // Decoder messages say where the content is broken
        match &self.source {
            Some(source) if self.kind == FileErrorKind::InvalidData => write!(f, " ({source})"),
            _ => Ok(()),
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<io::Error> for FileError {
    fn from(err: io::Error) -> Self {
        Self::new(err.kind().into(), None, Some(err))
    }
}
