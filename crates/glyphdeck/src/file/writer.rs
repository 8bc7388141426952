//! Crash-safe file replacement.

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::error::{FileError, FileErrorKind, FileResult};

/// Writes a file by filling a hidden sibling and renaming it over the target.
///
/// Each writer gets its own randomly named sibling `.<file name>.<random>.tmp`
/// in the target's directory, so racing writers (in this process or another)
/// never share a temporary file, and readers only ever see the old content or
/// one writer's complete content. Dropping the writer without
/// [`commit`](Self::commit) deletes the sibling.
pub struct AtomicWriter {
    target: PathBuf,
    temp: PathBuf,
    out: Option<BufWriter<NamedTempFile>>,
}

impl AtomicWriter {
    /// Creates the temporary sibling of `path`. The parent must exist.
    pub fn new(path: impl AsRef<Path>) -> FileResult<Self> {
        let target = path.as_ref().to_path_buf();
        let Some(name) = target.file_name() else {
            return Err(FileError::new(FileErrorKind::InvalidPath, Some(target), None));
        };
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let file = tempfile::Builder::new()
            .prefix(&format!(".{}.", name.to_string_lossy()))
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| FileError::from_io(e, &target))?;

        Ok(Self {
            target,
            temp: file.path().to_path_buf(),
            out: Some(BufWriter::new(file)),
        })
    }

    /// Runs `fill` against a new writer and commits if it succeeds.
    pub fn write<F>(path: impl AsRef<Path>, fill: F) -> FileResult<()>
    where
        F: FnOnce(&mut AtomicWriter) -> FileResult<()>,
    {
        let mut writer = Self::new(path)?;
        fill(&mut writer)?;
        writer.commit()
    }

    pub fn target_path(&self) -> &Path {
        &self.target
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp
    }

    /// Appends `buf` to the pending content.
    pub fn write_all(&mut self, buf: &[u8]) -> FileResult<()> {
        Write::write_all(self, buf).map_err(|e| FileError::from_io(e, &self.target))
    }

    /// Flushes, fsyncs and renames the pending content over the target.
    ///
    /// On failure the target keeps its previous content.
    pub fn commit(mut self) -> FileResult<()> {
        let out = self.out.take().ok_or_else(already_finished)?;
        let file = out
            .into_inner()
            .map_err(|e| FileError::from_io(e.into_error(), &self.target))?;
        file.as_file()
            .sync_all()
            .map_err(|e| FileError::from_io(e, &self.target))?;

        file.persist(&self.target)
            .map(drop)
            .map_err(|e| FileError::from_io(e.error, &self.target))
    }

    /// Discards the pending content.
    pub fn abort(self) {}

    fn out(&mut self) -> io::Result<&mut BufWriter<NamedTempFile>> {
        self.out.as_mut().ok_or_else(already_finished)
    }
}

fn already_finished() -> io::Error {
    io::Error::other("atomic write already finished")
}

impl Write for AtomicWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out()?.flush()
    }
}

impl std::fmt::Debug for AtomicWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtomicWriter")
            .field("target", &self.target)
            .field("temp", &self.temp)
            .field("pending", &self.out.is_some())
            .finish()
    }
}
