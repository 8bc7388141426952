//! File utilities shared by the codepoint cache and the state store.
//!
//! Everything that lands on disk goes through [`atomic_write`]: data is
//! written to a temporary sibling, synced, then renamed over the target, so
//! a crash or a racing instance never leaves a torn file behind.
//!
//! ```ignore
//! use glyphdeck::file::{atomic_write, read_text};
//!
//! atomic_write("cache/material-symbols-outlined.codepoints", |w| {
//!     w.write_all(b"home e88a\n")
//! })?;
//! let text = read_text("cache/material-symbols-outlined.codepoints")?;
//! ```

mod error;
mod operations;
mod path;
mod writer;

pub use error::{FileError, FileErrorKind, FileResult};
pub use operations::{
    atomic_write, ensure_dir, modified_time, read_bytes, read_json, read_text, remove_if_exists,
    write_json,
};
pub use path::{AppPaths, default_cache_root, exe_cache_dir};
pub use writer::AtomicWriter;
