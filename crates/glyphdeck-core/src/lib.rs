//! Core facilities shared by the glyphdeck crates.
//!
//! - **Logging**: tracing targets, perf spans and subscriber setup
//! - **Worker**: a dedicated background thread with a result channel, used to
//!   keep blocking downloads off the thread that owns the picker state
//!
//! # Worker Example
//!
//! ```no_run
//! use glyphdeck_core::Worker;
//!
//! let worker = Worker::<usize>::new()?;
//! worker.send(|| "slow work".len())?;
//!
//! // Later, on the owning thread:
//! for result in worker.drain() {
//!     println!("finished: {result}");
//! }
//! # Ok::<(), glyphdeck_core::CoreError>(())
//! ```

mod error;
pub mod logging;
pub mod worker;

pub use error::{CoreError, Result};
pub use logging::{LogConfig, PerfSpan};
pub use worker::{Worker, WorkerBuilder};
