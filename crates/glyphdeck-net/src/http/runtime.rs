//! Process-wide tokio runtime for synchronous callers.
//!
//! The picker drives downloads from a plain worker thread and the CLI has a
//! synchronous `main`; both reach async reqwest through [`block_on`].

use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::Runtime;

use crate::error::{NetworkError, Result};

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Get the shared runtime, creating it on first use.
pub fn get() -> Result<&'static Runtime> {
    if let Some(runtime) = RUNTIME.get() {
        return Ok(runtime);
    }
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("glyphdeck-net")
        .enable_all()
        .build()
        .map_err(|e| NetworkError::Runtime(e.to_string()))?;
    // A racing thread may have won; its runtime is kept and ours is dropped.
    Ok(RUNTIME.get_or_init(|| runtime))
}

/// Block on a future using the shared runtime.
///
/// # Warning
///
/// Do not call this from within an async context or the host's event loop
/// thread, as it blocks the current thread.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    Ok(get()?.block_on(future))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_on_runs_future() {
        let value = block_on(async { 21 * 2 }).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_runtime_is_shared() {
        let a = get().unwrap() as *const Runtime;
        let b = get().unwrap() as *const Runtime;
        assert_eq!(a, b);
    }
}
