//! A background thread that runs closures in order and queues their results.
//!
//! Results are not delivered through callbacks. They wait on a channel until
//! the owner collects them with [`Worker::drain`] (typically once per UI
//! tick), so everything the results touch is mutated on the owning thread.
//!
//! ```no_run
//! use std::time::Duration;
//! use glyphdeck_core::WorkerBuilder;
//!
//! let worker = WorkerBuilder::new().name("downloads").build::<String>()?;
//! worker.send(|| "fetched".to_string())?;
//!
//! if let Some(result) = worker.recv_timeout(Duration::from_secs(1)) {
//!     println!("worker produced: {result}");
//! }
//! worker.stop_and_join();
//! # Ok::<(), glyphdeck_core::CoreError>(())
//! ```
//!
//! [`Worker::stop`] lets queued tasks finish. [`Worker::abandon`] skips
//! them and throws away any result produced afterwards. Dropping a worker
//! stops it without waiting.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded, unbounded};
use parking_lot::Mutex;

use crate::error::{CoreError, Result};
use crate::logging::targets;

const DEFAULT_QUEUE_CAPACITY: usize = 64;

type Task<T> = Box<dyn FnOnce() -> T + Send>;

/// Configures and starts a [`Worker`].
#[derive(Debug, Clone)]
pub struct WorkerBuilder {
    name: String,
    queue_capacity: usize,
}

impl Default for WorkerBuilder {
    fn default() -> Self {
        Self {
            name: "glyphdeck-worker".to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl WorkerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Thread name, shown in debuggers and panic messages.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Tasks that may wait before [`Worker::send`] reports a full queue.
    #[must_use]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Spawns the thread.
    pub fn build<T: Send + 'static>(self) -> Result<Worker<T>> {
        let (task_tx, task_rx) = bounded::<Task<T>>(self.queue_capacity);
        let (result_tx, result_rx) = unbounded();
        let shared = Arc::new(Shared::default());

        let thread_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || run(&task_rx, &result_tx, &thread_shared))
            .map_err(|e| CoreError::WorkerSpawn(e.to_string()))?;

        tracing::debug!(target: targets::WORKER, name = %self.name, capacity = self.queue_capacity, "worker started");
        Ok(Worker {
            tasks: Mutex::new(Some(task_tx)),
            results: result_rx,
            handle: Mutex::new(Some(handle)),
            shared,
        })
    }
}

#[derive(Default)]
struct Shared {
    abandoned: AtomicBool,
    /// Tasks sent but not yet finished or skipped.
    pending: AtomicUsize,
}

/// Handle to a background thread; see the module docs.
pub struct Worker<T: Send + 'static> {
    /// `None` once stopped; dropping the sender ends the thread's loop.
    tasks: Mutex<Option<Sender<Task<T>>>>,
    results: Receiver<T>,
    handle: Mutex<Option<JoinHandle<()>>>,
    shared: Arc<Shared>,
}

impl<T: Send + 'static> Worker<T> {
    /// A worker with the default name and queue capacity.
    pub fn new() -> Result<Self> {
        WorkerBuilder::new().build()
    }

    /// Whether [`send`](Self::send) still accepts tasks.
    pub fn is_running(&self) -> bool {
        self.tasks.lock().is_some()
    }

    /// Tasks sent whose results have not been produced yet.
    pub fn pending_tasks(&self) -> usize {
        self.shared.pending.load(Ordering::Acquire)
    }

    /// Tasks waiting in the queue, excluding the one running.
    pub fn queued(&self) -> usize {
        self.tasks.lock().as_ref().map_or(0, Sender::len)
    }

    /// Queues `task`. Never blocks.
    ///
    /// Fails with [`CoreError::WorkerStopped`] after `stop` or `abandon` and
    /// with [`CoreError::QueueFull`] when the queue has no room.
    pub fn send<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let tasks = self.tasks.lock();
        let sender = tasks.as_ref().ok_or(CoreError::WorkerStopped)?;

        self.shared.pending.fetch_add(1, Ordering::AcqRel);
        sender.try_send(Box::new(task)).map_err(|e| {
            self.shared.pending.fetch_sub(1, Ordering::AcqRel);
            match e {
                TrySendError::Full(_) => CoreError::QueueFull,
                TrySendError::Disconnected(_) => CoreError::WorkerStopped,
            }
        })
    }

    /// One finished result, if any.
    pub fn try_recv(&self) -> Option<T> {
        self.results.try_recv().ok()
    }

    /// Every finished result, in completion order.
    pub fn drain(&self) -> Vec<T> {
        self.results.try_iter().collect()
    }

    /// Waits up to `timeout` for the next result.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        self.results.recv_timeout(timeout).ok()
    }

    /// Stops accepting tasks. Queued tasks still run; the thread exits once
    /// the queue is empty.
    pub fn stop(&self) {
        if self.tasks.lock().take().is_some() {
            tracing::trace!(target: targets::WORKER, pending = self.pending_tasks(), "worker stopping");
        }
    }

    /// Stops accepting tasks and skips the queued ones. A task already
    /// running finishes, but its result is dropped.
    pub fn abandon(&self) {
        self.shared.abandoned.store(true, Ordering::Release);
        self.stop();
    }

    /// Waits for the thread to exit. Returns `false` if it was already
    /// joined or panicked.
    pub fn join(&self) -> bool {
        match self.handle.lock().take() {
            Some(handle) => handle.join().is_ok(),
            None => false,
        }
    }

    pub fn stop_and_join(&self) -> bool {
        self.stop();
        self.join()
    }
}

impl<T: Send + 'static> Drop for Worker<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<T: Send + 'static> std::fmt::Debug for Worker<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("running", &self.is_running())
            .field("pending", &self.pending_tasks())
            .field("abandoned", &self.shared.abandoned.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Thread body. Returns when every sender is gone and the queue is empty.
fn run<T>(tasks: &Receiver<Task<T>>, results: &Sender<T>, shared: &Shared) {
    for task in tasks.iter() {
        if !shared.abandoned.load(Ordering::Acquire) {
            let result = task();
            if !shared.abandoned.load(Ordering::Acquire) {
                // The owner may be gone already
                let _ = results.send(result);
            }
        }
        shared.pending.fetch_sub(1, Ordering::AcqRel);
    }
    tracing::trace!(target: targets::WORKER, "worker exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    /// A task that blocks until the returned sender is used or dropped.
    fn gate() -> (Sender<()>, Receiver<()>) {
        bounded(0)
    }

    #[test]
    fn test_send_and_receive_in_order() {
        let worker = Worker::<u32>::new().unwrap();
        assert!(worker.is_running());

        worker.send(|| 7).unwrap();
        worker.send(|| 8).unwrap();
        assert_eq!(worker.recv_timeout(Duration::from_secs(2)), Some(7));
        assert_eq!(worker.recv_timeout(Duration::from_secs(2)), Some(8));
        assert!(worker.try_recv().is_none());
        assert!(worker.stop_and_join());
    }

    #[test]
    fn test_stop_runs_queued_tasks() {
        let worker = WorkerBuilder::new().name("ordered").build::<usize>().unwrap();
        for i in 0..10 {
            worker.send(move || i).unwrap();
        }
        worker.stop_and_join();

        assert_eq!(worker.drain(), (0..10).collect::<Vec<_>>());
        assert_eq!(worker.pending_tasks(), 0);
        assert!(!worker.is_running());
    }

    #[test]
    fn test_send_after_stop() {
        let worker = Worker::<u32>::new().unwrap();
        worker.stop();
        assert!(matches!(worker.send(|| 1), Err(CoreError::WorkerStopped)));
        assert_eq!(worker.pending_tasks(), 0);
        worker.join();
    }

    #[test]
    fn test_queue_full() {
        let worker = WorkerBuilder::new().queue_capacity(1).build::<u32>().unwrap();
        let (open, wait) = gate();

        worker
            .send(move || {
                let _ = wait.recv();
                1
            })
            .unwrap();
        // Wait for the thread to pick up the blocking task
        while worker.queued() > 0 {
            thread::yield_now();
        }
        worker.send(|| 2).unwrap();
        assert!(matches!(worker.send(|| 3), Err(CoreError::QueueFull)));
        assert_eq!(worker.pending_tasks(), 2);

        drop(open);
        worker.stop_and_join();
        assert_eq!(worker.drain(), [1, 2]);
    }

    #[test]
    fn test_abandon_skips_queue_and_drops_results() {
        let worker = Worker::<u32>::new().unwrap();
        let ran = Arc::new(AtomicUsize::new(0));
        let (open, wait) = gate();

        let first = Arc::clone(&ran);
        worker
            .send(move || {
                let _ = wait.recv();
                first.fetch_add(1, Ordering::SeqCst);
                1
            })
            .unwrap();
        for i in 2..5 {
            let counter = Arc::clone(&ran);
            worker
                .send(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    i
                })
                .unwrap();
        }

        worker.abandon();
        drop(open);
        assert!(worker.join());

        assert!(ran.load(Ordering::SeqCst) <= 1);
        assert!(worker.drain().is_empty());
        assert_eq!(worker.pending_tasks(), 0);
    }

    #[test]
    fn test_drop_does_not_wait_for_running_task() {
        let (open, wait) = gate();
        let worker = Worker::<()>::new().unwrap();
        worker
            .send(move || {
                let _ = wait.recv();
            })
            .unwrap();

        let started = Instant::now();
        drop(worker);
        assert!(started.elapsed() < Duration::from_millis(500));
        drop(open);
    }

    #[test]
    fn test_senders_on_many_threads() {
        let worker = Arc::new(Worker::<u32>::new().unwrap());
        let threads: Vec<_> = (0..4)
            .map(|_| {
                let worker = Arc::clone(&worker);
                thread::spawn(move || {
                    for _ in 0..10 {
                        // Retry if the consumer falls behind
                        while let Err(CoreError::QueueFull) = worker.send(|| 1) {
                            thread::yield_now();
                        }
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        worker.stop_and_join();
        assert_eq!(worker.drain().iter().sum::<u32>(), 40);
    }
}
