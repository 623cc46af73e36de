//! Run a call off the caller's thread and hand the outcome to a callback.

use crate::error::Result;
use std::future::Future;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

/// A call started with [`spawn_with_callback`].
#[derive(Debug)]
pub struct TaskHandle {
    handle: JoinHandle<()>,
    cancelled: Arc<AtomicBool>,
}

impl TaskHandle {
    /// Stop the call. Its callback will not run unless it already has.
    ///
    /// An in-flight request is dropped together with the task.
    pub fn cancel(&self) {
        debug!("cancelling background call");
        self.cancelled.store(true, Ordering::SeqCst);
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait until the callback has run or the task was cancelled.
    ///
    /// # Panics
    ///
    /// Resumes the panic if the call or the callback panicked.
    pub async fn join(self) {
        if let Err(error) = self.handle.await {
            if error.is_panic() {
                panic::resume_unwind(error.into_panic());
            }
        }
    }
}

/// Run `call` on `worker` and pass its outcome to `callback` on `deliver_on`.
///
/// The callback runs exactly once, unless the task is cancelled first, and
/// receives the error, if any, unchanged. `deliver_on` is usually the runtime
/// driving the caller's UI loop; pass the worker handle again when any thread
/// will do.
pub fn spawn_with_callback<F, T, C>(
    worker: &Handle,
    deliver_on: &Handle,
    call: F,
    callback: C,
) -> TaskHandle
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
    C: FnOnce(Result<T>) + Send + 'static,
{
    let cancelled = Arc::new(AtomicBool::new(false));
    let deliver_on = deliver_on.clone();
    let skip = Arc::clone(&cancelled);

    let handle = worker.spawn(async move {
        let outcome = call.await;
        let delivery = deliver_on.spawn(async move {
            if skip.load(Ordering::SeqCst) {
                debug!("call was cancelled before delivery");
                return;
            }
            callback(outcome);
        });

        if let Err(error) = delivery.await {
            if error.is_panic() {
                panic::resume_unwind(error.into_panic());
            }
        }
    });

    TaskHandle { handle, cancelled }
}
