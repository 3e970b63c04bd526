use crate::error::DbError;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::runtime::Handle;
use tokio::sync::{Semaphore, watch};
use tracing::error;

/// Runs operations on a tokio runtime with a cap on how many execute at once.
///
/// Callers never block: work beyond the cap waits for a permit inside its own
/// task, in submission order. Each result goes to its callback exactly once,
/// provided the runtime behind `handle` is still running when the task is spawned.
pub struct Dispatcher {
    handle: Handle,
    permits: Arc<Semaphore>,
    limit: usize,
    pending: Arc<watch::Sender<usize>>,
    closed: AtomicBool,
}

/// Counts an operation as pending until its task ends, panicking callback included.
struct PendingGuard(Arc<watch::Sender<usize>>);

impl PendingGuard {
    fn new(pending: &Arc<watch::Sender<usize>>) -> Self {
        pending.send_modify(|n| *n += 1);
        Self(pending.clone())
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.send_modify(|n| *n -= 1);
    }
}

impl Dispatcher {
    pub fn new(handle: Handle, max_in_flight: usize) -> Self {
        let limit = max_in_flight.clamp(1, Semaphore::MAX_PERMITS);
        let (pending, _) = watch::channel(0);
        Self {
            handle,
            permits: Arc::new(Semaphore::new(limit)),
            limit,
            pending: Arc::new(pending),
            closed: AtomicBool::new(false),
        }
    }

    /// Operations currently executing.
    pub fn in_flight(&self) -> usize {
        self.limit - self.permits.available_permits()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn dispatch<F, T, C>(&self, operation: &'static str, target: String, work: F, callback: C)
    where
        F: Future<Output = Result<T, DbError>> + Send + 'static,
        T: Send + 'static,
        C: FnOnce(Result<T, DbError>) + Send + 'static,
    {
        // Count first, then check: a concurrent drain either sees this
        // operation or this operation sees the drain.
        let guard = PendingGuard::new(&self.pending);
        let accepted = !self.is_closed();
        let permits = self.permits.clone();
        self.handle.spawn(async move {
            let _guard = guard;
            let result = if accepted {
                match permits.acquire_owned().await {
                    Ok(permit) => {
                        let result = work.await;
                        drop(permit);
                        result
                    }
                    Err(_) => Err(DbError::Shutdown),
                }
            } else {
                Err(DbError::Shutdown)
            };
            if let Err(e) = &result {
                error!(operation, table = %target, kind = ?e.kind(), error = %e, "database operation failed");
            }
            callback(result);
        });
    }

    /// Refuses new operations, then waits until every accepted one has run its callback.
    pub async fn drain(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let mut rx = self.pending.subscribe();
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}
