//! Serialized access to inference state from async handlers.
//!
//! ONNX sessions take `&mut self` to run, but the model handle is shared
//! read-only by every request. Callers queue on an async mutex: a second
//! in-flight generation waits for the first instead of being rejected. The
//! state never leaves the lock, so a caller dropped mid-call (client
//! disconnect) releases the guard with the state intact.

use tokio::sync::Mutex;

/// The cell has not been loaded yet.
#[derive(Debug, thiserror::Error)]
#[error("state not loaded")]
pub(crate) struct StateMissing;

/// Async-mutexed holder for state whose work must run off the async threads.
pub(crate) struct BlockingCell<T> {
    inner: Mutex<Option<T>>,
}

impl<T> Default for BlockingCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BlockingCell<T> {
    /// Create an unloaded cell.
    pub fn new() -> Self {
        Self { inner: Mutex::new(None) }
    }

    /// Store the state, replacing any previous value.
    pub async fn put(&self, value: T) {
        *self.inner.lock().await = Some(value);
    }

    /// Run `work` with exclusive access to the state.
    ///
    /// Concurrent callers wait their turn on the async mutex. The closure
    /// runs via `block_in_place`, which requires the multi-thread runtime
    /// (the daemon's default; handler tests must use the same flavor).
    pub async fn with_blocking<R>(
        &self,
        work: impl FnOnce(&mut T) -> R,
    ) -> Result<R, StateMissing> {
        let mut guard = self.inner.lock().await;
        let state = guard.as_mut().ok_or(StateMissing)?;
        Ok(tokio::task::block_in_place(|| work(state)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn unloaded_cell_reports_missing_state() {
        let cell: BlockingCell<u32> = BlockingCell::new();
        let err = cell.with_blocking(|v| *v).await.unwrap_err();
        assert_eq!(err.to_string(), "state not loaded");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn overlapping_callers_queue_instead_of_failing() {
        let cell = Arc::new(BlockingCell::new());
        cell.put(0u32).await;

        let slow = tokio::spawn({
            let cell = Arc::clone(&cell);
            async move {
                cell.with_blocking(|v| {
                    std::thread::sleep(Duration::from_millis(100));
                    *v += 1;
                    *v
                })
                .await
            }
        });
        // Give the slow caller time to acquire the lock.
        tokio::time::sleep(Duration::from_millis(20)).await;

        // This call overlaps the slow one; it must wait and succeed, never
        // observe the state as missing.
        let second = cell.with_blocking(|v| {
            *v += 1;
            *v
        });
        let overlapped = second.await.unwrap();
        let first = slow.await.unwrap().unwrap();

        // Both calls ran exactly once, in some serial order.
        assert_eq!(first.min(overlapped), 1);
        assert_eq!(first.max(overlapped), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn state_persists_across_calls() {
        let cell: BlockingCell<Vec<u32>> = BlockingCell::new();
        cell.put(Vec::new()).await;
        for i in 0..3u32 {
            let len = cell
                .with_blocking(move |v| {
                    v.push(i);
                    v.len()
                })
                .await
                .unwrap();
            assert_eq!(len, i as usize + 1);
        }
    }
}
