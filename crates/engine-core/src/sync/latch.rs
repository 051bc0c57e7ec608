use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tokio::sync::Notify;

/// Counts finished workers down to zero; `wait` resolves once every worker
/// has checked out.
#[derive(Debug)]
pub struct CountDownLatch {
    count: AtomicUsize,
    notify: Notify,
}

impl CountDownLatch {
    pub fn new(count: usize) -> Self {
        Self {
            count: AtomicUsize::new(count),
            notify: Notify::new(),
        }
    }

    /// Decrements the count, saturating at zero.
    pub fn count_down(&self) {
        let prev = self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| c.checked_sub(1));
        if prev == Ok(1) {
            self.notify.notify_waiters();
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    pub async fn wait(&self) {
        loop {
            // registered before the check so a concurrent release is not missed
            let notified = self.notify.notified();
            if self.count() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Counts the latch down exactly once when dropped, including during unwinding.
#[derive(Debug)]
pub struct LatchGuard {
    latch: Arc<CountDownLatch>,
}

impl LatchGuard {
    pub fn new(latch: Arc<CountDownLatch>) -> Self {
        Self { latch }
    }
}

impl Drop for LatchGuard {
    fn drop(&mut self) {
        self.latch.count_down();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn wait_returns_after_last_count_down() {
        let latch = Arc::new(CountDownLatch::new(3));

        for i in 0..3u64 {
            let latch = latch.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(5 * i)).await;
                latch.count_down();
            });
        }

        tokio::time::timeout(Duration::from_secs(2), latch.wait())
            .await
            .expect("latch never released");
        assert_eq!(latch.count(), 0);
    }

    #[tokio::test]
    async fn zero_latch_is_open() {
        let latch = CountDownLatch::new(0);
        latch.wait().await;
        latch.count_down();
        assert_eq!(latch.count(), 0);
    }

    #[tokio::test]
    async fn guard_counts_down_on_panic() {
        let latch = Arc::new(CountDownLatch::new(1));
        let guard = LatchGuard::new(latch.clone());

        let handle = tokio::spawn(async move {
            let _guard = guard;
            panic!("worker blew up");
        });
        assert!(handle.await.is_err());

        latch.wait().await;
    }
}
