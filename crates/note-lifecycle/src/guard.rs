//! Single-writer job guard.
//!
//! At most one rebuild may hold the guard at a time. A trigger that fails to
//! acquire it is dropped, not queued — overlapping periodic triggers are
//! simply skipped for that cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Guard tracking whether a rebuild job is currently running.
pub struct JobGuard {
    is_running: Arc<AtomicBool>,
}

impl JobGuard {
    pub fn new() -> Self {
        Self {
            is_running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Attempt to acquire the guard for one job.
    ///
    /// Returns `Some(JobPermit)` if no job is running, `None` otherwise.
    /// The permit spans the full Building→Validating→Swapping window and
    /// releases on drop, so a panicking job cannot wedge the guard.
    pub fn try_acquire(&self) -> Option<JobPermit> {
        if self
            .is_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            Some(JobPermit {
                flag: self.is_running.clone(),
            })
        } else {
            None
        }
    }

    /// Whether a job currently holds the guard.
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }
}

impl Default for JobGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII permit released when dropped.
pub struct JobPermit {
    flag: Arc<AtomicBool>,
}

impl Drop for JobPermit {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_second_acquire_is_rejected() {
        let guard = JobGuard::new();

        let permit = guard.try_acquire();
        assert!(permit.is_some());
        assert!(guard.is_running());

        assert!(guard.try_acquire().is_none());

        drop(permit);
        assert!(!guard.is_running());
        assert!(guard.try_acquire().is_some());
    }

    #[test]
    fn test_permit_releases_on_drop() {
        let guard = JobGuard::new();
        {
            let _permit = guard.try_acquire().unwrap();
            assert!(guard.is_running());
        }
        assert!(!guard.is_running());
    }

    #[test]
    fn test_thread_safety() {
        let guard = Arc::new(JobGuard::new());

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let guard = guard.clone();
                thread::spawn(move || {
                    if let Some(_permit) = guard.try_acquire() {
                        thread::sleep(Duration::from_millis(10));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(!guard.is_running());
    }
}
