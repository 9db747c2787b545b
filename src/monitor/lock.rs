use std::cell::Cell;

/// Counter held around mutations the monitor causes itself, so that the
/// structural-change notifications they trigger are ignored.
///
/// Not a queue: a scan attempted while held is skipped, not deferred.
#[derive(Debug, Default)]
pub struct ReentrancyLock {
    depth: Cell<u32>,
}

impl ReentrancyLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hold(&self) -> LockGuard<'_> {
        self.depth.set(self.depth.get() + 1);
        LockGuard { lock: self }
    }

    pub fn is_held(&self) -> bool {
        self.depth.get() > 0
    }

    pub fn depth(&self) -> u32 {
        self.depth.get()
    }
}

#[must_use = "the lock is released when the guard is dropped"]
pub struct LockGuard<'a> {
    lock: &'a ReentrancyLock,
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.lock.depth.set(self.lock.depth.get().saturating_sub(1));
    }
}
