use tokio::sync::{Mutex, MutexGuard};

/// Wraps a capability so at most one call is in flight at a time.
///
/// Additional callers queue on the lock in arrival order. Trait impls for
/// the wrapped capabilities live next to the traits themselves.
pub struct Serialized<T: ?Sized> {
    gate: Mutex<()>,
    inner: T,
}

impl<T> Serialized<T> {
    pub fn new(inner: T) -> Self {
        Self {
            gate: Mutex::new(()),
            inner,
        }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: ?Sized> Serialized<T> {
    /// Wait for exclusive access to the wrapped capability
    pub async fn acquire(&self) -> (MutexGuard<'_, ()>, &T) {
        (self.gate.lock().await, &self.inner)
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}
