use std::sync::Arc;

use tokio::sync::Mutex;

/// Puts view state back when an in-flight operation is dropped before it finishes.
///
/// Armed while the backend call is awaited. The operation disarms it once it holds
/// the lock again and writes its own outcome.
pub(crate) struct AbandonGuard<T: Send + 'static> {
    inner: Arc<Mutex<T>>,
    restore: Option<Box<dyn FnOnce(&mut T) + Send>>,
}

impl<T: Send + 'static> AbandonGuard<T> {
    pub(crate) fn new(
        inner: &Arc<Mutex<T>>,
        restore: impl FnOnce(&mut T) + Send + 'static,
    ) -> Self {
        Self {
            inner: inner.clone(),
            restore: Some(Box::new(restore)),
        }
    }

    pub(crate) fn disarm(mut self) {
        self.restore = None;
    }
}

impl<T: Send + 'static> Drop for AbandonGuard<T> {
    fn drop(&mut self) {
        let Some(restore) = self.restore.take() else {
            return;
        };
        match self.inner.try_lock() {
            Ok(mut inner) => restore(&mut *inner),
            Err(_) => match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let inner = self.inner.clone();
                    handle.spawn(async move {
                        restore(&mut *inner.lock().await);
                    });
                }
                Err(_) => log::warn!("abandoned operation left view state in flight"),
            },
        }
    }
}
