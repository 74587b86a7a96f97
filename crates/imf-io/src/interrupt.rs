use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Callback = Arc<dyn Fn() -> bool + Send + Sync>;

/// Externally supplied cancellation check.
///
/// The loader polls [`Interrupt::is_triggered`] before every blocking read;
/// once it returns `true` the current read aborts with
/// [`IoError::Interrupted`](crate::IoError::Interrupted). Cloning shares the
/// same underlying callback.
#[derive(Clone, Default)]
pub struct Interrupt {
    callback: Option<Callback>,
}

impl Interrupt {
    /// An interrupt that never fires.
    pub fn never() -> Self {
        Self { callback: None }
    }

    /// Wrap an arbitrary callback.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Self {
            callback: Some(Arc::new(f)),
        }
    }

    /// Fire when `flag` is set.
    pub fn from_flag(flag: Arc<AtomicBool>) -> Self {
        Self::from_fn(move || flag.load(Ordering::Acquire))
    }

    /// Poll the callback.
    pub fn is_triggered(&self) -> bool {
        self.callback.as_ref().is_some_and(|cb| cb())
    }
}

impl fmt::Debug for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interrupt")
            .field("installed", &self.callback.is_some())
            .finish()
    }
}
