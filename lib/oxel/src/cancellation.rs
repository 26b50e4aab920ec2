use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A token to cooperatively interrupt a running saturation.
///
/// Workers check it between two conclusions, so a conclusion is always fully applied.
///
/// ```
/// use oxel::CancellationToken;
///
/// let token = CancellationToken::new();
/// let clone = token.clone();
/// clone.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Clone, Default, Debug)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the interruption of every computation sharing this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Clears a previous cancellation so the interrupted work can be resumed.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Relaxed);
    }
}
