use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::layout::Layout;

/// Progress callbacks; every method defaults to a no-op.
pub trait GenerationObserver {
    /// After every annealing proposal.
    fn on_perturbed(&mut self, _layout: &Layout) {}
    /// A chain was laid out validly and the result was kept.
    fn on_partial_valid(&mut self, _layout: &Layout) {}
    /// A complete layout was accepted.
    fn on_valid(&mut self, _layout: &Layout) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl GenerationObserver for NoopObserver {}

/// Cooperative cancellation flag shared between the caller and a search.
///
/// The search checks it once per annealing trial and once per work item and
/// returns the layouts collected so far.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
