use enigo::{MouseButton, MouseControllable};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

/// Something that can press and release the left mouse button.
pub trait Clicker: Send + Sync {
    fn left_click(&self);
}

static ENIGO: Lazy<Mutex<enigo::Enigo>> = Lazy::new(|| Mutex::new(enigo::Enigo::new()));

/// Sends real clicks through `enigo`.
///
/// Every click produces a press and a release that the global hook will see
/// again; both are announced to the [`SyntheticFilter`] first so the listener
/// can drop them instead of treating them as the user's own M1.
pub struct EnigoClicker {
    filter: SyntheticFilter,
}

impl EnigoClicker {
    pub fn new(filter: SyntheticFilter) -> Self { Self { filter } }
}

impl Clicker for EnigoClicker {
    fn left_click(&self) {
        self.filter.announce(2);
        ENIGO.lock().mouse_click(MouseButton::Left);
    }
}

/// Count of left-button events we generated ourselves and have not yet seen
/// come back through the hook. Only counts while a hook is listening.
#[derive(Clone, Default)]
pub struct SyntheticFilter {
    pending: Arc<AtomicUsize>,
    enabled: Arc<AtomicBool>,
}

impl SyntheticFilter {
    pub fn new() -> Self { Self::default() }

    pub fn enable(&self) { self.enabled.store(true, Ordering::SeqCst); }

    /// Stops counting and forgets anything still pending.
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        self.pending.store(0, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool { self.enabled.load(Ordering::SeqCst) }

    pub fn announce(&self, events: usize) {
        if self.is_enabled() {
            self.pending.fetch_add(events, Ordering::SeqCst);
        }
    }

    /// Returns true if the event should be swallowed.
    pub fn consume(&self) -> bool {
        self.pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    pub fn pending(&self) -> usize { self.pending.load(Ordering::SeqCst) }
}
