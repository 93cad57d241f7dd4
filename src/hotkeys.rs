use crate::{
    clicker::SyntheticFilter,
    error::{Error, Result},
    listener,
};
use log::{debug, info};
use parking_lot::{Mutex, RwLock};
use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

/// Identifier the hook reports for the left mouse button.
pub const MOUSE_LEFT: &str = "M1";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyEvent { Press, Release }

pub type Handler = Arc<dyn Fn(KeyEvent) + Send + Sync>;
pub type RecordCallback = Box<dyn FnOnce(String) + Send>;

/// Case-insensitive key name, stored lowercase.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyId(String);

impl KeyId {
    pub fn new(name: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidKey(name.to_string()));
        }
        Ok(Self(name.to_lowercase()))
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_uppercase())
    }
}

#[derive(Default)]
struct Inner {
    handlers: RwLock<HashMap<KeyId, Handler>>,
    pressed: Mutex<HashSet<KeyId>>,
    recording: Mutex<Option<RecordCallback>>,
    active: AtomicBool,
    listening: AtomicBool,
    filter: Mutex<Option<SyntheticFilter>>,
}

/// Global hotkey dispatch table.
///
/// Handlers run on the thread that delivers the event and must not call
/// back into the manager; dispatch holds the table's read lock for the
/// duration of the call so that a rebind returning guarantees the old
/// handler will not run again.
#[derive(Clone, Default)]
pub struct HotkeyManager {
    inner: Arc<Inner>,
}

impl HotkeyManager {
    pub fn new() -> Self { Self::default() }

    /// Enables dispatch from the global hook, spawning it on first use.
    pub fn start(&self, filter: SyntheticFilter) -> Result<()> {
        self.inner.active.store(true, Ordering::SeqCst);
        if self.inner.listening.swap(true, Ordering::SeqCst) {
            if let Some(filter) = self.inner.filter.lock().as_ref() { filter.enable(); }
            return Ok(());
        }
        if let Err(e) = listener::spawn(self.clone(), filter.clone()) {
            self.inner.listening.store(false, Ordering::SeqCst);
            self.inner.active.store(false, Ordering::SeqCst);
            return Err(e);
        }
        filter.enable();
        *self.inner.filter.lock() = Some(filter);
        info!("global input listener started");
        Ok(())
    }

    /// The hook thread cannot be torn down, so this only mutes it.
    pub fn stop(&self) {
        self.inner.active.store(false, Ordering::SeqCst);
        self.inner.pressed.lock().clear();
        if let Some(filter) = self.inner.filter.lock().as_ref() { filter.disable(); }
        debug!("global input listener muted");
    }

    pub fn is_active(&self) -> bool { self.inner.active.load(Ordering::SeqCst) }

    pub fn register(&self, key: &KeyId, handler: Handler) {
        self.inner.handlers.write().insert(key.clone(), handler);
    }

    pub fn unregister(&self, key: &KeyId) -> bool {
        self.inner.handlers.write().remove(key).is_some()
    }

    pub fn clear(&self) { self.inner.handlers.write().clear(); }

    /// Swaps in a whole new table. Later bindings for the same key win.
    pub fn replace_all(&self, bindings: impl IntoIterator<Item = (KeyId, Handler)>) {
        let table: HashMap<KeyId, Handler> = bindings.into_iter().collect();
        debug!("hotkey table rebuilt with {} bindings", table.len());
        *self.inner.handlers.write() = table;
    }

    pub fn is_bound(&self, key: &KeyId) -> bool { self.inner.handlers.read().contains_key(key) }

    /// The next key press goes to `callback` instead of the table.
    pub fn start_recording(&self, callback: RecordCallback) {
        *self.inner.recording.lock() = Some(callback);
    }

    pub fn cancel_recording(&self) -> bool { self.inner.recording.lock().take().is_some() }

    pub fn is_recording(&self) -> bool { self.inner.recording.lock().is_some() }

    pub fn is_pressed(&self, name: &str) -> bool {
        KeyId::new(name).is_ok_and(|key| self.inner.pressed.lock().contains(&key))
    }

    pub fn handle_key_press(&self, name: &str) {
        let Ok(key) = KeyId::new(name) else { return };

        let recording = self.inner.recording.lock().take();
        if let Some(callback) = recording {
            info!("recorded key {}", name.trim());
            callback(name.trim().to_string());
            return;
        }

        self.inner.pressed.lock().insert(key.clone());
        self.dispatch(&key, KeyEvent::Press);
    }

    pub fn handle_key_release(&self, name: &str) {
        let Ok(key) = KeyId::new(name) else { return };
        self.inner.pressed.lock().remove(&key);
        self.dispatch(&key, KeyEvent::Release);
    }

    /// Mouse buttons never end a recording.
    pub fn handle_mouse_left(&self, pressed: bool) {
        if !pressed {
            return self.handle_key_release(MOUSE_LEFT);
        }
        let key = KeyId(MOUSE_LEFT.to_lowercase());
        self.inner.pressed.lock().insert(key.clone());
        self.dispatch(&key, KeyEvent::Press);
    }

    fn dispatch(&self, key: &KeyId, event: KeyEvent) {
        let handlers = self.inner.handlers.read();
        if let Some(handler) = handlers.get(key) {
            debug!("{key} {event:?}");
            handler(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn key(name: &str) -> KeyId { KeyId::new(name).unwrap() }

    fn recorder() -> (Handler, Arc<Mutex<Vec<KeyEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let handler: Handler = Arc::new(move |event| seen_clone.lock().push(event));
        (handler, seen)
    }

    #[test]
    fn test_key_id_normalizes() {
        assert_eq!(key("F6"), key("f6"));
        assert_eq!(key("  Space "), key("SPACE"));
        assert_eq!(key("f6").to_string(), "F6");
        assert!(matches!(KeyId::new("   "), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_dispatch_press_and_release() {
        let hotkeys = HotkeyManager::new();
        let (handler, seen) = recorder();
        hotkeys.register(&key("F7"), handler);

        hotkeys.handle_key_press("F7");
        assert!(hotkeys.is_pressed("f7"));
        hotkeys.handle_key_release("F7");
        assert!(!hotkeys.is_pressed("F7"));

        assert_eq!(*seen.lock(), vec![KeyEvent::Press, KeyEvent::Release]);
    }

    #[test]
    fn test_unbound_keys_are_ignored() {
        let hotkeys = HotkeyManager::new();
        let (handler, seen) = recorder();
        hotkeys.register(&key("F7"), handler);

        hotkeys.handle_key_press("F8");
        hotkeys.handle_key_release("F8");
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn test_register_replaces_previous_handler() {
        let hotkeys = HotkeyManager::new();
        let (old, old_seen) = recorder();
        let (new, new_seen) = recorder();
        hotkeys.register(&key("F6"), old);
        hotkeys.register(&key("f6"), new);

        hotkeys.handle_key_press("F6");
        assert!(old_seen.lock().is_empty());
        assert_eq!(new_seen.lock().len(), 1);
    }

    #[test]
    fn test_replace_all_drops_old_bindings() {
        let hotkeys = HotkeyManager::new();
        let (old, old_seen) = recorder();
        let (new, new_seen) = recorder();
        hotkeys.register(&key("F6"), old);

        hotkeys.replace_all([(key("F9"), new)]);
        assert!(!hotkeys.is_bound(&key("F6")));

        hotkeys.handle_key_press("F6");
        hotkeys.handle_key_press("F9");
        assert!(old_seen.lock().is_empty());
        assert_eq!(*new_seen.lock(), vec![KeyEvent::Press]);
    }

    #[test]
    fn test_unregister_and_clear() {
        let hotkeys = HotkeyManager::new();
        let (handler, _) = recorder();
        hotkeys.register(&key("A"), handler.clone());
        hotkeys.register(&key("B"), handler);

        assert!(hotkeys.unregister(&key("a")));
        assert!(!hotkeys.unregister(&key("a")));
        assert!(hotkeys.is_bound(&key("b")));
        hotkeys.clear();
        assert!(!hotkeys.is_bound(&key("b")));
    }

    #[test]
    fn test_recording_consumes_one_press() {
        let hotkeys = HotkeyManager::new();
        let (handler, seen) = recorder();
        hotkeys.register(&key("F6"), handler);

        let recorded = Arc::new(Mutex::new(None));
        let recorded_clone = Arc::clone(&recorded);
        hotkeys.start_recording(Box::new(move |name| *recorded_clone.lock() = Some(name)));
        assert!(hotkeys.is_recording());

        hotkeys.handle_key_press("F6");
        assert_eq!(recorded.lock().as_deref(), Some("F6"));
        assert!(!hotkeys.is_recording());
        assert!(seen.lock().is_empty());
        assert!(!hotkeys.is_pressed("F6"));

        hotkeys.handle_key_press("F6");
        assert_eq!(*seen.lock(), vec![KeyEvent::Press]);
    }

    #[test]
    fn test_mouse_does_not_end_recording() {
        let hotkeys = HotkeyManager::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        hotkeys.start_recording(Box::new(move |_| { calls_clone.fetch_add(1, Ordering::SeqCst); }));

        hotkeys.handle_mouse_left(true);
        hotkeys.handle_mouse_left(false);
        assert!(hotkeys.is_recording());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(hotkeys.cancel_recording());
        assert!(!hotkeys.is_recording());
    }

    #[test]
    fn test_mouse_left_dispatches_to_m1() {
        let hotkeys = HotkeyManager::new();
        let (handler, seen) = recorder();
        hotkeys.register(&key("m1"), handler);

        hotkeys.handle_mouse_left(true);
        assert!(hotkeys.is_pressed("M1"));
        hotkeys.handle_mouse_left(false);
        assert_eq!(*seen.lock(), vec![KeyEvent::Press, KeyEvent::Release]);
    }

    #[test]
    fn test_rebind_is_atomic_under_concurrent_dispatch() {
        let hotkeys = HotkeyManager::new();
        let rebound = Arc::new(AtomicBool::new(false));
        let late_calls = Arc::new(AtomicUsize::new(0));

        let rebound_clone = Arc::clone(&rebound);
        let late_clone = Arc::clone(&late_calls);
        let old: Handler = Arc::new(move |_| {
            if rebound_clone.load(Ordering::SeqCst) {
                late_clone.fetch_add(1, Ordering::SeqCst);
            }
        });
        hotkeys.register(&key("F6"), old);

        let done = Arc::new(AtomicBool::new(false));
        let presses = Arc::new(AtomicUsize::new(0));
        let presser = {
            let hotkeys = hotkeys.clone();
            let done = Arc::clone(&done);
            let presses = Arc::clone(&presses);
            std::thread::spawn(move || {
                while !done.load(Ordering::SeqCst) {
                    hotkeys.handle_key_press("F6");
                    presses.fetch_add(1, Ordering::SeqCst);
                }
            })
        };

        // make sure dispatch is in full swing before swapping the table
        while presses.load(Ordering::SeqCst) < 1_000 { std::thread::yield_now(); }
        let (new, new_seen) = recorder();
        hotkeys.replace_all([(key("F6"), new)]);
        rebound.store(true, Ordering::SeqCst);

        // keep pressing after the swap, then stop
        let swapped_at = presses.load(Ordering::SeqCst);
        while presses.load(Ordering::SeqCst) < swapped_at + 1_000 { std::thread::yield_now(); }
        done.store(true, Ordering::SeqCst);

        presser.join().unwrap();
        assert!(!new_seen.lock().is_empty());
        assert_eq!(late_calls.load(Ordering::SeqCst), 0);
    }
}
