use crate::{
    clicker::{Clicker, EnigoClicker, SyntheticFilter},
    engine::ClickEngine,
    error::Result,
    hotkeys::{Handler, HotkeyManager, KeyId, MOUSE_LEFT},
    session::Session,
    settings::{HotkeyTarget, Settings},
};
use log::{info, warn};
use std::sync::Arc;

/// Ties the session to the hotkey table and owns the global listener.
#[derive(Clone)]
pub struct Controller {
    session: Session,
    hotkeys: HotkeyManager,
    filter: SyntheticFilter,
}

impl Controller {
    pub fn new(clicker: Arc<dyn Clicker>, filter: SyntheticFilter, settings: Settings) -> Self {
        let controller = Self {
            session: Session::new(ClickEngine::new(clicker), settings),
            hotkeys: HotkeyManager::new(),
            filter,
        };
        controller.setup_hotkeys();
        controller
    }

    /// Controller that sends real clicks.
    pub fn with_enigo(settings: Settings) -> Self {
        let filter = SyntheticFilter::new();
        let clicker = Arc::new(EnigoClicker::new(filter.clone()));
        Self::new(clicker, filter, settings)
    }

    pub fn session(&self) -> &Session { &self.session }

    pub fn hotkeys(&self) -> &HotkeyManager { &self.hotkeys }

    pub fn start_listener(&self) -> Result<()> { self.hotkeys.start(self.filter.clone()) }

    /// Rebuilds the whole hotkey table from the current settings.
    pub fn setup_hotkeys(&self) {
        let settings = self.session.settings();
        let mut bindings: Vec<(KeyId, Handler)> = Vec::with_capacity(3);

        let session = self.session.clone();
        let on_toggle: Handler = Arc::new(move |e| session.on_toggle_key(e));
        push_binding(&mut bindings, &settings.autoclick.toggle_key, on_toggle);

        let session = self.session.clone();
        let on_hold: Handler = Arc::new(move |e| session.on_hold_key(e));
        push_binding(&mut bindings, &settings.keybind.hold_key, on_hold);

        let session = self.session.clone();
        push_binding(&mut bindings, MOUSE_LEFT, Arc::new(move |e| session.on_mouse_left(e)));

        self.hotkeys.replace_all(bindings);
    }

    pub fn set_hotkey(&self, target: HotkeyTarget, name: &str) -> Result<()> {
        let key = KeyId::new(name)?;
        info!("{target:?} hotkey set to {key}");
        self.session.update_settings(|s| s.set_hotkey(target, name.trim().to_string()));
        self.setup_hotkeys();
        Ok(())
    }

    /// The next key pressed anywhere becomes the hotkey for `target`.
    pub fn record_hotkey(&self, target: HotkeyTarget) {
        let this = self.clone();
        self.hotkeys.start_recording(Box::new(move |name| {
            if let Err(e) = this.set_hotkey(target, &name) {
                warn!("ignoring recorded key: {e}");
            }
        }));
    }

    pub fn shutdown(&self) {
        self.hotkeys.cancel_recording();
        self.hotkeys.stop();
        self.session.halt();
        self.session.engine().shutdown();
        info!("shut down after {} clicks", self.session.click_count());
    }
}

fn push_binding(bindings: &mut Vec<(KeyId, Handler)>, name: &str, handler: Handler) {
    match KeyId::new(name) {
        Ok(key) => {
            if bindings.iter().any(|(k, _)| *k == key) {
                warn!("{key} is bound twice; the later binding wins");
            }
            bindings.push((key, handler));
        }
        Err(e) => warn!("skipping hotkey: {e}"),
    }
}
