use crate::{
    engine::ClickEngine,
    hotkeys::{KeyEvent, MOUSE_LEFT},
    settings::{secs, ClickMode, Settings},
};
use log::info;
use parking_lot::Mutex;
use std::{fmt, sync::Arc, time::Duration};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Inactive,
    Clicking,
    /// Keybind or normal mode enabled and waiting for its key.
    Armed { mode: ClickMode, key: String },
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Inactive => write!(f, "● Inactive"),
            Status::Clicking => write!(f, "● Clicking..."),
            Status::Armed { mode: ClickMode::Normal, key } => {
                write!(f, "● Normal Mode Active - Hold {key} to Click")
            }
            Status::Armed { mode, key } => write!(f, "● {mode} Active - Hold {key}"),
        }
    }
}

struct SessionState {
    mode: ClickMode,
    armed: bool,
    settings: Settings,
}

/// Mode selection and the rules for when the engine runs.
///
/// Cheap to clone; hotkey handlers each hold their own copy.
#[derive(Clone)]
pub struct Session {
    engine: ClickEngine,
    state: Arc<Mutex<SessionState>>,
}

impl Session {
    pub fn new(engine: ClickEngine, settings: Settings) -> Self {
        Self {
            engine,
            state: Arc::new(Mutex::new(SessionState {
                mode: ClickMode::default(),
                armed: false,
                settings,
            })),
        }
    }

    pub fn engine(&self) -> &ClickEngine { &self.engine }

    pub fn mode(&self) -> ClickMode { self.state.lock().mode }

    pub fn is_armed(&self) -> bool { self.state.lock().armed }

    pub fn settings(&self) -> Settings { self.state.lock().settings.clone() }

    pub fn update_settings(&self, f: impl FnOnce(&mut Settings)) {
        f(&mut self.state.lock().settings);
    }

    pub fn is_clicking(&self) -> bool { self.engine.is_clicking() }

    pub fn click_count(&self) -> u64 { self.engine.click_count() }

    pub fn reset_click_count(&self) { self.engine.reset_count(); }

    /// Returns whether the engine is clicking afterwards.
    pub fn toggle_autoclick(&self) -> bool {
        let state = self.state.lock();
        if self.engine.stop() { return false; }
        let s = &state.settings.autoclick;
        self.engine.start(s.clicks_per_sec, secs(s.start_delay));
        true
    }

    /// Returns whether keybind mode is armed afterwards.
    pub fn toggle_keybind(&self) -> bool { self.toggle_armed(ClickMode::Keybind) }

    /// Returns whether normal mode is armed afterwards.
    pub fn toggle_normal(&self) -> bool { self.toggle_armed(ClickMode::Normal) }

    fn toggle_armed(&self, mode: ClickMode) -> bool {
        let mut state = self.state.lock();
        state.armed = !state.armed;
        state.mode = mode;
        if !state.armed { self.engine.stop(); }
        info!("{mode} {}", if state.armed { "enabled" } else { "disabled" });
        state.armed
    }

    /// Stops clicking and disarms before changing mode.
    pub fn switch_mode(&self, mode: ClickMode) {
        let mut state = self.state.lock();
        self.engine.stop();
        state.armed = false;
        if state.mode != mode { info!("switched to {mode}"); }
        state.mode = mode;
    }

    /// Stops clicking and disarms, keeping the mode.
    pub fn halt(&self) {
        let mut state = self.state.lock();
        self.engine.stop();
        state.armed = false;
    }

    pub fn on_toggle_key(&self, event: KeyEvent) {
        if event == KeyEvent::Press && self.mode() == ClickMode::Autoclick {
            self.toggle_autoclick();
        }
    }

    pub fn on_hold_key(&self, event: KeyEvent) {
        self.on_hold(ClickMode::Keybind, event, |s| (s.keybind.clicks_per_sec, Duration::ZERO));
    }

    pub fn on_mouse_left(&self, event: KeyEvent) {
        self.on_hold(ClickMode::Normal, event, |s| {
            (s.normal.clicks_per_sec, secs(s.normal.start_delay))
        });
    }

    fn on_hold(
        &self,
        mode: ClickMode,
        event: KeyEvent,
        params: impl FnOnce(&Settings) -> (f64, Duration),
    ) {
        let state = self.state.lock();
        if !state.armed || state.mode != mode { return; }
        match event {
            KeyEvent::Press => {
                let (cps, delay) = params(&state.settings);
                self.engine.start(cps, delay);
            }
            KeyEvent::Release => { self.engine.stop(); }
        }
    }

    pub fn status(&self) -> Status {
        let state = self.state.lock();
        if self.engine.is_clicking() { return Status::Clicking; }
        if !state.armed { return Status::Inactive; }
        let key = match state.mode {
            ClickMode::Keybind => state.settings.keybind.hold_key.clone(),
            ClickMode::Normal => MOUSE_LEFT.to_string(),
            ClickMode::Autoclick => state.settings.autoclick.toggle_key.clone(),
        };
        Status::Armed { mode: state.mode, key }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::RecordingClicker;
    use std::thread;

    fn session() -> (Session, Arc<RecordingClicker>) {
        let clicker = Arc::new(RecordingClicker::default());
        let mut settings = Settings::default();
        settings.autoclick.start_delay = 0.05;
        settings.autoclick.clicks_per_sec = 20.0;
        settings.keybind.clicks_per_sec = 20.0;
        settings.normal.clicks_per_sec = 20.0;
        settings.normal.start_delay = 0.05;
        (Session::new(ClickEngine::new(clicker.clone()), settings), clicker)
    }

    #[test]
    fn test_new_session_is_inactive() {
        let (session, _) = session();
        assert_eq!(session.mode(), ClickMode::Autoclick);
        assert!(!session.is_armed());
        assert_eq!(session.status(), Status::Inactive);
        assert_eq!(session.status().to_string(), "● Inactive");
    }

    #[test]
    fn test_toggle_autoclick() {
        let (session, clicker) = session();
        assert!(session.toggle_autoclick());
        assert_eq!(session.status(), Status::Clicking);
        thread::sleep(Duration::from_millis(200));

        assert!(!session.toggle_autoclick());
        assert!(!session.is_clicking());
        assert!(clicker.count() > 0);
    }

    #[test]
    fn test_toggle_key_only_in_autoclick_mode() {
        let (session, _) = session();
        session.switch_mode(ClickMode::Keybind);
        session.on_toggle_key(KeyEvent::Press);
        assert!(!session.is_clicking());

        session.switch_mode(ClickMode::Autoclick);
        session.on_toggle_key(KeyEvent::Release);
        assert!(!session.is_clicking());
        session.on_toggle_key(KeyEvent::Press);
        assert!(session.is_clicking());
        session.on_toggle_key(KeyEvent::Press);
        assert!(!session.is_clicking());
    }

    #[test]
    fn test_hold_key_needs_arming() {
        let (session, _) = session();
        session.switch_mode(ClickMode::Keybind);
        session.on_hold_key(KeyEvent::Press);
        assert!(!session.is_clicking());

        assert!(session.toggle_keybind());
        assert_eq!(session.status().to_string(), "● Keybind Mode Active - Hold F7");
        session.on_hold_key(KeyEvent::Press);
        assert!(session.is_clicking());
        session.on_hold_key(KeyEvent::Release);
        assert!(!session.is_clicking());
    }

    #[test]
    fn test_mouse_left_in_normal_mode() {
        let (session, clicker) = session();
        session.switch_mode(ClickMode::Normal);
        assert!(session.toggle_normal());
        assert_eq!(session.status().to_string(), "● Normal Mode Active - Hold M1 to Click");

        // hold key belongs to keybind mode
        session.on_hold_key(KeyEvent::Press);
        assert!(!session.is_clicking());

        session.on_mouse_left(KeyEvent::Press);
        assert!(session.is_clicking());
        thread::sleep(Duration::from_millis(200));
        session.on_mouse_left(KeyEvent::Release);
        assert!(!session.is_clicking());
        assert!(clicker.count() > 0);
    }

    #[test]
    fn test_disarming_stops_clicking() {
        let (session, _) = session();
        session.toggle_keybind();
        session.on_hold_key(KeyEvent::Press);
        assert!(session.is_clicking());

        assert!(!session.toggle_keybind());
        assert!(!session.is_clicking());
        assert_eq!(session.status(), Status::Inactive);
    }

    #[test]
    fn test_switch_mode_stops_clicking() {
        let (session, clicker) = session();
        session.toggle_autoclick();
        thread::sleep(Duration::from_millis(150));

        session.switch_mode(ClickMode::Normal);
        assert!(!session.is_clicking());
        assert!(!session.is_armed());
        let count = clicker.count();
        thread::sleep(Duration::from_millis(200));
        assert_eq!(clicker.count(), count);
    }

    #[test]
    fn test_switch_mode_disarms() {
        let (session, _) = session();
        session.switch_mode(ClickMode::Keybind);
        session.toggle_keybind();
        session.on_hold_key(KeyEvent::Press);

        session.switch_mode(ClickMode::Keybind);
        assert!(!session.is_clicking());
        assert!(!session.is_armed());
        session.on_hold_key(KeyEvent::Press);
        assert!(!session.is_clicking());
    }

    #[test]
    fn test_settings_are_read_at_start() {
        let (session, _) = session();
        session.update_settings(|s| s.keybind.hold_key = "Q".into());
        session.toggle_keybind();
        assert_eq!(session.status(), Status::Armed { mode: ClickMode::Keybind, key: "Q".into() });
    }

    #[test]
    fn test_halt() {
        let (session, _) = session();
        session.toggle_normal();
        session.on_mouse_left(KeyEvent::Press);
        session.halt();
        assert!(!session.is_clicking());
        assert!(!session.is_armed());
        assert_eq!(session.mode(), ClickMode::Normal);
    }
}
