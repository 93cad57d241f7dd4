// Global keyboard/mouse hook feeding a HotkeyManager.

use crate::{clicker::SyntheticFilter, error::Result, hotkeys::HotkeyManager};

#[cfg(feature = "hooks")]
pub fn spawn(hotkeys: HotkeyManager, filter: SyntheticFilter) -> Result<()> {
    use crate::error::Error;
    use log::error;
    use rdev::{Button, EventType};
    use std::thread;

    thread::Builder::new()
        .name("input-hook".into())
        .spawn(move || {
            let callback = move |event: rdev::Event| {
                if !hotkeys.is_active() { return; }
                match event.event_type {
                    EventType::KeyPress(key) => hotkeys.handle_key_press(&key_name(key)),
                    EventType::KeyRelease(key) => hotkeys.handle_key_release(&key_name(key)),
                    EventType::ButtonPress(Button::Left) => {
                        forward_left_button(&hotkeys, &filter, true)
                    }
                    EventType::ButtonRelease(Button::Left) => {
                        forward_left_button(&hotkeys, &filter, false)
                    }
                    _ => {}
                }
            };
            if let Err(e) = rdev::listen(callback) {
                error!("global input listener stopped: {e:?}");
            }
        })
        .map_err(|e| Error::Listen(e.to_string()))?;
    Ok(())
}

#[cfg(not(feature = "hooks"))]
pub fn spawn(_hotkeys: HotkeyManager, _filter: SyntheticFilter) -> Result<()> {
    Err(crate::error::Error::HooksUnavailable)
}

/// Passes a left-button event on unless it's one of our own clicks.
pub fn forward_left_button(hotkeys: &HotkeyManager, filter: &SyntheticFilter, pressed: bool) {
    if !filter.consume() {
        hotkeys.handle_mouse_left(pressed);
    }
}

/// Display name for a key, e.g. `F6`, `A`, `7`, `SPACE`, `VK_93`.
#[cfg(feature = "hooks")]
pub fn key_name(key: rdev::Key) -> String {
    use rdev::Key;
    let name = match key {
        Key::KeyA => "A", Key::KeyB => "B", Key::KeyC => "C", Key::KeyD => "D",
        Key::KeyE => "E", Key::KeyF => "F", Key::KeyG => "G", Key::KeyH => "H",
        Key::KeyI => "I", Key::KeyJ => "J", Key::KeyK => "K", Key::KeyL => "L",
        Key::KeyM => "M", Key::KeyN => "N", Key::KeyO => "O", Key::KeyP => "P",
        Key::KeyQ => "Q", Key::KeyR => "R", Key::KeyS => "S", Key::KeyT => "T",
        Key::KeyU => "U", Key::KeyV => "V", Key::KeyW => "W", Key::KeyX => "X",
        Key::KeyY => "Y", Key::KeyZ => "Z",
        Key::Num0 => "0", Key::Num1 => "1", Key::Num2 => "2", Key::Num3 => "3",
        Key::Num4 => "4", Key::Num5 => "5", Key::Num6 => "6", Key::Num7 => "7",
        Key::Num8 => "8", Key::Num9 => "9",
        Key::Return => "ENTER",
        Key::Escape => "ESC",
        Key::Unknown(code) => return format!("VK_{code}"),
        other => return format!("{other:?}").to_uppercase(),
    };
    name.to_string()
}



#[cfg(all(test, not(feature = "hooks")))]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_without_hooks_fails() {
        let err = spawn(HotkeyManager::new(), SyntheticFilter::new()).unwrap_err();
        assert!(matches!(err, crate::error::Error::HooksUnavailable));
    }
}
