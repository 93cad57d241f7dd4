use std::{fmt, time::Duration};

pub const DEFAULT_CPS: f64 = 10.0;
pub const DEFAULT_AUTOCLICK_DELAY: f64 = 1.0;
pub const DEFAULT_NORMAL_DELAY: f64 = 0.5;
pub const DEFAULT_TOGGLE_KEY: &str = "F6";
pub const DEFAULT_HOLD_KEY: &str = "F7";

/// Parses a strictly positive number, falling back to `default` for
/// anything else (garbage, zero, negatives, NaN, infinity).
pub fn parse_positive(text: &str, default: f64) -> f64 {
    match text.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v,
        _ => default,
    }
}

/// Seconds to a `Duration`. Unusable input is zero; values too large to
/// represent saturate to `Duration::MAX`.
pub fn secs(value: f64) -> Duration {
    if !(value.is_finite() && value > 0.0) {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ClickMode {
    #[default]
    Autoclick,
    Keybind,
    Normal,
}

impl ClickMode {
    pub const ALL: [ClickMode; 3] = [ClickMode::Autoclick, ClickMode::Keybind, ClickMode::Normal];

    pub fn title(self) -> &'static str {
        match self {
            ClickMode::Autoclick => "Autoclick Mode",
            ClickMode::Keybind => "Keybind Mode",
            ClickMode::Normal => "Normal Mode",
        }
    }
}

impl fmt::Display for ClickMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.title()) }
}

/// Which configurable hotkey a recording is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HotkeyTarget { Autoclick, Keybind }

#[derive(Clone, Debug, PartialEq)]
pub struct AutoclickSettings {
    pub start_delay: f64,
    pub clicks_per_sec: f64,
    pub toggle_key: String,
}

impl Default for AutoclickSettings {
    fn default() -> Self {
        Self {
            start_delay: DEFAULT_AUTOCLICK_DELAY,
            clicks_per_sec: DEFAULT_CPS,
            toggle_key: DEFAULT_TOGGLE_KEY.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeybindSettings {
    pub clicks_per_sec: f64,
    pub hold_key: String,
}

impl Default for KeybindSettings {
    fn default() -> Self {
        Self { clicks_per_sec: DEFAULT_CPS, hold_key: DEFAULT_HOLD_KEY.to_string() }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NormalSettings {
    pub clicks_per_sec: f64,
    pub start_delay: f64,
}

impl Default for NormalSettings {
    fn default() -> Self {
        Self { clicks_per_sec: DEFAULT_CPS, start_delay: DEFAULT_NORMAL_DELAY }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Settings {
    pub autoclick: AutoclickSettings,
    pub keybind: KeybindSettings,
    pub normal: NormalSettings,
}

impl Settings {
    pub fn hotkey(&self, target: HotkeyTarget) -> &str {
        match target {
            HotkeyTarget::Autoclick => &self.autoclick.toggle_key,
            HotkeyTarget::Keybind => &self.keybind.hold_key,
        }
    }

    pub fn set_hotkey(&mut self, target: HotkeyTarget, name: String) {
        match target {
            HotkeyTarget::Autoclick => self.autoclick.toggle_key = name,
            HotkeyTarget::Keybind => self.keybind.hold_key = name,
        }
    }
}
