use crate::settings::{
    parse_positive, ClickMode, Settings, DEFAULT_AUTOCLICK_DELAY, DEFAULT_CPS, DEFAULT_HOLD_KEY,
    DEFAULT_NORMAL_DELAY, DEFAULT_TOGGLE_KEY,
};
use clap::Parser;

/// Mouse autoclicker with hold-to-click modes.
#[derive(Debug, Parser)]
#[command(name = "hold-clicker", version)]
pub struct Args {
    /// Mode selected at start-up
    #[arg(long, value_enum, default_value_t = ClickMode::Autoclick)]
    pub mode: ClickMode,

    /// Autoclick mode: clicks per second
    #[arg(long, default_value_t = DEFAULT_CPS.to_string())]
    pub autoclick_cps: String,

    /// Autoclick mode: seconds to wait before the first click
    #[arg(long, default_value_t = DEFAULT_AUTOCLICK_DELAY.to_string())]
    pub autoclick_delay: String,

    /// Autoclick mode: key that starts and stops clicking
    #[arg(long, default_value = DEFAULT_TOGGLE_KEY)]
    pub toggle_key: String,

    /// Keybind mode: clicks per second
    #[arg(long, default_value_t = DEFAULT_CPS.to_string())]
    pub keybind_cps: String,

    /// Keybind mode: key to hold for clicking
    #[arg(long, default_value = DEFAULT_HOLD_KEY)]
    pub hold_key: String,

    /// Normal mode: clicks per second
    #[arg(long, default_value_t = DEFAULT_CPS.to_string())]
    pub normal_cps: String,

    /// Normal mode: seconds M1 must be held before clicking starts
    #[arg(long, default_value_t = DEFAULT_NORMAL_DELAY.to_string())]
    pub normal_delay: String,

    /// Run without the control panel, arming the selected mode
    #[arg(long)]
    pub headless: bool,
}

impl Args {
    /// Numbers that don't parse as positive fall back to the defaults.
    pub fn settings(&self) -> Settings {
        let mut s = Settings::default();
        s.autoclick.clicks_per_sec = parse_positive(&self.autoclick_cps, DEFAULT_CPS);
        s.autoclick.start_delay = parse_positive(&self.autoclick_delay, DEFAULT_AUTOCLICK_DELAY);
        s.autoclick.toggle_key = self.toggle_key.trim().to_string();
        s.keybind.clicks_per_sec = parse_positive(&self.keybind_cps, DEFAULT_CPS);
        s.keybind.hold_key = self.hold_key.trim().to_string();
        s.normal.clicks_per_sec = parse_positive(&self.normal_cps, DEFAULT_CPS);
        s.normal.start_delay = parse_positive(&self.normal_delay, DEFAULT_NORMAL_DELAY);
        s
    }
}
