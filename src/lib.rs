//! Mouse autoclicker: a timed autoclick mode plus two hold-to-click modes
//! (a keyboard key or the left mouse button), driven by global hotkeys.

pub mod cli;
pub mod clicker;
pub mod controller;
pub mod engine;
pub mod error;
pub mod hotkeys;
pub mod listener;
pub mod session;
pub mod settings;
pub mod ui;
