use crate::{
    controller::Controller,
    settings::{
        parse_positive, ClickMode, HotkeyTarget, DEFAULT_AUTOCLICK_DELAY, DEFAULT_CPS,
        DEFAULT_NORMAL_DELAY,
    },
    session::Status,
};
use egui::Color32;
use std::time::Duration;

// -------------- UI State --------------
pub struct ControlPanel {
    controller: Controller,
    tab: ClickMode,
    recording: Option<HotkeyTarget>,

    // raw text of the numeric fields, parsed on every edit
    autoclick_delay: String,
    autoclick_cps: String,
    keybind_cps: String,
    normal_cps: String,
    normal_delay: String,
}

impl ControlPanel {
    pub fn new(controller: Controller) -> Self {
        let session = controller.session();
        let s = session.settings();
        Self {
            tab: session.mode(),
            recording: None,
            autoclick_delay: s.autoclick.start_delay.to_string(),
            autoclick_cps: s.autoclick.clicks_per_sec.to_string(),
            keybind_cps: s.keybind.clicks_per_sec.to_string(),
            normal_cps: s.normal.clicks_per_sec.to_string(),
            normal_delay: s.normal.start_delay.to_string(),
            controller,
        }
    }

    fn select_tab(&mut self, tab: ClickMode) {
        if tab == self.tab { return; }
        self.tab = tab;
        self.cancel_recording();
        self.controller.session().switch_mode(tab);
    }

    fn record(&mut self, target: HotkeyTarget) {
        self.recording = Some(target);
        self.controller.record_hotkey(target);
    }

    fn cancel_recording(&mut self) {
        if self.recording.take().is_some() {
            self.controller.hotkeys().cancel_recording();
        }
    }

    fn sync_numbers(&self) {
        self.controller.session().update_settings(|s| {
            s.autoclick.start_delay =
                parse_positive(&self.autoclick_delay, DEFAULT_AUTOCLICK_DELAY);
            s.autoclick.clicks_per_sec = parse_positive(&self.autoclick_cps, DEFAULT_CPS);
            s.keybind.clicks_per_sec = parse_positive(&self.keybind_cps, DEFAULT_CPS);
            s.normal.clicks_per_sec = parse_positive(&self.normal_cps, DEFAULT_CPS);
            s.normal.start_delay = parse_positive(&self.normal_delay, DEFAULT_NORMAL_DELAY);
        });
    }

    fn hotkey_label(&self, target: HotkeyTarget) -> String {
        if self.recording == Some(target) {
            "Press key...".to_string()
        } else {
            self.controller.session().settings().hotkey(target).to_string()
        }
    }

    fn autoclick_tab(&mut self, ui: &mut egui::Ui) -> bool {
        ui.label("Start clicking with a delay, stop with hotkey.");
        let mut changed = number_field(ui, "Start Delay (sec):", &mut self.autoclick_delay);
        changed |= number_field(ui, "Clicks per Second:", &mut self.autoclick_cps);
        ui.horizontal(|ui| {
            ui.label("Start/Stop Hotkey:");
            if ui.button(self.hotkey_label(HotkeyTarget::Autoclick)).clicked() {
                self.record(HotkeyTarget::Autoclick);
            }
        });

        let session = self.controller.session();
        let text = if session.is_clicking() {
            "⏹ Stop Autoclicking"
        } else {
            "▶ Start Autoclicking"
        };
        if ui.button(text).clicked() {
            self.sync_numbers();
            self.controller.session().toggle_autoclick();
        }
        changed
    }

    fn keybind_tab(&mut self, ui: &mut egui::Ui) -> bool {
        ui.label("Click continuously while holding a key.");
        let changed = number_field(ui, "Clicks per Second:", &mut self.keybind_cps);
        ui.horizontal(|ui| {
            ui.label("Hold to Click Key:");
            if ui.button(self.hotkey_label(HotkeyTarget::Keybind)).clicked() {
                self.record(HotkeyTarget::Keybind);
            }
        });
        let armed = self.controller.session().is_armed();
        if ui.button(if armed { "Disable Keybind Mode" } else { "Enable Keybind Mode" }).clicked() {
            self.controller.session().toggle_keybind();
        }
        ui.small("Hold the specified key to autoclick.");
        changed
    }

    fn normal_tab(&mut self, ui: &mut egui::Ui) -> bool {
        ui.label("Click while holding left mouse button (M1).");
        let mut changed = number_field(ui, "Clicks per Second:", &mut self.normal_cps);
        changed |= number_field(ui, "Start Delay (sec):", &mut self.normal_delay);
        let armed = self.controller.session().is_armed();
        if ui.button(if armed { "Disable Normal Mode" } else { "Enable Normal Mode" }).clicked() {
            self.controller.session().toggle_normal();
        }
        ui.small("Hold Left Mouse Button to autoclick after delay.");
        changed
    }
}

fn number_field(ui: &mut egui::Ui, label: &str, text: &mut String) -> bool {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.add(egui::TextEdit::singleline(text).desired_width(80.0)).changed()
    })
    .inner
}

fn status_color(status: &Status) -> Color32 {
    match status {
        Status::Clicking => Color32::GREEN,
        Status::Armed { .. } => Color32::YELLOW,
        Status::Inactive => Color32::RED,
    }
}

impl eframe::App for ControlPanel {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // the recording callback fires on the hook thread
        if self.recording.is_some() && !self.controller.hotkeys().is_recording() {
            self.recording = None;
        }

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.heading("AutoClicker");
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                for mode in ClickMode::ALL {
                    if ui.selectable_label(self.tab == mode, mode.title()).clicked() {
                        self.select_tab(mode);
                    }
                }
            });
            ui.separator();

            let changed = ui.group(|ui| match self.tab {
                ClickMode::Autoclick => self.autoclick_tab(ui),
                ClickMode::Keybind => self.keybind_tab(ui),
                ClickMode::Normal => self.normal_tab(ui),
            }).inner;
            if changed { self.sync_numbers(); }

            ui.separator();
            ui.group(|ui| {
                ui.label("Status");
                let status = self.controller.session().status();
                ui.colored_label(status_color(&status), status.to_string());
                ui.horizontal(|ui| {
                    ui.label(format!("Clicks: {}", self.controller.session().click_count()));
                    if ui.button("Reset").clicked() {
                        self.controller.session().reset_click_count();
                    }
                });
            });
        });

        // state changes arrive from other threads
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

impl Drop for ControlPanel {
    fn drop(&mut self) { self.controller.shutdown(); }
}
