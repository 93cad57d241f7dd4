use clap::Parser;
use eframe::egui;
use hold_clicker::{
    cli::Args, controller::Controller, error::Result, settings::ClickMode, ui::ControlPanel,
};
use log::{info, warn};
use std::thread;

fn run_headless(controller: &Controller, mode: ClickMode) -> Result<()> {
    controller.start_listener()?;
    let session = controller.session();
    let settings = session.settings();
    match mode {
        ClickMode::Autoclick => {
            info!("press {} to start/stop clicking", settings.autoclick.toggle_key)
        }
        ClickMode::Keybind => {
            session.toggle_keybind();
            info!("hold {} to click", settings.keybind.hold_key);
        }
        ClickMode::Normal => {
            session.toggle_normal();
            info!("hold M1 to click");
        }
    }
    loop {
        thread::park();
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let controller = Controller::with_enigo(args.settings());
    controller.session().switch_mode(args.mode);

    if args.headless {
        return run_headless(&controller, args.mode);
    }

    // The panel still works without global hotkeys.
    if let Err(e) = controller.start_listener() {
        warn!("hotkeys disabled: {e}");
    }

    let mut opts = eframe::NativeOptions::default();
    opts.viewport = egui::ViewportBuilder::default()
        .with_inner_size([500.0, 420.0])
        .with_resizable(false);
    opts.follow_system_theme = true;

    eframe::run_native(
        "AutoClicker",
        opts,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Box::new(ControlPanel::new(controller))
        }),
    )?;
    Ok(())
}
