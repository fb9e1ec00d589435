mod config;
mod db_manager;
mod duration;
mod library;
mod mixer;
mod protocol;
mod track;
mod widget;

use std::{cell::RefCell, path::PathBuf, rc::Rc, thread};

use db_manager::DbManager;
use library::Library;
use log::{debug, info, warn};
use mixer::player_manager::PlayerManager;
use protocol::Message;
use tokio::sync::broadcast::{self, error::RecvError, Receiver};
use widget::touch_screen_library::TouchScreenLibrary;

slint::include_modules!();

fn spawn_bus_logger(mut bus_receiver: Receiver<Message>) -> std::io::Result<()> {
    thread::Builder::new()
        .name("bus-logger".to_string())
        .spawn(move || loop {
            match bus_receiver.blocking_recv() {
                Ok(message) => debug!("Bus message: {:?}", message),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Bus logger lagged behind. skipped={}", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        })?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut clog = colog::default_builder();
    clog.filter(None, log::LevelFilter::Trace);
    clog.init();

    std::panic::set_hook(Box::new(|panic_info| {
        let current_thread = std::thread::current();
        let thread_name = current_thread.name().unwrap_or("unnamed");
        log::error!("panic in thread '{}': {}", thread_name, panic_info);
    }));

    let config_file = dirs::config_dir()
        .ok_or("Could not find config directory")?
        .join("touchdeck.toml");
    let config = config::load_or_create_config(&config_file)?;
    log::set_max_level(config.ui.log_level_filter());

    if std::env::var_os("SLINT_BACKEND").is_none() {
        std::env::set_var("SLINT_BACKEND", "winit-software");
        info!("SLINT_BACKEND not set. Defaulting to winit-software");
    }

    let db_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.library.resolved_database_path())
        .ok_or("Could not resolve library database path")?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let library = Library::new(DbManager::open(&db_path)?);

    // Bus for player notifications
    let (bus_sender, bus_receiver) = broadcast::channel(256);
    spawn_bus_logger(bus_receiver)?;

    let player_manager = Rc::new(RefCell::new(PlayerManager::new(
        &config.players,
        bus_sender,
    )));

    let touch_library = TouchScreenLibrary::new(&library, &player_manager, &config.ui)?;
    info!(
        "Starting touch library. database={} tracks={}",
        db_path.display(),
        touch_library.model().row_count()
    );
    touch_library.run()?;

    Ok(())
}
