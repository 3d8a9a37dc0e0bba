//! Autotyper console
//!
//! Reads commands from stdin, listens for the global hotkey and types the
//! message list into whichever window has focus.

use std::env;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use crossbeam_channel::unbounded;
use single_instance::SingleInstance;
use tracing::{error, info, warn};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use autotyper::{
    config, console, hotkey, App, AppConfig, KeyboardFactory, KeyboardInput, Message,
    RdevKeyboard, APP_NAME,
};

fn init_logging() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_timer(ChronoLocal::new("%d.%m.%Y %H:%M:%S".to_string()))
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let instance = SingleInstance::new(APP_NAME).context("Failed to check for a running instance")?;
    if !instance.is_single() {
        println!("{} is already running.", APP_NAME);
        return Ok(());
    }

    let config = config::load_config().unwrap_or_else(|e| {
        warn!("Error loading config: {}. Using defaults.", e);
        AppConfig::default()
    });

    let key_delay_ms = config.key_delay_ms;
    let keyboard_factory: KeyboardFactory =
        Arc::new(move || Box::new(RdevKeyboard::new(key_delay_ms)) as Box<dyn KeyboardInput>);

    let hotkey = config.hotkey;
    let autoload = env::args().nth(1).map(PathBuf::from).or_else(|| config.autoload.clone());
    let mut app = App::new(config, keyboard_factory, io::stdout());

    println!("{}", console::BANNER.trim_matches('\n'));
    println!("{}", console::render_help(hotkey));

    if let Some(path) = autoload {
        if let Err(e) = app.load(&path) {
            error!("Failed to load {}: {}", path.display(), e);
        }
    }

    let (sender, receiver) = unbounded();

    let quit_sender = sender.clone();
    ctrlc::set_handler(move || {
        let _ = quit_sender.send(Message::Quit);
    })
    .context("Failed to set Ctrl-C handler")?;

    hotkey::spawn_listener(hotkey, sender.clone());
    console::spawn_reader(sender);

    info!("Auto typer ready");
    app.run(&receiver).context("Control loop failed")?;
    Ok(())
}
