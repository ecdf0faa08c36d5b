mod config;
mod controller;
mod event;
mod focus;
mod interval;
mod keys;
mod overlay;
mod paths;
mod prompt;
mod startup;
mod terminal;
mod timer;
mod tui;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::controller::{Flow, SessionController};
use crate::event::SessionEvent;
use crate::overlay::{Overlay, Reminder};
use crate::prompt::{IntervalPrompt, TerminalPrompt};
use crate::terminal::TerminalOverlay;
use crate::timer::CountdownTimer;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    log::info!("timention v{} started", env!("CARGO_PKG_VERSION"));

    // ── Configuration ─────────────────────────────────────────────────────────
    let config = match paths::config_file_path() {
        Some(path) => config::load_or_default(&path).unwrap_or_else(|e| {
            log::warn!("[config] {e:#} (using defaults)");
            config::Config::default()
        }),
        None => config::Config::default(),
    };

    if let Err(e) = startup::apply(config.launch_on_startup) {
        log::warn!("[startup] {e:#}");
    }

    // ── Session wiring ────────────────────────────────────────────────────────
    let (event_tx, event_rx) = mpsc::channel::<SessionEvent>(32);

    let overlay = Overlay::new(
        TerminalOverlay::new(event_tx.clone()),
        Reminder::from(&config.reminder),
        overlay::resolve_exit_key(&config.reminder.exit_key),
    );
    let mut session = SessionController::new(CountdownTimer::new(event_tx.clone()), overlay);

    // ── Interval prompt ───────────────────────────────────────────────────────
    let bounds = config.prompt.bounds();
    let interval =
        tokio::task::spawn_blocking(move || TerminalPrompt::default().request_interval(&bounds))
            .await
            .context("Interval prompt panicked")??;

    if session.configure(interval) == Flow::Exit {
        return Ok(());
    }

    // Graceful shutdown on Ctrl+C.
    {
        let tx = event_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = tx.send(SessionEvent::Shutdown).await;
            }
        });
    }
    drop(event_tx);

    session.run(event_rx).await
}
