/// Full-screen terminal overlay backend.
///
/// Focus is requested through [`focus::raise`] before anything is drawn.
/// Presenting then takes over the terminal (alternate screen, raw mode) and
/// starts a dedicated input thread. That thread polls crossterm for key
/// events and forwards the first key press to the session queue as
/// [`SessionEvent::KeyPressed`]; it also redraws on resize, and reports a
/// broken input stream as [`SessionEvent::InputFailed`]. Hiding stops and
/// joins the thread before giving the terminal back, so no input thread
/// outlives its overlay.
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::layout::{Alignment, Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Paragraph, Wrap};
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::event::SessionEvent;
use crate::focus;
use crate::overlay::{FocusStatus, OverlayBackend, Reminder};
use crate::tui::{key_from_code, Screen};

/// How long the input thread blocks in `poll` before re-checking its stop flag.
const KEY_POLL_INTERVAL: Duration = Duration::from_millis(100);

const BACKGROUND: Color = Color::Rgb(0x1e, 0x1e, 0x2e);
const FOREGROUND: Color = Color::Rgb(0xcd, 0xd6, 0xf4);
const SUBTLE: Color = Color::Rgb(0xa6, 0xad, 0xc8);

struct ActiveOverlay {
    screen: Arc<Mutex<Screen>>,
    stop: Arc<AtomicBool>,
    reader: JoinHandle<()>,
}

pub struct TerminalOverlay {
    tx: mpsc::Sender<SessionEvent>,
    active: Option<ActiveOverlay>,
}

impl TerminalOverlay {
    pub fn new(tx: mpsc::Sender<SessionEvent>) -> Self {
        Self { tx, active: None }
    }
}

impl OverlayBackend for TerminalOverlay {
    fn acquire_focus(&mut self) -> FocusStatus {
        match focus::raise() {
            Ok(()) => FocusStatus::Acquired,
            Err(e) => FocusStatus::Degraded(e),
        }
    }

    fn present(&mut self, reminder: &Reminder, cycle: u64) -> Result<()> {
        if self.active.is_some() {
            anyhow::bail!("terminal overlay is already showing");
        }

        let screen = match take_over_screen(reminder) {
            Ok(s) => s,
            Err(e) => {
                focus::release();
                return Err(e);
            }
        };

        let screen = Arc::new(Mutex::new(screen));
        let stop = Arc::new(AtomicBool::new(false));
        let reader = {
            let tx = self.tx.clone();
            let screen = Arc::clone(&screen);
            let stop = Arc::clone(&stop);
            let reminder = reminder.clone();
            std::thread::Builder::new()
                .name("overlay-keys".into())
                .spawn(move || {
                    let redraw = || {
                        if let Ok(mut screen) = screen.lock() {
                            let _ = screen
                                .terminal()
                                .draw(|frame| draw_reminder(frame, &reminder));
                        }
                    };
                    read_keys(cycle, &tx, &stop, next_terminal_event, redraw);
                })
        };
        let reader = match reader {
            Ok(handle) => handle,
            Err(e) => {
                drop(screen);
                focus::release();
                return Err(e).context("Failed to spawn overlay input thread");
            }
        };

        self.active = Some(ActiveOverlay {
            screen,
            stop,
            reader,
        });
        Ok(())
    }

    fn hide(&mut self) -> Result<()> {
        let Some(active) = self.active.take() else {
            return Ok(());
        };
        active.stop.store(true, Ordering::Relaxed);
        if active.reader.join().is_err() {
            log::warn!("[overlay] Input thread panicked");
        }
        // Last reference: dropping it restores the terminal.
        drop(active.screen);
        focus::release();
        Ok(())
    }
}

impl Drop for TerminalOverlay {
    fn drop(&mut self) {
        let _ = self.hide();
    }
}

/// Enters the alternate screen, draws the reminder and discards any input
/// typed before it appeared.
fn take_over_screen(reminder: &Reminder) -> Result<Screen> {
    let mut screen = Screen::enter()?;
    screen
        .terminal()
        .draw(|frame| draw_reminder(frame, reminder))
        .context("Failed to draw the reminder")?;

    while event::poll(Duration::ZERO)? {
        let _ = event::read()?;
    }

    if reminder.bell {
        let mut stdout = io::stdout();
        let _ = stdout.write_all(b"\x07").and_then(|()| stdout.flush());
    }
    Ok(screen)
}

/// Waits up to `timeout` for the next terminal event.
fn next_terminal_event(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        event::read().map(Some)
    } else {
        Ok(None)
    }
}

/// Input loop for one presented overlay.
///
/// Forwards the first key press as [`SessionEvent::KeyPressed`] and returns.
/// Also returns once `stop` is set. If the terminal stops delivering events
/// the overlay could never be dismissed, so the failure is reported as
/// [`SessionEvent::InputFailed`] instead of being dropped.
fn read_keys(
    cycle: u64,
    tx: &mpsc::Sender<SessionEvent>,
    stop: &AtomicBool,
    mut next_event: impl FnMut(Duration) -> io::Result<Option<Event>>,
    mut redraw: impl FnMut(),
) {
    while !stop.load(Ordering::Relaxed) {
        match next_event(KEY_POLL_INTERVAL) {
            Ok(None) => {}
            Ok(Some(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                let key = key_from_code(key.code);
                // The controller may already be gone during shutdown.
                let _ = tx.blocking_send(SessionEvent::KeyPressed { cycle, key });
                return;
            }
            Ok(Some(Event::Resize(..))) => redraw(),
            Ok(Some(_)) => {}
            Err(e) => {
                log::error!("[overlay] Terminal input failed: {e}");
                let reason = e.to_string();
                let _ = tx.blocking_send(SessionEvent::InputFailed { cycle, reason });
                return;
            }
        }
    }
}

/// Renders the reminder centred on a solid background covering the whole frame.
pub fn draw_reminder(frame: &mut Frame, reminder: &Reminder) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(BACKGROUND)), area);

    let [_, message_area, _, hint_area, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Fill(1),
    ])
    .areas(area);

    let message = Paragraph::new(reminder.message.as_str())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(
            Style::default()
                .fg(FOREGROUND)
                .bg(BACKGROUND)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(message, message_area);

    let hint = Paragraph::new(reminder.hint.as_str())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(SUBTLE).bg(BACKGROUND));
    frame.render_widget(hint, hint_area);
}
