/// The break overlay: a backend-agnostic presenter plus the trait real and
/// fake display backends implement.
///
/// A backend knows how to put a full-screen surface up and take it down.
/// Key presses are reported asynchronously: a backend is handed the session
/// queue when it is built and sends [`SessionEvent::KeyPressed`] tagged with
/// the cycle passed to [`OverlayBackend::present`].
///
/// [`SessionEvent::KeyPressed`]: crate::event::SessionEvent::KeyPressed
use anyhow::Result;

use crate::config::ReminderConfig;
use crate::focus::FocusError;
use crate::keys::{self, Key};

/// Text shown on the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub message: String,
    pub hint: String,
    /// Ring the terminal bell when the overlay appears.
    pub bell: bool,
}

impl From<&ReminderConfig> for Reminder {
    fn from(cfg: &ReminderConfig) -> Self {
        Self {
            message: cfg.message.clone(),
            hint: cfg.hint.clone(),
            bell: cfg.bell,
        }
    }
}

/// What a key press on the overlay means for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissalOutcome {
    /// Hide the overlay and start the next countdown.
    ContinueWork,
    /// Hide the overlay and end the program.
    ExitProgram,
}

/// Whether a freshly presented surface got keyboard focus.
#[derive(Debug, PartialEq, Eq)]
pub enum FocusStatus {
    Acquired,
    /// The surface is up but keys may not register until the user clicks it.
    Degraded(FocusError),
}

pub trait OverlayBackend {
    /// Brings the surface's window to the front ahead of [`present`]. Called
    /// while the regular screen is still showing, so problems can be logged.
    ///
    /// [`present`]: OverlayBackend::present
    fn acquire_focus(&mut self) -> FocusStatus;

    /// Shows the full-screen surface and starts reporting key presses for
    /// `cycle`.
    fn present(&mut self, reminder: &Reminder, cycle: u64) -> Result<()>;

    /// Takes the surface down and stops reporting keys.
    fn hide(&mut self) -> Result<()>;
}

/// Presenter owned by the session controller.
///
/// Tracks which cycle, if any, is on screen so that presenting twice is
/// refused and dismissing twice is harmless.
pub struct Overlay<B> {
    backend: B,
    reminder: Reminder,
    exit_key: Key,
    visible_cycle: Option<u64>,
}

impl<B: OverlayBackend> Overlay<B> {
    pub fn new(backend: B, reminder: Reminder, exit_key: Key) -> Self {
        Self {
            backend,
            reminder,
            exit_key,
            visible_cycle: None,
        }
    }

    /// Puts the overlay up for `cycle`.
    ///
    /// Fails without touching the backend if an overlay is already visible.
    pub fn present(&mut self, cycle: u64) -> Result<()> {
        if let Some(visible) = self.visible_cycle {
            anyhow::bail!("overlay for cycle {visible} is still visible");
        }
        if let FocusStatus::Degraded(e) = self.backend.acquire_focus() {
            log::warn!(
                "[overlay] Could not take keyboard focus ({e}); click the overlay before pressing a key"
            );
        }
        self.backend.present(&self.reminder, cycle)?;
        self.visible_cycle = Some(cycle);
        Ok(())
    }

    /// Maps a key press on the visible overlay to its outcome. Returns `None`
    /// when nothing is on screen.
    pub fn on_key(&self, key: Key) -> Option<DismissalOutcome> {
        self.visible_cycle?;
        Some(self.classify(key))
    }

    pub fn classify(&self, key: Key) -> DismissalOutcome {
        if key == self.exit_key {
            DismissalOutcome::ExitProgram
        } else {
            DismissalOutcome::ContinueWork
        }
    }

    /// Hides the overlay. Returns whether anything was on screen; a second
    /// call is a no-op that returns `false`.
    pub fn dismiss(&mut self) -> Result<bool> {
        if self.visible_cycle.take().is_none() {
            return Ok(false);
        }
        self.backend.hide()?;
        Ok(true)
    }

    pub fn is_visible(&self) -> bool {
        self.visible_cycle.is_some()
    }

    pub fn visible_cycle(&self) -> Option<u64> {
        self.visible_cycle
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

/// Resolves the configured exit key name, falling back to Escape.
pub fn resolve_exit_key(name: &str) -> Key {
    keys::parse_key(name).unwrap_or_else(|| {
        log::warn!(
            "[overlay] Unknown exit key '{name}', using {}",
            keys::DEFAULT_EXIT_KEY
        );
        Key::Escape
    })
}


#[cfg(test)]
mod tests {
    use super::fake::{BackendCall, FakeBackend};
    use super::*;

    fn reminder() -> Reminder {
        Reminder {
            message: "Take a break".to_string(),
            hint: "Esc quits".to_string(),
            bell: false,
        }
    }

    fn overlay() -> Overlay<FakeBackend> {
        Overlay::new(FakeBackend::default(), reminder(), Key::Escape)
    }

    // ── present ───────────────────────────────────────────────────────────────

    #[test]
    fn present_shows_surface_for_cycle() {
        let mut o = overlay();
        o.present(1).unwrap();
        assert!(o.is_visible());
        assert_eq!(o.visible_cycle(), Some(1));
        assert_eq!(
            o.backend().calls,
            vec![BackendCall::AcquireFocus, BackendCall::Present(1)]
        );
    }

    #[test]
    fn present_while_visible_is_refused() {
        let mut o = overlay();
        o.present(1).unwrap();
        assert!(o.present(2).is_err());
        assert_eq!(o.visible_cycle(), Some(1));
        assert_eq!(o.backend().presents(), 1);
    }

    #[test]
    fn degraded_focus_still_presents() {
        let mut backend = FakeBackend::default();
        backend.refuse_focus = true;
        let mut o = Overlay::new(backend, reminder(), Key::Escape);
        o.present(1).unwrap();
        assert!(o.is_visible());
        assert!(o.backend().on_screen());
        // Focus is settled before the surface takes over the screen.
        assert_eq!(
            o.backend().calls,
            vec![BackendCall::AcquireFocus, BackendCall::Present(1)]
        );
    }

    #[test]
    fn backend_failure_leaves_overlay_hidden() {
        let mut backend = FakeBackend::default();
        backend.fail_present = true;
        let mut o = Overlay::new(backend, reminder(), Key::Escape);
        assert!(o.present(1).is_err());
        assert!(!o.is_visible());
    }

    // ── on_key / classify ─────────────────────────────────────────────────────

    #[test]
    fn exit_key_means_exit() {
        let mut o = overlay();
        o.present(1).unwrap();
        assert_eq!(o.on_key(Key::Escape), Some(DismissalOutcome::ExitProgram));
    }

    #[test]
    fn any_other_key_means_continue() {
        let mut o = overlay();
        o.present(1).unwrap();
        for key in [
            Key::Enter,
            Key::Space,
            Key::Char('q'),
            Key::Function(1),
            Key::Other,
        ] {
            assert_eq!(o.on_key(key), Some(DismissalOutcome::ContinueWork), "{key:?}");
        }
    }

    #[test]
    fn custom_exit_key_is_honoured() {
        let o = Overlay::new(FakeBackend::default(), reminder(), Key::Char('q'));
        assert_eq!(o.classify(Key::Char('q')), DismissalOutcome::ExitProgram);
        assert_eq!(o.classify(Key::Escape), DismissalOutcome::ContinueWork);
    }

    #[test]
    fn keys_without_overlay_yield_nothing() {
        let o = overlay();
        assert_eq!(o.on_key(Key::Escape), None);
        assert_eq!(o.on_key(Key::Enter), None);
    }

    // ── dismiss ───────────────────────────────────────────────────────────────

    #[test]
    fn dismiss_hides_once() {
        let mut o = overlay();
        o.present(1).unwrap();
        assert!(o.dismiss().unwrap());
        assert!(!o.is_visible());
        assert!(!o.dismiss().unwrap());
        assert_eq!(
            o.backend().calls,
            vec![
                BackendCall::AcquireFocus,
                BackendCall::Present(1),
                BackendCall::Hide
            ]
        );
    }

    #[test]
    fn dismiss_before_present_is_a_no_op() {
        let mut o = overlay();
        assert!(!o.dismiss().unwrap());
        assert!(o.backend().calls.is_empty());
    }

    #[test]
    fn no_outcome_after_dismiss() {
        let mut o = overlay();
        o.present(1).unwrap();
        o.dismiss().unwrap();
        assert_eq!(o.on_key(Key::Enter), None);
    }

    // ── resolve_exit_key ──────────────────────────────────────────────────────

    #[test]
    fn resolve_exit_key_parses_names() {
        assert_eq!(resolve_exit_key("Escape"), Key::Escape);
        assert_eq!(resolve_exit_key("F10"), Key::Function(10));
    }

    #[test]
    fn resolve_exit_key_falls_back_to_escape() {
        assert_eq!(resolve_exit_key("NotAKey"), Key::Escape);
        assert_eq!(resolve_exit_key(""), Key::Escape);
    }

    #[test]
    fn reminder_from_config() {
        let cfg = ReminderConfig::default();
        let r = Reminder::from(&cfg);
        assert_eq!(r.message, cfg.message);
        assert_eq!(r.hint, cfg.hint);
        assert_eq!(r.bell, cfg.bell);
    }
}
