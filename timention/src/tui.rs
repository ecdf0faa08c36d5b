/// Terminal takeover shared by the interval prompt and the overlay.
use std::io::{self, Stdout};

use anyhow::{Context, Result};
use crossterm::cursor::{Hide, Show};
use crossterm::event::KeyCode;
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::keys::Key;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Raw mode + alternate screen for as long as the value lives.
///
/// Dropping it restores the cursor, the main screen and cooked mode, so the
/// terminal comes back even when the caller bails out with `?`.
pub struct Screen {
    terminal: Tui,
}

impl Screen {
    pub fn enter() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(e).context("Failed to enter the alternate screen");
        }
        let terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(t) => t,
            Err(e) => {
                let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
                let _ = disable_raw_mode();
                return Err(e).context("Failed to initialise the terminal");
            }
        };
        Ok(Self { terminal })
    }

    pub fn terminal(&mut self) -> &mut Tui {
        &mut self.terminal
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let _ = execute!(self.terminal.backend_mut(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// Maps a crossterm key code onto the backend-independent [`Key`].
pub fn key_from_code(code: KeyCode) -> Key {
    match code {
        KeyCode::Esc => Key::Escape,
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab | KeyCode::BackTab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::F(n) => Key::Function(n),
        KeyCode::Char(c) => Key::from_char(c),
        _ => Key::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_codes() {
        assert_eq!(key_from_code(KeyCode::Esc), Key::Escape);
        assert_eq!(key_from_code(KeyCode::Enter), Key::Enter);
        assert_eq!(key_from_code(KeyCode::BackTab), Key::Tab);
        assert_eq!(key_from_code(KeyCode::Backspace), Key::Backspace);
        assert_eq!(key_from_code(KeyCode::F(10)), Key::Function(10));
    }

    #[test]
    fn chars_are_normalised() {
        assert_eq!(key_from_code(KeyCode::Char('Q')), Key::Char('q'));
        assert_eq!(key_from_code(KeyCode::Char(' ')), Key::Space);
    }

    #[test]
    fn unmapped_codes_are_other() {
        assert_eq!(key_from_code(KeyCode::Left), Key::Other);
        assert_eq!(key_from_code(KeyCode::Delete), Key::Other);
        assert_eq!(key_from_code(KeyCode::Null), Key::Other);
    }
}
