/// Backend-independent key identities and parsing of key names from config.
///
/// Overlay backends translate their native key events into [`Key`]; the
/// overlay only ever compares [`Key`] values against the configured exit key.

pub const DEFAULT_EXIT_KEY: &str = "Escape";

/// A pressed key, reduced to what dismissal classification needs.
///
/// Letters are stored lowercase so that `"Q"` in the config matches both
/// `q` and `Q` on the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Space,
    Tab,
    Backspace,
    /// `F1`–`F24`.
    Function(u8),
    Char(char),
    /// Anything else (arrows, modifiers reported as keys, media keys, …).
    Other,
}

impl Key {
    /// Builds a [`Key::Char`], normalising letters to lowercase and mapping
    /// the space character to [`Key::Space`].
    pub fn from_char(c: char) -> Self {
        match c {
            ' ' => Key::Space,
            c => Key::Char(c.to_ascii_lowercase()),
        }
    }
}

/// Converts a key name (e.g. `"Escape"`, `"F10"`, `"q"`) to a [`Key`].
///
/// Supported names (case-insensitive):
/// - `Escape`/`Esc`, `Enter`/`Return`, `Space`, `Tab`, `Backspace`.
/// - Function keys `F1`–`F24`.
/// - Any single printable, non-whitespace character.
///
/// Returns `None` for anything else.
pub fn parse_key(name: &str) -> Option<Key> {
    let upper = name.trim().to_uppercase();
    match upper.as_str() {
        "ESCAPE" | "ESC" => Some(Key::Escape),
        "ENTER" | "RETURN" => Some(Key::Enter),
        "SPACE" => Some(Key::Space),
        "TAB" => Some(Key::Tab),
        "BACKSPACE" => Some(Key::Backspace),
        s if s.len() > 1 && s.starts_with('F') => match s[1..].parse::<u8>() {
            Ok(n @ 1..=24) => Some(Key::Function(n)),
            _ => None,
        },
        _ => {
            let mut chars = name.trim().chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if !c.is_whitespace() && !c.is_control() => Some(Key::from_char(c)),
                _ => None,
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
