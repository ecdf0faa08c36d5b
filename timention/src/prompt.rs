/// Startup prompt that asks for the reminder interval.
///
/// The prompt is the only place user input becomes an [`IntervalSetting`]:
/// out-of-range or malformed input is reported inline and the prompt stays
/// open, so the session controller only ever sees validated values.
/// Cancelling returns `Ok(None)`, which ends the program normally.
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use ratatui::Frame;

use crate::interval::{IntervalBounds, IntervalError, IntervalSetting};
use crate::tui::Screen;

/// Longest number the input field accepts; the ceiling has four digits.
const MAX_DIGITS: usize = 5;
const PAGE_STEP: i64 = 10;

const ACCENT: Color = Color::Rgb(0x89, 0xb4, 0xfa);
const FOREGROUND: Color = Color::Rgb(0xcd, 0xd6, 0xf4);
const SUBTLE: Color = Color::Rgb(0xa6, 0xad, 0xc8);
const ERROR: Color = Color::Rgb(0xf3, 0x8b, 0xa8);

pub trait IntervalPrompt {
    /// Blocks until the user accepts an interval within `bounds` or cancels.
    fn request_interval(&mut self, bounds: &IntervalBounds) -> Result<Option<IntervalSetting>>;
}

#[derive(Debug, PartialEq, Eq)]
pub enum PromptAction {
    Continue,
    Submit(IntervalSetting),
    Cancel,
}

/// Editing state of the minutes field: a spin box that also accepts typing.
#[derive(Debug)]
pub struct IntervalInput {
    bounds: IntervalBounds,
    text: String,
    /// Still showing the pre-filled default; the first typed digit replaces it.
    pristine: bool,
    error: Option<IntervalError>,
}

impl IntervalInput {
    pub fn new(bounds: IntervalBounds) -> Self {
        Self {
            bounds,
            text: bounds.default_minutes().to_string(),
            pristine: true,
            error: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn error(&self) -> Option<&IntervalError> {
        self.error.as_ref()
    }

    pub fn bounds(&self) -> &IntervalBounds {
        &self.bounds
    }

    /// Adds `delta` to the current value, clamped to the bounds. An empty or
    /// unparsable field steps from the default.
    pub fn step(&mut self, delta: i64) {
        let current = self
            .text
            .parse::<i64>()
            .unwrap_or_else(|_| i64::from(self.bounds.default_minutes()));
        self.text = self.bounds.clamp(current.saturating_add(delta)).to_string();
        self.pristine = false;
        self.error = None;
    }

    pub fn push_digit(&mut self, c: char) {
        if !c.is_ascii_digit() {
            return;
        }
        if self.pristine {
            self.text.clear();
            self.pristine = false;
        }
        if self.text.len() < MAX_DIGITS {
            self.text.push(c);
        }
        self.error = None;
    }

    pub fn backspace(&mut self) {
        self.text.pop();
        self.pristine = false;
        self.error = None;
    }

    /// Validates the field. On failure the error is kept for display.
    pub fn submit(&mut self) -> Option<IntervalSetting> {
        match IntervalSetting::parse(&self.text, &self.bounds) {
            Ok(setting) => Some(setting),
            Err(e) => {
                self.error = Some(e);
                None
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PromptAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return PromptAction::Cancel;
        }
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return PromptAction::Cancel,
            KeyCode::Enter => {
                if let Some(setting) = self.submit() {
                    return PromptAction::Submit(setting);
                }
            }
            KeyCode::Up | KeyCode::Char('+') | KeyCode::Char('k') => self.step(1),
            KeyCode::Down | KeyCode::Char('-') | KeyCode::Char('j') => self.step(-1),
            KeyCode::PageUp => self.step(PAGE_STEP),
            KeyCode::PageDown => self.step(-PAGE_STEP),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Char(c) => self.push_digit(c),
            _ => {}
        }
        PromptAction::Continue
    }
}

/// Interactive prompt drawn on the terminal's alternate screen.
#[derive(Default)]
pub struct TerminalPrompt;

impl IntervalPrompt for TerminalPrompt {
    fn request_interval(&mut self, bounds: &IntervalBounds) -> Result<Option<IntervalSetting>> {
        let mut screen = Screen::enter()?;
        let mut input = IntervalInput::new(*bounds);
        loop {
            screen.terminal().draw(|frame| draw_prompt(frame, &input))?;
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match input.handle_key(key) {
                PromptAction::Continue => {}
                PromptAction::Submit(setting) => return Ok(Some(setting)),
                PromptAction::Cancel => return Ok(None),
            }
        }
    }
}

/// Centres a `width` × `height` box inside `area`, shrinking it to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

pub fn draw_prompt(frame: &mut Frame, input: &IntervalInput) {
    let area = centered(frame.area(), 52, 11);
    let block = Block::default()
        .title(" Timention ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [description, _, value, range, _, error, help] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let centered_line = |text: String, style: Style| {
        Paragraph::new(Line::from(text))
            .alignment(Alignment::Center)
            .style(style)
    };

    frame.render_widget(
        centered_line(
            "Remind me to take a break every".to_string(),
            Style::default().fg(FOREGROUND),
        ),
        description,
    );
    frame.render_widget(
        centered_line(
            format!("▲ {} ▼  minutes", input.text()),
            Style::default().fg(FOREGROUND).add_modifier(Modifier::BOLD),
        ),
        value,
    );
    let bounds = input.bounds();
    frame.render_widget(
        centered_line(
            format!("{}–{}", bounds.min(), bounds.max()),
            Style::default().fg(SUBTLE),
        ),
        range,
    );
    if let Some(e) = input.error() {
        frame.render_widget(centered_line(e.to_string(), Style::default().fg(ERROR)), error);
    }
    frame.render_widget(
        centered_line(
            "↑/↓ adjust · type digits · Enter start · Esc quit".to_string(),
            Style::default().fg(SUBTLE),
        ),
        help,
    );
}
