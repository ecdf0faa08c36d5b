/// Reminder interval bounds and the validated interval value handed to the
/// session controller.
///
/// Every interval the controller sees has already passed through
/// [`IntervalSetting::new`] or [`IntervalSetting::parse`]; out-of-range input
/// is rejected here, at the prompt boundary.
use thiserror::Error;

pub const MIN_INTERVAL_MINUTES: u32 = 1;
pub const DEFAULT_MAX_INTERVAL_MINUTES: u32 = 1440;
/// Hard ceiling for a configured maximum.
pub const MAX_INTERVAL_CEILING_MINUTES: u32 = 2000;
pub const DEFAULT_INTERVAL_MINUTES: u32 = 20;

const SECS_PER_MINUTE: u32 = 60;

// The longest accepted countdown must stay representable as an i32 second count.
const _: () = assert!(
    MAX_INTERVAL_CEILING_MINUTES as i64 * SECS_PER_MINUTE as i64 <= i32::MAX as i64
);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntervalError {
    #[error("{value} minutes is outside the accepted range {min}–{max}")]
    OutOfRange { value: i64, min: u32, max: u32 },
    #[error("'{0}' is not a whole number of minutes")]
    NotANumber(String),
    #[error("enter a number of minutes")]
    Empty,
}

/// Accepted range for the prompt plus the value it is pre-filled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalBounds {
    min: u32,
    max: u32,
    default: u32,
}

impl IntervalBounds {
    /// Builds a consistent range from possibly inconsistent input: `min` is
    /// raised to 1, `max` is capped at the ceiling and never below `min`, and
    /// `default` is clamped into the result.
    pub fn clamped(min: u32, max: u32, default: u32) -> Self {
        let min = min.clamp(MIN_INTERVAL_MINUTES, MAX_INTERVAL_CEILING_MINUTES);
        let max = max.clamp(min, MAX_INTERVAL_CEILING_MINUTES);
        Self {
            min,
            max,
            default: default.clamp(min, max),
        }
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn default_minutes(&self) -> u32 {
        self.default
    }

    /// Clamps an arbitrary value into the range.
    pub fn clamp(&self, value: i64) -> u32 {
        value.clamp(i64::from(self.min), i64::from(self.max)) as u32
    }
}

impl Default for IntervalBounds {
    fn default() -> Self {
        Self::clamped(
            MIN_INTERVAL_MINUTES,
            DEFAULT_MAX_INTERVAL_MINUTES,
            DEFAULT_INTERVAL_MINUTES,
        )
    }
}

/// A reminder interval in whole minutes, known to be within its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalSetting {
    minutes: u32,
}

impl IntervalSetting {
    pub fn new(value: i64, bounds: &IntervalBounds) -> Result<Self, IntervalError> {
        if value < i64::from(bounds.min) || value > i64::from(bounds.max) {
            return Err(IntervalError::OutOfRange {
                value,
                min: bounds.min,
                max: bounds.max,
            });
        }
        Ok(Self {
            minutes: value as u32,
        })
    }

    /// Parses user input such as `" 25 "`.
    pub fn parse(input: &str, bounds: &IntervalBounds) -> Result<Self, IntervalError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(IntervalError::Empty);
        }
        let value: i64 = trimmed
            .parse()
            .map_err(|_| IntervalError::NotANumber(trimmed.to_string()))?;
        Self::new(value, bounds)
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    /// Countdown length in seconds. Cannot overflow: see the ceiling assertion.
    pub fn duration_secs(&self) -> u32 {
        self.minutes * SECS_PER_MINUTE
    }
}
