use std::fmt;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyParseError {
    #[error("rate limit policy '{0}' is empty")]
    Empty(String),

    #[error("invalid rate limit '{item}': {reason}")]
    InvalidItem { item: String, reason: String },
}

/// Longest window a policy may declare.
pub const MAX_PERIOD: Duration = Duration::from_secs(366 * 86_400);

/// `limit` requests per `period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    pub limit: u32,
    pub period: Duration,
}

impl RateWindow {
    /// Periods longer than `MAX_PERIOD` are clamped to it.
    pub fn new(limit: u32, period: Duration) -> Self {
        Self {
            limit,
            period: period.min(MAX_PERIOD),
        }
    }
}

impl fmt::Display for RateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.period.as_secs();
        let (amount, unit) = if secs >= 86_400 && secs % 86_400 == 0 {
            (secs / 86_400, "day")
        } else if secs >= 3_600 && secs % 3_600 == 0 {
            (secs / 3_600, "hour")
        } else if secs >= 60 && secs % 60 == 0 {
            (secs / 60, "minute")
        } else {
            (secs, "second")
        };
        match amount {
            1 => write!(f, "{} per {}", self.limit, unit),
            n => write!(f, "{} per {} {}s", self.limit, n, unit),
        }
    }
}

/// Named set of windows applied to one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    name: String,
    windows: Vec<RateWindow>,
}

fn unit_seconds(unit: &str) -> Option<u64> {
    match unit.to_lowercase().as_str() {
        "s" | "sec" | "second" | "seconds" => Some(1),
        "m" | "min" | "minute" | "minutes" => Some(60),
        "h" | "hr" | "hour" | "hours" => Some(3_600),
        "d" | "day" | "days" => Some(86_400),
        _ => None,
    }
}

fn parse_window(item: &str) -> Result<RateWindow, PolicyParseError> {
    let invalid = |reason: &str| PolicyParseError::InvalidItem {
        item: item.to_string(),
        reason: reason.to_string(),
    };

    let (count, period) = item
        .split_once('/')
        .or_else(|| item.split_once(" per "))
        .ok_or_else(|| invalid("expected '<count> per <unit>' or '<count>/<unit>'"))?;

    let limit: u32 = count
        .trim()
        .parse()
        .map_err(|_| invalid("count is not a number"))?;
    if limit == 0 {
        return Err(invalid("count must be greater than zero"));
    }

    let tokens: Vec<&str> = period.split_whitespace().collect();
    let (multiplier, unit) = match tokens.as_slice() {
        [unit] => (1, *unit),
        [amount, unit] => (
            amount
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| invalid("period multiplier must be a positive number"))?,
            *unit,
        ),
        _ => return Err(invalid("expected a single period unit")),
    };
    let seconds = unit_seconds(unit)
        .ok_or_else(|| invalid("unknown period unit"))?
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .filter(|period| *period <= MAX_PERIOD)
        .ok_or_else(|| invalid("period must not exceed 366 days"))?;

    Ok(RateWindow::new(limit, seconds))
}

impl RateLimitPolicy {
    pub fn new(name: impl Into<String>, windows: Vec<RateWindow>) -> Self {
        Self {
            name: name.into(),
            windows,
        }
    }

    /// Parse `"10 per hour; 1 per minute"` or `"5/hour;20/day"` style definitions.
    pub fn parse(name: impl Into<String>, definition: &str) -> Result<Self, PolicyParseError> {
        let windows = definition
            .split(';')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(parse_window)
            .collect::<Result<Vec<_>, _>>()?;

        if windows.is_empty() {
            return Err(PolicyParseError::Empty(definition.to_string()));
        }

        Ok(Self::new(name, windows))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn windows(&self) -> &[RateWindow] {
        &self.windows
    }
}

impl fmt::Display for RateLimitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let described = self
            .windows
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&described)
    }
}
