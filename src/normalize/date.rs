//! Module for handling date parsing.
//!
//! Birth and hire dates arrive as month/day/year text in one of several
//! layouts. Each layout is a matcher keyed on its separator; the first
//! matcher whose separator occurs in the value decides how the value is
//! read, and later matchers are not consulted.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use smallvec::{SmallVec, smallvec};

/// An accepted layout for birth and hire dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `mm/dd/yy` or `mm/dd/yyyy`
    SlashMonthDayYear,
    /// `mm-dd-yy` or `mm-dd-yyyy`
    DashMonthDayYear,
}

/// Outcome of trying one [`DateFormat`] against a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatAttempt {
    /// The layout applies and produced a calendar date
    Matched(NaiveDate),
    /// The layout's separator does not occur in the value
    NoMatch,
    /// The layout applies but the value is not a valid date
    Malformed,
}

impl DateFormat {
    /// Separator character that selects this layout
    #[must_use]
    pub fn separator(self) -> char {
        match self {
            Self::SlashMonthDayYear => '/',
            Self::DashMonthDayYear => '-',
        }
    }

    /// Human-readable pattern
    #[must_use]
    pub fn pattern(self) -> &'static str {
        match self {
            Self::SlashMonthDayYear => "mm/dd/yy",
            Self::DashMonthDayYear => "mm-dd-yy",
        }
    }

    /// Try this layout against a trimmed value
    #[must_use]
    pub fn attempt(self, value: &str, two_digit_year_pivot: u32) -> FormatAttempt {
        let sep = self.separator();
        if !value.contains(sep) {
            return FormatAttempt::NoMatch;
        }

        let parts: SmallVec<[&str; 3]> = value.split(sep).map(str::trim).collect();
        let [month, day, year] = parts.as_slice() else {
            return FormatAttempt::Malformed;
        };

        let parsed = parse_component(month, 2)
            .zip(parse_component(day, 2))
            .zip(parse_year(year, two_digit_year_pivot));

        match parsed {
            Some(((month, day), year)) => NaiveDate::from_ymd_opt(year, month, day)
                .map_or(FormatAttempt::Malformed, FormatAttempt::Matched),
            None => FormatAttempt::Malformed,
        }
    }
}

/// Date layout configuration for birth and hire dates
#[derive(Debug, Clone)]
pub struct DateFormatConfig {
    /// Layouts in the order they are tried
    pub formats: SmallVec<[DateFormat; 4]>,
    /// Two-digit years below the pivot are read as 20yy, others as 19yy
    pub two_digit_year_pivot: u32,
}

impl Default for DateFormatConfig {
    fn default() -> Self {
        Self {
            formats: smallvec![DateFormat::SlashMonthDayYear, DateFormat::DashMonthDayYear],
            two_digit_year_pivot: 70,
        }
    }
}

/// Parse a birth or hire date against the configured layouts
#[must_use]
pub fn parse_calendar_date(value: &str, config: &DateFormatConfig) -> FormatAttempt {
    let value = value.trim();
    config
        .formats
        .iter()
        .map(|format| format.attempt(value, config.two_digit_year_pivot))
        .find(|attempt| *attempt != FormatAttempt::NoMatch)
        .unwrap_or(FormatAttempt::NoMatch)
}

/// Expand a two-digit year around the pivot
#[must_use]
pub fn expand_two_digit_year(yy: u32, pivot: u32) -> i32 {
    let yy = i32::try_from(yy % 100).unwrap_or_default();
    if yy < i32::try_from(pivot).unwrap_or(i32::MAX) {
        2000 + yy
    } else {
        1900 + yy
    }
}

fn parse_component(s: &str, max_len: usize) -> Option<u32> {
    if s.is_empty() || s.len() > max_len || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn parse_year(s: &str, pivot: u32) -> Option<i32> {
    match s.len() {
        2 => parse_component(s, 2).map(|yy| expand_two_digit_year(yy, pivot)),
        4 => parse_component(s, 4).and_then(|y| i32::try_from(y).ok()),
        _ => None,
    }
}

/// Parse a termination timestamp.
///
/// Accepts `YYYY-MM-DD HH:MM:SS` optionally followed by a zone token such as
/// `UTC`, the same with a `T` between date and time, or a bare `YYYY-MM-DD`
/// read as midnight. Returns `None` when the value fits none of these.
#[must_use]
pub fn parse_term_timestamp(value: &str) -> Option<NaiveDateTime> {
    let tokens: SmallVec<[&str; 3]> = value.split_whitespace().collect();
    match tokens.as_slice() {
        [stamp] => parse_stamp(stamp),
        [stamp, zone] if is_zone_token(zone) => parse_stamp(stamp),
        [date, time] => parse_date_time(date, time),
        [date, time, zone] if is_zone_token(zone) => parse_date_time(date, time),
        _ => None,
    }
}

fn parse_stamp(stamp: &str) -> Option<NaiveDateTime> {
    if let Some((date, time)) = stamp.split_once('T') {
        return parse_date_time(date, strip_offset(time));
    }
    NaiveDate::parse_from_str(stamp, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

fn parse_date_time(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(time, "%H:%M:%S%.f").ok()?;
    Some(date.and_time(time))
}

/// Drop a trailing `Z` or `+hh:mm` / `-hh:mm` offset from a time of day
fn strip_offset(time: &str) -> &str {
    if let Some(local) = time.strip_suffix(['Z', 'z']) {
        return local;
    }
    time.find(['+', '-']).map_or(time, |idx| &time[..idx])
}

fn is_zone_token(token: &str) -> bool {
    token.chars().all(|c| c.is_ascii_alphabetic())
        || (token.starts_with(|c| c == '+' || c == '-')
            && token[1..].chars().all(|c| c.is_ascii_digit() || c == ':'))
}
