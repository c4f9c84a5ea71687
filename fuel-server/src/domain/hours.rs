//! Opening-hours evaluation.
//!
//! The feed publishes schedules as free text such as `"L-D: 24H"`,
//! `"L-V: 07:00-22:00; S: 08:00-14:00"` or multi-line combinations of these.
//! There is no grammar. A schedule that cannot be understood is reported
//! as closed.

use std::sync::LazyLock;

use chrono::{NaiveTime, Timelike};
use regex::Regex;

/// First `H:MM-H:MM` / `HH:MM-HH:MM` interval in a schedule.
static INTERVAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2}):(\d{2})-(\d{1,2}):(\d{2})").expect("interval regex is valid")
});

/// A schedule reduced to what the predicate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpeningHours {
    /// The schedule mentions `24H` anywhere.
    AlwaysOpen,
    /// The first daily interval found, as minutes since midnight.
    ///
    /// `end < start` means the interval wraps past midnight.
    Interval { start: u16, end: u16 },
    /// Nothing recognisable; treated as closed.
    Unknown,
}

impl OpeningHours {
    /// Interpret a free-text schedule.
    ///
    /// Hour and minute fields are taken at face value, so `07:75` means 8:15.
    pub fn parse(text: &str) -> Self {
        if text.trim().is_empty() {
            return OpeningHours::Unknown;
        }
        if text.to_uppercase().contains("24H") {
            return OpeningHours::AlwaysOpen;
        }

        let Some(caps) = INTERVAL.captures(text) else {
            return OpeningHours::Unknown;
        };

        let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u16>().ok());
        match (field(1), field(2), field(3), field(4)) {
            (Some(sh), Some(sm), Some(eh), Some(em)) => OpeningHours::Interval {
                start: sh * 60 + sm,
                end: eh * 60 + em,
            },
            _ => OpeningHours::Unknown,
        }
    }

    /// Whether the station is open at `now` (minutes since local midnight).
    pub fn is_open_at(self, now: u16) -> bool {
        match self {
            OpeningHours::AlwaysOpen => true,
            OpeningHours::Unknown => false,
            OpeningHours::Interval { start, end } if end < start => now >= start || now < end,
            OpeningHours::Interval { start, end } => start <= now && now < end,
        }
    }
}

/// Whether a station with schedule `hours` is open at `now` (minutes since midnight).
pub fn is_open(hours: &str, now: u16) -> bool {
    OpeningHours::parse(hours).is_open_at(now)
}

/// Minutes since midnight for a wall-clock time.
pub fn minutes_of_day(time: NaiveTime) -> u16 {
    (time.hour() * 60 + time.minute()) as u16
}
