use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// A wall-clock time of day with minute resolution.
///
/// Stored as minutes since midnight; encoded as an `HHMM` integer (e.g. `0930`,
/// `2359`) in config files and project data. Ordering matches HHMM integer
/// ordering, so window comparisons read the same either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct TimeOfDay {
    minutes: u16,
}

/// Error parsing a time of day from an HHMM integer or an `HH:MM` string
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseTimeError {
    #[error("invalid time: {0}")]
    Invalid(String),
}

impl TimeOfDay {
    /// 00:00 — the default start of the working-day clock
    pub const MIDNIGHT: TimeOfDay = TimeOfDay { minutes: 0 };
    /// 23:59 — the last representable minute of a day
    pub const LAST_MINUTE: TimeOfDay = TimeOfDay { minutes: 23 * 60 + 59 };

    pub fn new(hour: u16, minute: u16) -> Result<TimeOfDay, ParseTimeError> {
        if hour > 23 || minute > 59 {
            return Err(ParseTimeError::Invalid(format!("{:02}:{:02}", hour, minute)));
        }
        Ok(TimeOfDay {
            minutes: hour * 60 + minute,
        })
    }

    /// Parse from an HHMM integer (e.g. `1730` → 17:30)
    pub fn from_hhmm(hhmm: u16) -> Result<TimeOfDay, ParseTimeError> {
        TimeOfDay::new(hhmm / 100, hhmm % 100)
    }

    /// Encode as an HHMM integer (e.g. 17:30 → `1730`)
    pub fn hhmm(self) -> u16 {
        (self.minutes / 60) * 100 + self.minutes % 60
    }

    pub fn hour(self) -> u16 {
        self.minutes / 60
    }

    pub fn minute(self) -> u16 {
        self.minutes % 60
    }

    /// Minutes since midnight
    pub fn minutes(self) -> u16 {
        self.minutes
    }

    /// Add minutes, saturating at 23:59 — used for the closing-time tolerance
    pub fn plus_minutes(self, minutes: u16) -> TimeOfDay {
        TimeOfDay {
            minutes: (self.minutes + minutes).min(Self::LAST_MINUTE.minutes),
        }
    }

    /// The time-of-day component of an instant
    pub fn from_instant(instant: DateTime<FixedOffset>) -> TimeOfDay {
        let t: NaiveTime = instant.time();
        TimeOfDay {
            minutes: (t.hour() * 60 + t.minute()) as u16,
        }
    }
}

impl TryFrom<u16> for TimeOfDay {
    type Error = ParseTimeError;

    fn try_from(hhmm: u16) -> Result<TimeOfDay, ParseTimeError> {
        TimeOfDay::from_hhmm(hhmm)
    }
}

impl From<TimeOfDay> for u16 {
    fn from(t: TimeOfDay) -> u16 {
        t.hhmm()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseTimeError;

    /// Parse `HH:MM` (CLI flags) or a bare HHMM integer (config values)
    fn from_str(s: &str) -> Result<TimeOfDay, ParseTimeError> {
        if let Some((h, m)) = s.split_once(':') {
            let hour = h
                .parse::<u16>()
                .map_err(|_| ParseTimeError::Invalid(s.to_string()))?;
            let minute = m
                .parse::<u16>()
                .map_err(|_| ParseTimeError::Invalid(s.to_string()))?;
            TimeOfDay::new(hour, minute)
        } else {
            let hhmm = s
                .parse::<u16>()
                .map_err(|_| ParseTimeError::Invalid(s.to_string()))?;
            TimeOfDay::from_hhmm(hhmm)
        }
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of the current instant.
///
/// The core operations take the instant as a plain argument so they stay pure;
/// the clock abstraction is for drivers, which resolve `now()` once per batch.
/// Calendar dates are read from the instant's own offset. Day records store an
/// offset-free `NaiveDate`, so a stored date never drifts when the local
/// offset changes.
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// The local wall clock, with its offset captured per call
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A clock pinned to one instant, for tests and deterministic drivers
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn test_hhmm_round_trip() {
        let t = TimeOfDay::from_hhmm(1730).unwrap();
        assert_eq!(t.hour(), 17);
        assert_eq!(t.minute(), 30);
        assert_eq!(t.hhmm(), 1730);
        assert_eq!(t.to_string(), "17:30");
    }

    #[test]
    fn test_rejects_invalid_times() {
        assert!(TimeOfDay::from_hhmm(2400).is_err());
        assert!(TimeOfDay::from_hhmm(1260).is_err());
        assert!(TimeOfDay::new(9, 60).is_err());
    }

    #[test]
    fn test_ordering_matches_hhmm() {
        let nine = TimeOfDay::from_hhmm(900).unwrap();
        let five_pm = TimeOfDay::from_hhmm(1700).unwrap();
        assert!(nine < five_pm);
        assert!(TimeOfDay::MIDNIGHT < nine);
        assert!(five_pm < TimeOfDay::LAST_MINUTE);
    }

    #[test]
    fn test_plus_minutes_saturates() {
        let late = TimeOfDay::from_hhmm(2350).unwrap();
        assert_eq!(late.plus_minutes(30), TimeOfDay::LAST_MINUTE);
        let t = TimeOfDay::from_hhmm(1750).unwrap();
        assert_eq!(t.plus_minutes(20).hhmm(), 1810);
    }

    #[test]
    fn test_parse_colon_and_hhmm_forms() {
        assert_eq!("09:15".parse::<TimeOfDay>().unwrap().hhmm(), 915);
        assert_eq!("2359".parse::<TimeOfDay>().unwrap(), TimeOfDay::LAST_MINUTE);
        assert!("25:00".parse::<TimeOfDay>().is_err());
        assert!("abc".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn test_from_instant() {
        let instant = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2026, 3, 2, 14, 45, 12)
            .unwrap();
        assert_eq!(TimeOfDay::from_instant(instant).hhmm(), 1445);
        assert_eq!(instant.date_naive(), NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
    }
}
