//! Recurrence frequency of a feedback cycle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{Timestamp, ValidationError};

/// How often a feedback cycle opens a new occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    /// End of a window opened at `start`.
    ///
    /// Week-based frequencies add a fixed number of days. Month-based ones
    /// are calendar-aware and clamp the day of month, so a monthly window
    /// opened on Jan 31 closes on the last day of February.
    pub fn interval_end(&self, start: Timestamp) -> Timestamp {
        match self {
            Frequency::Weekly => start.add_days(7),
            Frequency::Biweekly => start.add_days(14),
            Frequency::Monthly => start.add_calendar_months(1),
            Frequency::Quarterly => start.add_calendar_months(3),
            Frequency::Yearly => start.add_calendar_months(12),
        }
    }

    /// Returns the storage representation of the frequency.
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Yearly => "yearly",
        }
    }

    pub fn all() -> [Frequency; 5] {
        [
            Frequency::Weekly,
            Frequency::Biweekly,
            Frequency::Monthly,
            Frequency::Quarterly,
            Frequency::Yearly,
        ]
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Frequency::all()
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ValidationError::invalid_format("frequency", format!("unknown frequency '{}'", s))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap())
    }

    #[test]
    fn weekly_and_biweekly_add_fixed_days() {
        assert_eq!(Frequency::Weekly.interval_end(at(2025, 2, 25)), at(2025, 3, 4));
        assert_eq!(Frequency::Biweekly.interval_end(at(2025, 12, 25)), at(2026, 1, 8));
    }

    #[test]
    fn monthly_clamps_to_end_of_february() {
        assert_eq!(Frequency::Monthly.interval_end(at(2025, 1, 31)), at(2025, 2, 28));
        assert_eq!(Frequency::Monthly.interval_end(at(2024, 1, 31)), at(2024, 2, 29));
    }

    #[test]
    fn monthly_clamps_to_thirty_day_month() {
        assert_eq!(Frequency::Monthly.interval_end(at(2025, 3, 31)), at(2025, 4, 30));
    }

    #[test]
    fn quarterly_adds_three_calendar_months() {
        assert_eq!(Frequency::Quarterly.interval_end(at(2025, 11, 30)), at(2026, 2, 28));
    }

    #[test]
    fn yearly_handles_leap_day() {
        assert_eq!(Frequency::Yearly.interval_end(at(2024, 2, 29)), at(2025, 2, 28));
        assert_eq!(Frequency::Yearly.interval_end(at(2025, 6, 1)), at(2026, 6, 1));
    }

    #[test]
    fn time_of_day_is_preserved() {
        let end = Frequency::Monthly.interval_end(at(2025, 5, 15));
        assert_eq!(end, at(2025, 6, 15));
    }

    #[test]
    fn window_end_is_always_after_start() {
        let start = at(2025, 1, 1);
        for frequency in Frequency::all() {
            assert!(frequency.interval_end(start).is_after(&start), "{}", frequency);
        }
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Quarterly".parse::<Frequency>().unwrap(), Frequency::Quarterly);
        assert!("fortnightly".parse::<Frequency>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Frequency::Biweekly).unwrap(), "\"biweekly\"");
    }
}
