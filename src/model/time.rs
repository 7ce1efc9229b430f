use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

// Cultivation-world calendar: twelve 30-day months, no leap days.
pub const MINUTES_PER_HOUR: u64 = 60;
pub const HOURS_PER_DAY: u64 = 24;
pub const DAYS_PER_MONTH: u64 = 30;
pub const MONTHS_PER_YEAR: u64 = 12;

pub const MINUTES_PER_DAY: u64 = MINUTES_PER_HOUR * HOURS_PER_DAY; // 1,440
pub const MINUTES_PER_MONTH: u64 = MINUTES_PER_DAY * DAYS_PER_MONTH; // 43,200
pub const MINUTES_PER_YEAR: u64 = MINUTES_PER_MONTH * MONTHS_PER_YEAR; // 518,400

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Months 1-3 are spring, 4-6 summer, 7-9 autumn, 10-12 winter.
    pub fn from_month(month: u32) -> Self {
        match month {
            1..=3 => Season::Spring,
            4..=6 => Season::Summer,
            7..=9 => Season::Autumn,
            _ => Season::Winter,
        }
    }
}

/// In-game calendar time.
///
/// Fields are private so the invariants (`1 ≤ month ≤ 12`,
/// `1 ≤ day ≤ 30`, `hour < 24`, `minute < 60`, `year ≥ 1`) always hold.
/// The season is derived from the month and never stored independently.
///
/// Ordering and all elapsed-time arithmetic go through
/// [`GameTime::to_scalar_minutes`]; two times are never compared field by
/// field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "GameTimeRepr", try_from = "GameTimeRepr")]
pub struct GameTime {
    year: u32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
}

#[derive(Serialize, Deserialize)]
struct GameTimeRepr {
    year: u32,
    #[serde(default, skip_deserializing)]
    season: Option<Season>,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
}

impl From<GameTime> for GameTimeRepr {
    fn from(t: GameTime) -> Self {
        GameTimeRepr {
            year: t.year,
            season: Some(t.season()),
            month: t.month,
            day: t.day,
            hour: t.hour,
            minute: t.minute,
        }
    }
}

impl TryFrom<GameTimeRepr> for GameTime {
    type Error = String;

    fn try_from(r: GameTimeRepr) -> Result<Self, Self::Error> {
        GameTime::checked(r.year, r.month, r.day, r.hour, r.minute)
    }
}

impl GameTime {
    /// Create a time from calendar fields.
    ///
    /// # Panics
    /// Panics if any field is out of range.
    pub fn new(year: u32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        Self::checked(year, month, day, hour, minute).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Validating constructor used by deserialization.
    pub fn checked(year: u32, month: u32, day: u32, hour: u32, minute: u32) -> Result<Self, String> {
        if year < 1 {
            return Err(format!("year out of range: {year}"));
        }
        if !(1..=MONTHS_PER_YEAR as u32).contains(&month) {
            return Err(format!("month out of range: {month}"));
        }
        if !(1..=DAYS_PER_MONTH as u32).contains(&day) {
            return Err(format!("day out of range: {day}"));
        }
        if hour >= HOURS_PER_DAY as u32 {
            return Err(format!("hour out of range: {hour}"));
        }
        if minute >= MINUTES_PER_HOUR as u32 {
            return Err(format!("minute out of range: {minute}"));
        }
        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
        })
    }

    /// First minute of a year.
    pub fn start_of_year(year: u32) -> Self {
        Self::new(year, 1, 1, 0, 0)
    }

    pub fn year(self) -> u32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn day(self) -> u32 {
        self.day
    }

    pub fn hour(self) -> u32 {
        self.hour
    }

    pub fn minute(self) -> u32 {
        self.minute
    }

    pub fn season(self) -> Season {
        Season::from_month(self.month)
    }

    /// Canonical scalar projection: minutes since Y1 M1 D1 00:00.
    pub fn to_scalar_minutes(self) -> u64 {
        (((self.year as u64 - 1) * MONTHS_PER_YEAR + (self.month as u64 - 1)) * DAYS_PER_MONTH
            + (self.day as u64 - 1))
            * MINUTES_PER_DAY
            + self.hour as u64 * MINUTES_PER_HOUR
            + self.minute as u64
    }

    /// Inverse of [`GameTime::to_scalar_minutes`].
    pub fn from_scalar_minutes(total: u64) -> Self {
        let minute = total % MINUTES_PER_HOUR;
        let hours = total / MINUTES_PER_HOUR;
        let hour = hours % HOURS_PER_DAY;
        let days = hours / HOURS_PER_DAY;
        let day = days % DAYS_PER_MONTH;
        let months = days / DAYS_PER_MONTH;
        let month = months % MONTHS_PER_YEAR;
        let year = months / MONTHS_PER_YEAR;
        Self {
            year: year as u32 + 1,
            month: month as u32 + 1,
            day: day as u32 + 1,
            hour: hour as u32,
            minute: minute as u32,
        }
    }

    /// Advance by `minutes`, carrying into hour, day, month and year.
    /// Non-positive deltas leave the time unchanged.
    pub fn advance(self, minutes: i64) -> Self {
        if minutes <= 0 {
            return self;
        }
        Self::from_scalar_minutes(self.to_scalar_minutes() + minutes as u64)
    }

    /// Advance by whole months.
    pub fn advance_months(self, months: u32) -> Self {
        self.advance((months as u64 * MINUTES_PER_MONTH) as i64)
    }

    /// Minutes from `self` until `later` (zero if `later` is not after `self`).
    pub fn minutes_until(self, later: GameTime) -> u64 {
        later
            .to_scalar_minutes()
            .saturating_sub(self.to_scalar_minutes())
    }
}

impl Ord for GameTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_scalar_minutes().cmp(&other.to_scalar_minutes())
    }
}

impl PartialOrd for GameTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Default for GameTime {
    fn default() -> Self {
        Self::start_of_year(1)
    }
}

impl fmt::Display for GameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Y{} M{} D{} {:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute
        )
    }
}

/// Whole and fractional months covered by `minutes`.
pub fn minutes_to_months(minutes: u64) -> f64 {
    minutes as f64 / MINUTES_PER_MONTH as f64
}

/// Minutes in `months` whole months.
pub fn months_to_minutes(months: u32) -> u64 {
    months as u64 * MINUTES_PER_MONTH
}
