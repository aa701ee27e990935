use serde::Serialize;
use time::{util::days_in_year_month, Duration, Month, OffsetDateTime};

/// Credits granted to every new profile.
pub const SIGNUP_CREDITS: i32 = 30;

/// Length of the free trial, in calendar months.
pub const TRIAL_MONTHS: u32 = 3;

/// Adds calendar months, clamping the day to the end of the target month.
pub fn add_months(at: OffsetDateTime, months: u32) -> OffsetDateTime {
    let total = u8::from(at.month()) as i32 - 1 + months as i32;
    let year = at.year() + total.div_euclid(12);
    let month = Month::try_from((total.rem_euclid(12) + 1) as u8).unwrap_or(Month::January);
    let day = at.day().min(days_in_year_month(year, month));

    let date = time::Date::from_calendar_date(year, month, day).unwrap_or(at.date());
    at.replace_date(date)
}

pub fn trial_end_from(now: OffsetDateTime) -> OffsetDateTime {
    add_months(now, TRIAL_MONTHS)
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct TrialStatus {
    pub active: bool,
    pub days_remaining: i64,
}

impl TrialStatus {
    /// Partial days count as a whole day.
    pub fn at(trial_ends_at: Option<OffsetDateTime>, now: OffsetDateTime) -> Self {
        let Some(ends) = trial_ends_at else {
            return Self {
                active: false,
                days_remaining: 0,
            };
        };
        let left = ends - now;
        if left <= Duration::ZERO {
            return Self {
                active: false,
                days_remaining: 0,
            };
        }
        let whole = left.whole_days();
        let days_remaining = if left > Duration::days(whole) {
            whole + 1
        } else {
            whole
        };
        Self {
            active: true,
            days_remaining,
        }
    }
}
