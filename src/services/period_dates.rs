use chrono::{Days, NaiveDate};
use thiserror::Error;

pub const DEFAULT_PERIOD_DAYS: u32 = 7;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PeriodDateError {
    #[error("invalid start date: {0} (expected YYYY-MM-DD)")]
    InvalidStartDate(String),
    #[error("period length must be at least one day")]
    InvalidPeriodLength,
}

/// Maps simulated periods onto the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodCalendar {
    start: NaiveDate,
    period_days: u32,
}

impl PeriodCalendar {
    pub fn new(start: NaiveDate, period_days: u32) -> Result<Self, PeriodDateError> {
        if period_days == 0 {
            return Err(PeriodDateError::InvalidPeriodLength);
        }
        Ok(Self { start, period_days })
    }

    pub fn parse(start: &str, period_days: u32) -> Result<Self, PeriodDateError> {
        let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
            .map_err(|_| PeriodDateError::InvalidStartDate(start.to_string()))?;
        Self::new(start, period_days)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn period_days(&self) -> u32 {
        self.period_days
    }

    /// Last day of the period in which work finishes. A partially used
    /// period counts in full. Returns `None` for negative or non-finite
    /// input and for dates past the calendar's range.
    pub fn date_after(&self, periods: f64) -> Option<NaiveDate> {
        if !periods.is_finite() || periods < 0.0 {
            return None;
        }
        let whole_periods = periods.ceil() as u64;
        let days = whole_periods.checked_mul(u64::from(self.period_days))?;
        self.start.checked_add_days(Days::new(days))
    }

    pub fn format_date_after(&self, periods: f64) -> Option<String> {
        self.date_after(periods)
            .map(|date| date.format("%Y-%m-%d").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::on_date;

    #[test]
    fn rounds_partial_periods_up() {
        let calendar = PeriodCalendar::new(on_date(2026, 1, 5), 7).unwrap();

        assert_eq!(calendar.date_after(0.0), Some(on_date(2026, 1, 5)));
        assert_eq!(calendar.date_after(1.0), Some(on_date(2026, 1, 12)));
        assert_eq!(calendar.date_after(1.2), Some(on_date(2026, 1, 19)));
        assert_eq!(calendar.date_after(10.0), Some(on_date(2026, 3, 16)));
    }

    #[test]
    fn daily_periods_advance_one_day_each() {
        let calendar = PeriodCalendar::parse("2026-02-27", 1).unwrap();
        assert_eq!(calendar.format_date_after(2.0), Some("2026-03-01".to_string()));
    }

    #[test]
    fn rejects_invalid_input() {
        assert_eq!(
            PeriodCalendar::parse("27.02.2026", 7),
            Err(PeriodDateError::InvalidStartDate("27.02.2026".to_string()))
        );
        assert_eq!(
            PeriodCalendar::new(on_date(2026, 1, 1), 0),
            Err(PeriodDateError::InvalidPeriodLength)
        );

        let calendar = PeriodCalendar::new(on_date(2026, 1, 1), 7).unwrap();
        assert_eq!(calendar.date_after(-1.0), None);
        assert_eq!(calendar.date_after(f64::NAN), None);
        assert_eq!(calendar.date_after(f64::MAX), None);
    }
}
