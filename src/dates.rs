//! Date ranges for provider queries.

use chrono::{Days, Local, NaiveDate};

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `day..day`.
    ///
    /// Daily sleep is filed under the day the sleep period ended, so
    /// `single_day(today)` selects the most recently completed night.
    pub fn single_day(day: NaiveDate) -> Self {
        Self::new(day, day)
    }

    /// `day..day+1`, for collections where the provider treats `end_date`
    /// as exclusive (daily activity).
    pub fn day_and_next(day: NaiveDate) -> Self {
        Self::new(day, day.checked_add_days(Days::new(1)).unwrap_or(day))
    }

    pub fn start_param(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_param(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

/// Today's date in the local timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}
