use time::Date;

use crate::error::ConfigError;

/// True iff `start <= date <= end`.
pub fn admit(date: Date, start: Date, end: Date) -> bool {
    start <= date && date <= end
}

/// Closed calendar interval used to admit divisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::ReversedDates {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.end
    }

    pub fn admits(&self, date: Date) -> bool {
        admit(date, self.start, self.end)
    }
}
