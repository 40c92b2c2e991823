//! Acquisition dates and day numbers.
//!
//! Dates enter the crate as ISO `YYYY-MM-DD` strings. They are kept as
//! [`NaiveDate`] in a [`DateAxis`], which enforces strictly increasing order,
//! and are converted to day numbers (days since a fixed epoch) for the
//! harmonic model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default day-number origin used by the harmonic model.
pub const DEFAULT_EPOCH: &str = "2015-01-01";

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| Error::InvalidDate {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Number of days between `epoch` and `date` (negative before the epoch).
#[inline]
pub fn day_number(date: NaiveDate, epoch: NaiveDate) -> i64 {
    (date - epoch).num_days()
}

/// Ordered sequence of acquisition dates.
///
/// The position of a date in the axis is its date index, the unit in which
/// detection dates and first-detection indices are expressed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateAxis {
    dates: Vec<NaiveDate>,
}

impl DateAxis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from ISO strings, which must be strictly increasing.
    pub fn from_iso<S: AsRef<str>>(values: &[S]) -> Result<Self> {
        let mut axis = Self::new();
        for value in values {
            axis.push(parse_date(value.as_ref())?)?;
        }
        Ok(axis)
    }

    /// Append a date; it must come strictly after the last one.
    pub fn push(&mut self, date: NaiveDate) -> Result<()> {
        if let Some(&last) = self.dates.last() {
            if date <= last {
                return Err(Error::DateOrder {
                    previous: format_date(last),
                    next: format_date(date),
                });
            }
        }
        self.dates.push(date);
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<NaiveDate> {
        self.dates.get(index).copied()
    }

    #[inline]
    pub fn last(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn as_slice(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Number of dates strictly before `date`.
    pub fn count_before(&self, date: NaiveDate) -> usize {
        self.dates.partition_point(|&d| d < date)
    }

    /// Number of dates on or before `date`.
    pub fn count_until(&self, date: NaiveDate) -> usize {
        self.dates.partition_point(|&d| d <= date)
    }

    /// Whether every date on or before `date` is already known, i.e. the axis
    /// extends at least to `date`. Since dates only grow, nothing appended
    /// later can fall on or before it.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.last().is_some_and(|last| last >= date)
    }

    /// Whether `self` is a prefix of `other`.
    pub fn is_prefix_of(&self, other: &DateAxis) -> bool {
        self.len() <= other.len() && other.dates[..self.len()] == self.dates[..]
    }

    /// The first `n` dates.
    pub fn prefix(&self, n: usize) -> DateAxis {
        DateAxis {
            dates: self.dates[..n.min(self.len())].to_vec(),
        }
    }

    /// Day numbers of every date relative to `epoch`, as model abscissae.
    pub fn day_numbers(&self, epoch: NaiveDate) -> Vec<f64> {
        self.dates
            .iter()
            .map(|&d| day_number(d, epoch) as f64)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(d("2018-03-14"), NaiveDate::from_ymd_opt(2018, 3, 14).unwrap());
        assert!(parse_date("2018-13-01").is_err());
        assert!(parse_date("14/03/2018").is_err());
    }

    #[test]
    fn test_day_number() {
        let epoch = d(DEFAULT_EPOCH);
        assert_eq!(day_number(d("2015-01-01"), epoch), 0);
        assert_eq!(day_number(d("2016-01-01"), epoch), 365);
        assert_eq!(day_number(d("2014-12-31"), epoch), -1);
    }

    #[test]
    fn test_axis_rejects_unordered_and_duplicate_dates() {
        let mut axis = DateAxis::from_iso(&["2018-01-01", "2018-01-06"]).unwrap();
        assert!(matches!(
            axis.push(d("2018-01-06")),
            Err(Error::DateOrder { .. })
        ));
        assert!(axis.push(d("2018-01-03")).is_err());
        assert_eq!(axis.len(), 2);
    }

    #[test]
    fn test_counts_and_coverage() {
        let axis =
            DateAxis::from_iso(&["2018-01-01", "2018-02-01", "2018-03-01", "2018-04-01"]).unwrap();
        assert_eq!(axis.count_before(d("2018-03-01")), 2);
        assert_eq!(axis.count_until(d("2018-03-01")), 3);
        assert_eq!(axis.count_before(d("2017-01-01")), 0);
        assert_eq!(axis.count_until(d("2019-01-01")), 4);
        assert!(axis.covers(d("2018-04-01")));
        assert!(!axis.covers(d("2018-04-02")));
        assert!(!DateAxis::new().covers(d("2000-01-01")));
    }

    #[test]
    fn test_prefix() {
        let short = DateAxis::from_iso(&["2018-01-01", "2018-02-01"]).unwrap();
        let long = DateAxis::from_iso(&["2018-01-01", "2018-02-01", "2018-03-01"]).unwrap();
        let other = DateAxis::from_iso(&["2018-01-01", "2018-02-02"]).unwrap();
        assert!(short.is_prefix_of(&long));
        assert!(DateAxis::new().is_prefix_of(&long));
        assert!(!long.is_prefix_of(&short));
        assert!(!other.is_prefix_of(&long));
        assert_eq!(long.prefix(2), short);
        assert_eq!(long.prefix(10), long);
    }

    #[test]
    fn test_day_numbers_monotonic() {
        let axis = DateAxis::from_iso(&["2016-01-01", "2016-01-11", "2017-01-01"]).unwrap();
        let days = axis.day_numbers(d(DEFAULT_EPOCH));
        assert_eq!(days, vec![365.0, 375.0, 731.0]);
        assert!(days.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_serde_iso_strings() {
        let axis = DateAxis::from_iso(&["2018-01-01"]).unwrap();
        let json = serde_json::to_string(&axis).unwrap();
        assert_eq!(json, r#"{"dates":["2018-01-01"]}"#);
        let back: DateAxis = serde_json::from_str(&json).unwrap();
        assert_eq!(back, axis);
    }
}
