use std::fmt;
use std::ops::{Range, RangeInclusive};
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use crate::collections::base::collection::Collection;
use crate::collections::base::span::Span;
use crate::errors::ParseError;
use crate::utils::format_timestamp;

/// A period: an interval of timestamps with independent bound inclusivity.
///
/// ## Example
/// ```
/// # use tempora::collections::datetime::TsTzSpan;
/// # use std::str::FromStr;
/// let span = TsTzSpan::from_str("[2020-01-01, 2020-01-10)").unwrap();
/// assert!(span.is_lower_inclusive());
/// assert!(!span.is_upper_inclusive());
/// ```
pub type TsTzSpan = Span<DateTime<Utc>>;

impl TsTzSpan {
    /// Returns the length of the period.
    pub fn duration(&self) -> TimeDelta {
        self.upper() - self.lower()
    }

    /// Return a new period with both bounds shifted by `delta`.
    pub fn shift(&self, delta: TimeDelta) -> TsTzSpan {
        self.shift_scale(Some(delta), None)
    }

    /// Return a new period scaled so that its duration is `width`.
    pub fn scale(&self, width: TimeDelta) -> TsTzSpan {
        self.shift_scale(None, Some(width))
    }

    /// Return a new period shifted by `delta` and scaled to duration
    /// `width`. An instantaneous period cannot be scaled and keeps its
    /// bounds.
    pub fn shift_scale(&self, delta: Option<TimeDelta>, width: Option<TimeDelta>) -> TsTzSpan {
        let mut lower = self.lower();
        let mut upper = self.upper();
        if let Some(delta) = delta {
            lower += delta;
            upper += delta;
        }
        if let Some(width) = width {
            if lower < upper {
                upper = lower + width;
            } else {
                tracing::warn!("cannot scale an instantaneous period");
            }
        }
        Span::new_unchecked(lower, upper, self.is_lower_inclusive(), self.is_upper_inclusive())
    }

    /// Distance from the period to a timestamp; zero when contained.
    pub fn distance_to_value(&self, value: &DateTime<Utc>) -> TimeDelta {
        if self.contains(value) {
            TimeDelta::zero()
        } else if *value < self.lower() {
            self.lower() - *value
        } else {
            *value - self.upper()
        }
    }

    /// Distance between two periods; zero when they overlap.
    pub fn distance_to_span(&self, other: &Self) -> TimeDelta {
        if self.overlaps(other) || self.is_adjacent(other) {
            TimeDelta::zero()
        } else if self.is_left(other) {
            other.lower() - self.upper()
        } else {
            self.lower() - other.upper()
        }
    }
}

impl fmt::Display for TsTzSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}, {}{}",
            if self.is_lower_inclusive() { '[' } else { '(' },
            format_timestamp(&self.lower()),
            format_timestamp(&self.upper()),
            if self.is_upper_inclusive() { ']' } else { ')' },
        )
    }
}

impl FromStr for TsTzSpan {
    type Err = ParseError;

    /// Parses a period from its textual representation.
    ///
    /// ## Example
    /// ```
    /// # use tempora::collections::datetime::TsTzSpan;
    /// let span: TsTzSpan = "(2019-09-08, 2019-09-10]".parse().unwrap();
    /// assert!(!span.is_lower_inclusive());
    /// ```
    fn from_str(string: &str) -> Result<Self, Self::Err> {
        crate::parser::tstzspan_in(string)
    }
}

impl<Tz: TimeZone> From<Range<DateTime<Tz>>> for TsTzSpan {
    fn from(Range { start, end }: Range<DateTime<Tz>>) -> Self {
        Span::new_unchecked(start.with_timezone(&Utc), end.with_timezone(&Utc), true, false)
    }
}

impl<Tz: TimeZone> From<RangeInclusive<DateTime<Tz>>> for TsTzSpan {
    fn from(range: RangeInclusive<DateTime<Tz>>) -> Self {
        let (start, end) = range.into_inner();
        Span::new_unchecked(start.with_timezone(&Utc), end.with_timezone(&Utc), true, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn intersection_keeps_the_tight_bounds() {
        // [2020-01-01, 2020-01-10] ∩ (2020-01-05, 2020-01-15] = (2020-01-05, 2020-01-10]
        let a = TsTzSpan::from_str("[2020-01-01, 2020-01-10]").unwrap();
        let b = TsTzSpan::from_str("(2020-01-05, 2020-01-15]").unwrap();
        let i = a.intersection(&b).unwrap();
        assert_eq!(i.lower(), ymd(2020, 1, 5));
        assert!(!i.is_lower_inclusive());
        assert_eq!(i.upper(), ymd(2020, 1, 10));
        assert!(i.is_upper_inclusive());
    }

    #[test]
    fn exactly_one_order_predicate_holds() {
        let a: TsTzSpan = (ymd(2020, 1, 1)..ymd(2020, 1, 5)).into();
        let b: TsTzSpan = (ymd(2020, 1, 7)..ymd(2020, 1, 9)).into();
        assert!(a.is_left(&b));
        assert!(!a.overlaps(&b));
        assert!(!a.is_right(&b));
    }

    #[test]
    fn contains_implies_overlaps() {
        let outer: TsTzSpan = (ymd(2020, 1, 1)..=ymd(2020, 1, 31)).into();
        let inner: TsTzSpan = (ymd(2020, 1, 10)..=ymd(2020, 1, 12)).into();
        assert!(outer.contains_span(&inner));
        assert!(outer.overlaps(&inner));
    }

    #[test]
    fn shift_and_scale() {
        let span: TsTzSpan = (ymd(2020, 1, 1)..=ymd(2020, 1, 3)).into();
        let shifted = span.shift(TimeDelta::days(1));
        assert_eq!(shifted.lower(), ymd(2020, 1, 2));
        let scaled = span.scale(TimeDelta::days(1));
        assert_eq!(scaled.upper(), ymd(2020, 1, 2));
    }

    #[test]
    fn distance_is_zero_on_overlap() {
        let a: TsTzSpan = (ymd(2020, 1, 1)..=ymd(2020, 1, 5)).into();
        let b: TsTzSpan = (ymd(2020, 1, 4)..=ymd(2020, 1, 9)).into();
        assert_eq!(a.distance_to_span(&b), TimeDelta::zero());
        let c: TsTzSpan = (ymd(2020, 1, 7)..=ymd(2020, 1, 9)).into();
        assert_eq!(a.distance_to_span(&c), TimeDelta::days(2));
    }

    #[test]
    fn display_round_trip() {
        let text = "[2020-01-01 00:00:00+00, 2020-01-10 00:00:00+00)";
        let span = TsTzSpan::from_str(text).unwrap();
        assert_eq!(span.to_string(), text);
    }
}
