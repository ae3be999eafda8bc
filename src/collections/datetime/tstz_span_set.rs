use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};

use crate::collections::base::collection::Collection;
use crate::collections::base::span_set::SpanSet;
use crate::errors::ParseError;

/// A period set: ordered, pairwise disjoint and non-adjacent periods with
/// the covering period cached.
pub type TsTzSpanSet = SpanSet<DateTime<Utc>>;

impl TsTzSpanSet {
    /// Total covered duration. With `ignore_gaps` the duration of the
    /// bounding period is returned instead.
    pub fn duration(&self, ignore_gaps: bool) -> TimeDelta {
        if ignore_gaps {
            return self
                .bounding_span()
                .map(|span| span.duration())
                .unwrap_or_else(TimeDelta::zero);
        }
        self.spans()
            .iter()
            .fold(TimeDelta::zero(), |acc, span| acc + span.duration())
    }

    /// Return a new period set with every period shifted by `delta`.
    pub fn shift(&self, delta: TimeDelta) -> TsTzSpanSet {
        TsTzSpanSet::from_sorted(self.spans().iter().map(|span| span.shift(delta)).collect())
    }

    /// Distance to a timestamp; zero when any member contains it.
    pub fn distance_to_value(&self, value: &DateTime<Utc>) -> TimeDelta {
        self.spans()
            .iter()
            .map(|span| span.distance_to_value(value))
            .min()
            .unwrap_or_else(TimeDelta::zero)
    }

    /// Distance between two period sets; zero when they overlap.
    pub fn distance_to_span_set(&self, other: &Self) -> TimeDelta {
        if self.overlaps(other) {
            return TimeDelta::zero();
        }
        let mut best: Option<TimeDelta> = None;
        for a in self.spans() {
            for b in other.spans() {
                let d = a.distance_to_span(b);
                best = Some(match best {
                    Some(current) if current <= d => current,
                    _ => d,
                });
            }
        }
        best.unwrap_or_else(TimeDelta::zero)
    }
}

impl fmt::Display for TsTzSpanSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, span) in self.spans().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{span}")?;
        }
        write!(f, "}}")
    }
}

impl FromStr for TsTzSpanSet {
    type Err = ParseError;

    /// Parses a period set from its textual representation.
    ///
    /// ## Example
    /// ```
    /// # use tempora::collections::datetime::TsTzSpanSet;
    /// let set: TsTzSpanSet = "{[2020-01-01, 2020-01-02], [2020-01-05, 2020-01-06]}"
    ///     .parse()
    ///     .unwrap();
    /// assert_eq!(set.num_spans(), 2);
    /// ```
    fn from_str(string: &str) -> Result<Self, Self::Err> {
        crate::parser::tstzspanset_in(string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_with_and_without_gaps() {
        let set = TsTzSpanSet::from_str("{[2020-01-01, 2020-01-02], [2020-01-05, 2020-01-06]}")
            .unwrap();
        assert_eq!(set.duration(false), TimeDelta::days(2));
        assert_eq!(set.duration(true), TimeDelta::days(5));
    }

    #[test]
    fn bounding_span_covers_members() {
        let set = TsTzSpanSet::from_str("{[2020-01-01, 2020-01-02], (2020-01-05, 2020-01-06]}")
            .unwrap();
        let bounding = set.bounding_span().unwrap();
        assert!(bounding.is_lower_inclusive());
        assert!(bounding.is_upper_inclusive());
        assert_eq!(set.to_string().matches('[').count(), 2);
    }

    #[test]
    fn set_algebra_against_other_set() {
        let a = TsTzSpanSet::from_str("{[2020-01-01, 2020-01-10]}").unwrap();
        let b = TsTzSpanSet::from_str("{[2020-01-03, 2020-01-04]}").unwrap();
        let rest = a.minus(&b);
        assert_eq!(rest.num_spans(), 2);
        let i = a.intersection(&b);
        assert_eq!(i.num_spans(), 1);
    }
}
