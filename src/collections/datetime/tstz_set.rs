use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};

use crate::collections::base::collection::Collection;
use crate::collections::base::span::Span;
use crate::collections::datetime::tstz_span::TsTzSpan;
use crate::collections::datetime::tstz_span_set::TsTzSpanSet;
use crate::errors::{ParseError, TemporalError};
use crate::utils::format_timestamp;

/// A set of timestamps, strictly increasing, with its bounding period
/// cached.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TsTzSet {
    elements: Vec<DateTime<Utc>>,
    span: TsTzSpan,
}

impl TsTzSet {
    /// Builds a set from timestamps that must be strictly increasing.
    pub fn new(elements: Vec<DateTime<Utc>>) -> Result<Self, TemporalError> {
        if elements.is_empty() {
            return Err(TemporalError::InvalidArg(
                "a timestamp set must have at least one element".into(),
            ));
        }
        for pair in elements.windows(2) {
            if pair[0] >= pair[1] {
                return Err(TemporalError::InvariantViolation(format!(
                    "timestamps must be strictly increasing: {} before {}",
                    format_timestamp(&pair[0]),
                    format_timestamp(&pair[1]),
                )));
            }
        }
        let span = Span::new_unchecked(elements[0], elements[elements.len() - 1], true, true);
        Ok(Self { elements, span })
    }

    /// Builds a set from timestamps in any order, deduplicating.
    pub fn from_unsorted(mut elements: Vec<DateTime<Utc>>) -> Result<Self, TemporalError> {
        elements.sort();
        elements.dedup();
        Self::new(elements)
    }

    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    pub fn start_element(&self) -> DateTime<Utc> {
        self.elements[0]
    }

    pub fn end_element(&self) -> DateTime<Utc> {
        self.elements[self.elements.len() - 1]
    }

    pub fn element_n(&self, n: usize) -> Option<DateTime<Utc>> {
        self.elements.get(n).copied()
    }

    pub fn elements(&self) -> &[DateTime<Utc>] {
        &self.elements
    }

    /// The bounding period of the set.
    pub fn to_tstzspan(&self) -> TsTzSpan {
        self.span
    }

    /// The support of the set as a period set of instants.
    pub fn to_tstzspanset(&self) -> TsTzSpanSet {
        TsTzSpanSet::from_sorted(self.elements.iter().map(|t| Span::singleton(*t)).collect())
    }

    /// Return a new set with every element shifted by `delta`.
    pub fn shift(&self, delta: TimeDelta) -> TsTzSet {
        let elements = self.elements.iter().map(|t| *t + delta).collect();
        Self::new(elements).expect("shift preserves ordering")
    }

    /// Union by a linear two-pointer merge.
    pub fn union(&self, other: &Self) -> TsTzSet {
        let mut merged = Vec::with_capacity(self.elements.len() + other.elements.len());
        let (mut i, mut j) = (0usize, 0usize);
        while i < self.elements.len() || j < other.elements.len() {
            match (self.elements.get(i), other.elements.get(j)) {
                (Some(a), Some(b)) => match a.cmp(b) {
                    Ordering::Less => {
                        merged.push(*a);
                        i += 1;
                    }
                    Ordering::Greater => {
                        merged.push(*b);
                        j += 1;
                    }
                    Ordering::Equal => {
                        merged.push(*a);
                        i += 1;
                        j += 1;
                    }
                },
                (Some(a), None) => {
                    merged.push(*a);
                    i += 1;
                }
                (None, Some(b)) => {
                    merged.push(*b);
                    j += 1;
                }
                (None, None) => unreachable!(),
            }
        }
        Self::new(merged).expect("merge of sorted inputs is sorted")
    }

    /// Intersection by a linear two-pointer walk; `None` when empty.
    pub fn intersection(&self, other: &Self) -> Option<TsTzSet> {
        let mut shared = Vec::new();
        let (mut i, mut j) = (0usize, 0usize);
        while i < self.elements.len() && j < other.elements.len() {
            match self.elements[i].cmp(&other.elements[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    shared.push(self.elements[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        Self::new(shared).ok()
    }

    /// Difference `self - other`; `None` when nothing remains.
    pub fn minus(&self, other: &Self) -> Option<TsTzSet> {
        let mut rest = Vec::new();
        let mut j = 0usize;
        for t in &self.elements {
            while j < other.elements.len() && other.elements[j] < *t {
                j += 1;
            }
            if j >= other.elements.len() || other.elements[j] != *t {
                rest.push(*t);
            }
        }
        Self::new(rest).ok()
    }

    /// Restriction to a period; `None` when no element falls inside.
    pub fn at_span(&self, span: &TsTzSpan) -> Option<TsTzSet> {
        let kept: Vec<_> = self
            .elements
            .iter()
            .copied()
            .filter(|t| span.contains(t))
            .collect();
        Self::new(kept).ok()
    }

    /// Restriction to the complement of a period.
    pub fn minus_span(&self, span: &TsTzSpan) -> Option<TsTzSet> {
        let kept: Vec<_> = self
            .elements
            .iter()
            .copied()
            .filter(|t| !span.contains(t))
            .collect();
        Self::new(kept).ok()
    }

    /// Distance to a timestamp; zero when contained.
    pub fn distance_to_value(&self, value: &DateTime<Utc>) -> TimeDelta {
        self.elements
            .iter()
            .map(|t| if t >= value { *t - *value } else { *value - *t })
            .min()
            .expect("set is non-empty")
    }
}

impl Collection for TsTzSet {
    type Type = DateTime<Utc>;

    fn is_contained_in(&self, container: &Self) -> bool {
        self.elements.iter().all(|t| container.contains(t))
    }

    fn contains(&self, content: &DateTime<Utc>) -> bool {
        self.elements.binary_search(content).is_ok()
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.intersection(other).is_some()
    }

    fn is_adjacent(&self, other: &Self) -> bool {
        // Instant sets carry only inclusive members, so adjacency in the
        // one-inclusive sense never holds.
        let _ = other;
        false
    }

    fn is_left(&self, other: &Self) -> bool {
        self.end_element() < other.start_element()
    }

    fn is_over_or_left(&self, other: &Self) -> bool {
        self.end_element() <= other.end_element()
    }

    fn is_over_or_right(&self, other: &Self) -> bool {
        self.start_element() >= other.start_element()
    }

    fn is_right(&self, other: &Self) -> bool {
        self.start_element() > other.end_element()
    }
}

impl fmt::Debug for TsTzSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for TsTzSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, t) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", format_timestamp(t))?;
        }
        write!(f, "}}")
    }
}

impl FromStr for TsTzSet {
    type Err = ParseError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        crate::parser::tstzset_in(string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ymd(d: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2020, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn increasing_is_enforced() {
        assert!(TsTzSet::new(vec![ymd(2), ymd(1)]).is_err());
        assert!(TsTzSet::new(vec![ymd(1), ymd(1)]).is_err());
        assert!(TsTzSet::from_unsorted(vec![ymd(2), ymd(1), ymd(2)]).is_ok());
    }

    #[test]
    fn two_pointer_algebra() {
        let a = TsTzSet::new(vec![ymd(1), ymd(3), ymd(5)]).unwrap();
        let b = TsTzSet::new(vec![ymd(3), ymd(4)]).unwrap();
        assert_eq!(a.union(&b).num_elements(), 4);
        assert_eq!(a.intersection(&b).unwrap().num_elements(), 1);
        let rest = a.minus(&b).unwrap();
        assert_eq!(rest.elements(), &[ymd(1), ymd(5)]);
    }

    #[test]
    fn restriction_to_span() {
        let set = TsTzSet::new(vec![ymd(1), ymd(3), ymd(5)]).unwrap();
        let span: TsTzSpan = (ymd(2)..=ymd(4)).into();
        assert_eq!(set.at_span(&span).unwrap().elements(), &[ymd(3)]);
        assert_eq!(set.minus_span(&span).unwrap().num_elements(), 2);
    }

    #[test]
    fn distance() {
        let set = TsTzSet::new(vec![ymd(1), ymd(5)]).unwrap();
        assert_eq!(set.distance_to_value(&ymd(3)), TimeDelta::days(2));
        assert_eq!(set.distance_to_value(&ymd(5)), TimeDelta::zero());
    }
}
