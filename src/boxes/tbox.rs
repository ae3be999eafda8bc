use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::boxes::r#box::BoundingBox;
use crate::collections::base::collection::Collection;
use crate::collections::base::span::Span;
use crate::collections::datetime::tstz_span::TsTzSpan;
use crate::collections::number::float_span::FloatSpan;
use crate::errors::{ParseError, TemporalError};

/// A bounding box for temporal numbers: a value range, a period, or both.
///
/// ## Example
/// ```
/// # use tempora::boxes::TBox;
/// # use std::str::FromStr;
/// let tbox = TBox::from_str("TBOXFLOAT XT([0, 10),[2020-06-01, 2020-06-05])").unwrap();
/// assert_eq!(tbox.xmin(), Some(0.0));
/// assert!(tbox.tmax().is_some());
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct TBox {
    span: Option<FloatSpan>,
    period: Option<TsTzSpan>,
}

impl TBox {
    /// Constructs a box from its dimensions; at least one must be present.
    pub fn new(span: Option<FloatSpan>, period: Option<TsTzSpan>) -> Result<Self, TemporalError> {
        if span.is_none() && period.is_none() {
            return Err(TemporalError::InvalidArg(
                "a TBox needs a value or a time dimension".into(),
            ));
        }
        Ok(Self { span, period })
    }

    pub fn from_value(value: f64) -> Self {
        Self { span: Some(Span::singleton(value)), period: None }
    }

    pub fn from_value_time(value: f64, t: DateTime<Utc>) -> Self {
        Self { span: Some(Span::singleton(value)), period: Some(Span::singleton(t)) }
    }

    pub fn from_time(t: DateTime<Utc>) -> Self {
        Self { span: None, period: Some(Span::singleton(t)) }
    }

    pub fn from_tstzspan(period: TsTzSpan) -> Self {
        Self { span: None, period: Some(period) }
    }

    pub fn has_x(&self) -> bool {
        self.span.is_some()
    }

    pub fn has_t(&self) -> bool {
        self.period.is_some()
    }

    pub fn xmin(&self) -> Option<f64> {
        self.span.map(|s| s.lower())
    }

    pub fn xmax(&self) -> Option<f64> {
        self.span.map(|s| s.upper())
    }

    pub fn tmin(&self) -> Option<DateTime<Utc>> {
        self.period.map(|p| p.lower())
    }

    pub fn tmax(&self) -> Option<DateTime<Utc>> {
        self.period.map(|p| p.upper())
    }

    pub fn to_floatspan(&self) -> Option<FloatSpan> {
        self.span
    }

    pub fn to_tstzspan(&self) -> Option<TsTzSpan> {
        self.period
    }

    /// Union of two boxes over their shared dimensions. With `strict` the
    /// boxes must overlap.
    pub fn union(&self, other: &Self, strict: bool) -> Result<Self, TemporalError> {
        if strict && !self.overlaps_tbox(other) {
            return Err(TemporalError::InvalidArg(
                "the boxes do not overlap".into(),
            ));
        }
        let mut result = *self;
        result.expand_tbox(other);
        Ok(result)
    }

    /// Per-dimension intersection; `None` when any shared dimension is
    /// disjoint.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let span = match (self.span, other.span) {
            (Some(a), Some(b)) => Some(a.intersection(&b)?),
            (Some(a), None) | (None, Some(a)) => Some(a),
            (None, None) => None,
        };
        let period = match (self.period, other.period) {
            (Some(a), Some(b)) => Some(a.intersection(&b)?),
            (Some(a), None) | (None, Some(a)) => Some(a),
            (None, None) => None,
        };
        Some(Self { span, period })
    }

    pub(crate) fn expand_tbox(&mut self, other: &Self) {
        self.span = match (self.span, other.span) {
            (Some(mut a), Some(b)) => {
                a.expand(&b);
                Some(a)
            }
            (a, None) => a,
            (None, b) => b,
        };
        self.period = match (self.period, other.period) {
            (Some(mut a), Some(b)) => {
                a.expand(&b);
                Some(a)
            }
            (a, None) => a,
            (None, b) => b,
        };
    }

    fn overlaps_tbox(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.span, other.span) {
            if !a.overlaps(&b) {
                return false;
            }
        }
        if let (Some(a), Some(b)) = (self.period, other.period) {
            if !a.overlaps(&b) {
                return false;
            }
        }
        true
    }

    /// Returns whether `self` fully contains `other` on every shared
    /// dimension.
    pub fn contains_tbox(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.span, other.span) {
            if !a.contains_span(&b) {
                return false;
            }
        }
        if let (Some(a), Some(b)) = (self.period, other.period) {
            if !a.contains_span(&b) {
                return false;
            }
        }
        true
    }

    pub fn is_contained_in_tbox(&self, other: &Self) -> bool {
        other.contains_tbox(self)
    }

    pub fn overlaps_with(&self, other: &Self) -> bool {
        self.overlaps_tbox(other)
    }

    /// Value-dimension positional predicates.
    pub fn is_left(&self, other: &Self) -> bool {
        matches!((self.span, other.span), (Some(a), Some(b)) if a.is_left(&b))
    }

    pub fn is_over_or_left(&self, other: &Self) -> bool {
        matches!((self.span, other.span), (Some(a), Some(b)) if a.is_over_or_left(&b))
    }

    pub fn is_right(&self, other: &Self) -> bool {
        matches!((self.span, other.span), (Some(a), Some(b)) if a.is_right(&b))
    }

    pub fn is_over_or_right(&self, other: &Self) -> bool {
        matches!((self.span, other.span), (Some(a), Some(b)) if a.is_over_or_right(&b))
    }

    /// Time-dimension positional predicates.
    pub fn is_before(&self, other: &Self) -> bool {
        matches!((self.period, other.period), (Some(a), Some(b)) if a.is_left(&b))
    }

    pub fn is_over_or_before(&self, other: &Self) -> bool {
        matches!((self.period, other.period), (Some(a), Some(b)) if a.is_over_or_left(&b))
    }

    pub fn is_after(&self, other: &Self) -> bool {
        matches!((self.period, other.period), (Some(a), Some(b)) if a.is_right(&b))
    }

    pub fn is_over_or_after(&self, other: &Self) -> bool {
        matches!((self.period, other.period), (Some(a), Some(b)) if a.is_over_or_right(&b))
    }
}

impl BoundingBox for TBox {
    fn expand(&mut self, other: &Self) {
        self.expand_tbox(other);
    }

    fn set_time(&mut self, period: &TsTzSpan) {
        self.period = Some(*period);
    }

    fn time(&self) -> Option<TsTzSpan> {
        self.period
    }
}

impl fmt::Debug for TBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for TBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.span, self.period) {
            (Some(span), Some(period)) => write!(f, "TBOXFLOAT XT({span},{period})"),
            (Some(span), None) => write!(f, "TBOXFLOAT X({span})"),
            (None, Some(period)) => write!(f, "TBOXFLOAT T({period})"),
            (None, None) => unreachable!("TBox invariant: one dimension present"),
        }
    }
}

impl FromStr for TBox {
    type Err = ParseError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        crate::parser::tbox_in(string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_one_dimension() {
        assert!(TBox::new(None, None).is_err());
    }

    #[test]
    fn union_expands_both_dimensions() {
        let a = TBox::new(Some((0.0..=5.0).into()), None).unwrap();
        let b = TBox::new(Some((3.0..=9.0).into()), None).unwrap();
        let u = a.union(&b, true).unwrap();
        assert_eq!(u.xmin(), Some(0.0));
        assert_eq!(u.xmax(), Some(9.0));
    }

    #[test]
    fn intersection_requires_all_shared_dims() {
        let a = TBox::new(Some((0.0..=5.0).into()), None).unwrap();
        let b = TBox::new(Some((6.0..=9.0).into()), None).unwrap();
        assert!(a.intersection(&b).is_none());
    }

    #[test]
    fn value_positional_predicates() {
        let a = TBox::from_value(1.0);
        let b = TBox::from_value(2.0);
        assert!(a.is_left(&b));
        assert!(b.is_right(&a));
    }
}
