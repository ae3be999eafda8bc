use std::fmt::Debug;
use std::ops::BitAnd;

use crate::collections::base::collection::Collection;
use crate::collections::base::span_set::SpanSet;
use crate::errors::TemporalError;

/// An interval over an ordered domain with independent bound inclusivity.
///
/// Invariants: `lower <= upper`, and `lower == upper` implies both bounds
/// inclusive (a degenerate span holding a single value).
#[derive(Clone, Copy, PartialEq)]
pub struct Span<T> {
    lower: T,
    upper: T,
    lower_inc: bool,
    upper_inc: bool,
}

/// `lower bound <= upper bound` under bound semantics: an exclusive bound
/// does not reach the shared value.
pub(crate) fn lower_le_upper<T: PartialOrd>(
    lower: &T,
    lower_inc: bool,
    upper: &T,
    upper_inc: bool,
) -> bool {
    lower < upper || (lower == upper && lower_inc && upper_inc)
}

/// Order two lower bounds: inclusive starts before exclusive at equal values.
pub(crate) fn lower_bound_le<T: PartialOrd>(v1: &T, inc1: bool, v2: &T, inc2: bool) -> bool {
    v1 < v2 || (v1 == v2 && (inc1 || !inc2))
}

/// Order two upper bounds: exclusive ends before inclusive at equal values.
pub(crate) fn upper_bound_le<T: PartialOrd>(v1: &T, inc1: bool, v2: &T, inc2: bool) -> bool {
    v1 < v2 || (v1 == v2 && (!inc1 || inc2))
}

impl<T: Copy + PartialOrd + Debug> Span<T> {
    /// Constructs a span, validating the bound invariants.
    pub fn new(lower: T, upper: T, lower_inc: bool, upper_inc: bool) -> Result<Self, TemporalError> {
        if lower > upper {
            return Err(TemporalError::InvariantViolation(format!(
                "span lower bound {lower:?} is greater than upper bound {upper:?}"
            )));
        }
        if lower == upper && !(lower_inc && upper_inc) {
            return Err(TemporalError::InvariantViolation(
                "a span over a single value must have both bounds inclusive".into(),
            ));
        }
        Ok(Self { lower, upper, lower_inc, upper_inc })
    }

    /// Constructs the degenerate span `[value, value]`.
    pub fn singleton(value: T) -> Self {
        Self { lower: value, upper: value, lower_inc: true, upper_inc: true }
    }

    pub(crate) fn new_unchecked(lower: T, upper: T, lower_inc: bool, upper_inc: bool) -> Self {
        Self { lower, upper, lower_inc, upper_inc }
    }

    /// Returns the lower bound of the span.
    pub fn lower(&self) -> T {
        self.lower
    }

    /// Returns the upper bound of the span.
    pub fn upper(&self) -> T {
        self.upper
    }

    /// Checks if the lower bound of the span is inclusive.
    pub fn is_lower_inclusive(&self) -> bool {
        self.lower_inc
    }

    /// Checks if the upper bound of the span is inclusive.
    pub fn is_upper_inclusive(&self) -> bool {
        self.upper_inc
    }

    /// Returns whether the span holds exactly one value.
    pub fn is_singleton(&self) -> bool {
        self.lower == self.upper
    }

    /// Grows `self` in place so it also covers `other`.
    pub fn expand(&mut self, other: &Self) {
        if lower_bound_le(&other.lower, other.lower_inc, &self.lower, self.lower_inc) {
            self.lower = other.lower;
            self.lower_inc = other.lower_inc;
        }
        if upper_bound_le(&self.upper, self.upper_inc, &other.upper, other.upper_inc) {
            self.upper = other.upper;
            self.upper_inc = other.upper_inc;
        }
    }

    /// Computes the intersection of two spans, `None` when they do not
    /// overlap.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        let (lower, lower_inc) =
            if lower_bound_le(&self.lower, self.lower_inc, &other.lower, other.lower_inc) {
                (other.lower, other.lower_inc)
            } else {
                (self.lower, self.lower_inc)
            };
        let (upper, upper_inc) =
            if upper_bound_le(&self.upper, self.upper_inc, &other.upper, other.upper_inc) {
                (self.upper, self.upper_inc)
            } else {
                (other.upper, other.upper_inc)
            };
        Some(Self { lower, upper, lower_inc, upper_inc })
    }

    /// Computes the union of two spans. Overlapping or adjacent spans merge
    /// into one; otherwise the result holds both.
    pub fn union(&self, other: &Self) -> SpanSet<T> {
        if self.overlaps(other) || self.is_adjacent(other) {
            let mut merged = *self;
            merged.expand(other);
            SpanSet::from_sorted(vec![merged])
        } else if self.is_left(other) {
            SpanSet::from_sorted(vec![*self, *other])
        } else {
            SpanSet::from_sorted(vec![*other, *self])
        }
    }

    /// Computes `self` minus `other`: zero, one or two spans.
    pub fn minus(&self, other: &Self) -> SpanSet<T> {
        if !self.overlaps(other) {
            return SpanSet::from_sorted(vec![*self]);
        }
        let mut parts = Vec::with_capacity(2);
        // Left remainder: [self.lower, other.lower)
        if self.lower < other.lower
            || (self.lower == other.lower && self.lower_inc && !other.lower_inc)
        {
            parts.push(Self {
                lower: self.lower,
                upper: other.lower,
                lower_inc: self.lower_inc,
                upper_inc: !other.lower_inc,
            });
        }
        // Right remainder: (other.upper, self.upper]
        if other.upper < self.upper
            || (other.upper == self.upper && self.upper_inc && !other.upper_inc)
        {
            parts.push(Self {
                lower: other.upper,
                upper: self.upper,
                lower_inc: !other.upper_inc,
                upper_inc: self.upper_inc,
            });
        }
        SpanSet::from_sorted(parts)
    }
}

impl<T: Copy + PartialOrd + Debug> Collection for Span<T> {
    type Type = T;

    fn is_contained_in(&self, container: &Self) -> bool {
        container.contains_span(self)
    }

    fn contains(&self, content: &T) -> bool {
        let after_lower = *content > self.lower || (self.lower_inc && *content == self.lower);
        let before_upper = *content < self.upper || (self.upper_inc && *content == self.upper);
        after_lower && before_upper
    }

    fn overlaps(&self, other: &Self) -> bool {
        lower_le_upper(&self.lower, self.lower_inc, &other.upper, other.upper_inc)
            && lower_le_upper(&other.lower, other.lower_inc, &self.upper, self.upper_inc)
    }

    fn is_adjacent(&self, other: &Self) -> bool {
        (self.upper == other.lower && (self.upper_inc != other.lower_inc))
            || (other.upper == self.lower && (other.upper_inc != self.lower_inc))
    }

    fn is_left(&self, other: &Self) -> bool {
        !lower_le_upper(&other.lower, other.lower_inc, &self.upper, self.upper_inc)
    }

    fn is_over_or_left(&self, other: &Self) -> bool {
        upper_bound_le(&self.upper, self.upper_inc, &other.upper, other.upper_inc)
    }

    fn is_over_or_right(&self, other: &Self) -> bool {
        lower_bound_le(&other.lower, other.lower_inc, &self.lower, self.lower_inc)
    }

    fn is_right(&self, other: &Self) -> bool {
        other.is_left(self)
    }
}

impl<T: Copy + PartialOrd + Debug> Span<T> {
    /// Returns whether every value of `other` lies in `self`.
    pub fn contains_span(&self, other: &Self) -> bool {
        lower_bound_le(&self.lower, self.lower_inc, &other.lower, other.lower_inc)
            && upper_bound_le(&other.upper, other.upper_inc, &self.upper, self.upper_inc)
    }
}

impl<T: Copy + PartialOrd + Debug> BitAnd for Span<T> {
    type Output = Option<Span<T>>;

    fn bitand(self, other: Self) -> Self::Output {
        self.intersection(&other)
    }
}

impl<T: Eq> Eq for Span<T> {}

impl<T: std::hash::Hash> std::hash::Hash for Span<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.lower.hash(state);
        self.upper.hash(state);
        self.lower_inc.hash(state);
        self.upper_inc.hash(state);
    }
}

impl<T: Debug> Debug for Span<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{:?}, {:?}{}",
            if self.lower_inc { '[' } else { '(' },
            self.lower,
            self.upper,
            if self.upper_inc { ']' } else { ')' },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(lower: f64, upper: f64, li: bool, ui: bool) -> Span<f64> {
        Span::new(lower, upper, li, ui).unwrap()
    }

    #[test]
    fn invalid_bounds_are_rejected() {
        assert!(Span::new(2.0, 1.0, true, true).is_err());
        assert!(Span::new(1.0, 1.0, true, false).is_err());
    }

    #[test]
    fn contains_respects_inclusivity() {
        let s = span(1.0, 2.0, false, true);
        assert!(!s.contains(&1.0));
        assert!(s.contains(&1.5));
        assert!(s.contains(&2.0));
    }

    #[test]
    fn overlap_at_shared_bound_needs_both_inclusive() {
        let a = span(1.0, 2.0, true, true);
        let b = span(2.0, 3.0, true, true);
        let c = span(2.0, 3.0, false, true);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(a.is_adjacent(&c));
        assert!(!a.is_adjacent(&b));
    }

    #[test]
    fn intersection_takes_tighter_bounds() {
        let a = span(1.0, 10.0, true, true);
        let b = span(5.0, 15.0, false, true);
        let i = a.intersection(&b).unwrap();
        assert_eq!(i.lower(), 5.0);
        assert!(!i.is_lower_inclusive());
        assert_eq!(i.upper(), 10.0);
        assert!(i.is_upper_inclusive());
    }

    #[test]
    fn union_of_disjoint_spans_has_two_parts() {
        let a = span(1.0, 2.0, true, true);
        let b = span(5.0, 6.0, true, true);
        assert_eq!(a.union(&b).num_spans(), 2);
        let c = span(2.0, 3.0, false, true);
        assert_eq!(a.union(&c).num_spans(), 1);
    }

    #[test]
    fn minus_splits_around_the_subtrahend() {
        let a = span(1.0, 10.0, true, true);
        let b = span(4.0, 6.0, true, false);
        let rest = a.minus(&b);
        assert_eq!(rest.num_spans(), 2);
        let first = rest.span_n(0).unwrap();
        assert_eq!(first.upper(), 4.0);
        assert!(!first.is_upper_inclusive());
        let second = rest.span_n(1).unwrap();
        assert_eq!(second.lower(), 6.0);
        assert!(second.is_lower_inclusive());
    }

    #[test]
    fn positional_predicates() {
        let a = span(1.0, 2.0, true, false);
        let b = span(2.0, 3.0, true, true);
        assert!(a.is_left(&b));
        assert!(b.is_right(&a));
        assert!(a.is_over_or_left(&b));
        assert!(b.is_over_or_right(&a));
    }
}
