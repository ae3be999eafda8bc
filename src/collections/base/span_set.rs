use std::fmt::Debug;
use std::ops::{BitAnd, BitOr};

use crate::collections::base::collection::Collection;
use crate::collections::base::span::{lower_bound_le, Span};

/// An ordered collection of pairwise disjoint, non-adjacent spans, with the
/// bounding span cached.
#[derive(Clone, PartialEq)]
pub struct SpanSet<T> {
    spans: Vec<Span<T>>,
    bounding: Option<Span<T>>,
}

impl<T: Copy + PartialOrd + Debug> SpanSet<T> {
    /// Builds a span set from spans in any order; overlapping or adjacent
    /// spans are merged so the §invariants hold on the result.
    pub fn new(mut spans: Vec<Span<T>>) -> Self {
        spans.sort_by(|a, b| {
            if a.lower() < b.lower()
                || (a.lower() == b.lower()
                    && lower_bound_le(
                        &a.lower(),
                        a.is_lower_inclusive(),
                        &b.lower(),
                        b.is_lower_inclusive(),
                    ))
            {
                std::cmp::Ordering::Less
            } else {
                std::cmp::Ordering::Greater
            }
        });
        let mut merged: Vec<Span<T>> = Vec::with_capacity(spans.len());
        for span in spans {
            match merged.last_mut() {
                Some(last) if last.overlaps(&span) || last.is_adjacent(&span) => {
                    last.expand(&span);
                }
                _ => merged.push(span),
            }
        }
        Self::from_sorted(merged)
    }

    /// Builds a span set from spans already sorted, disjoint and
    /// non-adjacent.
    pub(crate) fn from_sorted(spans: Vec<Span<T>>) -> Self {
        let bounding = match (spans.first(), spans.last()) {
            (Some(first), Some(last)) => Some(Span::new_unchecked(
                first.lower(),
                last.upper(),
                first.is_lower_inclusive(),
                last.is_upper_inclusive(),
            )),
            _ => None,
        };
        Self { spans, bounding }
    }

    /// The empty span set.
    pub fn empty() -> Self {
        Self { spans: Vec::new(), bounding: None }
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn num_spans(&self) -> usize {
        self.spans.len()
    }

    /// Returns the bounding span covering all members, `None` when empty.
    pub fn bounding_span(&self) -> Option<Span<T>> {
        self.bounding
    }

    pub fn start_span(&self) -> Option<Span<T>> {
        self.spans.first().copied()
    }

    pub fn end_span(&self) -> Option<Span<T>> {
        self.spans.last().copied()
    }

    pub fn span_n(&self, n: usize) -> Option<Span<T>> {
        self.spans.get(n).copied()
    }

    pub fn spans(&self) -> &[Span<T>] {
        &self.spans
    }

    /// Index of the member span containing `value`, by binary search.
    pub fn find_value(&self, value: &T) -> Option<usize> {
        let mut lo = 0usize;
        let mut hi = self.spans.len();
        while lo < hi {
            let mid = (lo + hi) / 2;
            let span = &self.spans[mid];
            if span.contains(value) {
                return Some(mid);
            }
            if *value < span.lower() || (*value == span.lower() && !span.is_lower_inclusive()) {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        None
    }

    /// Intersection by a linear two-cursor walk.
    pub fn intersection(&self, other: &Self) -> Self {
        let mut result = Vec::new();
        let (mut i, mut j) = (0usize, 0usize);
        while i < self.spans.len() && j < other.spans.len() {
            let a = &self.spans[i];
            let b = &other.spans[j];
            if let Some(inter) = a.intersection(b) {
                result.push(inter);
            }
            // Advance the cursor whose span ends first.
            if a.is_over_or_left(b) {
                i += 1;
            } else {
                j += 1;
            }
        }
        Self::from_sorted(result)
    }

    /// Union by merging the two ascending runs.
    pub fn union(&self, other: &Self) -> Self {
        let mut all = Vec::with_capacity(self.spans.len() + other.spans.len());
        all.extend_from_slice(&self.spans);
        all.extend_from_slice(&other.spans);
        Self::new(all)
    }

    /// Difference `self - other` by walking both runs.
    pub fn minus(&self, other: &Self) -> Self {
        let mut result = Vec::new();
        let mut j = 0usize;
        for span in &self.spans {
            let mut remainder = vec![*span];
            while j < other.spans.len() && !remainder.is_empty() {
                let b = &other.spans[j];
                if b.is_left(remainder.last().expect("non-empty")) {
                    j += 1;
                    continue;
                }
                let current = remainder.pop().expect("non-empty");
                if b.is_right(&current) {
                    remainder.push(current);
                    break;
                }
                let parts = current.minus(b);
                for part in parts.spans() {
                    remainder.push(*part);
                }
                // Only the last piece may still overlap later subtrahends.
                if remainder.len() > 1 {
                    let tail = remainder.split_off(remainder.len() - 1);
                    result.extend(remainder);
                    remainder = tail;
                }
                if b.is_over_or_left(&current) {
                    j += 1;
                } else {
                    break;
                }
            }
            result.extend(remainder);
        }
        Self::from_sorted(result)
    }
}

impl<T: Copy + PartialOrd + Debug> Collection for SpanSet<T> {
    type Type = T;

    fn is_contained_in(&self, container: &Self) -> bool {
        self.spans.iter().all(|span| {
            container
                .spans
                .iter()
                .any(|other| other.contains_span(span))
        })
    }

    fn contains(&self, content: &T) -> bool {
        self.find_value(content).is_some()
    }

    fn overlaps(&self, other: &Self) -> bool {
        let (mut i, mut j) = (0usize, 0usize);
        while i < self.spans.len() && j < other.spans.len() {
            let a = &self.spans[i];
            let b = &other.spans[j];
            if a.overlaps(b) {
                return true;
            }
            if a.is_over_or_left(b) {
                i += 1;
            } else {
                j += 1;
            }
        }
        false
    }

    fn is_adjacent(&self, other: &Self) -> bool {
        match (self.bounding, other.bounding) {
            (Some(a), Some(b)) => {
                (a.upper() == b.lower() || b.upper() == a.lower()) && a.is_adjacent(&b)
            }
            _ => false,
        }
    }

    fn is_left(&self, other: &Self) -> bool {
        match (self.bounding, other.bounding) {
            (Some(a), Some(b)) => a.is_left(&b),
            _ => false,
        }
    }

    fn is_over_or_left(&self, other: &Self) -> bool {
        match (self.bounding, other.bounding) {
            (Some(a), Some(b)) => a.is_over_or_left(&b),
            _ => false,
        }
    }

    fn is_over_or_right(&self, other: &Self) -> bool {
        match (self.bounding, other.bounding) {
            (Some(a), Some(b)) => a.is_over_or_right(&b),
            _ => false,
        }
    }

    fn is_right(&self, other: &Self) -> bool {
        match (self.bounding, other.bounding) {
            (Some(a), Some(b)) => a.is_right(&b),
            _ => false,
        }
    }
}

impl<T: Copy + PartialOrd + Debug> BitAnd for SpanSet<T> {
    type Output = SpanSet<T>;

    fn bitand(self, other: Self) -> Self::Output {
        self.intersection(&other)
    }
}

impl<T: Copy + PartialOrd + Debug> BitOr for SpanSet<T> {
    type Output = SpanSet<T>;

    fn bitor(self, other: Self) -> Self::Output {
        self.union(&other)
    }
}

impl<T: Copy + PartialOrd + Debug> From<Span<T>> for SpanSet<T> {
    fn from(span: Span<T>) -> Self {
        Self::from_sorted(vec![span])
    }
}

impl<T: Debug> Debug for SpanSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{span:?}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(lower: f64, upper: f64) -> Span<f64> {
        Span::new(lower, upper, true, true).unwrap()
    }

    #[test]
    fn construction_merges_overlapping_members() {
        let set = SpanSet::new(vec![span(5.0, 8.0), span(1.0, 6.0)]);
        assert_eq!(set.num_spans(), 1);
        let bounding = set.bounding_span().unwrap();
        assert_eq!(bounding.lower(), 1.0);
        assert_eq!(bounding.upper(), 8.0);
    }

    #[test]
    fn find_value_binary_search() {
        let set = SpanSet::new(vec![span(1.0, 2.0), span(4.0, 5.0), span(8.0, 9.0)]);
        assert_eq!(set.find_value(&4.5), Some(1));
        assert_eq!(set.find_value(&3.0), None);
        assert!(set.contains(&8.0));
    }

    #[test]
    fn intersection_walk() {
        let a = SpanSet::new(vec![span(1.0, 4.0), span(6.0, 9.0)]);
        let b = SpanSet::new(vec![span(3.0, 7.0)]);
        let i = a.intersection(&b);
        assert_eq!(i.num_spans(), 2);
        assert_eq!(i.span_n(0).unwrap().upper(), 4.0);
        assert_eq!(i.span_n(1).unwrap().lower(), 6.0);
    }

    #[test]
    fn minus_removes_covered_parts() {
        let a = SpanSet::new(vec![span(1.0, 10.0)]);
        let b = SpanSet::new(vec![span(2.0, 3.0), span(5.0, 6.0)]);
        let rest = a.minus(&b);
        assert_eq!(rest.num_spans(), 3);
        assert!(!rest.contains(&2.5));
        assert!(rest.contains(&4.0));
        assert!(rest.contains(&9.0));
    }

    #[test]
    fn union_is_normalized() {
        let a = SpanSet::new(vec![span(1.0, 3.0)]);
        let b = SpanSet::new(vec![span(2.0, 5.0), span(7.0, 8.0)]);
        let u = a.union(&b);
        assert_eq!(u.num_spans(), 2);
        assert_eq!(u.start_span().unwrap().upper(), 5.0);
    }
}
