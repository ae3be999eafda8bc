use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};

use crate::boxes::r#box::BoundingBox;
use crate::collections::base::collection::Collection;
use crate::collections::base::span::Span;
use crate::collections::datetime::tstz_span_set::TsTzSpanSet;
use crate::errors::{TemporalError, TemporalResult};
use crate::temporal::base::BaseType;
use crate::temporal::interpolation::TInterpolation;
use crate::temporal::tinstant::TInstant;
use crate::temporal::tsequence::TSequence;
use crate::utils::format_timestamp;

/// An ordered collection of non-overlapping sequences of one base kind and
/// one interpolation, with the bounding box cached.
#[derive(Clone, PartialEq)]
pub struct TSequenceSet<B: BaseType> {
    sequences: Vec<TSequence<B>>,
    bbox: B::Bbox,
}

impl<B: BaseType> TSequenceSet<B> {
    /// Constructs a sequence set, validating order and joining mergeable
    /// neighbors.
    pub fn make(sequences: Vec<TSequence<B>>) -> TemporalResult<Self> {
        Self::make_inner(sequences, true)
    }

    /// [`TSequenceSet::make`] without the normalization pass.
    pub fn make_unnormalized(sequences: Vec<TSequence<B>>) -> TemporalResult<Self> {
        Self::make_inner(sequences, false)
    }

    fn make_inner(sequences: Vec<TSequence<B>>, normalize: bool) -> TemporalResult<Self> {
        if sequences.is_empty() {
            return Err(TemporalError::InvalidArg(
                "a sequence set must have at least one sequence".into(),
            ));
        }
        let interp = sequences[0].interpolation();
        if interp == TInterpolation::Discrete {
            return Err(TemporalError::InvalidArg(
                "a sequence set cannot hold discrete sequences".into(),
            ));
        }
        for seq in &sequences[1..] {
            if seq.interpolation() != interp {
                return Err(TemporalError::InvalidArg(
                    "all sequences of a set must share one interpolation".into(),
                ));
            }
        }
        for pair in sequences.windows(2) {
            let a = pair[0].tstzspan();
            let b = pair[1].tstzspan();
            let disjoint = a.upper() < b.lower()
                || (a.upper() == b.lower() && !(a.is_upper_inclusive() && b.is_lower_inclusive()));
            // Touching at a single shared instant is allowed when the two
            // sequences agree there; normalization joins them.
            let shared_instant = a.upper() == b.lower()
                && a.is_upper_inclusive()
                && b.is_lower_inclusive()
                && pair[0].end_value() == pair[1].start_value();
            if !disjoint && !shared_instant {
                return Err(TemporalError::InvariantViolation(format!(
                    "sequences of a set must not overlap: {}, {}",
                    format_timestamp(&a.upper()),
                    format_timestamp(&b.lower()),
                )));
            }
        }
        let sequences = Self::normalize_sequences_shared(sequences);
        let sequences = if normalize {
            Self::normalize_sequences(sequences)
        } else {
            sequences
        };
        let bbox = Self::compute_bbox(&sequences);
        Ok(Self { sequences, bbox })
    }

    /// Joins sequences that share their boundary instant, dropping the
    /// duplicate; runs even when normalization is suppressed so the
    /// disjointness invariant always holds on the result.
    fn normalize_sequences_shared(sequences: Vec<TSequence<B>>) -> Vec<TSequence<B>> {
        let mut result: Vec<TSequence<B>> = Vec::with_capacity(sequences.len());
        for seq in sequences {
            match result.last() {
                Some(last)
                    if last.end_timestamp() == seq.start_timestamp()
                        && last.is_upper_inclusive()
                        && seq.is_lower_inclusive() =>
                {
                    let prev = result.pop().expect("just matched");
                    result.push(prev.join(&seq, false, true));
                }
                _ => result.push(seq),
            }
        }
        result
    }

    /// Joins neighboring sequences whenever the junction instant is
    /// redundant: touching step sequences with a constant tail, touching
    /// sequences sharing the junction value, collinear junction segments.
    fn normalize_sequences(sequences: Vec<TSequence<B>>) -> Vec<TSequence<B>> {
        let linear = sequences[0].interpolation() == TInterpolation::Linear;
        let continuous = B::CONTINUOUS;
        let mut result: Vec<TSequence<B>> = Vec::with_capacity(sequences.len());
        let mut iter = sequences.into_iter();
        let mut current = iter.next().expect("validated non-empty");
        for next in iter {
            let span1 = current.tstzspan();
            let span2 = next.tstzspan();
            let adjacent = span1.upper() == span2.lower()
                && (span1.is_upper_inclusive() || span2.is_lower_inclusive());
            let last1 = current.end_instant().clone();
            let first1 = next.start_instant().clone();
            let last2 = (current.num_instants() > 1)
                .then(|| current.instant_n(current.num_instants() - 2).cloned())
                .flatten();
            let first2 = (next.num_instants() > 1)
                .then(|| next.instant_n(1).cloned())
                .flatten();
            let join_both = adjacent
                && last2.is_some()
                && first2.is_some()
                && {
                    let last2 = last2.as_ref().expect("checked");
                    let first2 = first2.as_ref().expect("checked");
                    // Step with a constant closing segment.
                    (!linear
                        && last2.value() == last1.value()
                        && last1.value() == first1.value())
                        // Constant and equal closing/opening segments.
                        || (last2.value() == last1.value()
                            && last1.value() == first1.value()
                            && first1.value() == first2.value())
                        // Collinear junction for continuous kinds.
                        || (continuous && last1.value() == first1.value() && {
                            let d1 = (first1.timestamp_micros() - last2.timestamp_micros()) as f64;
                            let d2 = (first2.timestamp_micros() - last2.timestamp_micros()) as f64;
                            last2
                                .value()
                                .collinear(first1.value(), first2.value(), d1 / d2)
                        })
                };
            if join_both {
                current = current.join(&next, true, true);
            } else if adjacent && !linear && !span1.is_upper_inclusive() {
                // A step sequence with exclusive upper bound ends in a
                // constant segment; the junction instant of the second
                // sequence replaces it.
                current = current.join(&next, true, false);
            } else if adjacent && last1.value() == first1.value() {
                current = current.join(&next, false, true);
            } else {
                result.push(current);
                current = next;
            }
        }
        result.push(current);
        result
    }

    fn compute_bbox(sequences: &[TSequence<B>]) -> B::Bbox {
        let mut bbox = sequences[0].bounding_box().clone();
        for seq in &sequences[1..] {
            bbox.expand(seq.bounding_box());
        }
        // The cached time dimension spans from the first to the last
        // sequence, bounds included as theirs.
        let first = sequences[0].tstzspan();
        let last = sequences[sequences.len() - 1].tstzspan();
        bbox.set_time(&Span::new_unchecked(
            first.lower(),
            last.upper(),
            first.is_lower_inclusive(),
            last.is_upper_inclusive(),
        ));
        bbox
    }

    /// Wraps one sequence.
    pub fn from_sequence(sequence: TSequence<B>) -> Self {
        let bbox = Self::compute_bbox(std::slice::from_ref(&sequence));
        Self { sequences: vec![sequence], bbox }
    }

    // ------------------------- Accessors -------------------------------------

    pub fn interpolation(&self) -> TInterpolation {
        self.sequences[0].interpolation()
    }

    pub fn num_sequences(&self) -> usize {
        self.sequences.len()
    }

    pub fn sequences(&self) -> &[TSequence<B>] {
        &self.sequences
    }

    pub fn sequence_n(&self, n: usize) -> Option<&TSequence<B>> {
        self.sequences.get(n)
    }

    pub fn start_sequence(&self) -> &TSequence<B> {
        &self.sequences[0]
    }

    pub fn end_sequence(&self) -> &TSequence<B> {
        &self.sequences[self.sequences.len() - 1]
    }

    pub fn num_instants(&self) -> usize {
        self.sequences.iter().map(|s| s.num_instants()).sum()
    }

    pub fn instants(&self) -> Vec<&TInstant<B>> {
        self.sequences
            .iter()
            .flat_map(|s| s.instants().iter())
            .collect()
    }

    pub fn start_value(&self) -> &B {
        self.start_sequence().start_value()
    }

    pub fn end_value(&self) -> &B {
        self.end_sequence().end_value()
    }

    pub fn start_timestamp(&self) -> DateTime<Utc> {
        self.start_sequence().start_timestamp()
    }

    pub fn end_timestamp(&self) -> DateTime<Utc> {
        self.end_sequence().end_timestamp()
    }

    pub fn bounding_box(&self) -> &B::Bbox {
        &self.bbox
    }

    /// The support of the set: one period per sequence.
    pub fn time(&self) -> TsTzSpanSet {
        TsTzSpanSet::from_sorted(self.sequences.iter().map(|s| s.tstzspan()).collect())
    }

    /// Total duration over the support, or over the bounding period with
    /// `ignore_gaps`.
    pub fn duration(&self, ignore_gaps: bool) -> TimeDelta {
        if ignore_gaps {
            self.end_timestamp() - self.start_timestamp()
        } else {
            self.sequences
                .iter()
                .fold(TimeDelta::zero(), |acc, s| acc + s.duration())
        }
    }

    pub fn distinct_values(&self) -> Vec<B> {
        let mut result: Vec<B> = Vec::new();
        for seq in &self.sequences {
            for value in seq.distinct_values() {
                if !result.iter().any(|v| v == &value) {
                    result.push(value);
                }
            }
        }
        result
    }

    pub fn min_instant(&self) -> &TInstant<B>
    where
        B: PartialOrd,
    {
        self.sequences
            .iter()
            .map(|s| s.min_instant())
            .reduce(|best, inst| if inst.value() < best.value() { inst } else { best })
            .expect("sets are non-empty")
    }

    pub fn max_instant(&self) -> &TInstant<B>
    where
        B: PartialOrd,
    {
        self.sequences
            .iter()
            .map(|s| s.max_instant())
            .reduce(|best, inst| if inst.value() > best.value() { inst } else { best })
            .expect("sets are non-empty")
    }

    /// The value at `t`, searching the containing sequence by binary
    /// search over the member periods.
    pub fn value_at_timestamp(&self, t: DateTime<Utc>) -> Option<B> {
        let mut lo = 0usize;
        let mut hi = self.sequences.len();
        while lo < hi {
            let mid = (lo + hi) / 2;
            let span = self.sequences[mid].tstzspan();
            if span.contains(&t) {
                return self.sequences[mid].value_at_timestamp(t);
            }
            if t < span.lower() || (t == span.lower() && !span.is_lower_inclusive()) {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        None
    }

    // ------------------------- Transformations --------------------------------

    /// Translates and/or rescales the whole set in time, sequences scaled
    /// proportionally inside the new bounding period.
    pub fn shift_scale(&self, shift: Option<TimeDelta>, duration: Option<TimeDelta>) -> Self {
        let old_lower = self.start_timestamp();
        let old_upper = self.end_timestamp();
        let mut new_lower = old_lower;
        let mut new_upper = old_upper;
        if let Some(delta) = shift {
            new_lower += delta;
            new_upper += delta;
        }
        let instantaneous = old_lower == old_upper;
        if let Some(width) = duration {
            if !instantaneous {
                new_upper = new_lower + width;
            }
        }
        let scale = if instantaneous {
            1.0
        } else {
            ((new_upper - new_lower).num_microseconds().unwrap_or(1) as f64)
                / ((old_upper - old_lower).num_microseconds().unwrap_or(1) as f64)
        };
        let remap = |t: DateTime<Utc>| {
            let offset = (t - old_lower).num_microseconds().unwrap_or(0) as f64;
            new_lower + TimeDelta::microseconds((offset * scale).round() as i64)
        };
        let sequences = self
            .sequences
            .iter()
            .map(|seq| {
                let instants = seq
                    .instants()
                    .iter()
                    .map(|inst| inst.at(remap(inst.timestamp())))
                    .collect();
                TSequence::make_unnormalized(
                    instants,
                    seq.is_lower_inclusive(),
                    seq.is_upper_inclusive(),
                    seq.interpolation(),
                )
                .expect("remapping preserves ordering")
            })
            .collect();
        Self::make_inner(sequences, false).expect("remapping preserves disjointness")
    }

    // ------------------------- Ever/always -----------------------------------

    pub fn ever_eq(&self, value: &B) -> bool {
        self.sequences.iter().any(|s| s.ever_eq(value))
    }

    pub fn always_eq(&self, value: &B) -> bool {
        self.sequences.iter().all(|s| s.always_eq(value))
    }

    pub fn ever_lt(&self, value: &B) -> bool
    where
        B: PartialOrd,
    {
        self.sequences.iter().any(|s| s.ever_lt(value))
    }

    pub fn always_le(&self, value: &B) -> bool
    where
        B: PartialOrd,
    {
        self.sequences.iter().all(|s| s.always_le(value))
    }
}

impl<B: BaseType> fmt::Display for TSequenceSet<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, seq) in self.sequences.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{seq}")?;
        }
        write!(f, "}}")
    }
}

impl<B: BaseType> fmt::Debug for TSequenceSet<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, h, 0, 0).unwrap()
    }

    fn seq(values: &[(f64, u32)], lower_inc: bool, upper_inc: bool) -> TSequence<f64> {
        TSequence::make(
            values.iter().map(|&(v, h)| TInstant::new(v, t(h))).collect(),
            lower_inc,
            upper_inc,
            TInterpolation::Linear,
        )
        .unwrap()
    }

    #[test]
    fn overlapping_sequences_are_rejected() {
        let a = seq(&[(1.0, 0), (2.0, 2)], true, true);
        let b = seq(&[(5.0, 1), (6.0, 3)], true, true);
        assert!(TSequenceSet::make(vec![a, b]).is_err());
    }

    #[test]
    fn touching_sequences_with_shared_value_join() {
        let a = seq(&[(1.0, 0), (2.0, 2)], true, true);
        let b = seq(&[(2.0, 2), (1.0, 4)], false, true);
        let set = TSequenceSet::make(vec![a, b]).unwrap();
        assert_eq!(set.num_sequences(), 1);
        assert_eq!(set.start_sequence().num_instants(), 3);
    }

    #[test]
    fn gap_keeps_sequences_apart() {
        let a = seq(&[(1.0, 0), (2.0, 1)], true, true);
        let b = seq(&[(5.0, 3), (6.0, 4)], true, true);
        let set = TSequenceSet::make(vec![a, b]).unwrap();
        assert_eq!(set.num_sequences(), 2);
        assert_eq!(set.time().num_spans(), 2);
        assert_eq!(set.duration(false), TimeDelta::hours(2));
        assert_eq!(set.duration(true), TimeDelta::hours(4));
    }

    #[test]
    fn value_at_timestamp_searches_members() {
        let a = seq(&[(1.0, 0), (3.0, 2)], true, true);
        let b = seq(&[(10.0, 4), (20.0, 6)], true, true);
        let set = TSequenceSet::make(vec![a, b]).unwrap();
        assert_eq!(set.value_at_timestamp(t(1)), Some(2.0));
        assert_eq!(set.value_at_timestamp(t(5)), Some(15.0));
        assert_eq!(set.value_at_timestamp(t(3)), None);
    }

    #[test]
    fn min_max_over_members() {
        let a = seq(&[(5.0, 0), (3.0, 2)], true, true);
        let b = seq(&[(10.0, 4), (1.0, 6)], true, true);
        let set = TSequenceSet::make(vec![a, b]).unwrap();
        assert_eq!(set.min_instant().value(), &1.0);
        assert_eq!(set.max_instant().value(), &10.0);
    }
}
