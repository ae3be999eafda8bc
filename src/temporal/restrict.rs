use chrono::{DateTime, Utc};

use crate::collections::base::collection::Collection;
use crate::collections::datetime::tstz_set::TsTzSet;
use crate::collections::datetime::tstz_span::TsTzSpan;
use crate::collections::datetime::tstz_span_set::TsTzSpanSet;
use crate::temporal::base::BaseType;
use crate::temporal::interpolation::TInterpolation;
use crate::temporal::segment::{segment_intersection_value, segment_value_at};
use crate::temporal::temporal::Temporal;
use crate::temporal::tinstant::TInstant;
use crate::temporal::tsequence::TSequence;
use crate::temporal::tsequence_set::TSequenceSet;

/// Restricts one segment to (the complement of) a base value, producing up
/// to two pieces. Linear interpolation may split at a crossing strictly
/// inside the segment; minus keeps exclusive bounds at the cut.
#[allow(clippy::too_many_arguments)]
fn segment_restrict_value<B: BaseType>(
    inst1: &TInstant<B>,
    inst2: &TInstant<B>,
    linear: bool,
    lower_inc: bool,
    upper_inc: bool,
    value: &B,
    at: bool,
) -> Vec<TSequence<B>> {
    let interp = if linear { TInterpolation::Linear } else { TInterpolation::Stepwise };
    let constant = inst1.value() == inst2.value();
    let lower = if at { inst1.value().eq_tol(value) } else { !inst1.value().eq_tol(value) };
    let upper = if at { inst2.value().eq_tol(value) } else { !inst2.value().eq_tol(value) };
    let crossing = (linear && !constant)
        .then(|| segment_intersection_value(inst1, inst2, value))
        .flatten();

    // The whole segment misses the answer.
    if (constant && !lower)
        || (!constant
            && at
            && linear
            && ((lower && !lower_inc) || (upper && !upper_inc))
            && crossing.is_none()
            && !(lower && lower_inc)
            && !(upper && upper_inc))
        || (!constant && at && linear && !lower && !upper && crossing.is_none())
    {
        return vec![];
    }

    // The whole segment belongs to the answer, modulo bound tweaks.
    if (constant && lower)
        || (!constant && linear && !at && (!lower || !upper || crossing.is_none()))
    {
        let mut bounds = (lower_inc, upper_inc);
        if !constant && !at {
            bounds = (lower_inc && lower, upper_inc && upper);
        }
        let seq = TSequence::make_unnormalized(
            vec![inst1.clone(), inst2.clone()],
            bounds.0,
            bounds.1,
            interp,
        );
        return seq.into_iter().collect();
    }

    // Step interpolation: split at the instants.
    if !linear {
        let mut result = Vec::with_capacity(2);
        if lower {
            let pieces = vec![inst1.clone(), inst2.with_value(inst1.value().clone())];
            if let Ok(seq) = TSequence::make_unnormalized(pieces, lower_inc, false, interp) {
                result.push(seq);
            }
        }
        if upper_inc && upper {
            result.push(TSequence::from_instant(inst2.clone(), interp));
        }
        return result;
    }

    // Linear interpolation, at: a bound matches.
    if at && ((lower && lower_inc) || (upper && upper_inc)) {
        let inst = if lower { inst1 } else { inst2 };
        return vec![TSequence::from_instant(inst.clone(), interp)];
    }

    let Some((projected, t)) = crossing else {
        return vec![];
    };

    if at {
        return vec![TSequence::from_instant(
            TInstant::new(projected, t),
            interp,
        )];
    }

    // Minus with an interior crossing: roundoff may land the crossing on a
    // bound, in which case only the bound's inclusivity flips.
    if t == inst1.timestamp() {
        if !lower_inc {
            return vec![];
        }
        return TSequence::make_unnormalized(
            vec![inst1.clone(), inst2.clone()],
            false,
            upper_inc,
            interp,
        )
        .into_iter()
        .collect();
    }
    if t == inst2.timestamp() {
        if !upper_inc {
            return vec![];
        }
        return TSequence::make_unnormalized(
            vec![inst1.clone(), inst2.clone()],
            lower_inc,
            false,
            interp,
        )
        .into_iter()
        .collect();
    }
    let cut = TInstant::new(projected, t);
    let mut result = Vec::with_capacity(2);
    if let Ok(seq) = TSequence::make_unnormalized(
        vec![inst1.clone(), cut.clone()],
        lower_inc,
        false,
        interp,
    ) {
        result.push(seq);
    }
    if let Ok(seq) =
        TSequence::make_unnormalized(vec![cut, inst2.clone()], false, upper_inc, interp)
    {
        result.push(seq);
    }
    result
}

impl<B: BaseType> TSequence<B> {
    /// Restricts the sequence to (the complement of) a base value.
    pub(crate) fn restrict_value(&self, value: &B, at: bool) -> Vec<TSequence<B>> {
        // Discrete: keep the matching (or non-matching) instants.
        if self.interpolation() == TInterpolation::Discrete {
            let kept: Vec<TInstant<B>> = self
                .instants()
                .iter()
                .filter(|inst| inst.value().eq_tol(value) == at)
                .cloned()
                .collect();
            return TSequence::make(kept, true, true, TInterpolation::Discrete)
                .into_iter()
                .collect();
        }
        if self.num_instants() == 1 {
            let equal = self.start_value().eq_tol(value);
            if equal != at {
                return vec![];
            }
            return vec![self.clone()];
        }
        let linear = self.interpolation() == TInterpolation::Linear;
        let instants = self.instants();
        let mut result = Vec::new();
        for (i, pair) in instants.windows(2).enumerate() {
            let lower_inc = if i == 0 { self.is_lower_inclusive() } else { true };
            let upper_inc =
                if i == instants.len() - 2 { self.is_upper_inclusive() } else { false };
            result.extend(segment_restrict_value(
                &pair[0], &pair[1], linear, lower_inc, upper_inc, value, at,
            ));
        }
        result
    }

    /// The instant taken at `t`, `None` outside the sequence.
    pub fn at_timestamp(&self, t: DateTime<Utc>) -> Option<TInstant<B>> {
        self.value_at_timestamp(t).map(|v| TInstant::new(v, t))
    }

    /// Restricts the sequence to a period.
    pub(crate) fn at_tstzspan(&self, span: &TsTzSpan) -> Option<TSequence<B>> {
        if self.interpolation() == TInterpolation::Discrete {
            let kept: Vec<TInstant<B>> = self
                .instants()
                .iter()
                .filter(|inst| span.contains(&inst.timestamp()))
                .cloned()
                .collect();
            return TSequence::make(kept, true, true, TInterpolation::Discrete).ok();
        }
        let inter = self.tstzspan().intersection(span)?;
        // Values at the cut bounds are taken inclusively: a bound instant
        // is materialized even when the bound excludes it.
        let value_at_inc = |t: DateTime<Utc>| -> B {
            if t == self.start_timestamp() {
                self.start_value().clone()
            } else if t == self.end_timestamp() {
                self.end_value().clone()
            } else {
                self.value_at_timestamp(t)
                    .expect("bound lies inside the sequence")
            }
        };
        if inter.is_singleton() {
            let inst = TInstant::new(value_at_inc(inter.lower()), inter.lower());
            return Some(TSequence::from_instant(inst, self.interpolation()));
        }
        let linear = self.interpolation() == TInterpolation::Linear;
        let mut instants: Vec<TInstant<B>> = Vec::new();
        instants.push(TInstant::new(value_at_inc(inter.lower()), inter.lower()));
        for inst in self.instants() {
            if inst.timestamp() > inter.lower() && inst.timestamp() < inter.upper() {
                instants.push(inst.clone());
            }
        }
        let upper_value = if linear || inter.is_upper_inclusive() {
            value_at_inc(inter.upper())
        } else {
            // A step sequence truncated at an exclusive bound keeps the
            // value held just before it.
            let previous = instants.last().expect("lower bound pushed above");
            segment_value_at(previous, previous, false, inter.upper())
        };
        instants.push(TInstant::new(upper_value, inter.upper()));
        TSequence::make(
            instants,
            inter.is_lower_inclusive(),
            inter.is_upper_inclusive(),
            self.interpolation(),
        )
        .ok()
    }

    /// Restricts the sequence to the complement of a period.
    pub(crate) fn minus_tstzspan(&self, span: &TsTzSpan) -> Vec<TSequence<B>> {
        let rest = TsTzSpanSet::from(self.tstzspan()).minus(&TsTzSpanSet::from(*span));
        rest.spans()
            .iter()
            .filter_map(|piece| self.at_tstzspan(piece))
            .collect()
    }
}

impl<B: BaseType> Temporal<B> {
    fn collect_sequences(&self, pieces: Vec<TSequence<B>>) -> Option<Temporal<B>> {
        match pieces.len() {
            0 => None,
            1 => Some(Temporal::Sequence(pieces.into_iter().next().expect("len is 1"))),
            _ => TSequenceSet::make(pieces).ok().map(Temporal::SequenceSet),
        }
    }

    /// Restricts the value to the instants where it equals `value`.
    pub fn at_value(&self, value: &B) -> Option<Temporal<B>> {
        match self {
            Temporal::Instant(i) => i.value().eq_tol(value).then(|| self.clone()),
            Temporal::Sequence(s) => {
                let pieces = s.restrict_value(value, true);
                if s.interpolation() == TInterpolation::Discrete {
                    return pieces.into_iter().next().map(Temporal::Sequence);
                }
                self.collect_sequences(pieces)
            }
            Temporal::SequenceSet(s) => {
                let pieces: Vec<TSequence<B>> = s
                    .sequences()
                    .iter()
                    .flat_map(|seq| seq.restrict_value(value, true))
                    .collect();
                self.collect_sequences(pieces)
            }
        }
    }

    /// Restricts the value to the instants where it differs from `value`.
    pub fn minus_value(&self, value: &B) -> Option<Temporal<B>> {
        match self {
            Temporal::Instant(i) => (!i.value().eq_tol(value)).then(|| self.clone()),
            Temporal::Sequence(s) => {
                let pieces = s.restrict_value(value, false);
                if s.interpolation() == TInterpolation::Discrete {
                    return pieces.into_iter().next().map(Temporal::Sequence);
                }
                self.collect_sequences(pieces)
            }
            Temporal::SequenceSet(s) => {
                let pieces: Vec<TSequence<B>> = s
                    .sequences()
                    .iter()
                    .flat_map(|seq| seq.restrict_value(value, false))
                    .collect();
                self.collect_sequences(pieces)
            }
        }
    }

    /// Restricts to any of the listed values.
    pub fn at_values(&self, values: &[B]) -> Option<Temporal<B>> {
        let mut pieces: Vec<Temporal<B>> =
            values.iter().filter_map(|v| self.at_value(v)).collect();
        match pieces.len() {
            0 => None,
            1 => pieces.pop(),
            _ => Temporal::merge_array(pieces).ok(),
        }
    }

    /// Restricts to the complement of all listed values.
    pub fn minus_values(&self, values: &[B]) -> Option<Temporal<B>> {
        let mut current = self.clone();
        for value in values {
            current = current.minus_value(value)?;
        }
        Some(current)
    }

    /// The instant at `t`, if the value is defined there.
    pub fn at_timestamp(&self, t: DateTime<Utc>) -> Option<TInstant<B>> {
        self.value_at_timestamp(t).map(|v| TInstant::new(v, t))
    }

    /// Removes the instant at `t`.
    pub fn minus_timestamp(&self, t: DateTime<Utc>) -> Option<Temporal<B>> {
        let span = crate::collections::base::span::Span::singleton(t);
        self.minus_tstzspan_inner(&span)
    }

    /// Restricts to the listed timestamps, producing a discrete value.
    pub fn at_tstzset(&self, set: &TsTzSet) -> Option<Temporal<B>> {
        let instants: Vec<TInstant<B>> = set
            .elements()
            .iter()
            .filter_map(|&t| self.at_timestamp(t))
            .collect();
        if instants.is_empty() {
            return None;
        }
        if instants.len() == 1 {
            return Some(Temporal::Instant(instants.into_iter().next().expect("len is 1")));
        }
        TSequence::make(instants, true, true, TInterpolation::Discrete)
            .ok()
            .map(Temporal::Sequence)
    }

    /// Removes the listed timestamps.
    pub fn minus_tstzset(&self, set: &TsTzSet) -> Option<Temporal<B>> {
        let mut current = self.clone();
        for &t in set.elements() {
            current = current.minus_timestamp(t)?;
        }
        Some(current)
    }

    /// Restricts to a period.
    pub fn at_tstzspan(&self, span: &TsTzSpan) -> Option<Temporal<B>> {
        match self {
            Temporal::Instant(i) => span.contains(&i.timestamp()).then(|| self.clone()),
            Temporal::Sequence(s) => s.at_tstzspan(span).map(Temporal::Sequence),
            Temporal::SequenceSet(s) => {
                let pieces: Vec<TSequence<B>> = s
                    .sequences()
                    .iter()
                    .filter_map(|seq| seq.at_tstzspan(span))
                    .collect();
                self.collect_sequences(pieces)
            }
        }
    }

    fn minus_tstzspan_inner(&self, span: &TsTzSpan) -> Option<Temporal<B>> {
        match self {
            Temporal::Instant(i) => (!span.contains(&i.timestamp())).then(|| self.clone()),
            Temporal::Sequence(s) => {
                if s.interpolation() == TInterpolation::Discrete {
                    let kept: Vec<TInstant<B>> = s
                        .instants()
                        .iter()
                        .filter(|inst| !span.contains(&inst.timestamp()))
                        .cloned()
                        .collect();
                    if kept.is_empty() {
                        return None;
                    }
                    return TSequence::make(kept, true, true, TInterpolation::Discrete)
                        .ok()
                        .map(Temporal::Sequence);
                }
                self.collect_sequences(s.minus_tstzspan(span))
            }
            Temporal::SequenceSet(s) => {
                let pieces: Vec<TSequence<B>> = s
                    .sequences()
                    .iter()
                    .flat_map(|seq| seq.minus_tstzspan(span))
                    .collect();
                self.collect_sequences(pieces)
            }
        }
    }

    /// Restricts to the complement of a period.
    pub fn minus_tstzspan(&self, span: &TsTzSpan) -> Option<Temporal<B>> {
        self.minus_tstzspan_inner(span)
    }

    /// Restricts to a period set.
    pub fn at_tstzspanset(&self, spans: &TsTzSpanSet) -> Option<Temporal<B>> {
        let mut pieces: Vec<Temporal<B>> = spans
            .spans()
            .iter()
            .filter_map(|span| self.at_tstzspan(span))
            .collect();
        match pieces.len() {
            0 => None,
            1 => pieces.pop(),
            _ => Temporal::merge_array(pieces).ok(),
        }
    }

    /// Restricts to the complement of a period set.
    pub fn minus_tstzspanset(&self, spans: &TsTzSpanSet) -> Option<Temporal<B>> {
        let mut current = self.clone();
        for span in spans.spans() {
            current = current.minus_tstzspan(span)?;
        }
        Some(current)
    }

    /// Restricts to the instants holding the minimum value.
    pub fn at_min(&self) -> Option<Temporal<B>>
    where
        B: PartialOrd,
    {
        let min = self.min_value();
        self.at_value(&min)
    }

    /// Restricts to the instants holding the maximum value.
    pub fn at_max(&self) -> Option<Temporal<B>>
    where
        B: PartialOrd,
    {
        let max = self.max_value();
        self.at_value(&max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, h, 0, 0).unwrap()
    }

    fn linear(values: &[(f64, u32)]) -> Temporal<f64> {
        Temporal::Sequence(
            TSequence::make(
                values.iter().map(|&(v, h)| TInstant::new(v, t(h))).collect(),
                true,
                true,
                TInterpolation::Linear,
            )
            .unwrap(),
        )
    }

    fn step(values: &[(f64, u32)]) -> Temporal<f64> {
        Temporal::Sequence(
            TSequence::make(
                values.iter().map(|&(v, h)| TInstant::new(v, t(h))).collect(),
                true,
                true,
                TInterpolation::Stepwise,
            )
            .unwrap(),
        )
    }

    #[test]
    fn linear_at_value_hits_the_crossing() {
        // [1@t0, 3@t2] at 2 => {2@t1}
        let x = linear(&[(1.0, 0), (3.0, 2)]);
        let at = x.at_value(&2.0).unwrap();
        assert_eq!(at.num_instants(), 1);
        assert_eq!(at.start_timestamp(), t(1));
        assert!((at.start_value() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn step_at_value_interior_is_empty() {
        let x = step(&[(1.0, 0), (3.0, 2)]);
        assert!(x.at_value(&2.0).is_none());
        let at = x.at_value(&1.0).unwrap();
        assert_eq!(at.start_timestamp(), t(0));
        assert_eq!(at.end_timestamp(), t(2));
    }

    #[test]
    fn minus_value_splits_with_exclusive_bounds() {
        let x = linear(&[(1.0, 0), (3.0, 2)]);
        let rest = x.minus_value(&2.0).unwrap();
        match rest {
            Temporal::SequenceSet(s) => {
                assert_eq!(s.num_sequences(), 2);
                assert!(!s.sequence_n(0).unwrap().is_upper_inclusive());
                assert!(!s.sequence_n(1).unwrap().is_lower_inclusive());
            }
            other => panic!("expected a split, got {other:?}"),
        }
    }

    #[test]
    fn at_and_minus_period_cover_the_support() {
        let x = linear(&[(1.0, 0), (5.0, 4)]);
        let span: TsTzSpan = (t(1)..=t(2)).into();
        let at = x.at_tstzspan(&span).unwrap();
        let minus = x.minus_tstzspan(&span).unwrap();
        assert_eq!(at.value_at_timestamp(t(1)), Some(2.0));
        assert_eq!(at.value_at_timestamp(t(2)), Some(3.0));
        assert_eq!(minus.value_at_timestamp(t(1)), None);
        assert_eq!(minus.value_at_timestamp(t(3)), Some(4.0));
        // at ∪ minus covers the original support.
        let union = at.time().union(&minus.time());
        assert_eq!(union.bounding_span().unwrap(), x.tstzspan());
    }

    #[test]
    fn at_timestamp_interpolates() {
        let x = linear(&[(1.0, 0), (3.0, 2)]);
        let inst = x.at_timestamp(t(1)).unwrap();
        assert_eq!(inst.value(), &2.0);
        assert!(x.at_timestamp(t(9)).is_none());
    }

    #[test]
    fn at_tstzset_makes_a_discrete_value() {
        let x = linear(&[(1.0, 0), (5.0, 4)]);
        let set = TsTzSet::new(vec![t(1), t(3)]).unwrap();
        let at = x.at_tstzset(&set).unwrap();
        assert_eq!(at.interpolation(), TInterpolation::Discrete);
        assert_eq!(at.values(), vec![2.0, 4.0]);
    }

    #[test]
    fn at_min_and_max() {
        let x = linear(&[(3.0, 0), (1.0, 2), (4.0, 4)]);
        let min = x.at_min().unwrap();
        assert_eq!(min.start_timestamp(), t(2));
        let max = x.at_max().unwrap();
        assert_eq!(max.start_timestamp(), t(4));
    }

    #[test]
    fn discrete_at_value_filters_instants() {
        let x = Temporal::Sequence(
            TSequence::make(
                vec![
                    TInstant::new(1.0, t(0)),
                    TInstant::new(2.0, t(1)),
                    TInstant::new(1.0, t(2)),
                ],
                true,
                true,
                TInterpolation::Discrete,
            )
            .unwrap(),
        );
        let at = x.at_value(&1.0).unwrap();
        assert_eq!(at.num_instants(), 2);
        let minus = x.minus_value(&1.0).unwrap();
        assert_eq!(minus.num_instants(), 1);
    }
}
