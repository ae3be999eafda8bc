use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};

use crate::boxes::r#box::BoundingBox;
use crate::collections::base::collection::Collection;
use crate::collections::base::span::Span;
use crate::collections::datetime::tstz_span::TsTzSpan;
use crate::errors::{TemporalError, TemporalResult};
use crate::temporal::base::BaseType;
use crate::temporal::interpolation::TInterpolation;
use crate::temporal::segment;
use crate::temporal::temporal::Temporal;
use crate::temporal::tinstant::TInstant;
use crate::temporal::tsequence_set::TSequenceSet;
use crate::utils::format_timestamp;

/// An ordered sequence of instants over one base kind, with explicit bound
/// inclusivity and one interpolation mode. Discrete collections are
/// sequences with [`TInterpolation::Discrete`].
///
/// A sequence is kept in normalized form: no three collinear linear
/// instants, no redundant step repetition.
#[derive(Clone, PartialEq)]
pub struct TSequence<B: BaseType> {
    instants: Vec<TInstant<B>>,
    lower_inc: bool,
    upper_inc: bool,
    interp: TInterpolation,
    bbox: B::Bbox,
}

/// Drops the instants made redundant by their neighbors, the normalization
/// of the data model: a step repetition `1@t1, 1@t2, 2@t3` loses `1@t2`,
/// three equal or collinear linear instants lose the middle one.
pub(crate) fn normalize_instants<B: BaseType>(
    instants: Vec<TInstant<B>>,
    linear: bool,
) -> Vec<TInstant<B>> {
    if instants.len() < 3 {
        return instants;
    }
    let mut result: Vec<TInstant<B>> = Vec::with_capacity(instants.len());
    let mut iter = instants.into_iter();
    let mut inst1 = iter.next().expect("len checked");
    let mut inst2 = iter.next().expect("len checked");
    result.push(inst1.clone());
    for inst3 in iter {
        let redundant = (!linear && inst1.value() == inst2.value())
            || (linear && inst1.value() == inst2.value() && inst2.value() == inst3.value())
            || (linear && {
                let d1 = (inst2.timestamp_micros() - inst1.timestamp_micros()) as f64;
                let d2 = (inst3.timestamp_micros() - inst1.timestamp_micros()) as f64;
                inst1
                    .value()
                    .collinear(inst2.value(), inst3.value(), d1 / d2)
            });
        if redundant {
            inst2 = inst3;
        } else {
            result.push(inst2.clone());
            inst1 = inst2;
            inst2 = inst3;
        }
    }
    result.push(inst2);
    result
}

impl<B: BaseType> TSequence<B> {
    /// Constructs a sequence, validating the invariants and normalizing.
    pub fn make(
        instants: Vec<TInstant<B>>,
        lower_inc: bool,
        upper_inc: bool,
        interp: TInterpolation,
    ) -> TemporalResult<Self> {
        Self::make_inner(instants, lower_inc, upper_inc, interp, true)
    }

    /// [`TSequence::make`] with normalization suppressed.
    pub fn make_unnormalized(
        instants: Vec<TInstant<B>>,
        lower_inc: bool,
        upper_inc: bool,
        interp: TInterpolation,
    ) -> TemporalResult<Self> {
        Self::make_inner(instants, lower_inc, upper_inc, interp, false)
    }

    fn make_inner(
        instants: Vec<TInstant<B>>,
        lower_inc: bool,
        upper_inc: bool,
        interp: TInterpolation,
        normalize: bool,
    ) -> TemporalResult<Self> {
        if instants.is_empty() {
            return Err(TemporalError::InvalidArg(
                "a sequence must have at least one instant".into(),
            ));
        }
        if interp == TInterpolation::Linear && !B::CONTINUOUS {
            return Err(TemporalError::InterpolationIllegal(format!(
                "linear interpolation is not defined for {}",
                instants[0].value().temp_type().name(),
            )));
        }
        for pair in instants.windows(2) {
            if pair[0].timestamp() >= pair[1].timestamp() {
                return Err(TemporalError::InvariantViolation(format!(
                    "timestamps for temporal value must be increasing: {}, {}",
                    format_timestamp(&pair[0].timestamp()),
                    format_timestamp(&pair[1].timestamp()),
                )));
            }
            pair[0].value().ensure_compatible(pair[1].value())?;
        }
        if (instants.len() == 1 || interp == TInterpolation::Discrete)
            && !(lower_inc && upper_inc)
        {
            return Err(TemporalError::InvariantViolation(
                "instantaneous and discrete sequences must have inclusive bounds".into(),
            ));
        }
        if interp == TInterpolation::Stepwise && !upper_inc && instants.len() > 1 {
            let last = &instants[instants.len() - 1];
            let penultimate = &instants[instants.len() - 2];
            if last.value() != penultimate.value() {
                return Err(TemporalError::InvariantViolation(
                    "a step sequence with exclusive upper bound must end in two equal values"
                        .into(),
                ));
            }
        }
        let instants = if normalize && instants.len() > 2 {
            normalize_instants(instants, interp == TInterpolation::Linear)
        } else {
            instants
        };
        let bbox = Self::compute_bbox(&instants, lower_inc, upper_inc);
        Ok(Self { instants, lower_inc, upper_inc, interp, bbox })
    }

    fn compute_bbox(instants: &[TInstant<B>], lower_inc: bool, upper_inc: bool) -> B::Bbox {
        let first = &instants[0];
        let last = &instants[instants.len() - 1];
        let mut bbox = first.value().instant_bbox(first.timestamp());
        for inst in &instants[1..] {
            inst.value().expand_bbox(&mut bbox, inst.timestamp());
        }
        bbox.set_time(&Span::new_unchecked(
            first.timestamp(),
            last.timestamp(),
            lower_inc,
            upper_inc,
        ));
        bbox
    }

    /// Wraps a single instant into a sequence of the given interpolation.
    pub fn from_instant(instant: TInstant<B>, interp: TInterpolation) -> Self {
        Self::make_inner(vec![instant], true, true, interp, false)
            .expect("a singleton sequence is always valid")
    }

    // ------------------------- Accessors -------------------------------------

    pub fn interpolation(&self) -> TInterpolation {
        self.interp
    }

    pub fn is_lower_inclusive(&self) -> bool {
        self.lower_inc
    }

    pub fn is_upper_inclusive(&self) -> bool {
        self.upper_inc
    }

    pub fn num_instants(&self) -> usize {
        self.instants.len()
    }

    pub fn instants(&self) -> &[TInstant<B>] {
        &self.instants
    }

    pub fn instant_n(&self, n: usize) -> Option<&TInstant<B>> {
        self.instants.get(n)
    }

    pub fn start_instant(&self) -> &TInstant<B> {
        &self.instants[0]
    }

    pub fn end_instant(&self) -> &TInstant<B> {
        &self.instants[self.instants.len() - 1]
    }

    pub fn start_value(&self) -> &B {
        self.instants[0].value()
    }

    pub fn end_value(&self) -> &B {
        self.instants[self.instants.len() - 1].value()
    }

    pub fn start_timestamp(&self) -> DateTime<Utc> {
        self.instants[0].timestamp()
    }

    pub fn end_timestamp(&self) -> DateTime<Utc> {
        self.instants[self.instants.len() - 1].timestamp()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.instants.iter().map(|i| i.timestamp()).collect()
    }

    pub fn bounding_box(&self) -> &B::Bbox {
        &self.bbox
    }

    /// The period covered by the sequence.
    pub fn tstzspan(&self) -> TsTzSpan {
        Span::new_unchecked(
            self.start_timestamp(),
            self.end_timestamp(),
            self.lower_inc,
            self.upper_inc,
        )
    }

    /// Total duration; zero for discrete sequences.
    pub fn duration(&self) -> TimeDelta {
        if self.interp == TInterpolation::Discrete {
            TimeDelta::zero()
        } else {
            self.end_timestamp() - self.start_timestamp()
        }
    }

    /// The distinct base values taken, in first-appearance order.
    pub fn distinct_values(&self) -> Vec<B> {
        let mut result: Vec<B> = Vec::new();
        for inst in &self.instants {
            if !result.iter().any(|v| v == inst.value()) {
                result.push(inst.value().clone());
            }
        }
        result
    }

    /// The instant holding the smallest value.
    pub fn min_instant(&self) -> &TInstant<B>
    where
        B: PartialOrd,
    {
        self.instants
            .iter()
            .reduce(|best, inst| if inst.value() < best.value() { inst } else { best })
            .expect("sequences are non-empty")
    }

    /// The instant holding the largest value.
    pub fn max_instant(&self) -> &TInstant<B>
    where
        B: PartialOrd,
    {
        self.instants
            .iter()
            .reduce(|best, inst| if inst.value() > best.value() { inst } else { best })
            .expect("sequences are non-empty")
    }

    /// The segments of a continuous sequence, one per adjacent instant pair.
    pub fn segments(&self) -> Vec<TSequence<B>> {
        if self.instants.len() < 2 || self.interp == TInterpolation::Discrete {
            return vec![self.clone()];
        }
        let mut result = Vec::with_capacity(self.instants.len() - 1);
        for (i, pair) in self.instants.windows(2).enumerate() {
            let lower_inc = if i == 0 { self.lower_inc } else { true };
            let upper_inc = if i == self.instants.len() - 2 { self.upper_inc } else { false };
            let pair = match self.interp {
                // A step segment keeps the start value up to its end.
                TInterpolation::Stepwise => {
                    vec![pair[0].clone(), pair[1].with_value(pair[0].value().clone())]
                }
                _ => pair.to_vec(),
            };
            result.push(
                Self::make_inner(pair, lower_inc, upper_inc, self.interp, false)
                    .expect("segments of a valid sequence are valid"),
            );
        }
        result
    }

    // ------------------------- Lookup ----------------------------------------

    /// Binary search for the segment containing `t`: returns `i` such that
    /// `inst[i].t <= t <= inst[i+1].t`, honoring the bound inclusivity;
    /// `None` when `t` falls outside.
    pub fn find_timestamp(&self, t: DateTime<Utc>) -> Option<usize> {
        if !self.tstzspan().contains(&t) {
            return None;
        }
        let count = self.instants.len();
        let mut first = 0i64;
        let mut last = count as i64 - 1;
        let mut middle = (first + last) / 2;
        while first <= last {
            let m = middle as usize;
            let t1 = self.instants[m].timestamp();
            let t2 = if m + 1 < count { self.instants[m + 1].timestamp() } else { t1 };
            let lower_inc = m != 0 || self.lower_inc;
            let upper_inc = if m == count - 1 { self.upper_inc } else { false };
            if (t1 < t && t < t2) || (lower_inc && t1 == t) || (upper_inc && t2 == t) {
                return Some(m);
            }
            if t <= t1 {
                last = middle - 1;
            } else {
                first = middle + 1;
            }
            middle = (first + last) / 2;
        }
        None
    }

    /// The value taken at `t`; `None` outside the sequence, and for a
    /// discrete sequence only listed instants answer.
    pub fn value_at_timestamp(&self, t: DateTime<Utc>) -> Option<B> {
        if self.interp == TInterpolation::Discrete {
            return self
                .instants
                .iter()
                .find(|inst| inst.timestamp() == t)
                .map(|inst| inst.value().clone());
        }
        if !self.tstzspan().contains(&t) {
            return None;
        }
        if self.instants.len() == 1 {
            return Some(self.instants[0].value().clone());
        }
        let n = self.find_timestamp(t)?;
        let inst1 = &self.instants[n];
        if t == inst1.timestamp() {
            return Some(inst1.value().clone());
        }
        let inst2 = &self.instants[n + 1];
        Some(segment::segment_value_at(
            inst1,
            inst2,
            self.interp == TInterpolation::Linear,
            t,
        ))
    }

    // ------------------------- Transformations --------------------------------

    /// Appends an instant. When the new instant repeats the last timestamp
    /// with a different value, a linear sequence promotes to a sequence set;
    /// otherwise the extended sequence is re-normalized at its tail.
    pub fn append_instant(&self, instant: TInstant<B>) -> TemporalResult<Temporal<B>> {
        let last = self.end_instant();
        last.value().ensure_compatible(instant.value())?;
        if last.timestamp() > instant.timestamp() {
            return Err(TemporalError::RestrictViolation(format!(
                "timestamps for temporal value must be increasing: {}, {}",
                format_timestamp(&last.timestamp()),
                format_timestamp(&instant.timestamp()),
            )));
        }
        let linear = self.interp == TInterpolation::Linear;
        if last.timestamp() == instant.timestamp() {
            let same = last.value() == instant.value();
            if self.upper_inc && !same {
                return Err(TemporalError::InvariantViolation(format!(
                    "the temporal values have different value at their common instant {}",
                    format_timestamp(&last.timestamp()),
                )));
            }
            if linear && !same {
                let tail = TSequence::from_instant(instant, self.interp);
                return Ok(Temporal::SequenceSet(TSequenceSet::make_unnormalized(vec![
                    self.clone(),
                    tail,
                ])?));
            }
            if same {
                return Ok(Temporal::Sequence(self.clone()));
            }
            // Step: the appended value closes the open upper bound.
            let mut instants = self.instants.clone();
            instants.pop();
            instants.push(instant);
            return Ok(Temporal::Sequence(Self::make_inner(
                instants,
                self.lower_inc,
                true,
                self.interp,
                false,
            )?));
        }

        let mut instants = self.instants.clone();
        // Normalization pass over the last three instants only.
        if instants.len() > 1 {
            let inst1 = &instants[instants.len() - 2];
            let inst2 = &instants[instants.len() - 1];
            let redundant = (!linear && inst1.value() == inst2.value())
                || (inst1.value() == inst2.value() && inst2.value() == instant.value())
                || (linear && {
                    let d1 = (inst2.timestamp_micros() - inst1.timestamp_micros()) as f64;
                    let d2 = (instant.timestamp_micros() - inst1.timestamp_micros()) as f64;
                    inst1.value().collinear(inst2.value(), instant.value(), d1 / d2)
                });
            if redundant {
                instants.pop();
            }
        }
        instants.push(instant);
        Ok(Temporal::Sequence(Self::make_inner(
            instants,
            self.lower_inc,
            true,
            self.interp,
            false,
        )?))
    }

    /// Joins two sequences that meet at their shared bound into one,
    /// dropping the duplicated instant when both carry it.
    pub(crate) fn join(&self, other: &Self, remove_last: bool, remove_first: bool) -> Self {
        let mut instants: Vec<TInstant<B>> = Vec::new();
        let take = if remove_last { self.instants.len() - 1 } else { self.instants.len() };
        instants.extend_from_slice(&self.instants[..take]);
        let skip = usize::from(remove_first);
        instants.extend_from_slice(&other.instants[skip..]);
        Self::make_inner(instants, self.lower_inc, other.upper_inc, self.interp, true)
            .expect("joining compatible sequences preserves the invariants")
    }

    /// Translates and/or rescales the sequence in time. The first instant
    /// anchors the scale; an instantaneous sequence cannot be scaled.
    pub fn shift_scale(&self, shift: Option<TimeDelta>, duration: Option<TimeDelta>) -> Self {
        let old_span = self.tstzspan();
        let new_span = old_span.shift_scale(shift, duration);
        let instantaneous = new_span.is_singleton();
        let scale = if !instantaneous {
            (new_span.duration().num_microseconds().unwrap_or(1) as f64)
                / (old_span.duration().num_microseconds().unwrap_or(1) as f64)
        } else {
            1.0
        };
        let delta = new_span.lower() - old_span.lower();
        let count = self.instants.len();
        let instants: Vec<TInstant<B>> = self
            .instants
            .iter()
            .enumerate()
            .map(|(i, inst)| {
                if i == 0 {
                    inst.at(new_span.lower())
                } else if i == count - 1 && self.interp != TInterpolation::Discrete {
                    inst.at(new_span.upper())
                } else {
                    let shifted = inst.timestamp() + delta;
                    let offset = shifted - new_span.lower();
                    let scaled = TimeDelta::microseconds(
                        (offset.num_microseconds().unwrap_or(0) as f64 * scale) as i64,
                    );
                    inst.at(new_span.lower() + scaled)
                }
            })
            .collect();
        Self::make_inner(instants, self.lower_inc, self.upper_inc, self.interp, false)
            .expect("shift/scale preserves ordering")
    }

    // ------------------------- Ever/always -----------------------------------

    /// Returns whether the sequence ever takes `value`.
    pub fn ever_eq(&self, value: &B) -> bool {
        if self.instants.iter().any(|inst| inst.value().eq_tol(value)) {
            return true;
        }
        if self.interp != TInterpolation::Linear {
            return false;
        }
        self.instants
            .windows(2)
            .any(|pair| pair[0].value().segment_locate(pair[1].value(), value).is_some())
    }

    /// Returns whether the sequence always takes `value`.
    pub fn always_eq(&self, value: &B) -> bool {
        self.instants.iter().all(|inst| inst.value().eq_tol(value))
    }

    /// Returns whether some value is strictly less than `value`.
    pub fn ever_lt(&self, value: &B) -> bool
    where
        B: PartialOrd,
    {
        self.instants.iter().any(|inst| inst.value() < value)
    }

    /// Returns whether some value is at most `value`.
    pub fn ever_le(&self, value: &B) -> bool
    where
        B: PartialOrd,
    {
        self.instants.iter().any(|inst| inst.value() <= value)
    }

    /// Returns whether every value is strictly less than `value`.
    pub fn always_lt(&self, value: &B) -> bool
    where
        B: PartialOrd,
    {
        self.instants.iter().all(|inst| inst.value() < value)
    }

    /// Returns whether every value is at most `value`.
    pub fn always_le(&self, value: &B) -> bool
    where
        B: PartialOrd,
    {
        self.instants.iter().all(|inst| inst.value() <= value)
    }
}

impl<B: BaseType> fmt::Display for TSequence<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (open, close) = match self.interp {
            TInterpolation::Discrete => ('{', '}'),
            _ => (
                if self.lower_inc { '[' } else { '(' },
                if self.upper_inc { ']' } else { ')' },
            ),
        };
        write!(f, "{open}")?;
        for (i, inst) in self.instants.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{inst}")?;
        }
        write!(f, "{close}")
    }
}

impl<B: BaseType> fmt::Debug for TSequence<B> {
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

    fn seq(values: &[(f64, u32)], interp: TInterpolation) -> TSequence<f64> {
        TSequence::make(
            values.iter().map(|&(v, h)| TInstant::new(v, t(h))).collect(),
            true,
            true,
            interp,
        )
        .unwrap()
    }

    #[test]
    fn increasing_timestamps_are_enforced() {
        let result = TSequence::make(
            vec![TInstant::new(1.0, t(2)), TInstant::new(2.0, t(1))],
            true,
            true,
            TInterpolation::Linear,
        );
        assert!(result.is_err());
    }

    #[test]
    fn linear_normalization_drops_collinear_middles() {
        let s = seq(&[(1.0, 0), (2.0, 1), (3.0, 2)], TInterpolation::Linear);
        assert_eq!(s.num_instants(), 2);
        // A genuine breakpoint survives.
        let s = seq(&[(1.0, 0), (2.0, 1), (2.5, 2)], TInterpolation::Linear);
        assert_eq!(s.num_instants(), 3);
    }

    #[test]
    fn step_normalization_drops_repeats() {
        let s = seq(&[(1.0, 0), (1.0, 1), (2.0, 2)], TInterpolation::Stepwise);
        assert_eq!(s.num_instants(), 2);
        assert_eq!(s.start_value(), &1.0);
        assert_eq!(s.end_value(), &2.0);
    }

    #[test]
    fn find_timestamp_honors_bounds() {
        let s = TSequence::make(
            vec![TInstant::new(1.0, t(0)), TInstant::new(2.0, t(2))],
            false,
            true,
            TInterpolation::Linear,
        )
        .unwrap();
        assert_eq!(s.find_timestamp(t(0)), None);
        assert_eq!(s.find_timestamp(t(1)), Some(0));
        assert_eq!(s.find_timestamp(t(2)), Some(1));
    }

    #[test]
    fn linear_value_at_midpoint() {
        let s = seq(&[(1.0, 0), (3.0, 2)], TInterpolation::Linear);
        assert_eq!(s.value_at_timestamp(t(1)), Some(2.0));
    }

    #[test]
    fn step_value_holds_until_next_instant() {
        let s = seq(&[(1.0, 0), (3.0, 2)], TInterpolation::Stepwise);
        assert_eq!(s.value_at_timestamp(t(1)), Some(1.0));
        assert_eq!(s.value_at_timestamp(t(2)), Some(3.0));
    }

    #[test]
    fn append_promotes_linear_conflict_to_sequence_set() {
        let s = TSequence::make(
            vec![TInstant::new(1.0, t(0)), TInstant::new(2.0, t(1))],
            true,
            false,
            TInterpolation::Linear,
        )
        .unwrap();
        let appended = s.append_instant(TInstant::new(9.0, t(1))).unwrap();
        assert!(matches!(appended, Temporal::SequenceSet(_)));
    }

    #[test]
    fn append_normalizes_the_tail() {
        let s = seq(&[(1.0, 0), (2.0, 1)], TInterpolation::Linear);
        let appended = s.append_instant(TInstant::new(3.0, t(2))).unwrap();
        match appended {
            Temporal::Sequence(s) => assert_eq!(s.num_instants(), 2),
            other => panic!("expected a sequence, got {other:?}"),
        }
    }

    #[test]
    fn shift_scale_scenario() {
        // [0@t0, 1@t2] shift +1h scale to 4h => [0@(t0+1h), 1@(t0+1h+4h)]
        let s = seq(&[(0.0, 0), (1.0, 2)], TInterpolation::Linear);
        let moved = s.shift_scale(Some(TimeDelta::hours(1)), Some(TimeDelta::hours(4)));
        assert_eq!(moved.start_timestamp(), t(1));
        assert_eq!(moved.end_timestamp(), t(5));
    }

    #[test]
    fn ever_and_always() {
        let s = seq(&[(1.0, 0), (3.0, 2)], TInterpolation::Linear);
        assert!(s.ever_eq(&2.0));
        assert!(!s.always_eq(&2.0));
        let step = seq(&[(1.0, 0), (3.0, 2)], TInterpolation::Stepwise);
        assert!(!step.ever_eq(&2.0));
        assert!(step.ever_lt(&2.0));
        assert!(step.always_le(&3.0));
    }

    #[test]
    fn display_discrete_uses_braces() {
        let s = seq(&[(1.0, 0), (2.0, 1)], TInterpolation::Discrete);
        assert!(s.to_string().starts_with('{'));
        let s = TSequence::make(
            vec![TInstant::new(1.0, t(0)), TInstant::new(2.0, t(1))],
            true,
            false,
            TInterpolation::Linear,
        )
        .unwrap();
        assert!(s.to_string().ends_with(')'));
    }
}
