use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};

use crate::collections::base::span::Span;
use crate::collections::datetime::tstz_span::TsTzSpan;
use crate::collections::datetime::tstz_span_set::TsTzSpanSet;
use crate::errors::{TemporalError, TemporalResult};
use crate::geom::SRID_UNKNOWN;
use crate::temporal::base::BaseType;
use crate::temporal::interpolation::TInterpolation;
use crate::temporal::tinstant::TInstant;
use crate::temporal::tsequence::TSequence;
use crate::temporal::tsequence_set::TSequenceSet;

/// A temporal value: a base datum indexed by time, in one of three
/// subtypes. Discrete instant collections are sequences with
/// [`TInterpolation::Discrete`].
#[derive(Clone, PartialEq)]
pub enum Temporal<B: BaseType> {
    Instant(TInstant<B>),
    Sequence(TSequence<B>),
    SequenceSet(TSequenceSet<B>),
}

impl<B: BaseType> Temporal<B> {
    /// Builds a temporal instant.
    pub fn instant(value: B, timestamp: DateTime<Utc>) -> Self {
        Temporal::Instant(TInstant::new(value, timestamp))
    }

    /// Builds a constant temporal value over a period.
    pub fn from_base_tstzspan(value: B, span: TsTzSpan, interp: TInterpolation) -> TemporalResult<Self> {
        let instants = if span.is_singleton() {
            vec![TInstant::new(value, span.lower())]
        } else {
            vec![
                TInstant::new(value.clone(), span.lower()),
                TInstant::new(value, span.upper()),
            ]
        };
        Ok(Temporal::Sequence(TSequence::make_unnormalized(
            instants,
            span.is_lower_inclusive(),
            span.is_upper_inclusive(),
            interp,
        )?))
    }

    // ------------------------- Subtype ----------------------------------------

    pub fn is_instant(&self) -> bool {
        matches!(self, Temporal::Instant(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Temporal::Sequence(_))
    }

    pub fn is_sequence_set(&self) -> bool {
        matches!(self, Temporal::SequenceSet(_))
    }

    pub fn interpolation(&self) -> TInterpolation {
        match self {
            Temporal::Instant(_) => TInterpolation::None,
            Temporal::Sequence(s) => s.interpolation(),
            Temporal::SequenceSet(s) => s.interpolation(),
        }
    }

    // ------------------------- Accessors --------------------------------------

    pub fn num_instants(&self) -> usize {
        match self {
            Temporal::Instant(_) => 1,
            Temporal::Sequence(s) => s.num_instants(),
            Temporal::SequenceSet(s) => s.num_instants(),
        }
    }

    pub fn instants(&self) -> Vec<&TInstant<B>> {
        match self {
            Temporal::Instant(i) => vec![i],
            Temporal::Sequence(s) => s.instants().iter().collect(),
            Temporal::SequenceSet(s) => s.instants(),
        }
    }

    pub fn instant_n(&self, n: usize) -> Option<&TInstant<B>> {
        self.instants().into_iter().nth(n)
    }

    pub fn start_instant(&self) -> &TInstant<B> {
        match self {
            Temporal::Instant(i) => i,
            Temporal::Sequence(s) => s.start_instant(),
            Temporal::SequenceSet(s) => s.start_sequence().start_instant(),
        }
    }

    pub fn end_instant(&self) -> &TInstant<B> {
        match self {
            Temporal::Instant(i) => i,
            Temporal::Sequence(s) => s.end_instant(),
            Temporal::SequenceSet(s) => s.end_sequence().end_instant(),
        }
    }

    pub fn start_value(&self) -> &B {
        self.start_instant().value()
    }

    pub fn end_value(&self) -> &B {
        self.end_instant().value()
    }

    /// The distinct values taken, in first-appearance order.
    pub fn value_set(&self) -> Vec<B> {
        match self {
            Temporal::Instant(i) => vec![i.value().clone()],
            Temporal::Sequence(s) => s.distinct_values(),
            Temporal::SequenceSet(s) => s.distinct_values(),
        }
    }

    /// The values at the instants, in temporal order.
    pub fn values(&self) -> Vec<B> {
        self.instants().into_iter().map(|i| i.value().clone()).collect()
    }

    pub fn min_value(&self) -> B
    where
        B: PartialOrd,
    {
        self.min_instant().value().clone()
    }

    pub fn max_value(&self) -> B
    where
        B: PartialOrd,
    {
        self.max_instant().value().clone()
    }

    pub fn min_instant(&self) -> &TInstant<B>
    where
        B: PartialOrd,
    {
        match self {
            Temporal::Instant(i) => i,
            Temporal::Sequence(s) => s.min_instant(),
            Temporal::SequenceSet(s) => s.min_instant(),
        }
    }

    pub fn max_instant(&self) -> &TInstant<B>
    where
        B: PartialOrd,
    {
        match self {
            Temporal::Instant(i) => i,
            Temporal::Sequence(s) => s.max_instant(),
            Temporal::SequenceSet(s) => s.max_instant(),
        }
    }

    pub fn num_timestamps(&self) -> usize {
        self.num_instants()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.instants().into_iter().map(|i| i.timestamp()).collect()
    }

    pub fn start_timestamp(&self) -> DateTime<Utc> {
        self.start_instant().timestamp()
    }

    pub fn end_timestamp(&self) -> DateTime<Utc> {
        self.end_instant().timestamp()
    }

    /// The value taken at `t`, interpolated per the subtype.
    pub fn value_at_timestamp(&self, t: DateTime<Utc>) -> Option<B> {
        match self {
            Temporal::Instant(i) => (i.timestamp() == t).then(|| i.value().clone()),
            Temporal::Sequence(s) => s.value_at_timestamp(t),
            Temporal::SequenceSet(s) => s.value_at_timestamp(t),
        }
    }

    /// The bounding period.
    pub fn tstzspan(&self) -> TsTzSpan {
        match self {
            Temporal::Instant(i) => i.tstzspan(),
            Temporal::Sequence(s) => s.tstzspan(),
            Temporal::SequenceSet(s) => Span::new_unchecked(
                s.start_timestamp(),
                s.end_timestamp(),
                s.start_sequence().is_lower_inclusive(),
                s.end_sequence().is_upper_inclusive(),
            ),
        }
    }

    /// The support: the set of periods over which the value is defined.
    pub fn time(&self) -> TsTzSpanSet {
        match self {
            Temporal::Instant(i) => TsTzSpanSet::from_sorted(vec![i.tstzspan()]),
            Temporal::Sequence(s) => {
                if s.interpolation() == TInterpolation::Discrete {
                    TsTzSpanSet::from_sorted(
                        s.instants().iter().map(|i| i.tstzspan()).collect(),
                    )
                } else {
                    TsTzSpanSet::from_sorted(vec![s.tstzspan()])
                }
            }
            Temporal::SequenceSet(s) => s.time(),
        }
    }

    pub fn duration(&self, ignore_gaps: bool) -> TimeDelta {
        match self {
            Temporal::Instant(_) => TimeDelta::zero(),
            Temporal::Sequence(s) => {
                if ignore_gaps {
                    s.end_timestamp() - s.start_timestamp()
                } else {
                    s.duration()
                }
            }
            Temporal::SequenceSet(s) => s.duration(ignore_gaps),
        }
    }

    /// The sequences composing the value.
    pub fn sequences(&self) -> Vec<TSequence<B>> {
        match self {
            Temporal::Instant(i) => {
                vec![TSequence::from_instant(i.clone(), TInterpolation::Discrete)]
            }
            Temporal::Sequence(s) => vec![s.clone()],
            Temporal::SequenceSet(s) => s.sequences().to_vec(),
        }
    }

    /// The segments of a continuous value.
    pub fn segments(&self) -> Vec<TSequence<B>> {
        match self {
            Temporal::Instant(_) => self.sequences(),
            Temporal::Sequence(s) => s.segments(),
            Temporal::SequenceSet(s) => {
                s.sequences().iter().flat_map(|seq| seq.segments()).collect()
            }
        }
    }

    /// SRID of spatial base kinds.
    pub fn srid(&self) -> Option<i32> {
        self.start_value().srid()
    }

    // ------------------------- Ever/always ------------------------------------

    pub fn ever_eq(&self, value: &B) -> bool {
        match self {
            Temporal::Instant(i) => i.value().eq_tol(value),
            Temporal::Sequence(s) => s.ever_eq(value),
            Temporal::SequenceSet(s) => s.ever_eq(value),
        }
    }

    pub fn always_eq(&self, value: &B) -> bool {
        match self {
            Temporal::Instant(i) => i.value().eq_tol(value),
            Temporal::Sequence(s) => s.always_eq(value),
            Temporal::SequenceSet(s) => s.always_eq(value),
        }
    }

    pub fn ever_lt(&self, value: &B) -> bool
    where
        B: PartialOrd,
    {
        match self {
            Temporal::Instant(i) => i.value() < value,
            Temporal::Sequence(s) => s.ever_lt(value),
            Temporal::SequenceSet(s) => s.ever_lt(value),
        }
    }

    pub fn always_le(&self, value: &B) -> bool
    where
        B: PartialOrd,
    {
        match self {
            Temporal::Instant(i) => i.value() <= value,
            Temporal::Sequence(s) => s.always_le(value),
            Temporal::SequenceSet(s) => s.always_le(value),
        }
    }

    // ------------------------- Transformations --------------------------------

    /// Appends an instant, promoting the subtype when needed.
    pub fn append_instant(&self, instant: TInstant<B>) -> TemporalResult<Self> {
        match self {
            Temporal::Instant(i) => {
                let seq = TSequence::make(
                    vec![i.clone()],
                    true,
                    true,
                    if B::CONTINUOUS { TInterpolation::Linear } else { TInterpolation::Stepwise },
                )?;
                seq.append_instant(instant)
            }
            Temporal::Sequence(s) => s.append_instant(instant),
            Temporal::SequenceSet(s) => {
                let mut sequences = s.sequences().to_vec();
                let last = sequences.pop().expect("sets are non-empty");
                match last.append_instant(instant)? {
                    Temporal::Sequence(seq) => sequences.push(seq),
                    Temporal::SequenceSet(tail) => {
                        sequences.extend(tail.sequences().iter().cloned())
                    }
                    Temporal::Instant(_) => unreachable!("append returns sequences"),
                }
                Ok(Temporal::SequenceSet(TSequenceSet::make_unnormalized(sequences)?))
            }
        }
    }

    /// Appends a whole sequence.
    pub fn append_sequence(&self, sequence: TSequence<B>) -> TemporalResult<Self> {
        let mut parts = self.sequences();
        parts.push(sequence);
        Self::merge_sequences(parts)
    }

    /// Merges `self` with another temporal value.
    pub fn merge(&self, other: &Self) -> TemporalResult<Self> {
        Self::merge_array(vec![self.clone(), other.clone()])
    }

    /// Merges an array of temporal values. The inputs may share instants
    /// provided the values there agree.
    pub fn merge_array(temporals: Vec<Self>) -> TemporalResult<Self> {
        if temporals.is_empty() {
            return Err(TemporalError::InvalidArg("nothing to merge".into()));
        }
        let discrete = temporals.iter().all(|t| {
            matches!(t, Temporal::Instant(_))
                || t.interpolation() == TInterpolation::Discrete
        });
        if discrete {
            let mut instants: Vec<TInstant<B>> = temporals
                .iter()
                .flat_map(|t| t.instants().into_iter().cloned().collect::<Vec<_>>())
                .collect();
            instants.sort_by_key(|i| i.timestamp());
            let mut merged: Vec<TInstant<B>> = Vec::with_capacity(instants.len());
            for inst in instants {
                match merged.last() {
                    Some(last) if last.timestamp() == inst.timestamp() => {
                        if last.value() != inst.value() {
                            return Err(TemporalError::InvariantViolation(format!(
                                "the temporal values have different value at their common instant {}",
                                crate::utils::format_timestamp(&inst.timestamp()),
                            )));
                        }
                    }
                    _ => merged.push(inst),
                }
            }
            return if merged.len() == 1 {
                Ok(Temporal::Instant(merged.remove(0)))
            } else {
                Ok(Temporal::Sequence(TSequence::make(
                    merged,
                    true,
                    true,
                    TInterpolation::Discrete,
                )?))
            };
        }
        let sequences: Vec<TSequence<B>> =
            temporals.iter().flat_map(|t| t.sequences()).collect();
        Self::merge_sequences(sequences)
    }

    /// Sorts sequences by start time, validates that any shared instant
    /// carries the same value, and joins or glues them.
    fn merge_sequences(mut sequences: Vec<TSequence<B>>) -> TemporalResult<Self> {
        let interp = sequences
            .iter()
            .map(|s| s.interpolation())
            .find(|i| i.is_continuous())
            .unwrap_or(TInterpolation::Stepwise);
        // Instants and discrete members adopt the continuous interpolation.
        sequences = sequences
            .into_iter()
            .flat_map(|seq| {
                if seq.interpolation() == TInterpolation::Discrete {
                    seq.instants()
                        .iter()
                        .map(|i| TSequence::from_instant(i.clone(), interp))
                        .collect::<Vec<_>>()
                } else {
                    vec![seq]
                }
            })
            .collect();
        if sequences.iter().any(|s| s.interpolation() != interp) {
            return Err(TemporalError::InvalidArg(
                "cannot merge values with different interpolations".into(),
            ));
        }
        sequences.sort_by_key(|s| s.start_timestamp());
        for pair in sequences.windows(2) {
            let end = pair[0].end_instant();
            let start = pair[1].start_instant();
            if end.timestamp() > start.timestamp() {
                return Err(TemporalError::InvariantViolation(format!(
                    "the temporal values cannot overlap on time: {}, {}",
                    crate::utils::format_timestamp(&end.timestamp()),
                    crate::utils::format_timestamp(&start.timestamp()),
                )));
            }
            if end.timestamp() == start.timestamp()
                && pair[0].is_upper_inclusive()
                && pair[1].is_lower_inclusive()
                && end.value() != start.value()
            {
                return Err(TemporalError::InvariantViolation(format!(
                    "the temporal values have different value at their common instant {}",
                    crate::utils::format_timestamp(&end.timestamp()),
                )));
            }
        }
        // Overlap on a single shared instant glues the sequences together.
        let merged: Vec<TSequence<B>> = {
            let mut out: Vec<TSequence<B>> = Vec::with_capacity(sequences.len());
            for seq in sequences {
                match out.last() {
                    Some(last)
                        if last.end_timestamp() == seq.start_timestamp()
                            && last.is_upper_inclusive()
                            && seq.is_lower_inclusive() =>
                    {
                        let prev = out.pop().expect("just matched");
                        out.push(prev.join(&seq, false, true));
                    }
                    _ => out.push(seq),
                }
            }
            out
        };
        if merged.len() == 1 {
            Ok(Temporal::Sequence(merged.into_iter().next().expect("len is 1")))
        } else {
            Ok(Temporal::SequenceSet(TSequenceSet::make(merged)?))
        }
    }

    /// Rebuilds a temporal value with the shape, bounds and interpolation
    /// of `template` but the given values; the timestamps must follow the
    /// template's grid. Used by the derived constructors that assemble a
    /// composite base kind from synchronized parts.
    pub(crate) fn zip_assemble<A: BaseType>(
        template: &Temporal<A>,
        values: Vec<(B, DateTime<Utc>)>,
    ) -> TemporalResult<Temporal<B>> {
        let mut iter = values.into_iter();
        let result = match template {
            Temporal::Instant(_) => {
                let (value, t) = iter
                    .next()
                    .ok_or_else(|| TemporalError::InvalidArg("no values to assemble".into()))?;
                Temporal::Instant(TInstant::new(value, t))
            }
            Temporal::Sequence(s) => {
                let instants: Vec<TInstant<B>> = iter
                    .by_ref()
                    .take(s.num_instants())
                    .map(|(value, t)| TInstant::new(value, t))
                    .collect();
                Temporal::Sequence(TSequence::make(
                    instants,
                    s.is_lower_inclusive(),
                    s.is_upper_inclusive(),
                    s.interpolation(),
                )?)
            }
            Temporal::SequenceSet(set) => {
                let mut sequences: Vec<TSequence<B>> = Vec::with_capacity(set.num_sequences());
                for seq in set.sequences() {
                    let instants: Vec<TInstant<B>> = iter
                        .by_ref()
                        .take(seq.num_instants())
                        .map(|(value, t)| TInstant::new(value, t))
                        .collect();
                    sequences.push(TSequence::make(
                        instants,
                        seq.is_lower_inclusive(),
                        seq.is_upper_inclusive(),
                        seq.interpolation(),
                    )?);
                }
                Temporal::SequenceSet(TSequenceSet::make(sequences)?)
            }
        };
        Ok(result)
    }

    /// Shifts the value in time.
    pub fn shift_time(&self, delta: TimeDelta) -> Self {
        self.shift_scale_time(Some(delta), None)
    }

    /// Rescales the value to the given duration.
    pub fn scale_time(&self, duration: TimeDelta) -> Self {
        self.shift_scale_time(None, Some(duration))
    }

    /// Shift and/or rescale in time; instantaneous values cannot be scaled
    /// and only shift.
    pub fn shift_scale_time(&self, shift: Option<TimeDelta>, duration: Option<TimeDelta>) -> Self {
        match self {
            Temporal::Instant(i) => {
                let delta = shift.unwrap_or_else(TimeDelta::zero);
                Temporal::Instant(TInstant::new(i.value().clone(), i.timestamp() + delta))
            }
            Temporal::Sequence(s) => Temporal::Sequence(s.shift_scale(shift, duration)),
            Temporal::SequenceSet(s) => Temporal::SequenceSet(s.shift_scale(shift, duration)),
        }
    }

    // ------------------------- Conversions ------------------------------------

    /// The single instant of an instantaneous value.
    pub fn to_instant(&self) -> TemporalResult<TInstant<B>> {
        match self {
            Temporal::Instant(i) => Ok(i.clone()),
            Temporal::Sequence(s) if s.num_instants() == 1 => Ok(s.start_instant().clone()),
            Temporal::SequenceSet(s)
                if s.num_sequences() == 1 && s.start_sequence().num_instants() == 1 =>
            {
                Ok(s.start_sequence().start_instant().clone())
            }
            _ => Err(TemporalError::InvalidArg(
                "only an instantaneous value converts to an instant".into(),
            )),
        }
    }

    /// Converts to a single sequence of the given interpolation.
    pub fn to_sequence(&self, interp: TInterpolation) -> TemporalResult<TSequence<B>> {
        match self {
            Temporal::Instant(i) => Ok(TSequence::from_instant(i.clone(), interp)),
            Temporal::Sequence(s) => {
                if s.interpolation() == interp {
                    Ok(s.clone())
                } else if s.num_instants() == 1 {
                    Ok(TSequence::from_instant(s.start_instant().clone(), interp))
                } else if s.interpolation() == TInterpolation::Discrete {
                    Err(TemporalError::InvalidArg(
                        "a discrete sequence with several instants cannot become continuous"
                            .into(),
                    ))
                } else {
                    self.set_interpolation(interp)?.to_sequence(interp)
                }
            }
            Temporal::SequenceSet(s) if s.num_sequences() == 1 => {
                Ok(s.start_sequence().clone())
            }
            Temporal::SequenceSet(_) => Err(TemporalError::InvalidArg(
                "a sequence set with several sequences cannot become one sequence".into(),
            )),
        }
    }

    /// Converts to a sequence set of the given interpolation.
    pub fn to_sequenceset(&self, interp: TInterpolation) -> TemporalResult<TSequenceSet<B>> {
        match self.set_interpolation(interp)? {
            Temporal::Instant(i) => Ok(TSequenceSet::from_sequence(TSequence::from_instant(
                i, interp,
            ))),
            Temporal::Sequence(s) if s.interpolation() == TInterpolation::Discrete => {
                Ok(TSequenceSet::make_unnormalized(
                    s.instants()
                        .iter()
                        .map(|i| TSequence::from_instant(i.clone(), interp))
                        .collect(),
                )?)
            }
            Temporal::Sequence(s) => Ok(TSequenceSet::from_sequence(s)),
            Temporal::SequenceSet(s) => Ok(s),
        }
    }

    /// Re-expresses the value under another interpolation when the
    /// conversion is lossless.
    pub fn set_interpolation(&self, interp: TInterpolation) -> TemporalResult<Self> {
        let current = self.interpolation();
        if current == interp || matches!(self, Temporal::Instant(_)) {
            return Ok(self.clone());
        }
        match (current, interp) {
            (TInterpolation::Discrete, _) => {
                let sequences: Vec<TSequence<B>> = self
                    .instants()
                    .into_iter()
                    .map(|i| TSequence::from_instant(i.clone(), interp))
                    .collect();
                Ok(Temporal::SequenceSet(TSequenceSet::make_unnormalized(sequences)?))
            }
            (_, TInterpolation::Discrete) => {
                let sequences = self.sequences();
                if sequences.iter().any(|s| s.num_instants() > 1) {
                    return Err(TemporalError::InvalidArg(
                        "only instantaneous sequences convert to discrete".into(),
                    ));
                }
                let instants: Vec<TInstant<B>> = sequences
                    .iter()
                    .map(|s| s.start_instant().clone())
                    .collect();
                Ok(Temporal::Sequence(TSequence::make(
                    instants,
                    true,
                    true,
                    TInterpolation::Discrete,
                )?))
            }
            (TInterpolation::Stepwise, TInterpolation::Linear) => {
                // Every step segment becomes a constant linear piece.
                let mut pieces: Vec<TSequence<B>> = Vec::new();
                for seq in self.sequences() {
                    let instants = seq.instants();
                    if instants.len() == 1 {
                        pieces.push(TSequence::from_instant(
                            instants[0].clone(),
                            TInterpolation::Linear,
                        ));
                        continue;
                    }
                    for (i, pair) in instants.windows(2).enumerate() {
                        let lower_inc = if i == 0 { seq.is_lower_inclusive() } else { true };
                        let last = i == instants.len() - 2;
                        let upper_inc = last && seq.is_upper_inclusive()
                            && pair[0].value() == pair[1].value();
                        let mut segment = vec![
                            pair[0].clone(),
                            pair[1].with_value(pair[0].value().clone()),
                        ];
                        if last && seq.is_upper_inclusive() && pair[0].value() != pair[1].value()
                        {
                            pieces.push(TSequence::make_unnormalized(
                                segment,
                                lower_inc,
                                false,
                                TInterpolation::Linear,
                            )?);
                            segment = vec![pair[1].clone()];
                            pieces.push(TSequence::make_unnormalized(
                                segment,
                                true,
                                true,
                                TInterpolation::Linear,
                            )?);
                        } else {
                            pieces.push(TSequence::make_unnormalized(
                                segment,
                                lower_inc,
                                upper_inc || (last && seq.is_upper_inclusive()),
                                TInterpolation::Linear,
                            )?);
                        }
                    }
                }
                Ok(Temporal::SequenceSet(TSequenceSet::make(pieces)?))
            }
            (TInterpolation::Linear, TInterpolation::Stepwise) => {
                let constant = self.sequences().iter().all(|s| {
                    s.instants()
                        .windows(2)
                        .all(|pair| pair[0].value() == pair[1].value())
                });
                if !constant {
                    return Err(TemporalError::InvalidArg(
                        "a non-constant linear value cannot become stepwise".into(),
                    ));
                }
                let sequences: Vec<TSequence<B>> = self
                    .sequences()
                    .iter()
                    .map(|s| {
                        TSequence::make_unnormalized(
                            s.instants().to_vec(),
                            s.is_lower_inclusive(),
                            s.is_upper_inclusive(),
                            TInterpolation::Stepwise,
                        )
                    })
                    .collect::<TemporalResult<_>>()?;
                if sequences.len() == 1 {
                    Ok(Temporal::Sequence(sequences.into_iter().next().expect("len is 1")))
                } else {
                    Ok(Temporal::SequenceSet(TSequenceSet::make(sequences)?))
                }
            }
            _ => Err(TemporalError::InvalidArg(format!(
                "cannot convert interpolation {current} to {interp}"
            ))),
        }
    }
}

impl<B: BaseType> fmt::Display for Temporal<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(srid) = self.srid() {
            if srid != SRID_UNKNOWN {
                write!(f, "SRID={srid};")?;
            }
        }
        // Continuous base kinds print an explicit prefix when the
        // interpolation deviates from their linear default.
        if B::CONTINUOUS && self.interpolation() == TInterpolation::Stepwise {
            write!(f, "Interp=Step;")?;
        }
        match self {
            Temporal::Instant(i) => write!(f, "{i}"),
            Temporal::Sequence(s) => write!(f, "{s}"),
            Temporal::SequenceSet(s) => write!(f, "{s}"),
        }
    }
}

impl<B: BaseType> fmt::Debug for Temporal<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Temporal::Instant(_) => write!(f, "Instant({self})"),
            Temporal::Sequence(_) => write!(f, "Sequence({self})"),
            Temporal::SequenceSet(_) => write!(f, "SequenceSet({self})"),
        }
    }
}

impl<B: BaseType> From<TInstant<B>> for Temporal<B> {
    fn from(instant: TInstant<B>) -> Self {
        Temporal::Instant(instant)
    }
}

impl<B: BaseType> From<TSequence<B>> for Temporal<B> {
    fn from(sequence: TSequence<B>) -> Self {
        Temporal::Sequence(sequence)
    }
}

impl<B: BaseType> From<TSequenceSet<B>> for Temporal<B> {
    fn from(set: TSequenceSet<B>) -> Self {
        Temporal::SequenceSet(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, h, 0, 0).unwrap()
    }

    fn tfloat_seq(values: &[(f64, u32)]) -> Temporal<f64> {
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

    #[test]
    fn merge_glues_sequences_sharing_an_instant() {
        let a = tfloat_seq(&[(1.0, 0), (2.0, 2)]);
        let b = tfloat_seq(&[(2.0, 2), (5.0, 4)]);
        let merged = a.merge(&b).unwrap();
        match merged {
            Temporal::Sequence(s) => {
                assert_eq!(s.num_instants(), 3);
                assert_eq!(s.start_timestamp(), t(0));
                assert_eq!(s.end_timestamp(), t(4));
            }
            other => panic!("expected one sequence, got {other:?}"),
        }
    }

    #[test]
    fn merge_rejects_conflicting_shared_instant() {
        let a = tfloat_seq(&[(1.0, 0), (2.0, 2)]);
        let b = tfloat_seq(&[(9.0, 2), (5.0, 4)]);
        assert!(a.merge(&b).is_err());
    }

    #[test]
    fn merge_disjoint_values_makes_a_set() {
        let a = tfloat_seq(&[(1.0, 0), (2.0, 1)]);
        let b = tfloat_seq(&[(5.0, 3), (6.0, 4)]);
        let merged = a.merge(&b).unwrap();
        assert!(matches!(merged, Temporal::SequenceSet(_)));
    }

    #[test]
    fn merge_instants_builds_a_discrete_sequence() {
        let a = Temporal::instant(1.0f64, t(0));
        let b = Temporal::instant(2.0f64, t(1));
        let merged = Temporal::merge_array(vec![a, b]).unwrap();
        assert_eq!(merged.interpolation(), TInterpolation::Discrete);
        assert_eq!(merged.num_instants(), 2);
    }

    #[test]
    fn step_to_linear_produces_constant_pieces() {
        let step = Temporal::Sequence(
            TSequence::make(
                vec![TInstant::new(1.0, t(0)), TInstant::new(2.0, t(2))],
                true,
                true,
                TInterpolation::Stepwise,
            )
            .unwrap(),
        );
        let linear = step.set_interpolation(TInterpolation::Linear).unwrap();
        assert!(matches!(&linear, Temporal::SequenceSet(s) if s.num_sequences() == 2));
        assert_eq!(linear.value_at_timestamp(t(1)), Some(1.0));
        assert_eq!(linear.value_at_timestamp(t(2)), Some(2.0));
    }

    #[test]
    fn display_prefixes_step_interpolation() {
        let step = Temporal::Sequence(
            TSequence::make(
                vec![TInstant::new(1.0, t(0)), TInstant::new(2.0, t(2))],
                true,
                true,
                TInterpolation::Stepwise,
            )
            .unwrap(),
        );
        assert!(step.to_string().starts_with("Interp=Step;["));
    }
}
