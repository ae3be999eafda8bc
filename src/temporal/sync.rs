//! Synchronization of two temporal values onto a common time grid, and the
//! lifting of base-value operations over time.

use chrono::{DateTime, Utc};

use crate::collections::base::collection::Collection;
use crate::temporal::base::BaseType;
use crate::temporal::interpolation::TInterpolation;
use crate::temporal::segment::{segment_crossing, segment_value_at};
use crate::temporal::temporal::Temporal;
use crate::temporal::tinstant::TInstant;
use crate::temporal::tsequence::TSequence;
use crate::temporal::tsequence_set::TSequenceSet;

/// Per-segment crossing hook used during synchronization: given the two
/// synchronized segments in play, the time of their value-value crossing.
type CrossingFn<'a, A, B> = &'a dyn Fn(
    &TInstant<A>,
    &TInstant<A>,
    &TInstant<B>,
    &TInstant<B>,
) -> Option<(A, B, DateTime<Utc>)>;

/// Per-segment turning-point hook: extra timestamps strictly inside the
/// segment at which both sides are materialized, so a lifted non-linear
/// operation stays exact at its extrema.
type TurnpointFn<'a, A, B> = &'a dyn Fn(
    &TInstant<A>,
    &TInstant<A>,
    &TInstant<B>,
    &TInstant<B>,
) -> Vec<DateTime<Utc>>;

struct SyncHooks<'a, A: BaseType, B: BaseType> {
    crossing: Option<CrossingFn<'a, A, B>>,
    turnpoint: Option<TurnpointFn<'a, A, B>>,
}

impl<'a, A: BaseType, B: BaseType> SyncHooks<'a, A, B> {
    fn none() -> Self {
        Self { crossing: None, turnpoint: None }
    }
}

/// Synchronizes two continuous sequences onto the intersection of their
/// periods; `None` when they do not overlap in time.
fn sync_sequences<A: BaseType, B: BaseType>(
    seq1: &TSequence<A>,
    seq2: &TSequence<B>,
    hooks: &SyncHooks<'_, A, B>,
) -> Option<(TSequence<A>, TSequence<B>)> {
    let inter = seq1.tstzspan().intersection(&seq2.tstzspan())?;
    let linear1 = seq1.interpolation() == TInterpolation::Linear;
    let linear2 = seq2.interpolation() == TInterpolation::Linear;

    // The sequences intersect at a single instant.
    if inter.is_singleton() {
        let t = inter.lower();
        let inst1 = TInstant::new(seq1.value_at_timestamp(t)?, t);
        let inst2 = TInstant::new(seq2.value_at_timestamp(t)?, t);
        return Some((
            TSequence::from_instant(inst1, seq1.interpolation()),
            TSequence::from_instant(inst2, seq2.interpolation()),
        ));
    }

    let mut out1: Vec<TInstant<A>> = Vec::new();
    let mut out2: Vec<TInstant<B>> = Vec::new();
    let mut i = seq1.find_timestamp(inter.lower()).unwrap_or(0);
    let mut j = seq2.find_timestamp(inter.lower()).unwrap_or(0);
    if seq1.instant_n(i).expect("index in range").timestamp() < inter.lower() {
        i += 1;
    }
    if seq2.instant_n(j).expect("index in range").timestamp() < inter.lower() {
        j += 1;
    }
    let mut inst1 = seq1.instant_n(i).cloned();
    let mut inst2 = seq2.instant_n(j).cloned();
    while let (Some(cur1), Some(cur2)) = (inst1.clone(), inst2.clone()) {
        if cur1.timestamp() > inter.upper() && cur2.timestamp() > inter.upper() {
            break;
        }
        // Emit the earlier timestamp, interpolating the other side there.
        let (next1, next2) = match cur1.timestamp().cmp(&cur2.timestamp()) {
            std::cmp::Ordering::Equal => {
                i += 1;
                j += 1;
                (cur1, cur2)
            }
            std::cmp::Ordering::Less => {
                i += 1;
                let v2 = seq2.value_at_timestamp(cur1.timestamp())?;
                (cur1.clone(), TInstant::new(v2, cur1.timestamp()))
            }
            std::cmp::Ordering::Greater => {
                j += 1;
                let v1 = seq1.value_at_timestamp(cur2.timestamp())?;
                (TInstant::new(v1, cur2.timestamp()), cur2)
            }
        };
        // Crossings and turning points go in before the new pair.
        if let (Some(prev1), Some(prev2)) = (out1.last().cloned(), out2.last().cloned()) {
            let mut inserts: Vec<(A, B, DateTime<Utc>)> = Vec::new();
            if let Some(crossing) = hooks.crossing {
                if let Some((v1, v2, t)) = crossing(&prev1, &next1, &prev2, &next2) {
                    if t > prev1.timestamp() && t < next1.timestamp() {
                        inserts.push((v1, v2, t));
                    }
                }
            }
            if let Some(turnpoint) = hooks.turnpoint {
                for t in turnpoint(&prev1, &next1, &prev2, &next2) {
                    if t > prev1.timestamp()
                        && t < next1.timestamp()
                        && !inserts.iter().any(|(_, _, existing)| *existing == t)
                    {
                        let v1 = segment_value_at(&prev1, &next1, linear1, t);
                        let v2 = segment_value_at(&prev2, &next2, linear2, t);
                        inserts.push((v1, v2, t));
                    }
                }
            }
            inserts.sort_by_key(|(_, _, t)| *t);
            for (v1, v2, t) in inserts {
                out1.push(TInstant::new(v1, t));
                out2.push(TInstant::new(v2, t));
            }
        }
        out1.push(next1);
        out2.push(next2);
        inst1 = seq1.instant_n(i).cloned();
        inst2 = seq2.instant_n(j).cloned();
    }

    if out1.is_empty() {
        return None;
    }
    // A step sequence cut at an exclusive upper bound must end in two equal
    // values so truncation preserves its semantics.
    if !inter.is_upper_inclusive() && out1.len() > 1 && !linear1 {
        let penultimate = out1[out1.len() - 2].value().clone();
        if out1[out1.len() - 1].value() != &penultimate {
            let last = out1.pop().expect("checked length");
            out1.push(last.with_value(penultimate));
        }
    }
    if !inter.is_upper_inclusive() && out2.len() > 1 && !linear2 {
        let penultimate = out2[out2.len() - 2].value().clone();
        if out2[out2.len() - 1].value() != &penultimate {
            let last = out2.pop().expect("checked length");
            out2.push(last.with_value(penultimate));
        }
    }
    let sync1 = TSequence::make_unnormalized(
        out1,
        inter.is_lower_inclusive(),
        inter.is_upper_inclusive(),
        seq1.interpolation(),
    )
    .ok()?;
    let sync2 = TSequence::make_unnormalized(
        out2,
        inter.is_lower_inclusive(),
        inter.is_upper_inclusive(),
        seq2.interpolation(),
    )
    .ok()?;
    Some((sync1, sync2))
}

/// Synchronizes two discrete-or-mixed values on shared timestamps only.
fn sync_discrete<A: BaseType, B: BaseType>(
    a: &Temporal<A>,
    b: &Temporal<B>,
) -> Option<(Temporal<A>, Temporal<B>)> {
    let mut out1: Vec<TInstant<A>> = Vec::new();
    let mut out2: Vec<TInstant<B>> = Vec::new();
    for inst in a.instants() {
        if let Some(v2) = b.value_at_timestamp(inst.timestamp()) {
            out1.push(inst.clone());
            out2.push(TInstant::new(v2, inst.timestamp()));
        }
    }
    match out1.len() {
        0 => None,
        1 => Some((
            Temporal::Instant(out1.into_iter().next().expect("len is 1")),
            Temporal::Instant(out2.into_iter().next().expect("len is 1")),
        )),
        _ => Some((
            Temporal::Sequence(
                TSequence::make(out1, true, true, TInterpolation::Discrete).ok()?,
            ),
            Temporal::Sequence(
                TSequence::make(out2, true, true, TInterpolation::Discrete).ok()?,
            ),
        )),
    }
}

fn continuous_sequences<B: BaseType>(t: &Temporal<B>) -> Vec<TSequence<B>> {
    match t {
        Temporal::Sequence(s) => vec![s.clone()],
        Temporal::SequenceSet(s) => s.sequences().to_vec(),
        Temporal::Instant(_) => vec![],
    }
}

fn sync_with_hooks<A: BaseType, B: BaseType>(
    a: &Temporal<A>,
    b: &Temporal<B>,
    hooks: &SyncHooks<'_, A, B>,
) -> Option<(Temporal<A>, Temporal<B>)> {
    let discrete = |t: TInterpolation| t == TInterpolation::Discrete;
    match (a, b) {
        (Temporal::Instant(_), _)
        | (_, Temporal::Instant(_)) => sync_discrete(a, b),
        _ if discrete(a.interpolation()) || discrete(b.interpolation()) => sync_discrete(a, b),
        _ => {
            // Walk both sequence lists in temporal order.
            let seqs1 = continuous_sequences(a);
            let seqs2 = continuous_sequences(b);
            let mut parts1: Vec<TSequence<A>> = Vec::new();
            let mut parts2: Vec<TSequence<B>> = Vec::new();
            let (mut i, mut j) = (0usize, 0usize);
            while i < seqs1.len() && j < seqs2.len() {
                let s1 = &seqs1[i];
                let s2 = &seqs2[j];
                if let Some((p1, p2)) = sync_sequences(s1, s2, hooks) {
                    parts1.push(p1);
                    parts2.push(p2);
                }
                if s1.tstzspan().is_over_or_left(&s2.tstzspan()) {
                    i += 1;
                } else {
                    j += 1;
                }
            }
            match parts1.len() {
                0 => None,
                1 => Some((
                    Temporal::Sequence(parts1.into_iter().next().expect("len is 1")),
                    Temporal::Sequence(parts2.into_iter().next().expect("len is 1")),
                )),
                _ => Some((
                    Temporal::SequenceSet(TSequenceSet::make_unnormalized(parts1).ok()?),
                    Temporal::SequenceSet(TSequenceSet::make_unnormalized(parts2).ok()?),
                )),
            }
        }
    }
}

/// Synchronizes two temporal values of possibly different base kinds onto a
/// common time grid, without crossing insertion. This is the alignment used
/// by the derived constructors.
pub fn synchronize<A: BaseType, B: BaseType>(
    a: &Temporal<A>,
    b: &Temporal<B>,
) -> Option<(Temporal<A>, Temporal<B>)> {
    sync_with_hooks(a, b, &SyncHooks::none())
}

/// Synchronizes two temporal values over one base kind; with `crossings`,
/// value-value crossings of linear segments are materialized.
pub fn synchronize_crossings<B: BaseType>(
    a: &Temporal<B>,
    b: &Temporal<B>,
    crossings: bool,
) -> Option<(Temporal<B>, Temporal<B>)> {
    let linear1 = a.interpolation() == TInterpolation::Linear;
    let linear2 = b.interpolation() == TInterpolation::Linear;
    let crossing_fn = |s1: &TInstant<B>, e1: &TInstant<B>, s2: &TInstant<B>, e2: &TInstant<B>| {
        segment_crossing(s1, e1, linear1, s2, e2, linear2)
    };
    let hooks = SyncHooks {
        crossing: (crossings && (linear1 || linear2))
            .then_some(&crossing_fn as CrossingFn<'_, B, B>),
        turnpoint: None,
    };
    sync_with_hooks(a, b, &hooks)
}

// ------------------------- Lifting -------------------------------------------

fn result_interp<C: BaseType>(interp: TInterpolation) -> TInterpolation {
    match interp {
        TInterpolation::Discrete => TInterpolation::Discrete,
        TInterpolation::None => TInterpolation::None,
        _ if C::CONTINUOUS && interp == TInterpolation::Linear => TInterpolation::Linear,
        _ => TInterpolation::Stepwise,
    }
}

/// Applies a unary base operation pointwise, preserving the time grid.
pub fn lift_unary<A: BaseType, C: BaseType>(
    a: &Temporal<A>,
    f: impl Fn(&A) -> C + Copy,
) -> Temporal<C> {
    let map_seq = |seq: &TSequence<A>| -> TSequence<C> {
        let instants = seq
            .instants()
            .iter()
            .map(|inst| TInstant::new(f(inst.value()), inst.timestamp()))
            .collect();
        TSequence::make_unnormalized(
            instants,
            seq.is_lower_inclusive(),
            seq.is_upper_inclusive(),
            result_interp::<C>(seq.interpolation()),
        )
        .expect("the time grid is preserved")
    };
    match a {
        Temporal::Instant(i) => {
            Temporal::Instant(TInstant::new(f(i.value()), i.timestamp()))
        }
        Temporal::Sequence(s) => Temporal::Sequence(map_seq(s)),
        Temporal::SequenceSet(s) => Temporal::SequenceSet(
            TSequenceSet::make_unnormalized(s.sequences().iter().map(map_seq).collect())
                .expect("the sequence layout is preserved"),
        ),
    }
}

/// Applies a binary base operation pointwise after synchronization.
///
/// `crossings` materializes value-value crossings first, so operations with
/// discontinuous graphs (comparisons) change value exactly at the crossing.
pub fn lift_binary<A: BaseType, C: BaseType>(
    a: &Temporal<A>,
    b: &Temporal<A>,
    f: impl Fn(&A, &A) -> C + Copy,
    crossings: bool,
) -> Option<Temporal<C>> {
    lift_binary_inner(a, b, f, crossings, None)
}

/// [`lift_binary`] with a turning-point hook: the returned timestamps are
/// materialized on both sides before mapping, keeping non-linear lifted
/// operations (distance, product) exact at their extrema.
pub fn lift_binary_turnpoints<A: BaseType, C: BaseType>(
    a: &Temporal<A>,
    b: &Temporal<A>,
    f: impl Fn(&A, &A) -> C + Copy,
    turnpoint: TurnpointFn<'_, A, A>,
) -> Option<Temporal<C>> {
    lift_binary_inner(a, b, f, true, Some(turnpoint))
}

fn lift_binary_inner<A: BaseType, C: BaseType>(
    a: &Temporal<A>,
    b: &Temporal<A>,
    f: impl Fn(&A, &A) -> C + Copy,
    crossings: bool,
    turnpoint: Option<TurnpointFn<'_, A, A>>,
) -> Option<Temporal<C>> {
    let linear1 = a.interpolation() == TInterpolation::Linear;
    let linear2 = b.interpolation() == TInterpolation::Linear;
    let crossing_fn = |s1: &TInstant<A>, e1: &TInstant<A>, s2: &TInstant<A>, e2: &TInstant<A>| {
        segment_crossing(s1, e1, linear1, s2, e2, linear2)
    };
    let hooks = SyncHooks {
        crossing: (crossings && (linear1 || linear2))
            .then_some(&crossing_fn as CrossingFn<'_, A, A>),
        turnpoint,
    };
    let (sync1, sync2) = sync_with_hooks(a, b, &hooks)?;
    let zip_seq = |s1: &TSequence<A>, s2: &TSequence<A>| -> TSequence<C> {
        let interp = result_interp::<C>(s1.interpolation());
        let mut instants: Vec<TInstant<C>> = s1
            .instants()
            .iter()
            .zip(s2.instants())
            .map(|(i1, i2)| TInstant::new(f(i1.value(), i2.value()), i1.timestamp()))
            .collect();
        // A step result truncated at an exclusive upper bound keeps the
        // value of its predecessor.
        if interp == TInterpolation::Stepwise && !s1.is_upper_inclusive() && instants.len() > 1 {
            let penultimate = instants[instants.len() - 2].value().clone();
            let last = instants.pop().expect("checked length");
            instants.push(last.with_value(penultimate));
        }
        TSequence::make(
            instants,
            s1.is_lower_inclusive(),
            s1.is_upper_inclusive(),
            interp,
        )
        .expect("synchronized grids are valid")
    };
    Some(match (&sync1, &sync2) {
        (Temporal::Instant(i1), Temporal::Instant(i2)) => {
            Temporal::Instant(TInstant::new(f(i1.value(), i2.value()), i1.timestamp()))
        }
        (Temporal::Sequence(s1), Temporal::Sequence(s2)) => Temporal::Sequence(zip_seq(s1, s2)),
        (Temporal::SequenceSet(s1), Temporal::SequenceSet(s2)) => Temporal::SequenceSet(
            TSequenceSet::make(
                s1.sequences()
                    .iter()
                    .zip(s2.sequences())
                    .map(|(a, b)| zip_seq(a, b))
                    .collect(),
            )
            .expect("synchronized sets are valid"),
        ),
        _ => unreachable!("synchronization yields matching subtypes"),
    })
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

    #[test]
    fn synchronization_aligns_the_grids() {
        let a = linear(&[(0.0, 0), (4.0, 4)]);
        let b = linear(&[(10.0, 2), (20.0, 6)]);
        let (sa, sb) = synchronize(&a, &b).unwrap();
        assert_eq!(sa.timestamps(), sb.timestamps());
        assert_eq!(sa.tstzspan().lower(), t(2));
        assert_eq!(sa.tstzspan().upper(), t(4));
        // Values at shared grid points equal the originals.
        assert_eq!(sa.value_at_timestamp(t(3)), a.value_at_timestamp(t(3)));
        assert_eq!(sb.value_at_timestamp(t(3)), b.value_at_timestamp(t(3)));
    }

    #[test]
    fn crossings_are_materialized() {
        let a = linear(&[(1.0, 0), (3.0, 2)]);
        let b = linear(&[(3.0, 0), (1.0, 2)]);
        let (sa, _) = synchronize_crossings(&a, &b, true).unwrap();
        // The crossing at the midpoint becomes a grid point.
        assert!(sa.timestamps().contains(&t(1)));
    }

    #[test]
    fn lifted_comparison_changes_at_the_crossing() {
        let a = linear(&[(1.0, 0), (3.0, 2)]);
        let b = linear(&[(3.0, 0), (1.0, 2)]);
        let lt = lift_binary::<f64, bool>(&a, &b, |x, y| x < y, true).unwrap();
        assert_eq!(lt.value_at_timestamp(t(0)), Some(true));
        assert_eq!(lt.value_at_timestamp(t(2)), Some(false));
        // The transition sits exactly at the crossing.
        assert!(lt.timestamps().contains(&t(1)));
    }

    #[test]
    fn lifted_arithmetic_stays_linear() {
        let a = linear(&[(1.0, 0), (3.0, 2)]);
        let b = linear(&[(2.0, 0), (2.0, 2)]);
        let sum = lift_binary::<f64, f64>(&a, &b, |x, y| x + y, false).unwrap();
        assert_eq!(sum.interpolation(), TInterpolation::Linear);
        assert_eq!(sum.value_at_timestamp(t(1)), Some(4.0));
    }

    #[test]
    fn instant_times_sequence() {
        let a = Temporal::instant(5.0f64, t(1));
        let b = linear(&[(0.0, 0), (4.0, 4)]);
        let (sa, sb) = synchronize(&a, &b).unwrap();
        assert_eq!(sa.start_timestamp(), t(1));
        assert_eq!(sb.start_value(), &1.0);
    }

    #[test]
    fn disjoint_values_do_not_synchronize() {
        let a = linear(&[(0.0, 0), (1.0, 1)]);
        let b = linear(&[(0.0, 3), (1.0, 4)]);
        assert!(synchronize(&a, &b).is_none());
    }
}
