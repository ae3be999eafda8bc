use chrono::{DateTime, Utc};

use crate::boxes::tbox::TBox;
use crate::collections::base::collection::Collection;
use crate::collections::base::span::Span;
use crate::collections::number::float_span::{FloatSpan, FloatSpanSet};
use crate::temporal::base::BaseType;
use crate::temporal::interpolation::TInterpolation;
use crate::temporal::sync::lift_binary;
use crate::temporal::temporal::Temporal;
use crate::temporal::tinstant::TInstant;
use crate::temporal::tsequence::TSequence;
use crate::temporal::tsequence_set::TSequenceSet;
use crate::utils::{from_micros, FP_TOLERANCE};

/// The behavior shared by the base kinds of temporal numbers.
pub trait TNumber: BaseType<Bbox = TBox> + PartialOrd {
    fn to_double(&self) -> f64;
    fn from_double(value: f64) -> Self;
}

impl TNumber for i32 {
    fn to_double(&self) -> f64 {
        f64::from(*self)
    }

    fn from_double(value: f64) -> Self {
        value.round() as i32
    }
}

impl TNumber for f64 {
    fn to_double(&self) -> f64 {
        *self
    }

    fn from_double(value: f64) -> Self {
        value
    }
}

/// A macro stamping the closed arithmetic operators onto a temporal number
/// type; multiplication and division carry extra structure and live with
/// the float alias.
macro_rules! impl_tnumber_arith {
    ($base:ident) => {
        paste::paste! {
            impl std::ops::Add for &crate::temporal::temporal::Temporal<$base> {
                type Output = Option<crate::temporal::temporal::Temporal<$base>>;

                #[doc = "Pointwise sum of two temporal `" $base "` values."]
                fn add(self, other: Self) -> Self::Output {
                    crate::temporal::sync::lift_binary(
                        self, other, |a: &$base, b: &$base| a + b, false)
                }
            }

            impl std::ops::Sub for &crate::temporal::temporal::Temporal<$base> {
                type Output = Option<crate::temporal::temporal::Temporal<$base>>;

                #[doc = "Pointwise difference of two temporal `" $base "` values."]
                fn sub(self, other: Self) -> Self::Output {
                    crate::temporal::sync::lift_binary(
                        self, other, |a: &$base, b: &$base| a - b, false)
                }
            }
        }
    };
}

pub(crate) use impl_tnumber_arith;

/// Restricts one segment to a value range. Inserted cut instants take the
/// *range bound* as their value, which keeps repeated restrictions from
/// drifting.
#[allow(clippy::too_many_arguments)]
fn segment_at_span<B: TNumber>(
    inst1: &TInstant<B>,
    inst2: &TInstant<B>,
    linear: bool,
    lower_inc: bool,
    upper_inc: bool,
    span: &FloatSpan,
) -> Option<TSequence<B>> {
    let v1 = inst1.value().to_double();
    let v2 = inst2.value().to_double();
    let interp = if linear { TInterpolation::Linear } else { TInterpolation::Stepwise };

    if !linear || (v1 - v2).abs() <= FP_TOLERANCE {
        // Constant or step segment: membership of the held value decides.
        // Step segments stay open at the top; the caller re-adds the final
        // instant of the sequence when its value qualifies.
        if !span.contains(&v1) {
            return None;
        }
        let keep_upper = linear && upper_inc;
        let pieces = vec![inst1.clone(), inst2.with_value(inst1.value().clone())];
        return TSequence::make_unnormalized(pieces, lower_inc, keep_upper, interp).ok();
    }

    let increasing = v2 > v1;
    let (seg_min, seg_max) = if increasing { (v1, v2) } else { (v2, v1) };
    let value_span = Span::new_unchecked(seg_min, seg_max, true, true);
    let inter = value_span.intersection(span)?;

    // Locate the times at which the segment meets the range bounds.
    let locate = |bound: f64| -> Option<(DateTime<Utc>, f64)> {
        let fraction = inst1
            .value()
            .to_double()
            .segment_locate(&inst2.value().to_double(), &bound)?;
        let duration = (inst2.timestamp_micros() - inst1.timestamp_micros()) as f64;
        Some((
            from_micros(inst1.timestamp_micros() + (duration * fraction).round() as i64),
            bound,
        ))
    };
    let (enter_bound, exit_bound) = if increasing {
        (inter.lower(), inter.upper())
    } else {
        (inter.upper(), inter.lower())
    };
    let (enter_inc, exit_inc) = if increasing {
        (inter.is_lower_inclusive(), inter.is_upper_inclusive())
    } else {
        (inter.is_upper_inclusive(), inter.is_lower_inclusive())
    };
    let (t_enter, v_enter) = if enter_bound == v1 {
        (inst1.timestamp(), v1)
    } else {
        locate(enter_bound)?
    };
    let (t_exit, v_exit) = if exit_bound == v2 {
        (inst2.timestamp(), v2)
    } else {
        locate(exit_bound)?
    };
    if t_enter > t_exit {
        return None;
    }
    let lower_inc = if t_enter == inst1.timestamp() { lower_inc && enter_inc } else { enter_inc };
    let upper_inc = if t_exit == inst2.timestamp() { upper_inc && exit_inc } else { exit_inc };
    if t_enter == t_exit {
        if !(lower_inc && upper_inc) {
            return None;
        }
        return Some(TSequence::from_instant(
            TInstant::new(B::from_double(v_enter), t_enter),
            interp,
        ));
    }
    let instants = vec![
        TInstant::new(B::from_double(v_enter), t_enter),
        TInstant::new(B::from_double(v_exit), t_exit),
    ];
    TSequence::make_unnormalized(instants, lower_inc, upper_inc, interp).ok()
}

impl<B: TNumber> TSequence<B> {
    fn at_span_pieces(&self, span: &FloatSpan) -> Vec<TSequence<B>> {
        if self.interpolation() == TInterpolation::Discrete {
            let kept: Vec<TInstant<B>> = self
                .instants()
                .iter()
                .filter(|inst| span.contains(&inst.value().to_double()))
                .cloned()
                .collect();
            return TSequence::make(kept, true, true, TInterpolation::Discrete)
                .into_iter()
                .collect();
        }
        if self.num_instants() == 1 {
            if span.contains(&self.start_value().to_double()) {
                return vec![self.clone()];
            }
            return vec![];
        }
        let linear = self.interpolation() == TInterpolation::Linear;
        let instants = self.instants();
        let mut result = Vec::new();
        for (i, pair) in instants.windows(2).enumerate() {
            let lower_inc = if i == 0 { self.is_lower_inclusive() } else { true };
            let last = i == instants.len() - 2;
            let upper_inc = last && self.is_upper_inclusive();
            if let Some(piece) =
                segment_at_span(&pair[0], &pair[1], linear, lower_inc, upper_inc, span)
            {
                result.push(piece);
            }
            // A step segment leaves its final value to the closing instant.
            if !linear && last && self.is_upper_inclusive() {
                let end = &pair[1];
                if span.contains(&end.value().to_double()) {
                    result.push(TSequence::from_instant(
                        end.clone(),
                        self.interpolation(),
                    ));
                }
            }
        }
        result
    }
}

fn temporal_bbox<B: TNumber>(temporal: &Temporal<B>) -> TBox {
    match temporal {
        Temporal::Instant(i) => i.bounding_box(),
        Temporal::Sequence(s) => s.bounding_box().clone(),
        Temporal::SequenceSet(s) => s.bounding_box().clone(),
    }
}

fn temporal_at_span<B: TNumber>(
    temporal: &Temporal<B>,
    span: &FloatSpan,
) -> Option<Temporal<B>> {
    match temporal {
        Temporal::Instant(i) => {
            span.contains(&i.value().to_double()).then(|| temporal.clone())
        }
        Temporal::Sequence(s) => {
            let pieces = s.at_span_pieces(span);
            if s.interpolation() == TInterpolation::Discrete {
                return pieces.into_iter().next().map(Temporal::Sequence);
            }
            collect_pieces(pieces)
        }
        Temporal::SequenceSet(s) => collect_pieces(
            s.sequences()
                .iter()
                .flat_map(|seq| seq.at_span_pieces(span))
                .collect(),
        ),
    }
}

fn collect_pieces<B: TNumber>(pieces: Vec<TSequence<B>>) -> Option<Temporal<B>> {
    match pieces.len() {
        0 => None,
        1 => Some(Temporal::Sequence(pieces.into_iter().next().expect("len is 1"))),
        _ => TSequenceSet::make(pieces).ok().map(Temporal::SequenceSet),
    }
}

/// Stamps the numeric surface onto a concrete temporal number type.
macro_rules! impl_tnumber_temporal {
    ($base:ty) => {
        impl Temporal<$base> {
            /// The bounding box: value range × period.
            pub fn bounding_box(&self) -> TBox {
                temporal_bbox(self)
            }

            /// The range of values taken.
            pub fn value_span(&self) -> FloatSpan {
                self.bounding_box()
                    .to_floatspan()
                    .expect("numeric boxes carry the value dimension")
            }

            /// The set of value ranges, one per sequence.
            pub fn value_spans(&self) -> FloatSpanSet {
                let spans: Vec<FloatSpan> = self
                    .sequences()
                    .iter()
                    .map(|s| {
                        s.bounding_box()
                            .to_floatspan()
                            .expect("numeric boxes carry the value dimension")
                    })
                    .collect();
                FloatSpanSet::new(spans)
            }

            /// Restricts to the instants whose value falls in `span`.
            pub fn at_span(&self, span: &FloatSpan) -> Option<Temporal<$base>> {
                temporal_at_span(self, span)
            }

            /// Restricts to the complement of `span`.
            pub fn minus_span(&self, span: &FloatSpan) -> Option<Temporal<$base>> {
                let complement =
                    FloatSpanSet::from(self.value_span()).minus(&FloatSpanSet::from(*span));
                if complement.is_empty() {
                    return None;
                }
                self.at_spanset(&complement)
            }

            /// Restricts to a set of value ranges.
            pub fn at_spanset(&self, spans: &FloatSpanSet) -> Option<Temporal<$base>> {
                let mut pieces: Vec<Temporal<$base>> = spans
                    .spans()
                    .iter()
                    .filter_map(|span| self.at_span(span))
                    .collect();
                match pieces.len() {
                    0 => None,
                    1 => pieces.pop(),
                    _ => Temporal::merge_array(pieces).ok(),
                }
            }

            /// The pointwise distance to another temporal number, with
            /// crossings inserted so the result is exact piecewise linear.
            pub fn distance(&self, other: &Temporal<$base>) -> Option<Temporal<f64>> {
                lift_binary(
                    self,
                    other,
                    |a: &$base, b: &$base| (a.to_double() - b.to_double()).abs(),
                    true,
                )
            }

            /// The smallest distance ever between two temporal numbers.
            pub fn nearest_approach_distance(&self, other: &Temporal<$base>) -> Option<f64> {
                let distance = self.distance(other)?;
                Some(distance.min_value())
            }
        }
    };
}

impl_tnumber_temporal!(i32);
impl_tnumber_temporal!(f64);

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
    fn bounding_box_caches_value_range() {
        let x = linear(&[(1.0, 0), (5.0, 2), (3.0, 4)]);
        let span = x.value_span();
        assert_eq!(span.lower(), 1.0);
        assert_eq!(span.upper(), 5.0);
    }

    #[test]
    fn at_span_inserts_bound_values() {
        let x = linear(&[(0.0, 0), (10.0, 10)]);
        let at = x.at_span(&(2.0..=4.0).into()).unwrap();
        assert_eq!(at.start_timestamp(), t(2));
        assert_eq!(at.end_timestamp(), t(4));
        // Inserted instants carry the range bounds themselves.
        assert_eq!(at.start_value(), &2.0);
        assert_eq!(at.end_value(), &4.0);
    }

    #[test]
    fn at_span_on_decreasing_segment() {
        let x = linear(&[(10.0, 0), (0.0, 10)]);
        let at = x.at_span(&(2.0..=4.0).into()).unwrap();
        assert_eq!(at.start_timestamp(), t(6));
        assert_eq!(at.end_timestamp(), t(8));
        assert_eq!(at.start_value(), &4.0);
        assert_eq!(at.end_value(), &2.0);
    }

    #[test]
    fn minus_span_leaves_the_complement() {
        let x = linear(&[(0.0, 0), (10.0, 10)]);
        let rest = x.minus_span(&(2.0..=4.0).into()).unwrap();
        assert_eq!(rest.value_at_timestamp(t(3)), None);
        assert_eq!(rest.value_at_timestamp(t(1)), Some(1.0));
        assert_eq!(rest.value_at_timestamp(t(8)), Some(8.0));
    }

    #[test]
    fn distance_kinks_at_the_crossing() {
        let a = linear(&[(0.0, 0), (4.0, 4)]);
        let b = linear(&[(4.0, 0), (0.0, 4)]);
        let d = a.distance(&b).unwrap();
        assert_eq!(d.value_at_timestamp(t(2)), Some(0.0));
        assert_eq!(d.value_at_timestamp(t(0)), Some(4.0));
        assert_eq!(d.min_value(), 0.0);
        assert_eq!(a.nearest_approach_distance(&b), Some(0.0));
    }

    #[test]
    fn int_sequences_are_stepwise() {
        let x: Temporal<i32> = Temporal::Sequence(
            TSequence::make(
                vec![TInstant::new(1, t(0)), TInstant::new(3, t(2))],
                true,
                true,
                TInterpolation::Stepwise,
            )
            .unwrap(),
        );
        assert_eq!(x.value_at_timestamp(t(1)), Some(1));
        let span = x.value_span();
        assert_eq!(span.lower(), 1.0);
        assert_eq!(span.upper(), 3.0);
    }
}
