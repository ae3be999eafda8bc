use chrono::{DateTime, Utc};

use crate::temporal::base::BaseType;
use crate::temporal::tinstant::TInstant;
use crate::utils::{from_micros, to_micros, FP_TOLERANCE};

/// The value a segment takes at `t ∈ [t1, t2]`. Under step interpolation
/// the start value holds until the end instant; under linear interpolation
/// the base kind interpolates at the elapsed ratio.
pub(crate) fn segment_value_at<B: BaseType>(
    inst1: &TInstant<B>,
    inst2: &TInstant<B>,
    linear: bool,
    t: DateTime<Utc>,
) -> B {
    if inst1.value() == inst2.value()
        || t == inst1.timestamp()
        || (!linear && t < inst2.timestamp())
    {
        return inst1.value().clone();
    }
    if t == inst2.timestamp() {
        return inst2.value().clone();
    }
    let duration1 = (to_micros(&t) - inst1.timestamp_micros()) as f64;
    let duration2 = (inst2.timestamp_micros() - inst1.timestamp_micros()) as f64;
    inst1.value().interpolate(inst2.value(), duration1 / duration2)
}

/// Where a linear segment takes `value`, strictly inside the segment: the
/// intersection is rejected when the value sits on either bound. Returns
/// the projected value (equal to `value` up to the tolerance) and the
/// timestamp.
pub(crate) fn segment_intersection_value<B: BaseType>(
    inst1: &TInstant<B>,
    inst2: &TInstant<B>,
    value: &B,
) -> Option<(B, DateTime<Utc>)> {
    if inst1.value().eq_tol(value) || inst2.value().eq_tol(value) {
        return None;
    }
    let fraction = inst1.value().segment_locate(inst2.value(), value)?;
    let duration = (inst2.timestamp_micros() - inst1.timestamp_micros()) as f64;
    // Roundoff may push the timestamp onto a bound; the projected value is
    // re-derived from the segment at the computed instant.
    let t = from_micros(inst1.timestamp_micros() + (duration * fraction).round() as i64);
    let projected = segment_value_at(inst1, inst2, true, t);
    Some((projected, t))
}

/// The crossing of two synchronized segments, strictly inside their shared
/// span. Returns the two values taken at the crossing and its timestamp.
///
/// When one side is constant (step interpolation), the crossing is where
/// the other segment passes through that constant value.
pub(crate) fn segment_crossing<B: BaseType>(
    start1: &TInstant<B>,
    end1: &TInstant<B>,
    linear1: bool,
    start2: &TInstant<B>,
    end2: &TInstant<B>,
    linear2: bool,
) -> Option<(B, B, DateTime<Utc>)> {
    if !linear1 {
        let value = start1.value().clone();
        let (projected, t) = segment_intersection_value(start2, end2, &value)?;
        return Some((value, projected, t));
    }
    if !linear2 {
        let value = start2.value().clone();
        let (projected, t) = segment_intersection_value(start1, end1, &value)?;
        return Some((projected, value, t));
    }
    let t1 = start1.timestamp_micros();
    let t2 = end1.timestamp_micros();
    let cross = B::segment_intersection(
        start1.value(),
        end1.value(),
        start2.value(),
        end2.value(),
        t1,
        t2,
    )?;
    let t = from_micros(cross);
    let inter1 = segment_value_at(start1, end1, true, t);
    let inter2 = segment_value_at(start2, end2, true, t);
    Some((inter1, inter2, t))
}

/// Roots of `a·s² + b·s + c` clipped to `[0, duration]`, ascending, kept
/// when `eval` vanishes there under the shared tolerance. This is the
/// turning-point solver shared by the distance and d-within kernels.
pub(crate) fn quadratic_turnpoints(
    a: f64,
    b: f64,
    c: f64,
    duration: f64,
    eval: impl Fn(f64) -> f64,
) -> Vec<f64> {
    let mut roots: Vec<f64> = Vec::with_capacity(2);
    if duration <= FP_TOLERANCE {
        return roots;
    }
    let delta = b * b - 4.0 * a * c;
    if delta < -FP_TOLERANCE {
        return roots;
    }
    let mut push = |candidate: f64| {
        if candidate >= -FP_TOLERANCE
            && candidate <= duration + FP_TOLERANCE
            && eval(candidate.clamp(0.0, duration)).abs() < FP_TOLERANCE
            && !roots
                .iter()
                .any(|r: &f64| (r - candidate).abs() <= FP_TOLERANCE)
        {
            roots.push(candidate.clamp(0.0, duration));
        }
    };
    if a == 0.0 {
        if b.abs() >= FP_TOLERANCE {
            push(-c / b);
        }
    } else {
        let sqrt_delta = delta.max(0.0).sqrt();
        push((-b - sqrt_delta) / (2.0 * a));
        push((-b + sqrt_delta) / (2.0 * a));
    }
    roots.sort_by(|x, y| x.partial_cmp(y).expect("clipped roots are finite"));
    roots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::tinstant::TInstant;
    use chrono::TimeZone;

    fn t(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn step_segment_keeps_start_value() {
        let a = TInstant::new(1.0f64, t(0));
        let b = TInstant::new(5.0f64, t(2));
        assert_eq!(segment_value_at(&a, &b, false, t(1)), 1.0);
        assert_eq!(segment_value_at(&a, &b, false, t(2)), 5.0);
        assert_eq!(segment_value_at(&a, &b, true, t(1)), 3.0);
    }

    #[test]
    fn intersection_value_rejects_bounds() {
        let a = TInstant::new(1.0f64, t(0));
        let b = TInstant::new(3.0f64, t(2));
        assert!(segment_intersection_value(&a, &b, &1.0).is_none());
        let (projected, when) = segment_intersection_value(&a, &b, &2.0).unwrap();
        assert_eq!(when, t(1));
        assert!((projected - 2.0).abs() <= FP_TOLERANCE);
    }

    #[test]
    fn crossing_of_two_linear_segments() {
        let s1 = TInstant::new(1.0f64, t(0));
        let e1 = TInstant::new(3.0f64, t(2));
        let s2 = TInstant::new(3.0f64, t(0));
        let e2 = TInstant::new(1.0f64, t(2));
        let (v1, v2, when) = segment_crossing(&s1, &e1, true, &s2, &e2, true).unwrap();
        assert_eq!(when, t(1));
        assert!((v1 - 2.0).abs() <= FP_TOLERANCE);
        assert!((v2 - 2.0).abs() <= FP_TOLERANCE);
    }

    #[test]
    fn crossing_with_a_step_side() {
        let s1 = TInstant::new(2.0f64, t(0));
        let e1 = TInstant::new(2.0f64, t(2));
        let s2 = TInstant::new(1.0f64, t(0));
        let e2 = TInstant::new(3.0f64, t(2));
        let (v1, _, when) = segment_crossing(&s1, &e1, false, &s2, &e2, true).unwrap();
        assert_eq!(when, t(1));
        assert_eq!(v1, 2.0);
    }

    #[test]
    fn quadratic_solver_clips_and_orders() {
        // s² - 3s + 2 has roots 1 and 2.
        let roots = quadratic_turnpoints(1.0, -3.0, 2.0, 10.0, |s| s * s - 3.0 * s + 2.0);
        assert_eq!(roots.len(), 2);
        assert!((roots[0] - 1.0).abs() < 1e-9);
        assert!((roots[1] - 2.0).abs() < 1e-9);
        // The same roots clipped to a shorter span.
        let roots = quadratic_turnpoints(1.0, -3.0, 2.0, 1.5, |s| s * s - 3.0 * s + 2.0);
        assert_eq!(roots.len(), 1);
    }
}
