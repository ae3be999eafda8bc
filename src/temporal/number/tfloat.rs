use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::errors::ParseError;
use crate::temporal::interpolation::TInterpolation;
use crate::temporal::sync::{lift_binary, lift_binary_turnpoints, lift_unary};
use crate::temporal::temporal::Temporal;
use crate::temporal::tinstant::TInstant;
use crate::utils::{from_micros, FP_TOLERANCE};

/// A temporal float; the continuous temporal number.
pub type TFloat = Temporal<f64>;

use super::tnumber::impl_tnumber_arith;

impl_tnumber_arith!(f64);

/// The time at which the product of two linear segments reaches its
/// extremum, strictly inside the segment.
fn product_turnpoint(
    s1: &TInstant<f64>,
    e1: &TInstant<f64>,
    s2: &TInstant<f64>,
    e2: &TInstant<f64>,
) -> Vec<DateTime<Utc>> {
    let a0 = *s1.value();
    let va = *e1.value() - a0;
    let b0 = *s2.value();
    let vb = *e2.value() - b0;
    // (a0 + va·s)(b0 + vb·s) peaks where the derivative vanishes.
    let denom = 2.0 * va * vb;
    if denom.abs() <= FP_TOLERANCE {
        return vec![];
    }
    let s = -(a0 * vb + b0 * va) / denom;
    if s <= FP_TOLERANCE || s >= 1.0 - FP_TOLERANCE {
        return vec![];
    }
    let duration = (e1.timestamp_micros() - s1.timestamp_micros()) as f64;
    vec![from_micros(s1.timestamp_micros() + (duration * s).round() as i64)]
}

impl std::ops::Mul for &TFloat {
    type Output = Option<TFloat>;

    /// Pointwise product; the extremum of each quadratic piece is
    /// materialized as an extra instant.
    fn mul(self, other: Self) -> Self::Output {
        lift_binary_turnpoints(self, other, |a, b| a * b, &product_turnpoint)
    }
}

impl std::ops::Div for &TFloat {
    type Output = Option<TFloat>;

    /// Pointwise quotient; crossings of the divisor through zero become
    /// grid points.
    fn div(self, other: Self) -> Self::Output {
        if other.ever_eq(&0.0) {
            return None;
        }
        lift_binary(self, other, |a, b| a / b, true)
    }
}

impl TFloat {
    /// Rounds every value to `max_decimals` decimal digits.
    pub fn round(&self, max_decimals: u32) -> TFloat {
        let factor = 10f64.powi(max_decimals as i32);
        lift_unary(self, move |v| (v * factor).round() / factor)
    }

    /// Converts to a temporal integer, truncating; only lossless for step
    /// and discrete interpolation.
    pub fn to_tint(&self) -> Option<Temporal<i32>> {
        if self.interpolation() == TInterpolation::Linear {
            return None;
        }
        Some(lift_unary(self, |v| *v as i32))
    }

    /// Return a new temporal float with the value dimension shifted by
    /// `shift` and scaled so its width becomes `width`.
    pub fn shift_scale_value(&self, shift: Option<f64>, width: Option<f64>) -> TFloat {
        let span = self.value_span();
        let min = span.lower();
        let old_width = span.upper() - span.lower();
        let delta = shift.unwrap_or(0.0);
        let scale = match width {
            Some(w) if old_width > 0.0 => w / old_width,
            _ => 1.0,
        };
        lift_unary(self, move |v| min + delta + (v - min) * scale)
    }
}

impl FromStr for TFloat {
    type Err = ParseError;

    /// Parses a temporal float from its WKT form.
    ///
    /// ## Example
    /// ```
    /// # use tempora::TFloat;
    /// let tfloat: TFloat = "[1.5@2020-01-01, 2.5@2020-01-02)".parse().unwrap();
    /// assert_eq!(tfloat.num_instants(), 2);
    /// ```
    fn from_str(string: &str) -> Result<Self, Self::Err> {
        crate::parser::temporal_in(string)
    }
}

impl From<(f64, DateTime<Utc>)> for TFloat {
    fn from((value, timestamp): (f64, DateTime<Utc>)) -> Self {
        Temporal::instant(value, timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::tsequence::TSequence;
    use chrono::TimeZone;

    fn t(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, h, 0, 0).unwrap()
    }

    fn linear(values: &[(f64, u32)]) -> TFloat {
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
    fn sum_is_pointwise() {
        let a = linear(&[(1.0, 0), (3.0, 2)]);
        let b = linear(&[(2.0, 0), (2.0, 2)]);
        let sum = (&a + &b).unwrap();
        assert_eq!(sum.value_at_timestamp(t(1)), Some(4.0));
    }

    #[test]
    fn product_materializes_the_vertex() {
        // (t)·(2-t) over [0, 2] peaks at t = 1.
        let a = linear(&[(0.0, 0), (2.0, 2)]);
        let b = linear(&[(2.0, 0), (0.0, 2)]);
        let product = (&a * &b).unwrap();
        assert!(product.timestamps().contains(&t(1)));
        assert_eq!(product.value_at_timestamp(t(1)), Some(1.0));
        assert_eq!(product.max_value(), 1.0);
    }

    #[test]
    fn division_by_a_zero_crossing_divisor_fails() {
        let a = linear(&[(1.0, 0), (1.0, 2)]);
        let b = linear(&[(-1.0, 0), (1.0, 2)]);
        assert!((&a / &b).is_none());
        let c = linear(&[(2.0, 0), (4.0, 2)]);
        let quotient = (&a / &c).unwrap();
        assert_eq!(quotient.value_at_timestamp(t(0)), Some(0.5));
    }

    #[test]
    fn shift_scale_value_moves_the_range() {
        let x = linear(&[(0.0, 0), (10.0, 2)]);
        let scaled = x.shift_scale_value(Some(5.0), Some(20.0));
        let span = scaled.value_span();
        assert_eq!(span.lower(), 5.0);
        assert_eq!(span.upper(), 25.0);
    }
}
