use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::errors::ParseError;
use crate::temporal::sync::lift_unary;
use crate::temporal::temporal::Temporal;

use super::tnumber::impl_tnumber_arith;

/// A temporal integer; a step temporal number.
pub type TInt = Temporal<i32>;

impl_tnumber_arith!(i32);

impl TInt {
    /// Converts to a temporal float, keeping the step interpolation.
    pub fn to_tfloat(&self) -> Temporal<f64> {
        lift_unary(self, |v| f64::from(*v))
    }
}

impl FromStr for TInt {
    type Err = ParseError;

    /// Parses a temporal integer from its WKT form.
    ///
    /// ## Example
    /// ```
    /// # use tempora::TInt;
    /// let tint: TInt = "{1@2020-01-01, 2@2020-01-02}".parse().unwrap();
    /// assert_eq!(tint.num_instants(), 2);
    /// ```
    fn from_str(string: &str) -> Result<Self, Self::Err> {
        crate::parser::temporal_in(string)
    }
}

impl From<(i32, DateTime<Utc>)> for TInt {
    fn from((value, timestamp): (i32, DateTime<Utc>)) -> Self {
        Temporal::instant(value, timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::interpolation::TInterpolation;
    use crate::temporal::tinstant::TInstant;
    use crate::temporal::tsequence::TSequence;
    use chrono::TimeZone;

    fn t(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn sum_of_step_integers() {
        let a: TInt = Temporal::Sequence(
            TSequence::make(
                vec![TInstant::new(1, t(0)), TInstant::new(2, t(2))],
                true,
                true,
                TInterpolation::Stepwise,
            )
            .unwrap(),
        );
        let b: TInt = Temporal::Sequence(
            TSequence::make(
                vec![TInstant::new(10, t(0)), TInstant::new(20, t(2))],
                true,
                true,
                TInterpolation::Stepwise,
            )
            .unwrap(),
        );
        let sum = (&a + &b).unwrap();
        assert_eq!(sum.value_at_timestamp(t(1)), Some(11));
        assert_eq!(sum.value_at_timestamp(t(2)), Some(22));
    }

    #[test]
    fn to_tfloat_preserves_the_grid() {
        let a: TInt = Temporal::instant(3, t(0));
        let f = a.to_tfloat();
        assert_eq!(f.value_at_timestamp(t(0)), Some(3.0));
    }
}
