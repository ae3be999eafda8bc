use std::str::FromStr;

use crate::collections::datetime::tstz_span_set::TsTzSpanSet;
use crate::errors::ParseError;
use crate::temporal::base::BaseType;
use crate::temporal::sync::{lift_binary, lift_unary};
use crate::temporal::temporal::Temporal;

/// A temporal boolean, the result kind of the lifted comparisons.
pub type TBool = Temporal<bool>;

impl TBool {
    /// Pointwise conjunction.
    pub fn and(&self, other: &TBool) -> Option<TBool> {
        lift_binary(self, other, |a, b| *a && *b, false)
    }

    /// Pointwise disjunction.
    pub fn or(&self, other: &TBool) -> Option<TBool> {
        lift_binary(self, other, |a, b| *a || *b, false)
    }

    /// Pointwise negation.
    pub fn not(&self) -> TBool {
        lift_unary(self, |a| !*a)
    }

    /// The time during which the condition holds.
    pub fn when_true(&self) -> Option<TsTzSpanSet> {
        self.at_value(&true).map(|at| at.time())
    }
}

impl<B: BaseType> Temporal<B> {
    /// Pointwise equality against another temporal value; crossings are
    /// materialized so the truth value flips exactly where the operands
    /// meet.
    pub fn temporal_eq(&self, other: &Temporal<B>) -> Option<TBool> {
        lift_binary(self, other, |a, b| a.eq_tol(b), true)
    }

    /// Pointwise inequality.
    pub fn temporal_ne(&self, other: &Temporal<B>) -> Option<TBool> {
        self.temporal_eq(other).map(|eq| eq.not())
    }
}

impl<B: BaseType + PartialOrd> Temporal<B> {
    /// Pointwise `<` against another temporal value.
    pub fn temporal_lt(&self, other: &Temporal<B>) -> Option<TBool> {
        lift_binary(self, other, |a, b| a < b, true)
    }

    /// Pointwise `<=`.
    pub fn temporal_le(&self, other: &Temporal<B>) -> Option<TBool> {
        lift_binary(self, other, |a, b| a <= b, true)
    }

    /// Pointwise `>`.
    pub fn temporal_gt(&self, other: &Temporal<B>) -> Option<TBool> {
        lift_binary(self, other, |a, b| a > b, true)
    }

    /// Pointwise `>=`.
    pub fn temporal_ge(&self, other: &Temporal<B>) -> Option<TBool> {
        lift_binary(self, other, |a, b| a >= b, true)
    }
}

impl FromStr for TBool {
    type Err = ParseError;

    /// Parses a temporal boolean.
    ///
    /// ## Example
    /// ```
    /// # use tempora::TBool;
    /// let tbool: TBool = "[t@2020-01-01, f@2020-01-02]".parse().unwrap();
    /// assert_eq!(tbool.num_instants(), 2);
    /// ```
    fn from_str(string: &str) -> Result<Self, Self::Err> {
        crate::parser::temporal_in(string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::interpolation::TInterpolation;
    use crate::temporal::tinstant::TInstant;
    use crate::temporal::tsequence::TSequence;
    use chrono::{DateTime, TimeZone, Utc};

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
    fn comparison_and_when_true() {
        let a = linear(&[(1.0, 0), (3.0, 2)]);
        let b = linear(&[(3.0, 0), (1.0, 2)]);
        let lt = a.temporal_lt(&b).unwrap();
        let when = lt.when_true().unwrap();
        // a < b until the crossing at the midpoint.
        assert_eq!(when.bounding_span().unwrap().lower(), t(0));
        assert_eq!(when.bounding_span().unwrap().upper(), t(1));
    }

    #[test]
    fn boolean_algebra() {
        let x: TBool = "[t@2020-01-01, t@2020-01-02]".parse().unwrap();
        let y: TBool = "[f@2020-01-01, f@2020-01-02]".parse().unwrap();
        let and = x.and(&y).unwrap();
        assert_eq!(and.value_set(), vec![false]);
        let or = x.or(&y).unwrap();
        assert_eq!(or.value_set(), vec![true]);
        assert_eq!(x.not().value_set(), vec![false]);
    }

    #[test]
    fn temporal_eq_flips_at_crossing() {
        let a = linear(&[(1.0, 0), (3.0, 2)]);
        let b = linear(&[(3.0, 0), (1.0, 2)]);
        let eq = a.temporal_eq(&b).unwrap();
        assert_eq!(eq.value_at_timestamp(t(1)), Some(true));
        assert_eq!(eq.value_at_timestamp(t(0)), Some(false));
    }
}
