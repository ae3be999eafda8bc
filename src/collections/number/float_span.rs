use std::fmt;
use std::ops::{Range, RangeInclusive};
use std::str::FromStr;

use crate::collections::base::span::Span;
use crate::collections::base::span_set::SpanSet;
use crate::errors::ParseError;
use crate::utils::format_float;

/// A range of float values, the value dimension of temporal numbers.
pub type FloatSpan = Span<f64>;

/// An ordered set of disjoint float ranges.
pub type FloatSpanSet = SpanSet<f64>;

impl FloatSpan {
    /// Returns the width of the span.
    pub fn width(&self) -> f64 {
        self.upper() - self.lower()
    }

    /// Return a new span with both bounds shifted by `delta`.
    pub fn shift(&self, delta: f64) -> FloatSpan {
        Span::new_unchecked(
            self.lower() + delta,
            self.upper() + delta,
            self.is_lower_inclusive(),
            self.is_upper_inclusive(),
        )
    }

    /// Distance from the span to a value; zero when contained.
    pub fn distance_to_value(&self, value: f64) -> f64 {
        if value < self.lower() {
            self.lower() - value
        } else if value > self.upper() {
            value - self.upper()
        } else {
            0.0
        }
    }
}

impl fmt::Display for FloatSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}, {}{}",
            if self.is_lower_inclusive() { '[' } else { '(' },
            format_float(self.lower()),
            format_float(self.upper()),
            if self.is_upper_inclusive() { ']' } else { ')' },
        )
    }
}

impl FromStr for FloatSpan {
    type Err = ParseError;

    /// ## Example
    /// ```
    /// # use tempora::collections::number::FloatSpan;
    /// let span: FloatSpan = "[23.9, 78.8]".parse().unwrap();
    /// assert!(span.is_lower_inclusive());
    /// ```
    fn from_str(string: &str) -> Result<Self, Self::Err> {
        crate::parser::floatspan_in(string)
    }
}

impl From<Range<f64>> for FloatSpan {
    fn from(Range { start, end }: Range<f64>) -> Self {
        Span::new_unchecked(start, end, true, false)
    }
}

impl From<RangeInclusive<f64>> for FloatSpan {
    fn from(range: RangeInclusive<f64>) -> Self {
        Span::new_unchecked(*range.start(), *range.end(), true, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_and_shift() {
        let span: FloatSpan = (1.0..=4.0).into();
        assert_eq!(span.width(), 3.0);
        assert_eq!(span.shift(2.0).lower(), 3.0);
    }

    #[test]
    fn parse_and_display() {
        let span: FloatSpan = "(1.5, 4]".parse().unwrap();
        assert_eq!(span.to_string(), "(1.5, 4]");
    }
}
