use std::str::FromStr;

use crate::errors::ParseError;
use crate::temporal::base::Text;
use crate::temporal::sync::{lift_binary, lift_unary};
use crate::temporal::temporal::Temporal;

/// A temporal text value.
pub type TText = Temporal<Text>;

impl TText {
    /// Pointwise concatenation with another temporal text.
    pub fn concat(&self, other: &TText) -> Option<TText> {
        lift_binary(
            self,
            other,
            |a: &Text, b: &Text| Text(format!("{}{}", a.0, b.0)),
            false,
        )
    }

    /// Appends a constant suffix to every value.
    pub fn concat_text(&self, suffix: &str) -> TText {
        lift_unary(self, move |a: &Text| Text(format!("{}{}", a.0, suffix)))
    }

    /// Uppercases every value.
    pub fn upper(&self) -> TText {
        lift_unary(self, |a: &Text| Text(a.0.to_uppercase()))
    }

    /// Lowercases every value.
    pub fn lower(&self) -> TText {
        lift_unary(self, |a: &Text| Text(a.0.to_lowercase()))
    }
}

impl FromStr for TText {
    type Err = ParseError;

    /// Parses a temporal text from its WKT form.
    ///
    /// ## Example
    /// ```
    /// # use tempora::TText;
    /// let ttext: TText = "\"hello\"@2020-01-01".parse().unwrap();
    /// assert_eq!(ttext.start_value().as_str(), "hello");
    /// ```
    fn from_str(string: &str) -> Result<Self, Self::Err> {
        crate::parser::temporal_in(string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instant_ttext() {
        let string = "\"text\"@2018-01-01 08:00:00+00";
        let result: TText = string.parse().unwrap();
        assert_eq!(format!("{result:?}"), format!("Instant({string})"));
    }

    #[test]
    fn sequence_ttext() {
        let string = "[\"text\"@2018-01-01 08:00:00+00]";
        let result: TText = string.parse().unwrap();
        assert_eq!(format!("{result:?}"), format!("Sequence({string})"));
    }

    #[test]
    fn sequence_set_ttext() {
        let string = "{[\"text\"@2018-01-01 08:00:00+00]}";
        let result: TText = string.parse().unwrap();
        assert_eq!(format!("{result:?}"), format!("SequenceSet({string})"));
    }

    #[test]
    fn case_mapping_and_concat() {
        let x: TText = "\"abc\"@2018-01-01".parse().unwrap();
        assert_eq!(x.upper().start_value().as_str(), "ABC");
        assert_eq!(x.concat_text("!").start_value().as_str(), "abc!");
        let y: TText = "\"def\"@2018-01-01".parse().unwrap();
        let joined = x.concat(&y).unwrap();
        assert_eq!(joined.start_value().as_str(), "abcdef");
    }
}
