//! Recursive-descent parser for the WKT surface: temporal values, boxes,
//! spans and sets. Composites are parsed in two passes: the first validates
//! the grammar and counts elements, the second allocates once and fills.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::boxes::stbox::STBox;
use crate::boxes::tbox::TBox;
use crate::collections::base::span::Span;
use crate::collections::datetime::tstz_set::TsTzSet;
use crate::collections::datetime::tstz_span::TsTzSpan;
use crate::collections::datetime::tstz_span_set::TsTzSpanSet;
use crate::collections::number::float_span::FloatSpan;
use crate::errors::ParseError;
use crate::geom::point::GeoPoint;
use crate::geom::{SRID_UNKNOWN, WGS84_SRID};
use crate::temporal::base::BaseType;
use crate::temporal::{TInstant, TInterpolation, TSequence, TSequenceSet, Temporal};

/// A parse cursor over the input string.
pub(crate) struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub(crate) fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn save(&self) -> usize {
        self.pos
    }

    fn restore(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub(crate) fn error(&self, reason: impl Into<String>) -> ParseError {
        let fragment: String = self.rest().chars().take(24).collect();
        ParseError::new(fragment, reason)
    }

    pub(crate) fn skip_whitespace(&mut self) {
        while self.rest().starts_with(|c: char| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.rest().chars().next()
    }

    /// Consumes `expected` if it is the next non-blank character.
    pub(crate) fn eat_char(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.rest().starts_with(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        if self.eat_char(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{expected}'")))
        }
    }

    /// Consumes `keyword` case-insensitively if it comes next.
    pub(crate) fn eat_keyword(&mut self, keyword: &str) -> bool {
        self.skip_whitespace();
        let rest = self.rest();
        if rest.len() >= keyword.len() && rest[..keyword.len()].eq_ignore_ascii_case(keyword) {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_keyword(&mut self, keyword: &str) -> Result<(), ParseError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{keyword}'")))
        }
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        self.skip_whitespace();
        let start = self.pos;
        while let Some(c) = self.rest().chars().next() {
            if predicate(c) {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        &self.input[start..self.pos]
    }

    pub(crate) fn parse_f64(&mut self) -> Result<f64, ParseError> {
        let token = self.take_while(|c| {
            c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')
        });
        token
            .parse::<f64>()
            .map_err(|_| ParseError::new(token, "expected a float"))
    }

    pub(crate) fn parse_i32(&mut self) -> Result<i32, ParseError> {
        let token = self.take_while(|c| c.is_ascii_digit() || matches!(c, '+' | '-'));
        token
            .parse::<i32>()
            .map_err(|_| ParseError::new(token, "expected an integer"))
    }

    pub(crate) fn parse_i64(&mut self) -> Result<i64, ParseError> {
        let token = self.take_while(|c| c.is_ascii_digit() || matches!(c, '+' | '-'));
        token
            .parse::<i64>()
            .map_err(|_| ParseError::new(token, "expected an integer"))
    }

    pub(crate) fn parse_bool(&mut self) -> Result<bool, ParseError> {
        if self.eat_keyword("true") || self.eat_keyword("t") {
            Ok(true)
        } else if self.eat_keyword("false") || self.eat_keyword("f") {
            Ok(false)
        } else {
            Err(self.error("expected a boolean"))
        }
    }

    /// Parses a double-quoted string; `""` escapes a quote.
    pub(crate) fn parse_quoted(&mut self) -> Result<String, ParseError> {
        self.expect_char('"')?;
        let mut value = String::new();
        loop {
            let rest = self.rest();
            let Some(c) = rest.chars().next() else {
                return Err(self.error("unterminated string"));
            };
            self.pos += c.len_utf8();
            if c == '"' {
                if self.rest().starts_with('"') {
                    self.pos += 1;
                    value.push('"');
                } else {
                    return Ok(value);
                }
            } else {
                value.push(c);
            }
        }
    }

    /// Parses a timestamp, stopping at the enclosing delimiter.
    pub(crate) fn parse_timestamp(&mut self) -> Result<DateTime<Utc>, ParseError> {
        let token = self
            .take_while(|c| !matches!(c, ',' | ']' | ')' | '}'))
            .trim_end();
        parse_timestamp_str(token)
    }

    pub(crate) fn expect_end(&mut self) -> Result<(), ParseError> {
        self.skip_whitespace();
        if self.rest().is_empty() {
            Ok(())
        } else {
            Err(self.error("unexpected trailing input"))
        }
    }
}

fn parse_timestamp_str(token: &str) -> Result<DateTime<Utc>, ParseError> {
    const AWARE: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f%#z",
        "%Y-%m-%d %H:%M:%S%#z",
        "%Y-%m-%dT%H:%M:%S%.f%#z",
        "%Y-%m-%d %H:%M%#z",
    ];
    for format in AWARE {
        if let Ok(t) = DateTime::parse_from_str(token, format) {
            return Ok(t.with_timezone(&Utc));
        }
    }
    const NAIVE: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for format in NAIVE {
        if let Ok(t) = NaiveDateTime::parse_from_str(token, format) {
            return Ok(t.and_utc());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(token, "%Y-%m-%d") {
        return Ok(d.and_hms_opt(0, 0, 0).expect("midnight exists").and_utc());
    }
    Err(ParseError::new(token, "expected a timestamp"))
}

/// Parses an `SRID=<n>;` prefix; absent means unknown.
fn srid_prefix(cursor: &mut Cursor<'_>) -> Result<i32, ParseError> {
    if cursor.eat_keyword("SRID=") {
        let srid = cursor.parse_i32()?;
        cursor.expect_char(';')?;
        Ok(srid)
    } else {
        Ok(SRID_UNKNOWN)
    }
}

/// Parses an `Interp=<mode>;` prefix.
fn interp_prefix(cursor: &mut Cursor<'_>) -> Result<Option<TInterpolation>, ParseError> {
    if cursor.eat_keyword("Interp=") {
        let token = cursor.take_while(|c| c.is_ascii_alphabetic());
        let interp: TInterpolation = token.parse()?;
        cursor.expect_char(';')?;
        Ok(Some(interp))
    } else {
        Ok(None)
    }
}

/// Merges a parsed element's SRID with the temporal value's: promotion of
/// the unknown side, rejection of a conflict.
fn merge_srid<B: BaseType>(
    cursor: &Cursor<'_>,
    value: &mut B,
    temp_srid: &mut i32,
) -> Result<(), ParseError> {
    let Some(value_srid) = value.srid() else {
        return Ok(());
    };
    if *temp_srid == SRID_UNKNOWN && value_srid != SRID_UNKNOWN {
        *temp_srid = value_srid;
    } else if *temp_srid != SRID_UNKNOWN && value_srid == SRID_UNKNOWN {
        value.set_srid(*temp_srid);
    } else if *temp_srid != SRID_UNKNOWN && value_srid != SRID_UNKNOWN && *temp_srid != value_srid
    {
        tracing::debug!(temporal = *temp_srid, element = value_srid, "SRID mismatch");
        return Err(cursor.error(format!(
            "element SRID ({value_srid}) does not match temporal SRID ({})",
            *temp_srid
        )));
    }
    Ok(())
}

fn instant_parse<B: BaseType>(
    cursor: &mut Cursor<'_>,
    temp_srid: &mut i32,
) -> Result<TInstant<B>, ParseError> {
    cursor.skip_whitespace();
    let mut value = B::parse_elem(cursor)?;
    merge_srid(cursor, &mut value, temp_srid)?;
    cursor.expect_char('@')?;
    let t = cursor.parse_timestamp()?;
    Ok(TInstant::new(value, t))
}

/// Parses a discrete sequence `{v@t, …}` in two passes.
fn discrete_sequence_parse<B: BaseType>(
    cursor: &mut Cursor<'_>,
    temp_srid: &mut i32,
) -> Result<TSequence<B>, ParseError> {
    cursor.expect_char('{')?;
    let start = cursor.save();
    // First pass: count and validate.
    let mut count = 1;
    instant_parse::<B>(cursor, temp_srid)?;
    while cursor.eat_char(',') {
        count += 1;
        instant_parse::<B>(cursor, temp_srid)?;
    }
    cursor.expect_char('}')?;
    // Second pass: fill.
    cursor.restore(start);
    let mut instants = Vec::with_capacity(count);
    for i in 0..count {
        if i > 0 {
            cursor.eat_char(',');
        }
        instants.push(instant_parse::<B>(cursor, temp_srid)?);
    }
    cursor.eat_char('}');
    TSequence::make(instants, true, true, TInterpolation::Discrete)
        .map_err(|e| cursor.error(e.to_string()))
}

/// Parses a continuous sequence `[v@t, …)` in two passes.
fn continuous_sequence_parse<B: BaseType>(
    cursor: &mut Cursor<'_>,
    interp: TInterpolation,
    temp_srid: &mut i32,
) -> Result<TSequence<B>, ParseError> {
    let lower_inc = if cursor.eat_char('[') {
        true
    } else if cursor.eat_char('(') {
        false
    } else {
        return Err(cursor.error("expected '[' or '('"));
    };
    let start = cursor.save();
    let mut count = 1;
    instant_parse::<B>(cursor, temp_srid)?;
    while cursor.eat_char(',') {
        count += 1;
        instant_parse::<B>(cursor, temp_srid)?;
    }
    let upper_inc = if cursor.eat_char(']') {
        true
    } else if cursor.eat_char(')') {
        false
    } else {
        return Err(cursor.error("expected ']' or ')'"));
    };
    cursor.restore(start);
    let mut instants = Vec::with_capacity(count);
    for i in 0..count {
        if i > 0 {
            cursor.eat_char(',');
        }
        instants.push(instant_parse::<B>(cursor, temp_srid)?);
    }
    if !cursor.eat_char(']') {
        cursor.eat_char(')');
    }
    TSequence::make(instants, lower_inc, upper_inc, interp)
        .map_err(|e| cursor.error(e.to_string()))
}

/// Parses a sequence set `{[…], …}` in two passes.
fn sequence_set_parse<B: BaseType>(
    cursor: &mut Cursor<'_>,
    interp: TInterpolation,
    temp_srid: &mut i32,
) -> Result<TSequenceSet<B>, ParseError> {
    cursor.expect_char('{')?;
    let start = cursor.save();
    let mut count = 1;
    continuous_sequence_parse::<B>(cursor, interp, temp_srid)?;
    while cursor.eat_char(',') {
        count += 1;
        continuous_sequence_parse::<B>(cursor, interp, temp_srid)?;
    }
    cursor.expect_char('}')?;
    cursor.restore(start);
    let mut sequences = Vec::with_capacity(count);
    for i in 0..count {
        if i > 0 {
            cursor.eat_char(',');
        }
        sequences.push(continuous_sequence_parse::<B>(cursor, interp, temp_srid)?);
    }
    cursor.eat_char('}');
    TSequenceSet::make(sequences).map_err(|e| cursor.error(e.to_string()))
}

/// Applies the temporal SRID resolved while parsing to every element left
/// with an unknown one.
fn apply_srid<B: BaseType>(temporal: Temporal<B>, temp_srid: i32) -> Temporal<B> {
    if temp_srid == SRID_UNKNOWN || temporal.srid().is_none() {
        return temporal;
    }
    crate::temporal::sync::lift_unary(&temporal, move |v: &B| {
        let mut v = v.clone();
        if v.srid() == Some(SRID_UNKNOWN) {
            v.set_srid(temp_srid);
        }
        v
    })
}

/// Parses a temporal value of any subtype from its WKT form.
pub(crate) fn temporal_in<B: BaseType>(string: &str) -> Result<Temporal<B>, ParseError> {
    let mut cursor = Cursor::new(string);
    let mut temp_srid = srid_prefix(&mut cursor)?;
    let interp = interp_prefix(&mut cursor)?;
    let default_interp = if B::CONTINUOUS {
        TInterpolation::Linear
    } else {
        TInterpolation::Stepwise
    };
    let interp = interp.unwrap_or(default_interp);
    let result = match cursor.peek() {
        Some('{') => {
            // Distinguish a discrete sequence from a sequence set.
            let save = cursor.save();
            cursor.eat_char('{');
            let next = cursor.peek();
            cursor.restore(save);
            if matches!(next, Some('[') | Some('(')) {
                Temporal::SequenceSet(sequence_set_parse(&mut cursor, interp, &mut temp_srid)?)
            } else {
                Temporal::Sequence(discrete_sequence_parse(&mut cursor, &mut temp_srid)?)
            }
        }
        Some('[') | Some('(') => Temporal::Sequence(continuous_sequence_parse(
            &mut cursor,
            interp,
            &mut temp_srid,
        )?),
        Some(_) => Temporal::Instant(instant_parse(&mut cursor, &mut temp_srid)?),
        None => return Err(cursor.error("empty input")),
    };
    cursor.expect_end()?;
    Ok(apply_srid(result, temp_srid))
}

// ------------------------- Time types ----------------------------------------

fn tstzspan_parse(cursor: &mut Cursor<'_>) -> Result<TsTzSpan, ParseError> {
    let lower_inc = if cursor.eat_char('[') {
        true
    } else if cursor.eat_char('(') {
        false
    } else {
        return Err(cursor.error("expected '[' or '('"));
    };
    let lower = cursor.parse_timestamp()?;
    cursor.expect_char(',')?;
    let upper = cursor.parse_timestamp()?;
    let upper_inc = if cursor.eat_char(']') {
        true
    } else if cursor.eat_char(')') {
        false
    } else {
        return Err(cursor.error("expected ']' or ')'"));
    };
    Span::new(lower, upper, lower_inc, upper_inc).map_err(|e| cursor.error(e.to_string()))
}

pub(crate) fn tstzspan_in(string: &str) -> Result<TsTzSpan, ParseError> {
    let mut cursor = Cursor::new(string);
    let span = tstzspan_parse(&mut cursor)?;
    cursor.expect_end()?;
    Ok(span)
}

pub(crate) fn tstzspanset_in(string: &str) -> Result<TsTzSpanSet, ParseError> {
    let mut cursor = Cursor::new(string);
    cursor.expect_char('{')?;
    let mut spans = vec![tstzspan_parse(&mut cursor)?];
    while cursor.eat_char(',') {
        spans.push(tstzspan_parse(&mut cursor)?);
    }
    cursor.expect_char('}')?;
    cursor.expect_end()?;
    Ok(TsTzSpanSet::new(spans))
}

pub(crate) fn tstzset_in(string: &str) -> Result<TsTzSet, ParseError> {
    let mut cursor = Cursor::new(string);
    cursor.expect_char('{')?;
    let mut elements = vec![cursor.parse_timestamp()?];
    while cursor.eat_char(',') {
        elements.push(cursor.parse_timestamp()?);
    }
    cursor.expect_char('}')?;
    cursor.expect_end()?;
    TsTzSet::new(elements).map_err(|e| cursor.error(e.to_string()))
}

pub(crate) fn floatspan_in(string: &str) -> Result<FloatSpan, ParseError> {
    let mut cursor = Cursor::new(string);
    let span = floatspan_parse(&mut cursor)?;
    cursor.expect_end()?;
    Ok(span)
}

fn floatspan_parse(cursor: &mut Cursor<'_>) -> Result<FloatSpan, ParseError> {
    let lower_inc = if cursor.eat_char('[') {
        true
    } else if cursor.eat_char('(') {
        false
    } else {
        return Err(cursor.error("expected '[' or '('"));
    };
    let lower = cursor.parse_f64()?;
    cursor.expect_char(',')?;
    let upper = cursor.parse_f64()?;
    let upper_inc = if cursor.eat_char(']') {
        true
    } else if cursor.eat_char(')') {
        false
    } else {
        return Err(cursor.error("expected ']' or ')'"));
    };
    Span::new(lower, upper, lower_inc, upper_inc).map_err(|e| cursor.error(e.to_string()))
}

// ------------------------- Geometry ------------------------------------------

/// Parses `POINT(x y)` / `POINT Z (x y z)` with an optional `SRID=<n>;`
/// prefix; `geodetic` selects the geodetic point kind.
pub(crate) fn geopoint_parse(
    cursor: &mut Cursor<'_>,
    geodetic: bool,
) -> Result<GeoPoint, ParseError> {
    let srid = srid_prefix(cursor)?;
    cursor.expect_keyword("POINT")?;
    let explicit_z = cursor.eat_keyword(" Z") || cursor.eat_keyword("Z");
    cursor.expect_char('(')?;
    let x = cursor.parse_f64()?;
    let y = cursor.parse_f64()?;
    let z = if explicit_z { Some(cursor.parse_f64()?) } else { None };
    cursor.expect_char(')')?;
    Ok(GeoPoint::with_parts(x, y, z, geodetic, srid))
}

// ------------------------- Boxes ---------------------------------------------

/// Parses an STBox:
/// `SRID=…;? (GEOD)STBOX (X|Z|T|XT|ZT) (spatial?, period?)`.
pub(crate) fn stbox_in(string: &str) -> Result<STBox, ParseError> {
    let mut cursor = Cursor::new(string);
    let srid = srid_prefix(&mut cursor)?;
    let geodetic = if cursor.eat_keyword("GEODSTBOX") {
        true
    } else if cursor.eat_keyword("STBOX") {
        false
    } else {
        return Err(cursor.error("expected STBOX or GEODSTBOX"));
    };
    let srid = if geodetic && srid == SRID_UNKNOWN { WGS84_SRID } else { srid };
    let (has_x, has_z, has_t) = if cursor.eat_keyword("ZT") {
        (true, true, true)
    } else if cursor.eat_keyword("XT") {
        (true, false, true)
    } else if cursor.eat_keyword("Z") {
        (true, true, false)
    } else if cursor.eat_keyword("X") {
        (true, false, false)
    } else if cursor.eat_keyword("T") {
        (false, false, true)
    } else {
        return Err(cursor.error("expected a dimension signature (X, Z, T, XT, ZT)"));
    };

    // The outer parenthesis wraps the spatial and temporal parts.
    if has_t {
        cursor.expect_char('(')?;
    }
    let (mut xmin, mut xmax, mut ymin, mut ymax, mut zmin, mut zmax) =
        (0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    if has_x {
        cursor.expect_char('(')?;
        cursor.expect_char('(')?;
        xmin = cursor.parse_f64()?;
        cursor.expect_char(',')?;
        ymin = cursor.parse_f64()?;
        if has_z {
            cursor.expect_char(',')?;
            zmin = cursor.parse_f64()?;
        }
        cursor.expect_char(')')?;
        cursor.expect_char(',')?;
        cursor.expect_char('(')?;
        xmax = cursor.parse_f64()?;
        cursor.expect_char(',')?;
        ymax = cursor.parse_f64()?;
        if has_z {
            cursor.expect_char(',')?;
            zmax = cursor.parse_f64()?;
        }
        cursor.expect_char(')')?;
        cursor.expect_char(')')?;
        if has_t {
            cursor.expect_char(',')?;
        }
    }
    let period = if has_t {
        let period = tstzspan_parse(&mut cursor)?;
        cursor.expect_char(')')?;
        Some(period)
    } else {
        None
    };
    cursor.expect_end()?;
    STBox::make(has_x, has_z, geodetic, srid, xmin, xmax, ymin, ymax, zmin, zmax, period)
        .map_err(|e| cursor.error(e.to_string()))
}

/// Parses a TBox: `TBOXFLOAT (X|T|XT) (span?, period?)`; the integer form
/// `TBOXINT` is accepted and read as floats.
pub(crate) fn tbox_in(string: &str) -> Result<TBox, ParseError> {
    let mut cursor = Cursor::new(string);
    if !cursor.eat_keyword("TBOXFLOAT") && !cursor.eat_keyword("TBOXINT") && !cursor.eat_keyword("TBOX")
    {
        return Err(cursor.error("expected TBOX, TBOXINT or TBOXFLOAT"));
    }
    let (has_x, has_t) = if cursor.eat_keyword("XT") {
        (true, true)
    } else if cursor.eat_keyword("X") {
        (true, false)
    } else if cursor.eat_keyword("T") {
        (false, true)
    } else {
        return Err(cursor.error("expected a dimension signature (X, T, XT)"));
    };
    cursor.expect_char('(')?;
    let span = if has_x { Some(floatspan_parse(&mut cursor)?) } else { None };
    let period = if has_t {
        if has_x {
            cursor.expect_char(',')?;
        }
        Some(tstzspan_parse(&mut cursor)?)
    } else {
        None
    };
    cursor.expect_char(')')?;
    cursor.expect_end()?;
    TBox::new(span, period).map_err(|e| cursor.error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_in_several_formats() {
        assert!(parse_timestamp_str("2020-01-01").is_ok());
        assert!(parse_timestamp_str("2020-01-01 08:00:00").is_ok());
        assert!(parse_timestamp_str("2020-01-01 08:00:00+00").is_ok());
        assert!(parse_timestamp_str("2020-01-01 08:00:00.123456+00").is_ok());
        assert!(parse_timestamp_str("not a time").is_err());
    }

    #[test]
    fn temporal_subtype_dispatch() {
        let instant: Temporal<f64> = temporal_in("1.5@2020-01-01").unwrap();
        assert!(instant.is_instant());
        let discrete: Temporal<f64> = temporal_in("{1@2020-01-01, 2@2020-01-02}").unwrap();
        assert_eq!(discrete.interpolation(), TInterpolation::Discrete);
        let seq: Temporal<f64> = temporal_in("[1@2020-01-01, 2@2020-01-02)").unwrap();
        assert!(seq.is_sequence());
        let set: Temporal<f64> =
            temporal_in("{[1@2020-01-01, 2@2020-01-02], [3@2020-01-05, 3@2020-01-06]}").unwrap();
        assert!(set.is_sequence_set());
    }

    #[test]
    fn interp_prefix_overrides_the_default() {
        let step: Temporal<f64> =
            temporal_in("Interp=Step;[1@2020-01-01, 2@2020-01-02]").unwrap();
        assert_eq!(step.interpolation(), TInterpolation::Stepwise);
    }

    #[test]
    fn srid_mismatch_is_rejected() {
        let conflicting = "SRID=4326;[SRID=3857;POINT(0 0)@2020-01-01]";
        assert!(temporal_in::<GeoPoint>(conflicting).is_err());
        // An unknown element SRID is promoted to the outer one.
        let promoted: Temporal<GeoPoint> =
            temporal_in("SRID=4326;[POINT(0 0)@2020-01-01, POINT(1 1)@2020-01-02]").unwrap();
        assert_eq!(promoted.srid(), Some(4326));
    }

    #[test]
    fn element_srid_propagates_outward() {
        let t: Temporal<GeoPoint> =
            temporal_in("[SRID=4326;POINT(0 0)@2020-01-01, POINT(1 1)@2020-01-02]").unwrap();
        assert_eq!(t.srid(), Some(4326));
    }

    #[test]
    fn stbox_grammar() {
        let b = stbox_in("STBOX ZT(((1,2,3),(4,5,6)),[2020-01-01,2020-01-02])").unwrap();
        assert!(b.has_z() && b.has_t());
        assert_eq!(b.zmax(), Some(6.0));
        let b = stbox_in("STBOX X((1,2),(3,4))").unwrap();
        assert!(!b.has_t());
        let b = stbox_in("STBOX T([2020-01-01, 2020-01-02])").unwrap();
        assert!(!b.has_x());
        let b = stbox_in("SRID=4326;GEODSTBOX ZT(((0,0,0),(1,1,1)),[2020-01-01,2020-01-02])")
            .unwrap();
        assert!(b.is_geodetic());
        assert_eq!(b.srid(), 4326);
    }

    #[test]
    fn stbox_display_round_trip() {
        for text in [
            "STBOX X((1,2),(3,4))",
            "STBOX T([2020-01-01 00:00:00+00, 2020-01-02 00:00:00+00])",
            "SRID=4326;GEODSTBOX Z((0,0,0),(1,1,1))",
        ] {
            let parsed = stbox_in(text).unwrap();
            assert_eq!(stbox_in(&parsed.to_string()).unwrap(), parsed);
        }
    }

    #[test]
    fn tbox_grammar() {
        let b = tbox_in("TBOXFLOAT XT([0, 10),[2020-06-01, 2020-06-05])").unwrap();
        assert_eq!(b.xmin(), Some(0.0));
        assert!(b.has_t());
        let b = tbox_in("TBOXINT X([0, 10))").unwrap();
        assert!(!b.has_t());
    }

    #[test]
    fn wkt_round_trip_for_temporals() {
        for text in [
            "1.5@2020-01-01 00:00:00+00",
            "{1@2020-01-01 00:00:00+00, 2@2020-01-02 00:00:00+00}",
            "[1@2020-01-01 00:00:00+00, 2@2020-01-02 00:00:00+00)",
            "Interp=Step;[1@2020-01-01 00:00:00+00, 2@2020-01-02 00:00:00+00]",
            "{[1@2020-01-01 00:00:00+00], [3@2020-01-05 00:00:00+00]}",
        ] {
            let parsed: Temporal<f64> = temporal_in(text).unwrap();
            assert_eq!(parsed.to_string(), text);
        }
    }

    #[test]
    fn point_round_trip() {
        let text = "[POINT(0 0)@2020-01-01 00:00:00+00, POINT(1 1)@2020-01-02 00:00:00+00)";
        let parsed: Temporal<GeoPoint> = temporal_in(text).unwrap();
        assert_eq!(parsed.to_string(), text);
    }
}
