use std::fmt;
use std::hash::Hasher;

use chrono::{DateTime, Utc};

use crate::boxes::r#box::BoundingBox;
use crate::boxes::tbox::TBox;
use crate::collections::base::span::Span;
use crate::collections::datetime::tstz_span::TsTzSpan;
use crate::errors::{ParseError, TemporalError};
use crate::parser::Cursor;
use crate::utils::{format_float, FP_TOLERANCE};
use crate::wkb::{WkbReader, WkbWriter};

/// The temporal type built on a base kind; drives WKB type codes and the
/// textual prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TempType {
    Bool,
    Int,
    Float,
    Text,
    GeomPoint,
    GeogPoint,
    Cbuffer,
    Npoint,
    Pose,
    Double2,
    Double3,
    Double4,
}

impl TempType {
    pub(crate) fn wkb_code(self) -> u16 {
        match self {
            TempType::Bool => 1,
            TempType::Int => 2,
            TempType::Float => 3,
            TempType::Text => 4,
            TempType::GeomPoint => 5,
            TempType::GeogPoint => 6,
            TempType::Cbuffer => 7,
            TempType::Npoint => 8,
            TempType::Pose => 9,
            TempType::Double2 => 10,
            TempType::Double3 => 11,
            TempType::Double4 => 12,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TempType::Bool => "tbool",
            TempType::Int => "tint",
            TempType::Float => "tfloat",
            TempType::Text => "ttext",
            TempType::GeomPoint => "tgeompoint",
            TempType::GeogPoint => "tgeogpoint",
            TempType::Cbuffer => "tcbuffer",
            TempType::Npoint => "tnpoint",
            TempType::Pose => "tpose",
            TempType::Double2 => "tdouble2",
            TempType::Double3 => "tdouble3",
            TempType::Double4 => "tdouble4",
        }
    }

    pub fn is_spatial(self) -> bool {
        matches!(
            self,
            TempType::GeomPoint
                | TempType::GeogPoint
                | TempType::Cbuffer
                | TempType::Npoint
                | TempType::Pose
        )
    }
}

/// The per-base-kind dispatch interface. Segment kernels, synchronization
/// and the codecs consult only this trait, so adding a base kind never
/// touches the algorithms.
pub trait BaseType: Clone + fmt::Debug + PartialEq + Sized {
    /// The bounding box cached by sequences over this base kind.
    type Bbox: BoundingBox;

    /// Whether linear interpolation is defined for this kind.
    const CONTINUOUS: bool;

    /// The temporal type carrying this value.
    fn temp_type(&self) -> TempType;

    /// Equality under the kind's tolerance.
    fn eq_tol(&self, other: &Self) -> bool {
        self == other
    }

    /// The value at `ratio` in `[0, 1]` along the segment from `self` to
    /// `other`. Non-continuous kinds keep the start value.
    fn interpolate(&self, other: &Self, ratio: f64) -> Self {
        let _ = (other, ratio);
        self.clone()
    }

    /// Whether `mid` lies on the segment from `self` to `end` at `ratio`.
    fn collinear(&self, mid: &Self, end: &Self, ratio: f64) -> bool {
        if !Self::CONTINUOUS {
            return false;
        }
        self.interpolate(end, ratio).eq_tol(mid)
    }

    /// The ratio in `[0, 1]` at which the linear segment from `self` to
    /// `other` takes `value`, `None` when it never does.
    fn segment_locate(&self, other: &Self, value: &Self) -> Option<f64> {
        let _ = (other, value);
        None
    }

    /// The crossing time of two synchronized linear segments over the
    /// microsecond interval `[t1, t2]`, strictly inside it.
    fn segment_intersection(
        start1: &Self,
        end1: &Self,
        start2: &Self,
        end2: &Self,
        t1: i64,
        t2: i64,
    ) -> Option<i64> {
        let _ = (start1, end1, start2, end2, t1, t2);
        None
    }

    /// SRID of spatial kinds.
    fn srid(&self) -> Option<i32> {
        None
    }

    fn set_srid(&mut self, srid: i32) {
        let _ = srid;
    }

    /// Ensures two values may meet in one operation; spatial kinds reject
    /// SRID and dimensionality mismatches here.
    fn ensure_compatible(&self, other: &Self) -> Result<(), TemporalError> {
        let _ = other;
        Ok(())
    }

    /// The box of a single instant.
    fn instant_bbox(&self, t: DateTime<Utc>) -> Self::Bbox;

    /// Grows `bbox` to also cover `self` observed at `t`.
    fn expand_bbox(&self, bbox: &mut Self::Bbox, t: DateTime<Utc>);

    /// Writes the WKT form of the value.
    fn write_wkt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    /// Parses one value from the cursor, stopping before `@`.
    fn parse_elem(cursor: &mut Cursor<'_>) -> Result<Self, ParseError>;

    fn write_wkb(&self, writer: &mut WkbWriter);

    fn read_wkb(reader: &mut WkbReader<'_>) -> Result<Self, TemporalError>;

    fn hash_value(&self, state: &mut dyn Hasher);
}

// ------------------------- Primitive base kinds ------------------------------

impl BaseType for bool {
    type Bbox = TsTzSpan;
    const CONTINUOUS: bool = false;

    fn temp_type(&self) -> TempType {
        TempType::Bool
    }

    fn instant_bbox(&self, t: DateTime<Utc>) -> TsTzSpan {
        Span::singleton(t)
    }

    fn expand_bbox(&self, bbox: &mut TsTzSpan, t: DateTime<Utc>) {
        bbox.expand(&Span::singleton(t));
    }

    fn write_wkt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if *self { "t" } else { "f" })
    }

    fn parse_elem(cursor: &mut Cursor<'_>) -> Result<Self, ParseError> {
        cursor.parse_bool()
    }

    fn write_wkb(&self, writer: &mut WkbWriter) {
        writer.write_u8(u8::from(*self));
    }

    fn read_wkb(reader: &mut WkbReader<'_>) -> Result<Self, TemporalError> {
        Ok(reader.read_u8()? != 0)
    }

    fn hash_value(&self, state: &mut dyn Hasher) {
        state.write_u8(u8::from(*self));
    }
}

impl BaseType for i32 {
    type Bbox = TBox;
    const CONTINUOUS: bool = false;

    fn temp_type(&self) -> TempType {
        TempType::Int
    }

    fn instant_bbox(&self, t: DateTime<Utc>) -> TBox {
        TBox::from_value_time(f64::from(*self), t)
    }

    fn expand_bbox(&self, bbox: &mut TBox, t: DateTime<Utc>) {
        bbox.expand(&TBox::from_value_time(f64::from(*self), t));
    }

    fn write_wkt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }

    fn parse_elem(cursor: &mut Cursor<'_>) -> Result<Self, ParseError> {
        cursor.parse_i32()
    }

    fn write_wkb(&self, writer: &mut WkbWriter) {
        writer.write_i32(*self);
    }

    fn read_wkb(reader: &mut WkbReader<'_>) -> Result<Self, TemporalError> {
        reader.read_i32()
    }

    fn hash_value(&self, state: &mut dyn Hasher) {
        state.write_i32(*self);
    }
}

impl BaseType for f64 {
    type Bbox = TBox;
    const CONTINUOUS: bool = true;

    fn temp_type(&self) -> TempType {
        TempType::Float
    }

    fn eq_tol(&self, other: &Self) -> bool {
        (self - other).abs() <= FP_TOLERANCE
    }

    fn interpolate(&self, other: &Self, ratio: f64) -> Self {
        // Widened ratio multiplication, matching the extended-precision
        // computation of the segment kernels.
        self + ((*other - *self) * ratio)
    }

    fn segment_locate(&self, other: &Self, value: &Self) -> Option<f64> {
        let (min, max) = if self < other { (*self, *other) } else { (*other, *self) };
        if *value < min || *value > max {
            return None;
        }
        let range = max - min;
        if range == 0.0 {
            return None;
        }
        let partial = value - min;
        let fraction = if self < other { partial / range } else { 1.0 - partial / range };
        if !(-FP_TOLERANCE..=1.0 + FP_TOLERANCE).contains(&fraction) {
            return None;
        }
        Some(fraction.clamp(0.0, 1.0))
    }

    fn segment_intersection(
        start1: &Self,
        end1: &Self,
        start2: &Self,
        end2: &Self,
        t1: i64,
        t2: i64,
    ) -> Option<i64> {
        // The linear functions meet where at + b = ct + d; timestamps are
        // shifted to [0, 1] to limit floating-point error.
        let denom = end1 - start1 - end2 + start2;
        if denom == 0.0 {
            return None;
        }
        let fraction = (start2 - start1) / denom;
        if !(-FP_TOLERANCE..=1.0 + FP_TOLERANCE).contains(&fraction) {
            return None;
        }
        let duration = (t2 - t1) as f64;
        let t = t1 + (duration * fraction).round() as i64;
        if t <= t1 || t >= t2 {
            return None;
        }
        Some(t)
    }

    fn instant_bbox(&self, t: DateTime<Utc>) -> TBox {
        TBox::from_value_time(*self, t)
    }

    fn expand_bbox(&self, bbox: &mut TBox, t: DateTime<Utc>) {
        bbox.expand(&TBox::from_value_time(*self, t));
    }

    fn write_wkt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_float(*self))
    }

    fn parse_elem(cursor: &mut Cursor<'_>) -> Result<Self, ParseError> {
        cursor.parse_f64()
    }

    fn write_wkb(&self, writer: &mut WkbWriter) {
        writer.write_f64(*self);
    }

    fn read_wkb(reader: &mut WkbReader<'_>) -> Result<Self, TemporalError> {
        reader.read_f64()
    }

    fn hash_value(&self, state: &mut dyn Hasher) {
        state.write_u64(self.to_bits());
    }
}

/// The base kind of temporal texts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Text(pub String);

impl Text {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Text {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl BaseType for Text {
    type Bbox = TsTzSpan;
    const CONTINUOUS: bool = false;

    fn temp_type(&self) -> TempType {
        TempType::Text
    }

    fn instant_bbox(&self, t: DateTime<Utc>) -> TsTzSpan {
        Span::singleton(t)
    }

    fn expand_bbox(&self, bbox: &mut TsTzSpan, t: DateTime<Utc>) {
        bbox.expand(&Span::singleton(t));
    }

    fn write_wkt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0.replace('"', "\"\""))
    }

    fn parse_elem(cursor: &mut Cursor<'_>) -> Result<Self, ParseError> {
        cursor.parse_quoted().map(Text)
    }

    fn write_wkb(&self, writer: &mut WkbWriter) {
        writer.write_bytes_with_len(self.0.as_bytes());
    }

    fn read_wkb(reader: &mut WkbReader<'_>) -> Result<Self, TemporalError> {
        let bytes = reader.read_bytes_with_len()?;
        String::from_utf8(bytes)
            .map(Text)
            .map_err(|_| TemporalError::TextInput("text value is not valid UTF-8".into()))
    }

    fn hash_value(&self, state: &mut dyn Hasher) {
        state.write(self.0.as_bytes());
    }
}

// ------------------------- Accumulator kinds ---------------------------------

macro_rules! double_n {
    ($name:ident, $temp:ident, $n:expr, [$($field:ident),+]) => {
        /// Internal accumulator kind; carries no bounding box of its own.
        #[derive(Clone, Copy, Debug, PartialEq)]
        pub struct $name {
            $(pub $field: f64,)+
        }

        impl $name {
            pub fn new($($field: f64),+) -> Self {
                Self { $($field,)+ }
            }
        }

        impl BaseType for $name {
            type Bbox = TsTzSpan;
            const CONTINUOUS: bool = true;

            fn temp_type(&self) -> TempType {
                TempType::$temp
            }

            fn eq_tol(&self, other: &Self) -> bool {
                $( (self.$field - other.$field).abs() <= FP_TOLERANCE && )+ true
            }

            fn interpolate(&self, other: &Self, ratio: f64) -> Self {
                Self {
                    $($field: self.$field + (other.$field - self.$field) * ratio,)+
                }
            }

            fn instant_bbox(&self, t: DateTime<Utc>) -> TsTzSpan {
                Span::singleton(t)
            }

            fn expand_bbox(&self, bbox: &mut TsTzSpan, t: DateTime<Utc>) {
                bbox.expand(&Span::singleton(t));
            }

            fn write_wkt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let parts: Vec<String> = vec![$(format_float(self.$field)),+];
                write!(f, "({})", parts.join(","))
            }

            fn parse_elem(cursor: &mut Cursor<'_>) -> Result<Self, ParseError> {
                cursor.expect_char('(')?;
                let mut fields = [0.0; $n];
                for (i, slot) in fields.iter_mut().enumerate() {
                    if i > 0 {
                        cursor.expect_char(',')?;
                    }
                    *slot = cursor.parse_f64()?;
                }
                cursor.expect_char(')')?;
                let mut iter = fields.into_iter();
                Ok(Self { $($field: iter.next().expect("sized above"),)+ })
            }

            fn write_wkb(&self, writer: &mut WkbWriter) {
                $(writer.write_f64(self.$field);)+
            }

            fn read_wkb(reader: &mut WkbReader<'_>) -> Result<Self, TemporalError> {
                Ok(Self { $($field: reader.read_f64()?,)+ })
            }

            fn hash_value(&self, state: &mut dyn Hasher) {
                $(state.write_u64(self.$field.to_bits());)+
            }
        }
    };
}

double_n!(Double2, Double2, 2, [a, b]);
double_n!(Double3, Double3, 3, [a, b, c]);
double_n!(Double4, Double4, 4, [a, b, c, d]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_locate_on_segment() {
        assert_eq!(1.0f64.segment_locate(&3.0, &2.0), Some(0.5));
        assert_eq!(3.0f64.segment_locate(&1.0, &2.0), Some(0.5));
        assert_eq!(1.0f64.segment_locate(&3.0, &4.0), None);
    }

    #[test]
    fn float_segment_intersection_shifts_to_unit_interval() {
        // Segments 1 -> 3 and 3 -> 1 cross in the middle.
        let t = f64::segment_intersection(&1.0, &3.0, &3.0, &1.0, 0, 1_000_000).unwrap();
        assert_eq!(t, 500_000);
        // Parallel segments never cross.
        assert!(f64::segment_intersection(&1.0, &3.0, &2.0, &4.0, 0, 1_000_000).is_none());
    }

    #[test]
    fn collinearity_uses_the_ratio() {
        assert!(1.0f64.collinear(&2.0, &3.0, 0.5));
        assert!(!1.0f64.collinear(&2.5, &3.0, 0.5));
        // Step kinds are never collinear.
        assert!(!1i32.collinear(&1, &1, 0.5));
    }

    #[test]
    fn double2_componentwise_interpolation() {
        let a = Double2::new(0.0, 10.0);
        let b = Double2::new(4.0, 20.0);
        let mid = a.interpolate(&b, 0.25);
        assert_eq!(mid, Double2::new(1.0, 12.5));
    }
}
