use std::fmt;
use std::hash::Hasher;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::collections::base::span::Span;
use crate::collections::datetime::tstz_span::TsTzSpan;
use crate::errors::{ParseError, TemporalError, TemporalResult};
use crate::geom::point::GeoPoint;
use crate::parser::Cursor;
use crate::temporal::base::{BaseType, TempType};
use crate::temporal::sync::lift_unary;
use crate::temporal::temporal::Temporal;
use crate::utils::{format_float, FP_TOLERANCE};
use crate::wkb::{WkbReader, WkbWriter};

/// A network point: a position along a route of the road network,
/// expressed as a fraction in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NPoint {
    rid: i64,
    pos: f64,
}

impl NPoint {
    pub fn new(rid: i64, pos: f64) -> Result<Self, TemporalError> {
        if !(0.0..=1.0).contains(&pos) {
            return Err(TemporalError::InvalidArg(format!(
                "the relative position of a network point must be in [0, 1]: {pos}"
            )));
        }
        Ok(Self { rid, pos })
    }

    pub fn route(&self) -> i64 {
        self.rid
    }

    pub fn position(&self) -> f64 {
        self.pos
    }
}

impl BaseType for NPoint {
    type Bbox = TsTzSpan;
    const CONTINUOUS: bool = true;

    fn temp_type(&self) -> TempType {
        TempType::Npoint
    }

    fn eq_tol(&self, other: &Self) -> bool {
        self.rid == other.rid && (self.pos - other.pos).abs() <= FP_TOLERANCE
    }

    fn interpolate(&self, other: &Self, ratio: f64) -> Self {
        // Same route id; the position interpolates linearly.
        Self { rid: self.rid, pos: self.pos + (other.pos - self.pos) * ratio }
    }

    fn segment_locate(&self, other: &Self, value: &Self) -> Option<f64> {
        if value.rid != self.rid {
            return None;
        }
        self.pos.segment_locate(&other.pos, &value.pos)
    }

    fn segment_intersection(
        start1: &Self,
        end1: &Self,
        start2: &Self,
        end2: &Self,
        t1: i64,
        t2: i64,
    ) -> Option<i64> {
        if start1.rid != start2.rid {
            return None;
        }
        f64::segment_intersection(&start1.pos, &end1.pos, &start2.pos, &end2.pos, t1, t2)
    }

    fn ensure_compatible(&self, other: &Self) -> Result<(), TemporalError> {
        if self.rid != other.rid {
            return Err(TemporalError::InvalidArg(format!(
                "network points on different routes cannot interpolate: {} and {}",
                self.rid, other.rid
            )));
        }
        Ok(())
    }

    fn instant_bbox(&self, t: DateTime<Utc>) -> TsTzSpan {
        Span::singleton(t)
    }

    fn expand_bbox(&self, bbox: &mut TsTzSpan, t: DateTime<Utc>) {
        bbox.expand(&Span::singleton(t));
    }

    fn write_wkt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NPoint({},{})", self.rid, format_float(self.pos))
    }

    fn parse_elem(cursor: &mut Cursor<'_>) -> Result<Self, ParseError> {
        cursor.expect_keyword("NPoint")?;
        cursor.expect_char('(')?;
        let rid = cursor.parse_i64()?;
        cursor.expect_char(',')?;
        let pos = cursor.parse_f64()?;
        cursor.expect_char(')')?;
        NPoint::new(rid, pos).map_err(|e| ParseError::new(cursor.rest(), e.to_string()))
    }

    fn write_wkb(&self, writer: &mut WkbWriter) {
        writer.write_i64(self.rid);
        writer.write_f64(self.pos);
    }

    fn read_wkb(reader: &mut WkbReader<'_>) -> Result<Self, TemporalError> {
        let rid = reader.read_i64()?;
        let pos = reader.read_f64()?;
        NPoint::new(rid, pos)
    }

    fn hash_value(&self, state: &mut dyn Hasher) {
        state.write_i64(self.rid);
        state.write_u64(self.pos.to_bits());
    }
}

/// A temporal network point.
pub type TNpoint = Temporal<NPoint>;

impl TNpoint {
    /// The routes traversed.
    pub fn routes(&self) -> Vec<i64> {
        let mut routes: Vec<i64> = Vec::new();
        for inst in self.instants() {
            if !routes.contains(&inst.value().rid) {
                routes.push(inst.value().rid);
            }
        }
        routes
    }

    /// The positions taken along the route, as a temporal float.
    pub fn positions(&self) -> Temporal<f64> {
        lift_unary(self, |np: &NPoint| np.pos)
    }

    /// Converts to a temporal point through a route resolver mapping a
    /// (route, position) pair to a point; the resolver stands in for the
    /// road catalog this crate does not own.
    pub fn to_tgeompoint(
        &self,
        resolve: impl Fn(i64, f64) -> Option<GeoPoint>,
    ) -> TemporalResult<Temporal<GeoPoint>> {
        let values = self
            .instants()
            .into_iter()
            .map(|inst| {
                resolve(inst.value().rid, inst.value().pos)
                    .map(|p| (p, inst.timestamp()))
                    .ok_or_else(|| {
                        TemporalError::InvalidArg(format!(
                            "unknown route {}",
                            inst.value().rid
                        ))
                    })
            })
            .collect::<TemporalResult<Vec<_>>>()?;
        Temporal::zip_assemble(self, values)
    }
}

impl FromStr for TNpoint {
    type Err = ParseError;

    /// Parses a temporal network point.
    ///
    /// ## Example
    /// ```
    /// # use tempora::TNpoint;
    /// let tnp: TNpoint = "[NPoint(2,0.1)@2020-01-01, NPoint(2,0.9)@2020-01-02]"
    ///     .parse()
    ///     .unwrap();
    /// assert_eq!(tnp.start_value().route(), 2);
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
    use chrono::TimeZone;

    fn t(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn position_is_clamped_to_the_route() {
        assert!(NPoint::new(1, 1.5).is_err());
        assert!(NPoint::new(1, 0.5).is_ok());
    }

    #[test]
    fn interpolation_stays_on_the_route() {
        let seq: TNpoint = Temporal::Sequence(
            TSequence::make(
                vec![
                    TInstant::new(NPoint::new(7, 0.0).unwrap(), t(0)),
                    TInstant::new(NPoint::new(7, 1.0).unwrap(), t(2)),
                ],
                true,
                true,
                TInterpolation::Linear,
            )
            .unwrap(),
        );
        let mid = seq.value_at_timestamp(t(1)).unwrap();
        assert_eq!(mid.route(), 7);
        assert!((mid.position() - 0.5).abs() <= 1e-12);
    }

    #[test]
    fn mixing_routes_is_rejected() {
        let result = TSequence::make(
            vec![
                TInstant::new(NPoint::new(1, 0.0).unwrap(), t(0)),
                TInstant::new(NPoint::new(2, 1.0).unwrap(), t(2)),
            ],
            true,
            true,
            TInterpolation::Linear,
        );
        assert!(result.is_err());
    }

    #[test]
    fn to_tgeompoint_through_a_resolver() {
        let seq: TNpoint = Temporal::instant(NPoint::new(7, 0.25).unwrap(), t(0));
        // A straight east-west route of length 4.
        let projected = seq
            .to_tgeompoint(|rid, pos| (rid == 7).then(|| GeoPoint::new(4.0 * pos, 0.0, 0)))
            .unwrap();
        assert_eq!(projected.start_value().x(), 1.0);
    }
}
