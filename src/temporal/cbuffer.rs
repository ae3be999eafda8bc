use std::fmt;
use std::hash::Hasher;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::boxes::stbox::STBox;
use crate::errors::{ParseError, TemporalError, TemporalResult};
use crate::geom::point::GeoPoint;
use crate::parser::Cursor;
use crate::temporal::base::{BaseType, TempType};
use crate::temporal::segment::quadratic_turnpoints;
use crate::temporal::sync::{lift_binary_turnpoints, lift_unary, synchronize};
use crate::temporal::temporal::Temporal;
use crate::temporal::tinstant::TInstant;
use crate::utils::{format_float, from_micros, FP_TOLERANCE};
use crate::wkb::{WkbReader, WkbWriter};

/// A circular buffer: a planar centre point with a radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cbuffer {
    point: GeoPoint,
    radius: f64,
}

impl Cbuffer {
    pub fn new(point: GeoPoint, radius: f64) -> Result<Self, TemporalError> {
        if radius < 0.0 {
            return Err(TemporalError::InvalidArg(
                "the radius of a circular buffer cannot be negative".into(),
            ));
        }
        Ok(Self { point, radius })
    }

    pub fn point(&self) -> &GeoPoint {
        &self.point
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Distance between two circular buffers: centre distance minus both
    /// radii, zero when they overlap.
    pub fn distance(&self, other: &Self) -> f64 {
        (self.point.distance(&other.point) - self.radius - other.radius).max(0.0)
    }

    /// Grows the buffer by `d`.
    pub fn expand(&self, d: f64) -> Self {
        Self { point: self.point, radius: (self.radius + d).max(0.0) }
    }
}

/// Signed distance between two cbuffer segments at offset `s` after the
/// segment start, given the relative start offset, velocity and radius sum.
fn segment_distance_at(dx0: f64, dy0: f64, vx: f64, vy: f64, r0: f64, vr: f64, s: f64) -> f64 {
    let dx = dx0 + vx * s;
    let dy = dy0 + vy * s;
    (dx * dx + dy * dy).sqrt() - (r0 + vr * s)
}

/// The timestamps at which two cbuffer segments are exactly at distance
/// `d` from each other: the turning points of the temporal distance.
/// Returns zero, one or two timestamps in ascending order.
pub fn cbuffer_dwithin_turnpoints(
    start1: &Cbuffer,
    end1: &Cbuffer,
    start2: &Cbuffer,
    end2: &Cbuffer,
    d: f64,
    lower: DateTime<Utc>,
    upper: DateTime<Utc>,
) -> Vec<DateTime<Utc>> {
    let lower_micros = crate::utils::to_micros(&lower);
    let upper_micros = crate::utils::to_micros(&upper);
    let duration = (upper_micros - lower_micros) as f64;
    if duration <= FP_TOLERANCE {
        return vec![];
    }
    // Relative initial position, velocity and combined radius.
    let dx0 = start1.point.x() - start2.point.x();
    let dy0 = start1.point.y() - start2.point.y();
    let r0 = start1.radius + start2.radius;
    let vx = (end1.point.x() - start1.point.x() - (end2.point.x() - start2.point.x())) / duration;
    let vy = (end1.point.y() - start1.point.y() - (end2.point.y() - start2.point.y())) / duration;
    let vr = (end1.radius - start1.radius + end2.radius - start2.radius) / duration;

    // (distance − d)² vanishes on the roots of a quadratic in s.
    let a = vx * vx + vy * vy - vr * vr;
    let b = 2.0 * (dx0 * vx + dy0 * vy - (r0 + d) * vr);
    let c = dx0 * dx0 + dy0 * dy0 - (r0 + d) * (r0 + d);
    quadratic_turnpoints(a, b, c, duration, |s| {
        segment_distance_at(dx0, dy0, vx, vy, r0, vr, s) - d
    })
    .into_iter()
    .map(|s| from_micros(lower_micros + s.round() as i64))
    .collect()
}

impl BaseType for Cbuffer {
    type Bbox = STBox;
    const CONTINUOUS: bool = true;

    fn temp_type(&self) -> TempType {
        TempType::Cbuffer
    }

    fn eq_tol(&self, other: &Self) -> bool {
        self.point.eq_tol(&other.point) && (self.radius - other.radius).abs() <= FP_TOLERANCE
    }

    fn interpolate(&self, other: &Self, ratio: f64) -> Self {
        Self {
            point: self.point.interpolate(&other.point, ratio),
            radius: self.radius + (other.radius - self.radius) * ratio,
        }
    }

    fn segment_locate(&self, other: &Self, value: &Self) -> Option<f64> {
        let ratio = self.point.locate_along(&other.point, &value.point)?;
        let radius = self.radius + (other.radius - self.radius) * ratio;
        ((radius - value.radius).abs() <= FP_TOLERANCE).then_some(ratio)
    }

    fn segment_intersection(
        start1: &Self,
        end1: &Self,
        start2: &Self,
        end2: &Self,
        t1: i64,
        t2: i64,
    ) -> Option<i64> {
        let roots = cbuffer_dwithin_turnpoints(
            start1,
            end1,
            start2,
            end2,
            0.0,
            from_micros(t1),
            from_micros(t2),
        );
        roots
            .into_iter()
            .map(|t| crate::utils::to_micros(&t))
            .find(|&t| t > t1 && t < t2)
    }

    fn srid(&self) -> Option<i32> {
        Some(self.point.srid())
    }

    fn set_srid(&mut self, srid: i32) {
        self.point.set_srid(srid);
    }

    fn ensure_compatible(&self, other: &Self) -> Result<(), TemporalError> {
        self.point.ensure_compatible(&other.point)
    }

    fn instant_bbox(&self, t: DateTime<Utc>) -> STBox {
        let centre = STBox::from_geo_timestamp(&self.point, t);
        centre
            .expand_space(self.radius)
            .expect("a cbuffer box always has the spatial dimension")
    }

    fn expand_bbox(&self, bbox: &mut STBox, t: DateTime<Utc>) {
        bbox.expand(&self.instant_bbox(t));
    }

    fn write_wkt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cbuffer({},{})", self.point.wkt(), format_float(self.radius))
    }

    fn parse_elem(cursor: &mut Cursor<'_>) -> Result<Self, ParseError> {
        cursor.expect_keyword("Cbuffer")?;
        cursor.expect_char('(')?;
        let point = GeoPoint::parse_wkt(cursor, false)?;
        cursor.expect_char(',')?;
        let radius = cursor.parse_f64()?;
        cursor.expect_char(')')?;
        Cbuffer::new(point, radius)
            .map_err(|e| ParseError::new(cursor.rest(), e.to_string()))
    }

    fn write_wkb(&self, writer: &mut WkbWriter) {
        self.point.write_wkb(writer);
        writer.write_f64(self.radius);
    }

    fn read_wkb(reader: &mut WkbReader<'_>) -> Result<Self, TemporalError> {
        let point = GeoPoint::read_wkb(reader)?;
        let radius = reader.read_f64()?;
        Cbuffer::new(point, radius)
    }

    fn hash_value(&self, state: &mut dyn Hasher) {
        self.point.hash_value(state);
        state.write_u64(self.radius.to_bits());
    }
}

/// A temporal circular buffer.
pub type TCbuffer = Temporal<Cbuffer>;

fn cbuffer_distance_turnpoint(
    s1: &TInstant<Cbuffer>,
    e1: &TInstant<Cbuffer>,
    s2: &TInstant<Cbuffer>,
    e2: &TInstant<Cbuffer>,
) -> Vec<DateTime<Utc>> {
    cbuffer_dwithin_turnpoints(
        s1.value(),
        e1.value(),
        s2.value(),
        e2.value(),
        0.0,
        s1.timestamp(),
        e1.timestamp(),
    )
    .into_iter()
    .filter(|t| *t > s1.timestamp() && *t < e1.timestamp())
    .collect()
}

impl TCbuffer {
    /// Assembles a temporal circular buffer from a temporal point and a
    /// temporal float, synchronized without crossings.
    pub fn make(
        tpoint: &Temporal<GeoPoint>,
        tfloat: &Temporal<f64>,
    ) -> TemporalResult<TCbuffer> {
        if let Some(value) = tpoint.instants().first() {
            if value.value().has_z() || value.value().is_geodetic() {
                return Err(TemporalError::InvalidArg(
                    "a temporal circular buffer needs a planar 2D centre".into(),
                ));
            }
        }
        let (points, radii) = synchronize(tpoint, tfloat).ok_or_else(|| {
            TemporalError::InvalidArg("the values do not intersect in time".into())
        })?;
        let paired: Vec<(GeoPoint, f64, DateTime<Utc>)> = points
            .instants()
            .into_iter()
            .zip(radii.instants())
            .map(|(p, r)| (*p.value(), *r.value(), p.timestamp()))
            .collect();
        crate::temporal::temporal::Temporal::zip_assemble(
            &points,
            paired
                .into_iter()
                .map(|(point, radius, t)| Ok((Cbuffer::new(point, radius)?, t)))
                .collect::<TemporalResult<Vec<_>>>()?,
        )
    }

    /// The movement of the centre: drops the radius.
    pub fn to_tgeompoint(&self) -> Temporal<GeoPoint> {
        lift_unary(self, |cb: &Cbuffer| *cb.point())
    }

    /// The evolution of the radius: drops the centre.
    pub fn to_tfloat(&self) -> Temporal<f64> {
        lift_unary(self, |cb: &Cbuffer| cb.radius())
    }

    /// Builds a temporal circular buffer from a temporal geometry; each
    /// point is approximated by its minimum bounding circle, a zero-radius
    /// buffer.
    pub fn from_tgeompoint(tpoint: &Temporal<GeoPoint>) -> TemporalResult<TCbuffer> {
        TCbuffer::make(tpoint, &lift_unary(tpoint, |_| 0.0f64))
    }

    /// Grows every buffer by `d`.
    pub fn expand(&self, d: f64) -> TCbuffer {
        lift_unary(self, move |cb: &Cbuffer| cb.expand(d))
    }

    /// The temporal distance to another temporal circular buffer, with the
    /// touching instants of every segment pair materialized.
    pub fn distance(&self, other: &TCbuffer) -> Option<Temporal<f64>> {
        lift_binary_turnpoints(
            self,
            other,
            |a, b| a.distance(b),
            &cbuffer_distance_turnpoint,
        )
    }

    /// The smallest distance ever between two temporal circular buffers.
    pub fn nearest_approach_distance(&self, other: &TCbuffer) -> Option<f64> {
        Some(self.distance(other)?.min_value())
    }

    /// Returns whether the buffers ever come within `d` of each other.
    pub fn ever_dwithin(&self, other: &TCbuffer, d: f64) -> Option<bool> {
        Some(self.nearest_approach_distance(other)? <= d + FP_TOLERANCE)
    }
}

impl FromStr for TCbuffer {
    type Err = ParseError;

    /// Parses a temporal circular buffer.
    ///
    /// ## Example
    /// ```
    /// # use tempora::TCbuffer;
    /// let tcb: TCbuffer = "Cbuffer(POINT(1 1),0.5)@2020-01-01".parse().unwrap();
    /// assert_eq!(tcb.start_value().radius(), 0.5);
    /// ```
    fn from_str(string: &str) -> Result<Self, Self::Err> {
        crate::parser::temporal_in(string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::interpolation::TInterpolation;
    use crate::temporal::tsequence::TSequence;
    use chrono::TimeZone;

    fn t(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, h, 0, 0).unwrap()
    }

    fn cb(x: f64, y: f64, r: f64) -> Cbuffer {
        Cbuffer::new(GeoPoint::new(x, y, 0), r).unwrap()
    }

    #[test]
    fn head_on_buffers_touch_at_the_midpoint() {
        // Centres (0,0)→(10,0) and (10,0)→(0,0), radii 1, threshold 0:
        // exactly one turning point at the midpoint.
        let roots = cbuffer_dwithin_turnpoints(
            &cb(0.0, 0.0, 1.0),
            &cb(10.0, 0.0, 1.0),
            &cb(10.0, 0.0, 1.0),
            &cb(0.0, 0.0, 1.0),
            0.0,
            t(0),
            t(2),
        );
        // The circles touch when the centres are 2 apart, symmetrically
        // before and after the crossing.
        assert_eq!(roots.len(), 2);
        let mid = t(1);
        let before = roots[0];
        let after = roots[1];
        assert!(before < mid && mid < after);
        let skew = (mid - before).num_microseconds().unwrap()
            - (after - mid).num_microseconds().unwrap();
        assert!(skew.abs() <= 1, "touch instants straddle the crossing");
    }

    #[test]
    fn growing_buffers_reach_each_other_once() {
        // Static centres 10 apart; radii grow from 0 to 10: they first
        // touch when the radii sum to 10, at 50% of the span.
        let roots = cbuffer_dwithin_turnpoints(
            &cb(0.0, 0.0, 0.0),
            &cb(0.0, 0.0, 10.0),
            &cb(10.0, 0.0, 0.0),
            &cb(10.0, 0.0, 10.0),
            0.0,
            t(0),
            t(2),
        );
        assert_eq!(roots.len(), 1);
        let off = (roots[0] - t(1)).num_microseconds().unwrap();
        assert!(off.abs() <= 1, "first touch sits at the midpoint");
    }

    #[test]
    fn assemble_and_project_back() {
        let point: Temporal<GeoPoint> = Temporal::Sequence(
            TSequence::make(
                vec![
                    TInstant::new(GeoPoint::new(0.0, 0.0, 0), t(0)),
                    TInstant::new(GeoPoint::new(4.0, 0.0, 0), t(4)),
                ],
                true,
                true,
                TInterpolation::Linear,
            )
            .unwrap(),
        );
        let radius: Temporal<f64> = Temporal::Sequence(
            TSequence::make(
                vec![TInstant::new(1.0, t(0)), TInstant::new(2.0, t(4))],
                true,
                true,
                TInterpolation::Linear,
            )
            .unwrap(),
        );
        let tcb = TCbuffer::make(&point, &radius).unwrap();
        assert_eq!(tcb.start_value().radius(), 1.0);
        let back = tcb.to_tgeompoint();
        assert_eq!(back.end_value().x(), 4.0);
        let radii = tcb.to_tfloat();
        assert_eq!(radii.end_value(), &2.0);
    }

    #[test]
    fn distance_of_crossing_buffers_dips_to_zero() {
        let a: TCbuffer = Temporal::Sequence(
            TSequence::make(
                vec![
                    TInstant::new(cb(0.0, 0.0, 1.0), t(0)),
                    TInstant::new(cb(10.0, 0.0, 1.0), t(2)),
                ],
                true,
                true,
                TInterpolation::Linear,
            )
            .unwrap(),
        );
        let b: TCbuffer = Temporal::Sequence(
            TSequence::make(
                vec![
                    TInstant::new(cb(10.0, 0.0, 1.0), t(0)),
                    TInstant::new(cb(0.0, 0.0, 1.0), t(2)),
                ],
                true,
                true,
                TInterpolation::Linear,
            )
            .unwrap(),
        );
        assert_eq!(a.nearest_approach_distance(&b), Some(0.0));
        assert_eq!(a.ever_dwithin(&b, 0.0), Some(true));
    }
}
