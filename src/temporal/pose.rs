use std::f64::consts::PI;
use std::fmt;
use std::hash::Hasher;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::boxes::stbox::STBox;
use crate::errors::{ParseError, TemporalError, TemporalResult};
use crate::geom::point::GeoPoint;
use crate::parser::Cursor;
use crate::temporal::base::{BaseType, TempType};
use crate::temporal::sync::{lift_unary, synchronize};
use crate::temporal::temporal::Temporal;
use crate::utils::{format_float, FP_TOLERANCE};
use crate::wkb::{WkbReader, WkbWriter};

/// A rigid 2D pose: a planar position with a rotation in `(-π, π]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    point: GeoPoint,
    rotation: f64,
}

/// Normalizes an angle into `(-π, π]`.
fn normalize_rotation(theta: f64) -> f64 {
    let mut theta = theta % (2.0 * PI);
    if theta <= -PI {
        theta += 2.0 * PI;
    } else if theta > PI {
        theta -= 2.0 * PI;
    }
    theta
}

impl Pose {
    pub fn new(point: GeoPoint, rotation: f64) -> Result<Self, TemporalError> {
        if point.has_z() || point.is_geodetic() {
            return Err(TemporalError::InvalidArg(
                "a 2D pose needs a planar 2D position".into(),
            ));
        }
        Ok(Self { point, rotation: normalize_rotation(rotation) })
    }

    pub fn point(&self) -> &GeoPoint {
        &self.point
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }
}

impl BaseType for Pose {
    type Bbox = STBox;
    const CONTINUOUS: bool = true;

    fn temp_type(&self) -> TempType {
        TempType::Pose
    }

    fn eq_tol(&self, other: &Self) -> bool {
        self.point.eq_tol(&other.point)
            && normalize_rotation(self.rotation - other.rotation).abs() <= FP_TOLERANCE
    }

    fn interpolate(&self, other: &Self, ratio: f64) -> Self {
        // Positional part linear, rotational part along the shortest arc.
        let delta = normalize_rotation(other.rotation - self.rotation);
        Self {
            point: self.point.interpolate(&other.point, ratio),
            rotation: normalize_rotation(self.rotation + delta * ratio),
        }
    }

    fn segment_locate(&self, other: &Self, value: &Self) -> Option<f64> {
        let ratio = self.point.locate_along(&other.point, &value.point)?;
        let candidate = self.interpolate(other, ratio);
        candidate.eq_tol(value).then_some(ratio)
    }

    fn segment_intersection(
        start1: &Self,
        end1: &Self,
        start2: &Self,
        end2: &Self,
        t1: i64,
        t2: i64,
    ) -> Option<i64> {
        // The positions must meet, and the interpolated poses must agree
        // there, orientation included.
        let cross = GeoPoint::segment_intersection(
            &start1.point,
            &end1.point,
            &start2.point,
            &end2.point,
            t1,
            t2,
        )?;
        let ratio = (cross - t1) as f64 / (t2 - t1) as f64;
        let pose1 = start1.interpolate(end1, ratio);
        let pose2 = start2.interpolate(end2, ratio);
        pose1.eq_tol(&pose2).then_some(cross)
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
        STBox::from_geo_timestamp(&self.point, t)
    }

    fn expand_bbox(&self, bbox: &mut STBox, t: DateTime<Utc>) {
        bbox.expand(&STBox::from_geo_timestamp(&self.point, t));
    }

    fn write_wkt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pose({},{})", self.point.wkt(), format_float(self.rotation))
    }

    fn parse_elem(cursor: &mut Cursor<'_>) -> Result<Self, ParseError> {
        cursor.expect_keyword("Pose")?;
        cursor.expect_char('(')?;
        let point = GeoPoint::parse_wkt(cursor, false)?;
        cursor.expect_char(',')?;
        let rotation = cursor.parse_f64()?;
        cursor.expect_char(')')?;
        Pose::new(point, rotation).map_err(|e| ParseError::new(cursor.rest(), e.to_string()))
    }

    fn write_wkb(&self, writer: &mut WkbWriter) {
        self.point.write_wkb(writer);
        writer.write_f64(self.rotation);
    }

    fn read_wkb(reader: &mut WkbReader<'_>) -> Result<Self, TemporalError> {
        let point = GeoPoint::read_wkb(reader)?;
        let rotation = reader.read_f64()?;
        Pose::new(point, rotation)
    }

    fn hash_value(&self, state: &mut dyn Hasher) {
        self.point.hash_value(state);
        state.write_u64(self.rotation.to_bits());
    }
}

/// A temporal rigid 2D pose.
pub type TPose = Temporal<Pose>;

impl TPose {
    /// Assembles a temporal pose from a temporal point and a temporal
    /// float carrying the rotation, synchronized without crossings.
    pub fn make(tpoint: &Temporal<GeoPoint>, trotation: &Temporal<f64>) -> TemporalResult<TPose> {
        let (points, rotations) = synchronize(tpoint, trotation).ok_or_else(|| {
            TemporalError::InvalidArg("the values do not intersect in time".into())
        })?;
        let values = points
            .instants()
            .into_iter()
            .zip(rotations.instants())
            .map(|(p, r)| Ok((Pose::new(*p.value(), *r.value())?, p.timestamp())))
            .collect::<TemporalResult<Vec<_>>>()?;
        Temporal::zip_assemble(&points, values)
    }

    /// The positional component.
    pub fn to_tpoint(&self) -> Temporal<GeoPoint> {
        lift_unary(self, |pose: &Pose| *pose.point())
    }

    /// The rotational component as a temporal float.
    pub fn rotation(&self) -> Temporal<f64> {
        lift_unary(self, |pose: &Pose| pose.rotation())
    }
}

impl FromStr for TPose {
    type Err = ParseError;

    /// Parses a temporal pose.
    ///
    /// ## Example
    /// ```
    /// # use tempora::TPose;
    /// let tpose: TPose = "Pose(POINT(1 1),0.5)@2020-01-01".parse().unwrap();
    /// assert_eq!(tpose.start_value().rotation(), 0.5);
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
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn t(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, h, 0, 0).unwrap()
    }

    fn pose(x: f64, y: f64, theta: f64) -> Pose {
        Pose::new(GeoPoint::new(x, y, 0), theta).unwrap()
    }

    #[test]
    fn rotation_takes_the_shortest_arc() {
        // From 3π/4 to -3π/4 the short way crosses π, not 0.
        let a = pose(0.0, 0.0, 3.0 * PI / 4.0);
        let b = pose(0.0, 0.0, -3.0 * PI / 4.0);
        let mid = a.interpolate(&b, 0.5);
        assert_relative_eq!(mid.rotation().abs(), PI, epsilon = 1e-9);
    }

    #[test]
    fn plain_rotation_interpolates_linearly() {
        let a = pose(0.0, 0.0, 0.0);
        let b = pose(4.0, 0.0, 1.0);
        let mid = a.interpolate(&b, 0.25);
        assert_relative_eq!(mid.rotation(), 0.25);
        assert_relative_eq!(mid.point().x(), 1.0);
    }

    #[test]
    fn assemble_and_split() {
        let point: Temporal<GeoPoint> = Temporal::Sequence(
            TSequence::make(
                vec![
                    TInstant::new(GeoPoint::new(0.0, 0.0, 0), t(0)),
                    TInstant::new(GeoPoint::new(2.0, 0.0, 0), t(2)),
                ],
                true,
                true,
                TInterpolation::Linear,
            )
            .unwrap(),
        );
        let rotation: Temporal<f64> = Temporal::Sequence(
            TSequence::make(
                vec![TInstant::new(0.0, t(0)), TInstant::new(1.0, t(2))],
                true,
                true,
                TInterpolation::Linear,
            )
            .unwrap(),
        );
        let tpose = TPose::make(&point, &rotation).unwrap();
        let mid = tpose.value_at_timestamp(t(1)).unwrap();
        assert_relative_eq!(mid.point().x(), 1.0);
        assert_relative_eq!(mid.rotation(), 0.5);
        assert_eq!(tpose.to_tpoint().end_value().x(), 2.0);
        assert_eq!(tpose.rotation().end_value(), &1.0);
    }
}
