use std::fmt;

use geo::{HaversineDistance, HaversineIntermediate};
use geo_types::{Coord, Point};

use crate::errors::{ParseError, TemporalError};
use crate::geom::{SRID_UNKNOWN, WGS84_SRID};
use crate::utils::{format_float, FP_TOLERANCE};

/// A 2D/3D point with SRID and geodetic flag, the spatial base primitive.
///
/// Planar points interpolate per coordinate; geodetic points interpolate
/// along the great circle and measure with the haversine formula.
#[derive(Clone, Copy, PartialEq)]
pub struct GeoPoint {
    coord: Coord<f64>,
    z: Option<f64>,
    srid: i32,
    geodetic: bool,
}

impl GeoPoint {
    /// Constructs a planar 2D point.
    pub fn new(x: f64, y: f64, srid: i32) -> Self {
        Self { coord: Coord { x, y }, z: None, srid, geodetic: false }
    }

    /// Constructs a planar 3D point.
    pub fn new_3d(x: f64, y: f64, z: f64, srid: i32) -> Self {
        Self { coord: Coord { x, y }, z: Some(z), srid, geodetic: false }
    }

    /// Constructs a geodetic point; an unknown SRID defaults to WGS-84.
    pub fn new_geodetic(x: f64, y: f64, z: Option<f64>, srid: i32) -> Self {
        let srid = if srid == SRID_UNKNOWN { WGS84_SRID } else { srid };
        Self { coord: Coord { x, y }, z, srid, geodetic: true }
    }

    pub(crate) fn with_parts(
        x: f64,
        y: f64,
        z: Option<f64>,
        geodetic: bool,
        srid: i32,
    ) -> Self {
        if geodetic {
            Self::new_geodetic(x, y, z, srid)
        } else {
            Self { coord: Coord { x, y }, z, srid, geodetic: false }
        }
    }

    pub fn x(&self) -> f64 {
        self.coord.x
    }

    pub fn y(&self) -> f64 {
        self.coord.y
    }

    pub fn z(&self) -> Option<f64> {
        self.z
    }

    pub fn has_z(&self) -> bool {
        self.z.is_some()
    }

    pub fn srid(&self) -> i32 {
        self.srid
    }

    pub fn set_srid(&mut self, srid: i32) {
        self.srid = srid;
    }

    pub fn is_geodetic(&self) -> bool {
        self.geodetic
    }

    /// The underlying `geo-types` point (2D shadow of a 3D point).
    pub fn to_geo(&self) -> Point<f64> {
        Point::from(self.coord)
    }

    /// Exact equality of coordinates up to the shared tolerance; SRID and
    /// flags must match.
    pub fn eq_tol(&self, other: &Self) -> bool {
        if self.srid != other.srid
            || self.geodetic != other.geodetic
            || self.has_z() != other.has_z()
        {
            return false;
        }
        let dz = match (self.z, other.z) {
            (Some(a), Some(b)) => (a - b).abs(),
            _ => 0.0,
        };
        (self.coord.x - other.coord.x).abs() <= FP_TOLERANCE
            && (self.coord.y - other.coord.y).abs() <= FP_TOLERANCE
            && dz <= FP_TOLERANCE
    }

    /// Distance between two points: euclidean for planar, haversine metres
    /// for geodetic.
    pub fn distance(&self, other: &Self) -> f64 {
        if self.geodetic {
            return self.to_geo().haversine_distance(&other.to_geo());
        }
        let dx = self.coord.x - other.coord.x;
        let dy = self.coord.y - other.coord.y;
        let dz = match (self.z, other.z) {
            (Some(a), Some(b)) => a - b,
            _ => 0.0,
        };
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// The point at `ratio` in `[0, 1]` along the segment from `self` to
    /// `other`: coordinate-wise for planar points, along the great circle for
    /// geodetic ones.
    pub fn interpolate(&self, other: &Self, ratio: f64) -> Self {
        let z = match (self.z, other.z) {
            (Some(a), Some(b)) => Some(a + (b - a) * ratio),
            _ => None,
        };
        if self.geodetic {
            let arc = self
                .to_geo()
                .haversine_intermediate(&other.to_geo(), ratio);
            return Self {
                coord: Coord { x: arc.x(), y: arc.y() },
                z,
                srid: self.srid,
                geodetic: true,
            };
        }
        Self {
            coord: Coord {
                x: self.coord.x + (other.coord.x - self.coord.x) * ratio,
                y: self.coord.y + (other.coord.y - self.coord.y) * ratio,
            },
            z,
            srid: self.srid,
            geodetic: false,
        }
    }

    /// The ratio at which a linear segment from `self` to `other` passes
    /// through `target`, `None` when the target is off the segment.
    pub fn locate_along(&self, other: &Self, target: &Self) -> Option<f64> {
        let dx = other.coord.x - self.coord.x;
        let dy = other.coord.y - self.coord.y;
        let length2 = dx * dx + dy * dy;
        if length2 <= FP_TOLERANCE {
            return if self.eq_tol(target) { Some(0.0) } else { None };
        }
        let ratio =
            ((target.coord.x - self.coord.x) * dx + (target.coord.y - self.coord.y) * dy) / length2;
        if !(-FP_TOLERANCE..=1.0 + FP_TOLERANCE).contains(&ratio) {
            return None;
        }
        let ratio = ratio.clamp(0.0, 1.0);
        let projected = self.interpolate(other, ratio);
        if projected.eq_tol(target) {
            Some(ratio)
        } else {
            None
        }
    }

    /// Ensures two points can take part in one operation.
    pub(crate) fn ensure_compatible(&self, other: &Self) -> Result<(), TemporalError> {
        if self.srid != other.srid {
            return Err(TemporalError::SridMismatch { left: self.srid, right: other.srid });
        }
        if self.has_z() != other.has_z() {
            return Err(TemporalError::DimensionMismatch(
                "mixing 2D and 3D points".into(),
            ));
        }
        Ok(())
    }

    /// Writes `POINT(…)` / `POINT Z (…)` WKT, without SRID prefix.
    pub fn wkt(&self) -> String {
        match self.z {
            Some(z) => format!(
                "POINT Z ({} {} {})",
                format_float(self.coord.x),
                format_float(self.coord.y),
                format_float(z)
            ),
            None => format!(
                "POINT({} {})",
                format_float(self.coord.x),
                format_float(self.coord.y)
            ),
        }
    }

    pub(crate) fn parse_wkt(
        cursor: &mut crate::parser::Cursor<'_>,
        geodetic: bool,
    ) -> Result<Self, ParseError> {
        crate::parser::geopoint_parse(cursor, geodetic)
    }
}

impl fmt::Debug for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.srid != SRID_UNKNOWN {
            write!(f, "SRID={};{}", self.srid, self.wkt())
        } else {
            write!(f, "{}", self.wkt())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn planar_interpolation_is_coordinate_wise() {
        let a = GeoPoint::new(0.0, 0.0, 0);
        let b = GeoPoint::new(10.0, 20.0, 0);
        let mid = a.interpolate(&b, 0.5);
        assert_relative_eq!(mid.x(), 5.0);
        assert_relative_eq!(mid.y(), 10.0);
    }

    #[test]
    fn locate_along_finds_the_ratio() {
        let a = GeoPoint::new(0.0, 0.0, 0);
        let b = GeoPoint::new(4.0, 4.0, 0);
        let target = GeoPoint::new(1.0, 1.0, 0);
        assert_relative_eq!(a.locate_along(&b, &target).unwrap(), 0.25);
        let off = GeoPoint::new(1.0, 2.0, 0);
        assert!(a.locate_along(&b, &off).is_none());
    }

    #[test]
    fn geodetic_defaults_to_wgs84() {
        let p = GeoPoint::new_geodetic(1.0, 2.0, None, SRID_UNKNOWN);
        assert_eq!(p.srid(), WGS84_SRID);
    }

    #[test]
    fn distance_3d() {
        let a = GeoPoint::new_3d(0.0, 0.0, 0.0, 0);
        let b = GeoPoint::new_3d(1.0, 2.0, 2.0, 0);
        assert_relative_eq!(a.distance(&b), 3.0);
    }
}
