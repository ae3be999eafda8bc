use std::f64::consts::{FRAC_PI_4, PI};

use crate::errors::TemporalError;
use crate::geom::point::GeoPoint;
use crate::geom::{WEB_MERCATOR_SRID, WGS84_SRID};

const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// A named coordinate transformation pipeline between two SRIDs.
///
/// The catalog covers the identity and the WGS-84 ↔ Web-Mercator pair; a
/// deployment with a full CRS registry plugs in behind [`Projection::get`]
/// and [`Projection::transform_point`] without touching the callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Projection {
    src: i32,
    dst: i32,
    kind: PipelineKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PipelineKind {
    Identity,
    Wgs84ToWebMercator,
    WebMercatorToWgs84,
}

impl Projection {
    /// Looks up the pipeline from `src` to `dst`.
    pub fn get(src: i32, dst: i32) -> Result<Self, TemporalError> {
        let kind = match (src, dst) {
            _ if src == dst => PipelineKind::Identity,
            (WGS84_SRID, WEB_MERCATOR_SRID) => PipelineKind::Wgs84ToWebMercator,
            (WEB_MERCATOR_SRID, WGS84_SRID) => PipelineKind::WebMercatorToWgs84,
            _ => {
                return Err(TemporalError::InvalidArg(format!(
                    "no projection pipeline from SRID {src} to SRID {dst}"
                )))
            }
        };
        Ok(Self { src, dst, kind })
    }

    /// The pipeline name, `"EPSG:<src>=>EPSG:<dst>"`.
    pub fn name(&self) -> String {
        format!("EPSG:{}=>EPSG:{}", self.src, self.dst)
    }

    pub fn source_srid(&self) -> i32 {
        self.src
    }

    pub fn target_srid(&self) -> i32 {
        self.dst
    }

    /// Projects a point, producing a new point carrying the target SRID.
    pub fn transform_point(&self, point: &GeoPoint) -> Result<GeoPoint, TemporalError> {
        if point.srid() != self.src {
            return Err(TemporalError::SridMismatch { left: point.srid(), right: self.src });
        }
        let (x, y, geodetic) = match self.kind {
            PipelineKind::Identity => (point.x(), point.y(), point.is_geodetic()),
            PipelineKind::Wgs84ToWebMercator => {
                let lon = point.x().to_radians();
                let lat = point.y().to_radians();
                (
                    EARTH_RADIUS_M * lon,
                    EARTH_RADIUS_M * (FRAC_PI_4 + lat / 2.0).tan().ln(),
                    false,
                )
            }
            PipelineKind::WebMercatorToWgs84 => {
                let lon = (point.x() / EARTH_RADIUS_M).to_degrees();
                let lat = (2.0 * (point.y() / EARTH_RADIUS_M).exp().atan() - PI / 2.0).to_degrees();
                (lon, lat, true)
            }
        };
        Ok(GeoPoint::with_parts(x, y, point.z(), geodetic, self.dst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unknown_pipeline_is_an_error() {
        assert!(Projection::get(4326, 2154).is_err());
    }

    #[test]
    fn mercator_round_trip() {
        let forward = Projection::get(4326, 3857).unwrap();
        let back = Projection::get(3857, 4326).unwrap();
        let p = GeoPoint::new_geodetic(2.35, 48.85, None, 4326);
        let projected = forward.transform_point(&p).unwrap();
        assert_eq!(projected.srid(), 3857);
        let restored = back.transform_point(&projected).unwrap();
        assert_relative_eq!(restored.x(), 2.35, epsilon = 1e-9);
        assert_relative_eq!(restored.y(), 48.85, epsilon = 1e-9);
    }

    #[test]
    fn pipeline_name() {
        let p = Projection::get(4326, 3857).unwrap();
        assert_eq!(p.name(), "EPSG:4326=>EPSG:3857");
    }
}
