use std::hash::Hasher;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::boxes::r#box::BoundingBox;
use crate::boxes::stbox::STBox;
use crate::collections::base::collection::Collection;
use crate::errors::{ParseError, TemporalError, TemporalResult};
use crate::geom::point::GeoPoint;
use crate::geom::projection::Projection;
use crate::parser::Cursor;
use crate::temporal::base::{BaseType, TempType};
use crate::temporal::interpolation::TInterpolation;
use crate::temporal::sync::{lift_binary_turnpoints, lift_unary};
use crate::temporal::temporal::Temporal;
use crate::temporal::tinstant::TInstant;
use crate::temporal::tsequence::TSequence;
use crate::temporal::tsequence_set::TSequenceSet;
use crate::utils::{from_micros, FP_TOLERANCE};
use crate::wkb::{WkbReader, WkbWriter};

/// A temporal planar point.
pub type TGeomPoint = Temporal<GeoPoint>;

/// A temporal geodetic point; the same representation with the geodetic
/// flag set on every value.
pub type TGeogPoint = Temporal<GeoPoint>;

impl BaseType for GeoPoint {
    type Bbox = STBox;
    const CONTINUOUS: bool = true;

    fn temp_type(&self) -> TempType {
        if self.is_geodetic() {
            TempType::GeogPoint
        } else {
            TempType::GeomPoint
        }
    }

    fn eq_tol(&self, other: &Self) -> bool {
        GeoPoint::eq_tol(self, other)
    }

    fn interpolate(&self, other: &Self, ratio: f64) -> Self {
        GeoPoint::interpolate(self, other, ratio)
    }

    fn segment_locate(&self, other: &Self, value: &Self) -> Option<f64> {
        self.locate_along(other, value)
    }

    fn segment_intersection(
        start1: &Self,
        end1: &Self,
        start2: &Self,
        end2: &Self,
        t1: i64,
        t2: i64,
    ) -> Option<i64> {
        // Solve per axis, requiring consistent fractions: axes with no
        // relative motion must already agree.
        let mut fraction: Option<f64> = None;
        let axes: [(f64, f64, f64, f64); 3] = [
            (start1.x(), end1.x(), start2.x(), end2.x()),
            (start1.y(), end1.y(), start2.y(), end2.y()),
            (
                start1.z().unwrap_or(0.0),
                end1.z().unwrap_or(0.0),
                start2.z().unwrap_or(0.0),
                end2.z().unwrap_or(0.0),
            ),
        ];
        let dims = if start1.has_z() { 3 } else { 2 };
        for &(a1, a2, a3, a4) in axes.iter().take(dims) {
            let denom = a2 - a1 - a4 + a3;
            if denom.abs() <= FP_TOLERANCE {
                if (a3 - a1).abs() > FP_TOLERANCE {
                    return None;
                }
                continue;
            }
            let f = (a3 - a1) / denom;
            if !(-FP_TOLERANCE..=1.0 + FP_TOLERANCE).contains(&f) {
                return None;
            }
            match fraction {
                Some(existing) if (existing - f).abs() > FP_TOLERANCE => return None,
                Some(_) => {}
                None => fraction = Some(f),
            }
        }
        let fraction = fraction?;
        let duration = (t2 - t1) as f64;
        let t = t1 + (duration * fraction).round() as i64;
        (t > t1 && t < t2).then_some(t)
    }

    fn srid(&self) -> Option<i32> {
        Some(GeoPoint::srid(self))
    }

    fn set_srid(&mut self, srid: i32) {
        GeoPoint::set_srid(self, srid);
    }

    fn ensure_compatible(&self, other: &Self) -> Result<(), TemporalError> {
        GeoPoint::ensure_compatible(self, other)
    }

    fn instant_bbox(&self, t: DateTime<Utc>) -> STBox {
        STBox::from_geo_timestamp(self, t)
    }

    fn expand_bbox(&self, bbox: &mut STBox, t: DateTime<Utc>) {
        bbox.expand(&STBox::from_geo_timestamp(self, t));
    }

    fn write_wkt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wkt())
    }

    fn parse_elem(cursor: &mut Cursor<'_>) -> Result<Self, ParseError> {
        GeoPoint::parse_wkt(cursor, false)
    }

    fn write_wkb(&self, writer: &mut WkbWriter) {
        let mut flags = 0u8;
        if self.has_z() {
            flags |= 0x01;
        }
        if self.is_geodetic() {
            flags |= 0x02;
        }
        writer.write_u8(flags);
        writer.write_f64(self.x());
        writer.write_f64(self.y());
        if let Some(z) = self.z() {
            writer.write_f64(z);
        }
    }

    fn read_wkb(reader: &mut WkbReader<'_>) -> Result<Self, TemporalError> {
        let flags = reader.read_u8()?;
        let x = reader.read_f64()?;
        let y = reader.read_f64()?;
        let z = if flags & 0x01 != 0 { Some(reader.read_f64()?) } else { None };
        Ok(GeoPoint::with_parts(x, y, z, flags & 0x02 != 0, reader.srid()))
    }

    fn hash_value(&self, state: &mut dyn Hasher) {
        state.write_u64(self.x().to_bits());
        state.write_u64(self.y().to_bits());
        if let Some(z) = self.z() {
            state.write_u64(z.to_bits());
        }
        state.write_i32(GeoPoint::srid(self));
    }
}

/// The closest-approach time of two moving points, strictly inside the
/// segment: the minimum of the quadratic squared distance.
pub(crate) fn point_distance_turnpoint(
    s1: &TInstant<GeoPoint>,
    e1: &TInstant<GeoPoint>,
    s2: &TInstant<GeoPoint>,
    e2: &TInstant<GeoPoint>,
) -> Vec<DateTime<Utc>> {
    let dx0 = s1.value().x() - s2.value().x();
    let dy0 = s1.value().y() - s2.value().y();
    let vx = (e1.value().x() - s1.value().x()) - (e2.value().x() - s2.value().x());
    let vy = (e1.value().y() - s1.value().y()) - (e2.value().y() - s2.value().y());
    let denom = vx * vx + vy * vy;
    if denom <= FP_TOLERANCE {
        return vec![];
    }
    let s = -(dx0 * vx + dy0 * vy) / denom;
    if s <= FP_TOLERANCE || s >= 1.0 - FP_TOLERANCE {
        return vec![];
    }
    let duration = (e1.timestamp_micros() - s1.timestamp_micros()) as f64;
    vec![from_micros(s1.timestamp_micros() + (duration * s).round() as i64)]
}

impl Temporal<GeoPoint> {
    /// The spatiotemporal bounding box.
    pub fn bounding_box(&self) -> STBox {
        match self {
            Temporal::Instant(i) => i.bounding_box(),
            Temporal::Sequence(s) => s.bounding_box().clone(),
            Temporal::SequenceSet(s) => s.bounding_box().clone(),
        }
    }

    /// Returns a copy with the SRID replaced on every point.
    pub fn with_srid(&self, srid: i32) -> Temporal<GeoPoint> {
        lift_unary(self, move |p: &GeoPoint| {
            let mut p = *p;
            p.set_srid(srid);
            p
        })
    }

    /// Transforms every point to another SRID through the projection
    /// catalog.
    pub fn transform(&self, srid_to: i32) -> TemporalResult<Temporal<GeoPoint>> {
        let srid = self
            .srid()
            .ok_or_else(|| TemporalError::InvalidArg("the value carries no SRID".into()))?;
        if srid == srid_to {
            return Ok(self.clone());
        }
        let projection = Projection::get(srid, srid_to)?;
        // Projection can fail per point, so the closure-based lifting does
        // not apply here.
        let mut result: Vec<TSequence<GeoPoint>> = Vec::new();
        for seq in self.sequences() {
            let mut instants: Vec<TInstant<GeoPoint>> = Vec::new();
            for inst in seq.instants() {
                instants.push(TInstant::new(
                    projection.transform_point(inst.value())?,
                    inst.timestamp(),
                ));
            }
            result.push(TSequence::make_unnormalized(
                instants,
                seq.is_lower_inclusive(),
                seq.is_upper_inclusive(),
                seq.interpolation(),
            )?);
        }
        if self.is_instant() {
            let seq = result.into_iter().next().expect("one sequence per instant");
            return Ok(Temporal::Instant(seq.start_instant().clone()));
        }
        if result.len() == 1 && self.is_sequence() {
            return Ok(Temporal::Sequence(result.into_iter().next().expect("len is 1")));
        }
        Ok(Temporal::SequenceSet(TSequenceSet::make_unnormalized(result)?))
    }

    /// The temporal distance to another temporal point, with the closest
    /// approach of every segment pair materialized.
    pub fn distance(&self, other: &Temporal<GeoPoint>) -> Option<Temporal<f64>> {
        lift_binary_turnpoints(
            self,
            other,
            |a, b| a.distance(b),
            &point_distance_turnpoint,
        )
    }

    /// The smallest distance ever between two temporal points.
    pub fn nearest_approach_distance(&self, other: &Temporal<GeoPoint>) -> Option<f64> {
        Some(self.distance(other)?.min_value())
    }

    /// Returns whether the two temporal points ever come within `d`.
    pub fn ever_dwithin(&self, other: &Temporal<GeoPoint>, d: f64) -> Option<bool> {
        Some(self.nearest_approach_distance(other)? <= d + FP_TOLERANCE)
    }

    /// Restricts the temporal point to an STBox: the temporal dimension
    /// first, then the spatial extent, splitting segments where they cross
    /// the box boundary.
    pub fn at_stbox(&self, stbox: &STBox) -> Option<Temporal<GeoPoint>> {
        let time_bound = match stbox.to_tstzspan() {
            Some(span) => self.at_tstzspan(&span)?,
            None => self.clone(),
        };
        if !stbox.has_x() {
            return Some(time_bound);
        }
        let inside = |p: &GeoPoint| -> bool {
            let mut candidate = STBox::from_geo(p);
            if let Some(period) = stbox.to_tstzspan() {
                candidate.set_time(&period);
            }
            candidate.is_contained_in(stbox)
        };
        let mut pieces: Vec<TSequence<GeoPoint>> = Vec::new();
        for seq in time_bound.sequences() {
            if seq.interpolation() == TInterpolation::Discrete {
                let kept: Vec<TInstant<GeoPoint>> = seq
                    .instants()
                    .iter()
                    .filter(|inst| inside(inst.value()))
                    .cloned()
                    .collect();
                if let Ok(seq) = TSequence::make(kept, true, true, TInterpolation::Discrete) {
                    pieces.push(seq);
                }
                continue;
            }
            for segment in seq.segments() {
                pieces.extend(segment_at_stbox(&segment, stbox, &inside));
            }
        }
        match pieces.len() {
            0 => None,
            1 => Some(Temporal::Sequence(pieces.into_iter().next().expect("len is 1"))),
            _ => TSequenceSet::make(pieces).ok().map(Temporal::SequenceSet),
        }
    }

    /// Restricts to the complement of an STBox over the time dimension of
    /// the support.
    pub fn minus_stbox(&self, stbox: &STBox) -> Option<Temporal<GeoPoint>> {
        let at = self.at_stbox(stbox)?;
        self.minus_tstzspanset(&at.time())
    }
}

/// Clips one segment against the spatial extent of a box by splitting at
/// the axis-bound crossing times.
fn segment_at_stbox(
    segment: &TSequence<GeoPoint>,
    stbox: &STBox,
    inside: &dyn Fn(&GeoPoint) -> bool,
) -> Vec<TSequence<GeoPoint>> {
    let instants = segment.instants();
    if instants.len() == 1 {
        if inside(instants[0].value()) {
            return vec![segment.clone()];
        }
        return vec![];
    }
    let start = &instants[0];
    let end = &instants[1];
    let t1 = start.timestamp_micros();
    let t2 = end.timestamp_micros();
    let mut cuts: Vec<i64> = vec![t1, t2];
    let linear = segment.interpolation() == TInterpolation::Linear;
    if linear {
        let axes: [(f64, f64, Option<f64>, Option<f64>); 3] = [
            (start.value().x(), end.value().x(), stbox.xmin(), stbox.xmax()),
            (start.value().y(), end.value().y(), stbox.ymin(), stbox.ymax()),
            (
                start.value().z().unwrap_or(0.0),
                end.value().z().unwrap_or(0.0),
                stbox.zmin(),
                stbox.zmax(),
            ),
        ];
        for (v1, v2, lo, hi) in axes {
            for bound in [lo, hi].into_iter().flatten() {
                if let Some(fraction) = v1.segment_locate(&v2, &bound) {
                    let t = t1 + (((t2 - t1) as f64) * fraction).round() as i64;
                    if t > t1 && t < t2 && !cuts.contains(&t) {
                        cuts.push(t);
                    }
                }
            }
        }
    }
    cuts.sort_unstable();
    let mut result = Vec::new();
    for pair in cuts.windows(2) {
        let (lo, hi) = (from_micros(pair[0]), from_micros(pair[1]));
        let mid = from_micros((pair[0] + pair[1]) / 2);
        let mid_value = segment
            .value_at_timestamp(mid)
            .expect("midpoint lies inside the segment");
        if !inside(&mid_value) {
            continue;
        }
        let span = crate::collections::base::span::Span::new_unchecked(
            lo,
            hi,
            segment.tstzspan().contains(&lo),
            segment.tstzspan().contains(&hi),
        );
        if let Some(piece) = segment.at_tstzspan(&span) {
            result.push(piece);
        }
    }
    result
}

impl FromStr for TGeomPoint {
    type Err = ParseError;

    /// Parses a temporal point from its WKT form.
    ///
    /// ## Example
    /// ```
    /// # use tempora::TGeomPoint;
    /// let tpoint: TGeomPoint =
    ///     "[POINT(0 0)@2020-01-01, POINT(1 1)@2020-01-02)".parse().unwrap();
    /// assert_eq!(tpoint.num_instants(), 2);
    /// ```
    fn from_str(string: &str) -> Result<Self, Self::Err> {
        crate::parser::temporal_in(string)
    }
}

/// Parses a temporal geodetic point: the same grammar with every point
/// marked geodetic (default SRID WGS-84).
pub fn tgeogpoint_in(string: &str) -> Result<TGeogPoint, ParseError> {
    let parsed: TGeomPoint = string.parse()?;
    Ok(lift_unary(&parsed, |p: &GeoPoint| {
        GeoPoint::new_geodetic(p.x(), p.y(), p.z(), GeoPoint::srid(p))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, h, 0, 0).unwrap()
    }

    fn moving(points: &[(f64, f64, u32)]) -> TGeomPoint {
        Temporal::Sequence(
            TSequence::make(
                points
                    .iter()
                    .map(|&(x, y, h)| TInstant::new(GeoPoint::new(x, y, 0), t(h)))
                    .collect(),
                true,
                true,
                TInterpolation::Linear,
            )
            .unwrap(),
        )
    }

    #[test]
    fn bounding_box_covers_the_track() {
        let track = moving(&[(0.0, 0.0, 0), (4.0, 2.0, 4)]);
        let stbox = track.bounding_box();
        assert_eq!(stbox.xmin(), Some(0.0));
        assert_eq!(stbox.xmax(), Some(4.0));
        assert_eq!(stbox.ymax(), Some(2.0));
        assert!(stbox.has_t());
    }

    #[test]
    fn crossing_tracks_meet_in_the_middle() {
        let a = moving(&[(0.0, 0.0, 0), (4.0, 4.0, 4)]);
        let b = moving(&[(4.0, 4.0, 0), (0.0, 0.0, 4)]);
        let d = a.distance(&b).unwrap();
        assert_eq!(d.value_at_timestamp(t(2)), Some(0.0));
        assert_eq!(a.nearest_approach_distance(&b), Some(0.0));
        assert_eq!(a.ever_dwithin(&b, 0.0), Some(true));
    }

    #[test]
    fn parallel_tracks_keep_their_distance() {
        let a = moving(&[(0.0, 0.0, 0), (4.0, 0.0, 4)]);
        let b = moving(&[(0.0, 3.0, 0), (4.0, 3.0, 4)]);
        assert_eq!(a.nearest_approach_distance(&b), Some(3.0));
        assert_eq!(a.ever_dwithin(&b, 2.0), Some(false));
    }

    #[test]
    fn at_stbox_clips_the_track() {
        let track = moving(&[(0.0, 0.0, 0), (10.0, 0.0, 10)]);
        let stbox =
            STBox::make(true, false, false, 0, 2.0, 4.0, -1.0, 1.0, 0.0, 0.0, None).unwrap();
        let clipped = track.at_stbox(&stbox).unwrap();
        assert_eq!(clipped.start_timestamp(), t(2));
        assert_eq!(clipped.end_timestamp(), t(4));
    }

    #[test]
    fn transform_changes_srid() {
        let track = Temporal::instant(GeoPoint::new_geodetic(1.0, 2.0, None, 4326), t(0));
        let projected = track.transform(3857).unwrap();
        assert_eq!(projected.srid(), Some(3857));
        assert!(track.transform(2154).is_err());
    }
}
