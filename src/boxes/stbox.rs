use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};

use crate::boxes::r#box::BoundingBox;
use crate::collections::base::collection::Collection;
use crate::collections::base::span::Span;
use crate::collections::datetime::tstz_span::TsTzSpan;
use crate::errors::{ParseError, TemporalError};
use crate::geom::point::GeoPoint;
use crate::geom::projection::Projection;
use crate::geom::{SRID_UNKNOWN, WGS84_SRID};
use crate::utils::format_float;

/// A spatiotemporal bounding box with X/Y, optional Z, optional T
/// dimensions, a geodetic flag and an SRID.
///
/// Invariants: `min <= max` on every present dimension (the constructor
/// swaps inverted pairs); geodetic implies the spatial dimension is present
/// and the SRID defaults to WGS-84; at least one of the spatial and temporal
/// dimensions is present.
///
/// ## Example
/// ```
/// # use tempora::boxes::STBox;
/// # use std::str::FromStr;
/// let stbox = STBox::from_str(
///     "STBOX ZT(((1,2,3),(4,5,6)),[2001-01-01, 2001-01-02])").unwrap();
/// assert!(stbox.has_z());
/// assert_eq!(stbox.xmin(), Some(1.0));
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct STBox {
    xmin: f64,
    xmax: f64,
    ymin: f64,
    ymax: f64,
    zmin: f64,
    zmax: f64,
    period: Option<TsTzSpan>,
    has_x: bool,
    has_z: bool,
    geodetic: bool,
    srid: i32,
}

fn minmax(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl STBox {
    /// Constructs a box, normalizing inverted min/max pairs.
    #[allow(clippy::too_many_arguments)]
    pub fn make(
        has_x: bool,
        has_z: bool,
        geodetic: bool,
        srid: i32,
        xmin: f64,
        xmax: f64,
        ymin: f64,
        ymax: f64,
        zmin: f64,
        zmax: f64,
        period: Option<TsTzSpan>,
    ) -> Result<Self, TemporalError> {
        if !has_x && period.is_none() {
            return Err(TemporalError::InvalidArg(
                "an STBox needs a spatial or a temporal dimension".into(),
            ));
        }
        if geodetic && !has_x {
            return Err(TemporalError::InvalidArg(
                "a geodetic STBox needs the spatial dimension".into(),
            ));
        }
        let srid = if geodetic && srid == SRID_UNKNOWN { WGS84_SRID } else { srid };
        let (xmin, xmax) = minmax(xmin, xmax);
        let (ymin, ymax) = minmax(ymin, ymax);
        let (zmin, zmax) = minmax(zmin, zmax);
        Ok(Self {
            xmin: if has_x { xmin } else { 0.0 },
            xmax: if has_x { xmax } else { 0.0 },
            ymin: if has_x { ymin } else { 0.0 },
            ymax: if has_x { ymax } else { 0.0 },
            zmin: if has_x && has_z { zmin } else { 0.0 },
            zmax: if has_x && has_z { zmax } else { 0.0 },
            period,
            has_x,
            has_z: has_x && has_z,
            geodetic,
            srid,
        })
    }

    /// Reduces a point to its box; the fast path of `geo_set_stbox`.
    pub fn from_geo(point: &GeoPoint) -> Self {
        let (zmin, zmax) = match point.z() {
            Some(z) => (z, z),
            None => (0.0, 0.0),
        };
        Self {
            xmin: point.x(),
            xmax: point.x(),
            ymin: point.y(),
            ymax: point.y(),
            zmin,
            zmax,
            period: None,
            has_x: true,
            has_z: point.has_z(),
            geodetic: point.is_geodetic(),
            srid: point.srid(),
        }
    }

    /// A point observed at one timestamp.
    pub fn from_geo_timestamp(point: &GeoPoint, t: DateTime<Utc>) -> Self {
        let mut result = Self::from_geo(point);
        result.period = Some(Span::singleton(t));
        result
    }

    pub fn from_time(t: DateTime<Utc>) -> Self {
        Self::from_tstzspan(Span::singleton(t))
    }

    pub fn from_tstzspan(period: TsTzSpan) -> Self {
        Self {
            xmin: 0.0,
            xmax: 0.0,
            ymin: 0.0,
            ymax: 0.0,
            zmin: 0.0,
            zmax: 0.0,
            period: Some(period),
            has_x: false,
            has_z: false,
            geodetic: false,
            srid: SRID_UNKNOWN,
        }
    }

    // ------------------------- Accessors -------------------------------------

    pub fn has_x(&self) -> bool {
        self.has_x
    }

    pub fn has_z(&self) -> bool {
        self.has_z
    }

    pub fn has_t(&self) -> bool {
        self.period.is_some()
    }

    pub fn is_geodetic(&self) -> bool {
        self.geodetic
    }

    pub fn srid(&self) -> i32 {
        self.srid
    }

    pub fn set_srid(&mut self, srid: i32) {
        self.srid = srid;
    }

    pub fn xmin(&self) -> Option<f64> {
        self.has_x.then_some(self.xmin)
    }

    pub fn xmax(&self) -> Option<f64> {
        self.has_x.then_some(self.xmax)
    }

    pub fn ymin(&self) -> Option<f64> {
        self.has_x.then_some(self.ymin)
    }

    pub fn ymax(&self) -> Option<f64> {
        self.has_x.then_some(self.ymax)
    }

    pub fn zmin(&self) -> Option<f64> {
        self.has_z.then_some(self.zmin)
    }

    pub fn zmax(&self) -> Option<f64> {
        self.has_z.then_some(self.zmax)
    }

    pub fn tmin(&self) -> Option<DateTime<Utc>> {
        self.period.map(|p| p.lower())
    }

    pub fn tmax(&self) -> Option<DateTime<Utc>> {
        self.period.map(|p| p.upper())
    }

    pub fn tmin_is_inclusive(&self) -> Option<bool> {
        self.period.map(|p| p.is_lower_inclusive())
    }

    pub fn tmax_is_inclusive(&self) -> Option<bool> {
        self.period.map(|p| p.is_upper_inclusive())
    }

    pub fn to_tstzspan(&self) -> Option<TsTzSpan> {
        self.period
    }

    // ------------------------- Validation ------------------------------------

    /// Requires at least one shared dimension and, when both boxes are
    /// spatial, the same SRID and geodetic flag.
    fn ensure_comparable(&self, other: &Self) -> Result<(), TemporalError> {
        if !((self.has_x && other.has_x) || (self.has_t() && other.has_t())) {
            return Err(TemporalError::DimensionMismatch(
                "the boxes share no dimension".into(),
            ));
        }
        if self.has_x && other.has_x {
            if self.srid != other.srid {
                return Err(TemporalError::SridMismatch { left: self.srid, right: other.srid });
            }
            if self.geodetic != other.geodetic {
                return Err(TemporalError::DimensionMismatch(
                    "mixing geodetic and planar boxes".into(),
                ));
            }
        }
        Ok(())
    }

    // ------------------------- Transformations --------------------------------

    /// Grows every dimension by `value` on both sides.
    pub fn expand_space(&self, value: f64) -> Option<STBox> {
        if !self.has_x {
            return None;
        }
        let mut result = *self;
        result.xmin -= value;
        result.ymin -= value;
        result.xmax += value;
        result.ymax += value;
        if self.has_z {
            result.zmin -= value;
            result.zmax += value;
        }
        Some(result)
    }

    /// Grows the temporal dimension by `duration` on both sides.
    pub fn expand_time(&self, duration: TimeDelta) -> Option<STBox> {
        let period = self.period?;
        let mut result = *self;
        result.period = Some(Span::new_unchecked(
            period.lower() - duration,
            period.upper() + duration,
            period.is_lower_inclusive(),
            period.is_upper_inclusive(),
        ));
        Some(result)
    }

    pub fn shift_scale_time(&self, delta: Option<TimeDelta>, width: Option<TimeDelta>) -> STBox {
        let mut result = *self;
        result.period = self.period.map(|p| p.shift_scale(delta, width));
        result
    }

    /// Rounds the spatial bounds to `max_decimals` decimal digits.
    pub fn round(&self, max_decimals: u32) -> STBox {
        let factor = 10f64.powi(max_decimals as i32);
        let r = |v: f64| (v * factor).round() / factor;
        let mut result = *self;
        if self.has_x {
            result.xmin = r(self.xmin);
            result.xmax = r(self.xmax);
            result.ymin = r(self.ymin);
            result.ymax = r(self.ymax);
            result.zmin = r(self.zmin);
            result.zmax = r(self.zmax);
        }
        result
    }

    /// Union in place: `self` grows to cover `other`.
    pub fn expand(&mut self, other: &STBox) {
        if self.has_x && other.has_x {
            self.xmin = self.xmin.min(other.xmin);
            self.xmax = self.xmax.max(other.xmax);
            self.ymin = self.ymin.min(other.ymin);
            self.ymax = self.ymax.max(other.ymax);
            if self.has_z && other.has_z {
                self.zmin = self.zmin.min(other.zmin);
                self.zmax = self.zmax.max(other.zmax);
            }
        }
        self.period = match (self.period, other.period) {
            (Some(mut a), Some(b)) => {
                Span::expand(&mut a, &b);
                Some(a)
            }
            (a, None) => a,
            (None, b) => b,
        };
    }

    // ------------------------- Set operations ---------------------------------

    /// Union of two boxes. With `strict` the boxes must overlap.
    pub fn union(&self, other: &STBox, strict: bool) -> Result<STBox, TemporalError> {
        self.ensure_comparable(other)?;
        if strict && !self.overlaps(other) {
            return Err(TemporalError::InvalidArg("the boxes do not overlap".into()));
        }
        let mut result = *self;
        result.expand(other);
        Ok(result)
    }

    /// Per-dimension intersection; `None` when any shared dimension is
    /// disjoint.
    pub fn intersection(&self, other: &STBox) -> Option<STBox> {
        self.ensure_comparable(other).ok()?;
        let mut result = *self;
        if self.has_x && other.has_x {
            result.xmin = self.xmin.max(other.xmin);
            result.xmax = self.xmax.min(other.xmax);
            result.ymin = self.ymin.max(other.ymin);
            result.ymax = self.ymax.min(other.ymax);
            if result.xmin > result.xmax || result.ymin > result.ymax {
                return None;
            }
            if self.has_z && other.has_z {
                result.zmin = self.zmin.max(other.zmin);
                result.zmax = self.zmax.min(other.zmax);
                if result.zmin > result.zmax {
                    return None;
                }
            }
            result.has_z = self.has_z && other.has_z;
        }
        result.period = match (self.period, other.period) {
            (Some(a), Some(b)) => Some(a.intersection(&b)?),
            (a, None) => a,
            (None, b) => b,
        };
        Some(result)
    }

    /// Splits the spatial extent into 4 (2D) or 8 (3D) equal sub-boxes,
    /// front half before back half along Z.
    pub fn quad_split(&self) -> Option<Vec<STBox>> {
        if !self.has_x {
            return None;
        }
        let dx = (self.xmax - self.xmin) / 2.0;
        let dy = (self.ymax - self.ymin) / 2.0;
        let dz = if self.has_z { (self.zmax - self.zmin) / 2.0 } else { 0.0 };
        let z_halves: &[(f64, f64)] = if self.has_z {
            &[(self.zmin, self.zmin + dz), (self.zmin + dz, self.zmax)]
        } else {
            &[(0.0, 0.0)]
        };
        let mut parts = Vec::with_capacity(if self.has_z { 8 } else { 4 });
        for &(zlo, zhi) in z_halves {
            for &(ylo, yhi) in &[(self.ymin, self.ymin + dy), (self.ymin + dy, self.ymax)] {
                for &(xlo, xhi) in &[(self.xmin, self.xmin + dx), (self.xmin + dx, self.xmax)] {
                    parts.push(STBox {
                        xmin: xlo,
                        xmax: xhi,
                        ymin: ylo,
                        ymax: yhi,
                        zmin: zlo,
                        zmax: zhi,
                        period: self.period,
                        has_x: true,
                        has_z: self.has_z,
                        geodetic: self.geodetic,
                        srid: self.srid,
                    });
                }
            }
        }
        Some(parts)
    }

    // ------------------------- SRID transform ---------------------------------

    /// Transforms the box to another SRID by projecting its two corner
    /// points and rebuilding the box from them.
    pub fn transform(&self, srid_to: i32) -> Result<STBox, TemporalError> {
        if !self.has_x {
            return Err(TemporalError::InvalidArg(
                "cannot transform a box without spatial dimension".into(),
            ));
        }
        if self.srid == srid_to {
            return Ok(*self);
        }
        let projection = Projection::get(self.srid, srid_to)?;
        let z = self.has_z.then_some(self.zmin);
        let min = GeoPoint::with_parts(self.xmin, self.ymin, z, self.geodetic, self.srid);
        let zmax = self.has_z.then_some(self.zmax);
        let max = GeoPoint::with_parts(self.xmax, self.ymax, zmax, self.geodetic, self.srid);
        let min = projection.transform_point(&min)?;
        let max = projection.transform_point(&max)?;
        Self::make(
            true,
            self.has_z,
            min.is_geodetic(),
            srid_to,
            min.x(),
            max.x(),
            min.y(),
            max.y(),
            min.z().unwrap_or(0.0),
            max.z().unwrap_or(0.0),
            self.period,
        )
    }

    // ------------------------- Topological predicates -------------------------

    /// Returns whether `self` contains `other` on every shared dimension.
    pub fn contains_stbox(&self, other: &STBox) -> bool {
        if self.ensure_comparable(other).is_err() {
            return false;
        }
        if self.has_x && other.has_x {
            if other.xmin < self.xmin
                || other.xmax > self.xmax
                || other.ymin < self.ymin
                || other.ymax > self.ymax
            {
                return false;
            }
            if self.has_z && other.has_z && (other.zmin < self.zmin || other.zmax > self.zmax) {
                return false;
            }
        }
        if let (Some(a), Some(b)) = (self.period, other.period) {
            if !a.contains_span(&b) {
                return false;
            }
        }
        true
    }

    pub fn is_contained_in(&self, other: &STBox) -> bool {
        other.contains_stbox(self)
    }

    /// Returns whether the shared dimensions all overlap.
    pub fn overlaps(&self, other: &STBox) -> bool {
        if self.ensure_comparable(other).is_err() {
            return false;
        }
        if self.has_x && other.has_x {
            if other.xmax < self.xmin
                || other.xmin > self.xmax
                || other.ymax < self.ymin
                || other.ymin > self.ymax
            {
                return false;
            }
            if self.has_z && other.has_z && (other.zmax < self.zmin || other.zmin > self.zmax) {
                return false;
            }
        }
        if let (Some(a), Some(b)) = (self.period, other.period) {
            if !a.overlaps(&b) {
                return false;
            }
        }
        true
    }

    /// Returns whether the shared dimensions are identical.
    pub fn is_same(&self, other: &STBox) -> bool {
        if self.ensure_comparable(other).is_err() {
            return false;
        }
        if self.has_x && other.has_x {
            if self.xmin != other.xmin
                || self.xmax != other.xmax
                || self.ymin != other.ymin
                || self.ymax != other.ymax
            {
                return false;
            }
            if self.has_z && other.has_z && (self.zmin != other.zmin || self.zmax != other.zmax) {
                return false;
            }
        }
        match (self.period, other.period) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }

    /// Returns whether the boxes touch: they overlap but only on a face of
    /// zero extent in some dimension.
    pub fn is_adjacent(&self, other: &STBox) -> bool {
        let Some(inter) = self.intersection(other) else {
            return false;
        };
        let mut flat = false;
        if inter.has_x {
            flat |= inter.xmin == inter.xmax || inter.ymin == inter.ymax;
            if inter.has_z {
                flat |= inter.zmin == inter.zmax;
            }
        }
        if let Some(period) = inter.period {
            flat |= period.is_singleton();
        }
        flat
    }

    // ------------------------- Positional predicates --------------------------

    fn x_spans(&self, other: &STBox) -> Option<(Span<f64>, Span<f64>)> {
        (self.has_x && other.has_x).then(|| {
            (
                Span::new_unchecked(self.xmin, self.xmax, true, true),
                Span::new_unchecked(other.xmin, other.xmax, true, true),
            )
        })
    }

    fn y_spans(&self, other: &STBox) -> Option<(Span<f64>, Span<f64>)> {
        (self.has_x && other.has_x).then(|| {
            (
                Span::new_unchecked(self.ymin, self.ymax, true, true),
                Span::new_unchecked(other.ymin, other.ymax, true, true),
            )
        })
    }

    fn z_spans(&self, other: &STBox) -> Option<(Span<f64>, Span<f64>)> {
        (self.has_z && other.has_z).then(|| {
            (
                Span::new_unchecked(self.zmin, self.zmax, true, true),
                Span::new_unchecked(other.zmin, other.zmax, true, true),
            )
        })
    }

    pub fn is_left(&self, other: &STBox) -> bool {
        matches!(self.x_spans(other), Some((a, b)) if a.is_left(&b))
    }

    pub fn is_over_or_left(&self, other: &STBox) -> bool {
        matches!(self.x_spans(other), Some((a, b)) if a.is_over_or_left(&b))
    }

    pub fn is_right(&self, other: &STBox) -> bool {
        matches!(self.x_spans(other), Some((a, b)) if a.is_right(&b))
    }

    pub fn is_over_or_right(&self, other: &STBox) -> bool {
        matches!(self.x_spans(other), Some((a, b)) if a.is_over_or_right(&b))
    }

    pub fn is_below(&self, other: &STBox) -> bool {
        matches!(self.y_spans(other), Some((a, b)) if a.is_left(&b))
    }

    pub fn is_over_or_below(&self, other: &STBox) -> bool {
        matches!(self.y_spans(other), Some((a, b)) if a.is_over_or_left(&b))
    }

    pub fn is_above(&self, other: &STBox) -> bool {
        matches!(self.y_spans(other), Some((a, b)) if a.is_right(&b))
    }

    pub fn is_over_or_above(&self, other: &STBox) -> bool {
        matches!(self.y_spans(other), Some((a, b)) if a.is_over_or_right(&b))
    }

    pub fn is_front(&self, other: &STBox) -> bool {
        matches!(self.z_spans(other), Some((a, b)) if a.is_left(&b))
    }

    pub fn is_over_or_front(&self, other: &STBox) -> bool {
        matches!(self.z_spans(other), Some((a, b)) if a.is_over_or_left(&b))
    }

    pub fn is_back(&self, other: &STBox) -> bool {
        matches!(self.z_spans(other), Some((a, b)) if a.is_right(&b))
    }

    pub fn is_over_or_back(&self, other: &STBox) -> bool {
        matches!(self.z_spans(other), Some((a, b)) if a.is_over_or_right(&b))
    }

    pub fn is_before(&self, other: &STBox) -> bool {
        matches!((self.period, other.period), (Some(a), Some(b)) if a.is_left(&b))
    }

    pub fn is_over_or_before(&self, other: &STBox) -> bool {
        matches!((self.period, other.period), (Some(a), Some(b)) if a.is_over_or_left(&b))
    }

    pub fn is_after(&self, other: &STBox) -> bool {
        matches!((self.period, other.period), (Some(a), Some(b)) if a.is_right(&b))
    }

    pub fn is_over_or_after(&self, other: &STBox) -> bool {
        matches!((self.period, other.period), (Some(a), Some(b)) if a.is_over_or_right(&b))
    }
}

impl BoundingBox for STBox {
    fn expand(&mut self, other: &Self) {
        STBox::expand(self, other);
    }

    fn set_time(&mut self, period: &TsTzSpan) {
        self.period = Some(*period);
    }

    fn time(&self) -> Option<TsTzSpan> {
        self.period
    }
}

impl fmt::Debug for STBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for STBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.srid != SRID_UNKNOWN && self.has_x {
            write!(f, "SRID={};", self.srid)?;
        }
        let prefix = if self.geodetic { "GEODSTBOX" } else { "STBOX" };
        let spatial = |f: &mut fmt::Formatter<'_>| -> fmt::Result {
            if self.has_z {
                write!(
                    f,
                    "(({},{},{}),({},{},{}))",
                    format_float(self.xmin),
                    format_float(self.ymin),
                    format_float(self.zmin),
                    format_float(self.xmax),
                    format_float(self.ymax),
                    format_float(self.zmax),
                )
            } else {
                write!(
                    f,
                    "(({},{}),({},{}))",
                    format_float(self.xmin),
                    format_float(self.ymin),
                    format_float(self.xmax),
                    format_float(self.ymax),
                )
            }
        };
        match (self.has_x, &self.period) {
            (true, Some(period)) => {
                write!(f, "{prefix} {}T(", if self.has_z { "Z" } else { "X" })?;
                spatial(f)?;
                write!(f, ",{period})")
            }
            (true, None) => {
                write!(f, "{prefix} {}", if self.has_z { "Z" } else { "X" })?;
                spatial(f)
            }
            (false, Some(period)) => write!(f, "{prefix} T({period})"),
            (false, None) => unreachable!("STBox invariant: one dimension present"),
        }
    }
}

impl FromStr for STBox {
    type Err = ParseError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        crate::parser::stbox_in(string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xbox(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> STBox {
        STBox::make(true, false, false, 0, xmin, xmax, ymin, ymax, 0.0, 0.0, None).unwrap()
    }

    #[test]
    fn make_swaps_inverted_bounds() {
        let b = STBox::make(true, false, false, 0, 4.0, 1.0, 2.0, 3.0, 0.0, 0.0, None).unwrap();
        assert_eq!(b.xmin(), Some(1.0));
        assert_eq!(b.xmax(), Some(4.0));
    }

    #[test]
    fn geodetic_defaults_srid() {
        let b = STBox::make(true, false, true, 0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, None).unwrap();
        assert_eq!(b.srid(), WGS84_SRID);
    }

    #[test]
    fn quad_split_partitions_the_box() {
        let b = xbox(0.0, 2.0, 0.0, 2.0);
        let parts = b.quad_split().unwrap();
        assert_eq!(parts.len(), 4);
        let mut union = parts[0];
        for part in &parts[1..] {
            union.expand(part);
        }
        assert!(union.is_same(&b));
        // Parts touch only on faces.
        assert!(parts[0].is_adjacent(&parts[1]));
        let inter = parts[0].intersection(&parts[3]).unwrap();
        assert_eq!(inter.xmin(), inter.xmax());
    }

    #[test]
    fn quad_split_3d_has_eight_parts() {
        let b =
            STBox::make(true, true, false, 0, 0.0, 2.0, 0.0, 2.0, 0.0, 2.0, None).unwrap();
        let parts = b.quad_split().unwrap();
        assert_eq!(parts.len(), 8);
        assert!(parts[..4].iter().all(|p| p.zmax() == Some(1.0)));
        assert!(parts[4..].iter().all(|p| p.zmin() == Some(1.0)));
    }

    #[test]
    fn predicates_require_matching_srid() {
        let mut a = xbox(0.0, 1.0, 0.0, 1.0);
        let mut b = xbox(0.0, 1.0, 0.0, 1.0);
        a.set_srid(4326);
        b.set_srid(3857);
        assert!(!a.overlaps(&b));
        assert!(a.union(&b, false).is_err());
    }

    #[test]
    fn positional_predicates() {
        let a = xbox(0.0, 1.0, 0.0, 1.0);
        let b = xbox(2.0, 3.0, 2.0, 3.0);
        assert!(a.is_left(&b));
        assert!(a.is_below(&b));
        assert!(b.is_right(&a));
        assert!(b.is_over_or_above(&a));
    }

    #[test]
    fn transform_projects_the_corners() {
        let b = STBox::make(true, false, true, 4326, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, None)
            .unwrap();
        let projected = b.transform(3857).unwrap();
        assert_eq!(projected.srid(), 3857);
        assert!(projected.xmax().unwrap() > 100_000.0);
        let identity = b.transform(4326).unwrap();
        assert!(identity.is_same(&b));
    }

    #[test]
    fn display_matches_grammar() {
        let b = xbox(1.0, 4.0, 2.0, 5.0);
        assert_eq!(b.to_string(), "STBOX X((1,2),(4,5))");
    }
}
