//! The narrow geometry interface consumed by the temporal core: a point
//! primitive with SRID and geodetic flag, measures, and a small projection
//! catalog. Everything heavier stays behind this boundary.

pub mod point;
pub mod projection;

pub use point::GeoPoint;
pub use projection::Projection;

/// SRID value meaning "not set".
pub const SRID_UNKNOWN: i32 = 0;

/// The SRID assumed for geodetic values with no explicit SRID.
pub const WGS84_SRID: i32 = 4326;

/// The Web-Mercator SRID of the built-in pipeline.
pub const WEB_MERCATOR_SRID: i32 = 3857;
