//! Temporal and spatiotemporal types for Rust.
//!
//! A temporal value pairs a base datum — a number, a text, a 2D/3D point, a
//! circular buffer, a network point or a rigid 2D pose — with time, in one
//! of three subtypes: a single instant, a sequence of instants under one
//! interpolation (discrete, step or linear), or a set of sequences.
//!
//! The crate provides the temporal algebra over these values (lifting of
//! base operations, synchronization onto a common time grid, restriction to
//! values or time), spatiotemporal bounding boxes with topological and
//! positional predicates, and WKT/WKB codecs.
//!
//! ```
//! use tempora::TFloat;
//!
//! let speed: TFloat = "[10@2020-01-01, 30@2020-01-03)".parse().unwrap();
//! assert_eq!(speed.num_instants(), 2);
//! let fast = speed.at_span(&(20.0..=30.0).into()).unwrap();
//! assert_eq!(fast.start_value(), &20.0);
//! ```

use bitmask_enum::bitmask;

pub mod boxes;
pub mod collections;
pub mod errors;
pub mod geom;
pub(crate) mod parser;
pub mod temporal;
mod utils;
pub mod wkb;

pub use boxes::{BoundingBox, STBox, TBox};
pub use collections::base::{Collection, Span, SpanSet};
pub use collections::datetime::{TsTzSet, TsTzSpan, TsTzSpanSet};
pub use collections::number::{FloatSpan, FloatSpanSet};
pub use errors::{ParseError, TemporalError, TemporalResult};
pub use geom::{GeoPoint, Projection};
pub use temporal::{
    BaseType, Cbuffer, NPoint, Pose, TBool, TCbuffer, TFloat, TGeogPoint, TGeomPoint, TInstant,
    TInt, TInterpolation, TNpoint, TPose, TSequence, TSequenceSet, TText, TempType, Temporal,
    Text,
};
pub use utils::FP_TOLERANCE;

/// Flags selecting the WKB flavor.
#[bitmask(u8)]
pub enum WKBVariant {
    /// Little endian encoding
    NDR = 1,
    /// Big endian encoding
    XDR = 2,
    /// Extended variant
    Extended = 4,
}
