mod interpolation;
pub use interpolation::TInterpolation;

pub mod base;
pub use base::{BaseType, Double2, Double3, Double4, TempType, Text};

mod number;
pub use number::tfloat::TFloat;
pub use number::tint::TInt;
pub use number::tnumber::TNumber;

mod point;
pub use point::tpoint::{tgeogpoint_in, TGeogPoint, TGeomPoint};

mod tbool;
pub use tbool::TBool;

#[allow(clippy::module_inception)]
mod temporal;
pub use temporal::Temporal;

mod tinstant;
pub use tinstant::TInstant;

mod tsequence;
pub use tsequence::TSequence;

mod tsequence_set;
pub use tsequence_set::TSequenceSet;

mod ttext;
pub use ttext::TText;

pub(crate) mod restrict;
pub(crate) mod segment;
pub mod sync;

pub mod cbuffer;
pub use cbuffer::{Cbuffer, TCbuffer};

pub mod npoint;
pub use npoint::{NPoint, TNpoint};

pub mod pose;
pub use pose::{Pose, TPose};
