use std::fmt::Debug;

use crate::collections::datetime::tstz_span::TsTzSpan;

/// Common behavior of the cached bounding boxes: the plain period for
/// non-spatial values, [`crate::boxes::TBox`] for numbers and
/// [`crate::boxes::STBox`] for spatial values.
pub trait BoundingBox: Clone + Debug + PartialEq {
    /// Grows `self` in place so it also covers `other`.
    fn expand(&mut self, other: &Self);

    /// Replaces the temporal dimension.
    fn set_time(&mut self, period: &TsTzSpan);

    /// The temporal dimension, when present.
    fn time(&self) -> Option<TsTzSpan>;
}

impl BoundingBox for TsTzSpan {
    fn expand(&mut self, other: &Self) {
        TsTzSpan::expand(self, other);
    }

    fn set_time(&mut self, period: &TsTzSpan) {
        *self = *period;
    }

    fn time(&self) -> Option<TsTzSpan> {
        Some(*self)
    }
}
