use std::fmt;

use chrono::{DateTime, TimeZone, Utc};

use crate::collections::base::span::Span;
use crate::collections::datetime::tstz_span::TsTzSpan;
use crate::temporal::base::BaseType;
use crate::utils::format_timestamp;

/// A base value observed at one timestamp.
#[derive(Clone, PartialEq)]
pub struct TInstant<B: BaseType> {
    value: B,
    timestamp: DateTime<Utc>,
}

impl<B: BaseType> TInstant<B> {
    /// Creates an instant from a value and a timestamp.
    pub fn new<Tz: TimeZone>(value: B, timestamp: DateTime<Tz>) -> Self {
        Self { value, timestamp: timestamp.with_timezone(&Utc) }
    }

    pub fn value(&self) -> &B {
        &self.value
    }

    pub fn into_value(self) -> B {
        self.value
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub(crate) fn timestamp_micros(&self) -> i64 {
        crate::utils::to_micros(&self.timestamp)
    }

    /// The degenerate period holding the instant's timestamp.
    pub fn tstzspan(&self) -> TsTzSpan {
        Span::singleton(self.timestamp)
    }

    /// The instant's bounding box.
    pub fn bounding_box(&self) -> B::Bbox {
        self.value.instant_bbox(self.timestamp)
    }

    pub(crate) fn with_value(&self, value: B) -> Self {
        Self { value, timestamp: self.timestamp }
    }

    pub(crate) fn at(&self, timestamp: DateTime<Utc>) -> Self
    where
        B: Clone,
    {
        Self { value: self.value.clone(), timestamp }
    }
}

impl<B: BaseType> fmt::Display for TInstant<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.write_wkt(f)?;
        write!(f, "@{}", format_timestamp(&self.timestamp))
    }
}

impl<B: BaseType> fmt::Debug for TInstant<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn display_is_value_at_timestamp() {
        let t = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let inst = TInstant::new(1.5f64, t);
        assert_eq!(inst.to_string(), "1.5@2020-01-01 00:00:00+00");
    }

    #[test]
    fn bounding_box_of_a_float_instant() {
        let t = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let inst = TInstant::new(2.0f64, t);
        let bbox = inst.bounding_box();
        assert_eq!(bbox.xmin(), Some(2.0));
        assert_eq!(bbox.tmin(), Some(t));
    }
}
