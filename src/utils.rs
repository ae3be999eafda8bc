use chrono::{DateTime, Utc};

/// Tolerance used by every floating-point root finder and equality test.
pub const FP_TOLERANCE: f64 = 1e-12;

/// Microseconds since the Unix epoch, the timeline the kernels compute on.
pub(crate) fn to_micros(t: &DateTime<Utc>) -> i64 {
    t.timestamp_micros()
}

pub(crate) fn from_micros(micros: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(micros)
        .expect("timestamp out of chrono range")
}

/// Format a timestamp the way the WKT output does: seconds precision when the
/// sub-second part is zero, full microseconds otherwise, always UTC.
pub(crate) fn format_timestamp(t: &DateTime<Utc>) -> String {
    if t.timestamp_subsec_micros() == 0 {
        t.format("%Y-%m-%d %H:%M:%S+00").to_string()
    } else {
        t.format("%Y-%m-%d %H:%M:%S%.6f+00").to_string()
    }
}

/// Format a float without trailing zeros, `15` significant digits max.
pub(crate) fn format_float(x: f64) -> String {
    if x == x.trunc() && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        let mut s = format!("{x}");
        if s.contains('e') {
            s = format!("{x:e}");
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamp_micros_round_trip() {
        let t = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(from_micros(to_micros(&t)), t);
    }

    #[test]
    fn timestamp_format() {
        let t = Utc.with_ymd_and_hms(2020, 1, 1, 8, 30, 0).unwrap();
        assert_eq!(format_timestamp(&t), "2020-01-01 08:30:00+00");
    }

    #[test]
    fn float_format() {
        assert_eq!(format_float(1.0), "1");
        assert_eq!(format_float(1.5), "1.5");
    }
}
