pub mod tpoint;

#[cfg(test)]
mod tests {
    use crate::TGeomPoint;

    #[test]
    fn instant_tgeompoint() {
        let string = "POINT(1 1)@2018-01-01 08:00:00+00";
        let result: TGeomPoint = string.parse().unwrap();
        assert_eq!(format!("{result:?}"), format!("Instant({string})"));
    }

    #[test]
    fn sequence_tgeompoint() {
        let string = "[POINT(1 1)@2018-01-01 08:00:00+00, POINT(2 2)@2018-01-02 08:00:00+00]";
        let result: TGeomPoint = string.parse().unwrap();
        assert_eq!(format!("{result:?}"), format!("Sequence({string})"));
    }

    #[test]
    fn sequence_set_tgeompoint() {
        let string = "{[POINT(1 1)@2018-01-01 08:00:00+00]}";
        let result: TGeomPoint = string.parse().unwrap();
        assert_eq!(format!("{result:?}"), format!("SequenceSet({string})"));
    }

    #[test]
    fn srid_prefix_round_trip() {
        let string = "SRID=4326;POINT(1 1)@2018-01-01 08:00:00+00";
        let result: TGeomPoint = string.parse().unwrap();
        assert_eq!(result.to_string(), string);
    }
}
