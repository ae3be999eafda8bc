pub mod tfloat;
pub mod tint;
pub mod tnumber;

#[cfg(test)]
mod tests {
    #[test]
    fn instant_tint() {
        let string = "1@2018-01-01 08:00:00+00";
        let result: crate::TInt = string.parse().unwrap();
        assert_eq!(format!("{result:?}"), format!("Instant({string})"));
    }

    #[test]
    fn sequence_tint() {
        let string = "[1@2018-01-01 08:00:00+00]";
        let result: crate::TInt = string.parse().unwrap();
        assert_eq!(format!("{result:?}"), format!("Sequence({string})"));
    }

    #[test]
    fn sequence_set_tint() {
        let string = "{[1@2018-01-01 08:00:00+00]}";
        let result: crate::TInt = string.parse().unwrap();
        assert_eq!(format!("{result:?}"), format!("SequenceSet({string})"));
    }

    #[test]
    fn instant_tfloat() {
        let string = "1.5@2018-01-01 08:00:00+00";
        let result: crate::TFloat = string.parse().unwrap();
        assert_eq!(format!("{result:?}"), format!("Instant({string})"));
    }

    #[test]
    fn sequence_tfloat() {
        let string = "[1.5@2018-01-01 08:00:00+00, 2.5@2018-01-02 08:00:00+00]";
        let result: crate::TFloat = string.parse().unwrap();
        assert_eq!(format!("{result:?}"), format!("Sequence({string})"));
    }

    #[test]
    fn sequence_set_tfloat() {
        let string = "{[1.5@2018-01-01 08:00:00+00]}";
        let result: crate::TFloat = string.parse().unwrap();
        assert_eq!(format!("{result:?}"), format!("SequenceSet({string})"));
    }

    #[test]
    fn discrete_sequence_tint() {
        let string = "{1@2018-01-01 08:00:00+00, 2@2018-01-02 08:00:00+00}";
        let result: crate::TInt = string.parse().unwrap();
        assert_eq!(result.num_instants(), 2);
    }

    #[test]
    fn step_interp_prefix_tfloat() {
        let string = "Interp=Step;[1@2018-01-01 08:00:00+00, 2@2018-01-02 08:00:00+00]";
        let result: crate::TFloat = string.parse().unwrap();
        assert_eq!(
            result.interpolation(),
            crate::temporal::TInterpolation::Stepwise
        );
        assert!(result.to_string().starts_with("Interp=Step;"));
    }
}
