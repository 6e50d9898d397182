//! Property tests for condition evaluation.

use proptest::prelude::*;

use tabwatch::core::{Approx, Condition, TestValue};

proptest! {
    #[test]
    fn strict_bounds_match_plain_comparison(value in -1e6f64..1e6, bound in -1e6f64..1e6) {
        let v = TestValue::Number(value);
        prop_assert_eq!(Condition::new().gt(bound).is_satisfied(&v), value > bound);
        prop_assert_eq!(Condition::new().lt(bound).is_satisfied(&v), value < bound);
        prop_assert_eq!(Condition::new().gte(bound).is_satisfied(&v), value >= bound);
        prop_assert_eq!(Condition::new().lte(bound).is_satisfied(&v), value <= bound);
    }

    #[test]
    fn absolute_tolerance_is_symmetric(
        expected in -1e6f64..1e6,
        tolerance in 0.0f64..1e3,
        offset in -2e3f64..2e3,
    ) {
        let value = TestValue::Number(expected + offset);
        let holds = Condition::new()
            .eq(Approx::absolute(expected, tolerance))
            .is_satisfied(&value);
        prop_assert_eq!(holds, offset.abs() <= tolerance);
    }

    #[test]
    fn conjunction_holds_iff_every_field_holds(
        value in -1e6f64..1e6,
        low in -1e6f64..1e6,
        high in -1e6f64..1e6,
    ) {
        let v = TestValue::Number(value);
        let both = Condition::new().gt(low).lt(high).is_satisfied(&v);
        prop_assert_eq!(both, value > low && value < high);
    }

    #[test]
    fn violations_name_exactly_the_failing_fields(
        value in -100.0f64..100.0,
        low in -100.0f64..100.0,
        high in -100.0f64..100.0,
    ) {
        let v = TestValue::Number(value);
        let violated = Condition::new().gte(low).lte(high).check(&v);
        let mut expected = Vec::new();
        if !(value >= low) {
            expected.push("gte");
        }
        if !(value <= high) {
            expected.push("lte");
        }
        prop_assert_eq!(violated, expected);
    }

    #[test]
    fn text_values_violate_numeric_fields(text in "[a-z]{1,8}") {
        let v = TestValue::Text(text);
        let violated = Condition::new().gt(0.0).check(&v);
        prop_assert_eq!(violated, vec!["gt"]);
    }

    #[test]
    fn membership_is_consistent(value in 0u32..10, allowed in proptest::collection::vec(0u32..10, 1..5)) {
        let v = TestValue::Number(value as f64);
        let values: Vec<f64> = allowed.iter().map(|&a| a as f64).collect();
        let in_list = allowed.contains(&value);
        prop_assert_eq!(
            Condition::new().is_in(values.clone()).is_satisfied(&v),
            in_list
        );
        prop_assert_eq!(Condition::new().not_in(values).is_satisfied(&v), !in_list);
    }

    #[test]
    fn serde_round_trip_preserves_evaluation(
        value in -100.0f64..100.0,
        low in -100.0f64..100.0,
        high in -100.0f64..100.0,
    ) {
        let condition = Condition::new()
            .eq(Approx::relative(low, 0.1))
            .gt(low)
            .lte(high);
        let json = serde_json::to_string(&condition).unwrap();
        let decoded: Condition = serde_json::from_str(&json).unwrap();
        let v = TestValue::Number(value);
        prop_assert_eq!(condition.check(&v), decoded.check(&v));
    }
}
