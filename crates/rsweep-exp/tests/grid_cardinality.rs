use std::collections::BTreeSet;

use proptest::prelude::*;
use rsweep_core::sanitize_identifier;
use rsweep_exp::{Axis, AxisSpec, ParameterGrid, RangeSpec, ScalarValue};

fn reward_axis() -> Axis {
    Axis::sanitized(
        "reward_type",
        [
            "evaluating_rewards/PointMassGroundTruth-v0",
            "evaluating_rewards/PointMassSparseWithCtrl-v0",
            "evaluating_rewards/PointMassDenseWithCtrl-v0",
        ],
    )
    .expect("reward axis")
}

#[test]
fn three_rewards_by_three_seeds_is_nine_jobs() {
    let seeds = Axis::new("seed", ["0", "1", "2"]).expect("seed axis");
    let grid = ParameterGrid::new(vec![reward_axis(), seeds]).expect("grid");
    assert_eq!(grid.len(), 9);
    assert_eq!(grid.points().len(), 9);
}

#[test]
fn first_axis_varies_slowest() {
    let seeds = Axis::new("seed", ["0", "1", "2"]).expect("seed axis");
    let grid = ParameterGrid::new(vec![reward_axis(), seeds]).expect("grid");
    let points = grid.points();

    assert_eq!(points[0].get("seed"), Some("0"));
    assert_eq!(points[1].get("seed"), Some("1"));
    assert_eq!(points[2].get("seed"), Some("2"));
    assert_eq!(
        points[3].get("reward_type"),
        Some("evaluating_rewards/PointMassSparseWithCtrl-v0")
    );
    assert_eq!(points[3].get("seed"), Some("0"));
    for (position, point) in points.iter().enumerate() {
        assert_eq!(point.index, position);
    }
}

#[test]
fn companion_follows_its_axis_in_bindings() {
    let seeds = Axis::new("seed", ["0"]).expect("seed axis");
    let grid = ParameterGrid::new(vec![reward_axis(), seeds]).expect("grid");
    assert_eq!(
        grid.bindings(),
        vec!["reward_type", "reward_type_sanitized", "seed"]
    );
    let point = &grid.points()[0];
    let keys: Vec<&str> = point.bindings.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["reward_type", "reward_type_sanitized", "seed"]);
    assert_eq!(
        point.get("reward_type_sanitized"),
        Some("evaluating_rewards_PointMassGroundTruth-v0")
    );
}

#[test]
fn sanitized_values_stay_aligned_with_raw_values() {
    let axis = reward_axis();
    let raw = axis.raw_values();
    let sanitized = axis.sanitized_values();
    assert_eq!(raw.len(), sanitized.len());
    for (raw, sanitized) in raw.iter().zip(sanitized.iter()) {
        assert_eq!(*sanitized, sanitize_identifier(raw));
    }
}

#[test]
fn range_axis_is_half_open() {
    let spec = AxisSpec {
        name: "seed".to_string(),
        values: Vec::new(),
        range: Some(RangeSpec {
            start: 0,
            end: 5,
            step: 2,
        }),
        sanitize: false,
    };
    let axis = Axis::from_spec(&spec).expect("range axis");
    assert_eq!(axis.raw_values(), vec!["0", "2", "4"]);
}

#[test]
fn scalar_values_render_plainly() {
    let spec = AxisSpec {
        name: "total_timesteps".to_string(),
        values: vec![
            ScalarValue::Int(1000),
            ScalarValue::Float(0.5),
            ScalarValue::Bool(true),
        ],
        range: None,
        sanitize: false,
    };
    let axis = Axis::from_spec(&spec).expect("axis");
    assert_eq!(axis.raw_values(), vec!["1000", "0.5", "true"]);
}

#[test]
fn malformed_axes_are_rejected() {
    let empty = Axis::new("seed", Vec::<String>::new()).expect_err("empty axis");
    assert_eq!(empty.info().code, "axis-empty");

    let duplicate = Axis::new("seed", ["1", "1"]).expect_err("duplicate value");
    assert_eq!(duplicate.info().code, "axis-duplicate-value");

    let bad_name = Axis::new("env-name", ["a"]).expect_err("bad name");
    assert_eq!(bad_name.info().code, "axis-name");

    let zero_step = AxisSpec {
        name: "seed".to_string(),
        values: Vec::new(),
        range: Some(RangeSpec {
            start: 0,
            end: 3,
            step: 0,
        }),
        sanitize: false,
    };
    let err = Axis::from_spec(&zero_step).expect_err("zero step");
    assert_eq!(err.info().code, "range-step");
}

#[test]
fn sanitized_collisions_are_rejected() {
    let err = Axis::sanitized("env_name", ["a/b", "a_b"]).expect_err("same output dir");
    assert_eq!(err.info().code, "axis-sanitized-collision");
    assert_eq!(err.info().context.get("sanitized").map(String::as_str), Some("a_b"));

    let raw_only = Axis::new("env_name", ["a/b", "a_b"]).expect("unsanitized axis");
    assert_eq!(raw_only.len(), 2);
}

#[test]
fn backslashes_are_not_separators() {
    let axis = Axis::sanitized("env_name", [r"a\b/c", "a/b/c"]).expect("axis");
    assert_eq!(axis.sanitized_values(), vec![r"a\b_c", "a_b_c"]);
}

#[test]
fn companion_name_collision_is_rejected() {
    let env = Axis::sanitized("env", ["a/b"]).expect("env axis");
    let clash = Axis::new("env_sanitized", ["x"]).expect("clash axis");
    let err = ParameterGrid::new(vec![env, clash]).expect_err("collision");
    assert_eq!(err.info().code, "axis-duplicate-name");
}

proptest! {
    #[test]
    fn job_count_is_product_of_axis_sizes(sizes in prop::collection::vec(1usize..5, 0..4)) {
        let axes: Vec<Axis> = sizes
            .iter()
            .enumerate()
            .map(|(axis_idx, size)| {
                let values: Vec<String> = (0..*size).map(|value| format!("v{value}")).collect();
                Axis::new(format!("axis_{axis_idx}"), values).expect("axis")
            })
            .collect();
        let grid = ParameterGrid::new(axes).expect("grid");
        let expected: usize = sizes.iter().product();
        prop_assert_eq!(grid.len(), expected);

        let points = grid.points();
        prop_assert_eq!(points.len(), expected);
        let distinct: BTreeSet<Vec<String>> = points
            .iter()
            .map(|point| point.bindings.values().cloned().collect())
            .collect();
        prop_assert_eq!(distinct.len(), expected);
    }

    #[test]
    fn companions_match_sanitized_raw(values in prop::collection::btree_set("[a-z/]{1,8}", 1..6)) {
        let axis = Axis::sanitized("env_name", values.iter().cloned()).expect("axis");
        let grid = ParameterGrid::new(vec![axis]).expect("grid");
        for point in grid.points() {
            let raw = point.get("env_name").expect("raw binding");
            let sanitized = point.get("env_name_sanitized").expect("companion binding");
            prop_assert_eq!(sanitized, sanitize_identifier(raw));
        }
    }
}
