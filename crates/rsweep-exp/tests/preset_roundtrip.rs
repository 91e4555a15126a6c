use std::path::PathBuf;

use rsweep_exp::{load_plan, load_preset, preset_names, resolve_plan, ExperimentPlan};

fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join(relative)
}

#[test]
fn presets_are_listed_in_launch_order() {
    assert_eq!(preset_names(), vec!["expert_demos", "eval_policy"]);
}

#[test]
fn preset_matches_plan_file() {
    let preset = load_preset("expert_demos").expect("preset");
    let file = load_plan(fixture_path("plans/expert_demos.yaml")).expect("plan file");
    assert_eq!(preset, file);
    assert_eq!(preset.stages[0].grid().expect("grid").len(), 9);
}

#[test]
fn plan_roundtrip_is_stable() {
    for name in preset_names() {
        let plan = load_preset(name).expect("preset");
        let serialized = plan.to_yaml_string().expect("serialize");
        let reparsed = ExperimentPlan::from_yaml_str(&serialized).expect("reparse");
        assert_eq!(plan, reparsed, "{name} changed across a roundtrip");

        let normalized = reparsed.to_yaml_string().expect("normalized serialize");
        let serialized_value: serde_yaml::Value =
            serde_yaml::from_str(&serialized).expect("value");
        let normalized_value: serde_yaml::Value =
            serde_yaml::from_str(&normalized).expect("normalized value");
        assert_eq!(serialized_value, normalized_value);
    }
}

#[test]
fn plan_hash_is_deterministic() {
    let first = load_preset("eval_policy").expect("preset");
    let second = load_preset("eval_policy").expect("preset");
    assert_eq!(
        first.plan_hash().expect("hash"),
        second.plan_hash().expect("hash")
    );

    let other = load_preset("expert_demos").expect("preset");
    assert_ne!(
        first.plan_hash().expect("hash"),
        other.plan_hash().expect("hash")
    );
}

#[test]
fn resolve_prefers_existing_files() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let path = temp.path().join("custom.yaml");
    std::fs::write(
        &path,
        "experiment: custom\nstages:\n  - name: only\n    task: expert_demos\n    output: run\n",
    )
    .expect("write plan");

    let from_file = resolve_plan(path.to_str().expect("utf8 path")).expect("file plan");
    assert_eq!(from_file.experiment, "custom");

    let from_preset = resolve_plan("eval_policy").expect("preset plan");
    assert_eq!(from_preset.experiment, "eval_policy");

    let err = resolve_plan("no_such_plan").expect_err("unknown");
    assert_eq!(err.info().code, "preset-unknown");
}
