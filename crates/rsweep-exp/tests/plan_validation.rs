use rsweep_core::LaunchError;
use rsweep_exp::ExperimentPlan;

fn plan_with_stage(stage: &str) -> String {
    format!("experiment: demo\nstages:\n{stage}")
}

fn rejection_code(yaml: &str) -> String {
    let err = ExperimentPlan::from_yaml_str(yaml).expect_err("plan should be rejected");
    err.info().code.clone()
}

const SEED_STAGE: &str = "  - name: train
    task: expert_demos
    axes:
      - name: seed
        values: [0, 1]
    args:
      seed: \"{seed}\"
    output: \"{seed}\"
";

#[test]
fn minimal_plan_is_accepted_with_defaults() {
    let plan = ExperimentPlan::from_yaml_str(&plan_with_stage(SEED_STAGE)).expect("plan");
    let stage = plan.stage("train").expect("stage");
    assert_eq!(stage.mode, "with");
    assert_eq!(stage.output_arg.as_deref(), Some("log_dir"));
    assert_eq!(stage.grid().expect("grid").len(), 2);
    assert_eq!(plan.stage_names(), vec!["train"]);
}

#[test]
fn plan_without_stages_is_rejected() {
    assert_eq!(rejection_code("experiment: demo\nstages: []\n"), "plan-no-stages");
}

#[test]
fn experiment_name_must_be_a_path_component() {
    let yaml = format!("experiment: a/b\nstages:\n{SEED_STAGE}");
    assert_eq!(rejection_code(&yaml), "name-invalid");
    let yaml = format!("experiment: \"..\"\nstages:\n{SEED_STAGE}");
    assert_eq!(rejection_code(&yaml), "name-invalid");
}

#[test]
fn duplicate_stage_names_are_rejected() {
    let yaml = plan_with_stage(&format!("{SEED_STAGE}{SEED_STAGE}"));
    assert_eq!(rejection_code(&yaml), "stage-duplicate");
}

#[test]
fn unknown_placeholder_is_a_template_error() {
    let yaml = plan_with_stage(&SEED_STAGE.replace("seed: \"{seed}\"", "seed: \"{sede}\""));
    let err = ExperimentPlan::from_yaml_str(&yaml).expect_err("typo");
    assert!(matches!(err, LaunchError::Template(_)));
    assert_eq!(err.info().code, "template-unknown-placeholder");
}

#[test]
fn context_names_are_bound_in_args() {
    let yaml = plan_with_stage(&SEED_STAGE.replace(
        "seed: \"{seed}\"",
        "policy_path: \"{root}/{experiment}/{stage}/{seed}\"",
    ));
    ExperimentPlan::from_yaml_str(&yaml).expect("context placeholders resolve");
}

#[test]
fn axes_cannot_shadow_context_names() {
    let yaml = plan_with_stage(&SEED_STAGE.replace("- name: seed", "- name: root"));
    assert_eq!(rejection_code(&yaml), "axis-reserved-name");
}

#[test]
fn explicit_output_argument_conflicts() {
    let yaml = plan_with_stage(&SEED_STAGE.replace("seed: \"{seed}\"", "log_dir: /tmp"));
    assert_eq!(rejection_code(&yaml), "arg-output-conflict");
}

#[test]
fn output_argument_can_be_disabled() {
    let stage = SEED_STAGE.replace("    output:", "    output_arg: null\n    output:");
    let yaml = plan_with_stage(&stage.replace("seed: \"{seed}\"", "log_dir: /tmp"));
    let plan = ExperimentPlan::from_yaml_str(&yaml).expect("plan");
    assert_eq!(plan.stages[0].output_arg, None);
}

#[test]
fn absolute_output_is_rejected() {
    let yaml = plan_with_stage(&SEED_STAGE.replace("output: \"{seed}\"", "output: \"/abs/{seed}\""));
    assert_eq!(rejection_code(&yaml), "output-absolute");
}

#[test]
fn output_cannot_start_from_the_root() {
    let yaml = plan_with_stage(&SEED_STAGE.replace("output: \"{seed}\"", "output: \"{root}/{seed}\""));
    assert_eq!(rejection_code(&yaml), "output-absolute");

    let yaml = plan_with_stage(
        &SEED_STAGE.replace("output: \"{seed}\"", "output: \"{experiment}/{stage}/{seed}\""),
    );
    ExperimentPlan::from_yaml_str(&yaml).expect("relative context placeholders are fine");
}

#[test]
fn values_and_range_are_exclusive() {
    let yaml = plan_with_stage(&SEED_STAGE.replace(
        "values: [0, 1]",
        "values: [0, 1]\n        range: {start: 0, end: 2}",
    ));
    assert_eq!(rejection_code(&yaml), "axis-values-and-range");
}

#[test]
fn empty_axis_is_a_grid_error() {
    let yaml = plan_with_stage(&SEED_STAGE.replace("values: [0, 1]", "values: []"));
    let err = ExperimentPlan::from_yaml_str(&yaml).expect_err("empty axis");
    assert!(matches!(err, LaunchError::Grid(_)));
    assert_eq!(err.info().code, "axis-empty");
}

#[test]
fn malformed_yaml_is_a_serde_error() {
    let err = ExperimentPlan::from_yaml_str("experiment: [").expect_err("bad yaml");
    assert!(matches!(err, LaunchError::Serde(_)));
}

#[test]
fn missing_plan_file_is_an_io_error() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let err = rsweep_exp::load_plan(temp.path().join("absent.yaml")).expect_err("missing");
    assert!(matches!(err, LaunchError::Io(_)));
    assert_eq!(err.info().code, "plan_read");
}
