use std::collections::BTreeMap;

use indexmap::IndexMap;
use rsweep_core::LaunchError;
use rsweep_exp::Template;

fn bindings(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[test]
fn placeholders_are_listed_once_in_order() {
    let template = Template::parse("{root}/{env}/{seed}/{env}");
    assert_eq!(template.placeholders(), vec!["root", "env", "seed"]);
}

#[test]
fn non_identifier_braces_are_literal() {
    let template = Template::parse("{} {1x} {open");
    assert!(template.placeholders().is_empty());
    let rendered = template.render(&bindings(&[])).expect("render");
    assert_eq!(rendered, "{} {1x} {open");
}

#[test]
fn render_substitutes_every_placeholder() {
    let template = Template::parse("{root}/expert_demos/{env_sanitized}/{seed}");
    let rendered = template
        .render(&bindings(&[
            ("root", "/data/out"),
            ("env_sanitized", "evaluating_rewards_PointMassLine-v0"),
            ("seed", "2"),
        ]))
        .expect("render");
    assert_eq!(
        rendered,
        "/data/out/expert_demos/evaluating_rewards_PointMassLine-v0/2"
    );
}

#[test]
fn render_fails_on_unbound_placeholder() {
    let template = Template::parse("{root}/{seed}");
    let err = template
        .render(&bindings(&[("root", "/data/out")]))
        .expect_err("seed is unbound");
    match err {
        LaunchError::Template(info) => {
            assert_eq!(info.code, "template-unbound");
            assert_eq!(info.context.get("placeholder").map(String::as_str), Some("seed"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn partial_render_keeps_unknown_placeholders() {
    let template = Template::parse("{root}/{experiment}/{seed}");
    let partial = template.render_partial(&bindings(&[
        ("root", "/data/out"),
        ("experiment", "eval_policy"),
    ]));
    assert_eq!(partial.source(), "/data/out/eval_policy/{seed}");
    assert_eq!(partial.placeholders(), vec!["seed"]);

    let mut point = IndexMap::new();
    point.insert("seed".to_string(), "1".to_string());
    assert_eq!(
        partial.render(&point).expect("render"),
        "/data/out/eval_policy/1"
    );
}

#[test]
fn check_bound_reports_unknown_names() {
    let template = Template::parse("{env}/{sed}");
    let known = vec!["env".to_string(), "seed".to_string()];
    let err = template.check_bound(&known).expect_err("typo");
    assert_eq!(err.info().code, "template-unknown-placeholder");
    assert_eq!(
        err.info().context.get("placeholder").map(String::as_str),
        Some("sed")
    );
}

#[test]
fn scalars_deserialize_as_templates() {
    let args: IndexMap<String, Template> =
        serde_yaml::from_str("total_timesteps: 1000\nnormalize: false\nname: \"{seed}\"\n")
            .expect("yaml");
    assert_eq!(args["total_timesteps"].source(), "1000");
    assert_eq!(args["normalize"].source(), "false");
    assert_eq!(args["name"].placeholders(), vec!["seed"]);
}
