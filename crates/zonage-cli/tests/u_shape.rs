//! End-to-end runs of the command set against a U-shaped room plan.
//!
//! Run with: `cargo test -p zonage-cli --test u_shape`

use std::path::PathBuf;

use zonage::ZonePath;
use zonage_cli::document::DocumentArgs;
use zonage_cli::layout::{LayoutArgs, LocateArgs};
use zonage_cli::rule::{RuleArgs, TemplateSource, explain_rule};
use zonage_cli::validate::{ValidateArgs, validate_state};
use zonage_cli::vars::VarsArgs;
use zonage_cli::{Cli, CliError, Commands, execute};

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/u_shape.json")
}

fn document() -> DocumentArgs {
    DocumentArgs::new(fixture())
}

fn run(command: Commands, json: bool) -> Result<String, CliError> {
    let cli = Cli {
        verbose: false,
        json,
        command,
    };
    let mut out = Vec::new();
    execute(&cli, &mut out)?;
    Ok(String::from_utf8(out).expect("utf-8 output"))
}

fn close(value: &serde_json::Value, expected: f64) -> bool {
    value.as_f64().is_some_and(|v| (v - expected).abs() < 1e-6)
}

fn json(command: Commands) -> serde_json::Value {
    let text = run(command, true).expect("command succeeds");
    serde_json::from_str(&text).expect("valid JSON")
}

#[test]
fn dimensions_come_from_expressions() {
    let value = json(Commands::Vars(VarsArgs {
        document: document(),
    }));
    assert_eq!(value["dimensions"]["x"], 5000.0);
    assert_eq!(value["dimensions"]["y"], 3000.0);
    assert_eq!(value["dimensions"]["z"], 4000.0);

    let steps: Vec<&serde_json::Value> = value["variables"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|row| row["name"] == "ZB_STEP")
        .collect();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0]["value"], 400.0);
    assert_eq!(steps[0]["definition"], "$ZB_W/$ZB_CNT");
}

#[test]
fn right_wing_is_located() {
    let value = json(Commands::Locate(LocateArgs {
        document: document(),
        id: ZonePath::new("0.0.1"),
    }));
    assert!(close(&value["size"]["x"], 500.0));
    assert!(close(&value["size"]["y"], 3000.0));
    assert!(close(&value["size"]["z"], 4000.0));
    assert!(close(&value["position"]["x"], 2250.0), "{value}");
}

#[test]
fn overrides_move_the_wing() {
    let value = json(Commands::Locate(LocateArgs {
        document: document().with_override("ZR_D=1000"),
        id: ZonePath::new("0.0.1"),
    }));
    // width grows to 5500; the wing is the last 1000 of it
    assert!(close(&value["size"]["x"], 1000.0));
    assert!(close(&value["position"]["x"], 2250.0), "{value}");
}

#[test]
fn unknown_zone_exits_with_not_found() {
    let err = run(
        Commands::Locate(LocateArgs {
            document: document(),
            id: ZonePath::new("0.9"),
        }),
        false,
    )
    .unwrap_err();
    assert_eq!(err.exit_code(), 4);
    assert_eq!(err.to_string(), "zone not found: 0.9");
}

#[test]
fn layout_lists_every_rendered_zone_once() {
    let value = json(Commands::Layout(LayoutArgs {
        document: document(),
        max_level: None,
    }));
    let zones = value["zones"].as_array().unwrap();
    assert_eq!(zones[0]["id"], "0");
    let mut ids: Vec<&str> = zones.iter().map(|z| z["id"].as_str().unwrap()).collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total);
    assert!(!ids.contains(&"0.0.0"), "empty zones are not rendered");
}

#[test]
fn layout_text_respects_max_level() {
    let text = run(
        Commands::Layout(LayoutArgs {
            document: document(),
            max_level: Some(1),
        }),
        false,
    )
    .unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("dimensions 5000.0 x 3000.0 x 4000.0"));
    let ids: Vec<&str> = lines
        .map(|line| line.split_whitespace().next().unwrap())
        .collect();
    assert_eq!(ids, ["0", "0.0", "0.1", "0.2"]);
}

#[test]
fn conditional_rule_reports_its_branch() {
    let state = document().load_state().unwrap();
    let report = explain_rule(&state, &ZonePath::new("0.0.1.0.1")).unwrap();
    // IS_BM_P = 1, so `0 = 1 - $IS_BM_P` holds
    assert_eq!(report.source, TemplateSource::Condition(0));
    assert_eq!(report.resolved.parsed.partition_count(), 2);
    assert_eq!(report.children, 2);

    let flipped = document()
        .with_override("IS_BM_P=0")
        .load_state()
        .unwrap();
    let report = explain_rule(&flipped, &ZonePath::new("0.0.1.0.1")).unwrap();
    assert_eq!(report.source, TemplateSource::Condition(1));
}

#[test]
fn rule_sizes_split_the_located_extent() {
    let state = document().load_state().unwrap();
    let report = explain_rule(&state, &ZonePath::new("0.0")).unwrap();
    assert_eq!(report.source, TemplateSource::Default);
    assert_eq!(report.extent, Some(5000.0));
    assert_eq!(report.sizes.unwrap().sizes, vec![4500.0, 500.0]);

    let text = run(
        Commands::Rule(RuleArgs {
            document: document(),
            id: ZonePath::new("0"),
        }),
        false,
    )
    .unwrap();
    assert!(text.contains("layered"));
}

#[test]
fn plan_has_no_errors_but_drops_extra_children() {
    let state = document().load_state().unwrap();
    let report = validate_state(&state);
    assert_eq!(report.errors(), 0, "{:#?}", report.issues);
    let dropped: Vec<_> = report.for_zone("0.1.0").collect();
    assert!(
        dropped
            .iter()
            .any(|issue| issue.message.contains("extra children ignored"))
    );

    let ok = run(
        Commands::Validate(ValidateArgs {
            document: document(),
            strict: false,
        }),
        false,
    )
    .unwrap();
    assert!(ok.trim_end().ends_with(&format!("0 error(s), {} warning(s)", report.warnings())));

    let strict = run(
        Commands::Validate(ValidateArgs {
            document: document(),
            strict: true,
        }),
        false,
    )
    .unwrap_err();
    assert_eq!(strict.exit_code(), 3);
}
