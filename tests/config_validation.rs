use std::fs;

use dagrun::config::{load_and_validate, load_from_path, validate_config, ConfigFile};
use dagrun::errors::DagrunError;
use dagrun_test_utils::{ConfigFileBuilder, TaskConfigBuilder};

fn write_temp_config(name: &str, contents: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("dagrun-test-{name}-{}.toml", std::process::id()));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn toml_defaults_are_applied() {
    let path = write_temp_config(
        "defaults",
        r#"
[task.a]
cmd = "echo a"

[task.b]
cmd = "echo b"
after = ["a"]
"#,
    );
    let cfg: ConfigFile = load_from_path(&path).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(cfg.orchestrator.name, "dagrun");
    assert_eq!(cfg.orchestrator.max_concurrent, 0);
    assert!(!cfg.orchestrator.quit_on_failure);
    assert_eq!(cfg.task.len(), 2);
    assert_eq!(cfg.task["b"].after, vec!["a"]);
}

#[test]
fn orchestrator_section_round_trips() {
    let path = write_temp_config(
        "orchestrator",
        r#"
[orchestrator]
name = "pipeline"
max_concurrent = 3
quit_on_failure = true

[task.only]
cmd = "true"
"#,
    );
    let cfg = load_and_validate(&path).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(cfg.orchestrator.name, "pipeline");
    assert_eq!(cfg.orchestrator.max_concurrent, 3);
    assert!(cfg.orchestrator.quit_on_failure);
}

#[test]
fn missing_config_file_is_an_error() {
    let err = load_from_path("/definitely/not/here/Dagrun.toml").unwrap_err();
    assert!(matches!(err, DagrunError::Other(_)));
}

#[test]
fn empty_task_table_is_rejected() {
    let cfg = ConfigFileBuilder::new().build();
    let err = validate_config(&cfg).unwrap_err();
    assert!(matches!(err, DagrunError::Config(msg) if msg.contains("at least one")));
}

#[test]
fn unknown_dependency_is_rejected() {
    let cfg = ConfigFileBuilder::new()
        .with_task("a", TaskConfigBuilder::new("echo a").after("ghost").build())
        .build();
    let err = validate_config(&cfg).unwrap_err();
    assert!(matches!(err, DagrunError::Config(msg) if msg.contains("ghost")));
}

#[test]
fn self_dependency_is_rejected() {
    let cfg = ConfigFileBuilder::new()
        .with_task("a", TaskConfigBuilder::new("echo a").after("a").build())
        .build();
    let err = validate_config(&cfg).unwrap_err();
    assert!(matches!(err, DagrunError::SelfLoop(id) if id == "a"));
}

#[test]
fn dependency_cycle_is_rejected() {
    let cfg = ConfigFileBuilder::new()
        .with_task("a", TaskConfigBuilder::new("echo a").after("b").build())
        .with_task("b", TaskConfigBuilder::new("echo b").after("a").build())
        .build();
    let err = validate_config(&cfg).unwrap_err();
    assert!(matches!(err, DagrunError::CyclicGraph));
}

#[test]
fn valid_config_passes_validation() {
    let cfg = ConfigFileBuilder::new()
        .with_quit_on_failure(true)
        .with_task("a", TaskConfigBuilder::new("echo a").build())
        .with_task("b", TaskConfigBuilder::new("echo b").after("a").build())
        .with_task("c", TaskConfigBuilder::new("echo c").after("a").after("b").build())
        .build();
    assert!(validate_config(&cfg).is_ok());
}
