//! Tests for planner configuration.

use super::*;

#[test]
fn test_toml_parsing() {
    let toml = r#"
        manual_mode = true

        [search]
        allow_revisits = true
        max_depth = 12

        [abort]
        step_limit = 20000
        seconds_spent_limit = 2
    "#;

    let config = PlannerConfig::from_toml_str(toml).unwrap();
    assert!(config.manual_mode);
    assert!(config.search.allow_revisits);
    assert_eq!(config.search.max_depth, Some(12));
    assert_eq!(config.abort.step_limit(), 20_000);
    assert_eq!(config.abort.time_limit(), Some(Duration::from_secs(2)));
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        search:
          max_depth: 4
        abort:
          millis_spent_limit: 1500
    "#;

    let config = PlannerConfig::from_yaml_str(yaml).unwrap();
    assert!(!config.manual_mode);
    assert_eq!(config.search.max_depth, Some(4));
    assert_eq!(config.abort.time_limit(), Some(Duration::from_millis(1500)));
}

#[test]
fn test_defaults() {
    let config = PlannerConfig::from_toml_str("").unwrap();
    assert_eq!(config, PlannerConfig::default());
    assert!(!config.search.allow_revisits);
    assert_eq!(config.search.max_depth, None);
    assert_eq!(config.abort.step_limit(), DEFAULT_STEP_LIMIT);
    assert_eq!(config.abort.time_limit(), None);
}

#[test]
fn test_builder() {
    let config = PlannerConfig::new()
        .with_manual_mode(true)
        .with_allow_revisits(true)
        .with_max_depth(3)
        .with_step_limit(10)
        .with_time_limit_millis(50);

    assert!(config.manual_mode);
    assert!(config.search.allow_revisits);
    assert_eq!(config.search.max_depth, Some(3));
    assert_eq!(config.abort.step_limit(), 10);
    assert_eq!(config.abort.time_limit(), Some(Duration::from_millis(50)));
}

#[test]
fn test_invalid_values() {
    let err = PlannerConfig::from_toml_str("[search]\nmax_depth = 0").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let err = PlannerConfig::from_yaml_str("abort:\n  step_limit: 0").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_missing_file() {
    let err = PlannerConfig::load("/nonexistent/planner.toml").unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_unknown_types_are_rejected() {
    let err = PlannerConfig::from_toml_str("[search]\nmax_depth = \"deep\"").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
}
