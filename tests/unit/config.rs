use super::*;
use std::io::Write as _;

#[test]
fn defaults_are_valid() {
    let cfg = PipelineConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.fps, 30);
    assert_eq!(cfg.recovery.retry_budget, 3);
    assert_eq!(cfg.oracle.timeout_ms, 10_000);
    assert_eq!(cfg.manifest.entries().len(), 6);
}

#[test]
fn partial_json_fills_in_defaults() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    write!(
        f,
        r#"{{ "fps": 60, "oracle": {{ "enabled": false }}, "recovery": {{ "retry_budget": 1 }} }}"#
    )
    .unwrap();
    let cfg = PipelineConfig::from_path(f.path()).unwrap();
    assert_eq!(cfg.fps, 60);
    assert_eq!(cfg.width, 1920);
    assert!(!cfg.oracle.enabled);
    assert_eq!(cfg.oracle.command, "npx");
    assert_eq!(cfg.recovery.retry_budget, 1);
    assert_eq!(cfg.renderer, RendererConfig::default());
}

#[test]
fn unknown_keys_and_bad_values_are_config_errors() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    write!(f, r#"{{ "fsp": 30 }}"#).unwrap();
    let err = PipelineConfig::from_path(f.path()).unwrap_err();
    assert!(matches!(err, WrightError::Config(_)));

    let cfg = PipelineConfig {
        fps: 0,
        ..PipelineConfig::default()
    };
    assert!(cfg.validate().unwrap_err().to_string().contains("fps"));

    let cfg = PipelineConfig {
        width: 0,
        ..PipelineConfig::default()
    };
    assert!(cfg.validate().is_err());

    assert!(matches!(
        PipelineConfig::from_path("/definitely/not/here.json"),
        Err(WrightError::Config(_))
    ));
}

#[test]
fn disabled_oracle_reports_nothing() {
    let cfg = OracleConfig {
        enabled: false,
        ..OracleConfig::default()
    };
    let oracle = cfg.build(None);
    assert!(oracle.check_types("const x: number = 'a';").unwrap().is_empty());
}

#[test]
fn recover_options_carry_composition_settings() {
    let cfg = PipelineConfig {
        fps: 24,
        ..PipelineConfig::default()
    };
    let opts = cfg.recover_options("Clock", Some("x".into()));
    assert_eq!(opts.composition.id, "Clock");
    assert_eq!(opts.composition.fps, 24);
    assert_eq!(opts.retry_budget, 3);
    assert_eq!(opts.payload.as_deref(), Some("x"));
}
