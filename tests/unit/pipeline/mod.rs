use super::*;
use crate::oracle::{NoopOracle, StaticOracle};
use crate::validate::{FindingCategory, Severity};

const COUNTER: &str = r#"import React, { useState, useEffect } from 'react';

export default function Counter() {
  const [count, setCount] = useState(0);
  useEffect(() => {
    const id = setInterval(() => setCount(c => c + 1), 16);
    return () => clearInterval(id);
  }, []);
  return <div>{count}</div>;
}
"#;

fn pipeline() -> Pipeline {
    Pipeline::new(Arc::new(PipelineConfig::default()), Arc::new(NoopOracle))
}

#[test]
fn counter_transpiles_to_a_valid_frame_component() {
    let oracle = Arc::new(StaticOracle::default());
    let p = Pipeline::new(Arc::new(PipelineConfig::default()), oracle.clone());
    let t = p.transpile(&Artifact::new(COUNTER, "counter")).unwrap();
    assert!(t.text.contains("const count = Math.floor(frame * 2.0833);"));
    assert!(!t.text.contains("setInterval"));
    assert!(!t.used_placeholder);
    assert!(t.report.is_valid);
    assert_eq!(t.bindings.len(), 1);
    assert_eq!(t.fingerprint, xxhash_rust::xxh3::xxh3_64(t.text.as_bytes()));
    assert_eq!(oracle.calls(), 1);
}

#[test]
fn unparseable_input_is_rejected_with_a_critical_finding() {
    let err = pipeline()
        .transpile(&Artifact::new("export default function A() { return <div>; }", "a"))
        .unwrap_err();
    assert!(err.text.is_none());
    assert_eq!(err.report.findings.len(), 1);
    assert_eq!(err.report.findings[0].severity, Severity::Critical);
    assert!(err.to_string().contains("'a' rejected"));
}

#[test]
fn unresolved_output_is_rejected_with_its_text() {
    let src = "export default function A() { return <p>{missing}</p>; }";
    let err = pipeline().transpile(&Artifact::new(src, "a")).unwrap_err();
    assert!(err.text.is_some());
    assert_eq!(err.report.of_category(FindingCategory::VariableFlow).count(), 1);
}

#[test]
fn inputs_are_repaired_first() {
    let src = "export default function A() {\n  const style = { fontSize: ''42px' };\n  return <p style={style}>hi</p>;\n}\n";
    let t = pipeline().transpile(&Artifact::new(src, "a")).unwrap();
    assert_eq!(t.input_repair.fix_count, 1);
    assert!(t.text.contains("fontSize: '42px'"));
    assert!(!t.repair_audit().is_empty());
}

#[test]
fn zero_confidence_falls_back_to_the_placeholder() {
    let src = r#"export default function Log() {
  const [items, setItems] = useState([]);
  useEffect(() => { setInterval(() => setItems(prev => [...prev, prev.length]), 500); }, []);
  return <ul>{items.length}</ul>;
}
"#;
    let t = pipeline().transpile(&Artifact::new(src, "log")).unwrap();
    assert!(t.used_placeholder);
    assert!(t.text.contains("AbsoluteFill"));
    assert_eq!(t.rewrite.confidence, 0.0);
}

#[test]
fn deploy_recovers_the_project_and_writes_once() {
    let dir = tempfile::tempdir().unwrap();
    let p = pipeline();
    let artifact = Artifact::new(COUNTER, "counter");

    let first = p.deploy(&artifact, dir.path()).unwrap();
    assert_eq!(first.integrity.state, crate::project::ProjectState::Recovered);
    assert!(!first.payload_written);
    let payload = std::fs::read_to_string(dir.path().join("src/Artifact.tsx")).unwrap();
    assert_eq!(payload, first.transpiled.text);
    let root = std::fs::read_to_string(dir.path().join("src/Root.tsx")).unwrap();
    assert!(root.contains(r#"id={"counter"}"#));

    let second = p.deploy(&artifact, dir.path()).unwrap();
    assert_eq!(second.integrity.state, crate::project::ProjectState::Healthy);
    assert!(!second.payload_written);
}

#[test]
fn rejected_deploys_touch_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let err = pipeline()
        .deploy(&Artifact::new("const = ;", "broken"), dir.path())
        .unwrap_err();
    assert!(matches!(err, WrightError::Rejected { .. }));
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[test]
fn rejection_converts_with_counts_and_first_blocking_finding() {
    let src = "export default function A() { return <p>{missing}</p>; }";
    let rejected = pipeline().transpile(&Artifact::new(src, "a")).unwrap_err();
    let err = WrightError::from(rejected);
    let WrightError::Rejected { identifier, summary } = &err else {
        panic!("unexpected error: {err:?}");
    };
    assert_eq!(identifier, "a");
    assert!(summary.starts_with("0 critical, 1 major; first: "), "{summary}");
    assert!(summary.contains("`missing` is not defined"));
}
