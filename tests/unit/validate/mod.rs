use super::*;
use crate::oracle::{StaticOracle, TypeDiagnostic};

const CLEAN: &str = r#"import { useCurrentFrame, interpolate } from 'remotion';

export default function Fade() {
  const frame = useCurrentFrame();
  const opacity = interpolate(frame, [0, 30], [0, 1]);
  return <div style={{ opacity }}>{`frame ${frame}`}</div>;
}
"#;

#[test]
fn clean_artifact_is_valid() {
    let report = validate(CLEAN, "fade");
    assert!(report.findings.is_empty(), "{:?}", report.findings);
    assert!(report.is_valid);
    assert_eq!(report.identifier, "fade");
    assert_eq!(report.summary(), "valid: 0 critical, 0 major, 0 minor");
}

#[test]
fn syntax_failure_is_a_single_critical_finding() {
    let oracle = StaticOracle::default();
    let report = Validator::new(&oracle).validate("export default function (", "broken");
    assert_eq!(report.findings.len(), 1);
    let f = &report.findings[0];
    assert_eq!(f.severity, Severity::Critical);
    assert_eq!(f.category, FindingCategory::Syntax);
    assert!(!report.is_valid);
    assert_eq!(oracle.calls(), 0);
}

#[test]
fn undeclared_identifier_is_one_major_flow_finding() {
    let src = "export default function A() {\n  return <div>{undeclaredVar}</div>;\n}\n";
    let report = validate(src, "a");
    assert!(!report.is_valid);
    assert_eq!(report.findings.len(), 1);
    let f = &report.findings[0];
    assert_eq!(f.severity, Severity::Major);
    assert_eq!(f.category, FindingCategory::VariableFlow);
    assert!(f.message.contains("undeclaredVar"));
    assert_eq!((f.line, f.column), (2, 16));
}

#[test]
fn oracle_diagnostics_are_mapped_and_deduplicated() {
    let src = "export default function A() {\n  const n: number = 'x';\n  return <i>{ghost}</i>;\n}\n";
    let oracle = StaticOracle::with_diagnostics(vec![
        TypeDiagnostic {
            message: "Type 'string' is not assignable to type 'number'.".into(),
            line: 2,
            column: 9,
            category: "TS2322".into(),
        },
        TypeDiagnostic {
            message: "Cannot find name 'ghost'.".into(),
            line: 3,
            column: 14,
            category: "TS2304".into(),
        },
    ]);
    let report = Validator::new(&oracle).validate(src, "a");
    assert_eq!(oracle.calls(), 1);
    let kinds: Vec<_> = report.findings.iter().map(|f| f.category).collect();
    assert_eq!(
        kinds,
        [FindingCategory::VariableFlow, FindingCategory::TypeCheck]
    );
    let tc = &report.findings[1];
    assert!(tc.message.starts_with("TS2322: "));
    assert_eq!((tc.line, tc.column), (2, 9));
    assert!(!report.is_valid);
}

#[test]
fn oracle_columns_on_non_ascii_lines_still_deduplicate() {
    let src = "export default function A() {\n  return <i title=\"héllo 🎬\">{ghost}</i>;\n}\n";
    let ghost_col = "  return <i title=\"héllo 🎬\">{".encode_utf16().count() as u32 + 1;
    let oracle = StaticOracle::with_diagnostics(vec![TypeDiagnostic {
        message: "Cannot find name 'ghost'.".into(),
        line: 2,
        column: ghost_col,
        category: "TS2304".into(),
    }]);
    let report = Validator::new(&oracle).validate(src, "a");
    assert_eq!(report.findings.len(), 1, "{:?}", report.findings);
    assert_eq!(report.findings[0].category, FindingCategory::VariableFlow);
}

#[test]
fn unavailable_oracle_is_inconclusive_but_not_blocking() {
    let oracle = StaticOracle::failing("tsc not installed");
    let report = Validator::new(&oracle).validate(CLEAN, "fade");
    assert_eq!(report.findings.len(), 1);
    let f = &report.findings[0];
    assert_eq!(f.category, FindingCategory::TypeCheckInconclusive);
    assert_eq!(f.severity, Severity::Major);
    assert!(f.message.contains("tsc not installed"));
    assert!(!f.is_blocking());
    assert!(report.is_valid);
}

#[test]
fn sentinel_interpolation_is_minor() {
    let src = r#"export default function A() {
  const label = `value: ${undefined}`;
  const other = 'x' + null;
  return <div title="undefined">{label}{other}</div>;
}
"#;
    let report = validate(src, "a");
    assert!(report.is_valid);
    assert_eq!(report.count(Severity::Minor), 3);
    assert_eq!(report.of_category(FindingCategory::Template).count(), 3);
}

#[test]
fn renderer_api_misuse_is_major() {
    let src = r#"import { useCurrentFrame, interpolate, spring } from 'remotion';
const top = useCurrentFrame();
export default function A() {
  const frame = useCurrentFrame();
  const a = interpolate(frame, [0, 10]);
  const b = interpolate(frame, [0, 10, 20], [0, 1]);
  const c = spring({ frame });
  const d = spring({ frame, fps: 30 });
  return <i>{a + b + c + d + top}</i>;
}
"#;
    let report = validate(src, "a");
    let messages: Vec<_> = report
        .of_category(FindingCategory::ApiMisuse)
        .map(|f| f.message.as_str())
        .collect();
    assert_eq!(messages.len(), 4, "{messages:?}");
    assert!(messages[0].contains("outside a component"));
    assert!(messages[1].contains("got 2 argument(s)"));
    assert!(messages[2].contains("3 point(s) but output range has 2"));
    assert!(messages[3].contains("without `fps`"));
    assert!(!report.is_valid);
}

#[test]
fn residual_nondeterminism_is_major() {
    let src = r#"export default function A() {
  const r = Math.random();
  const t = Date.now();
  const d = new Date();
  setInterval(() => {}, 100);
  return <i>{r + t + d}</i>;
}
"#;
    let report = validate(src, "a");
    assert_eq!(report.of_category(FindingCategory::ApiMisuse).count(), 4);
    assert!(!report.is_valid);
}

#[test]
fn frame_without_accessor_is_flagged() {
    let src = "export default function A({ frame }) { return <i>{frame}</i>; }";
    assert!(validate(src, "a").is_valid);

    let src = "const frame = 3;\nexport default function A() { return <i>{frame}</i>; }";
    assert!(validate(src, "a").is_valid);

    let src = "export default function A() { return <i>{frame}</i>; }";
    let report = validate(src, "a");
    assert_eq!(report.of_category(FindingCategory::ApiMisuse).count(), 1);
    assert_eq!(report.of_category(FindingCategory::VariableFlow).count(), 1);
}

#[test]
fn useless_accessor_reference_is_flagged() {
    let src = "import { useCurrentFrame } from 'remotion';\nexport default function A() { const f = useCurrentFrame; return <i>{f}</i>; }";
    let report = validate(src, "a");
    assert_eq!(report.of_category(FindingCategory::ApiMisuse).count(), 1);
}

#[test]
fn findings_display_with_position() {
    let report = validate("ghost;", "g");
    assert_eq!(
        report.findings[0].to_string(),
        "1:1 major [variable-flow] `ghost` is not defined"
    );
}
