use super::*;

#[test]
fn parses_compiler_lines() {
    let out = "src/artifact.tsx(12,5): error TS2304: Cannot find name 'undeclaredVar'.\n\
               Found 1 error.\n\
               C:\\tmp\\a (1)\\artifact.tsx(3,10): error TS2322: Type 'string' is not assignable to type 'number'.\n";
    let diags = parse_diagnostics(out);
    assert_eq!(diags.len(), 2);
    assert_eq!(diags[0].line, 12);
    assert_eq!(diags[0].column, 5);
    assert_eq!(diags[0].category, "TS2304");
    assert_eq!(diags[0].message, "Cannot find name 'undeclaredVar'.");
    assert_eq!(diags[1].line, 3);
    assert_eq!(diags[1].category, "TS2322");
}

#[test]
fn missing_program_is_a_launch_error() {
    let oracle = ProcessOracle::new("framewright-no-such-checker", Vec::<String>::new());
    let err = oracle.check_types("const a = 1;").unwrap_err();
    assert!(matches!(err, OracleError::Launch { .. }), "{err}");
}

#[cfg(unix)]
fn shell(script: &str) -> ProcessOracle {
    ProcessOracle::new("sh", ["-c", script, "sh"])
}

#[cfg(unix)]
#[test]
fn diagnostics_come_from_the_checker_output() {
    let oracle = shell(
        "test -f \"$1\" || exit 9; echo \"$1(3,7): error TS2304: Cannot find name 'x'.\"; exit 2",
    );
    let diags = oracle.check_types("x;").unwrap();
    assert_eq!(diags.len(), 1);
    assert_eq!((diags[0].line, diags[0].column), (3, 7));
}

#[cfg(unix)]
#[test]
fn ignored_codes_are_dropped() {
    let oracle = shell("echo \"a.tsx(1,1): error TS2307: Cannot find module 'react'.\"; exit 2");
    assert!(oracle.check_types("import 'react';").unwrap().is_empty());
}

#[cfg(unix)]
#[test]
fn failure_without_diagnostics_reports_stderr() {
    let oracle = shell("echo boom >&2; exit 1");
    let err = oracle.check_types("").unwrap_err();
    assert!(matches!(err, OracleError::Failed(ref m) if m.contains("boom")), "{err}");
}

#[cfg(unix)]
#[test]
fn slow_checkers_are_killed() {
    let oracle = shell("sleep 5").timeout(Duration::from_millis(100));
    let started = Instant::now();
    let err = oracle.check_types("").unwrap_err();
    assert!(matches!(err, OracleError::Timeout(_)));
    assert!(started.elapsed() < Duration::from_secs(4));
}
