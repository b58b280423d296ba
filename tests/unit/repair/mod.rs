use super::*;

#[test]
fn doubled_opening_quote_collapses_once() {
    let out = repair("const style = { fontSize: ''42px' };");
    assert_eq!(out.text, "const style = { fontSize: '42px' };");
    assert_eq!(out.fix_count, 1);
    assert_eq!(out.fixes[0].rule, RepairRule::DoubledOpeningQuote);
    assert_eq!(out.fixes[0].before, "''42px'");
    assert_eq!(out.fixes[0].after, "'42px'");
    assert_eq!(out.fixes[0].offset, 26);
}

#[test]
fn repaired_text_is_a_fixed_point() {
    let once = repair("a = { x: '''red', y: 'blue'', z: \"\"\"q\" }");
    let twice = repair(&once.text);
    assert_eq!(twice.text, once.text);
    assert_eq!(twice.fix_count, 0);
}

#[test]
fn empty_literals_are_not_corruption() {
    let src = "const a = ''; f('', \"\"); const b = { k: '' };";
    let out = repair(src);
    assert_eq!(out.text, src);
    assert_eq!(out.fix_count, 0);
}

#[test]
fn long_runs_collapse_to_one_quote() {
    let out = repair("const c = { color: '''red' };");
    assert_eq!(out.text, "const c = { color: 'red' };");
    assert_eq!(out.fixes[0].rule, RepairRule::QuoteRun);
}

#[test]
fn long_run_before_terminator_becomes_empty_literal() {
    let out = repair("const o = { label: ''', n: 1 };");
    assert_eq!(out.text, "const o = { label: '', n: 1 };");
    assert_eq!(out.fix_count, 1);
}

#[test]
fn stray_trailing_quote_is_dropped() {
    let out = repair("const o = { title: 'hello'', n: 1 };");
    assert_eq!(out.text, "const o = { title: 'hello', n: 1 };");
    assert_eq!(out.fixes[0].rule, RepairRule::StrayTrailingQuote);
    assert_eq!(out.fixes[0].before, "'hello''");
}

#[test]
fn comments_templates_regex_and_prose_are_untouched() {
    let src = "// it''s fine ''x'\n\
               /* ''y' */\n\
               const t = `a ''b' ${ {k: 1}.k } ''c'`;\n\
               const r = /''a'/g;\n\
               const el = <p>Don''t panic</p>;\n";
    let out = repair(src);
    assert_eq!(out.text, src);
    assert!(out.fixes.is_empty());
}

#[test]
fn substitutions_inside_templates_are_code() {
    let out = repair("const t = `${ f(''x') }`;");
    assert_eq!(out.text, "const t = `${ f('x') }`;");
}

#[test]
fn return_is_a_value_position() {
    let out = repair("function f() { return ''ok'; }");
    assert_eq!(out.text, "function f() { return 'ok'; }");
}

#[test]
fn audit_lines_describe_each_fix() {
    let out = repair("x = { a: ''1', b: '2'' }");
    let audit = out.audit();
    assert_eq!(audit.len(), 2);
    assert!(audit[0].starts_with("collapsed doubled opening quote at byte"));
    assert!(audit[1].contains("'2'' -> '2'"));
}
