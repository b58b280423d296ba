use super::*;

fn parse(src: &str) -> StructuralTree {
    parse_module(src).unwrap()
}

fn first_expr(src: &str) -> Expr {
    match parse(src).body.remove(0).kind {
        StmtKind::Expr(e) => e,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

#[test]
fn parses_component_with_hooks_and_jsx() {
    let src = r#"
import React, { useState, useEffect } from 'react';

export default function Counter() {
  const [count, setCount] = useState(0);
  useEffect(() => {
    const id = setInterval(() => setCount(c => c + 1), 1000);
    return () => clearInterval(id);
  }, []);
  return <div className="count">{count}</div>;
}
"#;
    let tree = parse(src);
    assert_eq!(tree.body.len(), 2);
    let StmtKind::Import(import) = &tree.body[0].kind else {
        panic!("expected import");
    };
    assert_eq!(import.source, "react");
    let names: Vec<_> = import.specifiers.iter().map(|s| s.local.name.as_str()).collect();
    assert_eq!(names, ["React", "useState", "useEffect"]);

    let StmtKind::ExportDefault(ExportDefault::Function(f)) = &tree.body[1].kind else {
        panic!("expected default export function");
    };
    assert_eq!(f.name.as_ref().map(|n| n.name.as_str()), Some("Counter"));
    assert_eq!(f.body.len(), 3);
    assert!(matches!(f.body[2].kind, StmtKind::Return(Some(_))));
}

#[test]
fn spans_slice_back_to_source() {
    let src = "const total = a + b * 2;";
    let tree = parse(src);
    let StmtKind::Var(decl) = &tree.body[0].kind else {
        panic!("expected var");
    };
    let init = decl.decls[0].init.as_ref().unwrap();
    assert_eq!(tree.text(init.span), "a + b * 2");
    assert_eq!(tree.text(tree.body[0].span), src);
}

#[test]
fn binary_precedence_and_right_associative_power() {
    let e = first_expr("a + b * c ** d ** e;");
    let ExprKind::Binary { op: "+", right, .. } = e.kind else {
        panic!("expected +");
    };
    let ExprKind::Binary { op: "*", right, .. } = right.kind else {
        panic!("expected *");
    };
    let ExprKind::Binary { op: "**", right, .. } = right.kind else {
        panic!("expected **");
    };
    assert!(matches!(right.kind, ExprKind::Binary { op: "**", .. }));
}

#[test]
fn arrow_heads_are_detected_speculatively() {
    let e = first_expr("(a, { b }, ...rest) => a;");
    let ExprKind::Arrow(arrow) = e.kind else {
        panic!("expected arrow");
    };
    assert_eq!(arrow.params.len(), 3);
    assert!(matches!(arrow.params[2].kind, PatKind::Rest(_)));

    let e = first_expr("(a, b);");
    assert!(matches!(e.kind, ExprKind::Paren(_)));

    let e = first_expr("async x => await x;");
    assert!(matches!(e.kind, ExprKind::Arrow(Arrow { is_async: true, .. })));
}

#[test]
fn conditional_with_parenthesized_branch_is_not_an_arrow() {
    let e = first_expr("ok ? (x) : y;");
    assert!(matches!(e.kind, ExprKind::Cond { .. }));
}

#[test]
fn typescript_annotations_are_skipped() {
    let src = r#"
interface Props { title: string; items?: Array<{ x: number }> }
type Point = { x: number; y: number };
const size: number = 3;
function area(p: Point, scale: number = 1): number { return p.x * p.y * scale; }
const ids = useState<number[]>([]);
const el = document.getElementById('root')!;
const v = value as unknown as string;
"#;
    let tree = parse(src);
    assert_eq!(tree.body.len(), 7);
    assert!(matches!(tree.body[0].kind, StmtKind::TypeOnly { .. }));
    assert!(matches!(tree.body[1].kind, StmtKind::TypeOnly { .. }));
    let StmtKind::Var(decl) = &tree.body[4].kind else {
        panic!("expected var");
    };
    let init = decl.decls[0].init.as_ref().unwrap();
    assert!(matches!(init.kind, ExprKind::Call { .. }));
}

#[test]
fn nested_generic_close_splits_shift_tokens() {
    let tree = parse("const m: Map<string, Array<number>> = new Map();");
    assert_eq!(tree.body.len(), 1);
}

#[test]
fn jsx_elements_attributes_and_children() {
    let e = first_expr(
        r#"<Card title="a" data-id={id} {...rest} disabled><span>{n} items</span><></></Card>;"#,
    );
    let ExprKind::Jsx(el) = e.kind else {
        panic!("expected jsx");
    };
    assert_eq!(el.name.as_ref().map(JsxName::text).as_deref(), Some("Card"));
    assert_eq!(el.attrs.len(), 4);
    assert!(matches!(el.attrs[2].kind, JsxAttrKind::Spread(_)));
    assert!(matches!(
        &el.attrs[3].kind,
        JsxAttrKind::Named { name, value: None } if name == "disabled"
    ));
    assert_eq!(el.children.len(), 2);
    let JsxChild::Element(span) = &el.children[0] else {
        panic!("expected span child");
    };
    assert_eq!(span.children.len(), 2);
    assert!(matches!(&span.children[1], JsxChild::Text(t, _) if t == " items"));
}

#[test]
fn jsx_text_may_contain_apostrophes_and_operators() {
    let e = first_expr("<p>it's 3 > 2 && done</p>;");
    let ExprKind::Jsx(el) = e.kind else {
        panic!("expected jsx");
    };
    assert!(matches!(&el.children[0], JsxChild::Text(t, _) if t == "it's 3 > 2 && done"));
}

#[test]
fn mismatched_closing_tag_is_reported() {
    let err = parse_module("const x = <div><span></div></span>;").unwrap_err();
    assert!(err.message.contains("expected closing tag </span>"), "{err}");
}

#[test]
fn template_substitutions_nest() {
    let e = first_expr("`a${ `b${c}` }d${ {k: 1}.k }`;");
    let ExprKind::Template(tpl) = e.kind else {
        panic!("expected template");
    };
    assert_eq!(tpl.quasis, ["a", "d", ""]);
    assert_eq!(tpl.exprs.len(), 2);
    assert!(matches!(tpl.exprs[0].kind, ExprKind::Template(_)));
}

#[test]
fn automatic_semicolon_insertion_on_newlines() {
    let tree = parse("let a = 1\nlet b = a\nb++\nreturn\n");
    assert_eq!(tree.body.len(), 4);
    assert!(matches!(tree.body[3].kind, StmtKind::Return(None)));
}

#[test]
fn missing_operator_is_rejected() {
    let err = parse_module("const a = 1 2;").unwrap_err();
    assert!(err.message.contains("expected ';'"), "{err}");
    assert_eq!(err.span.start, 12);
}

#[test]
fn unclosed_block_points_at_end_of_input() {
    let src = "function f() { return 1;";
    let err = parse_module(src).unwrap_err();
    assert_eq!(err.span.start, src.len());
    assert!(err.message.contains("unclosed '{'"));
}

#[test]
fn regex_and_division_are_told_apart() {
    let tree = parse("const r = /a\\/b/g; const d = x / 2 / y;");
    let StmtKind::Var(decl) = &tree.body[0].kind else {
        panic!();
    };
    assert!(matches!(decl.decls[0].init.as_ref().unwrap().kind, ExprKind::Regex));
    let StmtKind::Var(decl) = &tree.body[1].kind else {
        panic!();
    };
    assert!(matches!(
        decl.decls[0].init.as_ref().unwrap().kind,
        ExprKind::Binary { op: "/", .. }
    ));
}

#[test]
fn classes_with_fields_accessors_and_statics() {
    let src = r#"
class Particle extends Base {
  static count = 0;
  #secret = 1;
  x: number = 0;
  get speed() { return this.#secret; }
  static { Particle.count = 1; }
  async *stream() { yield 1; }
}
"#;
    let tree = parse(src);
    let StmtKind::Class(class) = &tree.body[0].kind else {
        panic!("expected class");
    };
    assert_eq!(class.members.len(), 6);
    assert!(class.members[0].is_static);
    assert!(matches!(class.members[1].key, PropKey::Private(_)));
    assert!(matches!(class.members[4].value, ClassMemberValue::StaticBlock(_)));
}

#[test]
fn destructuring_assignment_converts_to_patterns() {
    let e = first_expr("[a, b] = [b, a];");
    let ExprKind::Assign { target, .. } = e.kind else {
        panic!("expected assignment");
    };
    assert!(matches!(target.kind, PatKind::Array(_)));

    let e = first_expr("({ a = 1, ...rest } = obj);");
    let ExprKind::Paren(inner) = e.kind else {
        panic!("expected parens");
    };
    assert!(matches!(inner.kind, ExprKind::Assign { .. }));
}

#[test]
fn for_of_and_labeled_loops() {
    let src = "outer: for (const [k, v] of Object.entries(o)) { for (let i = 0; i < v; i++) { if (i) continue outer; } }";
    let tree = parse(src);
    let StmtKind::Labeled { body, .. } = &tree.body[0].kind else {
        panic!("expected label");
    };
    assert!(matches!(body.kind, StmtKind::ForIn { of: true, .. }));
}

#[test]
fn export_forms() {
    let src = r#"
export const a = 1;
export { a as b, c };
export * from './x';
export type { T } from './t';
export default App;
"#;
    let tree = parse(src);
    assert!(matches!(tree.body[0].kind, StmtKind::ExportDecl(_)));
    let StmtKind::ExportNamed { specifiers, source } = &tree.body[1].kind else {
        panic!("expected named export");
    };
    assert_eq!(specifiers[0].exported, "b");
    assert!(source.is_none());
    assert!(matches!(tree.body[2].kind, StmtKind::ExportAll { .. }));
    assert!(matches!(
        tree.body[4].kind,
        StmtKind::ExportDefault(ExportDefault::Expr(_))
    ));
}

#[test]
fn optional_chaining_and_nullish() {
    let e = first_expr("a?.b?.[c]?.(d) ?? e;");
    let ExprKind::Binary { op: "??", left, .. } = e.kind else {
        panic!("expected ??");
    };
    assert!(matches!(left.kind, ExprKind::Call { optional: true, .. }));
}
