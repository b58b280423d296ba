use super::*;
use crate::syntax::parse;

fn names(src: &str) -> Vec<String> {
    let tree = parse(src).unwrap();
    unresolved(&tree).into_iter().map(|i| i.name.clone()).collect()
}

#[test]
fn hoisted_functions_and_vars_resolve() {
    let src = r#"
export default function App() {
  helper();
  if (true) { var late = 1; }
  return <Card value={late} />;
}
function helper() {}
function Card({ value }) { return <b>{value}</b>; }
"#;
    assert!(names(src).is_empty(), "{:?}", names(src));
}

#[test]
fn block_scoped_bindings_do_not_leak() {
    let src = "function f() { { const inner = 1; } return inner; }";
    assert_eq!(names(src), ["inner"]);
}

#[test]
fn params_catch_and_loop_heads_bind() {
    let src = r#"
function f(a, { b, c: [d] }, ...rest) {
  for (let i = 0; i < a; i++) {}
  for (const k of rest) { k; }
  try { b(); } catch (err) { console.log(err, d); }
  return (x = a) => x + i;
}
"#;
    assert_eq!(names(src), ["i"]);
}

#[test]
fn imports_classes_and_globals_resolve() {
    let src = r#"
import React, { useState } from 'react';
import * as R from 'remotion';
class Box extends React.Component { render() { return <R.AbsoluteFill />; } }
const now = Math.floor(performance.now() + Number(JSON.stringify(1)));
export { Box, now };
"#;
    assert!(names(src).is_empty(), "{:?}", names(src));
}

#[test]
fn jsx_components_are_references_but_intrinsics_are_not() {
    let src = "const el = <div><Missing.Item /><span /><Ghost /></div>;";
    assert_eq!(names(src), ["Missing", "Ghost"]);
}

#[test]
fn shorthand_properties_and_assignment_targets_are_references() {
    let src = "let a = 1; const o = { a, b }; [a, c] = [c, a]; typeof nope;";
    assert_eq!(names(src), ["b", "c", "c"]);
}

#[test]
fn object_keys_and_member_props_are_not_references() {
    let src = "const o = { key: 1 }; o.other.deeper; o['k'];";
    assert!(names(src).is_empty());
}

#[test]
fn each_occurrence_is_reported() {
    assert_eq!(names("ghost + ghost;"), ["ghost", "ghost"]);
}
