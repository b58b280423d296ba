use super::*;

#[test]
fn edits_splice_in_source_order() {
    let src = "let a = 1; let b = 2;";
    let mut edits = EditSet::new();
    edits.replace(Span::new(19, 20), "20");
    edits.replace(Span::new(8, 9), "10");
    edits.insert(0, "// head\n");
    assert_eq!(edits.apply(src), "// head\nlet a = 10; let b = 20;");
}

#[test]
fn edits_nested_in_a_deletion_are_dropped() {
    let src = "keep(); drop(inner()); tail();";
    let mut edits = EditSet::new();
    edits.replace(Span::new(13, 20), "x()");
    edits.delete(Span::new(8, 22));
    edits.insert(15, "!");
    assert_eq!(edits.apply(src), "keep();  tail();");
    assert!(edits.covers(Span::new(13, 20)));
    assert!(!edits.covers(Span::new(0, 6)));
}

#[test]
fn wider_edit_wins_at_equal_start() {
    let src = "abcdef";
    let mut edits = EditSet::new();
    edits.replace(Span::new(1, 3), "X");
    edits.replace(Span::new(1, 5), "Y");
    assert_eq!(edits.apply(src), "aYf");
}

#[test]
fn inserts_at_one_offset_keep_their_order() {
    let mut edits = EditSet::new();
    edits.insert(1, "1");
    edits.insert(1, "2");
    assert_eq!(edits.apply("ab"), "a12b");
}

#[test]
fn render_keeps_only_inner_edits() {
    let src = "f(Math.random(), g)";
    let mut edits = EditSet::new();
    edits.replace(Span::new(2, 15), "seeded(0, 7)");
    edits.insert(0, "PRE");
    edits.replace(Span::new(0, 19), "whole");
    assert_eq!(edits.render(src, Span::new(0, 19)), "f(seeded(0, 7), g)");
    assert_eq!(edits.render(src, Span::new(2, 15)), "Math.random()");
}
