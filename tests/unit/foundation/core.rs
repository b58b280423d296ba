use super::*;

#[test]
fn composition_id_is_sanitized() {
    assert_eq!(
        Artifact::new("", "particle field (v2).jsx").composition_id(),
        "particle-field-v2-jsx"
    );
    assert_eq!(Artifact::new("", "___").composition_id(), "Artifact");
    assert_eq!(Artifact::new("", "Clock").composition_id(), "Clock");
}

#[test]
fn line_index_round_trips_offsets() {
    let text = "ab\ncde\n\nf";
    let idx = LineIndex::new(text);
    assert_eq!(idx.line_col(0), (1, 1));
    assert_eq!(idx.line_col(4), (2, 2));
    assert_eq!(idx.line_col(7), (3, 1));
    assert_eq!(idx.line_col(8), (4, 1));
    assert_eq!(idx.offset(2, 2), 4);
    assert_eq!(idx.offset(4, 1), 8);
}

#[test]
fn line_index_clamps_out_of_range() {
    let idx = LineIndex::new("x\ny");
    assert_eq!(idx.offset(99, 99), 3);
    assert_eq!(idx.line_col(99), (2, 2));
}

#[test]
fn utf16_columns_map_to_byte_offsets() {
    let text = "a\n\"é🎬\" + x\n";
    let idx = LineIndex::new(text);
    // `x` sits after 1 + 1 + 2 + 1 + 3 = 8 UTF-16 units.
    assert_eq!(idx.offset_utf16(text, 2, 9), text.find('x').unwrap());
    assert_eq!(idx.offset_utf16(text, 1, 1), 0);
    assert_eq!(idx.offset_utf16(text, 1, 50), 1);
    assert_eq!(idx.offset(2, 9), text.find('x').unwrap() - 3);
}
