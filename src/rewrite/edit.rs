//! Span edits over the original source text.
//!
//! Edits never re-print the tree: untouched bytes are copied verbatim. When two edits
//! overlap, the one that starts first (and, at equal starts, the wider one) wins and the
//! other is dropped, so an edit nested inside a deletion simply disappears.

use std::cmp::Reverse;

use crate::syntax::lexer::Span;

#[derive(Debug, Clone)]
struct Edit {
    span: Span,
    text: String,
    seq: usize,
}

impl Edit {
    fn is_insert(&self) -> bool {
        self.span.start == self.span.end
    }
}

#[derive(Debug, Default)]
pub(crate) struct EditSet {
    edits: Vec<Edit>,
}

impl EditSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn replace(&mut self, span: Span, text: impl Into<String>) {
        let seq = self.edits.len();
        self.edits.push(Edit {
            span,
            text: text.into(),
            seq,
        });
    }

    pub(crate) fn delete(&mut self, span: Span) {
        self.replace(span, "");
    }

    pub(crate) fn insert(&mut self, at: usize, text: impl Into<String>) {
        self.replace(Span::new(at, at), text);
    }

    /// `true` when a replacement or deletion already covers `span`.
    pub(crate) fn covers(&self, span: Span) -> bool {
        self.edits
            .iter()
            .any(|e| !e.is_insert() && e.span.contains(span))
    }

    fn sorted(&self) -> Vec<&Edit> {
        let mut edits: Vec<&Edit> = self.edits.iter().collect();
        edits.sort_by_key(|e| (e.span.start, !e.is_insert(), Reverse(e.span.end), e.seq));
        edits
    }

    /// Apply every edit to `src`.
    pub(crate) fn apply(&self, src: &str) -> String {
        self.splice(src, Span::new(0, src.len()), true)
    }

    /// Text of `span` with the edits strictly inside it applied.
    ///
    /// Used to build a replacement for `span` that keeps the finer edits made inside it.
    pub(crate) fn render(&self, src: &str, span: Span) -> String {
        self.splice(src, span, false)
    }

    /// Text of `span` with every edit inside it applied, including ones at its edges.
    pub(crate) fn slice(&self, src: &str, span: Span) -> String {
        self.splice(src, span, true)
    }

    fn splice(&self, src: &str, range: Span, boundaries: bool) -> String {
        let mut out = String::with_capacity(range.len() + 64);
        let mut cursor = range.start;
        for edit in self.sorted() {
            if !range.contains(edit.span) || edit.span == range && !boundaries {
                continue;
            }
            let at_edge = edit.is_insert()
                && (edit.span.start == range.start || edit.span.start == range.end);
            if at_edge && !boundaries {
                continue;
            }
            if edit.span.start < cursor {
                continue;
            }
            out.push_str(src.get(cursor..edit.span.start).unwrap_or(""));
            out.push_str(&edit.text);
            cursor = edit.span.end;
        }
        out.push_str(src.get(cursor..range.end).unwrap_or(""));
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/rewrite/edit.rs"]
mod tests;
