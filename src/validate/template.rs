//! Sentinel interpolation: `undefined`/`null` spliced into rendered text.

use crate::syntax::ast::*;
use crate::syntax::lexer::Span;
use crate::syntax::visit::{Visit, walk_expr, walk_jsx, walk_stmts};

pub(crate) fn sentinels(tree: &StructuralTree) -> Vec<(Span, String)> {
    let mut v = Sentinels::default();
    walk_stmts(&mut v, &tree.body);
    v.found
}

#[derive(Default)]
struct Sentinels {
    found: Vec<(Span, String)>,
}

fn sentinel(expr: &Expr) -> Option<&'static str> {
    match &expr.unwrap_parens().kind {
        ExprKind::Ident(id) if id.name == "undefined" => Some("undefined"),
        ExprKind::Unary { op: "void", .. } => Some("undefined"),
        ExprKind::Null => Some("null"),
        _ => None,
    }
}

fn is_text(expr: &Expr) -> bool {
    matches!(
        expr.unwrap_parens().kind,
        ExprKind::Str(_) | ExprKind::Template(_)
    )
}

impl<'ast> Visit<'ast> for Sentinels {
    fn visit_expr(&mut self, expr: &'ast Expr) {
        match &expr.kind {
            ExprKind::Template(tpl) => {
                for e in &tpl.exprs {
                    if let Some(s) = sentinel(e) {
                        self.found.push((
                            e.span,
                            format!("template interpolates `{s}`, which renders as the text \"{s}\""),
                        ));
                    }
                }
            }
            ExprKind::Binary { op: "+", left, right } => {
                let hit = match (sentinel(left), sentinel(right)) {
                    (Some(s), None) if is_text(right) => Some(s),
                    (None, Some(s)) if is_text(left) => Some(s),
                    _ => None,
                };
                if let Some(s) = hit {
                    self.found.push((
                        expr.span,
                        format!("string concatenation with `{s}` renders as the text \"{s}\""),
                    ));
                }
            }
            _ => {}
        }
        walk_expr(self, expr);
    }

    fn visit_jsx(&mut self, el: &'ast JsxElement) {
        for attr in &el.attrs {
            if let JsxAttrKind::Named {
                name,
                value: Some(JsxAttrValue::Str(text, _)),
            } = &attr.kind
                && (text == "undefined" || text == "null")
            {
                self.found
                    .push((attr.span, format!("attribute `{name}` is the literal string \"{text}\"")));
            }
        }
        walk_jsx(self, el);
    }
}
