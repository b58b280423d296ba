//! Renderer API rules and residual nondeterminism.

use crate::syntax::ast::*;
use crate::syntax::lexer::Span;
use crate::syntax::visit::{Visit, walk_expr, walk_function, walk_pattern, walk_stmts};

pub(crate) fn misuses(tree: &StructuralTree) -> Vec<(Span, String)> {
    let mut v = Domain::default();
    walk_stmts(&mut v, &tree.body);
    if v.accessor_calls == 0
        && !v.frame_bound
        && let Some(first) = v.frame_refs.first()
    {
        v.found.push((
            *first,
            "`frame` is used but `useCurrentFrame()` is never called".to_owned(),
        ));
    }
    v.found.sort_by_key(|(span, _)| span.start);
    v.found
}

#[derive(Default)]
struct Domain {
    depth: usize,
    accessor_calls: usize,
    frame_bound: bool,
    frame_refs: Vec<Span>,
    found: Vec<(Span, String)>,
}

fn base_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

fn has_key(props: &[Prop], key: &str) -> bool {
    props.iter().any(|p| match &p.kind {
        PropKind::KeyValue { key: k, .. } | PropKind::Method { key: k, .. } => k.name() == Some(key),
        PropKind::Shorthand(id) => id.name == key,
        // A spread may carry it.
        PropKind::Spread(_) => true,
    })
}

impl Domain {
    fn call(&mut self, expr: &Expr, name: &str, args: &[Expr]) {
        match name {
            "Math.random" => self.nondeterministic(expr.span, "Math.random()"),
            "Date.now" | "performance.now" | "window.performance.now" => {
                self.nondeterministic(expr.span, &format!("{name}()"))
            }
            "setInterval" | "setTimeout" | "requestAnimationFrame" | "window.setInterval"
            | "window.setTimeout" | "window.requestAnimationFrame" => self.found.push((
                expr.span,
                format!("`{name}` drives state from wall-clock time; renders must be frame-driven"),
            )),
            _ => match name.strip_prefix("Remotion.").unwrap_or(name) {
                "interpolate" => self.interpolate(expr.span, args),
                "spring" => {
                    if let Some(ExprKind::Object(props)) = args.first().map(|a| &a.unwrap_parens().kind)
                        && !has_key(props, "fps")
                    {
                        self.found
                            .push((expr.span, "`spring` is called without `fps`".to_owned()));
                    }
                }
                _ => {}
            },
        }
    }

    fn interpolate(&mut self, span: Span, args: &[Expr]) {
        if args.len() < 3 {
            self.found.push((
                span,
                format!(
                    "`interpolate` needs an input, an input range and an output range (got {} argument(s))",
                    args.len()
                ),
            ));
            return;
        }
        if let (ExprKind::Array(input), ExprKind::Array(output)) =
            (&args[1].unwrap_parens().kind, &args[2].unwrap_parens().kind)
            && input.len() != output.len()
        {
            self.found.push((
                span,
                format!(
                    "`interpolate` input range has {} point(s) but output range has {}",
                    input.len(),
                    output.len()
                ),
            ));
        }
    }

    fn nondeterministic(&mut self, span: Span, what: &str) {
        self.found
            .push((span, format!("`{what}` is not deterministic across renders")));
    }
}

impl<'ast> Visit<'ast> for Domain {
    fn visit_function(&mut self, func: &'ast Function) {
        self.depth += 1;
        walk_function(self, func);
        self.depth -= 1;
    }

    fn visit_pattern(&mut self, pat: &'ast Pattern) {
        if let PatKind::Ident(id) = &pat.kind
            && id.name == "frame"
        {
            self.frame_bound = true;
        }
        walk_pattern(self, pat);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        match &expr.kind {
            ExprKind::Call { callee, args, .. } => {
                let name = callee.dotted_name();
                if name.as_deref().map(base_name) == Some("useCurrentFrame") {
                    self.accessor_calls += 1;
                    if self.depth == 0 {
                        self.found.push((
                            expr.span,
                            "`useCurrentFrame()` is called outside a component".to_owned(),
                        ));
                    }
                    for a in args {
                        self.visit_expr(a);
                    }
                    return;
                }
                if let Some(name) = name {
                    self.call(expr, &name, args);
                }
            }
            ExprKind::New { callee, args }
                if args.is_empty() && callee.as_ident() == Some("Date") =>
            {
                self.nondeterministic(expr.span, "new Date()");
            }
            ExprKind::Ident(id) if id.name == "useCurrentFrame" => self.found.push((
                expr.span,
                "`useCurrentFrame` is referenced without being called".to_owned(),
            )),
            ExprKind::Ident(id) if id.name == "frame" => self.frame_refs.push(expr.span),
            ExprKind::Arrow(_) => {
                self.depth += 1;
                walk_expr(self, expr);
                self.depth -= 1;
                return;
            }
            _ => {}
        }
        walk_expr(self, expr);
    }
}
