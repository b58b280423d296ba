//! Component discovery and local function/constant lookup shared by the classifier and the
//! rewriter.

use std::collections::HashMap;

use crate::syntax::ast::*;
use crate::syntax::lexer::Span;
use crate::syntax::visit::{Visit, each_expr, each_sub_expr, walk_stmt};

#[derive(Clone, Copy, Debug)]
pub(crate) enum FnBody<'ast> {
    Block(&'ast [Stmt], Span),
    Expr(&'ast Expr),
}

/// Borrowed view over any function-like node (declaration, expression or arrow).
#[derive(Clone, Copy, Debug)]
pub(crate) struct FnRef<'ast> {
    pub(crate) params: &'ast [Pattern],
    pub(crate) body: FnBody<'ast>,
    pub(crate) span: Span,
}

impl<'ast> FnRef<'ast> {
    pub(crate) fn of_function(f: &'ast Function) -> Self {
        Self {
            params: &f.params,
            body: FnBody::Block(&f.body, f.body_span),
            span: f.span,
        }
    }

    pub(crate) fn of_expr(expr: &'ast Expr) -> Option<Self> {
        let inner = expr.unwrap_parens();
        match &inner.kind {
            ExprKind::Function(f) => Some(Self::of_function(f)),
            ExprKind::Arrow(a) => Some(Self {
                params: &a.params,
                body: match &a.body {
                    ArrowBody::Expr(e) => FnBody::Expr(e),
                    ArrowBody::Block { body, span } => FnBody::Block(body, *span),
                },
                span: inner.span,
            }),
            _ => None,
        }
    }

    /// The value a call evaluates to: the expression body, or a trailing `return expr;`.
    pub(crate) fn result_expr(&self) -> Option<&'ast Expr> {
        match self.body {
            FnBody::Expr(e) => Some(e),
            FnBody::Block(stmts, _) => match &stmts.last()?.kind {
                StmtKind::Return(Some(e)) => Some(e),
                _ => None,
            },
        }
    }

    pub(crate) fn stmts(&self) -> &'ast [Stmt] {
        match self.body {
            FnBody::Block(stmts, _) => stmts,
            FnBody::Expr(_) => &[],
        }
    }

    pub(crate) fn param_name(&self, idx: usize) -> Option<&'ast str> {
        pattern_name(self.params.get(idx)?)
    }

    pub(crate) fn each_expr(&self, f: impl FnMut(&'ast Expr)) {
        match self.body {
            FnBody::Block(stmts, _) => each_expr(stmts, f),
            FnBody::Expr(e) => each_sub_expr(e, f),
        }
    }
}

/// Bound name of a plain identifier pattern (defaults allowed).
pub(crate) fn pattern_name(pat: &Pattern) -> Option<&str> {
    match &pat.kind {
        PatKind::Ident(i) => Some(&i.name),
        PatKind::Default { target, .. } => pattern_name(target),
        _ => None,
    }
}

/// A function that renders JSX or calls hooks.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Component<'ast> {
    pub(crate) name: Option<&'ast str>,
    pub(crate) func: FnRef<'ast>,
    pub(crate) is_default: bool,
}

impl<'ast> Component<'ast> {
    pub(crate) fn stmts(&self) -> &'ast [Stmt] {
        self.func.stmts()
    }

    pub(crate) fn span(&self) -> Span {
        self.func.span
    }
}

fn is_capitalised(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

fn is_hook_name(name: &str) -> bool {
    let rest = name.rsplit('.').next().unwrap_or(name);
    rest.strip_prefix("use")
        .and_then(|r| r.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}

/// Unwrap `memo(fn)`, `React.forwardRef(fn)` and friends down to the function.
fn component_fn(expr: &Expr) -> Option<FnRef<'_>> {
    if let Some(f) = FnRef::of_expr(expr) {
        return Some(f);
    }
    if let ExprKind::Call { callee, args, .. } = &expr.unwrap_parens().kind
        && matches!(
            callee.dotted_name().as_deref(),
            Some("memo" | "React.memo" | "forwardRef" | "React.forwardRef")
        )
    {
        return component_fn(args.first()?);
    }
    None
}

fn looks_like_component(func: &FnRef<'_>) -> bool {
    let mut found = false;
    func.each_expr(|e| match &e.kind {
        ExprKind::Jsx(_) => found = true,
        ExprKind::Call { callee, .. } => {
            if callee.dotted_name().is_some_and(|n| is_hook_name(&n)) {
                found = true;
            }
        }
        _ => {}
    });
    found
}

/// Every module-level component, in source order.
pub(crate) fn find_components(tree: &StructuralTree) -> Vec<Component<'_>> {
    let mut out = Vec::new();
    let mut default_name = None;
    for stmt in &tree.body {
        collect_component(stmt, &mut out, &mut default_name);
    }
    for c in &mut out {
        if c.name.is_some() && c.name == default_name {
            c.is_default = true;
        }
    }
    out.retain(|c| c.is_default || looks_like_component(&c.func));
    out
}

fn collect_component<'ast>(
    stmt: &'ast Stmt,
    out: &mut Vec<Component<'ast>>,
    default_name: &mut Option<&'ast str>,
) {
    match &stmt.kind {
        StmtKind::ExportDecl(inner) => collect_component(inner, out, default_name),
        StmtKind::ExportDefault(ExportDefault::Function(f)) => out.push(Component {
            name: f.name.as_ref().map(|n| n.name.as_str()),
            func: FnRef::of_function(f),
            is_default: true,
        }),
        StmtKind::ExportDefault(ExportDefault::Expr(e)) => {
            if let Some(name) = e.unwrap_parens().as_ident() {
                *default_name = Some(name);
            } else if let Some(func) = component_fn(e) {
                out.push(Component {
                    name: None,
                    func,
                    is_default: true,
                });
            }
        }
        StmtKind::ExportNamed {
            specifiers,
            source: None,
        } => {
            for spec in specifiers {
                if spec.exported == "default" {
                    *default_name = Some(&spec.local.name);
                }
            }
        }
        StmtKind::Function(f) => {
            if let Some(name) = &f.name
                && is_capitalised(&name.name)
            {
                out.push(Component {
                    name: Some(&name.name),
                    func: FnRef::of_function(f),
                    is_default: false,
                });
            }
        }
        StmtKind::Var(decl) => {
            for d in &decl.decls {
                if let PatKind::Ident(id) = &d.pattern.kind
                    && is_capitalised(&id.name)
                    && let Some(func) = d.init.as_ref().and_then(component_fn)
                {
                    out.push(Component {
                        name: Some(&id.name),
                        func,
                        is_default: false,
                    });
                }
            }
        }
        _ => {}
    }
}

/// The default-exported component, else the first one.
pub(crate) fn primary<'a, 'ast>(components: &'a [Component<'ast>]) -> Option<&'a Component<'ast>> {
    components
        .iter()
        .find(|c| c.is_default)
        .or_else(|| components.first())
}

/// Named functions and numeric constants declared anywhere in the module.
#[derive(Debug, Default)]
pub(crate) struct Locals<'ast> {
    fns: HashMap<&'ast str, FnRef<'ast>>,
    consts: HashMap<&'ast str, f64>,
}

impl<'ast> Locals<'ast> {
    pub(crate) fn collect(tree: &'ast StructuralTree) -> Self {
        let mut locals = Self::default();
        for stmt in &tree.body {
            locals.visit_stmt(stmt);
        }
        locals
    }

    pub(crate) fn function(&self, name: &str) -> Option<FnRef<'ast>> {
        self.fns.get(name).copied()
    }

    /// Resolve a callback argument: inline function, or a reference to a named one.
    pub(crate) fn callback(&self, expr: &'ast Expr) -> Option<FnRef<'ast>> {
        FnRef::of_expr(expr).or_else(|| self.function(expr.unwrap_parens().as_ident()?))
    }

    /// Fold a numeric expression over literals and known constants.
    pub(crate) fn number(&self, expr: &Expr) -> Option<f64> {
        let e = expr.unwrap_parens();
        if let Some(v) = e.as_number() {
            return Some(v);
        }
        match &e.kind {
            ExprKind::Ident(i) => self.consts.get(i.name.as_str()).copied(),
            ExprKind::Unary { op: "-", arg } => self.number(arg).map(|v| -v),
            ExprKind::Binary { op, left, right } => {
                let (l, r) = (self.number(left)?, self.number(right)?);
                let v = match *op {
                    "+" => l + r,
                    "-" => l - r,
                    "*" => l * r,
                    "/" if r != 0.0 => l / r,
                    "%" if r != 0.0 => l % r,
                    _ => return None,
                };
                Some(v)
            }
            _ => None,
        }
    }
}

impl<'ast> Visit<'ast> for Locals<'ast> {
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        match &stmt.kind {
            StmtKind::Function(f) => {
                if let Some(name) = &f.name {
                    self.fns
                        .entry(name.name.as_str())
                        .or_insert_with(|| FnRef::of_function(f));
                }
            }
            StmtKind::Var(decl) => {
                for d in &decl.decls {
                    let (PatKind::Ident(id), Some(init)) = (&d.pattern.kind, &d.init) else {
                        continue;
                    };
                    if let Some(func) = unwrap_callback_hook(init) {
                        self.fns.entry(id.name.as_str()).or_insert(func);
                    } else if decl.kind == VarKind::Const
                        && let Some(v) = self.number(init)
                    {
                        self.consts.entry(id.name.as_str()).or_insert(v);
                    }
                }
            }
            _ => {}
        }
        walk_stmt(self, stmt);
    }
}

/// `fn`, or the function inside `useCallback(fn, deps)`.
fn unwrap_callback_hook(expr: &Expr) -> Option<FnRef<'_>> {
    if let Some(f) = FnRef::of_expr(expr) {
        return Some(f);
    }
    match &expr.unwrap_parens().kind {
        ExprKind::Call { callee, args, .. }
            if matches!(
                callee.dotted_name().as_deref(),
                Some("useCallback" | "React.useCallback")
            ) =>
        {
            FnRef::of_expr(args.first()?)
        }
        _ => None,
    }
}

pub(crate) fn is_hook_call(expr: &Expr, hook: &str) -> bool {
    match &expr.unwrap_parens().kind {
        ExprKind::Call { callee, .. } => callee.dotted_name().is_some_and(|n| {
            n == hook || n.strip_prefix("React.").is_some_and(|rest| rest == hook)
        }),
        _ => false,
    }
}

/// Timer registration functions, with or without a `window.` prefix.
pub(crate) fn timer_kind(callee: &Expr) -> Option<&'static str> {
    let name = callee.dotted_name()?;
    let bare = name.strip_prefix("window.").unwrap_or(&name);
    match bare {
        "setInterval" => Some("setInterval"),
        "setTimeout" => Some("setTimeout"),
        "requestAnimationFrame" => Some("requestAnimationFrame"),
        "clearInterval" => Some("clearInterval"),
        "clearTimeout" => Some("clearTimeout"),
        "cancelAnimationFrame" => Some("cancelAnimationFrame"),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/classify/component.rs"]
mod tests;
