//! Read-only traversal over the structural tree.
//!
//! Implementors override the hooks they care about and call the matching `walk_*` function
//! to keep descending.

use crate::syntax::ast::*;

pub(crate) trait Visit<'ast> {
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }

    fn visit_pattern(&mut self, pat: &'ast Pattern) {
        walk_pattern(self, pat);
    }

    fn visit_function(&mut self, func: &'ast Function) {
        walk_function(self, func);
    }

    fn visit_class(&mut self, class: &'ast Class) {
        walk_class(self, class);
    }

    fn visit_jsx(&mut self, el: &'ast JsxElement) {
        walk_jsx(self, el);
    }
}

pub(crate) fn walk_stmts<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, stmts: &'ast [Stmt]) {
    for stmt in stmts {
        v.visit_stmt(stmt);
    }
}

pub(crate) fn walk_stmt<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, stmt: &'ast Stmt) {
    match &stmt.kind {
        StmtKind::Import(_)
        | StmtKind::ExportAll { .. }
        | StmtKind::TypeOnly { .. }
        | StmtKind::Enum { .. }
        | StmtKind::Break(_)
        | StmtKind::Continue(_)
        | StmtKind::Empty
        | StmtKind::Debugger => {}
        StmtKind::ExportNamed { .. } => {}
        StmtKind::ExportDecl(inner) => v.visit_stmt(inner),
        StmtKind::ExportDefault(ExportDefault::Expr(e)) => v.visit_expr(e),
        StmtKind::ExportDefault(ExportDefault::Function(f)) => v.visit_function(f),
        StmtKind::ExportDefault(ExportDefault::Class(c)) => v.visit_class(c),
        StmtKind::Var(decl) => walk_var_decl(v, decl),
        StmtKind::Function(f) => v.visit_function(f),
        StmtKind::Class(c) => v.visit_class(c),
        StmtKind::Expr(e) | StmtKind::Throw(e) => v.visit_expr(e),
        StmtKind::Block(body) => walk_stmts(v, body),
        StmtKind::If { test, cons, alt } => {
            v.visit_expr(test);
            v.visit_stmt(cons);
            if let Some(alt) = alt {
                v.visit_stmt(alt);
            }
        }
        StmtKind::For {
            init,
            test,
            update,
            body,
        } => {
            if let Some(init) = init {
                walk_for_init(v, init);
            }
            if let Some(test) = test {
                v.visit_expr(test);
            }
            if let Some(update) = update {
                v.visit_expr(update);
            }
            v.visit_stmt(body);
        }
        StmtKind::ForIn {
            left, right, body, ..
        } => {
            walk_for_init(v, left);
            v.visit_expr(right);
            v.visit_stmt(body);
        }
        StmtKind::While { test, body } | StmtKind::DoWhile { body, test } => {
            v.visit_expr(test);
            v.visit_stmt(body);
        }
        StmtKind::Return(arg) => {
            if let Some(arg) = arg {
                v.visit_expr(arg);
            }
        }
        StmtKind::Try {
            block,
            param,
            handler,
            finalizer,
        } => {
            walk_stmts(v, block);
            if let Some(param) = param {
                v.visit_pattern(param);
            }
            if let Some(handler) = handler {
                walk_stmts(v, handler);
            }
            if let Some(finalizer) = finalizer {
                walk_stmts(v, finalizer);
            }
        }
        StmtKind::Switch { disc, cases } => {
            v.visit_expr(disc);
            for case in cases {
                if let Some(test) = &case.test {
                    v.visit_expr(test);
                }
                walk_stmts(v, &case.body);
            }
        }
        StmtKind::Labeled { body, .. } => v.visit_stmt(body),
    }
}

pub(crate) fn walk_var_decl<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, decl: &'ast VarDecl) {
    for d in &decl.decls {
        v.visit_pattern(&d.pattern);
        if let Some(init) = &d.init {
            v.visit_expr(init);
        }
    }
}

fn walk_for_init<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, init: &'ast ForInit) {
    match init {
        ForInit::Var(decl) => walk_var_decl(v, decl),
        ForInit::Expr(e) => v.visit_expr(e),
        ForInit::Pattern(p) => v.visit_pattern(p),
    }
}

pub(crate) fn walk_function<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, func: &'ast Function) {
    for p in &func.params {
        v.visit_pattern(p);
    }
    walk_stmts(v, &func.body);
}

pub(crate) fn walk_class<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, class: &'ast Class) {
    if let Some(sup) = &class.super_class {
        v.visit_expr(sup);
    }
    for member in &class.members {
        walk_prop_key(v, &member.key);
        match &member.value {
            ClassMemberValue::Method(f) => v.visit_function(f),
            ClassMemberValue::Field(Some(e)) => v.visit_expr(e),
            ClassMemberValue::Field(None) => {}
            ClassMemberValue::StaticBlock(body) => walk_stmts(v, body),
        }
    }
}

fn walk_prop_key<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, key: &'ast PropKey) {
    if let PropKey::Computed(e) = key {
        v.visit_expr(e);
    }
}

pub(crate) fn walk_pattern<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, pat: &'ast Pattern) {
    match &pat.kind {
        PatKind::Ident(_) => {}
        PatKind::Array(elems) => {
            for el in elems.iter().flatten() {
                v.visit_pattern(el);
            }
        }
        PatKind::Object(props) => {
            for prop in props {
                match prop {
                    PatProp::KeyValue { key, value } => {
                        walk_prop_key(v, key);
                        v.visit_pattern(value);
                    }
                    PatProp::Rest(p) => v.visit_pattern(p),
                }
            }
        }
        PatKind::Default { target, value } => {
            v.visit_pattern(target);
            v.visit_expr(value);
        }
        PatKind::Rest(p) => v.visit_pattern(p),
        PatKind::Expr(e) => v.visit_expr(e),
    }
}

pub(crate) fn walk_expr<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, expr: &'ast Expr) {
    match &expr.kind {
        ExprKind::Ident(_)
        | ExprKind::Num(_)
        | ExprKind::Str(_)
        | ExprKind::Bool(_)
        | ExprKind::Null
        | ExprKind::Regex
        | ExprKind::This
        | ExprKind::Super
        | ExprKind::Meta => {}
        ExprKind::Template(tpl) => {
            for e in &tpl.exprs {
                v.visit_expr(e);
            }
        }
        ExprKind::TaggedTemplate { tag, tpl } => {
            v.visit_expr(tag);
            for e in &tpl.exprs {
                v.visit_expr(e);
            }
        }
        ExprKind::Array(elems) => {
            for e in elems.iter().flatten() {
                v.visit_expr(e);
            }
        }
        ExprKind::Object(props) => {
            for prop in props {
                match &prop.kind {
                    PropKind::KeyValue { key, value } => {
                        walk_prop_key(v, key);
                        v.visit_expr(value);
                    }
                    PropKind::Shorthand(_) => {}
                    PropKind::Spread(e) => v.visit_expr(e),
                    PropKind::Method { key, func } => {
                        walk_prop_key(v, key);
                        v.visit_function(func);
                    }
                }
            }
        }
        ExprKind::Function(f) => v.visit_function(f),
        ExprKind::Arrow(arrow) => {
            for p in &arrow.params {
                v.visit_pattern(p);
            }
            match &arrow.body {
                ArrowBody::Expr(e) => v.visit_expr(e),
                ArrowBody::Block { body, .. } => walk_stmts(v, body),
            }
        }
        ExprKind::Class(c) => v.visit_class(c),
        ExprKind::Unary { arg, .. }
        | ExprKind::Update { arg, .. }
        | ExprKind::Paren(arg)
        | ExprKind::Spread(arg)
        | ExprKind::Await(arg)
        | ExprKind::TsAs(arg) => v.visit_expr(arg),
        ExprKind::Yield(arg) => {
            if let Some(arg) = arg {
                v.visit_expr(arg);
            }
        }
        ExprKind::Binary { left, right, .. } => {
            v.visit_expr(left);
            v.visit_expr(right);
        }
        ExprKind::Assign { target, value, .. } => {
            v.visit_pattern(target);
            v.visit_expr(value);
        }
        ExprKind::Cond { test, cons, alt } => {
            v.visit_expr(test);
            v.visit_expr(cons);
            v.visit_expr(alt);
        }
        ExprKind::Call { callee, args, .. } | ExprKind::New { callee, args } => {
            v.visit_expr(callee);
            for a in args {
                v.visit_expr(a);
            }
        }
        ExprKind::Member { object, prop, .. } => {
            v.visit_expr(object);
            if let MemberProp::Computed(e) = prop {
                v.visit_expr(e);
            }
        }
        ExprKind::Seq(items) => {
            for e in items {
                v.visit_expr(e);
            }
        }
        ExprKind::Jsx(el) => v.visit_jsx(el),
    }
}

pub(crate) fn walk_jsx<'ast, V: Visit<'ast> + ?Sized>(v: &mut V, el: &'ast JsxElement) {
    for attr in &el.attrs {
        match &attr.kind {
            JsxAttrKind::Named { value, .. } => match value {
                Some(JsxAttrValue::Expr(e)) => v.visit_expr(e),
                Some(JsxAttrValue::Element(inner)) => v.visit_jsx(inner),
                Some(JsxAttrValue::Str(..)) | None => {}
            },
            JsxAttrKind::Spread(e) => v.visit_expr(e),
        }
    }
    for child in &el.children {
        match child {
            JsxChild::Text(..) | JsxChild::Expr(None, _) => {}
            JsxChild::Expr(Some(e), _) | JsxChild::Spread(e) => v.visit_expr(e),
            JsxChild::Element(inner) => v.visit_jsx(inner),
        }
    }
}

/// Closure-driven visitor over every expression in pre-order.
struct ExprFn<F>(F);

impl<'ast, F: FnMut(&'ast Expr)> Visit<'ast> for ExprFn<F> {
    fn visit_expr(&mut self, expr: &'ast Expr) {
        (self.0)(expr);
        walk_expr(self, expr);
    }
}

/// Call `f` on every expression under `stmts`, outer expressions first.
pub(crate) fn each_expr<'ast>(stmts: &'ast [Stmt], f: impl FnMut(&'ast Expr)) {
    walk_stmts(&mut ExprFn(f), stmts);
}

/// Call `f` on `expr` and every expression nested inside it.
pub(crate) fn each_sub_expr<'ast>(expr: &'ast Expr, f: impl FnMut(&'ast Expr)) {
    ExprFn(f).visit_expr(expr);
}
