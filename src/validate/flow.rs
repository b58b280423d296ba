//! Scope resolution: every referenced identifier must be declared, imported, a parameter
//! or a known global.

use std::collections::HashSet;

use crate::syntax::ast::*;
use crate::syntax::visit::{
    Visit, walk_class, walk_expr, walk_function, walk_jsx, walk_stmt, walk_stmts,
};

const GLOBALS: &[&str] = &[
    "undefined", "NaN", "Infinity", "globalThis", "Math", "Date", "JSON", "Array", "Object",
    "String", "Number", "Boolean", "Symbol", "BigInt", "Map", "Set", "WeakMap", "WeakSet",
    "Promise", "Proxy", "Reflect", "RegExp", "Error", "TypeError", "RangeError", "SyntaxError",
    "Intl", "ArrayBuffer", "DataView", "Uint8Array", "Uint8ClampedArray", "Uint16Array",
    "Int8Array", "Int16Array", "Int32Array", "Uint32Array", "Float32Array", "Float64Array",
    "parseInt", "parseFloat", "isNaN", "isFinite", "encodeURIComponent", "decodeURIComponent",
    "encodeURI", "decodeURI", "atob", "btoa", "structuredClone", "queueMicrotask", "console",
    "window", "document", "navigator", "location", "history", "screen", "performance",
    "localStorage", "sessionStorage", "fetch", "URL", "URLSearchParams", "TextEncoder",
    "TextDecoder", "crypto", "alert", "Image", "Audio", "Event", "CustomEvent", "MouseEvent",
    "KeyboardEvent", "HTMLElement", "HTMLCanvasElement", "HTMLDivElement", "SVGElement",
    "CanvasRenderingContext2D", "ResizeObserver", "IntersectionObserver", "MutationObserver",
    "getComputedStyle", "devicePixelRatio", "innerWidth", "innerHeight", "setTimeout",
    "setInterval", "clearTimeout", "clearInterval", "requestAnimationFrame",
    "cancelAnimationFrame", "process",
];

/// Every identifier occurrence that resolves to nothing, in discovery order.
pub(crate) fn unresolved(tree: &StructuralTree) -> Vec<&Ident> {
    let mut r = Resolver::default();
    r.push();
    r.declare(&tree.body, true);
    walk_stmts(&mut r, &tree.body);
    r.pop();
    r.unresolved
}

#[derive(Default)]
struct Resolver<'ast> {
    scopes: Vec<HashSet<&'ast str>>,
    unresolved: Vec<&'ast Ident>,
}

/// Names bound by a pattern.
fn pattern_names<'ast>(pat: &'ast Pattern, out: &mut Vec<&'ast str>) {
    match &pat.kind {
        PatKind::Ident(id) => out.push(&id.name),
        PatKind::Array(elems) => {
            for el in elems.iter().flatten() {
                pattern_names(el, out);
            }
        }
        PatKind::Object(props) => {
            for prop in props {
                match prop {
                    PatProp::KeyValue { value, .. } => pattern_names(value, out),
                    PatProp::Rest(p) => pattern_names(p, out),
                }
            }
        }
        PatKind::Default { target, .. } => pattern_names(target, out),
        PatKind::Rest(p) => pattern_names(p, out),
        PatKind::Expr(_) => {}
    }
}

fn is_component_tag(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase() || c == '_' || c == '$')
}

impl<'ast> Resolver<'ast> {
    fn push(&mut self) {
        self.scopes.push(HashSet::new());
    }

    fn pop(&mut self) {
        self.scopes.pop();
    }

    fn bind(&mut self, name: &'ast str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name);
        }
    }

    fn bind_pattern(&mut self, pat: &'ast Pattern) {
        let mut names = Vec::new();
        pattern_names(pat, &mut names);
        for n in names {
            self.bind(n);
        }
    }

    fn reference(&mut self, id: &'ast Ident) {
        let name = id.name.as_str();
        let known = self.scopes.iter().rev().any(|s| s.contains(name)) || GLOBALS.contains(&name);
        if !known {
            self.unresolved.push(id);
        }
    }

    /// Bind the declarations of a statement list up front (hoisting). Function scopes also
    /// pick up `var` declarations nested in blocks.
    fn declare(&mut self, stmts: &'ast [Stmt], function_scope: bool) {
        for stmt in stmts {
            self.declare_stmt(stmt);
            if function_scope {
                self.hoist_vars(stmt);
            }
        }
    }

    fn declare_stmt(&mut self, stmt: &'ast Stmt) {
        match &stmt.kind {
            StmtKind::Var(decl) => {
                for d in &decl.decls {
                    self.bind_pattern(&d.pattern);
                }
            }
            StmtKind::Function(Function { name: Some(n), .. })
            | StmtKind::Class(Class { name: Some(n), .. })
            | StmtKind::ExportDefault(ExportDefault::Function(Function { name: Some(n), .. }))
            | StmtKind::ExportDefault(ExportDefault::Class(Class { name: Some(n), .. }))
            | StmtKind::Enum { name: n }
            | StmtKind::TypeOnly { name: Some(n) } => self.bind(&n.name),
            StmtKind::Import(decl) => {
                for spec in &decl.specifiers {
                    self.bind(&spec.local.name);
                }
            }
            StmtKind::ExportDecl(inner) => self.declare_stmt(inner),
            _ => {}
        }
    }

    fn hoist_vars(&mut self, stmt: &'ast Stmt) {
        let var_decl = |init: &'ast ForInit| match init {
            ForInit::Var(d) if d.kind == VarKind::Var => Some(d),
            _ => None,
        };
        match &stmt.kind {
            StmtKind::Var(decl) if decl.kind == VarKind::Var => {
                for d in &decl.decls {
                    self.bind_pattern(&d.pattern);
                }
            }
            StmtKind::Block(body) => body.iter().for_each(|s| self.hoist_vars(s)),
            StmtKind::If { cons, alt, .. } => {
                self.hoist_vars(cons);
                if let Some(alt) = alt {
                    self.hoist_vars(alt);
                }
            }
            StmtKind::For { init, body, .. } => {
                if let Some(decl) = init.as_ref().and_then(var_decl) {
                    for d in &decl.decls {
                        self.bind_pattern(&d.pattern);
                    }
                }
                self.hoist_vars(body);
            }
            StmtKind::ForIn { left, body, .. } => {
                if let Some(decl) = var_decl(left) {
                    for d in &decl.decls {
                        self.bind_pattern(&d.pattern);
                    }
                }
                self.hoist_vars(body);
            }
            StmtKind::While { body, .. }
            | StmtKind::DoWhile { body, .. }
            | StmtKind::Labeled { body, .. } => self.hoist_vars(body),
            StmtKind::Try {
                block,
                handler,
                finalizer,
                ..
            } => {
                let nested = block
                    .iter()
                    .chain(handler.iter().flatten())
                    .chain(finalizer.iter().flatten());
                for s in nested {
                    self.hoist_vars(s);
                }
            }
            StmtKind::Switch { cases, .. } => {
                for s in cases.iter().flat_map(|c| &c.body) {
                    self.hoist_vars(s);
                }
            }
            _ => {}
        }
    }

    fn block(&mut self, stmts: &'ast [Stmt]) {
        self.push();
        self.declare(stmts, false);
        walk_stmts(self, stmts);
        self.pop();
    }

    fn assign_target(&mut self, pat: &'ast Pattern) {
        match &pat.kind {
            PatKind::Ident(id) => self.reference(id),
            PatKind::Expr(e) => self.visit_expr(e),
            PatKind::Array(elems) => {
                for el in elems.iter().flatten() {
                    self.assign_target(el);
                }
            }
            PatKind::Object(props) => {
                for prop in props {
                    match prop {
                        PatProp::KeyValue { key, value } => {
                            if let PropKey::Computed(k) = key {
                                self.visit_expr(k);
                            }
                            self.assign_target(value);
                        }
                        PatProp::Rest(p) => self.assign_target(p),
                    }
                }
            }
            PatKind::Default { target, value } => {
                self.assign_target(target);
                self.visit_expr(value);
            }
            PatKind::Rest(p) => self.assign_target(p),
        }
    }

    fn for_head(&mut self, init: &'ast ForInit) {
        match init {
            ForInit::Var(decl) => {
                for d in &decl.decls {
                    self.bind_pattern(&d.pattern);
                    self.visit_pattern(&d.pattern);
                    if let Some(init) = &d.init {
                        self.visit_expr(init);
                    }
                }
            }
            ForInit::Expr(e) => self.visit_expr(e),
            ForInit::Pattern(p) => self.assign_target(p),
        }
    }
}

impl<'ast> Visit<'ast> for Resolver<'ast> {
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        match &stmt.kind {
            StmtKind::Block(body) => self.block(body),
            StmtKind::For {
                init,
                test,
                update,
                body,
            } => {
                self.push();
                if let Some(init) = init {
                    self.for_head(init);
                }
                if let Some(test) = test {
                    self.visit_expr(test);
                }
                if let Some(update) = update {
                    self.visit_expr(update);
                }
                self.visit_stmt(body);
                self.pop();
            }
            StmtKind::ForIn {
                left, right, body, ..
            } => {
                self.visit_expr(right);
                self.push();
                self.for_head(left);
                self.visit_stmt(body);
                self.pop();
            }
            StmtKind::Try {
                block,
                param,
                handler,
                finalizer,
            } => {
                self.block(block);
                if let Some(handler) = handler {
                    self.push();
                    if let Some(param) = param {
                        self.bind_pattern(param);
                        self.visit_pattern(param);
                    }
                    self.declare(handler, false);
                    walk_stmts(self, handler);
                    self.pop();
                }
                if let Some(finalizer) = finalizer {
                    self.block(finalizer);
                }
            }
            StmtKind::Switch { disc, cases } => {
                self.visit_expr(disc);
                self.push();
                for case in cases {
                    self.declare(&case.body, false);
                }
                for case in cases {
                    if let Some(test) = &case.test {
                        self.visit_expr(test);
                    }
                    walk_stmts(self, &case.body);
                }
                self.pop();
            }
            StmtKind::ExportNamed {
                specifiers,
                source: None,
            } => {
                for spec in specifiers {
                    self.reference(&spec.local);
                }
            }
            _ => walk_stmt(self, stmt),
        }
    }

    fn visit_function(&mut self, func: &'ast Function) {
        self.push();
        self.bind("arguments");
        if let Some(name) = &func.name {
            self.bind(&name.name);
        }
        for p in &func.params {
            self.bind_pattern(p);
        }
        self.declare(&func.body, true);
        walk_function(self, func);
        self.pop();
    }

    fn visit_class(&mut self, class: &'ast Class) {
        self.push();
        if let Some(name) = &class.name {
            self.bind(&name.name);
        }
        walk_class(self, class);
        self.pop();
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        match &expr.kind {
            ExprKind::Ident(id) => self.reference(id),
            ExprKind::Unary { op: "typeof", arg } if arg.as_ident().is_some() => {}
            ExprKind::Arrow(arrow) => {
                self.push();
                for p in &arrow.params {
                    self.bind_pattern(p);
                }
                if let ArrowBody::Block { body, .. } = &arrow.body {
                    self.declare(body, true);
                }
                walk_expr(self, expr);
                self.pop();
            }
            ExprKind::Assign { target, value, .. } => {
                self.assign_target(target);
                self.visit_expr(value);
            }
            ExprKind::Object(props) => {
                for prop in props {
                    if let PropKind::Shorthand(id) = &prop.kind {
                        self.reference(id);
                    }
                }
                walk_expr(self, expr);
            }
            _ => walk_expr(self, expr),
        }
    }

    fn visit_jsx(&mut self, el: &'ast JsxElement) {
        match &el.name {
            Some(JsxName::Ident(id)) if is_component_tag(&id.name) => self.reference(id),
            Some(JsxName::Member(parts)) => {
                if let Some(root) = parts.first() {
                    self.reference(root);
                }
            }
            _ => {}
        }
        walk_jsx(self, el);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/validate/flow.rs"]
mod tests;
