//! Determinism rewriter.
//!
//! Turns a classified artifact into a frame-indexed component: every rewritten state
//! binding becomes a pure function of the frame counter, effects and timers are removed,
//! and residual entropy (`Math.random()`, wall-clock reads) is replaced with seeded or
//! frame-derived values. Output is the original text with span edits applied, so code the
//! rewriter does not touch keeps its formatting.

mod edit;
mod synth;

use std::collections::HashSet;
use std::fmt::Write as _;

use serde::Serialize;

use crate::classify::component::{
    Component, FnBody, FnRef, Locals, find_components, is_hook_call, pattern_name, primary,
    timer_kind,
};
use crate::classify::{
    CollectionShape, DerivedSite, ElementShape, FieldMotion, MutationRule, RecordField,
    StateBinding, TimerUpdate, is_event_attr,
};
use crate::foundation::math::salt_for;
use crate::rewrite::edit::EditSet;
use crate::rewrite::synth::{Synth, js_key};
use crate::syntax::ast::*;
use crate::syntax::lexer::Span;
use crate::syntax::visit::{
    Visit, each_expr, each_sub_expr, walk_class, walk_expr, walk_function, walk_jsx,
    walk_pattern, walk_stmt,
};

/// One binding replaced by a frame expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Substitution {
    /// Rewritten binding.
    pub binding_name: String,
    /// Expression now bound to it.
    pub frame_expression: String,
    /// Caveat attached to the substitution, if any.
    pub note: Option<String>,
}

/// Output of [`rewrite`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewriteResult {
    /// Rewritten artifact source.
    pub output_text: String,
    /// Applied substitutions, in binding order.
    pub substitutions: Vec<Substitution>,
    /// Human-readable remarks (event-driven and unclassified bindings).
    pub notes: Vec<String>,
    /// Share of bindings rewritten, in `[0, 1]`; `1.0` when there were none.
    pub confidence: f64,
    /// xxh3-64 of `output_text`.
    pub fingerprint: u64,
}

/// Rewriter tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Frames per second of the target composition.
    pub fps: u32,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self { fps: 30 }
    }
}

/// Rewrite with default options (30 fps).
pub fn rewrite(tree: &StructuralTree, bindings: &[StateBinding]) -> RewriteResult {
    rewrite_with(tree, bindings, &RewriteOptions::default())
}

/// Rewrite `tree` so every classified binding is driven by the frame counter.
pub fn rewrite_with(
    tree: &StructuralTree,
    bindings: &[StateBinding],
    opts: &RewriteOptions,
) -> RewriteResult {
    Rewriter::new(tree, bindings, opts).run()
}

/// Minimal static component shown when an artifact cannot be rewritten.
pub fn placeholder(identifier: &str) -> String {
    let label = serde_json::to_string(identifier).unwrap_or_else(|_| "\"artifact\"".to_owned());
    format!(
        "import {{ AbsoluteFill }} from 'remotion';

export default function Placeholder() {{
  return (
    <AbsoluteFill
      style={{{{
        justifyContent: 'center',
        alignItems: 'center',
        backgroundColor: '#101014',
        color: '#e8e8ee',
        fontSize: 48,
      }}}}
    >
      {{{label}}}
    </AbsoluteFill>
  );
}}
"
    )
}

const SEEDED_HELPER: &str = "(index: number, salt: number): number => {\n  const x = Math.sin(index * 12.9898 + salt * 78.233) * 43758.5453;\n  return x - Math.floor(x);\n};";

const MOUNT_CALLS: &[&str] = &[
    "ReactDOM.render",
    "ReactDOM.hydrate",
    "ReactDOM.createRoot",
    "ReactDOM.hydrateRoot",
    "createRoot",
    "hydrateRoot",
];

/// Per-component rewrite state.
struct CompCtx<'ast> {
    comp: Component<'ast>,
    frame: String,
    has_frame: bool,
    needs_frame: bool,
}

struct Rewriter<'a, 'ast> {
    tree: &'ast StructuralTree,
    src: &'ast str,
    bindings: &'a [StateBinding],
    fps: u32,
    locals: Locals<'ast>,
    comps: Vec<CompCtx<'ast>>,
    seeded: String,
    need_seeded: bool,
    randoms: usize,
    edits: EditSet,
    substitutions: Vec<Substitution>,
    notes: Vec<String>,
}

impl<'a, 'ast> Rewriter<'a, 'ast> {
    fn new(tree: &'ast StructuralTree, bindings: &'a [StateBinding], opts: &RewriteOptions) -> Self {
        let mut names = Names::default();
        for stmt in &tree.body {
            names.visit_stmt(stmt);
        }
        let frame = fresh(&names.0, &["frame", "currentFrame"]);
        let seeded = fresh(&names.0, &["seededRandom"]);
        let comps = find_components(tree)
            .into_iter()
            .map(|comp| {
                let existing = existing_frame(&comp);
                CompCtx {
                    comp,
                    has_frame: existing.is_some(),
                    frame: existing.map_or_else(|| frame.clone(), str::to_owned),
                    needs_frame: false,
                }
            })
            .collect();
        Self {
            tree,
            src: &tree.source,
            bindings,
            fps: opts.fps.max(1),
            locals: Locals::collect(tree),
            comps,
            seeded,
            need_seeded: false,
            randoms: 0,
            edits: EditSet::new(),
            substitutions: Vec::new(),
            notes: Vec::new(),
        }
    }

    fn run(mut self) -> RewriteResult {
        if self.comps.is_empty() {
            self.notes.push("no component found; artifact left as written".to_owned());
        }

        let tree = self.tree;
        self.delete_mounts();
        let mut deletions = Deletions {
            rw: &mut self,
            bare: HashSet::new(),
        };
        for stmt in &tree.body {
            deletions.visit_stmt(stmt);
        }
        let mut residuals = Residuals {
            rw: &mut self,
            indices: Vec::new(),
        };
        for stmt in &tree.body {
            residuals.visit_stmt(stmt);
        }

        let mut rewritten = 0usize;
        for binding in self.bindings {
            if self.rewrite_binding(binding) {
                rewritten += 1;
            }
        }

        self.insert_frames();
        self.insert_module_prelude();
        self.ensure_default_export();

        let output_text = self.edits.apply(self.src);
        let total = self.bindings.len();
        let confidence = if total == 0 {
            1.0
        } else {
            rewritten as f64 / total as f64
        };
        tracing::debug!(
            bindings = total,
            rewritten,
            confidence,
            seeded = self.need_seeded,
            "rewrote artifact"
        );
        RewriteResult {
            fingerprint: xxhash_rust::xxh3::xxh3_64(output_text.as_bytes()),
            output_text,
            substitutions: self.substitutions,
            notes: self.notes,
            confidence,
        }
    }

    fn comp_at(&self, span: Span) -> Option<usize> {
        self.comps.iter().position(|c| c.comp.span().contains(span))
    }

    fn delete_line(&mut self, span: Span) {
        let extent = line_extent(self.src, span);
        self.edits.delete(extent);
    }

    /// Module-level `ReactDOM.render(...)` / `createRoot(...).render(...)` statements.
    fn delete_mounts(&mut self) {
        let mut roots: HashSet<&'ast str> = HashSet::new();
        for stmt in &self.tree.body {
            match &stmt.kind {
                StmtKind::Expr(e) if is_mount(e, &roots) => self.delete_line(stmt.span),
                StmtKind::Var(decl)
                    if !decl.decls.is_empty()
                        && decl
                            .decls
                            .iter()
                            .all(|d| d.init.as_ref().is_some_and(|i| is_mount(i, &roots))) =>
                {
                    roots.extend(decl.decls.iter().filter_map(|d| pattern_name(&d.pattern)));
                    self.delete_line(stmt.span);
                }
                _ => {}
            }
        }
    }

    fn seeded_call(&mut self, index: &str, salt: u32) -> String {
        self.need_seeded = true;
        format!("{}({index}, {salt})", self.seeded)
    }

    fn clock(&mut self, span: Span) -> Option<String> {
        let idx = self.comp_at(span)?;
        let ctx = &mut self.comps[idx];
        ctx.needs_frame = true;
        Some(format!("{} * 1000 / {}", ctx.frame, self.fps))
    }

    /// Rewrite one binding's declarator. Returns whether it counts as rewritten.
    fn rewrite_binding(&mut self, b: &StateBinding) -> bool {
        let Some(ci) = self.comp_at(b.decl_span) else {
            self.notes
                .push(format!("`{}` is outside any component; left as written", b.name));
            return false;
        };
        let frame = self.comps[ci].frame.clone();
        let init = find_expr(self.tree, b.initial.span);
        let mut uses_frame = false;
        let mut note = None;
        for extra in &b.notes {
            self.notes.push(format!("`{}`: {extra}", b.name));
        }

        let value = match &b.rule {
            MutationRule::Unclassified { reason } => {
                self.notes
                    .push(format!("`{}` left as written: {reason}", b.name));
                return false;
            }
            MutationRule::PeriodicTimer {
                interval_ms,
                update,
            } => {
                uses_frame = true;
                let base = self.static_value(b, init);
                let base_num = init.and_then(|e| self.locals.number(e));
                let synth = Synth {
                    fps: f64::from(self.fps),
                    frame: &frame,
                };
                match synth.scalar(&b.name, &base, base_num, *interval_ms, update) {
                    Some(expr) => expr,
                    None => {
                        let TimerUpdate::RecordMotion { fields: motions } = update else {
                            return false;
                        };
                        let Some((shape, fields)) = records_of(b) else {
                            self.notes.push(format!(
                                "`{}` animates records without a recognised initializer; left as written",
                                b.name
                            ));
                            return false;
                        };
                        self.records(b, shape, fields, motions, *interval_ms, &frame)
                    }
                }
            }
            MutationRule::EventHandler { events } => {
                let msg = format!(
                    "`{}` changes only on user events ({}); frozen at its initial value",
                    b.name,
                    events.join(", ")
                );
                self.notes.push(msg.clone());
                note = Some(msg);
                self.static_value(b, init)
            }
            MutationRule::Constant => self.static_value(b, init),
            MutationRule::DerivedFromOther { expr, site } => {
                let text = self.edits.render(self.src, expr.span);
                match site {
                    DerivedSite::MemoBody => format!("({text})()"),
                    DerivedSite::Effect | DerivedSite::Memo => text,
                }
            }
        };

        let mut declarator = format!("{} = {value}", b.name);
        if let Some(setter) = b.setter.as_deref()
            && self.setter_still_used(setter, b.decl_span)
        {
            let _ = write!(declarator, ", {setter} = (..._args: unknown[]) => {{}}");
        }
        self.edits.replace(b.decl_span, declarator);
        if uses_frame {
            self.comps[ci].needs_frame = true;
        }
        self.substitutions.push(Substitution {
            binding_name: b.name.clone(),
            frame_expression: value,
            note,
        });
        true
    }

    /// The binding's initial value as an expression: lazy initializers are invoked.
    fn static_value(&self, b: &StateBinding, init: Option<&'ast Expr>) -> String {
        let Some(init) = init else {
            return "undefined".to_owned();
        };
        let text = self.edits.render(self.src, b.initial.span);
        if let Some(func) = FnRef::of_expr(init)
            && func.params.is_empty()
        {
            return format!("({text})()");
        }
        if let Some(name) = init.unwrap_parens().as_ident()
            && self.locals.function(name).is_some()
        {
            return format!("{name}()");
        }
        text
    }

    /// `Array.from` comprehension over seeded record fields, with frame motion on the
    /// animated ones.
    fn records(
        &mut self,
        b: &StateBinding,
        shape: &CollectionShape,
        fields: &[RecordField],
        motions: &[FieldMotion],
        interval_ms: f64,
        frame: &str,
    ) -> String {
        let index = shape.index.as_deref().unwrap_or("i");
        let seeded: Vec<(&str, String)> = fields
            .iter()
            .map(|f| (f.name.as_str(), self.seeded_field(&b.name, index, f)))
            .collect();
        let synth = Synth {
            fps: f64::from(self.fps),
            frame,
        };
        let indent = indent_at(self.src, b.decl_span.start);
        let mut out = format!("Array.from({{ length: {} }}, (_, {index}) => ({{\n", shape.count);
        for (name, base) in &seeded {
            let value = match motions.iter().find(|m| m.name == *name) {
                Some(motion) => synth.field_motion(&b.name, index, base, motion, interval_ms, |other| {
                    seeded
                        .iter()
                        .find(|(n, _)| *n == other)
                        .map(|(_, text)| text.clone())
                }),
                None => base.clone(),
            };
            let _ = writeln!(out, "{indent}  {}: {value},", js_key(name));
        }
        let _ = write!(out, "{indent}}}))");
        out
    }

    /// Field initializer with each `Math.random()` replaced by a seeded draw.
    fn seeded_field(&mut self, binding: &str, index: &str, field: &RecordField) -> String {
        let Some(expr) = find_expr(self.tree, field.value.span) else {
            return field.value.text.clone();
        };
        let mut randoms = Vec::new();
        each_sub_expr(expr, |e| {
            if is_random_call(e) {
                randoms.push(e.span);
            }
        });
        let mut local = EditSet::new();
        for (occurrence, span) in randoms.into_iter().enumerate() {
            let salt = salt_for(&[binding, field.name.as_str(), occurrence.to_string().as_str()]);
            let call = self.seeded_call(index, salt);
            local.replace(span, call);
        }
        local.slice(self.src, field.value.span)
    }

    /// `true` when `setter` is referenced outside its declarator by code that survives.
    fn setter_still_used(&self, setter: &str, decl: Span) -> bool {
        let mut used = false;
        each_expr(&self.tree.body, |e| {
            let hit = match &e.kind {
                ExprKind::Ident(id) => id.name == setter && !decl.contains(id.span),
                ExprKind::Object(props) => props.iter().any(|p| {
                    matches!(&p.kind, PropKind::Shorthand(id) if id.name == setter && !self.edits.covers(id.span))
                }),
                _ => false,
            };
            if hit && !self.edits.covers(e.span) {
                used = true;
            }
        });
        used
    }

    fn insert_frames(&mut self) {
        for ci in 0..self.comps.len() {
            let ctx = &self.comps[ci];
            if !ctx.needs_frame || ctx.has_frame {
                continue;
            }
            let decl = format!("const {} = useCurrentFrame();", ctx.frame);
            match ctx.comp.func.body {
                FnBody::Block(stmts, span) => {
                    let indent = match stmts.first() {
                        Some(first) => indent_at(self.src, first.span.start).to_owned(),
                        None => format!("{}  ", indent_at(self.src, span.start)),
                    };
                    self.edits.insert(span.start + 1, format!("\n{indent}{decl}"));
                }
                FnBody::Expr(e) => {
                    let indent = indent_at(self.src, ctx.comp.span().start).to_owned();
                    self.edits
                        .insert(e.span.start, format!("{{\n{indent}  {decl}\n{indent}  return "));
                    self.edits.insert(e.span.end, format!(";\n{indent}}}"));
                }
            }
        }
    }

    /// `useCurrentFrame` import and the `seededRandom` helper.
    fn insert_module_prelude(&mut self) {
        let inserted_frame = self.comps.iter().any(|c| c.needs_frame && !c.has_frame);
        let last_import = self
            .tree
            .body
            .iter()
            .rev()
            .find(|s| matches!(s.kind, StmtKind::Import(_)));
        let mut prelude = String::new();
        if inserted_frame && !imports_frame_hook(self.tree) {
            prelude.push_str("import { useCurrentFrame } from 'remotion';\n");
        }
        if self.need_seeded {
            let _ = write!(prelude, "\nconst {} = {SEEDED_HELPER}\n", self.seeded);
        }
        if prelude.is_empty() {
            return;
        }
        match last_import {
            Some(stmt) => self.edits.insert(stmt.span.end, format!("\n{}", prelude.trim_end())),
            None => self.edits.insert(0, format!("{}\n\n", prelude.trim())),
        }
    }

    fn ensure_default_export(&mut self) {
        let has_default = self.tree.body.iter().any(|s| match &s.kind {
            StmtKind::ExportDefault(_) => true,
            StmtKind::ExportNamed { specifiers, .. } => {
                specifiers.iter().any(|spec| spec.exported == "default")
            }
            _ => false,
        });
        if has_default {
            return;
        }
        let comps: Vec<Component<'_>> = self.comps.iter().map(|c| c.comp).collect();
        if let Some(name) = primary(&comps).and_then(|c| c.name) {
            let tail = if self.src.ends_with('\n') { "" } else { "\n" };
            self.edits
                .insert(self.src.len(), format!("{tail}\nexport default {name};\n"));
        }
    }
}

/// Record field list and shape of a collection-of-records binding.
fn records_of(b: &StateBinding) -> Option<(&CollectionShape, &[RecordField])> {
    let shape = b.collection.as_ref()?;
    match &shape.element {
        ElementShape::Record(fields) => Some((shape, fields.as_slice())),
        ElementShape::Value(_) => None,
    }
}

/// Removes effects, timers, event attributes.
struct Deletions<'r, 'a, 'ast> {
    rw: &'r mut Rewriter<'a, 'ast>,
    /// Statements that are the sole body of an `if`/loop; these become `{}` instead.
    bare: HashSet<Span>,
}

impl<'ast> Visit<'ast> for Deletions<'_, '_, 'ast> {
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        if is_removable(stmt) {
            if self.bare.contains(&stmt.span) {
                self.rw.edits.replace(stmt.span, "{}");
            } else {
                self.rw.delete_line(stmt.span);
            }
            return;
        }
        match &stmt.kind {
            StmtKind::If { cons, alt, .. } => {
                self.bare.insert(cons.span);
                if let Some(alt) = alt {
                    self.bare.insert(alt.span);
                }
            }
            StmtKind::For { body, .. }
            | StmtKind::ForIn { body, .. }
            | StmtKind::While { body, .. }
            | StmtKind::DoWhile { body, .. }
            | StmtKind::Labeled { body, .. } => {
                self.bare.insert(body.span);
            }
            _ => {}
        }
        walk_stmt(self, stmt);
    }

    fn visit_jsx(&mut self, el: &'ast JsxElement) {
        for attr in &el.attrs {
            if let JsxAttrKind::Named { name, .. } = &attr.kind
                && is_event_attr(name)
            {
                let start = self
                    .rw
                    .src
                    .get(..attr.span.start)
                    .map_or(attr.span.start, |head| head.trim_end().len());
                self.rw.edits.delete(Span::new(start, attr.span.end));
            }
        }
        walk_jsx(self, el);
    }
}

/// Replaces residual entropy and clock reads in surviving code.
struct Residuals<'r, 'a, 'ast> {
    rw: &'r mut Rewriter<'a, 'ast>,
    /// Enclosing loop and `map` index names, innermost last.
    indices: Vec<&'ast str>,
}

impl<'ast> Visit<'ast> for Residuals<'_, '_, 'ast> {
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        if self.rw.edits.covers(stmt.span) {
            return;
        }
        if let StmtKind::For {
            init: Some(ForInit::Var(decl)),
            ..
        } = &stmt.kind
            && let Some(index) = decl.decls.first().and_then(|d| pattern_name(&d.pattern))
        {
            self.indices.push(index);
            walk_stmt(self, stmt);
            self.indices.pop();
            return;
        }
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        if self.rw.edits.covers(expr.span) {
            return;
        }
        match &expr.kind {
            ExprKind::Call { callee, args, .. } => {
                if is_random_call(expr) {
                    let index = self.indices.last().copied().unwrap_or("0");
                    let salt = salt_for(&["random", self.rw.randoms.to_string().as_str()]);
                    self.rw.randoms += 1;
                    let call = self.rw.seeded_call(index, salt);
                    self.rw.edits.replace(expr.span, call);
                    return;
                }
                if args.is_empty()
                    && matches!(
                        callee.dotted_name().as_deref(),
                        Some("Date.now" | "performance.now")
                    )
                {
                    let text = match self.rw.clock(expr.span) {
                        Some(t) => format!("({t})"),
                        None => "0".to_owned(),
                    };
                    self.rw.edits.replace(expr.span, text);
                    return;
                }
                if timer_kind(callee).is_some() {
                    self.rw.edits.replace(expr.span, "0");
                    return;
                }
                if let Some((arg_pos, param_pos)) = index_callback(callee) {
                    self.visit_expr(callee);
                    for (k, arg) in args.iter().enumerate() {
                        let index = (k == arg_pos)
                            .then(|| FnRef::of_expr(arg))
                            .flatten()
                            .and_then(|f| f.param_name(param_pos));
                        match index {
                            Some(index) => {
                                self.indices.push(index);
                                self.visit_expr(arg);
                                self.indices.pop();
                            }
                            None => self.visit_expr(arg),
                        }
                    }
                    return;
                }
            }
            ExprKind::New { callee, args } if args.is_empty() && callee.as_ident() == Some("Date") => {
                let text = match self.rw.clock(expr.span) {
                    Some(t) => format!("new Date({t})"),
                    None => "new Date(0)".to_owned(),
                };
                self.rw.edits.replace(expr.span, text);
                return;
            }
            _ => {}
        }
        walk_expr(self, expr);
    }
}

/// Every name bound or referenced anywhere in the module.
#[derive(Default)]
struct Names<'ast>(HashSet<&'ast str>);

impl<'ast> Visit<'ast> for Names<'ast> {
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        match &stmt.kind {
            StmtKind::Import(decl) => {
                self.0
                    .extend(decl.specifiers.iter().map(|s| s.local.name.as_str()));
            }
            StmtKind::Enum { name }
            | StmtKind::TypeOnly { name: Some(name) } => {
                self.0.insert(&name.name);
            }
            _ => {}
        }
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        if let ExprKind::Ident(id) = &expr.kind {
            self.0.insert(&id.name);
        }
        walk_expr(self, expr);
    }

    fn visit_pattern(&mut self, pat: &'ast Pattern) {
        if let PatKind::Ident(id) = &pat.kind {
            self.0.insert(&id.name);
        }
        walk_pattern(self, pat);
    }

    fn visit_function(&mut self, func: &'ast Function) {
        if let Some(name) = &func.name {
            self.0.insert(&name.name);
        }
        walk_function(self, func);
    }

    fn visit_class(&mut self, class: &'ast Class) {
        if let Some(name) = &class.name {
            self.0.insert(&name.name);
        }
        walk_class(self, class);
    }
}

/// First candidate not in `taken`, else the first one with a numeric suffix.
fn fresh(taken: &HashSet<&str>, candidates: &[&str]) -> String {
    if let Some(free) = candidates.iter().find(|c| !taken.contains(**c)) {
        return (*free).to_owned();
    }
    let base = candidates.first().copied().unwrap_or("v");
    (2u32..)
        .map(|n| format!("{base}{n}"))
        .find(|name| !taken.contains(name.as_str()))
        .unwrap_or_else(|| format!("{base}_"))
}

/// Name of an existing `const x = useCurrentFrame()` at the top of the component.
fn existing_frame<'ast>(comp: &Component<'ast>) -> Option<&'ast str> {
    comp.stmts().iter().find_map(|stmt| {
        let StmtKind::Var(decl) = &stmt.kind else {
            return None;
        };
        decl.decls.iter().find_map(|d| {
            let init = d.init.as_ref()?;
            if is_hook_call(init, "useCurrentFrame") {
                pattern_name(&d.pattern)
            } else {
                None
            }
        })
    })
}

fn imports_frame_hook(tree: &StructuralTree) -> bool {
    tree.body.iter().any(|s| match &s.kind {
        StmtKind::Import(decl) => {
            decl.source == "remotion"
                && decl.specifiers.iter().any(|spec| {
                    spec.imported.as_deref() == Some("useCurrentFrame")
                        && spec.local.name == "useCurrentFrame"
                })
        }
        _ => false,
    })
}

fn is_random_call(expr: &Expr) -> bool {
    matches!(
        &expr.kind,
        ExprKind::Call { callee, args, .. }
            if args.is_empty() && callee.dotted_name().as_deref() == Some("Math.random")
    )
}

fn is_timer_call(expr: &Expr) -> bool {
    matches!(&expr.unwrap_parens().kind, ExprKind::Call { callee, .. } if timer_kind(callee).is_some())
}

/// Effect hooks and timer registration statements.
fn is_removable(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::Expr(e) => {
            is_hook_call(e, "useEffect")
                || is_hook_call(e, "useLayoutEffect")
                || is_timer_call(e)
                || matches!(&e.kind, ExprKind::Assign { value, .. } if is_timer_call(value))
        }
        StmtKind::Var(decl) => {
            !decl.decls.is_empty()
                && decl
                    .decls
                    .iter()
                    .all(|d| d.init.as_ref().is_some_and(is_timer_call))
        }
        _ => false,
    }
}

fn is_mount(expr: &Expr, roots: &HashSet<&str>) -> bool {
    let mut found = false;
    each_sub_expr(expr, |e| {
        let ExprKind::Call { callee, .. } = &e.kind else {
            return;
        };
        if callee
            .dotted_name()
            .is_some_and(|n| MOUNT_CALLS.contains(&n.as_str()))
        {
            found = true;
        }
        if let ExprKind::Member {
            object,
            prop: MemberProp::Ident(p),
            ..
        } = &callee.kind
            && p.name == "render"
            && object.as_ident().is_some_and(|o| roots.contains(o))
        {
            found = true;
        }
    });
    found
}

/// `(callback argument, index parameter)` positions of index-passing iteration calls.
fn index_callback(callee: &Expr) -> Option<(usize, usize)> {
    if callee.dotted_name().as_deref() == Some("Array.from") {
        return Some((1, 1));
    }
    let ExprKind::Member {
        prop: MemberProp::Ident(p),
        ..
    } = &callee.kind
    else {
        return None;
    };
    match p.name.as_str() {
        "map" | "forEach" | "filter" | "flatMap" | "some" | "every" | "find" | "findIndex" => {
            Some((0, 1))
        }
        "reduce" => Some((0, 2)),
        _ => None,
    }
}

/// Outermost expression whose span is exactly `span`.
fn find_expr(tree: &StructuralTree, span: Span) -> Option<&Expr> {
    if span.is_empty() {
        return None;
    }
    let mut found = None;
    each_expr(&tree.body, |e| {
        if found.is_none() && e.span == span {
            found = Some(e);
        }
    });
    found
}

/// Leading whitespace of the line containing `pos`.
fn indent_at(src: &str, pos: usize) -> &str {
    let head = src.get(..pos).unwrap_or(src);
    let line_start = head.rfind('\n').map_or(0, |i| i + 1);
    let line = src.get(line_start..).unwrap_or("");
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

/// Widen `span` to its whole line when nothing else shares the line.
fn line_extent(src: &str, span: Span) -> Span {
    let bytes = src.as_bytes();
    let mut start = span.start;
    while start > 0 && matches!(bytes.get(start - 1), Some(b' ' | b'\t')) {
        start -= 1;
    }
    let mut end = span.end;
    while matches!(bytes.get(end), Some(b' ' | b'\t' | b'\r')) {
        end += 1;
    }
    let starts_line = start == 0 || bytes.get(start - 1) == Some(&b'\n');
    let ends_line = end >= bytes.len() || bytes.get(end) == Some(&b'\n');
    if starts_line && ends_line {
        Span::new(start, (end + 1).min(bytes.len()))
    } else {
        span
    }
}

#[cfg(test)]
#[path = "../../tests/unit/rewrite/mod.rs"]
mod tests;
