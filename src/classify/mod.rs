//! State classification.
//!
//! Finds every `useState` binding (and `useMemo` declaration) in the artifact's components
//! and decides how its value evolves: advanced by a periodic timer, changed by user events,
//! derived from other bindings, never changed, or none of the recognised shapes. Unknown
//! shapes degrade to [`MutationRule::Unclassified`]; classification itself never fails.

pub(crate) mod component;
mod patterns;

use std::collections::HashSet;

use serde::Serialize;
use smallvec::SmallVec;

use crate::classify::component::{
    Component, FnRef, Locals, find_components, is_hook_call, timer_kind,
};
use crate::syntax::ast::*;
use crate::syntax::lexer::Span;
use crate::syntax::visit::{Visit, each_sub_expr, walk_expr, walk_jsx};

/// Source slice of an expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExprSlice {
    /// Location in the parsed source.
    pub span: Span,
    /// Text as written.
    pub text: String,
}

impl ExprSlice {
    pub(crate) fn of(tree: &StructuralTree, expr: &Expr) -> Self {
        Self {
            span: expr.span,
            text: tree.text(expr.span).to_owned(),
        }
    }
}

/// Shape of a binding's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    /// Number, string, boolean or object treated as one value.
    Scalar,
    /// Array of plain values.
    Collection,
    /// Array of object records with named fields.
    CollectionOfRecords,
}

/// How a binding changes over time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum MutationRule {
    /// Updated by a `setInterval`/`setTimeout`/`requestAnimationFrame` callback.
    PeriodicTimer {
        /// Milliseconds between ticks.
        interval_ms: f64,
        /// Per-tick update.
        update: TimerUpdate,
    },
    /// Updated only from user-event handlers.
    EventHandler {
        /// Event attribute or listener names, in first-seen order.
        events: Vec<String>,
    },
    /// Computed from other bindings.
    DerivedFromOther {
        /// Value expression.
        expr: ExprSlice,
        /// Where the derivation lives.
        site: DerivedSite,
    },
    /// Setter never invoked.
    Constant,
    /// No recognised shape.
    Unclassified {
        /// Why no rule applied.
        reason: String,
    },
}

impl MutationRule {
    /// Short rule name for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            MutationRule::PeriodicTimer { .. } => "periodic-timer",
            MutationRule::EventHandler { .. } => "event-handler",
            MutationRule::DerivedFromOther { .. } => "derived",
            MutationRule::Constant => "constant",
            MutationRule::Unclassified { .. } => "unclassified",
        }
    }
}

/// Origin of a derived value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedSite {
    /// `useEffect(() => setY(expr), [deps])`; `expr` is the value.
    Effect,
    /// `useMemo(() => expr, [deps])`; `expr` is the value.
    Memo,
    /// `useMemo(() => { ... }, [deps])`; `expr` is the callback, invoked once.
    MemoBody,
}

/// Recognised per-tick update shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum TimerUpdate {
    /// `p + step`.
    Linear {
        /// Change per tick.
        step: f64,
    },
    /// `(p + step) % modulus`.
    Wrap {
        /// Change per tick.
        step: f64,
        /// Wrap-around modulus.
        modulus: f64,
    },
    /// `p + step > hi ? lo : p + step` and mirrored forms.
    Bounded {
        /// Change per tick.
        step: f64,
        /// Lower end of the range.
        lo: f64,
        /// Upper end of the range.
        hi: f64,
    },
    /// `Math.min(p + step, limit)` / `Math.max(p - step, limit)`.
    Clamped {
        /// Change per tick.
        step: f64,
        /// Value the binding settles at.
        limit: f64,
    },
    /// `!p`.
    Toggle,
    /// `amplitude * Math.sin(...)`.
    Oscillate {
        /// Peak deviation.
        amplitude: f64,
    },
    /// `prev.map(p => ({ ...p, field: ... }))`.
    RecordMotion {
        /// Fields the update assigns.
        fields: Vec<FieldMotion>,
    },
}

/// One field assigned by a record update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldMotion {
    /// Field name.
    pub name: String,
    /// Per-tick increment, when it has a recognised form.
    pub step: Option<FieldStep>,
}

/// Per-tick increment of a record field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStep {
    /// `p.f + c`.
    Constant(f64),
    /// `p.f + p.g` (sign `1`) or `p.f - p.g` (sign `-1`).
    Field {
        /// The other field.
        name: String,
        /// `1.0` or `-1.0`.
        sign: f64,
    },
}

/// Statically recognised collection initializer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionShape {
    /// Number of elements.
    pub count: usize,
    /// Index variable name used by the generator, if any.
    pub index: Option<String>,
    /// Element generator.
    pub element: ElementShape,
}

/// Element generator of a collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementShape {
    /// Object literal with named fields, in source order.
    Record(Vec<RecordField>),
    /// Any other element expression.
    Value(ExprSlice),
}

/// One field of a generated record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordField {
    /// Field name.
    pub name: String,
    /// Initializer expression.
    pub value: ExprSlice,
}

/// A piece of component state and how it evolves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateBinding {
    /// Value name.
    pub name: String,
    /// Setter name, when the declaration destructures one.
    pub setter: Option<String>,
    /// Enclosing component, when it is named.
    pub component: Option<String>,
    /// Value shape.
    pub kind: BindingKind,
    /// Initial value as written (`undefined` when absent).
    pub initial: ExprSlice,
    /// Update rule.
    pub rule: MutationRule,
    /// Other bindings this one reads.
    pub depends_on: SmallVec<[String; 2]>,
    /// Span of the declarator (`[x, setX] = useState(...)`).
    pub decl_span: Span,
    /// Recognised collection initializer.
    pub collection: Option<CollectionShape>,
    /// Classification remarks, such as competing timer sites.
    pub notes: Vec<String>,
}

/// Classifier tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifyOptions {
    /// Interval assumed when a timer's delay is not a resolvable number.
    pub default_interval_ms: f64,
    /// Tick length of `requestAnimationFrame` loops.
    pub frame_interval_ms: f64,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            default_interval_ms: 16.0,
            frame_interval_ms: 1000.0 / 60.0,
        }
    }
}

/// Classify every state binding with default options.
pub fn classify(tree: &StructuralTree) -> Vec<StateBinding> {
    classify_with(tree, &ClassifyOptions::default())
}

/// Classify every state binding in every component of `tree`.
pub fn classify_with(tree: &StructuralTree, opts: &ClassifyOptions) -> Vec<StateBinding> {
    let locals = Locals::collect(tree);
    let components = find_components(tree);
    let mut out = Vec::new();
    for comp in &components {
        out.extend(Classifier::new(tree, comp, &locals, opts).run());
    }
    tracing::debug!(
        components = components.len(),
        bindings = out.len(),
        unclassified = out
            .iter()
            .filter(|b| matches!(b.rule, MutationRule::Unclassified { .. }))
            .count(),
        "classified state"
    );
    out
}

/// A `useState` or `useMemo` declarator at the top of a component body.
struct Candidate<'ast> {
    name: &'ast str,
    setter: Option<&'ast str>,
    call: &'ast Expr,
    decl_span: Span,
    memo: bool,
}

#[derive(Clone, Copy)]
struct SetterCall<'ast> {
    setter: &'ast str,
    arg: Option<&'ast Expr>,
    span: Span,
}

struct TimerSite<'ast> {
    call: SetterCall<'ast>,
    interval_ms: f64,
    order: usize,
}

struct Classifier<'a, 'ast> {
    tree: &'ast StructuralTree,
    comp: &'a Component<'ast>,
    locals: &'a Locals<'ast>,
    opts: &'a ClassifyOptions,
    setters: HashSet<&'ast str>,
}

impl<'a, 'ast> Classifier<'a, 'ast> {
    fn new(
        tree: &'ast StructuralTree,
        comp: &'a Component<'ast>,
        locals: &'a Locals<'ast>,
        opts: &'a ClassifyOptions,
    ) -> Self {
        Self {
            tree,
            comp,
            locals,
            opts,
            setters: HashSet::new(),
        }
    }

    fn run(mut self) -> Vec<StateBinding> {
        let candidates = self.candidates();
        self.setters = candidates.iter().filter_map(|c| c.setter).collect();
        if candidates.is_empty() {
            return Vec::new();
        }
        let names: HashSet<&str> = candidates.iter().map(|c| c.name).collect();

        let timers = self.timer_sites();
        let events = self.event_sites();
        let effects = self.effect_sites();
        let seeds = self.seed_sites();
        let mut claimed: HashSet<Span> = timers.iter().map(|t| t.call.span).collect();
        claimed.extend(events.iter().map(|(c, _)| c.span));
        claimed.extend(effects.iter().map(|c| c.span));
        claimed.extend(seeds.iter().map(|c| c.span));
        let stray = self.all_setter_calls(&claimed);
        let sites = Sites {
            timers: &timers,
            events: &events,
            effects: &effects,
            seeds: &seeds,
            stray: &stray,
        };

        candidates
            .iter()
            .map(|cand| {
                if cand.memo {
                    self.memo_binding(cand, &names)
                } else {
                    self.state_binding(cand, &names, &sites)
                }
            })
            .collect()
    }

    fn candidates(&self) -> Vec<Candidate<'ast>> {
        let mut out = Vec::new();
        for stmt in self.comp.stmts() {
            let StmtKind::Var(decl) = &stmt.kind else {
                continue;
            };
            for d in &decl.decls {
                let Some(init) = &d.init else {
                    continue;
                };
                if is_hook_call(init, "useState") {
                    let PatKind::Array(elems) = &d.pattern.kind else {
                        continue;
                    };
                    let ident = |idx: usize| match elems.get(idx) {
                        Some(Some(Pattern {
                            kind: PatKind::Ident(id),
                            ..
                        })) => Some(id.name.as_str()),
                        _ => None,
                    };
                    if let Some(name) = ident(0) {
                        out.push(Candidate {
                            name,
                            setter: ident(1),
                            call: init,
                            decl_span: d.span,
                            memo: false,
                        });
                    }
                } else if is_hook_call(init, "useMemo")
                    && let PatKind::Ident(id) = &d.pattern.kind
                {
                    out.push(Candidate {
                        name: &id.name,
                        setter: None,
                        call: init,
                        decl_span: d.span,
                        memo: true,
                    });
                }
            }
        }
        out
    }

    fn call_args(call: &'ast Expr) -> &'ast [Expr] {
        match &call.unwrap_parens().kind {
            ExprKind::Call { args, .. } => args,
            _ => &[],
        }
    }

    /// Setter calls reachable from `func`, following calls into named local functions.
    fn setter_calls(&self, func: FnRef<'ast>, seen: &mut HashSet<Span>, out: &mut Vec<SetterCall<'ast>>) {
        if !seen.insert(func.span) || seen.len() > 64 {
            return;
        }
        let mut nested = Vec::new();
        func.each_expr(|e| {
            let ExprKind::Call { callee, args, .. } = &e.kind else {
                return;
            };
            let Some(name) = callee.as_ident() else {
                return;
            };
            if let Some(setter) = self.setters.get(name).copied() {
                out.push(SetterCall {
                    setter,
                    arg: args.first(),
                    span: e.span,
                });
            } else if let Some(f) = self.locals.function(name) {
                nested.push(f);
            }
        });
        for f in nested {
            self.setter_calls(f, seen, out);
        }
    }

    fn timer_sites(&self) -> Vec<TimerSite<'ast>> {
        let mut sites = Vec::new();
        let mut seen = HashSet::new();
        self.comp.func.each_expr(|e| {
            let ExprKind::Call { callee, args, .. } = &e.kind else {
                return;
            };
            let interval_ms = match timer_kind(callee) {
                Some("setInterval" | "setTimeout") => args
                    .get(1)
                    .and_then(|d| self.locals.number(d))
                    .filter(|v| *v > 0.0)
                    .unwrap_or(self.opts.default_interval_ms),
                Some("requestAnimationFrame") => self.opts.frame_interval_ms,
                _ => return,
            };
            let Some(cb) = args.first().and_then(|a| self.locals.callback(a)) else {
                return;
            };
            let mut calls = Vec::new();
            self.setter_calls(cb, &mut seen, &mut calls);
            sites.extend(calls.into_iter().map(|call| TimerSite {
                call,
                interval_ms,
                order: e.span.start,
            }));
        });
        sites
    }

    /// Setter calls driven by `on*` attributes and `addEventListener` registrations.
    fn event_sites(&self) -> Vec<(SetterCall<'ast>, String)> {
        let mut handlers: Vec<(&'ast Expr, String)> = Vec::new();
        let mut attrs = EventAttrs::default();
        walk_body(&mut attrs, self.comp.func);
        handlers.extend(attrs.found.into_iter().map(|(name, e)| (e, name.to_owned())));
        self.comp.func.each_expr(|e| {
            if let ExprKind::Call { callee, args, .. } = &e.kind
                && let ExprKind::Member {
                    prop: MemberProp::Ident(p),
                    ..
                } = &callee.kind
                && p.name == "addEventListener"
                && let (Some(event), Some(handler)) = (args.first(), args.get(1))
                && let ExprKind::Str(event) = &event.kind
            {
                handlers.push((handler, event.clone()));
            }
        });

        let mut out = Vec::new();
        for (handler, event) in handlers {
            if let Some(setter) = handler.unwrap_parens().as_ident().and_then(|n| self.setters.get(n).copied()) {
                out.push((
                    SetterCall {
                        setter,
                        arg: None,
                        span: handler.span,
                    },
                    event,
                ));
                continue;
            }
            let mut calls = Vec::new();
            if let Some(func) = self.locals.callback(handler) {
                self.setter_calls(func, &mut HashSet::new(), &mut calls);
            } else {
                // `onClick={cond && fn}` and similar; scan the expression itself.
                self.setter_calls_in(handler, &mut calls);
            }
            out.extend(calls.into_iter().map(|c| (c, event.clone())));
        }
        out
    }

    fn setter_calls_in(&self, expr: &'ast Expr, out: &mut Vec<SetterCall<'ast>>) {
        each_sub_expr(expr, |e| {
            if let ExprKind::Call { callee, args, .. } = &e.kind
                && let Some(setter) = callee.as_ident().and_then(|n| self.setters.get(n).copied())
            {
                out.push(SetterCall {
                    setter,
                    arg: args.first(),
                    span: e.span,
                });
            }
        });
    }

    /// Direct setter calls in effects that register no timers or listeners.
    fn effect_sites(&self) -> Vec<SetterCall<'ast>> {
        let mut out = Vec::new();
        for stmt in self.comp.stmts() {
            let StmtKind::Expr(e) = &stmt.kind else {
                continue;
            };
            if !(is_hook_call(e, "useEffect") || is_hook_call(e, "useLayoutEffect")) {
                continue;
            }
            let Some(cb) = Self::call_args(e).first().and_then(FnRef::of_expr) else {
                continue;
            };
            if schedules_work(cb) {
                continue;
            }
            out.extend(self.direct_calls(cb));
        }
        out
    }

    /// Collection seeds: direct setter calls with a recognised collection argument inside a
    /// mount effect (`[]` deps) that also starts timers or listeners.
    fn seed_sites(&self) -> Vec<SetterCall<'ast>> {
        let mut out = Vec::new();
        for stmt in self.comp.stmts() {
            let StmtKind::Expr(e) = &stmt.kind else {
                continue;
            };
            if !(is_hook_call(e, "useEffect") || is_hook_call(e, "useLayoutEffect")) {
                continue;
            }
            let args = Self::call_args(e);
            let mount = matches!(
                args.get(1).map(|d| &d.unwrap_parens().kind),
                Some(ExprKind::Array(deps)) if deps.is_empty()
            );
            let Some(cb) = args.first().and_then(FnRef::of_expr) else {
                continue;
            };
            if !mount || !schedules_work(cb) {
                continue;
            }
            out.extend(self.direct_calls(cb).into_iter().filter(|c| {
                c.arg
                    .is_some_and(|a| patterns::collection_shape(self.tree, a, self.locals).is_some())
            }));
        }
        out
    }

    /// Setter calls in `cb` outside nested functions.
    fn direct_calls(&self, cb: FnRef<'ast>) -> Vec<SetterCall<'ast>> {
        let mut direct = DirectCalls {
            setters: &self.setters,
            found: Vec::new(),
        };
        walk_body(&mut direct, cb);
        direct.found
    }

    fn all_setter_calls(&self, claimed: &HashSet<Span>) -> Vec<SetterCall<'ast>> {
        let mut out = Vec::new();
        self.comp.func.each_expr(|e| {
            if let ExprKind::Call { callee, args, .. } = &e.kind
                && let Some(setter) = callee.as_ident().and_then(|n| self.setters.get(n).copied())
                && !claimed.contains(&e.span)
            {
                out.push(SetterCall {
                    setter,
                    arg: args.first(),
                    span: e.span,
                });
            }
        });
        out
    }

    fn depends_on(&self, expr: &'ast Expr, own: &str, names: &HashSet<&str>) -> SmallVec<[String; 2]> {
        let mut deps: SmallVec<[String; 2]> = SmallVec::new();
        each_sub_expr(expr, |e| {
            if let Some(n) = e.as_ident()
                && n != own
                && names.contains(n)
                && !deps.iter().any(|d| d == n)
            {
                deps.push(n.to_owned());
            }
        });
        deps
    }

    fn initial(&self, cand: &Candidate<'ast>) -> (ExprSlice, Option<&'ast Expr>) {
        match Self::call_args(cand.call).first() {
            Some(arg) => (ExprSlice::of(self.tree, arg), Some(arg)),
            None => (
                ExprSlice {
                    span: Span::new(cand.call.span.end, cand.call.span.end),
                    text: "undefined".to_owned(),
                },
                None,
            ),
        }
    }

    fn memo_binding(&self, cand: &Candidate<'ast>, names: &HashSet<&str>) -> StateBinding {
        let mut binding = self.blank(cand, ExprSlice::of(self.tree, cand.call));
        let callback = Self::call_args(cand.call).first();
        binding.rule = match callback.and_then(|cb| FnRef::of_expr(cb).map(|f| (cb, f))) {
            Some((cb, func)) => {
                binding.depends_on = self.depends_on(cb, cand.name, names);
                match func.body {
                    component::FnBody::Expr(e) => MutationRule::DerivedFromOther {
                        expr: ExprSlice::of(self.tree, e),
                        site: DerivedSite::Memo,
                    },
                    component::FnBody::Block(..) => MutationRule::DerivedFromOther {
                        expr: ExprSlice::of(self.tree, cb),
                        site: DerivedSite::MemoBody,
                    },
                }
            }
            None => MutationRule::Unclassified {
                reason: "useMemo without an inline callback".to_owned(),
            },
        };
        binding
    }

    fn blank(&self, cand: &Candidate<'ast>, initial: ExprSlice) -> StateBinding {
        StateBinding {
            name: cand.name.to_owned(),
            setter: cand.setter.map(str::to_owned),
            component: self.comp.name.map(str::to_owned),
            kind: BindingKind::Scalar,
            initial,
            rule: MutationRule::Constant,
            depends_on: SmallVec::new(),
            decl_span: cand.decl_span,
            collection: None,
            notes: Vec::new(),
        }
    }

    fn state_binding(
        &self,
        cand: &Candidate<'ast>,
        names: &HashSet<&str>,
        sites: &Sites<'_, 'ast>,
    ) -> StateBinding {
        let Sites {
            timers,
            events,
            effects,
            seeds,
            stray,
        } = *sites;
        let (initial, init_expr) = self.initial(cand);
        let mut binding = self.blank(cand, initial);
        if let Some(init) = init_expr {
            binding.collection = patterns::collection_shape(self.tree, init, self.locals);
            binding.kind = match &binding.collection {
                Some(shape) => shape_kind(shape),
                None if matches!(init.unwrap_parens().kind, ExprKind::Array(_)) => {
                    BindingKind::Collection
                }
                None => BindingKind::Scalar,
            };
        }
        let Some(setter) = cand.setter else {
            return binding;
        };
        let mine = |c: &SetterCall<'_>| c.setter == setter;

        if binding.collection.is_none()
            && let Some(seed) = seeds.iter().rfind(|c| mine(*c))
            && let Some(shape) = seed
                .arg
                .and_then(|a| patterns::collection_shape(self.tree, a, self.locals))
        {
            binding.kind = shape_kind(&shape);
            binding.collection = Some(shape);
            binding.notes.push(format!(
                "`{}` is seeded by `{setter}` in a mount effect",
                cand.name
            ));
        }

        let mut my_timers: Vec<&TimerSite<'_>> =
            timers.iter().filter(|t| mine(&t.call) && t.call.arg.is_some()).collect();
        my_timers.sort_by_key(|t| t.order);
        let my_events: Vec<&str> = {
            let mut seen: Vec<&str> = Vec::new();
            for (_, event) in events.iter().filter(|(c, _)| mine(c)) {
                if !seen.contains(&event.as_str()) {
                    seen.push(event);
                }
            }
            seen
        };

        if let Some(winner) = my_timers.last() {
            if my_timers.len() > 1 {
                binding.notes.push(format!(
                    "{} timer sites update `{}`; the last declared one wins",
                    my_timers.len(),
                    cand.name
                ));
            }
            if !my_events.is_empty() {
                binding.notes.push(format!(
                    "event handler updates ({}) are dropped in favour of the timer",
                    my_events.join(", ")
                ));
            }
            binding.rule = self.timer_rule(&binding, winner, cand.name);
            return binding;
        }

        if let Some(site) = effects.iter().rfind(|c| mine(*c)) {
            binding.rule = match site.arg {
                Some(arg) if FnRef::of_expr(arg).is_none() => {
                    binding.depends_on = self.depends_on(arg, cand.name, names);
                    MutationRule::DerivedFromOther {
                        expr: ExprSlice::of(self.tree, arg),
                        site: DerivedSite::Effect,
                    }
                }
                Some(_) => MutationRule::Unclassified {
                    reason: "self-referential update inside an effect".to_owned(),
                },
                None => MutationRule::Unclassified {
                    reason: "effect calls the setter without a value".to_owned(),
                },
            };
            return binding;
        }

        if !my_events.is_empty() {
            binding.rule = MutationRule::EventHandler {
                events: my_events.into_iter().map(str::to_owned).collect(),
            };
            return binding;
        }

        if stray.iter().any(|c| mine(c)) {
            binding.rule = MutationRule::Unclassified {
                reason: format!("`{setter}` is called outside timers, effects and event handlers"),
            };
        }
        binding
    }

    fn timer_rule(&self, binding: &StateBinding, site: &TimerSite<'ast>, name: &str) -> MutationRule {
        let Some(arg) = site.call.arg else {
            return MutationRule::Unclassified {
                reason: "timer calls the setter without a value".to_owned(),
            };
        };
        match patterns::match_update(self.tree, arg, name, self.locals) {
            Ok(TimerUpdate::RecordMotion { .. })
                if binding.kind != BindingKind::CollectionOfRecords =>
            {
                MutationRule::Unclassified {
                    reason: "record update over an unrecognised collection".to_owned(),
                }
            }
            Ok(ref update)
                if !matches!(update, TimerUpdate::RecordMotion { .. })
                    && binding.kind != BindingKind::Scalar =>
            {
                MutationRule::Unclassified {
                    reason: "scalar update applied to a collection".to_owned(),
                }
            }
            Ok(update) => MutationRule::PeriodicTimer {
                interval_ms: site.interval_ms,
                update,
            },
            Err(reason) => MutationRule::Unclassified { reason },
        }
    }
}

/// Walk a function body with `v`.
fn walk_body<'ast, V: Visit<'ast>>(v: &mut V, func: FnRef<'ast>) {
    match func.body {
        component::FnBody::Block(stmts, _) => {
            for stmt in stmts {
                v.visit_stmt(stmt);
            }
        }
        component::FnBody::Expr(e) => v.visit_expr(e),
    }
}

/// `on*` JSX attributes with expression values.
#[derive(Default)]
struct EventAttrs<'ast> {
    found: Vec<(&'ast str, &'ast Expr)>,
}

impl<'ast> Visit<'ast> for EventAttrs<'ast> {
    fn visit_jsx(&mut self, el: &'ast JsxElement) {
        for attr in &el.attrs {
            if let JsxAttrKind::Named {
                name,
                value: Some(JsxAttrValue::Expr(e)),
            } = &attr.kind
                && is_event_attr(name)
            {
                self.found.push((name, e));
            }
        }
        walk_jsx(self, el);
    }
}

/// `onClick`, `onMouseMove`, ...
pub(crate) fn is_event_attr(name: &str) -> bool {
    name.strip_prefix("on")
        .and_then(|r| r.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}

/// Setter calls not nested inside another function.
/// Setter call sites of one component, grouped by how they are reached.
#[derive(Clone, Copy)]
struct Sites<'s, 'ast> {
    timers: &'s [TimerSite<'ast>],
    events: &'s [(SetterCall<'ast>, String)],
    effects: &'s [SetterCall<'ast>],
    seeds: &'s [SetterCall<'ast>],
    stray: &'s [SetterCall<'ast>],
}

fn shape_kind(shape: &CollectionShape) -> BindingKind {
    match shape.element {
        ElementShape::Record(_) => BindingKind::CollectionOfRecords,
        ElementShape::Value(_) => BindingKind::Collection,
    }
}

/// `true` when `cb` registers a timer or an event listener.
fn schedules_work(cb: FnRef<'_>) -> bool {
    let mut schedules = false;
    cb.each_expr(|inner| {
        if let ExprKind::Call { callee, .. } = &inner.kind
            && (timer_kind(callee).is_some()
                || matches!(&callee.kind, ExprKind::Member { prop: MemberProp::Ident(p), .. } if p.name == "addEventListener"))
        {
            schedules = true;
        }
    });
    schedules
}

struct DirectCalls<'s, 'ast> {
    setters: &'s HashSet<&'ast str>,
    found: Vec<SetterCall<'ast>>,
}

impl<'ast> Visit<'ast> for DirectCalls<'_, 'ast> {
    fn visit_function(&mut self, _func: &'ast Function) {}

    fn visit_expr(&mut self, expr: &'ast Expr) {
        match &expr.kind {
            ExprKind::Arrow(_) => {}
            ExprKind::Call { callee, args, .. } => {
                if let Some(setter) = callee.as_ident().and_then(|n| self.setters.get(n).copied()) {
                    self.found.push(SetterCall {
                        setter,
                        arg: args.first(),
                        span: expr.span,
                    });
                }
                walk_expr(self, expr);
            }
            _ => walk_expr(self, expr),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/classify/mod.rs"]
mod tests;
