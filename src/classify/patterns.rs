//! Shape matchers for periodic updates and collection initializers.

use std::collections::HashMap;

use crate::classify::component::{FnRef, Locals, pattern_name};
use crate::classify::{
    CollectionShape, ElementShape, ExprSlice, FieldMotion, FieldStep, RecordField, TimerUpdate,
};
use crate::syntax::ast::*;

/// Largest collection the rewriter will expand into a comprehension.
const MAX_COLLECTION_LEN: f64 = 10_000.0;

fn is_ident(e: &Expr, name: &str) -> bool {
    e.unwrap_parens().as_ident() == Some(name)
}

fn snippet(tree: &StructuralTree, e: &Expr) -> String {
    let text = tree.text(e.span);
    let mut out: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if out.len() > 60 {
        let mut cut = 57;
        while !out.is_char_boundary(cut) {
            cut -= 1;
        }
        out.truncate(cut);
        out.push_str("...");
    }
    out
}

/// Match the argument of a setter call made from a periodic callback.
///
/// `arg` is either a functional update (`p => p + 1`) or a direct value that refers to the
/// binding by name (`count + 1`).
pub(crate) fn match_update(
    tree: &StructuralTree,
    arg: &Expr,
    binding: &str,
    locals: &Locals<'_>,
) -> Result<TimerUpdate, String> {
    if let Some(func) = FnRef::of_expr(arg) {
        let param = func
            .param_name(0)
            .ok_or_else(|| "functional update without a named parameter".to_owned())?;
        let body = func
            .result_expr()
            .ok_or_else(|| "functional update without a single result expression".to_owned())?;
        return match_shape(tree, body, param, locals);
    }
    match_shape(tree, arg, binding, locals)
}

fn match_shape(
    tree: &StructuralTree,
    expr: &Expr,
    cur: &str,
    locals: &Locals<'_>,
) -> Result<TimerUpdate, String> {
    let e = expr.unwrap_parens();
    if let Some(step) = step_of(e, cur, locals) {
        return Ok(TimerUpdate::Linear { step });
    }
    let matched = match &e.kind {
        ExprKind::Binary {
            op: "%",
            left,
            right,
        } => match (step_of(left, cur, locals), locals.number(right)) {
            (Some(step), Some(modulus)) if modulus != 0.0 => {
                Some(TimerUpdate::Wrap { step, modulus })
            }
            _ => None,
        },
        ExprKind::Binary {
            op: "*",
            left,
            right,
        } => {
            if is_trig(left) {
                locals.number(right).map(|amplitude| TimerUpdate::Oscillate { amplitude })
            } else if is_trig(right) {
                locals.number(left).map(|amplitude| TimerUpdate::Oscillate { amplitude })
            } else {
                None
            }
        }
        ExprKind::Cond { test, cons, alt } => cond_shape(test, cons, alt, cur, locals),
        ExprKind::Unary { op: "!", arg } if is_ident(arg, cur) => Some(TimerUpdate::Toggle),
        ExprKind::Call { callee, args, .. } => {
            match callee.dotted_name().as_deref() {
                Some("Math.min") | Some("Math.max") if args.len() == 2 => {
                    let is_min = callee.dotted_name().as_deref() == Some("Math.min");
                    clamp_shape(&args[0], &args[1], is_min, cur, locals)
                        .or_else(|| clamp_shape(&args[1], &args[0], is_min, cur, locals))
                }
                Some("Math.sin" | "Math.cos") => Some(TimerUpdate::Oscillate { amplitude: 1.0 }),
                _ => match &callee.kind {
                    ExprKind::Member {
                        object,
                        prop: MemberProp::Ident(p),
                        ..
                    } if p.name == "map" && is_ident(object, cur) => {
                        return args
                            .first()
                            .ok_or_else(|| "map without a callback".to_owned())
                            .and_then(|cb| record_motion(tree, cb, locals));
                    }
                    _ => None,
                },
            }
        }
        _ => None,
    };
    matched.ok_or_else(|| format!("unrecognised update `{}`", snippet(tree, e)))
}

/// `cur + c`, `c + cur`, `cur - c`.
fn step_of(expr: &Expr, cur: &str, locals: &Locals<'_>) -> Option<f64> {
    match &expr.unwrap_parens().kind {
        ExprKind::Binary {
            op: "+",
            left,
            right,
        } => {
            if is_ident(left, cur) {
                locals.number(right)
            } else if is_ident(right, cur) {
                locals.number(left)
            } else {
                None
            }
        }
        ExprKind::Binary {
            op: "-",
            left,
            right,
        } if is_ident(left, cur) => locals.number(right).map(|v| -v),
        _ => None,
    }
}

fn is_trig(expr: &Expr) -> bool {
    match &expr.unwrap_parens().kind {
        ExprKind::Call { callee, .. } => {
            matches!(callee.dotted_name().as_deref(), Some("Math.sin" | "Math.cos"))
        }
        _ => false,
    }
}

fn clamp_shape(
    moving: &Expr,
    limit: &Expr,
    is_min: bool,
    cur: &str,
    locals: &Locals<'_>,
) -> Option<TimerUpdate> {
    let step = step_of(moving, cur, locals)?;
    let limit = locals.number(limit)?;
    // min() caps a rising value, max() floors a falling one.
    (is_min == (step > 0.0)).then_some(TimerUpdate::Clamped { step, limit })
}

fn threshold(test: &Expr, cur: &str, locals: &Locals<'_>) -> Option<f64> {
    let ExprKind::Binary { op, left, right } = &test.unwrap_parens().kind else {
        return None;
    };
    if !matches!(*op, ">" | ">=" | "<" | "<=") {
        return None;
    }
    let moving = |e: &Expr| is_ident(e, cur) || step_of(e, cur, locals).is_some();
    if moving(left.as_ref()) {
        locals.number(right)
    } else if moving(right.as_ref()) {
        locals.number(left)
    } else {
        None
    }
}

fn cond_shape(
    test: &Expr,
    cons: &Expr,
    alt: &Expr,
    cur: &str,
    locals: &Locals<'_>,
) -> Option<TimerUpdate> {
    if is_ident(test, cur)
        && matches!(cons.unwrap_parens().kind, ExprKind::Bool(false))
        && matches!(alt.unwrap_parens().kind, ExprKind::Bool(true))
    {
        return Some(TimerUpdate::Toggle);
    }
    let limit = threshold(test, cur, locals)?;
    let (step, reset) = match (step_of(alt, cur, locals), step_of(cons, cur, locals)) {
        (Some(step), _) => (step, locals.number(cons)?),
        (None, Some(step)) => (step, locals.number(alt)?),
        (None, None) => return None,
    };
    let (lo, hi) = (reset.min(limit), reset.max(limit));
    (hi > lo).then_some(TimerUpdate::Bounded { step, lo, hi })
}

fn record_motion(
    tree: &StructuralTree,
    callback: &Expr,
    locals: &Locals<'_>,
) -> Result<TimerUpdate, String> {
    let func = FnRef::of_expr(callback).ok_or_else(|| "map callback is not a function".to_owned())?;
    let rec = func
        .param_name(0)
        .ok_or_else(|| "map callback without a named record parameter".to_owned())?;
    let body = func
        .result_expr()
        .ok_or_else(|| "map callback without a single result expression".to_owned())?;
    let ExprKind::Object(props) = &body.unwrap_parens().kind else {
        return Err(format!(
            "map callback returns `{}`, not a record",
            snippet(tree, body)
        ));
    };
    let mut fields = Vec::new();
    for prop in props {
        if let PropKind::KeyValue { key, value } = &prop.kind
            && let Some(name) = key.name()
        {
            fields.push(FieldMotion {
                name: name.to_owned(),
                step: field_step(value, rec, name, locals),
            });
        }
    }
    if fields.is_empty() {
        return Err("record update assigns no fields".to_owned());
    }
    Ok(TimerUpdate::RecordMotion { fields })
}

fn is_field(expr: &Expr, rec: &str, field: &str) -> bool {
    matches!(
        &expr.unwrap_parens().kind,
        ExprKind::Member { object, prop: MemberProp::Ident(p), .. }
            if p.name == field && is_ident(object, rec)
    )
}

fn field_name<'a>(expr: &'a Expr, rec: &str) -> Option<&'a str> {
    match &expr.unwrap_parens().kind {
        ExprKind::Member {
            object,
            prop: MemberProp::Ident(p),
            ..
        } if is_ident(object, rec) => Some(&p.name),
        _ => None,
    }
}

fn field_step(value: &Expr, rec: &str, field: &str, locals: &Locals<'_>) -> Option<FieldStep> {
    match &value.unwrap_parens().kind {
        ExprKind::Binary { op, left, right } if matches!(*op, "+" | "-") => {
            let sign = if *op == "-" { -1.0 } else { 1.0 };
            let other = if is_field(left, rec, field) {
                right
            } else if *op == "+" && is_field(right, rec, field) {
                left
            } else {
                return None;
            };
            if let Some(v) = locals.number(other) {
                Some(FieldStep::Constant(sign * v))
            } else {
                field_name(other, rec).map(|name| FieldStep::Field {
                    name: name.to_owned(),
                    sign,
                })
            }
        }
        ExprKind::Binary { op: "%", left, .. } => field_step(left, rec, field, locals),
        ExprKind::Cond { cons, alt, .. } => field_step(alt, rec, field, locals)
            .or_else(|| field_step(cons, rec, field, locals)),
        _ => None,
    }
}

/// Numbers bound to generator parameters for one call.
type Env<'a> = HashMap<&'a str, f64>;

fn count_of(expr: &Expr, env: &Env<'_>, locals: &Locals<'_>) -> Option<usize> {
    let v = env_number(expr, env, locals)?;
    (v.is_finite() && v >= 0.0 && v <= MAX_COLLECTION_LEN).then_some(v.floor() as usize)
}

/// Recognise a collection initializer and describe its elements.
pub(crate) fn collection_shape(
    tree: &StructuralTree,
    init: &Expr,
    locals: &Locals<'_>,
) -> Option<CollectionShape> {
    shape_of_value(tree, init, &Env::new(), locals, 0)
}

fn env_number(expr: &Expr, env: &Env<'_>, locals: &Locals<'_>) -> Option<f64> {
    match expr.unwrap_parens().as_ident().and_then(|n| env.get(n)) {
        Some(v) => Some(*v),
        None => locals.number(expr),
    }
}

fn shape_of_value(
    tree: &StructuralTree,
    expr: &Expr,
    env: &Env<'_>,
    locals: &Locals<'_>,
    depth: usize,
) -> Option<CollectionShape> {
    if depth > 4 {
        return None;
    }
    let e = expr.unwrap_parens();
    if let Some(func) = FnRef::of_expr(e) {
        // Lazy initializer.
        if !func.params.is_empty() {
            return None;
        }
        return shape_of_fn(tree, func, &[], env, locals, depth + 1);
    }
    match &e.kind {
        ExprKind::Call { callee, args, .. } => {
            if let Some(func) = callee.as_ident().and_then(|n| locals.function(n)) {
                return shape_of_fn(tree, func, args, env, locals, depth + 1);
            }
        }
        ExprKind::Ident(i) => {
            if let Some(func) = locals.function(&i.name) {
                return shape_of_fn(tree, func, &[], env, locals, depth + 1);
            }
        }
        _ => {}
    }
    shape_of_expr(tree, e, env, locals)
}

fn shape_of_fn(
    tree: &StructuralTree,
    func: FnRef<'_>,
    args: &[Expr],
    outer: &Env<'_>,
    locals: &Locals<'_>,
    depth: usize,
) -> Option<CollectionShape> {
    let mut env = Env::new();
    for (idx, param) in func.params.iter().enumerate() {
        let Some(name) = pattern_name(param) else {
            continue;
        };
        let value = match (args.get(idx), &param.kind) {
            (Some(arg), _) => env_number(arg, outer, locals),
            (None, PatKind::Default { value, .. }) => locals.number(value),
            _ => None,
        };
        if let Some(v) = value {
            env.insert(name, v);
        }
    }
    let result = func.result_expr()?;
    if let Some(shape) = shape_of_value(tree, result, &env, locals, depth) {
        return Some(shape);
    }
    let arr = result.unwrap_parens().as_ident()?;
    func.stmts()
        .iter()
        .find_map(|stmt| push_loop_shape(tree, stmt, arr, &env, locals))
}

fn shape_of_expr(
    tree: &StructuralTree,
    expr: &Expr,
    env: &Env<'_>,
    locals: &Locals<'_>,
) -> Option<CollectionShape> {
    let ExprKind::Call { callee, args, .. } = &expr.unwrap_parens().kind else {
        return None;
    };
    if callee.dotted_name().as_deref() == Some("Array.from") && args.len() == 2 {
        let count = length_prop(&args[0], env, locals)
            .or_else(|| array_len(&args[0], env, locals))?;
        return element_shape(tree, &args[1], count);
    }
    match &callee.kind {
        ExprKind::Member {
            object,
            prop: MemberProp::Ident(p),
            ..
        } if p.name == "map" => {
            let count = array_len(object, env, locals)?;
            element_shape(tree, args.first()?, count)
        }
        _ => None,
    }
}

/// `{ length: N }`.
fn length_prop(expr: &Expr, env: &Env<'_>, locals: &Locals<'_>) -> Option<usize> {
    let ExprKind::Object(props) = &expr.unwrap_parens().kind else {
        return None;
    };
    props.iter().find_map(|p| match &p.kind {
        PropKind::KeyValue { key, value } if key.name() == Some("length") => {
            count_of(value, env, locals)
        }
        _ => None,
    })
}

/// Length of an array-producing expression: `Array(N)`, `new Array(N).fill(0)`,
/// `[...Array(N)]`, `Array.from({ length: N })`, `Array(N).keys()`.
fn array_len(expr: &Expr, env: &Env<'_>, locals: &Locals<'_>) -> Option<usize> {
    match &expr.unwrap_parens().kind {
        ExprKind::Call { callee, args, .. } | ExprKind::New { callee, args } => {
            if callee.as_ident() == Some("Array") && args.len() == 1 {
                return count_of(&args[0], env, locals);
            }
            if callee.dotted_name().as_deref() == Some("Array.from") && args.len() == 1 {
                return length_prop(&args[0], env, locals)
                    .or_else(|| array_len(&args[0], env, locals));
            }
            match &callee.kind {
                ExprKind::Member {
                    object,
                    prop: MemberProp::Ident(p),
                    ..
                } if matches!(p.name.as_str(), "fill" | "keys") => array_len(object, env, locals),
                _ => None,
            }
        }
        ExprKind::Array(elems) => match elems.as_slice() {
            [Some(Expr { kind: ExprKind::Spread(inner), .. })] => array_len(inner, env, locals),
            _ => None,
        },
        _ => None,
    }
}

fn element_shape(tree: &StructuralTree, callback: &Expr, count: usize) -> Option<CollectionShape> {
    let func = FnRef::of_expr(callback)?;
    // Statements before the return would bind locals the fields depend on.
    if func.stmts().len() > 1 {
        return None;
    }
    let result = func.result_expr()?;
    Some(CollectionShape {
        count,
        index: func.param_name(1).map(str::to_owned),
        element: element_of(tree, result)?,
    })
}

fn element_of(tree: &StructuralTree, value: &Expr) -> Option<ElementShape> {
    let ExprKind::Object(props) = &value.unwrap_parens().kind else {
        return Some(ElementShape::Value(ExprSlice::of(tree, value)));
    };
    let mut fields = Vec::with_capacity(props.len());
    for prop in props {
        match &prop.kind {
            PropKind::KeyValue { key, value } => fields.push(RecordField {
                name: key.name()?.to_owned(),
                value: ExprSlice::of(tree, value),
            }),
            // Shorthand, spread and method entries depend on surrounding locals.
            _ => return None,
        }
    }
    Some(ElementShape::Record(fields))
}

/// `for (let i = 0; i < N; i++) arr.push(rec);`
fn push_loop_shape(
    tree: &StructuralTree,
    stmt: &Stmt,
    arr: &str,
    env: &Env<'_>,
    locals: &Locals<'_>,
) -> Option<CollectionShape> {
    let StmtKind::For {
        init: Some(ForInit::Var(decl)),
        test: Some(test),
        body,
        ..
    } = &stmt.kind
    else {
        return None;
    };
    let index = pattern_name(&decl.decls.first()?.pattern)?;
    let ExprKind::Binary { op, left, right } = &test.unwrap_parens().kind else {
        return None;
    };
    if !is_ident(left, index) {
        return None;
    }
    let count = match *op {
        "<" => count_of(right, env, locals)?,
        "<=" => count_of(right, env, locals)? + 1,
        _ => return None,
    };
    let inner = match &body.kind {
        StmtKind::Block(stmts) if stmts.len() == 1 => &stmts[0],
        _ => body.as_ref(),
    };
    let StmtKind::Expr(call) = &inner.kind else {
        return None;
    };
    let ExprKind::Call { callee, args, .. } = &call.kind else {
        return None;
    };
    let ExprKind::Member {
        object,
        prop: MemberProp::Ident(p),
        ..
    } = &callee.kind
    else {
        return None;
    };
    if p.name != "push" || !is_ident(object, arr) || args.len() != 1 {
        return None;
    }
    Some(CollectionShape {
        count,
        index: Some(index.to_owned()),
        element: element_of(tree, &args[0])?,
    })
}
