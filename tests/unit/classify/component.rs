use super::*;
use crate::syntax::parse;

#[test]
fn finds_default_and_named_components() {
    let tree = parse(
        r#"
const Dot = ({ r }) => <circle r={r} />;
function helper() { return 1; }
const Panel = memo(function Panel() { const [a] = useState(0); return null; });
function App() { return <Dot r={2} />; }
export default App;
"#,
    )
    .unwrap();
    let comps = find_components(&tree);
    let names: Vec<_> = comps.iter().map(|c| c.name).collect();
    assert_eq!(names, [Some("Dot"), Some("Panel"), Some("App")]);
    assert_eq!(primary(&comps).and_then(|c| c.name), Some("App"));
}

#[test]
fn anonymous_default_arrow_is_primary() {
    let tree = parse("export default () => <div>hi</div>;").unwrap();
    let comps = find_components(&tree);
    assert_eq!(comps.len(), 1);
    assert!(comps[0].is_default);
    assert!(matches!(comps[0].func.body, FnBody::Expr(_)));
    assert!(comps[0].stmts().is_empty());
}

#[test]
fn capitalised_values_that_render_nothing_are_skipped() {
    let tree = parse("const Config = () => ({ speed: 2 }); const MAX = 3;").unwrap();
    assert!(find_components(&tree).is_empty());
}

#[test]
fn locals_fold_constants_and_resolve_callbacks() {
    let tree = parse(
        r#"
const FPS = 60;
const FRAME = 1000 / FPS;
const tick = useCallback(() => step(), []);
function step() {}
"#,
    )
    .unwrap();
    let locals = Locals::collect(&tree);
    let frame = parse("FRAME * 2;").unwrap();
    let StmtKind::Expr(e) = &frame.body[0].kind else {
        panic!("expected expression");
    };
    let v = locals.number(e).unwrap();
    assert!((v - 2000.0 / 60.0).abs() < 1e-9);
    assert!(locals.function("tick").is_some());
    assert!(locals.function("step").is_some());
    assert!(locals.function("FPS").is_none());
}

#[test]
fn timer_names_accept_window_prefix() {
    let tree = parse("window.setInterval(f, 10); requestAnimationFrame(g); other(h);").unwrap();
    let kinds: Vec<_> = tree
        .body
        .iter()
        .map(|s| match &s.kind {
            StmtKind::Expr(Expr {
                kind: ExprKind::Call { callee, .. },
                ..
            }) => timer_kind(callee),
            _ => None,
        })
        .collect();
    assert_eq!(
        kinds,
        [Some("setInterval"), Some("requestAnimationFrame"), None]
    );
}

#[test]
fn result_expr_reads_trailing_return() {
    let tree = parse("const f = () => { const a = 1; return a + 1; };").unwrap();
    let StmtKind::Var(decl) = &tree.body[0].kind else {
        panic!("expected var");
    };
    let func = FnRef::of_expr(decl.decls[0].init.as_ref().unwrap()).unwrap();
    assert_eq!(tree.text(func.result_expr().unwrap().span), "a + 1");
    assert_eq!(func.stmts().len(), 2);
}
