use super::*;
use crate::syntax::parse;

fn bindings(src: &str) -> Vec<StateBinding> {
    classify(&parse(src).unwrap())
}

fn only(src: &str) -> StateBinding {
    let mut out = bindings(src);
    assert_eq!(out.len(), 1, "{out:#?}");
    out.remove(0)
}

fn timer(src: &str) -> (f64, TimerUpdate) {
    match only(src).rule {
        MutationRule::PeriodicTimer {
            interval_ms,
            update,
        } => (interval_ms, update),
        other => panic!("expected periodic timer, got {other:?}"),
    }
}

#[test]
fn interval_increment_is_linear() {
    let (interval, update) = timer(
        r#"
export default function Counter() {
  const [count, setCount] = useState(0);
  useEffect(() => {
    const id = setInterval(() => setCount(c => c + 1), 16);
    return () => clearInterval(id);
  }, []);
  return <div>{count}</div>;
}
"#,
    );
    assert_eq!(interval, 16.0);
    assert_eq!(update, TimerUpdate::Linear { step: 1.0 });
}

#[test]
fn direct_updates_and_named_constants_resolve() {
    let (interval, update) = timer(
        r#"
const STEP = 2;
const TICK = 1000 / 10;
function Meter() {
  const [level, setLevel] = useState(10);
  useEffect(() => {
    const t = setInterval(() => { setLevel(level - STEP); }, TICK);
    return () => clearInterval(t);
  });
  return <span>{level}</span>;
}
export default Meter;
"#,
    );
    assert_eq!(interval, 100.0);
    assert_eq!(update, TimerUpdate::Linear { step: -2.0 });
}

#[test]
fn wrap_bounded_clamped_and_toggle_shapes() {
    let cases = [
        ("(a + 3) % 360", TimerUpdate::Wrap { step: 3.0, modulus: 360.0 }),
        (
            "a + 5 > 400 ? 0 : a + 5",
            TimerUpdate::Bounded { step: 5.0, lo: 0.0, hi: 400.0 },
        ),
        (
            "a < 100 ? a + 1 : 0",
            TimerUpdate::Bounded { step: 1.0, lo: 0.0, hi: 100.0 },
        ),
        ("Math.min(a + 2, 50)", TimerUpdate::Clamped { step: 2.0, limit: 50.0 }),
        ("Math.max(a - 1, 0)", TimerUpdate::Clamped { step: -1.0, limit: 0.0 }),
        ("!a", TimerUpdate::Toggle),
        ("Math.sin(Date.now() / 500) * 40", TimerUpdate::Oscillate { amplitude: 40.0 }),
    ];
    for (body, expected) in cases {
        let src = format!(
            "export default function A() {{\n  const [v, setV] = useState(0);\n  useEffect(() => {{ setInterval(() => setV(a => {body}), 50); }}, []);\n  return <i>{{v}}</i>;\n}}"
        );
        let (_, update) = timer(&src);
        assert_eq!(update, expected, "{body}");
    }
}

#[test]
fn animation_frame_loops_use_frame_interval() {
    let (interval, update) = timer(
        r#"
export default function Spinner() {
  const [angle, setAngle] = useState(0);
  useEffect(() => {
    let raf;
    const loop = () => {
      setAngle(a => a + 4);
      raf = requestAnimationFrame(loop);
    };
    raf = requestAnimationFrame(loop);
    return () => cancelAnimationFrame(raf);
  }, []);
  return <div style={{ transform: `rotate(${angle}deg)` }} />;
}
"#,
    );
    assert!((interval - 1000.0 / 60.0).abs() < 1e-9);
    assert_eq!(update, TimerUpdate::Linear { step: 4.0 });
}

#[test]
fn last_declared_timer_wins_and_is_noted() {
    let b = only(
        r#"
export default function Two() {
  const [n, setN] = useState(0);
  useEffect(() => { setInterval(() => setN(v => v + 1), 100); }, []);
  useEffect(() => { setInterval(() => setN(v => v + 5), 200); }, []);
  return <p>{n}</p>;
}
"#,
    );
    assert_eq!(
        b.rule,
        MutationRule::PeriodicTimer {
            interval_ms: 200.0,
            update: TimerUpdate::Linear { step: 5.0 },
        }
    );
    assert_eq!(b.notes.len(), 1);
    assert!(b.notes[0].contains("last declared"));
}

#[test]
fn event_handlers_inline_and_by_reference() {
    let out = bindings(
        r#"
export default function Panel() {
  const [open, setOpen] = useState(false);
  const [clicks, setClicks] = useState(0);
  const toggle = () => setOpen(o => !o);
  return (
    <div onMouseEnter={toggle} onMouseLeave={toggle}>
      <button onClick={() => setClicks(clicks + 1)}>{clicks}</button>
    </div>
  );
}
"#,
    );
    assert_eq!(out.len(), 2);
    assert_eq!(
        out[0].rule,
        MutationRule::EventHandler {
            events: vec!["onMouseEnter".into(), "onMouseLeave".into()],
        }
    );
    assert_eq!(
        out[1].rule,
        MutationRule::EventHandler {
            events: vec!["onClick".into()],
        }
    );
}

#[test]
fn effects_and_memos_derive_from_other_bindings() {
    let out = bindings(
        r#"
export default function Derived() {
  const [count, setCount] = useState(1);
  const [double, setDouble] = useState(0);
  useEffect(() => {
    setDouble(count * 2);
  }, [count]);
  const label = useMemo(() => `${count} / ${double}`, [count, double]);
  return <b onClick={() => setCount(count + 1)}>{label}</b>;
}
"#,
    );
    assert_eq!(out.len(), 3);
    let MutationRule::DerivedFromOther { expr, site } = &out[1].rule else {
        panic!("expected derived, got {:?}", out[1].rule);
    };
    assert_eq!(expr.text, "count * 2");
    assert_eq!(*site, DerivedSite::Effect);
    assert_eq!(out[1].depends_on.as_slice(), ["count"]);

    assert_eq!(out[2].name, "label");
    assert!(out[2].setter.is_none());
    assert!(matches!(
        out[2].rule,
        MutationRule::DerivedFromOther {
            site: DerivedSite::Memo,
            ..
        }
    ));
    assert_eq!(out[2].depends_on.as_slice(), ["count", "double"]);
}

#[test]
fn untouched_state_is_constant() {
    let b = only("export default function C() { const [theme] = useState('dark'); return <div className={theme} />; }");
    assert_eq!(b.rule, MutationRule::Constant);
    assert_eq!(b.initial.text, "'dark'");
    assert!(b.setter.is_none());
}

#[test]
fn unknown_shapes_degrade_to_unclassified() {
    let b = only(
        r#"
export default function Log() {
  const [items, setItems] = useState([]);
  useEffect(() => { setInterval(() => setItems(prev => [...prev, prev.length]), 500); }, []);
  return <ul>{items.map(i => <li key={i}>{i}</li>)}</ul>;
}
"#,
    );
    assert_eq!(b.kind, BindingKind::Collection);
    let MutationRule::Unclassified { reason } = &b.rule else {
        panic!("expected unclassified, got {:?}", b.rule);
    };
    assert!(reason.contains("unrecognised update"), "{reason}");
}

#[test]
fn setter_called_from_async_work_is_unclassified() {
    let b = only(
        r#"
export default function Fetcher() {
  const [data, setData] = useState(null);
  useEffect(() => { fetch('/x').then(r => r.json()).then(d => setData(d)); }, []);
  return <pre>{String(data)}</pre>;
}
"#,
    );
    assert!(matches!(b.rule, MutationRule::Unclassified { .. }), "{:?}", b.rule);
}

#[test]
fn particle_records_and_their_motion() {
    let b = only(
        r#"
export default function Particles() {
  const [particles, setParticles] = useState(() =>
    Array.from({ length: 20 }, (_, i) => ({
      x: Math.random() * 800,
      y: Math.random() * 600,
      vx: (Math.random() - 0.5) * 2,
      vy: (Math.random() - 0.5) * 2,
      size: 2 + Math.random() * 4,
      color: `hsl(${i * 18}, 80%, 60%)`,
    }))
  );
  useEffect(() => {
    const id = setInterval(() => {
      setParticles(prev => prev.map(p => ({ ...p, x: p.x + p.vx, y: p.y - p.vy })));
    }, 16);
    return () => clearInterval(id);
  }, []);
  return <svg>{particles.map((p, i) => <circle key={i} cx={p.x} cy={p.y} r={p.size} fill={p.color} />)}</svg>;
}
"#,
    );
    assert_eq!(b.kind, BindingKind::CollectionOfRecords);
    let shape = b.collection.as_ref().unwrap();
    assert_eq!(shape.count, 20);
    assert_eq!(shape.index.as_deref(), Some("i"));
    let ElementShape::Record(fields) = &shape.element else {
        panic!("expected records");
    };
    let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["x", "y", "vx", "vy", "size", "color"]);

    let MutationRule::PeriodicTimer {
        update: TimerUpdate::RecordMotion { fields },
        ..
    } = &b.rule
    else {
        panic!("expected record motion, got {:?}", b.rule);
    };
    assert_eq!(fields.len(), 2);
    assert_eq!(
        fields[1].step,
        Some(FieldStep::Field {
            name: "vy".into(),
            sign: -1.0,
        })
    );
}

#[test]
fn record_motion_applies_only_to_record_collections() {
    let records = only(
        r#"
function Swarm() {
  const [bees, setBees] = useState(() => Array.from({ length: 5 }, () => ({ x: 0, dx: 1 })));
  useEffect(() => {
    setInterval(() => setBees(prev => prev.map(b => ({ ...b, x: b.x + b.dx }))), 40);
  }, []);
  return <g>{bees.length}</g>;
}
"#,
    );
    assert_eq!(records.kind, BindingKind::CollectionOfRecords);
    assert!(
        matches!(
            records.rule,
            MutationRule::PeriodicTimer {
                update: TimerUpdate::RecordMotion { .. },
                interval_ms,
            } if interval_ms == 40.0
        ),
        "{:?}",
        records.rule
    );

    let list = only(
        r#"
function Ticks() {
  const [ticks, setTicks] = useState([1, 2, 3]);
  useEffect(() => {
    setInterval(() => setTicks(t => t + 1), 40);
  }, []);
  return <g>{ticks.length}</g>;
}
"#,
    );
    assert_eq!(list.kind, BindingKind::Collection);
    assert!(
        matches!(&list.rule, MutationRule::Unclassified { reason } if reason.contains("scalar update")),
        "{:?}",
        list.rule
    );
}

#[test]
fn mount_effect_seeds_an_empty_collection() {
    let b = only(
        r#"
export default function Dots() {
  const [dots, setDots] = useState([]);
  useEffect(() => {
    setDots(Array.from({ length: 30 }, () => ({
      x: Math.random() * 400,
      y: Math.random() * 300,
      vx: Math.random() - 0.5,
    })));
    const id = setInterval(() => {
      setDots(prev => prev.map(d => ({ ...d, x: d.x + d.vx })));
    }, 16);
    return () => clearInterval(id);
  }, []);
  return <svg>{dots.map((d, i) => <circle key={i} cx={d.x} cy={d.y} r={2} />)}</svg>;
}
"#,
    );
    assert_eq!(b.initial.text, "[]");
    assert_eq!(b.kind, BindingKind::CollectionOfRecords);
    let shape = b.collection.as_ref().unwrap();
    assert_eq!(shape.count, 30);
    let ElementShape::Record(fields) = &shape.element else {
        panic!("expected records");
    };
    let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["x", "y", "vx"]);
    let MutationRule::PeriodicTimer {
        update: TimerUpdate::RecordMotion { fields },
        ..
    } = &b.rule
    else {
        panic!("expected record motion, got {:?}", b.rule);
    };
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name, "x");
    assert_eq!(b.notes.len(), 1);
    assert!(b.notes[0].contains("mount effect"));
}

#[test]
fn seeds_outside_mount_effects_are_ignored() {
    let b = only(
        r#"
export default function Dots({ n }) {
  const [dots, setDots] = useState([]);
  useEffect(() => {
    setDots(Array.from({ length: 3 }, () => ({ x: 1, vx: 1 })));
    const id = setInterval(() => setDots(prev => prev.map(d => ({ ...d, x: d.x + d.vx }))), 16);
    return () => clearInterval(id);
  }, [n]);
  return <svg>{dots.length}</svg>;
}
"#,
    );
    assert_eq!(b.kind, BindingKind::Collection);
    assert!(b.collection.is_none());
    assert!(matches!(b.rule, MutationRule::Unclassified { .. }), "{:?}", b.rule);
}

#[test]
fn generator_functions_with_push_loops() {
    let b = only(
        r#"
const makeStars = (count) => {
  const stars = [];
  for (let k = 0; k < count; k++) {
    stars.push({ x: Math.random(), twinkle: Math.random() > 0.5 });
  }
  return stars;
};
export default function Sky() {
  const [stars] = useState(() => makeStars(50));
  return <div>{stars.length}</div>;
}
"#,
    );
    assert_eq!(b.kind, BindingKind::CollectionOfRecords);
    let shape = b.collection.unwrap();
    assert_eq!(shape.count, 50);
    assert_eq!(shape.index.as_deref(), Some("k"));
    assert_eq!(b.rule, MutationRule::Constant);
}

#[test]
fn array_fill_map_forms() {
    for init in [
        "Array(8).fill(0).map((_, i) => i * 2)",
        "[...Array(8)].map((_, i) => i * 2)",
        "new Array(8).fill(null).map((_, i) => i * 2)",
    ] {
        let src = format!("export default function F() {{ const [xs] = useState({init}); return <i>{{xs[0]}}</i>; }}");
        let b = only(&src);
        assert_eq!(b.kind, BindingKind::Collection, "{init}");
        let shape = b.collection.unwrap();
        assert_eq!(shape.count, 8);
        assert!(matches!(shape.element, ElementShape::Value(ref v) if v.text == "i * 2"));
    }
}

#[test]
fn modules_without_components_yield_nothing() {
    assert!(bindings("const a = 1; function helper() { return a; }").is_empty());
}

#[test]
fn bindings_serialize_with_rule_tags() {
    let b = only("export default function C() { const [n, setN] = useState(0); return <a onClick={() => setN(1)}>{n}</a>; }");
    let json = serde_json::to_value(&b).unwrap();
    assert_eq!(json["rule"]["rule"], "event_handler");
    assert_eq!(json["kind"], "scalar");
}
