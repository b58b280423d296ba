use super::*;
use crate::classify::classify;
use crate::syntax::parse;

fn run(src: &str) -> RewriteResult {
    let tree = parse(src).unwrap();
    let bindings = classify(&tree);
    rewrite(&tree, &bindings)
}

#[test]
fn interval_counter_becomes_frame_expression() {
    let out = run(
        r#"import React, { useState, useEffect } from 'react';

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
    assert_eq!(
        out.output_text,
        r#"import React, { useState, useEffect } from 'react';
import { useCurrentFrame } from 'remotion';

export default function Counter() {
  const frame = useCurrentFrame();
  const count = Math.floor(frame * 2.0833);
  return <div>{count}</div>;
}
"#
    );
    assert_eq!(out.confidence, 1.0);
    assert_eq!(out.substitutions.len(), 1);
    assert_eq!(out.substitutions[0].binding_name, "count");
    assert!(!out.output_text.contains("setInterval"));
}

#[test]
fn particle_records_become_seeded_comprehension() {
    let out = run(
        r#"import { useState, useEffect } from 'react';

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
      setParticles(prev => prev.map(p => ({ ...p, x: p.x + p.vx, y: p.y + p.vy })));
    }, 16);
    return () => clearInterval(id);
  }, []);
  return (
    <svg>
      {particles.map((p, i) => <circle key={i} cx={p.x} cy={p.y} r={p.size} fill={p.color} />)}
    </svg>
  );
}
"#,
    );
    let text = &out.output_text;
    assert!(text.contains("Array.from({ length: 20 }, (_, i) => ({"), "{text}");
    for field in ["x:", "y:", "vx:", "vy:", "size:", "color:"] {
        assert!(text.contains(field), "missing {field}");
    }
    assert!(!text.contains("Math.random"), "{text}");
    assert!(!text.contains("setInterval"));
    assert!(text.contains("seededRandom(i, "));
    assert!(text.contains("const seededRandom = (index: number, salt: number): number =>"));
    assert!(text.contains("const frame = useCurrentFrame();"));
    assert!(text.contains("Math.sin(frame * 0.02 + i * "));
    assert_eq!(out.confidence, 1.0);
}

#[test]
fn collections_seeded_on_mount_are_generated_in_place() {
    let out = run(
        r#"export default function Dots() {
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
    let text = &out.output_text;
    assert!(text.contains("const dots = Array.from({ length: 30 }, (_, i) => ({"), "{text}");
    assert!(!text.contains("useState([])"));
    assert!(!text.contains("useEffect"));
    assert!(!text.contains("Math.random"));
    assert!(text.contains("vx: "));
    assert_eq!(out.confidence, 1.0);
}

#[test]
fn event_bindings_freeze_and_keep_a_setter_stub() {
    let out = run(
        r#"export default function Panel() {
  const [open, setOpen] = useState(false);
  const toggle = () => setOpen(o => !o);
  return <div onClick={toggle}>{open ? 'yes' : 'no'}</div>;
}
"#,
    );
    let text = &out.output_text;
    assert!(
        text.contains("const open = false, setOpen = (..._args: unknown[]) => {};"),
        "{text}"
    );
    assert!(text.contains("<div>{open"));
    assert!(!text.contains("useCurrentFrame"));
    assert_eq!(out.notes.len(), 1);
    assert!(out.notes[0].contains("onClick"));
    assert!(out.substitutions[0].note.is_some());
}

#[test]
fn residual_entropy_uses_indices_and_frame_time() {
    let out = run(
        r#"const seed = Math.random();
export default function Stars() {
  const stars = [1, 2, 3].map((s, k) => Math.random() * s);
  const t = Date.now();
  return <i>{stars.length + t + seed}</i>;
}
"#,
    );
    let text = &out.output_text;
    assert!(text.contains("const seed = seededRandom(0, "), "{text}");
    assert!(text.contains("=> seededRandom(k, "));
    assert!(text.contains("const t = (frame * 1000 / 30);"));
    assert!(text.contains("const frame = useCurrentFrame();"));
    assert!(!text.contains("Math.random"));
    assert_eq!(out.confidence, 1.0);
}

#[test]
fn expression_bodied_components_gain_a_block() {
    let out = run("const Clock = () => <span>{Date.now()}</span>;\nexport default Clock;\n");
    assert_eq!(
        out.output_text,
        "import { useCurrentFrame } from 'remotion';\n\nconst Clock = () => {\n  const frame = useCurrentFrame();\n  return <span>{(frame * 1000 / 30)}</span>;\n};\nexport default Clock;\n"
    );
}

#[test]
fn existing_frame_binding_is_reused() {
    let out = run(
        r#"import { useCurrentFrame } from 'remotion';
export default function A() {
  const f = useCurrentFrame();
  const [n, setN] = useState(0);
  useEffect(() => { const id = setInterval(() => setN(v => v + 1), 1000 / 30); return () => clearInterval(id); }, []);
  return <b>{n + f}</b>;
}
"#,
    );
    let text = &out.output_text;
    assert!(text.contains("const n = f;"), "{text}");
    assert_eq!(text.matches("useCurrentFrame()").count(), 1);
    assert_eq!(text.matches("import { useCurrentFrame }").count(), 1);
}

#[test]
fn memos_inline_their_value() {
    let out = run(
        r#"export default function L() {
  const [count] = useState(3);
  const label = useMemo(() => `${count}!`, [count]);
  return <p>{label}</p>;
}
"#,
    );
    assert!(out.output_text.contains("const count = 3;"));
    assert!(out.output_text.contains("const label = `${count}!`;"));
    assert_eq!(out.substitutions.len(), 2);
}

#[test]
fn unclassified_bindings_stay_and_lower_confidence() {
    let out = run(
        r#"export default function Log() {
  const [theme] = useState('dark');
  const [items, setItems] = useState([]);
  useEffect(() => { setInterval(() => setItems(prev => [...prev, prev.length]), 500); }, []);
  return <ul className={theme}>{items.length}</ul>;
}
"#,
    );
    assert!(out.output_text.contains("const [items, setItems] = useState([]);"));
    assert!(out.output_text.contains("const theme = 'dark';"));
    assert_eq!(out.confidence, 0.5);
    assert!(out.notes.iter().any(|n| n.contains("left as written")));
}

#[test]
fn mount_calls_are_removed_and_default_export_added() {
    let out = run(
        r#"import ReactDOM from 'react-dom/client';
function App() { return <div />; }
const root = ReactDOM.createRoot(document.getElementById('root'));
root.render(<App />);
"#,
    );
    let text = &out.output_text;
    assert!(!text.contains("createRoot"), "{text}");
    assert!(!text.contains("root.render"));
    assert!(text.ends_with("export default App;\n"));
}

#[test]
fn lone_timer_bodies_become_empty_blocks() {
    let out = run(
        r#"export default function T({ go }) {
  const [n] = useState(1);
  function start() {
    if (go) setTimeout(() => {}, 10);
  }
  return <p>{n}</p>;
}
"#,
    );
    assert!(out.output_text.contains("if (go) {}"), "{}", out.output_text);
}

#[test]
fn rewriting_is_deterministic() {
    let src = "export default function R() { const [v] = useState(() => Math.random()); return <i>{v}</i>; }";
    let a = run(src);
    let b = run(src);
    assert_eq!(a.output_text, b.output_text);
    assert_eq!(a.fingerprint, b.fingerprint);
}

#[test]
fn placeholder_is_a_parseable_component() {
    let text = placeholder("chart \"v2\"");
    assert!(text.contains("AbsoluteFill"));
    assert!(text.contains(r#"{"chart \"v2\""}"#));
    assert!(parse(&text).is_ok());
}
