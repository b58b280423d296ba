use super::*;

const SYNTH: Synth<'static> = Synth {
    fps: 30.0,
    frame: "frame",
};

fn scalar(base: &str, interval: f64, update: TimerUpdate) -> Option<String> {
    SYNTH.scalar("v", base, base.parse().ok(), interval, &update)
}

#[test]
fn linear_counter_floors_fractional_rates() {
    assert_eq!(
        scalar("0", 16.0, TimerUpdate::Linear { step: 1.0 }).unwrap(),
        "Math.floor(frame * 2.0833)"
    );
    assert_eq!(
        scalar("10", 1000.0 / 30.0, TimerUpdate::Linear { step: -1.0 }).unwrap(),
        "10 - frame"
    );
}

#[test]
fn wrap_with_negative_rate_stays_positive() {
    assert_eq!(
        scalar(
            "0",
            1000.0 / 30.0,
            TimerUpdate::Wrap {
                step: -3.0,
                modulus: 360.0
            }
        )
        .unwrap(),
        "(((0 - frame * 3) % 360) + 360) % 360"
    );
}

#[test]
fn bounded_and_clamped_ranges() {
    assert_eq!(
        scalar(
            "0",
            50.0,
            TimerUpdate::Bounded {
                step: 5.0,
                lo: 0.0,
                hi: 400.0
            }
        )
        .unwrap(),
        "(Math.floor(frame * 3.3333)) % 400"
    );
    assert_eq!(
        scalar(
            "100",
            1000.0 / 30.0,
            TimerUpdate::Clamped {
                step: -1.0,
                limit: 0.0
            }
        )
        .unwrap(),
        "Math.max(100 - frame, 0)"
    );
}

#[test]
fn toggle_flips_once_per_tick() {
    assert_eq!(
        scalar("false", 500.0, TimerUpdate::Toggle).unwrap(),
        "Math.floor(frame / 15) % 2 === 0 ? false : !false"
    );
}

#[test]
fn oscillation_is_stable_per_name() {
    let a = scalar("0", 16.0, TimerUpdate::Oscillate { amplitude: 40.0 }).unwrap();
    let b = scalar("0", 16.0, TimerUpdate::Oscillate { amplitude: 40.0 }).unwrap();
    assert_eq!(a, b);
    assert!(a.starts_with("40 * Math.sin(frame * 0.0"), "{a}");
}

#[test]
fn record_motion_has_no_scalar_form() {
    assert!(scalar("[]", 16.0, TimerUpdate::RecordMotion { fields: vec![] }).is_none());
}

#[test]
fn position_fields_wobble_around_their_base() {
    let motion = FieldMotion {
        name: "x".into(),
        step: Some(FieldStep::Field {
            name: "vx".into(),
            sign: 1.0,
        }),
    };
    let out = SYNTH.field_motion("dots", "i", "seededRandom(i, 4) * 800", &motion, 16.0, |_| None);
    assert!(out.starts_with("(seededRandom(i, 4) * 800) + Math.sin(frame * 0.02 + i * "), "{out}");
    assert!(is_position_field("cy"));
    assert!(!is_position_field("hue"));
}

#[test]
fn other_fields_advance_linearly() {
    let constant = FieldMotion {
        name: "hue".into(),
        step: Some(FieldStep::Constant(2.0)),
    };
    assert_eq!(
        SYNTH.field_motion("dots", "i", "10", &constant, 1000.0 / 30.0, |_| None),
        "10 + frame * 2"
    );

    let by_field = FieldMotion {
        name: "angle".into(),
        step: Some(FieldStep::Field {
            name: "spin".into(),
            sign: 1.0,
        }),
    };
    let out = SYNTH.field_motion("dots", "i", "0", &by_field, 1000.0 / 30.0, |name| {
        (name == "spin").then(|| "3".to_owned())
    });
    assert_eq!(out, "0 + frame * 3");
}

#[test]
fn paren_and_keys() {
    assert_eq!(paren("a.b"), "a.b");
    assert_eq!(paren("a + b"), "(a + b)");
    assert_eq!(paren("(a + b)"), "(a + b)");
    assert_eq!(paren("(a) + (b)"), "((a) + (b))");
    assert_eq!(js_key("vx"), "vx");
    assert_eq!(js_key("data-id"), "\"data-id\"");
}
