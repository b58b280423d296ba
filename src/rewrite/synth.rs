//! Closed-form frame expressions for classified bindings.

use std::f64::consts::TAU;

use crate::classify::{FieldMotion, FieldStep, TimerUpdate};
use crate::foundation::math::{fmt_num, hash_parts, is_integral, unit_range};

/// Field names treated as screen positions; these wobble around their base instead of
/// drifting off-screen.
const POSITION_FIELDS: &[&str] = &[
    "x", "y", "z", "cx", "cy", "left", "top", "right", "bottom", "posX", "posY", "offsetX",
    "offsetY", "translateX", "translateY",
];

pub(crate) fn is_position_field(name: &str) -> bool {
    POSITION_FIELDS.contains(&name)
}

/// Names and rates shared by every synthesized expression.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Synth<'a> {
    pub(crate) fps: f64,
    pub(crate) frame: &'a str,
}

impl Synth<'_> {
    /// Timer ticks elapsed per rendered frame.
    pub(crate) fn ticks_per_frame(&self, interval_ms: f64) -> f64 {
        if interval_ms <= 0.0 {
            return 1.0;
        }
        (1000.0 / self.fps) / interval_ms
    }

    /// `base + frame * rate`, with the sign folded into the operator.
    fn advance(&self, base: &str, base_num: Option<f64>, rate: f64) -> String {
        let term = if rate.abs() == 1.0 {
            self.frame.to_owned()
        } else {
            format!("{} * {}", self.frame, fmt_num(rate.abs()))
        };
        match base_num {
            Some(b) if b == 0.0 && rate >= 0.0 => term,
            _ => {
                let op = if rate < 0.0 { '-' } else { '+' };
                format!("{} {op} {term}", paren(base))
            }
        }
    }

    fn floor_if(&self, expr: String, floor: bool) -> String {
        if floor {
            format!("Math.floor({expr})")
        } else {
            expr
        }
    }

    /// Closed form of a scalar timer update.
    ///
    /// `base` is the rendered initial value; `base_num` is its numeric value when literal.
    pub(crate) fn scalar(
        &self,
        name: &str,
        base: &str,
        base_num: Option<f64>,
        interval_ms: f64,
        update: &TimerUpdate,
    ) -> Option<String> {
        let per_frame = self.ticks_per_frame(interval_ms);
        let integral = |step: f64| {
            base_num.is_some_and(is_integral) && is_integral(step) && !is_integral(step * per_frame)
        };
        let expr = match update {
            TimerUpdate::Linear { step } => {
                let rate = step * per_frame;
                self.floor_if(self.advance(base, base_num, rate), integral(*step))
            }
            TimerUpdate::Wrap { step, modulus } => {
                let rate = step * per_frame;
                let moved = self.floor_if(self.advance(base, base_num, rate), integral(*step));
                let m = fmt_num(modulus.abs());
                if rate < 0.0 {
                    format!("((({moved}) % {m}) + {m}) % {m}")
                } else {
                    format!("({moved}) % {m}")
                }
            }
            TimerUpdate::Bounded { step, lo, hi } => {
                let rate = step * per_frame;
                let span = fmt_num(hi - lo);
                let floor = integral(*step) && is_integral(*lo) && is_integral(*hi);
                if rate >= 0.0 {
                    let offset = match base_num {
                        Some(b) => fmt_num(b - lo),
                        None => format!("({base} - {})", fmt_num(*lo)),
                    };
                    let inner =
                        self.floor_if(self.advance(&offset, base_num.map(|b| b - lo), rate), floor);
                    if *lo == 0.0 {
                        format!("({inner}) % {span}")
                    } else {
                        format!("{} + (({inner}) % {span})", fmt_num(*lo))
                    }
                } else {
                    let offset = match base_num {
                        Some(b) => fmt_num(hi - b),
                        None => format!("({} - {base})", fmt_num(*hi)),
                    };
                    let inner =
                        self.floor_if(self.advance(&offset, base_num.map(|b| hi - b), -rate), floor);
                    format!("{} - (({inner}) % {span})", fmt_num(*hi))
                }
            }
            TimerUpdate::Clamped { step, limit } => {
                let rate = step * per_frame;
                let moved = self.floor_if(self.advance(base, base_num, rate), integral(*step));
                let f = if *step >= 0.0 { "Math.min" } else { "Math.max" };
                format!("{f}({moved}, {})", fmt_num(*limit))
            }
            TimerUpdate::Toggle => {
                let frames_per_tick = 1.0 / per_frame;
                let parity = if frames_per_tick <= 1.0 {
                    format!("{} % 2", self.frame)
                } else {
                    format!("Math.floor({} / {}) % 2", self.frame, fmt_num(frames_per_tick))
                };
                format!("{parity} === 0 ? {} : !{}", paren(base), paren(base))
            }
            TimerUpdate::Oscillate { amplitude } => {
                let freq = unit_range(hash_parts(&[name, "frequency"]), 0.03, 0.08);
                let phase = unit_range(hash_parts(&[name, "phase"]), 0.0, TAU);
                let wave = format!(
                    "{} * Math.sin({} * {} + {})",
                    fmt_num(*amplitude),
                    self.frame,
                    fmt_num(freq),
                    fmt_num(phase)
                );
                match base_num {
                    Some(b) if b == 0.0 => wave,
                    Some(b) => format!("{} + {wave}", fmt_num(b)),
                    None => wave,
                }
            }
            TimerUpdate::RecordMotion { .. } => return None,
        };
        Some(expr)
    }

    /// Motion term appended to one animated record field.
    ///
    /// `field_text` resolves another field's (already seeded) initializer, for steps that
    /// read a velocity field.
    pub(crate) fn field_motion(
        &self,
        binding: &str,
        index: &str,
        base: &str,
        motion: &FieldMotion,
        interval_ms: f64,
        field_text: impl Fn(&str) -> Option<String>,
    ) -> String {
        let per_frame = self.ticks_per_frame(interval_ms);
        if is_position_field(&motion.name) {
            let phase_step = unit_range(hash_parts(&[binding, motion.name.as_str(), "phase"]), 0.3, 1.7);
            let spread = unit_range(hash_parts(&[binding, motion.name.as_str(), "spread"]), 20.0, 60.0);
            return format!(
                "{} + Math.sin({} * 0.02 + {index} * {}) * {}",
                paren(base),
                self.frame,
                fmt_num(phase_step),
                fmt_num(spread.round())
            );
        }
        match &motion.step {
            Some(FieldStep::Constant(c)) => self.advance(base, None, c * per_frame),
            Some(FieldStep::Field { name, sign }) => match field_text(name) {
                Some(velocity) => {
                    let rate = sign * per_frame;
                    let op = if rate < 0.0 { '-' } else { '+' };
                    let scale = if rate.abs() == 1.0 {
                        String::new()
                    } else {
                        format!(" * {}", fmt_num(rate.abs()))
                    };
                    format!("{} {op} {} * {}{scale}", paren(base), self.frame, paren(&velocity))
                }
                None => self.advance(base, None, per_frame),
            },
            None => self.advance(base, None, per_frame),
        }
    }
}

/// Wrap `text` in parentheses unless it is a plain identifier, member chain or number.
pub(crate) fn paren(text: &str) -> String {
    let trimmed = text.trim();
    let simple = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'));
    if simple || is_wrapped(trimmed) {
        trimmed.to_owned()
    } else {
        format!("({trimmed})")
    }
}

/// `true` when the outer parentheses enclose the whole text.
fn is_wrapped(text: &str) -> bool {
    if !(text.starts_with('(') && text.ends_with(')')) {
        return false;
    }
    let mut depth = 0i32;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 && i != text.len() - 1 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Object key for a record field: bare when it is an identifier, quoted otherwise.
pub(crate) fn js_key(name: &str) -> String {
    let mut chars = name.chars();
    let ident = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if ident {
        name.to_owned()
    } else {
        serde_json::to_string(name).unwrap_or_else(|_| format!("\"{name}\""))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/rewrite/synth.rs"]
mod tests;
