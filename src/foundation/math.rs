#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    pub(crate) const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new_default() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    pub(crate) fn write_str(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
        // Separator so ("ab","c") and ("a","bc") hash differently.
        self.write_bytes(&[0xff]);
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

/// Stable hash of a sequence of string parts.
pub(crate) fn hash_parts(parts: &[&str]) -> u64 {
    let mut h = Fnv1a64::new_default();
    for p in parts {
        h.write_str(p);
    }
    h.finish()
}

/// Small positive integer salt for emitted `seededRandom(i, salt)` calls.
pub(crate) fn salt_for(parts: &[&str]) -> u32 {
    (hash_parts(parts) % 9973) as u32 + 1
}

/// Map a hash into `[lo, hi)`.
pub(crate) fn unit_range(hash: u64, lo: f64, hi: f64) -> f64 {
    let unit = (hash >> 11) as f64 / (1u64 << 53) as f64;
    lo + unit * (hi - lo)
}

/// Format a number for emission into generated source.
///
/// Integral values print without a fraction, everything else is rounded to 4 decimals with
/// trailing zeros trimmed. Non-finite values collapse to `0`.
pub(crate) fn fmt_num(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_owned();
    }
    let rounded = (v * 10_000.0).round() / 10_000.0;
    if rounded == rounded.trunc() && rounded.abs() < 1e15 {
        return format!("{}", rounded as i64);
    }
    let mut s = format!("{rounded:.4}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}

pub(crate) fn is_integral(v: f64) -> bool {
    v.is_finite() && v == v.trunc()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
