use super::*;

#[test]
fn fnv_is_stable_across_calls() {
    assert_eq!(hash_parts(&["particles", "x"]), hash_parts(&["particles", "x"]));
    assert_ne!(hash_parts(&["ab", "c"]), hash_parts(&["a", "bc"]));
}

#[test]
fn fnv_default_matches_offset_basis() {
    assert_eq!(Fnv1a64::new_default().finish(), Fnv1a64::OFFSET_BASIS);
    let mut h = Fnv1a64::new_default();
    h.write_str("");
    assert_ne!(h.finish(), Fnv1a64::OFFSET_BASIS);
}

#[test]
fn salt_is_positive_and_bounded() {
    for name in ["a", "b", "particles", "stars", "x"] {
        let s = salt_for(&[name]);
        assert!((1..=9973).contains(&s));
    }
}

#[test]
fn unit_range_stays_in_bounds() {
    for seed in [0u64, 1, u64::MAX, 0xdead_beef] {
        let v = unit_range(seed, 0.2, 0.9);
        assert!((0.2..0.9).contains(&v), "{v}");
    }
}

#[test]
fn fmt_num_trims_and_rounds() {
    assert_eq!(fmt_num(3.0), "3");
    assert_eq!(fmt_num(-2.0), "-2");
    assert_eq!(fmt_num(2.083_333_33), "2.0833");
    assert_eq!(fmt_num(0.5), "0.5");
    assert_eq!(fmt_num(f64::NAN), "0");
}

#[test]
fn integral_detection() {
    assert!(is_integral(4.0));
    assert!(!is_integral(4.5));
    assert!(!is_integral(f64::INFINITY));
}
