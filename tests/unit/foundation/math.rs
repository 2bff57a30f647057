use super::*;

#[test]
fn rng_is_deterministic() {
    let mut a = Rng64::new(123);
    let mut b = Rng64::new(123);
    for _ in 0..10 {
        assert_eq!(a.next_u64(), b.next_u64());
    }
}

#[test]
fn samples_stay_in_unit_interval() {
    let mut rng = Rng64::new(7);
    for _ in 0..1000 {
        let v = rng.next_f64();
        assert!((0.0..1.0).contains(&v));
    }
}

#[test]
fn range_and_chance_edges() {
    let mut rng = Rng64::new(9);
    assert_eq!(rng.range(3.0, 3.0), 3.0);
    assert_eq!(rng.range(5.0, 1.0), 5.0);
    for _ in 0..100 {
        let v = rng.range(-2.0, 2.0);
        assert!((-2.0..2.0).contains(&v));
        assert!(!rng.chance(0.0));
        assert!(rng.chance(1.0));
    }
}

#[test]
fn clamp01_handles_nan_and_bounds() {
    assert_eq!(clamp01(f64::NAN), 0.0);
    assert_eq!(clamp01(-1.0), 0.0);
    assert_eq!(clamp01(2.0), 1.0);
    assert_eq!(clamp01(0.25), 0.25);
    assert_eq!(lerp(10.0, 20.0, 0.5), 15.0);
}
