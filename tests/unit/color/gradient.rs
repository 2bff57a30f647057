use super::*;

fn two_stop() -> Gradient {
    Gradient::new([
        ColorStop::new(0.0, Rgb8::new(0, 100, 255)),
        ColorStop::new(1.0, Rgb8::new(255, 0, 55)),
    ])
    .unwrap()
}

fn uneven() -> Gradient {
    Gradient::new([
        ColorStop::new(0.1, Rgb8::new(255, 248, 220)),
        ColorStop::new(0.3, Rgb8::new(255, 158, 24)),
        ColorStop::new(0.85, Rgb8::new(139, 35, 35)),
        ColorStop::new(1.0, Rgb8::new(122, 31, 31)),
    ])
    .unwrap()
}

#[test]
fn rejects_invalid_stop_lists() {
    assert!(Gradient::new([ColorStop::new(0.0, Rgb8::new(0, 0, 0))]).is_err());
    assert!(
        Gradient::new([
            ColorStop::new(0.5, Rgb8::new(0, 0, 0)),
            ColorStop::new(0.5, Rgb8::new(1, 1, 1)),
        ])
        .is_err()
    );
    assert!(
        Gradient::new([
            ColorStop::new(0.0, Rgb8::new(0, 0, 0)),
            ColorStop::new(1.5, Rgb8::new(1, 1, 1)),
        ])
        .is_err()
    );
    assert!(
        Gradient::new([
            ColorStop::new(f64::NAN, Rgb8::new(0, 0, 0)),
            ColorStop::new(1.0, Rgb8::new(1, 1, 1)),
        ])
        .is_err()
    );
}

#[test]
fn exact_at_every_stop() {
    let g = uneven();
    for s in g.stops() {
        let c = g.color_at(s.position, 0.3);
        assert_eq!(c.rgb(), s.color);
    }
}

#[test]
fn clamps_progress_outside_unit_interval() {
    let g = uneven();
    assert_eq!(g.rgb_at(-3.0), g.stops()[0].color);
    assert_eq!(g.rgb_at(0.0), g.stops()[0].color);
    assert_eq!(g.rgb_at(42.0), g.stops()[3].color);
    assert_eq!(g.rgb_at(f64::NAN), g.stops()[0].color);
}

#[test]
fn midpoint_is_linear_interpolation() {
    let g = two_stop();
    let c = g.color_at(0.5, 1.0);
    assert_eq!((c.r, c.g, c.b, c.a), (128, 50, 155, 255));

    let c = g.color_at(0.25, 0.5);
    assert_eq!((c.r, c.g, c.b), (64, 75, 205));
    assert_eq!(c.a, 128);
}

#[test]
fn sweep_stays_in_range_and_between_neighbours() {
    let g = uneven();
    for i in 0..=1000 {
        let p = i as f64 / 1000.0;
        let c = g.rgb_at(p);
        let hi_idx = g
            .stops()
            .partition_point(|s| s.position <= p)
            .clamp(1, g.stops().len() - 1);
        let (lo, hi) = (g.stops()[hi_idx - 1].color, g.stops()[hi_idx].color);
        for (v, a, b) in [(c.r, lo.r, hi.r), (c.g, lo.g, hi.g), (c.b, lo.b, hi.b)] {
            assert!(v >= a.min(b) && v <= a.max(b), "p={p}");
        }
    }
}

#[test]
fn json_roundtrip_validates() {
    let g = uneven();
    let json = serde_json::to_string(&g).unwrap();
    let back: Gradient = serde_json::from_str(&json).unwrap();
    assert_eq!(back, g);

    let bad = r#"[{"position":0.0,"color":{"r":0,"g":0,"b":0}}]"#;
    assert!(serde_json::from_str::<Gradient>(bad).is_err());
}
