use super::*;
use smallvec::smallvec;

fn spec() -> RibbonSpec {
    RibbonSpec {
        id: "r0".to_string(),
        start_delay_ms: 0.0,
        amplitude: 0.1,
        frequencies: smallvec![1.5, 2.7],
        phase: 0.0,
        wave_speed: 1.0,
        stroke_width: 2.0,
        length_fraction: 0.4,
        baseline: 0.5,
        tilt: 0.0,
        palette_offset: 0.0,
        homing: false,
    }
}

#[test]
fn progress_is_monotone_and_freezes() {
    let mut s = RibbonState::default();
    s.advance_to(0.3);
    s.advance_to(0.1);
    assert_eq!(s.progress(), 0.3);
    s.advance_to(7.0);
    assert_eq!(s.progress(), 1.0);

    let mut s = RibbonState::default();
    s.advance_to(0.6);
    s.freeze(2.0);
    s.advance_to(0.9);
    s.freeze(5.0);
    assert_eq!(s.progress(), 0.6);
    assert_eq!(
        s.frozen(),
        Some(FrozenFlow {
            progress: 0.6,
            time_s: 2.0
        })
    );
}

#[test]
fn validate_checks_waveform() {
    assert!(spec().validate().is_ok());
    let mut s = spec();
    s.frequencies = smallvec![2.0];
    assert!(s.validate().is_err());
    let mut s = spec();
    s.frequencies = smallvec![2.0, 2.0];
    assert!(s.validate().is_err());
    let mut s = spec();
    s.length_fraction = 0.0;
    assert!(s.validate().is_err());
    let mut s = spec();
    s.stroke_width = -1.0;
    assert!(s.validate().is_err());
}
