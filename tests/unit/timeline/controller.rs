use std::cell::Cell;
use std::rc::Rc;

use super::*;

fn config() -> TimelineConfig {
    TimelineConfig {
        lead_in_ms: 100.0,
        flow_ms: 1000.0,
        homing_ms: 500.0,
        settle_ms: 400.0,
        reveal_at_ms: Some(1500.0),
    }
}

fn counting_callbacks() -> (Callbacks, Rc<Cell<u32>>, Rc<Cell<u32>>) {
    let reveals = Rc::new(Cell::new(0));
    let completes = Rc::new(Cell::new(0));
    let (r, c) = (reveals.clone(), completes.clone());
    let cb = Callbacks::new()
        .on_reveal(move || r.set(r.get() + 1))
        .on_complete(move || c.set(c.get() + 1));
    (cb, reveals, completes)
}

#[test]
fn thresholds_resolve_last_passed_phase() {
    let t = config().thresholds();
    assert_eq!(resolve_phase(&t, -5.0), Phase::Idle);
    assert_eq!(resolve_phase(&t, 0.0), Phase::Idle);
    assert_eq!(resolve_phase(&t, 99.9), Phase::Idle);
    assert_eq!(resolve_phase(&t, 100.0), Phase::Flowing);
    assert_eq!(resolve_phase(&t, 1100.0), Phase::Homing);
    assert_eq!(resolve_phase(&t, 1600.0), Phase::Settling);
    assert_eq!(resolve_phase(&t, 2000.0), Phase::Done);
    assert_eq!(resolve_phase(&t, 1e9), Phase::Done);
}

#[test]
fn zero_lead_in_starts_flowing_immediately() {
    let cfg = TimelineConfig {
        lead_in_ms: 0.0,
        ..config()
    };
    assert_eq!(resolve_phase(&cfg.thresholds(), 0.0), Phase::Flowing);
}

#[test]
fn phase_never_reverts_even_if_clock_steps_back() {
    let mut c = TimelineController::new(config(), Callbacks::new()).unwrap();
    c.start(1000.0);
    let samples = [1000.0, 1500.0, 2300.0, 1200.0, 900.0, 2700.0, 2650.0, 2600.0];
    let mut prev = Phase::Idle;
    let mut prev_elapsed = 0.0;
    for now in samples {
        let t = c.tick(now, || {});
        assert!(t.phase >= prev, "reverted at now={now}");
        assert!(t.elapsed_ms >= prev_elapsed);
        prev = t.phase;
        prev_elapsed = t.elapsed_ms;
    }
    assert_eq!(prev, Phase::Settling);
}

#[test]
fn reveal_fires_once_for_one_big_step() {
    let (cb, reveals, _) = counting_callbacks();
    let mut c = TimelineController::new(config(), cb).unwrap();
    c.start(0.0);
    assert!(!c.tick(10.0, || {}).revealed);
    let t = c.tick(1700.0, || {});
    assert!(t.revealed);
    assert!(!c.tick(1800.0, || {}).revealed);
    assert_eq!(reveals.get(), 1);
}

#[test]
fn reveal_fires_once_for_many_small_steps() {
    let (cb, reveals, _) = counting_callbacks();
    let mut c = TimelineController::new(config(), cb).unwrap();
    c.start(0.0);
    let mut fired_at = None;
    let mut now = 0.0;
    while now < 1900.0 {
        if c.tick(now, || {}).revealed {
            assert!(fired_at.is_none());
            fired_at = Some(now);
        }
        now += 3.0;
    }
    assert_eq!(reveals.get(), 1);
    assert!(fired_at.unwrap() >= 1500.0 && fired_at.unwrap() < 1503.0);
}

#[test]
fn terminal_persists_before_completion_and_stops() {
    let (cb, reveals, completes) = counting_callbacks();
    let mut c = TimelineController::new(config(), cb).unwrap();
    c.start(0.0);

    let order = Rc::new(Cell::new(0u32));
    let seen_completes = completes.clone();
    let o = order.clone();
    // One step across both reveal and terminal thresholds.
    let t = c.tick(5000.0, move || {
        assert_eq!(seen_completes.get(), 0, "persist runs before on_complete");
        o.set(o.get() + 1);
    });
    assert_eq!(t.phase, Phase::Done);
    assert!(t.revealed && t.completed);
    assert_eq!(t.schedule, Schedule::Stop);
    assert_eq!(order.get(), 1);
    assert_eq!((reveals.get(), completes.get()), (1, 1));

    let again = c.tick(6000.0, || panic!("terminal hook must not rerun"));
    assert_eq!(again.schedule, Schedule::Stop);
    assert!(!again.completed);
    assert_eq!(completes.get(), 1);
}

#[test]
fn cancel_suppresses_further_callbacks() {
    let (cb, reveals, completes) = counting_callbacks();
    let mut c = TimelineController::new(config(), cb).unwrap();
    c.tick(0.0, || {});
    c.cancel();
    let t = c.tick(10_000.0, || panic!("cancelled controller must not finish"));
    assert_eq!(t.schedule, Schedule::Stop);
    assert_eq!(t.phase, Phase::Idle);
    assert_eq!((reveals.get(), completes.get()), (0, 0));
}

#[test]
fn sub_phase_fractions() {
    let mut c = TimelineController::new(config(), Callbacks::new()).unwrap();
    c.start(0.0);
    c.tick(600.0, || {});
    assert_eq!(c.flow_fraction(), 0.5);
    assert_eq!(c.homing_fraction(), 0.0);
    c.tick(1350.0, || {});
    assert_eq!(c.flow_fraction(), 1.0);
    assert_eq!(c.homing_fraction(), 0.5);
    assert_eq!(c.fade_fraction(), 250.0 / 900.0);
    c.tick(1800.0, || {});
    assert_eq!(c.settle_fraction(), 0.5);
}

#[test]
fn validation_rejects_bad_timelines() {
    assert!(config().validate().is_ok());
    assert!(TimelineConfig::default().validate().is_ok());
    let bad = TimelineConfig {
        flow_ms: 0.0,
        ..config()
    };
    assert!(bad.validate().is_err());
    let bad = TimelineConfig {
        reveal_at_ms: Some(2000.0),
        ..config()
    };
    assert!(bad.validate().is_err(), "reveal must precede the terminal threshold");
    let bad = TimelineConfig {
        lead_in_ms: -1.0,
        ..config()
    };
    assert!(bad.validate().is_err());
    assert!(TimelineController::new(bad, Callbacks::new()).is_err());
}

#[test]
fn skip_reveals_once_and_never_completes() {
    let (cb, reveals, completes) = counting_callbacks();
    let mut c = TimelineController::new(config(), cb).unwrap();
    assert!(c.skip());
    assert!(!c.skip());
    assert!(c.is_stopped());
    assert!(c.callbacks().has_revealed());

    let t = c.tick(10_000.0, || panic!("terminal hook must not run after skip"));
    assert_eq!(t.schedule, Schedule::Stop);
    assert_eq!((reveals.get(), completes.get()), (1, 0));
}

#[test]
fn non_finite_first_timestamp_does_not_pin_start() {
    let (cb, reveals, completes) = counting_callbacks();
    let mut c = TimelineController::new(config(), cb).unwrap();
    let t = c.tick(f64::NAN, || {});
    assert_eq!(t.phase, Phase::Idle);
    assert_eq!(t.schedule, Schedule::Continue);
    assert_eq!(c.tick(f64::INFINITY, || {}).schedule, Schedule::Continue);

    c.tick(1_000_000.0, || {});
    let done = c.tick(1_003_000.0, || {});
    assert_eq!(done.phase, Phase::Done);
    assert_eq!(done.schedule, Schedule::Stop);
    assert_eq!((reveals.get(), completes.get()), (1, 1));
}
