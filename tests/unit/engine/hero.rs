use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::foundation::core::{Coord, Point};
use crate::playback::gate::{DEFAULT_STORAGE_KEY, PLAYED_VALUE};
use crate::playback::storage::{DisabledStorage, MemoryStorage};
use crate::render::record::{DrawCommand, RecordingSurface};
use crate::synth::curve::RibbonMode;
use crate::timeline::controller::TimelineConfig;

#[derive(Debug, Default)]
struct HostLog {
    requested: Vec<FrameToken>,
    cancelled: Vec<FrameToken>,
    listeners: Vec<ListenerId>,
    removed: Vec<ListenerId>,
}

#[derive(Clone, Default)]
struct LoggingHost(Rc<RefCell<HostLog>>);

impl FrameHost for LoggingHost {
    fn request_frame(&mut self) -> FrameToken {
        let mut log = self.0.borrow_mut();
        let token = FrameToken(log.requested.len() as u64 + 1);
        log.requested.push(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        self.0.borrow_mut().cancelled.push(token);
    }

    fn add_resize_listener(&mut self) -> ListenerId {
        let mut log = self.0.borrow_mut();
        let id = ListenerId(log.listeners.len() as u64 + 1);
        log.listeners.push(id);
        id
    }

    fn remove_resize_listener(&mut self, id: ListenerId) {
        self.0.borrow_mut().removed.push(id);
    }
}

fn fast_config() -> ChoreographyConfig {
    ChoreographyConfig {
        timeline: TimelineConfig {
            lead_in_ms: 100.0,
            flow_ms: 1000.0,
            homing_ms: 500.0,
            settle_ms: 400.0,
            reveal_at_ms: None,
        },
        ..ChoreographyConfig::default()
    }
}

fn surface() -> RecordingSurface {
    RecordingSurface::new(Canvas::new(320, 200).unwrap())
}

type Events = Rc<RefCell<Vec<&'static str>>>;

fn logging_callbacks() -> (Callbacks, Events) {
    let events: Events = Rc::default();
    let (r, c) = (events.clone(), events.clone());
    let cb = Callbacks::new()
        .on_reveal(move || r.borrow_mut().push("reveal"))
        .on_complete(move || c.borrow_mut().push("complete"));
    (cb, events)
}

fn run_to_end(engine: &mut HeroEngine<RecordingSurface>) -> Vec<Phase> {
    let mut phases = Vec::new();
    let mut now = 0.0;
    while engine.tick(now) == Schedule::Continue {
        phases.push(engine.phase());
        now += 16.0;
        assert!(now < 10_000.0, "loop never terminated");
    }
    phases.push(engine.phase());
    phases
}

#[test]
fn played_session_skips_pipeline_and_reveals_immediately() {
    let mut storage = MemoryStorage::new();
    storage.set(DEFAULT_STORAGE_KEY, PLAYED_VALUE).unwrap();
    let host = LoggingHost::default();
    let (cb, events) = logging_callbacks();

    let mut engine = HeroEngine::mount(
        fast_config(),
        Some(surface()),
        MountOptions::new(storage)
            .with_host(host.clone())
            .with_callbacks(cb),
    )
    .unwrap();

    assert_eq!(engine.status(), EngineStatus::Skipped);
    assert_eq!(*events.borrow(), vec!["reveal"]);
    assert!(host.0.borrow().requested.is_empty());
    assert_eq!(engine.tick(0.0), Schedule::Stop);
    assert_eq!(engine.tick(5000.0), Schedule::Stop);
    assert_eq!(engine.stats(), PipelineStats::default());
    assert!(engine.surface().unwrap().commands().is_empty());
    assert_eq!(*events.borrow(), vec!["reveal"]);
}

#[test]
fn missing_surface_is_inert_but_reveals() {
    let (cb, events) = logging_callbacks();
    let storage = MemoryStorage::new();
    let mut engine = HeroEngine::<RecordingSurface>::mount(
        fast_config(),
        None,
        MountOptions::new(storage.clone()).with_callbacks(cb),
    )
    .unwrap();
    assert_eq!(engine.status(), EngineStatus::Inert);
    assert_eq!(engine.tick(100.0), Schedule::Stop);
    assert_eq!(engine.stats().ticks, 0);
    assert_eq!(*events.borrow(), vec!["reveal"]);
    assert!(storage.is_empty(), "an inert mount does not count as played");
}

#[test]
fn full_run_is_ordered_and_persists_before_completing() {
    let storage = MemoryStorage::new();
    let seen_on_complete: Rc<RefCell<Option<String>>> = Rc::default();
    let events: Events = Rc::default();
    let (r, c, seen, store) = (
        events.clone(),
        events.clone(),
        seen_on_complete.clone(),
        storage.clone(),
    );
    let cb = Callbacks::new()
        .on_reveal(move || r.borrow_mut().push("reveal"))
        .on_complete(move || {
            c.borrow_mut().push("complete");
            *seen.borrow_mut() = store.get(DEFAULT_STORAGE_KEY).unwrap();
        });

    let mut engine = HeroEngine::mount(
        fast_config(),
        Some(surface()),
        MountOptions::new(storage.clone()).with_callbacks(cb),
    )
    .unwrap();
    let phases = run_to_end(&mut engine);

    assert!(phases.windows(2).all(|w| w[0] <= w[1]));
    for p in [Phase::Flowing, Phase::Homing, Phase::Settling, Phase::Done] {
        assert!(phases.contains(&p), "{p:?} never observed");
    }
    assert_eq!(*events.borrow(), vec!["reveal", "complete"]);
    assert_eq!(seen_on_complete.borrow().as_deref(), Some(PLAYED_VALUE));
    assert_eq!(engine.status(), EngineStatus::Complete);
    assert!(engine.stats().spawns > 0);

    // The final frame leaves a clean canvas.
    assert_eq!(
        engine.surface().unwrap().commands(),
        &[DrawCommand::Clear, DrawCommand::Present]
    );
    assert!(engine.particles().is_empty());

    // Ticks after completion do nothing.
    let stats = engine.stats();
    assert_eq!(engine.tick(99_999.0), Schedule::Stop);
    assert_eq!(engine.stats(), stats);

    // A later mount in the same session skips.
    let again =
        HeroEngine::mount(fast_config(), Some(surface()), MountOptions::new(storage)).unwrap();
    assert_eq!(again.status(), EngineStatus::Skipped);
    assert!(again.has_revealed());
}

#[test]
fn progress_is_monotone_and_freezes_after_flowing() {
    let mut engine =
        HeroEngine::mount(fast_config(), Some(surface()), MountOptions::new(MemoryStorage::new()))
            .unwrap();
    let mut last = vec![0.0; engine.config().ribbons.len()];
    let mut now = 0.0;
    while now < 1100.0 {
        engine.tick(now);
        for (prev, state) in last.iter_mut().zip(engine.ribbon_states()) {
            assert!(state.progress() >= *prev);
            *prev = state.progress();
        }
        now += 20.0;
    }
    // Flowing ends at 1100ms; every ribbon reaches the end of its path.
    engine.tick(1100.0);
    assert_eq!(engine.phase(), Phase::Homing);
    for state in engine.ribbon_states() {
        let frozen = state.frozen().unwrap();
        assert_eq!(frozen.progress, 1.0);
        assert_eq!(frozen.time_s, 1.1);
    }
}

#[test]
fn homing_ribbon_spirals_then_vanishes_while_others_fade() {
    let mut engine =
        HeroEngine::mount(fast_config(), Some(surface()), MountOptions::new(MemoryStorage::new()))
            .unwrap();
    engine.tick(0.0);
    engine.tick(1350.0);
    assert_eq!(engine.phase(), Phase::Homing);
    let frames = engine.ribbon_frames();
    match frames[0].mode {
        RibbonMode::Homing {
            progress,
            orbit_radius,
            ..
        } => {
            assert_eq!(progress, 0.5);
            assert!((orbit_radius - 45.0).abs() < 1e-9);
        }
        other => panic!("expected homing frame, got {other:?}"),
    }
    assert_eq!(frames[0].opacity, 0.5);
    // Others fade across homing and settling: 250ms of 900ms.
    assert!((frames[1].opacity - (1.0 - 250.0 / 900.0)).abs() < 1e-12);
    assert!(frames[1].is_drawable());

    engine.tick(1600.0);
    assert_eq!(engine.phase(), Phase::Settling);
    assert!(engine.ribbon_frames()[0].points.is_empty());
}

#[test]
fn homing_head_ends_at_the_anchor() {
    let config = ChoreographyConfig {
        anchor: crate::engine::config::Anchor {
            x: Coord::Fraction(0.25),
            y: Coord::Fraction(0.5),
        },
        ..fast_config()
    };
    let mut engine =
        HeroEngine::mount(config, Some(surface()), MountOptions::new(MemoryStorage::new()))
            .unwrap();
    engine.tick(0.0);
    engine.tick(1350.0);
    let RibbonMode::Homing { reference, .. } = engine.ribbon_frames()[0].mode else {
        panic!("expected homing");
    };
    let anchor = Point::new(80.0, 100.0);
    assert!(reference.distance(anchor) > 1.0, "halfway is still in transit");

    engine.tick(1600.0);
    let RibbonMode::Homing { reference, .. } = engine.ribbon_frames()[0].mode else {
        panic!("expected homing");
    };
    assert!(reference.distance(anchor) < 1e-9);
}

#[test]
fn unmount_cancels_pending_frame_and_listener() {
    let host = LoggingHost::default();
    let mut engine = HeroEngine::mount(
        fast_config(),
        Some(surface()),
        MountOptions::new(MemoryStorage::new()).with_host(host.clone()),
    )
    .unwrap();
    assert_eq!(engine.tick(0.0), Schedule::Continue);
    engine.unmount();
    engine.unmount();

    {
        let log = host.0.borrow();
        assert_eq!(log.requested.len(), 2);
        assert_eq!(log.cancelled, vec![FrameToken(2)]);
        assert_eq!(log.removed, log.listeners);
    }
    assert_eq!(engine.status(), EngineStatus::Unmounted);
    assert_eq!(engine.tick(16.0), Schedule::Stop);
    drop(engine);
    assert_eq!(host.0.borrow().cancelled.len(), 1);
}

#[test]
fn drop_tears_down() {
    let host = LoggingHost::default();
    let engine = HeroEngine::mount(
        fast_config(),
        Some(surface()),
        MountOptions::new(MemoryStorage::new()).with_host(host.clone()),
    )
    .unwrap();
    drop(engine);
    let log = host.0.borrow();
    assert_eq!(log.cancelled, vec![FrameToken(1)]);
    assert_eq!(log.removed.len(), 1);
}

#[test]
fn resize_recomputes_layout_and_surface() {
    let config = ChoreographyConfig {
        anchor: crate::engine::config::Anchor {
            x: Coord::Fraction(0.5),
            y: Coord::Px(20.0),
        },
        ..fast_config()
    };
    let mut engine =
        HeroEngine::mount(config, Some(surface()), MountOptions::new(MemoryStorage::new()))
            .unwrap();
    assert_eq!(engine.layout().anchor.x, 160.0);

    engine.resize(800, 600);
    assert_eq!(engine.layout().anchor.x, 400.0);
    assert_eq!(engine.layout().anchor.y, 20.0);
    assert_eq!(engine.surface().unwrap().size(), Canvas::new(800, 600).unwrap());
    assert_eq!(engine.layout().lines[0].end.x, 800.0 + engine.config().synth.overscan);

    engine.resize(0, 600);
    assert_eq!(engine.layout().canvas, Canvas::new(800, 600).unwrap());
}

#[test]
fn storage_failures_only_cause_replays() {
    let (cb, events) = logging_callbacks();
    let mut engine = HeroEngine::mount(
        fast_config(),
        Some(surface()),
        MountOptions::new(DisabledStorage).with_callbacks(cb),
    )
    .unwrap();
    assert_eq!(engine.status(), EngineStatus::Running);
    run_to_end(&mut engine);
    assert_eq!(engine.status(), EngineStatus::Complete);
    assert_eq!(*events.borrow(), vec!["reveal", "complete"]);
}

#[test]
fn same_seed_same_emission() {
    let run = || {
        let mut engine = HeroEngine::mount(
            fast_config(),
            Some(surface()),
            MountOptions::new(MemoryStorage::new()),
        )
        .unwrap();
        run_to_end(&mut engine);
        engine.stats()
    };
    assert_eq!(run(), run());
}

#[test]
fn invalid_config_fails_mount() {
    let mut config = fast_config();
    config.ribbons[1].homing = true;
    let err = HeroEngine::mount(config, Some(surface()), MountOptions::new(MemoryStorage::new()))
        .unwrap_err();
    assert!(matches!(err, crate::SilkflowError::Validation(_)));
}

#[test]
fn non_finite_first_tick_still_runs_to_completion() {
    let storage = MemoryStorage::new();
    let (cb, events) = logging_callbacks();
    let mut engine = HeroEngine::mount(
        fast_config(),
        Some(surface()),
        MountOptions::new(storage.clone()).with_callbacks(cb),
    )
    .unwrap();

    assert_eq!(engine.tick(f64::NAN), Schedule::Continue);
    assert_eq!(engine.phase(), Phase::Idle);
    let phases = run_to_end(&mut engine);
    assert_eq!(phases.last(), Some(&Phase::Done));
    assert_eq!(engine.status(), EngineStatus::Complete);
    assert_eq!(*events.borrow(), vec!["reveal", "complete"]);
    assert_eq!(
        storage.get(DEFAULT_STORAGE_KEY).unwrap().as_deref(),
        Some(PLAYED_VALUE)
    );
}

#[test]
fn mount_scatters_motes_and_clusters_them_at_the_anchor() {
    let mut engine = HeroEngine::mount(
        fast_config(),
        Some(surface()),
        MountOptions::new(MemoryStorage::new()),
    )
    .unwrap();
    let ambient = engine.config().particles.ambient.clone();
    // 320px wide canvas: 16 scattered plus the anchor cluster.
    let seeded = 16 + ambient.cluster_count;
    assert_eq!(engine.stats().spawns, seeded as u64);

    engine.tick(0.0);
    assert_eq!(engine.phase(), Phase::Idle);
    let anchor = engine.layout().anchor;
    let max_dist = ambient.cluster_distance.max + 1.0;
    let motes: Vec<_> = engine
        .particles()
        .iter()
        .filter(|p| p.kind == crate::ParticleKind::Mote)
        .collect();
    assert!(!motes.is_empty() && motes.len() <= seeded);
    assert!(motes.iter().filter(|p| p.position.distance(anchor) <= max_dist).count() > 0);
}

#[test]
fn skipped_mount_seeds_nothing() {
    let mut storage = MemoryStorage::new();
    storage.set(DEFAULT_STORAGE_KEY, PLAYED_VALUE).unwrap();
    let engine =
        HeroEngine::mount(fast_config(), Some(surface()), MountOptions::new(storage)).unwrap();
    assert_eq!(engine.stats().spawns, 0);
    assert!(engine.particles().is_empty());
}
