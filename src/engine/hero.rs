use crate::engine::config::ChoreographyConfig;
use crate::engine::host::{FrameHost, FrameToken, ListenerId, NullHost};
use crate::foundation::core::Canvas;
use crate::foundation::error::SilkflowResult;
use crate::foundation::math::{RandomSource, Rng64};
use crate::particles::system::{Particle, ParticleSystem};
use crate::playback::gate::PlaybackGate;
use crate::playback::storage::SessionStorage;
use crate::render::renderer::{FrameSnapshot, RenderStats, Renderer};
use crate::render::surface::Surface;
use crate::synth::curve::{CurveSynthesizer, RibbonFrame};
use crate::synth::layout::Layout;
use crate::synth::ribbon::RibbonState;
use crate::timeline::callbacks::Callbacks;
use crate::timeline::controller::{Phase, Schedule, TimelineController, TimelineTick};

/// Cap on how many nominal frames one tick may integrate particles over.
const MAX_FRAME_STEP: f64 = 4.0;

/// Injected collaborators for [`HeroEngine::mount`].
pub struct MountOptions {
    /// Session storage holding the played flag.
    pub storage: Box<dyn SessionStorage>,
    /// Frame scheduling and resize delivery.
    pub host: Box<dyn FrameHost>,
    /// Random source; defaults to [`Rng64`] seeded from the config.
    pub rng: Option<Box<dyn RandomSource>>,
    /// Reveal and completion hooks.
    pub callbacks: Callbacks,
}

impl MountOptions {
    /// Options over `storage` with a [`NullHost`], the seeded RNG and no callbacks.
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
            host: Box::new(NullHost::new()),
            rng: None,
            callbacks: Callbacks::new(),
        }
    }

    /// Use `host` for scheduling.
    pub fn with_host(mut self, host: impl FrameHost + 'static) -> Self {
        self.host = Box::new(host);
        self
    }

    /// Use `rng` instead of the seeded default.
    pub fn with_rng(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    /// Install reveal and completion hooks.
    pub fn with_callbacks(mut self, callbacks: Callbacks) -> Self {
        self.callbacks = callbacks;
        self
    }
}

impl std::fmt::Debug for MountOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountOptions")
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}

/// Lifecycle of a mounted engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum EngineStatus {
    /// The choreography already ran this session; reveal fired at mount.
    Skipped,
    /// No drawing surface was available; nothing is drawn.
    Inert,
    /// Ticking.
    Running,
    /// Reached [`Phase::Done`].
    Complete,
    /// Torn down by the host.
    Unmounted,
}

/// Counters over the engine's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct PipelineStats {
    /// Ticks that ran the pipeline.
    pub ticks: u64,
    /// Ribbon frames synthesized.
    pub syntheses: u64,
    /// Successful particle spawns.
    pub spawns: u64,
    /// Renderer draw calls.
    pub draws: u64,
}

/// One mounted hero choreography.
///
/// Owns every piece of per-instance state. The host drives it with [`HeroEngine::tick`] and
/// [`HeroEngine::resize`] and tears it down with [`HeroEngine::unmount`] (also run on drop).
pub struct HeroEngine<S: Surface> {
    config: ChoreographyConfig,
    status: EngineStatus,
    surface: Option<S>,
    gate: PlaybackGate<Box<dyn SessionStorage>>,
    host: Box<dyn FrameHost>,
    rng: Box<dyn RandomSource>,
    timeline: TimelineController,
    synth: CurveSynthesizer,
    renderer: Renderer,
    particles: ParticleSystem,
    layout: Layout,
    ribbons: Vec<RibbonState>,
    frames: Vec<RibbonFrame>,
    pending_frame: Option<FrameToken>,
    resize_listener: Option<ListenerId>,
    last_tick_ms: Option<f64>,
    stats: PipelineStats,
    last_render: RenderStats,
}

impl<S: Surface> HeroEngine<S> {
    /// Validate `config`, consult the playback gate and start the loop.
    ///
    /// Already played: reveal fires immediately and nothing is scheduled. No surface: the engine
    /// is inert; reveal still fires so dependent layout is not left hidden.
    #[tracing::instrument(skip_all, fields(ribbons = config.ribbons.len()))]
    pub fn mount(
        config: ChoreographyConfig,
        surface: Option<S>,
        options: MountOptions,
    ) -> SilkflowResult<Self> {
        config.validate()?;
        let MountOptions {
            storage,
            mut host,
            rng,
            callbacks,
        } = options;

        let gate = PlaybackGate::new(storage, config.storage_key.clone());
        let mut timeline = TimelineController::new(config.timeline.clone(), callbacks)?;
        let mut rng: Box<dyn RandomSource> = match rng {
            Some(rng) => rng,
            None => Box::new(Rng64::new(config.seed)),
        };
        let canvas = surface.as_ref().map(|s| s.size()).unwrap_or(Canvas {
            width: 1,
            height: 1,
        });
        let layout = Layout::compute(
            canvas,
            (config.anchor.x, config.anchor.y),
            &config.ribbons,
            config.synth.overscan,
        );

        let status = if gate.has_played() {
            timeline.skip();
            tracing::info!("choreography already played; revealing immediately");
            EngineStatus::Skipped
        } else if surface.is_none() {
            timeline.skip();
            tracing::warn!("no drawing surface; engine inert");
            EngineStatus::Inert
        } else {
            EngineStatus::Running
        };

        let (pending_frame, resize_listener) = if status == EngineStatus::Running {
            (Some(host.request_frame()), Some(host.add_resize_listener()))
        } else {
            (None, None)
        };

        let mut particles = ParticleSystem::new(config.particles.clone(), config.palette.clone());
        let mut stats = PipelineStats::default();
        if status == EngineStatus::Running {
            let scattered = particles.seed_ambient(canvas, rng.as_mut());
            let clustered = particles.spawn_cluster(layout.anchor, rng.as_mut());
            tracing::debug!(scattered, clustered, "seeded ambient motes");
            stats.spawns = (scattered + clustered) as u64;
        }

        Ok(Self {
            synth: CurveSynthesizer::new(config.synth.clone()),
            renderer: Renderer::new(config.style.clone(), config.palette.clone()),
            particles,
            ribbons: vec![RibbonState::default(); config.ribbons.len()],
            frames: Vec::with_capacity(config.ribbons.len()),
            config,
            status,
            surface,
            gate,
            host,
            rng,
            timeline,
            layout,
            pending_frame,
            resize_listener,
            last_tick_ms: None,
            stats,
            last_render: RenderStats::default(),
        })
    }

    /// Run one frame at host time `now_ms`. Returns whether another frame was requested.
    pub fn tick(&mut self, now_ms: f64) -> Schedule {
        if self.status != EngineStatus::Running {
            return Schedule::Stop;
        }
        self.pending_frame = None;

        let step = self.last_tick_ms.map_or(1.0, |prev| {
            ((now_ms - prev) / self.config.frame_ms).clamp(0.0, MAX_FRAME_STEP)
        });
        if now_ms.is_finite() {
            self.last_tick_ms = Some(self.last_tick_ms.map_or(now_ms, |p| p.max(now_ms)));
        }

        let gate = &mut self.gate;
        let tick = self.timeline.tick(now_ms, || {
            gate.mark_played();
        });
        self.stats.ticks += 1;

        self.synthesize(&tick);
        self.emit(tick.phase);
        if tick.phase == Phase::Done {
            self.particles.clear();
        } else {
            let dt = if step.is_finite() { step } else { 1.0 };
            self.particles.advance(dt, self.layout.canvas);
        }
        self.draw(&tick);

        match tick.schedule {
            Schedule::Continue => {
                self.pending_frame = Some(self.host.request_frame());
            }
            Schedule::Stop => {
                self.status = EngineStatus::Complete;
                tracing::info!(elapsed_ms = tick.elapsed_ms, "choreography complete");
            }
        }
        tick.schedule
    }

    /// Viewport changed: recompute the layout and resize the surface.
    ///
    /// Resize failures are logged and drawing continues with the old surface.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.status == EngineStatus::Unmounted {
            return;
        }
        let canvas = match Canvas::new(width, height) {
            Ok(c) => c,
            Err(err) => {
                tracing::warn!(width, height, error = %err, "ignoring resize");
                return;
            }
        };
        self.layout = Layout::compute(
            canvas,
            (self.config.anchor.x, self.config.anchor.y),
            &self.config.ribbons,
            self.config.synth.overscan,
        );
        if let Some(surface) = self.surface.as_mut()
            && let Err(err) = surface.resize(canvas)
        {
            tracing::warn!(width, height, error = %err, "surface resize failed");
        }
    }

    /// Cancel the pending frame and drop the resize listener. Later ticks do nothing.
    pub fn unmount(&mut self) {
        if self.status == EngineStatus::Unmounted {
            return;
        }
        if let Some(token) = self.pending_frame.take() {
            self.host.cancel_frame(token);
        }
        if let Some(id) = self.resize_listener.take() {
            self.host.remove_resize_listener(id);
        }
        self.timeline.cancel();
        self.status = EngineStatus::Unmounted;
        tracing::debug!("engine unmounted");
    }

    /// Lifecycle state.
    pub fn status(&self) -> EngineStatus {
        self.status
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.timeline.phase()
    }

    /// Elapsed time as of the last tick.
    pub fn elapsed_ms(&self) -> f64 {
        self.timeline.elapsed_ms()
    }

    /// Whether reveal has fired.
    pub fn has_revealed(&self) -> bool {
        self.timeline.callbacks().has_revealed()
    }

    /// Whether completion has fired.
    pub fn has_completed(&self) -> bool {
        self.timeline.callbacks().has_completed()
    }

    /// Lifetime counters.
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    /// Counters from the most recent draw.
    pub fn last_render(&self) -> RenderStats {
        self.last_render
    }

    /// Layout in use.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Live particles.
    pub fn particles(&self) -> &[Particle] {
        self.particles.live()
    }

    /// Ribbon geometry from the last tick.
    pub fn ribbon_frames(&self) -> &[RibbonFrame] {
        &self.frames
    }

    /// Per-ribbon flow state.
    pub fn ribbon_states(&self) -> &[RibbonState] {
        &self.ribbons
    }

    /// Read-only view of the last tick, as handed to the renderer.
    pub fn snapshot(&self) -> FrameSnapshot<'_> {
        FrameSnapshot {
            phase: self.timeline.phase(),
            elapsed_ms: self.timeline.elapsed_ms(),
            ribbons: &self.frames,
            particles: self.particles.live(),
        }
    }

    /// Drawing surface, if any.
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// Configuration in use.
    pub fn config(&self) -> &ChoreographyConfig {
        &self.config
    }

    fn synthesize(&mut self, tick: &TimelineTick) {
        let cfg = self.timeline.config();
        let flow_ms = cfg.flow_ms;
        let flow_elapsed = (tick.elapsed_ms - cfg.flowing_start_ms()).clamp(0.0, flow_ms);
        let homing_start_s = cfg.homing_start_ms() / 1000.0;
        let time_s = tick.elapsed_ms / 1000.0;
        let homing_fraction = self.timeline.homing_fraction();
        let fade = 1.0 - self.timeline.fade_fraction();

        self.frames.clear();
        if tick.phase == Phase::Idle {
            return;
        }

        for (i, spec) in self.config.ribbons.iter().enumerate() {
            let line = &self.layout.lines[i];
            let state = &mut self.ribbons[i];
            state.advance_to(self.synth.flow_progress(spec, flow_elapsed, flow_ms));
            if tick.phase >= Phase::Homing {
                state.freeze(homing_start_s);
            }

            let frame = match (tick.phase, state.frozen()) {
                (Phase::Flowing, _) | (_, None) => {
                    self.synth
                        .flowing(i, spec, line, state.progress(), time_s, 1.0)
                }
                (_, Some(frozen)) if spec.homing => {
                    let from =
                        CurveSynthesizer::point_at(spec, line, frozen.progress, frozen.time_s);
                    self.synth.homing(
                        i,
                        spec,
                        from,
                        self.layout.anchor,
                        homing_fraction,
                        time_s,
                    )
                }
                (_, Some(frozen)) => {
                    self.synth
                        .flowing(i, spec, line, frozen.progress, time_s, fade)
                }
            };
            self.frames.push(frame);
        }
        self.stats.syntheses += self.frames.len() as u64;
    }

    fn emit(&mut self, phase: Phase) {
        if phase == Phase::Done {
            return;
        }
        let probability = self.config.particles.spawn_probability;
        let before = self.particles.spawned_total();
        for frame in &self.frames {
            CurveSynthesizer::emit(frame, probability, &mut self.particles, self.rng.as_mut());
        }
        if phase > Phase::Idle
            && self
                .rng
                .chance(self.config.particles.ambient.spawn_probability)
        {
            self.particles
                .spawn_ambient(self.layout.canvas, self.rng.as_mut());
        }
        self.stats.spawns += self.particles.spawned_total() - before;
    }

    fn draw(&mut self, tick: &TimelineTick) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let snapshot = FrameSnapshot {
            phase: tick.phase,
            elapsed_ms: tick.elapsed_ms,
            ribbons: &self.frames,
            particles: self.particles.live(),
        };
        self.last_render = self.renderer.draw(surface, &snapshot);
        self.stats.draws += 1;
    }
}

impl<S: Surface> Drop for HeroEngine<S> {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl<S: Surface> std::fmt::Debug for HeroEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeroEngine")
            .field("status", &self.status)
            .field("phase", &self.timeline.phase())
            .field("elapsed_ms", &self.timeline.elapsed_ms())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/hero.rs"]
mod tests;
