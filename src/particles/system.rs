use crate::color::gradient::Gradient;
use crate::foundation::core::{Canvas, Point, Rgba8, Vec2};
use crate::foundation::error::{SilkflowError, SilkflowResult};
use crate::foundation::math::{RandomSource, clamp01};

/// Closed numeric range sampled uniformly.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Span {
    /// Lower bound.
    pub min: f64,
    /// Upper bound, `>= min`.
    pub max: f64,
}

impl Span {
    /// Convenience constructor.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn sample(self, rng: &mut dyn RandomSource) -> f64 {
        rng.range(self.min, self.max)
    }

    fn validate(self, what: &str) -> SilkflowResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(SilkflowError::validation(format!(
                "{what} range must be finite with min <= max"
            )));
        }
        Ok(())
    }
}

/// Particle flavour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleKind {
    /// Shed from a ribbon; falls under gravity and slows down.
    Spark,
    /// Ambient dust; drifts without gravity and fades in and out.
    Mote,
}

/// Settings for ambient mote emission.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    /// Probability of spawning one mote per tick.
    pub spawn_probability: f64,
    /// Drift speed in pixels per tick.
    pub speed: Span,
    /// Radius in pixels.
    pub radius: Span,
    /// Lifetime in ticks.
    pub lifetime_ticks: Span,
    /// Depth of the opacity pulse, within `[0, 0.5]`.
    pub pulse_amplitude: f64,
    /// Pulse angular speed in radians per tick.
    pub pulse_speed: Span,
    /// Upper bound on the motes scattered over the canvas at mount.
    pub initial_max: usize,
    /// Canvas width per initial mote, in pixels.
    pub initial_spacing_px: f64,
    /// Motes gathered around the anchor at mount.
    pub cluster_count: usize,
    /// Distance of cluster motes from the anchor, in pixels.
    pub cluster_distance: Span,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            spawn_probability: 0.25,
            speed: Span::new(0.05, 0.3),
            radius: Span::new(0.5, 2.5),
            lifetime_ticks: Span::new(120.0, 360.0),
            pulse_amplitude: 0.15,
            pulse_speed: Span::new(0.01, 0.03),
            initial_max: 80,
            initial_spacing_px: 20.0,
            cluster_count: 25,
            cluster_distance: Span::new(20.0, 100.0),
        }
    }
}

impl AmbientConfig {
    /// Number of motes scattered at mount: `min(initial_max, floor(width / initial_spacing_px))`.
    pub fn initial_population(&self, canvas: Canvas) -> usize {
        let by_width = (canvas.w() / self.initial_spacing_px).floor() as usize;
        by_width.min(self.initial_max)
    }

    fn validate(&self) -> SilkflowResult<()> {
        self.speed.validate("ambient speed")?;
        self.radius.validate("ambient radius")?;
        self.lifetime_ticks.validate("ambient lifetime")?;
        self.pulse_speed.validate("ambient pulse speed")?;
        self.cluster_distance.validate("cluster distance")?;
        if !(0.0..=0.5).contains(&self.pulse_amplitude) {
            return Err(SilkflowError::validation(
                "pulse amplitude must be within [0, 0.5]",
            ));
        }
        if !(self.initial_spacing_px.is_finite() && self.initial_spacing_px > 0.0) {
            return Err(SilkflowError::validation("initial mote spacing must be > 0"));
        }
        if self.cluster_distance.min < 0.0 {
            return Err(SilkflowError::validation("cluster distance must be >= 0"));
        }
        Ok(())
    }
}

/// Sinusoidal opacity modulation carried by a particle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pulse {
    /// Depth; zero disables the pulse.
    pub amplitude: f64,
    /// Radians per tick.
    pub speed: f64,
    /// Phase offset in radians.
    pub phase: f64,
}

impl Pulse {
    /// No modulation.
    pub const NONE: Self = Self {
        amplitude: 0.0,
        speed: 0.0,
        phase: 0.0,
    };

    /// Opacity factor at `age`, within `[1 - 2 * amplitude, 1]`.
    pub fn factor(self, age: u32) -> f64 {
        if self.amplitude <= 0.0 {
            return 1.0;
        }
        let wave = (f64::from(age) * self.speed + self.phase).sin();
        clamp01(1.0 - self.amplitude + self.amplitude * wave)
    }
}

/// Spark and mote emission parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Probability that a synthesized ribbon point sheds a spark on a given tick.
    pub spawn_probability: f64,
    /// Initial speed in pixels per tick.
    pub speed: Span,
    /// Radius in pixels.
    pub radius: Span,
    /// Lifetime in ticks (fractional bounds are rounded).
    pub lifetime_ticks: Span,
    /// Downward acceleration in pixels per tick squared.
    pub gravity: f64,
    /// Velocity multiplier applied once per nominal tick, in `(0, 1]`.
    pub damping: f64,
    /// Distance outside the canvas a particle may travel before it is retired.
    pub margin: f64,
    /// Hard cap on live particles; spawns beyond it are dropped.
    pub max_particles: usize,
    /// Ambient mote emitter.
    pub ambient: AmbientConfig,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            spawn_probability: 0.004,
            speed: Span::new(0.2, 1.6),
            radius: Span::new(0.8, 2.6),
            lifetime_ticks: Span::new(30.0, 90.0),
            gravity: 0.02,
            damping: 0.97,
            margin: 10.0,
            max_particles: 600,
            ambient: AmbientConfig::default(),
        }
    }
}

impl ParticleConfig {
    /// Reject ranges and factors the integrator cannot work with.
    pub fn validate(&self) -> SilkflowResult<()> {
        for p in [self.spawn_probability, self.ambient.spawn_probability] {
            if !(0.0..=1.0).contains(&p) {
                return Err(SilkflowError::validation(
                    "spawn probability must be within [0, 1]",
                ));
            }
        }
        self.speed.validate("particle speed")?;
        self.radius.validate("particle radius")?;
        self.lifetime_ticks.validate("particle lifetime")?;
        self.ambient.validate()?;
        if self.lifetime_ticks.min < 1.0 || self.ambient.lifetime_ticks.min < 1.0 {
            return Err(SilkflowError::validation(
                "particle lifetime must be at least one tick",
            ));
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(SilkflowError::validation("damping must be within (0, 1]"));
        }
        if !self.gravity.is_finite() || !self.margin.is_finite() || self.margin < 0.0 {
            return Err(SilkflowError::validation(
                "gravity must be finite and margin non-negative",
            ));
        }
        Ok(())
    }
}

/// A short-lived decorative point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Spark or mote.
    pub kind: ParticleKind,
    /// Current position in canvas pixels.
    pub position: Point,
    /// Velocity in pixels per tick.
    pub velocity: Vec2,
    /// Ticks survived so far.
    pub age: u32,
    /// Age at which the particle is retired.
    pub max_lifetime: u32,
    /// Base radius in pixels.
    pub radius: f64,
    /// Draw color fixed at spawn.
    pub color: Rgba8,
    /// Opacity pulse; motes only.
    pub pulse: Pulse,
}

impl Particle {
    /// Remaining life fraction, `1 - age / max_lifetime`.
    pub fn alpha(&self) -> f64 {
        if self.max_lifetime == 0 {
            return 0.0;
        }
        clamp01(1.0 - f64::from(self.age) / f64::from(self.max_lifetime))
    }

    /// Opacity multiplier used when drawing.
    ///
    /// Motes ramp in over the first tenth of their life and out over the last tenth, scaled by
    /// their [`Pulse`].
    pub fn opacity(&self) -> f64 {
        match self.kind {
            ParticleKind::Spark => self.alpha(),
            ParticleKind::Mote => {
                let life = 1.0 - self.alpha();
                let fade = if life < 0.1 {
                    life * 10.0
                } else if life > 0.9 {
                    (1.0 - life) * 10.0
                } else {
                    1.0
                };
                fade * self.pulse.factor(self.age)
            }
        }
    }

    /// Radius scaled by remaining life (motes keep their size).
    pub fn life_scaled_radius(&self) -> f64 {
        match self.kind {
            ParticleKind::Spark => self.radius * self.alpha(),
            ParticleKind::Mote => self.radius,
        }
    }

    /// Integrate one tick scaled by `dt` and age by one tick.
    pub fn advance(&mut self, dt: f64, gravity: f64, damping: f64) {
        self.position += self.velocity * dt;
        if self.kind == ParticleKind::Spark {
            self.velocity.y += gravity * dt;
        }
        self.velocity *= damping.powf(dt);
        self.age = self.age.saturating_add(1);
    }

    /// `false` once the lifetime is used up or the particle left the canvas by more than `margin`.
    pub fn is_alive(&self, canvas: Canvas, margin: f64) -> bool {
        self.age < self.max_lifetime && canvas.contains_with_margin(self.position, margin)
    }
}

/// Owns every live particle of one engine instance.
///
/// Spawns issued during a tick are staged and join the live set after that tick's
/// [`ParticleSystem::advance`], so a fresh particle is drawn once at age zero.
#[derive(Clone, Debug)]
pub struct ParticleSystem {
    config: ParticleConfig,
    palette: Gradient,
    live: Vec<Particle>,
    staged: Vec<Particle>,
    spawned_total: u64,
}

impl ParticleSystem {
    /// Empty system coloring sparks from `palette`.
    pub fn new(config: ParticleConfig, palette: Gradient) -> Self {
        Self {
            config,
            palette,
            live: Vec::new(),
            staged: Vec::new(),
            spawned_total: 0,
        }
    }

    /// Emission parameters.
    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    /// Create one spark at `position` colored at `color_progress`.
    ///
    /// Returns `false` when the live cap dropped the spawn.
    pub fn spawn(
        &mut self,
        position: Point,
        color_progress: f64,
        rng: &mut dyn RandomSource,
    ) -> bool {
        if self.at_capacity() {
            return false;
        }
        let angle = rng.range(0.0, std::f64::consts::TAU);
        let speed = self.config.speed.sample(rng);
        let particle = Particle {
            kind: ParticleKind::Spark,
            position,
            velocity: Vec2::from_angle(angle) * speed,
            age: 0,
            max_lifetime: sample_ticks(self.config.lifetime_ticks, rng),
            radius: self.config.radius.sample(rng),
            color: self.palette.color_at(color_progress, 1.0),
            pulse: Pulse::NONE,
        };
        self.stage(particle);
        true
    }

    /// Create one ambient mote somewhere on the canvas.
    pub fn spawn_ambient(&mut self, canvas: Canvas, rng: &mut dyn RandomSource) -> bool {
        if self.at_capacity() {
            return false;
        }
        let position = Point::new(rng.range(0.0, canvas.w()), rng.range(0.0, canvas.h()));
        let particle = self.mote(position, rng);
        self.stage(particle);
        true
    }

    /// Scatter the mount-time mote population over `canvas`. Returns how many were spawned.
    pub fn seed_ambient(&mut self, canvas: Canvas, rng: &mut dyn RandomSource) -> usize {
        let count = self.config.ambient.initial_population(canvas);
        (0..count)
            .take_while(|_| self.spawn_ambient(canvas, rng))
            .count()
    }

    /// Gather `cluster_count` motes in a ring around `center`. Returns how many were spawned.
    pub fn spawn_cluster(&mut self, center: Point, rng: &mut dyn RandomSource) -> usize {
        let mut spawned = 0;
        for _ in 0..self.config.ambient.cluster_count {
            if self.at_capacity() {
                break;
            }
            let angle = rng.range(0.0, std::f64::consts::TAU);
            let dist = self.config.ambient.cluster_distance.sample(rng);
            let particle = self.mote(center + Vec2::from_angle(angle) * dist, rng);
            self.stage(particle);
            spawned += 1;
        }
        spawned
    }

    /// Advance every live particle by one tick, retire the dead, then admit staged spawns.
    pub fn advance(&mut self, dt: f64, canvas: Canvas) {
        let (gravity, damping, margin) = (self.config.gravity, self.config.damping, self.config.margin);
        for p in &mut self.live {
            p.advance(dt, gravity, damping);
        }
        self.live.retain(|p| p.is_alive(canvas, margin));
        self.live.append(&mut self.staged);
    }

    /// Particles currently alive.
    pub fn live(&self) -> &[Particle] {
        &self.live
    }

    /// Live plus staged count.
    pub fn len(&self) -> usize {
        self.live.len() + self.staged.len()
    }

    /// `true` when nothing is alive or staged.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful spawns since construction.
    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    /// Drop every particle.
    pub fn clear(&mut self) {
        self.live.clear();
        self.staged.clear();
    }

    fn mote(&self, position: Point, rng: &mut dyn RandomSource) -> Particle {
        let ambient = &self.config.ambient;
        let angle = rng.range(0.0, std::f64::consts::TAU);
        // Slight upward bias.
        let velocity = Vec2::from_angle(angle) * ambient.speed.sample(rng) - Vec2::new(0.0, 0.05);
        Particle {
            kind: ParticleKind::Mote,
            position,
            velocity,
            age: 0,
            max_lifetime: sample_ticks(ambient.lifetime_ticks, rng),
            radius: ambient.radius.sample(rng),
            color: self.palette.color_at(rng.next_f64(), 1.0),
            pulse: Pulse {
                amplitude: ambient.pulse_amplitude,
                speed: ambient.pulse_speed.sample(rng),
                phase: rng.range(0.0, std::f64::consts::TAU),
            },
        }
    }

    fn at_capacity(&self) -> bool {
        self.len() >= self.config.max_particles
    }

    fn stage(&mut self, particle: Particle) {
        self.staged.push(particle);
        self.spawned_total += 1;
    }
}

fn sample_ticks(span: Span, rng: &mut dyn RandomSource) -> u32 {
    span.sample(rng).round().max(1.0) as u32
}

#[cfg(test)]
#[path = "../../tests/unit/particles/system.rs"]
mod tests;
