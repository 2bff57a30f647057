use crate::foundation::error::{SilkflowError, SilkflowResult};
use crate::foundation::math::clamp01;
use crate::timeline::callbacks::Callbacks;

/// Global choreography phase. Ordered; the controller only ever moves forward.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Lead-in before any ribbon moves.
    Idle,
    /// Ribbons sweep across the canvas.
    Flowing,
    /// The homing ribbon spirals into the anchor; the rest fade.
    Homing,
    /// Everything drains while the revealed layout settles.
    Settling,
    /// Terminal. No more frames.
    Done,
}

/// Phase durations in milliseconds.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Idle time before flowing starts.
    pub lead_in_ms: f64,
    /// Flowing phase length.
    pub flow_ms: f64,
    /// Homing phase length.
    pub homing_ms: f64,
    /// Settling phase length.
    pub settle_ms: f64,
    /// Elapsed time at which `on_reveal` fires. Defaults to the start of settling.
    pub reveal_at_ms: Option<f64>,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            lead_in_ms: 150.0,
            flow_ms: 3200.0,
            homing_ms: 1500.0,
            settle_ms: 600.0,
            reveal_at_ms: None,
        }
    }
}

impl TimelineConfig {
    /// Check durations and reveal placement.
    pub fn validate(&self) -> SilkflowResult<()> {
        if !self.lead_in_ms.is_finite() || self.lead_in_ms < 0.0 {
            return Err(SilkflowError::validation("lead_in_ms must be >= 0"));
        }
        for (name, v) in [
            ("flow_ms", self.flow_ms),
            ("homing_ms", self.homing_ms),
            ("settle_ms", self.settle_ms),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(SilkflowError::validation(format!("{name} must be > 0")));
            }
        }
        let reveal = self.reveal_ms();
        if !reveal.is_finite() || reveal < 0.0 || reveal >= self.terminal_ms() {
            return Err(SilkflowError::validation(
                "reveal_at_ms must be within [0, terminal threshold)",
            ));
        }
        Ok(())
    }

    /// Start of [`Phase::Flowing`].
    pub fn flowing_start_ms(&self) -> f64 {
        self.lead_in_ms
    }

    /// Start of [`Phase::Homing`].
    pub fn homing_start_ms(&self) -> f64 {
        self.flowing_start_ms() + self.flow_ms
    }

    /// Start of [`Phase::Settling`].
    pub fn settling_start_ms(&self) -> f64 {
        self.homing_start_ms() + self.homing_ms
    }

    /// Terminal threshold: start of [`Phase::Done`].
    pub fn terminal_ms(&self) -> f64 {
        self.settling_start_ms() + self.settle_ms
    }

    /// Effective reveal threshold.
    pub fn reveal_ms(&self) -> f64 {
        self.reveal_at_ms.unwrap_or_else(|| self.settling_start_ms())
    }

    /// Ascending `(threshold, phase)` table.
    pub fn thresholds(&self) -> [(f64, Phase); 5] {
        [
            (0.0, Phase::Idle),
            (self.flowing_start_ms(), Phase::Flowing),
            (self.homing_start_ms(), Phase::Homing),
            (self.settling_start_ms(), Phase::Settling),
            (self.terminal_ms(), Phase::Done),
        ]
    }
}

/// Last phase whose threshold `elapsed_ms` has reached. Before the first threshold: `Idle`.
pub fn resolve_phase(thresholds: &[(f64, Phase)], elapsed_ms: f64) -> Phase {
    thresholds
        .iter()
        .take_while(|(t, _)| elapsed_ms >= *t)
        .last()
        .map(|(_, p)| *p)
        .unwrap_or(Phase::Idle)
}

/// Whether the host should schedule another frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Schedule {
    /// Request another frame.
    Continue,
    /// Stop the loop.
    Stop,
}

/// Result of one controller tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimelineTick {
    /// Elapsed time used for this tick (never decreases).
    pub elapsed_ms: f64,
    /// Phase after this tick.
    pub phase: Phase,
    /// Phase before this tick.
    pub previous: Phase,
    /// `true` on the tick that fired `on_reveal`.
    pub revealed: bool,
    /// `true` on the tick that reached [`Phase::Done`].
    pub completed: bool,
    /// Scheduling decision.
    pub schedule: Schedule,
}

/// Drives [`Phase`] from host timestamps and fires the one-shot callbacks.
#[derive(Debug)]
pub struct TimelineController {
    config: TimelineConfig,
    thresholds: [(f64, Phase); 5],
    start_ms: Option<f64>,
    elapsed_ms: f64,
    phase: Phase,
    callbacks: Callbacks,
    stopped: bool,
}

impl TimelineController {
    /// Validate `config` and build an unstarted controller.
    pub fn new(config: TimelineConfig, callbacks: Callbacks) -> SilkflowResult<Self> {
        config.validate()?;
        let thresholds = config.thresholds();
        Ok(Self {
            config,
            thresholds,
            start_ms: None,
            elapsed_ms: 0.0,
            phase: Phase::Idle,
            callbacks,
            stopped: false,
        })
    }

    /// Pin the start instant. Without this the first finite tick timestamp is used.
    pub fn start(&mut self, now_ms: f64) {
        if self.start_ms.is_none() && now_ms.is_finite() {
            self.start_ms = Some(now_ms);
        }
    }

    /// Advance to `now_ms`.
    ///
    /// `on_terminal` runs exactly once, on the tick that reaches [`Phase::Done`], before the
    /// completion callback.
    pub fn tick(&mut self, now_ms: f64, on_terminal: impl FnOnce()) -> TimelineTick {
        let previous = self.phase;
        if self.stopped {
            return self.snapshot(previous, false, false, Schedule::Stop);
        }

        if self.start_ms.is_none() && now_ms.is_finite() {
            self.start_ms = Some(now_ms);
        }
        let Some(start) = self.start_ms else {
            return self.snapshot(previous, false, false, Schedule::Continue);
        };
        let raw = now_ms - start;
        if raw.is_finite() && raw > self.elapsed_ms {
            self.elapsed_ms = raw;
        }

        let resolved = resolve_phase(&self.thresholds, self.elapsed_ms);
        self.phase = self.phase.max(resolved);
        if self.phase != previous {
            tracing::debug!(
                from = ?previous,
                to = ?self.phase,
                elapsed_ms = self.elapsed_ms,
                "phase transition"
            );
        }

        let revealed = self.elapsed_ms >= self.config.reveal_ms() && self.callbacks.fire_reveal();

        if self.phase == Phase::Done {
            on_terminal();
            let completed = self.callbacks.fire_complete();
            self.stopped = true;
            return self.snapshot(previous, revealed, completed, Schedule::Stop);
        }

        self.snapshot(previous, revealed, false, Schedule::Continue)
    }

    /// Stop without completing (host teardown). Callbacks will not fire afterwards.
    pub fn cancel(&mut self) {
        self.stopped = true;
    }

    /// Jump to the revealed state without running: fire reveal now and stop.
    ///
    /// Completion does not fire. Returns `true` if reveal fired on this call.
    pub fn skip(&mut self) -> bool {
        if self.stopped {
            return false;
        }
        self.stopped = true;
        self.callbacks.fire_reveal()
    }

    /// Installed hooks and their latches.
    pub fn callbacks(&self) -> &Callbacks {
        &self.callbacks
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Elapsed time as of the last tick.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Whether the loop has ended (completed or cancelled).
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Durations this controller runs on.
    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Progress through the flowing phase.
    pub fn flow_fraction(&self) -> f64 {
        clamp01((self.elapsed_ms - self.config.flowing_start_ms()) / self.config.flow_ms)
    }

    /// Progress through the homing phase.
    pub fn homing_fraction(&self) -> f64 {
        clamp01((self.elapsed_ms - self.config.homing_start_ms()) / self.config.homing_ms)
    }

    /// Progress through the settling phase.
    pub fn settle_fraction(&self) -> f64 {
        clamp01((self.elapsed_ms - self.config.settling_start_ms()) / self.config.settle_ms)
    }

    /// Fade-out progress for ribbons that do not home, spanning homing and settling.
    pub fn fade_fraction(&self) -> f64 {
        clamp01(
            (self.elapsed_ms - self.config.homing_start_ms())
                / (self.config.homing_ms + self.config.settle_ms),
        )
    }

    fn snapshot(
        &self,
        previous: Phase,
        revealed: bool,
        completed: bool,
        schedule: Schedule,
    ) -> TimelineTick {
        TimelineTick {
            elapsed_ms: self.elapsed_ms,
            phase: self.phase,
            previous,
            revealed,
            completed,
            schedule,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/controller.rs"]
mod tests;
