//! Silkflow is the choreography engine behind an animated hero banner.
//!
//! A handful of silk ribbons sweep across a 2D surface, one of them detaches and spirals into a
//! logo anchor, sparks shed from the ribbons and then everything settles. The whole run plays at
//! most once per browsing session.
//!
//! # Per-frame pipeline
//!
//! 1. **Gate**: [`PlaybackGate`] short-circuits at mount when the session already saw the run
//! 2. **Timeline**: [`TimelineController`] resolves the [`Phase`] from elapsed time and fires
//!    one-shot callbacks
//! 3. **Synthesis**: [`CurveSynthesizer`] turns each ribbon's scalar state into points and sheds
//!    particles into the [`ParticleSystem`]
//! 4. **Render**: [`Renderer`] strokes ribbons and fills particles onto a [`Surface`]
//!
//! [`HeroEngine`] owns one instance of all of the above. Hosts inject session storage, frame
//! scheduling and randomness, then call [`HeroEngine::tick`] from their frame callback.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic given a seed**: stochastic emission goes through an injected [`RandomSource`].
//! - **Tolerant at runtime**: only configuration errors are returned; a missing surface, failed
//!   resize or unavailable storage is logged and absorbed.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod color;
mod engine;
mod foundation;
mod particles;
mod playback;
mod render;
mod synth;
mod timeline;

pub use animation::ease::Ease;
pub use color::gradient::{ColorStop, Gradient};
pub use color::palette::{autumn_silk, twilight};
pub use engine::config::{Anchor, ChoreographyConfig};
pub use engine::hero::{EngineStatus, HeroEngine, MountOptions, PipelineStats};
pub use engine::host::{FrameHost, FrameToken, ListenerId, NullHost, OverlayPlacement};
pub use foundation::core::{BezPath, Canvas, Coord, Point, Rect, Rgb8, Rgba8, Vec2};
pub use foundation::error::{SilkflowError, SilkflowResult};
pub use foundation::math::{RandomSource, Rng64, clamp01, lerp};
pub use particles::system::{
    AmbientConfig, Particle, ParticleConfig, ParticleKind, ParticleSystem, Pulse, Span,
};
pub use playback::gate::{DEFAULT_STORAGE_KEY, PLAYED_VALUE, PlaybackGate};
pub use playback::storage::{DisabledStorage, MemoryStorage, SessionStorage};
pub use render::blur::gaussian_blur_premul;
pub use render::composite::{PremulRgba8, over, over_in_place};
pub use render::cpu::{CpuSurface, FrameRGBA};
pub use render::record::{DrawCommand, RecordingSurface};
pub use render::renderer::{FrameSnapshot, RenderStats, RenderStyle, Renderer};
pub use render::surface::{StrokeStyle, Surface};
pub use synth::curve::{
    CurveSynthesizer, FlowWindow, HomingConfig, MAX_SAMPLES, RibbonFrame, RibbonMode, SynthConfig,
};
pub use synth::layout::{FlowLine, Layout};
pub use synth::ribbon::{FrozenFlow, RibbonSpec, RibbonState};
pub use timeline::callbacks::Callbacks;
pub use timeline::controller::{
    Phase, Schedule, TimelineConfig, TimelineController, TimelineTick, resolve_phase,
};
