//! scrollsync is a scroll-synchronized animation engine.
//!
//! It decouples perceived scrolling from raw input with a smoothed virtual offset, and maps
//! ranges of that offset onto interpolated property changes of page elements (opacity,
//! translation, scale), with staggered entry and exit across groups of targets.
//!
//! # Frame overview
//!
//! Every visual frame runs one tick, in this order:
//!
//! 1. **Clock**: the host's frame-pacing primitive fires and the step `dt` is measured.
//! 2. **Deferred requests**: unmounts and unregistrations queued through an [`EngineHandle`].
//! 3. **Scroll**: the virtual offset eases toward the raw offset ([`ScrollSimulator`]).
//! 4. **Triggers**: zones invalidated by a resize or layout change are re-measured
//!    ([`TriggerRegistry`]).
//! 5. **Timelines**: progress and per-target values are resolved ([`TimelineScheduler`]).
//! 6. **Apply**: values are written through the host's [`Applier`].
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Host-agnostic**: rendering, frame pacing and element measurement come in through
//!   traits ([`Applier`], [`ScrollSurface`], [`FramePacer`]) and closures.
//! - **Reversible**: scrubbed timelines depend only on the offset; scrolling back up
//!   reverses an animation, it never replays it.
//! - **Fail static**: a timeline whose element disappears stops writing and keeps its last
//!   values; the tick always completes.
//!
//! A headless host ([`HeadlessEngine`], [`SceneConfig`], the `scrollsync` binary) drives the
//! engine from JSON scene files for inspection and tests.
#![forbid(unsafe_code)]

mod animation;
mod apply;
mod clock;
mod engine;
mod foundation;
mod scene;
mod scroll;
mod timeline;
mod trigger;

pub use animation::ease::Ease;
pub use animation::keyframe::{Keyframe, Keyframes, Property, PropertySet, PropertyValues};
pub use animation::stagger::{Stagger, StaggerFrom, local_progress};
pub use apply::applier::{Applier, TargetStyle};
pub use apply::recording::{AppliedWrite, RecordingApplier, RecordingSurface};
pub use clock::frame::{Clock, FramePacer, FrameRequest, ManualPacer};
pub use engine::config::EngineConfig;
pub use engine::section::{Section, SectionSpec, SharedBoundsFn};
pub use engine::session::{EngineHandle, FrameReport, HeadlessEngine, ScrollEngine};
pub use foundation::core::{
    Affine, Bounds, Direction, Rect, SectionId, TargetId, TimelineId, TriggerId, Vec2,
};
pub use foundation::error::{ScrollSyncError, ScrollSyncResult};
pub use scene::model::{InputAction, InputEvent, PresetRef, SceneConfig, SectionConfig};
pub use scene::presets::{
    Preset, SCRUB_LAG, SMOOTH_SCROLL_DURATION, certifications_entrance, certifications_exit,
    contact_entrance, smooth_scroll,
};
pub use scene::runner::{FrameRecord, RunOptions, SectionSample, run_scene, sample_scene};
pub use scroll::simulator::{InputKind, ScrollSimulator, ScrollState, SmoothingConfig};
pub use scroll::surface::ScrollSurface;
pub use timeline::playback::PlayState;
pub use timeline::scheduler::{ResolvedWrite, TimelineSample, TimelineScheduler};
pub use timeline::spec::{TimelineConfig, TimelineMode, TimelineSpec};
pub use trigger::anchor::{Anchor, ViewportPos};
pub use trigger::registry::{BoundsFn, TriggerRange, TriggerRegistry};
