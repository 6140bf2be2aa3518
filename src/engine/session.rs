use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;

use crate::{
    animation::keyframe::PropertyValues,
    apply::applier::Applier,
    apply::recording::{RecordingApplier, RecordingSurface},
    clock::frame::{Clock, FramePacer, ManualPacer},
    engine::config::EngineConfig,
    engine::section::{Section, SectionSpec, SharedBoundsFn},
    foundation::core::{Bounds, Direction, SectionId, TargetId, TimelineId, TriggerId},
    foundation::error::{ScrollSyncError, ScrollSyncResult},
    scroll::simulator::{InputKind, ScrollSimulator},
    scroll::surface::ScrollSurface,
    timeline::scheduler::TimelineScheduler,
    timeline::spec::TimelineConfig,
    trigger::registry::TriggerRegistry,
};

#[derive(Clone, Debug, PartialEq)]
enum PendingOp {
    UnmountSection(SectionId),
    UnregisterTimeline(TimelineId),
    UnregisterTrigger(TriggerId),
    LayoutChanged,
}

/// Cloneable handle for requesting changes from inside a tick (e.g. an apply callback).
///
/// Requests are queued and carried out at the start of the next frame.
#[derive(Clone, Debug, Default)]
pub struct EngineHandle {
    queue: Rc<RefCell<Vec<PendingOp>>>,
}

impl EngineHandle {
    pub fn unmount_section(&self, id: SectionId) {
        self.push(PendingOp::UnmountSection(id));
    }

    pub fn unregister_timeline(&self, id: TimelineId) {
        self.push(PendingOp::UnregisterTimeline(id));
    }

    pub fn unregister_trigger(&self, id: TriggerId) {
        self.push(PendingOp::UnregisterTrigger(id));
    }

    pub fn notify_layout_change(&self) {
        self.push(PendingOp::LayoutChanged);
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    fn push(&self, op: PendingOp) {
        self.queue.borrow_mut().push(op);
    }

    fn drain(&self) -> Vec<PendingOp> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }
}

/// What one frame did.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct FrameReport {
    pub dt: f64,
    pub virtual_offset: f64,
    pub direction: Direction,
    /// Page-level scroll progress in `[0, 1]`.
    pub scroll_progress: f64,
    /// Deferred requests carried out before the tick.
    pub drained: usize,
    /// Trigger zones re-measured this frame.
    pub remeasured: usize,
    pub writes_resolved: usize,
    pub writes_applied: usize,
    /// Timelines deactivated because a write failed.
    pub apply_failures: usize,
}

/// Scroll-synchronized animation engine for one document.
///
/// Owns the clock, the scroll simulator, trigger zones and timelines, and the mounted
/// sections that registered them. Each [`ScrollEngine::frame`] runs one tick: deferred
/// requests, scroll smoothing, trigger refresh, timeline resolution, then writes.
pub struct ScrollEngine<P: FramePacer, A: Applier, S: ScrollSurface> {
    config: EngineConfig,
    clock: Clock<P>,
    scroll: ScrollSimulator,
    triggers: TriggerRegistry,
    timelines: TimelineScheduler,
    applier: A,
    surface: S,
    sections: BTreeMap<SectionId, Section>,
    next_section: u64,
    last_applied: HashMap<(TimelineId, TargetId), PropertyValues>,
    handle: EngineHandle,
    viewport_height: f64,
    document_height: f64,
    shut_down: bool,
}

/// Engine driven by hand with in-memory outputs.
pub type HeadlessEngine = ScrollEngine<ManualPacer, RecordingApplier, RecordingSurface>;

impl HeadlessEngine {
    pub fn headless(
        config: EngineConfig,
        viewport_height: f64,
        document_height: f64,
    ) -> ScrollSyncResult<Self> {
        Self::new(
            config,
            viewport_height,
            document_height,
            ManualPacer::new(),
            RecordingApplier::new(),
            RecordingSurface::default(),
        )
    }
}

impl<P: FramePacer, A: Applier, S: ScrollSurface> ScrollEngine<P, A, S> {
    pub fn new(
        config: EngineConfig,
        viewport_height: f64,
        document_height: f64,
        pacer: P,
        applier: A,
        surface: S,
    ) -> ScrollSyncResult<Self> {
        config.validate()?;
        validate_extent("document height", document_height)?;
        let mut scroll = ScrollSimulator::new(config.effective_smoothing())?;
        scroll.set_limit(document_height - viewport_height)?;
        Ok(Self {
            clock: Clock::new(pacer, config.max_frame_dt),
            scroll,
            triggers: TriggerRegistry::new(viewport_height)?,
            timelines: TimelineScheduler::new(),
            applier,
            surface,
            sections: BTreeMap::new(),
            next_section: 0,
            last_applied: HashMap::new(),
            handle: EngineHandle::default(),
            viewport_height,
            document_height,
            shut_down: false,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    pub fn scroll(&self) -> &ScrollSimulator {
        &self.scroll
    }

    pub fn triggers(&self) -> &TriggerRegistry {
        &self.triggers
    }

    pub fn timelines(&self) -> &TimelineScheduler {
        &self.timelines
    }

    pub fn applier(&self) -> &A {
        &self.applier
    }

    pub fn applier_mut(&mut self) -> &mut A {
        &mut self.applier
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn pacer(&self) -> &P {
        self.clock.pacer()
    }

    pub fn pacer_mut(&mut self) -> &mut P {
        self.clock.pacer_mut()
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    pub fn document_height(&self) -> f64 {
        self.document_height
    }

    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(&id)
    }

    pub fn section_ids(&self) -> impl Iterator<Item = SectionId> + '_ {
        self.sections.keys().copied()
    }

    pub fn section_by_name(&self, name: &str) -> Option<SectionId> {
        self.sections
            .iter()
            .find(|(_, s)| s.name() == name)
            .map(|(id, _)| *id)
    }

    /// Register a section's triggers and timelines.
    ///
    /// Timelines with invalid configuration are logged and skipped; the section still mounts.
    /// The first mounted section starts the clock and takes over document scrolling.
    #[tracing::instrument(skip(self, spec), fields(section = %spec.name))]
    pub fn mount_section(&mut self, spec: SectionSpec) -> ScrollSyncResult<SectionId> {
        if self.shut_down {
            return Err(ScrollSyncError::runtime("engine is shut down"));
        }
        let id = SectionId(self.next_section);
        self.next_section += 1;

        let mut section = Section::new(spec.name, spec.bounds);
        for (index, timeline) in spec.timelines.into_iter().enumerate() {
            match self.register_timeline_config(&section.bounds, timeline) {
                Ok((trigger, timeline)) => {
                    section.triggers.push(trigger);
                    section.timelines.push(timeline);
                }
                Err(err) => {
                    tracing::warn!(index, error = %err, "skipping timeline");
                    section.reject();
                }
            }
        }

        let first = self.sections.is_empty();
        tracing::debug!(
            %id,
            timelines = section.timelines.len(),
            rejected = section.rejected(),
            "mounted"
        );
        self.sections.insert(id, section);
        if first {
            if self.config.smooth_scroll {
                self.scroll.attach(&mut self.surface);
            }
            self.clock.start();
        }
        Ok(id)
    }

    fn register_timeline_config(
        &mut self,
        bounds: &SharedBoundsFn,
        config: TimelineConfig,
    ) -> ScrollSyncResult<(TriggerId, TimelineId)> {
        config.spec.validate()?;
        let trigger = self
            .triggers
            .register(measure_with(bounds), config.start, config.end)?;
        match self.timelines.register_timeline(trigger, config.spec) {
            Ok(timeline) => Ok((trigger, timeline)),
            Err(err) => {
                self.triggers.unregister(trigger);
                Err(err)
            }
        }
    }

    /// Tear a section down: timelines, then triggers; the last section out detaches the
    /// simulator and stops the clock.
    #[tracing::instrument(skip(self))]
    pub fn unmount_section(&mut self, id: SectionId) -> bool {
        let Some(section) = self.sections.remove(&id) else {
            return false;
        };
        for timeline in &section.timelines {
            self.drop_timeline(*timeline);
        }
        for trigger in &section.triggers {
            self.triggers.unregister(*trigger);
        }
        tracing::debug!(name = section.name(), "unmounted");
        if self.sections.is_empty() {
            self.scroll.detach(&mut self.surface);
            self.clock.stop();
        }
        true
    }

    /// Remove a timeline together with the trigger zone it was scheduled on.
    pub fn unregister_timeline(&mut self, id: TimelineId) -> bool {
        let Some(trigger) = self.timelines.trigger_of(id) else {
            return false;
        };
        self.forget(&[id], trigger);
        true
    }

    /// Remove a trigger zone and every timeline scheduled on it.
    pub fn unregister_trigger(&mut self, id: TriggerId) -> bool {
        let bound = self.timelines.bound_to(id);
        let known = self.triggers.contains(id);
        self.forget(&bound, id);
        known || !bound.is_empty()
    }

    fn forget(&mut self, timelines: &[TimelineId], trigger: TriggerId) {
        for section in self.sections.values_mut() {
            section.timelines.retain(|t| !timelines.contains(t));
            section.triggers.retain(|t| *t != trigger);
        }
        for timeline in timelines {
            self.drop_timeline(*timeline);
        }
        self.triggers.unregister(trigger);
    }

    fn drop_timeline(&mut self, id: TimelineId) -> bool {
        self.last_applied.retain(|(timeline, _), _| *timeline != id);
        self.timelines.unregister_timeline(id)
    }

    /// Rebind a section to a new element measurement, re-registering its triggers.
    ///
    /// Timelines deactivated by an unmeasurable element resume.
    pub fn remeasure_section(
        &mut self,
        id: SectionId,
        bounds: impl Fn() -> Option<Bounds> + 'static,
    ) -> ScrollSyncResult<()> {
        let section = self
            .sections
            .get_mut(&id)
            .ok_or_else(|| ScrollSyncError::runtime(format!("{id} is not mounted")))?;
        section.bounds = Rc::new(bounds);
        for trigger in &section.triggers {
            self.triggers
                .remeasure(*trigger, measure_with(&section.bounds))?;
        }
        Ok(())
    }

    pub fn resize(&mut self, viewport_height: f64, document_height: f64) -> ScrollSyncResult<()> {
        validate_extent("document height", document_height)?;
        self.triggers.set_viewport_height(viewport_height)?;
        self.scroll.set_limit(document_height - viewport_height)?;
        self.viewport_height = viewport_height;
        self.document_height = document_height;
        Ok(())
    }

    /// Content changed size; re-measure every trigger before the next tick.
    pub fn notify_layout_change(&mut self) {
        self.triggers.invalidate_all();
    }

    pub fn scroll_by(&mut self, delta: f64, kind: InputKind) {
        self.scroll.scroll_by(delta, kind);
    }

    pub fn scroll_to(&mut self, offset: f64, immediate: bool) {
        self.scroll.scroll_to(offset, immediate);
    }

    pub fn set_native_offset(&mut self, offset: f64) {
        self.scroll.set_raw_offset(offset);
    }

    pub fn stop_scroll(&mut self) {
        self.scroll.stop();
    }

    pub fn start_scroll(&mut self) {
        self.scroll.start();
    }

    /// Run one tick for the frame at `timestamp_ms`. Returns `None` while the clock is stopped.
    ///
    /// Per-timeline failures are logged and the timeline is skipped; the tick always runs to
    /// completion.
    #[tracing::instrument(skip(self))]
    pub fn frame(&mut self, timestamp_ms: f64) -> Option<FrameReport> {
        let dt = self.clock.on_frame(timestamp_ms)?;
        let drained = self.drain_pending();

        let virtual_offset = self.scroll.advance(dt);
        self.scroll.render(&mut self.surface);
        let remeasured = self.triggers.refresh();

        let writes = self.timelines.tick(&self.triggers, virtual_offset, dt);
        let mut report = FrameReport {
            dt,
            virtual_offset,
            direction: self.scroll.direction(),
            scroll_progress: self.scroll.state().progress(),
            drained,
            remeasured,
            writes_resolved: writes.len(),
            ..FrameReport::default()
        };

        let mut failed = BTreeSet::new();
        for write in writes {
            if failed.contains(&write.timeline) {
                continue;
            }
            let key = (write.timeline, write.target);
            if self.last_applied.get(&key) == Some(&write.values) {
                continue;
            }
            match self.applier.apply(write.target, &write.values) {
                Ok(()) => {
                    report.writes_applied += 1;
                    self.last_applied.insert(key, write.values);
                }
                Err(err) => {
                    tracing::warn!(
                        timeline = %write.timeline,
                        target = %write.target,
                        error = %err,
                        "write failed; deactivating timeline"
                    );
                    self.timelines
                        .deactivate(write.timeline, &self.triggers, &err.to_string());
                    self.last_applied.retain(|(t, _), _| *t != write.timeline);
                    failed.insert(write.timeline);
                    report.apply_failures += 1;
                }
            }
        }
        Some(report)
    }

    fn drain_pending(&mut self) -> usize {
        let ops = self.handle.drain();
        let count = ops.len();
        for op in ops {
            match op {
                PendingOp::UnmountSection(id) => {
                    self.unmount_section(id);
                }
                PendingOp::UnregisterTimeline(id) => {
                    self.unregister_timeline(id);
                }
                PendingOp::UnregisterTrigger(id) => {
                    self.unregister_trigger(id);
                }
                PendingOp::LayoutChanged => self.notify_layout_change(),
            }
        }
        count
    }

    /// Unmount every section and release the frame clock. Idempotent.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        let ids: Vec<SectionId> = self.sections.keys().copied().collect();
        for id in ids {
            self.unmount_section(id);
        }
        self.handle.drain();
        self.scroll.detach(&mut self.surface);
        self.clock.stop();
        self.shut_down = true;
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

impl<P: FramePacer, A: Applier, S: ScrollSurface> Drop for ScrollEngine<P, A, S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<P: FramePacer, A: Applier, S: ScrollSurface> std::fmt::Debug for ScrollEngine<P, A, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollEngine")
            .field("sections", &self.sections.len())
            .field("triggers", &self.triggers.len())
            .field("timelines", &self.timelines.len())
            .field("virtual_offset", &self.scroll.virtual_offset())
            .field("running", &self.clock.is_running())
            .finish()
    }
}

fn measure_with(bounds: &SharedBoundsFn) -> impl Fn() -> Option<Bounds> + 'static {
    let bounds = Rc::clone(bounds);
    move || bounds()
}

fn validate_extent(what: &str, v: f64) -> ScrollSyncResult<()> {
    if !v.is_finite() || v < 0.0 {
        return Err(ScrollSyncError::validation(format!(
            "{what} {v} must be finite and >= 0"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/engine/session.rs"]
mod tests;
