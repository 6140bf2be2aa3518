use std::rc::Rc;

use crate::{
    foundation::core::{Bounds, TimelineId, TriggerId},
    timeline::spec::TimelineConfig,
};

/// Shared measurement of a section's element.
pub type SharedBoundsFn = Rc<dyn Fn() -> Option<Bounds>>;

/// What a section brings when it mounts: its element and the timelines bound to it.
#[derive(Clone)]
pub struct SectionSpec {
    pub name: String,
    pub(crate) bounds: SharedBoundsFn,
    pub timelines: Vec<TimelineConfig>,
}

impl SectionSpec {
    pub fn new(name: impl Into<String>, bounds: impl Fn() -> Option<Bounds> + 'static) -> Self {
        Self {
            name: name.into(),
            bounds: Rc::new(bounds),
            timelines: Vec::new(),
        }
    }

    pub fn timeline(mut self, timeline: TimelineConfig) -> Self {
        self.timelines.push(timeline);
        self
    }

    pub fn timelines(mut self, timelines: impl IntoIterator<Item = TimelineConfig>) -> Self {
        self.timelines.extend(timelines);
        self
    }

    pub fn measure(&self) -> Option<Bounds> {
        (self.bounds)()
    }
}

impl std::fmt::Debug for SectionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionSpec")
            .field("name", &self.name)
            .field("timelines", &self.timelines.len())
            .finish()
    }
}

/// A mounted section and everything it registered.
pub struct Section {
    name: String,
    pub(crate) bounds: SharedBoundsFn,
    pub(crate) triggers: Vec<TriggerId>,
    pub(crate) timelines: Vec<TimelineId>,
    rejected: usize,
}

impl Section {
    pub(crate) fn new(name: String, bounds: SharedBoundsFn) -> Self {
        Self {
            name,
            bounds,
            triggers: Vec::new(),
            timelines: Vec::new(),
            rejected: 0,
        }
    }

    pub(crate) fn reject(&mut self) {
        self.rejected += 1;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn triggers(&self) -> &[TriggerId] {
        &self.triggers
    }

    pub fn timelines(&self) -> &[TimelineId] {
        &self.timelines
    }

    /// Timelines skipped at mount because their configuration was invalid.
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}

impl std::fmt::Debug for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Section")
            .field("name", &self.name)
            .field("triggers", &self.triggers)
            .field("timelines", &self.timelines)
            .field("rejected", &self.rejected)
            .finish()
    }
}
