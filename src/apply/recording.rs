use std::collections::{BTreeMap, BTreeSet};

use crate::{
    animation::keyframe::PropertyValues,
    apply::applier::{Applier, TargetStyle},
    foundation::core::TargetId,
    foundation::error::{ScrollSyncError, ScrollSyncResult},
    scroll::surface::ScrollSurface,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct AppliedWrite {
    pub target: TargetId,
    pub style: TargetStyle,
}

/// In-memory applier for headless hosts and tests.
///
/// Keeps the latest style per target plus a log of writes since the last
/// [`RecordingApplier::take_writes`]. The log grows until taken; hosts that never drain it
/// should turn it off with [`RecordingApplier::without_log`].
#[derive(Debug)]
pub struct RecordingApplier {
    styles: BTreeMap<TargetId, TargetStyle>,
    log: Vec<AppliedWrite>,
    logging: bool,
    write_count: usize,
    detached: BTreeSet<TargetId>,
}

impl Default for RecordingApplier {
    fn default() -> Self {
        Self {
            styles: BTreeMap::new(),
            log: Vec::new(),
            logging: true,
            write_count: 0,
            detached: BTreeSet::new(),
        }
    }
}

impl RecordingApplier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track styles and counts only.
    pub fn without_log() -> Self {
        Self {
            logging: false,
            ..Self::default()
        }
    }

    pub fn set_logging(&mut self, logging: bool) {
        self.logging = logging;
        if !logging {
            self.log.clear();
        }
    }

    pub fn style(&self, target: TargetId) -> Option<TargetStyle> {
        self.styles.get(&target).copied()
    }

    /// Every successful write since construction, logged or not.
    pub fn write_count(&self) -> usize {
        self.write_count
    }

    /// Logged writes to `target` since the last [`RecordingApplier::take_writes`].
    pub fn writes_to(&self, target: TargetId) -> usize {
        self.log.iter().filter(|w| w.target == target).count()
    }

    pub fn take_writes(&mut self) -> Vec<AppliedWrite> {
        std::mem::take(&mut self.log)
    }

    /// Simulate the target leaving the document; later writes fail.
    pub fn remove_target(&mut self, target: TargetId) {
        self.detached.insert(target);
    }

    pub fn restore_target(&mut self, target: TargetId) {
        self.detached.remove(&target);
    }
}

impl Applier for RecordingApplier {
    fn apply(&mut self, target: TargetId, values: &PropertyValues) -> ScrollSyncResult<()> {
        if self.detached.contains(&target) {
            return Err(ScrollSyncError::runtime(format!(
                "{target} is no longer in the document"
            )));
        }
        let style = self
            .styles
            .get(&target)
            .copied()
            .unwrap_or_default()
            .with_values(values);
        self.styles.insert(target, style);
        if self.logging {
            self.log.push(AppliedWrite { target, style });
        }
        self.write_count += 1;
        Ok(())
    }
}

/// In-memory document surface.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub native_scroll_suppressed: bool,
    pub translation: Option<f64>,
    pub translate_calls: usize,
}

impl ScrollSurface for RecordingSurface {
    fn set_native_scroll_suppressed(&mut self, suppressed: bool) {
        self.native_scroll_suppressed = suppressed;
    }

    fn translate_document(&mut self, y: f64) {
        self.translation = Some(y);
        self.translate_calls += 1;
    }

    fn clear_document_translation(&mut self) {
        self.translation = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/apply/recording.rs"]
mod tests;
