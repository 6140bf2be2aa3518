use std::collections::BTreeMap;

use crate::{
    foundation::core::{Bounds, TriggerId},
    foundation::error::{ScrollSyncError, ScrollSyncResult},
    foundation::math::range_progress,
    trigger::anchor::Anchor,
};

/// Live measurement of a trigger element; `None` when it is missing or unmeasurable.
pub type BoundsFn = Box<dyn Fn() -> Option<Bounds>>;

/// Absolute document-space scroll range of a trigger zone.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TriggerRange {
    pub start: f64,
    pub end: f64,
}

impl TriggerRange {
    /// Normalized progress of `offset` through the range.
    ///
    /// Zero-length or inverted ranges step from 0 to 1 at `start`.
    pub fn progress(&self, offset: f64) -> f64 {
        range_progress(offset, self.start, self.end)
    }

    pub fn is_degenerate(&self) -> bool {
        self.end <= self.start
    }
}

struct TriggerZone {
    bounds_fn: BoundsFn,
    start: Anchor,
    end: Anchor,
    generation: u64,
    cached: Option<TriggerRange>,
    dirty: bool,
}

impl TriggerZone {
    fn measure(&self, viewport_height: f64) -> ScrollSyncResult<TriggerRange> {
        let bounds = (self.bounds_fn)()
            .ok_or_else(|| ScrollSyncError::runtime("trigger element is not measurable"))?;
        bounds
            .validate()
            .map_err(|e| ScrollSyncError::runtime(format!("trigger element bounds: {e}")))?;
        Ok(TriggerRange {
            start: self.start.resolve(bounds, viewport_height),
            end: self.end.resolve(bounds, viewport_height),
        })
    }
}

/// Owns trigger zones and their cached document-space ranges.
///
/// Ranges are recomputed only for zones invalidated since the last [`TriggerRegistry::refresh`].
pub struct TriggerRegistry {
    zones: BTreeMap<TriggerId, TriggerZone>,
    viewport_height: f64,
    next_id: u64,
}

impl TriggerRegistry {
    pub fn new(viewport_height: f64) -> ScrollSyncResult<Self> {
        validate_viewport(viewport_height)?;
        Ok(Self {
            zones: BTreeMap::new(),
            viewport_height,
            next_id: 0,
        })
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn contains(&self, id: TriggerId) -> bool {
        self.zones.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = TriggerId> + '_ {
        self.zones.keys().copied()
    }

    pub fn register(
        &mut self,
        bounds_fn: impl Fn() -> Option<Bounds> + 'static,
        start: Anchor,
        end: Anchor,
    ) -> ScrollSyncResult<TriggerId> {
        start.validate()?;
        end.validate()?;
        let id = TriggerId(self.next_id);
        self.next_id += 1;
        self.zones.insert(
            id,
            TriggerZone {
                bounds_fn: Box::new(bounds_fn),
                start,
                end,
                generation: 0,
                cached: None,
                dirty: true,
            },
        );
        Ok(id)
    }

    /// Register with anchors in string form, e.g. `"top 60%"`.
    pub fn register_parsed(
        &mut self,
        bounds_fn: impl Fn() -> Option<Bounds> + 'static,
        start: &str,
        end: &str,
    ) -> ScrollSyncResult<TriggerId> {
        let start = Anchor::parse(start)?;
        let end = Anchor::parse(end)?;
        self.register(bounds_fn, start, end)
    }

    pub fn unregister(&mut self, id: TriggerId) -> bool {
        self.zones.remove(&id).is_some()
    }

    /// Rebind a zone to a new measurement and bump its generation.
    pub fn remeasure(
        &mut self,
        id: TriggerId,
        bounds_fn: impl Fn() -> Option<Bounds> + 'static,
    ) -> ScrollSyncResult<()> {
        let zone = self
            .zones
            .get_mut(&id)
            .ok_or_else(|| ScrollSyncError::runtime(format!("{id} is not registered")))?;
        zone.bounds_fn = Box::new(bounds_fn);
        zone.generation += 1;
        zone.dirty = true;
        Ok(())
    }

    pub fn generation(&self, id: TriggerId) -> Option<u64> {
        self.zones.get(&id).map(|z| z.generation)
    }

    pub fn anchors(&self, id: TriggerId) -> Option<(Anchor, Anchor)> {
        self.zones.get(&id).map(|z| (z.start, z.end))
    }

    pub fn set_viewport_height(&mut self, viewport_height: f64) -> ScrollSyncResult<()> {
        validate_viewport(viewport_height)?;
        if viewport_height != self.viewport_height {
            self.viewport_height = viewport_height;
            self.invalidate_all();
        }
        Ok(())
    }

    pub fn invalidate(&mut self, id: TriggerId) {
        if let Some(zone) = self.zones.get_mut(&id) {
            zone.dirty = true;
        }
    }

    pub fn invalidate_all(&mut self) {
        for zone in self.zones.values_mut() {
            zone.dirty = true;
        }
    }

    pub fn dirty_count(&self) -> usize {
        self.zones.values().filter(|z| z.dirty).count()
    }

    /// Recompute ranges of invalidated zones. Returns how many were measured.
    pub fn refresh(&mut self) -> usize {
        let vh = self.viewport_height;
        let mut measured = 0;
        for zone in self.zones.values_mut().filter(|z| z.dirty) {
            zone.cached = zone.measure(vh).ok();
            zone.dirty = false;
            measured += 1;
        }
        measured
    }

    /// Measure a zone now, bypassing the cache.
    pub fn resolve(&self, id: TriggerId) -> ScrollSyncResult<TriggerRange> {
        self.zone(id)?.measure(self.viewport_height)
    }

    /// Range as of the last refresh.
    pub fn cached(&self, id: TriggerId) -> ScrollSyncResult<TriggerRange> {
        let zone = self.zone(id)?;
        if zone.dirty {
            return zone.measure(self.viewport_height);
        }
        zone.cached
            .ok_or_else(|| ScrollSyncError::runtime(format!("{id} element is not measurable")))
    }

    fn zone(&self, id: TriggerId) -> ScrollSyncResult<&TriggerZone> {
        self.zones
            .get(&id)
            .ok_or_else(|| ScrollSyncError::runtime(format!("{id} is not registered")))
    }
}

impl std::fmt::Debug for TriggerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerRegistry")
            .field("zones", &self.zones.len())
            .field("viewport_height", &self.viewport_height)
            .finish()
    }
}

fn validate_viewport(h: f64) -> ScrollSyncResult<()> {
    if !h.is_finite() || h < 0.0 {
        return Err(ScrollSyncError::validation(format!(
            "viewport height {h} must be finite and >= 0"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/trigger/registry.rs"]
mod tests;
