use std::collections::BTreeMap;

use crate::{
    animation::keyframe::PropertyValues,
    animation::stagger::local_progress,
    foundation::core::{TargetId, TimelineId, TriggerId},
    foundation::error::ScrollSyncResult,
    foundation::math::{damp_factor, lerp, lerp_for_settle_time},
    timeline::playback::{PlayState, Playback, Side},
    timeline::spec::{TimelineMode, TimelineSpec},
    trigger::registry::{TriggerRange, TriggerRegistry},
};

/// Gap below which lagged scrub progress snaps onto its target.
const SCRUB_SNAP: f64 = 1e-4;

/// One target's property values for the current tick.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ResolvedWrite {
    pub timeline: TimelineId,
    pub target: TargetId,
    pub values: PropertyValues,
}

/// Stateless view of a timeline at a fixed scroll offset.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TimelineSample {
    pub timeline: TimelineId,
    pub trigger: TriggerId,
    pub mode: TimelineMode,
    pub range: TriggerRange,
    pub progress: f64,
    pub writes: Vec<ResolvedWrite>,
}

#[derive(Clone, Debug, PartialEq)]
enum Activity {
    Active,
    /// Skipped until the trigger's generation moves past `generation`.
    Inactive { generation: u64, reason: String },
}

#[derive(Debug)]
struct Timeline {
    trigger: TriggerId,
    spec: TimelineSpec,
    delays: Vec<f64>,
    total: f64,
    playback: Playback,
    scrub: Option<f64>,
    progress: f64,
    activity: Activity,
}

impl Timeline {
    /// Timeline time for this tick, advancing scrub lag or playback state.
    fn advance(&mut self, range: TriggerRange, offset: f64, dt: f64) -> f64 {
        match self.spec.mode {
            TimelineMode::ScrubLinked => {
                let target = range.progress(offset);
                let applied = match self.scrub {
                    Some(current) if self.spec.scrub_lag > 0.0 => {
                        let factor = damp_factor(lerp_for_settle_time(self.spec.scrub_lag), dt);
                        let next = lerp(current, target, factor);
                        if (target - next).abs() < SCRUB_SNAP {
                            target
                        } else {
                            next
                        }
                    }
                    _ => target,
                };
                self.scrub = Some(applied);
                self.progress = applied;
                applied * self.total
            }
            TimelineMode::PlayOnce => {
                let head = self.playback.update(Side::of(offset, range.start), dt);
                self.progress = head / self.total;
                head
            }
        }
    }

    fn resolve(&self, id: TimelineId, time: f64, out: &mut Vec<ResolvedWrite>) {
        for (target, delay) in self.spec.targets.iter().zip(&self.delays) {
            let local = local_progress(time, *delay, self.spec.target_duration);
            out.push(ResolvedWrite {
                timeline: id,
                target: *target,
                values: self.spec.keyframes.sample(local),
            });
        }
    }
}

/// Owns timelines and turns scroll offsets into per-target property values.
///
/// Ticking never writes anything itself; the caller hands the returned writes to an
/// [`Applier`](crate::Applier).
#[derive(Debug, Default)]
pub struct TimelineScheduler {
    timelines: BTreeMap<TimelineId, Timeline>,
    next_id: u64,
}

impl TimelineScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.timelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }

    pub fn contains(&self, id: TimelineId) -> bool {
        self.timelines.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = TimelineId> + '_ {
        self.timelines.keys().copied()
    }

    pub fn trigger_of(&self, id: TimelineId) -> Option<TriggerId> {
        self.timelines.get(&id).map(|t| t.trigger)
    }

    /// Timelines scheduled on `trigger`.
    pub fn bound_to(&self, trigger: TriggerId) -> Vec<TimelineId> {
        self.timelines
            .iter()
            .filter(|(_, t)| t.trigger == trigger)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn spec(&self, id: TimelineId) -> Option<&TimelineSpec> {
        self.timelines.get(&id).map(|t| &t.spec)
    }

    /// Schedule a timeline on `trigger`. Invalid specs are rejected and nothing is scheduled.
    pub fn register_timeline(
        &mut self,
        trigger: TriggerId,
        spec: TimelineSpec,
    ) -> ScrollSyncResult<TimelineId> {
        spec.validate()?;
        let id = TimelineId(self.next_id);
        self.next_id += 1;
        let total = spec.total_duration();
        self.timelines.insert(
            id,
            Timeline {
                trigger,
                delays: spec.delays(),
                total,
                playback: Playback::new(total),
                scrub: None,
                progress: 0.0,
                activity: Activity::Active,
                spec,
            },
        );
        Ok(id)
    }

    pub fn unregister_timeline(&mut self, id: TimelineId) -> bool {
        self.timelines.remove(&id).is_some()
    }

    /// Stop ticking `id` until its trigger is re-registered.
    pub fn deactivate(&mut self, id: TimelineId, registry: &TriggerRegistry, reason: &str) {
        let Some(timeline) = self.timelines.get_mut(&id) else {
            return;
        };
        let generation = registry.generation(timeline.trigger).unwrap_or(0);
        timeline.activity = Activity::Inactive {
            generation,
            reason: reason.to_owned(),
        };
    }

    pub fn is_active(&self, id: TimelineId) -> bool {
        self.timelines
            .get(&id)
            .is_some_and(|t| t.activity == Activity::Active)
    }

    pub fn inactive_reason(&self, id: TimelineId) -> Option<&str> {
        match &self.timelines.get(&id)?.activity {
            Activity::Active => None,
            Activity::Inactive { reason, .. } => Some(reason),
        }
    }

    /// Applied progress of the last tick, in `[0, 1]`.
    pub fn progress(&self, id: TimelineId) -> Option<f64> {
        self.timelines.get(&id).map(|t| t.progress)
    }

    pub fn play_state(&self, id: TimelineId) -> Option<PlayState> {
        let timeline = self.timelines.get(&id)?;
        (timeline.spec.mode == TimelineMode::PlayOnce).then(|| timeline.playback.state())
    }

    /// Seconds into a `PlayOnce` timeline.
    pub fn playhead(&self, id: TimelineId) -> Option<f64> {
        let timeline = self.timelines.get(&id)?;
        (timeline.spec.mode == TimelineMode::PlayOnce).then(|| timeline.playback.playhead())
    }

    /// Resolve every active timeline at `offset`, `dt` seconds after the previous tick.
    pub fn tick(
        &mut self,
        registry: &TriggerRegistry,
        offset: f64,
        dt: f64,
    ) -> Vec<ResolvedWrite> {
        let mut writes = Vec::new();
        for (id, timeline) in &mut self.timelines {
            let Some(generation) = registry.generation(timeline.trigger) else {
                continue;
            };
            if let Activity::Inactive { generation: seen, .. } = timeline.activity {
                if seen == generation {
                    continue;
                }
                tracing::debug!(timeline = %id, "reactivated after trigger re-registration");
                timeline.activity = Activity::Active;
                timeline.scrub = None;
            }
            let range = match registry.cached(timeline.trigger) {
                Ok(range) => range,
                Err(err) => {
                    tracing::warn!(timeline = %id, trigger = %timeline.trigger, error = %err, "deactivating timeline");
                    timeline.activity = Activity::Inactive {
                        generation,
                        reason: err.to_string(),
                    };
                    continue;
                }
            };
            let time = timeline.advance(range, offset, dt);
            timeline.resolve(*id, time, &mut writes);
        }
        writes
    }

    /// Settled values of every active timeline at `offset`, without touching tick state.
    ///
    /// `PlayOnce` timelines report their rest position on either side of the start:
    /// fully played past it, fully reversed before it.
    pub fn sample(&self, registry: &TriggerRegistry, offset: f64) -> Vec<TimelineSample> {
        let mut samples = Vec::new();
        for (id, timeline) in &self.timelines {
            if timeline.activity != Activity::Active {
                continue;
            }
            let Ok(range) = registry.resolve(timeline.trigger) else {
                continue;
            };
            let progress = match timeline.spec.mode {
                TimelineMode::ScrubLinked => range.progress(offset),
                TimelineMode::PlayOnce => match Side::of(offset, range.start) {
                    Side::After => 1.0,
                    Side::Before => 0.0,
                },
            };
            let mut writes = Vec::new();
            timeline.resolve(*id, progress * timeline.total, &mut writes);
            samples.push(TimelineSample {
                timeline: *id,
                trigger: timeline.trigger,
                mode: timeline.spec.mode,
                range,
                progress,
                writes,
            });
        }
        samples
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/scheduler.rs"]
mod tests;
