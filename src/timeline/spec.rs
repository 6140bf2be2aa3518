use crate::{
    animation::keyframe::Keyframes,
    animation::stagger::Stagger,
    foundation::core::TargetId,
    foundation::error::{ScrollSyncError, ScrollSyncResult},
    trigger::anchor::Anchor,
};

/// How a timeline derives its progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TimelineMode {
    /// Progress follows the scroll position through the trigger range.
    #[default]
    ScrubLinked,
    /// Crossing the trigger start plays the timeline in real time; crossing back reverses it.
    PlayOnce,
}

fn default_target_duration() -> f64 {
    0.5
}

/// Keyframes, drive mode and target group of one timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimelineSpec {
    pub keyframes: Keyframes,
    #[serde(default)]
    pub mode: TimelineMode,
    #[serde(default)]
    pub stagger: Stagger,
    /// Length of each target's own animation, in timeline units (seconds for `PlayOnce`).
    #[serde(default = "default_target_duration")]
    pub target_duration: f64,
    /// Seconds the applied progress takes to catch up with scroll (`ScrubLinked` only).
    #[serde(default)]
    pub scrub_lag: f64,
    pub targets: Vec<TargetId>,
}

impl TimelineSpec {
    pub fn new(keyframes: Keyframes, targets: Vec<TargetId>) -> Self {
        Self {
            keyframes,
            mode: TimelineMode::ScrubLinked,
            stagger: Stagger::default(),
            target_duration: default_target_duration(),
            scrub_lag: 0.0,
            targets,
        }
    }

    pub fn mode(mut self, mode: TimelineMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn stagger(mut self, stagger: Stagger) -> Self {
        self.stagger = stagger;
        self
    }

    pub fn target_duration(mut self, duration: f64) -> Self {
        self.target_duration = duration;
        self
    }

    pub fn scrub_lag(mut self, secs: f64) -> Self {
        self.scrub_lag = secs;
        self
    }

    pub fn validate(&self) -> ScrollSyncResult<()> {
        self.keyframes.validate()?;
        self.stagger.validate()?;
        if !self.target_duration.is_finite() || self.target_duration <= 0.0 {
            return Err(ScrollSyncError::configuration(format!(
                "target duration {} must be finite and > 0",
                self.target_duration
            )));
        }
        if !self.scrub_lag.is_finite() || self.scrub_lag < 0.0 {
            return Err(ScrollSyncError::configuration(format!(
                "scrub lag {} must be finite and >= 0",
                self.scrub_lag
            )));
        }
        if self.targets.is_empty() {
            return Err(ScrollSyncError::configuration(
                "timeline must animate at least one target",
            ));
        }
        Ok(())
    }

    /// Per-target start delays, in target order.
    pub fn delays(&self) -> Vec<f64> {
        self.stagger.delays(self.targets.len())
    }

    /// Time from the first target starting to the last one finishing.
    pub fn total_duration(&self) -> f64 {
        self.target_duration + self.stagger.span(self.targets.len())
    }
}

/// Complete per-timeline configuration: trigger anchors plus the timeline itself.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimelineConfig {
    pub start: Anchor,
    pub end: Anchor,
    #[serde(flatten)]
    pub spec: TimelineSpec,
}

impl TimelineConfig {
    pub fn new(start: Anchor, end: Anchor, spec: TimelineSpec) -> Self {
        Self { start, end, spec }
    }

    pub fn parse(start: &str, end: &str, spec: TimelineSpec) -> ScrollSyncResult<Self> {
        Ok(Self::new(Anchor::parse(start)?, Anchor::parse(end)?, spec))
    }

    pub fn validate(&self) -> ScrollSyncResult<()> {
        self.start.validate()?;
        self.end.validate()?;
        self.spec.validate()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/spec.rs"]
mod tests;
