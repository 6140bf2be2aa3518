use crate::{
    foundation::error::{ScrollSyncError, ScrollSyncResult},
    foundation::math::clamp01,
};

/// Which end of a target group starts first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum StaggerFrom {
    #[default]
    Start,
    End,
    Center,
}

/// Per-target start offset across a group sharing one timeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stagger {
    /// Delay between consecutive targets, in timeline units.
    pub each: f64,
    #[serde(default)]
    pub from: StaggerFrom,
}

impl Stagger {
    pub fn new(each: f64) -> Self {
        Self {
            each,
            from: StaggerFrom::Start,
        }
    }

    pub fn from(mut self, from: StaggerFrom) -> Self {
        self.from = from;
        self
    }

    pub fn validate(&self) -> ScrollSyncResult<()> {
        if !self.each.is_finite() {
            return Err(ScrollSyncError::configuration("stagger must be finite"));
        }
        if self.each < 0.0 {
            return Err(ScrollSyncError::configuration(format!(
                "stagger {} would order targets non-monotonically; it must be >= 0",
                self.each
            )));
        }
        Ok(())
    }

    /// Distance of target `index` from the group's starting end.
    pub fn rank(&self, index: usize, count: usize) -> f64 {
        if count == 0 {
            return 0.0;
        }
        let last = (count - 1) as f64;
        let i = index.min(count - 1) as f64;
        match self.from {
            StaggerFrom::Start => i,
            StaggerFrom::End => last - i,
            StaggerFrom::Center => (i - last / 2.0).abs(),
        }
    }

    pub fn delay(&self, index: usize, count: usize) -> f64 {
        self.each * self.rank(index, count)
    }

    pub fn delays(&self, count: usize) -> Vec<f64> {
        (0..count).map(|i| self.delay(i, count)).collect()
    }

    /// Largest delay in a group of `count` targets.
    pub fn span(&self, count: usize) -> f64 {
        (0..count)
            .map(|i| self.delay(i, count))
            .fold(0.0, f64::max)
    }
}

/// Progress of one staggered target at timeline time `time`.
pub fn local_progress(time: f64, delay: f64, duration: f64) -> f64 {
    if duration.is_nan() || duration <= 0.0 {
        return if time >= delay { 1.0 } else { 0.0 };
    }
    clamp01((time - delay) / duration)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/stagger.rs"]
mod tests;
