use crate::{
    foundation::core::Direction,
    foundation::error::{ScrollSyncError, ScrollSyncResult},
    foundation::math::{clamp01, damp_factor, lerp_for_settle_time},
    scroll::surface::ScrollSurface,
};

/// Smoothing applied to the virtual offset and to raw input deltas.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Share of the remaining gap closed per 60 Hz frame, in `(0, 1]`.
    pub lerp: f64,
    pub wheel_multiplier: f64,
    pub touch_multiplier: f64,
    /// Ease touch input like wheel input; otherwise touch moves the virtual offset directly.
    pub smooth_touch: bool,
    /// Gap below which the virtual offset snaps to the raw offset.
    pub settle_epsilon: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            lerp: 0.1,
            wheel_multiplier: 1.0,
            touch_multiplier: 1.0,
            smooth_touch: false,
            settle_epsilon: 0.5,
        }
    }
}

impl SmoothingConfig {
    /// Smoothing that closes 99% of a gap within `secs`.
    pub fn from_duration(secs: f64) -> Self {
        Self {
            lerp: lerp_for_settle_time(secs),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ScrollSyncResult<()> {
        if !self.lerp.is_finite() || self.lerp <= 0.0 || self.lerp > 1.0 {
            return Err(ScrollSyncError::configuration(format!(
                "smoothing lerp {} must be in (0, 1]",
                self.lerp
            )));
        }
        for (name, v) in [
            ("wheel_multiplier", self.wheel_multiplier),
            ("touch_multiplier", self.touch_multiplier),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(ScrollSyncError::configuration(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        if !self.settle_epsilon.is_finite() || self.settle_epsilon < 0.0 {
            return Err(ScrollSyncError::configuration(
                "settle_epsilon must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

/// Source of a discrete scroll delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum InputKind {
    Wheel,
    Touch,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct ScrollState {
    pub raw_offset: f64,
    pub virtual_offset: f64,
    pub previous_virtual_offset: f64,
    pub velocity: f64, // px/s over the last tick
    pub limit: f64,    // max scroll offset
}

impl ScrollState {
    /// Remaining raw-to-virtual gap.
    pub fn delta(&self) -> f64 {
        self.raw_offset - self.virtual_offset
    }

    pub fn direction(&self) -> Direction {
        Direction::from_delta(self.virtual_offset - self.previous_virtual_offset)
    }

    /// Page-level scroll progress in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.limit <= 0.0 {
            return 0.0;
        }
        clamp01(self.virtual_offset / self.limit)
    }
}

/// Virtual scroll position eased toward the raw device offset once per tick.
#[derive(Clone, Debug)]
pub struct ScrollSimulator {
    config: SmoothingConfig,
    state: ScrollState,
    stopped: bool,
    attached: bool,
}

impl ScrollSimulator {
    pub fn new(config: SmoothingConfig) -> ScrollSyncResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: ScrollState::default(),
            stopped: false,
            attached: false,
        })
    }

    pub fn config(&self) -> &SmoothingConfig {
        &self.config
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    pub fn virtual_offset(&self) -> f64 {
        self.state.virtual_offset
    }

    pub fn previous_virtual_offset(&self) -> f64 {
        self.state.previous_virtual_offset
    }

    pub fn raw_offset(&self) -> f64 {
        self.state.raw_offset
    }

    pub fn direction(&self) -> Direction {
        self.state.direction()
    }

    pub fn is_settled(&self) -> bool {
        self.state.raw_offset == self.state.virtual_offset
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Set the maximum offset (document height minus viewport height).
    pub fn set_limit(&mut self, limit: f64) -> ScrollSyncResult<()> {
        if !limit.is_finite() {
            return Err(ScrollSyncError::validation("scroll limit must be finite"));
        }
        let limit = limit.max(0.0);
        self.state.limit = limit;
        self.state.raw_offset = self.state.raw_offset.clamp(0.0, limit);
        self.state.virtual_offset = self.state.virtual_offset.clamp(0.0, limit);
        self.state.previous_virtual_offset = self.state.previous_virtual_offset.clamp(0.0, limit);
        Ok(())
    }

    /// Feed a discrete wheel or touch delta.
    pub fn scroll_by(&mut self, delta: f64, kind: InputKind) {
        if self.stopped || !delta.is_finite() {
            return;
        }
        let multiplier = match kind {
            InputKind::Wheel => self.config.wheel_multiplier,
            InputKind::Touch => self.config.touch_multiplier,
        };
        self.state.raw_offset = self.clamp(self.state.raw_offset + delta * multiplier);
        if kind == InputKind::Touch && !self.config.smooth_touch {
            self.state.virtual_offset = self.state.raw_offset;
        }
    }

    pub fn scroll_to(&mut self, offset: f64, immediate: bool) {
        if self.stopped || !offset.is_finite() {
            return;
        }
        self.state.raw_offset = self.clamp(offset);
        if immediate {
            self.state.virtual_offset = self.state.raw_offset;
            self.state.previous_virtual_offset = self.state.raw_offset;
            self.state.velocity = 0.0;
        }
    }

    /// Adopt an offset reported by native scrolling.
    pub fn set_raw_offset(&mut self, offset: f64) {
        if !offset.is_finite() {
            return;
        }
        self.state.raw_offset = self.clamp(offset);
    }

    /// Freeze at the current virtual offset and ignore further input.
    pub fn stop(&mut self) {
        self.stopped = true;
        self.state.raw_offset = self.state.virtual_offset;
    }

    pub fn start(&mut self) {
        self.stopped = false;
    }

    /// Ease the virtual offset toward the raw offset over `dt` seconds.
    ///
    /// The approach is monotone: the virtual offset never passes the raw offset.
    /// A non-positive `dt` leaves the offset where it is.
    pub fn advance(&mut self, dt: f64) -> f64 {
        let prev = self.state.virtual_offset;
        self.state.previous_virtual_offset = prev;
        if !dt.is_finite() || dt <= 0.0 {
            self.state.velocity = 0.0;
            return prev;
        }

        let gap = self.state.raw_offset - prev;
        if gap.abs() <= self.config.settle_epsilon {
            self.state.virtual_offset = self.state.raw_offset;
        } else {
            let next = prev + gap * damp_factor(self.config.lerp, dt);
            // Guard against rounding past the target.
            self.state.virtual_offset = if gap > 0.0 {
                next.min(self.state.raw_offset)
            } else {
                next.max(self.state.raw_offset)
            };
        }

        self.state.velocity = (self.state.virtual_offset - prev) / dt;
        self.state.virtual_offset
    }

    pub fn attach(&mut self, surface: &mut dyn ScrollSurface) {
        surface.set_native_scroll_suppressed(true);
        surface.translate_document(-self.state.virtual_offset);
        self.attached = true;
    }

    /// Mirror the current virtual offset onto the document while attached.
    pub fn render(&self, surface: &mut dyn ScrollSurface) {
        if self.attached {
            surface.translate_document(-self.state.virtual_offset);
        }
    }

    pub fn detach(&mut self, surface: &mut dyn ScrollSurface) {
        if !self.attached {
            return;
        }
        surface.clear_document_translation();
        surface.set_native_scroll_suppressed(false);
        self.attached = false;
    }

    fn clamp(&self, offset: f64) -> f64 {
        offset.clamp(0.0, self.state.limit)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/simulator.rs"]
mod tests;
