use crate::{
    foundation::error::{ScrollSyncError, ScrollSyncResult},
    scroll::simulator::SmoothingConfig,
};

/// Engine-wide options.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub smoothing: SmoothingConfig,
    /// Largest time step (seconds) a single frame may advance by.
    pub max_frame_dt: f64,
    /// Drive the document from the virtual offset. When off, the virtual offset tracks the
    /// raw offset directly and native scrolling stays in charge.
    pub smooth_scroll: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            smoothing: SmoothingConfig::default(),
            max_frame_dt: 0.1,
            smooth_scroll: true,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> ScrollSyncResult<()> {
        self.smoothing.validate()?;
        if !self.max_frame_dt.is_finite() || self.max_frame_dt <= 0.0 {
            return Err(ScrollSyncError::configuration(format!(
                "max_frame_dt {} must be finite and > 0",
                self.max_frame_dt
            )));
        }
        Ok(())
    }

    /// Smoothing the simulator actually runs with.
    pub(crate) fn effective_smoothing(&self) -> SmoothingConfig {
        if self.smooth_scroll {
            self.smoothing
        } else {
            SmoothingConfig {
                lerp: 1.0,
                ..self.smoothing
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/config.rs"]
mod tests;
