use crate::foundation::error::{ScrollSyncError, ScrollSyncResult};

pub use kurbo::{Affine, Rect, Vec2};

/// Handle to a registered trigger zone.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TriggerId(pub u64);

/// Handle to a registered timeline.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TimelineId(pub u64);

/// Opaque identifier of a visual target owned by the host.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TargetId(pub u64);

/// Handle to a mounted visual section.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct SectionId(pub u64);

impl std::fmt::Display for TriggerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "trigger#{}", self.0)
    }
}

impl std::fmt::Display for TimelineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timeline#{}", self.0)
    }
}

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "target#{}", self.0)
    }
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "section#{}", self.0)
    }
}

/// Vertical extent of an element in document coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bounds {
    pub top: f64,
    pub bottom: f64, // >= top
}

impl Bounds {
    pub fn new(top: f64, bottom: f64) -> ScrollSyncResult<Self> {
        let b = Self { top, bottom };
        b.validate()?;
        Ok(b)
    }

    /// Vertical extent of a measured rectangle (`y0..y1`).
    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Self {
            top: rect.y0,
            bottom: rect.y1,
        }
    }

    pub fn height(self) -> f64 {
        self.bottom - self.top
    }

    pub fn validate(self) -> ScrollSyncResult<()> {
        if !self.top.is_finite() || !self.bottom.is_finite() {
            return Err(ScrollSyncError::validation("bounds must be finite"));
        }
        if self.bottom < self.top {
            return Err(ScrollSyncError::validation("bounds bottom must be >= top"));
        }
        Ok(())
    }
}

/// Scroll direction derived from the change of the virtual offset over one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    /// Offset increased (content moves up).
    Forward,
    /// Offset decreased.
    Backward,
    #[default]
    Idle,
}

impl Direction {
    pub fn from_delta(delta: f64) -> Self {
        if delta > 0.0 {
            Self::Forward
        } else if delta < 0.0 {
            Self::Backward
        } else {
            Self::Idle
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
