//! Timeline configurations used by the portfolio site sections.

use crate::{
    animation::ease::Ease,
    animation::keyframe::{Keyframes, PropertySet},
    animation::stagger::Stagger,
    foundation::core::TargetId,
    scroll::simulator::SmoothingConfig,
    timeline::spec::{TimelineConfig, TimelineMode, TimelineSpec},
    trigger::anchor::{Anchor, ViewportPos},
};

/// Smoothing duration the site pairs with its lerp; the lerp takes precedence.
pub const SMOOTH_SCROLL_DURATION: f64 = 1.4;

/// Seconds a scrubbed timeline takes to catch up with the scroll position.
pub const SCRUB_LAG: f64 = 1.0;

/// Named preset, as referenced from scene files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    CertificationsEntrance,
    CertificationsExit,
    ContactEntrance,
}

impl Preset {
    pub fn timeline(self, targets: Vec<TargetId>) -> TimelineConfig {
        match self {
            Self::CertificationsEntrance => certifications_entrance(targets),
            Self::CertificationsExit => certifications_exit(targets),
            Self::ContactEntrance => contact_entrance(targets),
        }
    }
}

pub fn smooth_scroll() -> SmoothingConfig {
    SmoothingConfig {
        lerp: 0.1,
        ..SmoothingConfig::default()
    }
}

fn slide_up() -> PropertySet {
    PropertySet::new().y(50.0).opacity(0.0)
}

/// Items slide up and fade in one after another once the list top reaches 60% of the
/// viewport, and play back out when scrolled back above it.
pub fn certifications_entrance(items: Vec<TargetId>) -> TimelineConfig {
    TimelineConfig::new(
        Anchor::top(ViewportPos::Fraction(0.6)),
        Anchor::bottom(ViewportPos::Fraction(0.5)),
        TimelineSpec::new(Keyframes::from(slide_up(), Ease::OutQuad), items)
            .mode(TimelineMode::PlayOnce)
            .stagger(Stagger::new(0.3)),
    )
}

/// The whole container lifts away and fades out as its bottom leaves the viewport.
pub fn certifications_exit(container: Vec<TargetId>) -> TimelineConfig {
    TimelineConfig::new(
        Anchor::bottom(ViewportPos::Fraction(0.5)),
        Anchor::bottom(ViewportPos::Fraction(0.2)),
        TimelineSpec::new(
            Keyframes::to(PropertySet::new().y(-150.0).opacity(0.0), Ease::OutQuad),
            container,
        )
        .scrub_lag(SCRUB_LAG),
    )
}

pub fn contact_entrance(items: Vec<TargetId>) -> TimelineConfig {
    TimelineConfig::new(
        Anchor::top(ViewportPos::Fraction(0.8)),
        Anchor::bottom(ViewportPos::Fraction(0.7)),
        TimelineSpec::new(Keyframes::from(slide_up(), Ease::OutQuad), items)
            .stagger(Stagger::new(0.1))
            .target_duration(0.5)
            .scrub_lag(SCRUB_LAG),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/scene/presets.rs"]
mod tests;
