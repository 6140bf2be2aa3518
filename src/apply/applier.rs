use crate::{
    animation::keyframe::{Property, PropertyValues},
    foundation::core::{Affine, TargetId, Vec2},
    foundation::error::ScrollSyncResult,
};

/// Side-effect boundary that writes resolved values to visual targets.
///
/// Implementations never compute values and must be idempotent: applying the same values
/// twice has no additional visible effect. Returning an error marks the owning timeline as
/// skipped (for example, when the target left the document).
pub trait Applier {
    fn apply(&mut self, target: TargetId, values: &PropertyValues) -> ScrollSyncResult<()>;
}

impl<A: Applier + ?Sized> Applier for Box<A> {
    fn apply(&mut self, target: TargetId, values: &PropertyValues) -> ScrollSyncResult<()> {
        (**self).apply(target, values)
    }
}

/// Full style of a target with unanimated properties at their rest values.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TargetStyle {
    pub opacity: f64,
    pub translate: Vec2,
    pub scale: f64,
}

impl Default for TargetStyle {
    fn default() -> Self {
        Self {
            opacity: Property::Opacity.rest_value(),
            translate: Vec2::new(
                Property::TranslateX.rest_value(),
                Property::TranslateY.rest_value(),
            ),
            scale: Property::Scale.rest_value(),
        }
    }
}

impl TargetStyle {
    pub fn from_values(values: &[(Property, f64)]) -> Self {
        Self::default().with_values(values)
    }

    /// Overlay `values` on top of `self`.
    pub fn with_values(mut self, values: &[(Property, f64)]) -> Self {
        for &(p, v) in values {
            match p {
                Property::Opacity => self.opacity = v,
                Property::TranslateX => self.translate.x = v,
                Property::TranslateY => self.translate.y = v,
                Property::Scale => self.scale = v,
            }
        }
        self
    }

    pub fn to_affine(self) -> Affine {
        // Canonical order: T(translate) * S(scale)
        Affine::translate(self.translate) * Affine::scale(self.scale)
    }

    /// Inline CSS declarations for hosts that style DOM-like nodes.
    pub fn css(&self) -> String {
        format!(
            "opacity: {}; transform: translate({}px, {}px) scale({})",
            self.opacity, self.translate.x, self.translate.y, self.scale
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/apply/applier.rs"]
mod tests;
