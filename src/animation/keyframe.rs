use smallvec::SmallVec;

use crate::{
    animation::ease::Ease,
    foundation::error::{ScrollSyncError, ScrollSyncResult},
    foundation::math::lerp,
};

/// Interpolated style property a timeline may drive.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Property {
    Opacity,
    TranslateX,
    TranslateY,
    Scale,
}

impl Property {
    pub const ALL: [Property; 4] = [
        Property::Opacity,
        Property::TranslateX,
        Property::TranslateY,
        Property::Scale,
    ];

    /// Value the property has when no animation touches it.
    pub fn rest_value(self) -> f64 {
        match self {
            Self::Opacity | Self::Scale => 1.0,
            Self::TranslateX | Self::TranslateY => 0.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Opacity => "opacity",
            Self::TranslateX => "x",
            Self::TranslateY => "y",
            Self::Scale => "scale",
        }
    }
}

/// Resolved values for one target, in [`Property::ALL`] order.
pub type PropertyValues = SmallVec<[(Property, f64); 4]>;

/// Sparse set of property values carried by a keyframe.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PropertySet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opacity(self, v: f64) -> Self {
        self.with(Property::Opacity, v)
    }

    pub fn x(self, v: f64) -> Self {
        self.with(Property::TranslateX, v)
    }

    pub fn y(self, v: f64) -> Self {
        self.with(Property::TranslateY, v)
    }

    pub fn scale(self, v: f64) -> Self {
        self.with(Property::Scale, v)
    }

    pub fn with(mut self, prop: Property, v: f64) -> Self {
        self.set(prop, v);
        self
    }

    pub fn set(&mut self, prop: Property, v: f64) {
        *self.slot_mut(prop) = Some(v);
    }

    pub fn get(&self, prop: Property) -> Option<f64> {
        match prop {
            Property::Opacity => self.opacity,
            Property::TranslateX => self.x,
            Property::TranslateY => self.y,
            Property::Scale => self.scale,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, f64)> + '_ {
        Property::ALL
            .into_iter()
            .filter_map(|p| self.get(p).map(|v| (p, v)))
    }

    /// Same properties as `self`, each at its rest value.
    pub fn rest(&self) -> Self {
        let mut out = Self::default();
        for (p, _) in self.iter() {
            out.set(p, p.rest_value());
        }
        out
    }

    fn slot_mut(&mut self, prop: Property) -> &mut Option<f64> {
        match prop {
            Property::Opacity => &mut self.opacity,
            Property::TranslateX => &mut self.x,
            Property::TranslateY => &mut self.y,
            Property::Scale => &mut self.scale,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe {
    pub at: f64, // position along the target's local progress, [0, 1]
    pub props: PropertySet,
    #[serde(default)]
    pub ease: Ease, // ease applied toward next key
}

/// Ordered keyframe sequence sampled by local progress.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Keyframes {
    pub keys: Vec<Keyframe>, // sorted by `at`
}

impl Keyframes {
    pub fn new(keys: Vec<Keyframe>) -> Self {
        Self { keys }
    }

    /// Animate from `props` to the rest value of every listed property.
    pub fn from(props: PropertySet, ease: Ease) -> Self {
        Self::from_to(props, props.rest(), ease)
    }

    /// Animate from rest values to `props`.
    pub fn to(props: PropertySet, ease: Ease) -> Self {
        Self::from_to(props.rest(), props, ease)
    }

    pub fn from_to(from: PropertySet, to: PropertySet, ease: Ease) -> Self {
        Self {
            keys: vec![
                Keyframe {
                    at: 0.0,
                    props: from,
                    ease,
                },
                Keyframe {
                    at: 1.0,
                    props: to,
                    ease: Ease::Linear,
                },
            ],
        }
    }

    pub fn validate(&self) -> ScrollSyncResult<()> {
        if self.keys.is_empty() {
            return Err(ScrollSyncError::configuration(
                "keyframes must contain at least one key",
            ));
        }
        for (i, key) in self.keys.iter().enumerate() {
            if !key.at.is_finite() || !(0.0..=1.0).contains(&key.at) {
                return Err(ScrollSyncError::configuration(format!(
                    "keyframe {i} position {} is outside [0, 1]",
                    key.at
                )));
            }
            if let Some((p, v)) = key.props.iter().find(|(_, v)| !v.is_finite()) {
                return Err(ScrollSyncError::configuration(format!(
                    "keyframe {i} has non-finite {} value {v}",
                    p.name()
                )));
            }
        }
        if !self.keys.windows(2).all(|w| w[0].at <= w[1].at) {
            return Err(ScrollSyncError::configuration(
                "keyframe positions must be non-decreasing",
            ));
        }
        if self.keys.iter().all(|k| k.props.is_empty()) {
            return Err(ScrollSyncError::configuration(
                "keyframes do not animate any property",
            ));
        }
        Ok(())
    }

    /// Properties touched by any key, in [`Property::ALL`] order.
    pub fn properties(&self) -> SmallVec<[Property; 4]> {
        Property::ALL
            .into_iter()
            .filter(|p| self.keys.iter().any(|k| k.props.get(*p).is_some()))
            .collect()
    }

    /// Resolve every animated property at local progress `t`.
    pub fn sample(&self, t: f64) -> PropertyValues {
        self.properties()
            .into_iter()
            .filter_map(|p| self.sample_property(p, t).map(|v| (p, v)))
            .collect()
    }

    /// Interpolate one property between the keys that define it.
    ///
    /// Holds the first defining value before it and the last one after it.
    pub fn sample_property(&self, prop: Property, t: f64) -> Option<f64> {
        let mut prev: Option<(&Keyframe, f64)> = None;
        for key in &self.keys {
            let Some(v) = key.props.get(prop) else {
                continue;
            };
            if key.at > t {
                let Some((a, av)) = prev else {
                    return Some(v);
                };
                let span = key.at - a.at;
                if span <= 0.0 {
                    return Some(v);
                }
                let local = (t - a.at) / span;
                return Some(lerp(av, v, a.ease.apply(local)));
            }
            prev = Some((key, v));
        }
        prev.map(|(_, v)| v)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/keyframe.rs"]
mod tests;
