use std::fmt;
use std::str::FromStr;

use crate::{
    foundation::core::Bounds,
    foundation::error::{ScrollSyncError, ScrollSyncResult},
};

/// Position inside the viewport, measured from its top edge.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ViewportPos {
    /// Share of the viewport height, `[0, 1]`.
    Fraction(f64),
    Pixels(f64),
}

/// "When this point of the element reaches that point of the viewport".
///
/// Parses from strings such as `"top 60%"`, `"bottom bottom"`, `"center 120px"` or
/// `"25% 75%"`. The first token names the element point, the second the viewport point.
/// A single keyword (`"top"`) is used for both.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
    /// Share of the element height, 0 = top edge, 1 = bottom edge.
    pub element: f64,
    pub viewport: ViewportPos,
}

impl Anchor {
    pub fn new(element: f64, viewport: ViewportPos) -> ScrollSyncResult<Self> {
        let a = Self { element, viewport };
        a.validate()?;
        Ok(a)
    }

    /// Element top edge against `viewport`.
    pub const fn top(viewport: ViewportPos) -> Self {
        Self {
            element: 0.0,
            viewport,
        }
    }

    pub const fn bottom(viewport: ViewportPos) -> Self {
        Self {
            element: 1.0,
            viewport,
        }
    }

    pub fn parse(s: &str) -> ScrollSyncResult<Self> {
        let mut tokens = s.split_whitespace();
        let (Some(first), second, None) = (tokens.next(), tokens.next(), tokens.next()) else {
            return Err(ScrollSyncError::configuration(format!(
                "anchor '{s}' must be '<element> <viewport>'"
            )));
        };
        let element = parse_fraction(first).ok_or_else(|| {
            ScrollSyncError::configuration(format!("anchor '{s}': bad element position '{first}'"))
        })?;
        let viewport = match second {
            Some(tok) => parse_viewport(tok).ok_or_else(|| {
                ScrollSyncError::configuration(format!(
                    "anchor '{s}': bad viewport position '{tok}'"
                ))
            })?,
            None if keyword(first).is_some() => ViewportPos::Fraction(element),
            None => {
                return Err(ScrollSyncError::configuration(format!(
                    "anchor '{s}' needs a viewport position"
                )));
            }
        };
        Self::new(element, viewport)
    }

    pub fn validate(&self) -> ScrollSyncResult<()> {
        if !self.element.is_finite() || !(0.0..=1.0).contains(&self.element) {
            return Err(ScrollSyncError::configuration(format!(
                "anchor element position {} must be in [0, 1]",
                self.element
            )));
        }
        match self.viewport {
            ViewportPos::Fraction(f) if !f.is_finite() || !(0.0..=1.0).contains(&f) => {
                Err(ScrollSyncError::configuration(format!(
                    "anchor viewport position {f} must be in [0, 1]"
                )))
            }
            ViewportPos::Pixels(px) if !px.is_finite() => Err(ScrollSyncError::configuration(
                "anchor viewport pixels must be finite",
            )),
            _ => Ok(()),
        }
    }

    /// Distance of the anchored viewport point from the viewport top.
    pub fn viewport_offset(&self, viewport_height: f64) -> f64 {
        match self.viewport {
            ViewportPos::Fraction(f) => f * viewport_height,
            ViewportPos::Pixels(px) => px,
        }
    }

    /// Scroll offset at which the anchored points coincide.
    pub fn resolve(&self, bounds: Bounds, viewport_height: f64) -> f64 {
        bounds.top + self.element * bounds.height() - self.viewport_offset(viewport_height)
    }
}

fn keyword(tok: &str) -> Option<f64> {
    match tok {
        "top" => Some(0.0),
        "center" => Some(0.5),
        "bottom" => Some(1.0),
        _ => None,
    }
}

fn parse_fraction(tok: &str) -> Option<f64> {
    if let Some(k) = keyword(tok) {
        return Some(k);
    }
    let pct = tok.strip_suffix('%')?;
    pct.parse::<f64>().ok().map(|v| v / 100.0)
}

fn parse_viewport(tok: &str) -> Option<ViewportPos> {
    if let Some(f) = parse_fraction(tok) {
        return Some(ViewportPos::Fraction(f));
    }
    let px = tok.strip_suffix("px").unwrap_or(tok);
    px.parse::<f64>().ok().map(ViewportPos::Pixels)
}

fn fmt_fraction(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v == 0.0 {
        f.write_str("top")
    } else if v == 0.5 {
        f.write_str("center")
    } else if v == 1.0 {
        f.write_str("bottom")
    } else {
        write!(f, "{}%", (v * 1e11).round() / 1e9)
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_fraction(f, self.element)?;
        f.write_str(" ")?;
        match self.viewport {
            ViewportPos::Fraction(v) => fmt_fraction(f, v),
            ViewportPos::Pixels(px) => write!(f, "{px}px"),
        }
    }
}

impl FromStr for Anchor {
    type Err = ScrollSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for Anchor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Anchor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Str(String),
            Obj { element: f64, viewport: ViewportPos },
        }

        let anchor = match Repr::deserialize(deserializer)? {
            Repr::Str(s) => Anchor::parse(&s),
            Repr::Obj { element, viewport } => Anchor::new(element, viewport),
        };
        anchor.map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/trigger/anchor.rs"]
mod tests;
