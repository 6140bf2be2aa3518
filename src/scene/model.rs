use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::{
    engine::config::EngineConfig,
    foundation::core::{Bounds, TargetId},
    foundation::error::{ScrollSyncError, ScrollSyncResult},
    scene::presets::Preset,
    timeline::spec::TimelineConfig,
};

/// Headless document description: viewport, sections and a scripted input sequence.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneConfig {
    pub viewport_height: f64,
    pub document_height: f64,
    #[serde(default)]
    pub engine: EngineConfig,
    pub sections: Vec<SectionConfig>,
    #[serde(default)]
    pub inputs: Vec<InputEvent>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SectionConfig {
    pub name: String,
    pub bounds: Bounds,
    #[serde(default)]
    pub timelines: Vec<TimelineConfig>,
    #[serde(default)]
    pub presets: Vec<PresetRef>,
}

impl SectionConfig {
    /// Explicit timelines followed by expanded presets.
    pub fn all_timelines(&self) -> Vec<TimelineConfig> {
        self.timelines
            .iter()
            .cloned()
            .chain(self.presets.iter().map(|p| p.preset.timeline(p.targets.clone())))
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PresetRef {
    pub preset: Preset,
    pub targets: Vec<TargetId>,
}

/// One scripted input, applied before the first frame at or after `at_ms`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InputEvent {
    pub at_ms: f64,
    #[serde(flatten)]
    pub action: InputAction,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InputAction {
    Wheel {
        delta: f64,
    },
    Touch {
        delta: f64,
    },
    ScrollTo {
        offset: f64,
        #[serde(default)]
        immediate: bool,
    },
    /// Offset reported by native scrolling.
    Native {
        offset: f64,
    },
    Resize {
        viewport_height: f64,
        document_height: f64,
    },
    /// The section element moved; layout is invalidated.
    MoveSection {
        section: String,
        top: f64,
        bottom: f64,
    },
    /// The section element left the document without the section unmounting.
    RemoveElement {
        section: String,
    },
    Unmount {
        section: String,
    },
}

impl InputAction {
    fn section(&self) -> Option<&str> {
        match self {
            Self::MoveSection { section, .. }
            | Self::RemoveElement { section }
            | Self::Unmount { section } => Some(section),
            _ => None,
        }
    }
}

impl SceneConfig {
    pub fn from_reader<R: std::io::Read>(r: R) -> ScrollSyncResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ScrollSyncError::validation(format!("parse scene JSON: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> ScrollSyncResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ScrollSyncError::validation(format!("open scene JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn to_json_pretty(&self) -> ScrollSyncResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ScrollSyncError::serde(format!("serialize scene: {e}")))
    }

    /// Parse a standalone input script (a JSON array of events).
    pub fn inputs_from_path(path: impl AsRef<Path>) -> ScrollSyncResult<Vec<InputEvent>> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ScrollSyncError::validation(format!("open input script '{}': {e}", path.display()))
        })?;
        serde_json::from_reader(BufReader::new(f))
            .map_err(|e| ScrollSyncError::validation(format!("parse input script JSON: {e}")))
    }

    /// Structural checks. Timeline contents are checked when sections mount.
    pub fn validate(&self) -> ScrollSyncResult<()> {
        if !self.viewport_height.is_finite() || self.viewport_height <= 0.0 {
            return Err(ScrollSyncError::validation("viewport_height must be finite and > 0"));
        }
        if !self.document_height.is_finite() || self.document_height < 0.0 {
            return Err(ScrollSyncError::validation("document_height must be finite and >= 0"));
        }
        self.engine.validate()?;

        let mut names = BTreeSet::new();
        for section in &self.sections {
            if section.name.is_empty() {
                return Err(ScrollSyncError::validation("section name must be non-empty"));
            }
            if !names.insert(section.name.as_str()) {
                return Err(ScrollSyncError::validation(format!(
                    "duplicate section '{}'",
                    section.name
                )));
            }
            section.bounds.validate().map_err(|e| {
                ScrollSyncError::validation(format!("section '{}': {e}", section.name))
            })?;
        }

        for (i, event) in self.inputs.iter().enumerate() {
            if !event.at_ms.is_finite() || event.at_ms < 0.0 {
                return Err(ScrollSyncError::validation(format!(
                    "input {i}: at_ms must be finite and >= 0"
                )));
            }
            if let Some(name) = event.action.section()
                && !names.contains(name)
            {
                return Err(ScrollSyncError::validation(format!(
                    "input {i}: unknown section '{name}'"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
