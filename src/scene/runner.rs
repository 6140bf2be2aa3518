use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::{
    apply::recording::AppliedWrite,
    engine::section::SectionSpec,
    engine::session::{FrameReport, HeadlessEngine},
    foundation::core::{Bounds, SectionId},
    foundation::error::{ScrollSyncError, ScrollSyncResult},
    scene::model::{InputAction, InputEvent, SceneConfig},
    scroll::simulator::InputKind,
    timeline::scheduler::TimelineSample,
};

/// Frame pacing for a scripted run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunOptions {
    pub fps: f64,
    pub frames: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            fps: 60.0,
            frames: 120,
        }
    }
}

/// One simulated frame: what the engine did and what it wrote.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FrameRecord {
    pub frame: usize,
    pub time_ms: f64,
    #[serde(flatten)]
    pub report: FrameReport,
    pub writes: Vec<AppliedWrite>,
}

/// Settled timeline values of one section at a fixed offset.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SectionSample {
    pub section: String,
    pub timelines: Vec<TimelineSample>,
}

struct MountedScene {
    engine: HeadlessEngine,
    elements: BTreeMap<String, (Rc<Cell<Option<Bounds>>>, SectionId)>,
}

impl MountedScene {
    fn mount(scene: &SceneConfig) -> ScrollSyncResult<Self> {
        scene.validate()?;
        let mut engine =
            HeadlessEngine::headless(scene.engine, scene.viewport_height, scene.document_height)?;
        let mut elements = BTreeMap::new();
        for section in &scene.sections {
            let element = Rc::new(Cell::new(Some(section.bounds)));
            let measured = Rc::clone(&element);
            let spec = SectionSpec::new(section.name.clone(), move || measured.get())
                .timelines(section.all_timelines());
            let id = engine.mount_section(spec)?;
            elements.insert(section.name.clone(), (element, id));
        }
        Ok(Self { engine, elements })
    }

    fn section(&self, name: &str) -> ScrollSyncResult<&(Rc<Cell<Option<Bounds>>>, SectionId)> {
        self.elements
            .get(name)
            .ok_or_else(|| ScrollSyncError::validation(format!("unknown section '{name}'")))
    }

    fn apply(&mut self, action: &InputAction) -> ScrollSyncResult<()> {
        match action {
            InputAction::Wheel { delta } => self.engine.scroll_by(*delta, InputKind::Wheel),
            InputAction::Touch { delta } => self.engine.scroll_by(*delta, InputKind::Touch),
            InputAction::ScrollTo { offset, immediate } => {
                self.engine.scroll_to(*offset, *immediate)
            }
            InputAction::Native { offset } => self.engine.set_native_offset(*offset),
            InputAction::Resize {
                viewport_height,
                document_height,
            } => self.engine.resize(*viewport_height, *document_height)?,
            InputAction::MoveSection {
                section,
                top,
                bottom,
            } => {
                let bounds = Bounds::new(*top, *bottom)?;
                self.section(section)?.0.set(Some(bounds));
                self.engine.notify_layout_change();
            }
            InputAction::RemoveElement { section } => {
                self.section(section)?.0.set(None);
                self.engine.notify_layout_change();
            }
            InputAction::Unmount { section } => {
                let id = self.section(section)?.1;
                self.engine.unmount_section(id);
            }
        }
        Ok(())
    }
}

/// Drive a scene headlessly at a fixed frame rate, applying scripted inputs as their time
/// comes up. Stops early once every section has unmounted.
#[tracing::instrument(skip(scene, inputs))]
pub fn run_scene(
    scene: &SceneConfig,
    inputs: &[InputEvent],
    opts: RunOptions,
) -> ScrollSyncResult<Vec<FrameRecord>> {
    if !opts.fps.is_finite() || opts.fps <= 0.0 {
        return Err(ScrollSyncError::validation("fps must be finite and > 0"));
    }
    let mut mounted = MountedScene::mount(scene)?;
    let mut script: Vec<&InputEvent> = scene.inputs.iter().chain(inputs).collect();
    script.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
    let mut script = script.into_iter().peekable();

    let frame_ms = 1000.0 / opts.fps;
    let mut records = Vec::new();
    for frame in 0..opts.frames {
        let time_ms = frame as f64 * frame_ms;
        while let Some(event) = script.next_if(|e| e.at_ms <= time_ms) {
            mounted.apply(&event.action)?;
        }
        let Some(report) = mounted.engine.frame(time_ms) else {
            tracing::debug!(frame, "clock stopped; ending run");
            break;
        };
        records.push(FrameRecord {
            frame,
            time_ms,
            report,
            writes: mounted.engine.applier_mut().take_writes(),
        });
    }
    Ok(records)
}

/// Settled values of every timeline with the document parked at `offset`.
pub fn sample_scene(scene: &SceneConfig, offset: f64) -> ScrollSyncResult<Vec<SectionSample>> {
    let mounted = MountedScene::mount(scene)?;
    let engine = &mounted.engine;
    let samples = engine.timelines().sample(engine.triggers(), offset);
    let mut out = Vec::new();
    for section in &scene.sections {
        let Some((_, id)) = mounted.elements.get(&section.name) else {
            continue;
        };
        let Some(mounted_section) = engine.section(*id) else {
            continue;
        };
        out.push(SectionSample {
            section: section.name.clone(),
            timelines: samples
                .iter()
                .filter(|s| mounted_section.timelines().contains(&s.timeline))
                .cloned()
                .collect(),
        });
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/runner.rs"]
mod tests;
