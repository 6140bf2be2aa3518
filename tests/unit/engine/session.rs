use super::*;
use crate::animation::ease::Ease;
use crate::animation::keyframe::{Keyframes, PropertySet};
use crate::timeline::spec::TimelineSpec;
use std::cell::Cell;

fn fade_in() -> Keyframes {
    Keyframes::from_to(
        PropertySet::new().opacity(0.0),
        PropertySet::new().opacity(1.0),
        Ease::Linear,
    )
}

/// Timeline scrubbing across [top, bottom] of the section element.
fn fade(target: u64) -> TimelineConfig {
    TimelineConfig::parse(
        "top top",
        "bottom top",
        TimelineSpec::new(fade_in(), vec![TargetId(target)]),
    )
    .unwrap()
}

fn hero() -> SectionSpec {
    SectionSpec::new("hero", || Some(Bounds { top: 1000.0, bottom: 1400.0 })).timeline(fade(1))
}

fn engine() -> HeadlessEngine {
    HeadlessEngine::headless(EngineConfig::default(), 800.0, 4000.0).unwrap()
}

fn step<P: FramePacer, A: Applier, S: ScrollSurface>(
    e: &mut ScrollEngine<P, A, S>,
    t: &mut f64,
) -> Option<FrameReport> {
    *t += 20.0;
    e.frame(*t)
}

fn opacity(e: &HeadlessEngine, target: u64) -> f64 {
    e.applier().style(TargetId(target)).unwrap().opacity
}

#[test]
fn first_mount_starts_clock_and_attaches() {
    let mut e = engine();
    assert!(!e.is_running());
    assert_eq!(e.frame(0.0), None);

    e.mount_section(hero()).unwrap();
    assert!(e.is_running());
    assert_eq!(e.pacer().requested(), 1);
    assert!(e.surface().native_scroll_suppressed);
    assert_eq!(e.surface().translation, Some(0.0));
}

#[test]
fn frame_applies_scrubbed_values_and_translates_document() {
    let mut e = engine();
    e.mount_section(hero()).unwrap();
    e.scroll_to(1200.0, true);
    let mut t = 0.0;
    let report = step(&mut e, &mut t).unwrap();
    assert_eq!(report.virtual_offset, 1200.0);
    assert_eq!(report.remeasured, 1);
    assert_eq!(report.writes_applied, 1);
    assert_eq!(opacity(&e, 1), 0.5);
    assert_eq!(e.surface().translation, Some(-1200.0));
    assert_eq!(report.scroll_progress, 1200.0 / 3200.0);
}

#[test]
fn unchanged_values_are_not_resent() {
    let mut e = engine();
    e.mount_section(hero()).unwrap();
    e.scroll_to(1200.0, true);
    let mut t = 0.0;
    step(&mut e, &mut t);
    let report = step(&mut e, &mut t).unwrap();
    assert_eq!(report.writes_resolved, 1);
    assert_eq!(report.writes_applied, 0);
    assert_eq!(e.applier().write_count(), 1);
}

#[test]
fn wheel_input_is_smoothed_across_frames() {
    let mut e = engine();
    e.mount_section(hero()).unwrap();
    e.scroll_by(100.0, InputKind::Wheel);
    assert_eq!(e.frame(0.0).unwrap().virtual_offset, 0.0);
    let report = e.frame(1000.0 / 60.0).unwrap();
    assert!((report.virtual_offset - 10.0).abs() < 1e-6);
    assert_eq!(report.direction, Direction::Forward);
    assert!(report.virtual_offset <= e.scroll().raw_offset());
}

#[test]
fn invalid_timeline_is_skipped_but_section_mounts() {
    let mut e = engine();
    let broken = TimelineConfig::parse(
        "top top",
        "bottom top",
        TimelineSpec::new(fade_in(), vec![TargetId(9)]).target_duration(-1.0),
    )
    .unwrap();
    let id = e.mount_section(hero().timeline(broken)).unwrap();
    let section = e.section(id).unwrap();
    assert_eq!(section.timelines().len(), 1);
    assert_eq!(section.triggers().len(), 1);
    assert_eq!(section.rejected(), 1);
    assert_eq!(e.triggers().len(), 1);
}

#[test]
fn unmounting_last_section_detaches_and_stops_clock() {
    let mut e = engine();
    let id = e.mount_section(hero()).unwrap();
    e.scroll_to(600.0, true);
    let mut t = 0.0;
    step(&mut e, &mut t);

    assert!(e.unmount_section(id));
    assert!(!e.unmount_section(id));
    assert!(e.timelines().is_empty());
    assert!(e.triggers().is_empty());
    assert!(!e.surface().native_scroll_suppressed);
    assert_eq!(e.surface().translation, None);
    assert_eq!(e.pacer().pending(), None);
    assert_eq!(e.pacer().cancelled(), 1);
    assert_eq!(step(&mut e, &mut t), None);
}

#[test]
fn clock_keeps_running_while_other_sections_remain() {
    let mut e = engine();
    let a = e.mount_section(hero()).unwrap();
    e.mount_section(SectionSpec::new("contact", || Some(Bounds { top: 2000.0, bottom: 2600.0 })).timeline(fade(2)))
        .unwrap();
    e.unmount_section(a);
    assert!(e.is_running());
    assert!(e.surface().native_scroll_suppressed);
}

struct UnmountOnWrite {
    inner: RecordingApplier,
    handle: Option<EngineHandle>,
    section: Option<SectionId>,
}

impl Applier for UnmountOnWrite {
    fn apply(&mut self, target: TargetId, values: &PropertyValues) -> ScrollSyncResult<()> {
        if let (Some(handle), Some(section)) = (&self.handle, self.section.take()) {
            handle.unmount_section(section);
        }
        self.inner.apply(target, values)
    }
}

#[test]
fn unmount_requested_mid_tick_takes_effect_next_frame() {
    let applier = UnmountOnWrite {
        inner: RecordingApplier::new(),
        handle: None,
        section: None,
    };
    let mut e = ScrollEngine::new(
        EngineConfig::default(),
        800.0,
        4000.0,
        ManualPacer::new(),
        applier,
        RecordingSurface::default(),
    )
    .unwrap();
    let a = e.mount_section(hero()).unwrap();
    e.mount_section(
        SectionSpec::new("other", || Some(Bounds { top: 1000.0, bottom: 1400.0 })).timeline(fade(2)),
    )
    .unwrap();
    let handle = e.handle();
    e.applier_mut().handle = Some(handle.clone());
    e.applier_mut().section = Some(a);

    e.scroll_to(1100.0, true);
    let mut t = 0.0;
    let first = step(&mut e, &mut t).unwrap();
    assert_eq!(first.writes_applied, 2);
    assert_eq!(handle.pending(), 1);
    assert!(e.section(a).is_some());

    e.scroll_to(1300.0, true);
    let second = step(&mut e, &mut t).unwrap();
    assert_eq!(second.drained, 1);
    assert_eq!(second.writes_applied, 1);
    assert!(e.section(a).is_none());
    assert_eq!(e.applier().inner.writes_to(TargetId(1)), 1);
    assert_eq!(e.applier().inner.writes_to(TargetId(2)), 2);
}

#[test]
fn failed_write_deactivates_only_that_timeline_until_remeasured() {
    let mut e = engine();
    let id = e.mount_section(hero().timeline(fade(2))).unwrap();
    let timelines = e.section(id).unwrap().timelines().to_vec();
    e.applier_mut().remove_target(TargetId(1));
    e.scroll_to(1200.0, true);
    let mut t = 0.0;

    let report = step(&mut e, &mut t).unwrap();
    assert_eq!(report.apply_failures, 1);
    assert_eq!(report.writes_applied, 1);
    assert!(!e.timelines().is_active(timelines[0]));
    assert!(e.timelines().is_active(timelines[1]));

    e.applier_mut().restore_target(TargetId(1));
    e.scroll_to(1300.0, true);
    step(&mut e, &mut t);
    assert_eq!(e.applier().style(TargetId(1)), None);

    e.remeasure_section(id, || Some(Bounds { top: 1000.0, bottom: 1400.0 }))
        .unwrap();
    step(&mut e, &mut t);
    assert_eq!(opacity(&e, 1), 0.75);
}

#[test]
fn layout_changes_apply_only_after_notification() {
    let top = Rc::new(Cell::new(1000.0));
    let bounds_top = top.clone();
    let mut e = engine();
    e.mount_section(
        SectionSpec::new("hero", move || {
            let top = bounds_top.get();
            Some(Bounds { top, bottom: top + 400.0 })
        })
        .timeline(fade(1)),
    )
    .unwrap();
    e.scroll_to(1200.0, true);
    let mut t = 0.0;
    step(&mut e, &mut t);
    assert_eq!(opacity(&e, 1), 0.5);

    top.set(1200.0);
    let report = step(&mut e, &mut t).unwrap();
    assert_eq!(report.remeasured, 0);
    assert_eq!(opacity(&e, 1), 0.5);

    e.notify_layout_change();
    let report = step(&mut e, &mut t).unwrap();
    assert_eq!(report.remeasured, 1);
    assert_eq!(opacity(&e, 1), 0.0);
}

#[test]
fn handle_layout_notification_is_drained_next_frame() {
    let mut e = engine();
    e.mount_section(hero()).unwrap();
    let mut t = 0.0;
    step(&mut e, &mut t);
    e.handle().notify_layout_change();
    let report = step(&mut e, &mut t).unwrap();
    assert_eq!(report.drained, 1);
    assert_eq!(report.remeasured, 1);
}

#[test]
fn resize_moves_anchors_and_scroll_limit() {
    let mut e = engine();
    let id = e.mount_section(hero()).unwrap();
    let trigger = e.section(id).unwrap().triggers()[0];
    e.resize(1000.0, 3000.0).unwrap();
    assert_eq!(e.scroll().state().limit, 2000.0);
    assert_eq!(e.triggers().dirty_count(), 1);
    assert_eq!(e.triggers().viewport_height(), 1000.0);

    e.scroll_to(5000.0, true);
    assert_eq!(e.scroll().raw_offset(), 2000.0);
    assert!(e.resize(-1.0, 3000.0).is_err());
    assert!(e.triggers().contains(trigger));
}

#[test]
fn native_mode_leaves_document_alone() {
    let cfg = EngineConfig {
        smooth_scroll: false,
        ..EngineConfig::default()
    };
    let mut e = HeadlessEngine::headless(cfg, 800.0, 4000.0).unwrap();
    e.mount_section(hero()).unwrap();
    assert!(!e.surface().native_scroll_suppressed);

    let mut t = 0.0;
    step(&mut e, &mut t);
    e.set_native_offset(1200.0);
    let report = step(&mut e, &mut t).unwrap();
    assert_eq!(report.virtual_offset, 1200.0);
    assert_eq!(e.surface().translate_calls, 0);
}

#[test]
fn shutdown_is_idempotent_and_blocks_new_mounts() {
    let mut e = engine();
    e.mount_section(hero()).unwrap();
    e.shutdown();
    e.shutdown();
    assert!(e.is_shut_down());
    assert_eq!(e.pacer().cancelled(), 1);
    assert!(e.timelines().is_empty());
    assert!(e.mount_section(hero()).unwrap_err().is_runtime());
}

#[test]
fn explicit_unregister_removes_both_halves_of_the_pair() {
    let mut e = engine();
    let id = e.mount_section(hero().timeline(fade(2))).unwrap();
    let section = e.section(id).unwrap();
    let (tl, trig) = (section.timelines()[0], section.triggers()[1]);
    assert!(e.unregister_timeline(tl));
    assert!(!e.unregister_timeline(tl));
    assert!(e.unregister_trigger(trig));
    assert!(!e.unregister_trigger(trig));

    let section = e.section(id).unwrap();
    assert!(section.timelines().is_empty());
    assert!(section.triggers().is_empty());
    assert_eq!(e.timelines().len(), 0);
    assert_eq!(e.triggers().len(), 0);

    e.notify_layout_change();
    e.scroll_to(1200.0, true);
    let mut t = 0.0;
    let report = step(&mut e, &mut t).unwrap();
    assert_eq!(report.remeasured, 0);
    assert_eq!(report.writes_resolved, 0);
}

#[test]
fn deferred_trigger_unregister_drops_its_timeline() {
    let mut e = engine();
    let id = e.mount_section(hero()).unwrap();
    let trig = e.section(id).unwrap().triggers()[0];
    e.handle().unregister_trigger(trig);
    let mut t = 0.0;
    assert_eq!(step(&mut e, &mut t).unwrap().drained, 1);
    assert!(e.timelines().is_empty());
    assert!(!e.triggers().contains(trig));
}
