use super::*;
use std::cell::Cell;
use std::rc::Rc;

fn fixed(top: f64, bottom: f64) -> impl Fn() -> Option<Bounds> + 'static {
    move || Some(Bounds { top, bottom })
}

#[test]
fn resolves_anchor_pair_to_document_range() {
    let mut reg = TriggerRegistry::new(1000.0).unwrap();
    let id = reg
        .register_parsed(fixed(1600.0, 2200.0), "top 60%", "bottom 50%")
        .unwrap();
    let r = reg.resolve(id).unwrap();
    assert_eq!(r, TriggerRange { start: 1000.0, end: 1700.0 });
}

#[test]
fn range_progress_matches_reference_points() {
    let r = TriggerRange { start: 1000.0, end: 1400.0 };
    assert_eq!(r.progress(1000.0), 0.0);
    assert_eq!(r.progress(1200.0), 0.5);
    assert_eq!(r.progress(1500.0), 1.0);
    assert_eq!(r.progress(0.0), 0.0);
}

#[test]
fn zero_height_range_steps_at_start() {
    let r = TriggerRange { start: 800.0, end: 800.0 };
    assert!(r.is_degenerate());
    assert_eq!(r.progress(799.0), 0.0);
    assert_eq!(r.progress(800.0), 1.0);
    assert_eq!(r.progress(2000.0), 1.0);
}

#[test]
fn cache_refreshes_only_after_invalidation() {
    let top = Rc::new(Cell::new(1000.0));
    let calls = Rc::new(Cell::new(0u32));
    let (t, c) = (Rc::clone(&top), Rc::clone(&calls));
    let mut reg = TriggerRegistry::new(800.0).unwrap();
    let id = reg
        .register_parsed(
            move || {
                c.set(c.get() + 1);
                Some(Bounds { top: t.get(), bottom: t.get() + 400.0 })
            },
            "top bottom",
            "bottom top",
        )
        .unwrap();

    assert_eq!(reg.refresh(), 1);
    assert_eq!(reg.cached(id).unwrap().start, 200.0);
    assert_eq!(reg.refresh(), 0);

    // Layout moved the element; cached value stays until invalidated.
    top.set(1500.0);
    assert_eq!(reg.cached(id).unwrap().start, 200.0);
    let before = calls.get();
    reg.invalidate_all();
    assert_eq!(reg.refresh(), 1);
    assert_eq!(calls.get(), before + 1);
    assert_eq!(reg.cached(id).unwrap(), TriggerRange { start: 700.0, end: 1900.0 });
}

#[test]
fn viewport_change_invalidates_everything() {
    let mut reg = TriggerRegistry::new(1000.0).unwrap();
    let a = reg.register_parsed(fixed(0.0, 100.0), "top 50%", "bottom 50%").unwrap();
    let b = reg.register_parsed(fixed(500.0, 900.0), "top 50%", "bottom 50%").unwrap();
    reg.refresh();
    assert_eq!(reg.dirty_count(), 0);

    reg.set_viewport_height(1000.0).unwrap();
    assert_eq!(reg.dirty_count(), 0);

    reg.set_viewport_height(600.0).unwrap();
    assert_eq!(reg.dirty_count(), 2);
    reg.refresh();
    assert_eq!(reg.cached(a).unwrap().start, -300.0);
    assert_eq!(reg.cached(b).unwrap().end, 600.0);
    assert!(reg.set_viewport_height(f64::NAN).is_err());
}

#[test]
fn unmeasurable_and_unknown_triggers_report_runtime_errors() {
    let mut reg = TriggerRegistry::new(1000.0).unwrap();
    let id = reg
        .register_parsed(|| None, "top 60%", "bottom 50%")
        .unwrap();
    reg.refresh();
    assert!(reg.cached(id).unwrap_err().is_runtime());

    let inverted = reg
        .register_parsed(fixed(500.0, 100.0), "top 60%", "bottom 50%")
        .unwrap();
    assert!(reg.resolve(inverted).unwrap_err().is_runtime());

    assert!(reg.unregister(id));
    assert!(!reg.unregister(id));
    assert!(reg.cached(id).unwrap_err().is_runtime());
    assert!(!reg.contains(id));
}

#[test]
fn invalid_anchors_are_configuration_errors() {
    let mut reg = TriggerRegistry::new(1000.0).unwrap();
    let err = reg
        .register_parsed(fixed(0.0, 10.0), "top 160%", "bottom 50%")
        .unwrap_err();
    assert!(err.is_configuration());
    assert!(reg.is_empty());
}

#[test]
fn remeasure_bumps_generation() {
    let mut reg = TriggerRegistry::new(1000.0).unwrap();
    let id = reg.register_parsed(|| None, "top top", "bottom top").unwrap();
    assert_eq!(reg.generation(id), Some(0));
    reg.refresh();
    assert!(reg.cached(id).is_err());

    reg.remeasure(id, fixed(100.0, 300.0)).unwrap();
    assert_eq!(reg.generation(id), Some(1));
    assert_eq!(reg.dirty_count(), 1);
    reg.refresh();
    assert_eq!(reg.cached(id).unwrap(), TriggerRange { start: 100.0, end: 300.0 });
    assert!(reg.remeasure(TriggerId(99), fixed(0.0, 1.0)).is_err());
}
