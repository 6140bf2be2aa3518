use super::*;
use crate::apply::recording::RecordingSurface;

const FRAME: f64 = 1.0 / 60.0;

fn sim(lerp: f64, limit: f64) -> ScrollSimulator {
    let mut s = ScrollSimulator::new(SmoothingConfig {
        lerp,
        settle_epsilon: 0.0,
        ..SmoothingConfig::default()
    })
    .unwrap();
    s.set_limit(limit).unwrap();
    s
}

#[test]
fn one_tick_closes_lerp_share_of_gap() {
    let mut s = sim(0.1, 1000.0);
    s.scroll_to(100.0, false);
    let v = s.advance(FRAME);
    assert!((v - 10.0).abs() < 1e-9);
    assert_eq!(s.previous_virtual_offset(), 0.0);
    assert_eq!(s.direction(), Direction::Forward);
}

#[test]
fn convergence_is_monotone_and_never_overshoots() {
    let mut s = sim(0.1, 1000.0);
    s.scroll_to(100.0, false);
    let mut last = 0.0;
    for _ in 0..600 {
        let v = s.advance(FRAME);
        assert!(v >= last);
        assert!(v <= 100.0);
        last = v;
    }
    assert!(100.0 - last < 1e-6);

    s.scroll_to(0.0, false);
    let mut last = s.virtual_offset();
    for _ in 0..120 {
        let v = s.advance(FRAME);
        assert!(v <= last);
        assert!(v >= 0.0);
        last = v;
    }
    assert_eq!(s.direction(), Direction::Backward);
}

#[test]
fn settle_epsilon_snaps_to_raw() {
    let mut s = ScrollSimulator::new(SmoothingConfig::default()).unwrap();
    s.set_limit(500.0).unwrap();
    s.scroll_to(0.4, false);
    s.advance(FRAME);
    assert!(s.is_settled());
    assert_eq!(s.virtual_offset(), 0.4);
}

#[test]
fn zero_dt_keeps_offset() {
    let mut s = sim(0.1, 1000.0);
    s.scroll_to(300.0, false);
    assert_eq!(s.advance(0.0), 0.0);
    assert_eq!(s.state().velocity, 0.0);
    assert_eq!(s.direction(), Direction::Idle);
}

#[test]
fn zero_dt_does_not_snap_a_small_gap() {
    let mut s = sim(0.1, 1000.0);
    s.scroll_to(0.4, false);
    assert_eq!(s.advance(0.0), 0.0);
    assert_eq!(s.advance(f64::NAN), 0.0);
    assert!(!s.is_settled());
    s.advance(FRAME);
    assert_eq!(s.virtual_offset(), 0.4);
}

#[test]
fn input_is_clamped_to_document_extent() {
    let mut s = sim(0.1, 400.0);
    s.scroll_by(-50.0, InputKind::Wheel);
    assert_eq!(s.raw_offset(), 0.0);
    s.scroll_by(1000.0, InputKind::Wheel);
    assert_eq!(s.raw_offset(), 400.0);

    s.set_limit(250.0).unwrap();
    assert_eq!(s.raw_offset(), 250.0);
    assert!(s.set_limit(f64::NAN).is_err());
}

#[test]
fn multipliers_scale_deltas() {
    let mut s = ScrollSimulator::new(SmoothingConfig {
        wheel_multiplier: 2.0,
        touch_multiplier: 3.0,
        ..SmoothingConfig::default()
    })
    .unwrap();
    s.set_limit(10_000.0).unwrap();
    s.scroll_by(100.0, InputKind::Wheel);
    assert_eq!(s.raw_offset(), 200.0);
    assert_eq!(s.virtual_offset(), 0.0);

    // Unsmoothed touch moves the virtual offset with the finger.
    s.scroll_by(10.0, InputKind::Touch);
    assert_eq!(s.raw_offset(), 230.0);
    assert_eq!(s.virtual_offset(), 230.0);
}

#[test]
fn immediate_scroll_skips_smoothing() {
    let mut s = sim(0.1, 2000.0);
    s.scroll_to(1200.0, true);
    assert_eq!(s.virtual_offset(), 1200.0);
    s.advance(FRAME);
    assert_eq!(s.virtual_offset(), 1200.0);
    assert_eq!(s.direction(), Direction::Idle);
}

#[test]
fn stopped_simulator_ignores_input() {
    let mut s = sim(0.1, 1000.0);
    s.scroll_to(500.0, false);
    s.advance(FRAME);
    s.stop();
    let frozen = s.virtual_offset();
    s.scroll_by(100.0, InputKind::Wheel);
    s.advance(FRAME);
    assert_eq!(s.virtual_offset(), frozen);

    s.start();
    s.scroll_by(100.0, InputKind::Wheel);
    assert!(s.raw_offset() > frozen);
}

#[test]
fn progress_tracks_limit() {
    let mut s = sim(1.0, 800.0);
    assert_eq!(s.state().progress(), 0.0);
    s.scroll_to(200.0, true);
    assert_eq!(s.state().progress(), 0.25);
    s.set_limit(0.0).unwrap();
    assert_eq!(s.state().progress(), 0.0);
}

#[test]
fn attach_and_detach_restore_native_scroll() {
    let mut s = sim(0.1, 1000.0);
    let mut surface = RecordingSurface::default();
    s.attach(&mut surface);
    assert!(s.is_attached());
    assert!(surface.native_scroll_suppressed);

    s.scroll_to(100.0, false);
    s.advance(FRAME);
    s.render(&mut surface);
    let y = surface.translation.unwrap();
    assert!((y + 10.0).abs() < 1e-9);

    s.detach(&mut surface);
    assert!(!surface.native_scroll_suppressed);
    assert_eq!(surface.translation, None);

    // Rendering while detached leaves the document alone.
    let calls = surface.translate_calls;
    s.render(&mut surface);
    assert_eq!(surface.translate_calls, calls);
}

#[test]
fn invalid_config_is_rejected() {
    for lerp in [0.0, -0.2, 1.5, f64::NAN] {
        let cfg = SmoothingConfig {
            lerp,
            ..SmoothingConfig::default()
        };
        assert!(ScrollSimulator::new(cfg).unwrap_err().is_configuration());
    }
    let cfg = SmoothingConfig {
        wheel_multiplier: 0.0,
        ..SmoothingConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn from_duration_derives_lerp() {
    let cfg = SmoothingConfig::from_duration(1.4);
    assert!(cfg.lerp > 0.0 && cfg.lerp < 0.1);
    cfg.validate().unwrap();
}
