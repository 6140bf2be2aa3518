use super::*;

#[test]
fn damp_factor_matches_lerp_at_reference_rate() {
    let f = damp_factor(0.1, 1.0 / REFERENCE_FPS);
    assert!((f - 0.1).abs() < 1e-12);
}

#[test]
fn damp_factor_is_frame_rate_independent() {
    // Two 120 Hz ticks close the same share of the gap as one 60 Hz tick.
    let half = damp_factor(0.1, 1.0 / 120.0);
    let mut x = 0.0;
    x += (100.0 - x) * half;
    x += (100.0 - x) * half;
    let one = 100.0 * damp_factor(0.1, 1.0 / 60.0);
    assert!((x - one).abs() < 1e-9);
}

#[test]
fn damp_factor_degenerate_inputs() {
    assert_eq!(damp_factor(0.1, 0.0), 0.0);
    assert_eq!(damp_factor(0.1, -1.0), 0.0);
    assert_eq!(damp_factor(0.1, f64::NAN), 0.0);
    assert_eq!(damp_factor(1.0, 0.016), 1.0);
    assert_eq!(damp_factor(0.0, 0.016), 0.0);
}

#[test]
fn settle_time_leaves_one_percent() {
    let l = lerp_for_settle_time(1.0);
    let residual = (1.0 - l).powf(REFERENCE_FPS);
    assert!((residual - 0.01).abs() < 1e-9);
    assert_eq!(lerp_for_settle_time(0.0), 1.0);
}

#[test]
fn range_progress_clamps_and_steps() {
    assert_eq!(range_progress(900.0, 1000.0, 1400.0), 0.0);
    assert_eq!(range_progress(1200.0, 1000.0, 1400.0), 0.5);
    assert_eq!(range_progress(1500.0, 1000.0, 1400.0), 1.0);

    assert_eq!(range_progress(999.0, 1000.0, 1000.0), 0.0);
    assert_eq!(range_progress(1000.0, 1000.0, 1000.0), 1.0);
    assert_eq!(range_progress(1001.0, 1000.0, 900.0), 1.0);
}

#[test]
fn clamp01_maps_nan_to_zero() {
    assert_eq!(clamp01(f64::NAN), 0.0);
    assert_eq!(clamp01(-2.0), 0.0);
    assert_eq!(clamp01(3.0), 1.0);
    assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
}
