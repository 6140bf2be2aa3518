/// Frame rate at which a smoothing `lerp` is applied verbatim.
pub(crate) const REFERENCE_FPS: f64 = 60.0;

/// Residual fraction left after a smoothing "settle time" has elapsed.
const SETTLE_RESIDUAL: f64 = 0.01;

pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub(crate) fn clamp01(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// Per-tick blend factor for a per-reference-frame `lerp`, independent of the frame rate.
///
/// Always in `[0, 1]`, so `x += (target - x) * factor` never passes `target`.
pub(crate) fn damp_factor(lerp: f64, dt_secs: f64) -> f64 {
    if !dt_secs.is_finite() || dt_secs <= 0.0 {
        return 0.0;
    }
    let lerp = clamp01(lerp);
    if lerp >= 1.0 {
        return 1.0;
    }
    clamp01(1.0 - (1.0 - lerp).powf(dt_secs * REFERENCE_FPS))
}

/// Per-reference-frame `lerp` that leaves 1% of a gap after `secs`.
pub(crate) fn lerp_for_settle_time(secs: f64) -> f64 {
    if !secs.is_finite() || secs <= 0.0 {
        return 1.0;
    }
    let frames = (secs * REFERENCE_FPS).max(1.0);
    clamp01(1.0 - SETTLE_RESIDUAL.powf(1.0 / frames))
}

/// Position of `value` within `[start, end]`, clamped to `[0, 1]`.
///
/// Degenerate ranges (`end <= start`) step from 0 to 1 at `start`.
pub(crate) fn range_progress(value: f64, start: f64, end: f64) -> f64 {
    let span = end - start;
    if span.is_nan() || span <= 0.0 {
        return if value >= start { 1.0 } else { 0.0 };
    }
    clamp01((value - start) / span)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
