/// Handle of one outstanding frame request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// Host frame-pacing primitive (a `requestAnimationFrame` equivalent).
///
/// The host calls [`Clock::on_frame`] once per visual frame for the outstanding request.
pub trait FramePacer {
    fn request_frame(&mut self) -> FrameRequest;
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// Pacer for headless hosts and tests: frames are fired by hand.
#[derive(Debug, Default)]
pub struct ManualPacer {
    pending: Option<FrameRequest>,
    next: u64,
    requested: usize,
    cancelled: usize,
}

impl ManualPacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled
    }

    /// Consume the outstanding request, as a host does right before running the callback.
    pub fn fire(&mut self) -> Option<FrameRequest> {
        self.pending.take()
    }
}

impl FramePacer for ManualPacer {
    fn request_frame(&mut self) -> FrameRequest {
        let request = FrameRequest(self.next);
        self.next += 1;
        self.requested += 1;
        self.pending = Some(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
        self.cancelled += 1;
    }
}

impl<P: FramePacer + ?Sized> FramePacer for Box<P> {
    fn request_frame(&mut self) -> FrameRequest {
        (**self).request_frame()
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        (**self).cancel_frame(request)
    }
}

/// Per-frame tick source.
///
/// Holds only the outstanding request and the previous timestamp; downstream work happens
/// in the caller once [`Clock::on_frame`] hands back a time step.
#[derive(Debug)]
pub struct Clock<P> {
    pacer: P,
    max_dt: f64,
    pending: Option<FrameRequest>,
    last_ms: Option<f64>,
}

impl<P: FramePacer> Clock<P> {
    /// `max_dt` caps the step (seconds) handed out after a stall.
    pub fn new(pacer: P, max_dt: f64) -> Self {
        Self {
            pacer,
            max_dt,
            pending: None,
            last_ms: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    pub fn start(&mut self) {
        if self.pending.is_none() {
            self.last_ms = None;
            self.pending = Some(self.pacer.request_frame());
        }
    }

    /// Cancel the outstanding request; no frame is requested again until [`Clock::start`].
    pub fn stop(&mut self) {
        if let Some(request) = self.pending.take() {
            self.pacer.cancel_frame(request);
        }
        self.last_ms = None;
    }

    /// Consume a frame at `timestamp_ms` and re-arm.
    ///
    /// Returns the elapsed seconds (0 on the first frame, capped at `max_dt`), or `None`
    /// while stopped.
    pub fn on_frame(&mut self, timestamp_ms: f64) -> Option<f64> {
        self.pending.take()?;
        let dt = match self.last_ms {
            Some(last) if timestamp_ms.is_finite() => {
                ((timestamp_ms - last) / 1000.0).clamp(0.0, self.max_dt)
            }
            _ => 0.0,
        };
        if timestamp_ms.is_finite() {
            self.last_ms = Some(timestamp_ms);
        }
        self.pending = Some(self.pacer.request_frame());
        Some(dt)
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    pub fn pacer_mut(&mut self) -> &mut P {
        &mut self.pacer
    }
}

#[cfg(test)]
#[path = "../../tests/unit/clock/frame.rs"]
mod tests;
