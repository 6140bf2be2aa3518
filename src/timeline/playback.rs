/// Which side of the trigger start the scroll position is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Before,
    After,
}

impl Side {
    pub(crate) fn of(offset: f64, start: f64) -> Self {
        if offset >= start {
            Self::After
        } else {
            Self::Before
        }
    }
}

/// Playback phase of a `PlayOnce` timeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PlayState {
    #[default]
    Idle,
    Forward,
    Completed,
    Reverse,
}

/// Real-time playhead for `PlayOnce` timelines.
///
/// Crossing the trigger start forward restarts the playhead at 0 and plays to the end;
/// crossing it backward plays in reverse down to 0. A re-entry while reversing is honored
/// only once the reverse has finished, so the timeline never replays forward from a
/// partially reversed state and never loops by itself.
#[derive(Clone, Debug)]
pub(crate) struct Playback {
    state: PlayState,
    playhead: f64,
    duration: f64,
    last_side: Option<Side>,
}

impl Playback {
    pub(crate) fn new(duration: f64) -> Self {
        Self {
            state: PlayState::Idle,
            playhead: 0.0,
            duration,
            last_side: None,
        }
    }

    pub(crate) fn state(&self) -> PlayState {
        self.state
    }

    pub(crate) fn playhead(&self) -> f64 {
        self.playhead
    }

    /// Feed the current side of the trigger start and elapsed time; returns the playhead.
    ///
    /// The tick that detects a crossing only changes direction; the playhead moves from the
    /// next tick on.
    pub(crate) fn update(&mut self, side: Side, dt: f64) -> f64 {
        let entered = side == Side::After && self.last_side != Some(Side::After);
        let left = side == Side::Before && self.last_side == Some(Side::After);
        self.last_side = Some(side);

        if entered && self.state == PlayState::Idle {
            self.state = PlayState::Forward;
            self.playhead = 0.0;
            return self.playhead;
        }
        if left && matches!(self.state, PlayState::Forward | PlayState::Completed) {
            self.state = PlayState::Reverse;
            return self.playhead;
        }

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        match self.state {
            PlayState::Idle | PlayState::Completed => {}
            PlayState::Forward => {
                self.playhead += dt;
                if self.playhead >= self.duration {
                    self.playhead = self.duration;
                    self.state = PlayState::Completed;
                }
            }
            PlayState::Reverse => {
                self.playhead -= dt;
                if self.playhead <= 0.0 {
                    self.playhead = 0.0;
                    self.state = PlayState::Idle;
                    if side == Side::After {
                        // Re-entered while reversing: this is the restart.
                        self.state = PlayState::Forward;
                    }
                }
            }
        }
        self.playhead
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/playback.rs"]
mod tests;
