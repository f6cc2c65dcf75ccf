//! Playback pacing: fit an arbitrarily long log into a fixed-duration
//! animation without exceeding the host's frame-rate ceiling.

use crate::{
    error::{OptiplayError, OptiplayResult},
    model::PlaybackState,
};

/// Derived once after the snapshot sequence is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PacingPlan {
    /// Frames per second, never above the configured ceiling.
    pub frame_rate: u32,
    /// Snapshots the cursor moves per rendered frame.
    pub advance_step: usize,
}

impl PacingPlan {
    /// `frame_rate = min(ceil(n / T), ceiling)`;
    /// `advance_step = ceil(n / (frame_rate * T))`.
    ///
    /// The animation then finishes within one tick of the target duration
    /// regardless of log length. An empty log plans `advance_step = 0` and
    /// never ticks.
    pub fn plan(
        snapshot_count: usize,
        duration_secs: u32,
        frame_rate_ceiling: u32,
    ) -> OptiplayResult<Self> {
        if duration_secs == 0 {
            return Err(OptiplayError::validation("duration_secs must be > 0"));
        }
        if frame_rate_ceiling == 0 {
            return Err(OptiplayError::validation("frame_rate_ceiling must be > 0"));
        }

        let n = snapshot_count as u64;
        if n == 0 {
            return Ok(Self {
                frame_rate: 0,
                advance_step: 0,
            });
        }

        let duration = u64::from(duration_secs);
        let frame_rate = n.div_ceil(duration).min(u64::from(frame_rate_ceiling));
        let advance_step = n.div_ceil(frame_rate * duration);
        Ok(Self {
            frame_rate: frame_rate as u32,
            advance_step: advance_step as usize,
        })
    }

    /// Total frames the plan will render: `ceil(n / advance_step)`.
    pub fn frame_budget(&self, snapshot_count: usize) -> u64 {
        if self.advance_step == 0 {
            return 0;
        }
        (snapshot_count as u64).div_ceil(self.advance_step as u64)
    }
}

/// One scheduler tick. Moves the cursor by the planned step, clamping to the
/// last snapshot and setting the terminal flag when the end is reached.
/// Terminal states are frozen: further calls change nothing.
pub fn advance(state: &mut PlaybackState, plan: PacingPlan, snapshot_count: usize) {
    if state.done {
        return;
    }
    if snapshot_count == 0 || plan.advance_step == 0 {
        state.done = true;
        return;
    }
    if state.cursor + plan.advance_step < snapshot_count {
        state.cursor += plan.advance_step;
    } else {
        state.cursor = snapshot_count - 1;
        state.done = true;
    }
}
