//! Phase detection and plateau skipping for hybrid logs.
//!
//! A hybrid run logs a continuous relaxation stage (no generation counter)
//! followed by a discrete search stage (generation counter present), or the
//! reverse. Playing every record wastes animation time on a stage that has
//! visually converged, so after each scheduler tick one of two skip policies
//! may push the cursor further. The two policies were tuned independently
//! per log family and do not reconcile; they stay separate strategies.

use crate::model::{Phase, PlaybackState, Snapshot};

/// Cursor-skip policy, selected by configuration.
///
/// The field values are tuned-per-log defaults, not algorithmic constants:
/// they are known to read well on the logs they were tuned against and
/// should not be assumed to generalize.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SkipStrategy {
    /// Look `window` records ahead while in the relaxation phase; if the
    /// summary metric has not changed the run is stalled, and the cursor
    /// additionally jumps `stride` records to escape the plateau.
    PlateauWindow { window: usize, stride: usize },
    /// Take up to `relax_budget` micro-steps per tick while the relaxation
    /// metric is strictly improving; once the search phase is detected the
    /// per-tick budget drops to `search_budget` so the discrete stage plays
    /// at finer granularity.
    GreedyImprovement {
        relax_budget: usize,
        search_budget: usize,
    },
}

impl SkipStrategy {
    pub const PLATEAU_DEFAULT: Self = Self::PlateauWindow {
        window: 8,
        stride: 64,
    };

    pub const GREEDY_DEFAULT: Self = Self::GreedyImprovement {
        relax_budget: 8,
        search_budget: 2,
    };
}

impl Default for SkipStrategy {
    fn default() -> Self {
        Self::PLATEAU_DEFAULT
    }
}

/// True when two consecutive records sit on a phase boundary: the populated
/// field pattern changed, or a present counter decreased (the discrete stage
/// restarted its own counter).
pub fn phase_boundary(prev: &Snapshot, next: &Snapshot) -> bool {
    if prev.phase != next.phase {
        return true;
    }
    matches!((prev.counter, next.counter), (Some(p), Some(n)) if n < p)
}

/// Re-reads the phase label at the cursor, flipping the recorded label on a
/// boundary. Returns whether a boundary was crossed relative to the
/// immediately preceding record.
pub fn update_phase(snapshots: &[Snapshot], state: &mut PlaybackState) -> bool {
    let Some(snap) = snapshots.get(state.cursor) else {
        return false;
    };
    let crossed = state.cursor > 0 && phase_boundary(&snapshots[state.cursor - 1], snap);
    if snap.phase != state.phase || crossed {
        tracing::debug!(
            cursor = state.cursor,
            from = state.phase.label(),
            to = snap.phase.label(),
            "phase boundary"
        );
        state.phase = snap.phase;
    }
    crossed
}

/// Applies the configured skip policy after a scheduler tick.
///
/// Any computed skip is clamped to the last snapshot and sets the terminal
/// flag exactly like the scheduler's own advance. Terminal states are
/// frozen.
pub fn detect_and_skip(snapshots: &[Snapshot], state: &mut PlaybackState, strategy: SkipStrategy) {
    if state.done || snapshots.is_empty() {
        return;
    }
    update_phase(snapshots, state);

    match strategy {
        SkipStrategy::PlateauWindow { window, stride } => {
            plateau_skip(snapshots, state, window, stride)
        }
        SkipStrategy::GreedyImprovement {
            relax_budget,
            search_budget,
        } => greedy_step(snapshots, state, relax_budget, search_budget),
    }
}

fn plateau_skip(snapshots: &[Snapshot], state: &mut PlaybackState, window: usize, stride: usize) {
    // Only the relaxation stage is eligible; the search stage is paced by
    // the scheduler alone.
    if state.phase != Phase::Relaxation || window == 0 {
        return;
    }

    let n = snapshots.len();
    let cur = state.cursor;
    let mut target = cur + window;

    let stalled = match (
        snapshots[cur].summary_metric(),
        snapshots.get(target).and_then(Snapshot::summary_metric),
    ) {
        (Some(here), Some(ahead)) => here == ahead,
        _ => false,
    };
    if stalled {
        tracing::debug!(cursor = cur, jump = window + stride, "plateau detected");
        target += stride;
    }

    set_cursor_clamped(state, target, n);
    update_phase(snapshots, state);
}

fn greedy_step(
    snapshots: &[Snapshot],
    state: &mut PlaybackState,
    relax_budget: usize,
    search_budget: usize,
) {
    let n = snapshots.len();
    let mut steps = 0;
    loop {
        // Budget is re-read each micro-step: the moment the search phase is
        // entered the smaller budget applies, ending the loop early.
        let budget = match state.phase {
            Phase::Relaxation => relax_budget,
            Phase::Search => search_budget,
        };
        if steps >= budget {
            break;
        }
        let next = state.cursor + 1;
        if next >= n {
            break;
        }
        if snapshots[next].phase == Phase::Relaxation {
            let improving = match (
                snapshots[state.cursor].summary_metric(),
                snapshots[next].summary_metric(),
            ) {
                (Some(here), Some(ahead)) => ahead < here,
                _ => false,
            };
            if !improving {
                break;
            }
        }
        state.cursor = next;
        update_phase(snapshots, state);
        steps += 1;
    }
}

fn set_cursor_clamped(state: &mut PlaybackState, target: usize, snapshot_count: usize) {
    if target >= snapshot_count {
        state.cursor = snapshot_count - 1;
        state.done = true;
    } else {
        state.cursor = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SolutionDetail;

    fn snap(phase: Phase, counter: Option<u64>, metric: f64) -> Snapshot {
        Snapshot {
            phase,
            counter,
            pareto_front: vec![],
            solution: Some(SolutionDetail {
                intersections: Some(metric),
                ..SolutionDetail::default()
            }),
        }
    }

    /// Relaxation run with the given metrics, then a search tail.
    fn hybrid(relax_metrics: &[f64], search_len: usize) -> Vec<Snapshot> {
        let mut out: Vec<Snapshot> = relax_metrics
            .iter()
            .map(|&m| snap(Phase::Relaxation, None, m))
            .collect();
        let last = relax_metrics.last().copied().unwrap_or(0.0);
        out.extend((0..search_len).map(|g| snap(Phase::Search, Some(g as u64), last)));
        out
    }

    #[test]
    fn plateau_run_skips_past_window_plus_stride() {
        // Metric frozen at 5.0 from index 0 onward: stalled.
        let snapshots = hybrid(&[5.0; 100], 0);
        let mut state = PlaybackState::new(Phase::Relaxation);
        detect_and_skip(&snapshots, &mut state, SkipStrategy::PLATEAU_DEFAULT);
        assert!(state.cursor > 8);
        assert_eq!(state.cursor, 8 + 64);
        assert!(!state.done);
    }

    #[test]
    fn improving_run_advances_only_the_window() {
        let metrics: Vec<f64> = (0..100).map(|i| (100 - i) as f64).collect();
        let snapshots = hybrid(&metrics, 0);
        let mut state = PlaybackState::new(Phase::Relaxation);
        detect_and_skip(&snapshots, &mut state, SkipStrategy::PLATEAU_DEFAULT);
        assert_eq!(state.cursor, 8);
    }

    #[test]
    fn plateau_skip_is_inert_in_search_phase() {
        let snapshots = hybrid(&[], 50);
        let mut state = PlaybackState::new(Phase::Search);
        detect_and_skip(&snapshots, &mut state, SkipStrategy::PLATEAU_DEFAULT);
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn plateau_skip_clamps_and_terminates() {
        let snapshots = hybrid(&[5.0; 20], 0);
        let mut state = PlaybackState::new(Phase::Relaxation);
        state.cursor = 10;
        detect_and_skip(&snapshots, &mut state, SkipStrategy::PLATEAU_DEFAULT);
        assert_eq!(state.cursor, 19);
        assert!(state.done);
    }

    #[test]
    fn greedy_stops_when_improvement_ceases() {
        // Improves for 3 steps, then flat.
        let snapshots = hybrid(&[9.0, 8.0, 7.0, 6.0, 6.0, 6.0, 6.0, 6.0, 6.0, 6.0], 0);
        let mut state = PlaybackState::new(Phase::Relaxation);
        detect_and_skip(&snapshots, &mut state, SkipStrategy::GREEDY_DEFAULT);
        assert_eq!(state.cursor, 3);
    }

    #[test]
    fn greedy_budget_caps_a_long_improving_run() {
        let metrics: Vec<f64> = (0..100).map(|i| (100 - i) as f64).collect();
        let snapshots = hybrid(&metrics, 0);
        let mut state = PlaybackState::new(Phase::Relaxation);
        detect_and_skip(&snapshots, &mut state, SkipStrategy::GREEDY_DEFAULT);
        assert_eq!(state.cursor, 8);
    }

    #[test]
    fn greedy_throttles_once_search_phase_is_entered() {
        let snapshots = hybrid(&[], 50);
        let mut state = PlaybackState::new(Phase::Search);
        detect_and_skip(&snapshots, &mut state, SkipStrategy::GREEDY_DEFAULT);
        assert_eq!(state.cursor, 2);
    }

    #[test]
    fn terminal_detect_is_idempotent() {
        let snapshots = hybrid(&[5.0; 20], 0);
        let mut state = PlaybackState::new(Phase::Relaxation);
        state.cursor = 19;
        state.done = true;
        let frozen = state;
        detect_and_skip(&snapshots, &mut state, SkipStrategy::PLATEAU_DEFAULT);
        detect_and_skip(&snapshots, &mut state, SkipStrategy::GREEDY_DEFAULT);
        assert_eq!(state, frozen);
    }

    #[test]
    fn label_flips_once_per_boundary_for_alternating_logs() {
        for k in 1usize..=5 {
            let total = 6 * k;
            let snapshots: Vec<Snapshot> = (0..total)
                .map(|i| {
                    if (i / k) % 2 == 0 {
                        snap(Phase::Relaxation, None, 1.0)
                    } else {
                        snap(Phase::Search, Some((i % k) as u64), 1.0)
                    }
                })
                .collect();

            let mut state = PlaybackState::new(Phase::Relaxation);
            let mut flips = 0;
            for cursor in 0..total {
                state.cursor = cursor;
                if update_phase(&snapshots, &mut state) {
                    flips += 1;
                }
            }
            // Boundaries sit at every multiple of k except index 0.
            assert_eq!(flips, total / k - 1, "k={k}");
        }
    }

    #[test]
    fn counter_restart_counts_as_boundary() {
        let a = snap(Phase::Search, Some(40), 1.0);
        let b = snap(Phase::Search, Some(0), 1.0);
        assert!(phase_boundary(&a, &b));
        let c = snap(Phase::Search, Some(41), 1.0);
        assert!(!phase_boundary(&a, &c));
    }
}
