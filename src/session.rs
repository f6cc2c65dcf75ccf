//! Replay session: the loaded log plus the per-tick pipeline.
//!
//! A session only exists after a successful load, which is the whole
//! "loaded" gate: hosts that fetch asynchronously construct the session in
//! their completion handler and register the tick callback afterwards. Each
//! tick runs synchronously to completion (resolve, draw, advance, skip) and
//! the session freezes once the final frame has been shown.

use std::path::Path;

use crate::{
    detect::{SkipStrategy, detect_and_skip, update_phase},
    error::{OptiplayError, OptiplayResult},
    model::{Phase, PlaybackState, ProblemDescriptor, Snapshot},
    pacing::{PacingPlan, advance},
    parse::parse_log,
    render::{DrawSurface, ObjectiveAxes, draw_scene, resolve_scene},
    view::Viewport,
};

/// Static configuration, set before load.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ReplayConfig {
    /// Target animation length in seconds.
    pub duration_secs: u32,
    /// Never render faster than this, whatever the log length.
    pub frame_rate_ceiling: u32,
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Usable fraction of each viewport axis; the rest is label margin.
    pub zoom: f64,
    pub objective_axes: ObjectiveAxes,
    pub strategy: SkipStrategy,
    /// On-screen title; defaults to the log file stem when loaded from disk.
    pub title: Option<String>,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            duration_secs: 10,
            frame_rate_ceiling: 30,
            viewport_width: 960.0,
            viewport_height: 960.0,
            zoom: 0.95,
            objective_axes: ObjectiveAxes::default(),
            strategy: SkipStrategy::default(),
            title: None,
        }
    }
}

/// Outcome of one tick callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// A frame was drawn into the surface.
    Drew,
    /// The animation has ended; nothing was drawn or mutated.
    Terminal,
}

pub struct ReplaySession {
    problem: ProblemDescriptor,
    baseline: Option<Snapshot>,
    snapshots: Vec<Snapshot>,
    plan: PacingPlan,
    viewport: Viewport,
    config: ReplayConfig,
    state: PlaybackState,
    finished: bool,
}

impl ReplaySession {
    /// Parses log text and derives the pacing plan.
    #[tracing::instrument(skip_all)]
    pub fn from_str(text: &str, config: ReplayConfig) -> OptiplayResult<Self> {
        let viewport = Viewport::new(config.viewport_width, config.viewport_height, config.zoom)?;
        let log = parse_log(text)?;
        let plan = PacingPlan::plan(
            log.snapshots.len(),
            config.duration_secs,
            config.frame_rate_ceiling,
        )?;

        let initial_phase = log
            .snapshots
            .first()
            .map_or(Phase::Relaxation, |s| s.phase);
        tracing::debug!(
            problem = log.problem.kind_name(),
            snapshots = log.snapshots.len(),
            frame_rate = plan.frame_rate,
            advance_step = plan.advance_step,
            "session loaded"
        );

        Ok(Self {
            problem: log.problem,
            baseline: log.baseline,
            snapshots: log.snapshots,
            plan,
            viewport,
            config,
            state: PlaybackState::new(initial_phase),
            finished: false,
        })
    }

    /// Loads a log from disk. Follows the `<Problem>_<Algorithm>.jsonl`
    /// naming convention for the default title.
    pub fn load(path: &Path, mut config: ReplayConfig) -> OptiplayResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| OptiplayError::load(format!("read '{}': {e}", path.display())))?;
        if config.title.is_none() {
            config.title = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned());
        }
        Self::from_str(&text, config)
    }

    pub fn problem(&self) -> &ProblemDescriptor {
        &self.problem
    }

    pub fn plan(&self) -> PacingPlan {
        self.plan
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    pub fn baseline(&self) -> Option<&Snapshot> {
        self.baseline.as_ref()
    }

    /// One frame-driven tick: draw the snapshot at the cursor, then move the
    /// cursor per the pacing plan and the configured skip policy. Returns
    /// [`Tick::Terminal`] (a no-op) once the final frame has been shown.
    pub fn tick(&mut self, surface: &mut dyn DrawSurface) -> Tick {
        if self.finished {
            return Tick::Terminal;
        }

        if !self.snapshots.is_empty() {
            update_phase(&self.snapshots, &mut self.state);
        }
        let scene = resolve_scene(
            &self.problem,
            self.snapshots.get(self.state.cursor),
            self.baseline.as_ref(),
            self.state.phase,
            self.viewport,
            self.config.objective_axes,
            self.config.title.as_deref(),
        );
        draw_scene(&scene, surface);
        self.state.frames += 1;

        if self.state.done || self.snapshots.is_empty() {
            // The frozen terminal frame has now been shown once.
            self.state.done = true;
            self.finished = true;
            return Tick::Drew;
        }

        let before = self.state.cursor;
        advance(&mut self.state, self.plan, self.snapshots.len());
        if !self.state.done {
            detect_and_skip(&self.snapshots, &mut self.state, self.config.strategy);
        }
        if self.state.done && self.state.cursor == before {
            // Clamped without moving: the frame just drawn was the last one.
            self.finished = true;
        }
        Tick::Drew
    }

    /// Runs the animation to completion, returning the number of frames
    /// drawn. For hosts without their own frame loop (CLI, tests).
    pub fn run_to_end(&mut self, surface: &mut dyn DrawSurface) -> u64 {
        while self.tick(surface) == Tick::Drew {}
        self.state.frames
    }
}
