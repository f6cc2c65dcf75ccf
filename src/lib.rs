#![forbid(unsafe_code)]

//! Replays trajectory logs from external optimization runs (Pareto-front
//! evolution, graph-layout relaxation, tour construction) as animations
//! synchronized to a target wall-clock duration under a frame-rate ceiling.

pub mod detect;
pub mod error;
pub mod model;
pub mod pacing;
pub mod parse;
pub mod raster;
pub mod render;
pub mod session;
pub mod view;

pub use detect::{SkipStrategy, detect_and_skip, phase_boundary, update_phase};
pub use error::{OptiplayError, OptiplayResult};
pub use model::{Phase, PlaybackState, ProblemDescriptor, Snapshot, SolutionDetail};
pub use pacing::{PacingPlan, advance};
pub use parse::{ParsedLog, parse_log};
pub use raster::RasterSurface;
pub use render::{
    Artifact, Axes, DrawSurface, FrameScene, ObjectiveAxes, Rgba8, draw_scene, resolve_scene,
};
pub use session::{ReplayConfig, ReplaySession, Tick};
pub use view::{AxisBounds, Viewport, map_to_screen};
