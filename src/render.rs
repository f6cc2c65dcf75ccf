//! Frame resolution and drawing.
//!
//! The core never touches pixels. Each tick it resolves the snapshot at the
//! playback cursor into a [`FrameScene`] with every coordinate already
//! mapped, then replays the scene into a [`DrawSurface`], the external
//! rendering collaborator (a raster buffer, a GUI canvas, a recording stub).

use kurbo::Point;

use crate::{
    model::{Phase, ProblemDescriptor, Snapshot},
    view::{AxisBounds, Viewport},
};

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// The sketch palette the original logs were tuned against.
    pub const BACKGROUND: Self = Self::new(18, 18, 18);
    pub const AXIS: Self = Self::new(255, 255, 255);
    pub const FRONT: Self = Self::new(0, 200, 255);
    pub const HIGHLIGHT: Self = Self::new(255, 0, 0);
    pub const BASELINE: Self = Self::new(0, 255, 0);
}

/// Primitive draw sink. The core is a pure producer of these calls.
pub trait DrawSurface {
    fn clear(&mut self, color: Rgba8);
    fn line(&mut self, from: Point, to: Point, color: Rgba8, width: f64);
    fn circle(&mut self, center: Point, radius: f64, color: Rgba8);
    fn fill_rect(&mut self, origin: Point, width: f64, height: f64, color: Rgba8);
    fn text(&mut self, text: &str, anchor: Point, color: Rgba8);
}

/// Fully resolved frame: phase annotation plus pixel-space geometry.
#[derive(Clone, Debug, serde::Serialize)]
pub struct FrameScene {
    pub phase: Phase,
    pub counter: Option<u64>,
    pub summary_metric: Option<f64>,
    pub title: Option<String>,
    pub axes: Axes,
    pub baseline: Option<Artifact>,
    /// None for an empty log: axes only.
    pub artifact: Option<Artifact>,
}

#[derive(Clone, Copy, Debug, serde::Serialize)]
pub struct Axes {
    pub origin: Point,
    pub x_end: Point,
    pub y_end: Point,
}

/// The optimization artifact of one snapshot, mapped to pixels.
#[derive(Clone, Debug, serde::Serialize)]
pub enum Artifact {
    /// Pareto-front point cloud, plus the highlighted solution if logged.
    FrontPoints {
        points: Vec<Point>,
        highlight: Option<Point>,
    },
    /// Graph-layout edges and vertices.
    GraphLayout {
        edges: Vec<(Point, Point)>,
        vertices: Vec<Point>,
    },
    /// Closed tour cycle over the fixed city positions.
    TourCycle {
        cities: Vec<Point>,
        path: Vec<Point>,
    },
}

/// Axis selection and bounds for objective-space plots.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct ObjectiveAxes {
    /// Which objective indices to plot for problems with more than two.
    pub x_index: usize,
    pub y_index: usize,
    pub x_bounds: AxisBounds,
    pub y_bounds: AxisBounds,
}

impl Default for ObjectiveAxes {
    fn default() -> Self {
        Self {
            x_index: 0,
            y_index: 1,
            x_bounds: AxisBounds::UNIT,
            y_bounds: AxisBounds::UNIT,
        }
    }
}

/// Resolves the snapshot at the cursor into a drawable scene.
pub fn resolve_scene(
    problem: &ProblemDescriptor,
    snapshot: Option<&Snapshot>,
    baseline: Option<&Snapshot>,
    phase: Phase,
    viewport: Viewport,
    axes: ObjectiveAxes,
    title: Option<&str>,
) -> FrameScene {
    FrameScene {
        phase,
        counter: snapshot.and_then(|s| s.counter),
        summary_metric: snapshot.and_then(Snapshot::summary_metric),
        title: title.map(str::to_owned),
        axes: resolve_axes(viewport),
        baseline: baseline.and_then(|s| resolve_artifact(problem, s, viewport, axes)),
        artifact: snapshot.and_then(|s| resolve_artifact(problem, s, viewport, axes)),
    }
}

fn resolve_axes(viewport: Viewport) -> Axes {
    let (x_min, x_max) = viewport.x_range();
    let (y_min, y_max) = viewport.y_range();
    Axes {
        origin: Point::new(x_min, y_min),
        x_end: Point::new(x_max, y_min),
        y_end: Point::new(x_min, y_max),
    }
}

fn resolve_artifact(
    problem: &ProblemDescriptor,
    snapshot: &Snapshot,
    viewport: Viewport,
    axes: ObjectiveAxes,
) -> Option<Artifact> {
    match problem {
        ProblemDescriptor::Objective { .. } => resolve_front(snapshot, viewport, axes),
        ProblemDescriptor::Graph { edges, .. } => resolve_graph(snapshot, edges, viewport),
        ProblemDescriptor::Tour { cities } => resolve_tour(snapshot, cities, viewport),
    }
}

fn resolve_front(
    snapshot: &Snapshot,
    viewport: Viewport,
    axes: ObjectiveAxes,
) -> Option<Artifact> {
    let project = |objectives: &[f64]| -> Option<Point> {
        let x = objectives.get(axes.x_index)?;
        let y = objectives.get(axes.y_index)?;
        Some(viewport.project(*x, *y, axes.x_bounds, axes.y_bounds))
    };

    let points: Vec<Point> = snapshot
        .pareto_front
        .iter()
        .filter_map(|v| project(v))
        .collect();
    let highlight = snapshot
        .solution
        .as_ref()
        .and_then(|s| project(&s.objectives));

    if points.is_empty() && highlight.is_none() {
        return None;
    }
    Some(Artifact::FrontPoints { points, highlight })
}

fn resolve_graph(
    snapshot: &Snapshot,
    edge_list: &[(usize, usize)],
    viewport: Viewport,
) -> Option<Artifact> {
    let solution = snapshot.solution.as_ref()?;
    if solution.vertices.is_empty() {
        return None;
    }
    // Layout positions are normalized to the unit square.
    let vertices: Vec<Point> = solution
        .vertices
        .iter()
        .map(|v| viewport.project(v.x, v.y, AxisBounds::UNIT, AxisBounds::UNIT))
        .collect();
    let edges = edge_list
        .iter()
        .filter_map(|&(from, to)| Some((*vertices.get(from)?, *vertices.get(to)?)))
        .collect();
    Some(Artifact::GraphLayout { edges, vertices })
}

fn resolve_tour(
    snapshot: &Snapshot,
    cities: &[Point],
    viewport: Viewport,
) -> Option<Artifact> {
    let bounds = tour_bounds(cities);
    let map = |c: Point| viewport.project(c.x, c.y, bounds.0, bounds.1);

    let mapped_cities: Vec<Point> = cities.iter().map(|&c| map(c)).collect();
    let order = &snapshot.solution.as_ref()?.order;
    if order.is_empty() {
        return None;
    }
    // Closed cycle: repeat the first city at the end.
    let mut path: Vec<Point> = order
        .iter()
        .filter_map(|&i| mapped_cities.get(i).copied())
        .collect();
    if let Some(&first) = path.first() {
        path.push(first);
    }
    Some(Artifact::TourCycle {
        cities: mapped_cities,
        path,
    })
}

/// Literal bounding box of the city set, so arbitrary lat/lon ranges fill
/// the viewport.
fn tour_bounds(cities: &[Point]) -> (AxisBounds, AxisBounds) {
    let mut x = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y = (f64::INFINITY, f64::NEG_INFINITY);
    for c in cities {
        x = (x.0.min(c.x), x.1.max(c.x));
        y = (y.0.min(c.y), y.1.max(c.y));
    }
    let pad = |min: f64, max: f64| {
        if min < max {
            AxisBounds { min, max }
        } else {
            // Degenerate span (single city, collinear axis): center it.
            AxisBounds {
                min: min - 0.5,
                max: max + 0.5,
            }
        }
    };
    (pad(x.0, x.1), pad(y.0, y.1))
}

const POINT_RADIUS: f64 = 5.0;
const HIGHLIGHT_RADIUS: f64 = 6.0;
const EDGE_WIDTH: f64 = 2.0;

/// Replays a resolved scene into the surface, in order: background, axes and
/// labels, baseline, artifact, highlight.
pub fn draw_scene(scene: &FrameScene, surface: &mut dyn DrawSurface) {
    surface.clear(Rgba8::BACKGROUND);

    surface.line(scene.axes.origin, scene.axes.x_end, Rgba8::AXIS, 1.0);
    surface.line(scene.axes.origin, scene.axes.y_end, Rgba8::AXIS, 1.0);
    draw_labels(scene, surface);

    if let Some(baseline) = &scene.baseline {
        draw_artifact(baseline, surface, Rgba8::BASELINE);
    }
    if let Some(artifact) = &scene.artifact {
        draw_artifact(artifact, surface, Rgba8::FRONT);
    }
}

fn draw_labels(scene: &FrameScene, surface: &mut dyn DrawSurface) {
    let mut labels: Vec<String> = Vec::new();
    if let Some(title) = &scene.title {
        labels.push(title.clone());
    }
    labels.push(format!("Phase: {}", scene.phase.label()));
    if let Some(counter) = scene.counter {
        let name = match scene.phase {
            Phase::Search => "Generation",
            Phase::Relaxation => "Iteration",
        };
        labels.push(format!("{name}: {counter}"));
    }
    if let Some(metric) = scene.summary_metric {
        labels.push(format!("Metric: {metric}"));
    }

    for (i, text) in labels.iter().enumerate() {
        let anchor = Point::new(20.0, 20.0 + 20.0 * i as f64);
        surface.text(text, anchor, Rgba8::AXIS);
    }
}

fn draw_artifact(artifact: &Artifact, surface: &mut dyn DrawSurface, stroke: Rgba8) {
    match artifact {
        Artifact::FrontPoints { points, highlight } => {
            for &p in points {
                surface.circle(p, POINT_RADIUS, stroke);
            }
            if let Some(p) = *highlight {
                surface.circle(p, HIGHLIGHT_RADIUS, Rgba8::HIGHLIGHT);
            }
        }
        Artifact::GraphLayout { edges, vertices } => {
            for &(a, b) in edges {
                surface.line(a, b, stroke, EDGE_WIDTH);
            }
            for &v in vertices {
                surface.circle(v, POINT_RADIUS, Rgba8::AXIS);
            }
        }
        Artifact::TourCycle { cities, path } => {
            for &c in cities {
                surface.circle(c, POINT_RADIUS, Rgba8::AXIS);
            }
            for pair in path.windows(2) {
                surface.line(pair[0], pair[1], stroke, EDGE_WIDTH);
            }
        }
    }
}
