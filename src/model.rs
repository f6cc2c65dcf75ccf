use kurbo::Point;

use crate::error::{OptiplayError, OptiplayResult};

/// Static description of the problem a log was produced against.
/// Loaded once from the log header and immutable for the session.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum ProblemDescriptor {
    /// Graph-layout problem: a fixed edge set over `vertex_count` vertices
    /// whose positions evolve per snapshot.
    Graph {
        vertex_count: usize,
        edges: Vec<(usize, usize)>,
    },
    /// Tour-construction problem: fixed city coordinates, snapshot carries
    /// the visiting order.
    Tour { cities: Vec<Point> },
    /// Pure multi-objective problem: snapshots carry objective vectors only.
    Objective {
        name: Option<String>,
        objective_count: usize,
    },
}

impl ProblemDescriptor {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Graph { .. } => "graph-layout",
            Self::Tour { .. } => "tour",
            Self::Objective { .. } => "multi-objective",
        }
    }

    pub fn validate(&self) -> OptiplayResult<()> {
        match self {
            Self::Graph {
                vertex_count,
                edges,
            } => {
                for &(from, to) in edges {
                    if from >= *vertex_count || to >= *vertex_count {
                        return Err(OptiplayError::validation(format!(
                            "edge ({from}, {to}) references vertex >= {vertex_count}"
                        )));
                    }
                }
                Ok(())
            }
            Self::Tour { cities } => {
                if cities.is_empty() {
                    return Err(OptiplayError::validation("tour problem has no cities"));
                }
                Ok(())
            }
            Self::Objective {
                objective_count, ..
            } => {
                if *objective_count == 0 {
                    return Err(OptiplayError::validation(
                        "objective problem must have objective_count > 0",
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Which algorithmic stage of a hybrid pipeline produced a snapshot.
///
/// Decided once at parse time from field presence: a `generation` counter
/// marks the discrete-search stage, its absence marks the continuous
/// relaxation stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Phase {
    Relaxation,
    Search,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Relaxation => "relaxation",
            Self::Search => "search",
        }
    }
}

/// One logged state of the optimization run.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Snapshot {
    pub phase: Phase,
    /// Generation or iteration value, whichever the producer logged.
    pub counter: Option<u64>,
    /// Objective vectors of the non-dominated set at this step (may be empty
    /// for single-solution logs).
    pub pareto_front: Vec<Vec<f64>>,
    /// Best/highlighted solution, distinguished from the front.
    pub solution: Option<SolutionDetail>,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct SolutionDetail {
    pub objectives: Vec<f64>,
    /// Vertex positions normalized to [0,1], for graph-layout logs.
    pub vertices: Vec<Point>,
    /// City visiting order forming a closed cycle, for tour logs.
    pub order: Vec<usize>,
    pub intersections: Option<f64>,
    pub fitness: Option<f64>,
}

impl Snapshot {
    /// The scalar used for plateau comparisons. Intersection count when the
    /// producer logs one, otherwise fitness.
    pub fn summary_metric(&self) -> Option<f64> {
        let s = self.solution.as_ref()?;
        s.intersections.or(s.fitness)
    }
}

/// Mutable playback cursor, updated once per tick. Single owner; freezes
/// once `done` is set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PlaybackState {
    pub cursor: usize,
    pub phase: Phase,
    pub frames: u64,
    pub done: bool,
}

impl PlaybackState {
    pub fn new(initial_phase: Phase) -> Self {
        Self {
            cursor: 0,
            phase: initial_phase,
            frames: 0,
            done: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_descriptor_rejects_out_of_range_edge() {
        let d = ProblemDescriptor::Graph {
            vertex_count: 3,
            edges: vec![(0, 1), (1, 3)],
        };
        assert!(d.validate().is_err());
    }

    #[test]
    fn summary_metric_prefers_intersections() {
        let snap = Snapshot {
            phase: Phase::Relaxation,
            counter: None,
            pareto_front: vec![],
            solution: Some(SolutionDetail {
                intersections: Some(4.0),
                fitness: Some(0.25),
                ..SolutionDetail::default()
            }),
        };
        assert_eq!(snap.summary_metric(), Some(4.0));
    }

    #[test]
    fn summary_metric_falls_back_to_fitness() {
        let snap = Snapshot {
            phase: Phase::Search,
            counter: Some(1),
            pareto_front: vec![],
            solution: Some(SolutionDetail {
                fitness: Some(0.25),
                ..SolutionDetail::default()
            }),
        };
        assert_eq!(snap.summary_metric(), Some(0.25));
    }

    #[test]
    fn json_roundtrip() {
        let d = ProblemDescriptor::Tour {
            cities: vec![Point::new(12.0, 55.0), Point::new(48.0, 2.0)],
        };
        let s = serde_json::to_string(&d).unwrap();
        let de: ProblemDescriptor = serde_json::from_str(&s).unwrap();
        assert_eq!(de.kind_name(), "tour");
    }
}
