//! Log ingestion: raw producer records in, typed snapshot sequence out.
//!
//! Three encodings of the same data are accepted and normalized:
//! newline-delimited JSON (one record per line), a single JSON array of
//! records, and an assembled `{ "problem": .., "bestSolutions": [..] }`
//! document. The first record is always the problem header; a second record
//! carrying a `took` timing field is a precomputed baseline solution and is
//! kept out of the animated sequence.

use kurbo::Point;

use crate::{
    error::{OptiplayError, OptiplayResult},
    model::{Phase, ProblemDescriptor, Snapshot, SolutionDetail},
};

/// Result of a successful log load.
#[derive(Clone, Debug)]
pub struct ParsedLog {
    pub problem: ProblemDescriptor,
    /// Already-solved reference solution, drawn under the animation.
    pub baseline: Option<Snapshot>,
    pub snapshots: Vec<Snapshot>,
}

#[derive(Debug, serde::Deserialize)]
struct RawHeader {
    graph: Option<RawGraph>,
    cities: Option<Vec<RawCity>>,
    name: Option<String>,
    objectives: Option<usize>,
}

#[derive(Debug, serde::Deserialize)]
struct RawGraph {
    #[serde(rename = "numVertices")]
    num_vertices: usize,
    edges: Vec<RawEdge>,
}

#[derive(Debug, serde::Deserialize)]
struct RawEdge {
    from: usize,
    to: usize,
}

#[derive(Debug, serde::Deserialize)]
struct RawCity {
    lat: f64,
    lon: f64,
}

#[derive(Debug, serde::Deserialize)]
struct RawRecord {
    generation: Option<u64>,
    iteration: Option<u64>,
    #[serde(default)]
    pareto_front: Option<Vec<Vec<f64>>>,
    solution: Option<RawSolution>,
    took: Option<serde_json::Value>,
}

#[derive(Debug, serde::Deserialize)]
struct RawSolution {
    #[serde(default)]
    objectives: Vec<f64>,
    #[serde(default, alias = "Vertices")]
    vertices: Vec<RawVertex>,
    #[serde(default)]
    order: Vec<usize>,
    intersections: Option<f64>,
    fitness: Option<f64>,
}

#[derive(Debug, serde::Deserialize)]
struct RawVertex {
    #[serde(alias = "X")]
    x: f64,
    #[serde(alias = "Y")]
    y: f64,
}

/// Assembled-document encoding: problem and snapshots under named fields.
#[derive(Debug, serde::Deserialize)]
struct RawDocument {
    problem: serde_json::Value,
    #[serde(rename = "bestSolutions")]
    best_solutions: Vec<serde_json::Value>,
}

/// Parses raw log text into the typed data model.
///
/// Malformed records abort the whole load: there is no meaningful way to
/// animate a truncated trajectory.
pub fn parse_log(text: &str) -> OptiplayResult<ParsedLog> {
    let values = split_records(text)?;
    let mut records = values.into_iter();

    let header = records
        .next()
        .ok_or_else(|| OptiplayError::malformed("log has no header record"))?;
    let problem = parse_header(&header)?;
    problem.validate()?;

    let mut baseline = None;
    let mut snapshots = Vec::new();
    for (i, value) in records.enumerate() {
        let raw: RawRecord = serde_json::from_value(value)
            .map_err(|e| OptiplayError::malformed(format!("record {}: {e}", i + 1)))?;
        if i == 0 && raw.took.is_some() {
            baseline = Some(normalize(raw));
            continue;
        }
        snapshots.push(normalize(raw));
    }

    if snapshots.is_empty() {
        tracing::warn!("log contains no playable snapshots");
    }

    Ok(ParsedLog {
        problem,
        baseline,
        snapshots,
    })
}

/// Splits raw text into one `serde_json::Value` per record, accepting all
/// three encodings.
fn split_records(text: &str) -> OptiplayResult<Vec<serde_json::Value>> {
    let trimmed = text.trim_start();

    if trimmed.starts_with('[') {
        let values: Vec<serde_json::Value> = serde_json::from_str(trimmed)
            .map_err(|e| OptiplayError::malformed(format!("log array: {e}")))?;
        return Ok(values);
    }

    if trimmed.starts_with('{') {
        // Assembled-document encoding: one JSON object holding the problem
        // and every snapshot under named fields. JSONL logs also start with
        // '{' but never parse as this shape, so fall through on failure.
        if let Ok(doc) = serde_json::from_str::<RawDocument>(trimmed) {
            let mut values = vec![doc.problem];
            values.extend(doc.best_solutions);
            return Ok(values);
        }
    }

    let mut values = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let value: serde_json::Value = serde_json::from_str(line)
            .map_err(|e| OptiplayError::malformed(format!("line {}: {e}", line_no + 1)))?;
        values.push(value);
    }
    Ok(values)
}

fn parse_header(value: &serde_json::Value) -> OptiplayResult<ProblemDescriptor> {
    let raw: RawHeader = serde_json::from_value(value.clone())
        .map_err(|e| OptiplayError::malformed(format!("header: {e}")))?;

    if let Some(graph) = raw.graph {
        return Ok(ProblemDescriptor::Graph {
            vertex_count: graph.num_vertices,
            edges: graph.edges.into_iter().map(|e| (e.from, e.to)).collect(),
        });
    }
    if let Some(cities) = raw.cities {
        return Ok(ProblemDescriptor::Tour {
            cities: cities.into_iter().map(|c| Point::new(c.lat, c.lon)).collect(),
        });
    }
    Ok(ProblemDescriptor::Objective {
        name: raw.name,
        objective_count: raw.objectives.unwrap_or(2),
    })
}

/// The phase tag is decided here, once per record: a `generation` counter
/// marks the discrete-search stage, its absence the relaxation stage.
fn normalize(raw: RawRecord) -> Snapshot {
    let phase = if raw.generation.is_some() {
        Phase::Search
    } else {
        Phase::Relaxation
    };
    Snapshot {
        phase,
        counter: raw.generation.or(raw.iteration),
        pareto_front: raw.pareto_front.unwrap_or_default(),
        solution: raw.solution.map(|s| SolutionDetail {
            objectives: s.objectives,
            vertices: s.vertices.into_iter().map(|v| Point::new(v.x, v.y)).collect(),
            order: s.order,
            intersections: s.intersections,
            fitness: s.fitness,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAPH_HEADER: &str =
        r#"{"graph":{"numVertices":3,"numEdges":2,"edges":[{"from":0,"to":1},{"from":1,"to":2}]}}"#;

    fn step(generation: Option<u64>, intersections: f64) -> String {
        let counter = match generation {
            Some(g) => format!(r#""generation":{g},"#),
            None => r#""iteration":4,"#.to_string(),
        };
        format!(
            r#"{{{counter}"solution":{{"vertices":[{{"x":0.1,"y":0.2}},{{"x":0.5,"y":0.5}},{{"x":0.9,"y":0.1}}],"intersections":{intersections}}}}}"#
        )
    }

    #[test]
    fn jsonl_log_parses_with_blank_lines() {
        let text = format!(
            "{GRAPH_HEADER}\n\n{}\n{}\n\n",
            step(None, 3.0),
            step(Some(1), 2.0)
        );
        let log = parse_log(&text).unwrap();
        assert_eq!(log.snapshots.len(), 2);
        assert_eq!(log.snapshots[0].phase, Phase::Relaxation);
        assert_eq!(log.snapshots[1].phase, Phase::Search);
        assert_eq!(log.snapshots[1].counter, Some(1));
    }

    #[test]
    fn array_encoding_matches_jsonl() {
        let jsonl = format!("{GRAPH_HEADER}\n{}\n{}", step(None, 3.0), step(Some(1), 2.0));
        let array = format!("[{GRAPH_HEADER},{},{}]", step(None, 3.0), step(Some(1), 2.0));
        let a = parse_log(&jsonl).unwrap();
        let b = parse_log(&array).unwrap();
        assert_eq!(a.snapshots.len(), b.snapshots.len());
        assert_eq!(a.snapshots[1].summary_metric(), b.snapshots[1].summary_metric());
    }

    #[test]
    fn document_encoding_is_normalized() {
        let text = format!(
            "{{\n\"problem\": {GRAPH_HEADER},\n\"bestSolutions\": [{}]\n}}",
            step(Some(2), 1.0)
        );
        let log = parse_log(&text).unwrap();
        assert_eq!(log.snapshots.len(), 1);
        assert_eq!(log.snapshots[0].counter, Some(2));
    }

    #[test]
    fn took_record_becomes_baseline() {
        let text = r#"{"cities":[{"lat":1.0,"lon":2.0},{"lat":3.0,"lon":4.0}]}
{"took":81273,"solution":{"order":[0,1],"fitness":0.5}}
{"generation":1,"solution":{"order":[1,0],"fitness":0.25}}"#;
        let log = parse_log(text).unwrap();
        assert!(log.baseline.is_some());
        assert_eq!(log.snapshots.len(), 1);
    }

    #[test]
    fn missing_header_is_malformed() {
        assert!(matches!(
            parse_log("   \n\n"),
            Err(OptiplayError::MalformedLog(_))
        ));
    }

    #[test]
    fn bad_record_aborts_whole_load() {
        let text = format!("{GRAPH_HEADER}\n{}\nnot json\n", step(None, 3.0));
        assert!(matches!(
            parse_log(&text),
            Err(OptiplayError::MalformedLog(_))
        ));
    }

    #[test]
    fn empty_log_is_not_an_error() {
        let log = parse_log(GRAPH_HEADER).unwrap();
        assert!(log.snapshots.is_empty());
        assert!(log.baseline.is_none());
    }

    #[test]
    fn go_marshal_casing_is_accepted() {
        let text = format!(
            "{GRAPH_HEADER}\n{}",
            r#"{"solution":{"Vertices":[{"X":0.1,"Y":0.9},{"X":0.2,"Y":0.8},{"X":0.3,"Y":0.7}]}}"#
        );
        let log = parse_log(&text).unwrap();
        let sol = log.snapshots[0].solution.as_ref().unwrap();
        assert_eq!(sol.vertices.len(), 3);
        assert_eq!(sol.vertices[0].y, 0.9);
    }
}
