//! Iterative solving session: the controller that drives the bounds
//! schedule, the encoders, and the solver, and streams progress.
//!
//! A [`Session`] is a lazy iterator. Each `next()` performs at most one
//! bounded check and yields either an attempt event (unsat/unknown) or the
//! single terminal solution. A cancel token is consulted before every
//! attempt; cancellation turns the session into a terminal `unknown` with
//! no placements.

use crate::bounds;
use crate::config::{EncodingMode, SolverConfig};
use crate::encode::CellModel;
use crate::extract;
use crate::graph::{FlowGraph, GraphError, ProductionGraph};
use crate::packing::RectModel;
use crate::solver::{check, CheckOutcome};
use crate::types::{Attempt, BeltSegment, Bounds, LayoutSolution, PlacedBuilding, SolveStatus, StreamItem};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Structured rejection of a solve call.
#[derive(Error, Debug)]
pub enum SolveError {
    #[error("invalid graph: {0}")]
    Graph(#[from] GraphError),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Shared cancellation flag for a running session.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy)]
enum State {
    Probing { iteration: u32, width: u32, height: u32 },
    Terminal { status: SolveStatus, width: u32, height: u32 },
    Done,
}

/// One `solve` call in flight, from first attempt to terminal solution.
pub struct Session {
    graph: FlowGraph,
    config: SolverConfig,
    state: State,
    attempts: Vec<Attempt>,
    cancel: CancelToken,
    started: Instant,
}

impl Session {
    /// Validate the inputs and set up the first attempt. Fails fast on
    /// malformed graphs or configs, before any solver work.
    pub fn new(graph: &ProductionGraph, config: SolverConfig) -> Result<Session, SolveError> {
        config.validate().map_err(SolveError::Config)?;
        let flow = FlowGraph::from_graph(graph)?;
        let (width, height) = bounds::initial_bounds(&flow, &config);
        log::info!(
            "solve start: {} nodes, {} edges, initial bounds {}x{}",
            flow.nodes().len(),
            flow.edges().len(),
            width,
            height
        );
        Ok(Session {
            graph: flow,
            config,
            state: State::Probing { iteration: 1, width, height },
            attempts: Vec::new(),
            cancel: CancelToken::new(),
            started: Instant::now(),
        })
    }

    /// Token to cancel this session from another thread or between polls.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    fn solution(
        &self,
        status: SolveStatus,
        width: u32,
        height: u32,
        placements: Vec<PlacedBuilding>,
        segments: Vec<BeltSegment>,
    ) -> LayoutSolution {
        LayoutSolution {
            status,
            bounds: Bounds { width, height },
            placements,
            segments,
            attempts: self.attempts.clone(),
            elapsed_ms: self.started.elapsed().as_secs_f64() * 1000.0,
        }
    }

    /// Build the configured model, check it, and extract on sat.
    fn run_attempt(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<AttemptResult, SolveError> {
        let timeout = Duration::from_millis(self.config.timeout_ms_per_attempt);
        match self.config.encoding {
            EncodingMode::Cells => {
                let mut model = CellModel::build(&self.graph, width, height);
                match check(model.take_cnf(), timeout) {
                    CheckOutcome::Sat(assignment) => {
                        let (placements, segments) =
                            extract::extract_cells(&self.graph, &model, &assignment)
                                .map_err(SolveError::Internal)?;
                        Ok(AttemptResult::Sat { placements, segments })
                    }
                    CheckOutcome::Unsat => Ok(AttemptResult::Unsat),
                    CheckOutcome::Unknown => Ok(AttemptResult::Unknown),
                }
            }
            EncodingMode::Rectangles => {
                let mut model =
                    RectModel::build(&self.graph, width, height, self.config.packing_gap);
                match check(model.take_cnf(), timeout) {
                    CheckOutcome::Sat(assignment) => {
                        let (placements, segments) =
                            extract::extract_rects(&self.graph, &model, &assignment)
                                .map_err(SolveError::Internal)?;
                        Ok(AttemptResult::Sat { placements, segments })
                    }
                    CheckOutcome::Unsat => Ok(AttemptResult::Unsat),
                    CheckOutcome::Unknown => Ok(AttemptResult::Unknown),
                }
            }
        }
    }
}

enum AttemptResult {
    Sat { placements: Vec<PlacedBuilding>, segments: Vec<BeltSegment> },
    Unsat,
    Unknown,
}

impl Iterator for Session {
    type Item = Result<StreamItem, SolveError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            State::Done => None,
            State::Terminal { status, width, height } => {
                self.state = State::Done;
                let solution = self.solution(status, width, height, Vec::new(), Vec::new());
                Some(Ok(StreamItem::Solution(solution)))
            }
            State::Probing { iteration, width, height } => {
                if self.cancel.is_cancelled() {
                    log::info!("cancelled before attempt {iteration}");
                    self.state = State::Done;
                    // Report the last probed rectangle, not the pending
                    // expansion that never ran.
                    let (lw, lh) = self
                        .attempts
                        .last()
                        .map(|a| (a.width, a.height))
                        .unwrap_or((width, height));
                    let solution =
                        self.solution(SolveStatus::Unknown, lw, lh, Vec::new(), Vec::new());
                    return Some(Ok(StreamItem::Solution(solution)));
                }

                log::info!("attempt {iteration}: {width} x {height}");
                let result = match self.run_attempt(width, height) {
                    Ok(result) => result,
                    Err(err) => {
                        self.state = State::Done;
                        return Some(Err(err));
                    }
                };

                match result {
                    AttemptResult::Sat { placements, segments } => {
                        self.attempts.push(Attempt {
                            iteration,
                            width,
                            height,
                            status: SolveStatus::Sat,
                        });
                        self.state = State::Done;
                        let solution =
                            self.solution(SolveStatus::Sat, width, height, placements, segments);
                        Some(Ok(StreamItem::Solution(solution)))
                    }
                    AttemptResult::Unsat => {
                        let attempt =
                            Attempt { iteration, width, height, status: SolveStatus::Unsat };
                        self.attempts.push(attempt.clone());
                        if iteration >= self.config.max_iterations {
                            self.state =
                                State::Terminal { status: SolveStatus::Unsat, width, height };
                        } else {
                            let (next_w, next_h) =
                                bounds::expand_bounds(width, height, &self.config, iteration);
                            self.state = State::Probing {
                                iteration: iteration + 1,
                                width: next_w,
                                height: next_h,
                            };
                        }
                        Some(Ok(StreamItem::Attempt(attempt)))
                    }
                    AttemptResult::Unknown => {
                        let attempt =
                            Attempt { iteration, width, height, status: SolveStatus::Unknown };
                        self.attempts.push(attempt.clone());
                        self.state =
                            State::Terminal { status: SolveStatus::Unknown, width, height };
                        Some(Ok(StreamItem::Attempt(attempt)))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BuildingKind;
    use crate::graph::{MachineNode, MaterialEdge};

    fn two_crushers() -> ProductionGraph {
        ProductionGraph {
            id: "g".into(),
            target_product: "gravel".into(),
            target_belts: 1,
            nodes: vec![
                MachineNode { id: "a".into(), label: "A".into(), kind: BuildingKind::Crusher },
                MachineNode { id: "b".into(), label: "B".into(), kind: BuildingKind::Crusher },
            ],
            edges: vec![MaterialEdge {
                id: "e1".into(),
                from_id: "a".into(),
                to_id: "b".into(),
                item: "ore".into(),
                belts: 1,
            }],
        }
    }

    #[test]
    fn invalid_config_fails_before_streaming() {
        let graph = two_crushers();
        let config = SolverConfig { expansion_step: 0, ..SolverConfig::default() };
        assert!(matches!(
            Session::new(&graph, config),
            Err(SolveError::Config(_))
        ));
    }

    #[test]
    fn invalid_graph_fails_before_streaming() {
        let mut graph = two_crushers();
        graph.edges[0].to_id = "ghost".into();
        assert!(matches!(
            Session::new(&graph, SolverConfig::default()),
            Err(SolveError::Graph(GraphError::UnknownEndpoint { .. }))
        ));
    }

    #[test]
    fn cancel_after_first_attempt_yields_unknown() {
        let graph = two_crushers();
        let config = SolverConfig {
            initial_width: Some(6),
            initial_height: Some(6),
            ..SolverConfig::default()
        };
        let mut session = Session::new(&graph, config).unwrap();
        let first = session.next().unwrap().unwrap();
        let StreamItem::Attempt(attempt) = first else {
            panic!("expected an attempt event first");
        };
        assert_eq!(attempt.iteration, 1);
        assert_eq!(attempt.status, SolveStatus::Unsat);

        session.cancel_token().cancel();
        let second = session.next().unwrap().unwrap();
        let StreamItem::Solution(solution) = second else {
            panic!("expected the terminal solution after cancel");
        };
        assert_eq!(solution.status, SolveStatus::Unknown);
        assert!(solution.placements.is_empty());
        assert!(solution.segments.is_empty());
        assert_eq!(solution.attempts.len(), 1);
        // Bounds reflect the last probed rectangle, not the pending one.
        assert_eq!((solution.bounds.width, solution.bounds.height), (6, 6));
        assert!(session.next().is_none());
    }

    #[test]
    fn cancel_before_first_attempt_skips_solving() {
        let graph = two_crushers();
        let mut session = Session::new(&graph, SolverConfig::default()).unwrap();
        session.cancel_token().cancel();
        let item = session.next().unwrap().unwrap();
        let StreamItem::Solution(solution) = item else {
            panic!("expected an immediate terminal solution");
        };
        assert_eq!(solution.status, SolveStatus::Unknown);
        assert!(solution.attempts.is_empty());
    }
}
