//! Backtracking search with MRV/degree variable selection, LCV value
//! ordering and forward checking.
//!
//! The search keeps an explicit stack of frames instead of recursing, so
//! depth is bounded by heap memory rather than the thread's stack. Every
//! frame owns the domains as they were when it was entered; each candidate
//! value starts from that snapshot, so pruning done for one branch is never
//! visible to its siblings.

use crate::csp::{Assignment, BinaryConstraint, ConstraintProblem, Domain, VarId};
use crate::heuristics::{order_domain_values, select_unassigned_variable};
use crate::propagation::forward_check;
use log::trace;

/// Bounds on how much work a search may do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// Maximum number of tentative assignments. `None` searches exhaustively.
    pub max_nodes: Option<u64>,
}

impl SearchLimits {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_nodes(max_nodes: u64) -> Self {
        Self {
            max_nodes: Some(max_nodes),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Tentative assignments made.
    pub nodes: u64,
    /// Tentative assignments rejected by forward checking.
    pub wipeouts: u64,
    /// Frames abandoned after all of their candidates failed.
    pub backtracks: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome<V> {
    /// Every variable is assigned and no constraint is violated.
    Solved(Assignment<V>),
    /// The whole search space was explored without a solution.
    Exhausted,
    /// `SearchLimits::max_nodes` was hit before the search finished.
    LimitReached,
}

impl<V> SearchOutcome<V> {
    pub fn into_solution(self) -> Option<Assignment<V>> {
        match self {
            SearchOutcome::Solved(assignment) => Some(assignment),
            _ => None,
        }
    }
}

struct Frame<V> {
    var: VarId,
    candidates: Vec<V>,
    next: usize,
    snapshot: Vec<Domain<V>>,
}

pub struct Backtracking<'a, V, C> {
    problem: &'a ConstraintProblem<V, C>,
    limits: SearchLimits,
    stats: SearchStats,
}

impl<'a, V: Clone, C: BinaryConstraint<V>> Backtracking<'a, V, C> {
    pub fn new(problem: &'a ConstraintProblem<V, C>) -> Self {
        Self::with_limits(problem, SearchLimits::default())
    }

    pub fn with_limits(problem: &'a ConstraintProblem<V, C>, limits: SearchLimits) -> Self {
        Self {
            problem,
            limits,
            stats: SearchStats::default(),
        }
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Runs the search to the first solution, exhaustion, or the node limit.
    pub fn solve(&mut self) -> SearchOutcome<V> {
        self.stats = SearchStats::default();

        let problem = self.problem;
        let mut assignment = Assignment::new(problem.variable_count());
        let mut domains = problem.domains().to_vec();
        let mut stack: Vec<Frame<V>> = Vec::new();

        loop {
            if assignment.is_complete() {
                trace!("solved after {} nodes", self.stats.nodes);
                return SearchOutcome::Solved(assignment);
            }

            let Some(var) = select_unassigned_variable(problem, &assignment, &domains) else {
                return SearchOutcome::Solved(assignment);
            };
            let candidates = order_domain_values(problem, var, &assignment, &domains);
            trace!(
                "depth {}: var {} with {} candidates",
                stack.len(),
                var,
                candidates.len()
            );
            stack.push(Frame {
                var,
                candidates,
                next: 0,
                snapshot: domains.clone(),
            });

            // Advance to the next candidate that survives forward checking,
            // popping frames whose candidates are used up.
            loop {
                let Some(frame) = stack.last_mut() else {
                    trace!("exhausted after {} nodes", self.stats.nodes);
                    return SearchOutcome::Exhausted;
                };

                if frame.next == frame.candidates.len() {
                    assignment.unassign(frame.var);
                    stack.pop();
                    self.stats.backtracks += 1;
                    continue;
                }

                if self
                    .limits
                    .max_nodes
                    .is_some_and(|max| self.stats.nodes >= max)
                {
                    trace!("node limit reached at depth {}", stack.len());
                    return SearchOutcome::LimitReached;
                }

                let value = frame.candidates[frame.next].clone();
                frame.next += 1;
                self.stats.nodes += 1;

                domains.clone_from(&frame.snapshot);
                assignment.assign(frame.var, value.clone());
                debug_assert!(
                    !domains[frame.var].is_empty(),
                    "assigned variable {} has an empty domain",
                    frame.var
                );

                if forward_check(problem, frame.var, &value, &mut domains, &assignment) {
                    break;
                }
                self.stats.wipeouts += 1;
            }
        }
    }
}

/// Convenience wrapper running an unbounded search.
pub fn backtrack<V: Clone, C: BinaryConstraint<V>>(
    problem: &ConstraintProblem<V, C>,
) -> Option<Assignment<V>> {
    Backtracking::new(problem).solve().into_solution()
}
