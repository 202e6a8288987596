//! Breadth-first path planning over simulated belief states.
//!
//! [`PathPlanner::generate_from_node`] grows a tree of reachable states from
//! the agent's current one, pruning branches that can never reach the final
//! phase. [`PathPlanner::find_optimal_path_to_phase`] then walks that tree
//! breadth-first, so the first node found in the target phase is the one with
//! the fewest moves, ties going to the earliest discovered.

pub mod format;
pub mod generator;
pub mod service;

use std::collections::{BTreeMap, VecDeque};

use tracing::{debug, warn};

use crate::constraints::{ConstraintEvaluator, ConstraintProvider, ConstraintSet};
use crate::domain::agent::Agent;
use crate::domain::belief::BeliefCatalog;
use crate::domain::phase::Phase;
use crate::errors::DomainError;
use crate::graph::{EdgeId, GraphNode, NodeId, SearchGraph};

pub use format::{BeliefEntry, DesireEntry, IntentExample, MessageNode, ResponseFormatter, UtteranceTable};
pub use generator::{NodeGenerator, SimulatedMove};
pub use service::{OptimalPath, OptimalPathService, PathStatus};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// Upper bound on nodes in the search graph; `None` searches exhaustively.
    pub max_nodes: Option<usize>,
}

impl SearchLimits {
    fn admits(&self, node_count: usize) -> bool {
        self.max_nodes.map_or(true, |max| node_count <= max)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Expansion {
    /// Nodes that joined the frontier, in discovery order.
    pub added: Vec<NodeId>,
    pub truncated: bool,
}

#[derive(Clone, Debug)]
pub struct PlanOutcome {
    pub graph: SearchGraph,
    pub path: Option<Vec<EdgeId>>,
    pub truncated: bool,
}

pub struct PathPlanner<'a, E, G> {
    provider: &'a ConstraintProvider,
    evaluator: E,
    generator: G,
    limits: SearchLimits,
    impossible_by_phase: BTreeMap<Phase, ConstraintSet>,
}

impl<'a, E, G> PathPlanner<'a, E, G>
where
    E: ConstraintEvaluator,
    G: NodeGenerator,
{
    pub fn new(provider: &'a ConstraintProvider, evaluator: E, generator: G) -> Self {
        let impossible_by_phase = Phase::ALL
            .into_iter()
            .map(|phase| (phase, evaluator.impossible_to_reach_final_phase(phase)))
            .collect();
        Self { provider, evaluator, generator, limits: SearchLimits::default(), impossible_by_phase }
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Root node for `agent`: its beliefs in catalog order, its phase (or the
    /// phase of its active desire, or the first phase) and its subject.
    pub fn init_graph_from_agent(
        &self,
        agent: &Agent,
        catalog: &BeliefCatalog,
    ) -> Result<SearchGraph, DomainError> {
        let beliefs = agent.belief_vector(catalog)?;
        let phase = match (agent.phase, &agent.active_desire) {
            (Some(phase), _) => phase,
            (None, Some(desire)) => {
                self.provider
                    .desire(desire)
                    .ok_or_else(|| DomainError::UnknownDesire(desire.clone()))?
                    .phase
            }
            (None, None) => Phase::first(),
        };
        Ok(SearchGraph::new(GraphNode::new(beliefs, phase, agent.subject.clone())))
    }

    /// Candidate moves out of `id`, before deduplication.
    pub fn expand(&self, graph: &SearchGraph, id: NodeId) -> Vec<SimulatedMove> {
        let Some(node) = graph.node(id) else {
            return Vec::new();
        };
        let phase = node.phase();
        if phase.is_terminal() {
            return Vec::new();
        }

        let Some(transition) = self.provider.transition(phase) else {
            warn!(
                event_name = "core.planner.transition_missing",
                phase = %phase,
                "no phase transition constraints configured; branch not expanded"
            );
            return Vec::new();
        };
        if transition.current_phase != phase {
            warn!(
                event_name = "core.planner.transition_mismatch",
                phase = %phase,
                configured = %transition.current_phase,
                "phase transition entry describes another phase; branch not expanded"
            );
            return Vec::new();
        }

        let beliefs = node.beliefs();
        let impossible = self.impossible_by_phase.get(&phase);
        if impossible.is_some_and(|set| {
            !self.evaluator.is_constraint_set_empty(set)
                && self.evaluator.is_dnf_satisfied(set, beliefs)
        }) {
            debug!(event_name = "core.planner.pruned", node = id.index(), reason = "final_phase_unreachable");
            return Vec::new();
        }
        if !self.evaluator.is_constraint_set_empty(&transition.dead_ends)
            && self.evaluator.is_dnf_satisfied(&transition.dead_ends, beliefs)
        {
            debug!(event_name = "core.planner.pruned", node = id.index(), reason = "dead_end");
            return Vec::new();
        }

        if let Some(next) = transition.next_phase {
            let next_desire_active = self
                .provider
                .desires_in_phase(next)
                .any(|desire| self.evaluator.check_desire_active(&desire.id, beliefs));
            if next_desire_active {
                return Vec::new();
            }
        }

        let blocked = transition.blocking_desires.iter().any(|block| {
            self.evaluator.check_desire_active(&block.desire, beliefs)
                && !self.evaluator.is_constraint_satisfied(&block.requires, beliefs)
        });
        if blocked {
            debug!(event_name = "core.planner.pruned", node = id.index(), reason = "blocking_desire");
            return Vec::new();
        }

        let mut moves = Vec::new();
        for rule in &transition.goal_rules {
            let when = ConstraintSet::new(vec![rule.when.clone()]);
            if self.evaluator.is_dnf_satisfied(&when, beliefs) {
                moves.extend(self.generator.update_belief(graph, id, &rule.goal, transition));
            }
        }
        moves
    }

    /// Grows the graph breadth-first below `start`.
    pub fn generate_from_node(
        &self,
        graph: &mut SearchGraph,
        start: NodeId,
    ) -> Result<Expansion, DomainError> {
        let mut expansion = Expansion::default();
        let mut frontier = VecDeque::from([start]);

        'search: while let Some(id) = frontier.pop_front() {
            for candidate in self.expand(graph, id) {
                if !self.limits.admits(graph.node_count() + candidate.node_count()) {
                    expansion.truncated = true;
                    break 'search;
                }
                if graph.is_discovered(&candidate.node) {
                    continue;
                }

                let parent = match candidate.intermediate {
                    Some((intent, node)) => graph.attach(id, intent, node)?,
                    None => id,
                };
                if let Some(child) = graph.attach_unique(parent, candidate.intent, candidate.node)? {
                    expansion.added.push(child);
                    frontier.push_back(child);
                }
            }
        }

        if expansion.truncated {
            warn!(
                event_name = "core.planner.truncated",
                nodes = graph.node_count(),
                max_nodes = ?self.limits.max_nodes,
                "search stopped at the node limit"
            );
        }
        Ok(expansion)
    }

    /// Shortest edge path from `root` to a node in `target`.
    ///
    /// `Some(vec![])` when `root` is already in `target`; `None` when no node
    /// below `root` is.
    pub fn find_optimal_path_to_phase(
        &self,
        graph: &SearchGraph,
        root: NodeId,
        target: Phase,
    ) -> Option<Vec<EdgeId>> {
        if graph.node(root)?.phase() == target {
            return Some(Vec::new());
        }

        let mut queue = VecDeque::from([root]);
        while let Some(id) = queue.pop_front() {
            let Some(node) = graph.node(id) else {
                continue;
            };
            for edge_id in node.edges_from() {
                let Some(child) = graph.edge(*edge_id).map(|edge| edge.to()) else {
                    continue;
                };
                if graph.node(child).is_some_and(|node| node.phase() == target) {
                    return graph.path_between(root, child);
                }
                queue.push_back(child);
            }
        }
        None
    }

    /// Builds the tree for `agent` and searches it for `target`.
    pub fn plan(
        &self,
        agent: &Agent,
        catalog: &BeliefCatalog,
        target: Phase,
    ) -> Result<PlanOutcome, DomainError> {
        let mut graph = self.init_graph_from_agent(agent, catalog)?;
        let root = graph.root();
        let expansion = self.generate_from_node(&mut graph, root)?;
        let path = self.find_optimal_path_to_phase(&graph, root, target);

        debug!(
            event_name = "core.planner.searched",
            agent_id = %agent.id,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            path_len = ?path.as_ref().map(Vec::len),
            "search finished"
        );
        Ok(PlanOutcome { graph, path, truncated: expansion.truncated })
    }
}
