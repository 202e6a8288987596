use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::comparer::FloatComparer;
use crate::constraints::{ConstraintProvider, ToleranceEvaluator};
use crate::domain::agent::{AgentId, AgentStore};
use crate::domain::belief::BeliefCatalog;
use crate::domain::phase::Phase;
use crate::errors::ApplicationError;

use super::format::{MessageNode, ResponseFormatter, UtteranceTable};
use super::generator::NodeGenerator;
use super::{PathPlanner, SearchLimits};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStatus {
    Found,
    /// The agent already sits in the target phase; the path is empty.
    AlreadyInPhase,
    /// No explored state reaches the target phase.
    Unreachable,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OptimalPath {
    pub agent_id: AgentId,
    pub target_phase: Phase,
    pub status: PathStatus,
    /// Set when the node limit cut the search short.
    pub truncated: bool,
    pub nodes: Vec<MessageNode>,
}

/// Plans the shortest conversation from an agent's live state to the target phase.
pub struct OptimalPathService<'a, G> {
    provider: &'a ConstraintProvider,
    catalog: &'a BeliefCatalog,
    utterances: &'a UtteranceTable,
    generator: G,
    comparer: FloatComparer,
    target_phase: Phase,
    limits: SearchLimits,
}

impl<'a, G> OptimalPathService<'a, G>
where
    G: NodeGenerator,
{
    pub fn new(
        provider: &'a ConstraintProvider,
        catalog: &'a BeliefCatalog,
        utterances: &'a UtteranceTable,
        generator: G,
    ) -> Self {
        Self {
            provider,
            catalog,
            utterances,
            generator,
            comparer: FloatComparer::default(),
            target_phase: Phase::terminal(),
            limits: SearchLimits::default(),
        }
    }

    pub fn with_comparer(mut self, comparer: FloatComparer) -> Self {
        self.comparer = comparer;
        self
    }

    pub fn with_target_phase(mut self, target_phase: Phase) -> Self {
        self.target_phase = target_phase;
        self
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn target_phase(&self) -> Phase {
        self.target_phase
    }

    /// Loads the agent, searches from its current state and formats the route.
    ///
    /// Fails only when the agent is unknown or its state does not fit the
    /// belief catalog; an unreachable target is reported through the status.
    pub async fn generate_optimal_path_request<S>(
        &self,
        store: &S,
        agent_id: &AgentId,
    ) -> Result<OptimalPath, ApplicationError>
    where
        S: AgentStore + ?Sized,
    {
        let correlation_id = Uuid::new_v4().simple().to_string();
        info!(
            event_name = "core.planner.requested",
            correlation_id = %correlation_id,
            agent_id = %agent_id,
            target_phase = %self.target_phase,
            "optimal path requested"
        );

        let agent = store
            .find_by_id(agent_id)
            .await?
            .ok_or_else(|| ApplicationError::AgentNotFound(agent_id.clone()))?;

        let evaluator = ToleranceEvaluator::new(self.provider, self.catalog, self.comparer);
        let planner =
            PathPlanner::new(self.provider, evaluator, &self.generator).with_limits(self.limits);
        let outcome = planner.plan(&agent, self.catalog, self.target_phase)?;

        let (status, nodes) = match &outcome.path {
            None => (PathStatus::Unreachable, Vec::new()),
            Some(path) if path.is_empty() => (PathStatus::AlreadyInPhase, Vec::new()),
            Some(path) => {
                let formatter = ResponseFormatter::new(self.provider, self.catalog, self.utterances);
                let nodes = formatter.optimal_path_to_path_request(&outcome.graph, path, &evaluator)?;
                (PathStatus::Found, nodes)
            }
        };

        info!(
            event_name = "core.planner.completed",
            correlation_id = %correlation_id,
            agent_id = %agent_id,
            status = ?status,
            explored_nodes = outcome.graph.node_count(),
            message_nodes = nodes.len(),
            truncated = outcome.truncated,
            "optimal path planned"
        );

        Ok(OptimalPath {
            agent_id: agent.id,
            target_phase: self.target_phase,
            status,
            truncated: outcome.truncated,
            nodes,
        })
    }
}
