use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::belief::{BeliefCatalog, BeliefId, BeliefVector};
use crate::domain::desire::DesireId;
use crate::domain::phase::Phase;
use crate::errors::{ApplicationError, DomainError};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a belief value is trustworthy or was filled in for a reason.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BeliefStatus {
    Normal,
    Exceptional { reason: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentBelief {
    pub id: BeliefId,
    pub value: f32,
    #[serde(flatten)]
    pub status: BeliefStatus,
}

impl AgentBelief {
    pub fn normal(id: impl Into<String>, value: f32) -> Self {
        Self { id: BeliefId::new(id), value, status: BeliefStatus::Normal }
    }
}

/// Live conversation state of one agent as kept by the agent store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub beliefs: Vec<AgentBelief>,
    pub phase: Option<Phase>,
    pub active_desire: Option<DesireId>,
    pub subject: Option<String>,
}

impl Agent {
    /// Collects the agent's beliefs in canonical catalog order.
    pub fn belief_vector(&self, catalog: &BeliefCatalog) -> Result<BeliefVector, DomainError> {
        if self.beliefs.len() != catalog.len() {
            return Err(DomainError::SizeMismatch {
                context: format!("beliefs of agent `{}`", self.id.0),
                expected: catalog.len(),
                actual: self.beliefs.len(),
            });
        }

        let mut values = Vec::with_capacity(catalog.len());
        for descriptor in catalog.entries() {
            let belief = self
                .beliefs
                .iter()
                .find(|belief| belief.id == descriptor.id)
                .ok_or_else(|| DomainError::UnknownBelief(descriptor.id.clone()))?;
            values.push(belief.value);
        }
        Ok(BeliefVector::new(values))
    }
}

/// Overwrites the agent's beliefs with `state` and moves it to `phase`.
///
/// The agent is left untouched when `state` does not line up with its beliefs.
pub fn apply_phase_state(
    agent: &mut Agent,
    phase: Phase,
    state: &BeliefVector,
    catalog: &BeliefCatalog,
) -> Result<(), DomainError> {
    if state.len() != agent.beliefs.len() {
        return Err(DomainError::SizeMismatch {
            context: format!("{phase} reference state for agent `{}`", agent.id.0),
            expected: agent.beliefs.len(),
            actual: state.len(),
        });
    }
    catalog.ensure_len("phase reference state", state)?;

    let mut updated = agent.beliefs.clone();
    for belief in &mut updated {
        let index =
            catalog.index_of(&belief.id).ok_or_else(|| DomainError::UnknownBelief(belief.id.clone()))?;
        belief.value = state.get(index).ok_or_else(|| {
            DomainError::InvariantViolation(format!("no reference value for belief `{}`", belief.id))
        })?;
        belief.status = BeliefStatus::Normal;
    }

    agent.beliefs = updated;
    agent.phase = Some(phase);
    agent.active_desire = None;
    Ok(())
}

#[async_trait]
pub trait AgentStore: Send + Sync {
    async fn find_by_id(&self, id: &AgentId) -> Result<Option<Agent>, ApplicationError>;
    async fn save(&self, agent: Agent) -> Result<(), ApplicationError>;
}
