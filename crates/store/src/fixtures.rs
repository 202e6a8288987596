use lilo_core::domain::agent::{apply_phase_state, Agent, AgentBelief, AgentId};
use lilo_core::domain::phase::Phase;
use lilo_core::errors::DomainError;
use lilo_core::scenario::Scenario;

use crate::memory::InMemoryAgentStore;

/// Deterministic id of the fixture agent parked in `phase`.
pub fn fixture_agent_id(phase: Phase) -> AgentId {
    AgentId::new(format!("lilo-phase-{}", phase.ordinal()))
}

/// Builds an agent holding the scenario's reference beliefs for `phase`.
pub fn fixture_agent(scenario: &Scenario, phase: Phase) -> Result<Agent, DomainError> {
    let state = scenario.provider.phase_state(phase).ok_or_else(|| {
        DomainError::InvariantViolation(format!("scenario has no reference state for {phase}"))
    })?;

    let mut agent = Agent {
        id: fixture_agent_id(phase),
        beliefs: scenario
            .catalog
            .entries()
            .iter()
            .map(|descriptor| AgentBelief::normal(descriptor.id.as_str(), 0.0))
            .collect(),
        phase: None,
        active_desire: None,
        subject: None,
    };
    apply_phase_state(&mut agent, phase, state, &scenario.catalog)?;
    Ok(agent)
}

/// One fixture agent per phase, in phase order.
pub fn fixture_agents(scenario: &Scenario) -> Result<Vec<Agent>, DomainError> {
    Phase::ALL.into_iter().map(|phase| fixture_agent(scenario, phase)).collect()
}

pub fn seeded_store(scenario: &Scenario) -> Result<InMemoryAgentStore, DomainError> {
    let agents = fixture_agents(scenario)?;
    tracing::debug!(event_name = "store.fixtures.seeded", agents = agents.len(), "fixture agents seeded");
    Ok(InMemoryAgentStore::with_agents(agents))
}
