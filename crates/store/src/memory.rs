use std::collections::HashMap;

use tokio::sync::RwLock;

use lilo_core::domain::agent::{Agent, AgentId, AgentStore};
use lilo_core::errors::ApplicationError;

#[derive(Default)]
pub struct InMemoryAgentStore {
    agents: RwLock<HashMap<String, Agent>>,
}

impl InMemoryAgentStore {
    pub fn with_agents(agents: impl IntoIterator<Item = Agent>) -> Self {
        let agents = agents.into_iter().map(|agent| (agent.id.0.clone(), agent)).collect();
        Self { agents: RwLock::new(agents) }
    }

    /// All stored agents ordered by id.
    pub async fn list(&self) -> Vec<Agent> {
        let agents = self.agents.read().await;
        let mut listed: Vec<Agent> = agents.values().cloned().collect();
        listed.sort_by(|left, right| left.id.0.cmp(&right.id.0));
        listed
    }
}

#[async_trait::async_trait]
impl AgentStore for InMemoryAgentStore {
    async fn find_by_id(&self, id: &AgentId) -> Result<Option<Agent>, ApplicationError> {
        let agents = self.agents.read().await;
        Ok(agents.get(&id.0).cloned())
    }

    async fn save(&self, agent: Agent) -> Result<(), ApplicationError> {
        let mut agents = self.agents.write().await;
        tracing::debug!(
            event_name = "store.agent.saved",
            agent_id = %agent.id,
            phase = ?agent.phase,
            "agent saved"
        );
        agents.insert(agent.id.0.clone(), agent);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use lilo_core::domain::agent::{Agent, AgentBelief, AgentId, AgentStore};
    use lilo_core::domain::phase::Phase;

    use super::InMemoryAgentStore;

    fn agent(id: &str, phase: Phase) -> Agent {
        Agent {
            id: AgentId::new(id),
            beliefs: vec![AgentBelief::normal("B1", 0.5)],
            phase: Some(phase),
            active_desire: None,
            subject: None,
        }
    }

    #[tokio::test]
    async fn in_memory_agent_store_round_trip() {
        let store = InMemoryAgentStore::default();
        let agent = agent("agent-1", Phase::Phase2);

        store.save(agent.clone()).await.expect("save agent");
        let found = store.find_by_id(&agent.id).await.expect("find agent");

        assert_eq!(found, Some(agent));
    }

    #[tokio::test]
    async fn unknown_agent_is_none() {
        let store = InMemoryAgentStore::default();
        let found = store.find_by_id(&AgentId::new("missing")).await.expect("find agent");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn save_replaces_existing_agent() {
        let store = InMemoryAgentStore::with_agents([agent("agent-1", Phase::Phase1)]);
        store.save(agent("agent-1", Phase::Phase3)).await.expect("save agent");

        let listed = store.list().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].phase, Some(Phase::Phase3));
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let store = InMemoryAgentStore::with_agents([
            agent("b", Phase::Phase1),
            agent("a", Phase::Phase1),
            agent("c", Phase::Phase1),
        ]);

        let ids: Vec<String> = store.list().await.into_iter().map(|agent| agent.id.0).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
