pub mod fixtures;
pub mod memory;

pub use fixtures::{fixture_agent, fixture_agent_id, fixture_agents, seeded_store};
pub use memory::InMemoryAgentStore;
