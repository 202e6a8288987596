use lilo_core::config::LoadOptions;
use lilo_core::domain::agent::{apply_phase_state, AgentId, AgentStore};
use lilo_core::domain::phase::Phase;
use lilo_core::errors::{ApplicationError, DomainError};

use crate::commands::{CommandResult, Session};

const COMMAND: &str = "jump";

pub fn run(options: &LoadOptions, agent_id: &str, phase: u8) -> CommandResult {
    let Some(phase) = Phase::from_ordinal(phase) else {
        return CommandResult::failure(
            COMMAND,
            "bad_request",
            format!("phase must be in range 1..=5, got {phase}"),
            1,
        );
    };

    let session = match Session::open(COMMAND, options) {
        Ok(session) => session,
        Err(result) => return result,
    };

    let agent_id = AgentId::new(agent_id);
    let result = session.runtime.block_on(async {
        let mut agent = session
            .store
            .find_by_id(&agent_id)
            .await?
            .ok_or_else(|| ApplicationError::AgentNotFound(agent_id.clone()))?;

        let state = session.scenario.provider.phase_state(phase).ok_or_else(|| {
            DomainError::InvariantViolation(format!("no reference state for {phase}"))
        })?;
        apply_phase_state(&mut agent, phase, state, &session.scenario.catalog)?;

        session.store.save(agent.clone()).await?;
        Ok::<_, ApplicationError>(agent)
    });

    match result {
        Ok(agent) => CommandResult::success_with_data(
            COMMAND,
            format!("`{}` moved to {phase}", agent.id),
            &agent,
        ),
        Err(error) => CommandResult::application_failure(COMMAND, error),
    }
}
