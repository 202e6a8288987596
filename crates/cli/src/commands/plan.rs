use lilo_core::config::LoadOptions;
use lilo_core::domain::agent::AgentId;
use lilo_core::planner::PathStatus;

use crate::commands::{CommandResult, Session};

const COMMAND: &str = "plan";

pub fn run(options: &LoadOptions, agent_id: &str) -> CommandResult {
    let session = match Session::open(COMMAND, options) {
        Ok(session) => session,
        Err(result) => return result,
    };

    let target_phase = match session.config.target_phase() {
        Ok(phase) => phase,
        Err(error) => {
            return CommandResult::failure(COMMAND, "config_validation", error.to_string(), 2)
        }
    };

    let service = session
        .scenario
        .path_service(session.config.comparer())
        .with_target_phase(target_phase)
        .with_limits(session.config.search_limits());

    let agent_id = AgentId::new(agent_id);
    let result =
        session.runtime.block_on(service.generate_optimal_path_request(&session.store, &agent_id));

    match result {
        Ok(path) => {
            let message = match path.status {
                PathStatus::Found => format!(
                    "planned {} conversation steps for `{}` to reach {}",
                    path.nodes.len().saturating_sub(1),
                    path.agent_id,
                    path.target_phase
                ),
                PathStatus::AlreadyInPhase => {
                    format!("`{}` is already in {}", path.agent_id, path.target_phase)
                }
                PathStatus::Unreachable if path.truncated => format!(
                    "no path to {} found for `{}` before the node limit was reached",
                    path.target_phase, path.agent_id
                ),
                PathStatus::Unreachable => {
                    format!("{} is unreachable for `{}`", path.target_phase, path.agent_id)
                }
            };
            CommandResult::success_with_data(COMMAND, message, &path)
        }
        Err(error) => CommandResult::application_failure(COMMAND, error),
    }
}
