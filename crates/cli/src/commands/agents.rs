use lilo_core::config::LoadOptions;

use crate::commands::{CommandResult, Session};

const COMMAND: &str = "agents";

pub fn run(options: &LoadOptions) -> CommandResult {
    let session = match Session::open(COMMAND, options) {
        Ok(session) => session,
        Err(result) => return result,
    };

    let agents = session.runtime.block_on(session.store.list());
    let summary: Vec<String> = agents
        .iter()
        .map(|agent| {
            let phase = agent.phase.map(|phase| phase.to_string()).unwrap_or_else(|| "-".to_string());
            format!("  - {}: {phase}", agent.id)
        })
        .collect();

    CommandResult::success_with_data(
        COMMAND,
        format!("{} fixture agents:\n{}", agents.len(), summary.join("\n")),
        &agents,
    )
}
