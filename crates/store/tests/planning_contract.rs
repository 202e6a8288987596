use lilo_core::comparer::FloatComparer;
use lilo_core::domain::agent::{apply_phase_state, AgentId, AgentStore};
use lilo_core::domain::phase::Phase;
use lilo_core::errors::ApplicationError;
use lilo_core::planner::PathStatus;
use lilo_core::scenario::{BeliefThresholds, Scenario};
use lilo_store::{fixture_agent_id, seeded_store};

type ContractResult<T = ()> = Result<T, String>;

fn scenario() -> ContractResult<Scenario> {
    Scenario::lilobot(BeliefThresholds::default()).map_err(|err| err.to_string())
}

#[tokio::test]
async fn phase_four_fixture_reaches_the_final_phase() -> ContractResult {
    let scenario = scenario()?;
    let store = seeded_store(&scenario).map_err(|err| err.to_string())?;
    let service = scenario.path_service(FloatComparer::default());

    let path = service
        .generate_optimal_path_request(&store, &fixture_agent_id(Phase::Phase4))
        .await
        .map_err(|err| err.to_string())?;

    if path.status != PathStatus::Found {
        return Err(format!("expected a found path, got {:?}", path.status));
    }
    let last = path.nodes.last().ok_or("path should not be empty")?;
    if last.phase != Phase::Phase5 || last.intent.is_some() {
        return Err("last node should be the final phase without an intent".to_string());
    }
    Ok(())
}

#[tokio::test]
async fn final_phase_fixture_is_already_there() -> ContractResult {
    let scenario = scenario()?;
    let store = seeded_store(&scenario).map_err(|err| err.to_string())?;
    let service = scenario.path_service(FloatComparer::default());

    let path = service
        .generate_optimal_path_request(&store, &fixture_agent_id(Phase::Phase5))
        .await
        .map_err(|err| err.to_string())?;

    if path.status != PathStatus::AlreadyInPhase || !path.nodes.is_empty() {
        return Err(format!("unexpected outcome: {:?} with {} nodes", path.status, path.nodes.len()));
    }
    Ok(())
}

#[tokio::test]
async fn jumped_agent_is_persisted_in_its_new_phase() -> ContractResult {
    let scenario = scenario()?;
    let store = seeded_store(&scenario).map_err(|err| err.to_string())?;
    let id = fixture_agent_id(Phase::Phase1);

    let mut agent = store
        .find_by_id(&id)
        .await
        .map_err(|err| err.to_string())?
        .ok_or("fixture should exist")?;
    let state = scenario.provider.phase_state(Phase::Phase4).ok_or("phase 4 state")?;
    apply_phase_state(&mut agent, Phase::Phase4, state, &scenario.catalog)
        .map_err(|err| err.to_string())?;
    store.save(agent).await.map_err(|err| err.to_string())?;

    let reloaded = store
        .find_by_id(&id)
        .await
        .map_err(|err| err.to_string())?
        .ok_or("agent should still exist")?;
    if reloaded.phase != Some(Phase::Phase4) {
        return Err(format!("expected phase 4, got {:?}", reloaded.phase));
    }
    Ok(())
}

#[tokio::test]
async fn unknown_agent_is_not_found() -> ContractResult {
    let scenario = scenario()?;
    let store = seeded_store(&scenario).map_err(|err| err.to_string())?;
    let service = scenario.path_service(FloatComparer::default());

    match service.generate_optimal_path_request(&store, &AgentId::new("nobody")).await {
        Err(ApplicationError::AgentNotFound(id)) if id.0 == "nobody" => Ok(()),
        other => Err(format!("expected agent not found, got {other:?}")),
    }
}
