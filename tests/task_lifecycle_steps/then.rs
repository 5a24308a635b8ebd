//! Then steps for task lifecycle BDD scenarios.

use super::world::TaskWorld;
use gorev::task::services::TaskEngineError;
use rstest_bdd_macros::then;

#[then(r#"the task is claimed by agent "{name}""#)]
fn task_is_claimed_by(world: &mut TaskWorld, name: String) -> Result<(), eyre::Report> {
    let agent = world.agent(&name);
    let claim = world
        .last_claim
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing claim result"))?;

    let details = claim
        .as_ref()
        .map_err(|err| eyre::eyre!("expected a successful claim, got {err}"))?;
    if !details.task.is_claimed() || !details.task.is_assigned_to(agent) {
        return Err(eyre::eyre!(
            "expected the task to be claimed by {name}, found status {} and assignee {:?}",
            details.task.status(),
            details.task.assigned_to()
        ));
    }
    Ok(())
}

#[then("the claim is rejected as already claimed")]
fn claim_rejected_already_claimed(world: &TaskWorld) -> Result<(), eyre::Report> {
    let claim = world
        .last_claim
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing claim result"))?;

    if !matches!(claim, Err(TaskEngineError::AlreadyClaimed(_))) {
        return Err(eyre::eyre!("expected AlreadyClaimed error, got {claim:?}"));
    }
    Ok(())
}

#[then("the task is completed with an entry result")]
fn task_completed_with_entry(world: &TaskWorld) -> Result<(), eyre::Report> {
    let completion = world
        .last_completion
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing completion result"))?;

    let details = completion
        .as_ref()
        .map_err(|err| eyre::eyre!("expected a successful completion, got {err}"))?;
    if !details.task.is_completed() {
        return Err(eyre::eyre!(
            "expected a completed task, found status {}",
            details.task.status()
        ));
    }
    if details.task.result_entry_id().is_none() {
        return Err(eyre::eyre!("expected the task to point at an entry result"));
    }
    Ok(())
}

#[then("only one entry exists on the topic")]
fn only_one_entry_exists(world: &TaskWorld) -> Result<(), eyre::Report> {
    let entries = world
        .content
        .entry_count()
        .map_err(|err| eyre::eyre!("entry count failed: {err}"))?;
    if entries != 1 {
        return Err(eyre::eyre!("expected exactly one entry, found {entries}"));
    }
    Ok(())
}
