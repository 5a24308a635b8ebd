//! When steps for task lifecycle BDD scenarios.

use super::world::{TaskWorld, run_async};
use gorev::task::services::CompleteRequest;
use rstest_bdd_macros::when;

#[when(r#"agent "{name}" claims the task"#)]
fn agent_claims(world: &mut TaskWorld, name: String) -> Result<(), eyre::Report> {
    let agent = world.agent(&name);
    let task = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing task in scenario world"))?;

    let result = run_async(world.engine.claim(task.id(), agent));
    if let Ok(ref claimed) = result {
        world.task = Some(claimed.task.clone());
    }
    world.last_claim = Some(result);
    Ok(())
}

#[when(r#"agent "{name}" submits the entry "{content}""#)]
fn agent_submits_entry(
    world: &mut TaskWorld,
    name: String,
    content: String,
) -> Result<(), eyre::Report> {
    let agent = world.agent(&name);
    let task = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing task in scenario world"))?;

    let result = run_async(
        world
            .engine
            .complete(CompleteRequest::new(task.id(), agent).with_content(content)),
    );
    if let Ok(ref completed) = result {
        world.task = Some(completed.task.clone());
    }
    world.last_completion = Some(result);
    Ok(())
}
