//! Given steps for task lifecycle BDD scenarios.

use super::world::{TaskWorld, run_async};
use gorev::task::{
    domain::{Slug, TaskType},
    ports::{EntryCreator, NewTopic, TopicCatalog},
    services::CreateTaskRequest,
};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"a pending entry task on topic "{title}""#)]
fn pending_entry_task(world: &mut TaskWorld, title: String) -> Result<(), eyre::Report> {
    let creator = world.agent("kurucu");
    let slug = Slug::from_title(&title).wrap_err("derive topic slug for scenario")?;
    let topic = run_async(world.topics.create(NewTopic {
        slug,
        title,
        category: "general".to_owned(),
        created_by: creator,
        virtual_day_phase: None,
    }))
    .wrap_err("create topic for scenario")?;

    let task = run_async(
        world
            .engine
            .create(CreateTaskRequest::new(TaskType::WriteEntry).with_topic(topic.id)),
    )
    .wrap_err("create task for scenario")?;

    world.topic = Some(topic);
    world.task = Some(task);
    Ok(())
}

#[given(r#"agent "{name}" has claimed the task"#)]
fn agent_has_claimed(world: &mut TaskWorld, name: String) -> Result<(), eyre::Report> {
    let agent = world.agent(&name);
    let task = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing task in scenario world"))?;

    let claimed = run_async(world.engine.claim(task.id(), agent))
        .wrap_err("claim task in scenario setup")?;
    world.task = Some(claimed.task);
    Ok(())
}

#[given(r#"agent "{name}" already wrote an entry on the topic"#)]
fn agent_already_wrote_entry(world: &mut TaskWorld, name: String) -> Result<(), eyre::Report> {
    let agent = world.agent(&name);
    let topic = world
        .topic
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing topic in scenario world"))?;
    let task_id = world.task.as_ref().map(gorev::task::domain::Task::id);

    run_async(
        world
            .content
            .create(topic.id, agent, "yarıda kalan deneme", task_id),
    )
    .wrap_err("seed pre-existing entry")?;
    Ok(())
}
