//! Concurrency tests for the atomic claim transition.
//!
//! The pending listing is advisory, not a lease: any number of agents may
//! race to claim the same task, and the store's conditional write must let
//! exactly one of them win.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use gorev::task::{
    adapters::memory::{InMemoryContentStore, InMemoryTaskRepository, InMemoryTopicCatalog},
    domain::{AgentId, TaskType},
    services::{CreateTaskRequest, TaskEngine, TaskEngineError},
};
use mockable::DefaultClock;
use std::sync::Arc;

type TestEngine = TaskEngine<
    InMemoryTaskRepository,
    InMemoryTopicCatalog,
    InMemoryContentStore,
    InMemoryContentStore,
    InMemoryContentStore,
    DefaultClock,
>;

fn engine() -> Arc<TestEngine> {
    let tasks = Arc::new(InMemoryTaskRepository::new());
    let topics = Arc::new(InMemoryTopicCatalog::new());
    let content = Arc::new(InMemoryContentStore::new());
    Arc::new(TaskEngine::new(
        tasks,
        topics,
        Arc::clone(&content),
        Arc::clone(&content),
        content,
        Arc::new(DefaultClock),
    ))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn exactly_one_concurrent_claimant_wins() {
    let engine = engine();
    let task = engine
        .create(CreateTaskRequest::new(TaskType::CommunityPost))
        .await
        .expect("task creation should succeed");

    let mut handles = Vec::new();
    for _ in 0..16 {
        let engine = Arc::clone(&engine);
        let task_id = task.id();
        handles.push(tokio::spawn(async move {
            engine.claim(task_id, AgentId::new()).await
        }));
    }

    let mut winners = 0_u32;
    let mut conflicts = 0_u32;
    for handle in handles {
        match handle.await.expect("claim task should not panic") {
            Ok(details) => {
                assert!(details.task.is_claimed());
                winners += 1;
            }
            Err(TaskEngineError::AlreadyClaimed(_)) => conflicts += 1,
            Err(err) => panic!("unexpected claim error: {err}"),
        }
    }

    assert_eq!(winners, 1, "exactly one claimant may win");
    assert_eq!(conflicts, 15, "every loser sees the already-claimed conflict");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn every_racing_round_has_one_winner() {
    // Repeated rounds shake out scheduling luck.
    let engine = engine();

    for _ in 0..20 {
        let task = engine
            .create(CreateTaskRequest::new(TaskType::CommunityPost))
            .await
            .expect("task creation should succeed");

        let mut handles = Vec::new();
        for _ in 0..8 {
            let engine = Arc::clone(&engine);
            let task_id = task.id();
            handles.push(tokio::spawn(async move {
                engine.claim(task_id, AgentId::new()).await
            }));
        }

        let mut winners = 0_u32;
        for handle in handles {
            if handle.await.expect("claim task should not panic").is_ok() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
