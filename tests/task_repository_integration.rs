//! Behavioural integration tests for [`InMemoryTaskRepository`].
//!
//! These exercise the repository contract the engine depends on: the
//! conditional claim guard, the pending-listing order, the unconditional
//! complete, and the expiry sweep.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use chrono::{DateTime, Duration, Utc};
use gorev::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{
        AgentId, EntryId, PersistedTaskData, Task, TaskId, TaskStatus, TaskType, TopicId,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use tokio::runtime::Runtime;

/// Creates a tokio runtime for async operations in tests.
fn test_runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create test runtime")
}

/// Builds a pending task with explicit priority, creation time, and
/// deadline so listing order is fully controlled.
fn pending_task(
    priority: i32,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
) -> Task {
    Task::from_persisted(PersistedTaskData {
        id: TaskId::new(),
        task_type: TaskType::WriteEntry,
        assigned_to: None,
        claimed_at: None,
        topic_id: Some(TopicId::new()),
        entry_id: None,
        prompt_context: None,
        priority,
        virtual_day_phase: None,
        status: TaskStatus::Pending,
        result_entry_id: None,
        result_comment_id: None,
        expires_at,
        created_at,
        completed_at: None,
    })
}

#[test]
fn claim_guard_admits_exactly_one_agent() {
    let rt = test_runtime();
    let repo = InMemoryTaskRepository::new();
    let task = pending_task(0, Utc::now(), None);
    rt.block_on(repo.create(&task)).expect("store task");

    let winner = AgentId::new();
    rt.block_on(repo.claim(task.id(), winner, Utc::now()))
        .expect("first claim should pass the guard");

    let loser = rt.block_on(repo.claim(task.id(), AgentId::new(), Utc::now()));
    assert!(matches!(
        loser,
        Err(TaskRepositoryError::ClaimConflict(id)) if id == task.id()
    ));

    let stored = rt
        .block_on(repo.find_by_id(task.id()))
        .expect("lookup should succeed")
        .expect("task should exist");
    assert!(stored.is_assigned_to(winner));
    assert_eq!(stored.status(), TaskStatus::Claimed);
}

#[test]
fn claim_of_missing_task_is_a_conflict() {
    let rt = test_runtime();
    let repo = InMemoryTaskRepository::new();

    let result = rt.block_on(repo.claim(TaskId::new(), AgentId::new(), Utc::now()));
    assert!(matches!(result, Err(TaskRepositoryError::ClaimConflict(_))));
}

#[test]
fn duplicate_task_ids_are_rejected() {
    let rt = test_runtime();
    let repo = InMemoryTaskRepository::new();
    let task = pending_task(0, Utc::now(), None);

    rt.block_on(repo.create(&task)).expect("store task");
    let duplicate = rt.block_on(repo.create(&task));
    assert!(matches!(
        duplicate,
        Err(TaskRepositoryError::DuplicateTask(id)) if id == task.id()
    ));
}

#[test]
fn pending_listing_orders_by_priority_then_age_and_screens_deadlines() {
    let rt = test_runtime();
    let repo = InMemoryTaskRepository::new();
    let now = Utc::now();

    let old_low = pending_task(1, now - Duration::minutes(30), None);
    let new_low = pending_task(1, now - Duration::minutes(5), None);
    let high = pending_task(9, now - Duration::minutes(1), None);
    let overdue = pending_task(9, now - Duration::minutes(40), Some(now - Duration::minutes(1)));
    for task in [&old_low, &new_low, &high, &overdue] {
        rt.block_on(repo.create(task)).expect("store task");
    }

    let listed = rt
        .block_on(repo.list_pending(now, 10))
        .expect("listing should succeed");
    let ids: Vec<TaskId> = listed.iter().map(Task::id).collect();
    assert_eq!(ids, vec![high.id(), old_low.id(), new_low.id()]);

    let limited = rt
        .block_on(repo.list_pending(now, 2))
        .expect("limited listing should succeed");
    assert_eq!(limited.len(), 2);
}

#[test]
fn complete_stamps_status_results_and_time() {
    let rt = test_runtime();
    let repo = InMemoryTaskRepository::new();
    let task = pending_task(0, Utc::now(), None);
    rt.block_on(repo.create(&task)).expect("store task");

    let agent = AgentId::new();
    rt.block_on(repo.claim(task.id(), agent, Utc::now()))
        .expect("claim should succeed");

    let entry = EntryId::new();
    let completed_at = Utc::now();
    rt.block_on(repo.complete(task.id(), Some(entry), None, completed_at))
        .expect("complete should succeed");

    let stored = rt
        .block_on(repo.find_by_id(task.id()))
        .expect("lookup should succeed")
        .expect("task should exist");
    assert_eq!(stored.status(), TaskStatus::Completed);
    assert_eq!(stored.result_entry_id(), Some(entry));
    assert_eq!(stored.result_comment_id(), None);
    assert_eq!(stored.completed_at(), Some(completed_at));
}

#[test]
fn complete_of_missing_task_reports_not_found() {
    let rt = test_runtime();
    let repo = InMemoryTaskRepository::new();

    let result = rt.block_on(repo.complete(TaskId::new(), None, None, Utc::now()));
    assert!(matches!(result, Err(TaskRepositoryError::NotFound(_))));
}

#[test]
fn expiry_sweep_moves_only_overdue_live_tasks() {
    let rt = test_runtime();
    let repo = InMemoryTaskRepository::new();
    let now = Utc::now();

    let overdue_pending = pending_task(0, now - Duration::hours(2), Some(now - Duration::hours(1)));
    let overdue_claimed = pending_task(0, now - Duration::hours(2), Some(now - Duration::hours(1)));
    let fresh = pending_task(0, now, Some(now + Duration::hours(1)));
    let finished = pending_task(0, now - Duration::hours(2), Some(now - Duration::hours(1)));
    for task in [&overdue_pending, &overdue_claimed, &fresh, &finished] {
        rt.block_on(repo.create(task)).expect("store task");
    }
    rt.block_on(repo.claim(overdue_claimed.id(), AgentId::new(), now))
        .expect("claim should succeed");
    rt.block_on(repo.complete(finished.id(), None, None, now))
        .expect("complete should succeed");

    let swept = rt
        .block_on(repo.expire_overdue(now))
        .expect("sweep should succeed");
    assert_eq!(swept, 2);

    let statuses: Vec<TaskStatus> = [&overdue_pending, &overdue_claimed, &fresh, &finished]
        .iter()
        .map(|task| {
            rt.block_on(repo.find_by_id(task.id()))
                .expect("lookup should succeed")
                .expect("task should exist")
                .status()
        })
        .collect();
    assert_eq!(
        statuses,
        vec![
            TaskStatus::Expired,
            TaskStatus::Expired,
            TaskStatus::Pending,
            TaskStatus::Completed,
        ]
    );
}

#[test]
fn assignment_history_is_newest_first_and_paginated() {
    let rt = test_runtime();
    let repo = InMemoryTaskRepository::new();
    let now = Utc::now();
    let agent = AgentId::new();

    let older = pending_task(0, now - Duration::minutes(10), None);
    let newer = pending_task(0, now - Duration::minutes(1), None);
    let unrelated = pending_task(0, now, None);
    for task in [&older, &newer, &unrelated] {
        rt.block_on(repo.create(task)).expect("store task");
    }
    rt.block_on(repo.claim(older.id(), agent, now))
        .expect("claim older");
    rt.block_on(repo.claim(newer.id(), agent, now))
        .expect("claim newer");
    rt.block_on(repo.claim(unrelated.id(), AgentId::new(), now))
        .expect("claim unrelated");

    let history = rt
        .block_on(repo.list_by_agent(agent, 10, 0))
        .expect("history should succeed");
    let ids: Vec<TaskId> = history.iter().map(Task::id).collect();
    assert_eq!(ids, vec![newer.id(), older.id()]);

    let second_page = rt
        .block_on(repo.list_by_agent(agent, 1, 1))
        .expect("second page should succeed");
    let second_ids: Vec<TaskId> = second_page.iter().map(Task::id).collect();
    assert_eq!(second_ids, vec![older.id()]);
}
