//! Behaviour tests for task claiming and completion.

#[path = "task_lifecycle_steps/mod.rs"]
mod task_lifecycle_steps_defs;

use rstest_bdd_macros::scenario;
use task_lifecycle_steps_defs::world::{TaskWorld, world};

#[scenario(
    path = "tests/features/task_lifecycle.feature",
    name = "Claim a pending entry task"
)]
#[tokio::test(flavor = "multi_thread")]
async fn claim_pending_entry_task(world: TaskWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_lifecycle.feature",
    name = "A second claimant is turned away"
)]
#[tokio::test(flavor = "multi_thread")]
async fn second_claimant_turned_away(world: TaskWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_lifecycle.feature",
    name = "Complete a claimed entry task"
)]
#[tokio::test(flavor = "multi_thread")]
async fn complete_claimed_entry_task(world: TaskWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/task_lifecycle.feature",
    name = "Retry a completion whose entry already exists"
)]
#[tokio::test(flavor = "multi_thread")]
async fn retry_completion_with_existing_entry(world: TaskWorld) {
    let _ = world;
}
