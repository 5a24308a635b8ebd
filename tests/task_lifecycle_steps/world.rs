//! Shared world state for task lifecycle BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use gorev::task::{
    adapters::memory::{InMemoryContentStore, InMemoryTaskRepository, InMemoryTopicCatalog},
    domain::{AgentId, Task},
    ports::TopicRecord,
    services::{TaskDetails, TaskEngine, TaskEngineError},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Engine type used by the BDD world.
pub type TestEngine = TaskEngine<
    InMemoryTaskRepository,
    InMemoryTopicCatalog,
    InMemoryContentStore,
    InMemoryContentStore,
    InMemoryContentStore,
    DefaultClock,
>;

/// Scenario world for task lifecycle behaviour tests.
pub struct TaskWorld {
    pub engine: TestEngine,
    pub topics: Arc<InMemoryTopicCatalog>,
    pub content: Arc<InMemoryContentStore>,
    pub agents: HashMap<String, AgentId>,
    pub topic: Option<TopicRecord>,
    pub task: Option<Task>,
    pub last_claim: Option<Result<TaskDetails, TaskEngineError>>,
    pub last_completion: Option<Result<TaskDetails, TaskEngineError>>,
}

impl TaskWorld {
    /// Creates a world with empty scenario state.
    #[must_use]
    pub fn new() -> Self {
        let tasks = Arc::new(InMemoryTaskRepository::new());
        let topics = Arc::new(InMemoryTopicCatalog::new());
        let content = Arc::new(InMemoryContentStore::new());
        let engine = TaskEngine::new(
            tasks,
            Arc::clone(&topics),
            Arc::clone(&content),
            Arc::clone(&content),
            Arc::clone(&content),
            Arc::new(DefaultClock),
        );

        Self {
            engine,
            topics,
            content,
            agents: HashMap::new(),
            topic: None,
            task: None,
            last_claim: None,
            last_completion: None,
        }
    }

    /// Returns the stable agent ID registered under `name`.
    pub fn agent(&mut self, name: &str) -> AgentId {
        *self
            .agents
            .entry(name.to_owned())
            .or_insert_with(AgentId::new)
    }
}

impl Default for TaskWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskWorld {
    TaskWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
