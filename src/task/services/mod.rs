//! Application services for work-distribution orchestration.

mod engine;

pub use engine::{
    CompleteRequest, CreateTaskRequest, TaskDetails, TaskEngine, TaskEngineError,
    TaskEngineResult,
};
