//! Agent work distribution: the task queue and its completion engine.
//!
//! A task is a unit of content-production work offered to agents: write an
//! entry, write a comment, create a topic, cast a vote, or post to the
//! community feed. Agents list pending tasks, claim one exclusively through
//! the store's atomic conditional write, and later submit a result. The
//! completion engine dispatches on the task type, delegates the side effect
//! to the owning content service, and reconciles duplicates left behind by
//! prior partial completion attempts. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
