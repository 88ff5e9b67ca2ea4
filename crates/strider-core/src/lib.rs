//! # Strider Core
//!
//! Core primitives for the Strider planner.
//!
//! This crate provides the fundamental building blocks:
//! - [`State`] - Immutable set of true fluents
//! - [`Condition`] - Signed conjunction of fluents
//! - [`Action`] - Ground operator with conditional effects
//! - [`Problem`] - Initial state, goal and actions
//! - [`Plan`] - Ordered action sequence
//! - [`StriderError`] - Error taxonomy

pub mod action;
pub mod condition;
pub mod error;
pub mod plan;
pub mod problem;
pub mod state;
pub mod types;

// Re-exports for convenience
pub use action::{Action, ConditionalEffect, Effect};
pub use condition::Condition;
pub use error::{Result, StriderError};
pub use plan::Plan;
pub use problem::{
    ActionDescription, ConditionDescription, EffectDescription, Problem, ProblemBuilder,
    ProblemDescription,
};
pub use state::State;
pub use types::*;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::action::{Action, ConditionalEffect, Effect};
    pub use crate::condition::Condition;
    pub use crate::error::{Result, StriderError};
    pub use crate::plan::Plan;
    pub use crate::problem::{ActionDescription, ConditionDescription, Problem};
    pub use crate::state::State;
    pub use crate::types::{ActionId, Fluent, Requirement};
}
