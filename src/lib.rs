//! Scene Engine — runtime for branching interactive scenes.
//!
//! Walks an externally authored graph of narration nodes, choices, and
//! endings. Choices are gated by guard expressions evaluated against a
//! snapshot world state, and taking a choice folds effect expressions into
//! a fresh state snapshot. Scene documents arrive as JSON produced by an
//! upstream generator; the engine never creates or schema-validates them.

pub mod core;
pub mod schema;
