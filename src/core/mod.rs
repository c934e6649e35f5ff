pub mod effect;
pub mod engine;
pub mod expr;
pub mod graph;
pub mod guard;
pub mod simulate;
