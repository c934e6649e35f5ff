/// Guard evaluation — pure predicates over a world-state snapshot.

use tracing::warn;

use crate::core::expr::{self, GuardExpr};
use crate::schema::state::WorldState;

/// Fact values treated as true by the `fact:key` truthy shortcut.
const TRUTHY_FACTS: [&str; 2] = ["verified", "true"];

/// Evaluate a parsed guard against a snapshot. Total: never fails.
pub fn evaluate(state: &WorldState, guard: &GuardExpr) -> bool {
    match guard {
        GuardExpr::Always => true,
        GuardExpr::TagPresent(name) => state.has_tag(name),
        GuardExpr::TagAbsent(name) => !state.has_tag(name),
        GuardExpr::NumCompare { ns, key, op, value } => {
            let current = match ns {
                expr::Numeric::Stat => state.stat(key),
                expr::Numeric::Goal => state.goal(key),
            };
            op.compare(current, *value)
        }
        GuardExpr::FactCompare { key, negated, value } => {
            let matches = state.fact(key) == value.as_str();
            matches != *negated
        }
        GuardExpr::FactTruthy(key) => TRUTHY_FACTS.contains(&state.fact(key)),
    }
}

/// Conjunction over raw guard strings: a choice is takeable iff every
/// guard passes. An empty list passes. A guard that fails to parse fails
/// closed — the choice stays locked rather than leaking through.
pub fn passes_all(state: &WorldState, guards: &[String]) -> bool {
    guards.iter().all(|raw| match expr::parse_guard(raw) {
        Ok(guard) => evaluate(state, &guard),
        Err(err) => {
            warn!(%err, "guard failed to parse, treating as false");
            false
        }
    })
}
