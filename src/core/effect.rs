/// Effect application — folding mutations into fresh snapshots.

use tracing::warn;

use crate::core::expr::{self, EffectExpr, Numeric};
use crate::schema::state::WorldState;

/// Apply one parsed effect, returning a new snapshot. Total: every
/// variant either mutates the copy or leaves it unchanged.
pub fn apply(state: &WorldState, effect: &EffectExpr) -> WorldState {
    let mut next = state.clone();
    match effect {
        EffectExpr::NoOp => {}
        EffectExpr::TagAdd(name) => next.add_tag(name),
        EffectExpr::TagRemove(name) => next.remove_tag(name),
        EffectExpr::NumDelta { ns, key, amount } => match ns {
            Numeric::Stat => next.set_stat(key, state.stat(key) + amount),
            Numeric::Goal => next.set_goal(key, state.goal(key) + amount),
        },
        EffectExpr::NumAssign { ns, key, value } => match ns {
            Numeric::Stat => next.set_stat(key, *value),
            Numeric::Goal => next.set_goal(key, *value),
        },
        EffectExpr::FactAssign { key, value } => next.set_fact(key, value),
        EffectExpr::FactVerify(key) => next.set_fact(key, "verified"),
    }
    next
}

/// Fold raw effect strings left to right into successive snapshots, so
/// later effects observe earlier results. An effect that fails to parse
/// fails open: the fold continues with the state unchanged.
pub fn apply_all(state: &WorldState, effects: &[String]) -> WorldState {
    effects.iter().fold(state.clone(), |acc, raw| {
        match expr::parse_effect(raw) {
            Ok(effect) => apply(&acc, &effect),
            Err(err) => {
                warn!(%err, "effect failed to parse, skipping");
                acc
            }
        }
    })
}
