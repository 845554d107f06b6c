//! Dispatch tables from script calls to conditions and actions
//!
//! Each table maps a verb plus the ordered kinds of its arguments to a
//! builder. There is no coercion: a call either matches one registered
//! signature exactly or resolves to nothing, with a warning. Callers decide
//! what an unresolved call means for the surrounding rule.

mod action_table;
mod condition_table;

pub use crate::conditions::{and, not, or};

use tracing::warn;

use crate::actions::{ActionType, ScriptAction};
use crate::conditions::Condition;
use crate::core::config::EngineConfig;
use crate::core::types::PlayerId;
use crate::game::GameState;
use crate::script::{signature, Arg, ArgKind, Fact, SignatureDisplay};
use crate::signal::Listener;

/// What a condition builder may consult while constructing a leaf
pub struct ResolveContext<'a> {
    /// Player owning the rule
    pub player: PlayerId,
    /// State the new leaves hydrate from
    pub state: &'a GameState,
    /// Subscriptions are registered on behalf of the owning rule
    pub listener: &'a Listener,
    pub config: &'a EngineConfig,
}

/// Build the condition for a fact call, or `None` if nothing is registered
pub fn resolve_condition(fact: Fact, args: &[Arg], cx: &ResolveContext) -> Option<Box<dyn Condition>> {
    let key = (fact, signature(args));
    let Some(build) = condition_table::CONDITION_TABLE.get(&key) else {
        warn!("no condition registered for {} {}", fact, SignatureDisplay(&key.1));
        return None;
    };
    build(fact, args, cx)
}

/// Build the action for an action call, or `None` if nothing is registered
pub fn resolve_action(action: ActionType, args: &[Arg]) -> Option<ScriptAction> {
    let key = (action, signature(args));
    let Some(build) = action_table::ACTION_TABLE.get(&key) else {
        warn!("no action registered for {} {}", action, SignatureDisplay(&key.1));
        return None;
    };
    build(action, args)
}

/// Whether a condition signature is registered
pub fn has_condition(fact: Fact, kinds: &[ArgKind]) -> bool {
    condition_table::CONDITION_TABLE.contains_key(&(fact, kinds.to_vec()))
}

/// Whether an action signature is registered
pub fn has_action(action: ActionType, kinds: &[ArgKind]) -> bool {
    action_table::ACTION_TABLE.contains_key(&(action, kinds.to_vec()))
}
