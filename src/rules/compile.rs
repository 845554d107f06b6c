//! Turn script rule definitions into live condition trees and actions

use crate::actions::ScriptAction;
use crate::conditions::Condition;
use crate::resolver::{and, not, or, resolve_action, resolve_condition, ResolveContext};
use crate::script::{signature, ActionCall, ConditionExpr, SignatureDisplay};

/// Why a rule could not be compiled
pub(super) type Rejection = String;

/// Build the condition tree for `expr`
///
/// Any unresolved fact rejects the whole tree; leaves built so far are dropped
/// together with their subscriptions.
pub(super) fn build_condition(
    expr: &ConditionExpr,
    cx: &ResolveContext,
) -> Result<Box<dyn Condition>, Rejection> {
    match expr {
        ConditionExpr::Fact(call) => resolve_condition(call.fact, &call.args, cx).ok_or_else(|| {
            format!(
                "unresolved fact {} {}",
                call.fact,
                SignatureDisplay(&signature(&call.args))
            )
        }),
        ConditionExpr::And(items) => fold(items, cx, and),
        ConditionExpr::Or(items) => fold(items, cx, or),
        ConditionExpr::Not(inner) => Ok(not(Some(build_condition(inner, cx)?))),
    }
}

type Combine = fn(Option<Box<dyn Condition>>, Option<Box<dyn Condition>>) -> Box<dyn Condition>;

/// Fold an n-ary list left into binary combinators
///
/// Fewer than two operands leave the missing side empty, which the
/// combinator replaces with a constant.
fn fold(items: &[ConditionExpr], cx: &ResolveContext, combine: Combine) -> Result<Box<dyn Condition>, Rejection> {
    let mut operands = items.iter().map(|item| build_condition(item, cx));

    let first = operands.next().transpose()?;
    let second = operands.next().transpose()?;
    let mut tree = combine(first, second);

    for operand in operands {
        tree = combine(Some(tree), Some(operand?));
    }
    Ok(tree)
}

/// Resolve every action call, in order
pub(super) fn build_actions(calls: &[ActionCall]) -> Result<Vec<ScriptAction>, Rejection> {
    calls
        .iter()
        .map(|call| {
            resolve_action(call.action, &call.args).ok_or_else(|| {
                format!(
                    "unresolved action {} {}",
                    call.action,
                    SignatureDisplay(&signature(&call.args))
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionType;
    use crate::conditions::test_support::{listener, state, ME};
    use crate::conditions::RuleContext;
    use crate::core::config::EngineConfig;
    use crate::core::types::RelOp;
    use crate::script::{Arg, Fact, Unit};

    fn food_above(amount: i32) -> ConditionExpr {
        ConditionExpr::fact(Fact::FoodAmount, vec![Arg::RelOp(RelOp::GreaterThan), Arg::Int(amount)])
    }

    #[test]
    fn test_single_operand_and_is_padded_with_true() {
        let mut state = state();
        state.add_commodity(ME, crate::core::types::Commodity::Food, 100).unwrap();
        let (_hub, listener) = listener();
        let config = EngineConfig::default();
        let cx = ResolveContext { player: ME, state: &state, listener: &listener, config: &config };

        let tree = build_condition(&ConditionExpr::And(vec![food_above(50)]), &cx).unwrap();
        assert!(tree.satisfied(&RuleContext::new(ME, &state)));

        let tree = build_condition(&ConditionExpr::And(vec![food_above(500)]), &cx).unwrap();
        assert!(!tree.satisfied(&RuleContext::new(ME, &state)));
    }

    #[test]
    fn test_three_way_or_folds_left() {
        let state = state();
        let (_hub, listener) = listener();
        let config = EngineConfig::default();
        let cx = ResolveContext { player: ME, state: &state, listener: &listener, config: &config };

        let expr = ConditionExpr::Or(vec![
            ConditionExpr::fact(Fact::False, vec![]),
            ConditionExpr::fact(Fact::False, vec![]),
            ConditionExpr::fact(Fact::True, vec![]),
        ]);
        let tree = build_condition(&expr, &cx).unwrap();
        assert!(tree.satisfied(&RuleContext::new(ME, &state)));
    }

    #[test]
    fn test_unresolved_fact_releases_built_leaves() {
        let state = state();
        let (hub, listener) = listener();
        let config = EngineConfig::default();
        let cx = ResolveContext { player: ME, state: &state, listener: &listener, config: &config };

        let expr = ConditionExpr::And(vec![food_above(0), ConditionExpr::fact(Fact::Timer, vec![Arg::Int(1)])]);
        let reason = build_condition(&expr, &cx).unwrap_err();
        assert!(reason.contains("Timer"), "{}", reason);
        assert_eq!(hub.subscription_count(), 0);
    }

    #[test]
    fn test_actions_resolve_in_order() {
        let calls = vec![
            ActionCall::new(ActionType::Train, vec![Arg::Unit(Unit::Villager)]),
            ActionCall::new(ActionType::DisableSelf, vec![]),
        ];
        assert_eq!(
            build_actions(&calls).unwrap(),
            vec![ScriptAction::Train(Unit::Villager), ScriptAction::DisableSelf]
        );

        let bad = vec![ActionCall::new(ActionType::Train, vec![Arg::Int(83)])];
        assert!(build_actions(&bad).is_err());
    }
}
