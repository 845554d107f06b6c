//! Property-based tests for comparisons, combinators and debouncing

use proptest::prelude::*;

use citadel_ai::conditions::{
    and, compare, not, or, ChangeSignal, Condition, Constant, ResourceValue, RuleContext,
};
use citadel_ai::core::config::EngineConfig;
use citadel_ai::core::types::{PlayerId, RelOp, ResourceType, RuleId};
use citadel_ai::game::GameState;
use citadel_ai::signal::SignalHub;

const ME: PlayerId = PlayerId(1);

fn rel_op() -> impl Strategy<Value = RelOp> {
    prop::sample::select(RelOp::ALL.to_vec())
}

fn constant(value: bool) -> Option<Box<dyn Condition>> {
    Some(Box::new(Constant(value)))
}

fn game() -> GameState {
    let mut state = GameState::new(&EngineConfig::default());
    state.add_player(ME);
    state
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// Exactly one of each complementary pair holds.
    #[test]
    fn prop_compare_complements(value in -1000i32..1000, target in -1000i32..1000) {
        prop_assert_ne!(compare(value, RelOp::Equal, target), compare(value, RelOp::NotEqual, target));
        prop_assert_ne!(compare(value, RelOp::LessThan, target), compare(value, RelOp::GreaterOrEqual, target));
        prop_assert_ne!(compare(value, RelOp::GreaterThan, target), compare(value, RelOp::LessOrEqual, target));
    }

    /// Comparisons agree with the integer ordering.
    #[test]
    fn prop_compare_matches_ordering(value in any::<i32>(), target in any::<i32>(), op in rel_op()) {
        let expected = match op {
            RelOp::Equal => value == target,
            RelOp::NotEqual => value != target,
            RelOp::LessThan => value < target,
            RelOp::LessOrEqual => value <= target,
            RelOp::GreaterThan => value > target,
            RelOp::GreaterOrEqual => value >= target,
        };
        prop_assert_eq!(compare(value, op, target), expected);
    }

    /// Combinators follow boolean logic; a missing operand counts as true.
    #[test]
    fn prop_combinator_truth_tables(
        a in any::<bool>(),
        b in any::<bool>(),
        drop_left in any::<bool>(),
        drop_right in any::<bool>(),
    ) {
        let state = game();
        let ctx = RuleContext::new(ME, &state);
        let left = if drop_left { None } else { constant(a) };
        let right = if drop_right { None } else { constant(b) };
        let a = a || drop_left;
        let b = b || drop_right;

        let both = and(left, right);
        prop_assert_eq!(both.satisfied(&ctx), a && b);

        let either = or(constant(a), constant(b));
        prop_assert_eq!(either.satisfied(&ctx), a || b);

        let negated = not(constant(a));
        prop_assert_eq!(negated.satisfied(&ctx), !a);
        prop_assert!(!not(None).satisfied(&ctx));
    }

    /// A debounced leaf emits exactly once per flip of its result.
    #[test]
    fn prop_resource_value_emits_on_flips(
        values in prop::collection::vec(0i32..300, 1..40),
        target in 0i32..300,
        op in rel_op(),
    ) {
        let mut state = game();
        let hub = SignalHub::new();
        let listener = hub.listener(RuleId(1));
        let mut leaf = ResourceValue::new(ResourceType::Wood, op, target, ME, &state, &listener);

        let mut previous = compare(0, op, target);
        let mut flips = 0;
        let mut emissions = 0;
        for value in values {
            let now = compare(value, op, target);
            if now != previous {
                flips += 1;
                previous = now;
            }
            for event in state.set_resource(ME, ResourceType::Wood, value).unwrap() {
                if leaf.notify(&event) == ChangeSignal::Changed {
                    emissions += 1;
                }
            }
        }

        prop_assert_eq!(emissions, flips);
        prop_assert_eq!(leaf.satisfied(&RuleContext::new(ME, &state)), previous);
    }
}
