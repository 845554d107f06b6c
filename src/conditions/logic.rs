//! Stateless leaves and boolean combinators

use tracing::warn;

use crate::conditions::{compare, ChangeSignal, Condition, RuleContext};
use crate::core::types::RelOp;
use crate::signal::GameEvent;

/// Fixed result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constant(pub bool);

impl Condition for Constant {
    fn satisfied(&self, _ctx: &RuleContext) -> bool {
        self.0
    }

    fn notify(&mut self, _event: &GameEvent) -> ChangeSignal {
        ChangeSignal::Quiet
    }
}

/// Comparison of two values fixed when the script was loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compare {
    pub value: i32,
    pub op: RelOp,
    pub target: i32,
}

impl Compare {
    pub fn new(value: i32, op: RelOp, target: i32) -> Self {
        Self { value, op, target }
    }
}

impl Condition for Compare {
    fn satisfied(&self, _ctx: &RuleContext) -> bool {
        compare(self.value, self.op, self.target)
    }

    fn notify(&mut self, _event: &GameEvent) -> ChangeSignal {
        ChangeSignal::Quiet
    }
}

/// Substitute an always-true constant for a missing combinator operand
pub fn operand_or_default(operand: Option<Box<dyn Condition>>, combinator: &str) -> Box<dyn Condition> {
    operand.unwrap_or_else(|| {
        warn!("{} condition is missing an operand, substituting true", combinator);
        Box::new(Constant(true))
    })
}

/// Both children hold; both are always queried
#[derive(Debug)]
pub struct And {
    left: Box<dyn Condition>,
    right: Box<dyn Condition>,
}

impl And {
    pub fn new(left: Option<Box<dyn Condition>>, right: Option<Box<dyn Condition>>) -> Self {
        Self {
            left: operand_or_default(left, "and"),
            right: operand_or_default(right, "and"),
        }
    }
}

impl Condition for And {
    fn satisfied(&self, ctx: &RuleContext) -> bool {
        let left = self.left.satisfied(ctx);
        let right = self.right.satisfied(ctx);
        left && right
    }

    fn notify(&mut self, event: &GameEvent) -> ChangeSignal {
        let left = self.left.notify(event);
        let right = self.right.notify(event);
        left.merge(right)
    }
}

/// Either child holds; both are always queried
#[derive(Debug)]
pub struct Or {
    left: Box<dyn Condition>,
    right: Box<dyn Condition>,
}

impl Or {
    pub fn new(left: Option<Box<dyn Condition>>, right: Option<Box<dyn Condition>>) -> Self {
        Self {
            left: operand_or_default(left, "or"),
            right: operand_or_default(right, "or"),
        }
    }
}

impl Condition for Or {
    fn satisfied(&self, ctx: &RuleContext) -> bool {
        let left = self.left.satisfied(ctx);
        let right = self.right.satisfied(ctx);
        left || right
    }

    fn notify(&mut self, event: &GameEvent) -> ChangeSignal {
        let left = self.left.notify(event);
        let right = self.right.notify(event);
        left.merge(right)
    }
}

/// Negation
#[derive(Debug)]
pub struct Not {
    inner: Box<dyn Condition>,
}

impl Not {
    pub fn new(inner: Option<Box<dyn Condition>>) -> Self {
        Self {
            inner: operand_or_default(inner, "not"),
        }
    }
}

impl Condition for Not {
    fn satisfied(&self, ctx: &RuleContext) -> bool {
        !self.inner.satisfied(ctx)
    }

    fn notify(&mut self, event: &GameEvent) -> ChangeSignal {
        self.inner.notify(event)
    }
}

pub fn and(left: Option<Box<dyn Condition>>, right: Option<Box<dyn Condition>>) -> Box<dyn Condition> {
    Box::new(And::new(left, right))
}

pub fn or(left: Option<Box<dyn Condition>>, right: Option<Box<dyn Condition>>) -> Box<dyn Condition> {
    Box::new(Or::new(left, right))
}

pub fn not(inner: Option<Box<dyn Condition>>) -> Box<dyn Condition> {
    Box::new(Not::new(inner))
}
