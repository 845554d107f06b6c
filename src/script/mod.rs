//! AI script documents
//!
//! A script is a list of rules, each a condition expression over facts plus
//! an ordered list of actions. Scripts are written in TOML:
//!
//! ```toml
//! [[rule]]
//! name = "more villagers"
//! [[rule.when.and]]
//! fact = { name = "can-train", args = [{ unit = "villager" }] }
//! [[rule.when.and]]
//! fact = { name = "housing-headroom", args = [{ rel-op = ">" }, { int = 0 }] }
//! [[rule.actions]]
//! name = "train"
//! args = [{ unit = "villager" }]
//! ```

pub mod args;
pub mod fact;

pub use args::{
    signature, Arg, ArgKind, Building, DifficultyParameter, DiplomaticStance, NamedPlayer,
    PlayerNumber, ResearchItem, SignatureDisplay, StrategicNumber, Unit, WallType,
};
pub use fact::Fact;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::actions::ActionType;
use crate::core::error::Result;

/// One fact invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCall {
    #[serde(rename = "name")]
    pub fact: Fact,
    #[serde(default)]
    pub args: Vec<Arg>,
}

/// Condition tree of a rule
///
/// `and` / `or` lists fold left into binary combinators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionExpr {
    Fact(FactCall),
    And(Vec<ConditionExpr>),
    Or(Vec<ConditionExpr>),
    Not(Box<ConditionExpr>),
}

impl ConditionExpr {
    pub fn fact(fact: Fact, args: Vec<Arg>) -> Self {
        ConditionExpr::Fact(FactCall { fact, args })
    }

    /// Every fact call in the tree, left to right
    pub fn facts(&self) -> Vec<&FactCall> {
        let mut out = Vec::new();
        self.collect_facts(&mut out);
        out
    }

    fn collect_facts<'a>(&'a self, out: &mut Vec<&'a FactCall>) {
        match self {
            ConditionExpr::Fact(call) => out.push(call),
            ConditionExpr::And(items) | ConditionExpr::Or(items) => {
                for item in items {
                    item.collect_facts(out);
                }
            }
            ConditionExpr::Not(inner) => inner.collect_facts(out),
        }
    }
}

/// One action invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCall {
    #[serde(rename = "name")]
    pub action: ActionType,
    #[serde(default)]
    pub args: Vec<Arg>,
}

impl ActionCall {
    pub fn new(action: ActionType, args: Vec<Arg>) -> Self {
        Self { action, args }
    }
}

/// A rule as written in the script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDef {
    pub name: String,
    pub when: ConditionExpr,
    #[serde(default)]
    pub actions: Vec<ActionCall>,
}

/// A whole AI script
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptDef {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "rule")]
    pub rules: Vec<RuleDef>,
}

impl ScriptDef {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a script file; the file stem names an unnamed script
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut script = Self::from_toml_str(&content)?;
        if script.name.is_empty() {
            script.name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RelOp;

    const SCRIPT: &str = r#"
name = "rush"

[[rule]]
name = "more villagers"
[[rule.when.and]]
fact = { name = "can-train", args = [{ unit = "villager" }] }
[[rule.when.and]]
fact = { name = "housing-headroom", args = [{ rel-op = ">" }, { int = 0 }] }
[[rule.actions]]
name = "train"
args = [{ unit = "villager" }]

[[rule]]
name = "always"
when.fact = { name = "true" }
actions = [{ name = "do-nothing" }]

[[rule]]
name = "not feudal"
when.not.fact = { name = "current-age", args = [{ rel-op = ">=" }, { age = "feudal" }] }
"#;

    #[test]
    fn test_parse_script() {
        let script = ScriptDef::from_toml_str(SCRIPT).unwrap();
        assert_eq!(script.name, "rush");
        assert_eq!(script.rules.len(), 3);

        let first = &script.rules[0];
        let ConditionExpr::And(items) = &first.when else {
            panic!("expected and, got {:?}", first.when);
        };
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[1],
            ConditionExpr::fact(Fact::HousingHeadroom, vec![Arg::RelOp(RelOp::GreaterThan), Arg::Int(0)])
        );
        assert_eq!(first.actions[0].action, ActionType::Train);

        assert_eq!(script.rules[1].when, ConditionExpr::fact(Fact::True, vec![]));
        assert!(script.rules[2].actions.is_empty());
        assert!(matches!(script.rules[2].when, ConditionExpr::Not(_)));
    }

    #[test]
    fn test_facts_lists_leaves_in_order() {
        let script = ScriptDef::from_toml_str(SCRIPT).unwrap();
        let facts: Vec<Fact> = script.rules[0].when.facts().iter().map(|c| c.fact).collect();
        assert_eq!(facts, vec![Fact::CanTrain, Fact::HousingHeadroom]);
    }

    #[test]
    fn test_unknown_fact_is_parse_error() {
        let result = ScriptDef::from_toml_str(
            r#"
[[rule]]
name = "bad"
when.fact = { name = "moon-phase" }
"#,
        );
        assert!(result.is_err());
    }
}
