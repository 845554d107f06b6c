//! Compiled AI rules and the per-player scheduler
//!
//! A [`RuleSet`] owns every rule of one AI player together with the
//! [`SignalHub`] their conditions subscribe through. Events are pushed in
//! with [`RuleSet::dispatch`]; only rules whose condition reported a change
//! are re-evaluated on the next [`RuleSet::evaluate`] pass.

mod compile;

use std::collections::BTreeMap;
use tracing::{debug, info, trace, warn};

use crate::actions::ScriptAction;
use crate::conditions::{Condition, RuleContext};
use crate::core::config::EngineConfig;
use crate::core::error::{AiError, Result};
use crate::core::types::{PlayerId, RuleId};
use crate::game::GameState;
use crate::resolver::ResolveContext;
use crate::script::{RuleDef, ScriptDef};
use crate::signal::{GameEvent, SignalHub};

/// A live rule: condition tree, resolved actions and scheduling state
#[derive(Debug)]
pub struct Rule {
    id: RuleId,
    name: String,
    condition: Box<dyn Condition>,
    actions: Vec<ScriptAction>,
    enabled: bool,
    /// Condition reported a change since the last evaluation
    dirty: bool,
    satisfied: bool,
    fired: u32,
}

impl Rule {
    pub fn id(&self) -> RuleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn actions(&self) -> &[ScriptAction] {
        &self.actions
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Satisfaction cached at the last evaluation
    pub fn is_satisfied(&self) -> bool {
        self.satisfied
    }

    /// Number of passes this rule has fired on
    pub fn fired(&self) -> u32 {
        self.fired
    }
}

/// A rule that never became active
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRule {
    pub name: String,
    pub reason: String,
}

/// A satisfied rule selected by an evaluation pass
#[derive(Debug, Clone, PartialEq)]
pub struct Firing {
    pub rule: RuleId,
    pub name: String,
    pub actions: Vec<ScriptAction>,
}

/// All rules of one AI player
#[derive(Debug)]
pub struct RuleSet {
    player: PlayerId,
    hub: SignalHub,
    rules: BTreeMap<RuleId, Rule>,
    rejected: Vec<RejectedRule>,
    next_id: u32,
}

impl RuleSet {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            hub: SignalHub::new(),
            rules: BTreeMap::new(),
            rejected: Vec::new(),
            next_id: 1,
        }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn hub(&self) -> &SignalHub {
        &self.hub
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(&id)
    }

    /// Rules in id (script) order
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    pub fn rejected(&self) -> &[RejectedRule] {
        &self.rejected
    }

    /// Compile and activate one rule
    ///
    /// Returns `Ok(None)` when the rule was rejected and recorded, or an error
    /// instead when `strict_scripts` is set.
    pub fn compile(&mut self, def: &RuleDef, state: &GameState, config: &EngineConfig) -> Result<Option<RuleId>> {
        let id = RuleId(self.next_id);
        self.next_id += 1;

        let listener = self.hub.listener(id);
        let cx = ResolveContext {
            player: self.player,
            state,
            listener: &listener,
            config,
        };

        let compiled = compile::build_condition(&def.when, &cx)
            .and_then(|condition| Ok((condition, compile::build_actions(&def.actions)?)));

        match compiled {
            Ok((condition, actions)) => {
                debug!("{} compiled {} '{}'", self.player, id, def.name);
                self.rules.insert(
                    id,
                    Rule {
                        id,
                        name: def.name.clone(),
                        condition,
                        actions,
                        enabled: true,
                        dirty: true,
                        satisfied: false,
                        fired: 0,
                    },
                );
                Ok(Some(id))
            }
            Err(reason) => {
                warn!("{} rejected rule '{}': {}", self.player, def.name, reason);
                if config.strict_scripts {
                    return Err(AiError::RuleRejected {
                        rule: def.name.clone(),
                        reason,
                    });
                }
                self.rejected.push(RejectedRule {
                    name: def.name.clone(),
                    reason,
                });
                Ok(None)
            }
        }
    }

    /// Compile every rule of a script, in order
    pub fn load_script(&mut self, script: &ScriptDef, state: &GameState, config: &EngineConfig) -> Result<Vec<RuleId>> {
        let rejected_before = self.rejected.len();
        let mut ids = Vec::with_capacity(script.rules.len());
        for def in &script.rules {
            if let Some(id) = self.compile(def, state, config)? {
                ids.push(id);
            }
        }
        info!(
            "{} loaded script '{}': {} rules, {} rejected",
            self.player,
            script.name,
            ids.len(),
            self.rejected.len() - rejected_before
        );
        Ok(ids)
    }

    /// Deliver an event to every rule subscribed to its kind
    pub fn dispatch(&mut self, event: &GameEvent) {
        // Collected up front: a notified leaf may drop its own subscription
        let recipients = self.hub.recipients(event.kind());
        for id in recipients {
            let Some(rule) = self.rules.get_mut(&id) else {
                continue;
            };
            if rule.condition.notify(event).is_changed() {
                trace!("{} marked dirty by {:?}", id, event.kind());
                rule.dirty = true;
            }
        }
    }

    /// Re-evaluate dirty rules and select every enabled, satisfied rule
    pub fn evaluate(&mut self, state: &GameState) -> Vec<Firing> {
        let ctx = RuleContext::new(self.player, state);
        let mut firings = Vec::new();

        for rule in self.rules.values_mut() {
            if rule.dirty {
                rule.satisfied = rule.condition.satisfied(&ctx);
                rule.dirty = false;
            }
            if rule.enabled && rule.satisfied {
                rule.fired += 1;
                debug!("{} fires {} '{}'", self.player, rule.id, rule.name);
                firings.push(Firing {
                    rule: rule.id,
                    name: rule.name.clone(),
                    actions: rule.actions.clone(),
                });
            }
        }
        firings
    }

    /// Stop a rule from firing; it keeps observing events
    pub fn disable(&mut self, id: RuleId) -> bool {
        match self.rules.get_mut(&id) {
            Some(rule) if rule.enabled => {
                debug!("{} disabled {}", self.player, id);
                rule.enabled = false;
                true
            }
            _ => false,
        }
    }

    /// Drop a rule and release every subscription its condition holds
    pub fn remove(&mut self, id: RuleId) -> Option<String> {
        self.rules.remove(&id).map(|rule| rule.name)
    }
}
