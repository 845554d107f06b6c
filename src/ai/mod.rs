//! AI players and the match driver
//!
//! A [`Match`] owns the game state and every scripted player. All state
//! changes go through it so that the events they cause reach every rule set
//! synchronously, before anything else runs.

pub mod executor;

pub use executor::{ActionExecutor, ChatLine, SandboxExecutor};

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::actions::ScriptAction;
use crate::core::config::EngineConfig;
use crate::core::error::{AiError, Result};
use crate::core::types::{PlayerId, RuleId, Tick};
use crate::game::GameState;
use crate::rules::RuleSet;
use crate::script::{DifficultyParameter, ScriptDef, StrategicNumber};
use crate::signal::GameEvent;

/// One scripted player: its rules plus the script-side parameters they set
#[derive(Debug)]
pub struct AiPlayer {
    player: PlayerId,
    rules: RuleSet,
    strategic_numbers: BTreeMap<StrategicNumber, i32>,
    difficulty_parameters: BTreeMap<DifficultyParameter, i32>,
}

impl AiPlayer {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            rules: RuleSet::new(player),
            strategic_numbers: BTreeMap::new(),
            difficulty_parameters: BTreeMap::new(),
        }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut RuleSet {
        &mut self.rules
    }

    pub fn strategic_number(&self, number: StrategicNumber) -> Option<i32> {
        self.strategic_numbers.get(&number).copied()
    }

    pub fn difficulty_parameter(&self, parameter: DifficultyParameter) -> Option<i32> {
        self.difficulty_parameters.get(&parameter).copied()
    }

    /// Carry out a script-internal action
    fn run_internal(&mut self, action: &ScriptAction, state: &mut GameState) -> Result<Vec<GameEvent>> {
        let player = self.player;
        match action {
            ScriptAction::SetGoal { goal, value } => state.set_goal(player, *goal, *value),
            ScriptAction::SetEscrowPercentage { commodity, percent } => {
                state.set_escrow_percentage(player, *commodity, *percent)?;
                Ok(Vec::new())
            }
            ScriptAction::ReleaseEscrow(commodity) => state.release_escrow(player, *commodity),
            ScriptAction::SetStrategicNumber { number, value } => {
                self.strategic_numbers.insert(*number, *value);
                Ok(Vec::new())
            }
            ScriptAction::SetDifficultyParameter { parameter, value } => {
                self.difficulty_parameters.insert(*parameter, *value);
                Ok(Vec::new())
            }
            // DisableSelf is applied once the rule's actions are done
            _ => Ok(Vec::new()),
        }
    }
}

/// A rule that fired during a tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiredRule {
    pub player: PlayerId,
    pub rule: RuleId,
    pub name: String,
}

/// What happened during one tick
#[derive(Debug, Clone, Default, Serialize)]
pub struct TickReport {
    pub tick: Tick,
    pub fired: Vec<FiredRule>,
    pub actions: usize,
    /// Actions that returned an error and were dropped
    pub failed: usize,
    pub events: usize,
}

/// Game state plus the AI players observing it
#[derive(Debug)]
pub struct Match {
    state: GameState,
    players: Vec<AiPlayer>,
    config: EngineConfig,
    tick: Tick,
}

impl Match {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_state(GameState::new(&config), config)
    }

    pub fn with_state(state: GameState, config: EngineConfig) -> Self {
        Self {
            state,
            players: Vec::new(),
            config,
            tick: 0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    pub fn players(&self) -> &[AiPlayer] {
        &self.players
    }

    pub fn ai_player(&self, player: PlayerId) -> Option<&AiPlayer> {
        self.players.iter().find(|p| p.player == player)
    }

    pub fn ai_player_mut(&mut self, player: PlayerId) -> Option<&mut AiPlayer> {
        self.players.iter_mut().find(|p| p.player == player)
    }

    /// Register a player without a script (a human or a target for tribute)
    pub fn add_player(&mut self, player: PlayerId) {
        let events = self.state.add_player(player);
        self.deliver(&events);
    }

    /// Register a scripted player and compile its script against the current state
    pub fn add_ai_player(&mut self, player: PlayerId, script: &ScriptDef) -> Result<&AiPlayer> {
        if self.ai_player(player).is_some() {
            return Err(AiError::InvalidConfig(format!("{} already has a script", player)));
        }
        self.add_player(player);

        let mut ai = AiPlayer::new(player);
        ai.rules.load_script(script, &self.state, &self.config)?;
        self.players.push(ai);
        let index = self.players.len() - 1;
        Ok(&self.players[index])
    }

    /// Apply an outside change to the game and deliver what it caused
    pub fn apply<F>(&mut self, change: F) -> Result<()>
    where
        F: FnOnce(&mut GameState) -> Result<Vec<GameEvent>>,
    {
        let events = change(&mut self.state)?;
        self.deliver(&events);
        Ok(())
    }

    /// Deliver events, in order, to every AI player's rules
    pub fn deliver(&mut self, events: &[GameEvent]) {
        for event in events {
            for ai in &mut self.players {
                ai.rules.dispatch(event);
            }
        }
    }

    /// One scheduling pass over every AI player, in registration order
    pub fn tick(&mut self, executor: &mut dyn ActionExecutor) -> Result<TickReport> {
        self.tick += 1;
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };

        for index in 0..self.players.len() {
            let player = self.players[index].player;
            let firings = self.players[index].rules.evaluate(&self.state);

            for firing in firings {
                let mut disable = false;
                for action in &firing.actions {
                    let result = if action.is_script_internal() {
                        self.players[index].run_internal(action, &mut self.state)
                    } else {
                        executor.execute(player, action, &mut self.state)
                    };
                    disable |= *action == ScriptAction::DisableSelf;
                    report.actions += 1;
                    // A failed action never stops the pass
                    let events = match result {
                        Ok(events) => events,
                        Err(err) => {
                            warn!("{} '{}' failed on {:?}: {}", player, firing.name, action, err);
                            report.failed += 1;
                            continue;
                        }
                    };
                    report.events += events.len();
                    self.deliver(&events);
                }
                if disable {
                    self.players[index].rules.disable(firing.rule);
                }
                report.fired.push(FiredRule {
                    player,
                    rule: firing.rule,
                    name: firing.name,
                });
            }
        }

        debug!("tick {}: {} rules fired", self.tick, report.fired.len());
        Ok(report)
    }

    /// Run `ticks` passes, returning every report
    pub fn run(&mut self, ticks: u32, executor: &mut dyn ActionExecutor) -> Result<Vec<TickReport>> {
        let mut reports = Vec::with_capacity(ticks as usize);
        for _ in 0..ticks {
            reports.push(self.tick(executor)?);
        }
        info!(
            "ran {} ticks, {} firings",
            ticks,
            reports.iter().map(|r| r.fired.len()).sum::<usize>()
        );
        Ok(reports)
    }
}
