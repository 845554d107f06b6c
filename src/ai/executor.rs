//! Carrying out game-facing actions

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use crate::actions::{ChatTarget, ScriptAction};
use crate::core::error::Result;
use crate::core::types::{ObjectTypeId, PlayerId, ResearchId, ResourceType, UnitGroup};
use crate::game::catalog::Cost;
use crate::game::GameState;
use crate::script::{DiplomaticStance, PlayerNumber};
use crate::signal::GameEvent;

/// Runs the actions an AI player cannot handle itself
///
/// Implementations may change the game state and return every event the
/// change caused; the match delivers them before the next action runs.
pub trait ActionExecutor {
    fn execute(&mut self, player: PlayerId, action: &ScriptAction, state: &mut GameState) -> Result<Vec<GameEvent>>;
}

/// Chat line recorded by the sandbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub from: PlayerId,
    pub target: ChatTarget,
    pub text: String,
}

/// Deterministic executor: production is instant and paid from the ledger
#[derive(Debug, Default)]
pub struct SandboxExecutor {
    chat: Vec<ChatLine>,
    stances: BTreeMap<(PlayerId, PlayerId), DiplomaticStance>,
    resigned: BTreeSet<PlayerId>,
    /// Actions skipped because they were unaffordable or impossible
    skipped: usize,
}

impl SandboxExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chat(&self) -> &[ChatLine] {
        &self.chat
    }

    pub fn stance(&self, from: PlayerId, toward: PlayerId) -> Option<DiplomaticStance> {
        self.stances.get(&(from, toward)).copied()
    }

    pub fn has_resigned(&self, player: PlayerId) -> bool {
        self.resigned.contains(&player)
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn skip(&mut self, player: PlayerId, action: &ScriptAction, why: &str) -> Vec<GameEvent> {
        debug!("{} skipped {:?}: {}", player, action, why);
        self.skipped += 1;
        Vec::new()
    }

    /// Pay for and spawn one object of `type_id`
    fn produce(
        &mut self,
        player: PlayerId,
        action: &ScriptAction,
        type_id: ObjectTypeId,
        state: &mut GameState,
    ) -> Result<Vec<GameEvent>> {
        let cost = state.catalog().object(type_id).map(|spec| spec.cost);
        let Some(cost) = cost else {
            return Ok(self.skip(player, action, "unknown object type"));
        };
        let Some(mut events) = state.spend(player, &cost, false)? else {
            return Ok(self.skip(player, action, "cannot afford"));
        };
        let (info, spawned) = state.spawn_object(player, type_id);
        debug!("{} produced {:?} as {:?}", player, type_id, info.id);
        events.extend(spawned);
        Ok(events)
    }

    fn research(
        &mut self,
        player: PlayerId,
        action: &ScriptAction,
        research: ResearchId,
        state: &mut GameState,
    ) -> Result<Vec<GameEvent>> {
        if state.has_researched(player, research) {
            return Ok(self.skip(player, action, "already researched"));
        }
        let cost = state
            .catalog()
            .research(research)
            .map_or(Cost::default(), |spec| spec.cost);
        let Some(mut events) = state.spend(player, &cost, false)? else {
            return Ok(self.skip(player, action, "cannot afford"));
        };
        events.extend(state.complete_research(player, research)?);
        Ok(events)
    }

    /// A registered player named by `number`; anything else skips the action
    fn target(
        &mut self,
        player: PlayerId,
        action: &ScriptAction,
        number: &PlayerNumber,
        state: &GameState,
    ) -> Option<PlayerId> {
        let Some(target) = number.resolve(player) else {
            self.skip(player, action, "needs a single player");
            return None;
        };
        if state.ledger(target).is_none() {
            self.skip(player, action, "unknown player");
            return None;
        }
        Some(target)
    }
}

impl ActionExecutor for SandboxExecutor {
    fn execute(&mut self, player: PlayerId, action: &ScriptAction, state: &mut GameState) -> Result<Vec<GameEvent>> {
        if self.has_resigned(player) {
            return Ok(Vec::new());
        }

        match action {
            ScriptAction::Train(unit) => {
                let population = state.resource(player, ResourceType::Population);
                let housing = state.resource(player, ResourceType::HousingCapacity);
                let cap = state.resource(player, ResourceType::PopulationCap);
                if population >= housing.min(cap) {
                    return Ok(self.skip(player, action, "no housing"));
                }
                let Some(&type_id) = unit.type_ids().first() else {
                    return Ok(self.skip(player, action, "empty unit line"));
                };
                self.produce(player, action, type_id, state)
            }
            ScriptAction::Build(building) => {
                let Some(&type_id) = building.type_ids().first() else {
                    return Ok(self.skip(player, action, "unknown building"));
                };
                self.produce(player, action, type_id, state)
            }
            // One segment per call, whatever the perimeter
            ScriptAction::BuildWall { wall, .. } => {
                let Some(&type_id) = wall.type_ids().first() else {
                    return Ok(self.skip(player, action, "unknown wall"));
                };
                self.produce(player, action, type_id, state)
            }
            ScriptAction::Research(research) => self.research(player, action, *research, state),
            ScriptAction::Trade { commodity, direction } => match state.trade(player, *commodity, *direction)? {
                Some(events) => Ok(events),
                None => Ok(self.skip(player, action, "trade refused")),
            },
            ScriptAction::Tribute { to, commodity, amount } => {
                let Some(to) = self.target(player, action, to, state) else {
                    return Ok(Vec::new());
                };
                match state.tribute(player, to, *commodity, *amount)? {
                    Some(events) => Ok(events),
                    None => Ok(self.skip(player, action, "cannot afford")),
                }
            }
            ScriptAction::AttackNow => {
                let ungrouped: Vec<_> = state
                    .objects()
                    .iter()
                    .filter(|o| o.owner == player && o.class.is_land_military() && o.group == UnitGroup::Ungrouped)
                    .map(|o| o.id)
                    .collect();
                info!("{} attacks with {} units", player, ungrouped.len());
                Ok(ungrouped
                    .into_iter()
                    .flat_map(|id| state.set_group(id, UnitGroup::Attack))
                    .collect())
            }
            ScriptAction::SetStance { player: toward, stance } => {
                if let Some(toward) = self.target(player, action, toward, state) {
                    self.stances.insert((player, toward), *stance);
                }
                Ok(Vec::new())
            }
            ScriptAction::Chat { target, text } => {
                info!("[{}] {}", player, text);
                self.chat.push(ChatLine {
                    from: player,
                    target: *target,
                    text: text.clone(),
                });
                Ok(Vec::new())
            }
            ScriptAction::Resign => {
                info!("{} resigns", player);
                self.resigned.insert(player);
                let owned: Vec<_> = state.objects().iter().filter(|o| o.owner == player).map(|o| o.id).collect();
                Ok(owned.into_iter().flat_map(|id| state.kill_object(id)).collect())
            }
            ScriptAction::DoNothing
            | ScriptAction::DisableSelf
            | ScriptAction::ReleaseEscrow(_)
            | ScriptAction::SetGoal { .. }
            | ScriptAction::SetEscrowPercentage { .. }
            | ScriptAction::SetStrategicNumber { .. }
            | ScriptAction::SetDifficultyParameter { .. } => Ok(self.skip(player, action, "handled by the AI player")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EngineConfig;
    use crate::core::types::Commodity;
    use crate::script::{Building, NamedPlayer, Unit};

    const ME: PlayerId = PlayerId(1);
    const ALLY: PlayerId = PlayerId(2);

    fn state() -> GameState {
        let mut state = GameState::new(&EngineConfig::default());
        state.add_player(ME);
        state.add_player(ALLY);
        state
    }

    #[test]
    fn test_train_needs_housing_and_resources() {
        let mut state = state();
        let mut executor = SandboxExecutor::new();

        let events = executor.execute(ME, &ScriptAction::Train(Unit::Villager), &mut state).unwrap();
        assert!(events.is_empty());
        assert_eq!(executor.skipped(), 1);

        state.add_commodity(ME, Commodity::Wood, 100).unwrap();
        state.add_commodity(ME, Commodity::Food, 100).unwrap();
        executor.execute(ME, &ScriptAction::Build(Building::House), &mut state).unwrap();
        assert!(state.resource(ME, ResourceType::HousingCapacity) > 0);

        let events = executor.execute(ME, &ScriptAction::Train(Unit::Villager), &mut state).unwrap();
        assert!(events.iter().any(|e| matches!(e, GameEvent::ObjectCreated(_))));
        assert_eq!(state.resource(ME, ResourceType::Population), 1);
        assert_eq!(state.resource(ME, ResourceType::Food), 50);
    }

    #[test]
    fn test_attack_now_groups_idle_soldiers() {
        let mut state = state();
        let mut executor = SandboxExecutor::new();
        state.spawn_object(ME, ObjectTypeId(38));
        state.spawn_object(ME, ObjectTypeId(83));

        let events = executor.execute(ME, &ScriptAction::AttackNow, &mut state).unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            GameEvent::ObjectGroupChanged { object, .. } if object.group == UnitGroup::Attack
        ));
    }

    #[test]
    fn test_tribute_and_stance_resolve_players() {
        let mut state = state();
        let mut executor = SandboxExecutor::new();
        state.add_commodity(ME, Commodity::Gold, 200).unwrap();

        let tribute = ScriptAction::Tribute { to: PlayerNumber::Number(2), commodity: Commodity::Gold, amount: 150 };
        executor.execute(ME, &tribute, &mut state).unwrap();
        assert_eq!(state.resource(ALLY, ResourceType::Gold), 150);

        let anyone = ScriptAction::SetStance {
            player: PlayerNumber::Named(NamedPlayer::AnyPlayer),
            stance: DiplomaticStance::Ally,
        };
        executor.execute(ME, &anyone, &mut state).unwrap();
        assert_eq!(executor.stance(ME, ALLY), None);

        let ally = ScriptAction::SetStance { player: PlayerNumber::Number(2), stance: DiplomaticStance::Ally };
        executor.execute(ME, &ally, &mut state).unwrap();
        assert_eq!(executor.stance(ME, ALLY), Some(DiplomaticStance::Ally));
    }

    #[test]
    fn test_unknown_target_player_is_skipped() {
        let mut state = state();
        let mut executor = SandboxExecutor::new();
        state.add_commodity(ME, Commodity::Gold, 200).unwrap();

        let tribute = ScriptAction::Tribute { to: PlayerNumber::Number(7), commodity: Commodity::Gold, amount: 100 };
        let events = executor.execute(ME, &tribute, &mut state).unwrap();
        assert!(events.is_empty());
        assert_eq!(state.resource(ME, ResourceType::Gold), 200);

        let stance = ScriptAction::SetStance { player: PlayerNumber::Number(7), stance: DiplomaticStance::Enemy };
        executor.execute(ME, &stance, &mut state).unwrap();
        assert_eq!(executor.stance(ME, PlayerId(7)), None);
        assert_eq!(executor.skipped(), 2);
    }

    #[test]
    fn test_resign_removes_objects_and_silences_player() {
        let mut state = state();
        let mut executor = SandboxExecutor::new();
        state.spawn_object(ME, ObjectTypeId(83));

        let events = executor.execute(ME, &ScriptAction::Resign, &mut state).unwrap();
        assert!(matches!(events[0], GameEvent::ObjectDying(_)));
        assert!(state.objects().is_empty());

        let chat = ScriptAction::Chat { target: ChatTarget::All, text: "still here".into() };
        executor.execute(ME, &chat, &mut state).unwrap();
        assert!(executor.chat().is_empty());
    }
}
