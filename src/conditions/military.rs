//! Object count predicates
//!
//! Counts are kept incrementally from object lifecycle events. Ownership
//! transfers move an object between players' counts without a create or
//! dying event.

use tracing::debug;

use crate::conditions::{compare, ChangeSignal, Condition, Latch, RuleContext};
use crate::core::types::{ObjectClass, ObjectTypeId, PlayerId, RelOp, UnitGroup};
use crate::game::GameState;
use crate::signal::{EventKind, GameEvent, Listener, ObjectInfo, Subscription};

/// Count delta an event applies to objects matching `matches`
///
/// `matches` is asked about an object snapshot as it was before and after the
/// event; group changes are passed as the old and new group.
fn count_delta(event: &GameEvent, matches: impl Fn(&ObjectInfo) -> bool) -> Option<i32> {
    match *event {
        GameEvent::ObjectCreated(info) => Some(matches(&info) as i32),
        GameEvent::ObjectDying(info) => Some(-(matches(&info) as i32)),
        GameEvent::ObjectOwnerChanged { object, old_owner }
        | GameEvent::ObjectCaptured { object, old_owner } => {
            let before = ObjectInfo { owner: old_owner, ..object };
            Some(matches(&object) as i32 - matches(&before) as i32)
        }
        GameEvent::ObjectGroupChanged { object, old_group } => {
            let before = ObjectInfo { group: old_group, ..object };
            Some(matches(&object) as i32 - matches(&before) as i32)
        }
        _ => None,
    }
}

/// Number of live objects of a set of types compared to a target
#[derive(Debug)]
pub struct UnitTypeCount {
    type_ids: Vec<ObjectTypeId>,
    op: RelOp,
    target: i32,
    /// `None` counts objects of every player
    player: Option<PlayerId>,
    count: i32,
    latch: Latch,
    _subscriptions: Vec<Subscription>,
}

impl UnitTypeCount {
    pub fn new(
        type_ids: &[ObjectTypeId],
        op: RelOp,
        target: i32,
        player: Option<PlayerId>,
        state: &GameState,
        listener: &Listener,
    ) -> Self {
        let count = state.objects().count_owned(player, type_ids) as i32;
        Self {
            type_ids: type_ids.to_vec(),
            op,
            target,
            player,
            count,
            latch: Latch::new(compare(count, op, target)),
            _subscriptions: listener.connect_all(&EventKind::OBJECT_LIFECYCLE),
        }
    }

    pub fn count(&self) -> i32 {
        self.count
    }

    fn matches(&self, object: &ObjectInfo) -> bool {
        self.player.map_or(true, |p| object.owner == p) && self.type_ids.contains(&object.type_id)
    }
}

impl Condition for UnitTypeCount {
    fn satisfied(&self, _ctx: &RuleContext) -> bool {
        compare(self.count, self.op, self.target)
    }

    fn notify(&mut self, event: &GameEvent) -> ChangeSignal {
        let Some(delta) = count_delta(event, |object| self.matches(object)) else {
            return ChangeSignal::Quiet;
        };
        if delta == 0 {
            return ChangeSignal::Quiet;
        }

        self.count += delta;
        let signal = self.latch.update(compare(self.count, self.op, self.target));
        if signal.is_changed() {
            debug!("type count {} {} {} now {}", self.count, self.op, self.target, self.latch.get());
        }
        signal
    }
}

/// Military category of a combat count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatCategory {
    /// Land military in any group
    Soldier,
    AttackSoldier,
    DefendSoldier,
    /// Warships in any group
    Warboat,
    AttackWarboat,
    DefendWarboat,
}

impl CombatCategory {
    pub fn matches(&self, class: ObjectClass, group: UnitGroup) -> bool {
        match self {
            CombatCategory::Soldier => class.is_land_military(),
            CombatCategory::AttackSoldier => class.is_land_military() && group == UnitGroup::Attack,
            CombatCategory::DefendSoldier => class.is_land_military() && group == UnitGroup::Defend,
            CombatCategory::Warboat => class.is_warship(),
            CombatCategory::AttackWarboat => class.is_warship() && group == UnitGroup::Attack,
            CombatCategory::DefendWarboat => class.is_warship() && group == UnitGroup::Defend,
        }
    }
}

/// Number of the player's combat units in a category compared to a target
#[derive(Debug)]
pub struct CombatUnitsCount {
    category: CombatCategory,
    op: RelOp,
    target: i32,
    player: PlayerId,
    count: i32,
    latch: Latch,
    _subscriptions: Vec<Subscription>,
}

impl CombatUnitsCount {
    pub fn new(
        category: CombatCategory,
        op: RelOp,
        target: i32,
        player: PlayerId,
        state: &GameState,
        listener: &Listener,
    ) -> Self {
        let count = state
            .objects()
            .iter()
            .filter(|o| o.owner == player && category.matches(o.class, o.group))
            .count() as i32;

        let mut subscriptions = listener.connect_all(&EventKind::OBJECT_LIFECYCLE);
        subscriptions.push(listener.connect(EventKind::ObjectGroupChanged));

        Self {
            category,
            op,
            target,
            player,
            count,
            latch: Latch::new(compare(count, op, target)),
            _subscriptions: subscriptions,
        }
    }

    pub fn count(&self) -> i32 {
        self.count
    }
}

impl Condition for CombatUnitsCount {
    fn satisfied(&self, _ctx: &RuleContext) -> bool {
        compare(self.count, self.op, self.target)
    }

    fn notify(&mut self, event: &GameEvent) -> ChangeSignal {
        let (player, category) = (self.player, self.category);
        let Some(delta) = count_delta(event, |o| o.owner == player && category.matches(o.class, o.group)) else {
            return ChangeSignal::Quiet;
        };
        if delta == 0 {
            return ChangeSignal::Quiet;
        }

        self.count += delta;
        self.latch.update(compare(self.count, self.op, self.target))
    }
}
