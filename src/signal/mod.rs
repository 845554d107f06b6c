//! Game-state notifications and the subscription service that routes them
//!
//! State collaborators describe every mutation as a [`GameEvent`]. Predicate
//! leaves register interest in event kinds through a [`Listener`] handed to
//! them at construction and keep the returned [`Subscription`] guards; dropping
//! a predicate tree releases everything it registered.
//!
//! Delivery is synchronous and single-threaded: the owner of the hub asks for
//! the [`SignalHub::recipients`] of an event kind and forwards the event into
//! each recipient's predicate tree before the mutating call returns.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::core::types::{
    Commodity, GoalId, ObjectClass, ObjectId, ObjectTypeId, PlayerId, ResearchId, ResourceType,
    RuleId, UnitGroup,
};

/// Snapshot of a game object taken when an event about it is raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub id: ObjectId,
    pub type_id: ObjectTypeId,
    pub class: ObjectClass,
    pub owner: PlayerId,
    pub group: UnitGroup,
}

/// A change in live game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ResourceChanged {
        player: PlayerId,
        resource: ResourceType,
        value: i32,
    },
    ObjectCreated(ObjectInfo),
    /// Raised before the object is removed from the registry
    ObjectDying(ObjectInfo),
    /// `object.owner` is the new owner
    ObjectOwnerChanged {
        object: ObjectInfo,
        old_owner: PlayerId,
    },
    /// Ownership change through conversion or capture; `object.owner` is the new owner
    ObjectCaptured {
        object: ObjectInfo,
        old_owner: PlayerId,
    },
    /// `object.group` is the new group
    ObjectGroupChanged {
        object: ObjectInfo,
        old_group: UnitGroup,
    },
    ResearchCompleted {
        player: PlayerId,
        research: ResearchId,
    },
    TradingPriceChanged {
        commodity: Commodity,
        buy: i32,
        sell: i32,
    },
    EscrowChanged {
        player: PlayerId,
        commodity: Commodity,
        amount: i32,
    },
    GoalChanged {
        player: PlayerId,
        goal: GoalId,
        value: i32,
    },
}

/// Discriminant of [`GameEvent`], the unit of subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    ResourceChanged,
    ObjectCreated,
    ObjectDying,
    ObjectOwnerChanged,
    ObjectCaptured,
    ObjectGroupChanged,
    ResearchCompleted,
    TradingPriceChanged,
    EscrowChanged,
    GoalChanged,
}

impl EventKind {
    /// Every kind an object-count predicate has to follow
    pub const OBJECT_LIFECYCLE: [EventKind; 4] = [
        EventKind::ObjectCreated,
        EventKind::ObjectDying,
        EventKind::ObjectOwnerChanged,
        EventKind::ObjectCaptured,
    ];
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::ResourceChanged { .. } => EventKind::ResourceChanged,
            GameEvent::ObjectCreated(_) => EventKind::ObjectCreated,
            GameEvent::ObjectDying(_) => EventKind::ObjectDying,
            GameEvent::ObjectOwnerChanged { .. } => EventKind::ObjectOwnerChanged,
            GameEvent::ObjectCaptured { .. } => EventKind::ObjectCaptured,
            GameEvent::ObjectGroupChanged { .. } => EventKind::ObjectGroupChanged,
            GameEvent::ResearchCompleted { .. } => EventKind::ResearchCompleted,
            GameEvent::TradingPriceChanged { .. } => EventKind::TradingPriceChanged,
            GameEvent::EscrowChanged { .. } => EventKind::EscrowChanged,
            GameEvent::GoalChanged { .. } => EventKind::GoalChanged,
        }
    }
}

/// Listener id -> number of live subscriptions it holds for one kind
type ListenerCounts = BTreeMap<RuleId, usize>;

#[derive(Debug, Default)]
struct Registry {
    topics: AHashMap<EventKind, ListenerCounts>,
}

impl Registry {
    fn connect(&mut self, kind: EventKind, listener: RuleId) {
        *self.topics.entry(kind).or_default().entry(listener).or_insert(0) += 1;
    }

    fn disconnect(&mut self, kind: EventKind, listener: RuleId) {
        let Some(counts) = self.topics.get_mut(&kind) else {
            return;
        };
        if let Some(count) = counts.get_mut(&listener) {
            *count -= 1;
            if *count == 0 {
                counts.remove(&listener);
            }
        }
        if counts.is_empty() {
            self.topics.remove(&kind);
        }
    }
}

/// Subscription service shared by everything that belongs to one rule set
///
/// Cloning yields another handle to the same registry.
#[derive(Debug, Clone, Default)]
pub struct SignalHub {
    registry: Rc<RefCell<Registry>>,
}

impl SignalHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle that connects subscriptions on behalf of `id`
    pub fn listener(&self, id: RuleId) -> Listener {
        Listener {
            hub: self.clone(),
            id,
        }
    }

    /// Listeners with at least one live subscription to `kind`, ascending by id
    pub fn recipients(&self, kind: EventKind) -> Vec<RuleId> {
        self.registry
            .borrow()
            .topics
            .get(&kind)
            .map(|counts| counts.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Total live subscriptions across all kinds and listeners
    pub fn subscription_count(&self) -> usize {
        self.registry
            .borrow()
            .topics
            .values()
            .flat_map(|counts| counts.values())
            .sum()
    }

    /// Whether `id` still holds any subscription
    pub fn is_listening(&self, id: RuleId) -> bool {
        self.registry
            .borrow()
            .topics
            .values()
            .any(|counts| counts.contains_key(&id))
    }
}

/// Connects subscriptions for one listener (the rule owning a predicate tree)
#[derive(Debug, Clone)]
pub struct Listener {
    hub: SignalHub,
    id: RuleId,
}

impl Listener {
    pub fn id(&self) -> RuleId {
        self.id
    }

    /// Subscribe to `kind`; the subscription lives as long as the returned guard
    #[must_use = "dropping the guard disconnects immediately"]
    pub fn connect(&self, kind: EventKind) -> Subscription {
        self.hub.registry.borrow_mut().connect(kind, self.id);
        Subscription {
            registry: Rc::downgrade(&self.hub.registry),
            kind,
            listener: self.id,
        }
    }

    /// Subscribe to several kinds at once
    pub fn connect_all(&self, kinds: &[EventKind]) -> Vec<Subscription> {
        kinds.iter().map(|kind| self.connect(*kind)).collect()
    }
}

/// Scoped subscription; disconnects when dropped
#[derive(Debug)]
pub struct Subscription {
    registry: Weak<RefCell<Registry>>,
    kind: EventKind,
    listener: RuleId,
}

impl Subscription {
    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // The hub may already be gone when a whole rule set is torn down
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().disconnect(self.kind, self.listener);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_and_recipients() {
        let hub = SignalHub::new();
        let first = hub.listener(RuleId(2));
        let second = hub.listener(RuleId(1));

        let _a = first.connect(EventKind::ResourceChanged);
        let _b = second.connect(EventKind::ResourceChanged);
        let _c = second.connect(EventKind::GoalChanged);

        assert_eq!(
            hub.recipients(EventKind::ResourceChanged),
            vec![RuleId(1), RuleId(2)]
        );
        assert_eq!(hub.recipients(EventKind::GoalChanged), vec![RuleId(1)]);
        assert!(hub.recipients(EventKind::EscrowChanged).is_empty());
    }

    #[test]
    fn test_drop_disconnects() {
        let hub = SignalHub::new();
        let listener = hub.listener(RuleId(7));

        let subscription = listener.connect(EventKind::ObjectCreated);
        assert!(hub.is_listening(RuleId(7)));

        drop(subscription);
        assert!(!hub.is_listening(RuleId(7)));
        assert_eq!(hub.subscription_count(), 0);
    }

    #[test]
    fn test_duplicate_subscriptions_are_counted() {
        let hub = SignalHub::new();
        let listener = hub.listener(RuleId(3));

        let first = listener.connect(EventKind::ResourceChanged);
        let second = listener.connect(EventKind::ResourceChanged);
        assert_eq!(hub.recipients(EventKind::ResourceChanged), vec![RuleId(3)]);
        assert_eq!(hub.subscription_count(), 2);

        drop(first);
        assert_eq!(hub.recipients(EventKind::ResourceChanged), vec![RuleId(3)]);

        drop(second);
        assert!(hub.recipients(EventKind::ResourceChanged).is_empty());
    }

    #[test]
    fn test_dropping_while_walking_recipients_disconnects_all() {
        let hub = SignalHub::new();
        let mut held: BTreeMap<RuleId, Vec<Subscription>> = BTreeMap::new();
        for id in 1..=4 {
            let listener = hub.listener(RuleId(id));
            held.insert(RuleId(id), listener.connect_all(&[EventKind::ResourceChanged, EventKind::GoalChanged]));
        }
        assert_eq!(hub.subscription_count(), 8);

        for id in hub.recipients(EventKind::ResourceChanged) {
            held.remove(&id);
        }
        assert_eq!(hub.subscription_count(), 0);
        assert!(hub.recipients(EventKind::GoalChanged).is_empty());
    }

    #[test]
    fn test_subscription_outliving_hub_is_harmless() {
        let subscription = {
            let hub = SignalHub::new();
            hub.listener(RuleId(1)).connect(EventKind::GoalChanged)
        };
        assert_eq!(subscription.kind(), EventKind::GoalChanged);
        drop(subscription);
    }

    #[test]
    fn test_event_kind_matches_variant() {
        let event = GameEvent::GoalChanged {
            player: PlayerId(1),
            goal: GoalId(1),
            value: 3,
        };
        assert_eq!(event.kind(), EventKind::GoalChanged);
    }
}
