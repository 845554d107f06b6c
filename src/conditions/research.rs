//! Technology predicates

use tracing::debug;

use crate::conditions::{ChangeSignal, Condition, RuleContext};
use crate::core::types::{PlayerId, ResearchId};
use crate::game::GameState;
use crate::signal::{EventKind, GameEvent, Listener, Subscription};

/// Research item (or age) completed by a player
///
/// Monotonic: once true it stays true, and the subscription is released.
#[derive(Debug)]
pub struct TechAvailable {
    research: ResearchId,
    player: PlayerId,
    done: bool,
    subscription: Option<Subscription>,
}

impl TechAvailable {
    pub fn new(research: ResearchId, player: PlayerId, state: &GameState, listener: &Listener) -> Self {
        let done = state.has_researched(player, research);
        Self {
            research,
            player,
            done,
            subscription: (!done).then(|| listener.connect(EventKind::ResearchCompleted)),
        }
    }

    pub fn is_listening(&self) -> bool {
        self.subscription.is_some()
    }
}

impl Condition for TechAvailable {
    fn satisfied(&self, _ctx: &RuleContext) -> bool {
        self.done
    }

    fn notify(&mut self, event: &GameEvent) -> ChangeSignal {
        match *event {
            GameEvent::ResearchCompleted { player, research }
                if !self.done && player == self.player && research == self.research =>
            {
                debug!("research {:?} available to {}", self.research, self.player);
                self.done = true;
                self.subscription = None;
                ChangeSignal::Changed
            }
            _ => ChangeSignal::Quiet,
        }
    }
}
