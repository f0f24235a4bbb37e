//! Shared slot for the last published world state.
//!
//! Single-writer wholesale replacement: each publish overwrites the whole
//! snapshot. Readers between publishes may see a stale state; that is the
//! accepted consistency model.

use parking_lot::RwLock;

use crate::net::protocol::WorldState;

#[derive(Debug, Default)]
pub struct StateCache {
    slot: RwLock<WorldState>,
}

impl StateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last published state, or the empty-shaped default
    pub fn get(&self) -> WorldState {
        self.slot.read().clone()
    }

    pub fn set(&self, state: WorldState) {
        *self.slot.write() = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::protocol::ShipState;

    #[test]
    fn test_empty_until_first_publish() {
        let cache = StateCache::new();
        assert_eq!(cache.get(), WorldState::default());
    }

    #[test]
    fn test_publish_then_query_round_trip() {
        let cache = StateCache::new();
        let state = WorldState {
            ships: vec![ShipState {
                x: 1.0,
                y: 2.0,
                angle: 3.0,
            }],
            bullets: vec![],
            coins: vec![],
            score: [5, 0],
        };
        cache.set(state.clone());
        assert_eq!(cache.get(), state);
    }

    #[test]
    fn test_overwrite_is_wholesale() {
        let cache = StateCache::new();
        cache.set(WorldState {
            ships: vec![ShipState {
                x: 1.0,
                y: 1.0,
                angle: 0.0,
            }],
            ..WorldState::default()
        });
        cache.set(WorldState {
            score: [9, 9],
            ..WorldState::default()
        });
        let state = cache.get();
        assert!(state.ships.is_empty());
        assert_eq!(state.score, [9, 9]);
    }
}
