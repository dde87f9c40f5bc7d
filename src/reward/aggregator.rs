//! Weighted registry of reward components

use std::sync::Arc;

use tracing::trace;

use crate::game::{GameScoreState, InputCache, PlayerSnapshot};

use super::RewardFunction;

struct WeightedReward {
    function: Box<dyn RewardFunction>,
    weight: f32,
}

/// Sums weighted component scores into one step reward per player.
///
/// Every component is scored on every call, including zero-weight ones, so
/// stateful components keep their per-car history current.
pub struct RewardAggregator {
    cache: Arc<InputCache>,
    components: Vec<WeightedReward>,
}

impl RewardAggregator {
    pub fn new(cache: Arc<InputCache>) -> Self {
        Self {
            cache,
            components: Vec::new(),
        }
    }

    /// Register a component; components are scored in insertion order
    pub fn push(&mut self, function: Box<dyn RewardFunction>, weight: f32) {
        self.components.push(WeightedReward { function, weight });
    }

    /// Builder-style [`RewardAggregator::push`]
    #[cfg(test)]
    #[must_use]
    pub fn with(mut self, function: impl RewardFunction + 'static, weight: f32) -> Self {
        self.push(Box::new(function), weight);
        self
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Component names with their weights, in registration order
    pub fn weights(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        self.components
            .iter()
            .map(|c| (c.function.name(), c.weight))
    }

    /// Step reward for one player.
    ///
    /// Panics raised by a component are not caught: a misbehaving component
    /// is a programming error.
    pub fn total(&mut self, player: &PlayerSnapshot, game: &GameScoreState) -> f32 {
        let controls = self.cache.read(player.car_id);

        self.components
            .iter_mut()
            .map(|c| {
                let raw = c.function.score(player, game, &controls);
                trace!(
                    car_id = player.car_id,
                    component = c.function.name(),
                    raw,
                    weight = c.weight,
                    "Component score"
                );
                c.weight * raw
            })
            .sum()
    }

    /// Reset every component's per-car state
    pub fn reset(&mut self) {
        for c in &mut self.components {
            c.function.reset();
        }
    }
}
