//! Running reward statistics per player and across the session

use std::collections::BTreeMap;

use serde::Serialize;

use crate::game::CarId;

/// Reward history for one car
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PlayerStatistics {
    /// Reward from the most recent step the car was present for
    pub current_reward: f64,
    /// `total_reward` divided by the global step count
    pub average_step_reward: f64,
    pub total_reward: f64,
}

/// Session-wide totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GlobalStatistics {
    /// Sum of all players' rewards on the latest step
    pub step_reward: f64,
    /// Sum of `step_reward` over all steps
    pub total_step_reward: f64,
    pub num_steps: u64,
    /// `total_step_reward / num_steps`
    pub average_step_reward: f64,
    /// Mean lifetime total over the players present on the latest step
    pub cumulative_reward: f64,
}

/// Accumulates step rewards.
///
/// Player averages divide by the global step count, not the number of steps
/// that player was present for, so a player joining late reports a lower
/// average than their per-step rate.
#[derive(Debug, Default)]
pub struct StatsTracker {
    players: BTreeMap<CarId, PlayerStatistics>,
    global: GlobalStatistics,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sampled step; `rewards` holds every player present
    pub fn record_step(&mut self, rewards: &[(CarId, f32)]) {
        let mut step_reward = 0.0;
        for &(car_id, reward) in rewards {
            let reward = f64::from(reward);
            let entry = self.players.entry(car_id).or_default();
            entry.current_reward = reward;
            entry.total_reward += reward;
            step_reward += reward;
        }

        let global = &mut self.global;
        global.step_reward = step_reward;
        global.total_step_reward += step_reward;
        global.num_steps += 1;
        global.average_step_reward = ratio(global.total_step_reward, global.num_steps as f64);

        let lifetime: f64 = self.players.values().map(|p| p.total_reward).sum();
        global.cumulative_reward = ratio(lifetime, rewards.len() as f64);

        let num_steps = global.num_steps as f64;
        for player in self.players.values_mut() {
            player.average_step_reward = ratio(player.total_reward, num_steps);
        }
    }

    pub fn player(&self, car_id: CarId) -> Option<&PlayerStatistics> {
        self.players.get(&car_id)
    }

    pub fn global(&self) -> &GlobalStatistics {
        &self.global
    }

    /// Forget everything; the next step is treated as the first
    pub fn reset(&mut self) {
        self.players.clear();
        self.global = GlobalStatistics::default();
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_reward_averages_to_itself() {
        let mut stats = StatsTracker::new();
        for _ in 0..10 {
            stats.record_step(&[(0, 0.5)]);
        }
        let global = stats.global();
        assert_eq!(global.num_steps, 10);
        assert_eq!(global.average_step_reward, 0.5);
        assert_eq!(global.total_step_reward, 5.0);

        let player = stats.player(0).unwrap();
        assert_eq!(player.current_reward, 0.5);
        assert_eq!(player.average_step_reward, 0.5);
        assert_eq!(player.total_reward, 5.0);
    }

    #[test]
    fn cumulative_is_mean_lifetime_total() {
        let mut stats = StatsTracker::new();
        stats.record_step(&[(0, 1.0), (1, 3.0)]);
        stats.record_step(&[(0, 1.0), (1, 3.0)]);

        let global = stats.global();
        assert_eq!(global.step_reward, 4.0);
        assert_eq!(global.total_step_reward, 8.0);
        assert_eq!(global.average_step_reward, 4.0);
        assert_eq!(global.cumulative_reward, 4.0);
    }

    #[test]
    fn late_joiner_is_averaged_over_global_steps() {
        let mut stats = StatsTracker::new();
        stats.record_step(&[(0, 1.0)]);
        stats.record_step(&[(0, 1.0)]);
        stats.record_step(&[(0, 1.0), (1, 3.0)]);
        stats.record_step(&[(0, 1.0), (1, 3.0)]);

        let late = stats.player(1).unwrap();
        assert_eq!(late.total_reward, 6.0);
        assert_eq!(late.average_step_reward, 1.5);
    }

    #[test]
    fn absent_players_keep_last_values() {
        let mut stats = StatsTracker::new();
        stats.record_step(&[(0, 2.0), (1, 4.0)]);
        stats.record_step(&[(0, 2.0)]);

        let gone = stats.player(1).unwrap();
        assert_eq!(gone.current_reward, 4.0);
        assert_eq!(gone.average_step_reward, 2.0);
        // (4 + 4) lifetime over the single player present
        assert_eq!(stats.global().cumulative_reward, 8.0);
    }

    #[test]
    fn empty_step_reports_zero() {
        let mut stats = StatsTracker::new();
        stats.record_step(&[]);
        let global = stats.global();
        assert_eq!(global.num_steps, 1);
        assert_eq!(global.average_step_reward, 0.0);
        assert_eq!(global.cumulative_reward, 0.0);
        assert!(!global.cumulative_reward.is_nan());
    }

    #[test]
    fn reset_starts_over() {
        let mut stats = StatsTracker::new();
        stats.record_step(&[(0, 7.0)]);
        stats.record_step(&[(0, 7.0)]);
        stats.reset();

        assert_eq!(*stats.global(), GlobalStatistics::default());
        assert!(stats.player(0).is_none());

        stats.record_step(&[(0, 2.0)]);
        assert_eq!(stats.global().num_steps, 1);
        assert_eq!(stats.global().average_step_reward, 2.0);
        assert_eq!(stats.player(0).unwrap().average_step_reward, 2.0);
    }
}
