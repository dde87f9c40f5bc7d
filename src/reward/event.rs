//! Edge-triggered match event reward

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::game::{CarId, ControlInputRecord, GameScoreState, PlayerSnapshot};

use super::RewardFunction;

/// Per-event weights. Keys follow the configuration file naming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventWeights {
    pub team_goal: f32,
    pub concede: f32,
    pub touch: f32,
    pub shot: f32,
    pub save: f32,
    pub demo: f32,
    pub demoed: f32,
    pub boost_pickup: f32,
    pub assist: f32,
}

/// Counters and flags seen on the previous tick for one car
#[derive(Debug, Clone, Copy)]
struct EventMemory {
    team_goals: u32,
    opponent_goals: u32,
    touch: bool,
    shots: u32,
    saves: u32,
    demos: u32,
    demoed: bool,
    boost_amount: f32,
    assists: u32,
}

impl EventMemory {
    fn observe(player: &PlayerSnapshot, game: &GameScoreState) -> Self {
        Self {
            team_goals: game.team_goals(player.team_num),
            opponent_goals: game.opponent_goals(player.team_num),
            touch: player.ball_touched,
            shots: player.match_shots,
            saves: player.match_saves,
            demos: player.match_demolishes,
            demoed: player.is_demoed,
            boost_amount: player.boost_amount,
            assists: player.match_assists,
        }
    }
}

/// Rewards goals, touches, shots, saves, demos, boost pickups and assists on
/// the tick they happen. The first tick seen for a car only records a
/// baseline.
#[derive(Debug)]
pub struct EventReward {
    weights: EventWeights,
    previous: HashMap<CarId, EventMemory>,
}

impl EventReward {
    pub fn new(weights: EventWeights) -> Self {
        Self {
            weights,
            previous: HashMap::new(),
        }
    }
}

fn indicator(fired: bool) -> f32 {
    if fired {
        1.0
    } else {
        0.0
    }
}

impl RewardFunction for EventReward {
    fn name(&self) -> &'static str {
        "event"
    }

    fn score(
        &mut self,
        player: &PlayerSnapshot,
        game: &GameScoreState,
        _controls: &ControlInputRecord,
    ) -> f32 {
        let current = EventMemory::observe(player, game);
        let Some(prev) = self.previous.insert(player.car_id, current) else {
            return 0.0;
        };

        let w = &self.weights;
        w.team_goal * indicator(current.team_goals > prev.team_goals)
            + w.concede * indicator(current.opponent_goals > prev.opponent_goals)
            + w.touch * indicator(current.touch && !prev.touch)
            + w.shot * indicator(current.shots > prev.shots)
            + w.save * indicator(current.saves > prev.saves)
            + w.demo * indicator(current.demos > prev.demos)
            + w.demoed * indicator(current.demoed && !prev.demoed)
            + w.boost_pickup * indicator(current.boost_amount > prev.boost_amount)
            + w.assist * indicator(current.assists > prev.assists)
    }

    fn reset(&mut self) {
        self.previous.clear();
    }
}
