//! Tick-sampling loop: decodes every Kth active packet, scores each player
//! and records the step

use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::game::{CarId, Snapshot, SnapshotDecoder};
use crate::reward::{RewardAggregator, StatsTracker};
use crate::transport::protocol::TickPacket;
use crate::util::time::Timer;

use super::report::{build_report, PresentationSink, PrintSettings, ReportLine};

/// Events delivered to the sampling loop
#[derive(Debug, Clone)]
pub enum SessionInput {
    /// Next raw world packet
    Tick(Box<TickPacket>),
    /// Clear statistics and component state
    Reset,
}

/// Counts active ticks and fires on every `tick_skip`-th one
#[derive(Debug)]
pub struct TickSkip {
    ticks_since_sample: u32,
    tick_skip: u32,
}

impl TickSkip {
    pub fn new(tick_skip: u32) -> Self {
        Self {
            ticks_since_sample: 0,
            tick_skip: tick_skip.max(1),
        }
    }

    /// Check if this tick should be sampled
    pub fn should_sample(&mut self) -> bool {
        self.ticks_since_sample += 1;
        if self.ticks_since_sample >= self.tick_skip {
            self.ticks_since_sample = 0;
            true
        } else {
            false
        }
    }
}

/// Result of one sampled step
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Step reward per player, in snapshot order
    pub rewards: Vec<(CarId, f32)>,
    pub lines: Vec<ReportLine>,
}

/// Owns the reward components and statistics for one session.
///
/// Everything here is touched only by the sampling task; the input
/// listener reaches it through the aggregator's shared input cache.
pub struct RewardSession<D, S> {
    id: Uuid,
    decoder: D,
    aggregator: RewardAggregator,
    stats: StatsTracker,
    tick_skip: TickSkip,
    settings: PrintSettings,
    sink: S,
    input_rx: mpsc::Receiver<SessionInput>,
    last_score_line: Option<[u32; 2]>,
}

impl<D: SnapshotDecoder, S: PresentationSink> RewardSession<D, S> {
    /// Create a session and the sender used to feed it
    pub fn new(
        id: Uuid,
        decoder: D,
        aggregator: RewardAggregator,
        tick_skip: u32,
        settings: PrintSettings,
        sink: S,
    ) -> (Self, mpsc::Sender<SessionInput>) {
        let (input_tx, input_rx) = mpsc::channel(256);
        let session = Self {
            id,
            decoder,
            aggregator,
            stats: StatsTracker::new(),
            tick_skip: TickSkip::new(tick_skip),
            settings,
            sink,
            input_rx,
            last_score_line: None,
        };
        (session, input_tx)
    }

    /// Run until every sender is dropped
    pub async fn run(mut self) -> StatsTracker {
        info!(
            session_id = %self.id,
            components = self.aggregator.len(),
            tick_skip = self.tick_skip.tick_skip,
            "Reward session started"
        );
        for (name, weight) in self.aggregator.weights() {
            debug!(session_id = %self.id, component = name, weight, "Registered reward component");
        }

        while let Some(input) = self.input_rx.recv().await {
            self.handle_input(input);
        }

        let global = self.stats.global();
        info!(
            session_id = %self.id,
            steps = global.num_steps,
            average_step_reward = global.average_step_reward,
            "Reward session ended"
        );
        self.stats
    }

    /// Apply one input; returns the step outcome when a step was sampled
    pub fn handle_input(&mut self, input: SessionInput) -> Option<StepOutcome> {
        match input {
            SessionInput::Tick(packet) => self.handle_packet(&packet),
            SessionInput::Reset => {
                self.reset();
                None
            }
        }
    }

    fn handle_packet(&mut self, packet: &TickPacket) -> Option<StepOutcome> {
        if !packet.is_round_active {
            // Keep touch tracking current through kickoffs and replays
            self.decoder.decode(packet);
            return None;
        }

        if !self.tick_skip.should_sample() {
            return None;
        }

        let snapshot = self.decoder.decode(packet);
        self.detect_new_match(snapshot.game.score_line);

        let timer = Timer::new();
        let outcome = self.score_snapshot(&snapshot);
        debug!(
            session_id = %self.id,
            players = snapshot.players.len(),
            elapsed_us = timer.elapsed_micros(),
            "Step scored"
        );

        self.sink.present(&outcome.lines);
        Some(outcome)
    }

    /// Score lines only go up within a match; a drop means a new one started
    fn detect_new_match(&mut self, score_line: [u32; 2]) {
        if let Some(last) = self.last_score_line {
            if score_line[0] < last[0] || score_line[1] < last[1] {
                info!(session_id = %self.id, ?last, ?score_line, "New match detected, resetting reward components");
                self.aggregator.reset();
            }
        }
        self.last_score_line = Some(score_line);
    }

    fn score_snapshot(&mut self, snapshot: &Snapshot) -> StepOutcome {
        let rewards: Vec<(CarId, f32)> = snapshot
            .players
            .iter()
            .map(|player| (player.car_id, self.aggregator.total(player, &snapshot.game)))
            .collect();

        self.stats.record_step(&rewards);

        let present: Vec<CarId> = rewards.iter().map(|(id, _)| *id).collect();
        let lines = build_report(&self.settings, &present, &self.stats);
        StepOutcome { rewards, lines }
    }

    /// Clear statistics and every component's per-car state
    pub fn reset(&mut self) {
        info!(session_id = %self.id, "Resetting reward statistics");
        self.stats.reset();
        self.aggregator.reset();
    }

    #[cfg(test)]
    pub fn stats(&self) -> &StatsTracker {
        &self.stats
    }
}
