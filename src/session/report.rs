//! Per-step report lines and the console sink that prints them

use std::io::Write;

use serde::Serialize;
use tracing::warn;

use crate::game::CarId;
use crate::reward::StatsTracker;

/// One labelled value handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportLine {
    pub label: String,
    pub value: f64,
}

impl ReportLine {
    fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Which lines to include in each step report
#[derive(Debug, Clone, PartialEq)]
pub struct PrintSettings {
    /// Current and average step reward per player
    pub individual: bool,
    /// Lifetime total per player
    pub individual_total: bool,
    /// Session-wide step, average and cumulative reward
    pub general: bool,
    /// Players to include; None includes everyone
    pub players: Option<Vec<CarId>>,
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            individual: true,
            individual_total: true,
            general: false,
            players: Some(vec![0, 1]),
        }
    }
}

impl PrintSettings {
    fn includes(&self, car_id: CarId) -> bool {
        self.players
            .as_ref()
            .map_or(true, |players| players.contains(&car_id))
    }
}

/// Build the report for the step just recorded.
///
/// `present` lists the cars in the step, in snapshot order.
pub fn build_report(
    settings: &PrintSettings,
    present: &[CarId],
    stats: &StatsTracker,
) -> Vec<ReportLine> {
    let mut lines = Vec::new();

    for &car_id in present {
        if !settings.includes(car_id) {
            continue;
        }
        let Some(player) = stats.player(car_id) else {
            continue;
        };
        if settings.individual {
            lines.push(ReportLine::new(
                format!("Player {car_id} current reward"),
                player.current_reward,
            ));
            lines.push(ReportLine::new(
                format!("Player {car_id} average step reward"),
                player.average_step_reward,
            ));
        }
        if settings.individual_total {
            lines.push(ReportLine::new(
                format!("Player {car_id} total reward"),
                player.total_reward,
            ));
        }
    }

    if settings.general {
        let global = stats.global();
        lines.push(ReportLine::new("Total step reward", global.step_reward));
        lines.push(ReportLine::new(
            "Total average step reward",
            global.average_step_reward,
        ));
        lines.push(ReportLine::new(
            "Total cumulative reward",
            global.cumulative_reward,
        ));
    }

    lines
}

/// Consumer of per-step report lines
pub trait PresentationSink: Send {
    fn present(&mut self, lines: &[ReportLine]);
}

const SEPARATOR: &str = "--------------------------";

/// Writes each report as a separator-framed block of `label: value` lines
pub struct ConsoleSink<W> {
    out: W,
}

impl ConsoleSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_block(&mut self, lines: &[ReportLine]) -> std::io::Result<()> {
        writeln!(self.out, "{SEPARATOR}")?;
        for line in lines {
            writeln!(self.out, "{}: {:.6}", line.label, line.value)?;
        }
        writeln!(self.out, "{SEPARATOR}")?;
        self.out.flush()
    }
}

impl<W: Write + Send> PresentationSink for ConsoleSink<W> {
    fn present(&mut self, lines: &[ReportLine]) {
        if let Err(e) = self.write_block(lines) {
            warn!(error = %e, "Failed to write reward report");
        }
    }
}
