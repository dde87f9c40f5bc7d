//! Latest controller inputs per car, written by the input listener and read
//! by the sampling loop.

use dashmap::DashMap;
use tracing::trace;

use super::CarId;

/// A player's most recent controller state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlInputRecord {
    pub steer: f32,
    pub throttle: f32,
    pub pitch: f32,
    pub roll: f32,
    pub jump: bool,
    pub boost: bool,
    pub handbrake: bool,
    pub use_item: bool,
}

/// Keyed store of the latest control inputs.
///
/// Records are replaced whole under the map's shard lock and copied out on
/// read, so a reader never observes fields from two different updates.
#[derive(Debug, Default)]
pub struct InputCache {
    records: DashMap<CarId, ControlInputRecord>,
}

impl InputCache {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Overwrite the stored record for `car_id`
    pub fn record_input_change(&self, car_id: CarId, record: ControlInputRecord) {
        trace!(car_id, ?record, "Input change");
        self.records.insert(car_id, record);
    }

    /// Latest record for `car_id`, or the all-zero record if never seen
    pub fn read(&self, car_id: CarId) -> ControlInputRecord {
        self.records
            .get(&car_id)
            .map(|r| *r.value())
            .unwrap_or_default()
    }
}
