//! Per-node meter feedback from the realtime consumer.
//!
//! Each node gets a stereo [`MeterCell`] of atomics the realtime side can
//! publish into without locking; the registry itself is mutex-guarded and
//! only touched from control-rate code (meter queries, topology syncs).
//! Levels are stored as `f32` bit patterns in `AtomicU32`, which keeps the
//! whole crate free of unsafe code.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use consola_graph::Topology;

/// Lock-free stereo level cell shared between the realtime writer and
/// control-rate readers.
#[derive(Debug, Default)]
pub struct MeterCell {
    channels: [AtomicU32; 2],
}

impl MeterCell {
    /// Creates a silent cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a level for one channel; out-of-range channels are ignored.
    pub fn set(&self, channel: usize, level: f32) {
        if let Some(slot) = self.channels.get(channel) {
            slot.store(level.to_bits(), Ordering::Relaxed);
        }
    }

    /// Loads one channel's level, clamped to `[0, 1]`.
    pub fn get(&self, channel: usize) -> f32 {
        self.channels
            .get(channel)
            .map_or(0.0, |slot| f32::from_bits(slot.load(Ordering::Relaxed)).clamp(0.0, 1.0))
    }

    /// Loads both channels.
    pub fn levels(&self) -> [f32; 2] {
        [self.get(0), self.get(1)]
    }
}

/// Registry of meter cells keyed by composite node id.
#[derive(Debug, Default)]
pub struct MeterStore {
    meters: Mutex<HashMap<String, Arc<MeterCell>>>,
}

impl MeterStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cell for a node, creating it on first use.
    pub fn meter_for(&self, node_id: &str) -> Arc<MeterCell> {
        let mut meters = self.meters.lock().expect("meter registry poisoned");
        Arc::clone(
            meters
                .entry(node_id.to_string())
                .or_insert_with(|| Arc::new(MeterCell::new())),
        )
    }

    /// Returns the current levels for a node; unknown ids read silent.
    pub fn levels_for(&self, node_id: &str) -> [f32; 2] {
        let meters = self.meters.lock().expect("meter registry poisoned");
        meters.get(node_id).map_or([0.0, 0.0], |cell| cell.levels())
    }

    /// Aligns the registry with a topology: cells appear for new nodes and
    /// disappear for removed ones.
    pub fn sync_with_topology(&self, topology: &Topology) {
        let ids: HashSet<&str> = topology.nodes().iter().map(|node| node.id()).collect();

        let mut meters = self.meters.lock().expect("meter registry poisoned");
        for &id in &ids {
            meters
                .entry(id.to_string())
                .or_insert_with(|| Arc::new(MeterCell::new()));
        }
        meters.retain(|id, _| ids.contains(id.as_str()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consola_graph::{Node, NodeType};

    #[test]
    fn cell_round_trips_levels() {
        let cell = MeterCell::new();
        cell.set(0, 0.25);
        cell.set(1, 0.75);
        assert_eq!(cell.levels(), [0.25, 0.75]);
    }

    #[test]
    fn cell_clamps_on_read() {
        let cell = MeterCell::new();
        cell.set(0, 3.0);
        cell.set(1, -1.0);
        assert_eq!(cell.levels(), [1.0, 0.0]);
    }

    #[test]
    fn cell_ignores_out_of_range_channel() {
        let cell = MeterCell::new();
        cell.set(7, 1.0);
        assert_eq!(cell.get(7), 0.0);
    }

    #[test]
    fn unknown_node_reads_silent() {
        let store = MeterStore::new();
        assert_eq!(store.levels_for("ghost"), [0.0, 0.0]);
    }

    #[test]
    fn meter_for_shares_one_cell() {
        let store = MeterStore::new();
        let writer = store.meter_for("c1");
        writer.set(0, 0.6);
        assert_eq!(store.levels_for("c1"), [0.6, 0.0]);
    }

    #[test]
    fn sync_creates_and_retires_cells() {
        let store = MeterStore::new();
        let mut topology = Topology::new();
        topology.add_node(Node::stereo("a", NodeType::Channel));
        topology.add_node(Node::stereo("b", NodeType::GroupBus));
        store.sync_with_topology(&topology);

        store.meter_for("a").set(0, 0.9);
        assert_eq!(store.levels_for("a"), [0.9, 0.0]);

        topology.remove_node("a");
        store.sync_with_topology(&topology);
        assert_eq!(store.levels_for("a"), [0.0, 0.0]);
        // Existing cells for surviving nodes are kept, not recreated.
        store.meter_for("b").set(1, 0.4);
        store.sync_with_topology(&topology);
        assert_eq!(store.levels_for("b"), [0.0, 0.4]);
    }
}
