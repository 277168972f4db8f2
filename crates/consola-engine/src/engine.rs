//! Engine lifecycle and composite snapshot publishing.
//!
//! The composite topology crosses a thread boundary: the orchestrator
//! rebuilds it after every mutation, the realtime consumer reads it from
//! the audio callback. The slot is an [`ArcSwap`], so publishing is an
//! atomic pointer swap and a reader that loaded the previous snapshot keeps
//! a valid `Arc` until it naturally drops it. No published topology is ever
//! mutated in place.

use std::sync::Arc;

use arc_swap::ArcSwap;
use consola_graph::Topology;

use crate::meters::MeterStore;

/// Engine configuration requested at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineSettings {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Samples per processing block.
    pub block_size: u32,
    /// Hardware input channels to request.
    pub input_channels: u32,
    /// Hardware output channels to request.
    pub output_channels: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            block_size: 512,
            input_channels: 32,
            output_channels: 32,
        }
    }
}

/// Engine runtime state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EngineStatus {
    /// Whether the engine is running.
    pub running: bool,
    /// Smoothed callback CPU load in `[0, 1]`, reported by the backend.
    pub cpu_load: f64,
}

/// Owns the published composite snapshot, meter feedback, and lifecycle.
pub struct MixEngine {
    settings: EngineSettings,
    status: EngineStatus,
    topology: ArcSwap<Topology>,
    meters: MeterStore,
}

impl MixEngine {
    /// Creates a stopped engine with an empty published topology.
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            status: EngineStatus::default(),
            topology: ArcSwap::from_pointee(Topology::new()),
            meters: MeterStore::new(),
        }
    }

    /// Starts the engine. Idempotent.
    pub fn start(&mut self) {
        if self.status.running {
            return;
        }
        self.status.running = true;
        tracing::info!("audio engine started");
    }

    /// Stops the engine. Idempotent.
    pub fn stop(&mut self) {
        if !self.status.running {
            return;
        }
        self.status.running = false;
        tracing::info!("audio engine stopped");
    }

    /// Returns the current status.
    pub fn status(&self) -> EngineStatus {
        self.status
    }

    /// Returns the configured settings.
    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    /// Publishes a new composite snapshot.
    ///
    /// Swaps the slot atomically and syncs the meter store to the new node
    /// set. The previous snapshot stays alive for any reader still holding
    /// it.
    pub fn set_topology(&self, topology: Arc<Topology>) {
        self.meters.sync_with_topology(&topology);
        tracing::debug!(
            nodes = topology.node_count(),
            connections = topology.connection_count(),
            "composite topology published"
        );
        self.topology.store(topology);
    }

    /// Returns an owned handle to the currently published snapshot.
    ///
    /// Safe to call from the realtime side; the returned `Arc` remains
    /// valid even if a new snapshot is published immediately after.
    pub fn topology(&self) -> Arc<Topology> {
        self.topology.load_full()
    }

    /// Returns the meter store shared with the realtime consumer.
    pub fn meters(&self) -> &MeterStore {
        &self.meters
    }

    /// Returns the current stereo meter levels for a composite node id.
    pub fn meter_levels_for(&self, node_id: &str) -> [f32; 2] {
        self.meters.levels_for(node_id)
    }
}
