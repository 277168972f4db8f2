//! Consola audio engine contract.
//!
//! The real device callback lives outside this workspace; what this crate
//! owns is the handoff: the orchestrator publishes each rebuilt composite
//! topology as an immutable, reference-counted snapshot, and a realtime
//! consumer reads it without locks. [`MixEngine`] holds the snapshot slot
//! and lifecycle state, [`MeterStore`] carries per-node level feedback
//! back from the realtime side.

pub mod engine;
pub mod meters;

pub use engine::{EngineSettings, EngineStatus, MixEngine};
pub use meters::{MeterCell, MeterStore};
