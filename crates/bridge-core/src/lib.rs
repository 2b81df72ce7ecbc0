//! Cycle-level model of a memory-to-AXI4 protocol bridge.
//!
//! A single client issues narrow, untagged, single-beat reads and writes; the
//! bridge expands each into AXI4 channel beats and returns exactly one
//! response per admitted request, in admission order.

/// Fault and configuration error taxonomy.
pub mod fault;
pub use fault::{ConfigError, ProtocolViolation};

/// Upstream request and response types.
pub mod request;
pub use request::{Completion, Direction, MemRequest, MemResponse};

/// Static configuration and derived bus geometry.
pub mod config;
pub use config::{
    BridgeConfig, BusGeometry, DEFAULT_MAX_REQUESTS, MAX_ADDR_WIDTH, MAX_DATA_WIDTH,
    MAX_REQUESTS_LIMIT,
};

/// AXI4 field model, channel widener, and downstream contract.
pub mod axi;
pub use axi::{
    AxiAddrBeat, AxiBurst, AxiCache, AxiDownstream, AxiProt, AxiReadCompletion, AxiResp,
    AxiWriteBeat, AxiWriteCompletion, ChannelWidener, WidenedTransaction,
};

/// Admission control and in-order completion matching.
pub mod correlator;
pub use correlator::{Correlator, CorrelatorState, PendingQueue, QueueFull};

/// Trace events and sinks.
pub mod trace;
pub use trace::{NullTrace, TraceEvent, TraceSink};

/// Activity counters.
pub mod diag;
pub use diag::BridgeStats;

/// Cycle driver composing correlator and widener.
pub mod bridge;
pub use bridge::{Bridge, CycleOutcome};

/// Sparse-memory reference responder.
pub mod responder;
pub use responder::{AddressWindow, IssuedBeat, MemoryResponder, ResponderConfig};

/// Lock-protected bridge handle.
pub mod shared;
pub use shared::SharedBridge;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
