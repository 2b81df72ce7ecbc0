//! Deterministic trace hooks emitted at cycle boundaries.

use crate::{AxiAddrBeat, Direction, MemResponse, ProtocolViolation};

/// Trace events in the order the bridge produces them within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// A request was admitted.
    Granted {
        /// Cycle number.
        cycle: u64,
        /// Request direction.
        direction: Direction,
        /// Upstream address.
        addr: u64,
    },
    /// A request was refused because tracking capacity is exhausted.
    Refused {
        /// Cycle number.
        cycle: u64,
        /// Request direction.
        direction: Direction,
        /// Outstanding transactions when refused.
        outstanding: usize,
    },
    /// An address beat was issued downstream.
    AddressIssued {
        /// Cycle number.
        cycle: u64,
        /// `AR` for reads, `AW` for writes.
        direction: Direction,
        /// The issued beat.
        beat: AxiAddrBeat,
    },
    /// A response was delivered upstream.
    Responded {
        /// Cycle number.
        cycle: u64,
        /// The delivered response.
        response: MemResponse,
    },
    /// A protocol violation was detected and latched.
    Violation {
        /// Cycle number.
        cycle: u64,
        /// The violation.
        violation: ProtocolViolation,
        /// Completion path that fired.
        observed: Direction,
    },
}

/// Sink trait for deterministic trace hooks.
pub trait TraceSink {
    /// Records an event in emission order.
    fn on_event(&mut self, event: TraceEvent);
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTrace;

impl TraceSink for NullTrace {
    fn on_event(&mut self, _event: TraceEvent) {}
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}
