//! Thread-safe handle to a single bridge instance.
//!
//! The bridge itself is single-threaded; a handle serializes every access
//! behind one lock, so a clock-driving thread and observer threads see the
//! same cycle-ordered state.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    AxiDownstream, AxiReadCompletion, AxiWriteCompletion, Bridge, BridgeConfig, BridgeStats,
    ConfigError, CorrelatorState, CycleOutcome, MemRequest, MemResponse, ProtocolViolation,
    TraceSink,
};

/// Cloneable, lock-protected bridge handle.
#[derive(Debug, Clone)]
pub struct SharedBridge {
    inner: Arc<Mutex<Bridge>>,
}

impl SharedBridge {
    /// Builds a bridge and wraps it.
    ///
    /// # Errors
    ///
    /// See [`Bridge::new`].
    pub fn new(config: &BridgeConfig) -> Result<Self, ConfigError> {
        Bridge::new(config).map(Self::from)
    }

    /// Advances one clock cycle.
    ///
    /// # Errors
    ///
    /// See [`Bridge::cycle`].
    pub fn cycle(
        &self,
        request: Option<&MemRequest>,
        downstream: &mut dyn AxiDownstream,
    ) -> Result<CycleOutcome, ProtocolViolation> {
        self.inner.lock().cycle(request, downstream)
    }

    /// Advances one clock cycle with trace dispatch.
    ///
    /// # Errors
    ///
    /// See [`Bridge::cycle_traced`].
    pub fn cycle_traced(
        &self,
        request: Option<&MemRequest>,
        downstream: &mut dyn AxiDownstream,
        sink: &mut dyn TraceSink,
    ) -> Result<CycleOutcome, ProtocolViolation> {
        self.inner.lock().cycle_traced(request, downstream, sink)
    }

    /// Presents a request for admission.
    ///
    /// # Errors
    ///
    /// See [`Bridge::submit`].
    pub fn submit(
        &self,
        request: &MemRequest,
        downstream: &mut dyn AxiDownstream,
    ) -> Result<bool, ProtocolViolation> {
        self.inner.lock().submit(request, downstream)
    }

    /// Forwards an `R` beat.
    ///
    /// # Errors
    ///
    /// See [`Bridge::accept_read_completion`].
    pub fn accept_read_completion(
        &self,
        r: &AxiReadCompletion,
    ) -> Result<MemResponse, ProtocolViolation> {
        self.inner.lock().accept_read_completion(r)
    }

    /// Forwards a `B` beat.
    ///
    /// # Errors
    ///
    /// See [`Bridge::accept_write_completion`].
    pub fn accept_write_completion(
        &self,
        b: &AxiWriteCompletion,
    ) -> Result<MemResponse, ProtocolViolation> {
        self.inner.lock().accept_write_completion(b)
    }

    /// Snapshot of the activity counters.
    #[must_use]
    pub fn stats(&self) -> BridgeStats {
        *self.inner.lock().stats()
    }

    /// Number of outstanding transactions.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.inner.lock().outstanding()
    }

    /// Consumption-side state.
    #[must_use]
    pub fn state(&self) -> CorrelatorState {
        self.inner.lock().correlator().state()
    }

    /// Clears tracking and the fault latch.
    pub fn reset(&self) {
        self.inner.lock().reset();
    }

    /// Runs `f` with exclusive access to the bridge.
    pub fn with<R>(&self, f: impl FnOnce(&mut Bridge) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl From<Bridge> for SharedBridge {
    fn from(bridge: Bridge) -> Self {
        Self {
            inner: Arc::new(Mutex::new(bridge)),
        }
    }
}
