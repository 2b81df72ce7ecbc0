//! Request/response correlator: admission control and in-order completion
//! matching over a fixed-capacity pending-completion queue.
//!
//! Completions carry no tag. The correlator relies on the responder resolving
//! each path in issue order and checks that every completion arrives on the
//! path recorded for the oldest outstanding transaction.

/// Fixed-capacity FIFO of outstanding directions.
pub mod queue;

pub use queue::{PendingQueue, QueueFull};

use crate::{
    Completion, ConfigError, Direction, MemRequest, MemResponse, ProtocolViolation,
    MAX_REQUESTS_LIMIT,
};

/// Consumption-side state, derived from the queue head and the fault latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CorrelatorState {
    /// Nothing outstanding.
    Idle,
    /// Oldest outstanding transaction will be resolved by this path.
    Awaiting(Direction),
    /// A protocol violation is latched; no further progress until reset.
    Faulted(ProtocolViolation),
}

/// Tracks outstanding transactions and turns completions into responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correlator {
    pending: PendingQueue,
    latched_fault: Option<ProtocolViolation>,
}

impl Correlator {
    /// Creates a correlator tracking up to `max_requests` transactions.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCapacity`] when `max_requests` is zero and
    /// [`ConfigError::CapacityTooLarge`] above [`MAX_REQUESTS_LIMIT`].
    pub fn new(max_requests: usize) -> Result<Self, ConfigError> {
        if max_requests == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if max_requests > MAX_REQUESTS_LIMIT {
            return Err(ConfigError::CapacityTooLarge {
                requested: max_requests,
                max: MAX_REQUESTS_LIMIT,
            });
        }
        Ok(Self {
            pending: PendingQueue::new(max_requests),
            latched_fault: None,
        })
    }

    /// Tracking capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.pending.capacity()
    }

    /// Number of admitted, not yet completed transactions.
    #[must_use]
    pub const fn outstanding(&self) -> usize {
        self.pending.len()
    }

    /// Outstanding directions from oldest to newest.
    pub fn pending(&self) -> impl Iterator<Item = Direction> + '_ {
        self.pending.iter()
    }

    /// Current consumption-side state.
    #[must_use]
    pub fn state(&self) -> CorrelatorState {
        if let Some(violation) = self.latched_fault {
            return CorrelatorState::Faulted(violation);
        }
        self.pending
            .head()
            .map_or(CorrelatorState::Idle, CorrelatorState::Awaiting)
    }

    /// Latched protocol violation, if any.
    #[must_use]
    pub const fn latched_fault(&self) -> Option<ProtocolViolation> {
        self.latched_fault
    }

    /// Grant signal: a request presented now would be admitted.
    #[must_use]
    pub const fn can_admit(&self) -> bool {
        self.latched_fault.is_none() && !self.pending.is_full()
    }

    /// Ready signal for a completion path: true only when the oldest
    /// outstanding transaction is resolved by `path`.
    #[must_use]
    pub fn accepts(&self, path: Direction) -> bool {
        self.state() == CorrelatorState::Awaiting(path)
    }

    /// Presents a request for admission and returns the grant.
    ///
    /// A refused request is not buffered; the caller presents it again on a
    /// later cycle.
    pub fn submit(&mut self, request: &MemRequest) -> bool {
        if !self.can_admit() {
            return false;
        }
        self.pending.push(request.direction).is_ok()
    }

    /// Consumes a completion, resolving the oldest outstanding transaction.
    ///
    /// # Errors
    ///
    /// Returns the latched violation if one is already latched. Otherwise
    /// returns [`ProtocolViolation::UnmatchedCompletion`] when nothing is
    /// outstanding and [`ProtocolViolation::DirectionMismatch`] when the
    /// completion path differs from the oldest entry; both are latched.
    pub fn complete(&mut self, completion: Completion) -> Result<MemResponse, ProtocolViolation> {
        match self.state() {
            CorrelatorState::Faulted(violation) => Err(violation),
            CorrelatorState::Idle => Err(self.latch(ProtocolViolation::UnmatchedCompletion)),
            CorrelatorState::Awaiting(expected) if expected != completion.direction() => {
                Err(self.latch(ProtocolViolation::DirectionMismatch))
            }
            CorrelatorState::Awaiting(_) => {
                self.pending.pop();
                Ok(completion.into_response())
            }
        }
    }

    /// Consumes a read-path completion.
    ///
    /// # Errors
    ///
    /// See [`Correlator::complete`].
    pub fn complete_read(
        &mut self,
        data: u128,
        error: bool,
    ) -> Result<MemResponse, ProtocolViolation> {
        self.complete(Completion::Read { data, error })
    }

    /// Consumes a write-path completion.
    ///
    /// # Errors
    ///
    /// See [`Correlator::complete`].
    pub fn complete_write(&mut self, error: bool) -> Result<MemResponse, ProtocolViolation> {
        self.complete(Completion::Write { error })
    }

    /// Drops all outstanding transactions and clears any latched violation.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.latched_fault = None;
    }

    fn latch(&mut self, violation: ProtocolViolation) -> ProtocolViolation {
        self.latched_fault = Some(violation);
        violation
    }
}
