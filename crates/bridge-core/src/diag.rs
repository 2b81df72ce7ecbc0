//! Running counters describing bridge activity.

use crate::{Direction, MemResponse};

/// Activity counters accumulated since construction or the last reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BridgeStats {
    /// Clock edges advanced.
    pub cycles: u64,
    /// Requests admitted.
    pub granted: u64,
    /// Request presentations refused for lack of capacity.
    pub refused: u64,
    /// Read responses delivered.
    pub read_responses: u64,
    /// Write responses delivered.
    pub write_responses: u64,
    /// Responses delivered with the error flag set.
    pub error_responses: u64,
    /// Highest number of simultaneously outstanding transactions.
    pub peak_outstanding: usize,
}

impl BridgeStats {
    /// Responses delivered on either path.
    #[must_use]
    pub const fn responses(&self) -> u64 {
        self.read_responses + self.write_responses
    }

    pub(crate) fn record_grant(&mut self, outstanding: usize) {
        self.granted += 1;
        self.peak_outstanding = self.peak_outstanding.max(outstanding);
    }

    pub(crate) const fn record_refusal(&mut self) {
        self.refused += 1;
    }

    pub(crate) const fn record_response(&mut self, response: &MemResponse) {
        match response.direction {
            Direction::Read => self.read_responses += 1,
            Direction::Write => self.write_responses += 1,
        }
        if response.error {
            self.error_responses += 1;
        }
    }
}
