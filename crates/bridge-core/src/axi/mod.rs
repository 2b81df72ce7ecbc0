//! AXI4 field model, channel widener, and downstream responder contract.

/// Burst, response, cache, and protection encodings.
pub mod attrs;
/// Address, data, and response channel beats.
pub mod channels;
/// Narrow-to-AXI4 field expansion.
pub mod widener;

pub use attrs::{AxiBurst, AxiCache, AxiProt, AxiResp};
pub use channels::{AxiAddrBeat, AxiReadCompletion, AxiWriteBeat, AxiWriteCompletion};
pub use widener::{ChannelWidener, WidenedTransaction};

/// Downstream AXI4 responder driven by the bridge.
///
/// Address and data beats are always accepted when issued. Completion beats
/// are only pulled from a path while the bridge asserts ready on it, so a
/// responder holds any completion that is not yet wanted.
pub trait AxiDownstream {
    /// Accepts an `AR` beat.
    fn issue_read(&mut self, ar: AxiAddrBeat);

    /// Accepts an `AW` beat together with its single `W` beat.
    fn issue_write(&mut self, aw: AxiAddrBeat, w: AxiWriteBeat);

    /// Completes the `R` handshake if a read completion is valid this cycle.
    fn take_read_completion(&mut self) -> Option<AxiReadCompletion>;

    /// Completes the `B` handshake if a write completion is valid this cycle.
    fn take_write_completion(&mut self) -> Option<AxiWriteCompletion>;

    /// Advances the responder by one clock edge.
    fn clock(&mut self) {}
}
