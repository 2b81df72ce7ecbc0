//! AXI4 channel beats exchanged with the downstream responder.

use crate::{AxiBurst, AxiCache, AxiProt, AxiResp};

/// One `AR` or `AW` address-channel beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct AxiAddrBeat {
    /// Transaction identifier.
    pub id: u32,
    /// Start address, `AxiAddrWidth` bits wide.
    pub addr: u64,
    /// Burst length minus one.
    pub len: u8,
    /// Log2 of bytes per beat.
    pub size: u8,
    /// Burst type.
    pub burst: AxiBurst,
    /// Exclusive access.
    pub lock: bool,
    /// Memory attributes.
    pub cache: AxiCache,
    /// Protection attributes.
    pub prot: AxiProt,
    /// Quality-of-service hint.
    pub qos: u8,
    /// Region identifier.
    pub region: u8,
}

impl AxiAddrBeat {
    /// Number of data beats in the burst.
    #[must_use]
    pub const fn beats(&self) -> u16 {
        self.len as u16 + 1
    }

    /// Number of bytes moved by each beat.
    #[must_use]
    pub const fn bytes_per_beat(&self) -> u32 {
        1 << self.size
    }
}

/// One `W` data-channel beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct AxiWriteBeat {
    /// Data, little-endian byte lanes.
    pub data: u128,
    /// Lane strobes.
    pub strb: u16,
    /// Final beat of the burst.
    pub last: bool,
}

/// One `R` read-data beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct AxiReadCompletion {
    /// Transaction identifier.
    pub id: u32,
    /// Data, little-endian byte lanes.
    pub data: u128,
    /// Response code.
    pub resp: AxiResp,
    /// Final beat of the burst.
    pub last: bool,
}

/// One `B` write-response beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct AxiWriteCompletion {
    /// Transaction identifier.
    pub id: u32,
    /// Response code.
    pub resp: AxiResp,
}
