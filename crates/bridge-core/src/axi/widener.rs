//! Expansion of narrow single-beat transactions into AXI4 channel beats.
//!
//! Every transaction becomes exactly one address beat, plus exactly one data
//! beat for writes, with a one-beat `FIXED` burst of the full bus width.
//! Completions pass back unchanged except that the response code collapses to
//! the upstream error flag.

use crate::{
    AxiAddrBeat, AxiBurst, AxiCache, AxiProt, AxiReadCompletion, AxiWriteBeat,
    AxiWriteCompletion, BridgeConfig, BusGeometry, Completion, ConfigError, Direction, MemRequest,
};

/// AXI beats produced for one admitted request, in issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidenedTransaction {
    /// One `AR` beat.
    Read {
        /// Address beat.
        ar: AxiAddrBeat,
    },
    /// One `AW` beat followed by one `W` beat.
    Write {
        /// Address beat.
        aw: AxiAddrBeat,
        /// Data beat.
        w: AxiWriteBeat,
    },
}

impl WidenedTransaction {
    /// Direction of the widened transaction.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        match self {
            Self::Read { .. } => Direction::Read,
            Self::Write { .. } => Direction::Write,
        }
    }

    /// Address-channel beat of the transaction.
    #[must_use]
    pub const fn address_beat(&self) -> &AxiAddrBeat {
        match self {
            Self::Read { ar } => ar,
            Self::Write { aw, .. } => aw,
        }
    }
}

/// Stateless field mapper between the narrow request stream and AXI4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelWidener {
    geometry: BusGeometry,
    prot: AxiProt,
    aw_cache: AxiCache,
    ar_cache: AxiCache,
}

impl ChannelWidener {
    /// Builds a widener, rejecting configurations whose widths cannot be
    /// expressed on the bus.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] reported by [`BridgeConfig::validate`].
    pub const fn new(config: &BridgeConfig) -> Result<Self, ConfigError> {
        let geometry = match config.validate() {
            Ok(geometry) => geometry,
            Err(error) => return Err(error),
        };
        Ok(Self {
            geometry,
            prot: config.prot,
            aw_cache: config.aw_cache,
            ar_cache: config.ar_cache,
        })
    }

    /// Derived bus geometry.
    #[must_use]
    pub const fn geometry(&self) -> &BusGeometry {
        &self.geometry
    }

    /// Maps an upstream address onto the downstream address space.
    ///
    /// The upstream value is first limited to `MemAddrWidth` bits, then
    /// zero-extended or truncated to `AxiAddrWidth` bits.
    #[must_use]
    pub const fn widen_address(&self, addr: u64) -> u64 {
        addr & self.geometry.mem_addr_mask & self.geometry.axi_addr_mask
    }

    /// Produces the AXI beats for one request.
    #[must_use]
    pub const fn widen(&self, request: &MemRequest) -> WidenedTransaction {
        match request.direction {
            Direction::Read => WidenedTransaction::Read {
                ar: self.address_beat(request.addr, self.ar_cache),
            },
            Direction::Write => WidenedTransaction::Write {
                aw: self.address_beat(request.addr, self.aw_cache),
                w: AxiWriteBeat {
                    data: request.wdata & self.geometry.data_mask,
                    strb: request.byte_enable & self.geometry.strobe_mask,
                    last: true,
                },
            },
        }
    }

    /// Forwards an `R` beat as a read completion. Data passes through
    /// unchanged; only the response code is reduced to an error flag.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn narrow_read(&self, r: &AxiReadCompletion) -> Completion {
        Completion::Read {
            data: r.data,
            error: r.resp.is_error(),
        }
    }

    /// Forwards a `B` beat as a write completion.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn narrow_write(&self, b: &AxiWriteCompletion) -> Completion {
        Completion::Write {
            error: b.resp.is_error(),
        }
    }

    const fn address_beat(&self, addr: u64, cache: AxiCache) -> AxiAddrBeat {
        AxiAddrBeat {
            id: 0,
            addr: self.widen_address(addr),
            len: 0,
            size: self.geometry.size,
            burst: AxiBurst::Fixed,
            lock: false,
            cache,
            prot: self.prot,
            qos: 0,
            region: 0,
        }
    }
}
