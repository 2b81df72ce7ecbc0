//! Upstream memory-style request and response types.

/// Transfer direction; also names the completion path that resolves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Direction {
    /// Resolved by the read data (`R`) path.
    Read,
    /// Resolved by the write response (`B`) path.
    Write,
}

impl Direction {
    /// Returns `true` for writes.
    #[must_use]
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Write)
    }
}

/// One single-beat request presented by the upstream client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MemRequest {
    /// Read or write.
    pub direction: Direction,
    /// Byte address, `MemAddrWidth` bits wide.
    pub addr: u64,
    /// Write data, little-endian byte lanes. Ignored for reads.
    pub wdata: u128,
    /// Byte-enable mask, one bit per data lane. Ignored for reads.
    pub byte_enable: u16,
}

impl MemRequest {
    /// Builds a read request.
    #[must_use]
    pub const fn read(addr: u64) -> Self {
        Self {
            direction: Direction::Read,
            addr,
            wdata: 0,
            byte_enable: 0,
        }
    }

    /// Builds a write request.
    #[must_use]
    pub const fn write(addr: u64, wdata: u128, byte_enable: u16) -> Self {
        Self {
            direction: Direction::Write,
            addr,
            wdata,
            byte_enable,
        }
    }
}

/// Response event delivered to the upstream client, one per admitted request.
///
/// Validity is carried by presence: a cycle without a response yields `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MemResponse {
    /// Direction of the request this response resolves.
    pub direction: Direction,
    /// Read data; always zero for writes.
    pub rdata: u128,
    /// Downstream reported a slave or decode error.
    pub error: bool,
}

/// Narrow completion event as seen by the correlator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Completion {
    /// Read data path fired.
    Read {
        /// Returned data.
        data: u128,
        /// Error flag.
        error: bool,
    },
    /// Write response path fired.
    Write {
        /// Error flag.
        error: bool,
    },
}

impl Completion {
    /// Returns the completion path this event arrived on.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Read { .. } => Direction::Read,
            Self::Write { .. } => Direction::Write,
        }
    }

    /// Converts the completion into the client-facing response.
    #[must_use]
    pub const fn into_response(self) -> MemResponse {
        match self {
            Self::Read { data, error } => MemResponse {
                direction: Direction::Read,
                rdata: data,
                error,
            },
            Self::Write { error } => MemResponse {
                direction: Direction::Write,
                rdata: 0,
                error,
            },
        }
    }
}
