use thiserror::Error;

/// Downstream protocol contract violations detected by the correlator.
///
/// Every violation is fatal: once raised it is latched and the bridge refuses
/// further traffic until it is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum ProtocolViolation {
    /// A completion was signalled while no transaction was outstanding.
    #[error("completion signalled with no outstanding transaction")]
    UnmatchedCompletion = 0x01,
    /// A completion arrived on the path that does not match the oldest
    /// outstanding transaction.
    #[error("completion path does not match the oldest outstanding transaction")]
    DirectionMismatch = 0x02,
}

impl ProtocolViolation {
    /// Converts a violation to its stable numeric code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Converts a stable numeric code back into a violation.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::UnmatchedCompletion),
            0x02 => Some(Self::DirectionMismatch),
            _ => None,
        }
    }
}

/// Static configuration rejected at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ConfigError {
    /// Data width is not a whole number of bytes.
    #[error("data width {width} is not a whole number of bytes")]
    DataWidthNotByteMultiple {
        /// Offending width in bits.
        width: u32,
    },
    /// Data width in bytes is not a power of two, so no AXI size encodes it.
    #[error("data width {width} is not a power-of-two number of bytes")]
    DataWidthNotPowerOfTwo {
        /// Offending width in bits.
        width: u32,
    },
    /// Data width is zero or wider than the model supports.
    #[error("data width {width} is outside 8..={max}")]
    DataWidthOutOfRange {
        /// Offending width in bits.
        width: u32,
        /// Widest supported data bus in bits.
        max: u32,
    },
    /// Upstream memory address width is zero or too wide.
    #[error("memory address width {width} is outside 1..={max}")]
    MemAddrWidthOutOfRange {
        /// Offending width in bits.
        width: u32,
        /// Widest supported address in bits.
        max: u32,
    },
    /// Downstream AXI address width is zero or too wide.
    #[error("axi address width {width} is outside 1..={max}")]
    AxiAddrWidthOutOfRange {
        /// Offending width in bits.
        width: u32,
        /// Widest supported address in bits.
        max: u32,
    },
    /// Tracking capacity must admit at least one outstanding request.
    #[error("max outstanding requests must be at least 1")]
    ZeroCapacity,
    /// Tracking capacity exceeds what the model will allocate.
    #[error("max outstanding requests {requested} exceeds the limit of {max}")]
    CapacityTooLarge {
        /// Requested capacity.
        requested: usize,
        /// Largest accepted capacity.
        max: usize,
    },
    /// Cache attribute does not fit the 4-bit `AxCACHE` field.
    #[error("cache attribute {bits:#x} does not fit in 4 bits")]
    CacheOutOfRange {
        /// Offending raw attribute.
        bits: u8,
    },
    /// Protection attribute does not fit the 3-bit `AxPROT` field.
    #[error("protection attribute {bits:#x} does not fit in 3 bits")]
    ProtOutOfRange {
        /// Offending raw attribute.
        bits: u8,
    },
}
