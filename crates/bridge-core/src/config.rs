//! Static bridge configuration and the bus geometry derived from it.

use crate::{AxiCache, AxiProt, ConfigError};

/// Widest data bus the model carries (bits).
pub const MAX_DATA_WIDTH: u32 = 128;

/// Widest address, upstream or downstream (bits).
pub const MAX_ADDR_WIDTH: u32 = 64;

/// Default tracking capacity.
pub const DEFAULT_MAX_REQUESTS: usize = 4;

/// Largest tracking capacity accepted at construction.
pub const MAX_REQUESTS_LIMIT: usize = 4096;

/// Top-level immutable configuration for a bridge instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BridgeConfig {
    /// Upstream address width in bits.
    pub mem_addr_width: u32,
    /// Downstream AXI address width in bits.
    pub axi_addr_width: u32,
    /// Data bus width in bits, shared by both sides.
    pub data_width: u32,
    /// Pending-completion queue capacity.
    pub max_requests: usize,
    /// Fixed `AxPROT` applied to every transaction.
    pub prot: AxiProt,
    /// `AWCACHE` applied to writes.
    pub aw_cache: AxiCache,
    /// `ARCACHE` applied to reads.
    pub ar_cache: AxiCache,
    /// Enables deterministic trace callback dispatch.
    pub tracing_enabled: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            mem_addr_width: 32,
            axi_addr_width: 32,
            data_width: 32,
            max_requests: DEFAULT_MAX_REQUESTS,
            prot: AxiProt::UNPRIVILEGED_SECURE_DATA,
            aw_cache: AxiCache::DEVICE_NON_BUFFERABLE,
            ar_cache: AxiCache::DEVICE_NON_BUFFERABLE,
            tracing_enabled: false,
        }
    }
}

impl BridgeConfig {
    /// Checks every width and capacity and derives the bus geometry.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found: data width out of range, not a
    /// byte multiple, or not a power-of-two byte count; either address width
    /// out of range; or capacity outside `1..=MAX_REQUESTS_LIMIT`.
    pub const fn validate(&self) -> Result<BusGeometry, ConfigError> {
        if self.max_requests == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.max_requests > MAX_REQUESTS_LIMIT {
            return Err(ConfigError::CapacityTooLarge {
                requested: self.max_requests,
                max: MAX_REQUESTS_LIMIT,
            });
        }
        if self.mem_addr_width == 0 || self.mem_addr_width > MAX_ADDR_WIDTH {
            return Err(ConfigError::MemAddrWidthOutOfRange {
                width: self.mem_addr_width,
                max: MAX_ADDR_WIDTH,
            });
        }
        if self.axi_addr_width == 0 || self.axi_addr_width > MAX_ADDR_WIDTH {
            return Err(ConfigError::AxiAddrWidthOutOfRange {
                width: self.axi_addr_width,
                max: MAX_ADDR_WIDTH,
            });
        }
        BusGeometry::new(self.data_width, self.mem_addr_width, self.axi_addr_width)
    }
}

/// Quantities derived from validated widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BusGeometry {
    /// Data bus width in bits.
    pub data_width: u32,
    /// Bytes per beat.
    pub data_bytes: u32,
    /// `AxSIZE` encoding, log2 of `data_bytes`.
    pub size: u8,
    /// Mask selecting the valid data bits.
    pub data_mask: u128,
    /// Mask selecting the valid strobe lanes.
    pub strobe_mask: u16,
    /// Mask selecting the valid upstream address bits.
    pub mem_addr_mask: u64,
    /// Mask selecting the valid downstream address bits.
    pub axi_addr_mask: u64,
}

impl BusGeometry {
    /// Derives geometry for a data width and the two address widths.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the data width cannot be expressed as an
    /// AXI transfer size.
    pub const fn new(
        data_width: u32,
        mem_addr_width: u32,
        axi_addr_width: u32,
    ) -> Result<Self, ConfigError> {
        if data_width == 0 || data_width > MAX_DATA_WIDTH {
            return Err(ConfigError::DataWidthOutOfRange {
                width: data_width,
                max: MAX_DATA_WIDTH,
            });
        }
        if data_width % 8 != 0 {
            return Err(ConfigError::DataWidthNotByteMultiple { width: data_width });
        }
        let data_bytes = data_width / 8;
        if !data_bytes.is_power_of_two() {
            return Err(ConfigError::DataWidthNotPowerOfTwo { width: data_width });
        }

        #[allow(clippy::cast_possible_truncation)]
        let size = data_bytes.trailing_zeros() as u8;
        // At most 16 lanes, checked against MAX_DATA_WIDTH above.
        #[allow(clippy::cast_possible_truncation)]
        let strobe_mask = low_mask_u128(data_bytes) as u16;

        Ok(Self {
            data_width,
            data_bytes,
            size,
            data_mask: low_mask_u128(data_width),
            strobe_mask,
            mem_addr_mask: low_mask_u64(mem_addr_width),
            axi_addr_mask: low_mask_u64(axi_addr_width),
        })
    }

    /// Rounds `addr` down to the start of its bus word.
    #[must_use]
    pub const fn align(&self, addr: u64) -> u64 {
        addr & !(self.data_bytes as u64 - 1)
    }
}

const fn low_mask_u64(width: u32) -> u64 {
    if width >= u64::BITS {
        u64::MAX
    } else {
        (1 << width) - 1
    }
}

const fn low_mask_u128(width: u32) -> u128 {
    if width >= u128::BITS {
        u128::MAX
    } else {
        (1 << width) - 1
    }
}
