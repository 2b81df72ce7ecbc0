//! AXI4 transaction attribute encodings.

use crate::ConfigError;

/// `AxBURST` burst type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum AxiBurst {
    /// Every beat targets the same address.
    #[default]
    Fixed = 0b00,
    /// Address increments by the transfer size each beat.
    Incr = 0b01,
    /// Incrementing burst that wraps at an aligned boundary.
    Wrap = 0b10,
}

impl AxiBurst {
    /// Returns the two-bit wire encoding.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Decodes the two-bit wire encoding; `0b11` is reserved.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b00 => Some(Self::Fixed),
            0b01 => Some(Self::Incr),
            0b10 => Some(Self::Wrap),
            _ => None,
        }
    }
}

/// `xRESP` response code carried on the `R` and `B` channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum AxiResp {
    /// Normal access success.
    #[default]
    Okay = 0b00,
    /// Exclusive access success.
    ExOkay = 0b01,
    /// Slave reached but reported an error.
    SlvErr = 0b10,
    /// No slave decodes the address.
    DecErr = 0b11,
}

impl AxiResp {
    /// Returns the two-bit wire encoding.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Decodes the low two bits of `bits`.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::Okay,
            0b01 => Self::ExOkay,
            0b10 => Self::SlvErr,
            _ => Self::DecErr,
        }
    }

    /// `SLVERR` and `DECERR` surface upstream as the error flag.
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::SlvErr | Self::DecErr)
    }
}

/// `AxCACHE` memory attribute (4 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(try_from = "u8", into = "u8")
)]
pub struct AxiCache(u8);

impl AxiCache {
    /// Device non-bufferable.
    pub const DEVICE_NON_BUFFERABLE: Self = Self(0b0000);
    /// Bufferable bit.
    pub const BUFFERABLE: u8 = 0b0001;
    /// Modifiable bit.
    pub const MODIFIABLE: u8 = 0b0010;
    /// Other-allocate bit.
    pub const OTHER_ALLOCATE: u8 = 0b0100;
    /// Allocate bit.
    pub const ALLOCATE: u8 = 0b1000;

    /// Builds a cache attribute from raw bits.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CacheOutOfRange`] when `bits` exceeds 4 bits.
    pub const fn from_bits(bits: u8) -> Result<Self, ConfigError> {
        if bits <= 0b1111 {
            Ok(Self(bits))
        } else {
            Err(ConfigError::CacheOutOfRange { bits })
        }
    }

    /// Returns the raw 4-bit value.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` when the bufferable bit is set.
    #[must_use]
    pub const fn is_bufferable(self) -> bool {
        self.0 & Self::BUFFERABLE != 0
    }

    /// Returns `true` when the modifiable bit is set.
    #[must_use]
    pub const fn is_modifiable(self) -> bool {
        self.0 & Self::MODIFIABLE != 0
    }
}

impl TryFrom<u8> for AxiCache {
    type Error = ConfigError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::from_bits(bits)
    }
}

impl From<AxiCache> for u8 {
    fn from(cache: AxiCache) -> Self {
        cache.bits()
    }
}

/// `AxPROT` protection attribute (3 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(try_from = "u8", into = "u8")
)]
pub struct AxiProt(u8);

impl AxiProt {
    /// Unprivileged, secure, data access.
    pub const UNPRIVILEGED_SECURE_DATA: Self = Self(0b000);
    /// Privileged access bit.
    pub const PRIVILEGED: u8 = 0b001;
    /// Non-secure access bit.
    pub const NON_SECURE: u8 = 0b010;
    /// Instruction access bit.
    pub const INSTRUCTION: u8 = 0b100;

    /// Builds a protection attribute from raw bits.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ProtOutOfRange`] when `bits` exceeds 3 bits.
    pub const fn from_bits(bits: u8) -> Result<Self, ConfigError> {
        if bits <= 0b111 {
            Ok(Self(bits))
        } else {
            Err(ConfigError::ProtOutOfRange { bits })
        }
    }

    /// Returns the raw 3-bit value.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for AxiProt {
    type Error = ConfigError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::from_bits(bits)
    }
}

impl From<AxiProt> for u8 {
    fn from(prot: AxiProt) -> Self {
        prot.bits()
    }
}

#[cfg(test)]
mod tests {
    use super::{AxiBurst, AxiCache, AxiProt, AxiResp};
    use crate::ConfigError;

    #[test]
    fn only_slave_and_decode_errors_flag_upstream() {
        assert!(!AxiResp::Okay.is_error());
        assert!(!AxiResp::ExOkay.is_error());
        assert!(AxiResp::SlvErr.is_error());
        assert!(AxiResp::DecErr.is_error());
    }

    #[test]
    fn resp_decode_uses_low_two_bits() {
        for bits in 0_u8..4 {
            assert_eq!(AxiResp::from_bits(bits).bits(), bits);
        }
        assert_eq!(AxiResp::from_bits(0b110), AxiResp::SlvErr);
    }

    #[test]
    fn reserved_burst_encoding_is_rejected() {
        assert_eq!(AxiBurst::from_bits(0b00), Some(AxiBurst::Fixed));
        assert_eq!(AxiBurst::from_bits(0b10), Some(AxiBurst::Wrap));
        assert_eq!(AxiBurst::from_bits(0b11), None);
    }

    #[test]
    fn cache_attribute_range_is_enforced() {
        let cache = AxiCache::from_bits(AxiCache::BUFFERABLE | AxiCache::MODIFIABLE)
            .expect("4-bit cache value");
        assert!(cache.is_bufferable());
        assert!(cache.is_modifiable());
        assert_eq!(
            AxiCache::from_bits(0x10),
            Err(ConfigError::CacheOutOfRange { bits: 0x10 })
        );
    }

    #[test]
    fn prot_attribute_range_is_enforced() {
        assert_eq!(
            AxiProt::from_bits(AxiProt::PRIVILEGED | AxiProt::INSTRUCTION).map(AxiProt::bits),
            Ok(0b101)
        );
        assert_eq!(
            AxiProt::try_from(0x08),
            Err(ConfigError::ProtOutOfRange { bits: 0x08 })
        );
    }
}
