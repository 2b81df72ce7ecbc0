//! Sparse-memory AXI4 responder with fixed per-path latency.
//!
//! Each path resolves its own transactions in issue order. The two paths are
//! independent, so with unequal latencies a write response may become
//! available before an older read's.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::{
    config::MAX_ADDR_WIDTH, AxiAddrBeat, AxiDownstream, AxiReadCompletion, AxiResp, AxiWriteBeat,
    AxiWriteCompletion, BusGeometry, ConfigError, Direction,
};

/// Decoded address range; beats outside it receive `DECERR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct AddressWindow {
    /// First decoded byte address.
    pub base: u64,
    /// Window length in bytes.
    pub size: u64,
}

impl AddressWindow {
    /// Returns true when `addr` is decoded by the window.
    #[must_use]
    pub const fn contains(&self, addr: u64) -> bool {
        addr >= self.base && addr - self.base < self.size
    }
}

/// Responder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ResponderConfig {
    /// Data bus width in bits; must match the bridge.
    pub data_width: u32,
    /// Cycles from `AR` acceptance until `R` is available.
    pub read_latency: u64,
    /// Cycles from `AW`/`W` acceptance until `B` is available.
    pub write_latency: u64,
    /// Decoded range, or `None` to decode every address.
    pub window: Option<AddressWindow>,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            data_width: 32,
            read_latency: 1,
            write_latency: 1,
            window: None,
        }
    }
}

/// Address beat observed by the responder, in acceptance order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IssuedBeat {
    /// Responder cycle at acceptance.
    pub cycle: u64,
    /// `AR` or `AW`.
    pub direction: Direction,
    /// The beat itself.
    pub beat: AxiAddrBeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight<T> {
    ready_at: u64,
    completion: T,
}

/// Byte-addressed memory answering single-beat AXI4 transactions.
#[derive(Debug, Clone)]
pub struct MemoryResponder {
    geometry: BusGeometry,
    read_latency: u64,
    write_latency: u64,
    window: Option<AddressWindow>,
    memory: BTreeMap<u64, u8>,
    slave_errors: BTreeSet<u64>,
    reads: VecDeque<InFlight<AxiReadCompletion>>,
    writes: VecDeque<InFlight<AxiWriteCompletion>>,
    issued: Vec<IssuedBeat>,
    now: u64,
}

impl MemoryResponder {
    /// Creates an empty responder.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `data_width` is not a supported bus
    /// width.
    pub fn new(config: &ResponderConfig) -> Result<Self, ConfigError> {
        let geometry = BusGeometry::new(config.data_width, MAX_ADDR_WIDTH, MAX_ADDR_WIDTH)?;
        Ok(Self {
            geometry,
            read_latency: config.read_latency,
            write_latency: config.write_latency,
            window: config.window,
            memory: BTreeMap::new(),
            slave_errors: BTreeSet::new(),
            reads: VecDeque::new(),
            writes: VecDeque::new(),
            issued: Vec::new(),
            now: 0,
        })
    }

    /// Current responder cycle.
    #[must_use]
    pub const fn now(&self) -> u64 {
        self.now
    }

    /// Address beats accepted so far.
    #[must_use]
    pub fn issued(&self) -> &[IssuedBeat] {
        &self.issued
    }

    /// Transactions accepted but not yet taken, per path.
    #[must_use]
    pub fn in_flight(&self) -> (usize, usize) {
        (self.reads.len(), self.writes.len())
    }

    /// Copies `bytes` into memory starting at `addr`.
    pub fn load(&mut self, addr: u64, bytes: &[u8]) {
        for (offset, byte) in (0_u64..).zip(bytes) {
            self.memory.insert(addr.wrapping_add(offset), *byte);
        }
    }

    /// Reads `len` bytes starting at `addr`; unwritten bytes read as zero.
    #[must_use]
    pub fn read_bytes(&self, addr: u64, len: usize) -> Vec<u8> {
        (0_u64..)
            .take(len)
            .map(|offset| self.byte(addr.wrapping_add(offset)))
            .collect()
    }

    /// Bus word containing `addr`, lane 0 in the least significant byte.
    #[must_use]
    pub fn read_word(&self, addr: u64) -> u128 {
        let base = self.geometry.align(addr);
        (0..u64::from(self.geometry.data_bytes))
            .rev()
            .fold(0_u128, |word, lane| {
                (word << 8) | u128::from(self.byte(base.wrapping_add(lane)))
            })
    }

    /// Answers every later beat to the word containing `addr` with `SLVERR`.
    pub fn inject_slave_error(&mut self, addr: u64) {
        self.slave_errors.insert(self.geometry.align(addr));
    }

    /// Drops in-flight completions, injected errors and the beat log. Memory
    /// contents and the cycle counter are kept.
    pub fn reset(&mut self) {
        self.reads.clear();
        self.writes.clear();
        self.slave_errors.clear();
        self.issued.clear();
    }

    fn byte(&self, addr: u64) -> u8 {
        self.memory.get(&addr).copied().unwrap_or(0)
    }

    fn decode(&self, addr: u64) -> AxiResp {
        if self.window.is_some_and(|window| !window.contains(addr)) {
            AxiResp::DecErr
        } else if self.slave_errors.contains(&self.geometry.align(addr)) {
            AxiResp::SlvErr
        } else {
            AxiResp::Okay
        }
    }

    fn log(&mut self, direction: Direction, beat: AxiAddrBeat) {
        self.issued.push(IssuedBeat {
            cycle: self.now,
            direction,
            beat,
        });
    }
}

impl AxiDownstream for MemoryResponder {
    fn issue_read(&mut self, ar: AxiAddrBeat) {
        self.log(Direction::Read, ar);
        let resp = self.decode(ar.addr);
        let data = if resp.is_error() {
            0
        } else {
            self.read_word(ar.addr)
        };
        self.reads.push_back(InFlight {
            ready_at: self.now.saturating_add(self.read_latency),
            completion: AxiReadCompletion {
                id: ar.id,
                data,
                resp,
                last: true,
            },
        });
    }

    fn issue_write(&mut self, aw: AxiAddrBeat, w: AxiWriteBeat) {
        self.log(Direction::Write, aw);
        let resp = self.decode(aw.addr);
        if !resp.is_error() {
            let base = self.geometry.align(aw.addr);
            for lane in 0..self.geometry.data_bytes {
                if w.strb & (1 << lane) != 0 {
                    // Masked to the low byte of the lane.
                    #[allow(clippy::cast_possible_truncation)]
                    let byte = (w.data >> (lane * 8)) as u8;
                    self.memory
                        .insert(base.wrapping_add(u64::from(lane)), byte);
                }
            }
        }
        self.writes.push_back(InFlight {
            ready_at: self.now.saturating_add(self.write_latency),
            completion: AxiWriteCompletion { id: aw.id, resp },
        });
    }

    fn take_read_completion(&mut self) -> Option<AxiReadCompletion> {
        if self.reads.front()?.ready_at > self.now {
            return None;
        }
        self.reads.pop_front().map(|entry| entry.completion)
    }

    fn take_write_completion(&mut self) -> Option<AxiWriteCompletion> {
        if self.writes.front()?.ready_at > self.now {
            return None;
        }
        self.writes.pop_front().map(|entry| entry.completion)
    }

    fn clock(&mut self) {
        self.now = self.now.saturating_add(1);
    }
}
