//! Cycle-level composition of the correlator and the channel widener.

use tracing::{debug, error, trace};

use crate::{
    AxiDownstream, AxiReadCompletion, AxiWriteCompletion, BridgeConfig, BridgeStats,
    ChannelWidener, Completion, ConfigError, Correlator, CorrelatorState, Direction, MemRequest,
    MemResponse, NullTrace, ProtocolViolation, TraceEvent, TraceSink, WidenedTransaction,
};

/// Upstream-visible result of one clock cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CycleOutcome {
    /// The presented request, if any, was admitted this cycle.
    pub granted: bool,
    /// Response delivered this cycle.
    pub response: Option<MemResponse>,
}

/// Memory-to-AXI4 bridge serving one client and one responder.
#[derive(Debug, Clone)]
pub struct Bridge {
    correlator: Correlator,
    widener: ChannelWidener,
    stats: BridgeStats,
    cycle: u64,
    tracing_enabled: bool,
}

impl Bridge {
    /// Builds a bridge from static configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for widths the bus cannot express or a zero
    /// tracking capacity.
    pub fn new(config: &BridgeConfig) -> Result<Self, ConfigError> {
        let widener = ChannelWidener::new(config)?;
        let correlator = Correlator::new(config.max_requests)?;
        debug!(
            max_requests = config.max_requests,
            data_width = config.data_width,
            mem_addr_width = config.mem_addr_width,
            axi_addr_width = config.axi_addr_width,
            "bridge configured"
        );

        Ok(Self {
            correlator,
            widener,
            stats: BridgeStats::default(),
            cycle: 0,
            tracing_enabled: config.tracing_enabled,
        })
    }

    /// Tracking state.
    #[must_use]
    pub const fn correlator(&self) -> &Correlator {
        &self.correlator
    }

    /// Field mapper.
    #[must_use]
    pub const fn widener(&self) -> &ChannelWidener {
        &self.widener
    }

    /// Activity counters.
    #[must_use]
    pub const fn stats(&self) -> &BridgeStats {
        &self.stats
    }

    /// Number of clock edges advanced by [`Bridge::cycle`].
    #[must_use]
    pub const fn cycle_count(&self) -> u64 {
        self.cycle
    }

    /// Number of outstanding transactions.
    #[must_use]
    pub const fn outstanding(&self) -> usize {
        self.correlator.outstanding()
    }

    /// Latched protocol violation, if any.
    #[must_use]
    pub const fn latched_fault(&self) -> Option<ProtocolViolation> {
        self.correlator.latched_fault()
    }

    /// Advances one clock cycle without trace dispatch.
    ///
    /// # Errors
    ///
    /// See [`Bridge::cycle_traced`].
    pub fn cycle(
        &mut self,
        request: Option<&MemRequest>,
        downstream: &mut dyn AxiDownstream,
    ) -> Result<CycleOutcome, ProtocolViolation> {
        self.cycle_traced(request, downstream, &mut NullTrace)
    }

    /// Advances one clock cycle.
    ///
    /// Grant and completion readiness are both decided from the state at the
    /// start of the cycle: a request admitted this cycle cannot complete in the
    /// same cycle, and a completion consumed this cycle does not free capacity
    /// until the next one. At most one completion is pulled, and only from the
    /// path the oldest outstanding transaction expects; a completion waiting on
    /// the other path stays with the responder.
    ///
    /// # Errors
    ///
    /// Returns the latched [`ProtocolViolation`] when a previous direct
    /// completion tripped the protocol check. Nothing is advanced in that case.
    pub fn cycle_traced(
        &mut self,
        request: Option<&MemRequest>,
        downstream: &mut dyn AxiDownstream,
        sink: &mut dyn TraceSink,
    ) -> Result<CycleOutcome, ProtocolViolation> {
        if let Some(violation) = self.correlator.latched_fault() {
            return Err(violation);
        }

        let expecting = self.correlator.state();
        let granted = request.is_some_and(|request| self.admit(request, downstream, sink));

        let response = match expecting {
            CorrelatorState::Awaiting(Direction::Read) => match downstream.take_read_completion()
            {
                Some(r) => Some(self.accept_read_completion_traced(&r, sink)?),
                None => None,
            },
            CorrelatorState::Awaiting(Direction::Write) => {
                match downstream.take_write_completion() {
                    Some(b) => Some(self.accept_write_completion_traced(&b, sink)?),
                    None => None,
                }
            }
            CorrelatorState::Idle | CorrelatorState::Faulted(_) => None,
        };

        downstream.clock();
        self.cycle += 1;
        self.stats.cycles += 1;

        Ok(CycleOutcome { granted, response })
    }

    /// Presents a request for admission outside the cycle driver.
    ///
    /// # Errors
    ///
    /// Returns the latched [`ProtocolViolation`], if any.
    pub fn submit(
        &mut self,
        request: &MemRequest,
        downstream: &mut dyn AxiDownstream,
    ) -> Result<bool, ProtocolViolation> {
        if let Some(violation) = self.correlator.latched_fault() {
            return Err(violation);
        }
        Ok(self.admit(request, downstream, &mut NullTrace))
    }

    /// Forwards an `R` beat to the correlator.
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolViolation`] when no read is the oldest outstanding
    /// transaction.
    pub fn accept_read_completion(
        &mut self,
        r: &AxiReadCompletion,
    ) -> Result<MemResponse, ProtocolViolation> {
        self.accept_read_completion_traced(r, &mut NullTrace)
    }

    /// Forwards a `B` beat to the correlator.
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolViolation`] when no write is the oldest outstanding
    /// transaction.
    pub fn accept_write_completion(
        &mut self,
        b: &AxiWriteCompletion,
    ) -> Result<MemResponse, ProtocolViolation> {
        self.accept_write_completion_traced(b, &mut NullTrace)
    }

    /// Clears outstanding tracking and the fault latch. Counters keep running.
    ///
    /// Completions the responder still holds for dropped transactions would
    /// be unmatched; reset the responder alongside.
    pub fn reset(&mut self) {
        debug!(
            cycle = self.cycle,
            dropped = self.correlator.outstanding(),
            "bridge reset"
        );
        self.correlator.reset();
    }

    fn accept_read_completion_traced(
        &mut self,
        r: &AxiReadCompletion,
        sink: &mut dyn TraceSink,
    ) -> Result<MemResponse, ProtocolViolation> {
        let completion = self.widener.narrow_read(r);
        self.resolve(completion, sink)
    }

    fn accept_write_completion_traced(
        &mut self,
        b: &AxiWriteCompletion,
        sink: &mut dyn TraceSink,
    ) -> Result<MemResponse, ProtocolViolation> {
        let completion = self.widener.narrow_write(b);
        self.resolve(completion, sink)
    }

    fn admit(
        &mut self,
        request: &MemRequest,
        downstream: &mut dyn AxiDownstream,
        sink: &mut dyn TraceSink,
    ) -> bool {
        if !self.correlator.submit(request) {
            self.stats.record_refusal();
            trace!(
                cycle = self.cycle,
                direction = ?request.direction,
                outstanding = self.correlator.outstanding(),
                "request refused"
            );
            self.emit(
                sink,
                TraceEvent::Refused {
                    cycle: self.cycle,
                    direction: request.direction,
                    outstanding: self.correlator.outstanding(),
                },
            );
            return false;
        }

        self.stats.record_grant(self.correlator.outstanding());
        trace!(
            cycle = self.cycle,
            direction = ?request.direction,
            addr = request.addr,
            "request granted"
        );
        self.emit(
            sink,
            TraceEvent::Granted {
                cycle: self.cycle,
                direction: request.direction,
                addr: request.addr,
            },
        );

        let transaction = self.widener.widen(request);
        self.emit(
            sink,
            TraceEvent::AddressIssued {
                cycle: self.cycle,
                direction: transaction.direction(),
                beat: *transaction.address_beat(),
            },
        );
        match transaction {
            WidenedTransaction::Read { ar } => downstream.issue_read(ar),
            WidenedTransaction::Write { aw, w } => downstream.issue_write(aw, w),
        }
        true
    }

    fn resolve(
        &mut self,
        completion: Completion,
        sink: &mut dyn TraceSink,
    ) -> Result<MemResponse, ProtocolViolation> {
        let already_latched = self.correlator.latched_fault().is_some();
        match self.correlator.complete(completion) {
            Ok(response) => {
                self.stats.record_response(&response);
                trace!(
                    cycle = self.cycle,
                    direction = ?response.direction,
                    error = response.error,
                    "response delivered"
                );
                self.emit(
                    sink,
                    TraceEvent::Responded {
                        cycle: self.cycle,
                        response,
                    },
                );
                Ok(response)
            }
            Err(violation) => {
                if !already_latched {
                    error!(
                        cycle = self.cycle,
                        observed = ?completion.direction(),
                        %violation,
                        "downstream protocol violation"
                    );
                    self.emit(
                        sink,
                        TraceEvent::Violation {
                            cycle: self.cycle,
                            violation,
                            observed: completion.direction(),
                        },
                    );
                }
                Err(violation)
            }
        }
    }

    fn emit(&self, sink: &mut dyn TraceSink, event: TraceEvent) {
        if self.tracing_enabled {
            sink.on_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::{Bridge, CycleOutcome};
    use crate::{
        AxiAddrBeat, AxiDownstream, AxiReadCompletion, AxiResp, AxiWriteBeat,
        AxiWriteCompletion, BridgeConfig, Direction, MemRequest, ProtocolViolation, TraceEvent,
    };

    /// Responder whose completions are queued by hand.
    #[derive(Default)]
    struct ManualResponder {
        reads: Vec<AxiAddrBeat>,
        writes: Vec<(AxiAddrBeat, AxiWriteBeat)>,
        r: VecDeque<AxiReadCompletion>,
        b: VecDeque<AxiWriteCompletion>,
        clocks: u64,
    }

    impl AxiDownstream for ManualResponder {
        fn issue_read(&mut self, ar: AxiAddrBeat) {
            self.reads.push(ar);
        }

        fn issue_write(&mut self, aw: AxiAddrBeat, w: AxiWriteBeat) {
            self.writes.push((aw, w));
        }

        fn take_read_completion(&mut self) -> Option<AxiReadCompletion> {
            self.r.pop_front()
        }

        fn take_write_completion(&mut self) -> Option<AxiWriteCompletion> {
            self.b.pop_front()
        }

        fn clock(&mut self) {
            self.clocks += 1;
        }
    }

    fn bridge(max_requests: usize) -> Bridge {
        Bridge::new(&BridgeConfig {
            max_requests,
            tracing_enabled: true,
            ..BridgeConfig::default()
        })
        .expect("valid bridge config")
    }

    fn r(data: u128) -> AxiReadCompletion {
        AxiReadCompletion {
            id: 0,
            data,
            resp: AxiResp::Okay,
            last: true,
        }
    }

    #[test]
    fn granted_requests_are_forwarded_in_the_same_cycle() {
        let mut bridge = bridge(2);
        let mut responder = ManualResponder::default();

        let outcome = bridge
            .cycle(Some(&MemRequest::write(0x10, 0xAB, 0x1)), &mut responder)
            .expect("no violation");
        assert_eq!(
            outcome,
            CycleOutcome {
                granted: true,
                response: None
            }
        );
        assert_eq!(responder.writes.len(), 1);
        assert_eq!(responder.writes[0].0.addr, 0x10);
        assert_eq!(responder.writes[0].1.data, 0xAB);
        assert_eq!(responder.clocks, 1);
        assert_eq!(bridge.cycle_count(), 1);
    }

    #[test]
    fn completion_is_not_pulled_in_the_admission_cycle() {
        let mut bridge = bridge(2);
        let mut responder = ManualResponder::default();
        responder.r.push_back(r(0x55));

        let first = bridge
            .cycle(Some(&MemRequest::read(0x0)), &mut responder)
            .expect("no violation");
        assert!(first.granted);
        assert_eq!(first.response, None);
        assert_eq!(responder.r.len(), 1);

        let second = bridge.cycle(None, &mut responder).expect("no violation");
        let response = second.response.expect("read completes on next cycle");
        assert_eq!(response.rdata, 0x55);
        assert_eq!(bridge.outstanding(), 0);
    }

    #[test]
    fn refusal_is_decided_before_same_cycle_completion_frees_space() {
        let mut bridge = bridge(1);
        let mut responder = ManualResponder::default();

        assert!(bridge
            .cycle(Some(&MemRequest::read(0x0)), &mut responder)
            .expect("no violation")
            .granted);
        responder.r.push_back(r(1));

        let outcome = bridge
            .cycle(Some(&MemRequest::read(0x4)), &mut responder)
            .expect("no violation");
        assert!(!outcome.granted);
        assert!(outcome.response.is_some());

        let retry = bridge
            .cycle(Some(&MemRequest::read(0x4)), &mut responder)
            .expect("no violation");
        assert!(retry.granted);
        assert_eq!(bridge.stats().refused, 1);
    }

    #[test]
    fn early_write_completion_waits_for_older_read() {
        let mut bridge = bridge(2);
        let mut responder = ManualResponder::default();

        bridge
            .cycle(Some(&MemRequest::read(0x0)), &mut responder)
            .expect("no violation");
        bridge
            .cycle(Some(&MemRequest::write(0x4, 7, 0xF)), &mut responder)
            .expect("no violation");
        responder.b.push_back(AxiWriteCompletion {
            id: 0,
            resp: AxiResp::Okay,
        });

        let stalled = bridge.cycle(None, &mut responder).expect("no violation");
        assert_eq!(stalled.response, None);
        assert_eq!(responder.b.len(), 1);

        responder.r.push_back(r(0x99));
        let read = bridge.cycle(None, &mut responder).expect("no violation");
        assert_eq!(
            read.response.map(|response| response.direction),
            Some(Direction::Read)
        );

        let write = bridge.cycle(None, &mut responder).expect("no violation");
        assert_eq!(
            write.response.map(|response| response.direction),
            Some(Direction::Write)
        );
        assert!(responder.b.is_empty());
    }

    #[test]
    fn direct_mismatch_latches_and_blocks_cycles() {
        let mut bridge = bridge(2);
        let mut responder = ManualResponder::default();
        bridge
            .submit(&MemRequest::read(0x0), &mut responder)
            .expect("no violation");

        let mismatch = bridge.accept_write_completion(&AxiWriteCompletion::default());
        assert_eq!(mismatch, Err(ProtocolViolation::DirectionMismatch));
        assert_eq!(
            bridge.cycle(None, &mut responder),
            Err(ProtocolViolation::DirectionMismatch)
        );
        assert_eq!(
            bridge.submit(&MemRequest::read(0x4), &mut responder),
            Err(ProtocolViolation::DirectionMismatch)
        );

        bridge.reset();
        assert_eq!(bridge.latched_fault(), None);
        assert_eq!(bridge.outstanding(), 0);
        assert_eq!(bridge.submit(&MemRequest::read(0x4), &mut responder), Ok(true));
    }

    #[test]
    fn trace_sink_sees_events_in_cycle_order() {
        let mut bridge = bridge(1);
        let mut responder = ManualResponder::default();
        let mut events: Vec<TraceEvent> = Vec::new();

        bridge
            .cycle_traced(Some(&MemRequest::read(0x8)), &mut responder, &mut events)
            .expect("no violation");
        responder.r.push_back(r(3));
        bridge
            .cycle_traced(Some(&MemRequest::read(0xC)), &mut responder, &mut events)
            .expect("no violation");

        assert!(matches!(
            events[0],
            TraceEvent::Granted {
                cycle: 0,
                direction: Direction::Read,
                addr: 0x8
            }
        ));
        assert!(matches!(
            events[1],
            TraceEvent::AddressIssued {
                cycle: 0,
                direction: Direction::Read,
                ..
            }
        ));
        assert!(matches!(
            events[2],
            TraceEvent::Refused {
                cycle: 1,
                outstanding: 1,
                ..
            }
        ));
        assert!(matches!(events[3], TraceEvent::Responded { cycle: 1, .. }));
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn trace_dispatch_is_gated_by_config() {
        let mut bridge = Bridge::new(&BridgeConfig::default()).expect("valid bridge config");
        let mut responder = ManualResponder::default();
        let mut events: Vec<TraceEvent> = Vec::new();

        bridge
            .cycle_traced(Some(&MemRequest::read(0x0)), &mut responder, &mut events)
            .expect("no violation");
        assert!(events.is_empty());
        assert_eq!(bridge.stats().granted, 1);
    }
}
