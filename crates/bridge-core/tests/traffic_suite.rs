//! End-to-end traffic through the bridge and the reference responder.

#![allow(clippy::pedantic, clippy::nursery, clippy::cast_possible_truncation)]

use bridge_core::{
    AddressWindow, AxiBurst, AxiReadCompletion, AxiResp, Bridge, BridgeConfig, CorrelatorState,
    CycleOutcome, Direction, MemRequest, MemResponse, MemoryResponder, ProtocolViolation,
    ResponderConfig, TraceEvent,
};
use parking_lot as _;
use proptest as _;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;

fn bridge(max_requests: usize) -> Bridge {
    Bridge::new(&BridgeConfig {
        max_requests,
        ..BridgeConfig::default()
    })
    .expect("valid bridge config")
}

fn responder(read_latency: u64, write_latency: u64) -> MemoryResponder {
    MemoryResponder::new(&ResponderConfig {
        read_latency,
        write_latency,
        ..ResponderConfig::default()
    })
    .expect("valid responder config")
}

fn step(
    bridge: &mut Bridge,
    responder: &mut MemoryResponder,
    request: Option<&MemRequest>,
) -> CycleOutcome {
    bridge
        .cycle(request, responder)
        .expect("reference responder never violates the protocol")
}

fn drain(bridge: &mut Bridge, responder: &mut MemoryResponder) -> Vec<MemResponse> {
    let mut responses = Vec::new();
    for _ in 0..64 {
        if bridge.outstanding() == 0 {
            break;
        }
        responses.extend(step(bridge, responder, None).response);
    }
    assert_eq!(bridge.outstanding(), 0, "bridge failed to drain");
    responses
}

#[test]
fn two_deep_queue_holds_write_response_behind_older_read() {
    let mut bridge = bridge(2);
    let mut responder = responder(6, 0);
    responder.load(0xA0, &[0x78, 0x56, 0x34, 0x12]);

    let read_a = MemRequest::read(0xA0);
    let write_b = MemRequest::write(0xB0, 0xDEAD_BEEF, 0xF);
    let read_c = MemRequest::read(0xC0);

    assert!(step(&mut bridge, &mut responder, Some(&read_a)).granted);
    assert!(step(&mut bridge, &mut responder, Some(&write_b)).granted);
    let refused = step(&mut bridge, &mut responder, Some(&read_c));
    assert!(!refused.granted);
    assert_eq!(refused.response, None);

    // B's completion is available immediately but must wait for A.
    let mut responses = Vec::new();
    let mut c_granted = false;
    for _ in 0..16 {
        let outcome = step(
            &mut bridge,
            &mut responder,
            (!c_granted).then_some(&read_c),
        );
        c_granted |= outcome.granted;
        responses.extend(outcome.response);
        if responses.len() == 2 {
            break;
        }
    }

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].direction, Direction::Read);
    assert_eq!(responses[0].rdata, 0x1234_5678);
    assert!(!responses[0].error);
    assert_eq!(responses[1].direction, Direction::Write);
    assert_eq!(responses[1].rdata, 0);
    assert!(!responses[1].error);

    assert!(c_granted, "C is admitted once A frees a slot");
    responses.extend(drain(&mut bridge, &mut responder));
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[2].direction, Direction::Read);
    assert_eq!(responder.read_word(0xB0), 0xDEAD_BEEF);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(4)]
#[case(8)]
fn round_trip_refusal_and_regrant(#[case] max_requests: usize) {
    let mut bridge = bridge(max_requests);
    let mut responder = responder(1_000, 1_000);

    for word in 0..max_requests as u64 {
        let outcome = step(&mut bridge, &mut responder, Some(&MemRequest::read(word * 4)));
        assert!(outcome.granted);
    }
    assert_eq!(bridge.outstanding(), max_requests);

    let extra = MemRequest::read(0x100);
    assert!(!step(&mut bridge, &mut responder, Some(&extra)).granted);
    assert!(!bridge.correlator().can_admit());

    // Deliver the head completion directly, then the next submission fits.
    let response = bridge
        .accept_read_completion(&AxiReadCompletion {
            id: 0,
            data: 0x42,
            resp: AxiResp::Okay,
            last: true,
        })
        .expect("read is head");
    assert_eq!(response.rdata, 0x42);
    assert!(step(&mut bridge, &mut responder, Some(&extra)).granted);
    assert_eq!(bridge.stats().refused, 1);
}

#[test]
fn downstream_errors_pass_through_as_data() {
    let mut bridge = bridge(4);
    let mut responder = MemoryResponder::new(&ResponderConfig {
        window: Some(AddressWindow {
            base: 0,
            size: 0x1000,
        }),
        ..ResponderConfig::default()
    })
    .expect("valid responder config");
    responder.load(0x10, &[0xAA; 4]);
    responder.inject_slave_error(0x20);

    let requests = [
        MemRequest::read(0x10),
        MemRequest::read(0x20),
        MemRequest::write(0x2000, 1, 0xF),
        MemRequest::write(0x14, 0x55, 0x1),
    ];
    for request in &requests {
        assert!(step(&mut bridge, &mut responder, Some(request)).granted);
    }
    let responses = drain(&mut bridge, &mut responder);

    let flags: Vec<_> = responses
        .iter()
        .map(|response| (response.direction, response.error))
        .collect();
    assert_eq!(
        flags,
        [
            (Direction::Read, false),
            (Direction::Read, true),
            (Direction::Write, true),
            (Direction::Write, false),
        ]
    );
    assert_eq!(responses[0].rdata, 0xAAAA_AAAA);
    assert_eq!(responses[1].rdata, 0);
    assert_eq!(bridge.stats().error_responses, 2);
    assert_eq!(bridge.latched_fault(), None);
    assert_eq!(responder.read_bytes(0x14, 1), [0x55]);
}

#[rstest]
#[case::zero_extend(16, 32, 0x1234, 0x1234)]
#[case::truncate(64, 32, 0x0000_0001_8000_0040, 0x8000_0040)]
#[case::mem_width_limits_input(20, 40, 0xFF_FFFF, 0xF_FFFF)]
fn issued_address_is_resized_to_axi_width(
    #[case] mem_addr_width: u32,
    #[case] axi_addr_width: u32,
    #[case] addr: u64,
    #[case] expected: u64,
) {
    let mut bridge = Bridge::new(&BridgeConfig {
        mem_addr_width,
        axi_addr_width,
        ..BridgeConfig::default()
    })
    .expect("valid bridge config");
    let mut responder = responder(0, 0);

    step(&mut bridge, &mut responder, Some(&MemRequest::read(addr)));
    step(
        &mut bridge,
        &mut responder,
        Some(&MemRequest::write(addr, 0, 0)),
    );

    let log = responder.issued();
    assert_eq!(log.len(), 2);
    for issued in log {
        assert_eq!(issued.beat.addr, expected);
        assert_eq!(issued.beat.len, 0);
        assert_eq!(issued.beat.burst, AxiBurst::Fixed);
        assert_eq!(issued.beat.size, 2);
    }
    assert_eq!(log[0].direction, Direction::Read);
    assert_eq!(log[1].direction, Direction::Write);
}

#[test]
fn wide_bus_carries_full_word_and_strobes() {
    let mut bridge = Bridge::new(&BridgeConfig {
        data_width: 128,
        axi_addr_width: 64,
        ..BridgeConfig::default()
    })
    .expect("valid bridge config");
    let mut responder = MemoryResponder::new(&ResponderConfig {
        data_width: 128,
        ..ResponderConfig::default()
    })
    .expect("valid responder config");

    let word = 0x0011_2233_4455_6677_8899_AABB_CCDD_EEFF_u128;
    step(
        &mut bridge,
        &mut responder,
        Some(&MemRequest::write(0x40, word, 0xFFFF)),
    );
    step(&mut bridge, &mut responder, Some(&MemRequest::read(0x40)));
    let responses = drain(&mut bridge, &mut responder);

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[1].rdata, word);
    assert_eq!(responder.issued()[0].beat.size, 4);
}

#[test]
fn violation_through_direct_intake_halts_the_cycle_driver() {
    let mut bridge = Bridge::new(&BridgeConfig {
        tracing_enabled: true,
        ..BridgeConfig::default()
    })
    .expect("valid bridge config");
    let mut responder = responder(10, 10);
    let mut events: Vec<TraceEvent> = Vec::new();

    bridge
        .cycle_traced(
            Some(&MemRequest::write(0x0, 1, 0x1)),
            &mut responder,
            &mut events,
        )
        .expect("no violation yet");

    let result = bridge.accept_read_completion(&AxiReadCompletion::default());
    assert_eq!(result, Err(ProtocolViolation::DirectionMismatch));
    assert_eq!(
        bridge.correlator().state(),
        CorrelatorState::Faulted(ProtocolViolation::DirectionMismatch)
    );
    assert_eq!(
        bridge.cycle_traced(None, &mut responder, &mut events),
        Err(ProtocolViolation::DirectionMismatch)
    );
    assert_eq!(bridge.cycle_count(), 1);
}

#[test]
fn completion_with_nothing_outstanding_is_unmatched() {
    let mut bridge = bridge(2);
    assert_eq!(
        bridge.accept_write_completion(&Default::default()),
        Err(ProtocolViolation::UnmatchedCompletion)
    );
    assert_eq!(ProtocolViolation::UnmatchedCompletion.code(), 0x01);
}
