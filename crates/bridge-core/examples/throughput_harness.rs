//! Throughput harness for bridge-core.
//!
//! Drives saturating read/write traffic through a bridge and the reference
//! responder and reports simulated cycles and responses per wall-clock second.
//!
//! ## Usage
//!
//! ```sh
//! cargo run -p bridge-core --release --example throughput_harness
//! ```
//!
//! Each workload runs on several threads, one independent bridge per thread.

#![allow(clippy::pedantic)]

use bridge_core::{Bridge, BridgeConfig, MemRequest, MemoryResponder, ResponderConfig};
use parking_lot as _;
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

const NUM_THREADS: usize = 4;
const RUN_DURATION: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy)]
struct Workload {
    name: &'static str,
    max_requests: usize,
    read_latency: u64,
    write_latency: u64,
}

const WORKLOADS: [Workload; 3] = [
    Workload {
        name: "single_outstanding",
        max_requests: 1,
        read_latency: 2,
        write_latency: 2,
    },
    Workload {
        name: "pipelined_equal_latency",
        max_requests: 8,
        read_latency: 4,
        write_latency: 4,
    },
    Workload {
        name: "pipelined_slow_reads",
        max_requests: 8,
        read_latency: 12,
        write_latency: 1,
    },
];

#[derive(Debug, Clone, Copy)]
struct BenchmarkResult {
    name: &'static str,
    cycles_per_second: f64,
    responses_per_second: f64,
    responses_per_cycle: f64,
}

fn run_workload(workload: Workload, duration: Duration) -> BenchmarkResult {
    let (tx, rx) = mpsc::channel();
    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|_| {
            let tx = tx.clone();
            thread::spawn(move || {
                let Ok(mut bridge) = Bridge::new(&BridgeConfig {
                    max_requests: workload.max_requests,
                    ..BridgeConfig::default()
                }) else {
                    return;
                };
                let Ok(mut responder) = MemoryResponder::new(&ResponderConfig {
                    read_latency: workload.read_latency,
                    write_latency: workload.write_latency,
                    ..ResponderConfig::default()
                }) else {
                    return;
                };

                let mut next = 0_u64;
                let start = Instant::now();
                while start.elapsed() < duration {
                    for _ in 0..1024 {
                        let addr = (next % 256) * 4;
                        let request = if next % 3 == 0 {
                            MemRequest::write(addr, u128::from(next), 0xF)
                        } else {
                            MemRequest::read(addr)
                        };
                        match bridge.cycle(Some(&request), &mut responder) {
                            Ok(outcome) if outcome.granted => next += 1,
                            Ok(_) => {}
                            Err(_) => return,
                        }
                    }
                }
                let stats = *bridge.stats();
                tx.send((stats.cycles, stats.responses())).ok();
            })
        })
        .collect();

    for h in handles {
        h.join().ok();
    }
    drop(tx);

    let mut total_cycles = 0u64;
    let mut total_responses = 0u64;
    for (cycles, responses) in rx {
        total_cycles += cycles;
        total_responses += responses;
    }

    let elapsed_secs = duration.as_secs_f64();
    BenchmarkResult {
        name: workload.name,
        cycles_per_second: total_cycles as f64 / elapsed_secs,
        responses_per_second: total_responses as f64 / elapsed_secs,
        responses_per_cycle: if total_cycles == 0 {
            0.0
        } else {
            total_responses as f64 / total_cycles as f64
        },
    }
}

fn main() {
    println!("bridge-core throughput harness");
    println!("threads: {NUM_THREADS}, duration per workload: {RUN_DURATION:?}");
    println!();
    println!(
        "{:<26} {:>16} {:>16} {:>10}",
        "workload", "cycles/s", "responses/s", "resp/cyc"
    );

    for workload in WORKLOADS {
        let result = run_workload(workload, RUN_DURATION);
        println!(
            "{:<26} {:>16.0} {:>16.0} {:>10.3}",
            result.name,
            result.cycles_per_second,
            result.responses_per_second,
            result.responses_per_cycle
        );
    }
}
