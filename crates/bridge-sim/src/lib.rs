//! Scenario-driven simulator for the memory-to-AXI4 bridge model.

use tracing_subscriber as _;

/// Scenario file parsing.
pub mod scenario;
pub use scenario::{
    parse_scenario, Action, Expectation, ParseErrorKind, Scenario, ScenarioParseError, Step,
    DEFAULT_CYCLE_LIMIT,
};

/// Cycle-driven scenario execution and reporting.
pub mod runner;
pub use runner::{
    run_scenario, ExpectationResult, ExpectationSummary, ResponseRecord, RunError, RunReport,
};

#[cfg(test)]
use tempfile as _;
