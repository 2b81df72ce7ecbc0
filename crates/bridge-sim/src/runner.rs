//! Cycle-driven execution of parsed scenarios.
//!
//! ## Execution Model
//!
//! 1. Build a bridge and a memory responder from the scenario config.
//! 2. For each directive in file order:
//!    a. `read`/`write` present the request every cycle until granted.
//!    b. `idle`/`drain` advance the clock with no request.
//!    c. `expect` compares the next unchecked response, clocking until one
//!       arrives.
//! 3. Drain whatever is still outstanding.
//! 4. Report every response with the cycle it arrived and the line that
//!    issued it, plus expectation results.

use std::collections::VecDeque;
use std::fmt;

use bridge_core::{
    Bridge, BridgeStats, ConfigError, Direction, MemRequest, MemResponse, MemoryResponder,
    ProtocolViolation,
};
use tracing::{debug, info, warn};

use crate::scenario::{Action, Expectation, Scenario, Step};

/// A response observed during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseRecord {
    /// Cycle the response was delivered in.
    pub cycle: u64,
    /// Scenario line that issued the matching request.
    pub line: usize,
    /// The response.
    pub response: MemResponse,
}

/// Outcome of one `expect` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectationResult {
    /// Scenario line of the directive.
    pub line: usize,
    /// What was expected.
    pub expectation: Expectation,
    /// Response checked against, if any arrived.
    pub actual: Option<MemResponse>,
}

impl ExpectationResult {
    /// Returns true when a response arrived and matched.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.actual
            .is_some_and(|response| self.expectation.matches(&response))
    }
}

/// Result of running a scenario to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Responses in delivery order.
    pub responses: Vec<ResponseRecord>,
    /// Expectation results in file order.
    pub expectations: Vec<ExpectationResult>,
    /// Bridge activity counters at the end of the run.
    pub stats: BridgeStats,
}

impl RunReport {
    /// Returns true if every expectation passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.expectations.iter().all(ExpectationResult::passed)
    }

    /// Returns counts for summary reporting.
    #[must_use]
    pub fn summary(&self) -> ExpectationSummary {
        let passed = self
            .expectations
            .iter()
            .filter(|result| result.passed())
            .count();
        ExpectationSummary {
            passed,
            failed: self.expectations.len() - passed,
        }
    }
}

/// Summary counts for expectation reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectationSummary {
    /// Expectations that matched.
    pub passed: usize,
    /// Expectations that did not match.
    pub failed: usize,
}

/// Fatal run error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    /// Bridge or responder parameters rejected.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// The bridge latched a protocol violation.
    #[error("line {line}: protocol violation: {violation}")]
    Violation {
        /// Scenario line being executed.
        line: usize,
        /// The latched violation.
        violation: ProtocolViolation,
    },
    /// The scenario ran past its cycle limit.
    #[error("line {line}: cycle limit of {limit} exceeded")]
    CycleLimit {
        /// Scenario line being executed.
        line: usize,
        /// Configured limit.
        limit: u64,
    },
}

/// Runs a scenario against the reference responder.
///
/// # Errors
///
/// Returns a [`RunError`] for invalid configuration, a protocol violation, or
/// a run that exceeds the scenario's cycle limit.
pub fn run_scenario(scenario: &Scenario) -> Result<RunReport, RunError> {
    let mut runner = Runner::new(scenario)?;
    for step in &scenario.steps {
        runner.execute(step)?;
    }
    let last_line = scenario.steps.last().map_or(0, |step| step.line);
    runner.drain(last_line)?;

    info!(
        cycles = runner.bridge.cycle_count(),
        responses = runner.responses.len(),
        "scenario complete"
    );
    Ok(RunReport {
        responses: runner.responses,
        expectations: runner.expectations,
        stats: *runner.bridge.stats(),
    })
}

struct Runner {
    bridge: Bridge,
    responder: MemoryResponder,
    cycle_limit: u64,
    full_mask: u16,
    issued_lines: VecDeque<usize>,
    responses: Vec<ResponseRecord>,
    checked: usize,
    expectations: Vec<ExpectationResult>,
}

impl Runner {
    fn new(scenario: &Scenario) -> Result<Self, RunError> {
        let bridge = Bridge::new(&scenario.bridge)?;
        let responder = MemoryResponder::new(&scenario.responder)?;
        let full_mask = bridge.widener().geometry().strobe_mask;
        Ok(Self {
            bridge,
            responder,
            cycle_limit: scenario.cycle_limit,
            full_mask,
            issued_lines: VecDeque::new(),
            responses: Vec::new(),
            checked: 0,
            expectations: Vec::new(),
        })
    }

    fn execute(&mut self, step: &Step) -> Result<(), RunError> {
        debug!(line = step.line, action = ?step.action, "executing step");
        match step.action {
            Action::Read { addr } => self.present(step.line, &MemRequest::read(addr)),
            Action::Write { addr, data, mask } => {
                let request = MemRequest::write(addr, data, mask.unwrap_or(self.full_mask));
                self.present(step.line, &request)
            }
            Action::Idle { cycles } => {
                for _ in 0..cycles {
                    self.tick(step.line, None)?;
                }
                Ok(())
            }
            Action::Drain => self.drain(step.line),
            Action::SlaveError { addr } => {
                self.responder.inject_slave_error(addr);
                Ok(())
            }
            Action::Expect(expectation) => self.expect(step.line, expectation),
        }
    }

    fn present(&mut self, line: usize, request: &MemRequest) -> Result<(), RunError> {
        while !self.tick(line, Some(request))? {}
        Ok(())
    }

    fn drain(&mut self, line: usize) -> Result<(), RunError> {
        while self.bridge.outstanding() > 0 {
            self.tick(line, None)?;
        }
        Ok(())
    }

    fn expect(&mut self, line: usize, expectation: Expectation) -> Result<(), RunError> {
        while self.checked >= self.responses.len() && self.bridge.outstanding() > 0 {
            self.tick(line, None)?;
        }

        let actual = self.responses.get(self.checked).map(|record| record.response);
        if actual.is_some() {
            self.checked += 1;
        }
        let result = ExpectationResult {
            line,
            expectation,
            actual,
        };
        if !result.passed() {
            warn!(line, expected = %expectation, ?actual, "expectation failed");
        }
        self.expectations.push(result);
        Ok(())
    }

    /// Advances one cycle and returns the grant.
    fn tick(&mut self, line: usize, request: Option<&MemRequest>) -> Result<bool, RunError> {
        let cycle = self.bridge.cycle_count();
        if cycle >= self.cycle_limit {
            return Err(RunError::CycleLimit {
                line,
                limit: self.cycle_limit,
            });
        }

        let outcome = self
            .bridge
            .cycle(request, &mut self.responder)
            .map_err(|violation| RunError::Violation { line, violation })?;

        if let Some(response) = outcome.response {
            let issued_by = self.issued_lines.pop_front().unwrap_or(line);
            self.responses.push(ResponseRecord {
                cycle,
                line: issued_by,
                response,
            });
        }
        if outcome.granted {
            self.issued_lines.push_back(line);
        }
        Ok(outcome.granted)
    }
}

impl fmt::Display for ResponseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let error = u8::from(self.response.error);
        match self.response.direction {
            Direction::Read => write!(
                f,
                "cycle {:>6}: read  (line {}) data={:#x} error={error}",
                self.cycle, self.line, self.response.rdata
            ),
            Direction::Write => write!(
                f,
                "cycle {:>6}: write (line {}) error={error}",
                self.cycle, self.line
            ),
        }
    }
}

impl fmt::Display for ExpectationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed() {
            return write!(f, "PASS (line {}): {}", self.line, self.expectation);
        }
        match self.actual {
            Some(response) => write!(
                f,
                "FAIL (line {}): expected {}, got {} data={:#x} error={}",
                self.line,
                self.expectation,
                match response.direction {
                    Direction::Read => "read",
                    Direction::Write => "write",
                },
                response.rdata,
                u8::from(response.error)
            ),
            None => write!(
                f,
                "FAIL (line {}): expected {}, no response left",
                self.line, self.expectation
            ),
        }
    }
}

impl fmt::Display for ExpectationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} passed, {} failed", self.passed, self.failed)
    }
}
