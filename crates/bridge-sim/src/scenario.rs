//! Parsing for bridge traffic scenario files.
//!
//! One directive per line; `;` starts a comment. Literals accept decimal,
//! `0x` hex and `0b` binary, with optional `_` separators.
//!
//! ## Supported Syntax
//!
//! - `config <key>=<value> ...` sets bridge and responder parameters; only
//!   allowed before the first traffic directive.
//! - `read <addr>` presents a read until it is granted.
//! - `write <addr> <data> [mask=<m>]` presents a write until it is granted;
//!   the mask defaults to every lane.
//! - `idle <n>` runs `n` cycles with no request.
//! - `drain` runs until nothing is outstanding.
//! - `slverr <addr>` makes the responder answer that word with `SLVERR`.
//! - `expect read [data=<v>] [error=<0|1>]` and `expect write [error=<0|1>]`
//!   check the next unchecked response, waiting for it if needed.

use std::fmt;

use bridge_core::{
    AddressWindow, AxiCache, AxiProt, BridgeConfig, ConfigError, Direction, MemResponse,
    ResponderConfig,
};

/// Default cycle limit guarding against scenarios that never finish.
pub const DEFAULT_CYCLE_LIMIT: u64 = 100_000;

/// A parsed scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Bridge parameters.
    pub bridge: BridgeConfig,
    /// Responder parameters.
    pub responder: ResponderConfig,
    /// Total cycles the run may take before it is abandoned.
    pub cycle_limit: u64,
    /// Traffic directives in file order.
    pub steps: Vec<Step>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            bridge: BridgeConfig::default(),
            responder: ResponderConfig::default(),
            cycle_limit: DEFAULT_CYCLE_LIMIT,
            steps: Vec::new(),
        }
    }
}

/// One traffic directive with its source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// 1-indexed source line.
    pub line: usize,
    /// The directive.
    pub action: Action,
}

/// Traffic directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Present a read.
    Read {
        /// Upstream address.
        addr: u64,
    },
    /// Present a write.
    Write {
        /// Upstream address.
        addr: u64,
        /// Write data.
        data: u128,
        /// Byte enables, `None` for every lane.
        mask: Option<u16>,
    },
    /// Run cycles with no request.
    Idle {
        /// Cycle count.
        cycles: u64,
    },
    /// Run until nothing is outstanding.
    Drain,
    /// Inject a responder `SLVERR` at an address.
    SlaveError {
        /// Address whose bus word errors.
        addr: u64,
    },
    /// Check the next response.
    Expect(Expectation),
}

/// Expected shape of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expectation {
    /// Expected direction.
    pub direction: Direction,
    /// Expected read data, if checked.
    pub data: Option<u128>,
    /// Expected error flag.
    pub error: bool,
}

impl Expectation {
    /// Returns true when `response` satisfies the expectation.
    #[must_use]
    pub fn matches(&self, response: &MemResponse) -> bool {
        response.direction == self.direction
            && response.error == self.error
            && self.data.is_none_or(|data| data == response.rdata)
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Read => write!(f, "read")?,
            Direction::Write => write!(f, "write")?,
        }
        if let Some(data) = self.data {
            write!(f, " data={data:#x}")?;
        }
        write!(f, " error={}", u8::from(self.error))
    }
}

/// Error parsing a scenario line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {kind} (in '{text}')")]
pub struct ScenarioParseError {
    /// 1-indexed source line.
    pub line: usize,
    /// The offending text, comment stripped.
    pub text: String,
    /// What went wrong.
    pub kind: ParseErrorKind,
}

/// Reason a scenario line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    /// First word is not a directive.
    #[error("unknown directive '{0}'")]
    UnknownDirective(String),
    /// A required operand is absent.
    #[error("missing {0}")]
    MissingOperand(&'static str),
    /// Extra or unrecognized operand.
    #[error("unexpected operand '{0}'")]
    UnexpectedOperand(String),
    /// Literal did not parse or does not fit.
    #[error("invalid value '{0}'")]
    InvalidValue(String),
    /// `config` key not recognized.
    #[error("unknown config key '{0}'")]
    UnknownKey(String),
    /// `config` operand without `=`.
    #[error("expected key=value, found '{0}'")]
    ExpectedKeyValue(String),
    /// `config` after traffic has started.
    #[error("config must precede traffic directives")]
    LateConfig,
    /// Attribute value out of range.
    #[error(transparent)]
    Attribute(#[from] ConfigError),
}

/// Parses scenario text.
///
/// # Errors
///
/// Returns the first [`ScenarioParseError`] encountered.
pub fn parse_scenario(source: &str) -> Result<Scenario, ScenarioParseError> {
    let mut scenario = Scenario::default();
    let mut window_base: Option<u64> = None;
    let mut window_size: Option<u64> = None;

    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        let text = strip_comment(raw).trim();
        if text.is_empty() {
            continue;
        }

        let fail = |kind: ParseErrorKind| ScenarioParseError {
            line,
            text: text.to_string(),
            kind,
        };

        let mut words = text.split_whitespace();
        let directive = words.next().unwrap_or_default();
        let operands: Vec<&str> = words.collect();

        if directive.eq_ignore_ascii_case("config") {
            if !scenario.steps.is_empty() {
                return Err(fail(ParseErrorKind::LateConfig));
            }
            for operand in operands {
                apply_config(&mut scenario, &mut window_base, &mut window_size, operand)
                    .map_err(fail)?;
            }
            continue;
        }

        let action = parse_action(directive, &operands).map_err(fail)?;
        scenario.steps.push(Step { line, action });
    }

    scenario.responder.data_width = scenario.bridge.data_width;
    scenario.responder.window = match (window_base, window_size) {
        (None, None) => None,
        (base, size) => Some(AddressWindow {
            base: base.unwrap_or(0),
            size: size.unwrap_or(u64::MAX),
        }),
    };
    Ok(scenario)
}

fn strip_comment(line: &str) -> &str {
    line.find(';').map_or(line, |pos| &line[..pos])
}

fn apply_config(
    scenario: &mut Scenario,
    window_base: &mut Option<u64>,
    window_size: &mut Option<u64>,
    operand: &str,
) -> Result<(), ParseErrorKind> {
    let (key, value) = operand
        .split_once('=')
        .ok_or_else(|| ParseErrorKind::ExpectedKeyValue(operand.to_string()))?;
    let bridge = &mut scenario.bridge;

    match key.to_ascii_lowercase().as_str() {
        "max_requests" => bridge.max_requests = parse_number(value)?,
        "data_width" => bridge.data_width = parse_number(value)?,
        "mem_addr_width" => bridge.mem_addr_width = parse_number(value)?,
        "axi_addr_width" => bridge.axi_addr_width = parse_number(value)?,
        "prot" => bridge.prot = AxiProt::from_bits(parse_number(value)?)?,
        "aw_cache" => bridge.aw_cache = AxiCache::from_bits(parse_number(value)?)?,
        "ar_cache" => bridge.ar_cache = AxiCache::from_bits(parse_number(value)?)?,
        "read_latency" => scenario.responder.read_latency = parse_number(value)?,
        "write_latency" => scenario.responder.write_latency = parse_number(value)?,
        "window_base" => *window_base = Some(parse_number(value)?),
        "window_size" => *window_size = Some(parse_number(value)?),
        "cycle_limit" => scenario.cycle_limit = parse_number(value)?,
        _ => return Err(ParseErrorKind::UnknownKey(key.to_string())),
    }
    Ok(())
}

fn parse_action(directive: &str, operands: &[&str]) -> Result<Action, ParseErrorKind> {
    match directive.to_ascii_lowercase().as_str() {
        "read" => {
            let [addr] = exact::<1>(operands, "address")?;
            Ok(Action::Read {
                addr: parse_number(addr)?,
            })
        }
        "write" => {
            let (positional, options) = split_options(operands);
            let [addr, data] = exact::<2>(&positional, "address and data")?;
            let mut mask = None;
            for (key, value) in options {
                match key {
                    "mask" => mask = Some(parse_number(value)?),
                    _ => return Err(ParseErrorKind::UnexpectedOperand(format!("{key}={value}"))),
                }
            }
            Ok(Action::Write {
                addr: parse_number(addr)?,
                data: parse_number(data)?,
                mask,
            })
        }
        "idle" => {
            let [cycles] = exact::<1>(operands, "cycle count")?;
            Ok(Action::Idle {
                cycles: parse_number(cycles)?,
            })
        }
        "drain" => {
            exact::<0>(operands, "no operands")?;
            Ok(Action::Drain)
        }
        "slverr" => {
            let [addr] = exact::<1>(operands, "address")?;
            Ok(Action::SlaveError {
                addr: parse_number(addr)?,
            })
        }
        "expect" => parse_expectation(operands).map(Action::Expect),
        _ => Err(ParseErrorKind::UnknownDirective(directive.to_string())),
    }
}

fn parse_expectation(operands: &[&str]) -> Result<Expectation, ParseErrorKind> {
    let (positional, options) = split_options(operands);
    let [kind] = exact::<1>(&positional, "read or write")?;
    let direction = match kind.to_ascii_lowercase().as_str() {
        "read" => Direction::Read,
        "write" => Direction::Write,
        _ => return Err(ParseErrorKind::UnexpectedOperand(kind.to_string())),
    };

    let mut expectation = Expectation {
        direction,
        data: None,
        error: false,
    };
    for (key, value) in options {
        match key {
            "data" if !direction.is_write() => expectation.data = Some(parse_number(value)?),
            "error" => {
                expectation.error = match parse_number::<u8>(value)? {
                    0 => false,
                    1 => true,
                    _ => return Err(ParseErrorKind::InvalidValue(value.to_string())),
                };
            }
            _ => return Err(ParseErrorKind::UnexpectedOperand(format!("{key}={value}"))),
        }
    }
    Ok(expectation)
}

fn split_options<'a>(operands: &[&'a str]) -> (Vec<&'a str>, Vec<(&'a str, &'a str)>) {
    let mut positional = Vec::new();
    let mut options = Vec::new();
    for operand in operands {
        match operand.split_once('=') {
            Some(option) => options.push(option),
            None => positional.push(*operand),
        }
    }
    (positional, options)
}

fn exact<'a, const N: usize>(
    operands: &[&'a str],
    what: &'static str,
) -> Result<[&'a str; N], ParseErrorKind> {
    if operands.len() > N {
        return Err(ParseErrorKind::UnexpectedOperand(operands[N].to_string()));
    }
    <[&str; N]>::try_from(operands).map_err(|_| ParseErrorKind::MissingOperand(what))
}

/// Parses an unsigned literal (decimal, `0x` hex, or `0b` binary).
fn parse_number<T: TryFrom<u128>>(text: &str) -> Result<T, ParseErrorKind> {
    let invalid = || ParseErrorKind::InvalidValue(text.to_string());
    let digits = text.replace('_', "");
    if digits.is_empty() {
        return Err(invalid());
    }

    let value = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        u128::from_str_radix(hex, 16)
    } else if let Some(bin) = digits
        .strip_prefix("0b")
        .or_else(|| digits.strip_prefix("0B"))
    {
        u128::from_str_radix(bin, 2)
    } else {
        digits.parse::<u128>()
    }
    .map_err(|_| invalid())?;

    T::try_from(value).map_err(|_| invalid())
}
