//! Parser for `node.toml`
//!
//! A minimal, allocation-free parser for the subset of TOML the node
//! configuration uses. It does NOT support the full TOML grammar.
//!
//! Supported features:
//! - `[section]` headers
//! - `key = value` pairs (integer, float, boolean, quoted string)
//! - Decimal and `0x` hexadecimal integers, `_` digit separators
//! - Comments (`# ...`), also after a value
//!
//! Sections: `[node]`, `[source]`, `[simulation]`, `[scheduler]`, `[sensor]`.
//! Missing keys keep their defaults; `[source]` must enable exactly one of
//! `simulated` / `hardware`.

use super::types::{
    BoundaryPolicy, ConfigError, NodeConfig, ParseError, ParseErrorKind, SourceSelection,
};
use crate::publish::EndpointId;

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Node,
    Source,
    Simulation,
    Scheduler,
    Sensor,
}

/// Parse and validate a node configuration
pub fn parse_config(input: &str) -> Result<NodeConfig, ConfigError> {
    let mut config = NodeConfig::default();
    let mut selection = SourceSelection::default();
    let mut section = Section::Root;

    for (index, raw) in input.lines().enumerate() {
        let line_no = index as u32 + 1;
        let fail = |kind| ParseError {
            line: line_no,
            kind,
        };

        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') {
            if !line.ends_with(']') {
                return Err(fail(ParseErrorKind::InvalidSection).into());
            }
            section = parse_section_header(line[1..line.len() - 1].trim())
                .ok_or(fail(ParseErrorKind::InvalidSection))?;
            continue;
        }

        let (key, value) = line
            .split_once('=')
            .map(|(k, v)| (k.trim(), v.trim()))
            .ok_or(fail(ParseErrorKind::InvalidLine))?;
        if key.is_empty() || value.is_empty() {
            return Err(fail(ParseErrorKind::InvalidLine).into());
        }

        apply_key(&mut config, &mut selection, section, key, value).map_err(fail)?;
    }

    config.source = selection.resolve()?;
    config.validate()?;
    Ok(config)
}

/// Apply one `key = value` pair to the configuration being built
fn apply_key(
    config: &mut NodeConfig,
    selection: &mut SourceSelection,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ParseErrorKind> {
    use ParseErrorKind::{InvalidValue, UnknownKey};

    match (section, key) {
        (Section::Node, "endpoint") => {
            config.endpoint = EndpointId(parse_int(value).and_then(narrow).ok_or(InvalidValue)?);
        }

        (Section::Source, "simulated") => selection.simulated = parse_bool(value)?,
        (Section::Source, "hardware") => selection.hardware = parse_bool(value)?,

        (Section::Simulation, "policy") => {
            config.simulation.policy = match parse_string(value)? {
                "saturate" => BoundaryPolicy::Saturate,
                "wrap" => BoundaryPolicy::Wrap,
                _ => return Err(InvalidValue),
            };
        }
        (Section::Simulation, "temperature") => {
            config.simulation.initial_temperature_c = parse_float(value)?;
        }
        (Section::Simulation, "humidity") => {
            config.simulation.initial_humidity_rh = parse_float(value)?;
        }
        (Section::Simulation, "temperature_step") => {
            config.simulation.temperature_step = parse_float(value)?;
        }
        (Section::Simulation, "humidity_step") => {
            config.simulation.humidity_step = parse_float(value)?;
        }
        (Section::Simulation, "seed") => {
            config.simulation.seed = parse_int(value).and_then(narrow).ok_or(InvalidValue)?;
        }

        (Section::Scheduler, "startup_grace_ms") => {
            config.scheduler.startup_grace_ms =
                parse_int(value).and_then(narrow).ok_or(InvalidValue)?;
        }
        (Section::Scheduler, "period_ms") => {
            config.scheduler.period_ms = parse_int(value).and_then(narrow).ok_or(InvalidValue)?;
        }
        (Section::Scheduler, "degraded_after") => {
            // 0 disables the health signal
            let n: u16 = parse_int(value).and_then(narrow).ok_or(InvalidValue)?;
            config.scheduler.degraded_after = if n == 0 { None } else { Some(n) };
        }

        (Section::Sensor, "i2c_address") => {
            config.sensor.i2c_address = parse_int(value).and_then(narrow).ok_or(InvalidValue)?;
        }

        _ => return Err(UnknownKey),
    }

    Ok(())
}

/// Parse the text between `[` and `]`
fn parse_section_header(name: &str) -> Option<Section> {
    match name {
        "node" => Some(Section::Node),
        "source" => Some(Section::Source),
        "simulation" => Some(Section::Simulation),
        "scheduler" => Some(Section::Scheduler),
        "sensor" => Some(Section::Sensor),
        _ => None,
    }
}

/// Remove a trailing `# comment`, ignoring `#` inside quoted strings
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Parse a decimal or `0x` hexadecimal integer
fn parse_int(value: &str) -> Option<i64> {
    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };

    let (radix, digits) = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => (16, hex),
        None => (10, digits),
    };

    if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') {
        return None;
    }

    let mut acc: i64 = 0;
    for c in digits.chars().filter(|&c| c != '_') {
        let d = c.to_digit(radix)? as i64;
        acc = acc.checked_mul(radix as i64)?.checked_add(d)?;
    }

    Some(if negative { -acc } else { acc })
}

/// Narrow a parsed integer to the field's type
fn narrow<T: TryFrom<i64>>(value: i64) -> Option<T> {
    T::try_from(value).ok()
}

fn parse_float(value: &str) -> Result<f64, ParseErrorKind> {
    if value.contains('_') {
        return Err(ParseErrorKind::InvalidValue);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(ParseErrorKind::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ParseErrorKind> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseErrorKind::InvalidValue),
    }
}

fn parse_string(value: &str) -> Result<&str, ParseErrorKind> {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ParseErrorKind::InvalidValue)
}
