//! Warning/critical threshold ranges in monitoring plugin syntax.
//!
//! | spec    | alerts when          |
//! |---------|----------------------|
//! | (empty) | never                |
//! | `N`     | value < 0 or > N     |
//! | `N:`    | value < N            |
//! | `:N`    | value > N            |
//! | `N:M`   | value < N or > M     |
//! | `@...`  | value inside instead |
//!
//! `~` is accepted as an explicitly open lower bound (`~:N`).

use std::fmt;

use crate::error::{CheckError, Result};
use crate::types::Verdict;

/// A parsed range. `None` bounds are open.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThresholdRange {
    lower: Option<f64>,
    upper: Option<f64>,
    invert: bool,
}

impl ThresholdRange {
    /// Parse a range specification, failing with `InvalidRangeSpec`.
    pub fn parse(spec: &str) -> Result<Self> {
        let invalid = |reason: &str| CheckError::InvalidRangeSpec {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = spec.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        let (invert, body) = match trimmed.strip_prefix('@') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (lower, upper) = match body.split_once(':') {
            Some((start, end)) => {
                let lower = match start.trim() {
                    "" | "~" => None,
                    value => Some(parse_bound(value).map_err(|r| invalid(&r))?),
                };
                let upper = match end.trim() {
                    "" => None,
                    value => Some(parse_bound(value).map_err(|r| invalid(&r))?),
                };
                (lower, upper)
            }
            None if body.trim().is_empty() => return Err(invalid("missing bounds")),
            None => (Some(0.0), Some(parse_bound(body.trim()).map_err(|r| invalid(&r))?)),
        };

        if let (Some(l), Some(u)) = (lower, upper) {
            if l > u {
                return Err(invalid("start is greater than end"));
            }
        }
        if invert && lower.is_none() && upper.is_none() {
            return Err(invalid("inverted range without bounds"));
        }

        Ok(Self {
            lower,
            upper,
            invert,
        })
    }

    /// Whether `value` breaches this range.
    pub fn alerts(&self, value: f64) -> bool {
        let below = self.lower.is_some_and(|l| value < l);
        let above = self.upper.is_some_and(|u| value > u);
        let outside = below || above;
        if self.invert { !outside } else { outside }
    }

    /// Hint appended to the message of a breaching metric.
    pub fn violation(&self) -> String {
        if self.invert {
            format!("inside range {}", self)
        } else {
            format!("outside range {}", self)
        }
    }
}

impl fmt::Display for ThresholdRange {
    /// Re-render the range. Open sides stay open.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.invert {
            write!(f, "@")?;
        }
        match (self.lower, self.upper) {
            (None, None) if self.invert => write!(f, ":"),
            (None, None) => Ok(()),
            (Some(l), Some(u)) if l == 0.0 => write!(f, "{}", u),
            (Some(l), Some(u)) => write!(f, "{}:{}", l, u),
            (Some(l), None) => write!(f, "{}:", l),
            (None, Some(u)) => write!(f, ":{}", u),
        }
    }
}

fn parse_bound(value: &str) -> std::result::Result<f64, String> {
    let bound: f64 = value
        .parse()
        .map_err(|_| format!("\"{}\" is not a number", value))?;
    if !bound.is_finite() {
        return Err(format!("\"{}\" is not a finite number", value));
    }
    Ok(bound)
}

/// Parse a range specification.
pub fn parse_range(spec: &str) -> Result<ThresholdRange> {
    ThresholdRange::parse(spec)
}

/// Classify a value. Critical is checked first and dominates Warning.
pub fn classify(value: f64, warning: &ThresholdRange, critical: &ThresholdRange) -> Verdict {
    if critical.alerts(value) {
        Verdict::Critical
    } else if warning.alerts(value) {
        Verdict::Warning
    } else {
        Verdict::Ok
    }
}

/// Warning and critical ranges of one check.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Thresholds {
    pub warning: ThresholdRange,
    pub critical: ThresholdRange,
}

impl Thresholds {
    pub fn parse(warning: &str, critical: &str) -> Result<Self> {
        Ok(Self {
            warning: parse_range(warning)?,
            critical: parse_range(critical)?,
        })
    }

    pub fn classify(&self, value: f64) -> Verdict {
        classify(value, &self.warning, &self.critical)
    }

    /// The range responsible for `verdict`, if any.
    pub fn breached(&self, verdict: Verdict) -> Option<&ThresholdRange> {
        match verdict {
            Verdict::Warning => Some(&self.warning),
            Verdict::Critical => Some(&self.critical),
            Verdict::Ok | Verdict::Unknown => None,
        }
    }
}
