//! Plugin report assembly: headline, perfdata and overall verdict.

use crate::metrics;
use crate::thresholds::Thresholds;
use crate::types::{MetricResult, ResourceMode, Verdict};

/// A metric together with its classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub result: MetricResult,
    pub verdict: Verdict,
    pub thresholds: Thresholds,
}

impl Evaluation {
    pub fn new(result: MetricResult, thresholds: Thresholds) -> Self {
        let verdict = thresholds.classify(result.value);
        Self {
            result,
            verdict,
            thresholds,
        }
    }

    /// Human readable message, with the breached range for problem states.
    pub fn message(&self) -> String {
        let template = metrics::lookup(&self.result.name)
            .map(|spec| spec.template)
            .unwrap_or("{name} is {value}{uom}");
        let message = template
            .replace("{name}", &self.result.name)
            .replace("{value}", &self.result.display_value())
            .replace("{uom}", self.result.unit());

        match self.thresholds.breached(self.verdict) {
            Some(range) => format!("{} ({})", message, range.violation()),
            None => message,
        }
    }

    /// `label=value[unit];warn;crit;min;max` without trailing empty fields.
    pub fn perfdata(&self) -> String {
        let result = &self.result;
        let mut fields = vec![
            format!(
                "{}={}{}",
                quote_label(&result.name),
                result.display_value(),
                result.unit()
            ),
            self.thresholds.warning.to_string(),
            self.thresholds.critical.to_string(),
            result.min.map(|v| v.to_string()).unwrap_or_default(),
            result.max.map(|v| v.to_string()).unwrap_or_default(),
        ];
        while fields.last().is_some_and(String::is_empty) {
            fields.pop();
        }
        fields.join(";")
    }
}

/// Final plugin output.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub verdict: Verdict,
    pub headline: String,
    pub perfdata: String,
    /// One line per metric, shown at higher verbosity
    pub details: Vec<String>,
}

impl Report {
    /// First output line: `<STATUS> - <headline> | <perfdata>`.
    pub fn status_line(&self) -> String {
        if self.perfdata.is_empty() {
            format!("{} - {}", self.verdict, self.headline)
        } else {
            format!("{} - {} | {}", self.verdict, self.headline, self.perfdata)
        }
    }

    /// Report for a run that failed before producing results.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Unknown,
            headline: message.into(),
            perfdata: String::new(),
            details: Vec::new(),
        }
    }
}

/// Combine evaluations into a report.
///
/// When several results share the worst verdict the messages are joined with
/// `", "` (OK) or `" ,"` (any other state); otherwise with a single space.
/// Downstream parsers depend on both separators.
pub fn summarize(mode: ResourceMode, resource: &str, evaluations: &[Evaluation]) -> Report {
    let Some(worst) = Verdict::worst(evaluations.iter().map(|e| e.verdict)) else {
        return Report::fatal(format!(
            "{} \"{}\" reports: no metrics collected",
            mode.title(),
            resource
        ));
    };

    let most_significant = evaluations.iter().filter(|e| e.verdict == worst).count();
    let separator = match (most_significant > 1, worst) {
        (false, _) => " ",
        (true, Verdict::Ok) => ", ",
        (true, _) => " ,",
    };

    let messages: Vec<String> = evaluations.iter().map(Evaluation::message).collect();
    let headline = format!(
        "{} \"{}\" reports: {}",
        mode.title(),
        resource,
        messages.join(separator)
    );

    let perfdata = evaluations
        .iter()
        .map(Evaluation::perfdata)
        .collect::<Vec<_>>()
        .join(" ");

    let details = evaluations
        .iter()
        .zip(&messages)
        .map(|(e, message)| format!("{}: {} - {}", e.result.name, e.verdict, message))
        .collect();

    Report {
        verdict: worst,
        headline,
        perfdata,
        details,
    }
}

fn quote_label(label: &str) -> String {
    if label.contains(|c: char| c.is_whitespace() || c == '=' || c == '\'') {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.to_string()
    }
}
