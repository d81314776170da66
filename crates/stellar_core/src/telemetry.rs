//! Telemetry collaborator handed to engines.
//!
//! Engines never log through ambient global state; they call
//! [`Telemetry::record`] on whatever sink the caller injected.

use std::fmt::Write as _;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

pub trait Telemetry: Send + Sync {
    fn record(&self, severity: Severity, message: &str, context: &[(&str, String)]);
}

/// Forwards records to `tracing`, tagged with a component name
#[derive(Debug, Clone)]
pub struct TracingTelemetry {
    component: &'static str,
}

impl TracingTelemetry {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }
}

impl Default for TracingTelemetry {
    fn default() -> Self {
        Self::new("engine")
    }
}

fn format_context(context: &[(&str, String)]) -> String {
    let mut out = String::new();
    for (i, (key, value)) in context.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{key}={value}");
    }
    out
}

impl Telemetry for TracingTelemetry {
    fn record(&self, severity: Severity, message: &str, context: &[(&str, String)]) {
        let ctx = format_context(context);
        let component = self.component;
        match severity {
            Severity::Debug => tracing::debug!(component, context = %ctx, "{message}"),
            Severity::Info => tracing::info!(component, context = %ctx, "{message}"),
            Severity::Warning => tracing::warn!(component, context = %ctx, "{message}"),
            Severity::Error | Severity::Critical => {
                let critical = severity == Severity::Critical;
                tracing::error!(component, critical, context = %ctx, "{message}")
            }
        }
    }
}

/// One recorded event
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub severity: Severity,
    pub message: String,
    pub context: Vec<(String, String)>,
}

impl Record {
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Keeps every record in memory; used to inspect engine behaviour in tests
#[derive(Debug, Default)]
pub struct MemoryTelemetry {
    records: Mutex<Vec<Record>>,
}

impl MemoryTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<Record> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.severity == severity)
            .count()
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Telemetry for MemoryTelemetry {
    fn record(&self, severity: Severity, message: &str, context: &[(&str, String)]) {
        let record = Record {
            severity,
            message: message.to_string(),
            context: context
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        };
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}
