//! Injected diagnostic sink for the soft-failure modes of §7: stale
//! registry nodes are *not* logged (that path is an ordinary,
//! expected occurrence — see `registry::Registry::sweep`), but an
//! unknown phase ID in dispatch, a PRNG sanity-check trip, or a
//! chemistry non-convergence all go through here.
//!
//! The default sink forwards to the `log` facade, so a binary that
//! installs `env_logger` (or any other `log` backend) sees these for
//! free. Tests install [`CollectingSink`] instead so assertions don't
//! depend on a process-wide logger being initialized.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warn,
    Error,
}

/// Receives soft-failure diagnostics emitted by the hydration core.
pub trait Sink: fmt::Debug {
    fn emit(&mut self, severity: Severity, message: &str);
}

/// Forwards to the `log` crate. This is what `SimulationContext`
/// installs by default.
#[derive(Debug, Default)]
pub struct LogSink;

impl Sink for LogSink {
    fn emit(&mut self, severity: Severity, message: &str) {
        match severity {
            Severity::Warn => log::warn!("{message}"),
            Severity::Error => log::error!("{message}"),
        }
    }
}

/// Collects diagnostics in memory. Used by tests and by callers that
/// want to surface diagnostics through their own reporting path
/// instead of `log`.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub messages: Vec<(Severity, String)>,
}

impl Sink for CollectingSink {
    fn emit(&mut self, severity: Severity, message: &str) {
        self.messages.push((severity, message.to_string()));
    }
}

impl CollectingSink {
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .filter(|(s, _)| *s == Severity::Warn)
            .map(|(_, m)| m.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_sink_records_messages() {
        let mut sink = CollectingSink::default();
        sink.emit(Severity::Warn, "unknown phase id 200 in dispatch");
        sink.emit(Severity::Error, "chemistry did not converge");
        assert_eq!(sink.messages.len(), 2);
        assert_eq!(sink.warnings().count(), 1);
    }
}
