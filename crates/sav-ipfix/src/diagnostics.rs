//! Diagnostic events raised while decoding.
//!
//! Conditions that do not fail a decode (empty lists, trailing bytes in
//! lenient mode, match-count mismatches) are reported through a
//! [`DiagnosticSink`] owned by the caller. [`TracingSink`] forwards them to
//! `tracing`; [`CollectingSink`] keeps them for inspection.

use crate::template::{SavTemplate, Semantic};
use parking_lot::Mutex;
use std::fmt;
use tracing::Level;

/// A non-fatal decoding event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// List content was present but shorter than one record. Sent in place
    /// of [`Diagnostic::ListDecoded`].
    EmptyList {
        template: SavTemplate,
        content_len: usize,
    },

    /// Bytes left over after the last whole record.
    TrailingBytes {
        template: SavTemplate,
        remainder: usize,
        record_size: usize,
        decoded: usize,
    },

    /// A list was decoded.
    ListDecoded {
        semantic: Semantic,
        template: SavTemplate,
        count: usize,
    },

    /// Declared savMatchCount differs from the number of decoded rules.
    MatchCountMismatch { declared: u8, decoded: usize },
}

impl Diagnostic {
    /// Severity of the event.
    pub const fn level(&self) -> Level {
        match self {
            Diagnostic::EmptyList { .. } => Level::INFO,
            Diagnostic::TrailingBytes { .. } => Level::WARN,
            Diagnostic::ListDecoded { .. } => Level::DEBUG,
            Diagnostic::MatchCountMismatch { .. } => Level::WARN,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::EmptyList {
                template,
                content_len,
            } => write!(
                f,
                "no SAV rules in subTemplateList (template {}, {} content bytes)",
                template, content_len
            ),
            Diagnostic::TrailingBytes {
                template,
                remainder,
                record_size,
                decoded,
            } => write!(
                f,
                "{} trailing bytes after {} records of {} bytes (template {})",
                remainder, decoded, record_size, template
            ),
            Diagnostic::ListDecoded {
                semantic,
                template,
                count,
            } => write!(
                f,
                "parsed {} rules (semantic={}, tpl_id={})",
                count, semantic, template
            ),
            Diagnostic::MatchCountMismatch { declared, decoded } => write!(
                f,
                "savMatchCount {} does not match {} decoded rules",
                declared, decoded
            ),
        }
    }
}

/// Receiver for decoding diagnostics.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&Diagnostic) + Send + Sync,
{
    fn report(&self, diagnostic: &Diagnostic) {
        self(diagnostic)
    }
}

/// Forwards diagnostics to `tracing` at their own level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        let level = diagnostic.level();
        if level == Level::WARN {
            tracing::warn!(diagnostic = %diagnostic, "SAV decode");
        } else if level == Level::INFO {
            tracing::info!(diagnostic = %diagnostic, "SAV decode");
        } else {
            tracing::debug!(diagnostic = %diagnostic, "SAV decode");
        }
    }
}

/// Drops every diagnostic.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&self, _diagnostic: &Diagnostic) {}
}

/// Records diagnostics in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded diagnostics.
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events.lock().clone()
    }

    /// Removes and returns the recorded diagnostics.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Number of recorded diagnostics at `level` or more severe.
    pub fn count_at_least(&self, level: Level) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|d| d.level() <= level)
            .count()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        self.events.lock().push(diagnostic.clone());
    }
}
