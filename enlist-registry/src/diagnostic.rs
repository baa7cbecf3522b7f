//! Failures collected while walking the register and generate phases.

use std::fmt;

/// A failure tied to a kind and, when known, to one entry.
///
/// Walks never stop at the first `Diagnostic`; they collect them and hand them
/// back to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// `"register"` or `"generate"`.
    pub phase: &'static str,
    /// Name of the object kind or generator kind involved.
    pub kind: String,
    /// Id or name of the entry involved.
    pub entry: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn error(phase: &'static str, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            phase,
            kind: kind.into(),
            entry: None,
            message: message.into(),
        }
    }

    /// Attach the entry this diagnostic is about.
    pub fn at(mut self, entry: impl Into<String>) -> Self {
        self.entry = Some(entry.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {} (kind `{}`", self.message, self.kind)?;
        match &self.entry {
            Some(entry) => write!(f, ", entry `{entry}`)"),
            None => f.write_str(")"),
        }
    }
}
