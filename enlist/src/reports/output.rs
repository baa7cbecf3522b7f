//! Line-oriented rendering targets for reports.

use std::io::{self, Write};

/// Which terminal stream a rendered line belongs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Target output for reports.
///
/// Reports call the semantic methods; every one of them reduces to
/// [`write_line`](Output::write_line), so a target only decides where lines go.
pub trait Output {
    fn write_line(&mut self, stream: Stream, line: &str);

    fn section(&mut self, name: &str) {
        self.write_line(Stream::Stdout, &format!("{name}:"));
    }

    fn key_value(&mut self, key: &str, value: &str) {
        self.write_line(Stream::Stdout, &format!("{key}: {value}"));
    }

    fn list_item(&mut self, text: &str) {
        self.write_line(Stream::Stdout, &format!("  - {text}"));
    }

    /// A file that was written.
    fn added_item(&mut self, text: &str) {
        self.write_line(Stream::Stdout, &format!("  + {text}"));
    }

    /// A file left untouched because it already existed.
    fn skipped_item(&mut self, text: &str) {
        self.write_line(Stream::Stdout, &format!("  = {text}"));
    }

    fn warning(&mut self, msg: &str) {
        self.write_line(Stream::Stderr, &format!("warning: {msg}"));
    }

    fn error(&mut self, msg: &str) {
        self.write_line(Stream::Stderr, msg);
    }

    fn divider(&mut self, label: &str) {
        self.write_line(Stream::Stdout, &format!("── {label} ──"));
    }

    /// Multi-line text, emitted as is.
    fn preformatted(&mut self, text: &str) {
        for line in text.lines() {
            self.write_line(Stream::Stdout, line);
        }
    }

    fn newline(&mut self) {
        self.write_line(Stream::Stdout, "");
    }
}

/// A report that can render itself to an output.
pub trait Report {
    fn render(&self, out: &mut dyn Output);
}

/// Writes to the process's stdout and stderr.
#[derive(Debug, Default)]
pub struct TerminalOutput;

impl TerminalOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Output for TerminalOutput {
    fn write_line(&mut self, stream: Stream, line: &str) {
        // A closed pipe (`enlist bake --dry-run | head`) is not worth a panic.
        let _ = match stream {
            Stream::Stdout => writeln!(io::stdout().lock(), "{line}"),
            Stream::Stderr => writeln!(io::stderr().lock(), "{line}"),
        };
    }
}

/// Collects rendered lines, from both streams, for assertions.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingOutput {
    pub lines: Vec<String>,
}

#[cfg(test)]
impl RecordingOutput {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
impl Output for RecordingOutput {
    fn write_line(&mut self, _stream: Stream, line: &str) {
        self.lines.push(line.to_string());
    }
}
