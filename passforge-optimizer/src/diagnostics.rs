//! Diagnostic output channel for passes
//!
//! Passes print their results as lines of text on one of two streams, "out"
//! and "err". Each stream is either the matching process stream or an
//! in-memory buffer, so the same pass code runs from the CLI and from tests.

use passforge_core::Result;
use std::fmt::Display;
use std::io::{self, Write};

/// Destination of one diagnostic stream
#[derive(Debug)]
pub enum Sink {
    Stdout,
    Stderr,
    Buffer(Vec<u8>),
}

impl Sink {
    fn write_line(&mut self, line: &dyn Display) -> io::Result<()> {
        match self {
            Sink::Stdout => writeln!(io::stdout().lock(), "{}", line),
            Sink::Stderr => writeln!(io::stderr().lock(), "{}", line),
            Sink::Buffer(buf) => writeln!(buf, "{}", line),
        }
    }

    fn text(&self) -> String {
        match self {
            Sink::Buffer(buf) => String::from_utf8_lossy(buf).into_owned(),
            _ => String::new(),
        }
    }
}

/// Pair of diagnostic streams handed to every pass
#[derive(Debug)]
pub struct Diagnostics {
    out: Sink,
    err: Sink,
}

impl Diagnostics {
    /// Write to the process's stdout and stderr
    pub fn stdio() -> Self {
        Self {
            out: Sink::Stdout,
            err: Sink::Stderr,
        }
    }

    /// Capture both streams in memory
    pub fn captured() -> Self {
        Self {
            out: Sink::Buffer(Vec::new()),
            err: Sink::Buffer(Vec::new()),
        }
    }

    /// Write one line to the out stream
    pub fn out(&mut self, line: impl Display) -> Result<()> {
        self.out.write_line(&line)?;
        Ok(())
    }

    /// Write one line to the err stream
    pub fn err(&mut self, line: impl Display) -> Result<()> {
        self.err.write_line(&line)?;
        Ok(())
    }

    /// Captured out text. Empty when writing to a process stream.
    pub fn out_text(&self) -> String {
        self.out.text()
    }

    /// Captured err text. Empty when writing to a process stream.
    pub fn err_text(&self) -> String {
        self.err.text()
    }

    /// Captured err lines
    pub fn err_lines(&self) -> Vec<String> {
        self.err_text().lines().map(str::to_string).collect()
    }

    /// Captured out lines
    pub fn out_lines(&self) -> Vec<String> {
        self.out_text().lines().map(str::to_string).collect()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::stdio()
    }
}

/// Escape a symbol name for printing.
///
/// Printable ASCII is kept; backslash, quote, tab and newline get C escapes
/// and every other byte becomes a three-digit octal escape.
pub fn escape_name(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for &byte in name.as_bytes() {
        match byte {
            b'\\' => escaped.push_str("\\\\"),
            b'\t' => escaped.push_str("\\t"),
            b'\n' => escaped.push_str("\\n"),
            b'"' => escaped.push_str("\\\""),
            0x20..=0x7e => escaped.push(byte as char),
            _ => {
                escaped.push('\\');
                escaped.push(char::from(b'0' + ((byte >> 6) & 7)));
                escaped.push(char::from(b'0' + ((byte >> 3) & 7)));
                escaped.push(char::from(b'0' + (byte & 7)));
            }
        }
    }
    escaped
}

#[cfg(test)]
#[path = "diagnostics_tests.rs"]
mod diagnostics_tests;
