//! DIMACS CNF output.
//!
//! Layout
//! ```text
//! c generator: circle
//! c k: <arity>
//! c w: <width>
//! p cnf <n> <m>
//! <lit> ... <lit> 0
//! ```
//! Clauses are appended one line at a time in the order they are produced.
//! Buffering across lines is left to the sink (wrap it in a `BufWriter`).

use crate::sampler::Literal;
use std::fmt::Write as _;
use std::io::{self, Write};

/// Name recorded in the `c generator:` comment.
pub const GENERATOR_NAME: &str = "circle";

/// Header fields of one instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Header {
    pub variables: usize,
    pub clauses: usize,
    pub arity: usize,
    pub width: f64,
}

pub struct DimacsWriter<W: Write> {
    sink: W,
    line: String,
    written: usize,
}

impl<W: Write> DimacsWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            line: String::new(),
            written: 0,
        }
    }

    pub fn write_header(&mut self, h: &Header) -> io::Result<()> {
        writeln!(self.sink, "c generator: {GENERATOR_NAME}")?;
        writeln!(self.sink, "c k: {}", h.arity)?;
        writeln!(self.sink, "c w: {}", h.width)?;
        writeln!(self.sink, "p cnf {} {}", h.variables, h.clauses)
    }

    /// One clause line: literals separated by spaces, then ` 0`.
    pub fn write_clause(&mut self, literals: &[Literal]) -> io::Result<()> {
        self.line.clear();
        for lit in literals {
            // Writing into a String cannot fail.
            let _ = write!(self.line, "{lit} ");
        }
        self.line.push_str("0\n");
        self.sink.write_all(self.line.as_bytes())?;
        self.written += 1;
        Ok(())
    }

    /// Clause lines written so far.
    pub fn clauses_written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lines() {
        let mut w = DimacsWriter::new(Vec::new());
        w.write_header(&Header {
            variables: 10,
            clauses: 3,
            arity: 5,
            width: 0.25,
        })
        .unwrap();
        let text = String::from_utf8(w.into_inner()).unwrap();
        assert_eq!(text, "c generator: circle\nc k: 5\nc w: 0.25\np cnf 10 3\n");
    }

    #[test]
    fn clause_lines_are_zero_terminated() {
        let mut w = DimacsWriter::new(Vec::new());
        w.write_clause(&[3, -1, 7]).unwrap();
        w.write_clause(&[-2]).unwrap();
        assert_eq!(w.clauses_written(), 2);
        let text = String::from_utf8(w.into_inner()).unwrap();
        assert_eq!(text, "3 -1 7 0\n-2 0\n");
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sink_errors_propagate() {
        let mut w = DimacsWriter::new(Broken);
        let err = w.write_clause(&[1, 2]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(w.clauses_written(), 0);
    }
}
