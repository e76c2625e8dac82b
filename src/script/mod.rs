//! Scripts: ordered steps of filter instructions.
//!
//! ```text
//! # comment
//! with input.jpg as output.jpg
//! brightness 20
//! hblur 5
//! done
//! ```
//!
//! A parsed [`Script`] is fully bound: every instruction already holds its
//! [`Filter`], and merge overlays are decoded. Nothing runs until the whole
//! script parsed cleanly.

pub mod parser;

pub use parser::ParseContext;

use crate::core::error::{KodamaError, ParseError};
use crate::filters::filter::Filter;
use crate::filters::registry::FilterCatalog;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// One bound filter invocation inside a step.
#[derive(Debug, Clone)]
pub struct Instruction {
    tokens: Vec<String>,
    filter: Filter,
    index: usize,
    line: usize,
}

impl Instruction {
    /// Create an instruction from its tokens and bound filter.
    pub fn new(tokens: Vec<String>, filter: Filter, index: usize, line: usize) -> Self {
        Self {
            tokens,
            filter,
            index,
            line,
        }
    }

    /// Source tokens, filter name first.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The bound filter.
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// 1-based position within the step.
    pub fn index(&self) -> usize {
        self.index
    }

    /// 1-based script line.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The instruction as written, tokens joined by single spaces.
    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Input path, output path and the instructions applied between them.
#[derive(Debug, Clone)]
pub struct Step {
    input: PathBuf,
    output: PathBuf,
    instructions: Vec<Instruction>,
    index: usize,
    line: usize,
}

impl Step {
    /// Create an empty step.
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        index: usize,
        line: usize,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            instructions: Vec::new(),
            index,
            line,
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// 1-based position within the script.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Line of the `with` header.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Append an instruction.
    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }
}

/// A parsed, fully bound script.
#[derive(Debug, Clone, Default)]
pub struct Script {
    steps: Vec<Step>,
}

impl Script {
    /// Build a script from already parsed steps.
    pub fn from_steps(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Parse a script read line by line from `reader`.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD, so they only
    /// matter when the line they sit on is not a comment.
    pub fn parse<R: BufRead>(
        mut reader: R,
        catalog: &FilterCatalog,
    ) -> Result<Self, KodamaError> {
        let mut context = ParseContext::new(catalog);
        let mut raw = Vec::new();
        loop {
            raw.clear();
            if reader.read_until(b'\n', &mut raw)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&raw);
            context.feed(line.trim_end_matches(|c: char| c == '\n' || c == '\r'))?;
        }
        Ok(context.finish())
    }

    /// Parse a script held in memory.
    pub fn parse_str(source: &str, catalog: &FilterCatalog) -> Result<Self, ParseError> {
        let mut context = ParseContext::new(catalog);
        for line in source.lines() {
            context.feed(line)?;
        }
        Ok(context.finish())
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Total instructions across every step.
    pub fn instruction_count(&self) -> usize {
        self.steps.iter().map(|s| s.instructions.len()).sum()
    }
}
