//! Line-oriented script parser.
//!
//! The grammar has two states. Outside a step only a header
//! `with <input> as <output>` is accepted; inside a step every line is an
//! instruction until a line starting with `done` closes it. Blank lines and
//! lines whose first token starts with `#` are skipped in both states.
//! Parsing is single-pass and stops at the first error.

use crate::core::error::{ParseError, ParseErrorKind};
use crate::filters::registry::FilterCatalog;
use crate::script::{Instruction, Script, Step};
use log::{debug, warn};
use std::path::PathBuf;

/// Keyword opening a step.
pub const STEP_KEYWORD: &str = "with";
/// Keyword separating a step's input from its output.
pub const OUTPUT_KEYWORD: &str = "as";
/// Keyword closing a step.
pub const DONE_KEYWORD: &str = "done";
/// Prefix marking a comment line.
pub const COMMENT_PREFIX: char = '#';

/// Where the parser is in the grammar.
#[derive(Debug)]
enum ParserState {
    /// Waiting for `with <input> as <output>`.
    ExpectStep,
    /// Collecting instructions of an open step.
    InStep(Step),
}

/// Parsing state threaded through a single pass over a script.
///
/// The context owns the line cursor and the partially built step; the
/// resulting [`Script`] carries neither.
pub struct ParseContext<'c> {
    catalog: &'c FilterCatalog,
    line: usize,
    state: ParserState,
    steps: Vec<Step>,
}

impl<'c> ParseContext<'c> {
    /// Start parsing with filters bound through `catalog`.
    pub fn new(catalog: &'c FilterCatalog) -> Self {
        Self {
            catalog,
            line: 0,
            state: ParserState::ExpectStep,
            steps: Vec::new(),
        }
    }

    /// Number of the last line fed (1-based, 0 before the first line).
    pub fn line(&self) -> usize {
        self.line
    }

    /// Consume the next line of the script.
    pub fn feed(&mut self, text: &str) -> Result<(), ParseError> {
        self.line += 1;

        let tokens: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        match tokens.first() {
            None => return Ok(()),
            Some(first) if first.starts_with(COMMENT_PREFIX) => return Ok(()),
            Some(_) => {}
        }

        let state = std::mem::replace(&mut self.state, ParserState::ExpectStep);
        let next = match state {
            ParserState::ExpectStep => ParserState::InStep(self.step_header(&tokens)?),
            ParserState::InStep(step) if tokens[0] == DONE_KEYWORD => {
                debug!(
                    "step {} closed on line {} with {} instruction(s)",
                    step.index(),
                    self.line,
                    step.instructions().len()
                );
                self.steps.push(step);
                ParserState::ExpectStep
            }
            ParserState::InStep(mut step) => match self.catalog.bind(&tokens) {
                Ok(filter) => {
                    let index = step.instructions().len() + 1;
                    step.push(Instruction::new(tokens, filter, index, self.line));
                    ParserState::InStep(step)
                }
                Err(e) => {
                    // Keep the step open.
                    self.state = ParserState::InStep(step);
                    return Err(self.error(ParseErrorKind::Bind(e)));
                }
            },
        };
        self.state = next;
        Ok(())
    }

    /// Finish parsing and return the script.
    ///
    /// A step still open at the end of the input is kept.
    pub fn finish(mut self) -> Script {
        let state = std::mem::replace(&mut self.state, ParserState::ExpectStep);
        if let ParserState::InStep(step) = state {
            warn!(
                "step {} opened on line {} is not closed with '{}', keeping it",
                step.index(),
                step.line(),
                DONE_KEYWORD
            );
            self.steps.push(step);
        }
        Script::from_steps(self.steps)
    }

    fn step_header(&self, tokens: &[String]) -> Result<Step, ParseError> {
        match tokens {
            [with, input, as_, output] if with == STEP_KEYWORD && as_ == OUTPUT_KEYWORD => {
                Ok(Step::new(
                    PathBuf::from(input),
                    PathBuf::from(output),
                    self.steps.len() + 1,
                    self.line,
                ))
            }
            _ => Err(self.error(ParseErrorKind::MalformedStepHeader)),
        }
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError { line: self.line, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::BindError;
    use crate::filters::builtin::{Brightness, HorizontalBlur};
    use crate::filters::Filter;

    fn parse(source: &str) -> Result<Script, ParseError> {
        Script::parse_str(source, &FilterCatalog::with_builtins())
    }

    #[test]
    fn test_single_step() {
        let script = parse("with in.jpg as out.jpg\nbrightness 20\nhblur 5\ndone\n").unwrap();
        assert_eq!(script.len(), 1);

        let step = &script.steps()[0];
        assert_eq!(step.input(), PathBuf::from("in.jpg"));
        assert_eq!(step.output(), PathBuf::from("out.jpg"));
        assert_eq!(step.index(), 1);

        let filters: Vec<&Filter> = step.instructions().iter().map(|i| i.filter()).collect();
        assert_eq!(
            filters,
            vec![
                &Filter::Brightness(Brightness::new(20)),
                &Filter::HorizontalBlur(HorizontalBlur::new(5)),
            ]
        );
        assert_eq!(step.instructions()[1].index(), 2);
        assert_eq!(step.instructions()[1].line(), 3);
    }

    #[test]
    fn test_multiple_steps_keep_declaration_order() {
        let script = parse(concat!(
            "with a.jpg as b.jpg\nblur 1\ndone\n\n",
            "with b.jpg as c.png\ndone\n",
            "with c.png as d.png\nresize 4 4\ndone\n",
        ))
        .unwrap();

        let outputs: Vec<_> = script.steps().iter().map(|s| s.output().to_path_buf()).collect();
        assert_eq!(
            outputs,
            vec![PathBuf::from("b.jpg"), PathBuf::from("c.png"), PathBuf::from("d.png")]
        );
        assert!(script.steps()[1].instructions().is_empty());
        assert_eq!(script.steps()[2].index(), 3);
        assert_eq!(script.instruction_count(), 2);
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let script = parse(concat!(
            "# header comment\n\n   \n",
            "with a as b\n  # inside\n#blur 0\nsaturation 10\n\ndone\n",
            "# trailing",
        ))
        .unwrap();
        assert_eq!(script.len(), 1);
        assert_eq!(script.steps()[0].instructions().len(), 1);
        assert_eq!(script.steps()[0].instructions()[0].line(), 7);
    }

    #[test]
    fn test_extra_whitespace_between_tokens() {
        let script = parse("with\ta.png   as  b.png\n  darkness\t 5 \ndone").unwrap();
        assert_eq!(script.steps()[0].input(), PathBuf::from("a.png"));
        assert_eq!(script.steps()[0].instructions()[0].tokens(), &["darkness", "5"]);
    }

    #[test]
    fn test_missing_output_is_syntax_error_on_line_one() {
        let error = parse("with a as\ndone").unwrap_err();
        assert_eq!(error.line(), 1);
        assert!(matches!(error.kind, ParseErrorKind::MalformedStepHeader));
        assert!(error.to_string().starts_with("error on line 1:"));
    }

    #[test]
    fn test_header_keywords_checked() {
        assert!(parse("using a as b\ndone").is_err());
        assert!(parse("with a to b\ndone").is_err());
        assert!(parse("with a as b c\ndone").is_err());
    }

    #[test]
    fn test_instruction_outside_step_is_syntax_error() {
        let error = parse("blur 3\n").unwrap_err();
        assert_eq!(error.line(), 1);
        assert!(matches!(error.kind, ParseErrorKind::MalformedStepHeader));
    }

    #[test]
    fn test_done_outside_step_is_syntax_error() {
        let error = parse("with a as b\ndone\ndone\n").unwrap_err();
        assert_eq!(error.line(), 3);
    }

    #[test]
    fn test_unknown_filter_names_token() {
        let error = parse("with a as b\nfrobnicate 5\ndone").unwrap_err();
        assert_eq!(error.line(), 2);
        assert!(matches!(
            error.bind_error(),
            Some(BindError::UnknownOperation(name)) if name == "frobnicate"
        ));
        assert!(error.to_string().contains("frobnicate"));
    }

    #[test]
    fn test_bind_error_carries_line() {
        let error = parse("# c\nwith a as b\nblur 2\nresize 10 -1\ndone").unwrap_err();
        assert_eq!(error.line(), 4);
        assert!(matches!(error.bind_error(), Some(BindError::NotPositive { .. })));
    }

    #[test]
    fn test_unterminated_step_is_kept() {
        let script = parse("with a as b\nblur 2").unwrap();
        assert_eq!(script.len(), 1);
        assert_eq!(script.steps()[0].instructions().len(), 1);
    }

    #[test]
    fn test_empty_script() {
        let script = parse("# nothing to do\n").unwrap();
        assert!(script.is_empty());
    }

    #[test]
    fn test_bind_error_keeps_step_open() {
        let catalog = FilterCatalog::with_builtins();
        let mut ctx = ParseContext::new(&catalog);
        ctx.feed("with a as b").unwrap();
        assert!(ctx.feed("frobnicate 1").is_err());
        ctx.feed("blur 1").unwrap();
        ctx.feed("done").unwrap();

        let script = ctx.finish();
        assert_eq!(script.len(), 1);
        assert_eq!(script.steps()[0].instructions().len(), 1);
        assert_eq!(script.steps()[0].instructions()[0].line(), 3);
    }

    #[test]
    fn test_context_tracks_lines() {
        let catalog = FilterCatalog::with_builtins();
        let mut ctx = ParseContext::new(&catalog);
        assert_eq!(ctx.line(), 0);
        ctx.feed("").unwrap();
        ctx.feed("with a as b").unwrap();
        assert_eq!(ctx.line(), 2);
        assert_eq!(ctx.finish().len(), 1);
    }
}
